//! Configuration for the comparison demo.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{IsomatchError, Result};
use crate::lattice::{AxisOrder, LatticeSpec, Registration};
use crate::material::SurfaceMaterial;
use crate::normals::NormalsOptions;
use crate::quadric::{Quadric, NUM_COEFFICIENTS};

/// Everything the demo needs to build and show both surfaces.
///
/// Every field has a default, so a JSON file only needs to name the fields it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Fixed quadric coefficients. Drawn at random when absent.
    pub coefficients: Option<[f32; NUM_COEFFICIENTS]>,

    /// Seed for the random coefficients. Ignored when `coefficients` is set.
    pub seed: Option<u64>,

    /// Iso-value extracted by both pipelines.
    pub contour_value: f32,

    /// Lattice on which the discretized pipeline evaluates the quadric.
    pub lattice: LatticeSpec,

    /// Sample resolution used by both pipelines.
    pub sample_dimensions: [usize; 3],

    /// Origin/spacing assigned to the discretized buffer.
    pub registration: Registration,

    /// Order in which lattice values are packed into the buffer.
    pub axis_order: AxisOrder,

    /// Dihedral angle (degrees) above which edges stay sharp.
    pub feature_angle: f32,

    /// Surface color of the analytic view.
    pub analytic_color: Vec3,

    /// Surface color of the discretized view.
    pub discretized_color: Vec3,

    /// Specular intensity of both surfaces.
    pub specular: f32,

    /// Specular exponent of both surfaces.
    pub specular_power: f32,

    /// Window size in physical pixels.
    pub window_size: [u32; 2],

    /// Viewport clear color.
    pub background: Vec3,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            coefficients: None,
            seed: None,
            contour_value: 0.1,
            lattice: LatticeSpec::default(),
            sample_dimensions: [50, 50, 50],
            registration: Registration::Exact,
            axis_order: AxisOrder::Xyz,
            feature_angle: 60.0,
            analytic_color: Vec3::new(1.0, 1.0, 0.0),
            discretized_color: Vec3::new(1.0, 1.0, 0.0),
            specular: 0.3,
            specular_power: 20.0,
            window_size: [1280, 480],
            background: Vec3::new(0.1, 0.1, 0.1),
        }
    }
}

impl DemoConfig {
    /// Reads a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the parameters that would otherwise fail deep inside a pipeline.
    pub fn validate(&self) -> Result<()> {
        self.lattice.validate()?;
        if let Some(dim) = self.sample_dimensions.iter().find(|&&d| d < 2) {
            return Err(IsomatchError::InvalidSampling(format!(
                "sample dimensions must be at least 2, got {dim}"
            )));
        }
        if !self.contour_value.is_finite() {
            return Err(IsomatchError::InvalidSampling("contour value must be finite".into()));
        }
        if self.coefficients.is_some_and(|c| c.iter().any(|a| !a.is_finite())) {
            return Err(IsomatchError::InvalidSampling(
                "quadric coefficients must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Returns the quadric to display and the seed it was drawn from, if any.
    ///
    /// Without fixed coefficients or a seed, a fresh seed is drawn so the run
    /// can still be reproduced from the log.
    pub fn quadric(&self) -> (Quadric, Option<u64>) {
        if let Some(coefficients) = self.coefficients {
            return (Quadric::new(coefficients), None);
        }
        let seed = self.seed.unwrap_or_else(rand::random);
        (Quadric::from_seed(seed), Some(seed))
    }

    /// Normal-generation options for both surfaces.
    pub fn normals_options(&self) -> NormalsOptions {
        NormalsOptions::with_feature_angle(self.feature_angle)
    }

    /// Material of the analytic surface.
    pub fn analytic_material(&self) -> SurfaceMaterial {
        SurfaceMaterial::with_color(self.analytic_color).with_specular(self.specular, self.specular_power)
    }

    /// Material of the discretized surface.
    pub fn discretized_material(&self) -> SurfaceMaterial {
        SurfaceMaterial::with_color(self.discretized_color)
            .with_specular(self.specular, self.specular_power)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: DemoConfig = serde_json::from_str(
            r#"{ "contour_value": 0.25, "axis_order": "yxz", "lattice": { "step": 0.1 } }"#,
        )
        .unwrap();
        assert_eq!(config.contour_value, 0.25);
        assert_eq!(config.axis_order, AxisOrder::Yxz);
        assert_eq!(config.lattice.step, 0.1);
        assert_eq!(config.lattice.offset, 0.1);
        assert_eq!(config.registration, Registration::Exact);
        assert_eq!(config.window_size, [1280, 480]);
    }

    #[test]
    fn test_validate_rejects_bad_sampling() {
        let config = DemoConfig {
            sample_dimensions: [50, 1, 50],
            ..DemoConfig::default()
        };
        assert!(matches!(config.validate(), Err(IsomatchError::InvalidSampling(_))));

        let config = DemoConfig {
            lattice: LatticeSpec::uniform(-1.0, 1.0, 0.0, 0.1),
            ..DemoConfig::default()
        };
        assert!(matches!(config.validate(), Err(IsomatchError::InvalidLattice(_))));
    }

    #[test]
    fn test_quadric_resolution() {
        let fixed = DemoConfig {
            coefficients: Some([0.5, 1.0, 0.2, 0.0, 0.1, 0.0, 0.0, 0.2, 0.0, 0.0]),
            seed: Some(7),
            ..DemoConfig::default()
        };
        let (q, seed) = fixed.quadric();
        assert_eq!(q.coefficients()[0], 0.5);
        assert_eq!(seed, None);

        let seeded = DemoConfig {
            seed: Some(7),
            ..DemoConfig::default()
        };
        assert_eq!(seeded.quadric(), (Quadric::from_seed(7), Some(7)));

        let (_, drawn) = DemoConfig::default().quadric();
        assert!(drawn.is_some());
    }

    #[test]
    fn test_materials_follow_config() {
        let config = DemoConfig {
            discretized_color: Vec3::new(0.2, 0.6, 1.0),
            specular: 0.5,
            ..DemoConfig::default()
        };
        assert_eq!(config.analytic_material().diffuse_color, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(config.discretized_material().diffuse_color, Vec3::new(0.2, 0.6, 1.0));
        assert_eq!(config.discretized_material().specular, 0.5);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = DemoConfig::load("/nonexistent/isomatch.json");
        assert!(matches!(result, Err(IsomatchError::Io(_))));
    }

    #[test]
    fn test_load_malformed_file_is_json_error() {
        let path = std::env::temp_dir().join(format!("isomatch-malformed-{}.json", std::process::id()));
        std::fs::write(&path, "{ \"contour_value\": }").unwrap();
        let result = DemoConfig::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(IsomatchError::Json(_))));
    }
}
