//! Fixed shading parameters applied to post-processed surfaces.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Phong-style surface material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceMaterial {
    /// Base color used for ambient and diffuse terms.
    pub diffuse_color: Vec3,
    /// Ambient light factor (0.0 - 1.0).
    pub ambient: f32,
    /// Diffuse reflection factor (0.0 - 1.0).
    pub diffuse: f32,
    /// Specular reflection intensity (0.0 - 1.0).
    pub specular: f32,
    /// Specular exponent (higher = sharper highlights).
    pub specular_power: f32,
    /// Color of specular highlights.
    pub specular_color: Vec3,
    /// Whether per-vertex scalars may override the color. Always off for
    /// iso-surfaces, which carry no scalars worth showing.
    pub scalar_visibility: bool,
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self {
            diffuse_color: Vec3::new(1.0, 1.0, 0.0),
            ambient: 0.0,
            diffuse: 1.0,
            specular: 0.3,
            specular_power: 20.0,
            specular_color: Vec3::ONE,
            scalar_visibility: false,
        }
    }
}

impl SurfaceMaterial {
    /// Default material with the given diffuse color.
    #[must_use]
    pub fn with_color(diffuse_color: Vec3) -> Self {
        Self {
            diffuse_color,
            ..Self::default()
        }
    }

    /// Sets the specular intensity and exponent.
    #[must_use]
    pub fn with_specular(mut self, specular: f32, specular_power: f32) -> Self {
        self.specular = specular.clamp(0.0, 1.0);
        self.specular_power = specular_power.max(0.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let m = SurfaceMaterial::default();
        assert_eq!(m.diffuse_color, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!((m.specular, m.specular_power), (0.3, 20.0));
        assert!(!m.scalar_visibility);
    }

    #[test]
    fn test_specular_is_clamped() {
        let m = SurfaceMaterial::with_color(Vec3::X).with_specular(3.0, -1.0);
        assert_eq!((m.specular, m.specular_power), (1.0, 0.0));
        assert_eq!(m.diffuse_color, Vec3::X);
    }
}
