//! The two ways of turning a quadric into an iso-surface.
//!
//! Both pipelines share the quadric, the lattice, the sample resolution and
//! the contour value. They differ only in what the sampler sees: the analytic
//! pipeline samples the closed-form quadric, the discretized pipeline samples
//! a trilinear reconstruction of values precomputed on the lattice.

use glam::Vec3;
use isomatch_core::{
    AxisOrder, ContourFilter, DemoConfig, ImageVolume, ImplicitVolume, IsoMesh, LatticeSpec, Quadric,
    Registration, Result, SampleFunction,
};

/// Quadric, sampled directly, then contoured.
#[derive(Debug, Clone)]
pub struct AnalyticPipeline {
    quadric: Quadric,
    lattice: LatticeSpec,
    sample_dimensions: [usize; 3],
    contour_value: f32,
}

impl AnalyticPipeline {
    /// Creates the pipeline for `quadric` with the sampling settings of `config`.
    pub fn new(quadric: Quadric, config: &DemoConfig) -> Self {
        Self {
            quadric,
            lattice: config.lattice,
            sample_dimensions: config.sample_dimensions,
            contour_value: config.contour_value,
        }
    }

    /// The quadric being sampled.
    pub fn quadric(&self) -> &Quadric {
        &self.quadric
    }

    /// Sampling region: first to last lattice point on every axis.
    pub fn model_bounds(&self) -> (Vec3, Vec3) {
        (self.lattice.min_corner(), self.lattice.max_corner())
    }

    /// Samples the quadric over [`AnalyticPipeline::model_bounds`].
    pub fn sample(&self) -> Result<ImageVolume> {
        self.lattice.validate()?;
        let (min, max) = self.model_bounds();
        SampleFunction::new()
            .with_model_bounds(min, max)
            .with_sample_dimensions(self.sample_dimensions)
            .execute(&self.quadric)
    }

    /// Extracts the iso-surface at the contour value.
    pub fn run(&self) -> Result<IsoMesh> {
        let mesh = ContourFilter::new(self.contour_value).execute(&self.sample()?)?;
        log::info!(
            "analytic surface: {} vertices, {} triangles",
            mesh.num_vertices(),
            mesh.num_triangles()
        );
        Ok(mesh)
    }
}

/// Quadric evaluated on the lattice, packed into a volume, reconstructed by
/// interpolation, resampled, then contoured.
#[derive(Debug, Clone)]
pub struct DiscretizedPipeline {
    quadric: Quadric,
    lattice: LatticeSpec,
    sample_dimensions: [usize; 3],
    contour_value: f32,
    registration: Registration,
    axis_order: AxisOrder,
}

impl DiscretizedPipeline {
    /// Creates the pipeline for `quadric` with the settings of `config`.
    pub fn new(quadric: Quadric, config: &DemoConfig) -> Self {
        Self {
            quadric,
            lattice: config.lattice,
            sample_dimensions: config.sample_dimensions,
            contour_value: config.contour_value,
            registration: config.registration,
            axis_order: config.axis_order,
        }
    }

    /// Overrides the packing order.
    #[must_use]
    pub fn with_axis_order(mut self, axis_order: AxisOrder) -> Self {
        self.axis_order = axis_order;
        self
    }

    /// Overrides the registration.
    #[must_use]
    pub fn with_registration(mut self, registration: Registration) -> Self {
        self.registration = registration;
        self
    }

    /// Whether the buffer reproduces the lattice values in place, so that the
    /// only remaining difference to the analytic surface is interpolation.
    pub fn is_faithful(&self) -> bool {
        self.axis_order.is_faithful() && self.registration.is_faithful()
    }

    /// Evaluates, packs and registers the lattice values.
    pub fn build_volume(&self) -> Result<ImageVolume> {
        let volume =
            ImageVolume::from_lattice(&self.quadric, &self.lattice, self.axis_order, self.registration)?;
        let (lo, hi) = volume.bounds();
        log::info!(
            "volume buffer {:?} ({:?} packing, {:?} registration), bounds {lo} .. {hi}",
            volume.dimensions(),
            self.axis_order,
            self.registration,
        );
        if !self.axis_order.is_faithful() {
            log::warn!("{:?} packing transposes the lattice values", self.axis_order);
        }
        if !self.registration.is_faithful() {
            log::warn!(
                "{:?} registration moves the buffer to {lo} .. {hi}, away from the evaluated lattice",
                self.registration
            );
        }
        Ok(volume)
    }

    /// Samples the reconstructed field over the buffer's own bounds.
    pub fn sample(&self, implicit: &ImplicitVolume) -> Result<ImageVolume> {
        let (min, max) = implicit.volume().bounds();
        SampleFunction::new()
            .with_model_bounds(min, max)
            .with_sample_dimensions(self.sample_dimensions)
            .execute(implicit)
    }

    /// Extracts the iso-surface at the contour value.
    pub fn run(&self) -> Result<IsoMesh> {
        let implicit = ImplicitVolume::new(self.build_volume()?);
        let mesh = ContourFilter::new(self.contour_value).execute(&self.sample(&implicit)?)?;
        log::info!(
            "discretized surface: {} vertices, {} triangles",
            mesh.num_vertices(),
            mesh.num_triangles()
        );
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere_config() -> (Quadric, DemoConfig) {
        let sphere = Quadric::new([1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -0.25]);
        let config = DemoConfig {
            contour_value: 0.0,
            sample_dimensions: [24, 24, 24],
            ..DemoConfig::default()
        };
        (sphere, config)
    }

    #[test]
    fn test_analytic_bounds_follow_lattice() {
        let (sphere, config) = sphere_config();
        let pipeline = AnalyticPipeline::new(sphere, &config);
        let (min, max) = pipeline.model_bounds();
        assert!(min.abs_diff_eq(Vec3::splat(-1.1), 1e-6));
        assert!(max.abs_diff_eq(Vec3::splat(1.05), 1e-5));
    }

    #[test]
    fn test_both_pipelines_find_the_sphere() {
        let (sphere, config) = sphere_config();
        for mesh in [
            AnalyticPipeline::new(sphere, &config).run().unwrap(),
            DiscretizedPipeline::new(sphere, &config).run().unwrap(),
        ] {
            assert!(!mesh.is_empty());
            let (lo, hi) = mesh.bounds().unwrap();
            assert!(lo.abs_diff_eq(Vec3::splat(-0.5), 0.05), "{lo}");
            assert!(hi.abs_diff_eq(Vec3::splat(0.5), 0.05), "{hi}");
        }
    }

    #[test]
    fn test_discretized_samples_actual_buffer_bounds() {
        let (sphere, config) = sphere_config();
        let pipeline = DiscretizedPipeline::new(sphere, &config).with_registration(Registration::Nominal);
        let implicit = ImplicitVolume::new(pipeline.build_volume().unwrap());
        let sampled = pipeline.sample(&implicit).unwrap();
        let (lo, hi) = sampled.bounds();
        assert!(lo.abs_diff_eq(Vec3::splat(-1.0), 1e-5));
        assert!(hi.abs_diff_eq(Vec3::splat(1.0), 1e-4));
        assert!(sampled.values().iter().all(|v| *v < f32::MAX));
    }

    #[test]
    fn test_faithfulness_needs_order_and_registration() {
        let (sphere, config) = sphere_config();
        let pipeline = DiscretizedPipeline::new(sphere, &config);
        assert!(pipeline.is_faithful());
        assert!(!pipeline.clone().with_axis_order(AxisOrder::Zyx).is_faithful());
        assert!(!pipeline.with_registration(Registration::Nominal).is_faithful());
    }

    #[test]
    fn test_invalid_lattice_is_reported() {
        let (sphere, mut config) = sphere_config();
        config.lattice.step = -1.0;
        assert!(AnalyticPipeline::new(sphere, &config).run().is_err());
        assert!(DiscretizedPipeline::new(sphere, &config).run().is_err());
    }
}
