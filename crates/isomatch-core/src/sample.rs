//! Sampling an implicit function onto a regular grid.

use glam::Vec3;

use crate::error::{IsomatchError, Result};
use crate::field::ScalarField;
use crate::volume::ImageVolume;

/// Walks a bounding box at a fixed resolution and evaluates a field at every node.
///
/// The output is an [`ImageVolume`] whose first and last nodes sit exactly on
/// the model bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleFunction {
    model_min: Vec3,
    model_max: Vec3,
    sample_dimensions: [usize; 3],
}

impl Default for SampleFunction {
    fn default() -> Self {
        Self {
            model_min: Vec3::splat(-1.0),
            model_max: Vec3::splat(1.0),
            sample_dimensions: [50, 50, 50],
        }
    }
}

impl SampleFunction {
    /// Creates a sampler over `[-1, 1]^3` at 50 nodes per axis.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the box to sample.
    #[must_use]
    pub fn with_model_bounds(mut self, min: Vec3, max: Vec3) -> Self {
        self.model_min = min;
        self.model_max = max;
        self
    }

    /// Sets the number of nodes per axis.
    #[must_use]
    pub fn with_sample_dimensions(mut self, dims: [usize; 3]) -> Self {
        self.sample_dimensions = dims;
        self
    }

    /// The sampled box.
    #[must_use]
    pub fn model_bounds(&self) -> (Vec3, Vec3) {
        (self.model_min, self.model_max)
    }

    /// Nodes per axis.
    #[must_use]
    pub fn sample_dimensions(&self) -> [usize; 3] {
        self.sample_dimensions
    }

    /// Samples `field` over the model bounds.
    pub fn execute<F: ScalarField + ?Sized>(&self, field: &F) -> Result<ImageVolume> {
        let dims = self.sample_dimensions;
        if dims.iter().any(|&d| d < 2) {
            return Err(IsomatchError::InvalidSampling(format!(
                "sample dimensions must be >= 2, got {dims:?}"
            )));
        }
        let extent = self.model_max - self.model_min;
        if !(extent.is_finite() && extent.min_element() > 0.0) {
            return Err(IsomatchError::InvalidSampling(format!(
                "degenerate model bounds {} .. {}",
                self.model_min, self.model_max
            )));
        }

        let cells = Vec3::new(
            (dims[0] - 1) as f32,
            (dims[1] - 1) as f32,
            (dims[2] - 1) as f32,
        );
        let spacing = extent / cells;

        let mut values = Vec::with_capacity(dims.iter().product());
        for k in 0..dims[2] {
            for j in 0..dims[1] {
                for i in 0..dims[0] {
                    // Last node pinned to the max bound so rounding never
                    // leaves the box.
                    let p = Vec3::new(
                        node_coordinate(self.model_min.x, self.model_max.x, spacing.x, i, dims[0]),
                        node_coordinate(self.model_min.y, self.model_max.y, spacing.y, j, dims[1]),
                        node_coordinate(self.model_min.z, self.model_max.z, spacing.z, k, dims[2]),
                    );
                    values.push(field.evaluate(p));
                }
            }
        }

        log::debug!(
            "sampled {}x{}x{} nodes over {} .. {}",
            dims[0],
            dims[1],
            dims[2],
            self.model_min,
            self.model_max
        );
        ImageVolume::new(dims, self.model_min, spacing, values)
    }
}

fn node_coordinate(min: f32, max: f32, spacing: f32, index: usize, count: usize) -> f32 {
    if index + 1 == count {
        max
    } else {
        min + index as f32 * spacing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quadric::Quadric;

    #[test]
    fn test_defaults_match_unit_box() {
        let sampler = SampleFunction::new();
        assert_eq!(sampler.model_bounds(), (Vec3::splat(-1.0), Vec3::splat(1.0)));
        assert_eq!(sampler.sample_dimensions(), [50, 50, 50]);
    }

    #[test]
    fn test_sample_volume_spans_model_bounds() {
        let q = Quadric::new([1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let volume = SampleFunction::new()
            .with_model_bounds(Vec3::new(-1.0, -2.0, 0.0), Vec3::new(1.0, 2.0, 3.0))
            .with_sample_dimensions([5, 9, 4])
            .execute(&q)
            .unwrap();
        assert_eq!(volume.dimensions(), [5, 9, 4]);
        let (min, max) = volume.bounds();
        assert_eq!(min, Vec3::new(-1.0, -2.0, 0.0));
        assert!((max - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-6);
        // Node (2, 4, 0) is (0, 0, 0).
        assert_eq!(volume.value(2, 4, 0), 0.0);
        assert_eq!(volume.value(4, 8, 3), 1.0 + 4.0 + 9.0);
    }

    #[test]
    fn test_rejects_degenerate_sampling() {
        let q = Quadric::new([0.0; 10]);
        assert!(SampleFunction::new()
            .with_sample_dimensions([1, 4, 4])
            .execute(&q)
            .is_err());
        assert!(SampleFunction::new()
            .with_model_bounds(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0))
            .execute(&q)
            .is_err());
    }
}
