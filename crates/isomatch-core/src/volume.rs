//! Volumetric scalar buffers and the implicit function that reads them back.

use glam::Vec3;

use crate::error::{IsomatchError, Result};
use crate::field::ScalarField;
use crate::lattice::{AxisOrder, LatticeSpec, Registration};
use crate::quadric::Quadric;

/// A dense, immutable 3D buffer of scalar values on a regular grid.
///
/// Values are stored x-fastest: node `(i, j, k)` lives at
/// `i + nx * (j + ny * k)`.
#[derive(Debug, Clone)]
pub struct ImageVolume {
    dimensions: [usize; 3],
    origin: Vec3,
    spacing: Vec3,
    values: Vec<f32>,
}

impl ImageVolume {
    /// Creates a volume, checking that the values fill the declared dimensions.
    pub fn new(dimensions: [usize; 3], origin: Vec3, spacing: Vec3, values: Vec<f32>) -> Result<Self> {
        if dimensions.iter().any(|&d| d < 2) {
            return Err(IsomatchError::InvalidVolume(format!(
                "every dimension must be >= 2, got {dimensions:?}"
            )));
        }
        if !(spacing.is_finite() && spacing.min_element() > 0.0) {
            return Err(IsomatchError::InvalidVolume(format!(
                "spacing must be positive, got {spacing}"
            )));
        }
        if !origin.is_finite() {
            return Err(IsomatchError::InvalidVolume("origin must be finite".into()));
        }
        let expected = dimensions.iter().product();
        if values.len() != expected {
            return Err(IsomatchError::SizeMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            dimensions,
            origin,
            spacing,
            values,
        })
    }

    /// Evaluates `quadric` on `spec`'s lattice in host code, packs the values
    /// in `order` and registers the buffer with `registration`.
    pub fn from_lattice(
        quadric: &Quadric,
        spec: &LatticeSpec,
        order: AxisOrder,
        registration: Registration,
    ) -> Result<Self> {
        spec.validate()?;
        let grid = spec.mesh_grid();
        let a = quadric.coefficients();
        let values: Vec<f32> = grid
            .x
            .iter()
            .zip(&grid.y)
            .zip(&grid.z)
            .map(|((&x, &y), &z)| {
                a[0] * x * x
                    + a[1] * y * y
                    + a[2] * z * z
                    + a[3] * x * y
                    + a[4] * y * z
                    + a[5] * x * z
                    + a[6] * x
                    + a[7] * y
                    + a[8] * z
                    + a[9]
            })
            .collect();
        let packed = order.pack(&values, grid.shape)?;
        let (origin, spacing) = registration.frame(spec);
        log::debug!(
            "packed {} lattice values ({order:?}, {registration:?}) at origin {origin}, spacing {spacing}",
            packed.len()
        );
        Self::new(grid.shape, origin, spacing, packed)
    }

    /// Number of nodes along each axis.
    #[must_use]
    pub fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    /// World position of node `(0, 0, 0)`.
    #[must_use]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Distance between neighbouring nodes per axis.
    #[must_use]
    pub fn spacing(&self) -> Vec3 {
        self.spacing
    }

    /// Raw values in x-fastest order.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Minimum and maximum corners: `origin` and `origin + spacing * (dimensions - 1)`.
    #[must_use]
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let cells = Vec3::new(
            (self.dimensions[0] - 1) as f32,
            (self.dimensions[1] - 1) as f32,
            (self.dimensions[2] - 1) as f32,
        );
        (self.origin, self.origin + self.spacing * cells)
    }

    /// Value at node `(i, j, k)`.
    #[must_use]
    pub fn value(&self, i: usize, j: usize, k: usize) -> f32 {
        self.values[i + self.dimensions[0] * (j + self.dimensions[1] * k)]
    }

    /// Converts a world position to continuous grid-index coordinates.
    #[must_use]
    pub fn to_grid(&self, p: Vec3) -> Vec3 {
        (p - self.origin) / self.spacing
    }
}

/// An implicit function defined by trilinear interpolation of an [`ImageVolume`].
///
/// Points outside the volume evaluate to `out_value` with a zero gradient. Points within a small
/// tolerance of the boundary are clamped onto it so that samplers walking the
/// exact bounds never fall off the edge through rounding.
#[derive(Debug, Clone)]
pub struct ImplicitVolume {
    volume: ImageVolume,
    out_value: f32,
}

/// Boundary tolerance in units of grid spacing.
const BOUNDS_TOLERANCE: f32 = 1e-4;

impl ImplicitVolume {
    /// Wraps `volume`, taking ownership of it.
    #[must_use]
    pub fn new(volume: ImageVolume) -> Self {
        Self {
            volume,
            out_value: f32::MAX,
        }
    }

    /// Sets the value returned outside the volume.
    #[must_use]
    pub fn with_out_value(mut self, out_value: f32) -> Self {
        self.out_value = out_value;
        self
    }

    /// The wrapped volume.
    #[must_use]
    pub fn volume(&self) -> &ImageVolume {
        &self.volume
    }

    /// Locates `p` as a cell index plus fractional offsets, or `None` if it
    /// lies outside the volume.
    fn locate(&self, p: Vec3) -> Option<([usize; 3], Vec3)> {
        let g = self.volume.to_grid(p);
        let dims = self.volume.dimensions;
        let mut cell = [0_usize; 3];
        let mut frac = Vec3::ZERO;
        for axis in 0..3 {
            let max = (dims[axis] - 1) as f32;
            let mut t = g[axis];
            if !t.is_finite() || t < -BOUNDS_TOLERANCE || t > max + BOUNDS_TOLERANCE {
                return None;
            }
            t = t.clamp(0.0, max);
            // The last node belongs to the last cell.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let base = (t.floor() as usize).min(dims[axis] - 2);
            cell[axis] = base;
            frac[axis] = t - base as f32;
        }
        Some((cell, frac))
    }

    fn corners(&self, [i, j, k]: [usize; 3]) -> [f32; 8] {
        let v = &self.volume;
        [
            v.value(i, j, k),
            v.value(i + 1, j, k),
            v.value(i, j + 1, k),
            v.value(i + 1, j + 1, k),
            v.value(i, j, k + 1),
            v.value(i + 1, j, k + 1),
            v.value(i, j + 1, k + 1),
            v.value(i + 1, j + 1, k + 1),
        ]
    }
}

impl ScalarField for ImplicitVolume {
    fn evaluate(&self, p: Vec3) -> f32 {
        let Some((cell, t)) = self.locate(p) else {
            return self.out_value;
        };
        let c = self.corners(cell);
        let x00 = c[0] + (c[1] - c[0]) * t.x;
        let x10 = c[2] + (c[3] - c[2]) * t.x;
        let x01 = c[4] + (c[5] - c[4]) * t.x;
        let x11 = c[6] + (c[7] - c[6]) * t.x;
        let y0 = x00 + (x10 - x00) * t.y;
        let y1 = x01 + (x11 - x01) * t.y;
        y0 + (y1 - y0) * t.z
    }

    /// Exact gradient of the trilinear interpolant within the containing cell.
    fn gradient(&self, p: Vec3) -> Vec3 {
        let Some((cell, t)) = self.locate(p) else {
            return Vec3::ZERO;
        };
        let c = self.corners(cell);
        let (u, v, w) = (t.x, t.y, t.z);
        let lerp = |a: f32, b: f32, s: f32| a + (b - a) * s;

        let dx = lerp(
            lerp(c[1] - c[0], c[3] - c[2], v),
            lerp(c[5] - c[4], c[7] - c[6], v),
            w,
        );
        let dy = lerp(
            lerp(c[2] - c[0], c[3] - c[1], u),
            lerp(c[6] - c[4], c[7] - c[5], u),
            w,
        );
        let dz = lerp(
            lerp(c[4] - c[0], c[5] - c[1], u),
            lerp(c[6] - c[2], c[7] - c[3], u),
            v,
        );
        Vec3::new(dx, dy, dz) / self.volume.spacing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn linear_volume() -> ImageVolume {
        // f(x, y, z) = x + 2y + 3z sampled on a 3x3x3 grid at origin 0, spacing 0.5.
        let dims = [3, 3, 3];
        let mut values = Vec::new();
        for k in 0..3 {
            for j in 0..3 {
                for i in 0..3 {
                    let p = Vec3::new(i as f32, j as f32, k as f32) * 0.5;
                    values.push(p.x + 2.0 * p.y + 3.0 * p.z);
                }
            }
        }
        ImageVolume::new(dims, Vec3::ZERO, Vec3::splat(0.5), values).unwrap()
    }

    #[test]
    fn test_bounds_are_origin_plus_spacing_times_cells() {
        let volume = ImageVolume::new(
            [4, 5, 6],
            Vec3::new(-1.0, 0.5, 2.0),
            Vec3::new(0.25, 0.5, 2.0),
            vec![0.0; 120],
        )
        .unwrap();
        let (min, max) = volume.bounds();
        assert_eq!(min, Vec3::new(-1.0, 0.5, 2.0));
        assert_eq!(max, Vec3::new(-0.25, 2.5, 12.0));
    }

    #[test]
    fn test_new_rejects_malformed_buffers() {
        assert!(matches!(
            ImageVolume::new([2, 2, 2], Vec3::ZERO, Vec3::ONE, vec![0.0; 7]),
            Err(IsomatchError::SizeMismatch { .. })
        ));
        assert!(ImageVolume::new([1, 2, 2], Vec3::ZERO, Vec3::ONE, vec![0.0; 4]).is_err());
        assert!(ImageVolume::new([2, 2, 2], Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0), vec![0.0; 8]).is_err());
    }

    #[test]
    fn test_trilinear_reproduces_linear_fields() {
        let field = ImplicitVolume::new(linear_volume());
        let p = Vec3::new(0.3, 0.7, 0.9);
        assert!((field.evaluate(p) - (0.3 + 1.4 + 2.7)).abs() < 1e-5);
        let g = field.gradient(p);
        assert!((g - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-4, "{g:?}");
    }

    #[test]
    fn test_outside_points_return_out_value() {
        let field = ImplicitVolume::new(linear_volume()).with_out_value(-7.0);
        assert_eq!(field.evaluate(Vec3::new(-0.1, 0.5, 0.5)), -7.0);
        assert_eq!(field.evaluate(Vec3::new(0.5, 0.5, 1.2)), -7.0);
        assert_eq!(field.gradient(Vec3::splat(5.0)), Vec3::ZERO);
    }

    #[test]
    fn test_max_corner_is_inside() {
        let field = ImplicitVolume::new(linear_volume());
        let (_, max) = field.volume().bounds();
        assert!((field.evaluate(max) - 6.0).abs() < 1e-5);
        // Rounding just past the corner is clamped rather than rejected.
        assert!((field.evaluate(max + Vec3::splat(1e-6)) - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_from_lattice_exact_matches_quadric_at_nodes() {
        let quadric = Quadric::new([0.5, 1.0, 0.2, 0.0, 0.1, 0.0, 0.0, 0.2, 0.0, 0.0]);
        let spec = LatticeSpec::uniform(-1.0, 1.0, 0.25, 0.0);
        let volume =
            ImageVolume::from_lattice(&quadric, &spec, AxisOrder::Xyz, Registration::Exact).unwrap();
        let field = ImplicitVolume::new(volume);
        for &p in &[Vec3::new(-1.0, -1.0, -1.0), Vec3::new(0.5, -0.25, 0.75)] {
            assert!((field.evaluate(p) - quadric.evaluate(p)).abs() < 1e-5);
        }
    }

    proptest! {
        #[test]
        fn interpolation_hits_node_values(i in 0_usize..3, j in 0_usize..3, k in 0_usize..3) {
            let volume = linear_volume();
            let expected = volume.value(i, j, k);
            let p = volume.origin() + Vec3::new(i as f32, j as f32, k as f32) * volume.spacing();
            let field = ImplicitVolume::new(volume);
            prop_assert!((field.evaluate(p) - expected).abs() < 1e-5);
        }

        #[test]
        fn interpolation_stays_within_cell_range(
            x in 0.0_f32..1.0, y in 0.0_f32..1.0, z in 0.0_f32..1.0,
        ) {
            let field = ImplicitVolume::new(linear_volume());
            let v = field.evaluate(Vec3::new(x, y, z));
            prop_assert!((-1e-5..=6.0 + 1e-5).contains(&v));
        }
    }
}
