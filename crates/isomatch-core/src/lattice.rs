//! Explicit sample lattices, value packing and volume registration.
//!
//! The discretized pipeline evaluates the field on a lattice in host code and
//! then has to decide two things before the values become an
//! [`ImageVolume`](crate::ImageVolume): the order in which the values are
//! written into the buffer ([`AxisOrder`]) and where in space the buffer is
//! declared to live ([`Registration`]). Getting either wrong still produces a
//! perfectly valid volume, just not the intended surface.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{IsomatchError, Result};

/// Nominal ranges, step and padding offset of a regular sample lattice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeSpec {
    /// Nominal `[lo, hi]` range per axis.
    pub ranges: [[f32; 2]; 3],
    /// Distance between neighbouring lattice points on every axis.
    pub step: f32,
    /// Padding added below `lo` and above `hi` on every axis.
    pub offset: f32,
}

impl Default for LatticeSpec {
    fn default() -> Self {
        Self {
            ranges: [[-1.0, 1.0]; 3],
            step: 0.05,
            offset: 0.1,
        }
    }
}

impl LatticeSpec {
    /// Creates a lattice spec with the same range on all three axes.
    #[must_use]
    pub fn uniform(lo: f32, hi: f32, step: f32, offset: f32) -> Self {
        Self {
            ranges: [[lo, hi]; 3],
            step,
            offset,
        }
    }

    /// Checks that every axis yields at least two points.
    pub fn validate(&self) -> Result<()> {
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(IsomatchError::InvalidLattice(format!(
                "step must be positive, got {}",
                self.step
            )));
        }
        if !self.offset.is_finite() {
            return Err(IsomatchError::InvalidLattice("offset must be finite".into()));
        }
        for (axis, [lo, hi]) in self.ranges.iter().enumerate() {
            if !(lo.is_finite() && hi.is_finite()) || hi <= lo {
                return Err(IsomatchError::InvalidLattice(format!(
                    "axis {axis} has empty range [{lo}, {hi}]"
                )));
            }
            if self.axis_len(axis) < 2 {
                return Err(IsomatchError::InvalidLattice(format!(
                    "axis {axis} has fewer than two points"
                )));
            }
        }
        Ok(())
    }

    /// Number of points along `axis`.
    ///
    /// Points run from `lo - offset` in increments of `step` while strictly
    /// below `hi + offset`.
    #[must_use]
    pub fn axis_len(&self, axis: usize) -> usize {
        let [lo, hi] = self.ranges[axis];
        let span = f64::from((hi + self.offset) - (lo - self.offset));
        let steps = span / f64::from(self.step);
        // Exact multiples of the step land on the excluded upper end.
        let count = (steps - 1e-6).ceil();
        if count.is_finite() && count > 0.0 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let count = count as usize;
            count
        } else {
            0
        }
    }

    /// Lattice dimensions `[nx, ny, nz]`.
    #[must_use]
    pub fn dimensions(&self) -> [usize; 3] {
        [self.axis_len(0), self.axis_len(1), self.axis_len(2)]
    }

    /// Total number of lattice points.
    #[must_use]
    pub fn num_points(&self) -> usize {
        self.dimensions().iter().product()
    }

    /// Coordinates of the lattice points along `axis`.
    #[must_use]
    pub fn axis_coordinates(&self, axis: usize) -> Vec<f32> {
        let start = self.ranges[axis][0] - self.offset;
        (0..self.axis_len(axis))
            .map(|i| start + i as f32 * self.step)
            .collect()
    }

    /// First lattice point (minimum corner).
    #[must_use]
    pub fn min_corner(&self) -> Vec3 {
        Vec3::new(
            self.ranges[0][0] - self.offset,
            self.ranges[1][0] - self.offset,
            self.ranges[2][0] - self.offset,
        )
    }

    /// Last lattice point (maximum corner).
    #[must_use]
    pub fn max_corner(&self) -> Vec3 {
        let dims = self.dimensions();
        self.min_corner()
            + Vec3::new(
                dims[0].saturating_sub(1) as f32,
                dims[1].saturating_sub(1) as f32,
                dims[2].saturating_sub(1) as f32,
            ) * self.step
    }

    /// Builds the coordinate arrays of every lattice point.
    #[must_use]
    pub fn mesh_grid(&self) -> MeshGrid {
        let xs = self.axis_coordinates(0);
        let ys = self.axis_coordinates(1);
        let zs = self.axis_coordinates(2);
        let shape = [xs.len(), ys.len(), zs.len()];
        let n = shape.iter().product();

        let mut x = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);
        let mut z = Vec::with_capacity(n);
        for &xi in &xs {
            for &yj in &ys {
                for &zk in &zs {
                    x.push(xi);
                    y.push(yj);
                    z.push(zk);
                }
            }
        }
        MeshGrid { shape, x, y, z }
    }
}

/// Coordinate arrays of a lattice in `(i, j, k)` order with `k` fastest.
///
/// The value for lattice point `(i, j, k)` lives at
/// `(i * ny + j) * nz + k` in each of `x`, `y` and `z`.
#[derive(Debug, Clone)]
pub struct MeshGrid {
    /// Logical shape `[nx, ny, nz]`.
    pub shape: [usize; 3],
    /// X coordinate of every point.
    pub x: Vec<f32>,
    /// Y coordinate of every point.
    pub y: Vec<f32>,
    /// Z coordinate of every point.
    pub z: Vec<f32>,
}

impl MeshGrid {
    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns true if the grid has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Linear index of lattice point `(i, j, k)`.
    #[must_use]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.shape[1] + j) * self.shape[2] + k
    }
}

/// Order in which lattice values are written into a volume buffer.
///
/// The name lists the lattice axes from fastest to slowest varying. Volume
/// buffers are x-fastest, so only [`AxisOrder::Xyz`] is faithful; the other
/// orders write transposed data under the same declared dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisOrder {
    /// x fastest, then y, then z.
    #[default]
    Xyz,
    /// x fastest, then z, then y.
    Xzy,
    /// y fastest, then x, then z.
    Yxz,
    /// y fastest, then z, then x.
    Yzx,
    /// z fastest, then x, then y.
    Zxy,
    /// z fastest, then y, then x.
    Zyx,
}

impl AxisOrder {
    /// Lattice axes from fastest to slowest varying.
    #[must_use]
    pub fn axes(self) -> [usize; 3] {
        match self {
            AxisOrder::Xyz => [0, 1, 2],
            AxisOrder::Xzy => [0, 2, 1],
            AxisOrder::Yxz => [1, 0, 2],
            AxisOrder::Yzx => [1, 2, 0],
            AxisOrder::Zxy => [2, 0, 1],
            AxisOrder::Zyx => [2, 1, 0],
        }
    }

    /// Whether this order matches the x-fastest layout of volume buffers.
    #[must_use]
    pub fn is_faithful(self) -> bool {
        self == AxisOrder::Xyz
    }

    /// Packs values laid out like a [`MeshGrid`] into this order.
    pub fn pack(self, values: &[f32], shape: [usize; 3]) -> Result<Vec<f32>> {
        let expected: usize = shape.iter().product();
        if values.len() != expected {
            return Err(IsomatchError::SizeMismatch {
                expected,
                actual: values.len(),
            });
        }

        let [fast, mid, slow] = self.axes();
        let mut packed = Vec::with_capacity(expected);
        let mut ijk = [0_usize; 3];
        for c in 0..shape[slow] {
            ijk[slow] = c;
            for b in 0..shape[mid] {
                ijk[mid] = b;
                for a in 0..shape[fast] {
                    ijk[fast] = a;
                    packed.push(values[(ijk[0] * shape[1] + ijk[1]) * shape[2] + ijk[2]]);
                }
            }
        }
        Ok(packed)
    }
}

/// How the origin and spacing of a volume buffer are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Registration {
    /// Origin at the first lattice point, spacing equal to the lattice step.
    #[default]
    Exact,
    /// Origin at the nominal range minimum, spacing stretching the lattice
    /// over the nominal range. Ignores the padding offset.
    Nominal,
}

impl Registration {
    /// Whether stored values are declared to live where they were evaluated.
    #[must_use]
    pub fn is_faithful(self) -> bool {
        self == Registration::Exact
    }

    /// Returns `(origin, spacing)` for a volume holding `spec`'s values.
    #[must_use]
    pub fn frame(self, spec: &LatticeSpec) -> (Vec3, Vec3) {
        match self {
            Registration::Exact => (spec.min_corner(), Vec3::splat(spec.step)),
            Registration::Nominal => {
                let dims = spec.dimensions();
                let mut origin = Vec3::ZERO;
                let mut spacing = Vec3::ZERO;
                for axis in 0..3 {
                    let [lo, hi] = spec.ranges[axis];
                    origin[axis] = lo;
                    spacing[axis] = (hi - lo) / (dims[axis].max(2) - 1) as f32;
                }
                (origin, spacing)
            }
        }
    }
}
