//! Measures of disagreement between reconstructed surfaces.
//!
//! Two measures are provided. [`field_deviation`] asks how far each vertex of
//! a mesh is from the true level set of a reference field, using the
//! first-order estimate `|f(p) - level| / |grad f(p)|`. [`hausdorff_distance`]
//! compares two meshes directly through their vertices.

use std::collections::HashMap;

use glam::{IVec3, Vec3};

use crate::field::ScalarField;
use crate::mesh::IsoMesh;

/// Summary of per-vertex distances.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviationStats {
    /// Number of vertices measured.
    pub count: usize,
    /// Mean distance.
    pub mean: f32,
    /// Root-mean-square distance.
    pub rms: f32,
    /// Largest distance.
    pub max: f32,
}

impl DeviationStats {
    fn from_distances(distances: impl IntoIterator<Item = f32>) -> Self {
        let mut count = 0_usize;
        let mut sum = 0.0_f64;
        let mut sum_sq = 0.0_f64;
        let mut max = 0.0_f32;
        for d in distances {
            count += 1;
            sum += f64::from(d);
            sum_sq += f64::from(d) * f64::from(d);
            max = max.max(d);
        }
        if count == 0 {
            return Self::default();
        }
        let n = count as f64;
        #[allow(clippy::cast_possible_truncation)]
        Self {
            count,
            mean: (sum / n) as f32,
            rms: (sum_sq / n).sqrt() as f32,
            max,
        }
    }
}

/// Estimated distance from each vertex of `mesh` to the `level` set of `field`.
///
/// Vertices where the gradient vanishes are skipped.
pub fn field_deviation<F: ScalarField + ?Sized>(mesh: &IsoMesh, field: &F, level: f32) -> DeviationStats {
    DeviationStats::from_distances(mesh.positions.iter().filter_map(|&p| {
        let g = field.gradient(p).length();
        (g > 1e-6).then(|| (field.evaluate(p) - level).abs() / g)
    }))
}

/// Symmetric Hausdorff distance between the vertex sets of two meshes.
///
/// Returns `None` if either mesh has no vertices.
#[must_use]
pub fn hausdorff_distance(a: &IsoMesh, b: &IsoMesh) -> Option<f32> {
    let ab = directed_distances(&a.positions, &b.positions)?.max;
    let ba = directed_distances(&b.positions, &a.positions)?.max;
    Some(ab.max(ba))
}

/// Distance from every point of `from` to its nearest point in `to`.
fn directed_distances(from: &[Vec3], to: &[Vec3]) -> Option<DeviationStats> {
    if from.is_empty() || to.is_empty() {
        return None;
    }
    let grid = PointGrid::new(to);
    Some(DeviationStats::from_distances(
        from.iter().map(|&p| grid.nearest_distance(p)),
    ))
}

/// Uniform hash grid for nearest-point queries.
struct PointGrid<'a> {
    points: &'a [Vec3],
    cells: HashMap<IVec3, Vec<u32>>,
    cell_size: f32,
    min_cell: IVec3,
    max_cell: IVec3,
}

impl<'a> PointGrid<'a> {
    fn new(points: &'a [Vec3]) -> Self {
        let (min, max) = points
            .iter()
            .fold((points[0], points[0]), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        let extent = (max - min).max_element();
        // Roughly a few points per occupied cell for surface-like sets.
        let per_axis = (points.len() as f32).sqrt().max(1.0);
        let cell_size = (extent / per_axis).max(1e-6);

        let mut grid = Self {
            points,
            cells: HashMap::new(),
            cell_size,
            min_cell: IVec3::MAX,
            max_cell: IVec3::MIN,
        };
        for (i, &p) in points.iter().enumerate() {
            let c = grid.cell_of(p);
            grid.min_cell = grid.min_cell.min(c);
            grid.max_cell = grid.max_cell.max(c);
            grid.cells
                .entry(c)
                .or_default()
                .push(u32::try_from(i).unwrap_or(u32::MAX));
        }
        grid
    }

    fn cell_of(&self, p: Vec3) -> IVec3 {
        (p / self.cell_size).floor().as_ivec3()
    }

    fn nearest_distance(&self, p: Vec3) -> f32 {
        let center = self.cell_of(p);
        let mut best = f32::INFINITY;
        let mut ring = 0_i32;
        loop {
            for c in shell(center, ring) {
                if let Some(ids) = self.cells.get(&c) {
                    for &i in ids {
                        best = best.min(self.points[i as usize].distance(p));
                    }
                }
            }
            // Anything beyond the next ring is at least `ring * cell_size` away.
            if best <= ring as f32 * self.cell_size {
                return best;
            }
            let covers_all = (center - IVec3::splat(ring)).cmple(self.min_cell).all()
                && (center + IVec3::splat(ring)).cmpge(self.max_cell).all();
            if covers_all {
                return best;
            }
            ring += 1;
        }
    }
}

/// Cells at Chebyshev distance exactly `r` from `center`.
fn shell(center: IVec3, r: i32) -> impl Iterator<Item = IVec3> {
    (-r..=r).flat_map(move |x| {
        (-r..=r).flat_map(move |y| {
            (-r..=r).filter_map(move |z| {
                (x.abs() == r || y.abs() == r || z.abs() == r).then(|| center + IVec3::new(x, y, z))
            })
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quadric::Quadric;

    fn points_mesh(positions: Vec<Vec3>) -> IsoMesh {
        IsoMesh {
            normals: vec![Vec3::Z; positions.len()],
            positions,
            triangles: Vec::new(),
        }
    }

    #[test]
    fn test_field_deviation_of_sphere_points() {
        // x² + y² + z² = 1 with points on radius 1.1: distance ≈ 0.21 / 2.2.
        let sphere = Quadric::new([1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -1.0]);
        let mesh = points_mesh(vec![Vec3::X * 1.1, Vec3::NEG_Y * 1.1, Vec3::Z * 1.1]);
        let stats = field_deviation(&mesh, &sphere, 0.0);
        assert_eq!(stats.count, 3);
        assert!((stats.mean - 0.21 / 2.2).abs() < 1e-4, "{stats:?}");
        assert!((stats.max - stats.mean).abs() < 1e-5);
    }

    #[test]
    fn test_points_on_level_set_have_zero_deviation() {
        let sphere = Quadric::new([1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -1.0]);
        let mesh = points_mesh(vec![Vec3::X, Vec3::new(0.6, 0.8, 0.0)]);
        assert!(field_deviation(&mesh, &sphere, 0.0).max < 1e-6);
    }

    #[test]
    fn test_hausdorff_matches_brute_force() {
        let a: Vec<Vec3> = (0..200)
            .map(|i| {
                let t = i as f32 * 0.137;
                Vec3::new(t.sin(), (1.7 * t).cos(), (0.3 * t).sin())
            })
            .collect();
        let b: Vec<Vec3> = a.iter().map(|p| *p * 1.05 + Vec3::splat(0.01)).collect();

        let brute = |from: &[Vec3], to: &[Vec3]| {
            from.iter()
                .map(|p| to.iter().map(|q| p.distance(*q)).fold(f32::INFINITY, f32::min))
                .fold(0.0_f32, f32::max)
        };
        let expected = brute(&a, &b).max(brute(&b, &a));
        let actual = hausdorff_distance(&points_mesh(a), &points_mesh(b)).unwrap();
        assert!((actual - expected).abs() < 1e-6, "{actual} vs {expected}");
    }

    #[test]
    fn test_hausdorff_identical_and_empty() {
        let mesh = points_mesh(vec![Vec3::ZERO, Vec3::ONE]);
        assert_eq!(hausdorff_distance(&mesh, &mesh), Some(0.0));
        assert_eq!(hausdorff_distance(&mesh, &IsoMesh::default()), None);
    }
}
