//! Indexed triangle meshes produced by contouring.

use std::collections::HashMap;

use glam::Vec3;

/// A world-space triangle mesh with per-vertex normals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IsoMesh {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Per-vertex unit normals (same length as `positions`).
    pub normals: Vec<Vec3>,
    /// Triangles as vertex index triples.
    pub triangles: Vec<[u32; 3]>,
}

impl IsoMesh {
    /// Number of vertices.
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Returns true if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Axis-aligned bounds of the vertices, or `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(min, max), &p| (min.min(p), max.max(p))),
        )
    }

    /// Unit normal of triangle `t` (zero for degenerate triangles).
    #[must_use]
    pub fn face_normal(&self, t: usize) -> Vec3 {
        let [a, b, c] = self.triangles[t].map(|v| self.positions[v as usize]);
        (b - a).cross(c - a).normalize_or_zero()
    }

    /// Total surface area.
    #[must_use]
    pub fn area(&self) -> f32 {
        self.triangles
            .iter()
            .map(|tri| {
                let [a, b, c] = tri.map(|v| self.positions[v as usize]);
                0.5 * (b - a).cross(c - a).length()
            })
            .sum()
    }

    /// Counts how many triangles use each undirected edge.
    #[must_use]
    pub fn edge_use_counts(&self) -> HashMap<(u32, u32), u32> {
        let mut counts = HashMap::with_capacity(self.triangles.len() * 3 / 2);
        for &[a, b, c] in &self.triangles {
            for (p, q) in [(a, b), (b, c), (c, a)] {
                *counts.entry((p.min(q), p.max(q))).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Number of edges used by exactly one triangle.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_use_counts().values().filter(|&&n| n == 1).count()
    }

    /// A non-empty mesh in which every edge is shared by exactly two triangles.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        !self.is_empty() && self.edge_use_counts().values().all(|&n| n == 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit tetrahedron with outward winding.
    pub(crate) fn tetrahedron() -> IsoMesh {
        IsoMesh {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z],
            normals: vec![Vec3::ZERO; 4],
            triangles: vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        }
    }

    #[test]
    fn test_tetrahedron_is_closed() {
        let mesh = tetrahedron();
        assert!(mesh.is_closed());
        assert_eq!(mesh.boundary_edge_count(), 0);
        assert_eq!(mesh.bounds(), Some((Vec3::ZERO, Vec3::ONE)));
    }

    #[test]
    fn test_open_mesh_has_boundary() {
        let mut mesh = tetrahedron();
        mesh.triangles.pop();
        assert!(!mesh.is_closed());
        assert_eq!(mesh.boundary_edge_count(), 3);
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = IsoMesh::default();
        assert!(!mesh.is_closed());
        assert_eq!(mesh.bounds(), None);
        assert_eq!(mesh.area(), 0.0);
    }

    #[test]
    fn test_face_normal_and_area() {
        let mesh = tetrahedron();
        assert_eq!(mesh.face_normal(0), Vec3::NEG_Z);
        let expected = 1.5 + 0.5 * 3.0_f32.sqrt();
        assert!((mesh.area() - expected).abs() < 1e-5);
    }
}
