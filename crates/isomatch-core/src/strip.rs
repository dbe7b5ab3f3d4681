//! Greedy conversion of triangle lists into triangle strips.

use std::collections::HashMap;

use glam::Vec3;

use crate::mesh::IsoMesh;

/// Index that separates strips in a flattened index buffer.
pub const STRIP_RESTART_INDEX: u32 = u32::MAX;

/// Default cap on triangles per strip.
pub const DEFAULT_MAX_STRIP_LENGTH: usize = 1000;

/// A mesh stored as triangle strips.
///
/// Strip `[v0, v1, v2, v3, ...]` encodes triangles `(v0, v1, v2)`,
/// `(v2, v1, v3)`, `(v2, v3, v4)`, ... with winding alternating so that every
/// triangle keeps its original orientation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StripMesh {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Per-vertex normals.
    pub normals: Vec<Vec3>,
    /// Vertex index sequence of each strip.
    pub strips: Vec<Vec<u32>>,
}

impl StripMesh {
    /// Number of strips.
    #[must_use]
    pub fn num_strips(&self) -> usize {
        self.strips.len()
    }

    /// Number of triangles encoded by all strips.
    #[must_use]
    pub fn num_triangles(&self) -> usize {
        self.strips.iter().map(|s| s.len().saturating_sub(2)).sum()
    }

    /// Returns true if there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_triangles() == 0
    }

    /// Decodes the strips back into oriented triangles.
    #[must_use]
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        let mut out = Vec::with_capacity(self.num_triangles());
        for strip in &self.strips {
            for (k, w) in strip.windows(3).enumerate() {
                if k % 2 == 0 {
                    out.push([w[0], w[1], w[2]]);
                } else {
                    out.push([w[1], w[0], w[2]]);
                }
            }
        }
        out
    }

    /// Flattens all strips into one index buffer separated by
    /// [`STRIP_RESTART_INDEX`].
    #[must_use]
    pub fn index_buffer(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.strips.iter().map(|s| s.len() + 1).sum());
        for (i, strip) in self.strips.iter().enumerate() {
            if i > 0 {
                out.push(STRIP_RESTART_INDEX);
            }
            out.extend_from_slice(strip);
        }
        out
    }
}

/// Converts `mesh` into strips of at most `max_length` triangles each.
#[must_use]
pub fn strip_mesh(mesh: IsoMesh, max_length: usize) -> StripMesh {
    let IsoMesh {
        positions,
        normals,
        triangles,
    } = mesh;
    let max_length = max_length.max(1);

    let mut edge_faces: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
    for (f, &[a, b, c]) in triangles.iter().enumerate() {
        for (p, q) in [(a, b), (b, c), (c, a)] {
            edge_faces.entry((p.min(q), p.max(q))).or_default().push(f);
        }
    }

    let mut used = vec![false; triangles.len()];
    let next_face = |used: &[bool], p: u32, q: u32| -> Option<usize> {
        edge_faces
            .get(&(p.min(q), p.max(q)))?
            .iter()
            .copied()
            .find(|&g| !used[g])
    };

    let mut strips = Vec::new();
    for start in 0..triangles.len() {
        if used[start] {
            continue;
        }
        used[start] = true;

        // Rotate the seed so the strip leaves through an edge with a free neighbour.
        let [a, b, c] = triangles[start];
        let seed = [[a, b, c], [b, c, a], [c, a, b]]
            .into_iter()
            .find(|&[_, q, r]| next_face(&used, q, r).is_some())
            .unwrap_or([a, b, c]);
        let mut strip = seed.to_vec();

        while strip.len() - 2 < max_length {
            let n = strip.len();
            let (p, q) = (strip[n - 2], strip[n - 1]);
            let Some(g) = next_face(&used, p, q) else {
                break;
            };
            let Some(&r) = triangles[g].iter().find(|&&v| v != p && v != q) else {
                break;
            };
            used[g] = true;
            strip.push(r);
        }
        strips.push(strip);
    }

    log::debug!(
        "stripped {} triangles into {} strips",
        triangles.len(),
        strips.len()
    );
    StripMesh {
        positions,
        normals,
        strips,
    }
}
