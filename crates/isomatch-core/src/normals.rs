//! Vertex normals with feature-edge splitting.
//!
//! Faces meeting at an edge whose dihedral angle exceeds the feature angle are
//! not smoothed together: every vertex on such an edge is duplicated once per
//! smooth region around it, and each copy gets the average normal of its own
//! region only.

use std::collections::HashMap;

use glam::Vec3;

use crate::mesh::IsoMesh;

/// Options for [`compute_normals`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalsOptions {
    /// Dihedral angle in degrees above which an edge is sharp.
    pub feature_angle: f32,
}

impl Default for NormalsOptions {
    fn default() -> Self {
        Self {
            feature_angle: 60.0,
        }
    }
}

impl NormalsOptions {
    /// Default options with the given feature angle in degrees.
    #[must_use]
    pub fn with_feature_angle(feature_angle: f32) -> Self {
        Self { feature_angle }
    }
}

/// Recomputes the normals of `mesh`, splitting vertices on sharp edges.
#[must_use]
pub fn compute_normals(mesh: IsoMesh, options: NormalsOptions) -> IsoMesh {
    let IsoMesh {
        mut positions,
        triangles,
        ..
    } = mesh;
    let face_normals: Vec<Vec3> = triangles
        .iter()
        .map(|tri| {
            let [a, b, c] = tri.map(|v| positions[v as usize]);
            (b - a).cross(c - a).normalize_or_zero()
        })
        .collect();

    let mut edge_faces: HashMap<(u32, u32), Vec<u32>> = HashMap::new();
    let mut vertex_faces: Vec<Vec<u32>> = vec![Vec::new(); positions.len()];
    for (f, &[a, b, c]) in triangles.iter().enumerate() {
        let f = u32::try_from(f).unwrap_or(u32::MAX);
        for (p, q) in [(a, b), (b, c), (c, a)] {
            edge_faces.entry((p.min(q), p.max(q))).or_default().push(f);
        }
        for v in [a, b, c] {
            vertex_faces[v as usize].push(f);
        }
    }

    let cos_feature = options.feature_angle.to_radians().cos();
    // Faces that may be smoothed together across edge (p, q).
    let smooth_pair = |p: u32, q: u32| -> Option<(u32, u32)> {
        match edge_faces.get(&(p.min(q), p.max(q)))?.as_slice() {
            &[f, g] => {
                let dot = face_normals[f as usize].dot(face_normals[g as usize]);
                (dot >= cos_feature).then_some((f, g))
            }
            _ => None,
        }
    };

    let mut normals = vec![Vec3::ZERO; positions.len()];
    let mut new_triangles = triangles.clone();
    for v in 0..positions.len() {
        let faces = &vertex_faces[v];
        if faces.is_empty() {
            continue;
        }
        let v32 = u32::try_from(v).unwrap_or(u32::MAX);

        // Union-find over the faces around v.
        let mut parent: Vec<usize> = (0..faces.len()).collect();
        let local = |f: u32| faces.iter().position(|&g| g == f);
        for &f in faces {
            for &w in &triangles[f as usize] {
                if w == v32 {
                    continue;
                }
                if let Some((a, b)) = smooth_pair(v32, w) {
                    if let (Some(la), Some(lb)) = (local(a), local(b)) {
                        let (ra, rb) = (find(&mut parent, la), find(&mut parent, lb));
                        if ra != rb {
                            parent[ra] = rb;
                        }
                    }
                }
            }
        }

        // One output vertex per region; the first region keeps index v.
        let mut region_vertex: HashMap<usize, u32> = HashMap::new();
        for (lf, &f) in faces.iter().enumerate() {
            let root = find(&mut parent, lf);
            let out = *region_vertex.entry(root).or_insert_with(|| {
                if root_is_first(&mut parent, root) {
                    v32
                } else {
                    let id = u32::try_from(positions.len()).unwrap_or(u32::MAX);
                    positions.push(positions[v]);
                    normals.push(Vec3::ZERO);
                    id
                }
            });
            normals[out as usize] += face_normals[f as usize];
            for corner in &mut new_triangles[f as usize] {
                if *corner == v32 {
                    *corner = out;
                }
            }
        }
    }

    for n in &mut normals {
        *n = n.normalize_or_zero();
    }

    IsoMesh {
        positions,
        normals,
        triangles: new_triangles,
    }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Whether `root` is the region containing the first face around the vertex.
fn root_is_first(parent: &mut [usize], root: usize) -> bool {
    find(parent, 0) == root
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Axis-aligned unit cube, two outward-wound triangles per face.
    fn cube() -> IsoMesh {
        let positions = (0..8)
            .map(|c| Vec3::new((c & 1) as f32, ((c >> 1) & 1) as f32, ((c >> 2) & 1) as f32))
            .collect();
        let quads: [[u32; 4]; 6] = [
            [0, 2, 3, 1], // -z
            [4, 5, 7, 6], // +z
            [0, 1, 5, 4], // -y
            [2, 6, 7, 3], // +y
            [0, 4, 6, 2], // -x
            [1, 3, 7, 5], // +x
        ];
        let triangles = quads
            .iter()
            .flat_map(|&[a, b, c, d]| [[a, b, c], [a, c, d]])
            .collect();
        IsoMesh {
            positions,
            normals: vec![Vec3::ZERO; 8],
            triangles,
        }
    }

    #[test]
    fn test_cube_corners_split_three_ways() {
        let mesh = compute_normals(cube(), NormalsOptions::default());
        // Every corner touches three faces separated by 90 degree edges.
        assert_eq!(mesh.num_vertices(), 24);
        for (t, tri) in mesh.triangles.iter().enumerate() {
            let face = mesh.face_normal(t);
            for &v in tri {
                assert!((mesh.normals[v as usize] - face).length() < 1e-5);
            }
        }
    }

    #[test]
    fn test_wide_feature_angle_smooths_everything() {
        let mesh = compute_normals(cube(), NormalsOptions::with_feature_angle(120.0));
        assert_eq!(mesh.num_vertices(), 8);
        let n = mesh.normals[7];
        assert!((n - Vec3::ONE.normalize()).length() < 0.2, "{n:?}");
    }

    #[test]
    fn test_smooth_surface_is_not_split() {
        // Shallow tent: two triangles meeting at 20 degrees.
        let mesh = IsoMesh {
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(-1.0, 0.5, -0.18),
                Vec3::new(1.0, 0.5, -0.18),
            ],
            normals: Vec::new(),
            triangles: vec![[0, 1, 2], [1, 0, 3]],
        };
        let out = compute_normals(mesh, NormalsOptions::default());
        assert_eq!(out.num_vertices(), 4);
        assert!(out.normals[0].dot(Vec3::Z).abs() > 0.99);
    }
}
