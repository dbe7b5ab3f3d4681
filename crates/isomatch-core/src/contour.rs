//! Iso-surface extraction from sampled volumes.

use crate::error::Result;
use crate::marching_cubes::marching_cubes;
use crate::mesh::IsoMesh;
use crate::volume::ImageVolume;

/// Extracts the surface where `volume` equals `level`, in world coordinates.
pub fn contour(volume: &ImageVolume, level: f32) -> Result<IsoMesh> {
    let dims = volume.dimensions().map(|d| u32::try_from(d).unwrap_or(u32::MAX));
    let mcm = marching_cubes(volume.values(), level, dims)?;

    let origin = volume.origin();
    let spacing = volume.spacing();
    let positions = mcm.vertices.iter().map(|&v| origin + v * spacing).collect();
    // Grid-space normals scale by the inverse spacing.
    let normals = mcm
        .normals
        .iter()
        .map(|&n| (n / spacing).normalize_or_zero())
        .collect();
    let triangles = mcm
        .indices
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .collect();

    Ok(IsoMesh {
        positions,
        normals,
        triangles,
    })
}

/// Contours a volume at a fixed level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourFilter {
    value: f32,
}

impl ContourFilter {
    /// Creates a filter for the iso-surface at `value`.
    #[must_use]
    pub fn new(value: f32) -> Self {
        Self { value }
    }

    /// The contour level.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Extracts the iso-surface of `volume` at the contour level.
    pub fn execute(&self, volume: &ImageVolume) -> Result<IsoMesh> {
        let mesh = contour(volume, self.value)?;
        log::debug!(
            "contour at {}: {} vertices, {} triangles",
            self.value,
            mesh.num_vertices(),
            mesh.num_triangles()
        );
        Ok(mesh)
    }
}
