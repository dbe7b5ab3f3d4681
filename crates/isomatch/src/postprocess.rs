//! Turns raw iso-surfaces into renderable actors.

use isomatch_core::strip::DEFAULT_MAX_STRIP_LENGTH;
use isomatch_core::{compute_normals, strip_mesh, IsoMesh, NormalsOptions, StripMesh, SurfaceMaterial};
use isomatch_render::SurfaceActor;

/// Normals, stripping and a fixed material, applied to any iso-surface.
///
/// Each pipeline owns its own post-processor. Processing is a pure function
/// of the input mesh.
#[derive(Debug, Clone)]
pub struct SurfacePostProcessor {
    normals: NormalsOptions,
    max_strip_length: usize,
    material: SurfaceMaterial,
}

impl SurfacePostProcessor {
    /// Creates a post-processor that applies `material` with scalar coloring off.
    pub fn new(material: SurfaceMaterial) -> Self {
        Self {
            normals: NormalsOptions::default(),
            max_strip_length: DEFAULT_MAX_STRIP_LENGTH,
            material: SurfaceMaterial {
                scalar_visibility: false,
                ..material
            },
        }
    }

    /// Overrides the normal generation settings.
    #[must_use]
    pub fn with_normals(mut self, normals: NormalsOptions) -> Self {
        self.normals = normals;
        self
    }

    /// Overrides the maximum number of triangles per strip.
    #[must_use]
    pub fn with_max_strip_length(mut self, max_strip_length: usize) -> Self {
        self.max_strip_length = max_strip_length.max(1);
        self
    }

    /// The material applied to every processed surface.
    pub fn material(&self) -> SurfaceMaterial {
        self.material
    }

    /// Recomputes normals with feature-angle splitting and strips the result.
    pub fn process(&self, mesh: IsoMesh) -> StripMesh {
        let mesh = compute_normals(mesh, self.normals);
        strip_mesh(mesh, self.max_strip_length)
    }

    /// Processes `mesh` into a named actor carrying the fixed material.
    pub fn actor(&self, name: &str, mesh: IsoMesh) -> SurfaceActor {
        let strips = self.process(mesh);
        log::info!(
            "{name}: {} triangles in {} strips",
            strips.num_triangles(),
            strips.num_strips()
        );
        SurfaceActor::new(name, strips, self.material)
    }
}
