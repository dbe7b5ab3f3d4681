//! Core geometry for isomatch.
//!
//! This crate provides everything needed to turn an implicit scalar field into
//! a renderable surface, without touching the GPU:
//! - [`ScalarField`] with two implementations: the closed-form [`Quadric`] and
//!   the buffer-backed [`ImplicitVolume`]
//! - [`LatticeSpec`] and [`ImageVolume`] for explicitly sampled values
//! - [`SampleFunction`] and [`contour`] for iso-surface extraction
//! - [`compute_normals`] and [`strip_mesh`] for surface post-processing
//! - [`compare`] metrics for measuring how far two reconstructions disagree

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Grid indices are converted to float coordinates all over the place
#![allow(clippy::cast_precision_loss)]

pub mod compare;
pub mod contour;
pub mod error;
pub mod field;
pub mod lattice;
pub mod marching_cubes;
pub mod material;
pub mod mesh;
pub mod normals;
pub mod options;
pub mod quadric;
pub mod sample;
pub mod strip;
pub mod volume;

pub use contour::{contour, ContourFilter};
pub use error::{IsomatchError, Result};
pub use field::ScalarField;
pub use lattice::{AxisOrder, LatticeSpec, Registration};
pub use marching_cubes::{marching_cubes, McmMesh};
pub use material::SurfaceMaterial;
pub use mesh::IsoMesh;
pub use normals::{compute_normals, NormalsOptions};
pub use options::DemoConfig;
pub use quadric::Quadric;
pub use sample::SampleFunction;
pub use strip::{strip_mesh, StripMesh, STRIP_RESTART_INDEX};
pub use volume::{ImageVolume, ImplicitVolume};

// Re-export glam types for convenience
pub use glam::{UVec3, Vec3};
