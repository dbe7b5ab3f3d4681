//! Rendering backend for isomatch.
//!
//! Scenes, cameras and viewports are plain data and can be built and tested
//! without a GPU. [`RenderEngine`] uploads scenes to wgpu and draws each one
//! into its own viewport of a shared window surface.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// Pixel sizes are converted to float coordinates for viewports
#![allow(clippy::cast_precision_loss)]

pub mod axes;
pub mod camera;
pub mod engine;
pub mod error;
pub mod scene;

pub use axes::axes_actor;
pub use camera::Camera;
pub use engine::{RenderEngine, SceneResources};
pub use error::{RenderError, RenderResult};
pub use scene::{union_bounds, CameraHandle, LineActor, Scene, SurfaceActor, Viewport};
