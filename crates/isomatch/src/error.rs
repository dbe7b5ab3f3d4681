//! Application error types.

use isomatch_core::IsomatchError;
use isomatch_render::RenderError;
use thiserror::Error;

/// Errors that can end the demo.
#[derive(Error, Debug)]
pub enum AppError {
    /// Building a surface failed.
    #[error(transparent)]
    Geometry(#[from] IsomatchError),

    /// Setting up or driving the GPU failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The window system event loop failed.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// The window could not be created.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
}

/// A specialized Result type for the demo.
pub type Result<T> = std::result::Result<T, AppError>;
