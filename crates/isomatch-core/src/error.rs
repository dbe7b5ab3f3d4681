//! Error types for isomatch.

use thiserror::Error;

/// The main error type for isomatch geometry operations.
#[derive(Error, Debug)]
pub enum IsomatchError {
    /// The lattice specification cannot produce a usable grid.
    #[error("invalid lattice: {0}")]
    InvalidLattice(String),

    /// The volumetric buffer is malformed.
    #[error("invalid volume: {0}")]
    InvalidVolume(String),

    /// The sampler was configured with unusable bounds or dimensions.
    #[error("invalid sampling: {0}")]
    InvalidSampling(String),

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for isomatch operations.
pub type Result<T> = std::result::Result<T, IsomatchError>;
