//! Error types for v3d

use thiserror::Error;

/// Main error type for v3d operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Visualization error: {0}")]
    Visualization(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type alias for v3d operations
pub type Result<T> = std::result::Result<T, Error>;
