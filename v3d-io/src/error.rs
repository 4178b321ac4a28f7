//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Write error: {message}")]
    WriteError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IoError> for v3d_core::Error {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Io(io) => v3d_core::Error::Io(io),
            other => v3d_core::Error::InvalidData(other.to_string()),
        }
    }
}
