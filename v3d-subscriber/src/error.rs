//! Error types for the subscriber

use thiserror::Error;

/// Reasons a received payload could not be turned into a document
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("payload is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("payload is not JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of the transport underneath the subscriber
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connect to {address} failed: {message}")]
    Connect { address: String, message: String },

    #[error("receive failed: {0}")]
    Receive(String),

    #[error("send failed: {0}")]
    Send(String),

    #[error("publisher disconnected")]
    Disconnected,
}

impl From<TransportError> for v3d_core::Error {
    fn from(e: TransportError) -> Self {
        v3d_core::Error::Transport(e.to_string())
    }
}
