//! Error types for sigstore-types

use thiserror::Error;

/// Errors that can occur in sigstore-types
#[derive(Error, Debug)]
pub enum Error {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid base64 or hex payload
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Invalid media type
    #[error("Invalid media type: {0}")]
    InvalidMediaType(String),

    /// Invalid hash algorithm
    #[error("Invalid hash algorithm: {0}")]
    InvalidHashAlgorithm(String),

    /// Structurally valid but inconsistent content
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for sigstore-types operations
pub type Result<T> = std::result::Result<T, Error>;
