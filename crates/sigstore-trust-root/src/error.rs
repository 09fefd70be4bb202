//! Error types for trusted root operations

use thiserror::Error;

/// Errors that can occur during trusted root operations
#[derive(Debug, Error)]
pub enum Error {
    /// JSON parsing error
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a trusted root from disk failed
    #[error("failed to read trusted root: {0}")]
    Io(#[from] std::io::Error),

    /// Certificate parsing error
    #[error("failed to parse certificate: {0}")]
    Certificate(String),

    /// Time parsing error
    #[error("failed to parse time: {0}")]
    TimeParse(String),

    /// Unsupported media type
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Two entries of one category derive the same identifier
    #[error("duplicate {category} entry with ID {id}")]
    DuplicateKey {
        /// Entity category, e.g. "transparency log"
        category: &'static str,
        /// The colliding identifier
        id: String,
    },

    /// Structurally valid but semantically invalid content
    #[error("malformed trusted root: {0}")]
    MalformedTrustRoot(String),

    /// Key details name no implementable algorithm
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Key material does not fit its declared algorithm
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// No matching key found
    #[error("no matching key found for ID: {0}")]
    KeyNotFound(String),

    /// Cryptographic failure, including signatures that do not verify
    #[error(transparent)]
    Crypto(#[from] sigstore_crypto::Error),
}

impl Error {
    /// The input bytes could not be decoded at all
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            Error::Json(_) | Error::Io(_) | Error::Certificate(_) | Error::TimeParse(_)
        )
    }

    /// The input decoded but describes an invalid trusted root
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedMediaType(_) | Error::DuplicateKey { .. } | Error::MalformedTrustRoot(_)
        )
    }
}

/// Result type for trusted root operations
pub type Result<T> = std::result::Result<T, Error>;
