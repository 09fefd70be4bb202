//! Error types for sigstore-rekor

use thiserror::Error;

/// Errors that can occur in Rekor operations
#[derive(Error, Debug)]
pub enum Error {
    /// A message signature was submitted without a signing certificate
    #[error("hashedrekord requires X.509 certificate")]
    MissingCertificate,

    /// The bundle carries neither a message signature nor a DSSE envelope
    #[error("unable to find signature in bundle")]
    NoSignaturePresent,

    /// A message signature was submitted without the artifact digest
    #[error("message signature has no message digest")]
    MissingMessageDigest,

    /// The proposed entry could not be built from the artifact properties
    #[error("invalid proposed entry: {0}")]
    InvalidEntry(String),

    /// The submission client could not be configured
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(String),

    /// API error
    #[error("API error: {0}")]
    Api(String),

    /// The log answered, but the answer could not be used
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The caller cancelled the submission or its deadline elapsed
    #[error("submission cancelled: {0}")]
    Cancelled(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error came from talking to the log rather than from the input
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::Api(_) | Error::InvalidResponse(_)
        )
    }
}

/// Result type for Rekor operations
pub type Result<T> = std::result::Result<T, Error>;
