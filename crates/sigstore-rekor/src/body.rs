//! Canonicalized entry bodies as stored by Rekor

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sigstore_types::{CanonicalizedBody, KindVersion};

/// The envelope shared by every Rekor entry body
///
/// Only the type header is interpreted; the kind-specific `spec` is kept as
/// raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryBody {
    /// Entry type version, e.g. `0.0.1`
    pub api_version: String,
    /// Entry type, e.g. `hashedrekord`
    pub kind: String,
    /// Kind-specific content
    #[serde(default)]
    pub spec: serde_json::Value,
}

impl EntryBody {
    /// Decode the body of a log entry
    pub fn from_canonicalized(body: &CanonicalizedBody) -> Result<Self> {
        serde_json::from_slice(body.as_bytes())
            .map_err(|e| Error::InvalidResponse(format!("undecodable entry body: {}", e)))
    }

    /// The kind and version pair recorded in bundles
    pub fn kind_version(&self) -> KindVersion {
        KindVersion {
            kind: self.kind.clone(),
            version: self.api_version.clone(),
        }
    }
}
