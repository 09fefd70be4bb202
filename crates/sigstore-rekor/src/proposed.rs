//! Proposed entries submitted to Rekor
//!
//! Entry types are not registered globally. Callers hand a
//! [`ProposedEntryFactory`] to the submitter, and the factory decides how
//! artifact properties turn into a request body.

use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use sigstore_types::DsseEnvelope;
use std::fmt;

const API_VERSION_0_0_1: &str = "0.0.1";

/// Entry type to propose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Detached signature over an artifact digest
    HashedRekord,
    /// DSSE envelope
    Dsse,
}

impl EntryKind {
    /// Name used in the `kind` field
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::HashedRekord => "hashedrekord",
            EntryKind::Dsse => "dsse",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format of the verification material in a hashedrekord entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PkiFormat {
    /// PEM certificate or PEM public key
    X509,
}

/// Everything an entry type may need to describe a signed artifact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactProperties {
    /// Serialized artifact (the DSSE envelope JSON for DSSE entries)
    pub artifact_bytes: Vec<u8>,
    /// Artifact digest as `<algorithm>:<hex>`
    pub artifact_hash: String,
    /// Detached signature
    pub signature_bytes: Vec<u8>,
    /// PEM encoded keys or certificates that verify the signature
    pub public_key_bytes: Vec<Vec<u8>>,
    /// Format of `public_key_bytes`
    pub pki_format: Option<PkiFormat>,
}

/// DSSE entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsseEntry {
    pub api_version: String,
    pub kind: String,
    pub spec: DsseEntrySpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsseEntrySpec {
    pub proposed_content: DsseProposedContent,
}

/// Envelope and verifiers of a DSSE entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DsseProposedContent {
    /// Envelope as a JSON string
    pub envelope: String,
    /// Base64 encoded PEM verifiers
    pub verifiers: Vec<String>,
}

/// HashedRekord entry for creating new log entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashedRekord {
    /// API version
    pub api_version: String,
    /// Entry kind
    pub kind: String,
    /// Spec containing the actual data
    pub spec: HashedRekordSpec,
}

/// HashedRekord specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashedRekordSpec {
    /// Data containing the hash
    pub data: HashedRekordData,
    /// Signature
    pub signature: HashedRekordSignature,
}

/// Data portion of HashedRekord
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashedRekordData {
    /// Hash of the artifact
    pub hash: HashedRekordHash,
}

/// Hash in HashedRekord
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashedRekordHash {
    /// Lowercase algorithm name, e.g. `sha256`
    pub algorithm: String,
    /// Hex digest
    pub value: String,
}

/// Signature in HashedRekord
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashedRekordSignature {
    /// Base64 signature
    pub content: String,
    /// Public key
    pub public_key: HashedRekordPublicKey,
}

/// Public key in HashedRekord
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashedRekordPublicKey {
    /// Base64 encoded PEM certificate or public key
    pub content: String,
}

/// A request body for `POST /api/v1/log/entries`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProposedEntry {
    /// hashedrekord entry
    HashedRekord(HashedRekord),
    /// dsse entry
    Dsse(DsseEntry),
}

impl ProposedEntry {
    /// The `kind` field of the entry
    pub fn kind(&self) -> &str {
        match self {
            ProposedEntry::HashedRekord(e) => &e.kind,
            ProposedEntry::Dsse(e) => &e.kind,
        }
    }

    /// The `apiVersion` field of the entry
    pub fn api_version(&self) -> &str {
        match self {
            ProposedEntry::HashedRekord(e) => &e.api_version,
            ProposedEntry::Dsse(e) => &e.api_version,
        }
    }
}

/// Builds proposed entries from artifact properties
pub trait ProposedEntryFactory: Send + Sync {
    /// Create the entry of `kind` describing `properties`
    fn create_proposed_entry(
        &self,
        kind: EntryKind,
        properties: &ArtifactProperties,
    ) -> Result<ProposedEntry>;
}

/// Builds v0.0.1 hashedrekord and dsse entries
#[derive(Debug, Clone, Copy, Default)]
pub struct RekorV1EntryFactory;

impl RekorV1EntryFactory {
    fn hashed_rekord(properties: &ArtifactProperties) -> Result<HashedRekord> {
        if properties.pki_format != Some(PkiFormat::X509) {
            return Err(Error::InvalidEntry(
                "hashedrekord only supports x509 keys".to_string(),
            ));
        }
        if properties.signature_bytes.is_empty() {
            return Err(Error::InvalidEntry("signature is empty".to_string()));
        }
        let [public_key] = properties.public_key_bytes.as_slice() else {
            return Err(Error::InvalidEntry(
                "hashedrekord takes exactly one public key".to_string(),
            ));
        };

        // Bare hex digests are SHA-256
        let (algorithm, value) = properties
            .artifact_hash
            .split_once(':')
            .unwrap_or(("sha256", properties.artifact_hash.as_str()));
        if value.is_empty() || hex::decode(value).is_err() {
            return Err(Error::InvalidEntry(format!(
                "artifact hash is not hex: {}",
                properties.artifact_hash
            )));
        }

        Ok(HashedRekord {
            api_version: API_VERSION_0_0_1.to_string(),
            kind: EntryKind::HashedRekord.as_str().to_string(),
            spec: HashedRekordSpec {
                data: HashedRekordData {
                    hash: HashedRekordHash {
                        algorithm: algorithm.to_string(),
                        value: value.to_lowercase(),
                    },
                },
                signature: HashedRekordSignature {
                    content: STANDARD.encode(&properties.signature_bytes),
                    public_key: HashedRekordPublicKey {
                        content: STANDARD.encode(public_key),
                    },
                },
            },
        })
    }

    fn dsse(properties: &ArtifactProperties) -> Result<DsseEntry> {
        // Rekor rejects envelopes it cannot parse, so fail before the round trip
        let envelope: DsseEnvelope = serde_json::from_slice(&properties.artifact_bytes)
            .map_err(|e| Error::InvalidEntry(format!("artifact is not a DSSE envelope: {}", e)))?;
        if envelope.signatures.is_empty() {
            return Err(Error::InvalidEntry("DSSE envelope has no signatures".to_string()));
        }
        if properties.public_key_bytes.is_empty() {
            return Err(Error::InvalidEntry("no verifiers supplied".to_string()));
        }

        Ok(DsseEntry {
            api_version: API_VERSION_0_0_1.to_string(),
            kind: EntryKind::Dsse.as_str().to_string(),
            spec: DsseEntrySpec {
                proposed_content: DsseProposedContent {
                    envelope: String::from_utf8_lossy(&properties.artifact_bytes).into_owned(),
                    verifiers: properties
                        .public_key_bytes
                        .iter()
                        .map(|k| STANDARD.encode(k))
                        .collect(),
                },
            },
        })
    }
}

impl ProposedEntryFactory for RekorV1EntryFactory {
    fn create_proposed_entry(
        &self,
        kind: EntryKind,
        properties: &ArtifactProperties,
    ) -> Result<ProposedEntry> {
        match kind {
            EntryKind::HashedRekord => Self::hashed_rekord(properties).map(ProposedEntry::HashedRekord),
            EntryKind::Dsse => Self::dsse(properties).map(ProposedEntry::Dsse),
        }
    }
}
