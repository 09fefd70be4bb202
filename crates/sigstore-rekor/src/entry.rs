//! Rekor log entry types and their conversion into bundle entries

use crate::body::EntryBody;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sigstore_types::{
    CanonicalizedBody, CheckpointData, InclusionPromise, InclusionProof, LogId, LogKeyId,
    Sha256Hash, SignedTimestamp, TransparencyLogEntry,
};
use std::collections::HashMap;

/// A log entry from Rekor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// UUID of the entry (the key in the response map)
    #[serde(skip)]
    pub uuid: String,
    /// Body of the entry (base64 encoded canonicalized body)
    pub body: CanonicalizedBody,
    /// Integrated time (Unix timestamp)
    pub integrated_time: i64,
    /// Log ID (hex-encoded SHA-256 of the log's public key)
    #[serde(rename = "logID")]
    pub log_id: String,
    /// Log index
    pub log_index: i64,
    /// Verification data
    #[serde(default)]
    pub verification: Option<Verification>,
}

/// Verification data for a log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    /// Inclusion proof
    #[serde(default)]
    pub inclusion_proof: Option<RekorInclusionProof>,
    /// Signed entry timestamp (SET)
    #[serde(default)]
    pub signed_entry_timestamp: Option<SignedTimestamp>,
}

/// Inclusion proof as returned by the Rekor V1 API.
///
/// Unlike [`sigstore_types::InclusionProof`], hashes are hex strings here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RekorInclusionProof {
    /// Checkpoint (signed tree head)
    pub checkpoint: String,
    /// Hashes in the proof path (hex-encoded in V1 API)
    pub hashes: Vec<String>,
    /// Log index
    pub log_index: i64,
    /// Root hash (hex-encoded in V1 API)
    pub root_hash: String,
    /// Tree size
    pub tree_size: i64,
}

/// Response from creating a log entry (map of UUID to LogEntry)
pub type LogEntryResponse = HashMap<String, LogEntry>;

fn decode_hash(hex: &str) -> Result<Sha256Hash> {
    Sha256Hash::from_hex(hex).map_err(|e| Error::InvalidResponse(format!("bad proof hash: {}", e)))
}

impl RekorInclusionProof {
    fn to_bundle_proof(&self) -> Result<InclusionProof> {
        Ok(InclusionProof {
            log_index: self.log_index,
            root_hash: decode_hash(&self.root_hash)?,
            tree_size: self.tree_size,
            hashes: self
                .hashes
                .iter()
                .map(|h| decode_hash(h))
                .collect::<Result<Vec<_>>>()?,
            checkpoint: CheckpointData {
                envelope: self.checkpoint.clone(),
            },
        })
    }
}

impl LogEntry {
    /// Convert into the entry recorded in a bundle's verification material
    ///
    /// The entry kind and version are read back from the canonicalized body.
    pub fn to_transparency_log_entry(&self) -> Result<TransparencyLogEntry> {
        let body = EntryBody::from_canonicalized(&self.body)?;
        let key_id = hex::decode(&self.log_id)
            .map_err(|e| Error::InvalidResponse(format!("bad log id {}: {}", self.log_id, e)))?;

        let verification = self.verification.as_ref();
        let inclusion_proof = verification
            .and_then(|v| v.inclusion_proof.as_ref())
            .map(|p| p.to_bundle_proof())
            .transpose()?;
        let inclusion_promise = verification
            .and_then(|v| v.signed_entry_timestamp.clone())
            .map(|set| InclusionPromise {
                signed_entry_timestamp: set,
            });

        Ok(TransparencyLogEntry {
            log_index: self.log_index,
            log_id: LogId {
                key_id: LogKeyId::new(key_id),
            },
            kind_version: body.kind_version(),
            integrated_time: self.integrated_time,
            inclusion_promise,
            inclusion_proof,
            canonicalized_body: self.body.clone(),
        })
    }
}
