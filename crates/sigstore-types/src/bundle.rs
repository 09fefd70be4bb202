//! Sigstore bundle format types
//!
//! The bundle is the artifact produced by signing and consumed by verification.
//! It carries the signature, the verification material (certificate or public
//! key) and the transparency log entries that vouch for it.

use crate::dsse::DsseEnvelope;
use crate::encoding::{
    string_i64, CanonicalizedBody, DerCertificate, DigestBytes, LogKeyId, Sha256Hash,
    SignatureBytes, SignedTimestamp, TimestampToken,
};
use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Deserialize a field that may be null as the default value
fn deserialize_null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let opt = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// Sigstore bundle media types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    /// Bundle format version 0.1
    Bundle0_1,
    /// Bundle format version 0.2
    Bundle0_2,
    /// Bundle format version 0.3
    Bundle0_3,
}

impl MediaType {
    /// Get the media type string
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Bundle0_1 => "application/vnd.dev.sigstore.bundle+json;version=0.1",
            MediaType::Bundle0_2 => "application/vnd.dev.sigstore.bundle+json;version=0.2",
            MediaType::Bundle0_3 => "application/vnd.dev.sigstore.bundle.v0.3+json",
        }
    }
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "application/vnd.dev.sigstore.bundle+json;version=0.1" => Ok(MediaType::Bundle0_1),
            "application/vnd.dev.sigstore.bundle+json;version=0.2" => Ok(MediaType::Bundle0_2),
            "application/vnd.dev.sigstore.bundle.v0.3+json"
            | "application/vnd.dev.sigstore.bundle+json;version=0.3" => Ok(MediaType::Bundle0_3),
            _ => Err(Error::InvalidMediaType(s.to_string())),
        }
    }
}

/// A Sigstore bundle
///
/// `content` is `None` only for bundles that have not been signed yet; a
/// parsed bundle never carries both signature kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Media type identifying the bundle version
    pub media_type: String,
    /// Verification material (certificate chain or public key)
    pub verification_material: VerificationMaterial,
    /// The signature content (message signature or DSSE envelope)
    #[serde(flatten)]
    pub content: Option<SignatureContent>,
}

impl Bundle {
    /// Create a v0.3 bundle
    pub fn new(verification_material: VerificationMaterial, content: SignatureContent) -> Self {
        Self {
            media_type: MediaType::Bundle0_3.as_str().to_string(),
            verification_material,
            content: Some(content),
        }
    }

    /// Parse a bundle from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::Json)
    }

    /// Serialize the bundle to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::Json)
    }

    /// Serialize the bundle to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Error::Json)
    }

    /// Get the bundle version from the media type
    pub fn version(&self) -> Result<MediaType> {
        MediaType::from_str(&self.media_type)
    }

    /// The message signature, if this bundle carries one
    pub fn message_signature(&self) -> Option<&MessageSignature> {
        match &self.content {
            Some(SignatureContent::MessageSignature(sig)) => Some(sig),
            _ => None,
        }
    }

    /// The DSSE envelope, if this bundle carries one
    pub fn dsse_envelope(&self) -> Option<&DsseEnvelope> {
        match &self.content {
            Some(SignatureContent::DsseEnvelope(env)) => Some(env),
            _ => None,
        }
    }

    /// Get the signing certificate if present
    pub fn signing_certificate(&self) -> Option<&DerCertificate> {
        match &self.verification_material.content {
            VerificationMaterialContent::Certificate(cert) => Some(&cert.raw_bytes),
            VerificationMaterialContent::X509CertificateChain { certificates } => {
                certificates.first().map(|c| &c.raw_bytes)
            }
            VerificationMaterialContent::PublicKey { .. } => None,
        }
    }

    /// Transparency log entries recorded so far
    pub fn tlog_entries(&self) -> &[TransparencyLogEntry] {
        &self.verification_material.tlog_entries
    }

    /// Append a transparency log entry, keeping entries from earlier submissions
    pub fn add_tlog_entry(&mut self, entry: TransparencyLogEntry) {
        self.verification_material.tlog_entries.push(entry);
    }
}

/// The signature content (either a message signature or DSSE envelope)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignatureContent {
    /// A simple message signature
    MessageSignature(MessageSignature),
    /// A DSSE envelope
    DsseEnvelope(DsseEnvelope),
}

/// A simple message signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSignature {
    /// Digest of the signed artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_digest: Option<MessageDigest>,
    /// The signature bytes
    pub signature: SignatureBytes,
}

/// Message digest with algorithm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDigest {
    /// Hash algorithm
    pub algorithm: HashAlgorithm,
    /// Digest bytes
    pub digest: DigestBytes,
}

impl MessageDigest {
    /// Render as `<algorithm>:<hex digest>`, e.g. `sha256:e3b0...`
    pub fn to_prefixed_hex(&self) -> String {
        format!(
            "{}:{}",
            self.algorithm.rekor_name(),
            hex::encode(self.digest.as_bytes())
        )
    }
}

/// Verification material containing certificate/key and log entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMaterial {
    /// Certificate, certificate chain, or public key
    #[serde(flatten)]
    pub content: VerificationMaterialContent,
    /// Transparency log entries
    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub tlog_entries: Vec<TransparencyLogEntry>,
    /// RFC 3161 timestamp verification data
    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub timestamp_verification_data: TimestampVerificationData,
}

impl VerificationMaterial {
    /// Material holding a single signing certificate
    pub fn with_certificate(cert: DerCertificate) -> Self {
        Self {
            content: VerificationMaterialContent::Certificate(CertificateContent {
                raw_bytes: cert,
            }),
            tlog_entries: Vec::new(),
            timestamp_verification_data: TimestampVerificationData::default(),
        }
    }

    /// Material identifying a public key by hint
    pub fn with_public_key_hint(hint: impl Into<String>) -> Self {
        Self {
            content: VerificationMaterialContent::PublicKey { hint: hint.into() },
            tlog_entries: Vec::new(),
            timestamp_verification_data: TimestampVerificationData::default(),
        }
    }
}

/// The verification material content type
///
/// The JSON field name selects the variant: `certificate`,
/// `x509CertificateChain` or `publicKey`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerificationMaterialContent {
    /// Single certificate (v0.3 format)
    Certificate(CertificateContent),
    /// Certificate chain (v0.1/v0.2 format)
    X509CertificateChain {
        /// Chain of certificates, leaf first
        certificates: Vec<X509Certificate>,
    },
    /// Public key identified out of band
    PublicKey {
        /// Public key hint
        #[serde(default)]
        hint: String,
    },
}

/// Certificate content for v0.3 bundles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateContent {
    /// DER-encoded certificate
    pub raw_bytes: DerCertificate,
}

/// X.509 certificate in the chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct X509Certificate {
    /// DER-encoded certificate
    pub raw_bytes: DerCertificate,
}

/// A transparency log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransparencyLogEntry {
    /// Log index
    #[serde(with = "string_i64")]
    pub log_index: i64,
    /// Log ID
    pub log_id: LogId,
    /// Kind and version of the entry
    pub kind_version: KindVersion,
    /// Integrated time (Unix seconds)
    #[serde(default, with = "string_i64", skip_serializing_if = "is_zero")]
    pub integrated_time: i64,
    /// Inclusion promise (Signed Entry Timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion_promise: Option<InclusionPromise>,
    /// Inclusion proof
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion_proof: Option<InclusionProof>,
    /// Canonicalized body
    pub canonicalized_body: CanonicalizedBody,
}

/// Log identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogId {
    /// Key ID (SHA-256 of the log's public key)
    pub key_id: LogKeyId,
}

/// Entry kind and version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindVersion {
    /// Entry kind (e.g., "hashedrekord")
    pub kind: String,
    /// Entry version (e.g., "0.0.1")
    pub version: String,
}

/// Inclusion promise (Signed Entry Timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InclusionPromise {
    /// Signed entry timestamp
    pub signed_entry_timestamp: SignedTimestamp,
}

/// Inclusion proof in the Merkle tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InclusionProof {
    /// Index of the entry in the log
    #[serde(with = "string_i64")]
    pub log_index: i64,
    /// Root hash of the tree
    pub root_hash: Sha256Hash,
    /// Tree size at time of proof
    #[serde(with = "string_i64")]
    pub tree_size: i64,
    /// Hashes in the inclusion proof path
    #[serde(default)]
    pub hashes: Vec<Sha256Hash>,
    /// Checkpoint (signed tree head)
    #[serde(default, skip_serializing_if = "CheckpointData::is_empty")]
    pub checkpoint: CheckpointData,
}

/// Checkpoint data in inclusion proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointData {
    /// Text representation of the checkpoint
    #[serde(default)]
    pub envelope: String,
}

impl CheckpointData {
    /// Check if checkpoint data is empty
    pub fn is_empty(&self) -> bool {
        self.envelope.is_empty()
    }
}

/// RFC 3161 timestamp verification data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimestampVerificationData {
    /// RFC 3161 signed timestamps
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rfc3161_timestamps: Vec<Rfc3161Timestamp>,
}

/// An RFC 3161 timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rfc3161Timestamp {
    /// Signed timestamp data (DER-encoded)
    pub signed_timestamp: TimestampToken,
}

fn default_media_type() -> String {
    MediaType::Bundle0_1.as_str().to_string()
}

impl<'de> Deserialize<'de> for Bundle {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct BundleHelper {
            #[serde(default = "default_media_type")]
            media_type: String,
            verification_material: VerificationMaterial,
            #[serde(default)]
            message_signature: Option<MessageSignature>,
            #[serde(default)]
            dsse_envelope: Option<DsseEnvelope>,
        }

        let helper = BundleHelper::deserialize(deserializer)?;
        let content = match (helper.message_signature, helper.dsse_envelope) {
            (Some(_), Some(_)) => {
                return Err(serde::de::Error::custom(
                    "bundle carries both messageSignature and dsseEnvelope",
                ))
            }
            (Some(sig), None) => Some(SignatureContent::MessageSignature(sig)),
            (None, Some(env)) => Some(SignatureContent::DsseEnvelope(env)),
            (None, None) => None,
        };

        Ok(Bundle {
            media_type: helper.media_type,
            verification_material: helper.verification_material,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSAGE_BUNDLE: &str = r#"{
        "mediaType": "application/vnd.dev.sigstore.bundle.v0.3+json",
        "verificationMaterial": {
            "certificate": {"rawBytes": "AQID"},
            "tlogEntries": [{
                "logIndex": "7",
                "logId": {"keyId": "wNI9atQGlz+VWfO6LRygH4QUfY/8W4RFwiT5i5WRgB0="},
                "kindVersion": {"kind": "hashedrekord", "version": "0.0.1"},
                "integratedTime": "1700000000",
                "inclusionPromise": {"signedEntryTimestamp": "AAEC"},
                "inclusionProof": {
                    "logIndex": "3",
                    "rootHash": "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=",
                    "treeSize": "4",
                    "hashes": ["47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="],
                    "checkpoint": {"envelope": "rekor.sigstore.dev - 1\n4\nabc=\n"}
                },
                "canonicalizedBody": "e30="
            }]
        },
        "messageSignature": {
            "messageDigest": {"algorithm": "SHA2_256", "digest": "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="},
            "signature": "MEUCIQ=="
        }
    }"#;

    #[test]
    fn test_media_type_parsing() {
        assert_eq!(
            MediaType::from_str("application/vnd.dev.sigstore.bundle+json;version=0.1").unwrap(),
            MediaType::Bundle0_1
        );
        assert_eq!(
            MediaType::from_str("application/vnd.dev.sigstore.bundle.v0.3+json").unwrap(),
            MediaType::Bundle0_3
        );
        assert!(MediaType::from_str("invalid").is_err());
    }

    #[test]
    fn test_parse_message_signature_bundle() {
        let bundle = Bundle::from_json(MESSAGE_BUNDLE).unwrap();
        assert_eq!(bundle.version().unwrap(), MediaType::Bundle0_3);
        assert_eq!(bundle.signing_certificate().unwrap().as_bytes(), &[1, 2, 3]);
        assert!(bundle.dsse_envelope().is_none());

        let sig = bundle.message_signature().unwrap();
        assert_eq!(
            sig.message_digest.as_ref().unwrap().to_prefixed_hex(),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );

        let entry = &bundle.tlog_entries()[0];
        assert_eq!(entry.log_index, 7);
        assert_eq!(entry.integrated_time, 1_700_000_000);
        assert_eq!(entry.inclusion_proof.as_ref().unwrap().tree_size, 4);
    }

    #[test]
    fn test_reserialize_is_stable() {
        let bundle = Bundle::from_json(MESSAGE_BUNDLE).unwrap();
        let json = bundle.to_json().unwrap();
        let again = Bundle::from_json(&json).unwrap();
        assert_eq!(bundle, again);
        assert!(json.contains("\"messageSignature\""));
        assert!(!json.contains("\"dsseEnvelope\""));
    }

    #[test]
    fn test_rejects_both_signature_kinds() {
        let json = r#"{
            "mediaType": "application/vnd.dev.sigstore.bundle.v0.3+json",
            "verificationMaterial": {"publicKey": {"hint": "k"}},
            "messageSignature": {"signature": "AQ=="},
            "dsseEnvelope": {"payloadType": "t", "payload": "", "signatures": []}
        }"#;
        assert!(Bundle::from_json(json).is_err());
    }

    #[test]
    fn test_unsigned_bundle_has_no_content() {
        let json = r#"{
            "mediaType": "application/vnd.dev.sigstore.bundle.v0.3+json",
            "verificationMaterial": {"publicKey": {"hint": "k"}, "tlogEntries": null}
        }"#;
        let bundle = Bundle::from_json(json).unwrap();
        assert!(bundle.content.is_none());
        assert!(bundle.tlog_entries().is_empty());
        assert!(bundle.signing_certificate().is_none());
    }
}
