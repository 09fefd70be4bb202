//! Protobuf-JSON shape of a trusted root document
//!
//! These types mirror `dev.sigstore.trustroot.v1.TrustedRoot` field for
//! field and do no validation; [`crate::TrustedRoot::from_wire`] turns them
//! into the checked model.

use serde::{Deserialize, Serialize};
use sigstore_types::{DerCertificate, DerPublicKey, LogKeyId};

/// A trusted root as it appears on the wire
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrustedRoot {
    /// Media type of the trusted root
    pub media_type: String,

    /// Transparency logs (Rekor)
    #[serde(default)]
    pub tlogs: Vec<RawTransparencyLog>,

    /// Certificate authorities (Fulcio)
    #[serde(default)]
    pub certificate_authorities: Vec<RawCertificateAuthority>,

    /// Certificate Transparency logs
    #[serde(default)]
    pub ctlogs: Vec<RawTransparencyLog>,

    /// Timestamp authorities (RFC 3161 TSAs)
    #[serde(default)]
    pub timestamp_authorities: Vec<RawCertificateAuthority>,
}

/// A transparency log descriptor, shared by Rekor and CT logs
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransparencyLog {
    /// Base URL of the log
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base_url: String,

    /// `HashAlgorithm` enum name of the log's Merkle tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_algorithm: Option<String>,

    /// Public key for verification
    pub public_key: RawPublicKey,

    /// Log ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_id: Option<RawLogId>,
}

/// Public key with its algorithm and validity
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPublicKey {
    /// DER-encoded SubjectPublicKeyInfo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_bytes: Option<DerPublicKey>,

    /// `PublicKeyDetails` enum name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key_details: String,

    /// Validity period for this key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_for: Option<RawTimeRange>,
}

/// Log identifier
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLogId {
    /// SHA-256 of the log's public key
    pub key_id: LogKeyId,
}

/// Certificate or timestamp authority
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCertificateAuthority {
    /// Subject information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<RawSubject>,

    /// URI of the authority
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uri: String,

    /// Certificate chain
    pub cert_chain: RawCertChain,

    /// Validity period
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_for: Option<RawTimeRange>,
}

/// Subject of an authority
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSubject {
    /// Organization name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub organization: String,

    /// Common name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub common_name: String,
}

/// Certificate chain
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCertChain {
    /// Certificates in the chain
    #[serde(default)]
    pub certificates: Vec<RawCertificate>,
}

/// A DER certificate
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCertificate {
    /// Raw bytes of the certificate
    pub raw_bytes: DerCertificate,
}

/// RFC 3339 time range, either end optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTimeRange {
    /// Start time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    /// End time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}
