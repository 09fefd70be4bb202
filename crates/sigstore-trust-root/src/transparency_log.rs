//! Transparency log instances (Rekor and CT logs)

use crate::key_details::PublicKeyDetails;
use crate::validity::ValidityPeriod;
use crate::verifier::ExpiringKey;
use crate::wire::{RawLogId, RawPublicKey, RawTransparencyLog};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sigstore_crypto::{sha256, sha256_hex};
use sigstore_types::{DerPublicKey, HashAlgorithm, LogKeyId};

/// A transparency log and the key it signs with
///
/// The identifier is the hex SHA-256 of the DER public key, so it is fixed
/// at construction and the key itself cannot be swapped afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransparencyLogInstance {
    id: String,
    public_key: DerPublicKey,
    // Wire `logId` that disagrees with `id`; re-emitted but never used for lookups
    declared_log_id: Option<LogKeyId>,
    /// Declared key algorithm
    pub key_details: PublicKeyDetails,
    /// Period during which the log key is trusted
    pub validity: ValidityPeriod,
    /// Base URL of the log API
    pub base_url: Option<String>,
    hash_algorithm: Option<String>,
}

impl TransparencyLogInstance {
    /// Create a log instance from a DER SubjectPublicKeyInfo
    pub fn new(
        public_key: DerPublicKey,
        key_details: PublicKeyDetails,
        validity: ValidityPeriod,
    ) -> Self {
        Self {
            id: sha256_hex(public_key.as_bytes()),
            public_key,
            declared_log_id: None,
            key_details,
            validity,
            base_url: None,
            hash_algorithm: None,
        }
    }

    /// Set the log's base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the Merkle tree hash algorithm
    pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = Some(algorithm.as_str().to_string());
        self
    }

    /// Hash algorithm of the log's Merkle tree
    ///
    /// Fails with [`Error::UnsupportedAlgorithm`] when the document names an
    /// algorithm this crate does not know.
    pub fn hash_algorithm(&self) -> Result<Option<HashAlgorithm>> {
        self.hash_algorithm
            .as_deref()
            .map(|name| {
                name.parse::<HashAlgorithm>()
                    .map_err(|_| Error::UnsupportedAlgorithm(format!("hash algorithm {:?}", name)))
            })
            .transpose()
    }

    /// The hash algorithm name exactly as given
    pub fn hash_algorithm_name(&self) -> Option<&str> {
        self.hash_algorithm.as_deref()
    }

    /// Hex-encoded log identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// DER-encoded public key
    pub fn public_key(&self) -> &DerPublicKey {
        &self.public_key
    }

    /// Hash function used by the log's signatures
    pub fn signature_hash(&self) -> Result<HashAlgorithm> {
        self.key_details.signature_hash()
    }

    /// Whether the log key was trusted at `time`
    pub fn valid_at_time(&self, time: DateTime<Utc>) -> bool {
        self.validity.contains(time)
    }

    /// Build a verifier for this log's key
    ///
    /// Fails for unsupported key details, or when the key does not match them.
    pub fn verifier(&self) -> Result<ExpiringKey> {
        let key = self
            .key_details
            .algorithm_details()?
            .verification_key(self.public_key.as_bytes())
            .map_err(|e| match e {
                Error::InvalidKey(msg) => Error::InvalidKey(format!("log {}: {}", self.id, msg)),
                other => other,
            })?;
        Ok(ExpiringKey::new(key, self.validity))
    }

    pub(crate) fn from_raw(raw: &RawTransparencyLog) -> Result<Self> {
        let public_key = raw
            .public_key
            .raw_bytes
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::MalformedTrustRoot("transparency log without public key".into()))?;
        let validity = ValidityPeriod::from_raw(raw.public_key.valid_for.as_ref())?;

        let mut log = Self::new(
            public_key,
            PublicKeyDetails::from(raw.public_key.key_details.as_str()),
            validity,
        );
        if !raw.base_url.is_empty() {
            log.base_url = Some(raw.base_url.clone());
        }
        log.hash_algorithm = raw.hash_algorithm.clone();

        if let Some(log_id) = &raw.log_id {
            if hex::encode(log_id.key_id.as_bytes()) != log.id {
                tracing::warn!(
                    declared = %hex::encode(log_id.key_id.as_bytes()),
                    derived = %log.id,
                    "log ID does not match public key digest, using derived ID"
                );
                log.declared_log_id = Some(log_id.key_id.clone());
            }
        }
        Ok(log)
    }

    pub(crate) fn to_raw(&self) -> RawTransparencyLog {
        RawTransparencyLog {
            base_url: self.base_url.clone().unwrap_or_default(),
            hash_algorithm: self.hash_algorithm.clone(),
            public_key: RawPublicKey {
                raw_bytes: Some(self.public_key.clone()),
                key_details: self.key_details.as_str().to_string(),
                valid_for: self.validity.to_raw(),
            },
            log_id: Some(RawLogId {
                key_id: self
                    .declared_log_id
                    .clone()
                    .unwrap_or_else(|| LogKeyId::new(sha256(self.public_key.as_bytes()).to_vec())),
            }),
        }
    }
}
