//! The trusted root model
//!
//! A [`TrustedRoot`] is built once, from a wire document or from component
//! lists, and is read-only afterwards apart from an internal verifier cache.

use crate::authority::{CertificateAuthority, TimestampingAuthority};
use crate::material::TrustedMaterial;
use crate::transparency_log::TransparencyLogInstance;
use crate::verifier::TimeConstrainedVerifier;
use crate::wire::RawTrustedRoot;
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Media type of v0.1 trusted roots
pub const TRUSTED_ROOT_MEDIA_TYPE_V0_1: &str =
    "application/vnd.dev.sigstore.trustedroot+json;version=0.1";

/// Media type of v0.2 trusted roots
pub const TRUSTED_ROOT_MEDIA_TYPE_V0_2: &str =
    "application/vnd.dev.sigstore.trustedroot.v0.2+json";

fn check_media_type(media_type: &str) -> Result<()> {
    match media_type {
        TRUSTED_ROOT_MEDIA_TYPE_V0_1 | TRUSTED_ROOT_MEDIA_TYPE_V0_2 => Ok(()),
        other => Err(Error::UnsupportedMediaType(other.to_string())),
    }
}

fn build_index<'a>(
    category: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::new();
    for (pos, id) in ids.enumerate() {
        if index.insert(id.to_string(), pos).is_some() {
            return Err(Error::DuplicateKey {
                category,
                id: id.to_string(),
            });
        }
    }
    Ok(index)
}

/// Recursively patch `overlay` into `base`
///
/// Objects merge key by key, arrays of equal length merge element-wise, and
/// anything else is replaced. Keys only present in `base` survive.
fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(base), Value::Array(overlay)) if base.len() == overlay.len() => {
            for (existing, value) in base.iter_mut().zip(overlay) {
                merge_json(existing, value);
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Sigstore trust anchors: CAs, transparency logs, CT logs and TSAs
///
/// Every entity is indexed by an identifier derived from its key material:
/// logs by the hex SHA-256 of their public key, CAs and TSAs by the hex
/// SHA-256 of the first certificate in their chain.
#[derive(Debug)]
pub struct TrustedRoot {
    media_type: String,
    certificate_authorities: Vec<CertificateAuthority>,
    ca_index: HashMap<String, usize>,
    ct_logs: Vec<TransparencyLogInstance>,
    ct_index: HashMap<String, usize>,
    timestamping_authorities: Vec<TimestampingAuthority>,
    tsa_index: HashMap<String, usize>,
    rekor_logs: Vec<TransparencyLogInstance>,
    rekor_index: HashMap<String, usize>,
    original: Option<Value>,
    verifiers: RwLock<HashMap<String, Arc<dyn TimeConstrainedVerifier>>>,
}

impl TrustedRoot {
    /// Build a trusted root from its components
    ///
    /// Fails if the media type is not recognized or if two entries of the
    /// same category share an identifier.
    pub fn new(
        media_type: impl Into<String>,
        certificate_authorities: Vec<CertificateAuthority>,
        ct_logs: Vec<TransparencyLogInstance>,
        timestamping_authorities: Vec<TimestampingAuthority>,
        rekor_logs: Vec<TransparencyLogInstance>,
    ) -> Result<Self> {
        let media_type = media_type.into();
        check_media_type(&media_type)?;

        let ca_index = build_index(
            "certificate authority",
            certificate_authorities.iter().map(|ca| ca.id()),
        )?;
        let ct_index = build_index("CT log", ct_logs.iter().map(|l| l.id()))?;
        let tsa_index = build_index(
            "timestamping authority",
            timestamping_authorities.iter().map(|t| t.id()),
        )?;
        let rekor_index = build_index("transparency log", rekor_logs.iter().map(|l| l.id()))?;

        tracing::debug!(
            cas = certificate_authorities.len(),
            ct_logs = ct_logs.len(),
            tsas = timestamping_authorities.len(),
            rekor_logs = rekor_logs.len(),
            "constructed trusted root"
        );

        Ok(Self {
            media_type,
            certificate_authorities,
            ca_index,
            ct_logs,
            ct_index,
            timestamping_authorities,
            tsa_index,
            rekor_logs,
            rekor_index,
            original: None,
            verifiers: RwLock::new(HashMap::new()),
        })
    }

    /// Build a trusted root from its decoded wire form
    pub fn from_wire(raw: &RawTrustedRoot) -> Result<Self> {
        check_media_type(&raw.media_type)?;

        let cas = raw
            .certificate_authorities
            .iter()
            .map(CertificateAuthority::from_raw)
            .collect::<Result<Vec<_>>>()?;
        let ct_logs = raw
            .ctlogs
            .iter()
            .map(TransparencyLogInstance::from_raw)
            .collect::<Result<Vec<_>>>()?;
        let tsas = raw
            .timestamp_authorities
            .iter()
            .map(TimestampingAuthority::from_raw)
            .collect::<Result<Vec<_>>>()?;
        let rekor_logs = raw
            .tlogs
            .iter()
            .map(TransparencyLogInstance::from_raw)
            .collect::<Result<Vec<_>>>()?;

        Self::new(raw.media_type.clone(), cas, ct_logs, tsas, rekor_logs)
    }

    /// Decode a JSON document into its wire form without validating it
    pub fn wire_from_json(json: &str) -> Result<RawTrustedRoot> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a trusted root from JSON
    ///
    /// The parsed document is kept so that fields this model does not
    /// interpret are written back unchanged by [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Load a trusted root from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn from_value(value: Value) -> Result<Self> {
        let raw: RawTrustedRoot = serde_json::from_value(value.clone())?;
        let mut root = Self::from_wire(&raw)?;
        root.original = Some(value);
        Ok(root)
    }

    /// The wire form of the interpreted fields
    pub fn to_wire(&self) -> RawTrustedRoot {
        RawTrustedRoot {
            media_type: self.media_type.clone(),
            tlogs: self.rekor_logs.iter().map(|l| l.to_raw()).collect(),
            certificate_authorities: self
                .certificate_authorities
                .iter()
                .map(|ca| ca.to_raw())
                .collect(),
            ctlogs: self.ct_logs.iter().map(|l| l.to_raw()).collect(),
            timestamp_authorities: self
                .timestamping_authorities
                .iter()
                .map(|t| t.to_raw())
                .collect(),
        }
    }

    fn to_value(&self) -> Result<Value> {
        let generated = serde_json::to_value(self.to_wire())?;
        Ok(match &self.original {
            Some(original) => {
                let mut merged = original.clone();
                merge_json(&mut merged, generated);
                merged
            }
            None => generated,
        })
    }

    /// Serialize to compact JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_value()?)?)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value()?)?)
    }

    /// The media type this root was built with
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Certificate authorities in document order
    pub fn certificate_authorities(&self) -> &[CertificateAuthority] {
        &self.certificate_authorities
    }

    /// CT logs in document order
    pub fn ct_log_instances(&self) -> &[TransparencyLogInstance] {
        &self.ct_logs
    }

    /// Timestamping authorities in document order
    pub fn timestamp_authorities(&self) -> &[TimestampingAuthority] {
        &self.timestamping_authorities
    }

    /// Rekor logs in document order
    pub fn rekor_log_instances(&self) -> &[TransparencyLogInstance] {
        &self.rekor_logs
    }

    /// Look up a Rekor log by hex identifier
    pub fn rekor_log(&self, id: &str) -> Option<&TransparencyLogInstance> {
        self.rekor_index.get(id).map(|&i| &self.rekor_logs[i])
    }

    /// Look up a CT log by hex identifier
    pub fn ct_log(&self, id: &str) -> Option<&TransparencyLogInstance> {
        self.ct_index.get(id).map(|&i| &self.ct_logs[i])
    }

    /// Look up a certificate authority by hex identifier
    pub fn certificate_authority(&self, id: &str) -> Option<&CertificateAuthority> {
        self.ca_index.get(id).map(|&i| &self.certificate_authorities[i])
    }

    /// Look up a timestamping authority by hex identifier
    pub fn timestamping_authority(&self, id: &str) -> Option<&TimestampingAuthority> {
        self.tsa_index
            .get(id)
            .map(|&i| &self.timestamping_authorities[i])
    }

    fn build_verifier(&self, key_id: &str) -> Result<Arc<dyn TimeConstrainedVerifier>> {
        if let Some(log) = self.rekor_log(key_id).or_else(|| self.ct_log(key_id)) {
            return Ok(Arc::new(log.verifier()?));
        }
        if let Some(ca) = self.certificate_authority(key_id) {
            return Ok(Arc::new(ca.verifier()?));
        }
        if let Some(tsa) = self.timestamping_authority(key_id) {
            return Ok(Arc::new(tsa.verifier()?));
        }
        Err(Error::KeyNotFound(key_id.to_string()))
    }

    /// Resolve the verifier for a log, CA or TSA identifier
    ///
    /// Rekor logs are searched first, then CT logs, CAs and TSAs. Verifiers
    /// are built on first use and cached; an entry with unsupported key
    /// details fails here without affecting the rest of the root.
    pub fn public_key_verifier(&self, key_id: &str) -> Result<Arc<dyn TimeConstrainedVerifier>> {
        if let Ok(cache) = self.verifiers.read() {
            if let Some(verifier) = cache.get(key_id) {
                return Ok(Arc::clone(verifier));
            }
        }

        let verifier = self.build_verifier(key_id)?;
        if let Ok(mut cache) = self.verifiers.write() {
            cache
                .entry(key_id.to_string())
                .or_insert_with(|| Arc::clone(&verifier));
        }
        Ok(verifier)
    }
}

impl Clone for TrustedRoot {
    fn clone(&self) -> Self {
        Self {
            media_type: self.media_type.clone(),
            certificate_authorities: self.certificate_authorities.clone(),
            ca_index: self.ca_index.clone(),
            ct_logs: self.ct_logs.clone(),
            ct_index: self.ct_index.clone(),
            timestamping_authorities: self.timestamping_authorities.clone(),
            tsa_index: self.tsa_index.clone(),
            rekor_logs: self.rekor_logs.clone(),
            rekor_index: self.rekor_index.clone(),
            original: self.original.clone(),
            verifiers: RwLock::new(HashMap::new()),
        }
    }
}

/// Equality over the interpreted model; retained wire data and caches are ignored
impl PartialEq for TrustedRoot {
    fn eq(&self, other: &Self) -> bool {
        self.media_type == other.media_type
            && self.certificate_authorities == other.certificate_authorities
            && self.ct_logs == other.ct_logs
            && self.timestamping_authorities == other.timestamping_authorities
            && self.rekor_logs == other.rekor_logs
    }
}

impl Serialize for TrustedRoot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TrustedRoot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}

impl TrustedMaterial for TrustedRoot {
    fn timestamping_authorities(&self) -> Vec<TimestampingAuthority> {
        self.timestamping_authorities.clone()
    }

    fn fulcio_certificate_authorities(&self) -> Vec<CertificateAuthority> {
        self.certificate_authorities.clone()
    }

    fn rekor_logs(&self) -> HashMap<String, TransparencyLogInstance> {
        self.rekor_logs
            .iter()
            .map(|l| (l.id().to_string(), l.clone()))
            .collect()
    }

    fn ct_logs(&self) -> HashMap<String, TransparencyLogInstance> {
        self.ct_logs
            .iter()
            .map(|l| (l.id().to_string(), l.clone()))
            .collect()
    }

    fn public_key_verifier(&self, key_id: &str) -> Result<Arc<dyn TimeConstrainedVerifier>> {
        TrustedRoot::public_key_verifier(self, key_id)
    }
}
