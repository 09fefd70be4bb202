//! Trust material sources and their composition

use crate::authority::{CertificateAuthority, TimestampingAuthority};
use crate::transparency_log::TransparencyLogInstance;
use crate::verifier::TimeConstrainedVerifier;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// A source of trust anchors
///
/// Every method has a default that reports nothing, so a source only
/// implements what it actually provides.
pub trait TrustedMaterial: Send + Sync {
    /// Timestamping authorities
    fn timestamping_authorities(&self) -> Vec<TimestampingAuthority> {
        Vec::new()
    }

    /// Fulcio-style certificate authorities
    fn fulcio_certificate_authorities(&self) -> Vec<CertificateAuthority> {
        Vec::new()
    }

    /// Rekor logs keyed by identifier
    fn rekor_logs(&self) -> HashMap<String, TransparencyLogInstance> {
        HashMap::new()
    }

    /// CT logs keyed by identifier
    fn ct_logs(&self) -> HashMap<String, TransparencyLogInstance> {
        HashMap::new()
    }

    /// Resolve a verifier by key identifier
    fn public_key_verifier(&self, key_id: &str) -> Result<Arc<dyn TimeConstrainedVerifier>> {
        Err(Error::KeyNotFound(key_id.to_string()))
    }
}

/// Several trust material sources queried in order
///
/// Key lookup returns the first member's successful resolution. Lists are
/// concatenated, and log maps keep the first member's entry for an id.
#[derive(Clone, Default)]
pub struct TrustedMaterialCollection(Vec<Arc<dyn TrustedMaterial>>);

impl TrustedMaterialCollection {
    /// Create a collection from its members, in lookup order
    pub fn new(members: Vec<Arc<dyn TrustedMaterial>>) -> Self {
        Self(members)
    }

    /// Append a member, making it the last one consulted
    pub fn push(&mut self, member: Arc<dyn TrustedMaterial>) {
        self.0.push(member);
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the collection has no members
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn merge_logs(
        &self,
        logs: impl Fn(&dyn TrustedMaterial) -> HashMap<String, TransparencyLogInstance>,
    ) -> HashMap<String, TransparencyLogInstance> {
        let mut merged = HashMap::new();
        for member in &self.0 {
            for (id, log) in logs(member.as_ref()) {
                merged.entry(id).or_insert(log);
            }
        }
        merged
    }
}

impl TrustedMaterial for TrustedMaterialCollection {
    fn timestamping_authorities(&self) -> Vec<TimestampingAuthority> {
        self.0
            .iter()
            .flat_map(|m| m.timestamping_authorities())
            .collect()
    }

    fn fulcio_certificate_authorities(&self) -> Vec<CertificateAuthority> {
        self.0
            .iter()
            .flat_map(|m| m.fulcio_certificate_authorities())
            .collect()
    }

    fn rekor_logs(&self) -> HashMap<String, TransparencyLogInstance> {
        self.merge_logs(|m| m.rekor_logs())
    }

    fn ct_logs(&self) -> HashMap<String, TransparencyLogInstance> {
        self.merge_logs(|m| m.ct_logs())
    }

    /// Returns the last member's error if none resolves the key
    fn public_key_verifier(&self, key_id: &str) -> Result<Arc<dyn TimeConstrainedVerifier>> {
        let mut last_err = Error::KeyNotFound(key_id.to_string());
        for member in &self.0 {
            match member.public_key_verifier(key_id) {
                Ok(verifier) => return Ok(verifier),
                Err(e) => last_err = e,
            }
        }
        Err(last_err)
    }
}

type KeyLookup = dyn Fn(&str) -> Result<Arc<dyn TimeConstrainedVerifier>> + Send + Sync;

/// Trust material that only knows how to resolve keys
///
/// Useful for pinning a locally managed key alongside a public trust root.
pub struct TrustedPublicKeyMaterial {
    lookup: Box<KeyLookup>,
}

impl TrustedPublicKeyMaterial {
    /// Resolve keys with an arbitrary function
    pub fn new<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Result<Arc<dyn TimeConstrainedVerifier>> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Resolve keys from a fixed map
    pub fn from_keys(keys: HashMap<String, Arc<dyn TimeConstrainedVerifier>>) -> Self {
        Self::new(move |key_id| {
            keys.get(key_id)
                .cloned()
                .ok_or_else(|| Error::KeyNotFound(key_id.to_string()))
        })
    }
}

impl TrustedMaterial for TrustedPublicKeyMaterial {
    fn public_key_verifier(&self, key_id: &str) -> Result<Arc<dyn TimeConstrainedVerifier>> {
        (self.lookup)(key_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    #[derive(Debug)]
    struct Tagged(&'static str);

    impl TimeConstrainedVerifier for Tagged {
        fn verify(&self, _message: &[u8], _signature: &[u8]) -> Result<()> {
            Ok(())
        }

        fn valid_at_time(&self, _time: DateTime<Utc>) -> bool {
            true
        }
    }

    fn tag_of(v: &Arc<dyn TimeConstrainedVerifier>) -> String {
        format!("{:?}", v)
    }

    struct Failing;

    impl TrustedMaterial for Failing {
        fn public_key_verifier(&self, _key_id: &str) -> Result<Arc<dyn TimeConstrainedVerifier>> {
            Err(Error::UnsupportedAlgorithm("PKIX_SOMETHING".to_string()))
        }
    }

    fn single(tag: &'static str) -> Arc<dyn TrustedMaterial> {
        Arc::new(TrustedPublicKeyMaterial::new(move |_| {
            Ok(Arc::new(Tagged(tag)) as Arc<dyn TimeConstrainedVerifier>)
        }))
    }

    #[test]
    fn test_first_match_wins() {
        let collection = TrustedMaterialCollection::new(vec![single("first"), single("second")]);
        let v = collection.public_key_verifier("anything").unwrap();
        assert_eq!(tag_of(&v), "Tagged(\"first\")");
    }

    #[test]
    fn test_falls_through_to_later_member() {
        let mut keys: HashMap<String, Arc<dyn TimeConstrainedVerifier>> = HashMap::new();
        keys.insert("pinned".to_string(), Arc::new(Tagged("pinned")));

        let collection = TrustedMaterialCollection::new(vec![
            Arc::new(TrustedPublicKeyMaterial::from_keys(keys)),
            single("fallback"),
        ]);
        assert_eq!(
            tag_of(&collection.public_key_verifier("pinned").unwrap()),
            "Tagged(\"pinned\")"
        );
        assert_eq!(
            tag_of(&collection.public_key_verifier("other").unwrap()),
            "Tagged(\"fallback\")"
        );
    }

    #[test]
    fn test_returns_last_error() {
        let collection = TrustedMaterialCollection::new(vec![
            Arc::new(TrustedPublicKeyMaterial::from_keys(HashMap::new())),
            Arc::new(Failing),
        ]);
        assert!(matches!(
            collection.public_key_verifier("missing"),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_empty_collection() {
        let collection = TrustedMaterialCollection::default();
        assert!(collection.is_empty());
        assert!(matches!(
            collection.public_key_verifier("missing"),
            Err(Error::KeyNotFound(id)) if id == "missing"
        ));
        assert!(collection.rekor_logs().is_empty());
    }
}
