//! Verifiers bounded by a validity window

use crate::validity::ValidityPeriod;
use crate::Result;
use chrono::{DateTime, Utc};
use sigstore_crypto::VerificationKey;
use std::fmt::Debug;

/// A signature verifier that is only trusted within a time window
///
/// Callers check [`valid_at_time`](Self::valid_at_time) against the time a
/// signature claims to have been made before trusting [`verify`](Self::verify).
pub trait TimeConstrainedVerifier: Send + Sync + Debug {
    /// Verify `signature` over `message`
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()>;

    /// Whether the key was trusted at `time`
    fn valid_at_time(&self, time: DateTime<Utc>) -> bool;
}

/// A public key paired with its validity period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiringKey {
    key: VerificationKey,
    validity: ValidityPeriod,
}

impl ExpiringKey {
    /// Bind a key to a validity period
    pub fn new(key: VerificationKey, validity: ValidityPeriod) -> Self {
        Self { key, validity }
    }

    /// The underlying key
    pub fn key(&self) -> &VerificationKey {
        &self.key
    }

    /// The validity period
    pub fn validity(&self) -> &ValidityPeriod {
        &self.validity
    }
}

impl TimeConstrainedVerifier for ExpiringKey {
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        Ok(self.key.verify(message, signature)?)
    }

    fn valid_at_time(&self, time: DateTime<Utc>) -> bool {
        self.validity.contains(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validity::parse_time;
    use chrono::Duration;
    use sigstore_crypto::KeyPair;

    #[test]
    fn test_expiring_key() {
        let kp = KeyPair::generate_ecdsa_p256().unwrap();
        let start = parse_time("2023-01-01T00:00:00Z").unwrap();
        let end = parse_time("2024-01-01T00:00:00Z").unwrap();
        let key = ExpiringKey::new(
            VerificationKey::new(kp.public_key_bytes().to_vec(), kp.default_scheme()),
            ValidityPeriod::new(Some(start), Some(end)).unwrap(),
        );

        let sig = kp.sign(b"artifact").unwrap();
        assert!(key.verify(b"artifact", &sig).is_ok());
        assert!(key.verify(b"tampered", &sig).is_err());

        assert!(key.valid_at_time(start));
        assert!(key.valid_at_time(end));
        assert!(!key.valid_at_time(end + Duration::seconds(1)));
        assert!(!key.valid_at_time(start - Duration::seconds(1)));
    }
}
