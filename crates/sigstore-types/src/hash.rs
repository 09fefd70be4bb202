//! Hash algorithm types

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Hash algorithms as named by the Sigstore protobuf specs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// SHA2-256
    #[serde(rename = "SHA2_256")]
    Sha2256,
    /// SHA2-384
    #[serde(rename = "SHA2_384")]
    Sha2384,
    /// SHA2-512
    #[serde(rename = "SHA2_512")]
    Sha2512,
    /// SHA3-256
    #[serde(rename = "SHA3_256")]
    Sha3256,
    /// SHA3-384
    #[serde(rename = "SHA3_384")]
    Sha3384,
}

impl HashAlgorithm {
    /// Get the digest size in bytes for this algorithm
    pub fn digest_size(&self) -> usize {
        match self {
            HashAlgorithm::Sha2256 | HashAlgorithm::Sha3256 => 32,
            HashAlgorithm::Sha2384 | HashAlgorithm::Sha3384 => 48,
            HashAlgorithm::Sha2512 => 64,
        }
    }

    /// Protobuf enum name, e.g. `SHA2_256`
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha2256 => "SHA2_256",
            HashAlgorithm::Sha2384 => "SHA2_384",
            HashAlgorithm::Sha2512 => "SHA2_512",
            HashAlgorithm::Sha3256 => "SHA3_256",
            HashAlgorithm::Sha3384 => "SHA3_384",
        }
    }

    /// Lowercase name used by Rekor entries and digest prefixes, e.g. `sha256`
    pub fn rekor_name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha2256 => "sha256",
            HashAlgorithm::Sha2384 => "sha384",
            HashAlgorithm::Sha2512 => "sha512",
            HashAlgorithm::Sha3256 => "sha3-256",
            HashAlgorithm::Sha3384 => "sha3-384",
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SHA2_256" => Ok(HashAlgorithm::Sha2256),
            "SHA2_384" => Ok(HashAlgorithm::Sha2384),
            "SHA2_512" => Ok(HashAlgorithm::Sha2512),
            "SHA3_256" => Ok(HashAlgorithm::Sha3256),
            "SHA3_384" => Ok(HashAlgorithm::Sha3384),
            other => Err(Error::InvalidHashAlgorithm(other.to_string())),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(HashAlgorithm::Sha2384.to_string(), "SHA2_384");
        assert_eq!(HashAlgorithm::Sha2512.rekor_name(), "sha512");
        assert_eq!(
            HashAlgorithm::from_str("SHA2_256").unwrap(),
            HashAlgorithm::Sha2256
        );
        assert!(HashAlgorithm::from_str("HASH_ALGORITHM_UNSPECIFIED").is_err());
    }

    #[test]
    fn test_serde_uses_protobuf_names() {
        let json = serde_json::to_string(&HashAlgorithm::Sha3256).unwrap();
        assert_eq!(json, "\"SHA3_256\"");
        let parsed: HashAlgorithm = serde_json::from_str("\"SHA2_512\"").unwrap();
        assert_eq!(parsed, HashAlgorithm::Sha2512);
    }
}
