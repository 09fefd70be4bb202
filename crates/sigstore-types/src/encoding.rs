//! Type-safe encoding wrappers
//!
//! Binary fields in Sigstore's protobuf-JSON documents travel as standard
//! base64 strings. The newtypes here hold the decoded bytes and take care of
//! the encoding at the serde boundary, so a DER certificate can never be
//! confused with a signature or a canonicalized log body.

use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! base64_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
        pub struct $name(Vec<u8>);

        impl $name {
            /// Wrap raw bytes
            pub fn new(bytes: Vec<u8>) -> Self {
                Self(bytes)
            }

            /// Decode from a standard base64 string
            pub fn from_base64(s: &str) -> Result<Self> {
                STANDARD
                    .decode(s)
                    .map(Self)
                    .map_err(|e| Error::InvalidEncoding(format!("invalid base64: {}", e)))
            }

            /// Encode as a standard base64 string
            pub fn to_base64(&self) -> String {
                STANDARD.encode(&self.0)
            }

            /// Borrow the raw bytes
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            /// Take ownership of the raw bytes
            pub fn into_bytes(self) -> Vec<u8> {
                self.0
            }

            /// Whether the value holds no bytes
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl From<Vec<u8>> for $name {
            fn from(bytes: Vec<u8>) -> Self {
                Self(bytes)
            }
        }

        impl From<&[u8]> for $name {
            fn from(bytes: &[u8]) -> Self {
                Self(bytes.to_vec())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_base64())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                STANDARD.decode(s).map(Self).map_err(serde::de::Error::custom)
            }
        }
    };
}

base64_newtype!(
    /// DER-encoded X.509 certificate
    DerCertificate
);
base64_newtype!(
    /// DER-encoded SubjectPublicKeyInfo
    DerPublicKey
);
base64_newtype!(
    /// Raw signature bytes
    SignatureBytes
);
base64_newtype!(
    /// Transparency log key identifier (digest of the log's public key)
    LogKeyId
);
base64_newtype!(
    /// Signed entry timestamp returned by a transparency log
    SignedTimestamp
);
base64_newtype!(
    /// Canonicalized log entry body
    CanonicalizedBody
);
base64_newtype!(
    /// DSSE payload
    PayloadBytes
);
base64_newtype!(
    /// Message digest bytes of arbitrary length
    DigestBytes
);
base64_newtype!(
    /// DER-encoded RFC 3161 timestamp token
    TimestampToken
);

/// SHA-256 hash digest (32 bytes)
///
/// Serialized as base64, like every other byte field in a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Hash([u8; 32]);

impl Sha256Hash {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Sha256Hash(bytes)
    }

    /// Try to create from a byte slice
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            Error::InvalidEncoding(format!(
                "SHA-256 hash must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Sha256Hash(arr))
    }

    /// Parse from hex-encoded string
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes =
            hex::decode(s).map_err(|e| Error::InvalidEncoding(format!("invalid hex: {}", e)))?;
        Self::try_from_slice(&bytes)
    }

    /// Parse from base64-encoded string
    pub fn from_base64(s: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(s)
            .map_err(|e| Error::InvalidEncoding(format!("invalid base64: {}", e)))?;
        Self::try_from_slice(&bytes)
    }

    /// Encode as hex string (lowercase)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Encode as base64 string
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Get as a byte slice
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Sha256Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Sha256Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Sha256Hash(bytes)
    }
}

impl Serialize for Sha256Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Sha256Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Sha256Hash::from_base64(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde helper for protobuf int64 fields, which JSON carries as strings.
///
/// Plain JSON numbers are accepted on input.
pub mod string_i64 {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrNumber {
            String(String),
            Number(i64),
        }

        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::String(s) => s.parse().map_err(de::Error::custom),
            StringOrNumber::Number(n) => Ok(n),
        }
    }
}
