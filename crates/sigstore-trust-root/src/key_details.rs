//! Public key algorithm names and their normalization
//!
//! Trust roots tag every key with a `PublicKeyDetails` enum name such as
//! `PKIX_ECDSA_P256_SHA_256`. Each recognized name maps to exactly one
//! [`AlgorithmDetails`] triple; unknown names are kept verbatim so they
//! round-trip and only fail when someone asks for a verifier.

use crate::{Error, Result};
use sigstore_crypto::{Curve, PublicKeyInfo, SigningScheme, VerificationKey};
use sigstore_types::HashAlgorithm;
use std::fmt;

/// Declared algorithm of a trust-root public key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PublicKeyDetails {
    /// RSA 2048, PKCS#1 v1.5, SHA-256
    PkixRsaPkcs1v15_2048Sha256,
    /// RSA 3072, PKCS#1 v1.5, SHA-256
    PkixRsaPkcs1v15_3072Sha256,
    /// RSA 4096, PKCS#1 v1.5, SHA-256
    PkixRsaPkcs1v15_4096Sha256,
    /// RSA 2048, PSS, SHA-256
    PkixRsaPss2048Sha256,
    /// RSA 3072, PSS, SHA-256
    PkixRsaPss3072Sha256,
    /// RSA 4096, PSS, SHA-256
    PkixRsaPss4096Sha256,
    /// ECDSA P-256, SHA-256
    PkixEcdsaP256Sha256,
    /// ECDSA P-384, SHA-384
    PkixEcdsaP384Sha384,
    /// ECDSA P-521, SHA-512
    PkixEcdsaP521Sha512,
    /// Ed25519
    PkixEd25519,
    /// Ed25519ph (pre-hashed with SHA-512)
    PkixEd25519Ph,
    /// Any other name, including deprecated ones
    Other(String),
}

/// RSA signature padding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RsaPadding {
    /// PKCS#1 v1.5
    Pkcs1v15,
    /// PSS
    Pss,
}

/// Public key family together with its size parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// RSA with a modulus size in bits
    Rsa {
        /// Modulus size in bits
        modulus_bits: u32,
        /// Signature padding
        padding: RsaPadding,
    },
    /// ECDSA on a named curve
    Ecdsa(Curve),
    /// Ed25519, optionally pre-hashed
    Ed25519 {
        /// Whether the message is hashed before signing (Ed25519ph)
        prehashed: bool,
    },
}

/// The {key type, curve or modulus size, hash} triple behind a key-details name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlgorithmDetails {
    /// Key family and size
    pub key: KeyAlgorithm,
    /// Hash used by the signature scheme
    pub hash: HashAlgorithm,
}

impl AlgorithmDetails {
    /// The aws-lc-rs scheme that verifies signatures of this kind
    pub fn signing_scheme(&self) -> Result<SigningScheme> {
        use KeyAlgorithm::*;
        match (self.key, self.hash) {
            (Rsa { padding: RsaPadding::Pkcs1v15, .. }, HashAlgorithm::Sha2256) => {
                Ok(SigningScheme::RsaPkcs1Sha256)
            }
            (Rsa { padding: RsaPadding::Pss, .. }, HashAlgorithm::Sha2256) => {
                Ok(SigningScheme::RsaPssSha256)
            }
            (Ecdsa(Curve::P256), HashAlgorithm::Sha2256) => Ok(SigningScheme::EcdsaP256Sha256),
            (Ecdsa(Curve::P384), HashAlgorithm::Sha2384) => Ok(SigningScheme::EcdsaP384Sha384),
            (Ecdsa(Curve::P521), HashAlgorithm::Sha2512) => Ok(SigningScheme::EcdsaP521Sha512),
            (Ed25519 { prehashed: false }, _) => Ok(SigningScheme::Ed25519),
            (key, hash) => Err(Error::UnsupportedAlgorithm(format!(
                "no verifier for {:?} with {}",
                key, hash
            ))),
        }
    }

    /// Bind a DER SubjectPublicKeyInfo to this algorithm
    ///
    /// The key family, curve and RSA modulus size must all match.
    pub fn verification_key(&self, spki: &[u8]) -> Result<VerificationKey> {
        let scheme = self.signing_scheme()?;
        if let KeyAlgorithm::Rsa { modulus_bits, .. } = self.key {
            let info = PublicKeyInfo::from_der(spki).map_err(|e| Error::InvalidKey(e.to_string()))?;
            if let Some(bits) = info.modulus_bits.filter(|&bits| bits != modulus_bits) {
                return Err(Error::InvalidKey(format!(
                    "expected a {}-bit RSA modulus, key has {} bits",
                    modulus_bits, bits
                )));
            }
        }
        VerificationKey::from_spki(spki, scheme).map_err(|e| Error::InvalidKey(e.to_string()))
    }
}

impl PublicKeyDetails {
    /// The protobuf enum name
    pub fn as_str(&self) -> &str {
        match self {
            Self::PkixRsaPkcs1v15_2048Sha256 => "PKIX_RSA_PKCS1V15_2048_SHA256",
            Self::PkixRsaPkcs1v15_3072Sha256 => "PKIX_RSA_PKCS1V15_3072_SHA256",
            Self::PkixRsaPkcs1v15_4096Sha256 => "PKIX_RSA_PKCS1V15_4096_SHA256",
            Self::PkixRsaPss2048Sha256 => "PKIX_RSA_PSS_2048_SHA256",
            Self::PkixRsaPss3072Sha256 => "PKIX_RSA_PSS_3072_SHA256",
            Self::PkixRsaPss4096Sha256 => "PKIX_RSA_PSS_4096_SHA256",
            Self::PkixEcdsaP256Sha256 => "PKIX_ECDSA_P256_SHA_256",
            Self::PkixEcdsaP384Sha384 => "PKIX_ECDSA_P384_SHA_384",
            Self::PkixEcdsaP521Sha512 => "PKIX_ECDSA_P521_SHA_512",
            Self::PkixEd25519 => "PKIX_ED25519",
            Self::PkixEd25519Ph => "PKIX_ED25519_PH",
            Self::Other(name) => name,
        }
    }

    /// Normalize to an algorithm triple
    ///
    /// Fails with [`Error::UnsupportedAlgorithm`] for unrecognized names.
    pub fn algorithm_details(&self) -> Result<AlgorithmDetails> {
        let rsa = |modulus_bits, padding| AlgorithmDetails {
            key: KeyAlgorithm::Rsa {
                modulus_bits,
                padding,
            },
            hash: HashAlgorithm::Sha2256,
        };
        let details = match self {
            Self::PkixRsaPkcs1v15_2048Sha256 => rsa(2048, RsaPadding::Pkcs1v15),
            Self::PkixRsaPkcs1v15_3072Sha256 => rsa(3072, RsaPadding::Pkcs1v15),
            Self::PkixRsaPkcs1v15_4096Sha256 => rsa(4096, RsaPadding::Pkcs1v15),
            Self::PkixRsaPss2048Sha256 => rsa(2048, RsaPadding::Pss),
            Self::PkixRsaPss3072Sha256 => rsa(3072, RsaPadding::Pss),
            Self::PkixRsaPss4096Sha256 => rsa(4096, RsaPadding::Pss),
            Self::PkixEcdsaP256Sha256 => AlgorithmDetails {
                key: KeyAlgorithm::Ecdsa(Curve::P256),
                hash: HashAlgorithm::Sha2256,
            },
            Self::PkixEcdsaP384Sha384 => AlgorithmDetails {
                key: KeyAlgorithm::Ecdsa(Curve::P384),
                hash: HashAlgorithm::Sha2384,
            },
            Self::PkixEcdsaP521Sha512 => AlgorithmDetails {
                key: KeyAlgorithm::Ecdsa(Curve::P521),
                hash: HashAlgorithm::Sha2512,
            },
            Self::PkixEd25519 => AlgorithmDetails {
                key: KeyAlgorithm::Ed25519 { prehashed: false },
                hash: HashAlgorithm::Sha2512,
            },
            Self::PkixEd25519Ph => AlgorithmDetails {
                key: KeyAlgorithm::Ed25519 { prehashed: true },
                hash: HashAlgorithm::Sha2512,
            },
            Self::Other(name) => {
                return Err(Error::UnsupportedAlgorithm(format!(
                    "unrecognized key details {:?}",
                    name
                )))
            }
        };
        Ok(details)
    }

    /// Hash function used by signatures made with this key
    pub fn signature_hash(&self) -> Result<HashAlgorithm> {
        Ok(self.algorithm_details()?.hash)
    }
}

impl From<&str> for PublicKeyDetails {
    fn from(name: &str) -> Self {
        match name {
            "PKIX_RSA_PKCS1V15_2048_SHA256" => Self::PkixRsaPkcs1v15_2048Sha256,
            "PKIX_RSA_PKCS1V15_3072_SHA256" => Self::PkixRsaPkcs1v15_3072Sha256,
            "PKIX_RSA_PKCS1V15_4096_SHA256" => Self::PkixRsaPkcs1v15_4096Sha256,
            "PKIX_RSA_PSS_2048_SHA256" => Self::PkixRsaPss2048Sha256,
            "PKIX_RSA_PSS_3072_SHA256" => Self::PkixRsaPss3072Sha256,
            "PKIX_RSA_PSS_4096_SHA256" => Self::PkixRsaPss4096Sha256,
            "PKIX_ECDSA_P256_SHA_256" => Self::PkixEcdsaP256Sha256,
            "PKIX_ECDSA_P384_SHA_384" => Self::PkixEcdsaP384Sha384,
            "PKIX_ECDSA_P521_SHA_512" => Self::PkixEcdsaP521Sha512,
            "PKIX_ED25519" => Self::PkixEd25519,
            "PKIX_ED25519_PH" => Self::PkixEd25519Ph,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PublicKeyDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
