//! Signing schemes and key generation using aws-lc-rs

use crate::error::{Error, Result};
use aws_lc_rs::{
    rand::SystemRandom,
    signature::{
        EcdsaKeyPair, Ed25519KeyPair, KeyPair as AwsKeyPair, ECDSA_P256_SHA256_ASN1_SIGNING,
        ECDSA_P384_SHA384_ASN1_SIGNING, ECDSA_P521_SHA512_ASN1_SIGNING,
    },
};
use const_oid::db::rfc5912::{ID_EC_PUBLIC_KEY, SECP_256_R_1, SECP_384_R_1, SECP_521_R_1};
use const_oid::db::rfc8410::ID_ED_25519;
use const_oid::ObjectIdentifier;
use der::asn1::BitString;
use der::Encode;
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

/// A PEM-encoded public key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyPem(String);

impl PublicKeyPem {
    /// Get the PEM string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner PEM string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for PublicKeyPem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encode DER SubjectPublicKeyInfo bytes as a `PUBLIC KEY` PEM block
pub fn spki_der_to_pem(der: &[u8]) -> PublicKeyPem {
    PublicKeyPem(pem::encode(&pem::Pem::new("PUBLIC KEY", der.to_vec())))
}

/// Supported signing schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningScheme {
    /// ECDSA P-256 with SHA-256
    EcdsaP256Sha256,
    /// ECDSA P-384 with SHA-384
    EcdsaP384Sha384,
    /// ECDSA P-521 with SHA-512
    EcdsaP521Sha512,
    /// Ed25519
    Ed25519,
    /// RSA PSS with SHA-256
    RsaPssSha256,
    /// RSA PKCS#1 v1.5 with SHA-256
    RsaPkcs1Sha256,
}

impl SigningScheme {
    /// Get the name of this scheme
    pub fn name(&self) -> &'static str {
        match self {
            SigningScheme::EcdsaP256Sha256 => "ECDSA_P256_SHA256",
            SigningScheme::EcdsaP384Sha384 => "ECDSA_P384_SHA384",
            SigningScheme::EcdsaP521Sha512 => "ECDSA_P521_SHA512",
            SigningScheme::Ed25519 => "ED25519",
            SigningScheme::RsaPssSha256 => "RSA_PSS_SHA256",
            SigningScheme::RsaPkcs1Sha256 => "RSA_PKCS1_SHA256",
        }
    }

    /// Whether this scheme uses an RSA key
    pub fn is_rsa(&self) -> bool {
        matches!(
            self,
            SigningScheme::RsaPssSha256
                | SigningScheme::RsaPkcs1Sha256
        )
    }
}

/// A key pair for signing
pub enum KeyPair {
    /// ECDSA P-256 key pair
    EcdsaP256(EcdsaKeyPair),
    /// ECDSA P-384 key pair
    EcdsaP384(EcdsaKeyPair),
    /// ECDSA P-521 key pair
    EcdsaP521(EcdsaKeyPair),
    /// Ed25519 key pair
    Ed25519(Ed25519KeyPair),
}

impl KeyPair {
    fn generate_ecdsa(
        alg: &'static aws_lc_rs::signature::EcdsaSigningAlgorithm,
        label: &str,
    ) -> Result<EcdsaKeyPair> {
        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(alg, &rng)
            .map_err(|_| Error::KeyGeneration(format!("failed to generate {} key", label)))?;
        Ok(EcdsaKeyPair::from_pkcs8(alg, pkcs8.as_ref())?)
    }

    /// Generate a new ECDSA P-256 key pair
    pub fn generate_ecdsa_p256() -> Result<Self> {
        Self::generate_ecdsa(&ECDSA_P256_SHA256_ASN1_SIGNING, "ECDSA P-256").map(KeyPair::EcdsaP256)
    }

    /// Generate a new ECDSA P-384 key pair
    pub fn generate_ecdsa_p384() -> Result<Self> {
        Self::generate_ecdsa(&ECDSA_P384_SHA384_ASN1_SIGNING, "ECDSA P-384").map(KeyPair::EcdsaP384)
    }

    /// Generate a new ECDSA P-521 key pair
    pub fn generate_ecdsa_p521() -> Result<Self> {
        Self::generate_ecdsa(&ECDSA_P521_SHA512_ASN1_SIGNING, "ECDSA P-521").map(KeyPair::EcdsaP521)
    }

    /// Generate a new Ed25519 key pair
    pub fn generate_ed25519() -> Result<Self> {
        let rng = SystemRandom::new();
        let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng)
            .map_err(|_| Error::KeyGeneration("failed to generate Ed25519 key".to_string()))?;
        Ok(KeyPair::Ed25519(Ed25519KeyPair::from_pkcs8(pkcs8.as_ref())?))
    }

    /// Get the raw public key bytes (uncompressed point or 32-byte Ed25519 key)
    pub fn public_key_bytes(&self) -> &[u8] {
        match self {
            KeyPair::EcdsaP256(kp) | KeyPair::EcdsaP384(kp) | KeyPair::EcdsaP521(kp) => {
                kp.public_key().as_ref()
            }
            KeyPair::Ed25519(kp) => kp.public_key().as_ref(),
        }
    }

    /// Sign data with this key pair
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            KeyPair::EcdsaP256(kp) | KeyPair::EcdsaP384(kp) | KeyPair::EcdsaP521(kp) => {
                let sig = kp.sign(&SystemRandom::new(), data)?;
                Ok(sig.as_ref().to_vec())
            }
            KeyPair::Ed25519(kp) => Ok(kp.sign(data).as_ref().to_vec()),
        }
    }

    /// Get the signing scheme for this key pair
    pub fn default_scheme(&self) -> SigningScheme {
        match self {
            KeyPair::EcdsaP256(_) => SigningScheme::EcdsaP256Sha256,
            KeyPair::EcdsaP384(_) => SigningScheme::EcdsaP384Sha384,
            KeyPair::EcdsaP521(_) => SigningScheme::EcdsaP521Sha512,
            KeyPair::Ed25519(_) => SigningScheme::Ed25519,
        }
    }

    /// Get the public key in DER-encoded SubjectPublicKeyInfo format
    pub fn public_key_to_der(&self) -> Result<Vec<u8>> {
        let algorithm = match self {
            KeyPair::EcdsaP256(_) => ec_algorithm(SECP_256_R_1)?,
            KeyPair::EcdsaP384(_) => ec_algorithm(SECP_384_R_1)?,
            KeyPair::EcdsaP521(_) => ec_algorithm(SECP_521_R_1)?,
            KeyPair::Ed25519(_) => AlgorithmIdentifierOwned {
                oid: ID_ED_25519,
                parameters: None,
            },
        };

        let spki = SubjectPublicKeyInfoOwned {
            algorithm,
            subject_public_key: BitString::from_bytes(self.public_key_bytes())
                .map_err(|e| Error::Der(e.to_string()))?,
        };
        spki.to_der().map_err(|e| Error::Der(e.to_string()))
    }

    /// Get the public key in PEM-encoded SubjectPublicKeyInfo format
    pub fn public_key_to_pem(&self) -> Result<PublicKeyPem> {
        Ok(spki_der_to_pem(&self.public_key_to_der()?))
    }
}

fn ec_algorithm(curve: ObjectIdentifier) -> Result<AlgorithmIdentifierOwned> {
    Ok(AlgorithmIdentifierOwned {
        oid: ID_EC_PUBLIC_KEY,
        parameters: Some(der::Any::encode_from(&curve).map_err(|e| Error::Der(e.to_string()))?),
    })
}
