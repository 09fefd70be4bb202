//! Signature verification using aws-lc-rs

use crate::error::{Error, Result};
use crate::key::{Curve, KeyType, PublicKeyInfo};
use crate::signing::SigningScheme;
use aws_lc_rs::signature::{
    UnparsedPublicKey, VerificationAlgorithm, ECDSA_P256_SHA256_ASN1, ECDSA_P384_SHA384_ASN1,
    ECDSA_P521_SHA512_ASN1, ED25519, RSA_PKCS1_2048_8192_SHA256, RSA_PSS_2048_8192_SHA256,
};

/// A public key bound to the scheme it verifies with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationKey {
    /// Raw public key bytes, as aws-lc-rs expects them
    pub bytes: Vec<u8>,
    /// The scheme to use for verification
    pub scheme: SigningScheme,
}

impl VerificationKey {
    /// Create a new verification key from raw key bytes
    pub fn new(bytes: Vec<u8>, scheme: SigningScheme) -> Self {
        Self { bytes, scheme }
    }

    /// Create a verification key from DER SubjectPublicKeyInfo
    ///
    /// Fails with [`Error::InvalidKey`] when the key family does not match
    /// the requested scheme.
    pub fn from_spki(der: &[u8], scheme: SigningScheme) -> Result<Self> {
        let info = PublicKeyInfo::from_der(der)?;
        let compatible = match (info.key_type, scheme) {
            (KeyType::Rsa, s) => s.is_rsa(),
            (KeyType::Ecdsa(Curve::P256), SigningScheme::EcdsaP256Sha256) => true,
            (KeyType::Ecdsa(Curve::P384), SigningScheme::EcdsaP384Sha384) => true,
            (KeyType::Ecdsa(Curve::P521), SigningScheme::EcdsaP521Sha512) => true,
            (KeyType::Ed25519, SigningScheme::Ed25519) => true,
            _ => false,
        };
        if !compatible {
            return Err(Error::InvalidKey(format!(
                "{:?} key cannot be used with {}",
                info.key_type,
                scheme.name()
            )));
        }
        Ok(Self::new(info.raw_key, scheme))
    }

    fn algorithm(&self) -> &'static dyn VerificationAlgorithm {
        match self.scheme {
            SigningScheme::EcdsaP256Sha256 => &ECDSA_P256_SHA256_ASN1,
            SigningScheme::EcdsaP384Sha384 => &ECDSA_P384_SHA384_ASN1,
            SigningScheme::EcdsaP521Sha512 => &ECDSA_P521_SHA512_ASN1,
            SigningScheme::Ed25519 => &ED25519,
            SigningScheme::RsaPssSha256 => &RSA_PSS_2048_8192_SHA256,
            SigningScheme::RsaPkcs1Sha256 => &RSA_PKCS1_2048_8192_SHA256,
        }
    }

    /// Verify a signature over data
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> Result<()> {
        UnparsedPublicKey::new(self.algorithm(), &self.bytes)
            .verify(data, signature)
            .map_err(|_| {
                Error::Verification(format!("{} signature invalid", self.scheme.name()))
            })
    }
}
