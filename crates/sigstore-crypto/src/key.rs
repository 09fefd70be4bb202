//! SubjectPublicKeyInfo inspection
//!
//! aws-lc-rs verifiers take the bare key (an uncompressed EC point, a PKCS#1
//! RSAPublicKey or 32 Ed25519 bytes), while trust material ships keys as DER
//! SubjectPublicKeyInfo. [`PublicKeyInfo`] bridges the two.

use crate::error::{Error, Result};
use crate::signing::SigningScheme;
use const_oid::db::rfc5912::{ID_EC_PUBLIC_KEY, RSA_ENCRYPTION, SECP_256_R_1, SECP_384_R_1, SECP_521_R_1};
use const_oid::db::rfc8410::ID_ED_25519;
use const_oid::ObjectIdentifier;
use der::asn1::UintRef;
use der::{Decode, Reader, SliceReader};
use spki::SubjectPublicKeyInfoRef;

/// Public key family as declared by the SPKI algorithm identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// RSA (rsaEncryption)
    Rsa,
    /// ECDSA on a named curve
    Ecdsa(Curve),
    /// Ed25519
    Ed25519,
}

/// Named elliptic curves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    /// NIST P-256 (secp256r1)
    P256,
    /// NIST P-384 (secp384r1)
    P384,
    /// NIST P-521 (secp521r1)
    P521,
}

/// A parsed SubjectPublicKeyInfo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyInfo {
    /// Key family
    pub key_type: KeyType,
    /// Contents of the subjectPublicKey BIT STRING
    pub raw_key: Vec<u8>,
    /// Size of the modulus in bits, for RSA keys only
    pub modulus_bits: Option<u32>,
}

impl PublicKeyInfo {
    /// Parse DER-encoded SubjectPublicKeyInfo
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let spki = SubjectPublicKeyInfoRef::try_from(der)
            .map_err(|e| Error::InvalidKeyFormat(format!("invalid SubjectPublicKeyInfo: {}", e)))?;

        let oid = spki.algorithm.oid;
        let key_type = if oid == ID_ED_25519 {
            KeyType::Ed25519
        } else if oid == RSA_ENCRYPTION {
            KeyType::Rsa
        } else if oid == ID_EC_PUBLIC_KEY {
            let params = spki.algorithm.parameters.ok_or_else(|| {
                Error::InvalidKeyFormat("EC key missing curve parameters".to_string())
            })?;
            let curve_oid = ObjectIdentifier::from_bytes(params.value())
                .map_err(|e| Error::InvalidKeyFormat(format!("invalid EC curve OID: {}", e)))?;
            KeyType::Ecdsa(curve_from_oid(curve_oid)?)
        } else {
            return Err(Error::UnsupportedAlgorithm(format!(
                "public key algorithm OID {}",
                oid
            )));
        };

        let raw_key = spki
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| {
                Error::InvalidKeyFormat("subjectPublicKey has unused bits".to_string())
            })?
            .to_vec();

        let modulus_bits = match key_type {
            KeyType::Rsa => Some(rsa_modulus_bits(&raw_key)?),
            _ => None,
        };

        Ok(Self {
            key_type,
            raw_key,
            modulus_bits,
        })
    }

    /// The conventional signing scheme for this key
    ///
    /// RSA keys default to PKCS#1 v1.5 with SHA-256 since padding cannot be
    /// read from the key itself.
    pub fn default_scheme(&self) -> SigningScheme {
        match self.key_type {
            KeyType::Rsa => SigningScheme::RsaPkcs1Sha256,
            KeyType::Ecdsa(Curve::P256) => SigningScheme::EcdsaP256Sha256,
            KeyType::Ecdsa(Curve::P384) => SigningScheme::EcdsaP384Sha384,
            KeyType::Ecdsa(Curve::P521) => SigningScheme::EcdsaP521Sha512,
            KeyType::Ed25519 => SigningScheme::Ed25519,
        }
    }
}

/// Bit length of the modulus in a PKCS#1 RSAPublicKey
fn rsa_modulus_bits(pkcs1: &[u8]) -> Result<u32> {
    let invalid = |e: der::Error| Error::InvalidKeyFormat(format!("invalid RSAPublicKey: {}", e));
    let mut reader = SliceReader::new(pkcs1).map_err(invalid)?;
    let bits = reader
        .sequence(|seq| {
            let modulus = UintRef::decode(seq)?;
            let _exponent = UintRef::decode(seq)?;
            Ok(bit_length(modulus.as_bytes()))
        })
        .map_err(invalid)?;
    reader.finish(bits).map_err(invalid)
}

/// Bit length of a big-endian unsigned integer without leading zero bytes
fn bit_length(bytes: &[u8]) -> u32 {
    match bytes.first() {
        Some(first) => bytes.len() as u32 * 8 - first.leading_zeros(),
        None => 0,
    }
}

fn curve_from_oid(oid: ObjectIdentifier) -> Result<Curve> {
    if oid == SECP_256_R_1 {
        Ok(Curve::P256)
    } else if oid == SECP_384_R_1 {
        Ok(Curve::P384)
    } else if oid == SECP_521_R_1 {
        Ok(Curve::P521)
    } else {
        Err(Error::UnsupportedAlgorithm(format!("EC curve OID {}", oid)))
    }
}
