//! Cryptographic primitives for Sigstore
//!
//! Key inspection, signature verification, certificate decoding and
//! (mostly for tests) key generation, using aws-lc-rs as the backend.

pub mod error;
pub mod hash;
pub mod key;
pub mod signing;
pub mod verification;
pub mod x509;

pub use error::{Error, Result};
pub use hash::{digest, sha256, sha256_hex};
pub use key::{Curve, KeyType, PublicKeyInfo};
pub use signing::{spki_der_to_pem, KeyPair, PublicKeyPem, SigningScheme};
pub use verification::VerificationKey;
pub use x509::{certificate_public_key_der, parse_certificate, subject_name};
