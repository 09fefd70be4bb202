//! Core types and data structures for Sigstore
//!
//! This crate provides the data shapes shared by the trust-root and
//! transparency-log crates: the bundle format, DSSE envelopes, hash
//! algorithm names and byte-field encodings.

pub mod bundle;
pub mod dsse;
pub mod encoding;
pub mod error;
pub mod hash;

pub use bundle::{
    Bundle, CheckpointData, InclusionPromise, InclusionProof, KindVersion, LogId, MediaType,
    MessageDigest, MessageSignature, SignatureContent, TransparencyLogEntry, VerificationMaterial,
    VerificationMaterialContent,
};
pub use dsse::{DsseEnvelope, DsseSignature};
pub use encoding::{
    string_i64, CanonicalizedBody, DerCertificate, DerPublicKey, DigestBytes, LogKeyId,
    PayloadBytes, Sha256Hash, SignatureBytes, SignedTimestamp, TimestampToken,
};
pub use error::{Error, Result};
pub use hash::HashAlgorithm;
