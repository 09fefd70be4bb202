//! Hashing utilities using aws-lc-rs

use aws_lc_rs::digest::{self, SHA256, SHA384, SHA512};
use sigstore_types::HashAlgorithm;

/// Hash data using SHA-256
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let digest = digest::digest(&SHA256, data);
    let mut result = [0u8; 32];
    result.copy_from_slice(digest.as_ref());
    result
}

/// Hex-encoded SHA-256, the form used for trust-root entity identifiers
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Hash data with a SHA-2 algorithm, `None` for algorithms aws-lc-rs lacks
pub fn digest(algorithm: HashAlgorithm, data: &[u8]) -> Option<Vec<u8>> {
    let alg = match algorithm {
        HashAlgorithm::Sha2256 => &SHA256,
        HashAlgorithm::Sha2384 => &SHA384,
        HashAlgorithm::Sha2512 => &SHA512,
        HashAlgorithm::Sha3256 | HashAlgorithm::Sha3384 => return None,
    };
    Some(digest::digest(alg, data).as_ref().to_vec())
}
