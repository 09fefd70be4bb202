//! Sigstore trusted root parsing and key resolution
//!
//! A trusted root bundles every trust anchor verification needs:
//! - Fulcio certificate authorities (for signing certificates)
//! - Rekor transparency log public keys (for log entry verification)
//! - Certificate Transparency log public keys (for SCT verification)
//! - Timestamp authority certificates (for RFC 3161 timestamp verification)
//!
//! Each anchor carries a validity window, and keys are resolved into
//! [`TimeConstrainedVerifier`]s that report whether they were trusted at a
//! given time.
//!
//! # Example
//!
//! ```no_run
//! use sigstore_trust_root::{TrustedMaterial, TrustedMaterialCollection, TrustedRoot};
//! use std::sync::Arc;
//!
//! let root = TrustedRoot::from_file("trusted_root.json").unwrap();
//! let collection = TrustedMaterialCollection::new(vec![Arc::new(root)]);
//! let verifier = collection
//!     .public_key_verifier("df9887d4d46ac3289a3081eafbd1c80668971f8646163f68f3d84a26b6901179")
//!     .unwrap();
//! assert!(verifier.valid_at_time(chrono::Utc::now()));
//! ```

pub mod authority;
pub mod error;
pub mod key_details;
pub mod material;
pub mod transparency_log;
pub mod trusted_root;
pub mod validity;
pub mod verifier;
pub mod wire;

pub use authority::{AuthoritySubject, CertificateAuthority, CertificateChain, TimestampingAuthority};
pub use error::{Error, Result};
pub use key_details::{AlgorithmDetails, KeyAlgorithm, PublicKeyDetails, RsaPadding};
pub use material::{TrustedMaterial, TrustedMaterialCollection, TrustedPublicKeyMaterial};
pub use transparency_log::TransparencyLogInstance;
pub use trusted_root::{TrustedRoot, TRUSTED_ROOT_MEDIA_TYPE_V0_1, TRUSTED_ROOT_MEDIA_TYPE_V0_2};
pub use validity::ValidityPeriod;
pub use verifier::{ExpiringKey, TimeConstrainedVerifier};
pub use wire::RawTrustedRoot;
