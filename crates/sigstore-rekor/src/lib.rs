//! Rekor transparency log submission for Sigstore
//!
//! [`Rekor`] turns a signed [`Bundle`](sigstore_types::Bundle) into a
//! proposed log entry, submits it through a [`LogEntryClient`] and appends
//! the returned entry, with its inclusion proof, to the bundle.
//!
//! # Example
//!
//! ```no_run
//! use sigstore_rekor::{Rekor, RekorOptions};
//! use sigstore_types::Bundle;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(mut bundle: Bundle, public_key_pem: &[u8]) -> sigstore_rekor::Result<()> {
//! let rekor = Rekor::new(RekorOptions::staging().with_retries(3));
//! rekor
//!     .submit_artifact(&CancellationToken::new(), public_key_pem, &mut bundle)
//!     .await?;
//! assert!(!bundle.tlog_entries().is_empty());
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod client;
pub mod entry;
pub mod error;
pub mod proposed;
pub mod transparency;

pub use body::EntryBody;
pub use client::{CreateLogEntryCreated, CreateLogEntryParams, LogEntryClient, RekorClient};
pub use entry::{LogEntry, LogEntryResponse, RekorInclusionProof, Verification};
pub use error::{Error, Result};
pub use proposed::{
    ArtifactProperties, DsseEntry, EntryKind, HashedRekord, PkiFormat, ProposedEntry,
    ProposedEntryFactory, RekorV1EntryFactory,
};
pub use transparency::{Rekor, RekorOptions, Transparency, DEFAULT_TIMEOUT};
