//! Submitting signed artifacts to a transparency log

use crate::client::{
    retry_budget, CreateLogEntryCreated, CreateLogEntryParams, LogEntryClient, RekorClient,
};
use crate::entry::LogEntry;
use crate::error::{Error, Result};
use crate::proposed::{
    ArtifactProperties, EntryKind, PkiFormat, ProposedEntry, ProposedEntryFactory,
    RekorV1EntryFactory,
};
use async_trait::async_trait;
use sigstore_types::Bundle;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Timeout used when none, or zero, is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Production Rekor instance
pub const PRODUCTION_REKOR_URL: &str = "https://rekor.sigstore.dev";

/// Staging Rekor instance
pub const STAGING_REKOR_URL: &str = "https://rekor.sigstage.dev";

/// Something that records signed bundles in a transparency log
#[async_trait]
pub trait Transparency: Send + Sync {
    /// Log the bundle's signature and append the resulting entry to the bundle
    async fn get_transparency_log_entry(
        &self,
        cancel: &CancellationToken,
        public_key: &[u8],
        bundle: &mut Bundle,
    ) -> Result<()>;
}

/// Configuration for [`Rekor`]
#[derive(Clone)]
pub struct RekorOptions {
    /// Base URL of the Rekor instance
    pub base_url: String,
    /// Timeout of each request; `None` disables it and zero selects
    /// [`DEFAULT_TIMEOUT`]. See [`RekorOptions::submission_deadline`] for the
    /// bound on a whole submission.
    pub timeout: Option<Duration>,
    /// Retries performed by the default client
    pub retries: u32,
    /// Client to use instead of an HTTP client built from `base_url`
    pub client: Option<Arc<dyn LogEntryClient>>,
    /// Turns artifact properties into request bodies
    pub entry_factory: Arc<dyn ProposedEntryFactory>,
}

impl Default for RekorOptions {
    fn default() -> Self {
        Self::production()
    }
}

impl fmt::Debug for RekorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RekorOptions")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .field("client", &self.client.as_ref().map(|_| "<injected>"))
            .finish_non_exhaustive()
    }
}

impl RekorOptions {
    /// Options for the given log
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Some(DEFAULT_TIMEOUT),
            retries: 1,
            client: None,
            entry_factory: Arc::new(RekorV1EntryFactory),
        }
    }

    /// Options for the public good instance
    pub fn production() -> Self {
        Self::new(PRODUCTION_REKOR_URL)
    }

    /// Options for the staging instance
    pub fn staging() -> Self {
        Self::new(STAGING_REKOR_URL)
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry count of the default client
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Use an existing client
    pub fn with_client(mut self, client: Arc<dyn LogEntryClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Use a different entry factory
    pub fn with_entry_factory(mut self, factory: Arc<dyn ProposedEntryFactory>) -> Self {
        self.entry_factory = factory;
        self
    }

    /// The timeout actually applied to a submission
    pub fn effective_timeout(&self) -> Option<Duration> {
        match self.timeout {
            Some(t) if t.is_zero() => Some(DEFAULT_TIMEOUT),
            other => other,
        }
    }

    /// Upper bound on a whole submission
    ///
    /// Every attempt the retry policy allows gets the full request timeout,
    /// plus the backoff slept between attempts.
    pub fn submission_deadline(&self) -> Option<Duration> {
        self.effective_timeout().map(|per_request| {
            per_request
                .saturating_mul(self.retries.saturating_add(1))
                .saturating_add(retry_budget(self.retries))
        })
    }
}

/// A Rekor transparency log
///
/// The HTTP client is created on the first submission unless one was
/// injected through [`RekorOptions::client`].
pub struct Rekor {
    options: RekorOptions,
    client: OnceLock<Arc<dyn LogEntryClient>>,
}

impl fmt::Debug for Rekor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rekor").field("options", &self.options).finish()
    }
}

impl Rekor {
    /// Create a submitter
    pub fn new(options: RekorOptions) -> Self {
        let client = OnceLock::new();
        if let Some(injected) = &options.client {
            let _ = client.set(Arc::clone(injected));
        }
        Self { options, client }
    }

    /// The options this submitter was built with
    pub fn options(&self) -> &RekorOptions {
        &self.options
    }

    fn client(&self) -> Result<Arc<dyn LogEntryClient>> {
        if let Some(client) = self.client.get() {
            return Ok(Arc::clone(client));
        }
        let built: Arc<dyn LogEntryClient> = Arc::new(
            RekorClient::new(&self.options.base_url)?.with_retries(self.options.retries),
        );
        // A concurrent caller may have won the race; use whichever was stored
        Ok(Arc::clone(self.client.get_or_init(|| built)))
    }

    /// Build the proposed entry for the bundle's signature
    pub fn proposed_entry(&self, public_key: &[u8], bundle: &Bundle) -> Result<ProposedEntry> {
        let mut properties = ArtifactProperties {
            public_key_bytes: vec![public_key.to_vec()],
            ..Default::default()
        };

        let kind = if let Some(envelope) = bundle.dsse_envelope() {
            properties.artifact_bytes = serde_json::to_vec(envelope)?;
            EntryKind::Dsse
        } else if let Some(signature) = bundle.message_signature() {
            if bundle.signing_certificate().is_none() {
                return Err(Error::MissingCertificate);
            }
            let digest = signature
                .message_digest
                .as_ref()
                .ok_or(Error::MissingMessageDigest)?;
            properties.pki_format = Some(PkiFormat::X509);
            properties.signature_bytes = signature.signature.as_bytes().to_vec();
            properties.artifact_hash = digest.to_prefixed_hex();
            EntryKind::HashedRekord
        } else {
            return Err(Error::NoSignaturePresent);
        };

        self.options
            .entry_factory
            .create_proposed_entry(kind, &properties)
    }

    /// Submit the bundle's signature and append the new log entry to it
    ///
    /// The bundle is left untouched when any step fails.
    pub async fn submit_artifact(
        &self,
        cancel: &CancellationToken,
        public_key: &[u8],
        bundle: &mut Bundle,
    ) -> Result<()> {
        let proposed_entry = self.proposed_entry(public_key, bundle)?;
        tracing::debug!(kind = proposed_entry.kind(), url = %self.options.base_url, "submitting to Rekor");

        let params = CreateLogEntryParams {
            proposed_entry,
            timeout: self.options.effective_timeout(),
            cancel: cancel.clone(),
        };
        let client = self.client()?;

        let call = async {
            match self.options.submission_deadline() {
                Some(limit) => tokio::time::timeout(limit, client.create_log_entry(params))
                    .await
                    .map_err(|_| Error::Cancelled(format!("no response within {:?}", limit)))?,
                None => client.create_log_entry(params).await,
            }
        };
        let response = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(Error::Cancelled("submission was cancelled".to_string()));
            }
            r = call => r?,
        };

        let entry = select_entry(response)?;
        let tlog_entry = entry.to_transparency_log_entry()?;
        tracing::debug!(log_index = tlog_entry.log_index, uuid = %entry.uuid, "Rekor entry created");

        bundle.add_tlog_entry(tlog_entry);
        Ok(())
    }
}

/// Pick the created entry, preferring the one named by the `ETag` header
fn select_entry(response: CreateLogEntryCreated) -> Result<LogEntry> {
    let CreateLogEntryCreated { etag, payload, .. } = response;

    let selected = match etag {
        Some(uuid) if payload.contains_key(&uuid) => payload.into_iter().find(|(k, _)| *k == uuid),
        _ if payload.len() == 1 => payload.into_iter().next(),
        _ => None,
    };

    match selected {
        Some((uuid, mut entry)) => {
            entry.uuid = uuid;
            Ok(entry)
        }
        None => Err(Error::InvalidResponse(
            "response does not identify the created entry".to_string(),
        )),
    }
}

#[async_trait]
impl Transparency for Rekor {
    async fn get_transparency_log_entry(
        &self,
        cancel: &CancellationToken,
        public_key: &[u8],
        bundle: &mut Bundle,
    ) -> Result<()> {
        self.submit_artifact(cancel, public_key, bundle).await
    }
}
