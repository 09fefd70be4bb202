//! Log-submission clients
//!
//! [`LogEntryClient`] is the one operation the submitter needs from a
//! transport. [`RekorClient`] implements it over HTTP with reqwest.

use crate::entry::LogEntryResponse;
use crate::error::{Error, Result};
use crate::proposed::ProposedEntry;
use async_trait::async_trait;
use reqwest::header::ETAG;
use reqwest::StatusCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("sigstore-rust/", env!("CARGO_PKG_VERSION"));

const BACKOFF_BASE: Duration = Duration::from_millis(100);
const BACKOFF_MAX: Duration = Duration::from_secs(5);

/// Parameters of a `createLogEntry` call
#[derive(Debug, Clone)]
pub struct CreateLogEntryParams {
    /// Entry to add
    pub proposed_entry: ProposedEntry,
    /// Per-request timeout, `None` for no limit
    pub timeout: Option<Duration>,
    /// Aborts the call when cancelled
    pub cancel: CancellationToken,
}

/// Successful `createLogEntry` response
#[derive(Debug, Clone, Default)]
pub struct CreateLogEntryCreated {
    /// UUID of the created entry, from the `ETag` header
    pub etag: Option<String>,
    /// Location of the created entry
    pub location: Option<String>,
    /// Entries keyed by UUID
    pub payload: LogEntryResponse,
}

/// A client that can add entries to a transparency log
#[async_trait]
pub trait LogEntryClient: Send + Sync {
    /// Submit a proposed entry and return the log's answer
    async fn create_log_entry(&self, params: CreateLogEntryParams) -> Result<CreateLogEntryCreated>;
}

/// A client for interacting with Rekor
#[derive(Debug, Clone)]
pub struct RekorClient {
    /// Base URL of the Rekor instance
    url: Url,
    /// Extra attempts after the first one
    retries: u32,
    /// HTTP client
    client: reqwest::Client,
}

impl RekorClient {
    /// Create a new Rekor client
    pub fn new(url: &str) -> Result<Self> {
        let mut url = Url::parse(url).map_err(|e| Error::Config(format!("{}: {}", url, e)))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(Self {
            url,
            retries: 0,
            client,
        })
    }

    /// Create a client for the public Sigstore Rekor instance
    pub fn public() -> Result<Self> {
        Self::new("https://rekor.sigstore.dev")
    }

    /// Create a client for the Sigstore staging Rekor instance
    pub fn staging() -> Result<Self> {
        Self::new("https://rekor.sigstage.dev")
    }

    /// Retry transient failures up to `retries` more times
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Base URL of the log
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn entries_url(&self) -> Result<Url> {
        self.url
            .join("api/v1/log/entries")
            .map_err(|e| Error::Config(e.to_string()))
    }

    async fn post_entry(
        &self,
        url: &Url,
        params: &CreateLogEntryParams,
    ) -> std::result::Result<reqwest::Response, Attempt> {
        let mut request = self.client.post(url.clone()).json(&params.proposed_entry);
        if let Some(timeout) = params.timeout {
            request = request.timeout(timeout);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => Ok(response),
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                let err = Error::Api(format!("failed to create entry: {} - {}", status, body));
                if is_retryable_status(status) {
                    Err(Attempt::Retry(err))
                } else {
                    Err(Attempt::Fail(err))
                }
            }
            Err(e) if e.is_connect() || e.is_timeout() => Err(Attempt::Retry(Error::Http(e.to_string()))),
            Err(e) => Err(Attempt::Fail(Error::Http(e.to_string()))),
        }
    }
}

/// Outcome of a failed attempt
enum Attempt {
    Retry(Error),
    Fail(Error),
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Delay before retry number `attempt` (1-based)
fn backoff(attempt: u32) -> Duration {
    BACKOFF_BASE
        .saturating_mul(1u32 << attempt.saturating_sub(1).min(16))
        .min(BACKOFF_MAX)
}

/// Total backoff slept across `retries` retries
pub(crate) fn retry_budget(retries: u32) -> Duration {
    (1..=retries).map(backoff).sum()
}

fn cancelled() -> Error {
    Error::Cancelled("request to Rekor was cancelled".to_string())
}

#[async_trait]
impl LogEntryClient for RekorClient {
    async fn create_log_entry(&self, params: CreateLogEntryParams) -> Result<CreateLogEntryCreated> {
        let url = self.entries_url()?;
        let mut attempt = 0;

        let response = loop {
            let result = tokio::select! {
                _ = params.cancel.cancelled() => return Err(cancelled()),
                r = self.post_entry(&url, &params) => r,
            };

            match result {
                Ok(response) => break response,
                Err(Attempt::Retry(err)) if attempt < self.retries => {
                    attempt += 1;
                    let delay = backoff(attempt);
                    tracing::debug!(attempt, ?delay, error = %err, "retrying Rekor submission");
                    tokio::select! {
                        _ = params.cancel.cancelled() => return Err(cancelled()),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                Err(Attempt::Retry(err)) | Err(Attempt::Fail(err)) => return Err(err),
            }
        };

        let header = |name| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim_matches('"').to_string())
        };
        let etag = header(ETAG);
        let location = header(reqwest::header::LOCATION);

        let payload: LogEntryResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(format!("failed to parse JSON: {}", e)))?;

        Ok(CreateLogEntryCreated {
            etag,
            location,
            payload,
        })
    }
}
