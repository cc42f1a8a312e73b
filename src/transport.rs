//! Transport boundary and the shared HTTP client.
//!
//! The engine fetches exactly the requests an adapter built and nothing
//! else. It performs no retry or backoff; a [`Transport`] may, but the
//! built-in [`HttpTransport`] does not.

use std::time::Duration;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::request::IndexerRequest;

/// User-Agent sent when the configuration does not override it.
const DEFAULT_USER_AGENT: &str = concat!("release-search/", env!("CARGO_PKG_VERSION"));

/// A response body as received from an indexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    pub body: String,
    pub content_type: Option<String>,
}

impl RawPayload {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: None,
        }
    }
}

/// Fetches one request descriptor.
///
/// Implementations must be `Send + Sync`; the dispatcher shares one
/// transport across every concurrently running indexer.
pub trait Transport: Send + Sync {
    /// Fetch the request and return the raw body.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] for connection failures and non-success
    /// statuses, [`SearchError::Timeout`] when the request timed out.
    fn fetch(
        &self,
        request: &IndexerRequest,
    ) -> impl std::future::Future<Output = Result<RawPayload, SearchError>> + Send;
}

/// [`Transport`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport from the engine configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the client cannot be constructed.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: build_client(config)?,
        })
    }
}

impl Transport for HttpTransport {
    async fn fetch(&self, request: &IndexerRequest) -> Result<RawPayload, SearchError> {
        tracing::trace!(url = %request, "fetching indexer page");

        let response = self.client.get(&request.url).send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout(format!("{request}"))
            } else {
                SearchError::Http(format!("request to {request} failed: {}", e.without_url()))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Http(format!("HTTP {status} from {request}")));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("reading {request} failed: {}", e.without_url())))?;

        tracing::trace!(bytes = body.len(), "indexer page received");
        Ok(RawPayload { body, content_type })
    }
}

/// Build a [`reqwest::Client`] configured for indexer requests.
///
/// The client has:
/// - Per-request timeout from config
/// - The configured User-Agent, or the crate's own
/// - Brotli and gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    let ua = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}
