use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use worldex_core::WorldexError;

/// Status and body of one HTTP GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Successful response with `body`.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Response with `status` and an empty body.
    #[must_use]
    pub const fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }

    /// True for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// HTTP abstraction (so adapters can be driven by canned bodies in tests).
///
/// Non-2xx statuses are returned as responses, not errors; only transport failures are
/// errors.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// Perform a GET.
    async fn get(&self, url: &str) -> Result<HttpResponse, WorldexError>;
}

impl dyn HttpFetch {
    /// Build an `HttpFetch` from a closure over the requested URL.
    pub fn from_fn<F>(f: F) -> Arc<dyn HttpFetch>
    where
        F: Send + Sync + 'static + Fn(&str) -> Result<HttpResponse, WorldexError>,
    {
        struct FnFetch<F>(F);

        #[async_trait]
        impl<F> HttpFetch for FnFetch<F>
        where
            F: Send + Sync + 'static + Fn(&str) -> Result<HttpResponse, WorldexError>,
        {
            async fn get(&self, url: &str) -> Result<HttpResponse, WorldexError> {
                (self.0)(url)
            }
        }

        Arc::new(FnFetch(f))
    }
}

/// Production fetcher backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Client with the crate user agent and a per-request timeout.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self, WorldexError> {
        let client = reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| WorldexError::InvalidArg(format!("http client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "worldex_sources::http::get", skip(self), fields(url = %url))
    )]
    async fn get(&self, url: &str) -> Result<HttpResponse, WorldexError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WorldexError::Other(format!("GET {url}: {e}")))?;
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| WorldexError::Other(format!("GET {url}: reading body: {e}")))?;
        #[cfg(feature = "tracing")]
        tracing::debug!(status, bytes = body.len(), "response");
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Per-source request helper: attributes errors and spaces out consecutive requests.
#[derive(Clone)]
pub(crate) struct Requester {
    http: Arc<dyn HttpFetch>,
    source: &'static str,
    delay: Duration,
}

impl Requester {
    pub(crate) fn new(http: Arc<dyn HttpFetch>, source: &'static str, delay: Duration) -> Self {
        Self {
            http,
            source,
            delay,
        }
    }

    pub(crate) const fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// GET returning the raw response; transport errors are attributed to the source.
    pub(crate) async fn response(&self, url: &str) -> Result<HttpResponse, WorldexError> {
        self.http
            .get(url)
            .await
            .map_err(|e| WorldexError::source_unavailable(self.source, e.to_string()))
    }

    /// GET requiring a 2xx status.
    pub(crate) async fn bytes(&self, url: &str) -> Result<Vec<u8>, WorldexError> {
        let resp = self.response(url).await?;
        if !resp.is_success() {
            return Err(WorldexError::source_unavailable(
                self.source,
                format!("HTTP {} for {url}", resp.status),
            ));
        }
        Ok(resp.body)
    }

    /// GET and parse a JSON body.
    pub(crate) async fn json(&self, url: &str) -> Result<Value, WorldexError> {
        let body = self.bytes(url).await?;
        serde_json::from_slice(&body)
            .map_err(|e| WorldexError::decode(self.source, format!("{url}: {e}")))
    }

    /// Politeness delay between consecutive requests.
    pub(crate) async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Failed fetches of a multi-request source: keep going, but fail if nothing succeeded.
pub(crate) fn finish(
    source: &'static str,
    payload: worldex_core::Payload,
    last_err: Option<WorldexError>,
) -> Result<worldex_core::Payload, WorldexError> {
    if payload.is_empty() {
        return Err(last_err
            .unwrap_or_else(|| WorldexError::source_unavailable(source, "nothing to fetch")));
    }
    Ok(payload)
}
