//! Streaming transport abstraction and the reqwest-backed implementation.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt, TryStreamExt};
use reqwest::Client;
use reqwest::header::CONTENT_LENGTH;
use tracing::{debug, instrument};
use url::Url;

use super::error::DownloadError;

/// Connect timeout for HTTP requests, in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Read timeout for HTTP requests, in seconds. Generous because the
/// combined-period ZIP archives are large.
const READ_TIMEOUT_SECS: u64 = 300;

/// A finite, ordered, non-restartable sequence of body chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, DownloadError>> + Send>>;

/// A streamed response body with its expected total size.
pub struct FetchedBody {
    /// Expected size in bytes, 0 when the server did not report one.
    pub total_size: u64,
    /// The body chunks, in response order.
    pub stream: ByteStream,
}

impl std::fmt::Debug for FetchedBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchedBody")
            .field("total_size", &self.total_size)
            .finish_non_exhaustive()
    }
}

/// Issues streaming GET requests.
///
/// The production implementation is [`HttpTransport`]; tests substitute
/// in-memory transports with controllable chunking and induced failures.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a streaming GET against `url`.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the URL is invalid, the connection
    /// fails or times out, or the server responds with a non-success
    /// status.
    async fn fetch_stream(&self, url: &str) -> Result<FetchedBody, DownloadError>;
}

/// Drains a fetched body into a UTF-8 string.
///
/// Used for the listing page, which is consumed as text rather than
/// written to disk.
///
/// # Errors
///
/// Returns `DownloadError` if a chunk fails mid-stream or the collected
/// body is not valid UTF-8.
pub async fn collect_utf8(body: FetchedBody, url: &str) -> Result<String, DownloadError> {
    let capacity = usize::try_from(body.total_size).unwrap_or(0);
    let mut buffer: Vec<u8> = Vec::with_capacity(capacity);
    let mut stream = body.stream;
    while let Some(chunk) = stream.next().await {
        buffer.extend_from_slice(&chunk?);
    }
    String::from_utf8(buffer).map_err(|_| DownloadError::invalid_body(url))
}

/// HTTP transport with streaming support.
///
/// Designed to be created once and reused for every request of a crawl,
/// taking advantage of connection pooling.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Creates a new transport with default timeouts.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new transport with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the
    /// supplied timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(concat!("btscrape/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_stream(&self, url: &str) -> Result<FetchedBody, DownloadError> {
        // Validate before sending so malformed hrefs fail with a clear error.
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url)
            } else {
                DownloadError::network(url, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        // Absent or non-numeric Content-Length reads as 0 (unknown).
        let total_size = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        debug!(total_size, "response headers received");

        let owned_url = url.to_string();
        let stream = response
            .bytes_stream()
            .map_err(move |e| DownloadError::network(owned_url.clone(), e))
            .boxed();

        Ok(FetchedBody { total_size, stream })
    }
}
