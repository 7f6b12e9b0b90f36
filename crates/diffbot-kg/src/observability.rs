//! Structured logging for HTTP exchanges
//!
//! Every request the session sends is logged through this module. Only the
//! path and the length of the query string are recorded, never the query
//! itself, so the API token stays out of the logs.

use crate::http::RequestBuilder;
use crate::response::ContentKind;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// HTTP request metadata for structured logging
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// HTTP method (GET, POST)
    pub method: String,
    /// Request path
    pub path: String,
    /// Length in bytes of the encoded query string
    pub query_len: usize,
    /// Request body size in bytes (optional)
    pub body_size: Option<usize>,
}

impl RequestMetadata {
    /// Create new request metadata
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            query_len: 0,
            body_size: None,
        }
    }

    /// Describe a request by method and path only, so its parameters never
    /// reach the logs. Sizes are filled in once the request is encoded.
    pub fn from_request(request: &RequestBuilder) -> Self {
        Self::new(request.method().as_str(), request.url().path())
    }

    /// Set the encoded query string length
    pub fn with_query_len(mut self, len: usize) -> Self {
        self.query_len = len;
        self
    }

    /// Set the request body size
    pub fn with_body_size(mut self, size: usize) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Log request being sent
    pub fn log_request(&self) {
        debug!(
            method = %self.method,
            path = %self.path,
            query_len = self.query_len,
            body_size = self.body_size,
            "Sending HTTP request"
        );
    }
}

/// HTTP response metadata for structured logging
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// HTTP status code
    pub status: u16,
    /// Response body size in bytes (optional)
    pub body_size: Option<usize>,
    /// Time elapsed for the request
    pub elapsed: Duration,
    /// How the body was decoded, on success
    pub content_kind: Option<ContentKind>,
}

impl ResponseMetadata {
    /// Create new response metadata
    pub fn new(status: u16, elapsed: Duration) -> Self {
        Self {
            status,
            body_size: None,
            elapsed,
            content_kind: None,
        }
    }

    /// Set the response body size
    pub fn with_body_size(mut self, size: usize) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Set the decoded content kind
    pub fn with_content_kind(mut self, kind: ContentKind) -> Self {
        self.content_kind = Some(kind);
        self
    }

    /// Log successful response
    pub fn log_success(&self, request: &RequestMetadata) {
        info!(
            method = %request.method,
            path = %request.path,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis() as u64,
            body_size = self.body_size,
            content = self.content_kind.map(|kind| kind.as_str()),
            "HTTP request succeeded"
        );
    }

    /// Log failed response
    pub fn log_error(&self, request: &RequestMetadata, error: &dyn std::fmt::Display) {
        warn!(
            method = %request.method,
            path = %request.path,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis() as u64,
            error = %error,
            "HTTP request failed"
        );
    }
}

/// Timer for measuring request duration
#[derive(Debug)]
pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Falls back to `diffbot_kg=info` when `RUST_LOG` is unset. Calling it twice
/// is harmless; the second call does nothing.
#[cfg(feature = "trace")]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("diffbot_kg=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
