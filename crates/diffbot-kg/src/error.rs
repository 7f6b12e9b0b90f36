//! Error types for the Diffbot Knowledge Graph client
//!
//! Every failed exchange is classified into exactly one variant. The session
//! never retries on its own: [`Error::is_retryable`] tells the caller whether
//! repeating the request could help, and [`Error::UrlTooLong`] tells it to
//! switch transport instead.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for operations that can fail with a client error.
pub type Result<T> = std::result::Result<T, Error>;

/// Status codes that signal a transient upstream condition.
pub const RETRYABLE_STATUS_CODES: [u16; 5] = [408, 429, 500, 502, 503];

/// Main error type for the client.
#[derive(Debug, Error)]
pub enum Error {
    /// Network failure before a status line was received (connection
    /// refused, DNS, TLS, body read interrupted).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The exchange did not finish within its timeout.
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// Upstream answered with a transient status (408, 429, 500, 502, 503).
    #[error("Retryable API error (status {status}): {body}")]
    Retryable {
        /// HTTP status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
        /// Delay requested by a `Retry-After` header, if any
        retry_after: Option<Duration>,
    },

    /// Upstream rejected the request URI as too long (414).
    ///
    /// Resend as POST rather than retrying the same GET.
    #[error("URL too long (status {status}): {body}")]
    UrlTooLong {
        /// HTTP status code, always 414
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// Any other non-success status. Not retryable.
    #[error("API error (status {status}): {body}")]
    Client {
        /// HTTP status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// The response body did not match its declared content type.
    #[error("Failed to parse API response: {0}")]
    Parse(String),

    /// A well-formed payload is missing a field a typed accessor needs.
    #[error("Lookup failed: {0}")]
    Lookup(String),

    /// The session was closed while the request was queued or in flight.
    #[error("Session closed before the request completed")]
    SessionClosed,

    /// A default parameter is not accepted by this client.
    #[error("Invalid param: {0}")]
    InvalidParam(String),

    /// The call itself is malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid HTTP header name.
    #[error("Invalid HTTP header name: {0}")]
    InvalidHeaderName(String),

    /// Invalid HTTP header value.
    #[error("Invalid HTTP header value: {0}")]
    InvalidHeaderValue(String),

    /// HTTP client configuration or initialization error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Missing required configuration.
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),
}

impl Error {
    /// Classify a non-success HTTP status.
    ///
    /// 2xx statuses are not errors; callers only reach this for everything else.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            s if RETRYABLE_STATUS_CODES.contains(&s) => Error::Retryable {
                status,
                body,
                retry_after: None,
            },
            414 => Error::UrlTooLong { status, body },
            _ => Error::Client { status, body },
        }
    }

    /// Attach a server-requested delay to a retryable error.
    pub(crate) fn with_retry_after(self, delay: Option<Duration>) -> Self {
        match self {
            Error::Retryable { status, body, .. } => Error::Retryable {
                status,
                body,
                retry_after: delay,
            },
            other => other,
        }
    }

    /// Map a `reqwest` failure that happened before a status was available.
    ///
    /// The request URL is stripped first: it carries the token in its query.
    pub(crate) fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        let error = error.without_url();
        if error.is_timeout() {
            Error::Timeout(timeout)
        } else if error.is_builder() {
            Error::HttpClient(error.to_string())
        } else {
            Error::Transport(error.to_string())
        }
    }

    /// The HTTP status carried by status-derived errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Retryable { status, .. }
            | Error::UrlTooLong { status, .. }
            | Error::Client { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The response body carried by status-derived errors.
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::Retryable { body, .. }
            | Error::UrlTooLong { body, .. }
            | Error::Client { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Check if repeating the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Retryable { .. })
    }

    /// How long upstream asked the caller to wait before retrying.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::Retryable { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Parse(error.to_string())
    }
}

impl diffbot_kg_core::retry::Retryable for Error {
    fn is_retryable(&self) -> bool {
        Error::is_retryable(self)
    }

    fn retry_after(&self) -> Option<Duration> {
        Error::retry_after(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_retryable_status_codes() {
        for status in RETRYABLE_STATUS_CODES {
            let error = Error::from_status(status, "busy");
            assert_matches!(error, Error::Retryable { status: s, .. } if s == status);
            assert!(error.is_retryable());
        }
    }

    #[test]
    fn test_414_is_url_too_long() {
        let error = Error::from_status(414, "Request-URI Too Long");
        assert_matches!(error, Error::UrlTooLong { status: 414, .. });
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_other_statuses_are_client_errors() {
        for status in [400, 401, 403, 404, 422, 501, 504] {
            let error = Error::from_status(status, "nope");
            assert_matches!(error, Error::Client { .. });
            assert_eq!(error.status(), Some(status));
            assert!(!error.is_retryable());
        }
    }

    #[test]
    fn test_body_is_preserved() {
        let error = Error::from_status(403, r#"{"error":"Not authorized API token."}"#);
        assert_eq!(error.body(), Some(r#"{"error":"Not authorized API token."}"#));
        assert!(error.to_string().contains("403"));
    }

    #[test]
    fn test_non_status_errors_carry_no_status() {
        assert_eq!(Error::Timeout(Duration::from_secs(1)).status(), None);
        assert_eq!(Error::Parse("bad".into()).body(), None);
        assert!(!Error::Transport("refused".into()).is_retryable());
        assert!(!Error::SessionClosed.is_retryable());
    }

    #[test]
    fn test_retry_after_only_on_retryable() {
        let error =
            Error::from_status(429, "slow down").with_retry_after(Some(Duration::from_secs(3)));
        assert_eq!(error.retry_after(), Some(Duration::from_secs(3)));

        let error = Error::from_status(404, "").with_retry_after(Some(Duration::from_secs(3)));
        assert_eq!(error.retry_after(), None);
    }

    #[tokio::test]
    async fn test_reqwest_errors_drop_the_url() {
        let error = reqwest::Client::new()
            .get("http://127.0.0.1:1/kg/v3/dql?token=do-not-leak")
            .send()
            .await
            .unwrap_err();

        let error = Error::from_reqwest(error, Duration::from_secs(1));
        assert_matches!(error, Error::Transport(_));
        assert!(!error.to_string().contains("do-not-leak"));
        assert!(!format!("{error:?}").contains("do-not-leak"));
    }

    #[test]
    fn test_serde_error_becomes_parse() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_matches!(Error::from(err), Error::Parse(_));
    }

    #[test]
    fn test_retryable_trait_matches_inherent() {
        use diffbot_kg_core::retry::Retryable;

        assert!(Retryable::is_retryable(&Error::from_status(503, "")));
        assert!(!Retryable::is_retryable(&Error::from_status(404, "")));
    }
}
