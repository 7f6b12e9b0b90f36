//! Configuration for the Diffbot Knowledge Graph clients

use crate::http::{DEFAULT_MAX_CONCURRENCY, DEFAULT_URL_LENGTH_THRESHOLD, SessionConfig};
use crate::params::Params;
use http::HeaderMap;
use secrecy::SecretString;
use serde_json::Value;
use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration shared by [`SearchClient`](crate::SearchClient) and
/// [`EnhanceClient`](crate::EnhanceClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API token, sent as the `token` query parameter
    pub token: Option<SecretString>,

    /// Base URL for the API
    pub base_url: Option<String>,

    /// Default timeout for requests
    pub timeout: Duration,

    /// Maximum number of requests in flight at once
    pub max_concurrency: usize,

    /// Optional requests-per-second pacing
    pub rate_limit: Option<RateLimitConfig>,

    /// Encoded URL length above which requests are sent as POST
    pub url_length_threshold: usize,

    /// Custom headers to include with every request
    pub default_headers: HeaderMap,

    /// Parameters added to every request (validated per client)
    pub default_params: Params,

    /// Connection pool configuration
    pub connection_pool: ConnectionPoolConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            rate_limit: None,
            url_length_threshold: DEFAULT_URL_LENGTH_THRESHOLD,
            default_headers: HeaderMap::new(),
            default_params: Params::new(),
            connection_pool: ConnectionPoolConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with a token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(SecretString::from(token.into())),
            ..Default::default()
        }
    }

    /// Create a new builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory (or a parent) is loaded first
    /// if one exists. This will look for:
    /// - `DIFFBOT_TOKEN` for authentication
    /// - `DIFFBOT_BASE_URL` for the API base URL
    /// - `DIFFBOT_TIMEOUT` for request timeout (in seconds)
    /// - `DIFFBOT_MAX_CONCURRENCY` for the in-flight request bound
    /// - `DIFFBOT_URL_LENGTH_THRESHOLD` for the GET/POST switch point
    ///
    /// Unparseable numbers are ignored and the default is kept.
    #[cfg(feature = "env")]
    pub fn from_env() -> crate::Result<Self> {
        use std::env;

        let _ = dotenvy::dotenv();
        let mut config = Self::default();

        if let Ok(token) = env::var("DIFFBOT_TOKEN")
            && !token.trim().is_empty()
        {
            config.token = Some(SecretString::from(token));
        }

        if let Ok(base_url) = env::var("DIFFBOT_BASE_URL") {
            config.base_url = Some(base_url);
        }

        if let Ok(timeout_str) = env::var("DIFFBOT_TIMEOUT")
            && let Ok(timeout_secs) = timeout_str.parse::<u64>()
        {
            config.timeout = Duration::from_secs(timeout_secs);
        }

        if let Ok(max_str) = env::var("DIFFBOT_MAX_CONCURRENCY")
            && let Ok(max) = max_str.parse::<usize>()
        {
            config.max_concurrency = max;
        }

        if let Ok(threshold_str) = env::var("DIFFBOT_URL_LENGTH_THRESHOLD")
            && let Ok(threshold) = threshold_str.parse::<usize>()
        {
            config.url_length_threshold = threshold;
        }

        Ok(config)
    }

    /// Merge this configuration with another, with the other taking precedence.
    ///
    /// Scalar settings are taken from `other` when they differ from the
    /// defaults; headers and parameters are overlaid key by key.
    pub fn merge(mut self, other: ClientConfig) -> Self {
        if other.token.is_some() {
            self.token = other.token;
        }
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.timeout != DEFAULT_TIMEOUT {
            self.timeout = other.timeout;
        }
        if other.max_concurrency != DEFAULT_MAX_CONCURRENCY {
            self.max_concurrency = other.max_concurrency;
        }
        if other.rate_limit.is_some() {
            self.rate_limit = other.rate_limit;
        }
        if other.url_length_threshold != DEFAULT_URL_LENGTH_THRESHOLD {
            self.url_length_threshold = other.url_length_threshold;
        }
        for (key, value) in other.default_headers.iter() {
            self.default_headers.insert(key.clone(), value.clone());
        }
        for (key, value) in &other.default_params {
            self.default_params.insert(key.clone(), value.clone());
        }
        if other.connection_pool != ConnectionPoolConfig::default() {
            self.connection_pool = other.connection_pool;
        }

        self
    }

    /// Settings the [`Session`](crate::Session) needs.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            timeout: self.timeout,
            max_concurrency: self.max_concurrency,
            rate_limit: self.rate_limit.clone(),
            default_headers: self.default_headers.clone(),
            connection_pool: self.connection_pool.clone(),
            ..SessionConfig::default()
        }
    }
}

/// Configuration for HTTP connection pooling.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPoolConfig {
    /// Maximum number of idle connections per host
    pub max_idle_per_host: usize,

    /// Idle connection timeout
    pub idle_timeout: Duration,

    /// TCP keep-alive interval
    pub tcp_keepalive: Option<Duration>,
}

impl Default for ConnectionPoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 10,
            idle_timeout: Duration::from_secs(90),
            tcp_keepalive: Some(Duration::from_secs(60)),
        }
    }
}

/// Requests-per-second pacing, applied on top of the concurrency bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Sustained requests per second. Zero is treated as one.
    pub requests_per_second: u32,

    /// Requests allowed back to back before pacing starts.
    /// Zero means "same as `requests_per_second`".
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst_size: 10,
        }
    }
}

/// Builder for creating ClientConfig with a fluent API.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(SecretString::from(token.into()));
        self
    }

    /// Set the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the in-flight request bound.
    pub fn max_concurrency(mut self, max: usize) -> Self {
        self.config.max_concurrency = max;
        self
    }

    /// Set the encoded URL length above which POST is used.
    pub fn url_length_threshold(mut self, threshold: usize) -> Self {
        self.config.url_length_threshold = threshold;
        self
    }

    /// Add a default header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid according to HTTP specifications.
    pub fn default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> crate::Result<Self> {
        let key_str = key.into();
        let value_str = value.into();

        let key: http::HeaderName = key_str
            .parse()
            .map_err(|_| crate::Error::InvalidHeaderName(key_str.clone()))?;
        let value: http::HeaderValue = value_str
            .parse()
            .map_err(|_| crate::Error::InvalidHeaderValue(value_str.clone()))?;

        self.config.default_headers.insert(key, value);
        Ok(self)
    }

    /// Add a default request parameter, such as `size` or `jsonmode`.
    pub fn default_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.default_params.insert(key, value);
        self
    }

    /// Enable rate limiting with default configuration.
    pub fn with_rate_limiting(mut self) -> Self {
        self.config.rate_limit = Some(RateLimitConfig::default());
        self
    }

    /// Set custom rate limiting configuration.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Set connection pool configuration.
    pub fn connection_pool(mut self, config: ConnectionPoolConfig) -> Self {
        self.config.connection_pool = config;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
