//! The HTTP session
//!
//! A [`Session`] owns one connection pool and one [`ConcurrencyLimiter`].
//! Both are built lazily on first use and torn down by [`Session::close`];
//! the next request after a close builds them again.
//!
//! The session classifies failures but never retries. See
//! [`Error::is_retryable`] and [`crate::retry`] for caller-side retries.

use super::limiter::{ConcurrencyLimiter, DEFAULT_MAX_CONCURRENCY};
use super::request::RequestBuilder;
use crate::config::{ConnectionPoolConfig, DEFAULT_TIMEOUT, RateLimitConfig};
use crate::error::{Error, Result};
use crate::observability::{RequestMetadata, RequestTimer, ResponseMetadata};
use crate::params::Params;
use crate::response::DiffbotResponse;
use http::header::RETRY_AFTER;
use http::HeaderMap;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;
use url::Url;

/// Settings for a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Default timeout for each exchange
    pub timeout: Duration,
    /// Maximum number of exchanges in flight
    pub max_concurrency: usize,
    /// Optional requests-per-second pacing
    pub rate_limit: Option<RateLimitConfig>,
    /// Headers sent with every request
    pub default_headers: HeaderMap,
    /// Connection pool tuning
    pub connection_pool: ConnectionPoolConfig,
    /// `User-Agent` header value
    pub user_agent: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            rate_limit: None,
            default_headers: HeaderMap::new(),
            connection_pool: ConnectionPoolConfig::default(),
            user_agent: format!("diffbot-kg-rust/{}", crate::VERSION),
        }
    }
}

/// A shared, lazily-opened HTTP session.
///
/// Cloning is cheap and every clone drives the same pool and limiter.
///
/// # Example
///
/// ```rust,no_run
/// use diffbot_kg::{Params, Session, SessionConfig};
/// use url::Url;
///
/// # async fn example() -> diffbot_kg::Result<()> {
/// let session = Session::new(SessionConfig::default());
/// let url = Url::parse("https://kg.diffbot.com/kg/v3/dql").unwrap();
/// let response = session
///     .get(url, Params::new().with("token", "...").with("query", "type:Organization"), None)
///     .await?;
/// println!("{:?}", response.status());
/// session.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    config: SessionConfig,
    state: Mutex<Option<Arc<OpenState>>>,
    pools_created: AtomicUsize,
}

/// Resources that exist only while the session is open.
#[derive(Debug)]
struct OpenState {
    http: reqwest::Client,
    limiter: ConcurrencyLimiter,
    closed: watch::Sender<bool>,
}

impl OpenState {
    fn build(config: &SessionConfig) -> Result<Self> {
        let pool = &config.connection_pool;
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(config.default_headers.clone())
            .pool_max_idle_per_host(pool.max_idle_per_host)
            .pool_idle_timeout(pool.idle_timeout);
        if let Some(keepalive) = pool.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }
        let http = builder
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;

        let mut limiter = ConcurrencyLimiter::new(config.max_concurrency)?;
        if let Some(rate_limit) = &config.rate_limit {
            limiter = limiter.with_rate_limit(rate_limit);
        }

        let (closed, _) = watch::channel(false);
        Ok(Self {
            http,
            limiter,
            closed,
        })
    }

    fn shutdown(&self) {
        self.limiter.close();
        self.closed.send_replace(true);
    }
}

impl Session {
    /// Create a closed session. Nothing is allocated until the first request
    /// or an explicit [`open`](Self::open).
    pub fn new(config: SessionConfig) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                config,
                state: Mutex::new(None),
                pools_created: AtomicUsize::new(0),
            }),
        }
    }

    /// Session settings.
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Build the connection pool and limiter if they do not exist yet.
    ///
    /// Calling this on an open session does nothing.
    pub fn open(&self) -> Result<()> {
        self.ensure_open().map(|_| ())
    }

    /// Release the pool and limiter.
    ///
    /// Requests waiting for a slot and requests in flight fail with
    /// [`Error::SessionClosed`]. Closing a closed session does nothing.
    pub fn close(&self) {
        let state = self.lock_state().take();
        if let Some(state) = state {
            state.shutdown();
            debug!(
                in_flight = state.limiter.in_flight(),
                "Closed Diffbot session"
            );
        }
    }

    /// Whether the pool currently exists.
    pub fn is_open(&self) -> bool {
        self.lock_state().is_some()
    }

    /// How many connection pools this session has built over its lifetime.
    pub fn pools_created(&self) -> usize {
        self.inner.pools_created.load(Ordering::SeqCst)
    }

    /// Requests currently holding a limiter slot.
    pub fn in_flight(&self) -> usize {
        self.lock_state()
            .as_ref()
            .map_or(0, |state| state.limiter.in_flight())
    }

    /// Issue a GET with `params` in the query string.
    pub async fn get(
        &self,
        url: Url,
        params: Params,
        headers: Option<HeaderMap>,
    ) -> Result<DiffbotResponse> {
        let request = RequestBuilder::get(url)
            .query(params)
            .headers(headers.unwrap_or_default());
        self.request(request).await
    }

    /// Issue a POST with `json_body` as the body and `params` in the query
    /// string.
    pub async fn post(
        &self,
        url: Url,
        params: Params,
        headers: Option<HeaderMap>,
        json_body: Value,
    ) -> Result<DiffbotResponse> {
        let request = RequestBuilder::post(url)
            .query(params)
            .headers(headers.unwrap_or_default())
            .json(json_body);
        self.request(request).await
    }

    /// Send a request: wait for a slot, exchange, classify, decode.
    ///
    /// Opens the session if needed. The slot is released on every exit path.
    pub async fn request(&self, request: RequestBuilder) -> Result<DiffbotResponse> {
        let state = self.ensure_open()?;
        let mut closed = state.closed.subscribe();

        let metadata = RequestMetadata::from_request(&request);

        tokio::select! {
            result = self.exchange(&state, request, &metadata) => result,
            _ = closed.wait_for(|closed| *closed) => {
                debug!(
                    method = %metadata.method,
                    path = %metadata.path,
                    "Request cancelled by session close"
                );
                Err(Error::SessionClosed)
            }
        }
    }

    async fn exchange(
        &self,
        state: &OpenState,
        request: RequestBuilder,
        metadata: &RequestMetadata,
    ) -> Result<DiffbotResponse> {
        let _permit = state.limiter.acquire().await?;

        let timeout = request
            .timeout_override()
            .unwrap_or(self.inner.config.timeout);
        let prepared = request.into_reqwest(&state.http, timeout)?;
        let mut metadata = metadata.clone().with_query_len(prepared.query_len);
        metadata.body_size = prepared.body_size;
        metadata.log_request();

        let timer = RequestTimer::start();
        let response = prepared
            .request
            .send()
            .await
            .map_err(|e| Error::from_reqwest(e, timeout))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::from_reqwest(e, timeout))?;

        let elapsed = timer.elapsed();
        let response_metadata =
            ResponseMetadata::new(status.as_u16(), elapsed).with_body_size(body.len());

        if !status.is_success() {
            let error = Error::from_status(status.as_u16(), String::from_utf8_lossy(&body))
                .with_retry_after(retry_after(&headers));
            response_metadata.log_error(&metadata, &error);
            return Err(error);
        }

        let response = DiffbotResponse::create(status, headers, body)?.with_elapsed(elapsed);
        response_metadata
            .with_content_kind(response.content().kind())
            .log_success(&metadata);
        Ok(response)
    }

    fn ensure_open(&self) -> Result<Arc<OpenState>> {
        let mut guard = self.lock_state();
        if let Some(state) = guard.as_ref() {
            return Ok(Arc::clone(state));
        }

        let state = Arc::new(OpenState::build(&self.inner.config)?);
        *guard = Some(Arc::clone(&state));
        let pools = self.inner.pools_created.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            max_concurrency = state.limiter.max_concurrent(),
            pools_created = pools,
            "Opened Diffbot session"
        );
        Ok(state)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, Option<Arc<OpenState>>> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Seconds from a `Retry-After` header. HTTP-date values are ignored.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
