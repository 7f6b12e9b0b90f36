//! Enhance endpoint and bulk enhancement jobs

use super::{BaseClient, Resource};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::Session;
use crate::params::Params;
use crate::response::{
    BulkJobCreateResponse, BulkJobResultsResponse, BulkJobStatusResponse, CoverageReportResponse,
    EntitiesResponse, ListBulkJobsResponse,
};
use diffbot_kg_core::retry::{BackoffStrategy, ExponentialBackoff};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Default parameters an [`EnhanceClient`] accepts.
pub const ENHANCE_PARAMS: &[&str] = &[
    "jsonmode",
    "nonCanonicalFacts",
    "size",
    "refresh",
    "search",
    "useCache",
];

/// How [`EnhanceClient::wait_for_bulkjob`] polls.
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Delay schedule between status checks. Only the delays are used; the
    /// deadline, not the retry budget, ends the wait.
    pub backoff: ExponentialBackoff,
    /// Give up after this long.
    pub timeout: Duration,
}

impl Default for PollOptions {
    /// 1s, 1.5s, 2.25s, ... for at most 60s.
    fn default() -> Self {
        Self {
            backoff: ExponentialBackoff::builder()
                .initial_delay(Duration::from_secs(1))
                .multiplier(1.5)
                .max_delay(Duration::from_secs(30))
                .jitter(0.0)
                .build(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl PollOptions {
    /// Replace the overall deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the delay schedule.
    pub fn backoff(mut self, backoff: ExponentialBackoff) -> Self {
        self.backoff = backoff;
        self
    }
}

/// Client for entity enhancement and bulk enhancement jobs.
#[derive(Debug, Clone)]
pub struct EnhanceClient {
    base: BaseClient,
}

impl Resource for EnhanceClient {
    fn base(&self) -> &BaseClient {
        &self.base
    }
}

impl EnhanceClient {
    /// Create a client with the given token and default settings.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::from_config(ClientConfig::with_token(token))
    }

    /// Create a client from a full configuration.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            base: BaseClient::new(&config, ENHANCE_PARAMS)?,
        })
    }

    /// Create a client that shares an existing session.
    pub fn with_session(config: ClientConfig, session: Session) -> Result<Self> {
        Ok(Self {
            base: BaseClient::with_session(&config, ENHANCE_PARAMS, session)?,
        })
    }

    /// Create a client from `DIFFBOT_*` environment variables.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Enhance a single entity description, such as
    /// `{"type": "Organization", "name": "Diffbot"}`.
    pub async fn enhance(&self, params: Params) -> Result<EntitiesResponse> {
        let url = self.base.url(&["enhance"])?;
        let response = self.base.router().get(url, Some(params)).await?;
        Ok(response.into())
    }

    /// Submit a bulk job. Each item of `data` is one enhance request.
    ///
    /// # Errors
    /// [`Error::InvalidRequest`] if `data` is empty.
    pub async fn create_bulkjob(
        &self,
        data: Vec<Value>,
        params: Option<Params>,
    ) -> Result<BulkJobCreateResponse> {
        if data.is_empty() {
            return Err(Error::InvalidRequest("data must be provided".into()));
        }
        let url = self.base.url(&["enhance", "bulk"])?;
        let response = self
            .base
            .router()
            .post_json(url, params, Value::Array(data))
            .await?;
        Ok(response.into())
    }

    /// Status of every bulk job for the token.
    pub async fn list_bulkjobs(&self) -> Result<ListBulkJobsResponse> {
        let url = self.base.url(&["enhance", "bulk", "status"])?;
        let response = self.base.router().get(url, None).await?;
        Ok(response.into())
    }

    /// Status of one bulk job.
    pub async fn bulkjob_status(&self, job_id: &str) -> Result<BulkJobStatusResponse> {
        let url = self.base.url(&["enhance", "bulk", job_id, "status"])?;
        let response = self.base.router().get(url, None).await?;
        Ok(response.into())
    }

    /// Download all results of a completed bulk job.
    pub async fn bulkjob_results(&self, job_id: &str) -> Result<BulkJobResultsResponse> {
        let url = self.base.url(&["enhance", "bulk", job_id])?;
        let response = self.base.router().get(url, None).await?;
        Ok(response.into())
    }

    /// Download the result of the `index`-th request in a bulk job.
    pub async fn single_bulkjob_result(
        &self,
        job_id: &str,
        index: usize,
    ) -> Result<EntitiesResponse> {
        let index = index.to_string();
        let url = self.base.url(&["enhance", "bulk", job_id, &index])?;
        let response = self.base.router().get(url, None).await?;
        Ok(response.into())
    }

    /// Download a coverage report of a completed bulk job.
    pub async fn bulkjob_coverage_report(
        &self,
        job_id: &str,
        report_id: &str,
    ) -> Result<CoverageReportResponse> {
        let url = self
            .base
            .url(&["enhance", "bulk", job_id, "coverage", report_id])?;
        let response = self.base.router().get(url, None).await?;
        Ok(response.into())
    }

    /// Stop a running bulk job.
    pub async fn stop_bulkjob(&self, job_id: &str) -> Result<BulkJobStatusResponse> {
        let url = self.base.url(&["enhance", "bulk", job_id, "stop"])?;
        let response = self.base.router().get(url, None).await?;
        Ok(response.into())
    }

    /// Poll [`bulkjob_status`](Self::bulkjob_status) until the job is complete.
    ///
    /// Errors from a status check are returned as-is; wrap the call in
    /// [`retry_with_backoff`](crate::retry::retry_with_backoff) to ride out
    /// transient failures.
    ///
    /// # Errors
    /// [`Error::Timeout`] once `options.timeout` has passed without completion.
    pub async fn wait_for_bulkjob(
        &self,
        job_id: &str,
        options: PollOptions,
    ) -> Result<BulkJobStatusResponse> {
        let deadline = Instant::now() + options.timeout;
        let mut attempt = 0u32;

        loop {
            let status = self.bulkjob_status(job_id).await?;
            if status.is_complete() {
                return Ok(status);
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(Error::Timeout(options.timeout));
            }

            let delay = options
                .backoff
                .next_delay(attempt)
                .unwrap_or(Duration::ZERO)
                .min(deadline - now);
            debug!(
                job_id,
                status = status.job_status(),
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Bulk job not complete, polling again"
            );
            tokio::time::sleep(delay).await;
            attempt = attempt.saturating_add(1);
        }
    }
}
