//! Caller-side retries
//!
//! The session only classifies failures. This module re-runs a whole call
//! while its error says retrying could help, honouring `Retry-After` when
//! upstream sent one.

use crate::error::Result;
use diffbot_kg_core::retry::BackoffStrategy;
use std::future::Future;

pub use diffbot_kg_core::retry::{ExponentialBackoff, ExponentialBackoffBuilder, Retryable};

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the backoff's retry budget is spent.
///
/// # Example
///
/// ```rust,no_run
/// use diffbot_kg::retry::{ExponentialBackoff, retry_with_backoff};
/// use diffbot_kg::{Params, SearchClient};
///
/// # async fn example(client: SearchClient) -> diffbot_kg::Result<()> {
/// let backoff = ExponentialBackoff::default();
/// let response = retry_with_backoff(&backoff, || {
///     client.search(Params::new().with("query", "type:Organization"))
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn retry_with_backoff<B, F, Fut, T>(backoff: &B, operation: F) -> Result<T>
where
    B: BackoffStrategy,
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<T>> + Send,
    T: Send,
{
    backoff.execute(operation).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use assert_matches::assert_matches;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast() -> ExponentialBackoff {
        ExponentialBackoff::builder()
            .max_retries(3)
            .initial_delay(Duration::from_millis(1))
            .jitter(0.0)
            .build()
    }

    #[tokio::test]
    async fn test_retries_retryable_errors() {
        let attempts = Arc::new(AtomicU32::new(0));
        let result = retry_with_backoff(&fast(), || {
            let attempts = Arc::clone(&attempts);
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(Error::from_status(503, "busy"))
                } else {
                    Ok("ok")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_does_not_retry_client_errors() {
        let attempts = Arc::new(AtomicU32::new(0));
        let result: Result<()> = retry_with_backoff(&fast(), || {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(Error::from_status(414, "too long"))
            }
        })
        .await;

        assert_matches!(result, Err(Error::UrlTooLong { .. }));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let attempts = Arc::new(AtomicU32::new(0));
        let result: Result<()> = retry_with_backoff(&fast(), || {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(Error::from_status(429, "slow down"))
            }
        })
        .await;

        assert_matches!(result, Err(Error::Retryable { status: 429, .. }));
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }
}
