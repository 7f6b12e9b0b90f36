//! The retry loop and the classification hook it relies on.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Classification of a failure as worth retrying or not.
///
/// Error types implement this so a [`BackoffStrategy`] can decide whether to
/// try again. The strategy never inspects error messages.
pub trait Retryable {
    /// Whether repeating the same operation could succeed.
    fn is_retryable(&self) -> bool;

    /// A server-provided delay that overrides the strategy's own schedule.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// A strategy for retrying failed operations with backoff.
///
/// Implementors only supply the delay schedule and the retry budget; the
/// loop in [`execute`](BackoffStrategy::execute) is shared.
///
/// # Examples
///
/// ```rust
/// use diffbot_kg_core::retry::{BackoffStrategy, ExponentialBackoff, Retryable};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::time::Duration;
///
/// #[derive(Debug)]
/// struct Busy;
///
/// impl Retryable for Busy {
///     fn is_retryable(&self) -> bool {
///         true
///     }
/// }
///
/// # async fn example() -> Result<(), Busy> {
/// let backoff = ExponentialBackoff::builder()
///     .max_retries(3)
///     .initial_delay(Duration::from_millis(10))
///     .build();
///
/// let attempts = Arc::new(AtomicU32::new(0));
/// let value = backoff
///     .execute(|| {
///         let attempts = Arc::clone(&attempts);
///         async move {
///             if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
///                 Err(Busy)
///             } else {
///                 Ok(42)
///             }
///         }
///     })
///     .await?;
/// assert_eq!(value, 42);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait BackoffStrategy: Send + Sync {
    /// Execute an operation, retrying while its error is retryable.
    ///
    /// The operation runs at most `max_retries() + 1` times. A non-retryable
    /// error is returned immediately; otherwise the last error is returned
    /// once the budget is spent.
    async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: Retryable + Send,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) if attempt >= self.max_retries() => return Err(err),
                Err(err) => {
                    let delay = err.retry_after().or_else(|| self.next_delay(attempt));
                    if let Some(delay) = delay {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            "Retrying operation after backoff"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Delay to wait after failed attempt `attempt` (0-indexed).
    ///
    /// `None` means retry immediately.
    fn next_delay(&self, attempt: u32) -> Option<Duration>;

    /// Maximum number of retries after the initial attempt.
    fn max_retries(&self) -> u32;
}
