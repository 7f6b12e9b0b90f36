//! Admission control for a session.
//!
//! A [`ConcurrencyLimiter`] bounds the number of exchanges in flight and can
//! additionally pace them with a token-bucket quota.

use crate::config::RateLimitConfig;
use crate::error::{Error, Result};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Concurrency bound used when none is configured.
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// Bounds in-flight requests with a semaphore, optionally paced by a quota.
///
/// Cloning shares the same slots.
#[derive(Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    max: usize,
    pacer: Option<Arc<DefaultDirectRateLimiter>>,
}

impl fmt::Debug for ConcurrencyLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrencyLimiter")
            .field("max", &self.max)
            .field("in_flight", &self.in_flight())
            .field("paced", &self.pacer.is_some())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl ConcurrencyLimiter {
    /// Create a limiter allowing `max_concurrent` simultaneous slots.
    ///
    /// # Errors
    /// Returns an error if `max_concurrent` is zero.
    pub fn new(max_concurrent: usize) -> Result<Self> {
        if max_concurrent == 0 {
            return Err(Error::HttpClient("max_concurrency must be > 0".into()));
        }
        let max = max_concurrent.min(Semaphore::MAX_PERMITS);
        Ok(Self {
            semaphore: Arc::new(Semaphore::new(max)),
            max,
            pacer: None,
        })
    }

    /// Pace admissions to a requests-per-second quota.
    pub fn with_rate_limit(mut self, config: &RateLimitConfig) -> Self {
        let rate = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst_size).unwrap_or(rate);
        let quota = Quota::per_second(rate).allow_burst(burst);
        self.pacer = Some(Arc::new(RateLimiter::direct(quota)));
        self
    }

    /// Configured slot count.
    pub fn max_concurrent(&self) -> usize {
        self.max
    }

    /// Slots currently held.
    pub fn in_flight(&self) -> usize {
        self.max.saturating_sub(self.semaphore.available_permits())
    }

    /// Wait for a slot, then for the quota if one is set.
    ///
    /// The slot is released when the returned permit drops.
    ///
    /// # Errors
    /// Returns [`Error::SessionClosed`] if the limiter is closed while waiting.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| Error::SessionClosed)?;
        if let Some(pacer) = &self.pacer {
            pacer.until_ready().await;
        }
        Ok(permit)
    }

    /// Reject every current and future waiter.
    pub fn close(&self) {
        self.semaphore.close();
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::time::Duration;

    #[test]
    fn test_zero_is_rejected() {
        assert_matches!(ConcurrencyLimiter::new(0), Err(Error::HttpClient(_)));
    }

    #[tokio::test]
    async fn test_permits_are_bounded_and_released() {
        let limiter = ConcurrencyLimiter::new(2).unwrap();

        let first = limiter.acquire().await.unwrap();
        let _second = limiter.acquire().await.unwrap();
        assert_eq!(limiter.in_flight(), 2);

        let blocked = tokio::time::timeout(Duration::from_millis(20), limiter.acquire()).await;
        assert!(blocked.is_err(), "third acquire should wait");

        drop(first);
        assert_eq!(limiter.in_flight(), 1);
        let _third = limiter.acquire().await.unwrap();
        assert_eq!(limiter.in_flight(), 2);
    }

    #[tokio::test]
    async fn test_close_wakes_waiters() {
        let limiter = ConcurrencyLimiter::new(1).unwrap();
        let _held = limiter.acquire().await.unwrap();

        let waiter = {
            let limiter = limiter.clone();
            tokio::spawn(async move { limiter.acquire().await })
        };
        tokio::task::yield_now().await;

        limiter.close();
        assert!(limiter.is_closed());
        assert_matches!(waiter.await.unwrap(), Err(Error::SessionClosed));
    }

    #[tokio::test]
    async fn test_rate_limited_acquire_succeeds() {
        let limiter = ConcurrencyLimiter::new(4).unwrap().with_rate_limit(&RateLimitConfig {
            requests_per_second: 100,
            burst_size: 0,
        });
        for _ in 0..3 {
            drop(limiter.acquire().await.unwrap());
        }
        assert_eq!(limiter.in_flight(), 0);
    }
}
