#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core abstractions shared by the diffbot-kg crates.
//!
//! The client library itself never retries a request: the session classifies
//! a failed exchange and hands the decision back to the caller. This crate
//! holds the pieces a caller needs to act on that decision:
//!
//! - [`Retryable`](retry::Retryable) - what an error must expose to be retried
//! - [`BackoffStrategy`](retry::BackoffStrategy) - the retry loop
//! - [`ExponentialBackoff`](retry::ExponentialBackoff) - delay schedule with jitter
//!
//! # Examples
//!
//! ```rust
//! use diffbot_kg_core::prelude::*;
//! use std::time::Duration;
//!
//! #[derive(Debug)]
//! struct Flaky;
//!
//! impl Retryable for Flaky {
//!     fn is_retryable(&self) -> bool {
//!         true
//!     }
//! }
//!
//! # async fn example() -> Result<(), Flaky> {
//! let backoff = ExponentialBackoff::builder()
//!     .max_retries(3)
//!     .initial_delay(Duration::from_millis(100))
//!     .build();
//!
//! let value = backoff.execute(|| async { Ok::<_, Flaky>(42) }).await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

pub mod retry;

/// Convenient re-exports of commonly used items.
pub mod prelude {
    pub use crate::retry::{
        BackoffStrategy, ExponentialBackoff, ExponentialBackoffBuilder, Retryable,
    };
}
