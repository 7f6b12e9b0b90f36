//! Retry strategies and backoff schedules.
//!
//! # Key Types
//!
//! - [`Retryable`] - classification hook implemented by error types
//! - [`BackoffStrategy`] - retry loop driven by a delay schedule
//! - [`ExponentialBackoff`] - exponential schedule with jitter and a cap

mod exponential;
mod strategy;

pub use exponential::{ExponentialBackoff, ExponentialBackoffBuilder};
pub use strategy::{BackoffStrategy, Retryable};
