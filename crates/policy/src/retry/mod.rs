//! Retry policy: re-invoke an operation on classified failure.
//!
//! - [`config`] - attempt budget and the [`DelaySchedule`] between attempts
//! - [`policy`] - the [`RetryPolicy`] loop and its builder

pub mod config;
pub mod policy;

pub use config::{DelaySchedule, RetryConfig};
pub use policy::{OnRetry, RetryPolicy, RetryPolicyBuilder};
