//! Composable fault-handling policies for async operations.
//!
//! Every policy runs an operation producing an [`Outcome`] and returns an
//! [`Outcome`], so policies nest: a [`RetryPolicy`] wrapped around a
//! [`CircuitBreaker`] retries through the breaker, and the breaker either
//! calls the dependency or short-circuits with a broken-circuit failure.
//!
//! ## Key Components
//!
//! - **`outcome`**: [`Outcome`], [`PolicyError`] and [`BrokenCircuitError`].
//! - **`predicate`**: [`FailurePredicate`], the pluggable failure classifier.
//! - **`retry`**: fixed-count and backoff retry.
//! - **`circuit`**: the closed/open/half-open circuit breaker.
//! - **`policy`**, **`chain`**, **`executor`**: the [`Policy`] trait,
//!   [`PolicyChain`] composition and the [`PolicyExecutor`] call surface.
//!
//! ## Example
//!
//! ```rust,no_run
//! use breakwater_policy::{
//!     CircuitBreaker, CircuitBreakerConfig, PolicyExecutor, PolicyExt, RetryPolicy,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> breakwater_core::Result<()> {
//! let breaker = Arc::new(CircuitBreaker::<u32, std::io::Error>::new(
//!     CircuitBreakerConfig::default(),
//! )?);
//! let policy = RetryPolicy::<u32, std::io::Error>::immediate(3).wrap(Arc::clone(&breaker));
//!
//! let stock = PolicyExecutor::execute_fallible(&policy, || async {
//!     // call the remote dependency here
//!     Ok::<u32, std::io::Error>(15)
//! })
//! .await;
//! # let _ = stock;
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod circuit;
pub mod executor;
pub mod outcome;
pub mod policy;
pub mod predicate;
pub mod retry;

pub use chain::{PolicyChain, PolicyExt};
pub use circuit::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerStats, CircuitState};
pub use executor::PolicyExecutor;
pub use outcome::{lift, BrokenCircuitError, BrokenReason, Outcome, PolicyError};
pub use policy::{NoOpPolicy, Policy};
pub use predicate::FailurePredicate;
pub use retry::{DelaySchedule, RetryConfig, RetryPolicy};
