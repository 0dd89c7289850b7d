//! Circuit breaker: gate calls to a failing dependency.
//!
//! ## Architecture
//!
//! - [`types`] - Core types (CircuitState, callbacks, stats)
//! - [`config`] - Failure ratio, sampling window, throughput gate, break duration
//! - [`window`] - Bucketed rolling success/failure counts
//! - [`transitions`] - The synchronous closed/open/half-open state machine
//! - [`state`] - The shared async [`CircuitBreaker`] built on top of it
//!
//! ## State transitions
//!
//! ```text
//! Closed   -> Open:     total >= minimum_throughput and failures/total >= ratio
//! Open     -> HalfOpen: first call (or state query) after break_duration
//! HalfOpen -> Closed:   the single trial call succeeds
//! HalfOpen -> Open:     the trial call fails; break_duration restarts
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use breakwater_policy::circuit::{CircuitBreaker, CircuitBreakerConfig};
//! use breakwater_policy::PolicyError;
//!
//! # async fn example() -> breakwater_core::Result<()> {
//! let cb = CircuitBreaker::<u32, String>::builder(CircuitBreakerConfig::default())
//!     .on_break(|_, duration| eprintln!("broken for {duration:?}"))
//!     .build()?;
//!
//! let stock = cb.call(|| async { Ok::<_, PolicyError<String>>(15) }).await;
//! # let _ = stock;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod state;
pub mod transitions;
pub mod types;
pub mod window;

pub use config::CircuitBreakerConfig;
pub use state::{CircuitBreaker, CircuitBreakerBuilder};
pub use types::{BreakerCallbacks, CircuitBreakerStats, CircuitState, OnBreak, OnHalfOpen, OnReset};
pub use window::{SamplingWindow, WindowCounts};
