//! Core types for circuit breaker functionality.

use crate::outcome::Outcome;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls pass through and are sampled
    Closed,
    /// Calls fail immediately until the break duration elapses
    Open,
    /// A single trial call decides whether to close or reopen
    HalfOpen,
    /// Manually held open until [`reset`](super::CircuitBreaker::reset)
    Isolated,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half-open",
            CircuitState::Isolated => "isolated",
        };
        f.write_str(name)
    }
}

/// Fired when the circuit opens, with the outcome that tripped it
pub type OnBreak<T, E> = Arc<dyn Fn(&Outcome<T, E>, Duration) + Send + Sync>;
/// Fired when the circuit closes
pub type OnReset = Arc<dyn Fn() + Send + Sync>;
/// Fired when the circuit moves to half-open
pub type OnHalfOpen = Arc<dyn Fn() + Send + Sync>;

/// Observability hooks, each fired after the transition is recorded
pub struct BreakerCallbacks<T, E> {
    pub on_break: Option<OnBreak<T, E>>,
    pub on_reset: Option<OnReset>,
    pub on_half_open: Option<OnHalfOpen>,
}

impl<T, E> Default for BreakerCallbacks<T, E> {
    fn default() -> Self {
        Self {
            on_break: None,
            on_reset: None,
            on_half_open: None,
        }
    }
}

impl<T, E> Clone for BreakerCallbacks<T, E> {
    fn clone(&self) -> Self {
        Self {
            on_break: self.on_break.clone(),
            on_reset: self.on_reset.clone(),
            on_half_open: self.on_half_open.clone(),
        }
    }
}

impl<T, E> fmt::Debug for BreakerCallbacks<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BreakerCallbacks")
            .field("on_break", &self.on_break.is_some())
            .field("on_reset", &self.on_reset.is_some())
            .field("on_half_open", &self.on_half_open.is_some())
            .finish()
    }
}

/// Statistics about circuit breaker state
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerStats {
    pub state: CircuitState,
    pub success_count: u32,
    pub failure_count: u32,
    pub last_transition: Instant,
    pub half_open_trial_in_flight: bool,
}

impl CircuitBreakerStats {
    pub fn total(&self) -> u32 {
        self.success_count + self.failure_count
    }
}
