//! The result type every policy operates on.
//!
//! An [`Outcome`] is produced once per operation invocation. Failures are
//! split into two kinds so callers can tell "the dependency was called and
//! failed" apart from "the dependency was not called at all".

use std::fmt;
use std::time::Duration;

/// Success value or classified failure of one operation invocation
pub type Outcome<T, E> = std::result::Result<T, PolicyError<E>>;

/// Failure side of an [`Outcome`]
#[derive(Debug, thiserror::Error)]
pub enum PolicyError<E> {
    /// The wrapped operation ran and failed
    #[error("operation failed: {0}")]
    Operation(E),

    /// A circuit breaker refused to invoke the operation
    #[error(transparent)]
    BrokenCircuit(#[from] BrokenCircuitError),
}

impl<E> PolicyError<E> {
    /// True when the operation was short-circuited and never invoked
    pub fn is_broken_circuit(&self) -> bool {
        matches!(self, PolicyError::BrokenCircuit(_))
    }

    /// The operation's own error, if it ran
    pub fn operation_error(&self) -> Option<&E> {
        match self {
            PolicyError::Operation(e) => Some(e),
            PolicyError::BrokenCircuit(_) => None,
        }
    }

    pub fn into_operation_error(self) -> Option<E> {
        match self {
            PolicyError::Operation(e) => Some(e),
            PolicyError::BrokenCircuit(_) => None,
        }
    }
}

/// Lift a plain fallible result into the policy domain
pub fn lift<T, E>(result: std::result::Result<T, E>) -> Outcome<T, E> {
    result.map_err(PolicyError::Operation)
}

/// Why a circuit breaker rejected a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokenReason {
    /// The circuit is open and the break duration has not elapsed
    Open,
    /// Half-open, and the single probe call is already in flight
    HalfOpenTrialInFlight,
    /// The circuit was manually isolated
    Isolated,
}

impl fmt::Display for BrokenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrokenReason::Open => write!(f, "circuit is open"),
            BrokenReason::HalfOpenTrialInFlight => {
                write!(f, "circuit is half-open and a trial call is in flight")
            }
            BrokenReason::Isolated => write!(f, "circuit is isolated"),
        }
    }
}

/// The circuit breaker did not invoke the operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("broken circuit: {reason}")]
pub struct BrokenCircuitError {
    pub reason: BrokenReason,
    /// Remaining break time when the circuit is open
    pub retry_after: Option<Duration>,
}

impl BrokenCircuitError {
    pub fn open(retry_after: Duration) -> Self {
        Self {
            reason: BrokenReason::Open,
            retry_after: Some(retry_after),
        }
    }

    pub fn trial_in_flight() -> Self {
        Self {
            reason: BrokenReason::HalfOpenTrialInFlight,
            retry_after: None,
        }
    }

    pub fn isolated() -> Self {
        Self {
            reason: BrokenReason::Isolated,
            retry_after: None,
        }
    }
}
