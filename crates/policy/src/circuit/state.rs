//! Circuit breaker state management and execution logic.

use super::config::CircuitBreakerConfig;
use super::transitions::{Admission, BreakerCore, Ticket, Transition};
use super::types::{BreakerCallbacks, CircuitBreakerStats, CircuitState};
use crate::outcome::{BrokenCircuitError, Outcome, PolicyError};
use crate::predicate::FailurePredicate;
use breakwater_core::Result;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Circuit breaker shared by every caller of one protected dependency.
///
/// Construct once and hand out clones of an `Arc<CircuitBreaker<_, _>>`.
/// All state lives behind one mutex that is never held across an await.
pub struct CircuitBreaker<T, E> {
    config: CircuitBreakerConfig,
    predicate: FailurePredicate<T, E>,
    callbacks: BreakerCallbacks<T, E>,
    core: Mutex<BreakerCore>,
}

impl<T, E> fmt::Debug for CircuitBreaker<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("config", &self.config)
            .field("callbacks", &self.callbacks)
            .field("core", &*self.core.lock())
            .finish()
    }
}

impl<T: 'static, E: 'static> CircuitBreaker<T, E> {
    /// Create a breaker that treats any error as a failure
    pub fn new(config: CircuitBreakerConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: CircuitBreakerConfig) -> CircuitBreakerBuilder<T, E> {
        CircuitBreakerBuilder {
            config,
            predicate: FailurePredicate::on_error(),
            callbacks: BreakerCallbacks::default(),
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Get the current state of the circuit
    pub fn state(&self) -> CircuitState {
        let (state, transition) = self.core.lock().poll(Instant::now(), &self.config);
        if let Some(transition) = transition {
            self.notify(transition, None);
        }
        state
    }

    /// Execute an operation through the circuit breaker.
    ///
    /// Returns `PolicyError::BrokenCircuit` without invoking `operation` when
    /// the circuit is open, isolated, or half-open with its trial in flight.
    pub async fn call<F, Fut>(&self, operation: F) -> Outcome<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome<T, E>>,
    {
        let (admission, transition) = self.core.lock().admit(Instant::now(), &self.config);

        let ticket = match admission {
            Admission::Proceed(ticket) => ticket,
            Admission::Rejected(err) => {
                if let Some(transition) = transition {
                    self.notify(transition, None);
                }
                debug!(reason = %err.reason, "circuit breaker rejected call");
                return Err(PolicyError::BrokenCircuit(err));
            }
        };

        // Held before any callback runs so an unwinding callback still frees the trial slot
        let permit = Permit::new(&self.core, ticket);
        if let Some(transition) = transition {
            self.notify(transition, None);
        }

        let outcome = operation().await;
        let failed = self.predicate.is_failure(&outcome);

        if let Some(transition) = permit.complete(failed, &self.config) {
            self.notify(transition, Some(&outcome));
        }
        outcome
    }

    /// Manually force the circuit open until [`reset`](Self::reset)
    pub fn isolate(&self) {
        let transition = self.core.lock().isolate(Instant::now());
        if let Some(transition) = transition {
            let isolated: Outcome<T, E> = Err(BrokenCircuitError::isolated().into());
            self.notify(transition, Some(&isolated));
        }
    }

    /// Manually close the circuit and clear the sampling window
    pub fn reset(&self) {
        let transition = self.core.lock().reset(Instant::now());
        if let Some(transition) = transition {
            self.notify(transition, None);
        }
    }

    /// Get current circuit breaker statistics
    pub fn stats(&self) -> CircuitBreakerStats {
        self.core.lock().stats(Instant::now())
    }

    // Only called with the lock released, after the transition is recorded
    fn notify(&self, transition: Transition, outcome: Option<&Outcome<T, E>>) {
        match transition {
            Transition::Break { duration } => {
                if duration == Duration::MAX {
                    warn!("circuit breaker isolated");
                } else {
                    warn!(break_duration = ?duration, "circuit breaker opened");
                }
                if let (Some(on_break), Some(outcome)) = (&self.callbacks.on_break, outcome) {
                    on_break(outcome, duration);
                }
            }
            Transition::Reset => {
                info!("circuit breaker closed");
                if let Some(on_reset) = &self.callbacks.on_reset {
                    on_reset();
                }
            }
            Transition::HalfOpen => {
                info!("circuit breaker half-open, allowing one trial call");
                if let Some(on_half_open) = &self.callbacks.on_half_open {
                    on_half_open();
                }
            }
        }
    }
}

/// An admitted call. Dropping it before [`complete`](Permit::complete), for
/// example when the caller's future is cancelled, hands a half-open trial
/// slot back so the next call can probe.
struct Permit<'a> {
    core: &'a Mutex<BreakerCore>,
    ticket: Option<Ticket>,
}

impl<'a> Permit<'a> {
    fn new(core: &'a Mutex<BreakerCore>, ticket: Ticket) -> Self {
        Self {
            core,
            ticket: Some(ticket),
        }
    }

    fn complete(mut self, failed: bool, config: &CircuitBreakerConfig) -> Option<Transition> {
        let ticket = self.ticket.take()?;
        self.core.lock().record(ticket, failed, Instant::now(), config)
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            if ticket.is_trial() {
                debug!("half-open trial abandoned, releasing trial slot");
            }
            self.core.lock().release(ticket);
        }
    }
}

/// Builder for [`CircuitBreaker`]
pub struct CircuitBreakerBuilder<T, E> {
    config: CircuitBreakerConfig,
    predicate: FailurePredicate<T, E>,
    callbacks: BreakerCallbacks<T, E>,
}

impl<T: 'static, E: 'static> CircuitBreakerBuilder<T, E> {
    /// Which outcomes count as failures in the sampling window
    pub fn handle(mut self, predicate: FailurePredicate<T, E>) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn on_break<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Outcome<T, E>, Duration) + Send + Sync + 'static,
    {
        self.callbacks.on_break = Some(Arc::new(callback));
        self
    }

    pub fn on_reset<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.on_reset = Some(Arc::new(callback));
        self
    }

    pub fn on_half_open<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.on_half_open = Some(Arc::new(callback));
        self
    }

    pub fn build(self) -> Result<CircuitBreaker<T, E>> {
        self.config.validate()?;
        let core = BreakerCore::new(&self.config, Instant::now());
        Ok(CircuitBreaker {
            config: self.config,
            predicate: self.predicate,
            callbacks: self.callbacks,
            core: Mutex::new(core),
        })
    }
}
