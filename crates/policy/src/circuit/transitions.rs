//! State transition logic for circuit breaker.
//!
//! [`BreakerCore`] is the whole mutable state of one breaker. It is a plain
//! synchronous state machine driven with explicit timestamps; the async
//! wrapper in [`state`](super::state) owns it behind a single mutex so every
//! admission and recording decision is linearizable.

use super::config::CircuitBreakerConfig;
use super::types::{CircuitBreakerStats, CircuitState};
use super::window::SamplingWindow;
use crate::outcome::BrokenCircuitError;
use std::time::Duration;
use tokio::time::Instant;

/// A transition whose callback still has to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Break { duration: Duration },
    Reset,
    HalfOpen,
}

/// Permission to invoke the operation once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    trial: bool,
}

impl Ticket {
    pub fn is_trial(&self) -> bool {
        self.trial
    }
}

/// Result of asking the breaker whether a call may proceed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Proceed(Ticket),
    Rejected(BrokenCircuitError),
}

#[derive(Debug)]
pub struct BreakerCore {
    state: CircuitState,
    window: SamplingWindow,
    last_transition: Instant,
    trial_in_flight: bool,
    /// Bumped on every transition; results from an older generation are ignored
    generation: u64,
}

impl BreakerCore {
    pub fn new(config: &CircuitBreakerConfig, now: Instant) -> Self {
        Self {
            state: CircuitState::Closed,
            window: SamplingWindow::new(config.sampling_duration),
            last_transition: now,
            trial_in_flight: false,
            generation: 0,
        }
    }

    /// Current state after applying a due Open -> HalfOpen transition
    pub fn poll(
        &mut self,
        now: Instant,
        config: &CircuitBreakerConfig,
    ) -> (CircuitState, Option<Transition>) {
        let transition = self.maybe_half_open(now, config);
        (self.state, transition)
    }

    /// Decide whether a call may invoke the operation
    pub fn admit(
        &mut self,
        now: Instant,
        config: &CircuitBreakerConfig,
    ) -> (Admission, Option<Transition>) {
        let transition = self.maybe_half_open(now, config);

        let admission = match self.state {
            CircuitState::Closed => Admission::Proceed(Ticket {
                generation: self.generation,
                trial: false,
            }),
            CircuitState::Open => {
                let reopens_at = self.last_transition + config.break_duration;
                Admission::Rejected(BrokenCircuitError::open(
                    reopens_at.saturating_duration_since(now),
                ))
            }
            CircuitState::HalfOpen if self.trial_in_flight => {
                Admission::Rejected(BrokenCircuitError::trial_in_flight())
            }
            CircuitState::HalfOpen => {
                self.trial_in_flight = true;
                Admission::Proceed(Ticket {
                    generation: self.generation,
                    trial: true,
                })
            }
            CircuitState::Isolated => Admission::Rejected(BrokenCircuitError::isolated()),
        };

        (admission, transition)
    }

    /// Record the classified outcome of an admitted call
    pub fn record(
        &mut self,
        ticket: Ticket,
        failed: bool,
        now: Instant,
        config: &CircuitBreakerConfig,
    ) -> Option<Transition> {
        // A call that started before the last transition says nothing about the current state
        if ticket.generation != self.generation {
            return None;
        }

        match self.state {
            CircuitState::Closed => {
                if failed {
                    self.window.record_failure(now);
                } else {
                    self.window.record_success(now);
                }

                let counts = self.window.counts(now);
                if counts.total() >= config.minimum_throughput
                    && counts.failure_ratio() >= config.failure_threshold_ratio
                {
                    self.transition_to(CircuitState::Open, now);
                    Some(Transition::Break {
                        duration: config.break_duration,
                    })
                } else {
                    None
                }
            }
            CircuitState::HalfOpen if ticket.trial => {
                if failed {
                    self.transition_to(CircuitState::Open, now);
                    Some(Transition::Break {
                        duration: config.break_duration,
                    })
                } else {
                    self.transition_to(CircuitState::Closed, now);
                    Some(Transition::Reset)
                }
            }
            _ => None,
        }
    }

    /// Give back a trial ticket whose call never completed
    pub fn release(&mut self, ticket: Ticket) {
        if ticket.trial
            && ticket.generation == self.generation
            && self.state == CircuitState::HalfOpen
        {
            self.trial_in_flight = false;
        }
    }

    /// Hold the circuit open until [`reset`](Self::reset)
    pub fn isolate(&mut self, now: Instant) -> Option<Transition> {
        if self.state == CircuitState::Isolated {
            return None;
        }
        self.transition_to(CircuitState::Isolated, now);
        Some(Transition::Break {
            duration: Duration::MAX,
        })
    }

    /// Close the circuit regardless of its current state
    pub fn reset(&mut self, now: Instant) -> Option<Transition> {
        let was_closed = self.state == CircuitState::Closed;
        self.transition_to(CircuitState::Closed, now);
        if was_closed {
            None
        } else {
            Some(Transition::Reset)
        }
    }

    pub fn stats(&mut self, now: Instant) -> CircuitBreakerStats {
        let counts = self.window.counts(now);
        CircuitBreakerStats {
            state: self.state,
            success_count: counts.successes,
            failure_count: counts.failures,
            last_transition: self.last_transition,
            half_open_trial_in_flight: self.trial_in_flight,
        }
    }

    fn maybe_half_open(
        &mut self,
        now: Instant,
        config: &CircuitBreakerConfig,
    ) -> Option<Transition> {
        if self.state == CircuitState::Open && now >= self.last_transition + config.break_duration
        {
            self.transition_to(CircuitState::HalfOpen, now);
            Some(Transition::HalfOpen)
        } else {
            None
        }
    }

    fn transition_to(&mut self, state: CircuitState, now: Instant) {
        self.state = state;
        self.last_transition = now;
        self.trial_in_flight = false;
        self.generation += 1;
        if state == CircuitState::Closed {
            self.window.reset();
        }
    }
}
