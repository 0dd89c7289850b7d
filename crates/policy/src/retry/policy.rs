//! The retry loop.

use super::config::{DelaySchedule, RetryConfig};
use crate::outcome::Outcome;
use crate::predicate::FailurePredicate;
use breakwater_core::Result;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Called with the failed outcome and its 0-based attempt index, before the wait
pub type OnRetry<T, E> = Arc<dyn Fn(&Outcome<T, E>, u32) + Send + Sync>;

/// Re-invokes an operation up to `max_retries` times on classified failure.
///
/// Holds no per-call state, so one instance can be shared by concurrent
/// callers. When retries run out the final outcome is returned unchanged.
pub struct RetryPolicy<T, E> {
    config: RetryConfig,
    predicate: FailurePredicate<T, E>,
    on_retry: Option<OnRetry<T, E>>,
}

impl<T, E> Clone for RetryPolicy<T, E> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            predicate: self.predicate.clone(),
            on_retry: self.on_retry.clone(),
        }
    }
}

impl<T, E> fmt::Debug for RetryPolicy<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("config", &self.config)
            .field("on_retry", &self.on_retry.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl<T: 'static, E: 'static> RetryPolicy<T, E> {
    pub fn builder() -> RetryPolicyBuilder<T, E> {
        RetryPolicyBuilder::new()
    }

    /// Fixed-count retry, no wait, any error is retryable
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            config: RetryConfig::immediate(max_retries),
            predicate: FailurePredicate::on_error(),
            on_retry: None,
        }
    }

    /// Retry waiting `delay.delay_for(attempt)` between attempts
    pub fn wait_and_retry(max_retries: u32, delay: DelaySchedule) -> Self {
        Self {
            config: RetryConfig::wait_and_retry(max_retries, delay),
            predicate: FailurePredicate::on_error(),
            on_retry: None,
        }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `operation`, retrying while the predicate classifies its outcome as failure
    pub async fn call<F, Fut>(&self, operation: F) -> Outcome<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Outcome<T, E>>,
    {
        let max_retries = self.config.max_retries;
        let mut attempt: u32 = 0;

        loop {
            let outcome = operation().await;

            if !self.predicate.is_failure(&outcome) {
                if attempt > 0 {
                    info!(retries = attempt, "operation succeeded after {attempt} retries");
                }
                return outcome;
            }

            if attempt >= max_retries {
                warn!(
                    attempts = attempt + 1,
                    broken_circuit = outcome.as_ref().err().is_some_and(|e| e.is_broken_circuit()),
                    "retries exhausted, returning final outcome"
                );
                return outcome;
            }

            let delay = self.config.delay.delay_for(attempt);
            warn!(
                attempt = attempt + 1,
                max_attempts = max_retries + 1,
                ?delay,
                "operation failed, retrying"
            );

            if let Some(on_retry) = &self.on_retry {
                on_retry(&outcome, attempt);
            }

            if !delay.is_zero() {
                sleep(delay).await;
            }
            attempt += 1;
            debug!(attempt = attempt + 1, "starting retry attempt");
        }
    }
}

/// Builder for [`RetryPolicy`]
pub struct RetryPolicyBuilder<T, E> {
    config: RetryConfig,
    predicate: FailurePredicate<T, E>,
    on_retry: Option<OnRetry<T, E>>,
}

impl<T: 'static, E: 'static> RetryPolicyBuilder<T, E> {
    pub fn new() -> Self {
        Self {
            config: RetryConfig::default(),
            predicate: FailurePredicate::on_error(),
            on_retry: None,
        }
    }

    pub fn config(mut self, config: RetryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    pub fn delay(mut self, delay: DelaySchedule) -> Self {
        self.config.delay = delay;
        self
    }

    /// Which outcomes trigger a retry
    pub fn handle(mut self, predicate: FailurePredicate<T, E>) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn on_retry<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Outcome<T, E>, u32) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(callback));
        self
    }

    pub fn build(self) -> Result<RetryPolicy<T, E>> {
        self.config.validate()?;
        Ok(RetryPolicy {
            config: self.config,
            predicate: self.predicate,
            on_retry: self.on_retry,
        })
    }
}

impl<T: 'static, E: 'static> Default for RetryPolicyBuilder<T, E> {
    fn default() -> Self {
        Self::new()
    }
}
