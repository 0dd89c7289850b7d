//! Resilience settings
//!
//! The on-disk shape of the policy parameters. Every field has a default
//! matching the stock demo policies, so a partial file (or none) is valid.

use breakwater_core::{
    Error, Result, ResultExt, DEFAULT_BACKOFF_BASE_MS, DEFAULT_BREAK_DURATION_MS,
    DEFAULT_FAILURE_THRESHOLD_RATIO, DEFAULT_MAX_RETRIES, DEFAULT_MINIMUM_THROUGHPUT,
    DEFAULT_SAMPLING_DURATION_MS,
};
use breakwater_policy::{CircuitBreakerConfig, DelaySchedule, RetryConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level settings document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResilienceSettings {
    pub retry: RetrySettings,
    pub breaker: BreakerSettings,
}

impl ResilienceSettings {
    pub fn validate(&self) -> Result<()> {
        self.retry.validate().context("retry settings")?;
        self.breaker.to_config().validate().context("breaker settings")
    }
}

/// Retry policy parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    pub max_retries: u32,
    /// First backoff delay; doubles on each further retry
    pub backoff_base_ms: u64,
    pub backoff_max_ms: Option<u64>,
    pub jitter_factor: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            backoff_max_ms: None,
            jitter_factor: 0.0,
        }
    }
}

impl RetrySettings {
    /// Reject a jitter factor that `with_jitter` would otherwise clamp
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.jitter_factor) {
            return Err(Error::configuration(format!(
                "jitter_factor must be within 0.0..=1.0, got {}",
                self.jitter_factor
            )));
        }
        self.backoff_config().validate()
    }

    /// Retry without waiting between attempts
    pub fn immediate_config(&self) -> RetryConfig {
        RetryConfig::immediate(self.max_retries)
    }

    /// Retry with exponential backoff from `backoff_base_ms`
    pub fn backoff_config(&self) -> RetryConfig {
        let mut schedule = DelaySchedule::exponential(Duration::from_millis(self.backoff_base_ms))
            .with_jitter(self.jitter_factor);
        if let Some(max) = self.backoff_max_ms {
            schedule = schedule.with_max(Duration::from_millis(max));
        }
        RetryConfig::wait_and_retry(self.max_retries, schedule)
    }
}

/// Circuit breaker parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BreakerSettings {
    pub failure_threshold_ratio: f64,
    pub sampling_duration_ms: u64,
    pub minimum_throughput: u32,
    pub break_duration_ms: u64,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold_ratio: DEFAULT_FAILURE_THRESHOLD_RATIO,
            sampling_duration_ms: DEFAULT_SAMPLING_DURATION_MS,
            minimum_throughput: DEFAULT_MINIMUM_THROUGHPUT,
            break_duration_ms: DEFAULT_BREAK_DURATION_MS,
        }
    }
}

impl BreakerSettings {
    pub fn to_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold_ratio: self.failure_threshold_ratio,
            sampling_duration: Duration::from_millis(self.sampling_duration_ms),
            minimum_throughput: self.minimum_throughput,
            break_duration: Duration::from_millis(self.break_duration_ms),
        }
    }
}

/// Parse a settings document from JSON text
pub fn parse_settings(text: &str) -> Result<ResilienceSettings> {
    serde_json::from_str(text).map_err(|e| Error::json("invalid settings document", e))
}
