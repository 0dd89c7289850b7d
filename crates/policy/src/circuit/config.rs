//! Circuit breaker parameters.

use breakwater_core::{
    Error, Result, DEFAULT_BREAK_DURATION_MS, DEFAULT_FAILURE_THRESHOLD_RATIO,
    DEFAULT_MINIMUM_THROUGHPUT, DEFAULT_SAMPLING_DURATION_MS,
};
use std::time::Duration;

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerConfig {
    /// Failure share of sampled calls that opens the circuit (0 < ratio <= 1)
    pub failure_threshold_ratio: f64,
    /// Trailing window over which outcomes are counted
    pub sampling_duration: Duration,
    /// Calls required in the window before the ratio is considered
    pub minimum_throughput: u32,
    /// How long the circuit stays open before a half-open trial
    pub break_duration: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold_ratio: DEFAULT_FAILURE_THRESHOLD_RATIO,
            sampling_duration: Duration::from_millis(DEFAULT_SAMPLING_DURATION_MS),
            minimum_throughput: DEFAULT_MINIMUM_THROUGHPUT,
            break_duration: Duration::from_millis(DEFAULT_BREAK_DURATION_MS),
        }
    }
}

impl CircuitBreakerConfig {
    pub fn validate(&self) -> Result<()> {
        let ratio = self.failure_threshold_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(Error::configuration(format!(
                "failure_threshold_ratio must be within (0, 1], got {ratio}"
            )));
        }
        if self.minimum_throughput < 1 {
            return Err(Error::configuration(
                "minimum_throughput must be at least 1",
            ));
        }
        if self.sampling_duration.is_zero() {
            return Err(Error::configuration("sampling_duration must be positive"));
        }
        if self.break_duration.is_zero() {
            return Err(Error::configuration("break_duration must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CircuitBreakerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.minimum_throughput, 7);
        assert_eq!(config.break_duration, Duration::from_secs(15));
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let bad_ratios = [0.0, -0.1, 1.01, f64::NAN];
        for ratio in bad_ratios {
            let config = CircuitBreakerConfig {
                failure_threshold_ratio: ratio,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "ratio {ratio} accepted");
        }

        let config = CircuitBreakerConfig {
            minimum_throughput: 0,
            ..Default::default()
        };
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("minimum_throughput"));

        let config = CircuitBreakerConfig {
            break_duration: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CircuitBreakerConfig {
            failure_threshold_ratio: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
