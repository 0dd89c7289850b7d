//! Retry budget and delay schedules.

use breakwater_core::{Error, Result, DEFAULT_MAX_RETRIES};
use rand::Rng;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Maps a 0-based attempt index to the wait before the next attempt
#[derive(Clone)]
pub enum DelaySchedule {
    /// Retry right away
    Immediate,
    /// Wait the same amount before every retry
    Fixed(Duration),
    /// `base * 2^attempt`, capped at `max`, randomized by `jitter_factor`
    Exponential {
        base: Duration,
        max: Duration,
        jitter_factor: f64,
    },
    /// Any function of the attempt index
    Custom(Arc<dyn Fn(u32) -> Duration + Send + Sync>),
}

impl fmt::Debug for DelaySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelaySchedule::Immediate => write!(f, "DelaySchedule::Immediate"),
            DelaySchedule::Fixed(delay) => write!(f, "DelaySchedule::Fixed({delay:?})"),
            DelaySchedule::Exponential {
                base,
                max,
                jitter_factor,
            } => f
                .debug_struct("DelaySchedule::Exponential")
                .field("base", base)
                .field("max", max)
                .field("jitter_factor", jitter_factor)
                .finish(),
            DelaySchedule::Custom(_) => write!(f, "DelaySchedule::Custom(<schedule>)"),
        }
    }
}

impl Default for DelaySchedule {
    fn default() -> Self {
        DelaySchedule::Immediate
    }
}

impl DelaySchedule {
    /// Uncapped exponential backoff without jitter
    pub fn exponential(base: Duration) -> Self {
        DelaySchedule::Exponential {
            base,
            max: Duration::MAX,
            jitter_factor: 0.0,
        }
    }

    pub fn custom<F>(schedule: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        DelaySchedule::Custom(Arc::new(schedule))
    }

    /// Cap an exponential schedule; other schedules are returned unchanged
    #[must_use]
    pub fn with_max(self, cap: Duration) -> Self {
        match self {
            DelaySchedule::Exponential {
                base,
                jitter_factor,
                ..
            } => DelaySchedule::Exponential {
                base,
                max: cap,
                jitter_factor,
            },
            other => other,
        }
    }

    /// Randomize an exponential schedule by up to `factor` of each delay.
    ///
    /// `factor` is clamped to `0.0..=1.0`; NaN disables jitter.
    #[must_use]
    pub fn with_jitter(self, factor: f64) -> Self {
        let factor = if factor.is_nan() {
            0.0
        } else {
            factor.clamp(0.0, 1.0)
        };
        match self {
            DelaySchedule::Exponential { base, max, .. } => DelaySchedule::Exponential {
                base,
                max,
                jitter_factor: factor,
            },
            other => other,
        }
    }

    /// Delay to wait after attempt `attempt` (0-based) failed
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self {
            DelaySchedule::Immediate => Duration::ZERO,
            DelaySchedule::Fixed(delay) => *delay,
            DelaySchedule::Exponential {
                base,
                max,
                jitter_factor,
            } => {
                let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
                let capped = base.saturating_mul(factor).min(*max);
                apply_jitter(capped, *jitter_factor)
            }
            DelaySchedule::Custom(schedule) => schedule(attempt),
        }
    }
}

fn apply_jitter(delay: Duration, jitter_factor: f64) -> Duration {
    if jitter_factor <= 0.0 || delay.is_zero() {
        return delay;
    }

    // Spread thundering herds: +/- jitter_factor of the delay
    let spread = rand::thread_rng().gen_range(-1.0..=1.0) * jitter_factor;
    let scale = (1.0 + spread).max(0.0);
    Duration::try_from_secs_f64(delay.as_secs_f64() * scale).unwrap_or(Duration::MAX)
}

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt; at most `max_retries + 1` invocations
    pub max_retries: u32,
    /// Wait between attempts
    pub delay: DelaySchedule,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DelaySchedule::Immediate,
        }
    }
}

impl RetryConfig {
    /// Fixed-count retry with no wait between attempts
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            delay: DelaySchedule::Immediate,
        }
    }

    /// Retry with a wait taken from `delay` before each new attempt
    pub fn wait_and_retry(max_retries: u32, delay: DelaySchedule) -> Self {
        Self { max_retries, delay }
    }

    pub fn validate(&self) -> Result<()> {
        if let DelaySchedule::Exponential { jitter_factor, .. } = self.delay {
            if !(0.0..=1.0).contains(&jitter_factor) {
                return Err(Error::configuration(format!(
                    "jitter_factor must be within 0.0..=1.0, got {jitter_factor}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_exponential_doubles_from_base() {
        let schedule = DelaySchedule::exponential(Duration::from_secs(1));
        let delays: Vec<_> = (0..3).map(|attempt| schedule.delay_for(attempt)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
    }

    #[test]
    fn test_exponential_cap_and_overflow() {
        let schedule =
            DelaySchedule::exponential(Duration::from_millis(100)).with_max(Duration::from_secs(1));
        assert_eq!(schedule.delay_for(3), Duration::from_millis(800));
        assert_eq!(schedule.delay_for(4), Duration::from_secs(1));
        assert_eq!(schedule.delay_for(200), Duration::from_secs(1));
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let schedule = DelaySchedule::exponential(Duration::from_millis(100)).with_jitter(0.5);

        let delays: Vec<_> = (0..20).map(|_| schedule.delay_for(2)).collect();
        let unique: HashSet<_> = delays.iter().collect();
        assert!(unique.len() > 1);

        // 400ms +/- 50%
        for delay in delays {
            assert!(delay >= Duration::from_millis(200));
            assert!(delay <= Duration::from_millis(600));
        }
    }

    #[test]
    fn test_custom_and_immediate() {
        let schedule = DelaySchedule::custom(|attempt| Duration::from_millis(10 * u64::from(attempt)));
        assert_eq!(schedule.delay_for(3), Duration::from_millis(30));
        assert_eq!(DelaySchedule::Immediate.delay_for(9), Duration::ZERO);
        // cap only applies to exponential schedules
        assert!(matches!(
            DelaySchedule::Fixed(Duration::from_secs(5)).with_max(Duration::from_secs(1)),
            DelaySchedule::Fixed(d) if d == Duration::from_secs(5)
        ));
    }

    #[test]
    fn test_jitter_keeps_sub_millisecond_precision() {
        let schedule = DelaySchedule::exponential(Duration::from_micros(1_500)).with_jitter(0.5);

        let delays: Vec<_> = (0..50).map(|_| schedule.delay_for(0)).collect();
        assert!(delays.iter().any(|d| d.subsec_nanos() % 1_000_000 != 0));
        for delay in delays {
            assert!(delay >= Duration::from_micros(750));
            assert!(delay <= Duration::from_micros(2_250));
        }
    }

    #[test]
    fn test_with_jitter_clamps_factor() {
        let jitter = |schedule: DelaySchedule| match schedule {
            DelaySchedule::Exponential { jitter_factor, .. } => jitter_factor,
            other => panic!("expected exponential schedule, got {other:?}"),
        };
        let base = DelaySchedule::exponential(Duration::from_millis(10));

        assert_eq!(jitter(base.clone().with_jitter(5.0)), 1.0);
        assert_eq!(jitter(base.clone().with_jitter(-0.3)), 0.0);
        assert_eq!(jitter(base.with_jitter(f64::NAN)), 0.0);

        let preset = RetryConfig::wait_and_retry(
            3,
            DelaySchedule::exponential(Duration::from_millis(10)).with_jitter(5.0),
        );
        assert!(preset.validate().is_ok());
    }

    #[test]
    fn test_validate_jitter() {
        let config = RetryConfig::wait_and_retry(
            3,
            DelaySchedule::Exponential {
                base: Duration::from_millis(10),
                max: Duration::from_secs(1),
                jitter_factor: 1.5,
            },
        );
        assert!(config.validate().is_err());
        assert!(RetryConfig::immediate(3).validate().is_ok());
    }
}
