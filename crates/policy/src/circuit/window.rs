//! Rolling success/failure counters for the closed state.
//!
//! The sampling duration is divided into buckets. Outcomes land in the
//! newest bucket; a bucket is dropped once its start falls out of the
//! trailing window, so counts only ever cover recent calls.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

const NUMBER_OF_BUCKETS: u32 = 10;

/// Below this duration a single bucket is used
const MIN_BUCKETED_DURATION: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy)]
struct Bucket {
    started_at: Instant,
    successes: u32,
    failures: u32,
}

/// Aggregated counts over the live buckets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowCounts {
    pub successes: u32,
    pub failures: u32,
}

impl WindowCounts {
    pub fn total(&self) -> u32 {
        self.successes + self.failures
    }

    pub fn failure_ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => f64::from(self.failures) / f64::from(total),
        }
    }
}

#[derive(Debug)]
pub struct SamplingWindow {
    duration: Duration,
    bucket_span: Duration,
    buckets: VecDeque<Bucket>,
}

impl SamplingWindow {
    pub fn new(duration: Duration) -> Self {
        let bucket_span = if duration < MIN_BUCKETED_DURATION {
            duration
        } else {
            duration / NUMBER_OF_BUCKETS
        };

        Self {
            duration,
            bucket_span,
            buckets: VecDeque::with_capacity(NUMBER_OF_BUCKETS as usize + 1),
        }
    }

    pub fn record_success(&mut self, now: Instant) {
        self.current_bucket(now).successes += 1;
    }

    pub fn record_failure(&mut self, now: Instant) {
        self.current_bucket(now).failures += 1;
    }

    /// Counts over the trailing window ending at `now`
    pub fn counts(&mut self, now: Instant) -> WindowCounts {
        self.evict(now);
        self.buckets
            .iter()
            .fold(WindowCounts::default(), |acc, bucket| WindowCounts {
                successes: acc.successes + bucket.successes,
                failures: acc.failures + bucket.failures,
            })
    }

    pub fn reset(&mut self) {
        self.buckets.clear();
    }

    fn current_bucket(&mut self, now: Instant) -> &mut Bucket {
        self.evict(now);

        let needs_new = match self.buckets.back() {
            Some(bucket) => now.saturating_duration_since(bucket.started_at) >= self.bucket_span,
            None => true,
        };
        if needs_new {
            self.buckets.push_back(Bucket {
                started_at: now,
                successes: 0,
                failures: 0,
            });
        }

        let last = self.buckets.len() - 1;
        &mut self.buckets[last]
    }

    fn evict(&mut self, now: Instant) {
        while let Some(bucket) = self.buckets.front() {
            if now.saturating_duration_since(bucket.started_at) >= self.duration {
                self.buckets.pop_front();
            } else {
                break;
            }
        }
    }
}
