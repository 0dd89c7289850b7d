//! Failure classification.
//!
//! A [`FailurePredicate`] decides whether an [`Outcome`] should be handled by
//! a policy. It is stateless, evaluated once per invocation, and replaces
//! separate "catch the error" and "inspect the value" code paths with one
//! function over the whole outcome.

use crate::outcome::{Outcome, PolicyError};
use std::fmt;
use std::sync::Arc;

type Classifier<T, E> = Arc<dyn Fn(&Outcome<T, E>) -> bool + Send + Sync>;

/// Classifies an outcome as failure (`true`) or success (`false`)
pub struct FailurePredicate<T, E> {
    classify: Classifier<T, E>,
}

impl<T, E> Clone for FailurePredicate<T, E> {
    fn clone(&self) -> Self {
        Self {
            classify: Arc::clone(&self.classify),
        }
    }
}

impl<T, E> fmt::Debug for FailurePredicate<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FailurePredicate(<predicate>)")
    }
}

impl<T: 'static, E: 'static> FailurePredicate<T, E> {
    /// Any `Err` outcome is a failure, including a broken circuit
    pub fn on_error() -> Self {
        Self::custom(|outcome: &Outcome<T, E>| outcome.is_err())
    }

    /// Only errors raised by the operation itself are failures
    pub fn on_operation_error() -> Self {
        Self::custom(|outcome: &Outcome<T, E>| matches!(outcome, Err(PolicyError::Operation(_))))
    }

    /// Successful values matching `bad` are failures; errors are not
    pub fn on_result<F>(bad: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::custom(move |outcome: &Outcome<T, E>| matches!(outcome, Ok(value) if bad(value)))
    }

    /// Classify with an arbitrary function over the whole outcome
    pub fn custom<F>(classify: F) -> Self
    where
        F: Fn(&Outcome<T, E>) -> bool + Send + Sync + 'static,
    {
        Self {
            classify: Arc::new(classify),
        }
    }

    /// Additionally treat successful values matching `bad` as failures
    pub fn or_result<F>(self, bad: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let current = self.classify;
        Self::custom(move |outcome: &Outcome<T, E>| {
            current(outcome) || matches!(outcome, Ok(value) if bad(value))
        })
    }

    /// Evaluate the predicate
    pub fn is_failure(&self, outcome: &Outcome<T, E>) -> bool {
        (self.classify)(outcome)
    }
}

impl<T: 'static, E: 'static> Default for FailurePredicate<T, E> {
    fn default() -> Self {
        Self::on_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::BrokenCircuitError;
    use std::time::Duration;

    type StatusOutcome = Outcome<u16, String>;

    fn broken() -> StatusOutcome {
        Err(BrokenCircuitError::open(Duration::from_secs(1)).into())
    }

    #[test]
    fn test_on_error() {
        let predicate = FailurePredicate::<u16, String>::on_error();
        assert!(!predicate.is_failure(&Ok(500)));
        assert!(predicate.is_failure(&Err(PolicyError::Operation("reset".into()))));
        assert!(predicate.is_failure(&broken()));
    }

    #[test]
    fn test_on_operation_error_skips_broken_circuit() {
        let predicate = FailurePredicate::<u16, String>::on_operation_error();
        assert!(predicate.is_failure(&Err(PolicyError::Operation("reset".into()))));
        assert!(!predicate.is_failure(&broken()));
    }

    #[test]
    fn test_on_result_only_inspects_values() {
        let predicate = FailurePredicate::<u16, String>::on_result(|status| *status >= 400);
        assert!(predicate.is_failure(&Ok(500)));
        assert!(!predicate.is_failure(&Ok(200)));
        assert!(!predicate.is_failure(&Err(PolicyError::Operation("reset".into()))));
    }

    #[test]
    fn test_or_result_combines() {
        let predicate = FailurePredicate::<u16, String>::on_error().or_result(|status| *status >= 500);
        assert!(predicate.is_failure(&Ok(503)));
        assert!(predicate.is_failure(&broken()));
        assert!(!predicate.is_failure(&Ok(404)));
    }
}
