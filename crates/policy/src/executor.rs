//! Call-site driver for policies.

use crate::outcome::{lift, Outcome};
use crate::policy::Policy;
use futures::FutureExt;
use std::future::Future;

/// Stateless entry point that runs any [`Policy`] around an operation
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyExecutor;

impl PolicyExecutor {
    /// Run an operation that already speaks [`Outcome`]
    pub async fn execute<P, T, E, F, Fut>(policy: &P, operation: F) -> Outcome<T, E>
    where
        P: Policy<T, E>,
        T: Send + 'static,
        E: Send + 'static,
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Outcome<T, E>> + Send,
    {
        policy.execute(operation).await
    }

    /// Run a plain fallible operation; its errors become `PolicyError::Operation`
    pub async fn execute_fallible<P, T, E, F, Fut>(policy: &P, operation: F) -> Outcome<T, E>
    where
        P: Policy<T, E>,
        T: Send + 'static,
        E: Send + 'static,
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, E>> + Send,
    {
        let operation = &operation;
        policy.execute(move || operation().map(lift)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::PolicyError;
    use crate::policy::NoOpPolicy;
    use crate::retry::RetryPolicy;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_execute_delegates() {
        let outcome: Outcome<u32, String> =
            PolicyExecutor::execute(&NoOpPolicy, || async { Ok(15) }).await;
        assert_eq!(outcome.unwrap(), 15);
    }

    #[tokio::test]
    async fn test_execute_fallible_lifts_errors() {
        let policy = RetryPolicy::<u32, std::io::Error>::immediate(2);
        let counter = AtomicU32::new(0);

        let outcome = PolicyExecutor::execute_fallible(&policy, || async {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "refused",
            ))
        })
        .await;

        assert_eq!(counter.load(Ordering::SeqCst), 3);
        match outcome {
            Err(PolicyError::Operation(err)) => {
                assert_eq!(err.kind(), std::io::ErrorKind::ConnectionRefused)
            }
            other => panic!("expected the lifted io error, got {other:?}"),
        }
    }
}
