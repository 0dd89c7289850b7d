//! The uniform policy abstraction.
//!
//! Every strategy implements [`Policy`], so retries, breakers and chains of
//! them are interchangeable wherever an operation needs protecting.

use crate::circuit::CircuitBreaker;
use crate::outcome::Outcome;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// A fault-handling strategy wrapped around an async operation.
///
/// `operation` may be invoked zero (short-circuited), one, or several
/// (retried) times, so it must be safe to call repeatedly.
#[async_trait]
pub trait Policy<T, E>: Send + Sync
where
    T: Send + 'static,
    E: Send + 'static,
{
    async fn execute<F, Fut>(&self, operation: F) -> Outcome<T, E>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Outcome<T, E>> + Send;
}

#[async_trait]
impl<T, E> Policy<T, E> for RetryPolicy<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    async fn execute<F, Fut>(&self, operation: F) -> Outcome<T, E>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Outcome<T, E>> + Send,
    {
        self.call(operation).await
    }
}

#[async_trait]
impl<T, E> Policy<T, E> for CircuitBreaker<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    async fn execute<F, Fut>(&self, operation: F) -> Outcome<T, E>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Outcome<T, E>> + Send,
    {
        self.call(operation).await
    }
}

#[async_trait]
impl<T, E, P> Policy<T, E> for Arc<P>
where
    T: Send + 'static,
    E: Send + 'static,
    P: Policy<T, E>,
{
    async fn execute<F, Fut>(&self, operation: F) -> Outcome<T, E>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Outcome<T, E>> + Send,
    {
        self.as_ref().execute(operation).await
    }
}

/// Invokes the operation exactly once with no handling
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpPolicy;

#[async_trait]
impl<T, E> Policy<T, E> for NoOpPolicy
where
    T: Send + 'static,
    E: Send + 'static,
{
    async fn execute<F, Fut>(&self, operation: F) -> Outcome<T, E>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Outcome<T, E>> + Send,
    {
        operation().await
    }
}
