//! Policy composition.

use crate::outcome::Outcome;
use crate::policy::Policy;
use async_trait::async_trait;
use std::future::Future;

/// Runs `inner.execute(operation)` as the operation of `outer`.
///
/// With a retry outside a circuit breaker, every retry attempt goes through
/// the breaker: an open circuit answers each attempt with a broken-circuit
/// failure without calling the dependency, and those attempts still count
/// against the retry budget.
#[derive(Debug, Clone)]
pub struct PolicyChain<O, I> {
    outer: O,
    inner: I,
}

impl<O, I> PolicyChain<O, I> {
    pub fn new(outer: O, inner: I) -> Self {
        Self { outer, inner }
    }

    pub fn outer(&self) -> &O {
        &self.outer
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }
}

#[async_trait]
impl<T, E, O, I> Policy<T, E> for PolicyChain<O, I>
where
    T: Send + 'static,
    E: Send + 'static,
    O: Policy<T, E>,
    I: Policy<T, E>,
{
    async fn execute<F, Fut>(&self, operation: F) -> Outcome<T, E>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Outcome<T, E>> + Send,
    {
        let inner = &self.inner;
        let operation = &operation;
        self.outer.execute(move || inner.execute(operation)).await
    }
}

/// `outer.wrap(inner)` builds a [`PolicyChain`]
pub trait PolicyExt<T, E>: Policy<T, E> + Sized
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn wrap<I>(self, inner: I) -> PolicyChain<Self, I>
    where
        I: Policy<T, E>,
    {
        PolicyChain::new(self, inner)
    }
}

impl<T, E, P> PolicyExt<T, E> for P
where
    T: Send + 'static,
    E: Send + 'static,
    P: Policy<T, E>,
{
}
