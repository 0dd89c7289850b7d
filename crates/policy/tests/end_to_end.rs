//! End-to-end scenarios through the public API

use breakwater_policy::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, DelaySchedule, FailurePredicate,
    PolicyError, PolicyExecutor, PolicyExt, RetryPolicy,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Response {
    status: u16,
    body: String,
}

impl Response {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Succeeds on every `period`-th request, like a badly behaved legacy API
struct FlakyService {
    requests: AtomicUsize,
    period: usize,
}

impl FlakyService {
    fn new(period: usize) -> Self {
        Self {
            requests: AtomicUsize::new(0),
            period,
        }
    }

    async fn get(&self) -> Result<Response, std::io::Error> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let n = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        if n % self.period == 0 {
            Ok(Response {
                status: 200,
                body: "15".into(),
            })
        } else {
            Ok(Response {
                status: 500,
                body: "Something went wrong.".into(),
            })
        }
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("breakwater_policy=debug")
        .try_init();
}

fn non_success() -> FailurePredicate<Response, std::io::Error> {
    FailurePredicate::on_error().or_result(|response: &Response| !response.is_success())
}

#[tokio::test(start_paused = true)]
async fn test_retry_three_times_reaches_fourth_request() {
    init_tracing();
    let service = FlakyService::new(4);
    let policy = RetryPolicy::builder()
        .max_retries(3)
        .handle(non_success())
        .build()
        .unwrap();

    let response = PolicyExecutor::execute_fallible(&policy, || service.get())
        .await
        .unwrap();

    assert_eq!(response.body, "15");
    assert_eq!(service.requests(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_retry_surfaces_fourth_failure_without_fifth_call() {
    init_tracing();
    let service = FlakyService::new(5);
    let policy = RetryPolicy::builder()
        .max_retries(3)
        .handle(non_success())
        .build()
        .unwrap();

    let response = PolicyExecutor::execute_fallible(&policy, || service.get())
        .await
        .unwrap();

    // retries exhausted: the final bad response comes back unchanged
    assert_eq!(response.status, 500);
    assert_eq!(service.requests(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_wait_and_retry_spends_backoff_between_requests() {
    init_tracing();
    let service = FlakyService::new(4);
    let policy = RetryPolicy::builder()
        .max_retries(3)
        .delay(DelaySchedule::exponential(Duration::from_secs(1)))
        .handle(non_success())
        .build()
        .unwrap();

    let started = tokio::time::Instant::now();
    let response = PolicyExecutor::execute_fallible(&policy, || service.get())
        .await
        .unwrap();

    assert!(response.is_success());
    // 4 x 100ms requests + 1s + 2s + 4s of backoff
    assert_eq!(started.elapsed(), Duration::from_millis(7_400));
}

#[tokio::test(start_paused = true)]
async fn test_shared_breaker_under_retry_sheds_load() {
    init_tracing();
    let service = FlakyService::new(4);
    let breaks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&breaks);

    let breaker = Arc::new(
        CircuitBreaker::builder(CircuitBreakerConfig::default())
            .handle(non_success())
            .on_break(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap(),
    );
    let policy = RetryPolicy::builder()
        .max_retries(3)
        .handle(non_success())
        .build()
        .unwrap()
        .wrap(Arc::clone(&breaker));

    // first caller: 3 failures then success, 4 requests
    let first = PolicyExecutor::execute_fallible(&policy, || service.get()).await;
    assert!(first.unwrap().is_success());
    assert_eq!(breaker.state(), CircuitState::Closed);

    // second caller: requests 5..7 fail and trip the breaker at 7 calls (6 failures)
    let second = PolicyExecutor::execute_fallible(&policy, || service.get()).await;
    assert!(matches!(second, Err(PolicyError::BrokenCircuit(_))));
    assert_eq!(service.requests(), 7);
    assert_eq!(breaks.load(Ordering::SeqCst), 1);

    // while open nothing reaches the service
    let third = PolicyExecutor::execute_fallible(&policy, || service.get()).await;
    assert!(third.unwrap_err().is_broken_circuit());
    assert_eq!(service.requests(), 7);

    // after the break the single trial is request 8, which succeeds
    tokio::time::sleep(Duration::from_secs(15)).await;
    let fourth = PolicyExecutor::execute_fallible(&policy, || service.get()).await;
    assert!(fourth.unwrap().is_success());
    assert_eq!(service.requests(), 8);
    assert_eq!(breaker.state(), CircuitState::Closed);
}
