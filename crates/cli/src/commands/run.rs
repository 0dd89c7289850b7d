//! Command execution
//!
//! Each command builds its policy from the loaded settings and then drives
//! the backend through it, keeping up to `--concurrency` requests in flight.

use super::{Commands, RequestArgs, RequestReport};
use crate::backend::{LegacyBackend, Response};
use breakwater_config::ResilienceSettings;
use breakwater_core::{Error, Result};
use breakwater_policy::{
    CircuitBreaker, CircuitBreakerStats, FailurePredicate, NoOpPolicy, Policy, PolicyExecutor,
    PolicyExt, RetryConfig, RetryPolicy,
};
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;

/// Everything a command run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub reports: Vec<RequestReport>,
    pub backend_requests: usize,
    /// Circuit transitions in the order they happened
    pub transitions: Vec<String>,
    pub breaker_stats: Option<CircuitBreakerStats>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.is_success()).count()
    }
}

/// Non-2xx responses count as failures alongside errors
fn unsuccessful_response() -> FailurePredicate<Response, Error> {
    FailurePredicate::on_error().or_result(|response: &Response| !response.is_success())
}

fn retry_policy(config: RetryConfig) -> Result<RetryPolicy<Response, Error>> {
    RetryPolicy::builder()
        .config(config)
        .handle(unsuccessful_response())
        .on_retry(|outcome, attempt| match outcome {
            Ok(response) => {
                tracing::info!(attempt, status = response.status, "retrying after bad response")
            }
            Err(err) => tracing::info!(attempt, error = %err, "retrying after error"),
        })
        .build()
}

fn status_breaker(
    settings: &ResilienceSettings,
    transitions: &Arc<Mutex<Vec<String>>>,
) -> Result<CircuitBreaker<Response, Error>> {
    let (on_break, on_reset, on_half_open) = (
        Arc::clone(transitions),
        Arc::clone(transitions),
        Arc::clone(transitions),
    );

    CircuitBreaker::builder(settings.breaker.to_config())
        .handle(unsuccessful_response())
        .on_break(move |outcome, duration| {
            let cause = match outcome {
                Ok(response) => format!("status {}", response.status),
                Err(err) => err.to_string(),
            };
            on_break
                .lock()
                .push(format!("open for {}ms after {cause}", duration.as_millis()));
        })
        .on_reset(move || on_reset.lock().push("closed".to_string()))
        .on_half_open(move || on_half_open.lock().push("half-open".to_string()))
        .build()
}

async fn drive<P>(policy: &P, backend: &LegacyBackend, args: &RequestArgs) -> Vec<RequestReport>
where
    P: Policy<Response, Error>,
{
    let id = args.id;
    let requests = (1..=args.requests).map(|request| async move {
        let outcome = PolicyExecutor::execute_fallible(policy, || backend.get(id)).await;
        let report = RequestReport::from_outcome(request, &outcome);
        tracing::debug!(request, status = report.status, "request finished");
        report
    });

    stream::iter(requests)
        .buffered(args.concurrency.max(1))
        .collect()
        .await
}

impl Commands {
    pub async fn execute(
        self,
        settings: &ResilienceSettings,
        backend: Arc<LegacyBackend>,
    ) -> Result<RunSummary> {
        let args = self.args().clone();
        let transitions = Arc::new(Mutex::new(Vec::new()));
        let mut breaker_stats = None;

        let reports = match self {
            Commands::NoPolicy(_) => drive(&NoOpPolicy, &backend, &args).await,
            Commands::Retry(_) => {
                let policy = retry_policy(settings.retry.immediate_config())?;
                drive(&policy, &backend, &args).await
            }
            Commands::WaitAndRetry(_) => {
                let policy = retry_policy(settings.retry.backoff_config())?;
                drive(&policy, &backend, &args).await
            }
            Commands::Breaker(_) => {
                let breaker = Arc::new(status_breaker(settings, &transitions)?);
                let policy = retry_policy(settings.retry.immediate_config())?
                    .wrap(Arc::clone(&breaker));
                let reports = drive(&policy, &backend, &args).await;
                breaker_stats = Some(breaker.stats());
                reports
            }
        };

        let transitions = transitions.lock().clone();
        Ok(RunSummary {
            reports,
            backend_requests: backend.request_count(),
            transitions,
            breaker_stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breakwater_policy::CircuitState;
    use std::time::Duration;

    fn args(requests: usize) -> RequestArgs {
        RequestArgs {
            requests,
            ..RequestArgs::default()
        }
    }

    async fn run(command: Commands) -> RunSummary {
        command
            .execute(&ResilienceSettings::default(), Arc::new(LegacyBackend::new()))
            .await
            .unwrap()
    }

    fn statuses(summary: &RunSummary) -> Vec<u16> {
        summary.reports.iter().map(|r| r.status).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_policy_surfaces_every_failure() {
        let summary = run(Commands::NoPolicy(args(4))).await;
        assert_eq!(statuses(&summary), vec![500, 500, 500, 200]);
        assert_eq!(summary.reports[0].to_string(), "500 Something went wrong.");
        assert_eq!(summary.backend_requests, 4);
        assert!(summary.breaker_stats.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_reaches_the_fourth_request() {
        let summary = run(Commands::Retry(args(1))).await;
        assert_eq!(summary.reports[0].to_string(), "200 15");
        assert_eq!(summary.backend_requests, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_and_retry_backs_off() {
        let start = tokio::time::Instant::now();
        let summary = run(Commands::WaitAndRetry(args(1))).await;

        assert_eq!(summary.succeeded(), 1);
        // four 100ms requests plus 1s, 2s and 4s of backoff
        assert_eq!(start.elapsed(), Duration::from_millis(7_400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_breaker_opens_under_retries() {
        let summary = run(Commands::Breaker(args(3))).await;

        // request 1 recovers on its fourth attempt, request 2 trips the
        // breaker at seven samples and the rest are refused
        assert_eq!(statuses(&summary), vec![200, 503, 503]);
        assert_eq!(summary.backend_requests, 7);
        assert_eq!(
            summary.transitions,
            vec!["open for 15000ms after status 500".to_string()]
        );
        let stats = summary.breaker_stats.unwrap();
        assert_eq!(stats.state, CircuitState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_keeps_report_order() {
        let summary = run(Commands::NoPolicy(RequestArgs {
            requests: 8,
            concurrency: 4,
            ..RequestArgs::default()
        }))
        .await;

        let order: Vec<usize> = summary.reports.iter().map(|r| r.request).collect();
        assert_eq!(order, (1..=8).collect::<Vec<_>>());
        assert_eq!(summary.succeeded(), 2);
    }
}
