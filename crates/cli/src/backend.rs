//! Simulated legacy backend
//!
//! Stands in for the unreliable inventory service the policies protect:
//! every request takes a while and only every fourth one succeeds.

use breakwater_core::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Stock level reported by successful requests
pub const ITEMS_IN_STOCK: i32 = 15;
pub const FAILURE_MESSAGE: &str = "Something went wrong.";
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(100);

const SUCCESS_EVERY: usize = 4;

/// A response from the backend with a JSON-encoded body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    fn json<B: serde::Serialize + ?Sized>(status: u16, body: &B) -> Result<Self> {
        Ok(Self {
            status,
            body: serde_json::to_string(body)?,
        })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug)]
pub struct LegacyBackend {
    requests: AtomicUsize,
    latency: Duration,
}

impl LegacyBackend {
    pub fn new() -> Self {
        Self::with_latency(DEFAULT_LATENCY)
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            requests: AtomicUsize::new(0),
            latency,
        }
    }

    /// Number of requests that have reached the backend
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub async fn get(&self, id: u32) -> Result<Response> {
        tokio::time::sleep(self.latency).await;
        let request = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(id, request, "legacy backend request");

        if request % SUCCESS_EVERY == 0 {
            Response::json(200, &ITEMS_IN_STOCK)
        } else {
            Response::json(500, FAILURE_MESSAGE)
        }
    }
}

impl Default for LegacyBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_every_fourth_request_succeeds() {
        let backend = LegacyBackend::new();
        let mut statuses = Vec::new();
        for _ in 0..8 {
            statuses.push(backend.get(1).await.unwrap().status);
        }

        assert_eq!(statuses, vec![500, 500, 500, 200, 500, 500, 500, 200]);
        assert_eq!(backend.request_count(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bodies_are_json() {
        let backend = LegacyBackend::with_latency(Duration::ZERO);
        let failed = backend.get(7).await.unwrap();
        assert!(!failed.is_success());
        assert_eq!(failed.body, "\"Something went wrong.\"");

        backend.get(7).await.unwrap();
        backend.get(7).await.unwrap();
        let ok = backend.get(7).await.unwrap();
        assert!(ok.is_success());
        assert_eq!(serde_json::from_str::<i32>(&ok.body).unwrap(), ITEMS_IN_STOCK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_take_the_configured_latency() {
        let backend = LegacyBackend::new();
        let start = tokio::time::Instant::now();
        backend.get(1).await.unwrap();
        assert_eq!(start.elapsed(), DEFAULT_LATENCY);
    }
}
