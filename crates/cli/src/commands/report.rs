//! Turning policy outcomes into printable results

use crate::backend::Response;
use breakwater_core::Error;
use breakwater_policy::{Outcome, PolicyError};
use std::fmt;

/// Status used when the circuit refuses a request
pub const SERVICE_UNAVAILABLE: u16 = 503;
/// Status used when the backend answer could not be understood
pub const BAD_GATEWAY: u16 = 502;

/// What a single request finally produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestReport {
    pub request: usize,
    pub status: u16,
    pub message: String,
}

impl RequestReport {
    pub fn from_outcome(request: usize, outcome: &Outcome<Response, Error>) -> Self {
        let (status, message) = match outcome {
            Ok(response) if response.is_success() => {
                match serde_json::from_str::<i32>(&response.body) {
                    Ok(items) => (response.status, items.to_string()),
                    Err(e) => (BAD_GATEWAY, format!("undecodable body: {e}")),
                }
            }
            Ok(response) => {
                let message = serde_json::from_str::<String>(&response.body)
                    .unwrap_or_else(|_| response.body.clone());
                (response.status, message)
            }
            Err(PolicyError::BrokenCircuit(err)) => (SERVICE_UNAVAILABLE, err.to_string()),
            Err(PolicyError::Operation(err)) => (BAD_GATEWAY, err.to_string()),
        };

        Self {
            request,
            status,
            message,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl fmt::Display for RequestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.message)
    }
}
