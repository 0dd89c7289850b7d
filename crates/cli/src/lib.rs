pub mod backend;
pub mod commands;
pub mod logging;

// Re-export commonly used types
pub use backend::{LegacyBackend, Response};
pub use commands::{Commands, RequestArgs, RequestReport, RunSummary};
