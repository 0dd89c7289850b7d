use clap::{Args, Subcommand};

pub mod report;
pub mod run;

pub use report::RequestReport;
pub use run::RunSummary;

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Call the backend directly with no policy in front of it
    NoPolicy(RequestArgs),

    /// Retry failed requests immediately
    Retry(RequestArgs),

    /// Retry failed requests with exponential backoff
    WaitAndRetry(RequestArgs),

    /// Retry through a shared circuit breaker
    Breaker(RequestArgs),
}

impl Commands {
    pub fn args(&self) -> &RequestArgs {
        match self {
            Commands::NoPolicy(args)
            | Commands::Retry(args)
            | Commands::WaitAndRetry(args)
            | Commands::Breaker(args) => args,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RequestArgs {
    /// Item id to request from the backend
    #[arg(long, default_value_t = 1)]
    pub id: u32,

    /// Number of requests to send
    #[arg(short = 'n', long, default_value_t = 1)]
    pub requests: usize,

    /// Requests kept in flight at once
    #[arg(short = 'c', long, default_value_t = 1)]
    pub concurrency: usize,
}

impl Default for RequestArgs {
    fn default() -> Self {
        Self {
            id: 1,
            requests: 1,
            concurrency: 1,
        }
    }
}
