/// Constants used throughout the breakwater codebase
// Environment variable names
pub const BREAKWATER_LOG_VAR: &str = "BREAKWATER_LOG";
pub const BREAKWATER_CONFIG_VAR: &str = "BREAKWATER_CONFIG";
pub const BREAKWATER_MAX_RETRIES_VAR: &str = "BREAKWATER_MAX_RETRIES";
pub const BREAKWATER_BREAK_DURATION_VAR: &str = "BREAKWATER_BREAK_DURATION_MS";
pub const BREAKWATER_FAILURE_RATIO_VAR: &str = "BREAKWATER_FAILURE_RATIO";

// Default log filter when BREAKWATER_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

// Circuit breaker defaults
pub const DEFAULT_FAILURE_THRESHOLD_RATIO: f64 = 0.5;
pub const DEFAULT_SAMPLING_DURATION_MS: u64 = 60_000;
pub const DEFAULT_MINIMUM_THROUGHPUT: u32 = 7;
pub const DEFAULT_BREAK_DURATION_MS: u64 = 15_000;

// Retry defaults
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;
