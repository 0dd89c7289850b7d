//! Core error type definitions

use std::path::PathBuf;

/// Result type alias for breakwater operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for breakwater operations using thiserror
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid policy or settings values
    Configuration { message: String },

    /// Environment variable overrides that could not be applied
    Environment { variable: String, message: String },

    /// File system operations
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}
