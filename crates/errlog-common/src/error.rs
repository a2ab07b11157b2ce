//! Error types shared across errlog crates.

use thiserror::Error;

/// Result type alias for errlog-common operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading records and values.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record file did not contain what it claimed to.
    #[error("invalid record in {path}: {reason}")]
    InvalidRecord { path: String, reason: String },
}
