//! Error types for report generation.

use thiserror::Error;

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors that can occur while producing a report.
///
/// None of these escape [`crate::ErrorLogger::log_error`]; they surface only
/// through [`crate::ErrorLogger::try_log_error`] and the configuration loaders.
#[derive(Error, Debug)]
pub enum ReportError {
    /// IO error while writing the page.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The staged variable dump was rejected.
    #[error("dump failed: {0}")]
    DumpError(#[from] errlog_dump::DumpError),

    /// The sink could not provide or release a stream.
    #[error("sink '{sink}' failed: {reason}")]
    SinkError { sink: String, reason: String },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
