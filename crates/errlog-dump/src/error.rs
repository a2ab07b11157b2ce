//! Error types for dumping.

use thiserror::Error;

/// Result type for dump operations.
pub type Result<T> = std::result::Result<T, DumpError>;

/// Errors that can occur while dumping a value.
#[derive(Error, Debug)]
pub enum DumpError {
    /// A key was used as a name but is neither a string nor an integer.
    ///
    /// This is a caller bug, not a runtime condition, and is never retried.
    #[error("invalid name: expected string or integer, got {kind}")]
    InvalidName { kind: &'static str },

    /// The writer could not emit output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
