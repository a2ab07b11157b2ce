//! Shared types for errlog.
//!
//! This crate provides the foundation the rendering crates build on:
//! - The runtime value model with identity-preserving composites
//! - Throwable records and stack frames captured at error time
//! - The process-wide severity code table
//! - Markup and text helpers (escaping, grapheme-aware truncation)
//! - Common error types

pub mod error;
pub mod markup;
pub mod severity;
pub mod text;
pub mod throwable;
pub mod value;

pub use error::{Error, Result};
pub use severity::{severity_label, Severity};
pub use throwable::{StackFrame, ThrowableRecord};
pub use value::{Composite, SharedCell, Value};
