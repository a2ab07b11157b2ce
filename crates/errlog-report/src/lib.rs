//! HTML error reports.
//!
//! Renders a captured throwable (message, source context, call stack and
//! cause chain) plus an optional variable dump as one self-contained HTML
//! document written to a [`Sink`].
//!
//! # Modes
//!
//! - **Production**: [`ErrorLogger::production`] writes
//!   `error-<timestamp>-<pid>.html` files into a directory
//! - **Development**: [`ErrorLogger::development`] streams the page to stdout
//!
//! Producing a report never fails from the caller's point of view:
//! [`ErrorLogger::log_error`] swallows every error raised while the report
//! itself is being written, so the error being reported is never masked.
//!
//! # Example
//!
//! ```no_run
//! use errlog_common::{StackFrame, ThrowableRecord, Value};
//! use errlog_report::ErrorLogger;
//!
//! let record = ThrowableRecord::new("DivisionByZeroError", "Division by zero")
//!     .at("/app/src/ClassB.src", 23)
//!     .with_frame(StackFrame::method("ClassB", "methodB").at("/app/src/ClassA.src", 17).with_arg(0));
//!
//! let mut logger = ErrorLogger::production("/var/log/app");
//! logger.dump_vars(Value::assoc([("user", "alice")]), false);
//! logger.log_error(&record);
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod logger;
pub mod page;
pub mod panic;
pub mod sink;
pub mod snippet;
pub mod trace;

pub use config::ReportConfig;
pub use error::{ReportError, Result};
pub use format::ValueFormatter;
pub use logger::{ErrorLogger, ReportState};
pub use panic::install_panic_hook;
pub use sink::{FileSink, MemorySink, PathSink, Sink, StdoutSink};
pub use snippet::SourceSnippet;
pub use trace::StackTraceRenderer;
