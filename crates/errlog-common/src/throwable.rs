//! Captured throwables and their stack frames.
//!
//! A [`ThrowableRecord`] is an immutable snapshot taken when an error is
//! caught: type, code, message, origin, the call stack (innermost frame
//! first) and an optional cause. Causes form a singly linked chain that ends
//! at the first record without one.
//!
//! Records deserialize from JSON so that errors captured by another process
//! can be rendered later:
//!
//! ```json
//! {
//!   "type": "DivisionByZeroError",
//!   "code": 0,
//!   "message": "Division by zero",
//!   "file": "/app/src/ClassB.src",
//!   "line": 23,
//!   "trace": [
//!     { "file": "/app/src/ClassA.src", "line": 17, "class": "ClassB",
//!       "function": "methodB", "args": [null] }
//!   ],
//!   "previous": null
//! }
//! ```

use crate::error::{Error, Result};
use crate::value::Value;
use serde::Deserialize;
use std::panic::{Location, PanicHookInfo};
use std::path::Path;

/// One entry of a call stack.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StackFrame {
    /// Source file of the call site; absent for internal calls.
    #[serde(default)]
    pub file: Option<String>,
    /// Line of the call site.
    #[serde(default)]
    pub line: Option<u32>,
    /// Declaring type of the callable.
    #[serde(default, rename = "class")]
    pub class_name: Option<String>,
    /// Callable name.
    pub function: String,
    /// Argument values as passed.
    #[serde(default)]
    pub args: Vec<Value>,
}

impl StackFrame {
    /// Frame for a free function.
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            ..Self::default()
        }
    }

    /// Frame for a method of `class_name`.
    pub fn method(class_name: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            function: function.into(),
            ..Self::default()
        }
    }

    /// Set the call site.
    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    /// Append an argument.
    pub fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Replace all arguments.
    pub fn with_args<I, V>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Call site, when both file and line are known.
    pub fn site(&self) -> Option<(&str, u32)> {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => Some((file.as_str(), line)),
            _ => None,
        }
    }
}

/// An error captured for reporting.
#[derive(Debug, Clone, Deserialize)]
pub struct ThrowableRecord {
    /// Type name of the error.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Numeric code; see [`crate::severity`].
    #[serde(default)]
    pub code: i64,
    /// Message as raised.
    #[serde(default)]
    pub message: String,
    /// File the error was raised in.
    #[serde(default)]
    pub file: Option<String>,
    /// Line the error was raised at.
    #[serde(default)]
    pub line: Option<u32>,
    /// Call stack, innermost frame first.
    #[serde(default, rename = "trace")]
    pub frames: Vec<StackFrame>,
    /// The error that caused this one.
    #[serde(default, rename = "previous")]
    pub cause: Option<Box<ThrowableRecord>>,
}

impl ThrowableRecord {
    /// New record without origin, frames or cause.
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            code: 0,
            message: message.into(),
            file: None,
            line: None,
            frames: Vec::new(),
            cause: None,
        }
    }

    /// Set the numeric code.
    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    /// Set the origin.
    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    /// Append a frame (frames are innermost first).
    pub fn with_frame(mut self, frame: StackFrame) -> Self {
        self.frames.push(frame);
        self
    }

    /// Set the cause.
    pub fn with_cause(mut self, cause: ThrowableRecord) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Origin, when both file and line are known.
    pub fn site(&self) -> Option<(&str, u32)> {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => Some((file.as_str(), line)),
            _ => None,
        }
    }

    /// This record followed by every cause, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &ThrowableRecord> {
        std::iter::successors(Some(self), |record| record.cause.as_deref())
    }

    /// Number of causes below this record.
    pub fn cause_depth(&self) -> usize {
        self.chain().count() - 1
    }

    /// Capture a Rust error and its `source()` chain.
    ///
    /// The outermost record is located at the caller; causes carry no origin
    /// since `std::error::Error` does not expose one.
    #[track_caller]
    pub fn from_error(type_name: impl Into<String>, error: &(dyn std::error::Error + 'static)) -> Self {
        let location = Location::caller();
        let mut record =
            ThrowableRecord::new(type_name, error.to_string()).at(location.file(), location.line());

        let causes: Vec<ThrowableRecord> =
            std::iter::successors(error.source(), |e| e.source())
                .map(|source| ThrowableRecord::new("Caused by", source.to_string()))
                .collect();
        record.cause = causes.into_iter().rev().fold(None, |inner, mut cause| {
            cause.cause = inner;
            Some(Box::new(cause))
        });
        record
    }

    /// Capture a panic from inside a panic hook.
    pub fn from_panic(info: &PanicHookInfo<'_>) -> Self {
        let payload = info.payload();
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };

        let mut record = ThrowableRecord::new("Panic", message);
        if let Some(location) = info.location() {
            record = record.at(location.file(), location.line());
        }
        if let Some(name) = std::thread::current().name() {
            record = record.with_frame(StackFrame::new("thread").with_arg(name));
        }
        record
    }

    /// Parse a record from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let record: ThrowableRecord = serde_json::from_str(json)?;
        record.validate("<json>")?;
        Ok(record)
    }

    /// Load a record from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let record: ThrowableRecord = serde_json::from_str(&contents)?;
        record.validate(&path.display().to_string())?;
        Ok(record)
    }

    fn validate(&self, origin: &str) -> Result<()> {
        for record in self.chain() {
            if record.type_name.trim().is_empty() {
                return Err(Error::InvalidRecord {
                    path: origin.to_string(),
                    reason: "throwable type name is empty".to_string(),
                });
            }
            if let Some(frame) = record.frames.iter().find(|f| f.function.is_empty()) {
                return Err(Error::InvalidRecord {
                    path: origin.to_string(),
                    reason: format!(
                        "frame at {}({}) has no function name",
                        frame.file.as_deref().unwrap_or("?"),
                        frame.line.unwrap_or(0)
                    ),
                });
            }
        }
        Ok(())
    }
}
