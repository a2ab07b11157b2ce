//! Report lifecycle.
//!
//! One call to [`ErrorLogger::log_error`] opens a stream from the sink,
//! writes the page head, the error section, the staged variable dump and
//! the closing tags, then closes the stream:
//!
//! ```text
//! Idle -> StreamOpen -> HeaderWritten -> BodyWritten -> Closed
//! ```
//!
//! The stream is closed on every path once it has been opened.

use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::page;
use crate::sink::{FileSink, Sink, StdoutSink};
use crate::trace::StackTraceRenderer;
use errlog_common::{ThrowableRecord, Value};
use errlog_dump::{HtmlVarWriter, VarDumper};
use std::any::Any;
use std::fmt;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Progress of the current (or last) report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportState {
    #[default]
    Idle,
    StreamOpen,
    HeaderWritten,
    BodyWritten,
    Closed,
}

impl fmt::Display for ReportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportState::Idle => "idle",
            ReportState::StreamOpen => "stream_open",
            ReportState::HeaderWritten => "header_written",
            ReportState::BodyWritten => "body_written",
            ReportState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// A value staged for the VarDump section.
#[derive(Debug, Clone)]
struct StagedDump {
    value: Value,
    trace_scalar_references: bool,
}

/// Renders throwables as HTML reports into a [`Sink`].
#[derive(Debug)]
pub struct ErrorLogger<S: Sink> {
    sink: S,
    config: ReportConfig,
    staged: Option<StagedDump>,
    state: ReportState,
}

impl ErrorLogger<FileSink> {
    /// Production mode: one timestamped file per report in `dir`.
    pub fn production(dir: impl Into<PathBuf>) -> Self {
        Self::new(FileSink::new(dir), ReportConfig::default())
    }
}

impl ErrorLogger<StdoutSink> {
    /// Development mode: reports go straight to stdout.
    pub fn development() -> Self {
        Self::new(StdoutSink, ReportConfig::default())
    }
}

impl<S: Sink> ErrorLogger<S> {
    pub fn new(sink: S, config: ReportConfig) -> Self {
        Self {
            sink,
            config,
            staged: None,
            state: ReportState::Idle,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: ReportConfig) -> Self {
        self.config = config;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// State reached by the last report.
    pub fn state(&self) -> ReportState {
        self.state
    }

    /// Stage `value` to be dumped after the error section of every
    /// following report. Replaces a previously staged value.
    pub fn dump_vars(&mut self, value: impl Into<Value>, trace_scalar_references: bool) {
        self.staged = Some(StagedDump {
            value: value.into(),
            trace_scalar_references,
        });
    }

    /// Drop the staged value.
    pub fn clear_vars(&mut self) {
        self.staged = None;
    }

    /// Write a report for `record`.
    ///
    /// Never fails: any error or panic raised while producing the report is
    /// logged and discarded so it cannot mask the error being reported.
    pub fn log_error(&mut self, record: &ThrowableRecord) {
        match panic::catch_unwind(AssertUnwindSafe(|| self.try_log_error(record))) {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => {
                warn!(
                    sink = %self.sink.describe(),
                    state = %self.state,
                    error = %err,
                    "failed to write error report"
                );
            }
            Err(payload) => {
                // The stream was dropped while unwinding.
                if self.state != ReportState::Idle {
                    self.state = ReportState::Closed;
                }
                warn!(
                    sink = %self.sink.describe(),
                    state = %self.state,
                    panic = panic_message(payload.as_ref()),
                    "panic while writing error report"
                );
            }
        }
    }

    /// Write a report for `record`, returning the number of bytes written.
    pub fn try_log_error(&mut self, record: &ThrowableRecord) -> Result<u64> {
        self.state = ReportState::Idle;
        let stream = self.sink.open().map_err(|err| self.sink_error(err))?;
        self.advance(ReportState::StreamOpen);

        let mut counted = CountingWriter::new(stream);
        let written = self.write_report(&mut counted, record);
        let bytes = counted.bytes;
        let closed = self.sink.close(counted.into_inner());
        self.advance(ReportState::Closed);

        written?;
        closed.map_err(|err| self.sink_error(err))?;
        info!(sink = %self.sink.describe(), bytes, "error report written");
        Ok(bytes)
    }

    fn write_report<W: Write>(&mut self, out: &mut W, record: &ThrowableRecord) -> Result<()> {
        out.write_all(page::leader(&self.config).as_bytes())?;
        self.advance(ReportState::HeaderWritten);

        StackTraceRenderer::new(&self.config).render_chain(out, record)?;
        if let Some(staged) = self.staged.clone() {
            out.write_all(page::dump_heading().as_bytes())?;
            let writer = HtmlVarWriter::new(&mut *out)
                .with_name_width(self.config.name_width)
                .with_string_width(self.config.dump_string_width);
            VarDumper::new(writer).dump(None, &staged.value, staged.trace_scalar_references)?;
        }
        self.advance(ReportState::BodyWritten);

        out.write_all(page::trailer().as_bytes())?;
        Ok(())
    }

    fn advance(&mut self, next: ReportState) {
        debug!(from = %self.state, to = %next, "report state");
        self.state = next;
    }

    fn sink_error(&self, err: io::Error) -> ReportError {
        ReportError::SinkError {
            sink: self.sink.describe(),
            reason: err.to_string(),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

/// Counts bytes passed through to the inner stream.
struct CountingWriter<W> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.bytes += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use errlog_common::{Composite, StackFrame};
    use std::cell::Cell;
    use std::rc::Rc;

    fn memory_logger() -> (ErrorLogger<MemorySink>, MemorySink) {
        let sink = MemorySink::new();
        (ErrorLogger::new(sink.clone(), ReportConfig::default()), sink)
    }

    #[test]
    fn test_full_page() {
        let (mut logger, sink) = memory_logger();
        let record = ThrowableRecord::new("LogicException", "broken")
            .with_frame(StackFrame::new("main"));
        let bytes = logger.try_log_error(&record).unwrap();

        let html = sink.text();
        assert_eq!(bytes as usize, html.len());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>LogicException</h1>"));
        assert!(html.contains("<h2>Stack Trace</h2>"));
        assert!(!html.contains("VarDump"));
        assert!(html.ends_with("</body></html>\n"));
        assert_eq!(logger.state(), ReportState::Closed);
    }

    #[test]
    fn test_dump_section_after_error_section() {
        let (mut logger, sink) = memory_logger();
        logger.dump_vars(Value::assoc([("user", "alice")]), false);
        logger.log_error(&ThrowableRecord::new("E", "m"));

        let html = sink.text();
        let error = html.find("<h1>E</h1>").unwrap();
        let dump = html.find("<h2>VarDump</h2>").unwrap();
        assert!(error < dump);
        assert!(html.contains(r#"<th class="string">user</th><td><span class="string">alice</span></td>"#));
    }

    #[test]
    fn test_staged_value_replaced_and_cleared() {
        let (mut logger, sink) = memory_logger();
        logger.dump_vars(Value::from("first"), false);
        logger.dump_vars(Value::list(["second"]), false);
        logger.log_error(&ThrowableRecord::new("E", "m"));
        assert!(sink.text().contains("second"));
        assert!(!sink.text().contains(">first<"));

        sink.clear();
        logger.clear_vars();
        logger.log_error(&ThrowableRecord::new("E", "m"));
        assert!(!sink.text().contains("VarDump"));
    }

    #[test]
    fn test_invalid_dump_name_is_swallowed() {
        let (mut logger, sink) = memory_logger();
        let bad = Composite::new();
        bad.insert(true, "x");
        logger.dump_vars(Value::Array(bad), false);

        logger.log_error(&ThrowableRecord::new("E", "m"));
        assert_eq!(logger.state(), ReportState::Closed);
        assert!(sink.text().contains("<h1>E</h1>"));
        assert!(!sink.text().contains("</body></html>"));
    }

    #[test]
    fn test_invalid_dump_name_reported_by_try() {
        let (mut logger, _sink) = memory_logger();
        let bad = Composite::new();
        bad.insert(Value::Null, "x");
        logger.dump_vars(Value::Array(bad), false);
        assert!(matches!(
            logger.try_log_error(&ThrowableRecord::new("E", "m")),
            Err(ReportError::DumpError(_))
        ));
    }

    struct Unavailable;

    impl Sink for Unavailable {
        type Stream = Vec<u8>;

        fn describe(&self) -> String {
            "unavailable".to_string()
        }

        fn open(&self) -> io::Result<Self::Stream> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    #[test]
    fn test_open_failure_is_swallowed() {
        let mut logger = ErrorLogger::new(Unavailable, ReportConfig::default());
        logger.log_error(&ThrowableRecord::new("E", "m"));
        assert_eq!(logger.state(), ReportState::Idle);
        assert!(matches!(
            logger.try_log_error(&ThrowableRecord::new("E", "m")),
            Err(ReportError::SinkError { .. })
        ));
    }

    /// Accepts a fixed number of bytes, then fails; counts closes.
    struct Brittle {
        capacity: usize,
        closes: Rc<Cell<usize>>,
    }

    struct BrittleStream {
        remaining: usize,
    }

    impl Write for BrittleStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "disk full"));
            }
            let n = buf.len().min(self.remaining);
            self.remaining -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Sink for Brittle {
        type Stream = BrittleStream;

        fn describe(&self) -> String {
            "brittle".to_string()
        }

        fn open(&self) -> io::Result<Self::Stream> {
            Ok(BrittleStream {
                remaining: self.capacity,
            })
        }

        fn close(&self, _stream: Self::Stream) -> io::Result<()> {
            self.closes.set(self.closes.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_stream_closed_after_write_failure() {
        let closes = Rc::new(Cell::new(0));
        let sink = Brittle {
            capacity: 64,
            closes: Rc::clone(&closes),
        };
        let mut logger = ErrorLogger::new(sink, ReportConfig::default());

        let result = logger.try_log_error(&ThrowableRecord::new("E", "m"));
        assert!(matches!(result, Err(ReportError::IoError(_))));
        assert_eq!(closes.get(), 1);
        assert_eq!(logger.state(), ReportState::Closed);

        logger.log_error(&ThrowableRecord::new("E", "m"));
        assert_eq!(closes.get(), 2);
    }

    /// A stream that panics on the first write.
    struct Explosive;

    impl Write for Explosive {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            panic!("stream exploded");
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Sink for Explosive {
        type Stream = Explosive;

        fn describe(&self) -> String {
            "explosive".to_string()
        }

        fn open(&self) -> io::Result<Self::Stream> {
            Ok(Explosive)
        }
    }

    #[test]
    fn test_panic_while_writing_is_swallowed() {
        let mut logger = ErrorLogger::new(Explosive, ReportConfig::default());
        logger.log_error(&ThrowableRecord::new("E", "m"));
        assert_eq!(logger.state(), ReportState::Closed);

        // The logger stays usable after a panic.
        logger.log_error(&ThrowableRecord::new("E", "m"));
        assert_eq!(logger.state(), ReportState::Closed);
    }

    #[test]
    fn test_panic_message_extracted() {
        let payload = panic::catch_unwind(|| panic!("code {}", 7)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "code 7");
        let payload = panic::catch_unwind(|| std::panic::panic_any(3u8)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ReportState::HeaderWritten.to_string(), "header_written");
        assert_eq!(ReportState::default(), ReportState::Idle);
    }
}
