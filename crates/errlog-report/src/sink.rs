//! Destinations for rendered reports.
//!
//! A [`Sink`] hands out one stream per report and takes it back when the
//! report is finished. `close` is called on every path, including after a
//! failed write.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Provides and releases report streams.
pub trait Sink {
    /// Stream a single report is written to.
    type Stream: Write;

    /// Short name used in diagnostics.
    fn describe(&self) -> String;

    /// Acquire a stream for a new report.
    fn open(&self) -> io::Result<Self::Stream>;

    /// Release a stream; flushes by default.
    fn close(&self, mut stream: Self::Stream) -> io::Result<()> {
        stream.flush()
    }
}

/// Writes each report to a fresh timestamped file in a directory.
///
/// Files are named `error-<YYYYMMDD-HHMMSS-micros>-<pid>.html`.
#[derive(Debug)]
pub struct FileSink {
    dir: PathBuf,
    last_path: Mutex<Option<PathBuf>>,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last_path: Mutex::new(None),
        }
    }

    /// Directory reports are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the most recently opened report file.
    pub fn last_path(&self) -> Option<PathBuf> {
        self.last_path
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// File name for a report created now by this process.
    pub fn file_name() -> String {
        format!(
            "error-{}-{}.html",
            chrono::Local::now().format("%Y%m%d-%H%M%S-%6f"),
            std::process::id()
        )
    }
}

impl Sink for FileSink {
    type Stream = BufWriter<File>;

    fn describe(&self) -> String {
        format!("file:{}", self.dir.display())
    }

    fn open(&self) -> io::Result<Self::Stream> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(Self::file_name());
        let file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        *self.last_path.lock().unwrap_or_else(PoisonError::into_inner) = Some(path);
        Ok(BufWriter::new(file))
    }

    fn close(&self, stream: Self::Stream) -> io::Result<()> {
        let file = stream.into_inner().map_err(|err| err.into_error())?;
        file.sync_all()
    }
}

/// Streams reports to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    type Stream = io::StdoutLock<'static>;

    fn describe(&self) -> String {
        "stdout".to_string()
    }

    fn open(&self) -> io::Result<Self::Stream> {
        Ok(io::stdout().lock())
    }
}

/// Writes every report to the same path, replacing the previous one.
#[derive(Debug, Clone)]
pub struct PathSink {
    path: PathBuf,
}

impl PathSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for PathSink {
    type Stream = BufWriter<File>;

    fn describe(&self) -> String {
        format!("path:{}", self.path.display())
    }

    fn open(&self) -> io::Result<Self::Stream> {
        Ok(BufWriter::new(File::create(&self.path)?))
    }
}

/// Collects reports in a shared in-memory buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Everything written so far, as text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }

    pub fn clear(&self) {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// Stream handed out by [`MemorySink`].
#[derive(Debug)]
pub struct MemoryStream(Arc<Mutex<Vec<u8>>>);

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Sink for MemorySink {
    type Stream = MemoryStream;

    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn open(&self) -> io::Result<Self::Stream> {
        Ok(MemoryStream(Arc::clone(&self.buffer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_name_format() {
        let name = FileSink::file_name();
        let re = regex::Regex::new(r"^error-\d{8}-\d{6}-\d{6}-\d+\.html$").unwrap();
        assert!(re.is_match(&name), "unexpected name {}", name);
        assert!(name.ends_with(&format!("-{}.html", std::process::id())));
    }

    #[test]
    fn test_file_sink_creates_directory_and_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nested/logs");
        let sink = FileSink::new(&target);

        let mut stream = sink.open().unwrap();
        stream.write_all(b"<html></html>").unwrap();
        sink.close(stream).unwrap();

        let path = sink.last_path().unwrap();
        assert!(path.starts_with(&target));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<html></html>");
    }

    #[test]
    fn test_path_sink_overwrites() {
        let dir = tempdir().unwrap();
        let sink = PathSink::new(dir.path().join("report.html"));
        for body in ["first", "second"] {
            let mut stream = sink.open().unwrap();
            stream.write_all(body.as_bytes()).unwrap();
            sink.close(stream).unwrap();
        }
        assert_eq!(std::fs::read_to_string(sink.path()).unwrap(), "second");
    }

    #[test]
    fn test_memory_sink_shares_buffer() {
        let sink = MemorySink::new();
        let observer = sink.clone();
        let mut stream = sink.open().unwrap();
        stream.write_all(b"abc").unwrap();
        sink.close(stream).unwrap();
        assert_eq!(observer.text(), "abc");

        observer.clear();
        assert!(sink.contents().is_empty());
    }

    #[test]
    fn test_path_sink_unwritable() {
        let sink = PathSink::new("/nonexistent-dir/errlog/report.html");
        assert!(sink.open().is_err());
    }
}
