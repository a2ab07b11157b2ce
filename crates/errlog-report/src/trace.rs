//! Error section: headline, message, origin, stack trace and causes.

use crate::config::ReportConfig;
use crate::error::Result;
use crate::format::ValueFormatter;
use crate::snippet::SourceSnippet;
use errlog_common::markup::{element, raw_element, span, text_to_html};
use errlog_common::{severity_label, StackFrame, ThrowableRecord};
use std::io::Write;
use std::path::Path;

/// Writes the error section of a report.
#[derive(Debug, Clone, Copy)]
pub struct StackTraceRenderer<'a> {
    config: &'a ReportConfig,
}

impl<'a> StackTraceRenderer<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    /// Render `record` followed by every cause in its chain.
    ///
    /// Causes are headed `Previous Exception: <type>`.
    pub fn render_chain<W: Write + ?Sized>(&self, out: &mut W, record: &ThrowableRecord) -> Result<()> {
        for (depth, throwable) in record.chain().enumerate() {
            self.render_throwable(out, throwable, depth > 0)?;
        }
        Ok(())
    }

    /// Render a single throwable without its causes.
    pub fn render_throwable<W: Write + ?Sized>(
        &self,
        out: &mut W,
        record: &ThrowableRecord,
        is_previous: bool,
    ) -> Result<()> {
        let heading = if is_previous {
            element("h2", &[], &format!("Previous Exception: {}", record.type_name))
        } else {
            element("h1", &[], &record.type_name)
        };
        out.write_all(heading.as_bytes())?;

        if let Some(label) = severity_label(record.code) {
            out.write_all(element("p", &[("class", Some("code"))], label).as_bytes())?;
        }

        let message = text_to_html(&record.message);
        out.write_all(raw_element("p", &[("class", Some("message"))], &message).as_bytes())?;

        if let Some((file, line)) = record.site() {
            let origin = format!("{}({})", file, line);
            out.write_all(element("p", &[("class", Some("file"))], &origin).as_bytes())?;
            if let Some(snippet) = self.snippet(file, line) {
                out.write_all(snippet.as_bytes())?;
            }
        }

        self.render_trace(out, &record.frames)
    }

    /// Render the call stack, innermost frame first.
    ///
    /// Frames are numbered from `len - 1` down to `0`. Nothing is written
    /// for an empty stack.
    pub fn render_trace<W: Write + ?Sized>(&self, out: &mut W, frames: &[StackFrame]) -> Result<()> {
        if frames.is_empty() {
            return Ok(());
        }
        out.write_all(br#"<div class="trace">"#)?;
        out.write_all(b"<h2>Stack Trace</h2>")?;
        for (position, frame) in frames.iter().enumerate() {
            let level = frames.len() - 1 - position;
            out.write_all(self.render_frame(level, frame).as_bytes())?;
        }
        out.write_all(b"</div>")?;
        Ok(())
    }

    fn render_frame(&self, level: usize, frame: &StackFrame) -> String {
        let mut html = span("level", &level.to_string());

        if let Some((file, line)) = frame.site() {
            html.push_str(&span("file", &format!("{}({}):", file, line)));
        }

        if let Some(class_name) = &frame.class_name {
            html.push_str(&span("class", class_name));
            html.push_str("::");
        }
        html.push_str(&span("function", &frame.function));

        html.push('(');
        html.push_str(&ValueFormatter::new(self.config).format_arguments(&frame.args));
        html.push(')');

        if let Some((file, line)) = frame.site() {
            if let Some(snippet) = self.snippet(file, line) {
                html.push_str(&snippet);
            }
        }

        raw_element("p", &[("class", Some("file"))], &html)
    }

    fn snippet(&self, file: &str, line: u32) -> Option<String> {
        SourceSnippet::extract(Path::new(file), line as usize, self.config.number_of_source_lines)
            .map(|snippet| snippet.render(&self.config.source_language))
    }
}
