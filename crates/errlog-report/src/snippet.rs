//! Source context around an error site.

use errlog_common::markup::{html_escape, tag};
use std::path::Path;
use tracing::debug;

/// A window of source lines around an error line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSnippet {
    /// 1-based number of the first line in the window.
    pub first_line: usize,
    /// 1-based number of the last line in the window.
    pub last_line: usize,
    /// The line to highlight.
    pub error_line: usize,
    /// Lines `first_line..=last_line`, without line terminators.
    pub lines: Vec<String>,
}

impl SourceSnippet {
    /// Read `path` and cut a window of about `number_of_lines` lines
    /// centered on `error_line`.
    ///
    /// The file is read on every call. Bytes that are not valid UTF-8 are
    /// replaced with U+FFFD. Returns `None` when the file cannot be read or
    /// the window would be empty.
    pub fn extract(path: &Path, error_line: usize, number_of_lines: usize) -> Option<Self> {
        match std::fs::read(path) {
            Ok(bytes) => Self::from_source(&String::from_utf8_lossy(&bytes), error_line, number_of_lines),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "source not readable, snippet omitted");
                None
            }
        }
    }

    /// Cut a window out of in-memory source text.
    pub fn from_source(source: &str, error_line: usize, number_of_lines: usize) -> Option<Self> {
        let mut all: Vec<&str> = source.split('\n').collect();
        if all.last() == Some(&"") {
            all.pop();
        }

        let half = number_of_lines / 2;
        let first_line = error_line.saturating_sub(half).max(1);
        let last_line = error_line.saturating_add(half).min(all.len());
        if first_line > last_line {
            return None;
        }

        Some(Self {
            first_line,
            last_line,
            error_line,
            lines: all[first_line - 1..last_line]
                .iter()
                .map(|line| line.to_string())
                .collect(),
        })
    }

    /// Number of lines in the window.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render as a `div.source` block: a line-number gutter, the code, and
    /// an overlay list marking the error line.
    pub fn render(&self, language_class: &str) -> String {
        let start = self.first_line.to_string();
        let mut html = String::from(r#"<div class="source">"#);

        html.push_str(r#"<div class="lines">"#);
        html.push_str(&tag("ol", &[("start", Some(start.as_str()))]));
        for _ in &self.lines {
            html.push_str("<li></li>");
        }
        html.push_str("</ol></div>");

        html.push_str("<pre>");
        html.push_str(&tag("code", &[("class", Some(language_class))]));
        for line in &self.lines {
            html.push_str(&html_escape(line));
            html.push('\n');
        }
        html.push_str("</code></pre>");

        html.push_str(r#"<div class="markup">"#);
        html.push_str(&tag("ol", &[("start", Some(start.as_str()))]));
        for number in self.first_line..=self.last_line {
            if number == self.error_line {
                html.push_str(r#"<li class="error"></li>"#);
            } else {
                html.push_str("<li></li>");
            }
        }
        html.push_str("</ol></div>");

        html.push_str("</div>");
        html
    }
}
