//! Inline rendering of call arguments.
//!
//! Values are rendered as short `<span>` fragments suitable for a single
//! line of a stack trace. Lists longer than the configured threshold are cut
//! with a literal `...`; keyed entries get a `key => ` prefix and values
//! under secret-looking keys are masked.

use crate::config::ReportConfig;
use errlog_common::markup::{element, span};
use errlog_common::text::{grapheme_len, take_graphemes, ELLIPSIS};
use errlog_common::{Composite, Value};

/// Renders runtime values as markup fragments.
#[derive(Debug, Clone, Copy)]
pub struct ValueFormatter<'a> {
    config: &'a ReportConfig,
}

impl<'a> ValueFormatter<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    /// Render one value.
    pub fn format_value(&self, value: &Value) -> String {
        self.value(value, &mut Vec::new())
    }

    /// Render a positional argument list, without brackets.
    pub fn format_arguments(&self, args: &[Value]) -> String {
        let entries: Vec<(Value, Value)> = args
            .iter()
            .enumerate()
            .map(|(i, arg)| (Value::from(i), arg.clone()))
            .collect();
        self.format_entries(&entries)
    }

    /// Render keyed entries, without brackets.
    pub fn format_entries(&self, entries: &[(Value, Value)]) -> String {
        self.entries(entries, &mut Vec::new())
    }

    fn entries(&self, entries: &[(Value, Value)], ancestors: &mut Vec<usize>) -> String {
        let sequential = is_sequential(entries);
        let mut parts = Vec::with_capacity(entries.len().min(self.config.max_arguments + 1));

        for (position, (key, value)) in entries.iter().enumerate() {
            if position == self.config.max_arguments {
                parts.push(ELLIPSIS.to_string());
                break;
            }
            parts.push(self.entry(key, value, sequential, ancestors));
        }
        parts.join(", ")
    }

    fn entry(&self, key: &Value, value: &Value, sequential: bool, ancestors: &mut Vec<usize>) -> String {
        match key {
            Value::Str(name) if !name.is_empty() => {
                let rendered = if name.contains(self.config.redact_key.as_str()) {
                    "*".repeat(self.config.redact_mask_len)
                } else {
                    self.value(value, ancestors)
                };
                format!("{} => {}", span("string", name), rendered)
            }
            Value::Int(index) if !sequential => {
                format!("{} => {}", span("number", &index.to_string()), self.value(value, ancestors))
            }
            _ => self.value(value, ancestors),
        }
    }

    fn value(&self, value: &Value, ancestors: &mut Vec<usize>) -> String {
        match value {
            Value::Object(composite) => span("class", composite.class_name().unwrap_or("object")),
            Value::Bool(b) => span("keyword", if *b { "true" } else { "false" }),
            Value::Str(s) => self.string(s),
            Value::Array(composite) => self.array(composite, ancestors),
            Value::Null => span("keyword", "null"),
            Value::Resource(type_name) => span("keyword", type_name),
            Value::Int(i) => span("number", &i.to_string()),
            Value::Float(f) => span("number", &f.to_string()),
            Value::Shared(cell) => match cell.get().resolved() {
                Value::Shared(_) => unknown(),
                held => self.value(&held, ancestors),
            },
            Value::Uninitialized | Value::Unknown(_) => unknown(),
        }
    }

    fn string(&self, s: &str) -> String {
        if grapheme_len(s) <= self.config.string_preview_len {
            return span("string", s);
        }
        let preview = format!("{}{}", take_graphemes(s, self.config.string_preview_len), ELLIPSIS);
        let title = take_graphemes(s, self.config.string_title_len);
        element("span", &[("class", Some("string")), ("title", Some(title))], &preview)
    }

    fn array(&self, composite: &Composite, ancestors: &mut Vec<usize>) -> String {
        let identity = composite.identity();
        if ancestors.contains(&identity) {
            return format!("[{}]", ELLIPSIS);
        }
        ancestors.push(identity);
        let inner = self.entries(&composite.entries(), ancestors);
        ancestors.pop();
        format!("[{}]", inner)
    }
}

fn unknown() -> String {
    span("unknown", "???")
}

/// Keys are exactly `0..n` in order.
fn is_sequential(entries: &[(Value, Value)]) -> bool {
    entries
        .iter()
        .enumerate()
        .all(|(i, (key, _))| matches!(key, Value::Int(k) if *k == i as i64))
}
