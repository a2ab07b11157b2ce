//! Report configuration types.

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete report configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Number of source lines shown around an error site.
    #[serde(default = "default_number_of_source_lines")]
    pub number_of_source_lines: usize,
    /// Arguments rendered per call before the list is cut with `...`.
    #[serde(default = "default_max_arguments")]
    pub max_arguments: usize,
    /// Characters of a string argument shown inline.
    #[serde(default = "default_string_preview_len")]
    pub string_preview_len: usize,
    /// Characters of a long string kept in its hover title.
    #[serde(default = "default_string_title_len")]
    pub string_title_len: usize,
    /// Display width of names in the variable dump.
    #[serde(default = "default_name_width")]
    pub name_width: usize,
    /// Display width of string values in the variable dump.
    #[serde(default = "default_dump_string_width")]
    pub dump_string_width: usize,
    /// Keys containing this text have their value masked.
    #[serde(default = "default_redact_key")]
    pub redact_key: String,
    /// Number of `*` used as the mask.
    #[serde(default = "default_redact_mask_len")]
    pub redact_mask_len: usize,
    /// Page title.
    #[serde(default = "default_title")]
    pub title: String,
    /// Class put on source `<code>` blocks for the highlighter.
    #[serde(default = "default_source_language")]
    pub source_language: String,
}

fn default_number_of_source_lines() -> usize {
    24
}

fn default_max_arguments() -> usize {
    6
}

fn default_string_preview_len() -> usize {
    32
}

fn default_string_title_len() -> usize {
    512
}

fn default_name_width() -> usize {
    20
}

fn default_dump_string_width() -> usize {
    80
}

fn default_redact_key() -> String {
    "password".to_string()
}

fn default_redact_mask_len() -> usize {
    12
}

fn default_title() -> String {
    "Exception".to_string()
}

fn default_source_language() -> String {
    "source".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            number_of_source_lines: default_number_of_source_lines(),
            max_arguments: default_max_arguments(),
            string_preview_len: default_string_preview_len(),
            string_title_len: default_string_title_len(),
            name_width: default_name_width(),
            dump_string_width: default_dump_string_width(),
            redact_key: default_redact_key(),
            redact_mask_len: default_redact_mask_len(),
            title: default_title(),
            source_language: default_source_language(),
        }
    }
}

impl ReportConfig {
    /// Create a new report configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the size of the source window.
    pub fn with_source_lines(mut self, lines: usize) -> Self {
        self.number_of_source_lines = lines;
        self
    }

    /// Set the argument count threshold.
    pub fn with_max_arguments(mut self, max: usize) -> Self {
        self.max_arguments = max;
        self
    }

    /// Set the inline string preview length.
    pub fn with_string_preview_len(mut self, len: usize) -> Self {
        self.string_preview_len = len;
        self
    }

    /// Set the key fragment that triggers masking.
    pub fn with_redact_key(mut self, key: impl Into<String>) -> Self {
        self.redact_key = key.into();
        self
    }

    /// Set the page title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the class of source code blocks.
    pub fn with_source_language(mut self, language: impl Into<String>) -> Self {
        self.source_language = language.into();
        self
    }

    /// Check values that would make rendering meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.redact_key.is_empty() {
            return Err(ReportError::InvalidConfig(
                "redact_key must not be empty".to_string(),
            ));
        }
        if self.name_width < 4 {
            return Err(ReportError::InvalidConfig(format!(
                "name_width must be at least 4, got {}",
                self.name_width
            )));
        }
        if self.string_title_len < self.string_preview_len {
            return Err(ReportError::InvalidConfig(format!(
                "string_title_len ({}) is shorter than string_preview_len ({})",
                self.string_title_len, self.string_preview_len
            )));
        }
        Ok(())
    }

    /// Load configuration from JSON.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load and validate configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json(&contents)?;
        config.validate()?;
        Ok(config)
    }
}
