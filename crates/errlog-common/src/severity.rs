//! Runtime error-severity codes.
//!
//! Throwables raised by the runtime's error handler carry one of these bit
//! codes. User-defined exceptions usually carry 0 or an application code,
//! which has no label and is not shown in reports.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Known severity codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i64)]
pub enum Severity {
    FatalError = 1,
    Warning = 2,
    ParseError = 4,
    Notice = 8,
    CoreError = 16,
    CoreWarning = 32,
    CompileError = 64,
    CompileWarning = 128,
    UserError = 256,
    UserWarning = 512,
    UserNotice = 1024,
    Strict = 2048,
    RecoverableError = 4096,
    Deprecated = 8192,
    UserDeprecated = 16384,
}

impl Severity {
    /// Every known severity, in code order.
    pub const ALL: [Severity; 15] = [
        Severity::FatalError,
        Severity::Warning,
        Severity::ParseError,
        Severity::Notice,
        Severity::CoreError,
        Severity::CoreWarning,
        Severity::CompileError,
        Severity::CompileWarning,
        Severity::UserError,
        Severity::UserWarning,
        Severity::UserNotice,
        Severity::Strict,
        Severity::RecoverableError,
        Severity::Deprecated,
        Severity::UserDeprecated,
    ];

    /// Numeric code.
    pub fn code(self) -> i64 {
        self as i64
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            Severity::FatalError => "Fatal Error",
            Severity::Warning => "Warning",
            Severity::ParseError => "Parse Error",
            Severity::Notice => "Notice",
            Severity::CoreError => "Core Error",
            Severity::CoreWarning => "Core Warning",
            Severity::CompileError => "Compile Error",
            Severity::CompileWarning => "Compile Warning",
            Severity::UserError => "User Error",
            Severity::UserWarning => "User Warning",
            Severity::UserNotice => "User Notice",
            Severity::Strict => "Strict Warning",
            Severity::RecoverableError => "Recoverable Error",
            Severity::Deprecated => "Deprecated Warning",
            Severity::UserDeprecated => "User Deprecated Warning",
        }
    }

    /// Look up a code.
    pub fn from_code(code: i64) -> Option<Severity> {
        SEVERITY_BY_CODE.get(&code).copied()
    }
}

// Built once on first use, never mutated.
static SEVERITY_BY_CODE: Lazy<HashMap<i64, Severity>> =
    Lazy::new(|| Severity::ALL.iter().map(|s| (s.code(), *s)).collect());

/// Label for a severity code, if the code is known.
pub fn severity_label(code: i64) -> Option<&'static str> {
    Severity::from_code(code).map(Severity::label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_have_labels() {
        assert_eq!(severity_label(1), Some("Fatal Error"));
        assert_eq!(severity_label(2), Some("Warning"));
        assert_eq!(severity_label(16384), Some("User Deprecated Warning"));
    }

    #[test]
    fn test_unknown_codes_have_no_label() {
        assert_eq!(severity_label(0), None);
        assert_eq!(severity_label(3), None);
        assert_eq!(severity_label(-1), None);
    }

    #[test]
    fn test_codes_are_distinct_bits() {
        for severity in Severity::ALL {
            assert_eq!(severity.code().count_ones(), 1, "{:?}", severity);
            assert_eq!(Severity::from_code(severity.code()), Some(severity));
        }
    }
}
