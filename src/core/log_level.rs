//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a record, ordered from least to most severe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
    Panic = 4,
    Fatal = 5,
}

impl LogLevel {
    /// All levels in ascending order of severity.
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Panic,
        LogLevel::Fatal,
    ];

    /// Canonical lowercase name, as accepted by [`LogLevel::from_name`].
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Panic => "panic",
            LogLevel::Fatal => "fatal",
        }
    }

    /// Parse a level name.
    ///
    /// This never fails: anything that is not exactly one of the canonical
    /// names (`debug`, `info`, `warn`, `error`, `panic`, `fatal`) resolves to
    /// [`LogLevel::Info`].
    ///
    /// ```
    /// use rust_trace_logger::LogLevel;
    ///
    /// assert_eq!(LogLevel::from_name("warn"), LogLevel::Warn);
    /// assert_eq!(LogLevel::from_name("verbose"), LogLevel::Info);
    /// ```
    pub fn from_name(name: &str) -> Self {
        match name {
            "debug" => LogLevel::Debug,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            "panic" => LogLevel::Panic,
            "fatal" => LogLevel::Fatal,
            _ => LogLevel::Info,
        }
    }

    pub(crate) fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) fn from_u8(rank: u8) -> Self {
        match rank {
            0 => LogLevel::Debug,
            2 => LogLevel::Warn,
            3 => LogLevel::Error,
            4 => LogLevel::Panic,
            5 => LogLevel::Fatal,
            _ => LogLevel::Info,
        }
    }

    /// Whether records at this level should mark a mirrored span as errored.
    pub fn is_error(&self) -> bool {
        *self >= LogLevel::Error
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::Panic => BrightRed,
            LogLevel::Fatal => BrightRed,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for LogLevel {
    fn from(name: &str) -> Self {
        LogLevel::from_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_names_roundtrip() {
        for level in LogLevel::ALL {
            assert_eq!(LogLevel::from_name(level.as_str()), level);
        }
    }

    #[test]
    fn test_unknown_names_default_to_info() {
        assert_eq!(LogLevel::from_name(""), LogLevel::Info);
        assert_eq!(LogLevel::from_name("trace"), LogLevel::Info);
        assert_eq!(LogLevel::from_name("WARN"), LogLevel::Info);
        assert_eq!(LogLevel::from_name(" debug"), LogLevel::Info);
    }

    #[test]
    fn test_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Panic);
        assert!(LogLevel::Panic < LogLevel::Fatal);
    }

    #[test]
    fn test_rank_roundtrip() {
        for level in LogLevel::ALL {
            assert_eq!(LogLevel::from_u8(level.as_u8()), level);
        }
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&LogLevel::Warn).unwrap();
        assert_eq!(json, "\"warn\"");
        let level: LogLevel = serde_json::from_str("\"fatal\"").unwrap();
        assert_eq!(level, LogLevel::Fatal);
    }
}
