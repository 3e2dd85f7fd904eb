//! Timestamp formatting for encoded records
//!
//! The default is ISO 8601 with milliseconds in UTC, which external log
//! processors (Elasticsearch, Loki, Splunk) parse without configuration.

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

const ISO8601_MILLIS: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Timestamp format options
///
/// # Examples
///
/// ```
/// use rust_trace_logger::TimestampFormat;
/// use chrono::{TimeZone, Utc};
///
/// let ts = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(TimestampFormat::Iso8601.format(&ts), "2025-01-08T10:30:45.000Z");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// `2025-01-08T10:30:45.123+00:00`
    Rfc3339,

    /// `1736332245123`, encoded as a JSON number
    UnixMillis,

    /// Any strftime-compatible format string
    Custom(String),
}

impl TimestampFormat {
    /// Format `datetime`. An unusable custom format string falls back to
    /// [`TimestampFormat::Iso8601`]; use [`try_format`](Self::try_format) to
    /// see the error instead.
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        self.try_format(datetime)
            .unwrap_or_else(|_| datetime.format(ISO8601_MILLIS).to_string())
    }

    pub fn try_format(&self, datetime: &DateTime<Utc>) -> Result<String> {
        Ok(match self {
            TimestampFormat::Iso8601 => datetime.format(ISO8601_MILLIS).to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Rfc3339 => {
                datetime.to_rfc3339_opts(chrono::SecondsFormat::Millis, false)
            }
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) => {
                // `to_string` would panic on a bad specifier; `write!` reports it.
                let mut out = String::with_capacity(format_str.len() + 16);
                write!(out, "{}", datetime.format(format_str)).map_err(|_| {
                    invalid_custom_format(format_str)
                })?;
                out
            }
        })
    }

    /// Reject custom format strings chrono cannot render.
    pub fn validate(&self) -> Result<()> {
        if let TimestampFormat::Custom(format_str) = self {
            if StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error)) {
                return Err(invalid_custom_format(format_str));
            }
        }
        Ok(())
    }

    /// JSON representation: a number for numeric formats, a string otherwise.
    pub(crate) fn to_json_value(&self, datetime: &DateTime<Utc>) -> Result<serde_json::Value> {
        Ok(match self {
            TimestampFormat::UnixMillis => {
                serde_json::Value::Number(datetime.timestamp_millis().into())
            }
            _ => serde_json::Value::String(self.try_format(datetime)?),
        })
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, TimestampFormat::UnixMillis)
    }
}

fn invalid_custom_format(format_str: &str) -> LoggerError {
    LoggerError::config(
        "timestamp_format",
        format!("invalid strftime format string '{}'", format_str),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Utc> {
        // 2025-01-08 10:30:45.123456 UTC
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_iso8601_format() {
        let result = TimestampFormat::Iso8601.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123Z");
    }

    #[test]
    fn test_iso8601_micros_format() {
        let result = TimestampFormat::Iso8601Micros.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123456Z");
    }

    #[test]
    fn test_rfc3339_format() {
        let result = TimestampFormat::Rfc3339.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123+00:00");
    }

    #[test]
    fn test_unix_millis_is_json_number() {
        let value = TimestampFormat::UnixMillis
            .to_json_value(&fixed_datetime())
            .unwrap();
        assert_eq!(value.as_i64(), Some(fixed_datetime().timestamp_millis()));
        assert!(TimestampFormat::UnixMillis.is_numeric());
        assert!(!TimestampFormat::Iso8601.is_numeric());
    }

    #[test]
    fn test_custom_format() {
        let format = TimestampFormat::Custom("%Y/%m/%d %H:%M".to_string());
        assert_eq!(format.format(&fixed_datetime()), "2025/01/08 10:30");
    }

    #[test]
    fn test_invalid_custom_format_is_rejected() {
        let format = TimestampFormat::Custom("%Y %Q".to_string());
        assert!(matches!(
            format.validate(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
        assert!(format.try_format(&fixed_datetime()).is_err());
        assert_eq!(format.format(&fixed_datetime()), "2025-01-08T10:30:45.123Z");

        assert!(TimestampFormat::Custom("%d.%m.%Y".to_string()).validate().is_ok());
        assert!(TimestampFormat::Rfc3339.validate().is_ok());
    }

    #[test]
    fn test_default_is_iso8601() {
        assert_eq!(TimestampFormat::default(), TimestampFormat::Iso8601);
    }

    #[test]
    fn test_deserialization() {
        let format: TimestampFormat = serde_json::from_str("\"iso8601\"").expect("iso8601");
        assert_eq!(format, TimestampFormat::Iso8601);

        let format: TimestampFormat =
            serde_json::from_str(r#"{"custom":"%Y-%m-%d"}"#).expect("custom");
        assert_eq!(format, TimestampFormat::Custom("%Y-%m-%d".to_string()));
    }
}
