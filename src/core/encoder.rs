//! Record encoding
//!
//! Turns a [`Record`] into exactly one output line:
//! - Json: `{"level":"info","ts":"2025-01-08T10:30:45.123Z","caller":"src/main.rs:12","msg":"started","port":8080}`
//! - Console: `2025-01-08T10:30:45.123Z	INFO	src/main.rs:12	started	{"port":8080}`
//!
//! In JSON, a field whose key is one of the record keys (`level`, `ts`,
//! `caller`, `msg`) is written as `fields.<key>` so it never shadows them.

use super::error::Result;
use super::record::Record;
use super::timestamp::TimestampFormat;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

const RECORD_KEYS: [&str; 4] = ["level", "ts", "caller", "msg"];

/// Output encoding for records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// One JSON object per line (default)
    #[default]
    Json,

    /// Tab-separated, human-readable text with trailing JSON fields
    Console,
}

/// Encoder options accepted by the `Factory` constructors
///
/// # Examples
///
/// ```
/// use rust_trace_logger::{Encoding, LoggerOptions, TimestampFormat};
///
/// let options = LoggerOptions::new()
///     .with_caller(true)
///     .with_encoding(Encoding::Console)
///     .with_timestamp_format(TimestampFormat::Iso8601Micros);
/// assert!(options.add_caller);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerOptions {
    /// Annotate each record with the file and line of the logging call
    pub add_caller: bool,
    pub encoding: Encoding,
    pub timestamp_format: TimestampFormat,
    /// Colorize the level in console encoding
    pub use_colors: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            add_caller: false,
            encoding: Encoding::default(),
            timestamp_format: TimestampFormat::default(),
            use_colors: false,
        }
    }
}

impl LoggerOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_caller(mut self, add_caller: bool) -> Self {
        self.add_caller = add_caller;
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }
}

/// Serializes records according to a fixed set of [`LoggerOptions`].
#[derive(Debug, Clone, Default)]
pub struct RecordEncoder {
    options: LoggerOptions,
}

impl RecordEncoder {
    pub fn new(options: LoggerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoggerOptions {
        &self.options
    }

    /// Encode one record as a newline-terminated line.
    ///
    /// Fails without output when the timestamp format cannot be rendered.
    pub fn encode(&self, record: &Record) -> Result<Vec<u8>> {
        let mut line = match self.options.encoding {
            Encoding::Json => serde_json::to_vec(&JsonRecord {
                record,
                ts: self.options.timestamp_format.to_json_value(&record.timestamp)?,
            })?,
            Encoding::Console => self.encode_console(record)?.into_bytes(),
        };
        line.push(b'\n');
        Ok(line)
    }

    fn encode_console(&self, record: &Record) -> Result<String> {
        let mut parts = Vec::with_capacity(5);
        parts.push(self.options.timestamp_format.try_format(&record.timestamp)?);
        parts.push(self.console_level(record));
        if let Some(caller) = &record.caller {
            parts.push(caller.trimmed());
        }
        parts.push(record.sanitized_message());
        if !record.fields.is_empty() {
            parts.push(serde_json::to_string(&FieldsObject(record))?);
        }
        Ok(parts.join("\t"))
    }

    fn console_level(&self, record: &Record) -> String {
        let name = record.level.as_str().to_uppercase();
        #[cfg(feature = "console")]
        {
            if self.options.use_colors {
                use colored::Colorize;
                return name.color(record.level.color_code()).to_string();
            }
        }
        name
    }
}

/// Keys are written in a fixed order: level, ts, caller, msg, then fields.
struct JsonRecord<'a> {
    record: &'a Record,
    ts: serde_json::Value,
}

fn json_field_key(key: &str) -> Cow<'_, str> {
    if RECORD_KEYS.contains(&key) {
        Cow::Owned(format!("fields.{}", key))
    } else {
        Cow::Borrowed(key)
    }
}

impl Serialize for JsonRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let record = self.record;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("level", record.level.as_str())?;
        map.serialize_entry("ts", &self.ts)?;
        if let Some(caller) = &record.caller {
            map.serialize_entry("caller", &caller.trimmed())?;
        }
        map.serialize_entry("msg", &record.message)?;
        for field in record.fields.iter() {
            map.serialize_entry(&json_field_key(&field.key), &field.value)?;
        }
        map.end()
    }
}

struct FieldsObject<'a>(&'a Record);

impl Serialize for FieldsObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.fields.len()))?;
        for field in self.0.fields.iter() {
            map.serialize_entry(&field.key, &field.value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fields::Fields;
    use crate::core::log_level::LogLevel;
    use crate::core::record::CallerLocation;
    use chrono::TimeZone;

    fn fixed_record(level: LogLevel, message: &str) -> Record {
        let ts = chrono::Utc
            .with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime");
        Record::new(level, message).with_timestamp(ts)
    }

    fn encode_str(encoder: &RecordEncoder, record: &Record) -> String {
        String::from_utf8(encoder.encode(record).unwrap()).unwrap()
    }

    #[test]
    fn test_json_format() {
        let encoder = RecordEncoder::default();
        let line = encode_str(&encoder, &fixed_record(LogLevel::Error, "Error occurred"));

        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);

        let parsed: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(parsed["level"], "error");
        assert_eq!(parsed["msg"], "Error occurred");
        assert_eq!(parsed["ts"], "2025-01-08T10:30:45.000Z");
        assert!(parsed.get("caller").is_none());
    }

    #[test]
    fn test_json_key_order() {
        let encoder = RecordEncoder::default();
        let record = fixed_record(LogLevel::Info, "hello")
            .with_caller(CallerLocation {
                file: "src/main.rs",
                line: 3,
            })
            .with_fields(Fields::new().with_field("z", 1).with_field("a", 2));

        let line = encode_str(&encoder, &record);
        assert_eq!(
            line,
            "{\"level\":\"info\",\"ts\":\"2025-01-08T10:30:45.000Z\",\
             \"caller\":\"src/main.rs:3\",\"msg\":\"hello\",\"z\":1,\"a\":2}\n"
        );
    }

    #[test]
    fn test_json_escapes_newlines() {
        let encoder = RecordEncoder::default();
        let line = encode_str(&encoder, &fixed_record(LogLevel::Info, "line1\nline2"));
        assert_eq!(line.lines().count(), 1);
        assert!(line.contains("line1\\nline2"));
    }

    #[test]
    fn test_console_format() {
        let encoder = RecordEncoder::new(LoggerOptions::new().with_encoding(Encoding::Console));
        let record = fixed_record(LogLevel::Warn, "disk low")
            .with_fields(Fields::new().with_field("free_mb", 12));

        let line = encode_str(&encoder, &record);
        assert_eq!(
            line,
            "2025-01-08T10:30:45.000Z\tWARN\tdisk low\t{\"free_mb\":12}\n"
        );
    }

    #[test]
    fn test_console_format_sanitizes_message() {
        let encoder = RecordEncoder::new(LoggerOptions::new().with_encoding(Encoding::Console));
        let line = encode_str(&encoder, &fixed_record(LogLevel::Info, "a\nINFO fake"));
        assert_eq!(line.lines().count(), 1);
    }

    #[test]
    fn test_unix_millis_timestamp() {
        let encoder = RecordEncoder::new(
            LoggerOptions::new().with_timestamp_format(TimestampFormat::UnixMillis),
        );
        let record = fixed_record(LogLevel::Info, "x");
        let parsed: serde_json::Value =
            serde_json::from_slice(&encoder.encode(&record).unwrap()).unwrap();
        assert_eq!(parsed["ts"].as_i64(), Some(record.timestamp.timestamp_millis()));
    }

    #[test]
    fn test_fields_cannot_shadow_record_keys() {
        let encoder = RecordEncoder::default();
        let record = fixed_record(LogLevel::Info, "real message").with_fields(
            Fields::new()
                .with_field("level", "fatal")
                .with_field("msg", "forged")
                .with_field("ts", 0)
                .with_field("caller", "nowhere"),
        );

        let line = encode_str(&encoder, &record);
        let parsed: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(parsed["level"], "info");
        assert_eq!(parsed["msg"], "real message");
        assert_eq!(parsed["ts"], "2025-01-08T10:30:45.000Z");
        assert!(parsed.get("caller").is_none());
        assert_eq!(parsed["fields.level"], "fatal");
        assert_eq!(parsed["fields.msg"], "forged");
        assert_eq!(parsed["fields.ts"], 0);
        assert_eq!(parsed["fields.caller"], "nowhere");
        assert_eq!(line.matches("\"level\"").count(), 1);
    }

    #[test]
    fn test_invalid_custom_timestamp_is_an_error() {
        let record = fixed_record(LogLevel::Info, "x");
        for encoding in [Encoding::Json, Encoding::Console] {
            let encoder = RecordEncoder::new(
                LoggerOptions::new()
                    .with_encoding(encoding)
                    .with_timestamp_format(TimestampFormat::Custom("%Q".to_string())),
            );
            assert!(matches!(
                encoder.encode(&record),
                Err(crate::core::error::LoggerError::InvalidConfiguration { .. })
            ));
        }
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: LoggerOptions =
            serde_json::from_str(r#"{"add_caller":true,"encoding":"console"}"#).unwrap();
        assert!(options.add_caller);
        assert_eq!(options.encoding, Encoding::Console);
        assert_eq!(options.timestamp_format, TimestampFormat::Iso8601);
        assert!(!options.use_colors);
    }
}
