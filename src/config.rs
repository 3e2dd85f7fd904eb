//! Typed logger configuration
//!
//! Deserialisable with serde, so it can be embedded in an application's own
//! configuration file:
//!
//! ```
//! use rust_trace_logger::config::{Destination, LoggerConfig};
//!
//! let config: LoggerConfig = serde_json::from_str(
//!     r#"{
//!         "level": "warn",
//!         "destination": { "type": "file", "path": "logs/app.log", "compress": true }
//!     }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.level, "warn");
//! assert!(matches!(config.destination, Destination::File { max_size_mb: 1024, .. }));
//! ```

use crate::core::encoder::{Encoding, LoggerOptions};
use crate::core::error::{LoggerError, Result};
use crate::core::timestamp::TimestampFormat;
use crate::sinks::{RotationPolicy, RotationStrategy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_MAX_SIZE_MB: u64 = 1024;
pub const DEFAULT_MAX_BACKUPS: usize = 5;

/// Where records are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Destination {
    Console {
        #[serde(default)]
        stderr: bool,
    },
    File {
        path: PathBuf,
        #[serde(default = "default_max_size_mb")]
        max_size_mb: u64,
        #[serde(default)]
        compress: bool,
        #[serde(default = "default_max_backups")]
        max_backups: usize,
    },
}

impl Default for Destination {
    fn default() -> Self {
        Destination::Console { stderr: false }
    }
}

impl Destination {
    pub(crate) fn rotation_policy(&self) -> Option<RotationPolicy> {
        match self {
            Destination::File {
                max_size_mb,
                compress,
                max_backups,
                ..
            } => Some(
                RotationPolicy::new()
                    .with_strategy(RotationStrategy::size_mb(*max_size_mb))
                    .with_max_backups(*max_backups)
                    .with_compression(*compress),
            ),
            Destination::Console { .. } => None,
        }
    }
}

fn default_max_size_mb() -> u64 {
    DEFAULT_MAX_SIZE_MB
}

fn default_max_backups() -> usize {
    DEFAULT_MAX_BACKUPS
}

fn default_level() -> String {
    "info".to_string()
}

fn default_add_caller() -> bool {
    true
}

/// Everything needed to build a root [`Factory`](crate::Factory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Level name; unrecognised names mean `info`
    #[serde(default = "default_level")]
    pub level: String,
    pub destination: Destination,
    pub encoding: Encoding,
    #[serde(default = "default_add_caller")]
    pub add_caller: bool,
    pub timestamp_format: TimestampFormat,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            destination: Destination::default(),
            encoding: Encoding::default(),
            add_caller: default_add_caller(),
            timestamp_format: TimestampFormat::default(),
        }
    }
}

impl LoggerConfig {
    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Destination::File {
            path, max_size_mb, ..
        } = &self.destination
        {
            if path.as_os_str().is_empty() {
                return Err(LoggerError::config("destination", "file path is empty"));
            }
            if *max_size_mb == 0 {
                return Err(LoggerError::config(
                    "destination",
                    "max_size_mb must be greater than zero",
                ));
            }
        }
        self.timestamp_format.validate()
    }

    pub fn options(&self) -> LoggerOptions {
        LoggerOptions::new()
            .with_caller(self.add_caller)
            .with_encoding(self.encoding)
            .with_timestamp_format(self.timestamp_format.clone())
    }
}
