//! Core logger types and traits

pub mod encoder;
pub mod error;
pub mod fields;
pub mod level_gate;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod record;
pub mod sink;
pub mod timestamp;
pub mod trace_logger;

pub use encoder::{Encoding, LoggerOptions, RecordEncoder};
pub use error::{LoggerError, Result};
pub use fields::{field, Field, FieldValue, Fields};
pub use level_gate::LevelGate;
pub use log_level::LogLevel;
pub use logger::{Log, PlainLogger, FATAL_EXIT_CODE};
pub use metrics::LoggerMetrics;
pub use record::{CallerLocation, Record};
pub use sink::{SharedSink, Sink};
pub use timestamp::TimestampFormat;
pub use trace_logger::TraceLogger;
