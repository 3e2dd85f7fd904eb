//! Lets a tracer report its own diagnostics through a plain logger

use crate::core::fields::Fields;
use crate::core::log_level::LogLevel;
use crate::core::logger::{Log, PlainLogger};
use std::fmt;

/// Minimal logging capability a tracer needs for its diagnostics.
pub trait TracerLogger: Send + Sync {
    fn error(&self, message: &str);

    fn info(&self, args: fmt::Arguments<'_>);

    fn debug(&self, args: fmt::Arguments<'_>);
}

/// [`TracerLogger`] backed by a factory's plain logger.
#[derive(Debug, Clone)]
pub struct TracerLogAdapter {
    logger: PlainLogger,
}

impl TracerLogAdapter {
    pub fn new(logger: PlainLogger) -> Self {
        Self { logger }
    }

    /// Formats only when the record is admitted; rejections count as filtered.
    fn emit_args(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if !self.logger.admit(level) {
            return;
        }
        let caller = std::panic::Location::caller();
        let fields = self.logger.core().fields.merged(Fields::new());
        match args.as_str() {
            Some(message) => self.logger.write_or_report(level, message, fields, caller),
            None => self.logger.write_or_report(level, &args.to_string(), fields, caller),
        }
    }
}

impl TracerLogger for TracerLogAdapter {
    fn error(&self, message: &str) {
        self.logger.error(message);
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        self.emit_args(LogLevel::Info, args);
    }

    fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit_args(LogLevel::Debug, args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MemorySink;
    use crate::{Factory, LoggerOptions};
    use std::sync::Arc;

    #[test]
    fn test_adapter_formats_and_gates() {
        let sink = Arc::new(MemorySink::new());
        let factory = Factory::with_sink(sink.clone(), "info", LoggerOptions::default());
        let adapter = TracerLogAdapter::new(factory.normal().clone());

        adapter.info(format_args!("reporting span {}", 7));
        adapter.debug(format_args!("hidden {}", 1));
        adapter.error("reporter failed");

        let records = sink.json_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["msg"], "reporting span 7");
        assert_eq!(records[1]["level"], "error");
        assert_eq!(factory.metrics().records_filtered(), 1);
        assert_eq!(factory.metrics().records_written(), 2);
    }
}
