//! Plain logger and the logging capability shared by both logger flavors

use super::{
    encoder::RecordEncoder,
    error::Result,
    fields::Fields,
    level_gate::LevelGate,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    record::{CallerLocation, Record},
    sink::SharedSink,
};
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Exit status used by [`Log::fatal`].
pub const FATAL_EXIT_CODE: i32 = 1;

/// Logging capability returned by [`Factory::normal`](crate::Factory::normal)
/// and [`Factory::trace`](crate::Factory::trace).
///
/// Implementors provide [`enabled`](Log::enabled), [`emit`](Log::emit) and
/// [`flush`](Log::flush); the per-level methods are derived from them.
///
/// `panic` and `fatal` always escape: the record is written (when the level is
/// enabled) and the sink flushed, then the call unwinds or exits the process.
pub trait Log: Send + Sync {
    /// Whether a record at `level` would currently be written.
    fn enabled(&self, level: LogLevel) -> bool;

    /// Write one record if `level` passes the gate. Never escapes, even at
    /// `Panic` or `Fatal`.
    #[track_caller]
    fn emit(&self, level: LogLevel, message: &str, fields: Fields);

    /// Flush the underlying sink; failures are reported on stderr.
    fn flush(&self);

    #[track_caller]
    fn log_with(&self, level: LogLevel, message: &str, fields: Fields) {
        match level {
            LogLevel::Panic => self.panic_with(message, fields),
            LogLevel::Fatal => self.fatal_with(message, fields),
            _ => self.emit(level, message, fields),
        }
    }

    #[track_caller]
    fn log(&self, level: LogLevel, message: &str) {
        self.log_with(level, message, Fields::new());
    }

    #[track_caller]
    fn debug(&self, message: &str) {
        self.emit(LogLevel::Debug, message, Fields::new());
    }

    #[track_caller]
    fn debug_with(&self, message: &str, fields: Fields) {
        self.emit(LogLevel::Debug, message, fields);
    }

    #[track_caller]
    fn info(&self, message: &str) {
        self.emit(LogLevel::Info, message, Fields::new());
    }

    #[track_caller]
    fn info_with(&self, message: &str, fields: Fields) {
        self.emit(LogLevel::Info, message, fields);
    }

    #[track_caller]
    fn warn(&self, message: &str) {
        self.emit(LogLevel::Warn, message, Fields::new());
    }

    #[track_caller]
    fn warn_with(&self, message: &str, fields: Fields) {
        self.emit(LogLevel::Warn, message, fields);
    }

    #[track_caller]
    fn error(&self, message: &str) {
        self.emit(LogLevel::Error, message, Fields::new());
    }

    #[track_caller]
    fn error_with(&self, message: &str, fields: Fields) {
        self.emit(LogLevel::Error, message, fields);
    }

    #[track_caller]
    fn panic(&self, message: &str) -> ! {
        self.panic_with(message, Fields::new())
    }

    /// Write the record, flush, then panic with `message`.
    #[track_caller]
    fn panic_with(&self, message: &str, fields: Fields) -> ! {
        self.emit(LogLevel::Panic, message, fields);
        self.flush();
        panic!("{}", message)
    }

    #[track_caller]
    fn fatal(&self, message: &str) -> ! {
        self.fatal_with(message, Fields::new())
    }

    /// Write the record, flush, then exit the process with [`FATAL_EXIT_CODE`].
    #[track_caller]
    fn fatal_with(&self, message: &str, fields: Fields) -> ! {
        self.emit(LogLevel::Fatal, message, fields);
        self.flush();
        std::process::exit(FATAL_EXIT_CODE)
    }
}

/// State shared by the plain and trace loggers of one factory.
pub(crate) struct LoggerCore {
    pub(crate) gate: LevelGate,
    pub(crate) sink: SharedSink,
    pub(crate) encoder: Arc<RecordEncoder>,
    /// Fields attached to every record, set by `Factory::with`
    pub(crate) fields: Fields,
    pub(crate) metrics: LoggerMetrics,
}

impl LoggerCore {
    pub(crate) fn new(
        level: LogLevel,
        sink: SharedSink,
        encoder: Arc<RecordEncoder>,
        fields: Fields,
    ) -> Self {
        Self {
            gate: LevelGate::new(level),
            sink,
            encoder,
            fields,
            metrics: LoggerMetrics::new(),
        }
    }
}

/// Context-unaware logger gated by its factory's [`LevelGate`].
///
/// Cloning is cheap and the clone keeps routing through the same gate.
#[derive(Clone)]
pub struct PlainLogger {
    core: Arc<LoggerCore>,
}

impl PlainLogger {
    pub(crate) fn new(core: Arc<LoggerCore>) -> Self {
        Self { core }
    }

    /// Like [`Log::log_with`], but returns sink and encoder failures instead
    /// of reporting them. `Ok(false)` means the gate filtered the record.
    ///
    /// Never escapes, even at `Panic` or `Fatal`.
    #[track_caller]
    pub fn try_log_with(&self, level: LogLevel, message: &str, fields: Fields) -> Result<bool> {
        if !self.admit(level) {
            return Ok(false);
        }
        let fields = self.core.fields.merged(fields);
        self.write(level, message, fields, Location::caller())?;
        Ok(true)
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.core.metrics
    }

    pub(crate) fn gate(&self) -> &LevelGate {
        &self.core.gate
    }

    pub(crate) fn core(&self) -> &LoggerCore {
        &self.core
    }

    /// Gate check; counts the call as filtered when it is rejected.
    pub(crate) fn admit(&self, level: LogLevel) -> bool {
        let allowed = self.core.gate.allows(level);
        if !allowed {
            self.core.metrics.record_filtered();
        }
        allowed
    }

    /// Encode and write one record. `fields` must already include the
    /// factory's fields.
    pub(crate) fn write(
        &self,
        level: LogLevel,
        message: &str,
        fields: Fields,
        caller: &'static Location<'static>,
    ) -> Result<()> {
        let core = &self.core;
        let mut record = Record::new(level, message).with_fields(fields);
        if core.encoder.options().add_caller {
            record = record.with_caller(CallerLocation::from_location(caller));
        }

        let result = core
            .encoder
            .encode(&record)
            .and_then(|line| core.sink.write(&line));

        match result {
            Ok(()) => {
                core.metrics.record_written();
                Ok(())
            }
            Err(e) => {
                core.metrics.record_write_failure();
                Err(e)
            }
        }
    }

    pub(crate) fn write_or_report(
        &self,
        level: LogLevel,
        message: &str,
        fields: Fields,
        caller: &'static Location<'static>,
    ) {
        if let Err(e) = self.write(level, message, fields, caller) {
            eprintln!(
                "[LOGGER ERROR] Sink '{}' failed to write {} record: {}",
                self.core.sink.name(),
                level,
                e
            );
        }
    }
}

impl Log for PlainLogger {
    #[inline]
    fn enabled(&self, level: LogLevel) -> bool {
        self.core.gate.allows(level)
    }

    #[track_caller]
    fn emit(&self, level: LogLevel, message: &str, fields: Fields) {
        if !self.admit(level) {
            return;
        }
        let fields = self.core.fields.merged(fields);
        self.write_or_report(level, message, fields, Location::caller());
    }

    fn flush(&self) {
        if let Err(e) = self.core.sink.flush() {
            eprintln!(
                "[LOGGER ERROR] Sink '{}' flush failed: {}",
                self.core.sink.name(),
                e
            );
        }
    }
}

impl fmt::Debug for PlainLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlainLogger")
            .field("level", &self.core.gate.get())
            .field("sink", &self.core.sink.name())
            .field("fields", &self.core.fields)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoder::LoggerOptions;
    use crate::core::error::LoggerError;
    use crate::core::sink::Sink;
    use crate::sinks::{MemorySink, RotatingFileSink};
    use std::path::Path;
    use std::process::{Command, Output};
    use tempfile::TempDir;

    /// Set in the re-executed test binary; holds the log file path.
    const FATAL_CHILD_LOG: &str = "RUST_TRACE_LOGGER_FATAL_CHILD_LOG";

    /// Re-run `test_name` from this test binary in a child process.
    fn run_in_child(test_name: &str, log_path: &Path) -> Output {
        Command::new(std::env::current_exe().unwrap())
            .args(["--exact", test_name, "--nocapture", "--test-threads=1"])
            .env(FATAL_CHILD_LOG, log_path)
            .output()
            .unwrap()
    }

    fn logger_with(level: LogLevel, sink: SharedSink, options: LoggerOptions) -> PlainLogger {
        let core = LoggerCore::new(
            level,
            sink,
            Arc::new(RecordEncoder::new(options)),
            Fields::new(),
        );
        PlainLogger::new(Arc::new(core))
    }

    struct FailingSink;

    impl Sink for FailingSink {
        fn write(&self, _record: &[u8]) -> Result<()> {
            Err(LoggerError::other("Simulated failure"))
        }

        fn flush(&self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_filtered_call_writes_nothing() {
        let sink = Arc::new(MemorySink::new());
        let logger = logger_with(LogLevel::Warn, sink.clone(), LoggerOptions::default());

        logger.debug("hidden");
        logger.info("hidden");

        assert!(sink.is_empty());
        assert_eq!(logger.metrics().records_filtered(), 2);
        assert_eq!(logger.metrics().records_written(), 0);
    }

    #[test]
    fn test_allowed_call_writes_one_record() {
        let sink = Arc::new(MemorySink::new());
        let logger = logger_with(LogLevel::Warn, sink.clone(), LoggerOptions::default());

        logger.error("visible");

        let records = sink.json_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["level"], "error");
        assert_eq!(records[0]["msg"], "visible");
    }

    #[test]
    fn test_caller_location_points_at_call_site() {
        let sink = Arc::new(MemorySink::new());
        let logger = logger_with(
            LogLevel::Debug,
            sink.clone(),
            LoggerOptions::new().with_caller(true),
        );

        logger.info("with caller");

        let records = sink.json_records();
        let caller = records[0]["caller"].as_str().unwrap();
        assert!(caller.starts_with("core/logger.rs:"), "caller was {}", caller);
    }

    #[test]
    fn test_try_log_propagates_sink_failure() {
        let logger = logger_with(LogLevel::Info, Arc::new(FailingSink), LoggerOptions::default());

        assert!(matches!(
            logger.try_log_with(LogLevel::Error, "boom", Fields::new()),
            Err(LoggerError::Other(_))
        ));
        assert!(matches!(
            logger.try_log_with(LogLevel::Debug, "filtered", Fields::new()),
            Ok(false)
        ));
        assert_eq!(logger.metrics().write_failures(), 1);
    }

    #[test]
    fn test_emit_reports_failure_without_escaping() {
        let logger = logger_with(LogLevel::Info, Arc::new(FailingSink), LoggerOptions::default());

        for _ in 0..5 {
            logger.info("Test message");
        }

        assert_eq!(logger.metrics().write_failures(), 5);
    }

    #[test]
    fn test_panic_writes_record_before_unwinding() {
        let sink = Arc::new(MemorySink::new());
        let logger = logger_with(LogLevel::Info, sink.clone(), LoggerOptions::default());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            logger.panic_with("invariant broken", Fields::new().with_field("id", 9));
        }));

        let payload = result.unwrap_err();
        assert_eq!(payload.downcast_ref::<String>().map(String::as_str), Some("invariant broken"));

        let records = sink.json_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["level"], "panic");
        assert_eq!(records[0]["id"], 9);
    }

    #[test]
    fn test_panic_escapes_even_when_filtered() {
        let sink = Arc::new(MemorySink::new());
        let logger = logger_with(LogLevel::Fatal, sink.clone(), LoggerOptions::default());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            logger.log(LogLevel::Panic, "filtered but still panics");
        }));

        assert!(result.is_err());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_fatal_writes_and_flushes_before_exit() {
        if let Some(path) = std::env::var_os(FATAL_CHILD_LOG) {
            // Buffered sink: the record only reaches disk if fatal flushes.
            let sink = Arc::new(RotatingFileSink::new(path).unwrap());
            let logger = logger_with(LogLevel::Info, sink, LoggerOptions::default());
            logger.fatal_with("shutting down", Fields::new().with_field("reason", "disk full"));
        }

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fatal.log");
        let output = run_in_child(
            "core::logger::tests::test_fatal_writes_and_flushes_before_exit",
            &path,
        );

        assert_eq!(output.status.code(), Some(FATAL_EXIT_CODE));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
        let record: serde_json::Value = serde_json::from_str(contents.trim_end()).unwrap();
        assert_eq!(record["level"], "fatal");
        assert_eq!(record["msg"], "shutting down");
        assert_eq!(record["reason"], "disk full");
    }

    #[test]
    fn test_fatal_exits_when_record_cannot_be_written() {
        if std::env::var_os(FATAL_CHILD_LOG).is_some() {
            let logger = logger_with(LogLevel::Fatal, Arc::new(FailingSink), LoggerOptions::default());
            logger.log(LogLevel::Fatal, "unwritable");
        }

        let dir = TempDir::new().unwrap();
        let output = run_in_child(
            "core::logger::tests::test_fatal_exits_when_record_cannot_be_written",
            &dir.path().join("unused.log"),
        );

        assert_eq!(output.status.code(), Some(FATAL_EXIT_CODE));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("[LOGGER ERROR] Sink 'failing'"), "stderr was {}", stderr);
    }
}
