//! Logger factory: one level gate, one sink, a plain and a trace logger

use crate::config::{Destination, LoggerConfig};
use crate::core::{
    encoder::{LoggerOptions, RecordEncoder},
    error::Result,
    fields::Fields,
    log_level::LogLevel,
    logger::{Log, LoggerCore, PlainLogger},
    metrics::LoggerMetrics,
    sink::SharedSink,
    trace_logger::TraceLogger,
};
use crate::sinks::{ConsoleSink, RotatingFileSink, RotationPolicy, RotationStrategy};
use crate::trace::TraceContext;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Default size limit of [`Factory::new_file_logger`]
pub const DEFAULT_FILE_MAX_SIZE_MB: u64 = 1024;

/// Creates loggers that share one runtime-adjustable level.
///
/// A factory owns its [`LevelGate`](crate::LevelGate) exclusively and shares
/// its sink with every factory derived from it through [`with`](Self::with).
/// Children start at the parent's level but are independent afterwards.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use rust_trace_logger::prelude::*;
/// use rust_trace_logger::sinks::MemorySink;
///
/// let sink = Arc::new(MemorySink::new());
/// let root = Factory::with_sink(sink.clone(), "debug", LoggerOptions::default());
/// let child = root.with([field("component", "db")]);
///
/// root.set_level("warn");
/// root.normal().info("dropped");
/// child.normal().info("written");
///
/// assert_eq!(child.level(), "debug");
/// assert_eq!(sink.len(), 1);
/// ```
pub struct Factory {
    plain: PlainLogger,
    trace: TraceLogger,
}

impl Factory {
    fn from_parts(
        level: LogLevel,
        sink: SharedSink,
        encoder: Arc<RecordEncoder>,
        fields: Fields,
    ) -> Self {
        let core = Arc::new(LoggerCore::new(level, sink, encoder, fields));
        let plain = PlainLogger::new(core);
        let trace = TraceLogger::new(plain.clone());
        Self { plain, trace }
    }

    /// Factory writing to an arbitrary sink.
    pub fn with_sink(sink: SharedSink, level: impl Into<LogLevel>, options: LoggerOptions) -> Self {
        Self::from_parts(
            level.into(),
            sink,
            Arc::new(RecordEncoder::new(options)),
            Fields::new(),
        )
    }

    /// Factory writing to stdout.
    pub fn new_console(level: impl Into<LogLevel>, options: LoggerOptions) -> Self {
        Self::with_sink(Arc::new(ConsoleSink::stdout()), level, options)
    }

    /// JSON records on stdout with caller locations.
    pub fn new_std(level: impl Into<LogLevel>) -> Self {
        Self::new_console(level, LoggerOptions::new().with_caller(true))
    }

    /// Factory writing to a size-rotated file.
    ///
    /// Rotated files are kept as `<path>.1`, `<path>.2`, ... (newest first,
    /// `.gz` when compressed) and are never deleted. Use
    /// [`from_config`](Self::from_config) or [`with_sink`](Self::with_sink)
    /// with a [`RotationPolicy`] to cap them.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be created.
    pub fn new_file<P: AsRef<Path>>(
        path: P,
        level: impl Into<LogLevel>,
        max_size_mb: u64,
        compress: bool,
        options: LoggerOptions,
    ) -> Result<Self> {
        let policy = RotationPolicy::new()
            .with_strategy(RotationStrategy::size_mb(max_size_mb))
            .with_unlimited_backups()
            .with_compression(compress);
        let sink = RotatingFileSink::with_policy(path, policy)?;
        Ok(Self::with_sink(Arc::new(sink), level, options))
    }

    /// JSON records in a file rotated at 1 GiB, uncompressed, with caller
    /// locations.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be created.
    pub fn new_file_logger<P: AsRef<Path>>(path: P, level: impl Into<LogLevel>) -> Result<Self> {
        Self::new_file(
            path,
            level,
            DEFAULT_FILE_MAX_SIZE_MB,
            false,
            LoggerOptions::new().with_caller(true),
        )
    }

    /// Build a root factory from a [`LoggerConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the file sink
    /// cannot be opened.
    pub fn from_config(config: &LoggerConfig) -> Result<Self> {
        config.validate()?;
        let sink: SharedSink = match &config.destination {
            Destination::Console { stderr: false } => Arc::new(ConsoleSink::stdout()),
            Destination::Console { stderr: true } => Arc::new(ConsoleSink::stderr()),
            Destination::File { path, .. } => {
                let policy = config.destination.rotation_policy().unwrap_or_default();
                Arc::new(RotatingFileSink::with_policy(path, policy)?)
            }
        };
        Ok(Self::with_sink(sink, config.level.as_str(), config.options()))
    }

    pub fn builder() -> FactoryBuilder {
        FactoryBuilder::new()
    }

    /// The context-unaware logger.
    pub fn normal(&self) -> &PlainLogger {
        &self.plain
    }

    /// The logger to use for a call made within `ctx`.
    ///
    /// When `ctx` carries a span, the trace logger is pointed at it and
    /// returned; records it writes are also logged on the span. Without a
    /// span this is the same as [`normal`](Self::normal).
    pub fn trace(&self, ctx: &TraceContext) -> &dyn Log {
        match ctx.span() {
            Some(span) => {
                self.trace.attach(span);
                &self.trace
            }
            None => &self.plain,
        }
    }

    /// Change this factory's level. Unrecognised names mean `info`.
    pub fn set_level(&self, level: &str) {
        self.plain.gate().set_level(level);
    }

    pub fn level(&self) -> &'static str {
        self.plain.gate().level()
    }

    /// Derive a child factory.
    ///
    /// The child shares the sink, starts at this factory's current level and
    /// adds `fields` to every record it writes. Level changes on either side
    /// are not seen by the other.
    #[must_use]
    pub fn with(&self, fields: impl Into<Fields>) -> Factory {
        let core = self.plain.core();
        let mut derived = core.fields.clone();
        derived.extend(fields.into());
        Self::from_parts(
            core.gate.get(),
            Arc::clone(&core.sink),
            Arc::clone(&core.encoder),
            derived,
        )
    }

    /// Flush the shared sink.
    ///
    /// # Errors
    ///
    /// Returns the sink's flush error.
    pub fn flush(&self) -> Result<()> {
        self.plain.core().sink.flush()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        self.plain.metrics()
    }

    pub fn sink(&self) -> &SharedSink {
        &self.plain.core().sink
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("level", &self.level())
            .field("sink", &self.sink().name())
            .field("trace", &self.trace)
            .finish()
    }
}

/// Fluent construction of a root [`Factory`].
///
/// Without a sink the factory writes to stdout.
pub struct FactoryBuilder {
    level: LogLevel,
    sink: Option<SharedSink>,
    options: LoggerOptions,
    fields: Fields,
}

impl FactoryBuilder {
    pub fn new() -> Self {
        Self {
            level: LogLevel::Info,
            sink: None,
            options: LoggerOptions::default(),
            fields: Fields::new(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: impl Into<LogLevel>) -> Self {
        self.level = level.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sink(mut self, sink: SharedSink) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn options(mut self, options: LoggerOptions) -> Self {
        self.options = options;
        self
    }

    /// Fields written with every record of the factory and its children.
    #[must_use = "builder methods return a new value"]
    pub fn fields(mut self, fields: impl Into<Fields>) -> Self {
        self.fields.extend(fields.into());
        self
    }

    pub fn build(self) -> Factory {
        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(ConsoleSink::stdout()));
        Factory::from_parts(
            self.level,
            sink,
            Arc::new(RecordEncoder::new(self.options)),
            self.fields,
        )
    }
}

impl Default for FactoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
