//! # Rust Trace Logger
//!
//! Structured logging with a runtime-adjustable level and optional mirroring
//! of records into distributed-trace spans.
//!
//! ## Features
//!
//! - **Runtime levels**: change a factory's level from any thread without locks
//! - **Child factories**: derive loggers with their own level and extra fields
//!   that share the parent's output
//! - **Trace-aware logging**: records written within a span are also logged on it
//! - **Sinks**: console, rotating and compressing files, in-memory capture
//!
//! ## Example
//!
//! ```
//! use rust_trace_logger::prelude::*;
//!
//! let factory = Factory::new_std("info");
//! factory.normal().info("service started");
//!
//! let tracer = MemoryTracer::new();
//! let (ctx, span) = start_span_with_tracer(
//!     &TraceContext::background(),
//!     &tracer,
//!     "handle_request",
//!     &Fields::new(),
//! );
//! factory.trace(&ctx).warn_with("slow query", Fields::new().with_field("ms", 870));
//! span.finish();
//! ```

pub mod config;
pub mod core;
pub mod factory;
pub mod macros;
pub mod sinks;
pub mod trace;

pub mod prelude {
    pub use crate::config::{Destination, LoggerConfig};
    pub use crate::core::{
        field, Encoding, Field, FieldValue, Fields, LevelGate, Log, LogLevel, LoggerError,
        LoggerMetrics, LoggerOptions, PlainLogger, Result, TimestampFormat, TraceLogger,
    };
    pub use crate::factory::{Factory, FactoryBuilder};
    pub use crate::sinks::{ConsoleSink, MemorySink, RotatingFileSink, RotationPolicy, RotationStrategy};
    pub use crate::trace::{
        start_span, start_span_with_tracer, MemoryTracer, Span, SpanContext, SpanHandle,
        TraceContext, Tracer,
    };
}

pub use crate::config::{Destination, LoggerConfig};
pub use crate::core::{
    field, CallerLocation, Encoding, Field, FieldValue, Fields, LevelGate, Log, LogLevel,
    LoggerError, LoggerMetrics, LoggerOptions, PlainLogger, Record, RecordEncoder, Result,
    SharedSink, Sink, TimestampFormat, TraceLogger, FATAL_EXIT_CODE,
};
pub use crate::factory::{Factory, FactoryBuilder};
