//! Tracing collaborator surface: spans, tracers and call contexts

pub mod adapter;
pub mod config;
pub mod context;
pub mod global;
pub mod memory;
pub mod span;
pub mod util;

pub use adapter::{TracerLogAdapter, TracerLogger};
pub use config::{new_tracer, TracerConfig, DEFAULT_MAX_SPANS};
pub use context::TraceContext;
pub use memory::{MemorySpan, MemoryTracer};
pub use span::{NoopSpan, NoopTracer, Span, SpanContext, SpanHandle, Tracer};
pub use util::{start_span, start_span_with_tracer};
