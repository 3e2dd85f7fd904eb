//! Span and tracer interfaces consumed by the trace logger

use crate::core::fields::{FieldValue, Fields};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identity of a span within a trace
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpanContext {
    /// Trace ID for request correlation
    pub trace_id: String,

    /// Span ID for this operation
    pub span_id: String,

    /// Parent span ID (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,
}

impl SpanContext {
    pub fn new(trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            span_id: span_id.into(),
            parent_span_id: None,
        }
    }

    pub fn with_parent(mut self, parent_span_id: impl Into<String>) -> Self {
        self.parent_span_id = Some(parent_span_id.into());
        self
    }

    /// A context with no trace, as carried by no-op spans.
    pub fn is_empty(&self) -> bool {
        self.trace_id.is_empty()
    }
}

impl fmt::Display for SpanContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.trace_id, self.span_id)
    }
}

/// An active span owned by a tracing collaborator.
///
/// All methods take `&self`; implementations serialize their own state.
pub trait Span: Send + Sync + fmt::Debug {
    fn context(&self) -> SpanContext;

    fn operation_name(&self) -> String;

    fn set_tag(&self, key: &str, value: FieldValue);

    /// Record a structured log event on the span.
    fn log_event(&self, fields: Fields);

    /// Flag the span as failed. Follows the OpenTracing `error=true` tag convention.
    fn mark_errored(&self) {
        self.set_tag("error", FieldValue::Bool(true));
    }

    fn finish(&self);
}

/// Shared handle to an active span.
pub type SpanHandle = Arc<dyn Span>;

/// Starts spans.
pub trait Tracer: Send + Sync {
    /// Start a span, as a child of `parent` when given, otherwise as a root.
    fn start_span(&self, operation: &str, parent: Option<&SpanContext>) -> SpanHandle;
}

/// Span that records nothing.
#[derive(Debug, Default)]
pub struct NoopSpan {
    operation: String,
}

impl Span for NoopSpan {
    fn context(&self) -> SpanContext {
        SpanContext::default()
    }

    fn operation_name(&self) -> String {
        self.operation.clone()
    }

    fn set_tag(&self, _key: &str, _value: FieldValue) {}

    fn log_event(&self, _fields: Fields) {}

    fn finish(&self) {}
}

/// Tracer handing out [`NoopSpan`]s; the global default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn start_span(&self, operation: &str, _parent: Option<&SpanContext>) -> SpanHandle {
        Arc::new(NoopSpan {
            operation: operation.to_string(),
        })
    }
}
