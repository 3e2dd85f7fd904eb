//! Helpers for starting spans from a call context

use super::context::TraceContext;
use super::global;
use super::span::{SpanHandle, Tracer};
use crate::core::fields::Fields;

/// Start a span with the process-wide tracer.
///
/// See [`start_span_with_tracer`].
pub fn start_span(ctx: &TraceContext, operation: &str, tags: &Fields) -> (TraceContext, SpanHandle) {
    let tracer = global::tracer();
    start_span_with_tracer(ctx, tracer.as_ref(), operation, tags)
}

/// Start a span that is a child of `ctx`'s span, or a root span when `ctx`
/// carries none, apply `tags`, and return a context carrying the new span.
///
/// # Example
///
/// ```
/// use rust_trace_logger::trace::{start_span_with_tracer, MemoryTracer, TraceContext};
/// use rust_trace_logger::Fields;
///
/// let tracer = MemoryTracer::new();
/// let tags = Fields::new().with_field("span.kind", "server");
/// let (ctx, root) = start_span_with_tracer(&TraceContext::background(), &tracer, "request", &tags);
/// let (_, child) = start_span_with_tracer(&ctx, &tracer, "db.query", &Fields::new());
///
/// assert_eq!(child.context().trace_id, root.context().trace_id);
/// assert_eq!(child.context().parent_span_id, Some(root.context().span_id));
/// ```
pub fn start_span_with_tracer(
    ctx: &TraceContext,
    tracer: &dyn Tracer,
    operation: &str,
    tags: &Fields,
) -> (TraceContext, SpanHandle) {
    let parent = ctx.span().map(|span| span.context());
    let span = tracer.start_span(operation, parent.as_ref());
    for tag in tags.iter() {
        span.set_tag(&tag.key, tag.value.clone());
    }
    (ctx.with_span(span.clone()), span)
}
