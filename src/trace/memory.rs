//! In-process recording tracer
//!
//! Keeps the most recent spans it starts in memory so tags, events and error
//! flags can be inspected. The store holds at most
//! [`TracerConfig::max_spans`] spans and drops the oldest first, finished or
//! not; a dropped span lives on only while callers hold its handle. Nothing is
//! exported; real backends implement [`Tracer`] themselves.

use super::adapter::TracerLogger;
use super::config::TracerConfig;
use super::span::{NoopTracer, Span, SpanContext, SpanHandle, Tracer};
use crate::core::fields::{FieldValue, Fields};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

struct TracerState {
    config: TracerConfig,
    next_id: AtomicU64,
    closed: AtomicBool,
    spans: Mutex<VecDeque<Arc<MemorySpan>>>,
    started: AtomicU64,
    logger: Option<Arc<dyn TracerLogger>>,
}

impl TracerState {
    fn next_id(&self) -> String {
        format!("{:016x}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn retain(&self, span: &Arc<MemorySpan>) {
        self.started.fetch_add(1, Ordering::Relaxed);
        let max = self.config.max_spans;
        if max == 0 {
            return;
        }
        let mut spans = self.spans.lock();
        while spans.len() >= max {
            spans.pop_front();
        }
        spans.push_back(Arc::clone(span));
    }
}

/// Recording tracer. Clones share the same span store.
#[derive(Clone)]
pub struct MemoryTracer {
    state: Arc<TracerState>,
}

impl MemoryTracer {
    pub fn new() -> Self {
        Self::with_config(TracerConfig::default(), None)
    }

    pub fn with_config(config: TracerConfig, logger: Option<Arc<dyn TracerLogger>>) -> Self {
        Self {
            state: Arc::new(TracerState {
                config,
                next_id: AtomicU64::new(0),
                closed: AtomicBool::new(false),
                spans: Mutex::new(VecDeque::new()),
                started: AtomicU64::new(0),
                logger,
            }),
        }
    }

    pub fn config(&self) -> &TracerConfig {
        &self.state.config
    }

    /// Start a span and return the concrete handle.
    pub fn start_memory_span(
        &self,
        operation: &str,
        parent: Option<&SpanContext>,
    ) -> Arc<MemorySpan> {
        let state = &self.state;
        let span_id = state.next_id();
        let context = match parent {
            Some(parent) if !parent.is_empty() => {
                SpanContext::new(parent.trace_id.clone(), span_id).with_parent(parent.span_id.clone())
            }
            _ => SpanContext::new(state.next_id(), span_id),
        };

        let mut tags = Fields::new();
        if context.parent_span_id.is_none() {
            if let Some(service) = &state.config.service_name {
                tags.add_field("service.name", service.as_str());
            }
            tags.extend(state.config.resource_attributes.iter().cloned());
        }

        let span = Arc::new(MemorySpan {
            context,
            operation: operation.to_string(),
            inner: Mutex::new(SpanRecord {
                tags,
                ..SpanRecord::default()
            }),
            tracer: Arc::downgrade(state),
        });

        if let Some(logger) = &state.logger {
            logger.debug(format_args!(
                "started span {} ({})",
                span.operation, span.context
            ));
        }
        state.retain(&span);
        span
    }

    /// Retained spans, oldest first.
    pub fn spans(&self) -> Vec<Arc<MemorySpan>> {
        self.state.spans.lock().iter().cloned().collect()
    }

    /// Spans started since creation, including those no longer retained.
    pub fn started_count(&self) -> u64 {
        self.state.started.load(Ordering::Relaxed)
    }

    pub fn finished_spans(&self) -> Vec<Arc<MemorySpan>> {
        self.state
            .spans
            .lock()
            .iter()
            .filter(|span| span.is_finished())
            .cloned()
            .collect()
    }

    /// Look up a retained span by its context.
    pub fn span(&self, context: &SpanContext) -> Option<Arc<MemorySpan>> {
        self.state
            .spans
            .lock()
            .iter()
            .find(|span| span.context == *context)
            .cloned()
    }

    /// Stop recording. Later `start_span` calls return no-op spans.
    pub fn close(&self) {
        if self.state.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(logger) = &self.state.logger {
            let finished = {
                let spans = self.state.spans.lock();
                spans.iter().filter(|s| s.is_finished()).count()
            };
            logger.info(format_args!(
                "tracer closed: {} spans started, {} retained spans finished",
                self.started_count(),
                finished
            ));
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::Acquire)
    }
}

impl Default for MemoryTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracer for MemoryTracer {
    fn start_span(&self, operation: &str, parent: Option<&SpanContext>) -> SpanHandle {
        if self.state.config.disabled || self.is_closed() {
            return NoopTracer.start_span(operation, parent);
        }
        self.start_memory_span(operation, parent)
    }
}

impl fmt::Debug for MemoryTracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTracer")
            .field("config", &self.state.config)
            .field("spans", &self.state.spans.lock().len())
            .field("started", &self.started_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[derive(Debug, Default, Clone)]
struct SpanRecord {
    tags: Fields,
    events: Vec<Fields>,
    finished: bool,
}

/// A span recorded by [`MemoryTracer`].
pub struct MemorySpan {
    context: SpanContext,
    operation: String,
    inner: Mutex<SpanRecord>,
    tracer: Weak<TracerState>,
}

impl MemorySpan {
    pub fn tags(&self) -> Fields {
        self.inner.lock().tags.clone()
    }

    pub fn events(&self) -> Vec<Fields> {
        self.inner.lock().events.clone()
    }

    pub fn is_errored(&self) -> bool {
        matches!(self.inner.lock().tags.get("error"), Some(FieldValue::Bool(true)))
    }

    pub fn is_finished(&self) -> bool {
        self.inner.lock().finished
    }

    fn report_error(&self, message: &str) {
        if let Some(logger) = self.tracer.upgrade().and_then(|t| t.logger.clone()) {
            logger.error(message);
        }
    }
}

impl Span for MemorySpan {
    fn context(&self) -> SpanContext {
        self.context.clone()
    }

    fn operation_name(&self) -> String {
        self.operation.clone()
    }

    fn set_tag(&self, key: &str, value: FieldValue) {
        let mut inner = self.inner.lock();
        if inner.finished {
            drop(inner);
            self.report_error(&format!("set_tag '{}' on finished span {}", key, self.context));
            return;
        }
        inner.tags.add_field(key, value);
    }

    fn log_event(&self, fields: Fields) {
        let mut inner = self.inner.lock();
        if inner.finished {
            drop(inner);
            self.report_error(&format!("log_event on finished span {}", self.context));
            return;
        }
        inner.events.push(fields);
    }

    fn finish(&self) {
        let mut inner = self.inner.lock();
        if inner.finished {
            drop(inner);
            self.report_error(&format!("span {} finished twice", self.context));
            return;
        }
        inner.finished = true;
    }
}

impl fmt::Debug for MemorySpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySpan")
            .field("context", &self.context)
            .field("operation", &self.operation)
            .field("record", &*self.inner.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fields::field;
    use crate::trace::config::DEFAULT_MAX_SPANS;
    use parking_lot::Mutex as PlMutex;

    #[derive(Default)]
    struct CapturingLogger {
        lines: PlMutex<Vec<String>>,
    }

    impl TracerLogger for CapturingLogger {
        fn error(&self, message: &str) {
            self.lines.lock().push(format!("ERROR {}", message));
        }

        fn info(&self, args: fmt::Arguments<'_>) {
            self.lines.lock().push(format!("INFO {}", args));
        }

        fn debug(&self, args: fmt::Arguments<'_>) {
            self.lines.lock().push(format!("DEBUG {}", args));
        }
    }

    #[test]
    fn test_child_spans_share_trace_id() {
        let tracer = MemoryTracer::new();
        let root = tracer.start_span("root", None);
        let child = tracer.start_span("child", Some(&root.context()));

        assert_eq!(child.context().trace_id, root.context().trace_id);
        assert_eq!(child.context().parent_span_id, Some(root.context().span_id));
        assert_ne!(child.context().span_id, root.context().span_id);
    }

    #[test]
    fn test_root_spans_carry_service_tags() {
        let config = TracerConfig {
            service_name: Some("checkout".to_string()),
            resource_attributes: [field("region", "eu-1")].into(),
            ..TracerConfig::default()
        };
        let tracer = MemoryTracer::with_config(config, None);

        let root = tracer.start_memory_span("root", None);
        let child = tracer.start_memory_span("child", Some(&root.context()));

        assert_eq!(root.tags().get("service.name"), Some(&"checkout".into()));
        assert_eq!(root.tags().get("region"), Some(&"eu-1".into()));
        assert!(child.tags().is_empty());
    }

    #[test]
    fn test_finish_and_errors() {
        let logger = Arc::new(CapturingLogger::default());
        let tracer = MemoryTracer::with_config(TracerConfig::default(), Some(logger.clone()));

        let span = tracer.start_span("op", None);
        span.mark_errored();
        span.finish();
        span.finish();
        span.log_event(Fields::new());

        let recorded = tracer.span(&span.context()).unwrap();
        assert!(recorded.is_errored());
        assert!(recorded.events().is_empty());
        assert_eq!(tracer.finished_spans().len(), 1);

        let lines = logger.lines.lock();
        assert!(lines[0].starts_with("DEBUG started span op"));
        assert!(lines.iter().any(|l| l.contains("finished twice")));
        assert!(lines.iter().any(|l| l.contains("log_event on finished span")));
    }

    #[test]
    fn test_disabled_and_closed_tracer_hand_out_noop_spans() {
        let disabled = MemoryTracer::with_config(
            TracerConfig {
                disabled: true,
                ..TracerConfig::default()
            },
            None,
        );
        assert!(disabled.start_span("op", None).context().is_empty());
        assert!(disabled.spans().is_empty());

        let logger = Arc::new(CapturingLogger::default());
        let tracer = MemoryTracer::with_config(TracerConfig::default(), Some(logger.clone()));
        tracer.start_span("before", None).finish();
        tracer.close();
        tracer.close();

        assert!(tracer.start_span("after", None).context().is_empty());
        assert_eq!(tracer.spans().len(), 1);
        let lines = logger.lines.lock();
        assert_eq!(
            lines.iter().filter(|l| l.starts_with("INFO tracer closed")).count(),
            1
        );
    }

    #[test]
    fn test_span_store_is_bounded() {
        let tracer = MemoryTracer::new();

        let first = tracer.start_span("request", None);
        let first_context = first.context();
        let first_weak = Arc::downgrade(&first);
        first.finish();
        drop(first);
        assert!(first_weak.upgrade().is_some());

        for _ in 1..10_000 {
            let span = tracer.start_span("request", None);
            span.finish();
        }

        assert_eq!(tracer.started_count(), 10_000);
        assert_eq!(tracer.spans().len(), DEFAULT_MAX_SPANS);
        assert!(tracer.span(&first_context).is_none());
        assert!(first_weak.upgrade().is_none());
    }

    #[test]
    fn test_max_spans_evicts_oldest_first() {
        let tracer =
            MemoryTracer::with_config(TracerConfig::default().with_max_spans(2), None);
        let handles: Vec<SpanHandle> = ["a", "b", "c"]
            .iter()
            .map(|op| tracer.start_span(op, None))
            .collect();

        let retained: Vec<String> = tracer.spans().iter().map(|s| s.operation_name()).collect();
        assert_eq!(retained, vec!["b", "c"]);

        // Evicted spans keep working for their holders.
        handles[0].log_event(Fields::new().with_field("event", "late"));

        let none = MemoryTracer::with_config(TracerConfig::default().with_max_spans(0), None);
        let span = none.start_span("op", None);
        assert!(!span.context().is_empty());
        assert!(none.spans().is_empty());
        assert_eq!(none.started_count(), 1);
    }
}
