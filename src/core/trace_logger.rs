//! Logger that mirrors records into an attached trace span

use super::{
    fields::{Field, Fields},
    log_level::LogLevel,
    logger::{Log, PlainLogger},
};
use crate::trace::{Span, SpanHandle};
use arc_swap::ArcSwapOption;
use std::fmt;
use std::panic::Location;
use std::sync::{Arc, Weak};

/// Weak link to the span currently receiving mirrored records. The span's
/// lifetime belongs to the tracer.
struct AttachedSpan(Weak<dyn Span>);

impl AttachedSpan {
    fn is(&self, span: &SpanHandle) -> bool {
        std::ptr::eq(self.0.as_ptr().cast::<()>(), Arc::as_ptr(span).cast::<()>())
    }
}

/// Wraps a [`PlainLogger`] and echoes every written record into the attached
/// span as a log event.
///
/// Gating is identical to the wrapped logger: a call rejected by the level
/// gate produces neither a record nor a span event. Events at `error` and
/// above also mark the span as errored.
pub struct TraceLogger {
    logger: PlainLogger,
    span: ArcSwapOption<AttachedSpan>,
}

impl TraceLogger {
    pub(crate) fn new(logger: PlainLogger) -> Self {
        Self {
            logger,
            span: ArcSwapOption::empty(),
        }
    }

    /// Point the mirror at `span`. Returns `false` when it was already attached.
    pub(crate) fn attach(&self, span: &SpanHandle) -> bool {
        if let Some(current) = self.span.load().as_ref() {
            if current.is(span) {
                return false;
            }
        }
        self.span
            .store(Some(Arc::new(AttachedSpan(Arc::downgrade(span)))));
        true
    }

    /// The attached span, if one is attached and still alive.
    pub fn attached_span(&self) -> Option<SpanHandle> {
        self.span.load().as_ref().and_then(|attached| attached.0.upgrade())
    }

    pub fn plain(&self) -> &PlainLogger {
        &self.logger
    }
}

/// Event fields in the order tracing UIs display them: the message, the
/// severity, then the record's own fields.
fn span_event(level: LogLevel, message: &str, fields: &Fields) -> Fields {
    let mut event = Fields::new()
        .with_field("event", message)
        .with_field("level", level.as_str());
    event.extend(fields.iter().cloned().filter(|f: &Field| f.key != "event" && f.key != "level"));
    event
}

impl Log for TraceLogger {
    #[inline]
    fn enabled(&self, level: LogLevel) -> bool {
        self.logger.enabled(level)
    }

    #[track_caller]
    fn emit(&self, level: LogLevel, message: &str, fields: Fields) {
        if !self.logger.admit(level) {
            return;
        }
        let fields = self.logger.core().fields.merged(fields);
        let event = self
            .attached_span()
            .map(|span| (span, span_event(level, message, &fields)));

        self.logger
            .write_or_report(level, message, fields, Location::caller());

        if let Some((span, event)) = event {
            span.log_event(event);
            if level.is_error() {
                span.mark_errored();
            }
            self.logger.metrics().record_span_event();
        }
    }

    fn flush(&self) {
        self.logger.flush();
    }
}

impl fmt::Debug for TraceLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceLogger")
            .field("logger", &self.logger)
            .field("span", &self.attached_span().map(|s| s.context()))
            .finish()
    }
}
