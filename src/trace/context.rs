//! Call context carrying the active span

use super::span::SpanHandle;
use std::fmt;

/// Ambient context passed down a call chain.
///
/// A context either carries an active span or is empty; deriving a new
/// context never mutates the original.
#[derive(Clone, Default)]
pub struct TraceContext {
    span: Option<SpanHandle>,
}

impl TraceContext {
    /// An empty context.
    pub fn background() -> Self {
        Self::default()
    }

    /// A copy of this context carrying `span`.
    #[must_use]
    pub fn with_span(&self, span: SpanHandle) -> Self {
        Self { span: Some(span) }
    }

    pub fn span(&self) -> Option<&SpanHandle> {
        self.span.as_ref()
    }
}

impl From<SpanHandle> for TraceContext {
    fn from(span: SpanHandle) -> Self {
        Self { span: Some(span) }
    }
}

impl fmt::Debug for TraceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceContext")
            .field("span", &self.span.as_ref().map(|s| s.context()))
            .finish()
    }
}
