//! Process-wide tracer registry
//!
//! Only entry points such as [`start_span`](crate::trace::start_span) consult
//! the registry; everything else takes a tracer explicitly.

use super::span::{NoopTracer, Tracer};
use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use std::sync::Arc;

struct Registered(Arc<dyn Tracer>);

static GLOBAL_TRACER: Lazy<ArcSwap<Registered>> =
    Lazy::new(|| ArcSwap::from_pointee(Registered(Arc::new(NoopTracer))));

/// Install `tracer` as the process-wide tracer.
pub fn set_tracer(tracer: Arc<dyn Tracer>) {
    GLOBAL_TRACER.store(Arc::new(Registered(tracer)));
}

/// The process-wide tracer; a no-op tracer until [`set_tracer`] is called.
pub fn tracer() -> Arc<dyn Tracer> {
    Arc::clone(&GLOBAL_TRACER.load().0)
}

/// Restore the no-op tracer.
pub fn reset_tracer() {
    set_tracer(Arc::new(NoopTracer));
}
