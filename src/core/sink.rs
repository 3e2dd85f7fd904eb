//! Sink trait for log output destinations

use super::error::Result;
use std::sync::Arc;

/// Destination for encoded records.
///
/// A sink is shared by a root `Factory` and every factory derived from it,
/// so it takes `&self` and serializes concurrent writers internally. Each
/// call to [`Sink::write`] carries exactly one encoded record.
pub trait Sink: Send + Sync {
    fn write(&self, record: &[u8]) -> Result<()>;
    fn flush(&self) -> Result<()>;
    fn name(&self) -> &str;
}

/// Shared handle to a sink.
pub type SharedSink = Arc<dyn Sink>;
