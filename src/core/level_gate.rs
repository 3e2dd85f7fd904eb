//! Runtime-adjustable severity threshold

use super::log_level::LogLevel;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Atomically readable and writable minimum level.
///
/// A gate is owned by exactly one [`Factory`](crate::Factory); its plain and
/// trace loggers consult it on every call. Writes are a single atomic store,
/// so concurrent readers observe either the old or the new threshold.
pub struct LevelGate {
    threshold: AtomicU8,
}

impl LevelGate {
    pub fn new(level: LogLevel) -> Self {
        Self {
            threshold: AtomicU8::new(level.as_u8()),
        }
    }

    /// Replace the threshold. Unrecognised names resolve to `info`.
    pub fn set_level(&self, name: &str) {
        self.set(LogLevel::from_name(name));
    }

    pub fn set(&self, level: LogLevel) {
        self.threshold.store(level.as_u8(), Ordering::Release);
    }

    /// Current threshold.
    #[inline]
    pub fn get(&self) -> LogLevel {
        LogLevel::from_u8(self.threshold.load(Ordering::Acquire))
    }

    /// Canonical name of the current threshold.
    pub fn level(&self) -> &'static str {
        self.get().as_str()
    }

    /// True iff `candidate` is at or above the threshold.
    #[inline]
    pub fn allows(&self, candidate: LogLevel) -> bool {
        candidate >= self.get()
    }
}

impl Default for LevelGate {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl fmt::Debug for LevelGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelGate").field("threshold", &self.get()).finish()
    }
}
