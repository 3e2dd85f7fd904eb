//! Sink implementations

pub mod console;
pub mod memory;
pub mod rotating_file;

pub use console::{ConsoleSink, ConsoleStream};
pub use memory::MemorySink;
pub use rotating_file::{RotatingFileSink, RotationPolicy, RotationStrategy};

pub use crate::core::{SharedSink, Sink};
