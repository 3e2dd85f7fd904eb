//! Console sink implementation

use crate::core::{Result, Sink};
use std::io::{self, Write};

/// Which standard stream a [`ConsoleSink`] writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleStream {
    #[default]
    Stdout,
    Stderr,
}

/// Writes encoded records to stdout or stderr.
///
/// Each record is written while holding the stream lock, so lines from
/// concurrent loggers never interleave.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    stream: ConsoleStream,
}

impl ConsoleSink {
    pub fn new(stream: ConsoleStream) -> Self {
        Self { stream }
    }

    pub fn stdout() -> Self {
        Self::new(ConsoleStream::Stdout)
    }

    pub fn stderr() -> Self {
        Self::new(ConsoleStream::Stderr)
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }
}

impl Sink for ConsoleSink {
    fn write(&self, record: &[u8]) -> Result<()> {
        match self.stream {
            ConsoleStream::Stdout => io::stdout().lock().write_all(record)?,
            ConsoleStream::Stderr => io::stderr().lock().write_all(record)?,
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        match self.stream {
            ConsoleStream::Stdout => io::stdout().flush()?,
            ConsoleStream::Stderr => io::stderr().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        match self.stream {
            ConsoleStream::Stdout => "console:stdout",
            ConsoleStream::Stderr => "console:stderr",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_stdout() {
        assert_eq!(ConsoleSink::default().stream(), ConsoleStream::Stdout);
        assert_eq!(ConsoleSink::stderr().name(), "console:stderr");
    }

    #[test]
    fn test_write_and_flush() {
        let sink = ConsoleSink::stderr();
        assert!(sink.write(b"console sink test\n").is_ok());
        assert!(sink.flush().is_ok());
    }
}
