//! In-memory sink

use crate::core::{Result, Sink};
use parking_lot::Mutex;

/// Keeps every written record in memory, one entry per `write` call.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `write` calls received.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Raw records as written.
    pub fn records(&self) -> Vec<Vec<u8>> {
        self.records.lock().clone()
    }

    /// Records as text with the trailing newline removed.
    pub fn lines(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|r| String::from_utf8_lossy(r).trim_end_matches('\n').to_string())
            .collect()
    }

    /// Records parsed as JSON. Records that are not valid JSON are skipped.
    pub fn json_records(&self) -> Vec<serde_json::Value> {
        self.records
            .lock()
            .iter()
            .filter_map(|r| serde_json::from_slice(r).ok())
            .collect()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write(&self, record: &[u8]) -> Result<()> {
        self.records.lock().push(record.to_vec());
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_each_write() {
        let sink = MemorySink::new();
        sink.write(b"{\"msg\":\"a\"}\n").unwrap();
        sink.write(b"plain text\n").unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.lines(), vec!["{\"msg\":\"a\"}", "plain text"]);
        assert_eq!(sink.json_records().len(), 1);

        sink.clear();
        assert!(sink.is_empty());
    }
}
