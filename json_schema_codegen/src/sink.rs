//! Observability sink for pipeline stage results.
//!
//! The pipeline reports through a [`Sink`] it is handed, so nothing it logs
//! depends on a process-wide logger. Sinks never influence generation.

use std::cell::RefCell;

/// Receives one labeled line per pipeline event.
pub trait Sink {
    fn info(&self, label: &str, message: &str);
    fn error(&self, label: &str, message: &str);
    fn debug(&self, label: &str, message: &str);
}

/// Forwards to `tracing`, with the label as the `stage` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl Sink for TracingSink {
    fn info(&self, label: &str, message: &str) {
        tracing::info!(stage = label, "{message}");
    }

    fn error(&self, label: &str, message: &str) {
        tracing::error!(stage = label, "{message}");
    }

    fn debug(&self, label: &str, message: &str) {
        tracing::debug!(stage = label, "{message}");
    }
}

/// Severity of a recorded line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
    Debug,
}

/// One line captured by a [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub level: Level,
    pub label: String,
    pub message: String,
}

/// Keeps every line in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: RefCell<Vec<Entry>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines recorded so far.
    #[must_use]
    pub fn entries(&self) -> Vec<Entry> {
        self.entries.borrow().clone()
    }

    /// Labels recorded at `level`, in arrival order.
    #[must_use]
    pub fn labels(&self, level: Level) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.label.clone())
            .collect()
    }

    fn record(&self, level: Level, label: &str, message: &str) {
        self.entries.borrow_mut().push(Entry {
            level,
            label: label.to_string(),
            message: message.to_string(),
        });
    }
}

impl Sink for MemorySink {
    fn info(&self, label: &str, message: &str) {
        self.record(Level::Info, label, message);
    }

    fn error(&self, label: &str, message: &str) {
        self.record(Level::Error, label, message);
    }

    fn debug(&self, label: &str, message: &str) {
        self.record(Level::Debug, label, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_keeps_arrival_order_and_level() {
        let sink: MemorySink = MemorySink::new();
        sink.info("parsed schema", "ok");
        sink.debug("model files", "wrote a");
        sink.error("serialization files", "boom");

        let actual: Vec<Entry> = sink.entries();
        let expected: Vec<Entry> = vec![
            Entry {
                level: Level::Info,
                label: "parsed schema".to_string(),
                message: "ok".to_string(),
            },
            Entry {
                level: Level::Debug,
                label: "model files".to_string(),
                message: "wrote a".to_string(),
            },
            Entry {
                level: Level::Error,
                label: "serialization files".to_string(),
                message: "boom".to_string(),
            },
        ];
        assert_eq!(expected, actual);
        assert_eq!(vec!["serialization files".to_string()], sink.labels(Level::Error));
    }

    #[test]
    fn tracing_sink_without_subscriber_is_silent() {
        let sink: TracingSink = TracingSink;
        sink.info("parsed schema", "ok");
        sink.error("parsed schema", "failed");
        sink.debug("parsed schema", "details");
    }
}
