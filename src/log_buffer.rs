//! Operator log ring buffer
//!
//! A bounded, append-only trail of human-readable lines. Once full, the
//! oldest line is evicted before the new one is inserted. Only the
//! presentation layer reads it.

use crate::types::Severity;
use chrono::{DateTime, Local};
use std::collections::VecDeque;

/// One operator log line
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub text: String,
    pub severity: Severity,
}

impl LogEntry {
    /// Time of day, as shown next to the line
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

/// Bounded FIFO of [`LogEntry`]
#[derive(Debug, Clone)]
pub struct LogRingBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    /// Lines evicted since creation (or the last clear)
    evicted: u64,
}

impl LogRingBuffer {
    /// Create an empty buffer; a zero capacity is raised to one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            evicted: 0,
        }
    }

    /// Append a line stamped with the current local time
    pub fn push(&mut self, severity: Severity, text: impl Into<String>) {
        self.push_entry(LogEntry {
            timestamp: Local::now(),
            text: text.into(),
            severity,
        });
    }

    /// Append a fully formed entry
    pub fn push_entry(&mut self, entry: LogEntry) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
            self.evicted += 1;
        }
        self.entries.push_back(entry);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(Severity::Info, text);
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.push(Severity::Warn, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Severity::Error, text);
    }

    /// Entries, oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Most recent entry
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of lines dropped to make room
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Remove every line
    pub fn clear(&mut self) {
        self.entries.clear();
        self.evicted = 0;
    }
}

impl Default for LogRingBuffer {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_LOG_CAPACITY)
    }
}
