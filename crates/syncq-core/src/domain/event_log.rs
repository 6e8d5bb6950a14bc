//! Bounded event log: a fixed-capacity, newest-first record of recent events.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of entries kept for the presentation layer.
pub const DEFAULT_LOG_CAPACITY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogKind::Info => "info",
            LogKind::Success => "success",
            LogKind::Warning => "warning",
            LogKind::Error => "error",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub kind: LogKind,
    pub message: String,
}

/// Ring buffer of [`LogEntry`].
///
/// The front of the deque is the newest entry; eviction pops from the back.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert as newest; returns how many old entries were evicted.
    pub fn push(&mut self, entry: LogEntry) -> usize {
        self.entries.push_front(entry);
        let mut evicted = 0;
        while self.entries.len() > self.capacity {
            self.entries.pop_back();
            evicted += 1;
        }
        evicted
    }

    /// Newest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
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
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(n: u32) -> LogEntry {
        LogEntry {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, n).unwrap(),
            kind: LogKind::Info,
            message: format!("event {n}"),
        }
    }

    #[test]
    fn keeps_newest_first() {
        let mut log = EventLog::new(3);
        log.push(entry(1));
        log.push(entry(2));

        let messages: Vec<_> = log.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["event 2", "event 1"]);
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut log = EventLog::new(10);
        let mut evicted = 0;
        for n in 0..13 {
            evicted += log.push(entry(n));
        }

        assert_eq!(evicted, 3);
        assert_eq!(log.len(), log.capacity());
        let messages: Vec<_> = log.entries().map(|e| e.message.clone()).collect();
        let expected: Vec<_> = (3..13).rev().map(|n| format!("event {n}")).collect();
        assert_eq!(messages, expected);
    }
}
