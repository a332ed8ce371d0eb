//! Append-only message log, the audit sink for every economic mutation.

use serde::{Deserialize, Serialize};

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl MessageLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// One log line with its timestamp and source tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub ts: String,
    pub level: MessageLevel,
    pub tag: String,
    pub text: String,
}

/// Bounded in-state log. Oldest entries are dropped once the capacity
/// is reached; the log never fails an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageLog {
    entries: Vec<Message>,
    capacity: usize,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::with_capacity(500)
    }
}

impl MessageLog {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, ts: &str, level: MessageLevel, tag: &str, text: &str) {
        if self.entries.len() >= self.capacity {
            self.entries.remove(0);
        }
        self.entries.push(Message {
            ts: ts.to_string(),
            level,
            tag: tag.to_string(),
            text: text.to_string(),
        });
    }

    pub fn info(&mut self, ts: &str, tag: &str, text: &str) {
        self.push(ts, MessageLevel::Info, tag, text);
    }

    pub fn warn(&mut self, ts: &str, tag: &str, text: &str) {
        self.push(ts, MessageLevel::Warn, tag, text);
    }

    pub fn error(&mut self, ts: &str, tag: &str, text: &str) {
        self.push(ts, MessageLevel::Error, tag, text);
    }

    pub fn debug(&mut self, ts: &str, tag: &str, text: &str) {
        self.push(ts, MessageLevel::Debug, tag, text);
    }

    #[must_use]
    pub fn entries(&self) -> &[Message] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_drops_oldest() {
        let mut log = MessageLog::with_capacity(3);
        for i in 0..5 {
            log.info("2025-01-01", "test", &format!("line {i}"));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.entries()[0].text, "line 2");
        assert_eq!(log.entries()[2].text, "line 4");
    }

    #[test]
    fn levels_tagged() {
        let mut log = MessageLog::default();
        log.warn("2025-01-01", "bank", "overdraft near");
        assert_eq!(log.entries()[0].level, MessageLevel::Warn);
        assert_eq!(log.entries()[0].tag, "bank");
        assert_eq!(MessageLevel::Warn.as_str(), "warn");
    }
}
