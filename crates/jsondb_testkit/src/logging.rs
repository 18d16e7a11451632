//! A logger that keeps every message for later assertions.

use jsondb_core::{LogLevel, Logger};
use parking_lot::Mutex;
use std::fmt;

/// One captured log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Severity.
    pub level: LogLevel,
    /// Formatted message.
    pub message: String,
}

/// Records every message it receives, at every level.
#[derive(Debug, Default)]
pub struct CapturingLogger {
    lines: Mutex<Vec<LogLine>>,
}

impl CapturingLogger {
    /// Creates an empty logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything captured so far.
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().clone()
    }

    /// Returns the messages captured at `level`.
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|line| line.level == level)
            .map(|line| line.message.clone())
            .collect()
    }

    /// Returns true if any message at `level` contains `needle`.
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.lines
            .lock()
            .iter()
            .any(|line| line.level == level && line.message.contains(needle))
    }

    /// Drops everything captured so far.
    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl Logger for CapturingLogger {
    fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        self.lines.lock().push(LogLine {
            level,
            message: args.to_string(),
        });
    }
}
