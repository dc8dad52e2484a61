//! Append-only, user-viewable processing log.
//!
//! Every entry is also forwarded to `tracing`, so `RUST_LOG` shows the same
//! events on stderr.

use chrono::{DateTime, Local};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:<5} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.level.label(),
            self.message
        )
    }
}

#[derive(Debug, Default)]
pub struct ProcessLog {
    entries: Vec<LogEntry>,
}

impl ProcessLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Warn => tracing::warn!("{message}"),
            LogLevel::Error => tracing::error!("{message}"),
        }
        self.entries.push(LogEntry {
            timestamp: Local::now(),
            level,
            message,
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(LogLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.record(LogLevel::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.record(LogLevel::Error, message);
    }

    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
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

    #[must_use]
    pub fn count(&self, level: LogLevel) -> usize {
        self.entries.iter().filter(|e| e.level == level).count()
    }

    /// Plain-text transcript, one entry per line.
    #[must_use]
    pub fn transcript(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{entry}\n"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_in_order_with_levels() {
        let mut log = ProcessLog::new();
        log.info("opened model");
        log.warn("no materials for #12");
        log.error("element #13 failed");

        assert_eq!(log.len(), 3);
        assert_eq!(log.count(LogLevel::Warn), 1);
        let transcript = log.transcript();
        let lines: Vec<&str> = transcript.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("INFO  opened model"));
        assert!(lines[2].contains("ERROR element #13 failed"));
        assert!(lines[1].starts_with('['));
    }
}
