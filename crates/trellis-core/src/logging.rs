//! Structured logging for configuration-time diagnostics.
//!
//! The multiplexer records registration and dispatch events through a
//! [`Logger`] handle. Entries land in a bounded in-memory buffer that tests
//! and diagnostics can inspect; optionally they are mirrored to stderr.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Fine-grained diagnostics.
    Debug,
    /// Normal operational events.
    Info,
    /// Something surprising but recoverable.
    Warn,
    /// A failure.
    Error,
}

impl LogLevel {
    /// The level's display name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Severity.
    pub level: LogLevel,
    /// The subsystem that produced the entry.
    pub target: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.target, self.message)
    }
}

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug)]
struct Shared {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
    mirror_to_stderr: bool,
}

/// A cheap-to-clone logging handle.
///
/// Clones share one buffer; a multiplexer and its sub-routers log into the
/// same place.
#[derive(Debug, Clone)]
pub struct Logger {
    shared: Arc<Shared>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Creates a logger with the default buffer capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a logger keeping at most `capacity` entries; the oldest are
    /// dropped first.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                entries: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY))),
                capacity,
                mirror_to_stderr: false,
            }),
        }
    }

    /// Creates a logger that also writes each entry to stderr.
    #[must_use]
    pub fn with_stderr() -> Self {
        Self {
            shared: Arc::new(Shared {
                entries: Mutex::new(VecDeque::new()),
                capacity: DEFAULT_CAPACITY,
                mirror_to_stderr: true,
            }),
        }
    }

    /// Records an entry.
    pub fn log(&self, level: LogLevel, target: &'static str, message: impl Into<String>) {
        let entry = LogEntry {
            level,
            target,
            message: message.into(),
        };
        if self.shared.mirror_to_stderr {
            eprintln!("{entry}");
        }
        let mut entries = self.shared.entries.lock();
        if entries.len() == self.shared.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Records a debug entry.
    pub fn debug(&self, target: &'static str, message: impl Into<String>) {
        self.log(LogLevel::Debug, target, message);
    }

    /// Records an info entry.
    pub fn info(&self, target: &'static str, message: impl Into<String>) {
        self.log(LogLevel::Info, target, message);
    }

    /// Records a warning.
    pub fn warn(&self, target: &'static str, message: impl Into<String>) {
        self.log(LogLevel::Warn, target, message);
    }

    /// Records an error.
    pub fn error(&self, target: &'static str, message: impl Into<String>) {
        self.log(LogLevel::Error, target, message);
    }

    /// Snapshots the buffered entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.shared.entries.lock().iter().cloned().collect()
    }

    /// Drops all buffered entries.
    pub fn clear(&self) {
        self.shared.entries.lock().clear();
    }
}
