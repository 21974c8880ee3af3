//! Debug logging capability for the compiler pipeline.
//!
//! Compilation is pure by default; callers opt into diagnostics by passing
//! a sink to [`crate::compile_with`].

use std::fmt;

use parking_lot::Mutex;

/// Severity of a debug entry, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    fn label(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Receiver for pipeline diagnostics.
pub trait DebugSink {
    fn log(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}

/// Discards everything. The default sink.
pub struct NoopSink;

impl DebugSink for NoopSink {
    fn log(&self, _level: Level, _message: &str) {}
}

/// Writes entries at or above a minimum level to stderr.
pub struct StderrSink {
    min_level: Level,
}

impl StderrSink {
    pub fn new(min_level: Level) -> Self {
        Self { min_level }
    }
}

impl DebugSink for StderrSink {
    fn log(&self, level: Level, message: &str) {
        if level >= self.min_level {
            eprintln!("[blockscript] {level}: {message}");
        }
    }
}

/// Buffers entries in memory so callers can inspect what was logged.
#[derive(Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.lock().clone()
    }
}

impl DebugSink for MemorySink {
    fn log(&self, level: Level, message: &str) {
        self.entries.lock().push((level, message.to_string()));
    }
}
