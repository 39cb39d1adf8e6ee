//! Structured log events emitted by the job subsystem.
//!
//! The core never prints. It hands `{level, message}` pairs to an injected
//! [`LogSink`]; how they are rendered or persisted is the caller's business.

use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Severity of a [`LogEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    /// Upper-case label used by text renderers
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Success => "SUCCESS",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
}

impl LogEvent {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Receiver for core log events.
///
/// Implementations must be cheap and must not block; `emit` is called from the
/// caller's event loop.
pub trait LogSink: Send + Sync {
    fn emit(&self, event: LogEvent);

    fn info(&self, message: &str) {
        self.emit(LogEvent::new(LogLevel::Info, message));
    }

    fn success(&self, message: &str) {
        self.emit(LogEvent::new(LogLevel::Success, message));
    }

    fn warning(&self, message: &str) {
        self.emit(LogEvent::new(LogLevel::Warning, message));
    }

    fn error(&self, message: &str) {
        self.emit(LogEvent::new(LogLevel::Error, message));
    }
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCrateSink;

impl LogSink for LogCrateSink {
    fn emit(&self, event: LogEvent) {
        match event.level {
            LogLevel::Info => log::info!("{}", event.message),
            LogLevel::Success => log::info!("✓ {}", event.message),
            LogLevel::Warning => log::warn!("{}", event.message),
            LogLevel::Error => log::error!("{}", event.message),
        }
    }
}

/// Collects events in memory.
///
/// Clones share the same buffer, so a test can keep one clone and hand the
/// other to a [`JobRunner`](super::JobRunner).
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn events(&self) -> Vec<LogEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Events of one level, in emission order
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, event: LogEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
