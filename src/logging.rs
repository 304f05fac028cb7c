//! Logging capability and subscriber setup
//!
//! The request executor and pager never talk to a global logger directly.
//! They hold an `Arc<dyn Logger>`; production code passes a [`TracingLogger`],
//! tests pass a [`MemoryLogger`] and inspect what was emitted.

use crate::error::{Error, Result};
use crate::types::LogLevel;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Diagnostic sink injected into the core components
///
/// `label` names the operation that produced the line (`execute`,
/// `fetch_all`, ...).
pub trait Logger: Send + Sync {
    /// Emit one line at the given level
    fn log(&self, level: LogLevel, label: &str, message: &str);

    fn debug(&self, label: &str, message: &str) {
        self.log(LogLevel::Debug, label, message);
    }

    fn info(&self, label: &str, message: &str) {
        self.log(LogLevel::Info, label, message);
    }

    fn warn(&self, label: &str, message: &str) {
        self.log(LogLevel::Warn, label, message);
    }

    fn error(&self, label: &str, message: &str) {
        self.log(LogLevel::Error, label, message);
    }
}

/// Logger that forwards to the `tracing` macros
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    /// Shared handle suitable for injection
    pub fn shared() -> Arc<dyn Logger> {
        Arc::new(Self)
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, label: &str, message: &str) {
        match level {
            LogLevel::Trace => tracing::trace!(label = %label, "{message}"),
            LogLevel::Debug => tracing::debug!(label = %label, "{message}"),
            LogLevel::Info => tracing::info!(label = %label, "{message}"),
            LogLevel::Warn => tracing::warn!(label = %label, "{message}"),
            LogLevel::Error => tracing::error!(label = %label, "{message}"),
        }
    }
}

/// One captured log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    pub label: String,
    pub message: String,
}

/// Logger that keeps every line in memory
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<LogLine>>,
}

impl MemoryLogger {
    /// Create an empty logger
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured lines
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Number of lines captured at `level`
    pub fn count(&self, level: LogLevel) -> usize {
        self.lines().iter().filter(|l| l.level == level).count()
    }

    /// Whether any line at `level` contains `needle`
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.lines()
            .iter()
            .any(|l| l.level == level && l.message.contains(needle))
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: LogLevel, label: &str, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(LogLine {
                level,
                label: label.to_string(),
                message: message.to_string(),
            });
        }
    }
}

/// Install the global `tracing` subscriber
///
/// Logs go to stderr and, when `log_file` is given, to that file as well
/// (truncated first). `RUST_LOG` takes precedence over `level`.
pub fn init(level: LogLevel, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::from(level).into())
        .from_env_lossy();

    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::config(format!("Failed to initialize logging: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_logger_records_lines() {
        let logger = MemoryLogger::new();
        logger.debug("execute", "Request URI: /a");
        logger.warn("execute", "attempt 1 failed");
        logger.warn("execute", "attempt 2 failed");

        assert_eq!(logger.lines().len(), 3);
        assert_eq!(logger.count(LogLevel::Warn), 2);
        assert!(logger.contains(LogLevel::Debug, "Request URI"));
        assert!(!logger.contains(LogLevel::Error, "Request URI"));
        assert_eq!(logger.lines()[0].label, "execute");
    }

    #[test]
    fn test_tracing_logger_without_subscriber() {
        // No subscriber installed: must be a no-op, not a panic
        let logger = TracingLogger::shared();
        logger.info("test", "hello");
        logger.error("test", "bye");
    }
}
