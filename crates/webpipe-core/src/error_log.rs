//! Append-only failure log.
//!
//! Receives every per-file failure and every fatal run failure, one line per
//! entry: `2024-05-01 12:00:00,123 - ERROR - message`. Successes never reach
//! it. Each entry is also emitted as a `tracing` event, so a disabled log still
//! shows up in diagnostics.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Severity tag of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// One file failed; the run continued
    Error,
    /// The whole run faulted
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("ERROR"),
            Severity::Critical => f.write_str("CRITICAL"),
        }
    }
}

/// Timestamped, severity-tagged error log file.
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    path: Option<PathBuf>,
}

impl ErrorLog {
    /// Log to the file at `path`, created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A log that only emits `tracing` events.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record a per-file failure.
    pub fn error(&self, message: &str) {
        tracing::error!("{}", message);
        self.append(Severity::Error, message);
    }

    /// Record a fatal run failure.
    pub fn critical(&self, message: &str) {
        tracing::error!(fatal = true, "{}", message);
        self.append(Severity::Critical, message);
    }

    fn append(&self, severity: Severity, message: &str) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = Self::write_line(path, severity, message) {
            tracing::warn!("Failed to write error log {:?}: {}", path, e);
        }
    }

    fn write_line(path: &Path, severity: Severity, message: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f");
        // Keep one entry per line even if the message spans several.
        let message = message.replace('\n', " ");
        writeln!(file, "{timestamp} - {severity} - {message}")
    }
}
