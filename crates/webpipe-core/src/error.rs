//! Error types for the webpipe conversion pipeline.
//!
//! Errors are organized by stage. Per-file errors ([`TranscodeError`]) never
//! leave the pipeline: they are turned into `TranscodeResult::Failed` records.
//! Run-level errors ([`DirectoryError`]) end the whole run.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for webpipe operations.
#[derive(Error, Debug)]
pub enum WebpipeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input or output directory could not be used
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Persisted state could not be written
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Session lifecycle errors (busy, nothing to resume)
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Persisted state errors.
///
/// Only surfaced when saving. Loading falls back to defaults instead.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to access state file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed state file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Run-level directory failures. Any of these faults the whole run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// Input directory does not exist or is not a directory
    #[error("Input directory not found: {0}")]
    InputMissing(PathBuf),

    /// Input directory exists but cannot be listed
    #[error("Cannot list input directory {path}: {message}")]
    InputUnreadable { path: PathBuf, message: String },

    /// Output directory cannot be created
    #[error("Cannot create output directory {path}: {message}")]
    OutputUncreatable { path: PathBuf, message: String },
}

/// Resolution planning failures for a single image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A zero width or height makes the aspect ratio undefined
    #[error("Invalid dimensions {width}x{height}: aspect ratio is undefined")]
    ZeroDimension { width: u32, height: u32 },

    /// No standard widths or aspect ratios are configured
    #[error("No resolution candidates configured")]
    NoCandidates,
}

/// Per-file transcode failures, organized by stage.
#[derive(Error, Debug)]
pub enum TranscodeError {
    /// Source file unreadable or not a decodable image
    #[error("Error opening {path}: {message}")]
    Open { path: PathBuf, message: String },

    /// No output resolution could be planned
    #[error("Cannot plan resolution for {path}: {source}")]
    Plan {
        path: PathBuf,
        #[source]
        source: PlanError,
    },

    /// Resize or write failed
    #[error("Error resizing or saving {path}: {message}")]
    Encode { path: PathBuf, message: String },
}

/// Errors from the single-worker conversion session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A run is already active; concurrent runs are rejected, not queued
    #[error("A conversion run is already active")]
    AlreadyRunning,

    /// `resume` was called without a cancelled run to continue
    #[error("No cancelled run to resume")]
    NothingToResume,

    /// The worker task ended abnormally
    #[error("Conversion worker failed: {0}")]
    Worker(String),
}

/// Convenience type alias for webpipe results.
pub type Result<T> = std::result::Result<T, WebpipeError>;

/// Convenience type alias for per-file transcode results.
pub type TranscodeOutcome<T> = std::result::Result<T, TranscodeError>;
