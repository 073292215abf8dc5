//! Core data types for the webpipe conversion pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An exact aspect ratio such as 4:3, kept as integer terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// How output dimensions are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ResolutionMode {
    /// Pick a standard width and keep the native aspect ratio
    #[default]
    Automatic,
    /// Requested dimensions, snapped to the nearest configured aspect ratio
    Custom { width: u32, height: u32 },
}

/// A successfully converted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Source size on disk in bytes
    pub input_size: u64,
    /// Destination size on disk in bytes
    pub output_size: u64,
    /// Dimensions after orientation correction, before resizing
    pub input_dimensions: Dimensions,
    pub output_dimensions: Dimensions,
}

impl ConvertedFile {
    /// Bytes saved by this conversion. Negative when the output grew.
    pub fn bytes_saved(&self) -> i64 {
        self.input_size as i64 - self.output_size as i64
    }
}

/// Outcome of processing one source file. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TranscodeResult {
    Converted(ConvertedFile),
    /// The resolution chooser declined this image; nothing was written
    Skipped { source: PathBuf },
    Failed { source: PathBuf, error: String },
}

impl TranscodeResult {
    /// Path of the source file this result describes.
    pub fn source(&self) -> &std::path::Path {
        match self {
            TranscodeResult::Converted(file) => &file.source,
            TranscodeResult::Skipped { source } | TranscodeResult::Failed { source, .. } => source,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, TranscodeResult::Converted(_))
    }
}

/// Lifecycle of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    Faulted,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStatus::Idle => "idle",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Faulted => "faulted",
        };
        f.write_str(name)
    }
}

/// Running totals for one batch run (across resumes of the same run).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunTotals {
    pub converted: u64,
    pub skipped: u64,
    pub failed: u64,
    /// Sum of `input_size - output_size`, added as-is (may be negative)
    pub bytes_saved: i64,
}

impl RunTotals {
    /// Fold one result into the totals.
    pub fn record(&mut self, result: &TranscodeResult) {
        match result {
            TranscodeResult::Converted(file) => {
                self.converted += 1;
                self.bytes_saved += file.bytes_saved();
            }
            TranscodeResult::Skipped { .. } => self.skipped += 1,
            TranscodeResult::Failed { .. } => self.failed += 1,
        }
    }

    pub fn processed(&self) -> u64 {
        self.converted + self.skipped + self.failed
    }
}

/// Final summary of a batch run, sent to the observer when the worker stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunReport {
    pub status: RunStatus,
    /// Number of files in the run's fixed file list
    pub total_files: usize,
    /// Resume cursor: index of the next unprocessed file
    pub cursor: usize,
    pub totals: RunTotals,
    /// Fatal error description for faulted runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
