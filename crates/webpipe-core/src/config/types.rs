//! Sub-configuration structs with their defaults.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::types::AspectRatio;

/// File locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// JSON document holding last directories and lifetime counters
    pub state_file: String,

    /// Append-only error log. Empty string disables the file.
    pub error_log: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            state_file: "~/.webpipe/state.json".to_string(),
            error_log: "~/.webpipe/errors.log".to_string(),
        }
    }
}

/// Source/target formats and resampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Extension of eligible source files, matched case-sensitively
    pub source_extension: String,

    /// Extension substituted for the destination file
    pub target_extension: String,

    /// Resampling filter used for resizing
    pub resample_filter: ResampleFilter,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            source_extension: "jpg".to_string(),
            target_extension: "webp".to_string(),
            resample_filter: ResampleFilter::Lanczos3,
        }
    }
}

/// Resampling filters exposed through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl ResampleFilter {
    /// Map to the image crate's filter type.
    pub fn filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Resolution planning tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Automatic-mode widths in order of preference. The first one is used
    /// for unattended runs; all are offered to an interactive chooser.
    pub standard_widths: Vec<u32>,

    /// Ratios custom dimensions snap to. Ties go to the earlier entry.
    pub aspect_ratios: Vec<AspectRatio>,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            standard_widths: vec![1920, 1440, 1280],
            aspect_ratios: vec![AspectRatio::new(4, 3), AspectRatio::new(16, 9)],
        }
    }
}

/// Worker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Capacity of the worker → observer event channel
    pub event_buffer: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { event_buffer: 64 }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
