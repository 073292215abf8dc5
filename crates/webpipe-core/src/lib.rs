//! Webpipe Core - resumable batch JPEG → WebP conversion.
//!
//! Every eligible file in an input directory is decoded, rotated upright
//! according to its EXIF orientation, resized to a planned resolution and
//! written as WebP into an output directory.
//!
//! # Architecture
//!
//! ```text
//! Directory → Discover → Decode → Orient → Plan → Resize → Encode WebP
//!                                   ▲
//!                       optional per-image chooser
//! ```
//!
//! A [`ConversionSession`] runs one batch at a time on a background worker,
//! reports progress as [`BatchEvent`]s, and keeps a cancelled run around so
//! it can be resumed where it stopped.
//!
//! # Usage
//!
//! ```rust,ignore
//! use webpipe_core::{BatchRequest, Config, ConversionSession};
//!
//! #[tokio::main]
//! async fn main() -> webpipe_core::Result<()> {
//!     let session = ConversionSession::new(Config::load()?);
//!     let handle = session.start(BatchRequest::new("./photos", "./webp"), None)?;
//!     let report = handle.wait().await?;
//!     println!("Converted {} files", report.totals.converted);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod error_log;
pub mod output;
pub mod pipeline;
pub mod session;
pub mod state;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenient access
pub use config::Config;
pub use error::{
    ConfigError, DirectoryError, PlanError, Result, SessionError, StateError, TranscodeError,
    WebpipeError,
};
pub use error_log::ErrorLog;
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{
    BatchEvent, BatchPipeline, BatchRequest, CancelFlag, ResolutionChoice, ResolutionChooser,
    ResolutionPlanner, Transcoder,
};
pub use session::{ConversionSession, PausedRun, RunHandle, SharedChooser};
pub use state::{AppState, StateStore};
pub use types::{
    AspectRatio, ConvertedFile, Dimensions, ResolutionMode, RunReport, RunStatus, RunTotals,
    TranscodeResult,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
