//! One source file in, one WebP file out.

use std::path::Path;
use std::time::Instant;

use crate::config::Config;
use crate::error::{PlanError, TranscodeError, TranscodeOutcome};
use crate::types::{ConvertedFile, Dimensions, ResolutionMode, TranscodeResult};

use super::decode::ImageDecoder;
use super::encode::WebpEncoder;
use super::orientation::OrientationNormalizer;
use super::resolution::ResolutionPlanner;

/// Decision returned by a [`ResolutionChooser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionChoice {
    /// Encode at these dimensions
    Use(Dimensions),
    /// Leave this image out; nothing is written
    Skip,
}

/// Injected per-image decision point for interactive runs.
///
/// Called after orientation correction with the oriented dimensions and the
/// planner's candidates (most preferred first). Implementations may block;
/// they run on the worker, never on the observer.
pub trait ResolutionChooser: Send + Sync {
    fn choose(
        &self,
        source: &Path,
        native: Dimensions,
        candidates: &[Dimensions],
    ) -> ResolutionChoice;
}

impl<F> ResolutionChooser for F
where
    F: Fn(&Path, Dimensions, &[Dimensions]) -> ResolutionChoice + Send + Sync,
{
    fn choose(
        &self,
        source: &Path,
        native: Dimensions,
        candidates: &[Dimensions],
    ) -> ResolutionChoice {
        self(source, native, candidates)
    }
}

/// Composes decode → orientation → planning → resize → encode.
pub struct Transcoder {
    planner: ResolutionPlanner,
    encoder: WebpEncoder,
}

impl Transcoder {
    /// Create a transcoder from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            planner: ResolutionPlanner::new(config.resolution.clone()),
            encoder: WebpEncoder::new(config.conversion.resample_filter),
        }
    }

    /// Transcode `source` into `dest`.
    ///
    /// Never fails: every error becomes [`TranscodeResult::Failed`].
    pub fn transcode(
        &self,
        source: &Path,
        dest: &Path,
        mode: ResolutionMode,
        chooser: Option<&dyn ResolutionChooser>,
    ) -> TranscodeResult {
        match self.try_transcode(source, dest, mode, chooser) {
            Ok(Some(converted)) => TranscodeResult::Converted(converted),
            Ok(None) => TranscodeResult::Skipped {
                source: source.to_path_buf(),
            },
            Err(e) => TranscodeResult::Failed {
                source: source.to_path_buf(),
                error: e.to_string(),
            },
        }
    }

    fn try_transcode(
        &self,
        source: &Path,
        dest: &Path,
        mode: ResolutionMode,
        chooser: Option<&dyn ResolutionChooser>,
    ) -> TranscodeOutcome<Option<ConvertedFile>> {
        let start = Instant::now();
        tracing::debug!("Transcoding: {:?}", source);

        let decoded = ImageDecoder::open(source)?;
        tracing::trace!(
            "  Decode: {:?} ({:?}, {})",
            start.elapsed(),
            decoded.format,
            decoded.native
        );

        let image = OrientationNormalizer::normalize(decoded.image, decoded.orientation_tag, source);
        let oriented = Dimensions::new(image.width(), image.height());

        let candidates =
            self.planner
                .candidates(oriented, mode)
                .map_err(|e| TranscodeError::Plan {
                    path: source.to_path_buf(),
                    source: e,
                })?;
        let target = match chooser {
            Some(chooser) => match chooser.choose(source, oriented, &candidates) {
                ResolutionChoice::Use(dims) => dims,
                ResolutionChoice::Skip => {
                    tracing::debug!("Skipped by chooser: {:?}", source);
                    return Ok(None);
                }
            },
            None => *candidates.first().ok_or_else(|| TranscodeError::Plan {
                path: source.to_path_buf(),
                source: PlanError::NoCandidates,
            })?,
        };
        if target.width == 0 || target.height == 0 {
            return Err(TranscodeError::Plan {
                path: source.to_path_buf(),
                source: PlanError::ZeroDimension {
                    width: target.width,
                    height: target.height,
                },
            });
        }

        self.encoder.check_target(target, dest)?;

        let resize_start = Instant::now();
        let resized = self.encoder.resize(image, target);
        tracing::trace!("  Resize: {:?}", resize_start.elapsed());

        let encode_start = Instant::now();
        let output_size = self.encoder.write(&resized, dest)?;
        tracing::trace!("  Encode: {:?}", encode_start.elapsed());

        tracing::debug!(
            "Converted {:?} in {:?} ({} -> {}, {} -> {} bytes)",
            source,
            start.elapsed(),
            oriented,
            target,
            decoded.file_size,
            output_size
        );

        Ok(Some(ConvertedFile {
            source: source.to_path_buf(),
            destination: dest.to_path_buf(),
            input_size: decoded.file_size,
            output_size,
            input_dimensions: oriented,
            output_dimensions: target,
        }))
    }
}
