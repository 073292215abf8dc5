//! Source image loading with content-based format detection.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::error::TranscodeError;
use crate::types::Dimensions;

use super::orientation::OrientationNormalizer;

/// A decoded source file, referenced transiently while it is transcoded.
pub struct SourceImage {
    /// Decoded pixels, still in stored orientation
    pub image: DynamicImage,
    /// Detected container format
    pub format: ImageFormat,
    /// Stored (pre-orientation) dimensions
    pub native: Dimensions,
    /// Raw EXIF orientation tag, if present
    pub orientation_tag: Option<u32>,
    /// Size on disk in bytes
    pub file_size: u64,
}

/// Loads source images. Every failure maps to [`TranscodeError::Open`].
pub struct ImageDecoder;

impl ImageDecoder {
    /// Read and decode `path`.
    ///
    /// The file is read once; the same bytes feed both the EXIF reader and
    /// the decoder.
    pub fn open(path: &Path) -> Result<SourceImage, TranscodeError> {
        let bytes = std::fs::read(path).map_err(|e| TranscodeError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::decode_bytes(bytes, path)
    }

    /// Decode an in-memory copy of `path`.
    pub fn decode_bytes(bytes: Vec<u8>, path: &Path) -> Result<SourceImage, TranscodeError> {
        let file_size = bytes.len() as u64;
        let orientation_tag = OrientationNormalizer::read_tag(&bytes, path);

        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| TranscodeError::Open {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = reader.format().ok_or_else(|| TranscodeError::Open {
            path: path.to_path_buf(),
            message: "Unrecognized image format".to_string(),
        })?;
        let image = reader.decode().map_err(|e| TranscodeError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        Ok(SourceImage {
            image,
            format,
            native: Dimensions::new(width, height),
            orientation_tag,
            file_size,
        })
    }
}
