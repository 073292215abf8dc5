//! Resampling and WebP encoding.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::config::ResampleFilter;
use crate::error::TranscodeError;
use crate::types::Dimensions;

/// Largest width or height a WebP image can carry.
pub const MAX_WEBP_DIMENSION: u32 = 16383;

/// Resizes images and writes them as WebP.
pub struct WebpEncoder {
    filter: ResampleFilter,
}

impl WebpEncoder {
    /// Create an encoder using the given resampling filter.
    pub fn new(filter: ResampleFilter) -> Self {
        Self { filter }
    }

    /// Reject targets the WebP format cannot hold, before any pixels are
    /// allocated for them.
    pub fn check_target(&self, target: Dimensions, dest: &Path) -> Result<(), TranscodeError> {
        if target.width > MAX_WEBP_DIMENSION || target.height > MAX_WEBP_DIMENSION {
            return Err(TranscodeError::Encode {
                path: dest.to_path_buf(),
                message: format!(
                    "target {target} exceeds the WebP limit of {MAX_WEBP_DIMENSION} pixels per side"
                ),
            });
        }
        Ok(())
    }

    /// Resample to exactly `target`. A no-op when the size already matches.
    pub fn resize(&self, image: DynamicImage, target: Dimensions) -> DynamicImage {
        if image.dimensions() == (target.width, target.height) {
            return image;
        }
        image.resize_exact(target.width, target.height, self.filter.filter_type())
    }

    /// Encode `image` to `dest`, replacing any existing file.
    ///
    /// Returns the number of bytes written.
    pub fn write(&self, image: &DynamicImage, dest: &Path) -> Result<u64, TranscodeError> {
        let encode_err = |message: String| TranscodeError::Encode {
            path: dest.to_path_buf(),
            message,
        };

        // The WebP encoder only takes 8-bit RGB(A).
        let converted;
        let image = match image {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => image,
            other if other.color().has_alpha() => {
                converted = DynamicImage::ImageRgba8(other.to_rgba8());
                &converted
            }
            other => {
                converted = DynamicImage::ImageRgb8(other.to_rgb8());
                &converted
            }
        };

        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, ImageFormat::WebP)
            .map_err(|e| encode_err(e.to_string()))?;
        let bytes = buffer.into_inner();

        // Existing output is only replaced once the new file is complete.
        let tmp = dest.with_extension("webp.tmp");
        if let Err(e) = std::fs::write(&tmp, &bytes) {
            let _ = std::fs::remove_file(&tmp);
            return Err(encode_err(e.to_string()));
        }
        if let Err(e) = std::fs::rename(&tmp, dest) {
            let _ = std::fs::remove_file(&tmp);
            return Err(encode_err(e.to_string()));
        }

        Ok(bytes.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_exact_dimensions() {
        let encoder = WebpEncoder::new(ResampleFilter::Lanczos3);
        let img = DynamicImage::new_rgb8(300, 200);
        let out = encoder.resize(img, Dimensions::new(48, 32));
        assert_eq!(out.dimensions(), (48, 32));
    }

    #[test]
    fn test_write_produces_webp() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.webp");
        let encoder = WebpEncoder::new(ResampleFilter::Triangle);

        let size = encoder.write(&DynamicImage::new_rgb8(64, 64), &dest).unwrap();
        let bytes = std::fs::read(&dest).unwrap();
        assert_eq!(size, bytes.len() as u64);
        // WebP files start with "RIFF"
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
    }

    #[test]
    fn test_write_converts_grayscale() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("gray.webp");
        let encoder = WebpEncoder::new(ResampleFilter::Lanczos3);

        encoder
            .write(&DynamicImage::new_luma8(16, 16), &dest)
            .unwrap();
        let decoded = image::open(&dest).unwrap();
        assert_eq!(decoded.dimensions(), (16, 16));
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("existing.webp");
        std::fs::write(&dest, vec![0u8; 100_000]).unwrap();

        let encoder = WebpEncoder::new(ResampleFilter::Lanczos3);
        let size = encoder.write(&DynamicImage::new_rgb8(8, 8), &dest).unwrap();
        assert!(size < 100_000);
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), size);
    }

    #[test]
    fn test_failed_encode_keeps_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("tall.webp");
        std::fs::write(&dest, b"previous good output").unwrap();

        let encoder = WebpEncoder::new(ResampleFilter::Triangle);
        let too_tall = DynamicImage::new_rgb8(2, 20_000);
        let err = encoder.write(&too_tall, &dest).unwrap_err();

        assert!(matches!(err, TranscodeError::Encode { .. }));
        assert_eq!(std::fs::read(&dest).unwrap(), b"previous good output");
        assert!(!dir.path().join("tall.webp.tmp").exists());
    }

    #[test]
    fn test_check_target_rejects_oversize() {
        let encoder = WebpEncoder::new(ResampleFilter::Triangle);
        let dest = Path::new("out.webp");

        assert!(encoder
            .check_target(Dimensions::new(MAX_WEBP_DIMENSION, MAX_WEBP_DIMENSION), dest)
            .is_ok());
        let err = encoder
            .check_target(Dimensions::new(1920, 125_827_200), dest)
            .unwrap_err();
        assert!(err.to_string().contains("WebP limit"));
        assert!(encoder
            .check_target(Dimensions::new(MAX_WEBP_DIMENSION + 1, 10), dest)
            .is_err());
    }

    #[test]
    fn test_write_into_missing_directory_is_encode_error() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing").join("out.webp");
        let encoder = WebpEncoder::new(ResampleFilter::Lanczos3);

        let err = encoder
            .write(&DynamicImage::new_rgb8(8, 8), &dest)
            .unwrap_err();
        assert!(matches!(err, TranscodeError::Encode { .. }));
    }
}
