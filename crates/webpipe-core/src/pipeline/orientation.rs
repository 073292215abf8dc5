//! EXIF orientation correction.
//!
//! Cameras store rotation and mirroring as an orientation tag (1-8) instead of
//! rewriting pixels. Decoders ignore it, so the transform is applied here
//! before any resolution planning.

use exif::{In, Reader, Tag};
use image::DynamicImage;
use std::io::Cursor;
use std::path::Path;

/// Orientation tag values (EXIF 0x0112).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// 1: stored upright
    Normal,
    /// 2
    MirrorHorizontal,
    /// 3
    Rotate180,
    /// 4
    Rotate180Mirror,
    /// 5
    Rotate90Mirror,
    /// 6
    Rotate90,
    /// 7
    Rotate270Mirror,
    /// 8
    Rotate270,
}

impl Orientation {
    /// Parse a raw tag value. Values outside 1-8 yield `None`.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            1 => Some(Self::Normal),
            2 => Some(Self::MirrorHorizontal),
            3 => Some(Self::Rotate180),
            4 => Some(Self::Rotate180Mirror),
            5 => Some(Self::Rotate90Mirror),
            6 => Some(Self::Rotate90),
            7 => Some(Self::Rotate270Mirror),
            8 => Some(Self::Rotate270),
            _ => None,
        }
    }

    /// Transform `image` into canonical (upright, unmirrored) orientation.
    ///
    /// Rotations are clockwise; `rotate270` is a 90° counter-clockwise turn.
    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            Self::Normal => image,
            Self::MirrorHorizontal => image.fliph(),
            Self::Rotate180 => image.rotate180(),
            Self::Rotate180Mirror => image.rotate180().fliph(),
            Self::Rotate90Mirror => image.rotate90().fliph(),
            Self::Rotate90 => image.rotate90(),
            Self::Rotate270Mirror => image.rotate270().fliph(),
            Self::Rotate270 => image.rotate270(),
        }
    }
}

/// Reads orientation metadata and returns canonically-oriented images.
///
/// Metadata problems are never fatal: the image is returned unchanged and
/// the problem is logged.
pub struct OrientationNormalizer;

impl OrientationNormalizer {
    /// Read the raw orientation tag from an encoded image container.
    ///
    /// Returns `None` when there is no EXIF block, no orientation field, or
    /// the metadata cannot be parsed.
    pub fn read_tag(encoded: &[u8], path: &Path) -> Option<u32> {
        let mut cursor = Cursor::new(encoded);
        let exif = match Reader::new().read_from_container(&mut cursor) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_)) => {
                tracing::trace!("No EXIF block in {:?}", path);
                return None;
            }
            Err(e) => {
                tracing::warn!("Unreadable EXIF metadata in {:?}: {}", path, e);
                return None;
            }
        };

        let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
        let tag = field.value.get_uint(0);
        if tag.is_none() {
            tracing::warn!(
                "Orientation field in {:?} has unexpected type: {:?}",
                path,
                field.value
            );
        }
        tag
    }

    /// Orientation for a raw tag. Absent or out-of-range tags mean no change.
    pub fn orientation(tag: Option<u32>, path: &Path) -> Orientation {
        match tag {
            None => Orientation::Normal,
            Some(tag) => Orientation::from_tag(tag).unwrap_or_else(|| {
                tracing::warn!("Ignoring out-of-range orientation tag {} in {:?}", tag, path);
                Orientation::Normal
            }),
        }
    }

    /// Return `image` in canonical orientation for the given raw tag.
    pub fn normalize(image: DynamicImage, tag: Option<u32>, path: &Path) -> DynamicImage {
        let orientation = Self::orientation(tag, path);
        if orientation != Orientation::Normal {
            tracing::debug!("Applying orientation {:?} to {:?}", orientation, path);
        }
        orientation.apply(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{jpeg_bytes, with_orientation};
    use image::{GenericImageView, Rgba, RgbaImage};

    /// 3x2 image with a distinct colour per pixel:
    ///
    /// ```text
    /// a b c
    /// d e f
    /// ```
    fn labelled() -> DynamicImage {
        let mut img = RgbaImage::new(3, 2);
        for (i, (x, y)) in [(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]
            .into_iter()
            .enumerate()
        {
            img.put_pixel(x, y, Rgba([i as u8 * 40, 0, 0, 255]));
        }
        DynamicImage::ImageRgba8(img)
    }

    fn label(img: &DynamicImage, x: u32, y: u32) -> u8 {
        img.get_pixel(x, y).0[0] / 40
    }

    /// Rows of labels (0=a .. 5=f) for compact assertions.
    fn grid(img: &DynamicImage) -> Vec<Vec<u8>> {
        (0..img.height())
            .map(|y| (0..img.width()).map(|x| label(img, x, y)).collect())
            .collect()
    }

    #[test]
    fn test_from_tag_range() {
        assert_eq!(Orientation::from_tag(1), Some(Orientation::Normal));
        assert_eq!(Orientation::from_tag(8), Some(Orientation::Rotate270));
        assert_eq!(Orientation::from_tag(0), None);
        assert_eq!(Orientation::from_tag(9), None);
    }

    #[test]
    fn test_normal_is_identity() {
        let img = labelled();
        let out = Orientation::Normal.apply(img.clone());
        assert_eq!(out.as_bytes(), img.as_bytes());
    }

    #[test]
    fn test_each_tag_transform() {
        let cases: [(u32, Vec<Vec<u8>>); 7] = [
            // mirror horizontally
            (2, vec![vec![2, 1, 0], vec![5, 4, 3]]),
            // rotate 180
            (3, vec![vec![5, 4, 3], vec![2, 1, 0]]),
            // rotate 180 then mirror
            (4, vec![vec![3, 4, 5], vec![0, 1, 2]]),
            // rotate 90 cw then mirror (transpose)
            (5, vec![vec![0, 3], vec![1, 4], vec![2, 5]]),
            // rotate 90 cw
            (6, vec![vec![3, 0], vec![4, 1], vec![5, 2]]),
            // rotate 90 ccw then mirror (transverse)
            (7, vec![vec![5, 2], vec![4, 1], vec![3, 0]]),
            // rotate 90 ccw
            (8, vec![vec![2, 5], vec![1, 4], vec![0, 3]]),
        ];

        for (tag, expected) in cases {
            let orientation = Orientation::from_tag(tag).unwrap();
            let out = orientation.apply(labelled());
            assert_eq!(grid(&out), expected, "tag {tag}");
            assert_eq!(out.dimensions() == (2, 3), tag >= 5, "tag {tag}");
        }
    }

    #[test]
    fn test_read_tag_from_exif_segment() {
        let path = Path::new("rotated.jpg");
        let bytes = with_orientation(&jpeg_bytes(30, 20), 6);
        let tag = OrientationNormalizer::read_tag(&bytes, path);
        assert_eq!(tag, Some(6));
        assert_eq!(
            OrientationNormalizer::orientation(tag, path),
            Orientation::Rotate90
        );
    }

    #[test]
    fn test_missing_metadata_is_no_change() {
        let path = Path::new("plain.jpg");
        let bytes = jpeg_bytes(30, 20);
        let tag = OrientationNormalizer::read_tag(&bytes, path);
        assert_eq!(tag, None);

        let img = labelled();
        let out = OrientationNormalizer::normalize(img.clone(), tag, path);
        assert_eq!(out.as_bytes(), img.as_bytes());
    }

    #[test]
    fn test_garbage_metadata_is_no_change() {
        let path = Path::new("garbage.jpg");
        let tag = OrientationNormalizer::read_tag(b"not an image at all", path);
        assert_eq!(tag, None);

        let img = labelled();
        let out = OrientationNormalizer::normalize(img.clone(), tag, path);
        assert_eq!(out.as_bytes(), img.as_bytes());
    }

    #[test]
    fn test_out_of_range_tag_is_no_change() {
        let path = Path::new("odd.jpg");
        let bytes = with_orientation(&jpeg_bytes(30, 20), 9);
        let tag = OrientationNormalizer::read_tag(&bytes, path);
        assert_eq!(tag, Some(9));
        assert_eq!(
            OrientationNormalizer::orientation(tag, path),
            Orientation::Normal
        );
    }

    #[test]
    fn test_normalize_rotates_decoded_jpeg() {
        let path = Path::new("portrait.jpg");
        let bytes = with_orientation(&jpeg_bytes(30, 20), 8);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (30, 20));

        let tag = OrientationNormalizer::read_tag(&bytes, path);
        let out = OrientationNormalizer::normalize(decoded, tag, path);
        assert_eq!(out.dimensions(), (20, 30));
    }
}
