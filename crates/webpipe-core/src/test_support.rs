//! Fixture builders shared by unit tests.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Encode a gradient RGB image of the given size as JPEG.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, ImageFormat::Jpeg)
        .unwrap();
    buffer.into_inner()
}

/// Insert an EXIF APP1 segment carrying only an orientation tag right after
/// the JPEG SOI marker.
pub fn with_orientation(jpeg: &[u8], tag: u16) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG");

    let [hi, lo] = tag.to_be_bytes();
    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&[
        b'M', b'M', 0x00, 0x2A, // big-endian TIFF header
        0x00, 0x00, 0x00, 0x08, // IFD0 offset
        0x00, 0x01, // one entry
        0x01, 0x12, // Orientation
        0x00, 0x03, // SHORT
        0x00, 0x00, 0x00, 0x01, // count
        hi, lo, 0x00, 0x00, // value, padded
        0x00, 0x00, 0x00, 0x00, // no next IFD
    ]);

    let len = (payload.len() + 2) as u16;
    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Write a generated JPEG into `dir` and return its path.
pub fn write_jpeg(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, jpeg_bytes(width, height)).unwrap();
    path
}

/// Write a file with a JPEG extension whose header is garbage.
pub fn write_corrupt_jpeg(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"\x00\x01\x02 definitely not a jpeg").unwrap();
    path
}
