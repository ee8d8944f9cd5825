//! Shared helpers for unit tests: synthetic page images.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Encode a flat-colored RGB image as PNG bytes.
///
/// `shade` varies the pixel value so callers can produce distinct content.
pub fn png_bytes(width: u32, height: u32, shade: u8) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([shade, 100, 100]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

/// Write a synthetic PNG page into `dir` and return its path.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32, shade: u8) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, png_bytes(width, height, shade)).unwrap();
    path
}
