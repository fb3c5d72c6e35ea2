//! Shared test utilities for the batch-resize test suite.
//!
//! Synthetic images are generated in memory from a fixed-seed noise source,
//! so every run sees identical bytes and no fixture files are needed. Noise
//! compresses poorly, which makes encoded sizes large enough to exercise the
//! size search.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let photo = write_test_jpeg(tmp.path(), "photo.jpg", 400, 300);
//! let icon = write_test_png(tmp.path(), "icon.png", 64, 64);
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

// =========================================================================
// In-memory images
// =========================================================================

/// Deterministic RGB noise (xorshift32, fixed seed).
pub fn noisy_rgb(width: u32, height: u32) -> RgbImage {
    let mut state: u32 = 0x9E37_79B9;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state
    };
    RgbImage::from_fn(width, height, |_, _| {
        let v = next();
        image::Rgb([v as u8, (v >> 8) as u8, (v >> 16) as u8])
    })
}

/// Noise encoded as JPEG at the given quality.
pub fn encode_test_jpeg(width: u32, height: u32, quality: u8) -> Vec<u8> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buffer), quality);
    DynamicImage::ImageRgb8(noisy_rgb(width, height))
        .write_with_encoder(encoder)
        .unwrap();
    buffer
}

/// Noise encoded as PNG with default compression.
pub fn encode_test_png(width: u32, height: u32) -> Vec<u8> {
    encode_test_image(width, height, ImageFormat::Png)
}

/// Noise encoded with the codec defaults of `format`.
pub fn encode_test_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(noisy_rgb(width, height))
        .write_to(&mut cursor, format)
        .unwrap();
    cursor.into_inner()
}

// =========================================================================
// On-disk fixtures
// =========================================================================

/// Write `bytes` to `dir/name`, creating parent directories. Returns the path.
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, bytes).unwrap();
    path
}

pub fn write_test_jpeg(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    write_file(dir, name, &encode_test_jpeg(width, height, 95))
}

pub fn write_test_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    write_file(dir, name, &encode_test_png(width, height))
}

/// Dimensions of an encoded file on disk. Panics if it does not decode.
pub fn dimensions_of(path: &Path) -> (u32, u32) {
    image::image_dimensions(path)
        .unwrap_or_else(|e| panic!("{} did not decode: {e}", path.display()))
}
