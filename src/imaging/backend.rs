//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the scaler needs:
//! decode, resize, and encode. All three work on in-memory buffers; nothing
//! here touches the filesystem, so a trial encode during a size search never
//! leaves a partial file behind.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) — pure Rust, statically
//! linked.

use super::format::ImageFormatKind;
use super::params::EncodeParams;
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Resize failed: {0}")]
    Resize(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("No {0} codec compiled in")]
    Unsupported(ImageFormatKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// A decoded raster tagged with the format it came from.
///
/// Immutable: resizing goes through the backend and yields a new `Image`.
#[derive(Debug, Clone)]
pub struct Image {
    pixels: DynamicImage,
    format: ImageFormatKind,
}

impl Image {
    pub fn new(pixels: DynamicImage, format: ImageFormatKind) -> Self {
        Self { pixels, format }
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    pub fn format(&self) -> ImageFormatKind {
        self.format
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.pixels.width(),
            height: self.pixels.height(),
        }
    }
}

/// Trait for image processing backends.
pub trait ImageBackend: Sync {
    /// Decode source bytes. `format` is the caller's classification of them.
    fn decode(&self, bytes: &[u8], format: ImageFormatKind) -> Result<Image, BackendError>;

    /// Resample to exactly `width` x `height`.
    fn resize(&self, image: &Image, width: u32, height: u32) -> Result<Image, BackendError>;

    /// Encode to an in-memory buffer.
    fn encode(&self, image: &Image, params: &EncodeParams) -> Result<Vec<u8>, BackendError>;
}
