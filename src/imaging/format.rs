//! Source format classification.
//!
//! Every decision that depends on the file format (which encoder to use, which
//! knob shrinks the output, whether the size search applies at all) goes
//! through [`ImageFormatKind`], so adding a format means touching this file and
//! the encoder dispatch in [`rust_backend`](super::rust_backend) only.

use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// File extensions accepted as batch inputs (compared case-insensitively).
pub const RECOGNIZED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "bmp", "tiff", "tif", "gif", "webp", "heic", "heif", "avif",
];

/// Whether a path carries one of the [`RECOGNIZED_EXTENSIONS`].
pub fn is_recognized_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            RECOGNIZED_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// The closed set of formats the resizer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormatKind {
    Jpeg,
    Png,
    WebP,
    Bmp,
    Tiff,
    Gif,
    Heif,
    Avif,
    Other,
}

/// How a format takes part in a file-size search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeControl {
    /// Both quality and scale shrink the output.
    Lossy,
    /// Only scale shrinks the output; quality is never degraded.
    Lossless,
    /// No codec to check against, so kept out of the byte-size feedback loop.
    BestEffort,
}

impl ImageFormatKind {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Self::Jpeg,
            "png" => Self::Png,
            "webp" => Self::WebP,
            "bmp" => Self::Bmp,
            "tif" | "tiff" => Self::Tiff,
            "gif" => Self::Gif,
            "heic" | "heif" => Self::Heif,
            "avif" => Self::Avif,
            _ => Self::Other,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Other)
    }

    pub fn from_image_format(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Jpeg => Self::Jpeg,
            ImageFormat::Png => Self::Png,
            ImageFormat::WebP => Self::WebP,
            ImageFormat::Bmp => Self::Bmp,
            ImageFormat::Tiff => Self::Tiff,
            ImageFormat::Gif => Self::Gif,
            ImageFormat::Avif => Self::Avif,
            _ => Self::Other,
        }
    }

    /// Classify a source by its magic bytes, falling back to the extension.
    ///
    /// HEIC has no signature the `image` crate knows about, and a renamed file
    /// should still be encoded as what it actually is.
    pub fn detect(bytes: &[u8], path: &Path) -> Self {
        image::guess_format(bytes)
            .ok()
            .map(Self::from_image_format)
            .filter(|kind| *kind != Self::Other)
            .unwrap_or_else(|| Self::from_path(path))
    }

    pub fn size_control(self) -> SizeControl {
        match self {
            Self::Jpeg | Self::WebP | Self::Heif | Self::Avif => SizeControl::Lossy,
            Self::Png | Self::Bmp | Self::Tiff | Self::Gif => SizeControl::Lossless,
            Self::Other => SizeControl::BestEffort,
        }
    }

    /// The `image` crate format, for kinds it can name.
    pub fn image_format(self) -> Option<ImageFormat> {
        match self {
            Self::Jpeg => Some(ImageFormat::Jpeg),
            Self::Png => Some(ImageFormat::Png),
            Self::WebP => Some(ImageFormat::WebP),
            Self::Bmp => Some(ImageFormat::Bmp),
            Self::Tiff => Some(ImageFormat::Tiff),
            Self::Gif => Some(ImageFormat::Gif),
            Self::Avif => Some(ImageFormat::Avif),
            Self::Heif | Self::Other => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::WebP => "WebP",
            Self::Bmp => "BMP",
            Self::Tiff => "TIFF",
            Self::Gif => "GIF",
            Self::Heif => "HEIF",
            Self::Avif => "AVIF",
            Self::Other => "unknown",
        }
    }
}

impl fmt::Display for ImageFormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
