//! Parameter types for image operations.
//!
//! These structs describe *what* to encode, not *how*. The
//! [`scaler`](super::scaler) decides on them; the [`backend`](super::backend)
//! turns them into bytes. Keeping the format branching in one mapping
//! ([`EncodeSettings::for_format`]) means the search code never asks which
//! codec it is driving.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`EncodeSettings`] — Per-format knob: lossy quality, PNG optimize flag, or codec defaults.
//! - [`EncodeParams`] — Output format plus its settings; the single input to `encode`.

use super::format::{ImageFormatKind, SizeControl};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// The encoder knob that applies to a given format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeSettings {
    /// JPEG, WebP, HEIF, AVIF.
    Lossy { quality: Quality },
    /// PNG: `optimize` trades encode time for the best deflate compression.
    Lossless { optimize: bool },
    /// BMP, TIFF, GIF and unknown formats: the codec's defaults.
    Default,
}

impl EncodeSettings {
    pub fn for_format(format: ImageFormatKind, quality: Quality, png_optimize: bool) -> Self {
        match (format, format.size_control()) {
            (_, SizeControl::Lossy) => Self::Lossy { quality },
            (ImageFormatKind::Png, _) => Self::Lossless {
                optimize: png_optimize,
            },
            _ => Self::Default,
        }
    }

    pub fn quality(self) -> Option<Quality> {
        match self {
            Self::Lossy { quality } => Some(quality),
            _ => None,
        }
    }
}

/// Everything the backend needs to encode one buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    pub format: ImageFormatKind,
    pub settings: EncodeSettings,
}

impl EncodeParams {
    pub fn new(format: ImageFormatKind, settings: EncodeSettings) -> Self {
        Self { format, settings }
    }
}
