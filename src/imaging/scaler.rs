//! Target-size image scaler.
//!
//! Turns a source image and a [`ResizeSpec`] into one encoded buffer.
//!
//! ## Pixel mode
//!
//! `ByPixels(n)` scales uniformly so the shorter edge becomes `n` (each edge
//! rounded, floored at 1 px), resamples once with Lanczos3 and encodes once in
//! the source format. No search.
//!
//! ## File-size mode
//!
//! `ByFileSize(target)` first checks the cheap case: if the source file is
//! already within the target (less the configured margin), its bytes are
//! returned untouched. Otherwise the source is decoded and, depending on the
//! format's [`SizeControl`]:
//!
//! | Format class | Behavior |
//! |---|---|
//! | Lossy (JPEG, WebP, HEIF, AVIF) | search per [`SearchStrategy`] |
//! | Lossless (PNG, BMP, TIFF, GIF) | scale search only, quality never degraded |
//! | Best effort (unrecognized) | one resize at the estimated scale, no size check |
//!
//! [`SearchStrategy::Bisect`] (default) bisects the scale in `[0, 1]`, encoding
//! every midpoint at the configured quality and keeping the largest scale that
//! fit. [`SearchStrategy::Estimate`] resizes once to the flat-RGB estimate and
//! then walks quality down. Either way a successful result is never larger
//! than the target; when nothing fits the call fails with
//! [`ScaleError::SizeUnattainable`].
//!
//! Trial encodes live in memory only. The caller decides whether to write the
//! returned buffer.

use super::backend::{BackendError, Dimensions, Image, ImageBackend};
use super::calculations::{
    estimate_scale, fits_without_resize, pixel_mode_dimensions, scaled_dimensions,
    shortest_side_scale,
};
use super::format::{ImageFormatKind, SizeControl};
use super::params::{EncodeParams, EncodeSettings, Quality};
use super::search::{Hit, QualitySteps, SearchBounds, SearchOutcome, bisect_scale, step_quality};
use crate::config::{ResizerConfig, SearchStrategy};
use crate::types::{ErrorKind, ResizeSpec, SpecError};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScaleError {
    #[error(transparent)]
    InvalidSpec(#[from] SpecError),
    #[error("could not decode {format} source: {source}")]
    Decode {
        format: ImageFormatKind,
        #[source]
        source: BackendError,
    },
    #[error("could not resize to {width}x{height}: {source}")]
    Resize {
        width: u32,
        height: u32,
        #[source]
        source: BackendError,
    },
    #[error("could not encode {format} output: {source}")]
    Encode {
        format: ImageFormatKind,
        #[source]
        source: BackendError,
    },
    #[error(
        "no candidate within {target_bytes} bytes after {attempts} attempts{}",
        .smallest_bytes.map(|s| format!(" (smallest was {s} bytes)")).unwrap_or_default()
    )]
    SizeUnattainable {
        target_bytes: u64,
        attempts: u32,
        smallest_bytes: Option<u64>,
    },
}

impl ScaleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSpec(_) => ErrorKind::InvalidSpec,
            Self::Decode { .. } => ErrorKind::DecodeFailure,
            Self::Resize { .. } | Self::Encode { .. } => ErrorKind::EncodeFailure,
            Self::SizeUnattainable { .. } => ErrorKind::SizeUnattainable,
        }
    }
}

/// Source bytes as read from disk, with their detected format.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormatKind,
}

impl SourceImage {
    pub fn new(bytes: Vec<u8>, format: ImageFormatKind) -> Self {
        Self { bytes, format }
    }

    /// Read a file and classify it by content, falling back to its extension.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let format = ImageFormatKind::detect(&bytes, path);
        Ok(Self { bytes, format })
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// How an [`EncodeResult`] came to be.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Production {
    /// Source bytes passed through unchanged.
    Copied,
    /// Resampled by `scale`, encoded at `quality` (lossy formats only).
    Resized {
        scale: f64,
        quality: Option<u32>,
        attempts: u32,
    },
}

/// The final encoded output of one `scale` call.
#[derive(Debug, Clone)]
pub struct EncodeResult {
    pub bytes: Vec<u8>,
    pub format: ImageFormatKind,
    /// Output dimensions; `None` when the source was copied without decoding.
    pub dimensions: Option<Dimensions>,
    pub production: Production,
}

impl EncodeResult {
    /// Achieved size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn was_copied(&self) -> bool {
        matches!(self.production, Production::Copied)
    }
}

/// Scaler settings, flattened from [`ResizerConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScalerConfig {
    pub strategy: SearchStrategy,
    pub bounds: SearchBounds,
    /// Fraction of the target held back before a source counts as fitting.
    pub skip_margin: f64,
    /// Fixed quality for lossy encodes outside the quality ladder.
    pub quality: Quality,
    pub png_optimize: bool,
    pub quality_steps: QualitySteps,
}

impl ScalerConfig {
    pub fn from_config(config: &ResizerConfig) -> Self {
        Self {
            strategy: config.search.strategy,
            bounds: SearchBounds {
                max_iterations: config.search.max_iterations,
                min_interval: config.search.min_interval,
            },
            skip_margin: config.search.skip_margin,
            quality: Quality::new(config.encoding.quality),
            png_optimize: config.encoding.png_optimize,
            quality_steps: QualitySteps {
                start: config.encoding.quality_start,
                step: config.encoding.quality_step,
                floor: config.encoding.quality_floor,
            },
        }
    }
}

impl Default for ScalerConfig {
    fn default() -> Self {
        Self::from_config(&ResizerConfig::default())
    }
}

/// One fitting trial: the encoded bytes and the raster size they came from.
struct Candidate {
    bytes: Vec<u8>,
    dimensions: Dimensions,
}

pub struct Scaler<'a, B: ImageBackend> {
    backend: &'a B,
    config: ScalerConfig,
}

impl<'a, B: ImageBackend> Scaler<'a, B> {
    pub fn new(backend: &'a B, config: ScalerConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &ScalerConfig {
        &self.config
    }

    /// Produce the output for `source` under `spec`.
    pub fn scale(
        &self,
        source: &SourceImage,
        spec: &ResizeSpec,
    ) -> Result<EncodeResult, ScaleError> {
        spec.validate()?;
        match *spec {
            ResizeSpec::ByPixels { shortest_side } => self.scale_to_pixels(source, shortest_side),
            ResizeSpec::ByFileSize { target_bytes } => self.scale_to_size(source, target_bytes),
        }
    }

    fn scale_to_pixels(
        &self,
        source: &SourceImage,
        shortest_side: u32,
    ) -> Result<EncodeResult, ScaleError> {
        let image = self.decode(source)?;
        let dims = image.dimensions();
        let (width, height) = pixel_mode_dimensions((dims.width, dims.height), shortest_side);
        let resized = self.resize(&image, width, height)?;
        let settings = self.default_settings(image.format());
        let bytes = self.encode(&resized, settings)?;

        Ok(EncodeResult {
            bytes,
            format: image.format(),
            dimensions: Some(resized.dimensions()),
            production: Production::Resized {
                scale: shortest_side_scale((dims.width, dims.height), shortest_side),
                quality: settings.quality().map(Quality::value),
                attempts: 1,
            },
        })
    }

    fn scale_to_size(
        &self,
        source: &SourceImage,
        target_bytes: u64,
    ) -> Result<EncodeResult, ScaleError> {
        if fits_without_resize(source.len(), target_bytes, self.config.skip_margin) {
            return Ok(EncodeResult {
                bytes: source.bytes.clone(),
                format: source.format,
                dimensions: None,
                production: Production::Copied,
            });
        }

        let image = self.decode(source)?;
        match (image.format().size_control(), self.config.strategy) {
            (SizeControl::BestEffort, _) => self.best_effort(&image, target_bytes),
            (_, SearchStrategy::Bisect) => self.bisect(&image, target_bytes),
            (_, SearchStrategy::Estimate) => self.estimate(&image, target_bytes),
        }
    }

    /// Binary search over scale at a fixed encode quality.
    fn bisect(&self, image: &Image, target_bytes: u64) -> Result<EncodeResult, ScaleError> {
        let dims = image.dimensions();
        let settings = self.default_settings(image.format());
        let mut smallest: Option<u64> = None;

        let outcome = bisect_scale(&self.config.bounds, |scale| {
            let (width, height) = scaled_dimensions((dims.width, dims.height), scale);
            let resized = self.resize(image, width, height)?;
            let bytes = self.encode(&resized, settings)?;
            let size = bytes.len() as u64;
            smallest = Some(smallest.map_or(size, |s| s.min(size)));
            Ok::<_, ScaleError>((size <= target_bytes).then(|| Candidate {
                bytes,
                dimensions: resized.dimensions(),
            }))
        })?;

        match outcome.best {
            Some(hit) => Ok(EncodeResult {
                bytes: hit.candidate.bytes,
                format: image.format(),
                dimensions: Some(hit.candidate.dimensions),
                production: Production::Resized {
                    scale: hit.param,
                    quality: settings.quality().map(Quality::value),
                    attempts: outcome.attempts,
                },
            }),
            None => Err(ScaleError::SizeUnattainable {
                target_bytes,
                attempts: outcome.attempts,
                smallest_bytes: smallest,
            }),
        }
    }

    /// One resize at the flat-RGB estimate, then quality stepping for lossy
    /// formats or a single check for lossless ones.
    fn estimate(&self, image: &Image, target_bytes: u64) -> Result<EncodeResult, ScaleError> {
        let dims = image.dimensions();
        let scale = estimate_scale((dims.width, dims.height), target_bytes);
        let (width, height) = scaled_dimensions((dims.width, dims.height), scale);
        let resized = self.resize(image, width, height)?;
        let format = image.format();
        let mut smallest: Option<u64> = None;

        let outcome = match format.size_control() {
            SizeControl::Lossy => step_quality(&self.config.quality_steps, |quality| {
                let bytes = self.encode(&resized, EncodeSettings::Lossy { quality })?;
                let size = bytes.len() as u64;
                smallest = Some(smallest.map_or(size, |s| s.min(size)));
                Ok::<_, ScaleError>((size <= target_bytes).then_some((bytes, Some(quality))))
            })?,
            _ => {
                let bytes = self.encode(&resized, self.default_settings(format))?;
                let size = bytes.len() as u64;
                smallest = Some(size);
                SearchOutcome {
                    best: (size <= target_bytes).then(|| Hit {
                        param: Quality::default(),
                        candidate: (bytes, None),
                    }),
                    attempts: 1,
                }
            }
        };

        match outcome.best {
            Some(hit) => {
                let (bytes, quality) = hit.candidate;
                Ok(EncodeResult {
                    bytes,
                    format,
                    dimensions: Some(resized.dimensions()),
                    production: Production::Resized {
                        scale,
                        quality: quality.map(Quality::value),
                        attempts: outcome.attempts,
                    },
                })
            }
            None => Err(ScaleError::SizeUnattainable {
                target_bytes,
                attempts: outcome.attempts,
                smallest_bytes: smallest,
            }),
        }
    }

    /// Unrecognized formats: resize to the estimate and accept whatever the
    /// codec produces.
    fn best_effort(&self, image: &Image, target_bytes: u64) -> Result<EncodeResult, ScaleError> {
        let dims = image.dimensions();
        let scale = estimate_scale((dims.width, dims.height), target_bytes);
        let (width, height) = scaled_dimensions((dims.width, dims.height), scale);
        let resized = self.resize(image, width, height)?;
        let bytes = self.encode(&resized, EncodeSettings::Default)?;

        Ok(EncodeResult {
            bytes,
            format: image.format(),
            dimensions: Some(resized.dimensions()),
            production: Production::Resized {
                scale,
                quality: None,
                attempts: 1,
            },
        })
    }

    fn default_settings(&self, format: ImageFormatKind) -> EncodeSettings {
        EncodeSettings::for_format(format, self.config.quality, self.config.png_optimize)
    }

    fn decode(&self, source: &SourceImage) -> Result<Image, ScaleError> {
        self.backend
            .decode(&source.bytes, source.format)
            .map_err(|e| ScaleError::Decode {
                format: source.format,
                source: e,
            })
    }

    fn resize(&self, image: &Image, width: u32, height: u32) -> Result<Image, ScaleError> {
        self.backend
            .resize(image, width, height)
            .map_err(|e| ScaleError::Resize {
                width,
                height,
                source: e,
            })
    }

    fn encode(&self, image: &Image, settings: EncodeSettings) -> Result<Vec<u8>, ScaleError> {
        let format = image.format();
        self.backend
            .encode(image, &EncodeParams::new(format, settings))
            .map_err(|e| ScaleError::Encode { format, source: e })
    }
}
