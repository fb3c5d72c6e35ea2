//! Shared types used by the scaler, the batch runner, and the CLI.
//!
//! [`ResizeSpec`] is the one piece of user intent every stage consumes;
//! [`ErrorKind`] is the one piece of failure information every stage reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Bytes in one megabyte, as target sizes are entered by the user.
pub const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpecError {
    #[error("no resize target given: pass a shortest side in pixels or a target size in MB")]
    Missing,
    #[error("both a pixel size and a file size were given; pick one")]
    Conflicting,
    #[error("invalid shortest side {0:?}: expected a positive whole number of pixels")]
    InvalidPixels(String),
    #[error("invalid target size {0:?}: expected a positive number of megabytes")]
    InvalidSize(String),
}

/// What a resize should aim for.
///
/// Exactly one target is active per batch. Construct through
/// [`ResizeSpec::by_pixels`], [`ResizeSpec::by_megabytes`] or
/// [`ResizeSpec::parse`] to get validation; hand-built values are checked again
/// by [`ResizeSpec::validate`] before any file is touched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ResizeSpec {
    /// Scale so that the shorter edge is exactly `shortest_side` pixels.
    ByPixels { shortest_side: u32 },
    /// Produce an encoded file no larger than `target_bytes`.
    ByFileSize { target_bytes: u64 },
}

impl ResizeSpec {
    pub fn by_pixels(shortest_side: u32) -> Result<Self, SpecError> {
        if shortest_side == 0 {
            return Err(SpecError::InvalidPixels(shortest_side.to_string()));
        }
        Ok(Self::ByPixels { shortest_side })
    }

    /// Target size in megabytes (1 MB = 1024 * 1024 bytes).
    pub fn by_megabytes(megabytes: f64) -> Result<Self, SpecError> {
        if !megabytes.is_finite() || megabytes <= 0.0 {
            return Err(SpecError::InvalidSize(megabytes.to_string()));
        }
        let target_bytes = (megabytes * BYTES_PER_MEGABYTE).floor() as u64;
        if target_bytes == 0 {
            return Err(SpecError::InvalidSize(megabytes.to_string()));
        }
        Ok(Self::ByFileSize { target_bytes })
    }

    /// Build a spec from the raw text a user typed for each target.
    ///
    /// Blank strings count as absent, so an empty form field behaves like a
    /// missing flag.
    pub fn parse(pixels: Option<&str>, megabytes: Option<&str>) -> Result<Self, SpecError> {
        let pixels = pixels.map(str::trim).filter(|s| !s.is_empty());
        let megabytes = megabytes.map(str::trim).filter(|s| !s.is_empty());

        match (pixels, megabytes) {
            (None, None) => Err(SpecError::Missing),
            (Some(_), Some(_)) => Err(SpecError::Conflicting),
            (Some(text), None) => {
                let value: u32 = text
                    .parse()
                    .map_err(|_| SpecError::InvalidPixels(text.to_string()))?;
                Self::by_pixels(value).map_err(|_| SpecError::InvalidPixels(text.to_string()))
            }
            (None, Some(text)) => {
                let value: f64 = text
                    .parse()
                    .map_err(|_| SpecError::InvalidSize(text.to_string()))?;
                Self::by_megabytes(value).map_err(|_| SpecError::InvalidSize(text.to_string()))
            }
        }
    }

    /// Reject zero targets in values that bypassed the constructors.
    pub fn validate(&self) -> Result<(), SpecError> {
        match *self {
            Self::ByPixels { shortest_side: 0 } => Err(SpecError::InvalidPixels("0".into())),
            Self::ByFileSize { target_bytes: 0 } => Err(SpecError::InvalidSize("0".into())),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ResizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByPixels { shortest_side } => write!(f, "shortest side {shortest_side}px"),
            Self::ByFileSize { target_bytes } => write!(
                f,
                "at most {:.2} MB",
                *target_bytes as f64 / BYTES_PER_MEGABYTE
            ),
        }
    }
}

/// Why a single file in a batch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or malformed size parameters.
    InvalidSpec,
    /// The source could not be read or decoded.
    DecodeFailure,
    /// The encoder rejected the image (e.g. no encoder for the format).
    EncodeFailure,
    /// The size search ran out of attempts without meeting the target.
    SizeUnattainable,
    /// The destination could not be written.
    WriteFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidSpec => "invalid spec",
            Self::DecodeFailure => "decode failure",
            Self::EncodeFailure => "encode failure",
            Self::SizeUnattainable => "size unattainable",
            Self::WriteFailure => "write failure",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pixels() {
        assert_eq!(
            ResizeSpec::parse(Some("1000"), None),
            Ok(ResizeSpec::ByPixels {
                shortest_side: 1000
            })
        );
    }

    #[test]
    fn parse_megabytes_converts_to_bytes() {
        assert_eq!(
            ResizeSpec::parse(None, Some("1.5")),
            Ok(ResizeSpec::ByFileSize {
                target_bytes: 1_572_864
            })
        );
    }

    #[test]
    fn parse_neither_is_missing() {
        assert_eq!(ResizeSpec::parse(None, None), Err(SpecError::Missing));
        assert_eq!(ResizeSpec::parse(Some("  "), Some("")), Err(SpecError::Missing));
    }

    #[test]
    fn parse_both_is_conflicting() {
        assert_eq!(
            ResizeSpec::parse(Some("500"), Some("1")),
            Err(SpecError::Conflicting)
        );
    }

    #[test]
    fn parse_non_numeric_pixels_is_invalid() {
        assert_eq!(
            ResizeSpec::parse(Some("invalid"), None),
            Err(SpecError::InvalidPixels("invalid".into()))
        );
        assert!(ResizeSpec::parse(Some("12.5"), None).is_err());
        assert!(ResizeSpec::parse(Some("-3"), None).is_err());
    }

    #[test]
    fn parse_zero_pixels_is_invalid() {
        assert_eq!(
            ResizeSpec::parse(Some("0"), None),
            Err(SpecError::InvalidPixels("0".into()))
        );
    }

    #[test]
    fn non_positive_sizes_are_invalid() {
        assert!(ResizeSpec::by_megabytes(0.0).is_err());
        assert!(ResizeSpec::by_megabytes(-1.0).is_err());
        assert!(ResizeSpec::by_megabytes(f64::NAN).is_err());
        assert!(ResizeSpec::by_megabytes(f64::INFINITY).is_err());
        assert!(ResizeSpec::parse(None, Some("abc")).is_err());
    }

    #[test]
    fn sub_byte_target_is_invalid() {
        assert!(ResizeSpec::by_megabytes(1e-9).is_err());
    }

    #[test]
    fn validate_catches_hand_built_zero_targets() {
        assert!(
            ResizeSpec::ByPixels { shortest_side: 0 }
                .validate()
                .is_err()
        );
        assert!(ResizeSpec::ByFileSize { target_bytes: 0 }.validate().is_err());
        assert!(ResizeSpec::ByFileSize { target_bytes: 1 }.validate().is_ok());
    }

    #[test]
    fn display_is_human_readable() {
        assert_eq!(
            ResizeSpec::ByPixels { shortest_side: 800 }.to_string(),
            "shortest side 800px"
        );
        assert_eq!(
            ResizeSpec::ByFileSize {
                target_bytes: 1_048_576
            }
            .to_string(),
            "at most 1.00 MB"
        );
        assert_eq!(ErrorKind::SizeUnattainable.to_string(), "size unattainable");
    }
}
