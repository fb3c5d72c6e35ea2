//! Resizer configuration module.
//!
//! Handles loading, validating, and merging `batch-resize.toml`. Stock
//! defaults are serialized to a TOML value and the user file, when present, is
//! merged on top, so a config file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! The file is looked up in the directory given by `--config-dir` (default:
//! the current directory):
//!
//! ```text
//! ./batch-resize.toml
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [search]
//! strategy = "bisect"       # "bisect" or "estimate"
//! max_iterations = 10       # Hard cap on trial encodes per bisection
//! min_interval = 0.01       # Stop bisecting once the scale interval is this narrow
//! skip_margin = 0.0         # Fraction of the target held back before copying as-is
//!
//! [encoding]
//! quality = 90              # Lossy quality for pixel mode and bisection (1-100)
//! png_optimize = true       # Best deflate compression for PNG
//! quality_start = 95        # Estimate strategy: first quality tried
//! quality_step = 5          # Estimate strategy: decrement per attempt
//! quality_floor = 10        # Estimate strategy: lowest quality tried
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up inside the config directory.
pub const CONFIG_FILENAME: &str = "batch-resize.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Resizer configuration loaded from `batch-resize.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizerConfig {
    /// File-size search settings.
    pub search: SearchConfig,
    /// Encoder settings.
    pub encoding: EncodingConfig,
}

impl ResizerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let search = &self.search;
        let encoding = &self.encoding;

        if search.max_iterations == 0 {
            return Err(ConfigError::Validation(
                "search.max_iterations must be at least 1".into(),
            ));
        }
        if !(search.min_interval > 0.0 && search.min_interval < 1.0) {
            return Err(ConfigError::Validation(
                "search.min_interval must be between 0 and 1 (exclusive)".into(),
            ));
        }
        if !(0.0..1.0).contains(&search.skip_margin) {
            return Err(ConfigError::Validation(
                "search.skip_margin must be in [0, 1)".into(),
            ));
        }
        for (key, value) in [
            ("encoding.quality", encoding.quality),
            ("encoding.quality_start", encoding.quality_start),
            ("encoding.quality_floor", encoding.quality_floor),
        ] {
            if !(1..=100).contains(&value) {
                return Err(ConfigError::Validation(format!("{key} must be 1-100")));
            }
        }
        if encoding.quality_step == 0 {
            return Err(ConfigError::Validation(
                "encoding.quality_step must be at least 1".into(),
            ));
        }
        if encoding.quality_floor > encoding.quality_start {
            return Err(ConfigError::Validation(
                "encoding.quality_floor must not exceed encoding.quality_start".into(),
            ));
        }
        Ok(())
    }
}

/// How file-size mode searches for a fitting encode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    /// Bisect the scale factor at a fixed quality.
    #[default]
    Bisect,
    /// Resize once to the flat-RGB estimate, then lower quality.
    Estimate,
}

/// File-size search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub strategy: SearchStrategy,
    /// Maximum trial encodes in one bisection.
    pub max_iterations: u32,
    /// Bisection stops once the scale interval is at most this wide.
    pub min_interval: f64,
    /// Fraction of the target reserved before a source is copied unchanged.
    pub skip_margin: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::Bisect,
            max_iterations: 10,
            min_interval: 0.01,
            skip_margin: 0.0,
        }
    }
}

/// Encoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    /// Lossy quality used in pixel mode and for every bisection trial.
    pub quality: u32,
    /// Use the slowest, smallest PNG compression.
    pub png_optimize: bool,
    pub quality_start: u32,
    pub quality_step: u32,
    pub quality_floor: u32,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            quality: 90,
            png_optimize: true,
            quality_start: 95,
            quality_step: 5,
            quality_floor: 10,
        }
    }
}

/// Stock defaults as a TOML value, the base layer for merging.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ResizerConfig::default()).expect("default config must serialize")
}

/// Deep-merge `overlay` into `base`. Tables merge key by key; any other
/// overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read `dir/batch-resize.toml` as a raw TOML value, if the file exists.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto `base`, deserialize, and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ResizerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ResizerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config for `dir`: stock defaults plus the user file.
pub fn load_config(dir: &Path) -> Result<ResizerConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// A fully commented config file with every default spelled out.
pub fn stock_config_toml() -> &'static str {
    r##"# batch-resize configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# File-size search (used with --size-mb)
# ---------------------------------------------------------------------------
[search]
# "bisect": binary search over the scale factor at a fixed quality.
# "estimate": resize once to a flat-RGB size estimate, then lower quality
#             from quality_start to quality_floor until the output fits.
strategy = "bisect"

# Maximum number of trial encodes in one bisection.
max_iterations = 10

# Stop bisecting once the remaining scale interval is this narrow.
min_interval = 0.01

# Fraction of the target held back when deciding whether a source already
# fits and can be copied unchanged. 0.05 means "copy only if 5% under".
skip_margin = 0.0

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[encoding]
# JPEG/WebP/AVIF quality for pixel mode and for bisection trials (1-100).
quality = 90

# Slowest, smallest PNG compression.
png_optimize = true

# Quality ladder for the estimate strategy.
quality_start = 95
quality_step = 5
quality_floor = 10
"##
}
