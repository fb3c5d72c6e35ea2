//! Image processing, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Classify** | magic-byte sniffing, extension fallback |
//! | **Decode** | `image::ImageReader` |
//! | **Resize** | `resize_exact` with Lanczos3 |
//! | **Encode** | per-format `image` codecs, WebP via quantized lossless |
//! | **Fit to size** | bisection over scale, or estimate + quality ladder |
//!
//! The module is split into:
//! - **Format**: Source classification and per-format size control
//! - **Calculations**: Pure functions for dimension and size math (unit testable)
//! - **Parameters**: Data structures describing encode operations
//! - **Search**: Bounded bisection and quality-stepping drivers
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Scaler**: Combines the above into one `scale` call per image

pub mod backend;
mod calculations;
pub mod format;
mod params;
pub mod rust_backend;
pub mod scaler;
pub mod search;

pub use backend::{BackendError, Dimensions, Image, ImageBackend};
pub use calculations::{
    estimate_scale, estimated_raw_bytes, fits_without_resize, pixel_mode_dimensions,
    scaled_dimensions, shortest_side_scale,
};
pub use format::{ImageFormatKind, RECOGNIZED_EXTENSIONS, SizeControl, is_recognized_image};
pub use params::{EncodeParams, EncodeSettings, Quality};
pub use rust_backend::RustBackend;
pub use scaler::{EncodeResult, Production, ScaleError, Scaler, ScalerConfig, SourceImage};
