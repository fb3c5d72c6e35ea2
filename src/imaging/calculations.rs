//! Pure calculation functions for image dimensions and size estimates.
//!
//! All functions here are pure and testable without any I/O or images.

/// Scale factor that brings the shorter edge of `dims` to `shortest_side`.
///
/// Degenerate zero-sized inputs are treated as 1 pixel so the result is
/// always finite.
pub fn shortest_side_scale(dims: (u32, u32), shortest_side: u32) -> f64 {
    let (w, h) = dims;
    let short = w.min(h).max(1);
    shortest_side as f64 / short as f64
}

/// Apply a uniform scale factor, rounding each edge and flooring it at 1 pixel.
///
/// # Examples
/// ```
/// # use batch_resize::imaging::scaled_dimensions;
/// assert_eq!(scaled_dimensions((2000, 1000), 0.5), (1000, 500));
/// assert_eq!(scaled_dimensions((2000, 1000), 0.0), (1, 1));
/// ```
pub fn scaled_dimensions(dims: (u32, u32), scale: f64) -> (u32, u32) {
    let (w, h) = dims;
    let edge = |len: u32| -> u32 {
        let scaled = (len as f64 * scale).round();
        if scaled.is_finite() && scaled >= 1.0 {
            scaled.min(u32::MAX as f64) as u32
        } else {
            1
        }
    };
    (edge(w), edge(h))
}

/// Output dimensions for pixel mode: shorter edge becomes `shortest_side`,
/// aspect ratio preserved.
pub fn pixel_mode_dimensions(dims: (u32, u32), shortest_side: u32) -> (u32, u32) {
    scaled_dimensions(dims, shortest_side_scale(dims, shortest_side))
}

/// Rough byte cost of an image as uncompressed 8-bit RGB.
pub fn estimated_raw_bytes(dims: (u32, u32)) -> u64 {
    dims.0 as u64 * dims.1 as u64 * 3
}

/// Scale factor the flat RGB estimate predicts will hit `target_bytes`.
///
/// Byte cost grows with area, hence the square root. Never upscales.
pub fn estimate_scale(dims: (u32, u32), target_bytes: u64) -> f64 {
    let estimated = estimated_raw_bytes(dims);
    if estimated == 0 {
        return 1.0;
    }
    (target_bytes as f64 / estimated as f64).sqrt().min(1.0)
}

/// Whether a source of `source_len` bytes already satisfies `target_bytes`,
/// keeping `margin` (a fraction of the target) in reserve.
pub fn fits_without_resize(source_len: u64, target_bytes: u64, margin: f64) -> bool {
    source_len as f64 <= target_bytes as f64 * (1.0 - margin)
}
