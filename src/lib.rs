//! # batch-resize
//!
//! Batch-resizes images either to a pixel size (shortest side) or to an
//! approximate maximum file size, and can undo the last batch.
//!
//! # Architecture
//!
//! ```text
//! 1. Scan     paths        →  ordered image list   (directories expanded, deduped)
//! 2. Scale    one image    →  encoded buffer        (in memory, per file)
//! 3. Write    buffer       →  output_dir/<name>     (recorded for undo)
//! ```
//!
//! The interesting part is step 2 in file-size mode: finding a scale (and,
//! with the estimate strategy, a quality) whose encoded output fits the
//! target, with a bounded number of trial encodes. See [`imaging::scaler`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Expands input paths into the ordered list of image files |
//! | [`batch`] | Runs the scaler over every file, writes outputs, reports per-file outcomes |
//! | [`imaging`] | Format classification, size search, and the pure-Rust codec backend |
//! | [`undo`] | Records written outputs and deletes them on request |
//! | [`config`] | `batch-resize.toml` loading, validation, and merging over stock defaults |
//! | [`types`] | `ResizeSpec` and `ErrorKind`, shared by every stage |
//! | [`output`] | CLI output formatting for progress, summaries, and input listings |
//!
//! # Design Decisions
//!
//! ## Bisection by Default
//!
//! Encoded size grows with area, but not predictably enough across codecs and
//! content to compute a scale up front. Bisecting the scale in `[0, 1]` at a
//! fixed quality keeps the image as large as possible while meeting the
//! target, and terminates after at most `max_iterations` encodes. The older
//! estimate-then-lower-quality approach stays available as
//! `search.strategy = "estimate"`.
//!
//! ## Never Over the Target
//!
//! A successful file-size result is always at or under the target. When no
//! trial fits, the file fails with `SizeUnattainable` instead of writing the
//! closest miss.
//!
//! ## One Format In, Same Format Out
//!
//! Outputs keep their source format and file name. BMP, TIFF and GIF have no
//! quality knob, so like PNG they are fitted by scale alone rather than
//! converted to something else.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod output;
pub mod scan;
pub mod types;
pub mod undo;

#[cfg(test)]
pub(crate) mod test_helpers;
