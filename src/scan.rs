//! Input discovery.
//!
//! Turns the paths given on the command line into the ordered, deduplicated
//! list of image files a batch will process.
//!
//! - Files are kept when their extension is one of
//!   [`RECOGNIZED_EXTENSIONS`](crate::imaging::RECOGNIZED_EXTENSIONS)
//!   (case-insensitive) and reported as skipped otherwise.
//! - Directories are expanded one level deep, or fully with `recursive`.
//!   Entries are visited in file-name order so batches are reproducible.
//! - Paths are made absolute before deduplication; the first occurrence wins
//!   and keeps its position.
//!
//! An explicitly named file is kept even if it does not exist yet. Reading it
//! fails later as a per-file error, the same as any other unreadable source.

use crate::imaging::is_recognized_image;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// The outcome of input discovery.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Inputs {
    /// Image files to process, in order.
    pub files: Vec<PathBuf>,
    /// Explicitly named files with an unrecognized extension.
    pub skipped: Vec<PathBuf>,
}

/// Expand `paths` into the image files a batch should process.
pub fn collect_inputs<P: AsRef<Path>>(paths: &[P], recursive: bool) -> Result<Inputs, ScanError> {
    let mut inputs = Inputs::default();
    let mut seen = HashSet::new();

    for path in paths {
        let path = std::path::absolute(path.as_ref())?;
        if path.is_dir() {
            for file in walk_images(&path, recursive)? {
                if seen.insert(file.clone()) {
                    inputs.files.push(file);
                }
            }
        } else if is_recognized_image(&path) {
            if seen.insert(path.clone()) {
                inputs.files.push(path);
            }
        } else {
            inputs.skipped.push(path);
        }
    }

    Ok(inputs)
}

fn walk_images(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, ScanError> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| ScanError::Walk {
            path: dir.to_path_buf(),
            source: e,
        })?;
        if entry.file_type().is_file() && is_recognized_image(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
