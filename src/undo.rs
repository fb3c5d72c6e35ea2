//! Undo log for the last batch.
//!
//! Every successful write is recorded as an [`UndoEntry`]. Undoing deletes the
//! recorded outputs and forgets them; sources are never touched. The log lives
//! for one batch: [`run_batch`](crate::batch::run_batch) clears it before
//! processing the first file.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// One written output and the source it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UndoEntry {
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Default)]
pub struct UndoLog {
    entries: Vec<UndoEntry>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, input: impl Into<PathBuf>, output: impl Into<PathBuf>) {
        self.entries.push(UndoEntry {
            input: input.into(),
            output: output.into(),
        });
    }

    pub fn entries(&self) -> &[UndoEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Delete every recorded output, newest first, and clear the log.
    ///
    /// Returns `false` if there was nothing to undo. Removal is best effort:
    /// files that are already gone or cannot be removed do not stop the rest.
    pub fn undo(&mut self) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        for entry in self.entries.drain(..).rev() {
            remove_output(&entry.output);
        }
        true
    }
}

fn remove_output(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => eprintln!("Warning: could not remove {}: {e}", path.display()),
    }
}
