//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Resize
//!
//! ```text
//! Resizing 3 files (at most 1.00 MB)
//! 001 dawn.jpg → out/dawn.jpg
//!     1.00 MB, 1281x641
//! 002 logo.png → out/logo.png
//!     310.4 KB, copied unchanged
//! 003 scan.png ✗ size unattainable
//!     no candidate within 1048576 bytes after 7 attempts
//!
//! Processed 2, failed 1
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 /photos/dawn.jpg
//! 002 /photos/logo.png
//! Skipped (not an image)
//!     /photos/notes.txt
//!
//! 2 files to process
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchReport, FileOutcome};
use crate::scan::Inputs;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Human-readable byte count using binary units.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.2} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

// ============================================================================
// Resize
// ============================================================================

/// Format one file's outcome: header line plus an indented detail line.
pub fn format_outcome(index: usize, outcome: &FileOutcome) -> Vec<String> {
    match outcome {
        FileOutcome::Succeeded {
            input,
            output,
            bytes,
            dimensions,
            copied,
        } => {
            let detail = match (copied, dimensions) {
                (true, _) => format!("{}, copied unchanged", format_size(*bytes)),
                (false, Some(d)) => {
                    format!("{}, {}x{}", format_size(*bytes), d.width, d.height)
                }
                (false, None) => format_size(*bytes),
            };
            vec![
                format!(
                    "{} {} → {}",
                    format_index(index),
                    file_name(input),
                    output.display()
                ),
                format!("{}{}", indent(1), detail),
            ]
        }
        FileOutcome::Failed {
            input,
            error,
            message,
        } => vec![
            format!("{} {} ✗ {}", format_index(index), file_name(input), error),
            format!("{}{}", indent(1), message),
        ],
    }
}

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { total, spec } => {
            let noun = if *total == 1 { "file" } else { "files" };
            vec![format!("Resizing {total} {noun} ({spec})")]
        }
        BatchEvent::FileFinished { index, outcome, .. } => format_outcome(*index, outcome),
        BatchEvent::Finished { cancelled: true, .. } => vec!["Cancelled".to_string()],
        BatchEvent::Finished { .. } => Vec::new(),
    }
}

/// Format the closing summary of a batch.
pub fn format_summary(report: &BatchReport) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!("Processed {}, failed {}", report.processed, report.failed),
    ];
    if report.cancelled {
        let attempted = report.outcomes.len();
        lines.push(format!("Stopped early: {attempted} attempted"));
    }
    lines
}

/// Format the notice printed after a batch was rolled back.
pub fn format_rollback(removed: usize) -> Vec<String> {
    let noun = if removed == 1 { "output" } else { "outputs" };
    vec![format!("Rolled back: removed {removed} {noun}")]
}

pub fn print_batch_event(event: &BatchEvent) {
    for line in format_batch_event(event) {
        println!("{}", line);
    }
}

pub fn print_summary(report: &BatchReport) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}

pub fn print_rollback(removed: usize) {
    for line in format_rollback(removed) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the files a batch would process, followed by skipped paths.
pub fn format_input_list(inputs: &Inputs) -> Vec<String> {
    let mut lines: Vec<String> = inputs
        .files
        .iter()
        .enumerate()
        .map(|(i, path)| format!("{} {}", format_index(i + 1), path.display()))
        .collect();

    if !inputs.skipped.is_empty() {
        lines.push("Skipped (not an image)".to_string());
        for path in &inputs.skipped {
            lines.push(format!("{}{}", indent(1), path.display()));
        }
    }

    lines.push(String::new());
    let noun = if inputs.files.len() == 1 { "file" } else { "files" };
    lines.push(format!("{} {noun} to process", inputs.files.len()));
    lines
}

pub fn print_input_list(inputs: &Inputs) {
    for line in format_input_list(inputs) {
        println!("{}", line);
    }
}
