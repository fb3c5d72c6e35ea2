//! Batch runner.
//!
//! Takes an ordered list of input files, an output directory and one
//! [`ResizeSpec`], runs every file through the [`Scaler`] and writes the
//! result to `output_dir/<input file name>` in the source format.
//!
//! ## Failure model
//!
//! Only an invalid spec or an unusable output directory aborts the batch, and
//! both are checked before the first file is touched. Everything else is a
//! per-file [`FileOutcome::Failed`] carrying an [`ErrorKind`]; the batch moves
//! on to the next file. Nothing is retried.
//!
//! A file also fails with [`ErrorKind::WriteFailure`] when its output path
//! would overwrite its own source or an output already written earlier in the
//! same batch (two inputs sharing a file name). Outputs are written to a temp
//! file and renamed into place, so a failed write never disturbs a file that
//! was already at the output path.
//!
//! ## Progress and cancellation
//!
//! When `events` is set, a [`BatchEvent`] is sent before the first file, after
//! each file and at the end. A receiver that has hung up is ignored. The
//! `cancel` flag is checked between files; files not yet started when it is
//! raised are left out of the report.
//!
//! ## Undo
//!
//! The [`UndoLog`] is cleared once the batch starts, then every successful
//! write is recorded so the caller can roll the batch back.

use crate::config::ResizerConfig;
use crate::imaging::{
    Dimensions, ImageBackend, RustBackend, ScaleError, Scaler, ScalerConfig, SourceImage,
};
use crate::types::{ErrorKind, ResizeSpec, SpecError};
use crate::undo::UndoLog;
use serde::Serialize;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors that stop a batch before any file is processed.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    InvalidSpec(#[from] SpecError),
    #[error("Cannot use output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why one file failed.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("could not read source: {0}")]
    Read(#[source] std::io::Error),
    #[error(transparent)]
    Scale(#[from] ScaleError),
    #[error("input has no file name")]
    NoFileName,
    #[error("output {} would overwrite the source", .0.display())]
    OverwritesSource(PathBuf),
    #[error("output {} was already written by an earlier input", .0.display())]
    OutputCollision(PathBuf),
    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Read(_) => ErrorKind::DecodeFailure,
            Self::Scale(e) => e.kind(),
            Self::NoFileName
            | Self::OverwritesSource(_)
            | Self::OutputCollision(_)
            | Self::Write { .. } => ErrorKind::WriteFailure,
        }
    }
}

/// Result for one input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Succeeded {
        input: PathBuf,
        output: PathBuf,
        /// Bytes written.
        bytes: u64,
        /// Output dimensions; absent when the source was copied unchanged.
        #[serde(skip_serializing_if = "Option::is_none")]
        dimensions: Option<Dimensions>,
        copied: bool,
    },
    Failed {
        input: PathBuf,
        error: ErrorKind,
        message: String,
    },
}

impl FileOutcome {
    pub fn input(&self) -> &Path {
        match self {
            Self::Succeeded { input, .. } | Self::Failed { input, .. } => input,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Succeeded { .. } => None,
            Self::Failed { error, .. } => Some(*error),
        }
    }
}

/// Aggregate result of [`run_batch`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// One entry per file attempted, in input order.
    pub outcomes: Vec<FileOutcome>,
    /// Files written successfully.
    pub processed: usize,
    pub failed: usize,
    /// The cancel flag stopped the batch early.
    pub cancelled: bool,
    /// The outputs listed as succeeded were deleted again by [`roll_back`](Self::roll_back).
    pub rolled_back: bool,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Delete every output this batch wrote and mark the report accordingly.
    /// Returns how many outputs were removed.
    pub fn roll_back(&mut self, undo: &mut UndoLog) -> usize {
        let removed = undo.len();
        if undo.undo() {
            self.rolled_back = true;
        }
        removed
    }
}

/// Progress events emitted while a batch runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BatchEvent {
    Started {
        total: usize,
        spec: ResizeSpec,
    },
    /// `index` is 1-based.
    FileFinished {
        index: usize,
        total: usize,
        outcome: FileOutcome,
    },
    Finished {
        processed: usize,
        failed: usize,
        cancelled: bool,
    },
}

/// Knobs for one batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub scaler: ScalerConfig,
    pub events: Option<Sender<BatchEvent>>,
    pub cancel: Option<Arc<AtomicBool>>,
}

impl BatchOptions {
    pub fn from_config(config: &ResizerConfig) -> Self {
        Self {
            scaler: ScalerConfig::from_config(config),
            ..Self::default()
        }
    }

    fn emit(&self, event: BatchEvent) {
        if let Some(tx) = &self.events {
            tx.send(event).ok();
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Run a batch with the pure-Rust backend.
pub fn resize_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    spec: &ResizeSpec,
    options: BatchOptions,
    undo: &mut UndoLog,
) -> Result<BatchReport, BatchError> {
    let backend = RustBackend::new();
    run_batch(&backend, inputs, output_dir, spec, options, undo)
}

/// Run a batch using a specific backend (allows testing with mock).
pub fn run_batch(
    backend: &impl ImageBackend,
    inputs: &[PathBuf],
    output_dir: &Path,
    spec: &ResizeSpec,
    options: BatchOptions,
    undo: &mut UndoLog,
) -> Result<BatchReport, BatchError> {
    spec.validate()?;

    let output_dir = std::path::absolute(output_dir)
        .and_then(|dir| std::fs::create_dir_all(&dir).map(|()| dir))
        .map_err(|e| BatchError::OutputDir {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

    undo.clear();
    let scaler = Scaler::new(backend, options.scaler.clone());
    let total = inputs.len();
    let mut report = BatchReport::default();
    let mut written: HashSet<PathBuf> = HashSet::new();

    options.emit(BatchEvent::Started { total, spec: *spec });

    for (i, input) in inputs.iter().enumerate() {
        if options.cancelled() {
            report.cancelled = true;
            break;
        }

        let outcome = match process_file(&scaler, input, &output_dir, spec, &written) {
            Ok(done) => {
                written.insert(done.output.clone());
                undo.record(input, &done.output);
                report.processed += 1;
                FileOutcome::Succeeded {
                    input: input.clone(),
                    output: done.output,
                    bytes: done.bytes,
                    dimensions: done.dimensions,
                    copied: done.copied,
                }
            }
            Err(e) => {
                report.failed += 1;
                FileOutcome::Failed {
                    input: input.clone(),
                    error: e.kind(),
                    message: e.to_string(),
                }
            }
        };

        options.emit(BatchEvent::FileFinished {
            index: i + 1,
            total,
            outcome: outcome.clone(),
        });
        report.outcomes.push(outcome);
    }

    options.emit(BatchEvent::Finished {
        processed: report.processed,
        failed: report.failed,
        cancelled: report.cancelled,
    });

    Ok(report)
}

struct Written {
    output: PathBuf,
    bytes: u64,
    dimensions: Option<Dimensions>,
    copied: bool,
}

fn process_file<B: ImageBackend>(
    scaler: &Scaler<'_, B>,
    input: &Path,
    output_dir: &Path,
    spec: &ResizeSpec,
    written: &HashSet<PathBuf>,
) -> Result<Written, FileError> {
    let output = output_path(input, output_dir)?;
    if written.contains(&output) {
        return Err(FileError::OutputCollision(output));
    }
    if same_file(input, &output) {
        return Err(FileError::OverwritesSource(output));
    }

    let source = SourceImage::read(input).map_err(FileError::Read)?;
    let result = scaler.scale(&source, spec)?;

    write_atomically(&output, output_dir, &result.bytes)?;

    Ok(Written {
        bytes: result.size(),
        dimensions: result.dimensions,
        copied: result.was_copied(),
        output,
    })
}

/// Write through a temp file in `output_dir`, then rename onto `output`.
///
/// A failed write leaves whatever was at `output` untouched; the temp file is
/// removed when it drops.
fn write_atomically(output: &Path, output_dir: &Path, bytes: &[u8]) -> Result<(), FileError> {
    let write_error = |source: std::io::Error| FileError::Write {
        path: output.to_path_buf(),
        source,
    };
    let mut temp = NamedTempFile::new_in(output_dir).map_err(write_error)?;
    temp.write_all(bytes).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;
    temp.persist(output).map_err(|e| write_error(e.error))?;
    Ok(())
}

/// `output_dir/<input file name>`.
pub fn output_path(input: &Path, output_dir: &Path) -> Result<PathBuf, FileError> {
    input
        .file_name()
        .map(|name| output_dir.join(name))
        .ok_or(FileError::NoFileName)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use crate::imaging::{BackendError, EncodeParams, Image, ImageFormatKind};
    use crate::test_helpers::{dimensions_of, write_file, write_test_jpeg, write_test_png};
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn pixels(n: u32) -> ResizeSpec {
        ResizeSpec::ByPixels { shortest_side: n }
    }

    fn run(
        backend: &impl ImageBackend,
        inputs: &[PathBuf],
        output_dir: &Path,
        spec: ResizeSpec,
    ) -> (BatchReport, UndoLog) {
        let mut undo = UndoLog::new();
        let report =
            run_batch(backend, inputs, output_dir, &spec, BatchOptions::default(), &mut undo)
                .unwrap();
        (report, undo)
    }

    // =========================================================================
    // Happy path
    // =========================================================================

    #[test]
    fn pixel_batch_writes_every_file() {
        let tmp = TempDir::new().unwrap();
        let inputs = vec![
            write_test_jpeg(tmp.path(), "in/wide.jpg", 400, 200),
            write_test_png(tmp.path(), "in/tall.png", 100, 300),
        ];
        let out = tmp.path().join("out");

        let (report, undo) = run(&RustBackend::new(), &inputs, &out, pixels(50));

        assert_eq!((report.processed, report.failed), (2, 0));
        assert!(!report.cancelled);
        assert_eq!(dimensions_of(&out.join("wide.jpg")), (100, 50));
        assert_eq!(dimensions_of(&out.join("tall.png")), (50, 150));
        assert_eq!(undo.len(), 2);
        assert_eq!(undo.entries()[0].input, inputs[0]);
    }

    #[test]
    fn output_directory_is_created() {
        let tmp = TempDir::new().unwrap();
        let inputs = vec![write_file(tmp.path(), "a.jpg", b"x")];
        let out = tmp.path().join("deeply/nested/out");

        let (report, _) = run(&MockBackend::new(10, 10, 1.0), &inputs, &out, pixels(5));
        assert_eq!(report.processed, 1);
        assert!(out.join("a.jpg").is_file());
    }

    #[test]
    fn file_size_batch_stays_within_target() {
        let tmp = TempDir::new().unwrap();
        let inputs = vec![
            write_file(tmp.path(), "in/a.jpg", &[1; 4000]),
            write_file(tmp.path(), "in/b.webp", &[1; 4000]),
        ];
        let out = tmp.path().join("out");
        let target = 1000;

        let (report, _) = run(
            &MockBackend::new(100, 100, 0.5),
            &inputs,
            &out,
            ResizeSpec::ByFileSize {
                target_bytes: target,
            },
        );

        assert_eq!(report.processed, 2);
        for outcome in &report.outcomes {
            let FileOutcome::Succeeded { output, bytes, .. } = outcome else {
                panic!("unexpected failure: {outcome:?}");
            };
            assert!(*bytes <= target);
            assert_eq!(std::fs::metadata(output).unwrap().len(), *bytes);
        }
    }

    #[test]
    fn small_source_is_copied_byte_for_byte() {
        let tmp = TempDir::new().unwrap();
        let input = write_test_jpeg(tmp.path(), "in/photo.jpg", 64, 64);
        let original = std::fs::read(&input).unwrap();
        let out = tmp.path().join("out");

        let (report, _) = run(
            &RustBackend::new(),
            std::slice::from_ref(&input),
            &out,
            ResizeSpec::ByFileSize {
                target_bytes: original.len() as u64,
            },
        );

        assert!(matches!(
            &report.outcomes[0],
            FileOutcome::Succeeded { copied: true, dimensions: None, .. }
        ));
        assert_eq!(std::fs::read(out.join("photo.jpg")).unwrap(), original);
    }

    // =========================================================================
    // Per-file failures
    // =========================================================================

    #[test]
    fn failures_do_not_stop_the_batch() {
        let tmp = TempDir::new().unwrap();
        let inputs = vec![
            write_file(tmp.path(), "in/garbage.jpg", b"not an image"),
            tmp.path().join("in/missing.png"),
            write_test_png(tmp.path(), "in/good.png", 40, 20),
        ];
        let out = tmp.path().join("out");

        let (report, undo) = run(&RustBackend::new(), &inputs, &out, pixels(10));

        assert_eq!((report.processed, report.failed), (1, 2));
        let kinds: Vec<_> = report.outcomes.iter().map(FileOutcome::error_kind).collect();
        assert_eq!(
            kinds,
            vec![
                Some(ErrorKind::DecodeFailure),
                Some(ErrorKind::DecodeFailure),
                None
            ]
        );
        assert!(!out.join("garbage.jpg").exists());
        assert!(out.join("good.png").exists());
        assert_eq!(undo.len(), 1);
    }

    #[test]
    fn unattainable_png_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let inputs = vec![write_file(tmp.path(), "in/icon.png", &[1; 3000])];
        let out = tmp.path().join("out");
        let backend = MockBackend::with_size_model(2000, 1000, |_, _, _| 2000);

        let (report, undo) = run(
            &backend,
            &inputs,
            &out,
            ResizeSpec::ByFileSize { target_bytes: 1000 },
        );

        assert_eq!(
            report.outcomes[0].error_kind(),
            Some(ErrorKind::SizeUnattainable)
        );
        assert!(!out.join("icon.png").exists());
        assert!(undo.is_empty());
    }

    #[test]
    fn output_that_would_replace_source_fails() {
        let tmp = TempDir::new().unwrap();
        let input = write_file(tmp.path(), "photo.jpg", b"original");

        let (report, _) = run(
            &MockBackend::new(10, 10, 1.0),
            std::slice::from_ref(&input),
            tmp.path(),
            pixels(5),
        );

        assert_eq!(report.outcomes[0].error_kind(), Some(ErrorKind::WriteFailure));
        assert_eq!(std::fs::read(&input).unwrap(), b"original");
    }

    #[test]
    fn unwritable_destination_keeps_existing_entry() {
        let tmp = TempDir::new().unwrap();
        let inputs = vec![write_file(tmp.path(), "in/photo.jpg", b"x")];
        let out = tmp.path().join("out");
        // A non-empty directory where the output file should go
        let kept = write_file(&out, "photo.jpg/keep.txt", b"user data");

        let (report, undo) = run(&MockBackend::new(10, 10, 1.0), &inputs, &out, pixels(5));

        assert_eq!(report.outcomes[0].error_kind(), Some(ErrorKind::WriteFailure));
        assert_eq!(std::fs::read(&kept).unwrap(), b"user data");
        assert!(undo.is_empty());
        // No temp file left behind
        let entries: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn output_from_an_earlier_run_is_replaced_whole() {
        let tmp = TempDir::new().unwrap();
        let input = write_test_png(tmp.path(), "in/photo.png", 40, 20);
        let out = tmp.path().join("out");
        write_file(&out, "photo.png", &[0u8; 100_000]);

        let (report, _) = run(
            &RustBackend::new(),
            std::slice::from_ref(&input),
            &out,
            pixels(10),
        );

        let FileOutcome::Succeeded { bytes, .. } = &report.outcomes[0] else {
            panic!("unexpected failure: {:?}", report.outcomes[0]);
        };
        assert_eq!(std::fs::metadata(out.join("photo.png")).unwrap().len(), *bytes);
        assert_eq!(dimensions_of(&out.join("photo.png")), (20, 10));
    }

    #[test]
    fn duplicate_file_names_collide() {
        let tmp = TempDir::new().unwrap();
        let inputs = vec![
            write_file(tmp.path(), "a/photo.jpg", b"first"),
            write_file(tmp.path(), "b/photo.jpg", b"second"),
        ];
        let out = tmp.path().join("out");

        let (report, undo) = run(&MockBackend::new(10, 10, 1.0), &inputs, &out, pixels(5));

        assert!(report.outcomes[0].is_success());
        assert_eq!(report.outcomes[1].error_kind(), Some(ErrorKind::WriteFailure));
        assert_eq!(undo.len(), 1);
    }

    // =========================================================================
    // Aborts
    // =========================================================================

    #[test]
    fn invalid_spec_aborts_before_any_file() {
        let tmp = TempDir::new().unwrap();
        let inputs = vec![write_file(tmp.path(), "a.jpg", b"x")];
        let out = tmp.path().join("out");
        let backend = MockBackend::new(10, 10, 1.0);
        let mut undo = UndoLog::new();
        undo.record("earlier.jpg", "earlier-out.jpg");

        let result = run_batch(
            &backend,
            &inputs,
            &out,
            &ResizeSpec::ByFileSize { target_bytes: 0 },
            BatchOptions::default(),
            &mut undo,
        );

        assert!(matches!(result, Err(BatchError::InvalidSpec(_))));
        assert!(!out.exists());
        assert!(backend.get_operations().is_empty());
        // The previous batch is still undoable
        assert_eq!(undo.len(), 1);
    }

    #[test]
    fn output_dir_that_is_a_file_aborts() {
        let tmp = TempDir::new().unwrap();
        let blocker = write_file(tmp.path(), "out", b"x");
        let mut undo = UndoLog::new();

        let result = run_batch(
            &MockBackend::new(10, 10, 1.0),
            &[],
            &blocker,
            &pixels(5),
            BatchOptions::default(),
            &mut undo,
        );
        assert!(matches!(result, Err(BatchError::OutputDir { .. })));
    }

    // =========================================================================
    // Undo, events, cancellation
    // =========================================================================

    #[test]
    fn next_batch_replaces_undo_log() {
        let tmp = TempDir::new().unwrap();
        let first = vec![write_file(tmp.path(), "in/a.jpg", b"x")];
        let second = vec![write_file(tmp.path(), "in/b.jpg", b"x")];
        let out = tmp.path().join("out");
        let backend = MockBackend::new(10, 10, 1.0);
        let mut undo = UndoLog::new();

        for inputs in [&first, &second] {
            run_batch(&backend, inputs, &out, &pixels(5), BatchOptions::default(), &mut undo)
                .unwrap();
        }
        assert_eq!(undo.len(), 1);
        assert_eq!(undo.entries()[0].input, second[0]);

        assert!(undo.undo());
        assert!(out.join("a.jpg").exists());
        assert!(!out.join("b.jpg").exists());
    }

    #[test]
    fn events_bracket_every_file() {
        let tmp = TempDir::new().unwrap();
        let inputs = vec![
            write_file(tmp.path(), "in/a.jpg", b"x"),
            write_file(tmp.path(), "in/b.png", b"x"),
        ];
        let (tx, rx) = mpsc::channel();
        let options = BatchOptions {
            events: Some(tx),
            ..BatchOptions::default()
        };
        let mut undo = UndoLog::new();

        run_batch(
            &MockBackend::new(10, 10, 1.0),
            &inputs,
            &tmp.path().join("out"),
            &pixels(5),
            options,
            &mut undo,
        )
        .unwrap();

        let events: Vec<BatchEvent> = rx.into_iter().collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], BatchEvent::Started { total: 2, .. }));
        assert!(matches!(
            events[1],
            BatchEvent::FileFinished { index: 1, total: 2, .. }
        ));
        assert!(matches!(
            events[2],
            BatchEvent::FileFinished { index: 2, total: 2, .. }
        ));
        assert_eq!(
            events[3],
            BatchEvent::Finished {
                processed: 2,
                failed: 0,
                cancelled: false
            }
        );
    }

    #[test]
    fn raised_cancel_flag_processes_nothing() {
        let tmp = TempDir::new().unwrap();
        let inputs = vec![write_file(tmp.path(), "a.jpg", b"x")];
        let options = BatchOptions {
            cancel: Some(Arc::new(AtomicBool::new(true))),
            ..BatchOptions::default()
        };
        let mut undo = UndoLog::new();

        let report = run_batch(
            &MockBackend::new(10, 10, 1.0),
            &inputs,
            &tmp.path().join("out"),
            &pixels(5),
            options,
            &mut undo,
        )
        .unwrap();

        assert!(report.cancelled);
        assert!(report.outcomes.is_empty());
    }

    /// Raises the cancel flag while decoding the first file.
    struct CancelOnDecode {
        inner: MockBackend,
        flag: Arc<AtomicBool>,
    }

    impl ImageBackend for CancelOnDecode {
        fn decode(&self, bytes: &[u8], format: ImageFormatKind) -> Result<Image, BackendError> {
            self.flag.store(true, Ordering::Relaxed);
            self.inner.decode(bytes, format)
        }

        fn resize(&self, image: &Image, width: u32, height: u32) -> Result<Image, BackendError> {
            self.inner.resize(image, width, height)
        }

        fn encode(&self, image: &Image, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
            self.inner.encode(image, params)
        }
    }

    #[test]
    fn cancellation_finishes_current_file_then_stops() {
        let tmp = TempDir::new().unwrap();
        let inputs = vec![
            write_file(tmp.path(), "in/a.jpg", b"x"),
            write_file(tmp.path(), "in/b.jpg", b"x"),
            write_file(tmp.path(), "in/c.jpg", b"x"),
        ];
        let flag = Arc::new(AtomicBool::new(false));
        let backend = CancelOnDecode {
            inner: MockBackend::new(10, 10, 1.0),
            flag: Arc::clone(&flag),
        };
        let options = BatchOptions {
            cancel: Some(flag),
            ..BatchOptions::default()
        };
        let mut undo = UndoLog::new();

        let report = run_batch(
            &backend,
            &inputs,
            &tmp.path().join("out"),
            &pixels(5),
            options,
            &mut undo,
        )
        .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.processed, 1);
        assert_eq!(undo.len(), 1);
    }

    #[test]
    fn roll_back_removes_outputs_and_flags_report() {
        let tmp = TempDir::new().unwrap();
        let inputs = vec![
            write_file(tmp.path(), "in/a.jpg", b"x"),
            write_file(tmp.path(), "in/b.png", b"x"),
        ];
        let out = tmp.path().join("out");
        let (mut report, mut undo) =
            run(&MockBackend::new(10, 10, 1.0), &inputs, &out, pixels(5));
        assert!(!report.rolled_back);

        assert_eq!(report.roll_back(&mut undo), 2);

        assert!(report.rolled_back);
        assert!(!out.join("a.jpg").exists());
        assert!(!out.join("b.png").exists());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rolled_back"], true);

        // Nothing left to remove
        assert_eq!(report.roll_back(&mut undo), 0);
        assert!(report.rolled_back);
    }

    #[test]
    fn report_serializes_with_status_tags() {
        let outcome = FileOutcome::Failed {
            input: PathBuf::from("/in/a.png"),
            error: ErrorKind::SizeUnattainable,
            message: "too big".into(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "size_unattainable");
    }
}
