use batch_resize::batch::{self, BatchOptions};
use batch_resize::types::ResizeSpec;
use batch_resize::undo::UndoLog;
use batch_resize::{config, output, scan};
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

/// Shared flags for commands that take input paths.
#[derive(clap::Args, Clone)]
struct InputArgs {
    /// Image files and/or directories to process
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Descend into subdirectories of directory inputs
    #[arg(long, short)]
    recursive: bool,
}

#[derive(Parser)]
#[command(name = "batch-resize")]
#[command(about = "Batch-resize images to a pixel size or a target file size")]
#[command(long_about = "\
Batch-resize images to a pixel size or a target file size

Every input is written to the output directory under its own file name, in
its own format. Directories are expanded to the images they contain.

Targets (pick one):

  --pixels N      scale so the shorter edge is N pixels
  --size-mb MB    make each file at most MB megabytes (1 MB = 1024*1024 bytes)

In file-size mode, sources already small enough are copied unchanged. JPEG,
WebP and AVIF are fitted by scale (and, with the estimate strategy, quality);
PNG, BMP, TIFF and GIF by scale only.

Run 'batch-resize gen-config' to generate a documented batch-resize.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory holding batch-resize.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize images into an output directory
    #[command(group(
        ArgGroup::new("target")
            .required(true)
            .args(["pixels", "size_mb"]),
    ))]
    Resize {
        #[command(flatten)]
        input: InputArgs,

        /// Output directory (created if absent)
        #[arg(long, short)]
        output: PathBuf,

        /// Shortest side in pixels
        #[arg(long)]
        pixels: Option<String>,

        /// Target file size in megabytes
        #[arg(long)]
        size_mb: Option<String>,

        /// Print the batch report as JSON instead of progress lines
        #[arg(long)]
        json: bool,

        /// Remove this batch's outputs again if any file fails
        #[arg(long)]
        all_or_nothing: bool,
    },
    /// List the files a resize would process, without touching them
    Check(InputArgs),
    /// Print a stock batch-resize.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Resize {
            input,
            output: output_dir,
            pixels,
            size_mb,
            json,
            all_or_nothing,
        } => {
            let spec = ResizeSpec::parse(pixels.as_deref(), size_mb.as_deref())?;
            let resizer_config = config::load_config(&cli.config_dir)?;
            let inputs = scan::collect_inputs(&input.inputs, input.recursive)?;
            if inputs.files.is_empty() {
                return Err("no image files found in the given inputs".into());
            }

            let mut options = BatchOptions::from_config(&resizer_config);
            let mut undo = UndoLog::new();

            let mut report = if json {
                batch::resize_batch(&inputs.files, &output_dir, &spec, options, &mut undo)?
            } else {
                let (tx, rx) = std::sync::mpsc::channel();
                let printer = std::thread::spawn(move || {
                    for event in rx {
                        output::print_batch_event(&event);
                    }
                });
                options.events = Some(tx);
                let report =
                    batch::resize_batch(&inputs.files, &output_dir, &spec, options, &mut undo)?;
                printer.join().ok();
                output::print_summary(&report);
                report
            };

            if all_or_nothing && report.has_failures() {
                let removed = report.roll_back(&mut undo);
                if !json {
                    output::print_rollback(removed);
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            if report.has_failures() {
                let attempted = report.outcomes.len();
                return Err(format!("{} of {attempted} files failed", report.failed).into());
            }
        }
        Command::Check(input) => {
            let inputs = scan::collect_inputs(&input.inputs, input.recursive)?;
            output::print_input_list(&inputs);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
