//! Annoverify: see your object-detection labels before you train on them.
//!
//! Annoverify draws every box of a YOLO or Pascal VOC dataset onto its image
//! and writes the results to an output folder, so a person can flip through
//! them and spot shifted, swapped or mislabeled boxes.
//!
//! # Modules
//!
//! - [`dataset`]: Folder checks and image/annotation matching
//! - [`decode`]: YOLO text and VOC XML box decoders
//! - [`render`]: Box and label drawing
//! - [`verify`]: The per-run orchestrator and its report
//! - [`error`]: Error types for annoverify operations

pub mod catalog;
pub mod color;
pub mod dataset;
pub mod decode;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod render;
pub mod verify;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use color::{ColorMode, DEFAULT_COLOR_SEED, FIXED_BOX_COLOR};
use dataset::DatasetLayout;
use decode::AnnotationFormat;
pub use error::VerifyError;
use logging::Verbosity;
use verify::{CancelToken, VerificationReport, VerifyOptions};

/// The annoverify CLI application.
#[derive(Parser)]
#[command(name = "annoverify")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Draw YOLO text labels onto their images.
    Yolo(YoloArgs),
    /// Draw Pascal VOC XML annotations from a separate annotation folder.
    Voc(VocArgs),
    /// Draw Pascal VOC XML annotations kept next to their images.
    VocDataset(VocDatasetArgs),
}

#[derive(clap::Args)]
struct YoloArgs {
    /// Folder of `<id>.txt` label files.
    #[arg(long)]
    labels: PathBuf,

    /// Folder of raw images.
    #[arg(long)]
    images: PathBuf,

    /// Class list: one name per line, or a data.yaml.
    #[arg(long)]
    classes: PathBuf,

    /// Folder for annotated images (created if missing).
    #[arg(long)]
    output: PathBuf,

    /// Identifier list file; reused when valid, regenerated otherwise.
    #[arg(long)]
    name_list: Option<PathBuf>,

    /// Rebuild the name list even if it is valid.
    #[arg(long, requires = "name_list")]
    refresh_name_list: bool,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(clap::Args)]
struct VocArgs {
    /// Folder of `<id>.xml` annotation files.
    #[arg(long)]
    annotations: PathBuf,

    /// Folder of raw images.
    #[arg(long)]
    images: PathBuf,

    /// Folder for annotated images (created if missing).
    #[arg(long)]
    output: PathBuf,

    /// Optional class list used for per-class colors.
    #[arg(long)]
    classes: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(clap::Args)]
struct VocDatasetArgs {
    /// Folder holding both images and `<id>.xml` files.
    #[arg(long)]
    dataset: PathBuf,

    /// Folder for annotated images (created if missing).
    #[arg(long)]
    output: PathBuf,

    /// Optional class list used for per-class colors.
    #[arg(long)]
    classes: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

/// Flags shared by every subcommand.
#[derive(clap::Args)]
struct CommonArgs {
    /// Box coloring: one seeded color per class, or a single green.
    /// Defaults to seeded for yolo and fixed for voc.
    #[arg(long, value_enum)]
    colors: Option<ColorsArg>,

    /// Seed for per-class colors.
    #[arg(long, env = "ANNOVERIFY_SEED", default_value_t = DEFAULT_COLOR_SEED)]
    seed: u64,

    /// Outline thickness in pixels (default scales with image size).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    thickness: Option<u32>,

    /// Draw boxes only, without class names.
    #[arg(long)]
    no_labels: bool,

    /// Text appended to the identifier in output file names.
    #[arg(long)]
    suffix: Option<String>,

    /// Fail an image when any of its boxes has an unknown class index,
    /// and exit non-zero if any image failed.
    #[arg(long)]
    strict: bool,

    /// Worker threads (0 = one per CPU).
    #[arg(long, env = "ANNOVERIFY_JOBS", default_value_t = 1)]
    jobs: usize,

    /// Skip images whose annotated output already exists.
    #[arg(long)]
    resume: bool,

    /// Summary format.
    #[arg(long, value_enum, env = "ANNOVERIFY_REPORT", default_value_t = ReportFormat::Text)]
    report: ReportFormat,

    /// Hide the progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log per-image details.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ColorsArg {
    Seeded,
    Fixed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Run the annoverify CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), VerifyError> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("annoverify {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Draws object-detection annotations onto their images for review.");
        println!();
        println!("Run 'annoverify --help' for usage information.");
        return Ok(());
    };

    let (opts, common) = match command {
        Commands::Yolo(args) => {
            let layout = DatasetLayout::Split {
                annotations_dir: args.labels,
                images_dir: args.images,
            };
            let mut opts = VerifyOptions::new(AnnotationFormat::Center, layout, args.output);
            opts.class_file = Some(args.classes);
            opts.name_list = args.name_list;
            opts.refresh_name_list = args.refresh_name_list;
            (opts, args.common)
        }
        Commands::Voc(args) => {
            let layout = DatasetLayout::Split {
                annotations_dir: args.annotations,
                images_dir: args.images,
            };
            let mut opts = VerifyOptions::new(AnnotationFormat::Corner, layout, args.output);
            opts.class_file = args.classes;
            (opts, args.common)
        }
        Commands::VocDataset(args) => {
            let layout = DatasetLayout::Combined {
                dataset_dir: args.dataset,
            };
            let mut opts = VerifyOptions::new(AnnotationFormat::Corner, layout, args.output);
            opts.class_file = args.classes;
            (opts, args.common)
        }
    };

    run_verify(opts, common)
}

/// Execute a verification subcommand.
fn run_verify(mut opts: VerifyOptions, common: CommonArgs) -> Result<(), VerifyError> {
    logging::setup_logger(Verbosity::from_flags(common.quiet, common.verbose));

    match common.colors {
        Some(ColorsArg::Seeded) => opts.color_mode = ColorMode::Seeded { seed: common.seed },
        Some(ColorsArg::Fixed) => opts.color_mode = ColorMode::Fixed(FIXED_BOX_COLOR),
        None => {
            if let ColorMode::Seeded { .. } = opts.color_mode {
                opts.color_mode = ColorMode::Seeded { seed: common.seed };
            }
        }
    }
    opts.thickness = common.thickness;
    opts.draw_labels = !common.no_labels;
    opts.output_suffix = common.suffix;
    opts.strict = common.strict;
    opts.jobs = common.jobs;
    opts.resume = common.resume;
    opts.show_progress = !common.no_progress && !common.quiet;

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(err) = ctrlc::set_handler(move || handler_token.cancel()) {
        log::warn!("could not install Ctrl-C handler: {err}");
    }

    let report = verify::verify_dataset(&opts, &cancel)?;
    print_report(&report, common.report)?;

    if report.cancelled {
        return Err(VerifyError::Cancelled {
            processed: report.images_processed,
        });
    }
    if opts.strict && !report.is_ok() {
        return Err(VerifyError::StrictFailures {
            failed: report.images_failed,
        });
    }
    Ok(())
}

fn print_report(report: &VerificationReport, format: ReportFormat) -> Result<(), VerifyError> {
    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        ReportFormat::Text => print!("{report}"),
    }
    Ok(())
}
