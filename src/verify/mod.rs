//! Dataset verification: the per-run orchestrator.
//!
//! A run validates the folder layout, loads the class catalog, builds the
//! color table, enumerates identifiers and then, for each identifier,
//! resolves its image and annotation, decodes the boxes, draws them and
//! writes the annotated image. Per-image problems become issues in the
//! [`VerificationReport`]; only precondition and run-level failures are
//! returned as errors.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use annoverify::dataset::DatasetLayout;
//! use annoverify::decode::AnnotationFormat;
//! use annoverify::verify::{verify_dataset, CancelToken, VerifyOptions};
//!
//! let layout = DatasetLayout::Split {
//!     annotations_dir: PathBuf::from("labels"),
//!     images_dir: PathBuf::from("images"),
//! };
//! let mut opts = VerifyOptions::new(AnnotationFormat::Center, layout, PathBuf::from("out"));
//! opts.class_file = Some(PathBuf::from("classes.txt"));
//! let report = verify_dataset(&opts, &CancelToken::new())?;
//! println!("{report}");
//! # Ok::<(), annoverify::error::VerifyError>(())
//! ```

pub mod report;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use image::{ImageError, ImageFormat};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::catalog::ClassCatalog;
use crate::color::{ColorMode, ColorTable, FIXED_BOX_COLOR};
use crate::dataset::ids::{enumerate_ids, load_or_create_name_list, IdSource};
use crate::dataset::{self, AssetIndex, DatasetLayout, IMAGE_EXTENSION_PRIORITY};
use crate::decode::{AnnotationFormat, DecodeContext};
use crate::error::VerifyError;
use crate::render::{draw_overlay, Overlay};

pub use report::{
    ImageOutcome, ImageStatus, IssueCode, Severity, VerificationIssue, VerificationReport,
};

/// Options for a verification run.
#[derive(Clone, Debug)]
pub struct VerifyOptions {
    pub format: AnnotationFormat,
    pub layout: DatasetLayout,
    pub output_dir: PathBuf,
    /// `classes.txt` or `data.yaml`. Required for the center format.
    pub class_file: Option<PathBuf>,
    /// Persisted identifier list (center format with a split layout).
    pub name_list: Option<PathBuf>,
    /// Rebuild the name list even if the existing one is valid.
    pub refresh_name_list: bool,
    pub color_mode: ColorMode,
    /// Explicit outline thickness; `None` derives it per image.
    pub thickness: Option<u32>,
    pub draw_labels: bool,
    /// Fail the whole image when any box has an unknown class index.
    pub strict: bool,
    /// Worker threads; 0 uses one per CPU, 1 runs sequentially.
    pub jobs: usize,
    /// Skip identifiers whose output file already exists.
    pub resume: bool,
    /// Overrides the format's default output name suffix.
    pub output_suffix: Option<String>,
    pub show_progress: bool,
}

impl VerifyOptions {
    /// Options with the format's defaults: seeded colors and plate labels
    /// for the center format, fixed green and inline labels for the corner
    /// format.
    pub fn new(format: AnnotationFormat, layout: DatasetLayout, output_dir: PathBuf) -> Self {
        let color_mode = match format {
            AnnotationFormat::Center => ColorMode::default(),
            AnnotationFormat::Corner => ColorMode::Fixed(FIXED_BOX_COLOR),
        };

        Self {
            format,
            layout,
            output_dir,
            class_file: None,
            name_list: None,
            refresh_name_list: false,
            color_mode,
            thickness: None,
            draw_labels: true,
            strict: false,
            jobs: 1,
            resume: false,
            output_suffix: None,
            show_progress: false,
        }
    }

    fn suffix(&self) -> &str {
        self.output_suffix
            .as_deref()
            .unwrap_or_else(|| self.format.default_output_suffix())
    }
}

/// Shared flag that stops a run before its next image.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything the per-image step reads. Built once, shared read-only.
struct RunContext<'a> {
    opts: &'a VerifyOptions,
    catalog: Option<ClassCatalog>,
    colors: ColorTable,
    images: AssetIndex,
    annotations: AssetIndex,
    suffix: &'a str,
}

/// Run a full verification.
///
/// Returns an error only when the run cannot start (a precondition failed)
/// or the worker pool cannot be built. A cancelled run returns its partial
/// report with `cancelled` set.
pub fn verify_dataset(
    opts: &VerifyOptions,
    cancel: &CancelToken,
) -> Result<VerificationReport, VerifyError> {
    dataset::validate_layout(&opts.layout, opts.format)?;

    let catalog = load_catalog(opts)?;
    let colors = ColorTable::build(opts.color_mode, catalog.as_ref());
    let ids = collect_ids(opts)?;
    let images = AssetIndex::build(opts.layout.images_dir(), &IMAGE_EXTENSION_PRIORITY)?;
    let annotations = AssetIndex::build(
        opts.layout.annotations_dir(),
        &[opts.format.annotation_extension()],
    )?;

    dataset::prepare_output_dir(&opts.output_dir)?;
    log::info!(
        "verifying {} image(s) as {} annotations into {}",
        ids.len(),
        opts.format,
        opts.output_dir.display()
    );

    let ctx = RunContext {
        opts,
        catalog,
        colors,
        images,
        annotations,
        suffix: opts.suffix(),
    };

    let progress = progress_bar(ids.len() as u64, opts.show_progress);
    let boxes_so_far = AtomicUsize::new(0);
    let outcomes = if opts.jobs == 1 {
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in &ids {
            if cancel.is_cancelled() {
                break;
            }
            let outcome = process_image(id, &ctx);
            tick(&progress, &boxes_so_far, &outcome);
            outcomes.push(outcome);
        }
        outcomes
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(opts.jobs)
            .build()?;
        pool.install(|| {
            ids.par_iter()
                .map(|id| {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    let outcome = process_image(id, &ctx);
                    tick(&progress, &boxes_so_far, &outcome);
                    Some(outcome)
                })
                .collect::<Vec<_>>()
        })
        .into_iter()
        .flatten()
        .collect()
    };
    progress.finish_and_clear();

    let mut report = VerificationReport::new(opts.output_dir.clone());
    for outcome in outcomes {
        report.record(outcome);
    }
    report.cancelled = cancel.is_cancelled() && report.images_processed < ids.len();

    if report.cancelled {
        log::warn!(
            "cancelled after {} of {} image(s)",
            report.images_processed,
            ids.len()
        );
    }

    Ok(report)
}

fn load_catalog(opts: &VerifyOptions) -> Result<Option<ClassCatalog>, VerifyError> {
    let catalog = match &opts.class_file {
        Some(path) => {
            let catalog = ClassCatalog::load(path)?;
            log::debug!("loaded {} class(es) from {}", catalog.len(), path.display());
            Some(catalog)
        }
        None => None,
    };

    if catalog.is_none() {
        match (opts.format, opts.color_mode) {
            (AnnotationFormat::Center, _) => {
                return Err(VerifyError::InvalidConfig(
                    "the yolo format needs a class file".to_string(),
                ));
            }
            (AnnotationFormat::Corner, ColorMode::Seeded { .. }) => {
                return Err(VerifyError::InvalidConfig(
                    "seeded colors for voc annotations need a class file".to_string(),
                ));
            }
            (AnnotationFormat::Corner, ColorMode::Fixed(_)) => {}
        }
    }

    Ok(catalog)
}

fn collect_ids(opts: &VerifyOptions) -> Result<Vec<String>, VerifyError> {
    let images_dir = opts.layout.images_dir();

    if let Some(name_list) = &opts.name_list {
        let list = load_or_create_name_list(name_list, images_dir, opts.refresh_name_list)?;
        if list.regenerated {
            log::info!(
                "wrote {} identifier(s) to name list {}",
                list.ids.len(),
                list.path.display()
            );
        } else {
            log::info!(
                "using {} identifier(s) from name list {}",
                list.ids.len(),
                list.path.display()
            );
        }
        return Ok(list.ids);
    }

    match (&opts.layout, opts.format) {
        (DatasetLayout::Split { .. }, AnnotationFormat::Corner) => enumerate_ids(
            IdSource::Annotations(opts.layout.annotations_dir(), opts.format.annotation_extension()),
        ),
        _ => enumerate_ids(IdSource::Images(images_dir)),
    }
}

fn progress_bar(len: u64, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
    {
        bar.set_style(style);
    }
    bar
}

/// Advance the bar and show the running box total.
fn tick(progress: &ProgressBar, boxes_so_far: &AtomicUsize, outcome: &ImageOutcome) {
    let total =
        boxes_so_far.fetch_add(outcome.boxes_drawn, Ordering::Relaxed) + outcome.boxes_drawn;
    progress.set_message(format!("{total} boxes"));
    progress.inc(1);
}

/// Process one identifier. Never fails; problems become issues.
fn process_image(id: &str, ctx: &RunContext<'_>) -> ImageOutcome {
    match try_process_image(id, ctx) {
        Ok(outcome) => outcome,
        Err(err) => {
            log::warn!("{id}: {err}");
            ImageOutcome::failed(id, &err)
        }
    }
}

fn try_process_image(id: &str, ctx: &RunContext<'_>) -> Result<ImageOutcome, VerifyError> {
    let opts = ctx.opts;
    let asset = dataset::resolve_image(&ctx.images, id)?;
    let output_path = opts
        .output_dir
        .join(format!("{}{}.{}", asset.id, ctx.suffix, asset.extension));

    if opts.resume && output_path.is_file() {
        log::debug!("{id}: output exists, skipping");
        return Ok(ImageOutcome::resumed(id, output_path));
    }

    let annotation_path = dataset::resolve_annotation(&ctx.annotations, id)?;
    let source = fs::read_to_string(&annotation_path).map_err(|source| {
        VerifyError::AnnotationRead {
            path: annotation_path.clone(),
            source,
        }
    })?;

    let mut image = image::open(&asset.path)
        .map_err(|source| VerifyError::ImageDecode {
            path: asset.path.clone(),
            source,
        })?
        .to_rgb8();

    let decoded = opts.format.decode(
        &source,
        &DecodeContext {
            path: &annotation_path,
            image_width: image.width(),
            image_height: image.height(),
            catalog: ctx.catalog.as_ref(),
        },
    )?;

    let mut rejected = decoded.rejected.into_iter();
    if opts.strict {
        if let Some(first) = rejected.next() {
            let mut outcome = ImageOutcome::failed(id, &first);
            for err in rejected {
                outcome
                    .issues
                    .push(VerificationIssue::from_error(id, Severity::Error, &err));
            }
            log::warn!("{id}: {first}");
            return Ok(outcome);
        }
    }

    let style = opts.format.label_style();
    for record in &decoded.records {
        let overlay = Overlay {
            rect: record.rect,
            color: ctx.colors.color_for(&record.class),
            label: opts.draw_labels.then(|| record.class.label()),
            thickness: opts.thickness,
            style,
        };
        draw_overlay(&mut image, &overlay);
    }

    write_atomically(&image, &output_path)?;
    log::debug!(
        "{id}: drew {} box(es) into {}",
        decoded.records.len(),
        output_path.display()
    );

    let mut outcome = ImageOutcome::annotated(id, decoded.records.len(), output_path);
    for err in rejected {
        log::warn!("{id}: {err}");
        outcome.boxes_skipped += 1;
        outcome
            .issues
            .push(VerificationIssue::from_error(id, Severity::Warning, &err));
    }
    Ok(outcome)
}

/// Encode next to the destination, then rename into place.
fn write_atomically(image: &image::RgbImage, path: &Path) -> Result<(), VerifyError> {
    let write_error = |source: ImageError| VerifyError::ImageWrite {
        path: path.to_path_buf(),
        source,
    };

    let format = ImageFormat::from_path(path).map_err(write_error)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{file_name}.partial"));

    let result = image
        .save_with_format(&temp_path, format)
        .and_then(|()| fs::rename(&temp_path, path).map_err(ImageError::IoError));

    if let Err(source) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(write_error(source));
    }
    Ok(())
}
