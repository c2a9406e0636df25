//! Run summary and per-image issues.
//!
//! A [`VerificationReport`] is printed as text by default or serialized to
//! JSON for CI use.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::{ErrorCategory, VerifyError};

/// Aggregate result of one verification run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct VerificationReport {
    /// Identifiers that were visited, whether or not they succeeded.
    pub images_processed: usize,
    /// Images written to the output folder.
    pub images_annotated: usize,
    pub images_failed: usize,
    /// Images skipped because their output already existed (`--resume`).
    pub images_resumed: usize,
    pub boxes_drawn: usize,
    /// Boxes dropped from otherwise valid images.
    pub boxes_skipped: usize,
    pub cancelled: bool,
    pub output_dir: PathBuf,
    pub issues: Vec<VerificationIssue>,
}

impl VerificationReport {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            ..Self::default()
        }
    }

    /// Fold one image's outcome into the totals.
    pub fn record(&mut self, outcome: ImageOutcome) {
        self.images_processed += 1;
        match outcome.status {
            ImageStatus::Annotated => self.images_annotated += 1,
            ImageStatus::Resumed => self.images_resumed += 1,
            ImageStatus::Failed => self.images_failed += 1,
        }
        self.boxes_drawn += outcome.boxes_drawn;
        self.boxes_skipped += outcome.boxes_skipped;
        self.issues.extend(outcome.issues);
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Returns true if no image failed.
    pub fn is_ok(&self) -> bool {
        self.images_failed == 0
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cancelled {
            writeln!(f, "Verification cancelled; partial summary:")?;
        } else {
            writeln!(f, "Verification complete:")?;
        }
        writeln!(f, "  Total boxes drawn: {}", self.boxes_drawn)?;
        writeln!(f, "  Total images processed: {}", self.images_processed)?;
        writeln!(f, "  Images annotated: {}", self.images_annotated)?;
        if self.images_resumed > 0 {
            writeln!(f, "  Images already done: {}", self.images_resumed)?;
        }
        if self.images_failed > 0 {
            writeln!(f, "  Images failed: {}", self.images_failed)?;
        }
        if self.boxes_skipped > 0 {
            writeln!(f, "  Boxes skipped: {}", self.boxes_skipped)?;
        }
        writeln!(f, "  Annotated images saved in: {}", self.output_dir.display())?;

        if !self.issues.is_empty() {
            writeln!(f)?;
            writeln!(
                f,
                "{} error(s) and {} warning(s):",
                self.error_count(),
                self.warning_count()
            )?;
            for issue in &self.issues {
                writeln!(f, "  {issue}")?;
            }
        }

        Ok(())
    }
}

/// What happened to one identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    Annotated,
    Resumed,
    Failed,
}

/// Result of processing a single image.
#[derive(Clone, Debug)]
pub struct ImageOutcome {
    pub id: String,
    pub status: ImageStatus,
    pub boxes_drawn: usize,
    pub boxes_skipped: usize,
    pub output_path: Option<PathBuf>,
    pub issues: Vec<VerificationIssue>,
}

impl ImageOutcome {
    pub fn annotated(id: &str, boxes_drawn: usize, output_path: PathBuf) -> Self {
        Self {
            id: id.to_string(),
            status: ImageStatus::Annotated,
            boxes_drawn,
            boxes_skipped: 0,
            output_path: Some(output_path),
            issues: Vec::new(),
        }
    }

    pub fn resumed(id: &str, output_path: PathBuf) -> Self {
        Self {
            id: id.to_string(),
            status: ImageStatus::Resumed,
            boxes_drawn: 0,
            boxes_skipped: 0,
            output_path: Some(output_path),
            issues: Vec::new(),
        }
    }

    /// A failed image draws nothing and carries the error as its issue.
    pub fn failed(id: &str, error: &VerifyError) -> Self {
        Self {
            id: id.to_string(),
            status: ImageStatus::Failed,
            boxes_drawn: 0,
            boxes_skipped: 0,
            output_path: None,
            issues: vec![VerificationIssue::from_error(id, Severity::Error, error)],
        }
    }
}

/// A single problem tied to one identifier.
#[derive(Clone, Debug, Serialize)]
pub struct VerificationIssue {
    pub id: String,
    pub severity: Severity,
    pub code: IssueCode,
    pub message: String,
}

impl VerificationIssue {
    pub fn from_error(id: &str, severity: Severity, error: &VerifyError) -> Self {
        Self {
            id: id.to_string(),
            severity,
            code: IssueCode::for_error(error),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for VerificationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        write!(
            f,
            "[{}] {:?} in {}: {}",
            severity, self.code, self.id, self.message
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// A box was dropped but the image was still written.
    Warning,
    /// The image produced no output.
    Error,
}

/// A stable code identifying the type of issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    ImageNotFound,
    AnnotationNotFound,
    ImageUnreadable,
    AnnotationUnreadable,
    MalformedAnnotation,
    ClassIndexOutOfRange,
    WriteFailed,
    Other,
}

impl IssueCode {
    pub fn for_error(error: &VerifyError) -> Self {
        match error {
            VerifyError::ImageNotFound { .. } => IssueCode::ImageNotFound,
            VerifyError::AnnotationNotFound { .. } => IssueCode::AnnotationNotFound,
            VerifyError::ImageDecode { .. } => IssueCode::ImageUnreadable,
            VerifyError::AnnotationRead { .. } => IssueCode::AnnotationUnreadable,
            VerifyError::LabelParse { .. } | VerifyError::VocXmlParse { .. } => {
                IssueCode::MalformedAnnotation
            }
            VerifyError::ClassIndexOutOfRange { .. } => IssueCode::ClassIndexOutOfRange,
            other if other.category() == ErrorCategory::Output => IssueCode::WriteFailed,
            _ => IssueCode::Other,
        }
    }
}
