use std::path::PathBuf;
use thiserror::Error;

/// Which input a folder precondition refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FolderRole {
    Annotations,
    Images,
    Dataset,
    Output,
}

impl std::fmt::Display for FolderRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FolderRole::Annotations => "Annotation folder",
            FolderRole::Images => "Image folder",
            FolderRole::Dataset => "Dataset folder",
            FolderRole::Output => "Output folder",
        };
        f.write_str(name)
    }
}

/// Broad classes of failure, used to decide whether a run can continue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Folder layout or class list is unusable; the run aborts before any image.
    Precondition,
    /// An identifier has no image or no annotation file.
    AssetNotFound,
    /// An image or annotation could not be decoded.
    Decode,
    /// A class index points past the end of the class catalog.
    ClassIndex,
    /// An annotated image could not be written.
    Output,
    /// Everything else that ends a run.
    Run,
}

/// The main error type for annoverify operations.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{role} does not exist: {path}")]
    FolderMissing { role: FolderRole, path: PathBuf },

    #[error("{role} should only contain {expected} files, found {path}")]
    UnexpectedFile {
        role: FolderRole,
        path: PathBuf,
        expected: String,
    },

    #[error("{role} {path} does not contain any {expected} files")]
    NoMatchingFiles {
        role: FolderRole,
        path: PathBuf,
        expected: String,
    },

    #[error("{role} {path} cannot be used: {message}")]
    FolderUnusable {
        role: FolderRole,
        path: PathBuf,
        message: String,
    },

    #[error("Class file {path} is invalid: {message}")]
    ClassFileInvalid { path: PathBuf, message: String },

    #[error("Failed to parse class list YAML from {path}: {source}")]
    ClassFileYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Image {id} not found in {dir}")]
    ImageNotFound { id: String, dir: PathBuf },

    #[error("Annotation file for {id} not found in {dir}")]
    AnnotationNotFound { id: String, dir: PathBuf },

    #[error("Image {path} is invalid: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to read annotation {path}: {source}")]
    AnnotationRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse label file {path} at line {line}: {message}")]
    LabelParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Failed to parse VOC XML {path}: {message}")]
    VocXmlParse { path: PathBuf, message: String },

    #[error("Class index {index} at {path}:{line} is out of range for {class_count} class(es)")]
    ClassIndexOutOfRange {
        path: PathBuf,
        line: usize,
        index: usize,
        class_count: usize,
    },

    #[error("Failed to write annotated image {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to write JSON report: {0}")]
    ReportJson(#[from] serde_json::Error),

    #[error("Verification cancelled after {processed} image(s)")]
    Cancelled { processed: usize },

    #[error("Verification failed for {failed} image(s) in strict mode")]
    StrictFailures { failed: usize },
}

impl VerifyError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            VerifyError::FolderMissing { .. }
            | VerifyError::UnexpectedFile { .. }
            | VerifyError::NoMatchingFiles { .. }
            | VerifyError::FolderUnusable { .. }
            | VerifyError::ClassFileInvalid { .. }
            | VerifyError::ClassFileYaml { .. }
            | VerifyError::InvalidConfig(_) => ErrorCategory::Precondition,
            VerifyError::ImageNotFound { .. } | VerifyError::AnnotationNotFound { .. } => {
                ErrorCategory::AssetNotFound
            }
            VerifyError::ImageDecode { .. }
            | VerifyError::AnnotationRead { .. }
            | VerifyError::LabelParse { .. }
            | VerifyError::VocXmlParse { .. } => ErrorCategory::Decode,
            VerifyError::ClassIndexOutOfRange { .. } => ErrorCategory::ClassIndex,
            VerifyError::ImageWrite { .. } => ErrorCategory::Output,
            VerifyError::Io(_)
            | VerifyError::ThreadPool(_)
            | VerifyError::ReportJson(_)
            | VerifyError::Cancelled { .. }
            | VerifyError::StrictFailures { .. } => ErrorCategory::Run,
        }
    }

    /// Returns true if this error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Precondition | ErrorCategory::Run
        )
    }
}
