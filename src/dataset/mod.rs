//! Dataset folders: precondition checks and image/annotation matching.
//!
//! Images and annotations are paired by identifier, the file name without its
//! extension. Annotation files always use the format's single extension; the
//! image extension is picked by [`IMAGE_EXTENSION_PRIORITY`] through an
//! [`AssetIndex`].

pub mod ids;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::decode::AnnotationFormat;
use crate::error::{FolderRole, VerifyError};

/// Raster extensions accepted in image folders (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 8] = ["bmp", "jpg", "jpeg", "png", "gif", "tiff", "tif", "webp"];

/// Order in which image extensions are tried when resolving an identifier.
pub const IMAGE_EXTENSION_PRIORITY: [&str; 8] =
    ["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp", "gif"];

/// Where annotations and images live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatasetLayout {
    /// Separate annotation and image folders.
    Split {
        annotations_dir: PathBuf,
        images_dir: PathBuf,
    },
    /// One folder holding both images and annotation files.
    Combined { dataset_dir: PathBuf },
}

impl DatasetLayout {
    pub fn annotations_dir(&self) -> &Path {
        match self {
            DatasetLayout::Split {
                annotations_dir, ..
            } => annotations_dir,
            DatasetLayout::Combined { dataset_dir } => dataset_dir,
        }
    }

    pub fn images_dir(&self) -> &Path {
        match self {
            DatasetLayout::Split { images_dir, .. } => images_dir,
            DatasetLayout::Combined { dataset_dir } => dataset_dir,
        }
    }
}

/// A raster file resolved for an identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageAsset {
    pub id: String,
    pub path: PathBuf,
    /// Extension exactly as found on disk, without the dot.
    pub extension: String,
}

/// Check every input precondition for `layout`.
///
/// Returns the first violation. Nothing is created or modified.
pub fn validate_layout(layout: &DatasetLayout, format: AnnotationFormat) -> Result<(), VerifyError> {
    let annotation_ext = [format.annotation_extension()];
    let annotation_label = format!(".{}", format.annotation_extension());
    let image_label = IMAGE_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(", ");

    match layout {
        DatasetLayout::Split {
            annotations_dir,
            images_dir,
        } => {
            require_dir(annotations_dir, FolderRole::Annotations)?;
            require_dir(images_dir, FolderRole::Images)?;

            if let Some(path) = first_file_without_extension(annotations_dir, &annotation_ext)? {
                return Err(VerifyError::UnexpectedFile {
                    role: FolderRole::Annotations,
                    path,
                    expected: annotation_label,
                });
            }
            if let Some(path) = first_file_without_extension(images_dir, &IMAGE_EXTENSIONS)? {
                return Err(VerifyError::UnexpectedFile {
                    role: FolderRole::Images,
                    path,
                    expected: format!("image ({image_label})"),
                });
            }
        }
        DatasetLayout::Combined { dataset_dir } => {
            require_dir(dataset_dir, FolderRole::Dataset)?;

            if list_files_with_extensions(dataset_dir, &IMAGE_EXTENSIONS)?.is_empty() {
                return Err(VerifyError::NoMatchingFiles {
                    role: FolderRole::Dataset,
                    path: dataset_dir.clone(),
                    expected: format!("image ({image_label})"),
                });
            }
            if list_files_with_extensions(dataset_dir, &annotation_ext)?.is_empty() {
                return Err(VerifyError::NoMatchingFiles {
                    role: FolderRole::Dataset,
                    path: dataset_dir.clone(),
                    expected: annotation_label,
                });
            }
        }
    }

    Ok(())
}

/// Make sure the output folder exists, creating it if needed.
pub fn prepare_output_dir(path: &Path) -> Result<(), VerifyError> {
    if path.exists() {
        if path.is_dir() {
            return Ok(());
        }
        return Err(VerifyError::FolderUnusable {
            role: FolderRole::Output,
            path: path.to_path_buf(),
            message: "path exists and is not a directory".to_string(),
        });
    }

    fs::create_dir_all(path).map_err(|source| VerifyError::FolderUnusable {
        role: FolderRole::Output,
        path: path.to_path_buf(),
        message: source.to_string(),
    })?;
    log::debug!("created output folder {}", path.display());
    Ok(())
}

/// Files of one folder grouped by identifier, built once per run.
///
/// Extensions match case-insensitively, so `a.Png` resolves as well as
/// `a.png` and `a.PNG`. When one identifier has several files, the earliest
/// extension in the priority list wins; for the same extension, lower case is
/// preferred, then upper case, then any other casing.
#[derive(Clone, Debug, Default)]
pub struct AssetIndex {
    dir: PathBuf,
    by_id: HashMap<String, (PathBuf, String)>,
}

impl AssetIndex {
    /// Index the regular files directly inside `dir` whose extension is in
    /// `priority`.
    pub fn build(dir: &Path, priority: &[&str]) -> Result<Self, VerifyError> {
        let mut ranked: HashMap<String, ((usize, u8), PathBuf, String)> = HashMap::new();

        for path in list_files_with_extensions(dir, priority)? {
            let (Some(stem), Some(ext)) = (
                path.file_stem().and_then(|stem| stem.to_str()),
                path.extension().and_then(|ext| ext.to_str()),
            ) else {
                continue;
            };
            let Some(position) = priority
                .iter()
                .position(|candidate| ext.eq_ignore_ascii_case(candidate))
            else {
                continue;
            };
            let casing = if ext == priority[position] {
                0
            } else if ext == priority[position].to_ascii_uppercase() {
                1
            } else {
                2
            };
            let rank = (position, casing);

            // Files arrive sorted, so ties keep the first path by name.
            let better = match ranked.get(stem) {
                Some((existing, _, _)) => rank < *existing,
                None => true,
            };
            if better {
                let ext = ext.to_string();
                ranked.insert(stem.to_string(), (rank, path, ext));
            }
        }

        let by_id = ranked
            .into_iter()
            .map(|(id, (_, path, ext))| (id, (path, ext)))
            .collect();
        Ok(Self {
            dir: dir.to_path_buf(),
            by_id,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path and on-disk extension of the file chosen for `id`.
    pub fn resolve(&self, id: &str) -> Option<(&Path, &str)> {
        self.by_id
            .get(id)
            .map(|(path, ext)| (path.as_path(), ext.as_str()))
    }
}

/// Resolve the raster file for `id`.
pub fn resolve_image(images: &AssetIndex, id: &str) -> Result<ImageAsset, VerifyError> {
    images
        .resolve(id)
        .map(|(path, extension)| ImageAsset {
            id: id.to_string(),
            path: path.to_path_buf(),
            extension: extension.to_string(),
        })
        .ok_or_else(|| VerifyError::ImageNotFound {
            id: id.to_string(),
            dir: images.dir().to_path_buf(),
        })
}

/// Resolve the annotation file for `id`.
pub fn resolve_annotation(annotations: &AssetIndex, id: &str) -> Result<PathBuf, VerifyError> {
    annotations
        .resolve(id)
        .map(|(path, _)| path.to_path_buf())
        .ok_or_else(|| VerifyError::AnnotationNotFound {
            id: id.to_string(),
            dir: annotations.dir().to_path_buf(),
        })
}

/// Regular files directly inside `dir` whose extension is in `extensions`,
/// sorted by file name.
pub fn list_files_with_extensions(
    dir: &Path,
    extensions: &[&str],
) -> Result<Vec<PathBuf>, VerifyError> {
    let mut files: Vec<PathBuf> = list_files(dir)?
        .into_iter()
        .filter(|path| has_extension(path, extensions))
        .collect();
    files.sort();
    Ok(files)
}

pub fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}

fn require_dir(path: &Path, role: FolderRole) -> Result<(), VerifyError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(VerifyError::FolderMissing {
            role,
            path: path.to_path_buf(),
        })
    }
}

fn first_file_without_extension(
    dir: &Path,
    extensions: &[&str],
) -> Result<Option<PathBuf>, VerifyError> {
    let mut files = list_files(dir)?;
    files.sort();
    Ok(files
        .into_iter()
        .find(|path| !has_extension(path, extensions)))
}

/// Regular files directly inside `dir`; subdirectories are not descended into.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>, VerifyError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|source| {
            VerifyError::Io(
                source
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
            )
        })?;

        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
