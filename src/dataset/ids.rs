//! Identifier enumeration and the optional name-list file.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::{list_files_with_extensions, IMAGE_EXTENSIONS};
use crate::error::VerifyError;

const NAME_LIST_EXTENSION: &str = "txt";

/// Where identifiers come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdSource<'a> {
    /// Raster files in the image folder.
    Images(&'a Path),
    /// Annotation files with the given extension.
    Annotations(&'a Path, &'a str),
}

/// List identifiers in lexicographic order without duplicates.
pub fn enumerate_ids(source: IdSource<'_>) -> Result<Vec<String>, VerifyError> {
    let files = match source {
        IdSource::Images(dir) => list_files_with_extensions(dir, &IMAGE_EXTENSIONS)?,
        IdSource::Annotations(dir, ext) => list_files_with_extensions(dir, &[ext])?,
    };

    let mut ids = BTreeSet::new();
    for path in files {
        match path.file_stem().and_then(|stem| stem.to_str()) {
            Some(stem) if !stem.is_empty() => {
                ids.insert(stem.to_string());
            }
            _ => log::warn!("skipping file with unusable name: {}", path.display()),
        }
    }

    Ok(ids.into_iter().collect())
}

/// Identifier list persisted between runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameList {
    /// Where the list was read from or written to.
    pub path: PathBuf,
    pub ids: Vec<String>,
    /// True if the file was (re)generated during this call.
    pub regenerated: bool,
}

/// Reuse the name list at `path` when it is valid, otherwise rebuild it from
/// `images_dir` and write it out.
///
/// A path without a `.txt` extension is never read; the regenerated list is
/// written next to it with the extension replaced.
pub fn load_or_create_name_list(
    path: &Path,
    images_dir: &Path,
    refresh: bool,
) -> Result<NameList, VerifyError> {
    let has_txt_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(NAME_LIST_EXTENSION));

    if has_txt_extension && !refresh && path.is_file() {
        match read_name_list(path) {
            Ok(ids) => {
                return Ok(NameList {
                    path: path.to_path_buf(),
                    ids,
                    regenerated: false,
                });
            }
            Err(reason) => {
                log::warn!(
                    "name list {} is unusable ({reason}), regenerating it",
                    path.display()
                );
            }
        }
    }

    let target = if has_txt_extension {
        path.to_path_buf()
    } else {
        let replaced = path.with_extension(NAME_LIST_EXTENSION);
        log::warn!(
            "name list {} does not end in .txt, writing {} instead",
            path.display(),
            replaced.display()
        );
        replaced
    };

    let ids = enumerate_ids(IdSource::Images(images_dir))?;
    write_name_list(&target, &ids)?;

    Ok(NameList {
        path: target,
        ids,
        regenerated: true,
    })
}

/// Parse a name list, returning a reason string when it cannot be reused.
fn read_name_list(path: &Path) -> Result<Vec<String>, String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    let text = String::from_utf8(bytes).map_err(|_| "not valid UTF-8".to_string())?;

    let mut ids = BTreeSet::new();
    for (idx, line) in text.lines().enumerate() {
        let id = line.trim();
        if id.is_empty() {
            continue;
        }
        if id.contains(['/', '\\']) {
            return Err(format!("line {} contains a path separator", idx + 1));
        }
        ids.insert(id.to_string());
    }

    if ids.is_empty() {
        return Err("no identifiers".to_string());
    }
    Ok(ids.into_iter().collect())
}

fn write_name_list(path: &Path, ids: &[String]) -> Result<(), VerifyError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut contents = ids.join("\n");
    if !contents.is_empty() {
        contents.push('\n');
    }
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::write(path, b"x").expect("write file");
    }

    #[test]
    fn image_ids_are_sorted_and_deduplicated() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("b.jpg"));
        touch(&temp.path().join("a.png"));
        touch(&temp.path().join("a.JPG"));
        touch(&temp.path().join("c.txt"));

        let ids = enumerate_ids(IdSource::Images(temp.path())).expect("enumerate");
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn annotation_ids_use_the_given_extension() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("z.xml"));
        touch(&temp.path().join("y.xml"));
        touch(&temp.path().join("x.jpg"));

        let ids = enumerate_ids(IdSource::Annotations(temp.path(), "xml")).expect("enumerate");
        assert_eq!(ids, vec!["y".to_string(), "z".to_string()]);
    }

    #[test]
    fn valid_name_list_is_reused() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("a.jpg"));
        let list = temp.path().join("names.txt");
        fs::write(&list, "img_2\nimg_1\n\n").expect("write list");

        let loaded = load_or_create_name_list(&list, temp.path(), false).expect("load");
        assert!(!loaded.regenerated);
        assert_eq!(loaded.ids, vec!["img_1".to_string(), "img_2".to_string()]);
    }

    #[test]
    fn missing_or_malformed_name_list_is_regenerated() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let images = temp.path().join("images");
        fs::create_dir_all(&images).expect("images dir");
        touch(&images.join("cat.png"));
        touch(&images.join("dog.jpg"));

        let list = temp.path().join("names.txt");
        let created = load_or_create_name_list(&list, &images, false).expect("create");
        assert!(created.regenerated);
        assert_eq!(
            fs::read_to_string(&list).expect("read list"),
            "cat\ndog\n"
        );

        fs::write(&list, "bad/entry\n").expect("corrupt list");
        let rebuilt = load_or_create_name_list(&list, &images, false).expect("rebuild");
        assert!(rebuilt.regenerated);
        assert_eq!(rebuilt.ids, vec!["cat".to_string(), "dog".to_string()]);
    }

    #[test]
    fn wrong_extension_writes_txt_sibling() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("a.bmp"));
        let requested = temp.path().join("names.csv");

        let list = load_or_create_name_list(&requested, temp.path(), false).expect("create");
        assert_eq!(list.path, temp.path().join("names.txt"));
        assert!(list.path.is_file());
        assert!(!requested.exists());
    }

    #[test]
    fn refresh_ignores_existing_list() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("new.jpg"));
        let list = temp.path().join("names.txt");
        fs::write(&list, "old\n").expect("write list");

        let loaded = load_or_create_name_list(&list, temp.path(), true).expect("refresh");
        assert!(loaded.regenerated);
        assert_eq!(loaded.ids, vec!["new".to_string()]);
    }
}
