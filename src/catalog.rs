//! Class catalogs: the ordered list mapping class index to class name.
//!
//! A catalog is read once per run from either a plain `classes.txt`
//! (one name per line, index = 0-based line number) or an Ultralytics-style
//! `data.yaml` whose `names` key is a list or an index → name mapping.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::VerifyError;

/// Ordered class names, immutable for the duration of a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassCatalog {
    names: Vec<String>,
    index_by_name: HashMap<String, usize>,
}

impl ClassCatalog {
    pub fn new(names: Vec<String>) -> Self {
        let mut index_by_name = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            index_by_name.entry(name.clone()).or_insert(index);
        }
        Self {
            names,
            index_by_name,
        }
    }

    /// Load a catalog from `classes.txt` or `data.yaml` (chosen by extension).
    pub fn load(path: &Path) -> Result<Self, VerifyError> {
        if !path.is_file() {
            return Err(VerifyError::ClassFileInvalid {
                path: path.to_path_buf(),
                message: "file does not exist".to_string(),
            });
        }

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        let data = fs::read_to_string(path).map_err(|source| VerifyError::ClassFileInvalid {
            path: path.to_path_buf(),
            message: source.to_string(),
        })?;

        let names = if is_yaml {
            parse_data_yaml(&data, path)?
        } else {
            parse_classes_txt(&data, path)?
        };

        if names.is_empty() {
            return Err(VerifyError::ClassFileInvalid {
                path: path.to_path_buf(),
                message: "no class names found".to_string(),
            });
        }

        Ok(Self::new(names))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// First index carrying `name`, if any.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index_by_name.get(name).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

fn parse_classes_txt(data: &str, path: &Path) -> Result<Vec<String>, VerifyError> {
    let mut names = Vec::new();

    // Leading and trailing blank lines are tolerated; gaps inside the list would
    // silently shift every following index, so they are rejected.
    for (line_idx, line) in data.trim().lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(VerifyError::ClassFileInvalid {
                path: path.to_path_buf(),
                message: format!("line {} is empty", line_idx + 1),
            });
        }
        names.push(trimmed.to_string());
    }

    Ok(names)
}

#[derive(Debug, Deserialize)]
struct DataYaml {
    names: DataYamlNames,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DataYamlNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<usize, String>),
}

fn parse_data_yaml(data: &str, path: &Path) -> Result<Vec<String>, VerifyError> {
    let parsed: DataYaml =
        serde_yaml::from_str(data).map_err(|source| VerifyError::ClassFileYaml {
            path: path.to_path_buf(),
            source,
        })?;

    let names = match parsed.names {
        DataYamlNames::Sequence(names) => names,
        DataYamlNames::Mapping(mapping) => {
            let len = mapping.keys().next_back().map_or(0, |max| max + 1);
            (0..len)
                .map(|index| match mapping.get(&index) {
                    Some(name) if !name.trim().is_empty() => name.clone(),
                    _ => format!("class_{index}"),
                })
                .collect()
        }
    };

    Ok(names)
}
