#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

/// Background color of fixture images; no drawn box uses it.
pub const BACKGROUND: Rgb<u8> = Rgb([12, 34, 56]);

pub fn write_image(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    RgbImage::from_pixel(width, height, BACKGROUND)
        .save(path)
        .expect("write image file");
}

pub fn write_text(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, contents).expect("write text file");
}

/// A VOC document with one `<object>` per `(name, xmin, ymin, xmax, ymax)`.
pub fn voc_xml(filename: &str, objects: &[(&str, f64, f64, f64, f64)]) -> String {
    let mut xml = format!("<annotation>\n  <filename>{filename}</filename>\n");
    for (name, xmin, ymin, xmax, ymax) in objects {
        xml.push_str(&format!(
            "  <object>\n    <name>{name}</name>\n    <bndbox>\n      \
             <xmin>{xmin}</xmin>\n      <ymin>{ymin}</ymin>\n      \
             <xmax>{xmax}</xmax>\n      <ymax>{ymax}</ymax>\n    </bndbox>\n  </object>\n"
        ));
    }
    xml.push_str("</annotation>\n");
    xml
}

/// Paths of a split YOLO dataset rooted in a temp dir.
pub struct YoloFixture {
    pub labels: PathBuf,
    pub images: PathBuf,
    pub classes: PathBuf,
    pub output: PathBuf,
}

impl YoloFixture {
    pub fn new(root: &Path) -> Self {
        let fixture = Self {
            labels: root.join("labels"),
            images: root.join("images"),
            classes: root.join("classes.txt"),
            output: root.join("out"),
        };
        fs::create_dir_all(&fixture.labels).expect("create labels dir");
        fs::create_dir_all(&fixture.images).expect("create images dir");
        write_text(&fixture.classes, "person\ncar\n");
        fixture
    }
}

/// Sorted file names in `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| {
            entry
                .expect("dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
