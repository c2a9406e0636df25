//! Box decoders.
//!
//! Both annotation formats decode into the same [`AnnotationRecord`] list so
//! that the verifier and renderer never need to know which format a box came
//! from. The format is picked once per run via [`AnnotationFormat`].

pub mod center;
pub mod corner;

use std::path::Path;

use serde::Serialize;

use crate::catalog::ClassCatalog;
use crate::error::VerifyError;
use crate::geometry::PixelRect;
use crate::render::LabelStyle;

/// The supported annotation encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationFormat {
    /// YOLO text files: `class_index cx cy w h`, normalized to the image size.
    Center,
    /// Pascal VOC XML: `<object>` entries with pixel `<bndbox>` corners.
    Corner,
}

impl AnnotationFormat {
    /// Extension (without dot) of this format's annotation files.
    pub fn annotation_extension(self) -> &'static str {
        match self {
            AnnotationFormat::Center => "txt",
            AnnotationFormat::Corner => "xml",
        }
    }

    /// How labels are drawn for this format.
    pub fn label_style(self) -> LabelStyle {
        match self {
            AnnotationFormat::Center => LabelStyle::Plate,
            AnnotationFormat::Corner => LabelStyle::Inline,
        }
    }

    /// Appended to the identifier when naming output images.
    pub fn default_output_suffix(self) -> &'static str {
        match self {
            AnnotationFormat::Center => "",
            AnnotationFormat::Corner => "_annotated",
        }
    }

    /// Decode one annotation file's contents into pixel boxes.
    pub fn decode(
        self,
        source: &str,
        ctx: &DecodeContext<'_>,
    ) -> Result<DecodedAnnotations, VerifyError> {
        match self {
            AnnotationFormat::Center => center::decode(source, ctx),
            AnnotationFormat::Corner => corner::decode(source, ctx),
        }
    }
}

impl std::fmt::Display for AnnotationFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnotationFormat::Center => f.write_str("yolo"),
            AnnotationFormat::Corner => f.write_str("voc"),
        }
    }
}

/// Everything a decoder may need besides the file contents.
#[derive(Clone, Copy, Debug)]
pub struct DecodeContext<'a> {
    /// Annotation file path, used in error messages only.
    pub path: &'a Path,
    pub image_width: u32,
    pub image_height: u32,
    pub catalog: Option<&'a ClassCatalog>,
}

/// The class a box belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassRef {
    /// A catalog index together with its name.
    Index { index: usize, name: String },
    /// A free-form class name, as written in XML annotations.
    Name(String),
}

impl ClassRef {
    /// Text drawn next to the box.
    pub fn label(&self) -> &str {
        match self {
            ClassRef::Index { name, .. } => name,
            ClassRef::Name(name) => name,
        }
    }
}

/// One decoded box, scoped to a single image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationRecord {
    pub rect: PixelRect,
    pub class: ClassRef,
}

/// Decoder output for one annotation file.
#[derive(Debug, Default)]
pub struct DecodedAnnotations {
    /// Boxes to draw, in file order.
    pub records: Vec<AnnotationRecord>,
    /// Boxes that were well-formed but could not be drawn, such as class
    /// indices past the end of the catalog.
    pub rejected: Vec<VerifyError>,
}
