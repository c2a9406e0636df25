//! Pascal VOC corner-format decoding.
//!
//! Only the parts needed for drawing are read: each `<object>`'s `<name>` and
//! its `<bndbox>` corners. Coordinates may be fractional and are truncated
//! toward zero.

use std::path::{Path, PathBuf};

use roxmltree::Node;

use super::{AnnotationRecord, ClassRef, DecodeContext, DecodedAnnotations};
use crate::error::VerifyError;
use crate::geometry::{BBoxXYXY, Pixel};

/// One `<object>` entry, before snapping to integer pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct VocObject {
    pub name: String,
    pub bbox: BBoxXYXY<Pixel>,
}

/// Decode a VOC XML document into one record per `<object>`, in document order.
pub fn decode(source: &str, ctx: &DecodeContext<'_>) -> Result<DecodedAnnotations, VerifyError> {
    let records = parse_voc_objects(source, ctx.path)?
        .into_iter()
        .map(|object| AnnotationRecord {
            rect: object.bbox.truncate_to_rect(),
            class: ClassRef::Name(object.name),
        })
        .collect();

    Ok(DecodedAnnotations {
        records,
        rejected: Vec::new(),
    })
}

/// Parse VOC XML from bytes. The input must be valid UTF-8.
pub fn from_voc_xml_slice(bytes: &[u8]) -> Result<Vec<VocObject>, VerifyError> {
    let xml = std::str::from_utf8(bytes).map_err(|source| VerifyError::VocXmlParse {
        path: PathBuf::from("<memory>"),
        message: format!("input is not valid UTF-8: {source}"),
    })?;
    parse_voc_objects(xml, Path::new("<memory>"))
}

/// Parse every `<object>` in a VOC document.
pub fn parse_voc_objects(xml: &str, path: &Path) -> Result<Vec<VocObject>, VerifyError> {
    let document = roxmltree::Document::parse(xml).map_err(|source| VerifyError::VocXmlParse {
        path: path.to_path_buf(),
        message: source.to_string(),
    })?;

    let annotation = document.root_element();
    if annotation.tag_name().name() != "annotation" {
        return Err(VerifyError::VocXmlParse {
            path: path.to_path_buf(),
            message: format!(
                "expected <annotation> root element, found <{}>",
                annotation.tag_name().name()
            ),
        });
    }

    let mut objects = Vec::new();
    for object in annotation
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == "object")
    {
        let name = required_child_text(object, "name", path, "<object>")?;
        let bndbox = required_child_element(object, "bndbox", path, "<object>")?;

        let xmin = parse_required_f64(bndbox, "xmin", path)?;
        let ymin = parse_required_f64(bndbox, "ymin", path)?;
        let xmax = parse_required_f64(bndbox, "xmax", path)?;
        let ymax = parse_required_f64(bndbox, "ymax", path)?;

        objects.push(VocObject {
            name,
            bbox: BBoxXYXY::from_xyxy(xmin, ymin, xmax, ymax),
        });
    }

    Ok(objects)
}

fn required_child_element<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<Node<'a, 'input>, VerifyError> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == tag)
        .ok_or_else(|| VerifyError::VocXmlParse {
            path: path.to_path_buf(),
            message: format!("missing <{tag}> in {context}"),
        })
}

fn required_child_text(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<String, VerifyError> {
    required_child_element(node, tag, path, context)?
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
        .ok_or_else(|| VerifyError::VocXmlParse {
            path: path.to_path_buf(),
            message: format!("empty <{tag}> in {context}"),
        })
}

fn parse_required_f64(node: Node<'_, '_>, tag: &str, path: &Path) -> Result<f64, VerifyError> {
    let raw = required_child_text(node, tag, path, "<bndbox>")?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(VerifyError::VocXmlParse {
            path: path.to_path_buf(),
            message: format!("invalid <{tag}> value '{raw}' in <bndbox>; expected a number"),
        }),
    }
}
