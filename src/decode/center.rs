//! YOLO center-format label decoding.
//!
//! Each non-blank line is `class_index cx cy w h` with the four box values
//! normalized to the image size.

use std::path::Path;

use super::{AnnotationRecord, ClassRef, DecodeContext, DecodedAnnotations};
use crate::error::VerifyError;
use crate::geometry::{BBoxXYXY, Pixel, PixelRect};

/// One parsed label line, still in normalized units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CenterRow {
    pub class_index: usize,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

impl CenterRow {
    /// Pixel rectangle for an image of `width` × `height`.
    pub fn to_rect(&self, width: u32, height: u32) -> PixelRect {
        let (width, height) = (f64::from(width), f64::from(height));
        BBoxXYXY::<Pixel>::from_cxcywh(
            self.cx * width,
            self.cy * height,
            self.w * width,
            self.h * height,
        )
        .round_to_rect()
    }
}

/// Decode a whole label file.
///
/// Any malformed line fails the file. Lines whose class index is outside the
/// catalog are reported in [`DecodedAnnotations::rejected`] and not drawn.
pub fn decode(source: &str, ctx: &DecodeContext<'_>) -> Result<DecodedAnnotations, VerifyError> {
    let mut decoded = DecodedAnnotations::default();

    for (line_idx, line) in source.lines().enumerate() {
        let line_num = line_idx + 1;
        let Some(row) = parse_label_line(line, ctx.path, line_num)? else {
            continue;
        };

        let class = match ctx.catalog {
            Some(catalog) => match catalog.name(row.class_index) {
                Some(name) => ClassRef::Index {
                    index: row.class_index,
                    name: name.to_string(),
                },
                None => {
                    decoded.rejected.push(VerifyError::ClassIndexOutOfRange {
                        path: ctx.path.to_path_buf(),
                        line: line_num,
                        index: row.class_index,
                        class_count: catalog.len(),
                    });
                    continue;
                }
            },
            None => ClassRef::Index {
                index: row.class_index,
                name: format!("class_{}", row.class_index),
            },
        };

        decoded.records.push(AnnotationRecord {
            rect: row.to_rect(ctx.image_width, ctx.image_height),
            class,
        });
    }

    Ok(decoded)
}

/// Parse one label line. Blank lines yield `Ok(None)`.
pub fn parse_label_line(
    line: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<Option<CenterRow>, VerifyError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // At most 6 tokens so pathological lines do not allocate unbounded memory.
    let tokens: Vec<&str> = trimmed.split_whitespace().take(6).collect();

    if tokens.len() != 5 {
        let message = if tokens.len() < 5 {
            format!("expected 5 tokens, found {}", tokens.len())
        } else {
            "expected 5 tokens, found more; segmentation and pose labels are not boxes"
                .to_string()
        };
        return Err(VerifyError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message,
        });
    }

    let class_index = tokens[0]
        .parse::<usize>()
        .map_err(|_| VerifyError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!(
                "invalid class index '{}'; expected non-negative integer",
                tokens[0]
            ),
        })?;

    let cx = parse_f64_token(tokens[1], "x_center", file_path, line_num)?;
    let cy = parse_f64_token(tokens[2], "y_center", file_path, line_num)?;
    let w = parse_f64_token(tokens[3], "width", file_path, line_num)?;
    let h = parse_f64_token(tokens[4], "height", file_path, line_num)?;

    Ok(Some(CenterRow {
        class_index,
        cx,
        cy,
        w,
        h,
    }))
}

/// Fuzz-only entrypoint for single-line parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_label_line(input: &str) -> Result<(), VerifyError> {
    let _ = parse_label_line(input, Path::new("<fuzz>"), 1)?;
    Ok(())
}

fn parse_f64_token(
    raw: &str,
    field_name: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<f64, VerifyError> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(VerifyError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!("invalid {field_name} '{raw}'; expected finite number"),
        }),
    }
}
