//! Overlay rendering: box outlines and class labels composited onto a raster.
//!
//! Everything here mutates an [`RgbImage`] in place; the caller decides when
//! the finished image is written.

pub mod font;

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::geometry::{round_half_even, PixelRect};

/// Text color on label plates (a slightly warm white).
pub const PLATE_TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 225]);

/// Gap in pixels between the plate top and the text cell.
const PLATE_PADDING: i64 = 3;
/// Plate-style text baseline offset above the box top edge.
const PLATE_BASELINE_OFFSET: i64 = 2;
/// Inline-style text baseline offset above the box top edge.
const INLINE_BASELINE_OFFSET: i64 = 5;

/// How a label is attached to its box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelStyle {
    /// Filled plate in the box color above the top-left corner, light text on top.
    Plate,
    /// Text in the box color directly above the box, no plate.
    Inline,
}

/// Outline thickness used when none is given: about 0.1% of the mean side, plus one.
pub fn default_thickness(width: u32, height: u32) -> u32 {
    round_half_even(0.002 * (f64::from(height) + f64::from(width)) / 2.0).max(0) as u32 + 1
}

/// Integer glyph scale for a font scale expressed relative to line thickness.
fn glyph_scale(font_scale: f64) -> u32 {
    (round_half_even(font_scale * 3.0).max(1) as u32).min(font::MAX_GLYPH_SCALE)
}

/// A single box to composite.
#[derive(Clone, Copy, Debug)]
pub struct Overlay<'a> {
    pub rect: PixelRect,
    pub color: Rgb<u8>,
    pub label: Option<&'a str>,
    /// Explicit outline thickness; `None` derives it from the image size.
    pub thickness: Option<u32>,
    pub style: LabelStyle,
}

/// Draw one box (and its label, if any) onto `image`.
pub fn draw_overlay(image: &mut RgbImage, overlay: &Overlay<'_>) {
    let (width, height) = image.dimensions();
    let thickness = overlay
        .thickness
        .unwrap_or_else(|| default_thickness(width, height))
        .max(1);

    let rect = overlay.rect.normalized();
    draw_outline(image, &rect, thickness, overlay.color);

    let Some(label) = overlay.label.filter(|label| !label.is_empty()) else {
        return;
    };

    match overlay.style {
        LabelStyle::Plate => draw_plate_label(image, &rect, label, thickness, overlay.color),
        LabelStyle::Inline => draw_inline_label(image, &rect, label, thickness, overlay.color),
    }
}

/// Fill the part of the `width` × `height` area at `(x, y)` that lies inside
/// the image. Coordinates may be arbitrarily far outside it.
fn fill_clipped(image: &mut RgbImage, x: i64, y: i64, width: i64, height: i64, color: Rgb<u8>) {
    let (image_width, image_height) = image.dimensions();
    let left = x.max(0);
    let top = y.max(0);
    let right = x.saturating_add(width).min(i64::from(image_width));
    let bottom = y.saturating_add(height).min(i64::from(image_height));
    if left >= right || top >= bottom {
        return;
    }

    let (Ok(left), Ok(top), Ok(fill_width), Ok(fill_height)) = (
        i32::try_from(left),
        i32::try_from(top),
        u32::try_from(right - left),
        u32::try_from(bottom - top),
    ) else {
        return;
    };
    draw_filled_rect_mut(image, Rect::at(left, top).of_size(fill_width, fill_height), color);
}

/// Rectangle outline with each edge `thickness` pixels wide, centered on the edge line.
fn draw_outline(image: &mut RgbImage, rect: &PixelRect, thickness: u32, color: Rgb<u8>) {
    let t = i64::from(thickness);
    let half = t / 2;
    let left = i64::from(rect.x1) - half;
    let top = i64::from(rect.y1) - half;
    let outer_width = rect.width() + t;
    let outer_height = rect.height() + t;

    fill_clipped(image, left, top, outer_width, t, color);
    fill_clipped(image, left, i64::from(rect.y2) - half, outer_width, t, color);
    fill_clipped(image, left, top, t, outer_height, color);
    fill_clipped(image, i64::from(rect.x2) - half, top, t, outer_height, color);
}

fn draw_plate_label(
    image: &mut RgbImage,
    rect: &PixelRect,
    label: &str,
    thickness: u32,
    color: Rgb<u8>,
) {
    let scale = glyph_scale(f64::from(thickness) / 3.0);
    let (text_width, text_height) = font::text_size(label, scale);
    let (x1, y1) = (i64::from(rect.x1), i64::from(rect.y1));

    // Plate spans from the box's top-left corner up past the text cell.
    let plate_height = i64::from(text_height) + PLATE_PADDING;
    fill_clipped(
        image,
        x1,
        y1 - plate_height,
        i64::from(text_width),
        plate_height,
        color,
    );

    font::draw_text_mut(
        image,
        label,
        x1,
        y1 - PLATE_BASELINE_OFFSET,
        scale,
        PLATE_TEXT_COLOR,
    );
}

fn draw_inline_label(
    image: &mut RgbImage,
    rect: &PixelRect,
    label: &str,
    thickness: u32,
    color: Rgb<u8>,
) {
    let font_thickness = thickness.saturating_sub(1).max(1);
    let scale = glyph_scale(f64::from(font_thickness) / 3.0);
    font::draw_text_mut(
        image,
        label,
        i64::from(rect.x1),
        i64::from(rect.y1) - INLINE_BASELINE_OFFSET,
        scale,
        color,
    );
}
