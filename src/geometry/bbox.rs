//! Floating-point boxes in XYXY layout, tagged with their coordinate space.

use std::marker::PhantomData;

use super::{Normalized, Pixel, PixelRect};

/// An axis-aligned box stored as (xmin, ymin, xmax, ymax).
///
/// Construction never checks ordering; decoded annotations may be malformed
/// and the renderer deals with that when it draws them.
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxXYXY<TSpace> {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> BBoxXYXY<TSpace> {
    #[inline]
    pub fn from_xyxy(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
            _space: PhantomData,
        }
    }

    /// Builds a box from its center and size.
    ///
    /// Each corner is `center ∓ size / 2`, evaluated in that order so pixel
    /// results match the rounding of existing YOLO tooling bit for bit.
    #[inline]
    pub fn from_cxcywh(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self::from_xyxy(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
    }

    /// Returns (cx, cy, w, h).
    #[inline]
    pub fn to_cxcywh(&self) -> (f64, f64, f64, f64) {
        (
            (self.xmin + self.xmax) / 2.0,
            (self.ymin + self.ymax) / 2.0,
            self.width(),
            self.height(),
        )
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

impl<TSpace> std::fmt::Debug for BBoxXYXY<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBoxXYXY")
            .field("xmin", &self.xmin)
            .field("ymin", &self.ymin)
            .field("xmax", &self.xmax)
            .field("ymax", &self.ymax)
            .finish()
    }
}

impl BBoxXYXY<Pixel> {
    /// Scales pixel coordinates down to fractions of the image size.
    pub fn to_normalized(&self, image_width: f64, image_height: f64) -> BBoxXYXY<Normalized> {
        BBoxXYXY::from_xyxy(
            self.xmin / image_width,
            self.ymin / image_height,
            self.xmax / image_width,
            self.ymax / image_height,
        )
    }

    /// Snaps to integer pixels with round-half-to-even.
    pub fn round_to_rect(&self) -> PixelRect {
        PixelRect::new(
            round_half_even(self.xmin),
            round_half_even(self.ymin),
            round_half_even(self.xmax),
            round_half_even(self.ymax),
        )
    }

    /// Snaps to integer pixels by truncating toward zero.
    pub fn truncate_to_rect(&self) -> PixelRect {
        PixelRect::new(
            self.xmin.trunc() as i32,
            self.ymin.trunc() as i32,
            self.xmax.trunc() as i32,
            self.ymax.trunc() as i32,
        )
    }
}

impl From<PixelRect> for BBoxXYXY<Pixel> {
    fn from(rect: PixelRect) -> Self {
        BBoxXYXY::from_xyxy(
            f64::from(rect.x1),
            f64::from(rect.y1),
            f64::from(rect.x2),
            f64::from(rect.y2),
        )
    }
}

/// Banker's rounding, saturating into `i32`.
pub(crate) fn round_half_even(value: f64) -> i32 {
    value.round_ties_even() as i32
}
