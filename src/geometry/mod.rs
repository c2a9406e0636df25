//! Box geometry shared by the decoders and the renderer.
//!
//! Decoders work in floating point ([`BBoxXYXY`]) tagged with a coordinate
//! space, then snap to a [`PixelRect`] using the rule their format calls for:
//! center-format boxes are rounded, corner-format boxes are truncated.

mod bbox;
mod rect;
mod space;

pub use bbox::BBoxXYXY;
pub(crate) use bbox::round_half_even;
pub use rect::PixelRect;
pub use space::{Normalized, Pixel};
