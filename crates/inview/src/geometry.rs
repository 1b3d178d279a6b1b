//! Interval arithmetic for the viewport test
//!
//! Only vertical extents matter. An element is reduced to a `top..bottom`
//! interval, optionally padded, and the edges selected by the [`Offset`]
//! mode are tested against the viewport interval.
//!
//! Padding only ever moves the top edge. Under [`Offset::TopInView`] both
//! returned edges are that padded top, which narrows detection to a single
//! line inside the element.

use crate::options::Offset;

/// Whether `[x1, x2]` and `[y1, y2]` intersect; touching counts
pub fn is_overlapping(x1: f32, x2: f32, y1: f32, y2: f32) -> bool {
    x1 <= y2 && y1 <= x2
}

/// Whether a pad value is a fraction of the element height
///
/// Any non-integer up to 1, and 1 itself, is a fraction. Other integers
/// (0 included) are absolute pixel offsets.
pub fn is_percent(n: f32) -> bool {
    !n.is_nan() && n <= 1.0 && (n.fract() != 0.0 || n == 1.0)
}

/// Top edge after applying `pad`
pub fn padded_top(top: f32, bottom: f32, pad: Option<f32>) -> f32 {
    match pad {
        Some(pad) if is_percent(pad) => top + (bottom - top) * pad,
        Some(pad) => top + pad,
        None => top,
    }
}

/// Upper edge to test for `mode`
pub fn get_top(top: f32, bottom: f32, mode: Offset, pad: Option<f32>) -> f32 {
    match mode {
        Offset::InView | Offset::TopInView => padded_top(top, bottom, pad),
        Offset::BottomInView => bottom,
    }
}

/// Lower edge to test for `mode`
pub fn get_bottom(top: f32, bottom: f32, mode: Offset, pad: Option<f32>) -> f32 {
    match mode {
        Offset::TopInView => padded_top(top, bottom, pad),
        Offset::InView | Offset::BottomInView => bottom,
    }
}
