//! Viewport membership test

use crate::geometry::{get_bottom, get_top, is_overlapping};
use crate::options::BindingOptions;
use inview_core::{Bounds, ElementId, Page};

/// Whether `bounds` reaches the vertical viewport `0..=viewport_height`
pub fn bounds_in_viewport(bounds: Bounds, viewport_height: f32, options: &BindingOptions) -> bool {
    let (top, bottom) = (bounds.top(), bounds.bottom());
    let edge_top = get_top(top, bottom, options.offset, options.pad);
    let edge_bottom = get_bottom(top, bottom, options.offset, options.pad);

    is_overlapping(edge_top, edge_bottom, 0.0, viewport_height)
}

/// Whether an element is currently in view
///
/// Geometry is read fresh from the page on every call. An element that is no
/// longer on the page is not in view.
pub fn is_in_viewport(page: &Page, element: ElementId, options: &BindingOptions) -> bool {
    match page.bounding_rect(element) {
        Some(bounds) => bounds_in_viewport(bounds, page.viewport_height(), options),
        None => false,
    }
}
