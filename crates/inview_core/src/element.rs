//! Element handles and bounding geometry

use slotmap::new_key_type;

new_key_type! {
    /// Stable identity of a rendered element
    ///
    /// Keys are versioned, so an id held after its element is removed never
    /// aliases a newer element.
    pub struct ElementId;
}

/// Bounding rectangle of an element, relative to the viewport origin
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    /// X position
    pub x: f32,
    /// Y position (distance of the top edge from the viewport top)
    pub y: f32,
    /// Computed width
    pub width: f32,
    /// Computed height
    pub height: f32,
}

impl Bounds {
    /// Create new bounds
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bounds spanning `top..bottom` vertically with zero x and width
    pub fn vertical(top: f32, bottom: f32) -> Self {
        Self::new(0.0, top, 0.0, bottom - top)
    }

    /// Top edge
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// The same bounds shifted vertically, as after a scroll by `-dy`
    pub fn offset_y(self, dy: f32) -> Self {
        Self {
            y: self.y + dy,
            ..self
        }
    }
}
