//! Rectangle shape.

use super::ShapeGeometry;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A rectangle anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    /// Width (may be negative while the user drags up/left).
    pub width: f64,
    /// Height (may be negative while the user drags up/left).
    pub height: f64,
    /// Corner radius (0 = sharp corners).
    #[serde(default)]
    pub corner_radius: f64,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            corner_radius: 0.0,
        }
    }

    /// Size the rectangle so it spans from the node origin to `corner`.
    pub fn span_to(&mut self, origin: Point, corner: Point) {
        self.width = corner.x - origin.x;
        self.height = corner.y - origin.y;
    }
}

impl ShapeGeometry for Rectangle {
    fn local_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height).abs()
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.width *= sx;
        self.height *= sy;
    }
}
