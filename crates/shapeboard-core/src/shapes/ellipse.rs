//! Circle and ellipse shapes. Both are anchored at their center.

use super::ShapeGeometry;
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// A circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub radius: f64,
}

impl Circle {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl ShapeGeometry for Circle {
    fn local_bounds(&self) -> Rect {
        let r = self.radius.abs();
        Rect::new(-r, -r, r, r)
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        // Circles stay circles: use the larger factor.
        self.radius *= sx.abs().max(sy.abs());
    }
}

/// An ellipse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ellipse {
    /// Horizontal radius.
    pub radius_x: f64,
    /// Vertical radius.
    pub radius_y: f64,
}

impl Ellipse {
    pub fn new(radius_x: f64, radius_y: f64) -> Self {
        Self { radius_x, radius_y }
    }
}

impl ShapeGeometry for Ellipse {
    fn local_bounds(&self) -> Rect {
        let rx = self.radius_x.abs();
        let ry = self.radius_y.abs();
        Rect::new(-rx, -ry, rx, ry)
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.radius_x *= sx.abs();
        self.radius_y *= sy.abs();
    }
}
