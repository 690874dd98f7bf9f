//! Point-list shapes: lines, arrows and freehand strokes.
//!
//! Points are relative to the node origin.

use super::{ShapeGeometry, points_bounds};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An open polyline (used by `line`, `pencil` and `eraser`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    #[serde(default)]
    pub points: Vec<Point>,
}

impl Polyline {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Append a point (freehand strokes grow one pointer-move at a time).
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Replace the last point, or push one if the line has only its start.
    pub fn set_end(&mut self, point: Point) {
        match self.points.len() {
            0 | 1 => self.points.push(point),
            n => self.points[n - 1] = point,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl ShapeGeometry for Polyline {
    fn local_bounds(&self) -> Rect {
        points_bounds(&self.points)
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        for p in &mut self.points {
            p.x *= sx;
            p.y *= sy;
        }
    }
}

/// An arrow: a polyline with a pointer head at its last point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrow {
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default = "default_pointer")]
    pub pointer_length: f64,
    #[serde(default = "default_pointer")]
    pub pointer_width: f64,
}

fn default_pointer() -> f64 {
    10.0
}

impl Arrow {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            pointer_length: default_pointer(),
            pointer_width: default_pointer(),
        }
    }
}

impl ShapeGeometry for Arrow {
    fn local_bounds(&self) -> Rect {
        let bounds = points_bounds(&self.points);
        if self.points.len() < 2 {
            return bounds;
        }
        // The head can stick out sideways by half its width.
        let half = self.pointer_width / 2.0;
        let n = self.points.len();
        let tip = self.points[n - 1];
        bounds.union(Rect::new(tip.x - half, tip.y - half, tip.x + half, tip.y + half))
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        for p in &mut self.points {
            p.x *= sx;
            p.y *= sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polyline_bounds() {
        let line = Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(30.0, -10.0),
            Point::new(10.0, 20.0),
        ]);
        assert_eq!(line.local_bounds(), Rect::new(0.0, -10.0, 30.0, 20.0));
    }

    #[test]
    fn test_empty_polyline_bounds() {
        assert_eq!(Polyline::default().local_bounds(), Rect::ZERO);
    }

    #[test]
    fn test_set_end_replaces_last_point() {
        let mut line = Polyline::new(vec![Point::ZERO]);
        line.set_end(Point::new(5.0, 5.0));
        line.set_end(Point::new(8.0, 2.0));
        assert_eq!(line.points, vec![Point::ZERO, Point::new(8.0, 2.0)]);
    }

    #[test]
    fn test_arrow_head_extends_bounds() {
        let arrow = Arrow::new(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        let bounds = arrow.local_bounds();
        assert!((bounds.y0 + 5.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 105.0).abs() < f64::EPSILON);
    }
}
