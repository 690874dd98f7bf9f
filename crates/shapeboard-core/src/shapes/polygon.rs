//! Regular triangle and star shapes, anchored at their center with the first
//! vertex pointing up.

use super::{ShapeGeometry, points_bounds};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// An equilateral triangle inscribed in a circle of `radius`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub radius: f64,
}

impl Triangle {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    /// Vertices in local coordinates.
    pub fn vertices(&self) -> Vec<Point> {
        (0..3)
            .map(|i| {
                let angle = -PI / 2.0 + i as f64 * 2.0 * PI / 3.0;
                Point::new(self.radius * angle.cos(), self.radius * angle.sin())
            })
            .collect()
    }
}

impl ShapeGeometry for Triangle {
    fn local_bounds(&self) -> Rect {
        points_bounds(&self.vertices())
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.radius *= sx.abs().max(sy.abs());
    }
}

/// A star with `num_points` spikes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Star {
    pub num_points: u32,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl Star {
    pub const DEFAULT_POINTS: u32 = 5;

    pub fn new(outer_radius: f64) -> Self {
        Self {
            num_points: Self::DEFAULT_POINTS,
            inner_radius: outer_radius / 2.0,
            outer_radius,
        }
    }

    /// Vertices in local coordinates, alternating outer and inner.
    pub fn vertices(&self) -> Vec<Point> {
        let spikes = self.num_points.max(2) as usize;
        let step = PI / spikes as f64;
        (0..spikes * 2)
            .map(|i| {
                let radius = if i % 2 == 0 {
                    self.outer_radius
                } else {
                    self.inner_radius
                };
                let angle = -PI / 2.0 + i as f64 * step;
                Point::new(radius * angle.cos(), radius * angle.sin())
            })
            .collect()
    }
}

impl ShapeGeometry for Star {
    fn local_bounds(&self) -> Rect {
        points_bounds(&self.vertices())
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        let factor = sx.abs().max(sy.abs());
        self.inner_radius *= factor;
        self.outer_radius *= factor;
    }
}
