//! The seam to whatever draws the shapes.

use crate::shapes::Shape;
use kurbo::Rect;

/// Bounding-box queries answered by the rendering surface.
///
/// A renderer knows the true painted extent of a node (stroke width, text
/// layout); the editor only asks for it here.
pub trait BoundsProvider {
    /// Axis-aligned box of the shape in viewport coordinates.
    fn client_rect(&self, shape: &Shape) -> Rect;
}

/// Bounds computed from the shape geometry alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryBounds;

impl BoundsProvider for GeometryBounds {
    fn client_rect(&self, shape: &Shape) -> Rect {
        shape.bounds()
    }
}

impl<F> BoundsProvider for F
where
    F: Fn(&Shape) -> Rect,
{
    fn client_rect(&self, shape: &Shape) -> Rect {
        self(shape)
    }
}
