//! Shape records for the drawing.
//!
//! A [`Shape`] is a shared base (identity, position, rotation, paint) composed
//! with a [`ShapeKind`] carrying only the fields of one shape type. On the wire
//! both are flattened into a single object keyed by a `type` tag.

mod barcode;
mod color;
mod ellipse;
mod image;
mod path;
mod polygon;
mod rectangle;
mod text;

pub use barcode::{Barcode, BarcodeFormat};
pub use color::{Rgba, parse_color};
pub use ellipse::{Circle, Ellipse};
pub use image::{Image, ImageFormat};
pub use path::{Arrow, Polyline};
pub use polygon::{Star, Triangle};
pub use rectangle::Rectangle;
pub use text::{FontStyle, Text};

use crate::config::ShapeDefaults;
use kurbo::{Affine, Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Geometry of a single shape type, expressed in the node's local frame
/// (origin at the node position, unrotated).
pub trait ShapeGeometry {
    /// Axis-aligned bounds in local coordinates.
    fn local_bounds(&self) -> Rect;

    /// Scale the geometry about the local origin.
    fn scale(&mut self, sx: f64, sy: f64);
}

/// Bounding box of a point set, or `Rect::ZERO` when empty.
pub(crate) fn points_bounds(points: &[Point]) -> Rect {
    let mut iter = points.iter();
    let Some(first) = iter.next() else {
        return Rect::ZERO;
    };
    iter.fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p))
}

/// The `type` tag of a shape record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Rectangle,
    Circle,
    Ellipse,
    Triangle,
    Star,
    Line,
    Arrow,
    Pencil,
    Eraser,
    Text,
    Image,
    Barcode,
}

impl ShapeType {
    /// All shape types, in toolbar order.
    pub fn all() -> &'static [ShapeType] {
        &[
            ShapeType::Rectangle,
            ShapeType::Circle,
            ShapeType::Ellipse,
            ShapeType::Triangle,
            ShapeType::Star,
            ShapeType::Line,
            ShapeType::Arrow,
            ShapeType::Pencil,
            ShapeType::Eraser,
            ShapeType::Text,
            ShapeType::Image,
            ShapeType::Barcode,
        ]
    }

    /// The tag as written in documents.
    pub fn name(self) -> &'static str {
        match self {
            ShapeType::Rectangle => "rectangle",
            ShapeType::Circle => "circle",
            ShapeType::Ellipse => "ellipse",
            ShapeType::Triangle => "triangle",
            ShapeType::Star => "star",
            ShapeType::Line => "line",
            ShapeType::Arrow => "arrow",
            ShapeType::Pencil => "pencil",
            ShapeType::Eraser => "eraser",
            ShapeType::Text => "text",
            ShapeType::Image => "image",
            ShapeType::Barcode => "barcode",
        }
    }

    /// Whether the node position is the geometric center rather than the
    /// top-left corner.
    pub fn is_center_anchored(self) -> bool {
        matches!(
            self,
            ShapeType::Circle | ShapeType::Ellipse | ShapeType::Triangle | ShapeType::Star
        )
    }
}

/// Paint attributes shared by every shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    /// Fill colour string.
    #[serde(default = "default_fill")]
    pub fill: String,
    /// Stroke colour string.
    #[serde(default = "default_stroke")]
    pub stroke: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Whether the stroke is painted at all.
    #[serde(default = "default_has_stroke")]
    pub has_stroke: bool,
}

fn default_fill() -> String {
    "transparent".to_string()
}

fn default_stroke() -> String {
    "#000000".to_string()
}

fn default_stroke_width() -> f64 {
    2.0
}

fn default_opacity() -> f64 {
    1.0
}

fn default_has_stroke() -> bool {
    true
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill: default_fill(),
            stroke: default_stroke(),
            stroke_width: default_stroke_width(),
            opacity: default_opacity(),
            has_stroke: default_has_stroke(),
        }
    }
}

impl ShapeStyle {
    /// Fill as a peniko colour with opacity applied; `None` if nothing is painted.
    pub fn fill_color(&self) -> Option<Color> {
        self.paint(&self.fill)
    }

    /// Stroke as a peniko colour with opacity applied; `None` if disabled.
    pub fn stroke_color(&self) -> Option<Color> {
        if !self.has_stroke || self.stroke_width <= 0.0 {
            return None;
        }
        self.paint(&self.stroke)
    }

    fn paint(&self, color: &str) -> Option<Color> {
        let mut rgba = parse_color(color)?;
        if rgba.is_transparent() {
            return None;
        }
        rgba.a = (rgba.a as f64 * self.opacity.clamp(0.0, 1.0)).round() as u8;
        Some(rgba.into())
    }
}

/// Type-specific geometry and fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle(Rectangle),
    Circle(Circle),
    Ellipse(Ellipse),
    Triangle(Triangle),
    Star(Star),
    Line(Polyline),
    Arrow(Arrow),
    Pencil(Polyline),
    Eraser(Polyline),
    Text(Text),
    Image(Image),
    Barcode(Barcode),
}

impl ShapeKind {
    /// Fresh geometry for a shape the user is about to draw.
    ///
    /// Sized shapes start empty and grow as the creation gesture updates them;
    /// text and barcodes start at their natural size.
    pub fn placeholder(shape_type: ShapeType, defaults: &ShapeDefaults) -> Self {
        match shape_type {
            ShapeType::Rectangle => ShapeKind::Rectangle(Rectangle::new(0.0, 0.0)),
            ShapeType::Circle => ShapeKind::Circle(Circle::new(0.0)),
            ShapeType::Ellipse => ShapeKind::Ellipse(Ellipse::new(0.0, 0.0)),
            ShapeType::Triangle => ShapeKind::Triangle(Triangle::new(0.0)),
            ShapeType::Star => ShapeKind::Star(Star::new(0.0)),
            ShapeType::Line => ShapeKind::Line(Polyline::new(vec![Point::ZERO])),
            ShapeType::Arrow => ShapeKind::Arrow(Arrow::new(vec![Point::ZERO])),
            ShapeType::Pencil => ShapeKind::Pencil(Polyline::new(vec![Point::ZERO])),
            ShapeType::Eraser => ShapeKind::Eraser(Polyline::new(vec![Point::ZERO])),
            ShapeType::Text => {
                let mut text = Text::new(defaults.text.clone());
                text.font_size = defaults.font_size;
                text.font_family = defaults.font_family.clone();
                ShapeKind::Text(text)
            }
            ShapeType::Image => ShapeKind::Image(Image::new(0.0, 0.0, String::new())),
            ShapeType::Barcode => ShapeKind::Barcode(Barcode::new(
                defaults.barcode_format,
                defaults.barcode_code.clone(),
            )),
        }
    }

    pub fn shape_type(&self) -> ShapeType {
        match self {
            ShapeKind::Rectangle(_) => ShapeType::Rectangle,
            ShapeKind::Circle(_) => ShapeType::Circle,
            ShapeKind::Ellipse(_) => ShapeType::Ellipse,
            ShapeKind::Triangle(_) => ShapeType::Triangle,
            ShapeKind::Star(_) => ShapeType::Star,
            ShapeKind::Line(_) => ShapeType::Line,
            ShapeKind::Arrow(_) => ShapeType::Arrow,
            ShapeKind::Pencil(_) => ShapeType::Pencil,
            ShapeKind::Eraser(_) => ShapeType::Eraser,
            ShapeKind::Text(_) => ShapeType::Text,
            ShapeKind::Image(_) => ShapeType::Image,
            ShapeKind::Barcode(_) => ShapeType::Barcode,
        }
    }

    pub fn geometry(&self) -> &dyn ShapeGeometry {
        match self {
            ShapeKind::Rectangle(s) => s,
            ShapeKind::Circle(s) => s,
            ShapeKind::Ellipse(s) => s,
            ShapeKind::Triangle(s) => s,
            ShapeKind::Star(s) => s,
            ShapeKind::Line(s) | ShapeKind::Pencil(s) | ShapeKind::Eraser(s) => s,
            ShapeKind::Arrow(s) => s,
            ShapeKind::Text(s) => s,
            ShapeKind::Image(s) => s,
            ShapeKind::Barcode(s) => s,
        }
    }

    pub fn geometry_mut(&mut self) -> &mut dyn ShapeGeometry {
        match self {
            ShapeKind::Rectangle(s) => s,
            ShapeKind::Circle(s) => s,
            ShapeKind::Ellipse(s) => s,
            ShapeKind::Triangle(s) => s,
            ShapeKind::Star(s) => s,
            ShapeKind::Line(s) | ShapeKind::Pencil(s) | ShapeKind::Eraser(s) => s,
            ShapeKind::Arrow(s) => s,
            ShapeKind::Text(s) => s,
            ShapeKind::Image(s) => s,
            ShapeKind::Barcode(s) => s,
        }
    }
}

fn default_selectable() -> bool {
    true
}

/// One drawable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub(crate) id: ShapeId,
    /// Node origin (top-left or center depending on the shape type).
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    /// Rotation in degrees around the node origin.
    #[serde(default)]
    pub rotation: f64,
    /// Whether the shape takes part in selection and snapping.
    #[serde(default = "default_selectable")]
    pub selectable: bool,
    /// True only while the shape is being interactively created.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) is_drawing: bool,
    #[serde(flatten)]
    pub style: ShapeStyle,
    #[serde(flatten)]
    pub kind: ShapeKind,
}

impl Shape {
    /// Create a shape with a fresh id and default paint.
    pub fn new(kind: ShapeKind, position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: position.x,
            y: position.y,
            rotation: 0.0,
            selectable: true,
            is_drawing: false,
            style: ShapeStyle::default(),
            kind,
        }
    }

    /// Builder-style paint override.
    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn shape_type(&self) -> ShapeType {
        self.kind.shape_type()
    }

    /// Whether the shape is mid-creation.
    pub fn is_drawing(&self) -> bool {
        self.is_drawing
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Node transform (translate to the origin, then rotate).
    pub fn transform(&self) -> Affine {
        Affine::translate((self.x, self.y)) * Affine::rotate(self.rotation.to_radians())
    }

    /// Axis-aligned bounding box in canvas coordinates.
    pub fn bounds(&self) -> Rect {
        self.transform()
            .transform_rect_bbox(self.kind.geometry().local_bounds())
    }

    /// Give the shape a new unique identifier (pasting, duplicating).
    pub fn regenerate_id(&mut self) {
        self.id = Uuid::new_v4();
    }

    /// Merge a partial attribute set. Returns `true` if anything changed.
    pub fn apply_patch(&mut self, patch: &ShapePatch) -> bool {
        let before = self.clone();

        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(selectable) = patch.selectable {
            self.selectable = selectable;
        }
        if let Some(fill) = &patch.fill {
            self.style.fill = fill.clone();
        }
        if let Some(stroke) = &patch.stroke {
            self.style.stroke = stroke.clone();
        }
        if let Some(stroke_width) = patch.stroke_width {
            self.style.stroke_width = stroke_width;
        }
        if let Some(opacity) = patch.opacity {
            self.style.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(has_stroke) = patch.has_stroke {
            self.style.has_stroke = has_stroke;
        }

        match &mut self.kind {
            ShapeKind::Text(text) => {
                if let Some(content) = &patch.text {
                    text.text = content.clone();
                }
                if let Some(font_size) = patch.font_size {
                    text.font_size = font_size;
                }
                if let Some(font_family) = &patch.font_family {
                    text.font_family = font_family.clone();
                }
                if let Some(font_style) = patch.font_style {
                    text.font_style = font_style;
                }
            }
            ShapeKind::Barcode(barcode) => {
                if let Some(code) = &patch.code {
                    barcode.code = code.clone();
                }
                if let Some(code_format) = patch.code_format {
                    barcode.code_format = code_format;
                }
            }
            ShapeKind::Rectangle(rect) => {
                if let Some(corner_radius) = patch.corner_radius {
                    rect.corner_radius = corner_radius;
                }
            }
            _ => {}
        }

        *self != before
    }
}

/// A partial attribute set, as produced by the property panel for the
/// current selection. Fields that do not apply to a shape type are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapePatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rotation: Option<f64>,
    pub selectable: Option<bool>,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub opacity: Option<f64>,
    pub has_stroke: Option<bool>,
    pub corner_radius: Option<f64>,
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub font_style: Option<FontStyle>,
    pub code: Option<String>,
    pub code_format: Option<BarcodeFormat>,
}

impl ShapePatch {
    /// Whether the patch sets nothing.
    pub fn is_empty(&self) -> bool {
        *self == ShapePatch::default()
    }
}
