//! Text shape.

use super::ShapeGeometry;
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// Font style options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "bold")]
    Bold,
    #[serde(rename = "italic")]
    Italic,
    #[serde(rename = "italic bold")]
    BoldItalic,
}

impl FontStyle {
    fn is_bold(self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }
}

/// A text block anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    /// The text content.
    pub text: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// Font family name as loaded by the host.
    pub font_family: String,
    #[serde(default)]
    pub font_style: FontStyle,
    /// Fixed wrapping width; `None` sizes the box to its content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

impl Text {
    pub const DEFAULT_FONT_SIZE: f64 = 24.0;
    pub const DEFAULT_FONT_FAMILY: &'static str = "Arial";
    const LINE_HEIGHT: f64 = 1.2;
    const MIN_WIDTH: f64 = 20.0;

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: Self::DEFAULT_FONT_SIZE,
            font_family: Self::DEFAULT_FONT_FAMILY.to_string(),
            font_style: FontStyle::default(),
            width: None,
        }
    }

    fn approximate_width(&self) -> f64 {
        let widest = self
            .text
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let char_width_factor = if self.font_style.is_bold() { 0.6 } else { 0.55 };
        widest as f64 * self.font_size * char_width_factor
    }

    fn approximate_height(&self) -> f64 {
        let mut line_count = self.text.lines().count().max(1);
        // lines() drops a trailing empty line
        if self.text.ends_with('\n') {
            line_count += 1;
        }
        line_count as f64 * self.font_size * Self::LINE_HEIGHT
    }
}

impl ShapeGeometry for Text {
    fn local_bounds(&self) -> Rect {
        let width = self
            .width
            .unwrap_or_else(|| self.approximate_width())
            .max(Self::MIN_WIDTH);
        Rect::new(0.0, 0.0, width, self.approximate_height())
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.font_size *= sy.abs();
        if let Some(width) = self.width.as_mut() {
            *width *= sx.abs();
        }
    }
}
