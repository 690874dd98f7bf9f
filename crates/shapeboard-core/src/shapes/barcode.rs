//! Barcode / QR code shape. Only the record lives here; symbol encoding is the
//! host's job.

use super::ShapeGeometry;
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// Symbology of a barcode shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BarcodeFormat {
    #[serde(rename = "QR")]
    Qr,
    #[default]
    #[serde(rename = "CODE128")]
    Code128,
    #[serde(rename = "CODE39")]
    Code39,
    #[serde(rename = "EAN13")]
    Ean13,
    #[serde(rename = "EAN8")]
    Ean8,
    #[serde(rename = "UPC")]
    Upc,
}

impl BarcodeFormat {
    /// Whether the symbol is two-dimensional (square by nature).
    pub fn is_matrix(self) -> bool {
        matches!(self, BarcodeFormat::Qr)
    }
}

/// A barcode anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Barcode {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub code_format: BarcodeFormat,
    #[serde(default)]
    pub code: String,
}

impl Barcode {
    pub fn new(code_format: BarcodeFormat, code: impl Into<String>) -> Self {
        let (width, height) = if code_format.is_matrix() {
            (120.0, 120.0)
        } else {
            (200.0, 80.0)
        };
        Self {
            width,
            height,
            code_format,
            code: code.into(),
        }
    }
}

impl ShapeGeometry for Barcode {
    fn local_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height).abs()
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.width *= sx;
        self.height *= sy;
    }
}
