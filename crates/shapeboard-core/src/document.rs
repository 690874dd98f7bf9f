//! Persisted document format.
//!
//! ```json
//! { "canvas": { "width": 800, "height": 600, "bgColor": "#ffffff",
//!               "children": [ ...shapes ] } }
//! ```
//!
//! Shape coordinates on disk are relative to the canvas frame; live shapes are
//! in viewport coordinates. Conversion shifts by the frame origin.

use crate::registry::{CanvasOption, Snapshot};
use crate::shapes::{Shape, ShapeId};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Document load/save errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Malformed document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate shape id in document: {0}")]
    DuplicateId(ShapeId),
    #[error("Invalid canvas size {width}x{height}")]
    InvalidCanvasSize { width: f64, height: f64 },
}

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Top-level persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFile {
    pub canvas: CanvasNode,
}

/// The canvas node and its shapes in paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasNode {
    pub width: f64,
    pub height: f64,
    pub bg_color: String,
    pub children: Vec<Shape>,
}

impl DocumentFile {
    /// Capture the settled shapes of `snapshot`, made relative to `origin`.
    /// Shapes still being drawn are left out.
    pub fn from_snapshot(snapshot: &Snapshot, origin: Point) -> Self {
        let children = snapshot
            .shapes
            .iter()
            .filter(|s| !s.is_drawing())
            .cloned()
            .map(|mut shape| {
                shape.translate(-origin.x, -origin.y);
                shape
            })
            .collect();
        let option = &snapshot.canvas_option;
        Self {
            canvas: CanvasNode {
                width: option.canvas_size.width,
                height: option.canvas_size.height,
                bg_color: option.bg_color.clone(),
                children,
            },
        }
    }

    /// Validate and convert to live state placed at `origin`.
    pub fn into_snapshot(self, origin: Point) -> DocumentResult<Snapshot> {
        let CanvasNode {
            width,
            height,
            bg_color,
            children,
        } = self.canvas;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(DocumentError::InvalidCanvasSize { width, height });
        }
        let shapes = children
            .into_iter()
            .map(|mut shape| {
                shape.translate(origin.x, origin.y);
                shape.is_drawing = false;
                shape
            })
            .collect();
        let snapshot = Snapshot::new(
            shapes,
            CanvasOption {
                canvas_size: Size::new(width, height),
                bg_color,
            },
        );
        if let Some(id) = snapshot.find_duplicate_id() {
            return Err(DocumentError::DuplicateId(id));
        }
        Ok(snapshot)
    }

    pub fn from_json(json: &str) -> DocumentResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parse a document straight into live state.
pub fn parse_document(json: &str, origin: Point) -> DocumentResult<Snapshot> {
    DocumentFile::from_json(json)?.into_snapshot(origin)
}

/// Serialize live state to document JSON.
pub fn write_document(snapshot: &Snapshot, origin: Point) -> DocumentResult<String> {
    DocumentFile::from_snapshot(snapshot, origin).to_json()
}
