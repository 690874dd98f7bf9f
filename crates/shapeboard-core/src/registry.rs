//! The ordered shape collection and its canvas options.
//!
//! Sequence order is paint order: index 0 is painted first (bottom), the last
//! shape is on top.

use crate::shapes::{Shape, ShapeId};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Registry errors.
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("Duplicate shape id: {0}")]
    DuplicateId(ShapeId),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Canvas size and background, versioned alongside the shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasOption {
    pub canvas_size: Size,
    pub bg_color: String,
}

impl Default for CanvasOption {
    fn default() -> Self {
        Self {
            canvas_size: Size::new(800.0, 600.0),
            bg_color: "#ffffff".to_string(),
        }
    }
}

/// Complete editable state at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub shapes: Vec<Shape>,
    pub canvas_option: CanvasOption,
}

impl Snapshot {
    pub fn new(shapes: Vec<Shape>, canvas_option: CanvasOption) -> Self {
        Self {
            shapes,
            canvas_option,
        }
    }

    /// Same canvas option, different shapes.
    pub fn with_shapes(&self, shapes: Vec<Shape>) -> Self {
        Self {
            shapes,
            canvas_option: self.canvas_option.clone(),
        }
    }

    /// Same shapes, different canvas option.
    pub fn with_canvas_option(&self, canvas_option: CanvasOption) -> Self {
        Self {
            shapes: self.shapes.clone(),
            canvas_option,
        }
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    pub fn index_of(&self, id: ShapeId) -> Option<usize> {
        self.shapes.iter().position(|s| s.id() == id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.index_of(id).is_some()
    }

    /// First id that appears more than once, if any.
    pub fn find_duplicate_id(&self) -> Option<ShapeId> {
        find_duplicate_id(&self.shapes)
    }
}

/// First id that occurs more than once in `shapes`.
pub fn find_duplicate_id(shapes: &[Shape]) -> Option<ShapeId> {
    let mut seen = HashSet::with_capacity(shapes.len());
    shapes.iter().map(Shape::id).find(|id| !seen.insert(*id))
}

/// Live storage for the drawing.
///
/// Holds the current [`Snapshot`] and nothing else: history lives in the
/// command manager. `revision` increases on every change so a renderer can
/// tell when to repaint.
#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    snapshot: Snapshot,
    revision: u64,
}

impl ShapeRegistry {
    /// Create an empty registry.
    pub fn new(canvas_option: CanvasOption) -> Self {
        Self {
            snapshot: Snapshot::new(Vec::new(), canvas_option),
            revision: 0,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.snapshot.shapes
    }

    pub fn canvas_option(&self) -> &CanvasOption {
        &self.snapshot.canvas_option
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.snapshot.get(id)
    }

    pub fn index_of(&self, id: ShapeId) -> Option<usize> {
        self.snapshot.index_of(id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.snapshot.contains(id)
    }

    /// Shapes in paint order (back to front).
    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.snapshot.shapes.iter()
    }

    pub fn len(&self) -> usize {
        self.snapshot.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.shapes.is_empty()
    }

    /// Replace the whole state.
    pub fn replace(&mut self, snapshot: Snapshot) {
        if snapshot != self.snapshot {
            self.snapshot = snapshot;
            self.bump();
        }
    }

    /// Replace the shape sequence, either with a value or with a function of
    /// the previous sequence. Returns whether anything changed.
    ///
    /// A sequence repeating an id is rejected and the registry is left as is.
    pub fn set_shapes(&mut self, update: impl Into<ShapesUpdate>) -> RegistryResult<bool> {
        let next = update.into().apply(&self.snapshot.shapes);
        if let Some(id) = find_duplicate_id(&next) {
            return Err(RegistryError::DuplicateId(id));
        }
        Ok(self.write_shapes(next))
    }

    /// Replace the shape sequence with one already known to be valid.
    pub(crate) fn write_shapes(&mut self, shapes: Vec<Shape>) -> bool {
        if shapes == self.snapshot.shapes {
            return false;
        }
        self.snapshot.shapes = shapes;
        self.bump();
        true
    }

    pub fn set_canvas_option(&mut self, canvas_option: CanvasOption) {
        if canvas_option != self.snapshot.canvas_option {
            self.snapshot.canvas_option = canvas_option;
            self.bump();
        }
    }

    /// Append a shape on top.
    pub fn insert(&mut self, shape: Shape) -> RegistryResult<()> {
        if self.contains(shape.id()) {
            return Err(RegistryError::DuplicateId(shape.id()));
        }
        self.snapshot.shapes.push(shape);
        self.bump();
        Ok(())
    }

    /// Mutate one shape in place. Returns `false` if the id is unknown.
    pub fn update(&mut self, id: ShapeId, f: impl FnOnce(&mut Shape)) -> bool {
        let Some(shape) = self.snapshot.shapes.iter_mut().find(|s| s.id() == id) else {
            return false;
        };
        f(shape);
        // Identity is owned by the registry.
        shape.id = id;
        self.bump();
        true
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Argument of [`ShapeRegistry::set_shapes`].
pub enum ShapesUpdate {
    Replace(Vec<Shape>),
    Map(Box<dyn FnOnce(&[Shape]) -> Vec<Shape>>),
}

impl From<Vec<Shape>> for ShapesUpdate {
    fn from(shapes: Vec<Shape>) -> Self {
        ShapesUpdate::Replace(shapes)
    }
}

impl ShapesUpdate {
    /// Wrap a pure `prev -> next` function.
    pub fn map(f: impl FnOnce(&[Shape]) -> Vec<Shape> + 'static) -> Self {
        ShapesUpdate::Map(Box::new(f))
    }

    /// Resolve against the previous sequence.
    pub fn apply(self, previous: &[Shape]) -> Vec<Shape> {
        match self {
            ShapesUpdate::Replace(shapes) => shapes,
            ShapesUpdate::Map(f) => f(previous),
        }
    }
}

/// Move the given shapes to the top of the paint order, keeping their
/// relative order. Unknown ids are ignored.
pub fn move_to_front(shapes: &[Shape], ids: &[ShapeId]) -> Vec<Shape> {
    let (moved, rest): (Vec<Shape>, Vec<Shape>) =
        shapes.iter().cloned().partition(|s| ids.contains(&s.id()));
    rest.into_iter().chain(moved).collect()
}

/// Move the given shapes to the bottom of the paint order, keeping their
/// relative order. Unknown ids are ignored.
pub fn move_to_back(shapes: &[Shape], ids: &[ShapeId]) -> Vec<Shape> {
    let (moved, rest): (Vec<Shape>, Vec<Shape>) =
        shapes.iter().cloned().partition(|s| ids.contains(&s.id()));
    moved.into_iter().chain(rest).collect()
}
