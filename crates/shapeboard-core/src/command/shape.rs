//! Commands over the shape sequence.

use super::Command;
use crate::registry::Snapshot;
use crate::shapes::{Shape, ShapeId};

/// Append shapes on top of the paint order.
#[derive(Debug)]
pub struct AddShapeCommand {
    shapes: Vec<Shape>,
    /// Ids actually appended by the last execute.
    added: Vec<ShapeId>,
}

impl AddShapeCommand {
    pub fn new(shapes: Vec<Shape>) -> Self {
        Self {
            shapes,
            added: Vec::new(),
        }
    }
}

impl Command for AddShapeCommand {
    fn execute(&mut self, state: &Snapshot) -> Snapshot {
        let mut next = state.clone();
        self.added.clear();
        for shape in &self.shapes {
            // Ids stay unique; an id already present is left alone.
            if next.contains(shape.id()) {
                log::warn!("Skipping add of existing shape {}", shape.id());
                continue;
            }
            self.added.push(shape.id());
            next.shapes.push(shape.clone());
        }
        next
    }

    fn undo(&mut self, state: &Snapshot) -> Snapshot {
        let shapes = state
            .shapes
            .iter()
            .filter(|s| !self.added.contains(&s.id()))
            .cloned()
            .collect();
        state.with_shapes(shapes)
    }

    fn name(&self) -> &str {
        "Add shape"
    }
}

/// Remove shapes, restoring them at their original positions on undo.
#[derive(Debug)]
pub struct RemoveShapeCommand {
    ids: Vec<ShapeId>,
    /// (index, shape) in ascending index order.
    removed: Vec<(usize, Shape)>,
}

impl RemoveShapeCommand {
    pub fn new(ids: Vec<ShapeId>) -> Self {
        Self {
            ids,
            removed: Vec::new(),
        }
    }
}

impl Command for RemoveShapeCommand {
    fn execute(&mut self, state: &Snapshot) -> Snapshot {
        self.removed.clear();
        let mut kept = Vec::with_capacity(state.shapes.len());
        for (index, shape) in state.shapes.iter().enumerate() {
            if self.ids.contains(&shape.id()) {
                self.removed.push((index, shape.clone()));
            } else {
                kept.push(shape.clone());
            }
        }
        state.with_shapes(kept)
    }

    fn undo(&mut self, state: &Snapshot) -> Snapshot {
        let mut shapes = state.shapes.clone();
        for (index, shape) in &self.removed {
            let index = (*index).min(shapes.len());
            shapes.insert(index, shape.clone());
        }
        state.with_shapes(shapes)
    }

    fn name(&self) -> &str {
        "Delete"
    }
}

/// Replace the whole shape sequence with a precomputed one.
///
/// Used for batch attribute edits and drags: the caller computes `after`
/// from `before` once, so replay is exact.
#[derive(Debug)]
pub struct UpdateShapeCommand {
    before: Vec<Shape>,
    after: Vec<Shape>,
    name: String,
}

impl UpdateShapeCommand {
    pub fn new(before: Vec<Shape>, after: Vec<Shape>) -> Self {
        Self::named("Update shapes", before, after)
    }

    pub fn named(name: impl Into<String>, before: Vec<Shape>, after: Vec<Shape>) -> Self {
        Self {
            before,
            after,
            name: name.into(),
        }
    }
}

impl Command for UpdateShapeCommand {
    fn execute(&mut self, state: &Snapshot) -> Snapshot {
        state.with_shapes(self.after.clone())
    }

    fn undo(&mut self, state: &Snapshot) -> Snapshot {
        state.with_shapes(self.before.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Finalise a shape that was added live during a creation gesture.
///
/// `before` is the sequence from before the gesture started, so undo removes
/// the shape in one step no matter how many preview frames there were.
#[derive(Debug)]
pub struct CreateShapeCommand {
    before: Vec<Shape>,
    shape_id: ShapeId,
    finalized: Option<Vec<Shape>>,
}

impl CreateShapeCommand {
    pub fn new(before: Vec<Shape>, shape_id: ShapeId) -> Self {
        Self {
            before,
            shape_id,
            finalized: None,
        }
    }

    pub fn shape_id(&self) -> ShapeId {
        self.shape_id
    }
}

impl Command for CreateShapeCommand {
    fn execute(&mut self, state: &Snapshot) -> Snapshot {
        let shape_id = self.shape_id;
        let finalized = self.finalized.get_or_insert_with(|| {
            state
                .shapes
                .iter()
                .cloned()
                .map(|mut shape| {
                    if shape.id() == shape_id {
                        shape.is_drawing = false;
                    }
                    shape
                })
                .collect()
        });
        state.with_shapes(finalized.clone())
    }

    fn undo(&mut self, state: &Snapshot) -> Snapshot {
        state.with_shapes(self.before.clone())
    }

    fn name(&self) -> &str {
        "Create shape"
    }
}

/// Where a reorder moves the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// End of the sequence, painted last.
    Front,
    /// Start of the sequence, painted first.
    Back,
}

/// Move one shape to the top or bottom of the paint order.
#[derive(Debug)]
pub struct ReorderShapeCommand {
    id: ShapeId,
    placement: Placement,
    previous_index: Option<usize>,
}

impl ReorderShapeCommand {
    pub fn new(id: ShapeId, placement: Placement) -> Self {
        Self {
            id,
            placement,
            previous_index: None,
        }
    }
}

impl Command for ReorderShapeCommand {
    fn execute(&mut self, state: &Snapshot) -> Snapshot {
        let Some(index) = state.index_of(self.id) else {
            self.previous_index = None;
            return state.clone();
        };
        self.previous_index = Some(index);
        let mut shapes = state.shapes.clone();
        let shape = shapes.remove(index);
        match self.placement {
            Placement::Front => shapes.push(shape),
            Placement::Back => shapes.insert(0, shape),
        }
        state.with_shapes(shapes)
    }

    fn undo(&mut self, state: &Snapshot) -> Snapshot {
        let (Some(previous), Some(current)) = (self.previous_index, state.index_of(self.id)) else {
            return state.clone();
        };
        let mut shapes = state.shapes.clone();
        let shape = shapes.remove(current);
        shapes.insert(previous.min(shapes.len()), shape);
        state.with_shapes(shapes)
    }

    fn name(&self) -> &str {
        match self.placement {
            Placement::Front => "Bring to front",
            Placement::Back => "Send to back",
        }
    }
}
