//! Editing session: one open document.
//!
//! The session owns the registry and the command manager and turns gestures
//! into registry updates. Live previews (creation frames, drag frames) write
//! the registry directly; anything that should be undoable goes through a
//! command.

use crate::command::{
    AddShapeCommand, CombineCommand, Command, CommandManager, CreateShapeCommand, HistoryStatus,
    Placement, RemoveShapeCommand, ReorderShapeCommand, SubscriptionId, UpdateCanvasOptionCommand,
    UpdateShapeCommand,
};
use crate::config::{ConfigError, EditorConfig};
use crate::document::{self, DocumentResult};
use crate::registry::{
    self, CanvasOption, RegistryError, RegistryResult, ShapeRegistry, ShapesUpdate,
};
use crate::shapes::{Shape, ShapeId, ShapeKind, ShapePatch, ShapeType};
use crate::snap::{SnapEdges, SnapOptions, SnapOutcome, calculate_snap, collect_snap_targets};
use crate::surface::{BoundsProvider, GeometryBounds};
use kurbo::{Point, Rect, Vec2};

/// A shape being drawn.
#[derive(Debug, Clone)]
struct CreationGesture {
    shape_id: ShapeId,
    before: Vec<Shape>,
}

/// Shapes being moved.
#[derive(Debug, Clone)]
struct DragGesture {
    /// Node positions at drag start; the first entry is the primary shape.
    origins: Vec<(ShapeId, Point)>,
    before: Vec<Shape>,
    targets: Vec<SnapEdges>,
}

/// The editing state of one open document.
pub struct EditorSession {
    registry: ShapeRegistry,
    commands: CommandManager,
    config: EditorConfig,
    /// Viewport position of the canvas frame's top-left corner.
    frame_origin: Point,
    bounds: Box<dyn BoundsProvider>,
    creation: Option<CreationGesture>,
    drag: Option<DragGesture>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    /// Session using `config` as given. Use [`try_new`](Self::try_new) for
    /// configs that have not been through [`EditorConfig::validate`].
    pub fn new(config: EditorConfig) -> Self {
        Self {
            registry: ShapeRegistry::new(config.canvas.clone()),
            commands: CommandManager::with_max_size(config.history.max_size),
            config,
            frame_origin: Point::ZERO,
            bounds: Box::new(GeometryBounds),
            creation: None,
            drag: None,
        }
    }

    /// Validate `config` and start a session with it.
    pub fn try_new(config: EditorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    pub fn shapes(&self) -> &[Shape] {
        self.registry.shapes()
    }

    pub fn canvas_option(&self) -> &CanvasOption {
        self.registry.canvas_option()
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.registry.get(id)
    }

    pub fn command_manager(&self) -> &CommandManager {
        &self.commands
    }

    pub fn history_status(&self) -> HistoryStatus {
        self.commands.status()
    }

    /// Use the renderer's bounding boxes instead of plain geometry.
    pub fn set_bounds_provider(&mut self, bounds: Box<dyn BoundsProvider>) {
        self.bounds = bounds;
    }

    pub fn frame_origin(&self) -> Point {
        self.frame_origin
    }

    pub fn set_frame_origin(&mut self, origin: Point) {
        self.frame_origin = origin;
    }

    /// The canvas frame in viewport coordinates.
    pub fn frame_rect(&self) -> Rect {
        Rect::from_origin_size(self.frame_origin, self.registry.canvas_option().canvas_size)
    }

    // --- Creation gesture ---

    /// Id of the shape currently being drawn.
    pub fn creating(&self) -> Option<ShapeId> {
        self.creation.as_ref().map(|c| c.shape_id)
    }

    /// Start drawing a shape of `shape_type` with configured defaults.
    pub fn start_shape_creation(&mut self, shape_type: ShapeType, position: Point) -> ShapeId {
        let kind = ShapeKind::placeholder(shape_type, &self.config.shape_defaults);
        self.start_shape_creation_with(kind, position)
    }

    /// Start drawing a shape with prepared geometry.
    ///
    /// The shape is shown immediately but nothing is recorded until
    /// [`complete_shape_creation`](Self::complete_shape_creation).
    pub fn start_shape_creation_with(&mut self, kind: ShapeKind, position: Point) -> ShapeId {
        if let Some(previous) = &self.creation {
            log::warn!("Abandoning unfinished shape {}", previous.shape_id);
            self.cancel_shape_creation();
        }
        if self.drag.is_some() {
            self.end_drag();
        }

        let mut shape =
            Shape::new(kind, position).with_style(self.config.shape_defaults.style.clone());
        shape.is_drawing = true;
        let shape_id = shape.id();

        let before = self.registry.shapes().to_vec();
        let mut live = before.clone();
        live.push(shape);
        self.registry.write_shapes(live);
        self.creation = Some(CreationGesture { shape_id, before });
        shape_id
    }

    /// Apply a preview frame to the shape being drawn.
    pub fn update_shape_creation(&mut self, f: impl FnOnce(&mut Shape)) -> bool {
        let Some(creation) = &self.creation else {
            return false;
        };
        self.registry.update(creation.shape_id, |shape| {
            f(shape);
            shape.is_drawing = true;
        })
    }

    /// Finish the gesture as one undoable step.
    pub fn complete_shape_creation(&mut self) -> Option<ShapeId> {
        let creation = self.creation.take()?;
        if !self.registry.contains(creation.shape_id) {
            log::warn!("Shape {} vanished before creation completed", creation.shape_id);
            return None;
        }
        let command = CreateShapeCommand::new(creation.before, creation.shape_id);
        self.run(Box::new(command));
        Some(creation.shape_id)
    }

    /// Drop the gesture and restore the shapes from before it started.
    pub fn cancel_shape_creation(&mut self) -> bool {
        let Some(creation) = self.creation.take() else {
            return false;
        };
        self.registry.write_shapes(creation.before);
        true
    }

    // --- Discrete edits ---

    /// Add shapes as-is. Shapes whose id is already present are skipped.
    pub fn add_shapes(&mut self, shapes: Vec<Shape>) -> Vec<ShapeId> {
        self.settle_for_edit();
        let shapes: Vec<Shape> = shapes
            .into_iter()
            .filter(|s| !self.registry.contains(s.id()))
            .map(|mut s| {
                s.is_drawing = false;
                s
            })
            .collect();
        if shapes.is_empty() {
            return Vec::new();
        }
        let ids = shapes.iter().map(Shape::id).collect();
        self.run(Box::new(AddShapeCommand::new(shapes)));
        ids
    }

    /// Paste copies with fresh ids, shifted by `offset`, as one undo step.
    pub fn paste_shapes(&mut self, shapes: &[Shape], offset: Vec2) -> Vec<ShapeId> {
        self.settle_for_edit();
        let copies: Vec<Shape> = shapes
            .iter()
            .cloned()
            .map(|mut s| {
                s.regenerate_id();
                s.is_drawing = false;
                s.translate(offset.x, offset.y);
                s
            })
            .collect();
        let ids: Vec<ShapeId> = copies.iter().map(Shape::id).collect();
        match copies.len() {
            0 => {}
            1 => self.run(Box::new(AddShapeCommand::new(copies))),
            _ => {
                let commands = copies
                    .into_iter()
                    .map(|s| Box::new(AddShapeCommand::new(vec![s])) as Box<dyn Command>)
                    .collect();
                self.run(Box::new(CombineCommand::new(commands)));
            }
        }
        ids
    }

    /// Remove shapes. Unknown ids are ignored; returns whether anything was
    /// removed.
    pub fn remove_shapes(&mut self, ids: &[ShapeId]) -> bool {
        self.settle_for_edit();
        let present: Vec<ShapeId> = ids
            .iter()
            .copied()
            .filter(|id| self.registry.contains(*id))
            .collect();
        if present.is_empty() {
            return false;
        }
        self.run(Box::new(RemoveShapeCommand::new(present)));
        true
    }

    /// Merge `patch` into every listed shape as a single undo step.
    pub fn update_attributes(&mut self, ids: &[ShapeId], patch: &ShapePatch) -> bool {
        self.settle_for_edit();
        if patch.is_empty() {
            return false;
        }
        let before = self.registry.shapes().to_vec();
        let mut changed = false;
        let after: Vec<Shape> = before
            .iter()
            .cloned()
            .map(|mut shape| {
                if ids.contains(&shape.id()) {
                    changed |= shape.apply_patch(patch);
                }
                shape
            })
            .collect();
        if !changed {
            return false;
        }
        self.run(Box::new(UpdateShapeCommand::named("Edit attributes", before, after)));
        true
    }

    /// Move shapes to the top of the paint order, keeping their relative
    /// order. Returns `false` (and records nothing) if the order is unchanged.
    pub fn bring_to_front(&mut self, ids: &[ShapeId]) -> bool {
        self.reorder(ids, Placement::Front)
    }

    /// Move shapes to the bottom of the paint order, keeping their relative
    /// order. Returns `false` (and records nothing) if the order is unchanged.
    pub fn send_to_back(&mut self, ids: &[ShapeId]) -> bool {
        self.reorder(ids, Placement::Back)
    }

    pub fn move_to_forward(&mut self, id: ShapeId) -> bool {
        self.bring_to_front(&[id])
    }

    pub fn move_to_backward(&mut self, id: ShapeId) -> bool {
        self.send_to_back(&[id])
    }

    fn reorder(&mut self, ids: &[ShapeId], placement: Placement) -> bool {
        self.settle_for_edit();
        let shapes = self.registry.shapes();
        let target = match placement {
            Placement::Front => registry::move_to_front(shapes, ids),
            Placement::Back => registry::move_to_back(shapes, ids),
        };
        if target == shapes {
            return false;
        }

        // Front moves go bottom-up and back moves top-down so each shape lands
        // in its final relative position.
        let mut ordered: Vec<ShapeId> = shapes
            .iter()
            .map(Shape::id)
            .filter(|id| ids.contains(id))
            .collect();
        if placement == Placement::Back {
            ordered.reverse();
        }

        let command: Box<dyn Command> = if ordered.len() == 1 {
            Box::new(ReorderShapeCommand::new(ordered[0], placement))
        } else {
            Box::new(CombineCommand::new(
                ordered
                    .into_iter()
                    .map(|id| Box::new(ReorderShapeCommand::new(id, placement)) as Box<dyn Command>)
                    .collect(),
            ))
        };
        self.run(command);
        true
    }

    /// Replace the shape sequence. With `log_history` the change is one undo
    /// step; without it the registry is written directly. Returns whether
    /// anything changed.
    ///
    /// A sequence repeating an id is rejected and nothing is written or
    /// recorded for it. A value is checked up front; a function update is
    /// checked after open gestures have been settled, since it reads the
    /// settled sequence. Incoming shapes are never left mid-creation, except
    /// the one an open creation gesture is drawing.
    pub fn set_shapes(
        &mut self,
        update: impl Into<ShapesUpdate>,
        log_history: bool,
    ) -> RegistryResult<bool> {
        let update = update.into();
        if let ShapesUpdate::Replace(shapes) = &update {
            if let Some(id) = registry::find_duplicate_id(shapes) {
                return Err(RegistryError::DuplicateId(id));
            }
        }
        if !log_history {
            let mut next = update.apply(self.registry.shapes());
            self.settle_drawing_flags(&mut next);
            if let Some(id) = registry::find_duplicate_id(&next) {
                return Err(RegistryError::DuplicateId(id));
            }
            return Ok(self.registry.write_shapes(next));
        }
        self.settle_for_edit();
        let before = self.registry.shapes().to_vec();
        let mut after = update.apply(&before);
        self.settle_drawing_flags(&mut after);
        if let Some(id) = registry::find_duplicate_id(&after) {
            return Err(RegistryError::DuplicateId(id));
        }
        if after == before {
            return Ok(false);
        }
        self.run(Box::new(UpdateShapeCommand::new(before, after)));
        Ok(true)
    }

    /// Change canvas size or background, sharing the shapes' undo history.
    pub fn set_canvas_option(&mut self, option: CanvasOption, log_history: bool) {
        if !log_history {
            self.registry.set_canvas_option(option);
            return;
        }
        self.settle_for_edit();
        let before = self.registry.canvas_option().clone();
        if before != option {
            self.run(Box::new(UpdateCanvasOptionCommand::new(before, option)));
        }
    }

    // --- Drag ---

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Start moving the listed shapes. The first listed shape that exists is
    /// the one `drag_to` positions.
    pub fn begin_drag(&mut self, ids: &[ShapeId]) -> bool {
        self.settle_for_edit();
        let origins: Vec<(ShapeId, Point)> = ids
            .iter()
            .filter_map(|id| self.registry.get(*id))
            .filter(|s| !s.is_drawing())
            .map(|s| (s.id(), s.position()))
            .collect();
        if origins.is_empty() {
            return false;
        }
        let dragged: Vec<ShapeId> = origins.iter().map(|(id, _)| *id).collect();
        let targets = collect_snap_targets(
            self.registry.shapes(),
            &dragged,
            self.bounds.as_ref(),
            self.frame_rect(),
        );
        self.drag = Some(DragGesture {
            origins,
            before: self.registry.shapes().to_vec(),
            targets,
        });
        true
    }

    /// Place the primary dragged shape's node at `position` (the others follow)
    /// and snap. `None` when no drag is active.
    pub fn drag_to(&mut self, position: Point) -> Option<SnapOutcome> {
        let drag = self.drag.as_ref()?;
        let delta = position - drag.origins[0].1;

        let mut shapes = self.registry.shapes().to_vec();
        let mut dragged_rect: Option<Rect> = None;
        for (id, origin) in &drag.origins {
            if let Some(shape) = shapes.iter_mut().find(|s| s.id() == *id) {
                shape.set_position(*origin + delta);
                let rect = self.bounds.client_rect(shape);
                dragged_rect = Some(dragged_rect.map_or(rect, |r| r.union(rect)));
            }
        }

        let outcome = match dragged_rect {
            Some(rect) if self.config.snap.enabled => calculate_snap(
                &SnapEdges::from_rect(rect),
                &drag.targets,
                self.config.snap.tolerance,
                &SnapOptions::default(),
            ),
            _ => SnapOutcome::default(),
        };

        // Deltas go through node positions; center-anchored shapes have
        // bounds offset from their position.
        let (dx, dy) = (outcome.dx.unwrap_or(0.0), outcome.dy.unwrap_or(0.0));
        if dx != 0.0 || dy != 0.0 {
            for shape in shapes.iter_mut() {
                if drag.origins.iter().any(|(id, _)| *id == shape.id()) {
                    shape.translate(dx, dy);
                }
            }
        }
        self.registry.write_shapes(shapes);
        Some(outcome)
    }

    /// Finish the drag, recording the move if anything moved.
    pub fn end_drag(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        let after = self.registry.shapes().to_vec();
        if after == drag.before {
            return false;
        }
        self.run(Box::new(UpdateShapeCommand::named("Move", drag.before, after)));
        true
    }

    /// Abort the drag and put the shapes back.
    pub fn cancel_drag(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        self.registry.write_shapes(drag.before);
        true
    }

    /// Snap targets for dragging `exclude`, as `begin_drag` would compute them.
    pub fn snap_targets(&self, exclude: &[ShapeId]) -> Vec<SnapEdges> {
        collect_snap_targets(
            self.registry.shapes(),
            exclude,
            self.bounds.as_ref(),
            self.frame_rect(),
        )
    }

    // --- History ---

    pub fn undo(&mut self) -> bool {
        self.abandon_gestures();
        match self.commands.undo(self.registry.snapshot()) {
            Some(previous) => {
                self.registry.replace(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.abandon_gestures();
        match self.commands.redo(self.registry.snapshot()) {
            Some(next) => {
                self.registry.replace(next);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.commands.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.commands.can_redo()
    }

    /// Nothing left to undo.
    pub fn is_first_history(&self) -> bool {
        !self.commands.can_undo()
    }

    /// Nothing left to redo.
    pub fn is_last_history(&self) -> bool {
        !self.commands.can_redo()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(HistoryStatus) + 'static) -> SubscriptionId {
        self.commands.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.commands.unsubscribe(id)
    }

    // --- Persistence ---

    /// Replace the document. On error the session is left untouched.
    pub fn load_document(&mut self, json: &str) -> DocumentResult<()> {
        let snapshot = match document::parse_document(json, self.frame_origin) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::warn!("Document load failed: {err}");
                return Err(err);
            }
        };
        self.abandon_gestures();
        log::info!("Loaded document with {} shapes", snapshot.shapes.len());
        self.registry.replace(snapshot);
        self.commands.clear();
        Ok(())
    }

    /// Serialize the settled shapes relative to the canvas frame.
    pub fn save_document(&self) -> DocumentResult<String> {
        let json = document::write_document(self.registry.snapshot(), self.frame_origin)?;
        log::info!("Saved document with {} shapes", self.registry.len());
        Ok(json)
    }

    // --- Internals ---

    fn run(&mut self, command: Box<dyn Command>) {
        let next = self.commands.execute(command, self.registry.snapshot());
        self.registry.replace(next);
    }

    /// Commit open gestures before a discrete edit.
    fn settle_for_edit(&mut self) {
        if self.drag.is_some() {
            self.end_drag();
        }
        if self.creation.is_some() {
            self.complete_shape_creation();
        }
    }

    /// Clear `is_drawing` on every shape but the one being created.
    fn settle_drawing_flags(&self, shapes: &mut [Shape]) {
        let drawing = self.creation.as_ref().map(|c| c.shape_id);
        for shape in shapes.iter_mut().filter(|s| Some(s.id()) != drawing) {
            shape.is_drawing = false;
        }
    }

    /// Roll back open gestures before history navigation or a load.
    fn abandon_gestures(&mut self) {
        self.cancel_drag();
        self.cancel_shape_creation();
    }

    #[cfg(test)]
    fn snapshot(&self) -> crate::registry::Snapshot {
        self.registry.snapshot().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, FontStyle, Rectangle};
    use crate::snap::Orientation;
    use std::cell::Cell;
    use std::rc::Rc;

    fn draw_rect(session: &mut EditorSession, x: f64, y: f64, w: f64, h: f64) -> ShapeId {
        let id = session.start_shape_creation(ShapeType::Rectangle, Point::new(x, y));
        assert!(session.update_shape_creation(|s| {
            s.kind = ShapeKind::Rectangle(Rectangle::new(w, h));
        }));
        session.complete_shape_creation().unwrap();
        id
    }

    fn draw_circle(session: &mut EditorSession, x: f64, y: f64, r: f64) -> ShapeId {
        let id = session.start_shape_creation(ShapeType::Circle, Point::new(x, y));
        assert!(session.update_shape_creation(|s| {
            s.kind = ShapeKind::Circle(Circle::new(r));
        }));
        session.complete_shape_creation().unwrap();
        id
    }

    fn order(session: &EditorSession) -> Vec<ShapeId> {
        session.shapes().iter().map(Shape::id).collect()
    }

    #[test]
    fn test_drag_snap_then_undo_everything() {
        let mut session = EditorSession::default();
        let rect = draw_rect(&mut session, 10.0, 10.0, 50.0, 50.0);
        draw_circle(&mut session, 100.0, 100.0, 20.0);

        assert!(session.begin_drag(&[rect]));
        let outcome = session.drag_to(Point::new(98.0, 10.0)).unwrap();
        assert_eq!(outcome.dx, Some(2.0));
        assert_eq!(outcome.dy, None);
        assert_eq!(outcome.guides.len(), 1);
        assert_eq!(outcome.guides[0].orientation, Orientation::Vertical);
        assert!((outcome.guides[0].position - 100.0).abs() < f64::EPSILON);
        assert!((session.get(rect).unwrap().x - 100.0).abs() < f64::EPSILON);

        assert!(session.undo());
        assert!(session.undo());
        assert!(session.shapes().is_empty());
        assert!(session.is_first_history());
    }

    #[test]
    fn test_creation_is_one_undo_step() {
        let mut session = EditorSession::default();
        let id = session.start_shape_creation(ShapeType::Rectangle, Point::new(5.0, 5.0));
        assert!(session.get(id).unwrap().is_drawing());
        for size in [10.0, 20.0, 30.0] {
            session.update_shape_creation(|s| s.kind = ShapeKind::Rectangle(Rectangle::new(size, size)));
        }
        assert!(session.is_first_history());

        session.complete_shape_creation();
        assert!(!session.get(id).unwrap().is_drawing());
        assert_eq!(session.command_manager().len(), 1);

        let done = session.snapshot();
        session.undo();
        assert!(session.shapes().is_empty());
        session.redo();
        assert_eq!(session.snapshot(), done);
    }

    #[test]
    fn test_update_cannot_clear_drawing_flag_or_id() {
        let mut session = EditorSession::default();
        let id = session.start_shape_creation(ShapeType::Circle, Point::ZERO);
        session.update_shape_creation(|s| {
            s.is_drawing = false;
            s.regenerate_id();
        });
        let shape = session.get(id).unwrap();
        assert!(shape.is_drawing());
    }

    #[test]
    fn test_cancel_creation_restores_previous_state() {
        let mut session = EditorSession::default();
        draw_rect(&mut session, 0.0, 0.0, 10.0, 10.0);
        let before = session.snapshot();
        session.start_shape_creation(ShapeType::Star, Point::new(50.0, 50.0));
        assert!(session.cancel_shape_creation());
        assert_eq!(session.snapshot(), before);
        assert!(!session.cancel_shape_creation());
    }

    #[test]
    fn test_new_creation_abandons_previous() {
        let mut session = EditorSession::default();
        let first = session.start_shape_creation(ShapeType::Rectangle, Point::ZERO);
        let second = session.start_shape_creation(ShapeType::Ellipse, Point::ZERO);
        assert!(session.get(first).is_none());
        assert_eq!(session.creating(), Some(second));
        assert_eq!(session.shapes().iter().filter(|s| s.is_drawing()).count(), 1);
    }

    #[test]
    fn test_undo_rolls_back_unfinished_creation() {
        let mut session = EditorSession::default();
        draw_rect(&mut session, 0.0, 0.0, 10.0, 10.0);
        session.start_shape_creation(ShapeType::Line, Point::ZERO);
        assert!(session.undo());
        assert!(session.shapes().is_empty());
        assert!(session.creating().is_none());
    }

    #[test]
    fn test_discrete_edit_commits_unfinished_creation() {
        let mut session = EditorSession::default();
        let rect = draw_rect(&mut session, 0.0, 0.0, 10.0, 10.0);
        let drawing = session.start_shape_creation(ShapeType::Text, Point::new(40.0, 40.0));
        session.update_attributes(&[rect], &ShapePatch {
            fill: Some("#00ff00".into()),
            ..Default::default()
        });
        assert!(!session.get(drawing).unwrap().is_drawing());
        assert_eq!(session.command_manager().len(), 3);
    }

    #[test]
    fn test_update_attributes_is_one_step() {
        let mut session = EditorSession::default();
        let a = draw_rect(&mut session, 0.0, 0.0, 10.0, 10.0);
        let b = session.start_shape_creation(ShapeType::Text, Point::ZERO);
        session.complete_shape_creation();
        let c = draw_rect(&mut session, 20.0, 0.0, 10.0, 10.0);
        let before = session.snapshot();

        let patch = ShapePatch {
            stroke: Some("#ff0000".into()),
            font_style: Some(FontStyle::Italic),
            ..Default::default()
        };
        assert!(session.update_attributes(&[a, b], &patch));
        assert_eq!(session.get(a).unwrap().style.stroke, "#ff0000");
        assert_eq!(session.get(b).unwrap().style.stroke, "#ff0000");
        assert_ne!(session.get(c).unwrap().style.stroke, "#ff0000");

        session.undo();
        assert_eq!(session.snapshot(), before);
        // Re-applying the same patch is not a change.
        session.redo();
        assert!(!session.update_attributes(&[a, b], &patch));
        assert!(!session.update_attributes(&[a], &ShapePatch::default()));
    }

    #[test]
    fn test_paste_multiple_is_one_step_with_fresh_ids() {
        let mut session = EditorSession::default();
        let a = draw_rect(&mut session, 0.0, 0.0, 10.0, 10.0);
        let b = draw_rect(&mut session, 20.0, 0.0, 10.0, 10.0);
        let copies: Vec<Shape> = session.shapes().to_vec();

        let pasted = session.paste_shapes(&copies, Vec2::new(5.0, 5.0));
        assert_eq!(pasted.len(), 2);
        assert!(!pasted.contains(&a) && !pasted.contains(&b));
        assert_eq!(session.shapes().len(), 4);
        assert!((session.get(pasted[1]).unwrap().x - 25.0).abs() < f64::EPSILON);

        session.undo();
        assert_eq!(order(&session), vec![a, b]);
    }

    #[test]
    fn test_add_and_remove() {
        let mut session = EditorSession::default();
        let shape = Shape::new(ShapeKind::Circle(Circle::new(5.0)), Point::new(50.0, 50.0));
        let id = shape.id();
        assert_eq!(session.add_shapes(vec![shape.clone()]), vec![id]);
        assert!(session.add_shapes(vec![shape]).is_empty());
        assert!(!session.remove_shapes(&[ShapeId::new_v4()]));
        assert!(session.remove_shapes(&[id]));
        assert!(session.shapes().is_empty());
        session.undo();
        assert!(session.get(id).is_some());
    }

    #[test]
    fn test_reorder_multi_preserves_relative_order() {
        let mut session = EditorSession::default();
        let ids: Vec<ShapeId> = (0..4)
            .map(|i| draw_rect(&mut session, i as f64 * 20.0, 0.0, 10.0, 10.0))
            .collect();
        let before = session.snapshot();

        assert!(session.bring_to_front(&[ids[2], ids[0]]));
        assert_eq!(order(&session), vec![ids[1], ids[3], ids[0], ids[2]]);
        session.undo();
        assert_eq!(session.snapshot(), before);

        assert!(session.send_to_back(&[ids[3], ids[1]]));
        assert_eq!(order(&session), vec![ids[1], ids[3], ids[0], ids[2]]);
        session.undo();
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_reorder_noop_records_nothing() {
        let mut session = EditorSession::default();
        let a = draw_rect(&mut session, 0.0, 0.0, 10.0, 10.0);
        let b = draw_rect(&mut session, 20.0, 0.0, 10.0, 10.0);
        let len = session.command_manager().len();
        assert!(!session.move_to_forward(b));
        assert!(!session.move_to_backward(a));
        assert!(!session.move_to_forward(ShapeId::new_v4()));
        assert_eq!(session.command_manager().len(), len);

        assert!(session.move_to_forward(a));
        assert_eq!(order(&session), vec![b, a]);
    }

    #[test]
    fn test_end_drag_records_move() {
        let mut session = EditorSession::default();
        let rect = draw_rect(&mut session, 300.0, 300.0, 10.0, 10.0);
        session.begin_drag(&[rect]);
        session.drag_to(Point::new(250.0, 250.0));
        assert!(session.end_drag());
        assert!((session.get(rect).unwrap().x - 250.0).abs() < f64::EPSILON);
        session.undo();
        assert!((session.get(rect).unwrap().x - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_drag_without_movement_records_nothing() {
        let mut session = EditorSession::default();
        let rect = draw_rect(&mut session, 300.0, 300.0, 10.0, 10.0);
        session.begin_drag(&[rect]);
        assert!(!session.end_drag());
        assert_eq!(session.command_manager().len(), 1);
        assert!(session.drag_to(Point::ZERO).is_none());
    }

    #[test]
    fn test_cancel_drag_restores_positions() {
        let mut session = EditorSession::default();
        let rect = draw_rect(&mut session, 300.0, 300.0, 10.0, 10.0);
        let before = session.snapshot();
        session.begin_drag(&[rect]);
        session.drag_to(Point::new(10.0, 10.0));
        assert!(session.cancel_drag());
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_multi_drag_moves_together() {
        let mut session = EditorSession::default();
        let a = draw_rect(&mut session, 300.0, 300.0, 10.0, 10.0);
        let b = draw_rect(&mut session, 350.0, 320.0, 10.0, 10.0);
        session.begin_drag(&[a, b]);
        session.drag_to(Point::new(250.0, 200.0));
        let b_shape = session.get(b).unwrap();
        assert!((b_shape.x - 300.0).abs() < f64::EPSILON);
        assert!((b_shape.y - 220.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_try_new_validates_config() {
        let mut config = EditorConfig::default();
        config.snap.tolerance = -2.0;
        assert!(matches!(
            EditorSession::try_new(config),
            Err(ConfigError::Invalid(_))
        ));
        assert!(EditorSession::try_new(EditorConfig::default()).is_ok());
    }

    #[test]
    fn test_snapping_disabled() {
        let mut config = EditorConfig::default();
        config.snap.enabled = false;
        let mut session = EditorSession::new(config);
        let rect = draw_rect(&mut session, 10.0, 10.0, 50.0, 50.0);
        draw_circle(&mut session, 100.0, 100.0, 20.0);
        session.begin_drag(&[rect]);
        let outcome = session.drag_to(Point::new(98.0, 10.0)).unwrap();
        assert!(!outcome.is_snapped());
        assert!((session.get(rect).unwrap().x - 98.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_frame_origin_offsets_canvas_target() {
        let mut session = EditorSession::default();
        session.set_frame_origin(Point::new(100.0, 100.0));
        let rect = draw_rect(&mut session, 500.0, 500.0, 10.0, 10.0);
        session.begin_drag(&[rect]);
        // Frame left edge is at x=100.
        let outcome = session.drag_to(Point::new(103.0, 500.0)).unwrap();
        assert_eq!(outcome.dx, Some(-3.0));
    }

    #[test]
    fn test_custom_bounds_provider() {
        let mut session = EditorSession::default();
        session.set_bounds_provider(Box::new(|s: &Shape| s.bounds().inflate(5.0, 5.0)));
        let rect = draw_rect(&mut session, 500.0, 500.0, 10.0, 10.0);
        let targets = session.snap_targets(&[]);
        assert!((targets[0].left - 495.0).abs() < f64::EPSILON);
        assert_eq!(targets.len(), 2);
        assert_eq!(session.snap_targets(&[rect]).len(), 1);
    }

    #[test]
    fn test_set_shapes_and_canvas_share_history() {
        let mut session = EditorSession::default();
        let shape = Shape::new(ShapeKind::Circle(Circle::new(5.0)), Point::ZERO);
        assert!(session.set_shapes(vec![shape], true).unwrap());
        let mut option = session.canvas_option().clone();
        option.bg_color = "#222222".into();
        session.set_canvas_option(option.clone(), true);
        assert_eq!(session.command_manager().len(), 2);

        session.undo();
        assert_eq!(session.canvas_option().bg_color, "#ffffff");
        assert_eq!(session.shapes().len(), 1);
        session.undo();
        assert!(session.shapes().is_empty());
        assert!(!session.undo());
        session.redo();
        session.redo();
        assert_eq!(session.canvas_option(), &option);
        assert!(session.is_last_history());
    }

    #[test]
    fn test_set_shapes_without_history() {
        let mut session = EditorSession::default();
        let shape = Shape::new(ShapeKind::Circle(Circle::new(5.0)), Point::ZERO);
        assert!(session.set_shapes(vec![shape], false).unwrap());
        assert!(!session.set_shapes(ShapesUpdate::map(|prev| prev.to_vec()), true).unwrap());
        assert_eq!(session.shapes().len(), 1);
        assert!(session.is_first_history());
    }

    #[test]
    fn test_set_shapes_rejects_duplicate_ids() {
        for log_history in [true, false] {
            let mut session = EditorSession::default();
            let shape = Shape::new(ShapeKind::Circle(Circle::new(5.0)), Point::ZERO);
            assert_eq!(
                session.set_shapes(vec![shape.clone(), shape.clone()], log_history),
                Err(RegistryError::DuplicateId(shape.id()))
            );
            assert!(session.shapes().is_empty());
            assert!(!session.can_undo());

            session.set_shapes(vec![shape.clone()], log_history).unwrap();
            let doubled = ShapesUpdate::map(|prev| prev.iter().chain(prev).cloned().collect());
            assert!(session.set_shapes(doubled, log_history).is_err());
            assert_eq!(session.shapes().len(), 1);
        }
    }

    #[test]
    fn test_set_shapes_clears_stale_drawing_flag() {
        let json = format!(
            r#"{{"id": "{}", "type": "rectangle", "x": 0, "y": 0, "width": 10, "height": 10, "isDrawing": true}}"#,
            ShapeId::new_v4()
        );
        let shape: Shape = serde_json::from_str(&json).unwrap();
        assert!(shape.is_drawing());

        for log_history in [true, false] {
            let mut session = EditorSession::default();
            session.set_shapes(vec![shape.clone()], log_history).unwrap();
            assert!(session.creating().is_none());
            assert!(!session.shapes()[0].is_drawing());
            assert_eq!(session.snap_targets(&[]).len(), 2);
        }
    }

    #[test]
    fn test_set_shapes_without_history_keeps_open_creation() {
        let mut session = EditorSession::default();
        let id = session.start_shape_creation(ShapeType::Rectangle, Point::new(5.0, 5.0));
        let stale = Shape::new(ShapeKind::Circle(Circle::new(5.0)), Point::ZERO);
        let mut stale_drawing = stale.clone();
        stale_drawing.is_drawing = true;
        session
            .set_shapes(
                ShapesUpdate::map(move |prev| {
                    let mut next = prev.to_vec();
                    next.push(stale_drawing);
                    next
                }),
                false,
            )
            .unwrap();
        assert!(session.get(id).is_some_and(Shape::is_drawing));
        assert!(session.get(stale.id()).is_some_and(|s| !s.is_drawing()));
        assert_eq!(session.creating(), Some(id));
    }

    #[test]
    fn test_history_listener() {
        let mut session = EditorSession::default();
        let can_undo = Rc::new(Cell::new(false));
        let flag = Rc::clone(&can_undo);
        session.subscribe(move |status| flag.set(status.can_undo));
        draw_rect(&mut session, 0.0, 0.0, 1.0, 1.0);
        assert!(can_undo.get());
        session.undo();
        assert!(!can_undo.get());
    }

    #[test]
    fn test_load_and_save_document() {
        let mut session = EditorSession::default();
        session.set_frame_origin(Point::new(50.0, 50.0));
        draw_rect(&mut session, 60.0, 70.0, 10.0, 10.0);
        let json = session.save_document().unwrap();
        let saved = session.snapshot();

        let mut other = EditorSession::default();
        other.set_frame_origin(Point::new(50.0, 50.0));
        draw_circle(&mut other, 1.0, 1.0, 1.0);
        other.load_document(&json).unwrap();
        assert_eq!(other.snapshot(), saved);
        assert!(other.is_first_history() && other.is_last_history());
    }

    #[test]
    fn test_failed_load_leaves_state() {
        let mut session = EditorSession::default();
        draw_rect(&mut session, 0.0, 0.0, 10.0, 10.0);
        let before = session.snapshot();
        assert!(session.load_document(r#"{"canvas": {"width": 1}}"#).is_err());
        assert!(session.load_document("nope").is_err());
        assert_eq!(session.snapshot(), before);
        assert!(session.can_undo());
    }

    #[test]
    fn test_history_bound_from_config() {
        let mut config = EditorConfig::default();
        config.history.max_size = 3;
        let mut session = EditorSession::new(config);
        for i in 0..5 {
            draw_rect(&mut session, i as f64, 0.0, 1.0, 1.0);
        }
        assert_eq!(session.command_manager().len(), 3);
    }
}
