//! Edge and center alignment while dragging.
//!
//! The dragged box is compared against every target box on each axis
//! independently. The closest alignment within tolerance wins; every
//! alignment at that same offset produces a guide line.

use crate::shapes::{Shape, ShapeId};
use crate::surface::BoundsProvider;
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// Default snapping distance in canvas units.
pub const DEFAULT_SNAP_TOLERANCE: f64 = 7.0;

/// Alignment lines of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapEdges {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl SnapEdges {
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self {
            left: rect.x0,
            right: rect.x1,
            top: rect.y0,
            bottom: rect.y1,
            center_x: (rect.x0 + rect.x1) / 2.0,
            center_y: (rect.y0 + rect.y1) / 2.0,
        }
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(self.left, self.top, self.right, self.bottom)
    }

    pub fn vertical(&self, key: VerticalKey) -> f64 {
        match key {
            VerticalKey::Left => self.left,
            VerticalKey::Right => self.right,
            VerticalKey::CenterX => self.center_x,
        }
    }

    pub fn horizontal(&self, key: HorizontalKey) -> f64 {
        match key {
            HorizontalKey::Top => self.top,
            HorizontalKey::Bottom => self.bottom,
            HorizontalKey::CenterY => self.center_y,
        }
    }

    /// The same box shifted by (dx, dy).
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            left: self.left + dx,
            right: self.right + dx,
            top: self.top + dy,
            bottom: self.bottom + dy,
            center_x: self.center_x + dx,
            center_y: self.center_y + dy,
        }
    }
}

impl From<Rect> for SnapEdges {
    fn from(rect: Rect) -> Self {
        Self::from_rect(rect)
    }
}

/// X-axis alignment lines (they draw vertical guides).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalKey {
    Left,
    Right,
    CenterX,
}

impl VerticalKey {
    pub const ALL: [VerticalKey; 3] = [VerticalKey::Left, VerticalKey::Right, VerticalKey::CenterX];
}

/// Y-axis alignment lines (they draw horizontal guides).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalKey {
    Top,
    Bottom,
    CenterY,
}

impl HorizontalKey {
    pub const ALL: [HorizontalKey; 3] = [HorizontalKey::Top, HorizontalKey::Bottom, HorizontalKey::CenterY];
}

/// Restricts which lines take part in snapping.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapOptions {
    pub v_keys: Vec<VerticalKey>,
    pub h_keys: Vec<HorizontalKey>,
}

impl Default for SnapOptions {
    fn default() -> Self {
        Self {
            v_keys: VerticalKey::ALL.to_vec(),
            h_keys: HorizontalKey::ALL.to_vec(),
        }
    }
}

/// Guide direction. `V` guides are drawn at an x position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[serde(rename = "H")]
    Horizontal,
    #[serde(rename = "V")]
    Vertical,
}

/// A transient alignment line to draw while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideLine {
    pub orientation: Orientation,
    /// x for vertical guides, y for horizontal ones.
    pub position: f64,
    pub start: f64,
    pub end: f64,
}

/// Result of [`calculate_snap`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapOutcome {
    /// Shift to apply to the node's x, if it snapped horizontally.
    pub dx: Option<f64>,
    /// Shift to apply to the node's y, if it snapped vertically.
    pub dy: Option<f64>,
    pub guides: Vec<GuideLine>,
}

impl SnapOutcome {
    pub fn is_snapped(&self) -> bool {
        self.dx.is_some() || self.dy.is_some()
    }
}

/// Best alignment found so far on one axis.
struct AxisBest {
    abs: f64,
    offset: f64,
    /// (target index, aligned line position)
    matches: Vec<(usize, f64)>,
}

fn consider(best: &mut Option<AxisBest>, tolerance: f64, offset: f64, target: usize, position: f64) {
    if !offset.is_finite() {
        return;
    }
    let abs = offset.abs();
    if abs > tolerance {
        return;
    }
    match best {
        Some(current) if abs > current.abs => {}
        // Ties keep the first offset found and add a guide.
        Some(current) if abs == current.abs => current.matches.push((target, position)),
        _ => {
            *best = Some(AxisBest {
                abs,
                offset,
                matches: vec![(target, position)],
            })
        }
    }
}

/// Compute the shift that aligns `dragged` with the nearest target line.
///
/// A candidate within `tolerance` (inclusive) snaps. Each axis is solved
/// independently; guides at the same position are merged. A negative or
/// non-finite tolerance never snaps.
pub fn calculate_snap(
    dragged: &SnapEdges,
    targets: &[SnapEdges],
    tolerance: f64,
    options: &SnapOptions,
) -> SnapOutcome {
    if !(tolerance.is_finite() && tolerance >= 0.0) {
        log::warn!("Ignoring snap with invalid tolerance {tolerance}");
        return SnapOutcome::default();
    }
    let mut best_x: Option<AxisBest> = None;
    let mut best_y: Option<AxisBest> = None;

    for (index, target) in targets.iter().enumerate() {
        for &dragged_key in &options.v_keys {
            for &target_key in &options.v_keys {
                let position = target.vertical(target_key);
                let offset = position - dragged.vertical(dragged_key);
                consider(&mut best_x, tolerance, offset, index, position);
            }
        }
        for &dragged_key in &options.h_keys {
            for &target_key in &options.h_keys {
                let position = target.horizontal(target_key);
                let offset = position - dragged.horizontal(dragged_key);
                consider(&mut best_y, tolerance, offset, index, position);
            }
        }
    }

    let dx = best_x.as_ref().map(|b| b.offset);
    let dy = best_y.as_ref().map(|b| b.offset);
    let mut guides = Vec::new();

    if let Some(best) = &best_x {
        let shifted = dragged.translated(best.offset, 0.0);
        for &(index, position) in &best.matches {
            let target = &targets[index];
            guides.push(GuideLine {
                orientation: Orientation::Vertical,
                position,
                start: shifted.top.min(target.top),
                end: shifted.bottom.max(target.bottom),
            });
        }
    }
    if let Some(best) = &best_y {
        let shifted = dragged.translated(0.0, best.offset);
        for &(index, position) in &best.matches {
            let target = &targets[index];
            guides.push(GuideLine {
                orientation: Orientation::Horizontal,
                position,
                start: shifted.left.min(target.left),
                end: shifted.right.max(target.right),
            });
        }
    }

    SnapOutcome {
        dx,
        dy,
        guides: merge_guides(guides),
    }
}

/// Merge guides sharing orientation and position into one spanning line.
fn merge_guides(guides: Vec<GuideLine>) -> Vec<GuideLine> {
    let mut merged: Vec<GuideLine> = Vec::with_capacity(guides.len());
    for guide in guides {
        match merged
            .iter_mut()
            .find(|g| g.orientation == guide.orientation && g.position == guide.position)
        {
            Some(existing) => {
                existing.start = existing.start.min(guide.start);
                existing.end = existing.end.max(guide.end);
            }
            None => merged.push(guide),
        }
    }
    merged
}

/// Snap targets for a drag: every other settled, selectable shape plus the
/// canvas frame.
pub fn collect_snap_targets(
    shapes: &[Shape],
    dragged: &[ShapeId],
    bounds: &dyn BoundsProvider,
    frame: Rect,
) -> Vec<SnapEdges> {
    shapes
        .iter()
        .filter(|s| s.selectable && !s.is_drawing() && !dragged.contains(&s.id()))
        .map(|s| SnapEdges::from_rect(bounds.client_rect(s)))
        .chain(std::iter::once(SnapEdges::from_rect(frame)))
        .collect()
}
