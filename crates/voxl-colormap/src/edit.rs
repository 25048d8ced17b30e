//! Interactive color map editing.
//!
//! [`ColorMapEditController`] turns pointer events in the editor box into
//! color map edits. The box uses normalized coordinates: `x` is the control
//! point position and `y` its opacity, so every control point is drawn as a
//! marker at `(position, alpha)`. A discontinuous point has two markers, one
//! per side.
//!
//! # State machine
//!
//! ```text
//!            press (hit)                 begin_drag
//!   Idle ------------------> Selected -----------------> Dragging
//!    ^  <------------------     ^  <-----------------       |
//!    |   press (miss),          |   release / cancel /      | drag_to,
//!    |   deselect               |   pointer_left            | pick_color
//!    +--------------------------+---------------------------+
//! ```
//!
//! While dragging, edits go to a [`StagedEdit`] copy of the selected point;
//! the committed map is untouched until [`release`](ColorMapEditController::release)
//! writes the copy back with a single [`ColorMap::replace_point`].
//!
//! # Example
//!
//! ```rust
//! use voxl_colormap::{BoxPoint, ColorMap, ColorMapEditController, DragMode};
//!
//! let mut map = ColorMap::default();
//! map.insert_control_point(0.5, [1.0, 0.0, 0.0, 1.0]).unwrap();
//!
//! let mut editor = ColorMapEditController::new(0.05);
//! let p = BoxPoint::new(0.5, 1.0);
//! assert!(editor.press(&map, p));
//! assert!(editor.begin_drag(&map, p, DragMode::Position));
//! editor.drag_to(BoxPoint::new(0.6, 0.5));
//! assert_eq!(map.point(1).unwrap().position, 0.5); // not committed yet
//!
//! let rev = map.revision();
//! assert_eq!(editor.release(&mut map).unwrap(), Some(1));
//! assert_eq!(map.point(1).unwrap().position, 0.6);
//! assert_eq!(map.revision(), rev + 1);
//! ```

use std::borrow::Cow;

use tracing::{debug, trace};

use crate::types::{check_rgba, Continuity, ControlPoint, Rgba, Side};
use crate::{ColorMap, ColorMapError, ColorMapResult};

/// Minimum distance a dragged point keeps from its neighbours.
pub const MIN_SEPARATION: f64 = 1e-6;

/// Pointer location in the editor box (`x` = position, `y` = opacity).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxPoint {
    /// Normalized intensity axis.
    pub x: f64,
    /// Opacity axis.
    pub y: f64,
}

impl BoxPoint {
    /// Creates a box point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    fn distance(self, other: BoxPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// What a drag gesture edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragMode {
    /// Pointer moves position and opacity.
    #[default]
    Position,
    /// Color comes from [`ColorMapEditController::pick_color`].
    Color,
}

/// Controller state, derived from selection and staged edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    /// Nothing selected.
    Idle,
    /// A marker is selected.
    Selected,
    /// A drag gesture is staging an edit.
    Dragging,
}

/// Selected marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Control point index.
    pub index: usize,
    /// Which color of the point; `Right` for continuous points.
    pub side: Side,
}

/// Uncommitted copy of the point being dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StagedEdit {
    /// Target index in the committed map.
    pub index: usize,
    /// Side being edited.
    pub side: Side,
    /// Gesture mode.
    pub mode: DragMode,
    /// Point as it was when the drag began.
    pub original: ControlPoint,
    /// Edited copy.
    pub point: ControlPoint,
    /// Allowed position interval (already shrunk by [`MIN_SEPARATION`]).
    pub bounds: (f64, f64),
    /// Map revision the copy was taken from.
    pub base_revision: u64,
}

/// Queries for enabling editor UI actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiState {
    /// A control point is selected.
    ControlSelected,
    /// The selected point can be deleted or moved.
    SelectedIsNotEndpoint,
    /// The selected point has two colors.
    SelectedIsDiscontinuous,
}

/// Selection, drag staging and commit for one color map editor.
#[derive(Debug, Clone)]
pub struct ColorMapEditController {
    hit_radius: f64,
    selection: Option<Selection>,
    staged: Option<StagedEdit>,
}

impl Default for ColorMapEditController {
    fn default() -> Self {
        Self::new(0.02)
    }
}

/// Markers of a map in drawing order: `(index, side, location)`.
fn markers(map: &ColorMap) -> impl Iterator<Item = (usize, Side, BoxPoint)> + '_ {
    map.points().iter().enumerate().flat_map(|(i, p)| {
        let right = (i, Side::Right, BoxPoint::new(p.position, p.right[3] as f64));
        let left = p
            .is_discontinuous()
            .then(|| (i, Side::Left, BoxPoint::new(p.position, p.left[3] as f64)));
        left.into_iter().chain(std::iter::once(right))
    })
}

impl ColorMapEditController {
    /// Creates an idle controller with the given hit radius (box units).
    pub fn new(hit_radius: f64) -> Self {
        Self {
            hit_radius: hit_radius.abs(),
            selection: None,
            staged: None,
        }
    }

    /// Hit radius in box units.
    #[inline]
    pub fn hit_radius(&self) -> f64 {
        self.hit_radius
    }

    /// Current state.
    pub fn state(&self) -> EditState {
        match (self.selection, self.staged) {
            (_, Some(_)) => EditState::Dragging,
            (Some(_), None) => EditState::Selected,
            (None, None) => EditState::Idle,
        }
    }

    /// Current selection.
    #[inline]
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Staged edit of the running drag.
    #[inline]
    pub fn staged(&self) -> Option<&StagedEdit> {
        self.staged.as_ref()
    }

    /// Selection that still addresses a point of `map`.
    fn selected_in(&self, map: &ColorMap) -> Option<(Selection, ControlPoint)> {
        let sel = self.selection?;
        map.point(sel.index).map(|p| (sel, *p))
    }

    /// Nearest marker within the hit radius.
    ///
    /// Equal distances resolve to the right marker.
    pub fn hit_test(&self, map: &ColorMap, p: BoxPoint) -> Option<Selection> {
        let mut best: Option<(f64, Selection)> = None;
        for (index, side, at) in markers(map) {
            let d = p.distance(at);
            if d > self.hit_radius {
                continue;
            }
            let better = match best {
                None => true,
                Some((bd, _)) => d < bd || (d == bd && side == Side::Right),
            };
            if better {
                best = Some((d, Selection { index, side }));
            }
        }
        best.map(|(_, sel)| sel)
    }

    /// Pointer press: selects the marker under `p` or clears the selection.
    ///
    /// A press during a drag discards the staged edit first. Returns whether
    /// the selection changed.
    pub fn press(&mut self, map: &ColorMap, p: BoxPoint) -> bool {
        if let Some(staged) = self.staged.take() {
            debug!(index = staged.index, "staged edit discarded by press");
        }
        let hit = self.hit_test(map, p);
        let changed = hit != self.selection;
        self.selection = hit;
        trace!(?hit, "press");
        changed
    }

    /// Starts a drag on the selected marker.
    ///
    /// Only valid from [`EditState::Selected`] when `p` hits the selected
    /// marker.
    pub fn begin_drag(&mut self, map: &ColorMap, p: BoxPoint, mode: DragMode) -> bool {
        if self.staged.is_some() {
            return false;
        }
        let Some((sel, point)) = self.selected_in(map) else {
            return false;
        };
        if self.hit_test(map, p) != Some(sel) {
            return false;
        }
        let bounds = match map.position_bounds(sel.index) {
            Some((lo, hi)) if !map.is_endpoint(sel.index) => {
                // never narrower than the starting position
                let lo = (lo + MIN_SEPARATION).min(point.position);
                let hi = (hi - MIN_SEPARATION).max(point.position);
                (lo, hi)
            }
            _ => (point.position, point.position),
        };
        self.staged = Some(StagedEdit {
            index: sel.index,
            side: sel.side,
            mode,
            original: point,
            point,
            bounds,
            base_revision: map.revision(),
        });
        debug!(index = sel.index, ?mode, "drag started");
        true
    }

    /// Moves the staged point (position mode only).
    ///
    /// Position is clamped inside the neighbours, endpoints stay put and
    /// opacity is clamped to `[0, 1]`. Returns whether the staged copy
    /// changed.
    pub fn drag_to(&mut self, p: BoxPoint) -> bool {
        let Some(staged) = self.staged.as_mut() else {
            return false;
        };
        if staged.mode != DragMode::Position || p.x.is_nan() || p.y.is_nan() {
            return false;
        }
        let before = staged.point;
        let (lo, hi) = staged.bounds;
        staged.point.position = p.x.clamp(lo, hi);
        let alpha = p.y.clamp(0.0, 1.0) as f32;
        match (staged.point.is_discontinuous(), staged.side) {
            (true, Side::Left) => staged.point.left[3] = alpha,
            (true, Side::Right) => staged.point.right[3] = alpha,
            (false, _) => {
                staged.point.left[3] = alpha;
                staged.point.right[3] = alpha;
            }
        }
        staged.point != before
    }

    /// Sets the staged color (color mode only).
    pub fn pick_color(&mut self, rgba: Rgba) -> ColorMapResult<bool> {
        check_rgba(&rgba)?;
        match self.staged.as_mut() {
            Some(staged) if staged.mode == DragMode::Color => {
                staged.point.set_color(Some(staged.side), rgba);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Ends the drag and commits the staged copy in one map update.
    ///
    /// Returns the committed index, or `None` when no drag was running. If
    /// the map changed since the drag began the copy is dropped and
    /// [`ColorMapError::StaleEdit`] is returned.
    pub fn release(&mut self, map: &mut ColorMap) -> ColorMapResult<Option<usize>> {
        let Some(staged) = self.staged.take() else {
            return Ok(None);
        };
        if map.revision() != staged.base_revision {
            if map.point(staged.index).is_none() {
                self.selection = None;
            }
            return Err(ColorMapError::StaleEdit {
                staged: staged.base_revision,
                current: map.revision(),
            });
        }
        map.replace_point(staged.index, staged.point)?;
        debug!(
            index = staged.index,
            position = staged.point.position,
            revision = map.revision(),
            "drag committed"
        );
        Ok(Some(staged.index))
    }

    /// Abandons the drag, keeping the selection.
    pub fn cancel(&mut self) -> bool {
        let had = self.staged.take().is_some();
        if had {
            debug!("drag cancelled");
        }
        had
    }

    /// Pointer left the editor box; same as [`cancel`](Self::cancel).
    pub fn pointer_left(&mut self) -> bool {
        self.cancel()
    }

    /// Clears selection and any staged edit.
    pub fn deselect(&mut self) {
        self.staged = None;
        self.selection = None;
    }

    /// Inserts a continuous point at `x` with the map's current color there
    /// and selects it.
    pub fn insert_at(&mut self, map: &mut ColorMap, x: f64) -> ColorMapResult<usize> {
        let index = map.insert_control_point(x, map.evaluate(x))?;
        self.staged = None;
        self.selection = Some(Selection {
            index,
            side: Side::Right,
        });
        Ok(index)
    }

    /// Removes the selected point. Endpoints cannot be removed.
    pub fn delete_selected(&mut self, map: &mut ColorMap) -> ColorMapResult<bool> {
        let Some((sel, _)) = self.selected_in(map) else {
            return Ok(false);
        };
        map.remove_control_point(sel.index)?;
        self.staged = None;
        self.selection = None;
        Ok(true)
    }

    /// Changes continuity of the selected point.
    pub fn set_selected_continuity(
        &mut self,
        map: &mut ColorMap,
        continuity: Continuity,
    ) -> ColorMapResult<bool> {
        let Some((mut sel, _)) = self.selected_in(map) else {
            return Ok(false);
        };
        map.set_continuity(sel.index, continuity)?;
        if continuity == Continuity::Continuous {
            sel.side = Side::Right;
            self.selection = Some(sel);
        }
        Ok(true)
    }

    /// Switches the edited side of a discontinuous selected point.
    pub fn set_selected_side(&mut self, map: &ColorMap, side: Side) -> bool {
        match self.selected_in(map) {
            Some((mut sel, point)) if point.is_discontinuous() && sel.side != side => {
                sel.side = side;
                self.selection = Some(sel);
                true
            }
            _ => false,
        }
    }

    /// Interval the selected point may be moved within.
    pub fn selected_position_range(&self, map: &ColorMap) -> Option<(f64, f64)> {
        let (sel, _) = self.selected_in(map)?;
        map.position_bounds(sel.index)
    }

    /// Moves the selected point directly.
    pub fn set_selected_position(&mut self, map: &mut ColorMap, position: f64) -> ColorMapResult<bool> {
        let Some((sel, _)) = self.selected_in(map) else {
            return Ok(false);
        };
        map.set_position(sel.index, position)?;
        Ok(true)
    }

    /// Recolors the selected side.
    pub fn set_selected_color(&mut self, map: &mut ColorMap, rgba: Rgba) -> ColorMapResult<bool> {
        let Some((sel, _)) = self.selected_in(map) else {
            return Ok(false);
        };
        map.set_color(sel.index, Some(sel.side), rgba)?;
        Ok(true)
    }

    /// Answers a UI enablement query.
    pub fn check_state(&self, map: &ColorMap, query: UiState) -> bool {
        let Some((sel, point)) = self.selected_in(map) else {
            return false;
        };
        match query {
            UiState::ControlSelected => true,
            UiState::SelectedIsNotEndpoint => !map.is_endpoint(sel.index),
            UiState::SelectedIsDiscontinuous => point.is_discontinuous(),
        }
    }

    /// The map as it would look with the staged edit committed.
    pub fn preview<'a>(&self, map: &'a ColorMap) -> Cow<'a, ColorMap> {
        let Some(staged) = self.staged else {
            return Cow::Borrowed(map);
        };
        let mut copy = map.clone();
        match copy.replace_point(staged.index, staged.point) {
            Ok(()) => Cow::Owned(copy),
            Err(_) => Cow::Borrowed(map),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BLACK, WHITE};

    const RED: Rgba = [1.0, 0.0, 0.0, 1.0];
    const BLUE: Rgba = [0.0, 0.0, 1.0, 1.0];

    fn three_point_map() -> ColorMap {
        let mut map = ColorMap::default();
        map.insert_control_point(0.5, RED).unwrap();
        map
    }

    #[test]
    fn test_press_hit_and_miss() {
        let map = three_point_map();
        let mut ed = ColorMapEditController::new(0.05);
        assert_eq!(ed.state(), EditState::Idle);

        assert!(ed.press(&map, BoxPoint::new(0.52, 0.98)));
        assert_eq!(ed.selection(), Some(Selection { index: 1, side: Side::Right }));
        assert_eq!(ed.state(), EditState::Selected);

        assert!(!ed.press(&map, BoxPoint::new(0.51, 1.0)));
        assert!(ed.press(&map, BoxPoint::new(0.3, 0.5)));
        assert_eq!(ed.state(), EditState::Idle);
    }

    #[test]
    fn test_coincident_markers_prefer_right() {
        let mut map = three_point_map();
        map.set_continuity(1, Continuity::Discontinuous).unwrap();
        let mut ed = ColorMapEditController::new(0.05);
        ed.press(&map, BoxPoint::new(0.5, 1.0));
        assert_eq!(ed.selection().unwrap().side, Side::Right);

        let mut faded = RED;
        faded[3] = 0.5;
        map.set_color(1, Some(Side::Left), faded).unwrap();
        ed.press(&map, BoxPoint::new(0.5, 0.5));
        assert_eq!(ed.selection().unwrap().side, Side::Left);
    }

    #[test]
    fn test_begin_drag_requires_selected_marker() {
        let map = three_point_map();
        let mut ed = ColorMapEditController::new(0.05);
        assert!(!ed.begin_drag(&map, BoxPoint::new(0.5, 1.0), DragMode::Position));
        ed.press(&map, BoxPoint::new(0.5, 1.0));
        assert!(!ed.begin_drag(&map, BoxPoint::new(0.0, 1.0), DragMode::Position));
        assert!(ed.begin_drag(&map, BoxPoint::new(0.5, 1.0), DragMode::Position));
        assert_eq!(ed.state(), EditState::Dragging);
        assert!(!ed.begin_drag(&map, BoxPoint::new(0.5, 1.0), DragMode::Position));
    }

    #[test]
    fn test_drag_clamps_to_neighbours() {
        let mut map = three_point_map();
        map.insert_control_point(0.7, BLUE).unwrap();
        let mut ed = ColorMapEditController::new(0.05);
        let p = BoxPoint::new(0.5, 1.0);
        ed.press(&map, p);
        ed.begin_drag(&map, p, DragMode::Position);

        ed.drag_to(BoxPoint::new(0.95, 2.0));
        let staged = ed.staged().unwrap();
        assert!(staged.point.position < 0.7);
        assert!((staged.point.position - 0.7).abs() <= 2.0 * MIN_SEPARATION);
        assert_eq!(staged.point.right[3], 1.0);

        ed.drag_to(BoxPoint::new(-1.0, -1.0));
        let staged = ed.staged().unwrap();
        assert!(staged.point.position > 0.0);
        assert_eq!(staged.point.left[3], 0.0);

        ed.release(&mut map).unwrap();
        assert!(map.point(1).unwrap().position > 0.0);
        assert_eq!(map.point(1).unwrap().right[3], 0.0);
    }

    #[test]
    fn test_drag_back_next_to_close_neighbour() {
        let mut map = three_point_map();
        map.insert_control_point(0.42, BLUE).unwrap();
        let idx = map.insert_control_point(0.4200001, RED).unwrap();
        let before: Vec<Rgba> = (0..=1000).map(|i| map.evaluate(i as f64 / 1000.0)).collect();

        let mut ed = ColorMapEditController::new(0.01);
        let p = BoxPoint::new(0.4200001, 1.0);
        ed.press(&map, p);
        assert_eq!(ed.selection().unwrap().index, idx);
        assert!(ed.begin_drag(&map, p, DragMode::Position));
        let (lo, hi) = ed.staged().unwrap().bounds;
        assert!(lo <= 0.4200001 && 0.4200001 <= hi);

        ed.drag_to(BoxPoint::new(0.3, 1.0));
        assert!(ed.staged().unwrap().point.position >= 0.42);
        ed.drag_to(p);
        assert_eq!(ed.staged().unwrap().point.position, 0.4200001);
        ed.release(&mut map).unwrap();

        assert_eq!(map.point(idx).unwrap().position, 0.4200001);
        let after: Vec<Rgba> = (0..=1000).map(|i| map.evaluate(i as f64 / 1000.0)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_endpoint_drag_keeps_position() {
        let mut map = ColorMap::default();
        let mut ed = ColorMapEditController::new(0.05);
        let p = BoxPoint::new(1.0, 1.0);
        ed.press(&map, p);
        assert!(ed.begin_drag(&map, p, DragMode::Position));
        ed.drag_to(BoxPoint::new(0.4, 0.25));
        assert_eq!(ed.release(&mut map).unwrap(), Some(1));
        let end = map.point(1).unwrap();
        assert_eq!(end.position, 1.0);
        assert_eq!(end.right, [1.0, 1.0, 1.0, 0.25]);
    }

    #[test]
    fn test_color_mode() {
        let mut map = three_point_map();
        let mut ed = ColorMapEditController::new(0.05);
        let p = BoxPoint::new(0.5, 1.0);
        ed.press(&map, p);
        ed.begin_drag(&map, p, DragMode::Color);
        assert!(!ed.drag_to(BoxPoint::new(0.6, 0.2)));
        assert!(ed.pick_color([2.0, 0.0, 0.0, 1.0]).is_err());
        assert!(ed.pick_color(BLUE).unwrap());
        assert_eq!(map.point(1).unwrap().right, RED);
        assert_eq!(ed.preview(&map).point(1).unwrap().right, BLUE);
        ed.release(&mut map).unwrap();
        assert_eq!(map.point(1).unwrap().right, BLUE);
        assert_eq!(map.point(1).unwrap().position, 0.5);
    }

    #[test]
    fn test_cancel_and_pointer_left() {
        let mut map = three_point_map();
        let mut ed = ColorMapEditController::new(0.05);
        let p = BoxPoint::new(0.5, 1.0);
        ed.press(&map, p);
        ed.begin_drag(&map, p, DragMode::Position);
        ed.drag_to(BoxPoint::new(0.8, 0.1));
        assert!(ed.pointer_left());
        assert_eq!(ed.state(), EditState::Selected);
        assert_eq!(ed.release(&mut map).unwrap(), None);
        assert_eq!(map.revision(), 1);
        assert!(!ed.cancel());
    }

    #[test]
    fn test_press_during_drag_discards() {
        let mut map = three_point_map();
        let mut ed = ColorMapEditController::new(0.05);
        let p = BoxPoint::new(0.5, 1.0);
        ed.press(&map, p);
        ed.begin_drag(&map, p, DragMode::Position);
        ed.drag_to(BoxPoint::new(0.8, 0.1));
        ed.press(&map, BoxPoint::new(0.0, 1.0));
        assert_eq!(ed.state(), EditState::Selected);
        assert_eq!(ed.release(&mut map).unwrap(), None);
        assert_eq!(map.point(1).unwrap().position, 0.5);
    }

    #[test]
    fn test_stale_release() {
        let mut map = three_point_map();
        let mut ed = ColorMapEditController::new(0.05);
        let p = BoxPoint::new(0.5, 1.0);
        ed.press(&map, p);
        ed.begin_drag(&map, p, DragMode::Position);
        ed.drag_to(BoxPoint::new(0.6, 1.0));
        map.set_color(0, None, WHITE).unwrap();
        let rev = map.revision();
        assert!(matches!(
            ed.release(&mut map),
            Err(ColorMapError::StaleEdit { staged: 1, current: 2 })
        ));
        assert_eq!(map.revision(), rev);
        assert_eq!(map.point(1).unwrap().position, 0.5);
        assert_eq!(ed.state(), EditState::Selected);
    }

    #[test]
    fn test_insert_and_delete_selected() {
        let mut map = ColorMap::default();
        let mut ed = ColorMapEditController::new(0.05);
        let i = ed.insert_at(&mut map, 0.25).unwrap();
        assert_eq!(i, 1);
        assert_eq!(map.point(1).unwrap().right, [0.25, 0.25, 0.25, 1.0]);
        assert!(ed.check_state(&map, UiState::SelectedIsNotEndpoint));
        assert!(ed.delete_selected(&mut map).unwrap());
        assert_eq!(map, ColorMap::default());
        assert!(!ed.check_state(&map, UiState::ControlSelected));

        ed.press(&map, BoxPoint::new(0.0, 1.0));
        assert!(!ed.check_state(&map, UiState::SelectedIsNotEndpoint));
        assert!(ed.delete_selected(&mut map).is_err());
    }

    #[test]
    fn test_selected_setters() {
        let mut map = three_point_map();
        let mut ed = ColorMapEditController::new(0.05);
        ed.press(&map, BoxPoint::new(0.5, 1.0));

        assert!(ed.set_selected_continuity(&mut map, Continuity::Discontinuous).unwrap());
        assert!(ed.check_state(&map, UiState::SelectedIsDiscontinuous));
        assert!(ed.set_selected_side(&map, Side::Left));
        assert!(ed.set_selected_color(&mut map, BLACK).unwrap());
        let p = map.point(1).unwrap();
        assert_eq!((p.left, p.right), (BLACK, RED));

        assert_eq!(ed.selected_position_range(&map), Some((0.0, 1.0)));
        assert!(ed.set_selected_position(&mut map, 0.3).unwrap());
        assert!(ed.set_selected_position(&mut map, 1.0).is_err());

        ed.set_selected_continuity(&mut map, Continuity::Continuous).unwrap();
        assert_eq!(ed.selection().unwrap().side, Side::Right);
        assert!(!ed.set_selected_side(&map, Side::Left));
    }
}
