//! Box selection: the selected set, the marquee, the outline overlay, and
//! group dragging.
//!
//! The engine is the single writer of every element's `selected` flag. All
//! paths that change membership (marquee, click, programmatic selection,
//! clear) go through [`BoxSelectionEngine::mark`] / [`BoxSelectionEngine::unmark`],
//! so once a public method returns, an element is flagged if and only if it
//! is in the set.
//!
//! Two gestures are mutually exclusive:
//!
//! - **Drawing**: a marquee from a fixed start corner to the pointer. Each
//!   move re-runs the overlap test against every element; elements entering
//!   the marquee are added and elements leaving it are removed.
//! - **Dragging**: the selection follows the pointer. Positions are computed
//!   from the drag-start snapshot plus the cumulative delta, never by chaining
//!   per-move deltas.
//!
//! Marquee corners are stored in scene space, so panning or zooming
//! mid-gesture keeps the marquee attached to the content. The overlap test
//! itself runs on screen-space bounds.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::consts;
use crate::geom::{Point, Rect};
use crate::hit;
use crate::input::Target;
use crate::scene::{ElementId, Scene};
use crate::viewport::ViewportTransform;

/// How the overlay should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayStyle {
    /// The live drag-selection rectangle.
    Marquee,
    /// Static, unfilled outline around a settled selection.
    Outline,
}

/// Selection visual, in scene space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Overlay {
    pub rect: Rect,
    pub style: OverlayStyle,
}

#[derive(Debug, Clone, PartialEq)]
struct DragSession {
    /// Scene-space pointer position at drag start.
    anchor: Point,
    /// Position of every selected element at drag start.
    snapshot: Vec<(ElementId, Point)>,
    /// Overlay rectangle at drag start.
    overlay_origin: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq, Default)]
enum SelectionGesture {
    #[default]
    Idle,
    Drawing {
        start: Point,
        current: Point,
    },
    Dragging(DragSession),
}

#[derive(Debug, Clone)]
pub struct BoxSelectionEngine {
    selected: BTreeSet<ElementId>,
    gesture: SelectionGesture,
    overlay: Option<Overlay>,
    padding: f64,
    revision: u64,
}

impl Default for BoxSelectionEngine {
    fn default() -> Self {
        Self::new(consts::OVERLAY_PADDING)
    }
}

impl BoxSelectionEngine {
    #[must_use]
    pub fn new(padding: f64) -> Self {
        Self {
            selected: BTreeSet::new(),
            gesture: SelectionGesture::Idle,
            overlay: None,
            padding,
            revision: 0,
        }
    }

    // --- Queries ---

    /// Selected ids in sorted order.
    #[must_use]
    pub fn selected(&self) -> Vec<ElementId> {
        self.selected.iter().copied().collect()
    }

    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.selected.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Whether a marquee or drag is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self.gesture, SelectionGesture::Idle)
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        matches!(self.gesture, SelectionGesture::Drawing { .. })
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, SelectionGesture::Dragging(_))
    }

    #[must_use]
    pub fn overlay(&self) -> Option<Overlay> {
        self.overlay
    }

    /// Incremented whenever set membership changes.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether `scene_point` falls on the settled selection outline.
    #[must_use]
    pub fn overlay_contains(&self, scene_point: Point) -> bool {
        self.overlay
            .is_some_and(|o| o.style == OverlayStyle::Outline && hit::contains(Some(o.rect), scene_point))
    }

    // --- Pointer gestures ---

    /// Begin a selection gesture at `screen_point` on `target`.
    ///
    /// A selected element or the overlay starts a group drag. An unselected
    /// element replaces the selection and starts a drag for it alone. The
    /// background clears the selection and starts a marquee.
    pub fn on_pointer_down(
        &mut self,
        scene: &mut dyn Scene,
        viewport: &ViewportTransform,
        screen_point: Point,
        target: Target,
    ) {
        let scene_point = viewport.screen_to_scene(screen_point);
        match target {
            Target::Element(id) if scene.bounds(id).is_none() => {
                tracing::debug!(%id, "press on stale element, treating as background");
                self.start_drawing(scene, scene_point);
            }
            Target::Element(id) if self.selected.contains(&id) => self.start_drag(scene, scene_point),
            Target::Overlay if !self.selected.is_empty() => self.start_drag(scene, scene_point),
            Target::Element(id) => {
                self.replace_with(scene, &[id]);
                self.redraw_outline(scene);
                self.start_drag(scene, scene_point);
            }
            Target::Overlay | Target::Background => self.start_drawing(scene, scene_point),
        }
    }

    /// Update the active gesture. Returns whether a gesture consumed the move.
    pub fn on_pointer_move(&mut self, scene: &mut dyn Scene, viewport: &ViewportTransform, screen_point: Point) -> bool {
        let scene_point = viewport.screen_to_scene(screen_point);
        match &mut self.gesture {
            SelectionGesture::Idle => false,
            SelectionGesture::Drawing { start, current } => {
                *current = scene_point;
                let marquee = Rect::from_points(*start, *current);
                self.overlay = Some(Overlay { rect: marquee, style: OverlayStyle::Marquee });
                self.hit_test_marquee(scene, viewport, &marquee);
                true
            }
            SelectionGesture::Dragging(session) => {
                let delta = scene_point - session.anchor;
                for (id, origin) in &session.snapshot {
                    scene.set_position(*id, *origin + delta);
                }
                if let Some(origin) = session.overlay_origin {
                    self.overlay = Some(Overlay { rect: origin.translate(delta), style: OverlayStyle::Outline });
                }
                true
            }
        }
    }

    /// Finish the active gesture. Returns whether one was in progress.
    pub fn on_pointer_up(&mut self, scene: &mut dyn Scene, viewport: &ViewportTransform) -> bool {
        if let SelectionGesture::Drawing { start, current } = self.gesture {
            // Settle against the final marquee in case the viewport moved
            // since the last pointer move.
            self.hit_test_marquee(scene, viewport, &Rect::from_points(start, current));
        }
        let was_active = self.is_active();
        self.gesture = SelectionGesture::Idle;
        if was_active {
            self.redraw_outline(scene);
        }
        was_active
    }

    /// Re-run the marquee overlap test, as after the viewport moved under a
    /// live marquee. Returns whether a marquee is being drawn.
    pub fn resync_marquee(&mut self, scene: &mut dyn Scene, viewport: &ViewportTransform) -> bool {
        let SelectionGesture::Drawing { start, current } = self.gesture else {
            return false;
        };
        self.hit_test_marquee(scene, viewport, &Rect::from_points(start, current));
        true
    }

    // --- Programmatic selection ---

    /// Unselect everything and drop the overlay and any gesture. Safe to call
    /// repeatedly; only the first call on a non-empty set bumps the revision.
    pub fn clear(&mut self, scene: &mut dyn Scene) {
        let ids: Vec<ElementId> = self.selected.iter().copied().collect();
        for id in ids {
            self.unmark(scene, id);
        }
        self.overlay = None;
        self.gesture = SelectionGesture::Idle;
    }

    /// Replace the selection with `ids`. Unknown ids are skipped.
    pub fn select_elements(&mut self, scene: &mut dyn Scene, ids: &[ElementId]) {
        self.gesture = SelectionGesture::Idle;
        self.replace_with(scene, ids);
        self.redraw_outline(scene);
    }

    /// Select exactly one element, or clear with `None`.
    pub fn select_element(&mut self, scene: &mut dyn Scene, id: Option<ElementId>) {
        match id {
            Some(id) => self.select_elements(scene, &[id]),
            None => self.clear(scene),
        }
    }

    pub fn select_all(&mut self, scene: &mut dyn Scene) {
        let ids = scene.element_ids();
        self.select_elements(scene, &ids);
    }

    /// Drop ids whose element no longer exists and recompute the outline
    /// from current bounds. Leaves a live marquee alone.
    pub fn refresh_overlay(&mut self, scene: &mut dyn Scene) {
        let stale: Vec<ElementId> = self.selected.iter().copied().filter(|id| scene.bounds(*id).is_none()).collect();
        for id in stale {
            tracing::debug!(%id, "pruning removed element from selection");
            self.unmark(scene, id);
        }
        if !self.is_drawing() {
            self.redraw_outline(scene);
        }
    }

    // --- Internals ---

    fn start_drawing(&mut self, scene: &mut dyn Scene, scene_point: Point) {
        self.clear(scene);
        self.gesture = SelectionGesture::Drawing { start: scene_point, current: scene_point };
        self.overlay = Some(Overlay { rect: Rect::from_points(scene_point, scene_point), style: OverlayStyle::Marquee });
        tracing::debug!(x = scene_point.x, y = scene_point.y, "marquee started");
    }

    fn start_drag(&mut self, scene: &dyn Scene, scene_point: Point) {
        let snapshot = self.selected.iter().filter_map(|id| scene.position(*id).map(|p| (*id, p))).collect::<Vec<_>>();
        tracing::debug!(count = snapshot.len(), "selection drag started");
        self.gesture = SelectionGesture::Dragging(DragSession {
            anchor: scene_point,
            snapshot,
            overlay_origin: self.overlay.map(|o| o.rect),
        });
    }

    fn hit_test_marquee(&mut self, scene: &mut dyn Scene, viewport: &ViewportTransform, marquee: &Rect) {
        let marquee_screen = viewport.scene_rect_to_screen(marquee);
        let ids = scene.element_ids();
        let live: HashSet<ElementId> = ids.iter().copied().collect();

        for id in ids {
            let overlapping = scene
                .bounds(id)
                .is_some_and(|b| hit::rects_overlap(&viewport.scene_rect_to_screen(&b), &marquee_screen));
            if overlapping {
                self.mark(scene, id);
            } else {
                self.unmark(scene, id);
            }
        }

        let gone: Vec<ElementId> = self.selected.iter().copied().filter(|id| !live.contains(id)).collect();
        for id in gone {
            self.unmark(scene, id);
        }
    }

    fn replace_with(&mut self, scene: &mut dyn Scene, ids: &[ElementId]) {
        let wanted: BTreeSet<ElementId> = ids.iter().copied().filter(|id| scene.bounds(*id).is_some()).collect();
        let dropped: Vec<ElementId> = self.selected.difference(&wanted).copied().collect();
        for id in dropped {
            self.unmark(scene, id);
        }
        for id in wanted {
            self.mark(scene, id);
        }
    }

    fn mark(&mut self, scene: &mut dyn Scene, id: ElementId) {
        if self.selected.insert(id) {
            self.revision += 1;
            scene.set_selected(id, true);
        } else if !scene.is_selected(id) {
            scene.set_selected(id, true);
        }
    }

    fn unmark(&mut self, scene: &mut dyn Scene, id: ElementId) {
        if self.selected.remove(&id) {
            self.revision += 1;
            scene.set_selected(id, false);
        }
    }

    /// Outline the union of the selection's bounds, or drop the overlay when
    /// nothing is selected.
    fn redraw_outline(&mut self, scene: &dyn Scene) {
        let union = self
            .selected
            .iter()
            .filter_map(|id| scene.bounds(*id))
            .filter(|b| !b.is_degenerate())
            .reduce(|acc, b| acc.union(&b));
        self.overlay = union.map(|rect| Overlay { rect: rect.inflate(self.padding), style: OverlayStyle::Outline });
    }
}
