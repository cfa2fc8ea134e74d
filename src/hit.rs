#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::geom::{Point, Rect};
use crate::scene::ElementId;

/// Whether two rectangles overlap. Rectangles that only touch along an edge
/// count as overlapping; a degenerate rectangle overlaps nothing.
#[must_use]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    if a.is_degenerate() || b.is_degenerate() {
        return false;
    }
    !(a.min_x > b.max_x || a.max_x < b.min_x || a.min_y > b.max_y || a.max_y < b.min_y)
}

/// Whether `point` lies inside `bounds`. Missing or degenerate bounds never hit.
#[must_use]
pub fn contains(bounds: Option<Rect>, point: Point) -> bool {
    bounds.is_some_and(|b| !b.is_degenerate() && b.contains(point))
}

/// The last element in draw order whose bounds contain `point`.
///
/// `elements` must be ordered bottom to top.
pub fn topmost_at(point: Point, elements: impl IntoIterator<Item = (ElementId, Option<Rect>)>) -> Option<ElementId> {
    elements
        .into_iter()
        .filter(|(_, bounds)| contains(*bounds, point))
        .last()
        .map(|(id, _)| id)
}
