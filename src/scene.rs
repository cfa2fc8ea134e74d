//! Scene capability consumed by the engine, plus an in-memory store.
//!
//! The engine never owns scene elements. It keeps only [`ElementId`]s and
//! reaches the host's scene graph through the narrow [`Scene`] trait: a
//! bounds query, a position getter/setter, and the `selected` flag. A host
//! without its own graph can use [`SceneStore`], which is also what the tests
//! drive.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geom::{Point, Rect};
use crate::hit;

/// Unique identifier for a scene element.
pub type ElementId = Uuid;

/// What the engine needs from a scene graph.
///
/// Bounds and positions are in scene space. Every query takes an id and
/// answers `None` for an element that no longer exists, so a stale id held
/// by the selection degrades to "no overlap".
pub trait Scene {
    /// All selectable elements.
    fn element_ids(&self) -> Vec<ElementId>;

    /// Axis-aligned bounding box, or `None` if the element is gone.
    fn bounds(&self, id: ElementId) -> Option<Rect>;

    fn position(&self, id: ElementId) -> Option<Point>;

    fn set_position(&mut self, id: ElementId, position: Point);

    fn set_selected(&mut self, id: ElementId, selected: bool);

    fn is_selected(&self, id: ElementId) -> bool;

    /// Topmost element containing `point`. The default scans every element
    /// and prefers the one listed last.
    fn element_at(&self, point: Point) -> Option<ElementId> {
        hit::topmost_at(point, self.element_ids().into_iter().map(|id| (id, self.bounds(id))))
    }
}

/// A rectangular card placed on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: ElementId,
    /// Left edge in scene coordinates.
    pub x: f64,
    /// Top edge in scene coordinates.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Stacking order; higher values sit on top.
    #[serde(default)]
    pub z_index: i64,
    #[serde(default)]
    pub selected: bool,
}

impl Card {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { id: Uuid::new_v4(), x, y, width, height, z_index: 0, selected: false }
    }

    #[must_use]
    pub fn with_z(mut self, z_index: i64) -> Self {
        self.z_index = z_index;
        self
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// In-memory collection of cards.
#[derive(Debug, Clone, Default)]
pub struct SceneStore {
    cards: HashMap<ElementId, Card>,
}

impl SceneStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a card and return its id. Replaces any card with the same id.
    pub fn insert(&mut self, card: Card) -> ElementId {
        let id = card.id;
        self.cards.insert(id, card);
        id
    }

    pub fn remove(&mut self, id: ElementId) -> Option<Card> {
        self.cards.remove(&id)
    }

    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Card> {
        self.cards.get(&id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Card> {
        self.cards.get_mut(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards sorted by `z_index`, then by id for stable ordering.
    #[must_use]
    pub fn sorted_cards(&self) -> Vec<&Card> {
        let mut cards: Vec<&Card> = self.cards.values().collect();
        cards.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        cards
    }

    /// Ids of every card whose `selected` flag is set, sorted.
    #[must_use]
    pub fn flagged(&self) -> Vec<ElementId> {
        let mut ids: Vec<ElementId> = self.cards.values().filter(|c| c.selected).map(|c| c.id).collect();
        ids.sort();
        ids
    }
}

impl Scene for SceneStore {
    fn element_ids(&self) -> Vec<ElementId> {
        self.sorted_cards().into_iter().map(|c| c.id).collect()
    }

    fn bounds(&self, id: ElementId) -> Option<Rect> {
        self.cards.get(&id).map(Card::bounds)
    }

    fn position(&self, id: ElementId) -> Option<Point> {
        self.cards.get(&id).map(|c| Point::new(c.x, c.y))
    }

    fn set_position(&mut self, id: ElementId, position: Point) {
        if let Some(card) = self.cards.get_mut(&id) {
            card.x = position.x;
            card.y = position.y;
        }
    }

    fn set_selected(&mut self, id: ElementId, selected: bool) {
        if let Some(card) = self.cards.get_mut(&id) {
            card.selected = selected;
        }
    }

    fn is_selected(&self, id: ElementId) -> bool {
        self.cards.get(&id).is_some_and(|c| c.selected)
    }
}
