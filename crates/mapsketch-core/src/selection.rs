//! Click-based feature selection.

use crate::feature::FeatureId;
use crate::store::FeatureStore;
use kurbo::Point;

/// Emitted when a click changes the selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectEvent {
    /// Features that became selected.
    pub selected: Vec<FeatureId>,
    /// Features that were selected before the click and no longer are.
    pub deselected: Vec<FeatureId>,
}

impl SelectEvent {
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.deselected.is_empty()
    }
}

/// Hit-tests clicks against the feature store and tracks the selection set.
///
/// Inactive by default; clicks are ignored until [`activate`](Self::activate).
#[derive(Debug, Clone, Default)]
pub struct Selection {
    active: bool,
    selected: Vec<FeatureId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Currently selected feature IDs.
    pub fn selected(&self) -> &[FeatureId] {
        &self.selected
    }

    pub fn contains(&self, id: FeatureId) -> bool {
        self.selected.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Empty the selection set.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Single-click pick at a map point.
    ///
    /// The topmost feature under the point replaces the selection. A click on
    /// empty space deselects everything. Returns `None` when inactive or when
    /// nothing changed.
    pub fn click(&mut self, store: &FeatureStore, point: Point, tolerance: f64) -> Option<SelectEvent> {
        if !self.active {
            return None;
        }

        let hit = store.features_at_point(point, tolerance).into_iter().next();
        let event = match hit {
            Some(id) if self.selected == [id] => return None,
            Some(id) => SelectEvent {
                selected: vec![id],
                deselected: std::mem::replace(&mut self.selected, vec![id]),
            },
            None if self.selected.is_empty() => return None,
            None => SelectEvent {
                selected: Vec::new(),
                deselected: std::mem::take(&mut self.selected),
            },
        };
        log::debug!(
            "Selection changed: +{} -{}",
            event.selected.len(),
            event.deselected.len()
        );
        Some(event)
    }
}
