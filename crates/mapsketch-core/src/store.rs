//! The feature store: single source of truth for what has been drawn.

use crate::feature::{Feature, FeatureId};
use kurbo::{Point, Rect};
use std::collections::HashMap;
use thiserror::Error;

/// Feature store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Feature already in store: {0}")]
    DuplicateFeature(FeatureId),
    #[error("Feature not found: {0}")]
    NotFound(FeatureId),
    #[error("Feature is still selected and cannot be removed: {0}")]
    StillSelected(FeatureId),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Ordered collection of drawn features.
///
/// Insertion order is preserved and drives export order. Hit-testing
/// returns features front to back (most recently added first).
#[derive(Debug, Clone, Default)]
pub struct FeatureStore {
    /// All features, keyed by ID.
    features: HashMap<FeatureId, Feature>,
    /// Insertion order.
    order: Vec<FeatureId>,
    /// Bumped on every change and on explicit refresh.
    revision: u64,
}

impl FeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a feature. A feature whose ID is already present is rejected.
    pub fn add(&mut self, feature: Feature) -> StoreResult<FeatureId> {
        let id = feature.id();
        if self.features.contains_key(&id) {
            return Err(StoreError::DuplicateFeature(id));
        }
        self.order.push(id);
        self.features.insert(id, feature);
        self.revision += 1;
        log::debug!("Added feature {} ({} total)", id, self.order.len());
        Ok(id)
    }

    /// Remove a feature.
    pub fn remove(&mut self, id: FeatureId) -> StoreResult<Feature> {
        let feature = self.features.remove(&id).ok_or(StoreError::NotFound(id))?;
        self.order.retain(|&fid| fid != id);
        self.revision += 1;
        log::debug!("Removed feature {} ({} left)", id, self.order.len());
        Ok(feature)
    }

    /// Remove a feature unless it is part of `selected`.
    ///
    /// Features still held by a selection set must be deselected first.
    pub fn remove_unselected(&mut self, id: FeatureId, selected: &[FeatureId]) -> StoreResult<Feature> {
        if selected.contains(&id) {
            return Err(StoreError::StillSelected(id));
        }
        self.remove(id)
    }

    /// Remove every feature.
    pub fn clear(&mut self) {
        self.features.clear();
        self.order.clear();
        self.revision += 1;
    }

    /// Mark the store as changed so that views redraw.
    pub fn refresh(&mut self) {
        self.revision += 1;
    }

    /// Change counter; differs whenever the visible content may differ.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(&id)
    }

    pub fn get_mut(&mut self, id: FeatureId) -> Option<&mut Feature> {
        self.features.get_mut(&id)
    }

    pub fn contains(&self, id: FeatureId) -> bool {
        self.features.contains_key(&id)
    }

    /// Features in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.order.iter().filter_map(|id| self.features.get(id))
    }

    /// Feature IDs in insertion order.
    pub fn ids(&self) -> &[FeatureId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Features under a map point, front to back.
    pub fn features_at_point(&self, point: Point, tolerance: f64) -> Vec<FeatureId> {
        self.order
            .iter()
            .rev()
            .filter_map(|&id| {
                self.features
                    .get(&id)
                    .filter(|f| f.geometry.hit_test(point, tolerance))
                    .map(|_| id)
            })
            .collect()
    }

    /// Bounding box of every feature.
    pub fn bounds(&self) -> Option<Rect> {
        self.iter()
            .map(|f| f.geometry.bounds())
            .reduce(|acc, b| acc.union(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;

    fn point_feature(x: f64, y: f64) -> Feature {
        Feature::new(Geometry::point(Point::new(x, y)))
    }

    #[test]
    fn test_add_and_remove() {
        let mut store = FeatureStore::new();
        let id = store.add(point_feature(0.0, 0.0)).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.contains(id));

        let removed = store.remove(id).unwrap();
        assert_eq!(removed.id(), id);
        assert!(store.is_empty());
        assert_eq!(store.remove(id), Err(StoreError::NotFound(id)));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut store = FeatureStore::new();
        let feature = point_feature(1.0, 1.0);
        store.add(feature.clone()).unwrap();
        assert_eq!(store.add(feature.clone()), Err(StoreError::DuplicateFeature(feature.id())));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_insertion_order() {
        let mut store = FeatureStore::new();
        let a = store.add(point_feature(0.0, 0.0)).unwrap();
        let b = store.add(point_feature(1.0, 0.0)).unwrap();
        let c = store.add(point_feature(2.0, 0.0)).unwrap();
        store.remove(b).unwrap();
        let ids: Vec<_> = store.iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec![a, c]);
        assert_eq!(store.ids(), &[a, c]);
    }

    #[test]
    fn test_still_selected_refused() {
        let mut store = FeatureStore::new();
        let id = store.add(point_feature(0.0, 0.0)).unwrap();
        assert_eq!(store.remove_unselected(id, &[id]), Err(StoreError::StillSelected(id)));
        assert!(store.contains(id));
        assert!(store.remove_unselected(id, &[]).is_ok());
    }

    #[test]
    fn test_features_at_point_front_to_back() {
        let mut store = FeatureStore::new();
        let back = store.add(Feature::new(Geometry::circle(Point::ZERO, 10.0))).unwrap();
        let front = store.add(point_feature(1.0, 1.0)).unwrap();
        let hits = store.features_at_point(Point::new(1.0, 1.0), 0.5);
        assert_eq!(hits, vec![front, back]);
        assert_eq!(store.features_at_point(Point::new(50.0, 50.0), 0.5), Vec::<FeatureId>::new());
    }

    #[test]
    fn test_revision_changes() {
        let mut store = FeatureStore::new();
        let r0 = store.revision();
        let id = store.add(point_feature(0.0, 0.0)).unwrap();
        let r1 = store.revision();
        assert!(r1 > r0);
        store.refresh();
        assert!(store.revision() > r1);
        store.remove(id).unwrap();
        store.clear();
        assert!(store.bounds().is_none());
    }
}
