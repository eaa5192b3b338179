//! Drawn features: a geometry plus optional properties.

use crate::geometry::{Geometry, GeometryKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Unique identifier for features. Used as the feature's reference identity.
pub type FeatureId = Uuid;

/// Attribute properties attached to a feature.
pub type Properties = Map<String, Value>;

/// A single drawn shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub(crate) id: FeatureId,
    /// The feature geometry in map coordinates.
    pub geometry: Geometry,
    /// Attribute properties. `None` and an empty map are equivalent.
    #[serde(default)]
    pub properties: Option<Properties>,
}

impl Feature {
    /// Create a feature without properties.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: Uuid::new_v4(),
            geometry,
            properties: None,
        }
    }

    /// Create a feature with properties.
    pub fn with_properties(geometry: Geometry, properties: Properties) -> Self {
        Self {
            id: Uuid::new_v4(),
            geometry,
            properties: Some(properties),
        }
    }

    pub fn id(&self) -> FeatureId {
        self.id
    }

    pub fn kind(&self) -> GeometryKind {
        self.geometry.kind()
    }

    /// Set one property, creating the property map if needed.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref().and_then(|p| p.get(key))
    }

    /// Properties, or `None` when absent or empty.
    pub fn non_empty_properties(&self) -> Option<&Properties> {
        self.properties.as_ref().filter(|p| !p.is_empty())
    }
}
