//! MapSketch Core Library
//!
//! Platform-agnostic feature store, draw tools and interaction state machine
//! for the MapSketch map-editing widget.

pub mod feature;
pub mod geojson;
pub mod geometry;
pub mod input;
pub mod interaction;
pub mod selection;
pub mod store;
pub mod tools;
pub mod view;

pub use feature::{Feature, FeatureId, Properties};
pub use geojson::{GeoJsonError, GeoJsonResult, read_features, write_features};
pub use geometry::{Geometry, GeometryKind, GeometryTrait};
pub use input::{ClickKind, ClickTracker, MapInput};
pub use interaction::{Change, InteractionCoordinator, Mode};
pub use selection::{SelectEvent, Selection};
pub use store::{FeatureStore, StoreError, StoreResult};
pub use tools::{DrawSignal, DrawState, DrawTool, ToolError, ToolKind, ToolRegistry, ToolResult};
pub use view::MapView;
