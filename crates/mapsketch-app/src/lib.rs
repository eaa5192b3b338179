//! MapSketch Application
//!
//! The embeddable map-editing widget: host configuration, map lifecycle,
//! base-map layers and the public operations hosts call, for native and
//! WASM shells.

pub mod config;
pub mod layers;
mod surface;
mod widget;

pub use config::{ConfigError, WidgetConfig};
pub use layers::{Layer, TileCoord, TileSource};
pub use surface::{MapCanvas, OverlayContainer};
pub use widget::{MapWidget, WidgetError, WidgetResult};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{MapComponent, start};
