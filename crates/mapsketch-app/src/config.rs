//! Host-supplied widget configuration.

use crate::layers::TileSource;
use kurbo::Point;
use mapsketch_core::tools::ToolKind;
use peniko::Color;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Widget configuration.
///
/// Keys are camelCase. Sizes accept a pixel count or a CSS length such as
/// `"400px"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WidgetConfig {
    #[serde(deserialize_with = "de_length")]
    pub width: u32,
    #[serde(deserialize_with = "de_length")]
    pub height: u32,
    /// Draw tools offered, one per kind.
    #[serde(alias = "drawFeatuers")]
    pub draw_features: Vec<ToolKind>,
    /// Initial view centre in map units.
    pub center: [f64; 2],
    pub zoom: f64,
    pub base_map: TileSource,
    /// Colour painted where no tile has been drawn (`#rrggbb`).
    pub background_color: String,
    /// Pick tolerance in pixels.
    pub hit_tolerance: f64,
    /// Id of the host canvas element (WASM).
    pub target: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            draw_features: ToolKind::DEFAULTS.to_vec(),
            center: [0.0, 0.0],
            zoom: 2.0,
            base_map: TileSource::Osm,
            background_color: "#f2efe9".to_string(),
            hit_tolerance: 6.0,
            target: "map".to_string(),
        }
    }
}

impl WidgetConfig {
    /// Parse host JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.background()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        log::info!("Loaded configuration from {}", path.display());
        Self::from_json(&json)
    }

    pub fn center_point(&self) -> Point {
        Point::new(self.center[0], self.center[1])
    }

    pub fn background(&self) -> ConfigResult<Color> {
        parse_color(&self.background_color).ok_or_else(|| ConfigError::InvalidColor(self.background_color.clone()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Length {
    Pixels(u32),
    Css(String),
}

fn de_length<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    match Length::deserialize(deserializer)? {
        Length::Pixels(0) => Err(D::Error::custom("length must be positive")),
        Length::Pixels(px) => Ok(px),
        Length::Css(s) => parse_length(&s).ok_or_else(|| D::Error::custom(format!("invalid length: {s}"))),
    }
}

/// Parse `"400"` or `"400px"` into whole pixels.
pub fn parse_length(s: &str) -> Option<u32> {
    let s = s.trim();
    let number = s.strip_suffix("px").unwrap_or(s).trim();
    let value: f64 = number.parse().ok()?;
    (value.is_finite() && value >= 1.0 && value <= u32::MAX as f64).then(|| value.round() as u32)
}

/// Parse a CSS color string like "#ff0000".
fn parse_color(s: &str) -> Option<Color> {
    let hex = s.trim().strip_prefix('#').filter(|h| h.len() == 6 && h.is_ascii())?;
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::from_rgba8(r, g, b, 255))
}
