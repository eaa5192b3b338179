//! Map layers: the base tile layer and the vector layer of drawn features.

use kurbo::Rect;
use mapsketch_core::view::{MapView, WORLD_HALF_EXTENT};
use serde::{Deserialize, Serialize};

/// Highest zoom level served by the OpenStreetMap tile servers.
pub const OSM_MAX_ZOOM: u8 = 19;

/// Source of base-map raster tiles.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TileSource {
    /// OpenStreetMap standard tiles.
    #[default]
    Osm,
    /// Any XYZ tile service; `{z}`, `{x}` and `{y}` are substituted.
    Xyz { url: String },
}

impl TileSource {
    pub fn url_template(&self) -> &str {
        match self {
            TileSource::Osm => "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
            TileSource::Xyz { url } => url,
        }
    }

    pub fn tile_url(&self, tile: TileCoord) -> String {
        self.url_template()
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }

    pub fn attribution(&self) -> Option<&'static str> {
        match self {
            TileSource::Osm => Some("© OpenStreetMap contributors"),
            TileSource::Xyz { .. } => None,
        }
    }
}

/// Address of one tile in the XYZ scheme (y grows southwards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

/// One layer of the map, bottom to top.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Tile(TileSource),
    /// Drawn features, backed by the widget's feature store.
    Vector,
}

/// Tile layer under the vector layer.
pub fn default_layers(base_map: TileSource) -> Vec<Layer> {
    vec![Layer::Tile(base_map), Layer::Vector]
}

/// Tiles needed to cover the visible extent of `view`.
pub fn visible_tiles(view: &MapView) -> Vec<TileCoord> {
    let z = view.zoom.round().clamp(0.0, OSM_MAX_ZOOM as f64) as u8;
    let n = 1u32 << z;
    let tile_size = 2.0 * WORLD_HALF_EXTENT / n as f64;

    let world = Rect::new(-WORLD_HALF_EXTENT, -WORLD_HALF_EXTENT, WORLD_HALF_EXTENT, WORLD_HALF_EXTENT);
    let extent = view.extent().intersect(world);
    if extent.width() <= 0.0 || extent.height() <= 0.0 {
        return Vec::new();
    }

    let index = |v: f64| ((v / tile_size).floor().max(0.0) as u32).min(n - 1);
    let x0 = index(extent.x0 + WORLD_HALF_EXTENT);
    let x1 = index(extent.x1 + WORLD_HALF_EXTENT);
    let y0 = index(WORLD_HALF_EXTENT - extent.y1);
    let y1 = index(WORLD_HALF_EXTENT - extent.y0);

    let mut tiles = Vec::with_capacity(((x1 - x0 + 1) * (y1 - y0 + 1)) as usize);
    for y in y0..=y1 {
        for x in x0..=x1 {
            tiles.push(TileCoord { z, x, y });
        }
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Size};

    #[test]
    fn test_osm_tile_url() {
        let url = TileSource::Osm.tile_url(TileCoord { z: 3, x: 4, y: 2 });
        assert_eq!(url, "https://tile.openstreetmap.org/3/4/2.png");
        let custom = TileSource::Xyz {
            url: "https://tiles.example/{z}-{x}-{y}.png".to_string(),
        };
        assert_eq!(custom.tile_url(TileCoord { z: 1, x: 0, y: 1 }), "https://tiles.example/1-0-1.png");
        assert!(custom.attribution().is_none());
    }

    #[test]
    fn test_default_layers() {
        let layers = default_layers(TileSource::default());
        assert_eq!(layers, vec![Layer::Tile(TileSource::Osm), Layer::Vector]);
    }

    #[test]
    fn test_tile_source_serde() {
        let source: TileSource = serde_json::from_str(r#"{"type":"osm"}"#).unwrap();
        assert_eq!(source, TileSource::Osm);
        let source: TileSource = serde_json::from_str(r#"{"type":"xyz","url":"u/{z}"}"#).unwrap();
        assert_eq!(source.url_template(), "u/{z}");
    }

    #[test]
    fn test_visible_tiles_whole_world() {
        let view = MapView::new(Point::ZERO, 0.0, Size::new(256.0, 256.0));
        assert_eq!(visible_tiles(&view), vec![TileCoord { z: 0, x: 0, y: 0 }]);

        let view = MapView::new(Point::ZERO, 1.0, Size::new(512.0, 512.0));
        assert_eq!(visible_tiles(&view).len(), 4);
    }

    #[test]
    fn test_visible_tiles_north_west_corner() {
        let res = MapView::default().resolution();
        let center = Point::new(-WORLD_HALF_EXTENT + 64.0 * res, WORLD_HALF_EXTENT - 64.0 * res);
        let view = MapView::new(center, 2.0, Size::new(100.0, 100.0));
        assert_eq!(visible_tiles(&view), vec![TileCoord { z: 2, x: 0, y: 0 }]);
    }
}
