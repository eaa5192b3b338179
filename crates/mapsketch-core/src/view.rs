//! Map view: centre, zoom and the screen/map transform.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Resolution (metres per pixel) at zoom 0 for 256 px Web Mercator tiles.
pub const MAX_RESOLUTION: f64 = 156_543.033_928_040_97;

/// Half the width of the Web Mercator world, in metres.
pub const WORLD_HALF_EXTENT: f64 = 20_037_508.342_789_244;

/// The visible part of the map.
///
/// Map coordinates are Web Mercator metres with y pointing north; screen
/// coordinates are pixels with y pointing down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    /// Map point shown at the centre of the viewport.
    pub center: Point,
    /// Zoom level (resolution halves per level).
    pub zoom: f64,
    /// Viewport size in pixels.
    pub viewport: Size,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: Point::ZERO,
            zoom: 2.0,
            viewport: Size::new(800.0, 600.0),
            min_zoom: 0.0,
            max_zoom: 28.0,
        }
    }
}

impl MapView {
    pub fn new(center: Point, zoom: f64, viewport: Size) -> Self {
        let mut view = Self {
            center,
            viewport,
            ..Self::default()
        };
        view.zoom = zoom.clamp(view.min_zoom, view.max_zoom);
        view
    }

    /// Map units per pixel at the current zoom.
    pub fn resolution(&self) -> f64 {
        MAX_RESOLUTION / 2f64.powf(self.zoom)
    }

    /// Transform from map coordinates to screen pixels.
    pub fn transform(&self) -> Affine {
        let res = self.resolution();
        Affine::translate(Vec2::new(self.viewport.width / 2.0, self.viewport.height / 2.0))
            * Affine::scale_non_uniform(1.0 / res, -1.0 / res)
            * Affine::translate(-self.center.to_vec2())
    }

    /// Transform from screen pixels to map coordinates.
    pub fn inverse_transform(&self) -> Affine {
        self.transform().inverse()
    }

    pub fn screen_to_map(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn map_to_screen(&self, map_point: Point) -> Point {
        self.transform() * map_point
    }

    /// Convert a pixel distance to map units.
    pub fn pixels_to_map(&self, pixels: f64) -> f64 {
        pixels * self.resolution()
    }

    /// Map extent currently visible.
    pub fn extent(&self) -> Rect {
        let a = self.screen_to_map(Point::ZERO);
        let b = self.screen_to_map(Point::new(self.viewport.width, self.viewport.height));
        Rect::from_points(a, b)
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Size::new(width, height);
    }

    /// Pan by a delta in screen pixels (content follows the pointer).
    pub fn pan(&mut self, delta: Vec2) {
        let res = self.resolution();
        self.center -= Vec2::new(delta.x * res, -delta.y * res);
    }

    /// Zoom by `delta` levels, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, delta: f64) {
        let new_zoom = (self.zoom + delta).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let anchor = self.screen_to_map(screen_point);
        self.zoom = new_zoom;
        let drift = anchor - self.screen_to_map(screen_point);
        self.center += drift;
    }

    /// Centre and zoom the view so that `bounds` fits with `padding` pixels to spare.
    pub fn fit_to_bounds(&mut self, bounds: Rect, padding: f64) {
        self.center = bounds.center();
        if bounds.width() <= 0.0 && bounds.height() <= 0.0 {
            return;
        }
        let avail_w = (self.viewport.width - padding * 2.0).max(1.0);
        let avail_h = (self.viewport.height - padding * 2.0).max(1.0);
        let res = (bounds.width() / avail_w).max(bounds.height() / avail_h);
        self.zoom = (MAX_RESOLUTION / res).log2().clamp(self.min_zoom, self.max_zoom);
    }
}
