//! Point geometry.

use super::{GeometryKind, GeometryTrait};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Radius (map units) of the marker path emitted for a point.
const MARKER_PATH_RADIUS: f64 = 1.0;

/// A single position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    pub position: Point,
}

impl PointGeometry {
    pub fn new(position: Point) -> Self {
        Self { position }
    }
}

impl GeometryTrait for PointGeometry {
    fn kind(&self) -> GeometryKind {
        GeometryKind::Point
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.position, self.position)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.position.distance(point) <= tolerance
    }

    fn to_path(&self) -> BezPath {
        use kurbo::Shape as _;
        kurbo::Circle::new(self.position, MARKER_PATH_RADIUS).to_path(0.1)
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}
