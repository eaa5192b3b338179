//! Geometry definitions for drawn features.

mod circle;
mod line_string;
mod point;
mod polygon;

pub use circle::{Circle, CIRCLE_POLYGON_SIDES};
pub use line_string::LineString;
pub use point::PointGeometry;
pub use polygon::Polygon;

use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of geometry kinds a user can draw.
///
/// The string forms match the geometry type names of the interchange
/// format (`"Point"`, `"LineString"`, `"Polygon"`) plus `"Circle"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    Circle,
}

impl GeometryKind {
    /// Number of geometry kinds.
    pub const COUNT: usize = 4;

    /// Every kind, in index order.
    pub const ALL: [GeometryKind; Self::COUNT] = [
        GeometryKind::Point,
        GeometryKind::LineString,
        GeometryKind::Polygon,
        GeometryKind::Circle,
    ];

    /// Kinds offered by a widget when the host does not choose.
    pub const DEFAULTS: [GeometryKind; Self::COUNT] = [
        GeometryKind::Polygon,
        GeometryKind::Point,
        GeometryKind::Circle,
        GeometryKind::LineString,
    ];

    /// Dense index used for fixed-size lookup tables.
    pub const fn index(self) -> usize {
        match self {
            GeometryKind::Point => 0,
            GeometryKind::LineString => 1,
            GeometryKind::Polygon => 2,
            GeometryKind::Circle => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::Circle => "Circle",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a geometry kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown geometry kind: {0}")]
pub struct ParseKindError(pub String);

impl FromStr for GeometryKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeometryKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseKindError(s.to_string()))
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    point.distance(proj)
}

/// Minimum distance from a point to a polyline.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => point.distance(*only),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Bounding rectangle of a set of points (zero rect when empty).
pub(crate) fn points_bounds(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p))
}

/// Common behaviour of all geometries.
pub trait GeometryTrait {
    /// The kind of this geometry.
    fn kind(&self) -> GeometryKind;

    /// Bounding box in map coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a map point hits this geometry within `tolerance` map units.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Path representation for rendering.
    fn to_path(&self) -> BezPath;

    /// Move the geometry by a map-space offset.
    fn translate(&mut self, delta: Vec2);
}

/// Enum wrapper for all geometry types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(PointGeometry),
    LineString(LineString),
    Polygon(Polygon),
    Circle(Circle),
}

impl Geometry {
    pub fn point(position: Point) -> Self {
        Geometry::Point(PointGeometry::new(position))
    }

    pub fn line_string(points: Vec<Point>) -> Self {
        Geometry::LineString(LineString::new(points))
    }

    /// A single-ring polygon. The ring is closed if it is not already.
    pub fn polygon(exterior: Vec<Point>) -> Self {
        Geometry::Polygon(Polygon::new(exterior))
    }

    pub fn circle(center: Point, radius: f64) -> Self {
        Geometry::Circle(Circle::new(center, radius))
    }

    fn inner(&self) -> &dyn GeometryTrait {
        match self {
            Geometry::Point(g) => g,
            Geometry::LineString(g) => g,
            Geometry::Polygon(g) => g,
            Geometry::Circle(g) => g,
        }
    }

    pub fn kind(&self) -> GeometryKind {
        self.inner().kind()
    }

    pub fn bounds(&self) -> Rect {
        self.inner().bounds()
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.inner().hit_test(point, tolerance)
    }

    pub fn to_path(&self) -> BezPath {
        self.inner().to_path()
    }

    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Geometry::Point(g) => g.translate(delta),
            Geometry::LineString(g) => g.translate(delta),
            Geometry::Polygon(g) => g.translate(delta),
            Geometry::Circle(g) => g.translate(delta),
        }
    }

    /// Whether this geometry encloses an area (and should be filled).
    pub fn is_areal(&self) -> bool {
        matches!(self, Geometry::Polygon(_) | Geometry::Circle(_))
    }
}
