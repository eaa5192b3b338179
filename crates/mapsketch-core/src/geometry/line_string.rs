//! LineString geometry.

use super::{GeometryKind, GeometryTrait, point_to_polyline_dist, points_bounds};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// An open polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    pub points: Vec<Point>,
}

impl LineString {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }
}

impl GeometryTrait for LineString {
    fn kind(&self) -> GeometryKind {
        GeometryKind::LineString
    }

    fn bounds(&self) -> Rect {
        points_bounds(&self.points)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point_to_polyline_dist(point, &self.points) <= tolerance
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut iter = self.points.iter();
        if let Some(first) = iter.next() {
            path.move_to(*first);
            for p in iter {
                path.line_to(*p);
            }
        }
        path
    }

    fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_hit_test() {
        let line = LineString::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ]);
        assert!(line.hit_test(Point::new(5.0, 1.0), 1.5));
        assert!(line.hit_test(Point::new(11.0, 5.0), 1.5));
        assert!(!line.hit_test(Point::new(5.0, 5.0), 1.5));
    }

    #[test]
    fn test_line_bounds() {
        let line = LineString::new(vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0)]);
        let b = line.bounds();
        assert_eq!((b.x0, b.y0, b.x1, b.y1), (0.0, 0.0, 3.0, 4.0));
    }
}
