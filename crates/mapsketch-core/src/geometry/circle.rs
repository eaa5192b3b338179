//! Circle geometry.

use super::{GeometryKind, GeometryTrait, Polygon};
use kurbo::{BezPath, Point, Rect, Shape as _, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Number of segments used when a circle is flattened into a polygon.
pub const CIRCLE_POLYGON_SIDES: usize = 32;

/// A circle with a centre and a radius in map units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            center,
            radius: radius.abs(),
        }
    }

    /// Approximate the circle with a regular polygon of `sides` sides.
    ///
    /// The ring starts at angle zero and is closed.
    pub fn to_polygon(&self, sides: usize) -> Polygon {
        let sides = sides.max(3);
        let ring: Vec<Point> = (0..sides)
            .map(|i| {
                let angle = TAU * i as f64 / sides as f64;
                Point::new(
                    self.center.x + self.radius * angle.cos(),
                    self.center.y + self.radius * angle.sin(),
                )
            })
            .collect();
        Polygon::new(ring)
    }
}

impl GeometryTrait for Circle {
    fn kind(&self) -> GeometryKind {
        GeometryKind::Circle
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.center.x + self.radius,
            self.center.y + self.radius,
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.center.distance(point) <= self.radius + tolerance
    }

    fn to_path(&self) -> BezPath {
        kurbo::Circle::new(self.center, self.radius).to_path(0.1)
    }

    fn translate(&mut self, delta: Vec2) {
        self.center += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_to_polygon() {
        let circle = Circle::new(Point::new(100.0, 50.0), 10.0);
        let poly = circle.to_polygon(CIRCLE_POLYGON_SIDES);
        let ring = poly.exterior();
        assert_eq!(ring.len(), CIRCLE_POLYGON_SIDES + 1);
        assert_eq!(ring.first(), ring.last());
        assert!((ring[0].x - 110.0).abs() < 1e-9);
        assert!((ring[0].y - 50.0).abs() < 1e-9);
        for p in ring {
            assert!((p.distance(circle.center) - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_circle_hit_test() {
        let circle = Circle::new(Point::ZERO, 5.0);
        assert!(circle.hit_test(Point::new(0.0, 0.0), 0.0));
        assert!(circle.hit_test(Point::new(6.0, 0.0), 1.0));
        assert!(!circle.hit_test(Point::new(7.0, 0.0), 1.0));
    }

    #[test]
    fn test_negative_radius_is_normalized() {
        assert_eq!(Circle::new(Point::ZERO, -3.0).radius, 3.0);
    }
}
