//! Polygon geometry.

use super::{GeometryKind, GeometryTrait, point_to_polyline_dist, points_bounds};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A polygon made of closed linear rings.
///
/// The first ring is the exterior, any further rings are holes. Every ring
/// repeats its first coordinate as its last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub rings: Vec<Vec<Point>>,
}

impl Polygon {
    /// Create a polygon from an exterior ring, closing it if needed.
    pub fn new(exterior: Vec<Point>) -> Self {
        Self::from_rings(vec![exterior])
    }

    /// Create a polygon from rings, closing each one if needed.
    pub fn from_rings(rings: Vec<Vec<Point>>) -> Self {
        let rings = rings.into_iter().map(close_ring).collect();
        Self { rings }
    }

    pub fn exterior(&self) -> &[Point] {
        self.rings.first().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Crossing-number test, independent of the ring's winding direction.
fn ring_contains(ring: &[Point], point: Point) -> bool {
    ring.windows(2)
        .filter(|w| {
            let (a, b) = (w[0], w[1]);
            (a.y > point.y) != (b.y > point.y)
                && point.x < a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y)
        })
        .count()
        % 2
        == 1
}

fn close_ring(mut ring: Vec<Point>) -> Vec<Point> {
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
        if ring.len() > 1 && first != last {
            ring.push(first);
        }
    }
    ring
}

impl GeometryTrait for Polygon {
    fn kind(&self) -> GeometryKind {
        GeometryKind::Polygon
    }

    fn bounds(&self) -> Rect {
        points_bounds(self.exterior())
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        // Even-odd, matching the fill rule: a point inside a hole lies in two rings.
        let depth = self.rings.iter().filter(|ring| ring_contains(ring, point)).count();
        if depth % 2 == 1 {
            return true;
        }
        self.rings
            .iter()
            .any(|ring| point_to_polyline_dist(point, ring) <= tolerance)
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for ring in &self.rings {
            let mut iter = ring.iter();
            if let Some(first) = iter.next() {
                path.move_to(*first);
                for p in iter {
                    path.line_to(*p);
                }
                path.close_path();
            }
        }
        path
    }

    fn translate(&mut self, delta: Vec2) {
        for ring in &mut self.rings {
            for p in ring.iter_mut() {
                *p += delta;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ])
    }

    #[test]
    fn test_ring_is_closed() {
        let poly = square();
        assert_eq!(poly.exterior().len(), 5);
        assert_eq!(poly.exterior().first(), poly.exterior().last());
    }

    #[test]
    fn test_already_closed_ring_untouched() {
        let ring = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(0.0, 0.0),
        ];
        let poly = Polygon::new(ring.clone());
        assert_eq!(poly.exterior(), ring.as_slice());
    }

    #[test]
    fn test_polygon_hit_test() {
        let poly = square();
        assert!(poly.hit_test(Point::new(5.0, 5.0), 0.0));
        assert!(poly.hit_test(Point::new(10.5, 5.0), 1.0));
        assert!(!poly.hit_test(Point::new(15.0, 5.0), 1.0));
    }

    #[test]
    fn test_polygon_hole_is_not_a_hit() {
        let poly = Polygon::from_rings(vec![
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ],
            vec![
                Point::new(3.0, 3.0),
                Point::new(3.0, 7.0),
                Point::new(7.0, 7.0),
                Point::new(7.0, 3.0),
            ],
        ]);
        assert!(!poly.hit_test(Point::new(5.0, 5.0), 0.5));
        assert!(poly.hit_test(Point::new(1.0, 1.0), 0.5));
    }

    #[test]
    fn test_hole_wound_like_exterior_is_not_a_hit() {
        // Both rings counter-clockwise
        let poly = Polygon::from_rings(vec![
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ],
            vec![
                Point::new(3.0, 3.0),
                Point::new(7.0, 3.0),
                Point::new(7.0, 7.0),
                Point::new(3.0, 7.0),
            ],
        ]);
        assert!(!poly.hit_test(Point::new(5.0, 5.0), 0.5));
        assert!(poly.hit_test(Point::new(1.0, 5.0), 0.5));
        assert!(poly.hit_test(Point::new(3.2, 5.0), 0.5));
        assert!(!poly.hit_test(Point::new(12.0, 5.0), 0.5));
    }
}
