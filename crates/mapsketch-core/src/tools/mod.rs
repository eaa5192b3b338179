//! Draw tools and the tool registry.

mod registry;

pub use registry::ToolRegistry;

use crate::geometry::{Geometry, GeometryKind};
use kurbo::Point;
use thiserror::Error;

/// Tool identifier: one draw tool per geometry kind.
pub type ToolKind = GeometryKind;

/// Tool errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Tool not registered: {0}")]
    NotFound(ToolKind),
}

/// Result type for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Signals a draw tool emits while a gesture progresses.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawSignal {
    /// The first vertex of a new shape was placed.
    Start,
    /// The shape is complete.
    End(Geometry),
}

/// State of a draw gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DrawState {
    /// Waiting for the first click.
    #[default]
    Idle,
    /// A shape is being drawn.
    Drawing {
        /// Vertices placed so far.
        vertices: Vec<Point>,
        /// Last pointer position, used for the preview.
        cursor: Point,
    },
}

/// A draw tool bound to one geometry kind.
///
/// The tool only turns clicks into geometry; the coordinator decides which
/// tool is active and where finished geometry goes.
#[derive(Debug, Clone)]
pub struct DrawTool {
    kind: ToolKind,
    active: bool,
    state: DrawState,
    /// Distance (map units) within which a click on the first vertex closes a polygon.
    pub snap_tolerance: f64,
}

impl DrawTool {
    /// Create an inactive tool.
    pub fn new(kind: ToolKind) -> Self {
        Self {
            kind,
            active: false,
            state: DrawState::Idle,
            snap_tolerance: 0.0,
        }
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Set the active flag. Deactivating discards any partial geometry.
    pub fn set_active(&mut self, active: bool) {
        if !active {
            self.abort();
        }
        self.active = active;
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    /// Whether a gesture is in progress.
    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawState::Drawing { .. })
    }

    /// Discard the current gesture.
    pub fn abort(&mut self) {
        if self.is_drawing() {
            log::debug!("Aborting {} gesture", self.kind);
        }
        self.state = DrawState::Idle;
    }

    /// Handle a primary click at a map point.
    pub fn click(&mut self, point: Point) -> Vec<DrawSignal> {
        if !self.active {
            return Vec::new();
        }

        let mut signals = Vec::new();
        if !self.is_drawing() {
            signals.push(DrawSignal::Start);
            self.state = DrawState::Drawing {
                vertices: vec![point],
                cursor: point,
            };
            if self.kind == ToolKind::Point {
                signals.extend(self.finish());
            }
            return signals;
        }

        let DrawState::Drawing { vertices, cursor } = &mut self.state else {
            return signals;
        };
        *cursor = point;

        match self.kind {
            ToolKind::Point => {}
            ToolKind::LineString => vertices.push(point),
            ToolKind::Polygon => {
                let closes = vertices.len() >= 3
                    && vertices
                        .first()
                        .is_some_and(|first| first.distance(point) <= self.snap_tolerance);
                if closes {
                    signals.extend(self.finish());
                } else {
                    vertices.push(point);
                }
            }
            ToolKind::Circle => {
                vertices.push(point);
                signals.extend(self.finish());
            }
        }
        signals
    }

    /// Handle a double click: adds the vertex, then completes the shape.
    ///
    /// The second click of a pair usually lands on the vertex the first one
    /// placed; that vertex is not added twice.
    pub fn double_click(&mut self, point: Point) -> Vec<DrawSignal> {
        let repeats_last = match &self.state {
            DrawState::Drawing { vertices, .. } => vertices
                .last()
                .is_some_and(|last| last.distance(point) <= self.snap_tolerance),
            DrawState::Idle => false,
        };
        let mut signals = if repeats_last { Vec::new() } else { self.click(point) };
        if self.is_drawing() {
            signals.extend(self.finish());
        }
        signals
    }

    /// Update the pointer position for the preview.
    pub fn pointer_move(&mut self, point: Point) {
        if let DrawState::Drawing { cursor, .. } = &mut self.state {
            *cursor = point;
        }
    }

    /// Complete the current shape if it has enough vertices.
    ///
    /// A shape without enough vertices stays in progress.
    pub fn finish(&mut self) -> Option<DrawSignal> {
        let DrawState::Drawing { vertices, .. } = &self.state else {
            return None;
        };
        let geometry = build_geometry(self.kind, vertices)?;
        self.state = DrawState::Idle;
        log::debug!("Finished {} gesture", self.kind);
        Some(DrawSignal::End(geometry))
    }

    /// Geometry for the in-progress gesture, including the cursor position.
    pub fn preview(&self) -> Option<Geometry> {
        let DrawState::Drawing { vertices, cursor } = &self.state else {
            return None;
        };
        let mut points = vertices.clone();
        if self.kind != ToolKind::Point {
            points.push(*cursor);
        }
        match self.kind {
            // Partial polygons preview as a line until they enclose area.
            ToolKind::Polygon if points.len() < 3 => Some(Geometry::line_string(points)),
            _ => build_geometry(self.kind, &points),
        }
    }
}

/// Minimum vertex count for each kind, and the geometry built from them.
fn build_geometry(kind: ToolKind, vertices: &[Point]) -> Option<Geometry> {
    match (kind, vertices) {
        (ToolKind::Point, [p, ..]) => Some(Geometry::point(*p)),
        (ToolKind::LineString, pts) if pts.len() >= 2 => Some(Geometry::line_string(pts.to_vec())),
        (ToolKind::Polygon, pts) if pts.len() >= 3 => Some(Geometry::polygon(pts.to_vec())),
        (ToolKind::Circle, [center, .., edge]) => Some(Geometry::circle(*center, center.distance(*edge))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_tool(kind: ToolKind) -> DrawTool {
        let mut tool = DrawTool::new(kind);
        tool.set_active(true);
        tool
    }

    #[test]
    fn test_inactive_tool_ignores_clicks() {
        let mut tool = DrawTool::new(ToolKind::Point);
        assert!(tool.click(Point::new(1.0, 1.0)).is_empty());
        assert!(!tool.is_drawing());
    }

    #[test]
    fn test_point_single_click() {
        let mut tool = active_tool(ToolKind::Point);
        let signals = tool.click(Point::new(10.0, 10.0));
        assert_eq!(
            signals,
            vec![DrawSignal::Start, DrawSignal::End(Geometry::point(Point::new(10.0, 10.0)))]
        );
        assert!(!tool.is_drawing());
        assert!(tool.is_active());
    }

    #[test]
    fn test_line_string_needs_finish() {
        let mut tool = active_tool(ToolKind::LineString);
        assert_eq!(tool.click(Point::new(0.0, 0.0)), vec![DrawSignal::Start]);
        assert!(tool.finish().is_none());
        assert!(tool.is_drawing());

        assert!(tool.click(Point::new(5.0, 0.0)).is_empty());
        let signals = tool.double_click(Point::new(5.0, 5.0));
        let expected = Geometry::line_string(vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(5.0, 5.0),
        ]);
        assert_eq!(signals, vec![DrawSignal::End(expected)]);
    }

    #[test]
    fn test_double_click_on_last_vertex() {
        let mut tool = active_tool(ToolKind::LineString);
        tool.snap_tolerance = 1.0;
        tool.click(Point::new(0.0, 0.0));
        tool.click(Point::new(5.0, 0.0));
        let signals = tool.double_click(Point::new(5.2, 0.0));
        let expected = Geometry::line_string(vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0)]);
        assert_eq!(signals, vec![DrawSignal::End(expected)]);
    }

    #[test]
    fn test_polygon_closes_on_first_vertex() {
        let mut tool = active_tool(ToolKind::Polygon);
        tool.snap_tolerance = 1.0;
        tool.click(Point::new(0.0, 0.0));
        tool.click(Point::new(10.0, 0.0));
        tool.click(Point::new(10.0, 10.0));
        let signals = tool.click(Point::new(0.5, 0.5));
        match signals.as_slice() {
            [DrawSignal::End(Geometry::Polygon(poly))] => assert_eq!(poly.exterior().len(), 4),
            other => panic!("unexpected signals: {other:?}"),
        }
    }

    #[test]
    fn test_circle_two_clicks() {
        let mut tool = active_tool(ToolKind::Circle);
        assert_eq!(tool.click(Point::new(0.0, 0.0)), vec![DrawSignal::Start]);
        let signals = tool.click(Point::new(3.0, 4.0));
        assert_eq!(signals, vec![DrawSignal::End(Geometry::circle(Point::ZERO, 5.0))]);
    }

    #[test]
    fn test_deactivate_discards_partial_geometry() {
        let mut tool = active_tool(ToolKind::Polygon);
        tool.click(Point::new(0.0, 0.0));
        tool.click(Point::new(1.0, 0.0));
        tool.set_active(false);
        assert!(!tool.is_drawing());
        assert!(tool.preview().is_none());
    }

    #[test]
    fn test_preview_follows_cursor() {
        let mut tool = active_tool(ToolKind::Circle);
        tool.click(Point::ZERO);
        tool.pointer_move(Point::new(0.0, 2.0));
        assert_eq!(tool.preview(), Some(Geometry::circle(Point::ZERO, 2.0)));

        let mut poly = active_tool(ToolKind::Polygon);
        poly.click(Point::ZERO);
        poly.pointer_move(Point::new(1.0, 0.0));
        assert_eq!(poly.preview().map(|g| g.kind()), Some(GeometryKind::LineString));
    }
}
