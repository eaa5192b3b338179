//! Input events consumed by the interaction coordinator.

use crate::tools::ToolKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

/// Double-click detection constants.
const DOUBLE_CLICK_TIME: Duration = Duration::from_millis(500);
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// A user input, already converted to map coordinates where it carries a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapInput {
    /// Primary single click.
    Click(Point),
    /// Second click of a double click.
    DoubleClick(Point),
    /// Pointer moved (no button).
    PointerMove(Point),
    /// A draw tool button was clicked; `None` returns to the pointer.
    ToolClicked(Option<ToolKind>),
    /// The delete button was clicked.
    DeleteClicked,
    /// The select button was clicked.
    SelectClicked,
    /// Complete the shape being drawn (e.g. Enter).
    Finish,
    /// Abandon the current mode (e.g. Escape).
    Cancel,
}

/// Kind of click recognised by [`ClickTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    Single,
    Double,
}

/// Classifies primary-button releases into single and double clicks.
///
/// Positions are in screen pixels.
#[derive(Debug, Clone, Default)]
pub struct ClickTracker {
    last_click: Option<(Instant, Point)>,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a click happening now.
    pub fn register(&mut self, position: Point) -> ClickKind {
        self.register_at(position, Instant::now())
    }

    /// Register a click at an explicit time.
    pub fn register_at(&mut self, position: Point, now: Instant) -> ClickKind {
        if let Some((last_time, last_pos)) = self.last_click {
            let elapsed = now.saturating_duration_since(last_time);
            if elapsed < DOUBLE_CLICK_TIME && last_pos.distance(position) < DOUBLE_CLICK_DISTANCE {
                // Reset so a third click starts a new pair
                self.last_click = None;
                return ClickKind::Double;
            }
        }
        self.last_click = Some((now, position));
        ClickKind::Single
    }

    /// Forget the previous click.
    pub fn reset(&mut self) {
        self.last_click = None;
    }
}
