//! Renderer trait abstraction.

use mapsketch_core::feature::FeatureId;
use mapsketch_core::geometry::Geometry;
use mapsketch_core::store::FeatureStore;
use mapsketch_core::view::MapView;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// How drawn features are painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureStyle {
    /// Outline of every feature.
    pub stroke_color: Color,
    /// Interior of polygons and circles.
    pub fill_color: Color,
    /// Stroke width in pixels.
    pub stroke_width: f32,
    /// Radius of point markers in pixels.
    pub point_radius: f32,
    /// Outline of selected features.
    pub selection_color: Color,
}

impl Default for FeatureStyle {
    fn default() -> Self {
        Self {
            stroke_color: Color::from_rgba8(51, 153, 204, 255),
            fill_color: Color::from_rgba8(255, 255, 255, 102),
            stroke_width: 1.25,
            point_radius: 5.0,
            selection_color: Color::from_rgba8(0, 153, 255, 255),
        }
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// Features to draw, bottom to top.
    pub store: &'a FeatureStore,
    /// Map view providing the map-to-screen transform.
    pub view: &'a MapView,
    /// Features drawn with the selection colour.
    pub selected: &'a [FeatureId],
    /// Shape being drawn, if a gesture is in progress.
    pub preview: Option<Geometry>,
    pub style: FeatureStyle,
    /// Colour of the base map under the features.
    pub background_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(store: &'a FeatureStore, view: &'a MapView) -> Self {
        Self {
            store,
            view,
            selected: &[],
            preview: None,
            style: FeatureStyle::default(),
            background_color: Color::from_rgba8(242, 239, 233, 255),
        }
    }

    /// Set the selected features.
    pub fn with_selection(mut self, selected: &'a [FeatureId]) -> Self {
        self.selected = selected;
        self
    }

    /// Set the in-progress geometry.
    pub fn with_preview(mut self, preview: Option<Geometry>) -> Self {
        self.preview = preview;
        self
    }

    /// Set the base map colour.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn is_selected(&self, id: FeatureId) -> bool {
        self.selected.contains(&id)
    }
}

/// Trait for rendering backends.
///
/// Implementations may paint into a GPU scene, a browser canvas or an
/// in-memory raster.
pub trait Renderer: Send + Sync {
    /// Paint one full frame.
    fn render(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}
