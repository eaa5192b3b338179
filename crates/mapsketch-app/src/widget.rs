//! The embeddable map-editing widget.

use crate::config::{ConfigError, WidgetConfig};
use crate::layers::{Layer, default_layers, visible_tiles};
use crate::surface::{MapCanvas, OverlayContainer};
use kurbo::{Point, Size, Vec2};
use mapsketch_core::feature::{Feature, FeatureId};
use mapsketch_core::geojson::{self, GeoJsonError};
use mapsketch_core::input::{ClickKind, ClickTracker, MapInput};
use mapsketch_core::interaction::{Change, InteractionCoordinator, Mode};
use mapsketch_core::store::StoreError;
use mapsketch_core::tools::{ToolError, ToolKind};
use mapsketch_core::view::MapView;
use mapsketch_render::{CaptureError, RenderContext, RenderedImage, RendererError, ViewElement, capture_snapshot};
use peniko::Color;
use thiserror::Error;

/// Widget errors.
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("No render target attached")]
    MissingTarget,
    #[error("Map has not been initialized")]
    NotInitialized,
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error(transparent)]
    GeoJson(#[from] GeoJsonError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for widget operations.
pub type WidgetResult<T> = Result<T, WidgetError>;

/// Everything built by [`MapWidget::initialize_map`].
struct MapState {
    coordinator: InteractionCoordinator,
    view: MapView,
    layers: Vec<Layer>,
    clicks: ClickTracker,
    background: Color,
}

/// A map with draw, select and delete tools over a tile base map.
///
/// Lifecycle: create, attach a render target, then call
/// [`after_view_init`](Self::after_view_init) once the host has laid the
/// target out.
pub struct MapWidget {
    config: WidgetConfig,
    canvas: Option<MapCanvas>,
    overlay: OverlayContainer,
    state: Option<MapState>,
    view_initialized: bool,
}

impl MapWidget {
    /// Create a widget without a render target.
    pub fn new(config: WidgetConfig) -> Self {
        Self {
            config,
            canvas: None,
            overlay: OverlayContainer::default(),
            state: None,
            view_initialized: false,
        }
    }

    /// Create a widget with a canvas sized from the configuration.
    pub fn with_canvas(config: WidgetConfig) -> WidgetResult<Self> {
        let canvas = MapCanvas::new(config.width, config.height)?;
        let mut widget = Self::new(config);
        widget.attach_target(canvas);
        Ok(widget)
    }

    pub fn attach_target(&mut self, canvas: MapCanvas) {
        if let Some(state) = &mut self.state {
            state
                .view
                .set_viewport(canvas.width() as f64, canvas.height() as f64);
        }
        self.canvas = Some(canvas);
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Host hook run after the target has been laid out. Initializes the map
    /// on the first call only.
    pub fn after_view_init(&mut self) -> WidgetResult<()> {
        if self.view_initialized {
            return Ok(());
        }
        self.initialize_map()?;
        self.view_initialized = true;
        Ok(())
    }

    /// Build layers, view, draw tools and selection. Any previous map state
    /// (including drawn features) is discarded.
    pub fn initialize_map(&mut self) -> WidgetResult<()> {
        let canvas = self.canvas.as_ref().ok_or(WidgetError::MissingTarget)?;
        let background = self.config.background()?;

        let view = MapView::new(
            self.config.center_point(),
            self.config.zoom,
            Size::new(canvas.width() as f64, canvas.height() as f64),
        );
        let mut coordinator = InteractionCoordinator::with_tools(self.config.draw_features.iter().copied());
        coordinator.set_hit_tolerance(view.pixels_to_map(self.config.hit_tolerance));

        self.overlay.attribution = self.config.base_map.attribution().map(str::to_string);
        log::info!(
            "Map initialized: {}x{} px, {} draw tool(s)",
            canvas.width(),
            canvas.height(),
            coordinator.tools().len()
        );
        self.state = Some(MapState {
            coordinator,
            view,
            layers: default_layers(self.config.base_map.clone()),
            clicks: ClickTracker::new(),
            background,
        });
        Ok(())
    }

    fn state(&self) -> WidgetResult<&MapState> {
        self.state.as_ref().ok_or(WidgetError::NotInitialized)
    }

    fn state_mut(&mut self) -> WidgetResult<&mut MapState> {
        self.state.as_mut().ok_or(WidgetError::NotInitialized)
    }

    fn dispatch(&mut self, input: MapInput) -> WidgetResult<Vec<Change>> {
        Ok(self.state_mut()?.coordinator.dispatch(input)?)
    }

    pub fn coordinator(&self) -> WidgetResult<&InteractionCoordinator> {
        Ok(&self.state()?.coordinator)
    }

    pub fn view(&self) -> WidgetResult<&MapView> {
        Ok(&self.state()?.view)
    }

    pub fn layers(&self) -> WidgetResult<&[Layer]> {
        Ok(&self.state()?.layers)
    }

    /// URLs of the base-map tiles covering the current view, for the host to fetch.
    pub fn tile_urls(&self) -> WidgetResult<Vec<String>> {
        let state = self.state()?;
        let tiles = visible_tiles(&state.view);
        Ok(state
            .layers
            .iter()
            .filter_map(|layer| match layer {
                Layer::Tile(source) => Some(source),
                Layer::Vector => None,
            })
            .flat_map(|source| tiles.iter().map(|tile| source.tile_url(*tile)))
            .collect())
    }

    pub fn mode(&self) -> WidgetResult<Mode> {
        Ok(self.state()?.coordinator.mode())
    }

    /// Toolbar click on a draw tool; `None` returns to the pointer.
    pub fn draw_feature_clicked(&mut self, kind: Option<ToolKind>) -> WidgetResult<()> {
        self.dispatch(MapInput::ToolClicked(kind))?;
        Ok(())
    }

    pub fn disable_all_draw_features(&mut self) -> WidgetResult<()> {
        self.state_mut()?.coordinator.disable_all_draw_features();
        Ok(())
    }

    /// Arm delete mode: the next clicked feature is removed.
    pub fn delete_feature_activated(&mut self) -> WidgetResult<()> {
        self.dispatch(MapInput::DeleteClicked)?;
        Ok(())
    }

    pub fn select_activated(&mut self) -> WidgetResult<()> {
        self.dispatch(MapInput::SelectClicked)?;
        Ok(())
    }

    pub fn cancel(&mut self) -> WidgetResult<()> {
        self.dispatch(MapInput::Cancel)?;
        Ok(())
    }

    /// Complete the shape being drawn.
    pub fn finish_drawing(&mut self) -> WidgetResult<Vec<Change>> {
        self.dispatch(MapInput::Finish)
    }

    /// Add a feature built by the host.
    pub fn add_feature(&mut self, feature: Feature) -> WidgetResult<FeatureId> {
        let id = self.state_mut()?.coordinator.store_mut().add(feature)?;
        Ok(id)
    }

    /// Drawn features as a GeoJSON FeatureCollection, or `None` when nothing
    /// has been drawn.
    pub fn write_features_to_geojson(&self) -> WidgetResult<Option<String>> {
        Ok(geojson::write_features(self.state()?.coordinator.store())?)
    }

    /// Add every feature of a GeoJSON FeatureCollection. Returns the count added.
    pub fn load_geojson(&mut self, text: &str) -> WidgetResult<usize> {
        let features = geojson::read_features(text)?;
        let store = self.state_mut()?.coordinator.store_mut();
        let count = features.len();
        for feature in features {
            store.add(feature)?;
        }
        log::info!("Loaded {} feature(s) from GeoJSON", count);
        Ok(count)
    }

    /// Primary-button release at a screen position.
    pub fn pointer_click(&mut self, screen: Point) -> WidgetResult<Vec<Change>> {
        let state = self.state_mut()?;
        let map = state.view.screen_to_map(screen);
        let input = match state.clicks.register(screen) {
            ClickKind::Single => MapInput::Click(map),
            ClickKind::Double => MapInput::DoubleClick(map),
        };
        self.dispatch(input)
    }

    /// Native double-click event at a screen position.
    pub fn pointer_double_click(&mut self, screen: Point) -> WidgetResult<Vec<Change>> {
        let state = self.state_mut()?;
        state.clicks.reset();
        let map = state.view.screen_to_map(screen);
        self.dispatch(MapInput::DoubleClick(map))
    }

    pub fn pointer_move(&mut self, screen: Point) -> WidgetResult<()> {
        let map = self.state()?.view.screen_to_map(screen);
        self.dispatch(MapInput::PointerMove(map))?;
        Ok(())
    }

    /// Pan by a screen-space drag delta.
    pub fn pan(&mut self, delta: Vec2) -> WidgetResult<()> {
        self.state_mut()?.view.pan(delta);
        Ok(())
    }

    /// Zoom by `delta` levels around a screen point.
    pub fn zoom_at(&mut self, screen: Point, delta: f64) -> WidgetResult<()> {
        let hit_px = self.config.hit_tolerance;
        let state = self.state_mut()?;
        state.view.zoom_at(screen, delta);
        let tolerance = state.view.pixels_to_map(hit_px);
        state.coordinator.set_hit_tolerance(tolerance);
        Ok(())
    }

    /// Fit the view to the drawn features. No-op when nothing is drawn.
    pub fn zoom_to_features(&mut self) -> WidgetResult<()> {
        let hit_px = self.config.hit_tolerance;
        let state = self.state_mut()?;
        if let Some(bounds) = state.coordinator.store().bounds() {
            state.view.fit_to_bounds(bounds, 20.0);
            let tolerance = state.view.pixels_to_map(hit_px);
            state.coordinator.set_hit_tolerance(tolerance);
        }
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> WidgetResult<()> {
        let canvas = self.canvas.as_mut().ok_or(WidgetError::MissingTarget)?;
        canvas.resize(width, height)?;
        if let Some(state) = &mut self.state {
            state.view.set_viewport(width as f64, height as f64);
        }
        Ok(())
    }

    /// Paint the current state into the canvas.
    pub fn render(&mut self) -> WidgetResult<()> {
        let state = self.state.as_ref().ok_or(WidgetError::NotInitialized)?;
        let canvas = self.canvas.as_mut().ok_or(WidgetError::MissingTarget)?;
        let coordinator = &state.coordinator;
        let preview = coordinator.tools().active().and_then(|t| t.preview());
        let ctx = RenderContext::new(coordinator.store(), &state.view)
            .with_selection(coordinator.selection().selected())
            .with_preview(preview)
            .with_background(state.background);
        canvas.paint(&ctx);
        Ok(())
    }

    /// Last painted frame, after painting the current state.
    pub fn frame(&mut self) -> WidgetResult<RenderedImage> {
        self.render()?;
        let canvas = self.canvas.as_ref().ok_or(WidgetError::MissingTarget)?;
        Ok(canvas.image())
    }

    /// PNG snapshot of the map as a `data:image/png;base64,` URI.
    pub fn capture_screenshot(&mut self) -> WidgetResult<String> {
        if self.state.is_none() {
            return Err(WidgetError::NotInitialized);
        }
        if self.canvas.is_some() {
            self.render()?;
        }
        let mut elements: Vec<&dyn ViewElement> = vec![&self.overlay];
        if let Some(canvas) = &self.canvas {
            elements.push(canvas);
        }
        Ok(capture_snapshot(elements)?)
    }

    /// Write a PNG snapshot to a file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_snapshot(&mut self, path: impl AsRef<std::path::Path>) -> WidgetResult<()> {
        let image = self.frame()?;
        let png_data = mapsketch_render::encode_png(&image)?;
        std::fs::write(path.as_ref(), &png_data)?;
        log::info!("Saved snapshot to {} ({} bytes)", path.as_ref().display(), png_data.len());
        Ok(())
    }
}
