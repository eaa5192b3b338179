//! WebAssembly entry point and browser bindings.

use crate::config::WidgetConfig;
use crate::surface::MapCanvas;
use crate::widget::{MapWidget, WidgetError};
use kurbo::Point;
use mapsketch_core::tools::ToolKind;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

fn js_error(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

impl From<WidgetError> for JsValue {
    fn from(err: WidgetError) -> Self {
        js_error(err)
    }
}

/// Map widget bound to a `<canvas>` element of the host page.
#[wasm_bindgen]
pub struct MapComponent {
    widget: MapWidget,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

#[wasm_bindgen]
impl MapComponent {
    /// Bind to the canvas named by `target` in the JSON configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<MapComponent, JsValue> {
        let config = match config_json {
            Some(json) => WidgetConfig::from_json(&json).map_err(js_error)?,
            None => WidgetConfig::default(),
        };

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| js_error("No document"))?;
        let canvas = document
            .get_element_by_id(&config.target)
            .and_then(|e| e.dyn_into::<HtmlCanvasElement>().ok())
            .ok_or(WidgetError::MissingTarget)?;
        canvas.set_width(config.width);
        canvas.set_height(config.height);
        let context = canvas
            .get_context("2d")?
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| js_error("Canvas has no 2d context"))?;

        let surface = MapCanvas::new(config.width, config.height).map_err(js_error)?;
        let mut widget = MapWidget::new(config);
        widget.attach_target(surface);
        Ok(MapComponent {
            widget,
            canvas,
            context,
        })
    }

    #[wasm_bindgen(js_name = afterViewInit)]
    pub fn after_view_init(&mut self) -> Result<(), JsValue> {
        self.widget.after_view_init()?;
        self.paint()
    }

    #[wasm_bindgen(js_name = initializeMap)]
    pub fn initialize_map(&mut self) -> Result<(), JsValue> {
        self.widget.initialize_map()?;
        self.paint()
    }

    /// `kind` is `"Point"`, `"LineString"`, `"Polygon"`, `"Circle"` or null.
    #[wasm_bindgen(js_name = drawFeatureClicked)]
    pub fn draw_feature_clicked(&mut self, kind: Option<String>) -> Result<(), JsValue> {
        let kind = kind
            .map(|k| k.parse::<ToolKind>())
            .transpose()
            .map_err(js_error)?;
        self.widget.draw_feature_clicked(kind)?;
        self.paint()
    }

    #[wasm_bindgen(js_name = disableAllDrawFeatures)]
    pub fn disable_all_draw_features(&mut self) -> Result<(), JsValue> {
        self.widget.disable_all_draw_features()?;
        self.paint()
    }

    #[wasm_bindgen(js_name = deleteFeatureActivated)]
    pub fn delete_feature_activated(&mut self) -> Result<(), JsValue> {
        self.widget.delete_feature_activated()?;
        Ok(())
    }

    #[wasm_bindgen(js_name = writeFeaturesToGeoJSON)]
    pub fn write_features_to_geojson(&self) -> Result<Option<String>, JsValue> {
        Ok(self.widget.write_features_to_geojson()?)
    }

    #[wasm_bindgen(js_name = loadGeoJSON)]
    pub fn load_geojson(&mut self, text: &str) -> Result<usize, JsValue> {
        let count = self.widget.load_geojson(text)?;
        self.paint()?;
        Ok(count)
    }

    /// Base-map tile URLs covering the current view.
    #[wasm_bindgen(js_name = tileUrls)]
    pub fn tile_urls(&self) -> Result<Vec<String>, JsValue> {
        Ok(self.widget.tile_urls()?)
    }

    /// PNG data URI of the canvas, as painted by the browser.
    #[wasm_bindgen(js_name = captureScreenshot)]
    pub fn capture_screenshot(&mut self) -> Result<String, JsValue> {
        self.paint()?;
        self.canvas.to_data_url()
    }

    #[wasm_bindgen(js_name = pointerClick)]
    pub fn pointer_click(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        self.widget.pointer_click(Point::new(x, y))?;
        self.paint()
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        self.widget.pointer_move(Point::new(x, y))?;
        self.paint()
    }

    pub fn cancel(&mut self) -> Result<(), JsValue> {
        self.widget.cancel()?;
        self.paint()
    }

    /// Copy the current frame into the page canvas.
    pub fn paint(&mut self) -> Result<(), JsValue> {
        let frame = self.widget.frame()?;
        let image = web_sys::ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(&frame.rgba_data),
            frame.width,
            frame.height,
        )?;
        self.context.put_image_data(&image, 0.0, 0.0)
    }
}

/// Initialize logging for the WASM module.
#[wasm_bindgen(start)]
pub fn start() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("MapSketch (WASM) loaded");
}
