//! Elements of the widget's view: the map canvas and the overlay container.

use mapsketch_render::{RenderContext, RenderResult, RenderedImage, Renderer, SoftwareRenderer, ViewElement};

/// The canvas the map is painted into.
pub struct MapCanvas {
    renderer: SoftwareRenderer,
    /// Whether a frame has been painted since the canvas was created or resized.
    painted: bool,
}

impl MapCanvas {
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        Ok(Self {
            renderer: SoftwareRenderer::new(width, height)?,
            painted: false,
        })
    }

    pub fn width(&self) -> u32 {
        self.renderer.width()
    }

    pub fn height(&self) -> u32 {
        self.renderer.height()
    }

    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.renderer.resize(width, height)?;
        self.painted = false;
        Ok(())
    }

    pub fn paint(&mut self, ctx: &RenderContext) {
        self.renderer.render(ctx);
        self.painted = true;
    }

    /// Last painted frame.
    pub fn image(&self) -> RenderedImage {
        self.renderer.image()
    }
}

impl ViewElement for MapCanvas {
    fn surface(&self) -> Option<RenderedImage> {
        self.painted.then(|| self.renderer.image())
    }
}

/// Container for controls and overlays stacked above the canvas.
///
/// Hosts no drawing surface of its own.
#[derive(Debug, Default)]
pub struct OverlayContainer {
    /// Attribution text shown in the corner.
    pub attribution: Option<String>,
}

impl ViewElement for OverlayContainer {
    fn surface(&self) -> Option<RenderedImage> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapsketch_core::store::FeatureStore;
    use mapsketch_core::view::MapView;

    #[test]
    fn test_unpainted_canvas_has_no_surface() {
        let mut canvas = MapCanvas::new(4, 4).unwrap();
        assert!(canvas.surface().is_none());

        let store = FeatureStore::new();
        let view = MapView::default();
        canvas.paint(&RenderContext::new(&store, &view));
        assert_eq!(canvas.surface().map(|i| i.rgba_data.len()), Some(64));

        canvas.resize(8, 4).unwrap();
        assert!(canvas.surface().is_none());
    }

    #[test]
    fn test_overlay_has_no_surface() {
        assert!(OverlayContainer::default().surface().is_none());
    }
}
