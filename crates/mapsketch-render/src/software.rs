//! CPU renderer painting into an in-memory RGBA surface.

use crate::capture::RenderedImage;
use crate::renderer::{FeatureStyle, RenderContext, RenderResult, Renderer, RendererError};
use kurbo::{Affine, BezPath, PathEl};
use mapsketch_core::geometry::Geometry;
use peniko::Color;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Software renderer backed by a `tiny_skia::Pixmap`.
pub struct SoftwareRenderer {
    pixmap: Pixmap,
}

impl SoftwareRenderer {
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or(RendererError::InvalidSize { width, height })?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Replace the surface with a blank one of the new size.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width == self.width() && height == self.height() {
            return Ok(());
        }
        self.pixmap = Pixmap::new(width, height).ok_or(RendererError::InvalidSize { width, height })?;
        log::debug!("Software surface resized to {}x{}", width, height);
        Ok(())
    }

    /// Straight-alpha RGBA copy of the current frame.
    pub fn image(&self) -> RenderedImage {
        let mut rgba_data = Vec::with_capacity(self.pixmap.data().len());
        for pixel in self.pixmap.pixels() {
            let c = pixel.demultiply();
            rgba_data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        RenderedImage {
            rgba_data,
            width: self.width(),
            height: self.height(),
        }
    }

    fn draw_geometry(&mut self, geometry: &Geometry, transform: Affine, style: &FeatureStyle, stroke_color: Color) {
        let stroke = Stroke {
            width: style.stroke_width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };

        match geometry {
            Geometry::Point(p) => {
                let center = transform * p.position;
                let Some(marker) = PathBuilder::from_circle(center.x as f32, center.y as f32, style.point_radius)
                else {
                    return;
                };
                self.pixmap
                    .fill_path(&marker, &paint(style.fill_color), FillRule::Winding, Transform::identity(), None);
                self.pixmap
                    .stroke_path(&marker, &paint(stroke_color), &stroke, Transform::identity(), None);
            }
            _ => {
                let Some(path) = to_skia_path(&(transform * geometry.to_path())) else {
                    return;
                };
                if geometry.is_areal() {
                    self.pixmap
                        .fill_path(&path, &paint(style.fill_color), FillRule::EvenOdd, Transform::identity(), None);
                }
                self.pixmap
                    .stroke_path(&path, &paint(stroke_color), &stroke, Transform::identity(), None);
            }
        }
    }
}

impl Renderer for SoftwareRenderer {
    fn render(&mut self, ctx: &RenderContext) {
        let bg = self.background_color(ctx).to_rgba8();
        self.pixmap
            .fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));

        let transform = ctx.view.transform();
        let style = ctx.style;
        for feature in ctx.store.iter() {
            let color = if ctx.is_selected(feature.id()) {
                style.selection_color
            } else {
                style.stroke_color
            };
            self.draw_geometry(&feature.geometry, transform, &style, color);
        }
        if let Some(preview) = &ctx.preview {
            self.draw_geometry(preview, transform, &style, style.stroke_color);
        }
    }
}

fn paint(color: Color) -> Paint<'static> {
    let c = color.to_rgba8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(c.r, c.g, c.b, c.a);
    paint.anti_alias = true;
    paint
}

/// Convert a kurbo path (already in pixel space) to a tiny-skia path.
fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => pb.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32),
            PathEl::CurveTo(p1, p2, p3) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Size};
    use mapsketch_core::feature::Feature;
    use mapsketch_core::store::FeatureStore;
    use mapsketch_core::view::MapView;

    /// A view where one map unit is one pixel, origin at the centre.
    fn unit_view() -> MapView {
        let mut view = MapView::new(Point::ZERO, 0.0, Size::new(64.0, 64.0));
        view.zoom = mapsketch_core::view::MAX_RESOLUTION.log2();
        view
    }

    fn pixel(image: &RenderedImage, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * image.width + x) * 4) as usize;
        [image.rgba_data[i], image.rgba_data[i + 1], image.rgba_data[i + 2], image.rgba_data[i + 3]]
    }

    #[test]
    fn test_invalid_size() {
        assert!(SoftwareRenderer::new(0, 10).is_err());
    }

    #[test]
    fn test_empty_store_is_background() {
        let store = FeatureStore::new();
        let view = unit_view();
        let mut renderer = SoftwareRenderer::new(64, 64).unwrap();
        renderer.render(&RenderContext::new(&store, &view));
        let image = renderer.image();
        assert_eq!(image.rgba_data.len(), 64 * 64 * 4);
        assert!(image.rgba_data.chunks(4).all(|p| p == [242, 239, 233, 255]));
    }

    #[test]
    fn test_circle_paints_pixels() {
        let mut store = FeatureStore::new();
        store.add(Feature::new(Geometry::circle(Point::ZERO, 10.0))).unwrap();
        let view = unit_view();
        let mut renderer = SoftwareRenderer::new(64, 64).unwrap();
        renderer.render(&RenderContext::new(&store, &view));
        let image = renderer.image();

        // Centre is tinted by the translucent fill, the corner is untouched.
        assert_ne!(pixel(&image, 32, 32), [242, 239, 233, 255]);
        assert_eq!(pixel(&image, 0, 0), [242, 239, 233, 255]);
    }

    #[test]
    fn test_selection_changes_outline() {
        let mut store = FeatureStore::new();
        let id = store
            .add(Feature::new(Geometry::line_string(vec![
                Point::new(-20.0, 0.0),
                Point::new(20.0, 0.0),
            ])))
            .unwrap();
        let view = unit_view();
        let mut renderer = SoftwareRenderer::new(64, 64).unwrap();

        renderer.render(&RenderContext::new(&store, &view));
        let plain = renderer.image();
        let selected = [id];
        renderer.render(&RenderContext::new(&store, &view).with_selection(&selected));
        let highlighted = renderer.image();

        assert_ne!(plain, highlighted);
    }

    #[test]
    fn test_resize() {
        let mut renderer = SoftwareRenderer::new(8, 8).unwrap();
        renderer.resize(16, 4).unwrap();
        assert_eq!((renderer.width(), renderer.height()), (16, 4));
        assert_eq!(renderer.image().rgba_data.len(), 16 * 4 * 4);
    }
}
