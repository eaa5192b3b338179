//! Native demo: draws a few shapes headlessly, prints the GeoJSON and
//! optionally writes a PNG snapshot.
//!
//! Usage: `mapsketch [config.json] [snapshot.png]`

#[cfg(feature = "native")]
fn main() {
    env_logger::init();
    log::info!("Starting MapSketch");

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "native")]
fn run() -> mapsketch_app::WidgetResult<()> {
    use kurbo::Point;
    use mapsketch_app::{MapWidget, WidgetConfig};
    use mapsketch_core::tools::ToolKind;

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => WidgetConfig::load(path)?,
        None => WidgetConfig::default(),
    };
    let (w, h) = (config.width as f64, config.height as f64);

    let mut widget = MapWidget::with_canvas(config)?;
    widget.after_view_init()?;

    // Triangle, closed by clicking the first vertex again
    widget.draw_feature_clicked(Some(ToolKind::Polygon))?;
    for (x, y) in [(0.2, 0.2), (0.4, 0.2), (0.3, 0.4), (0.2, 0.2)] {
        widget.pointer_click(Point::new(x * w, y * h))?;
    }

    widget.draw_feature_clicked(Some(ToolKind::Circle))?;
    widget.pointer_click(Point::new(0.7 * w, 0.5 * h))?;
    widget.pointer_click(Point::new(0.8 * w, 0.5 * h))?;

    widget.draw_feature_clicked(Some(ToolKind::Point))?;
    widget.pointer_click(Point::new(0.5 * w, 0.8 * h))?;

    match widget.write_features_to_geojson()? {
        Some(json) => println!("{}", json),
        None => log::warn!("Nothing was drawn"),
    }

    if let Some(path) = args.next() {
        widget.save_snapshot(path)?;
    }
    Ok(())
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
