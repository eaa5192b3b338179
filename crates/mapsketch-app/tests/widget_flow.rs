//! End-to-end flows through the public widget API.

use kurbo::Point;
use mapsketch_app::{MapWidget, WidgetConfig, WidgetError};
use mapsketch_core::geometry::Geometry;
use mapsketch_core::interaction::Mode;
use mapsketch_core::tools::ToolKind;
use mapsketch_core::Feature;

fn widget() -> MapWidget {
    let config = WidgetConfig::from_json(r#"{"width":"320px","height":"240px"}"#).unwrap();
    let mut widget = MapWidget::with_canvas(config).unwrap();
    widget.after_view_init().unwrap();
    widget
}

#[test]
fn test_draw_circle_then_delete_restores_snapshot() {
    let mut widget = widget();
    let original = widget.capture_screenshot().unwrap();

    widget.draw_feature_clicked(Some(ToolKind::Circle)).unwrap();
    widget.pointer_click(Point::new(160.0, 120.0)).unwrap();
    widget.pointer_move(Point::new(180.0, 120.0)).unwrap();
    widget.pointer_click(Point::new(200.0, 120.0)).unwrap();
    assert_eq!(widget.coordinator().unwrap().store().len(), 1);
    assert_eq!(widget.mode().unwrap(), Mode::Idle);

    let with_circle = widget.capture_screenshot().unwrap();
    assert_ne!(with_circle, original);

    widget.delete_feature_activated().unwrap();
    assert_eq!(widget.mode().unwrap(), Mode::Deleting);
    widget.pointer_click(Point::new(165.0, 125.0)).unwrap();

    let coordinator = widget.coordinator().unwrap();
    assert!(coordinator.store().is_empty());
    assert!(!coordinator.delete_feature_mode());
    assert!(!coordinator.selection().is_active());
    assert_eq!(widget.capture_screenshot().unwrap(), original);
}

#[test]
fn test_delete_click_on_empty_space_keeps_features() {
    let mut widget = widget();
    widget.draw_feature_clicked(Some(ToolKind::Point)).unwrap();
    widget.pointer_click(Point::new(40.0, 40.0)).unwrap();

    widget.delete_feature_activated().unwrap();
    widget.pointer_click(Point::new(250.0, 200.0)).unwrap();
    assert_eq!(widget.coordinator().unwrap().store().len(), 1);
    assert_eq!(widget.mode().unwrap(), Mode::Deleting);

    // Picking a tool abandons delete mode
    widget.draw_feature_clicked(Some(ToolKind::LineString)).unwrap();
    let coordinator = widget.coordinator().unwrap();
    assert!(!coordinator.delete_feature_mode());
    assert_eq!(coordinator.mode(), Mode::Drawing(ToolKind::LineString));
}

#[test]
fn test_draw_each_kind_and_export() {
    let mut widget = widget();

    widget.draw_feature_clicked(Some(ToolKind::Point)).unwrap();
    widget.pointer_click(Point::new(20.0, 20.0)).unwrap();

    widget.draw_feature_clicked(Some(ToolKind::LineString)).unwrap();
    widget.pointer_click(Point::new(40.0, 100.0)).unwrap();
    widget.pointer_click(Point::new(100.0, 100.0)).unwrap();
    widget.finish_drawing().unwrap();

    widget.draw_feature_clicked(Some(ToolKind::Polygon)).unwrap();
    for p in [(150.0, 50.0), (250.0, 50.0), (200.0, 150.0), (150.0, 50.0)] {
        widget.pointer_click(Point::new(p.0, p.1)).unwrap();
    }

    widget.draw_feature_clicked(Some(ToolKind::Circle)).unwrap();
    widget.pointer_click(Point::new(60.0, 200.0)).unwrap();
    widget.pointer_click(Point::new(80.0, 200.0)).unwrap();

    let kinds: Vec<_> = widget
        .coordinator()
        .unwrap()
        .store()
        .iter()
        .map(|f| f.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![ToolKind::Point, ToolKind::LineString, ToolKind::Polygon, ToolKind::Circle]
    );

    let json = widget.write_features_to_geojson().unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let types: Vec<_> = value["features"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["geometry"]["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(types, ["Point", "LineString", "Polygon", "Polygon"]);
}

#[test]
fn test_custom_tools_reject_unknown_kind() {
    let config = WidgetConfig::from_json(r#"{"drawFeatures":["Point"]}"#).unwrap();
    let mut widget = MapWidget::with_canvas(config).unwrap();
    widget.after_view_init().unwrap();

    widget.draw_feature_clicked(Some(ToolKind::Point)).unwrap();
    assert!(matches!(
        widget.draw_feature_clicked(Some(ToolKind::Polygon)),
        Err(WidgetError::Tool(_))
    ));
    assert_eq!(widget.mode().unwrap(), Mode::Drawing(ToolKind::Point));
}

#[test]
fn test_save_snapshot_writes_png() {
    let mut widget = widget();
    widget
        .add_feature(Feature::new(Geometry::point(Point::new(10.0, 10.0))))
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map.png");
    widget.save_snapshot(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}
