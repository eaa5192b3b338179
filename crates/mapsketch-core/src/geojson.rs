//! GeoJSON reading and writing for the feature store.

use crate::feature::{Feature, Properties};
use crate::geometry::{CIRCLE_POLYGON_SIDES, Geometry, Polygon};
use crate::store::FeatureStore;
use kurbo::Point;
use serde::de::Error as _;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Largest integer an f64 represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// GeoJSON errors.
#[derive(Debug, Error)]
pub enum GeoJsonError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported geometry type: {0}")]
    UnsupportedGeometry(String),
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// Result type for GeoJSON operations.
pub type GeoJsonResult<T> = Result<T, GeoJsonError>;

/// A number written without a fractional part when it is integral.
struct Number(f64);

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let v = self.0;
        if v.is_finite() && v.fract() == 0.0 && v.abs() < MAX_SAFE_INTEGER {
            serializer.serialize_i64(v as i64)
        } else {
            serializer.serialize_f64(v)
        }
    }
}

/// A position: `[x, y]`. Extra ordinates are ignored on read.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Position(Point);

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&Number(self.0.x))?;
        seq.serialize_element(&Number(self.0.y))?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ordinates = Vec::<f64>::deserialize(deserializer)?;
        match ordinates.as_slice() {
            [x, y, ..] => Ok(Position(Point::new(*x, *y))),
            _ => Err(D::Error::custom("position needs at least two ordinates")),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "coordinates")]
enum GeometryOut {
    Point(Position),
    LineString(Vec<Position>),
    Polygon(Vec<Vec<Position>>),
}

#[derive(Debug, Serialize, Deserialize)]
enum FeatureTag {
    Feature,
}

#[derive(Debug, Serialize, Deserialize)]
enum CollectionTag {
    FeatureCollection,
}

#[derive(Debug, Serialize)]
struct FeatureOut<'a> {
    #[serde(rename = "type")]
    tag: FeatureTag,
    geometry: GeometryOut,
    properties: Option<&'a Properties>,
}

#[derive(Debug, Serialize)]
struct CollectionOut<'a> {
    #[serde(rename = "type")]
    tag: CollectionTag,
    features: Vec<FeatureOut<'a>>,
}

#[derive(Debug, Deserialize)]
struct FeatureIn {
    #[serde(rename = "type")]
    _tag: FeatureTag,
    geometry: Option<Value>,
    #[serde(default)]
    properties: Option<Properties>,
}

#[derive(Debug, Deserialize)]
struct CollectionIn {
    #[serde(rename = "type")]
    _tag: CollectionTag,
    features: Vec<FeatureIn>,
}

fn ring_out(points: &[Point]) -> Vec<Position> {
    points.iter().copied().map(Position).collect()
}

fn polygon_out(polygon: &Polygon) -> GeometryOut {
    GeometryOut::Polygon(polygon.rings.iter().map(|r| ring_out(r)).collect())
}

fn geometry_out(geometry: &Geometry) -> GeometryOut {
    match geometry {
        Geometry::Point(p) => GeometryOut::Point(Position(p.position)),
        Geometry::LineString(l) => GeometryOut::LineString(ring_out(&l.points)),
        Geometry::Polygon(p) => polygon_out(p),
        Geometry::Circle(c) => polygon_out(&c.to_polygon(CIRCLE_POLYGON_SIDES)),
    }
}

/// Serialize every feature in the store, in insertion order, as a compact
/// FeatureCollection.
///
/// Returns `Ok(None)` when the store is empty. Circles are written as
/// polygons. Absent or empty properties are written as `null`.
pub fn write_features(store: &FeatureStore) -> GeoJsonResult<Option<String>> {
    if store.is_empty() {
        return Ok(None);
    }
    let collection = CollectionOut {
        tag: CollectionTag::FeatureCollection,
        features: store
            .iter()
            .map(|f| FeatureOut {
                tag: FeatureTag::Feature,
                geometry: geometry_out(&f.geometry),
                properties: f.non_empty_properties(),
            })
            .collect(),
    };
    Ok(Some(serde_json::to_string(&collection)?))
}

fn coordinates<T: for<'de> Deserialize<'de>>(geometry: &Value) -> GeoJsonResult<T> {
    let coords = geometry
        .get("coordinates")
        .cloned()
        .ok_or_else(|| GeoJsonError::InvalidGeometry("missing coordinates".to_string()))?;
    serde_json::from_value(coords).map_err(|e| GeoJsonError::InvalidGeometry(e.to_string()))
}

fn geometry_in(geometry: &Value) -> GeoJsonResult<Geometry> {
    let kind = geometry
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GeoJsonError::InvalidGeometry("missing type".to_string()))?;
    match kind {
        "Point" => {
            let Position(p) = coordinates(geometry)?;
            Ok(Geometry::point(p))
        }
        "LineString" => {
            let points: Vec<Position> = coordinates(geometry)?;
            if points.len() < 2 {
                return Err(GeoJsonError::InvalidGeometry(
                    "LineString needs at least two positions".to_string(),
                ));
            }
            Ok(Geometry::line_string(points.into_iter().map(|p| p.0).collect()))
        }
        "Polygon" => {
            let rings: Vec<Vec<Position>> = coordinates(geometry)?;
            if rings.first().is_none_or(|r| r.len() < 3) {
                return Err(GeoJsonError::InvalidGeometry(
                    "Polygon needs an exterior ring".to_string(),
                ));
            }
            let rings = rings
                .into_iter()
                .map(|r| r.into_iter().map(|p| p.0).collect())
                .collect();
            Ok(Geometry::Polygon(Polygon::from_rings(rings)))
        }
        other => Err(GeoJsonError::UnsupportedGeometry(other.to_string())),
    }
}

/// Parse a FeatureCollection into new features.
///
/// Features without a geometry are skipped.
pub fn read_features(text: &str) -> GeoJsonResult<Vec<Feature>> {
    let collection: CollectionIn = serde_json::from_str(text)?;
    let mut features = Vec::with_capacity(collection.features.len());
    for raw in collection.features {
        let Some(geometry) = raw.geometry.as_ref().filter(|g| !g.is_null()) else {
            log::warn!("Skipping feature without geometry");
            continue;
        };
        let geometry = geometry_in(geometry)?;
        features.push(match raw.properties {
            Some(props) => Feature::with_properties(geometry, props),
            None => Feature::new(geometry),
        });
    }
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_writes_nothing() {
        let store = FeatureStore::new();
        assert!(write_features(&store).unwrap().is_none());
    }

    #[test]
    fn test_single_point_literal() {
        let mut store = FeatureStore::new();
        store.add(Feature::new(Geometry::point(Point::new(10.0, 10.0)))).unwrap();
        let json = write_features(&store).unwrap().unwrap();
        assert_eq!(
            json,
            r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":{"type":"Point","coordinates":[10,10]},"properties":null}]}"#
        );
    }

    #[test]
    fn test_fractional_coordinates_and_properties() {
        let mut store = FeatureStore::new();
        let mut feature = Feature::new(Geometry::line_string(vec![
            Point::new(0.5, -1.0),
            Point::new(2.0, 3.25),
        ]));
        feature.set_property("name", "trail");
        store.add(feature).unwrap();
        let json = write_features(&store).unwrap().unwrap();
        assert_eq!(
            json,
            r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":{"type":"LineString","coordinates":[[0.5,-1],[2,3.25]]},"properties":{"name":"trail"}}]}"#
        );
    }

    #[test]
    fn test_circle_written_as_polygon() {
        let mut store = FeatureStore::new();
        store.add(Feature::new(Geometry::circle(Point::ZERO, 100.0))).unwrap();
        let json = write_features(&store).unwrap().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let geometry = &value["features"][0]["geometry"];
        assert_eq!(geometry["type"], "Polygon");
        let ring = geometry["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), CIRCLE_POLYGON_SIDES + 1);
        assert_eq!(ring[0], ring[CIRCLE_POLYGON_SIDES]);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut store = FeatureStore::new();
        for x in [3.0, 1.0, 2.0] {
            store.add(Feature::new(Geometry::point(Point::new(x, 0.0)))).unwrap();
        }
        let json = write_features(&store).unwrap().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let xs: Vec<f64> = value["features"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["geometry"]["coordinates"][0].as_f64().unwrap())
            .collect();
        assert_eq!(xs, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_read_features() {
        let text = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Point","coordinates":[1,2,30]},"properties":{"a":1}},
            {"type":"Feature","geometry":null,"properties":null},
            {"type":"Feature","geometry":{"type":"Polygon","coordinates":[[[0,0],[4,0],[4,4],[0,0]]]}}
        ]}"#;
        let features = read_features(text).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].geometry, Geometry::point(Point::new(1.0, 2.0)));
        assert_eq!(features[0].property("a"), Some(&Value::from(1)));
        assert!(matches!(features[1].geometry, Geometry::Polygon(_)));
    }

    #[test]
    fn test_read_rejects_unsupported_geometry() {
        let text = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"MultiPoint","coordinates":[[1,2]]},"properties":null}
        ]}"#;
        assert!(matches!(
            read_features(text),
            Err(GeoJsonError::UnsupportedGeometry(kind)) if kind == "MultiPoint"
        ));
        assert!(matches!(read_features("{}"), Err(GeoJsonError::Json(_))));
    }
}
