use crate::{
    core::geo::{LatLng, LatLngBounds},
    layers::marker::MarkerIcon,
    MapError, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// GeoJSON geometry types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point {
        coordinates: [f64; 2],
    },
    LineString {
        coordinates: Vec<[f64; 2]>,
    },
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPoint {
        coordinates: Vec<[f64; 2]>,
    },
    MultiLineString {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
    GeometryCollection {
        geometries: Vec<GeoJsonGeometry>,
    },
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoJsonFeature {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    pub geometry: Option<GeoJsonGeometry>,
    pub properties: Option<HashMap<String, serde_json::Value>>,
}

impl GeoJsonFeature {
    pub fn new(geometry: GeoJsonGeometry) -> Self {
        Self {
            id: None,
            geometry: Some(geometry),
            properties: None,
        }
    }

    pub fn with_property(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.properties
            .get_or_insert_with(HashMap::new)
            .insert(name.to_string(), value.into());
        self
    }
}

/// Root GeoJSON object
///
/// A bare geometry is a valid document on its own and serializes without a
/// wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Document", into = "Document")]
pub enum GeoJson {
    Feature(GeoJsonFeature),
    FeatureCollection { features: Vec<GeoJsonFeature> },
    Geometry(GeoJsonGeometry),
}

/// Wire form of [`GeoJson`]: the two feature documents share the `type` tag
/// space with the geometries, so features are tried first
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Document {
    Features(FeatureDocument),
    Geometry(GeoJsonGeometry),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
enum FeatureDocument {
    Feature(GeoJsonFeature),
    FeatureCollection {
        #[serde(with = "tagged_features")]
        features: Vec<GeoJsonFeature>,
    },
}

impl From<Document> for GeoJson {
    fn from(document: Document) -> Self {
        match document {
            Document::Features(FeatureDocument::Feature(feature)) => GeoJson::Feature(feature),
            Document::Features(FeatureDocument::FeatureCollection { features }) => {
                GeoJson::FeatureCollection { features }
            }
            Document::Geometry(geometry) => GeoJson::Geometry(geometry),
        }
    }
}

impl From<GeoJson> for Document {
    fn from(geojson: GeoJson) -> Self {
        match geojson {
            GeoJson::Feature(feature) => Document::Features(FeatureDocument::Feature(feature)),
            GeoJson::FeatureCollection { features } => {
                Document::Features(FeatureDocument::FeatureCollection { features })
            }
            GeoJson::Geometry(geometry) => Document::Geometry(geometry),
        }
    }
}

/// Features nested in a collection carry their own `"type": "Feature"`
mod tagged_features {
    use serde::{ser::SerializeSeq, Deserialize, Deserializer, Serialize, Serializer};

    use super::GeoJsonFeature;

    #[derive(Serialize)]
    #[serde(tag = "type")]
    enum Tagged<'a> {
        Feature(&'a GeoJsonFeature),
    }

    pub fn serialize<S: Serializer>(features: &[GeoJsonFeature], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(features.len()))?;
        for feature in features {
            seq.serialize_element(&Tagged::Feature(feature))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<GeoJsonFeature>, D::Error> {
        Vec::<GeoJsonFeature>::deserialize(deserializer)
    }
}

impl GeoJson {
    /// Parses a GeoJSON document
    pub fn from_str(geojson_str: &str) -> Result<Self> {
        serde_json::from_str(geojson_str)
            .map_err(|e| MapError::ParseError(format!("Invalid GeoJSON: {}", e)))
    }

    /// Reads a document handed back by the native layer
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| MapError::ParseError(format!("Invalid GeoJSON: {}", e)))
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// The same document as a Feature or FeatureCollection; a bare geometry
    /// becomes a property-less feature
    pub fn into_feature_document(self) -> Self {
        match self {
            GeoJson::Geometry(geometry) => GeoJson::Feature(GeoJsonFeature::new(geometry)),
            document => document,
        }
    }

    /// Gets all features of the document
    pub fn features(&self) -> Vec<&GeoJsonFeature> {
        match self {
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::FeatureCollection { features } => features.iter().collect(),
            GeoJson::Geometry(_) => Vec::new(),
        }
    }

    /// Gets the bounding box of every geometry in the document
    pub fn bounds(&self) -> Option<LatLngBounds> {
        let geometries: Vec<&GeoJsonGeometry> = match self {
            GeoJson::Geometry(geometry) => vec![geometry],
            _ => self
                .features()
                .into_iter()
                .filter_map(|feature| feature.geometry.as_ref())
                .collect(),
        };

        let points: Vec<LatLng> = geometries
            .into_iter()
            .flat_map(GeoJsonGeometry::to_lat_lng_points)
            .collect();
        LatLngBounds::from_points(&points)
    }
}

impl GeoJsonGeometry {
    /// Converts coordinates to LatLng points; polygons contribute their
    /// exterior ring only
    pub fn to_lat_lng_points(&self) -> Vec<LatLng> {
        fn points(coordinates: &[[f64; 2]]) -> impl Iterator<Item = LatLng> + '_ {
            coordinates.iter().map(|c| LatLng::new(c[1], c[0]))
        }

        match self {
            GeoJsonGeometry::Point { coordinates } => {
                vec![LatLng::new(coordinates[1], coordinates[0])]
            }
            GeoJsonGeometry::LineString { coordinates }
            | GeoJsonGeometry::MultiPoint { coordinates } => points(coordinates).collect(),
            GeoJsonGeometry::Polygon { coordinates } => coordinates
                .first()
                .map(|exterior| points(exterior).collect())
                .unwrap_or_default(),
            GeoJsonGeometry::MultiLineString { coordinates } => {
                coordinates.iter().flat_map(|line| points(line)).collect()
            }
            GeoJsonGeometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .filter_map(|polygon| polygon.first())
                .flat_map(|exterior| points(exterior))
                .collect(),
            GeoJsonGeometry::GeometryCollection { geometries } => geometries
                .iter()
                .flat_map(GeoJsonGeometry::to_lat_lng_points)
                .collect(),
        }
    }
}

/// Style applied to data layer features
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clickable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draggable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<MarkerIcon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
}

impl DataStyle {
    pub fn fill(color: impl Into<String>, opacity: f64) -> Self {
        Self {
            fill_color: Some(color.into()),
            fill_opacity: Some(opacity),
            ..Self::default()
        }
    }

    pub fn with_stroke(mut self, color: impl Into<String>, weight: f64) -> Self {
        self.stroke_color = Some(color.into());
        self.stroke_weight = Some(weight);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geojson_parsing() {
        let geojson_str = r#"
        {
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"name": "Test Point"},
                    "geometry": {
                        "type": "Point",
                        "coordinates": [-74.0060, 40.7128]
                    }
                }
            ]
        }
        "#;

        let geojson = GeoJson::from_str(geojson_str).unwrap();
        let features = geojson.features();
        assert_eq!(features.len(), 1);
        assert_eq!(
            features[0].properties.as_ref().unwrap()["name"],
            serde_json::json!("Test Point")
        );

        assert!(matches!(
            GeoJson::from_str("{ \"type\": \"Nope\" }"),
            Err(MapError::ParseError(_))
        ));
    }

    #[test]
    fn test_collection_features_are_tagged() {
        let geojson = GeoJson::FeatureCollection {
            features: vec![GeoJsonFeature::new(GeoJsonGeometry::Point {
                coordinates: [1.0, 2.0],
            })],
        };

        let value = geojson.to_value().unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["type"], "Feature");
        assert_eq!(value["features"][0]["geometry"]["type"], "Point");
    }

    #[test]
    fn test_bare_geometry_round_trip() {
        let geojson = GeoJson::from_str(r#"{"type":"Point","coordinates":[1.0,2.0]}"#).unwrap();
        assert_eq!(
            geojson,
            GeoJson::Geometry(GeoJsonGeometry::Point {
                coordinates: [1.0, 2.0]
            })
        );

        let value = geojson.to_value().unwrap();
        assert_eq!(value, serde_json::json!({ "type": "Point", "coordinates": [1.0, 2.0] }));
        assert_eq!(GeoJson::from_str(&value.to_string()).unwrap(), geojson);

        let wrapped = geojson.into_feature_document().to_value().unwrap();
        assert_eq!(wrapped["type"], "Feature");
        assert_eq!(wrapped["geometry"]["type"], "Point");
    }

    #[test]
    fn test_feature_round_trip() {
        let feature = GeoJson::Feature(
            GeoJsonFeature::new(GeoJsonGeometry::LineString {
                coordinates: vec![[0.0, 0.0], [1.0, 1.0]],
            })
            .with_property("name", "route"),
        );
        let value = feature.to_value().unwrap();
        assert_eq!(value["type"], "Feature");
        assert_eq!(GeoJson::from_str(&value.to_string()).unwrap(), feature);
    }

    #[test]
    fn test_point_geometry() {
        let geometry = GeoJsonGeometry::Point {
            coordinates: [-74.0060, 40.7128],
        };

        let points = geometry.to_lat_lng_points();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0], LatLng::new(40.7128, -74.0060));
    }

    #[test]
    fn test_bounds_calculation() {
        let geojson = GeoJson::FeatureCollection {
            features: vec![
                GeoJsonFeature::new(GeoJsonGeometry::Point {
                    coordinates: [-74.0060, 40.7128],
                }),
                GeoJsonFeature::new(GeoJsonGeometry::Point {
                    coordinates: [-73.9857, 40.7489],
                }),
            ],
        };

        let bounds = geojson.bounds().unwrap();

        assert_eq!(bounds.south_west.lat, 40.7128);
        assert_eq!(bounds.north_east.lat, 40.7489);
    }

    #[test]
    fn test_style_serializes_camel_case() {
        let style = DataStyle::fill("#ff0000", 0.5).with_stroke("#000000", 2.0);
        assert_eq!(
            serde_json::to_value(&style).unwrap(),
            serde_json::json!({
                "fillColor": "#ff0000",
                "fillOpacity": 0.5,
                "strokeColor": "#000000",
                "strokeWeight": 2.0
            })
        );
    }
}
