//! Reading geometry literals and choosing geometry columns by spatial reference system.
mod crs;
mod wkt;

pub use crs::{CrsRegistry, StaticCrsRegistry};

use query_structure::GeometryInput;
use serde_json::{Map, Value};
use std::fmt;

use crate::SqlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryKind {
    fn from_geojson_type(name: &str) -> Option<Self> {
        let kind = match name {
            "Point" => GeometryKind::Point,
            "LineString" => GeometryKind::LineString,
            "Polygon" => GeometryKind::Polygon,
            "MultiPoint" => GeometryKind::MultiPoint,
            "MultiLineString" => GeometryKind::MultiLineString,
            "MultiPolygon" => GeometryKind::MultiPolygon,
            "GeometryCollection" => GeometryKind::GeometryCollection,
            _ => return None,
        };

        Some(kind)
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The text handed to the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryFormat {
    Wkt(String),
    GeoJson(String),
}

/// A validated geometry literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry {
    pub kind: GeometryKind,
    /// The SRID the literal declares, if any.
    pub srid: Option<i32>,
    pub format: GeometryFormat,
}

/// Turns client-provided geometry literals into validated geometries.
pub trait GeometryReader: Send + Sync {
    fn read(&self, input: &GeometryInput) -> crate::Result<Geometry>;
}

/// Reads (extended) well-known text and GeoJSON objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct WktGeometryReader;

impl GeometryReader for WktGeometryReader {
    fn read(&self, input: &GeometryInput) -> crate::Result<Geometry> {
        match input {
            GeometryInput::Wkt(text) => {
                let parsed = wkt::parse(text).map_err(|reason| SqlError::MalformedGeometry {
                    input: text.clone(),
                    reason,
                })?;

                Ok(Geometry {
                    kind: parsed.kind,
                    srid: parsed.srid,
                    format: GeometryFormat::Wkt(parsed.text.to_owned()),
                })
            }
            GeometryInput::GeoJson(geojson) => read_geojson(geojson),
        }
    }
}

fn read_geojson(geojson: &Map<String, Value>) -> crate::Result<Geometry> {
    let malformed = |reason: &str| SqlError::MalformedGeometry {
        input: Value::Object(geojson.clone()).to_string(),
        reason: reason.to_owned(),
    };

    let kind = geojson
        .get("type")
        .and_then(Value::as_str)
        .and_then(GeometryKind::from_geojson_type)
        .ok_or_else(|| malformed("missing or unknown geometry type"))?;

    let members = match kind {
        GeometryKind::GeometryCollection => "geometries",
        _ => "coordinates",
    };

    if !geojson.get(members).is_some_and(Value::is_array) {
        return Err(malformed(&format!("`{members}` must be an array")));
    }

    let srid = match get_geometry_crs(geojson) {
        Some(name) => Some(parse_crs_name(name).ok_or_else(|| malformed(&format!("unsupported crs `{name}`")))?),
        None => None,
    };

    let trimmed: Map<String, Value> = geojson
        .iter()
        .filter(|(key, _)| *key != "crs")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(Geometry {
        kind,
        srid,
        format: GeometryFormat::GeoJson(Value::Object(trimmed).to_string()),
    })
}

fn get_geometry_crs(geojson: &Map<String, Value>) -> Option<&str> {
    geojson
        .get("crs")?
        .as_object()?
        .get("properties")?
        .as_object()?
        .get("name")?
        .as_str()
}

/// `EPSG:28992`, or the OGC URN form `urn:ogc:def:crs:EPSG::28992`.
fn parse_crs_name(name: &str) -> Option<i32> {
    let code = name
        .strip_prefix("EPSG:")
        .or_else(|| name.strip_prefix("urn:ogc:def:crs:EPSG::"))?;

    code.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn geojson(value: Value) -> GeometryInput {
        match value {
            Value::Object(map) => GeometryInput::GeoJson(map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn geojson_crs_becomes_the_srid() {
        let input = geojson(json!({
            "type": "Point",
            "coordinates": [155000, 463000],
            "crs": { "type": "name", "properties": { "name": "EPSG:28992" } }
        }));

        let geometry = WktGeometryReader.read(&input).unwrap();

        assert_eq!(geometry.kind, GeometryKind::Point);
        assert_eq!(geometry.srid, Some(28992));
        assert_eq!(
            geometry.format,
            GeometryFormat::GeoJson(r#"{"type":"Point","coordinates":[155000,463000]}"#.to_owned())
        );
    }

    #[test]
    fn geojson_without_coordinates_is_malformed() {
        let err = WktGeometryReader
            .read(&geojson(json!({ "type": "Polygon" })))
            .unwrap_err();

        assert!(matches!(err, SqlError::MalformedGeometry { ref reason, .. } if reason.contains("coordinates")));
    }

    #[test]
    fn unknown_crs_names_are_malformed() {
        let input = geojson(json!({
            "type": "Point",
            "coordinates": [1, 2],
            "crs": { "type": "name", "properties": { "name": "OGC:CRS84" } }
        }));

        assert!(matches!(
            WktGeometryReader.read(&input),
            Err(SqlError::MalformedGeometry { .. })
        ));
    }

    #[test]
    fn wkt_errors_name_the_input() {
        let err = WktGeometryReader
            .read(&GeometryInput::Wkt("POINT(1".into()))
            .unwrap_err();

        assert!(matches!(err, SqlError::MalformedGeometry { ref input, .. } if input == "POINT(1"));
    }
}
