//! Country polygons from a GeoJSON FeatureCollection such as Natural Earth's
//! admin-0 countries.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::{fs, path::Path};
use tracing::{debug, warn};

use super::{CountryGeometry, CountryShape, Polygon, Ring};

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Unsupported,
}

/// Natural Earth marks a few disputed countries with this placeholder.
const NO_CODE: &str = "-99";

pub fn load_geojson<P: AsRef<Path>>(path: P, code_property: &str) -> Result<CountryGeometry> {
    let text = fs::read_to_string(&path)
        .with_context(|| format!("reading geometry {:?}", path.as_ref()))?;
    parse_geojson(&text, code_property)
        .with_context(|| format!("parsing geometry {:?}", path.as_ref()))
}

/// Parse features into shapes keyed by `code_property`.
///
/// The lowercase spelling of the property is accepted too, and a `-99` code
/// falls back to `ADM0_A3`. Features without a usable code or with
/// non-polygonal geometry are skipped.
pub fn parse_geojson(text: &str, code_property: &str) -> Result<CountryGeometry> {
    let fc: FeatureCollection = serde_json::from_str(text)?;

    let mut shapes = Vec::with_capacity(fc.features.len());
    for (idx, feature) in fc.features.into_iter().enumerate() {
        let props = feature.properties.unwrap_or_default();
        let Some(code) = feature_code(&props, code_property) else {
            warn!(feature = idx, "feature has no `{}` code, skipping", code_property);
            continue;
        };

        let polygons: Vec<Polygon> = match feature.geometry {
            Some(Geometry::Polygon { coordinates }) => to_polygon(coordinates).into_iter().collect(),
            Some(Geometry::MultiPolygon { coordinates }) => {
                coordinates.into_iter().filter_map(to_polygon).collect()
            }
            Some(Geometry::Unsupported) | None => {
                warn!(code = %code, "unsupported or missing geometry, skipping");
                continue;
            }
        };

        let name = ["NAME", "name"]
            .iter()
            .find_map(|k| props.get(*k).and_then(Value::as_str))
            .map(str::to_string);

        shapes.push(CountryShape {
            code,
            name,
            polygons,
        });
    }

    debug!(shapes = shapes.len(), "parsed country geometry");
    Ok(CountryGeometry::new(shapes))
}

fn feature_code(props: &Map<String, Value>, code_property: &str) -> Option<String> {
    let lower = code_property.to_lowercase();
    let code = [code_property, lower.as_str()]
        .iter()
        .find_map(|k| props.get(*k).and_then(Value::as_str))?;

    if code == NO_CODE {
        return props
            .get("ADM0_A3")
            .or_else(|| props.get("adm0_a3"))
            .and_then(Value::as_str)
            .filter(|c| *c != NO_CODE)
            .map(str::to_string);
    }
    Some(code.to_string())
}

fn to_ring(points: Vec<Vec<f64>>) -> Ring {
    points
        .into_iter()
        .filter(|p| p.len() >= 2)
        .map(|p| [p[0], p[1]])
        .collect()
}

fn to_polygon(rings: Vec<Vec<Vec<f64>>>) -> Option<Polygon> {
    let mut rings = rings.into_iter().map(to_ring).filter(|r| r.len() >= 3);
    let exterior = rings.next()?;
    Some(Polygon {
        exterior,
        holes: rings.collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
      "type": "FeatureCollection",
      "features": [
        {
          "type": "Feature",
          "properties": {"NAME": "Squareland", "ISO_A3": "SQL"},
          "geometry": {"type": "Polygon", "coordinates": [
            [[0,0],[10,0],[10,10],[0,10],[0,0]],
            [[2,2],[4,2],[4,4],[2,4],[2,2]]
          ]}
        },
        {
          "type": "Feature",
          "properties": {"name": "Islands", "iso_a3": "ISL"},
          "geometry": {"type": "MultiPolygon", "coordinates": [
            [[[20,20],[21,20],[21,21],[20,20]]],
            [[[30,30,5],[31,30,5],[31,31,5],[30,30,5]]]
          ]}
        },
        {
          "type": "Feature",
          "properties": {"ISO_A3": "-99", "ADM0_A3": "FRA"},
          "geometry": {"type": "Polygon", "coordinates": [[[0,40],[5,40],[5,45],[0,40]]]}
        },
        {
          "type": "Feature",
          "properties": {"ISO_A3": "PNT"},
          "geometry": {"type": "Point", "coordinates": [1, 1]}
        },
        {
          "type": "Feature",
          "properties": {"ISO_A3": "-99"},
          "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}
        }
      ]
    }"#;

    #[test]
    fn parses_polygons_and_multipolygons() -> Result<()> {
        let geo = parse_geojson(SAMPLE, "ISO_A3")?;
        let codes: Vec<&str> = geo.shapes.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["SQL", "ISL", "FRA"]);

        let sql = geo.get("SQL").unwrap();
        assert_eq!(sql.name.as_deref(), Some("Squareland"));
        assert_eq!(sql.polygons.len(), 1);
        assert_eq!(sql.polygons[0].holes.len(), 1);

        let isl = geo.get("ISL").unwrap();
        assert_eq!(isl.polygons.len(), 2);
        // third coordinate dropped
        assert_eq!(isl.polygons[1].exterior[0], [30.0, 30.0]);
        Ok(())
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(parse_geojson("{\"features\": 3}", "ISO_A3").is_err());
    }
}
