//! Reader for the district-boundary GeoJSON document.
//!
//! The boundary file is an external dataset consumed read-only; frontends
//! draw the districts behind the markers and label each one at the center
//! of its bounding box. Nothing in the place store depends on this module.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

/// Label used when a feature carries no recognizable name property.
const FALLBACK_NAME: &str = "District";

/// An administrative boundary with a label anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct District {
    pub name: String,
    pub center_lat: f64,
    pub center_lng: f64,
}

pub fn load_districts(path: &Path) -> Result<Vec<District>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read boundary file: {}", path.display()))?;
    parse_districts(&contents)
}

/// Extract district features from a GeoJSON FeatureCollection.
///
/// A feature counts as a district when its properties carry
/// `admin_level == "6"` or `boundary == "administrative"`. Features whose
/// geometry yields no coordinates are skipped rather than treated as errors.
pub fn parse_districts(geojson: &str) -> Result<Vec<District>> {
    let doc: Value = serde_json::from_str(geojson).context("Failed to parse boundary document")?;

    let features = doc
        .get("features")
        .and_then(Value::as_array)
        .context("Boundary document has no features array")?;

    let mut districts = Vec::new();
    for feature in features {
        let properties = &feature["properties"];
        if !is_district(properties) {
            continue;
        }

        let name = district_name(properties);
        match bounds_center(&feature["geometry"]) {
            Some((center_lat, center_lng)) => districts.push(District {
                name,
                center_lat,
                center_lng,
            }),
            None => debug!(name = %name, "Skipping district without usable geometry"),
        }
    }

    Ok(districts)
}

fn is_district(properties: &Value) -> bool {
    properties["admin_level"].as_str() == Some("6")
        || properties["boundary"].as_str() == Some("administrative")
}

/// Name fallback chain across the datasets in circulation: OSM exports use
/// `name`/`name:vi`, the GADM-derived fallback file uses `NAME_3`.
fn district_name(properties: &Value) -> String {
    properties["name"]
        .as_str()
        .or_else(|| properties["name:vi"].as_str())
        .or_else(|| properties["NAME_3"].as_str())
        .unwrap_or(FALLBACK_NAME)
        .to_string()
}

/// Center of the geometry's bounding box as (lat, lng).
///
/// GeoJSON positions are `[lng, lat, ...]`; the nesting depth differs
/// between Polygon and MultiPolygon, so positions are collected by walking
/// the coordinate arrays down to the first numeric pair.
fn bounds_center(geometry: &Value) -> Option<(f64, f64)> {
    let mut positions = Vec::new();
    collect_positions(&geometry["coordinates"], &mut positions);
    if positions.is_empty() {
        return None;
    }

    let (mut min_lng, mut max_lng) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
    for (lng, lat) in positions {
        min_lng = min_lng.min(lng);
        max_lng = max_lng.max(lng);
        min_lat = min_lat.min(lat);
        max_lat = max_lat.max(lat);
    }

    Some(((min_lat + max_lat) / 2.0, (min_lng + max_lng) / 2.0))
}

fn collect_positions(value: &Value, out: &mut Vec<(f64, f64)>) {
    let Some(array) = value.as_array() else {
        return;
    };

    match (
        array.first().and_then(Value::as_f64),
        array.get(1).and_then(Value::as_f64),
    ) {
        (Some(lng), Some(lat)) => out.push((lng, lat)),
        _ => {
            for item in array {
                collect_positions(item, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"admin_level": "6", "name": "Quận 1"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[106.0, 10.0], [106.2, 10.0], [106.2, 10.4], [106.0, 10.4], [106.0, 10.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"boundary": "administrative", "name:vi": "Quận 3"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[107.0, 11.0], [107.2, 11.0], [107.2, 11.2], [107.0, 11.2], [107.0, 11.0]]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"highway": "residential", "name": "Some road"},
                "geometry": {"type": "LineString", "coordinates": [[106.0, 10.0], [106.1, 10.1]]}
            },
            {
                "type": "Feature",
                "properties": {"admin_level": "6", "NAME_3": "Hóc Môn"},
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn test_parse_filters_and_names_districts() {
        let districts = parse_districts(FIXTURE).unwrap();
        // The road is filtered out; the null-geometry district is skipped
        assert_eq!(districts.len(), 2);
        assert_eq!(districts[0].name, "Quận 1");
        assert_eq!(districts[1].name, "Quận 3");
    }

    #[test]
    fn test_parse_computes_bbox_center() {
        let districts = parse_districts(FIXTURE).unwrap();
        let d = &districts[0];
        assert!((d.center_lat - 10.2).abs() < 1e-9);
        assert!((d.center_lng - 106.1).abs() < 1e-9);
    }

    #[test]
    fn test_name_fallback_chain() {
        let props: Value = serde_json::from_str(r#"{"NAME_3": "Củ Chi"}"#).unwrap();
        assert_eq!(district_name(&props), "Củ Chi");

        let props: Value = serde_json::from_str(r#"{"name:vi": "Quận 5", "NAME_3": "x"}"#).unwrap();
        assert_eq!(district_name(&props), "Quận 5");

        let props: Value = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(district_name(&props), FALLBACK_NAME);
    }

    #[test]
    fn test_parse_rejects_non_geojson() {
        assert!(parse_districts("[1,2,3]").is_err());
        assert!(parse_districts("{not json").is_err());
    }
}
