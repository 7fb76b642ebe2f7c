//! Land-use polygons. Green areas large enough to count as parks become
//! exclusion-zone centres.

use serde_json::Value;

use geoworld_geom::Vec2;
use geoworld_world::{CoordinateMapper, GenError};

use crate::geojson::Feature;
use crate::ingest::{Source, open_ring};

/// `landuse` tag values treated as parkland.
pub const GREEN_LANDUSE: &[&str] = &[
    "grass",
    "forest",
    "meadow",
    "recreation_ground",
    "park",
    "greenfield",
    "village_green",
];

const AREAS: &[&str] = &["Polygon", "MultiPolygon"];

/// Whether the feature's `landuse` property is one of [`GREEN_LANDUSE`].
pub fn is_green(feature: &Feature) -> bool {
    feature
        .properties
        .as_ref()
        .and_then(|p| p.get("landuse"))
        .and_then(Value::as_str)
        .is_some_and(|t| GREEN_LANDUSE.contains(&t))
}

/// Shoelace area of a closed ground-plane polygon.
pub fn polygon_area(pts: &[Vec2]) -> f32 {
    if pts.len() < 3 {
        return 0.0;
    }
    let twice: f32 = pts
        .iter()
        .zip(pts.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    twice.abs() * 0.5
}

/// World-space centres of the green polygons in `source` covering at least
/// `min_area` square metres. The centre is the mean of the outer ring's vertices.
pub fn park_centers(
    source: &Source,
    mapper: &CoordinateMapper,
    min_area: f32,
) -> Result<Vec<Vec2>, GenError> {
    let mut centers = Vec::new();
    for (i, f) in source.collection.features.iter().enumerate() {
        if !is_green(f) {
            continue;
        }
        let shape = f.shape(AREAS).map_err(|reason| GenError::MalformedInput {
            file: source.name.clone(),
            feature: i,
            reason,
        })?;
        let Some(ring) = shape.as_ref().and_then(|s| s.first_ring()) else {
            continue;
        };
        let pts: Vec<Vec2> = open_ring(ring)
            .iter()
            .map(|p| mapper.geo_to_world(p.lat, p.lon).xz())
            .collect();
        if pts.len() < 3 || polygon_area(&pts) < min_area {
            continue;
        }
        let sum = pts.iter().fold(Vec2::ZERO, |acc, p| acc + *p);
        centers.push(sum * (1.0 / pts.len() as f32));
    }
    log::info!(target: "ingest", "{} parks in {}", centers.len(), source.name);
    Ok(centers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geojson::FeatureCollection;

    fn feature(landuse: Value) -> Feature {
        serde_json::from_value(serde_json::json!({ "properties": { "landuse": landuse } })).unwrap()
    }

    #[test]
    fn only_green_tags_count() {
        assert!(is_green(&feature("park".into())));
        assert!(is_green(&feature("village_green".into())));
        assert!(!is_green(&feature("industrial".into())));
        assert!(!is_green(&feature(Value::from(3))));
        let bare: FeatureCollection =
            serde_json::from_str(r#"{"features":[{"geometry":null}]}"#).unwrap();
        assert!(!is_green(&bare.features[0]));
    }

    #[test]
    fn area_of_unit_square_either_winding() {
        let sq = [
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 3.0),
            Vec2::new(0.0, 3.0),
        ];
        assert_eq!(polygon_area(&sq), 6.0);
        let mut rev = sq;
        rev.reverse();
        assert_eq!(polygon_area(&rev), 6.0);
        assert_eq!(polygon_area(&sq[..2]), 0.0);
    }
}
