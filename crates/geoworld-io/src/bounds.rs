use geoworld_world::{GenError, GeoBoundingBox};

use crate::geojson::FeatureCollection;

pub(crate) const LINE_OR_POLYGON: &[&str] = &["LineString", "Polygon"];

/// Accumulate every LineString/Polygon coordinate of `collection` into `bounds`.
///
/// Every such feature's coordinates are fully decoded, so a malformed array
/// fails here, before anything is ingested.
pub fn accumulate_bounds(
    bounds: &mut GeoBoundingBox,
    collection: &FeatureCollection,
    file: &str,
) -> Result<(), GenError> {
    for (i, f) in collection.features.iter().enumerate() {
        let shape = f
            .shape(LINE_OR_POLYGON)
            .map_err(|reason| GenError::MalformedInput {
                file: file.to_string(),
                feature: i,
                reason,
            })?;
        if let Some(shape) = shape {
            for p in shape.positions() {
                bounds.include(p.lat, p.lon);
            }
        }
    }
    Ok(())
}

/// Bounding box over several named collections.
pub fn compute_bounds<'a>(
    sources: impl IntoIterator<Item = (&'a str, &'a FeatureCollection)>,
) -> Result<GeoBoundingBox, GenError> {
    let mut b = GeoBoundingBox::empty();
    for (file, fc) in sources {
        accumulate_bounds(&mut b, fc, file)?;
    }
    Ok(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_lines_and_polygon_rings_only() {
        let fc = FeatureCollection::from_json_str(
            r#"{"features":[
                {"geometry":{"type":"LineString","coordinates":[[30.0,50.0],[30.1,50.05]]}},
                {"geometry":{"type":"Polygon","coordinates":[[[29.9,50.2],[30.0,50.2],[30.0,50.1]]]}},
                {"geometry":{"type":"MultiPolygon","coordinates":[[[[10.0,10.0],[11,11],[12,12]]]]}}
            ]}"#,
            "mixed",
        )
        .unwrap();
        let b = compute_bounds([("mixed", &fc)]).unwrap();
        assert_eq!(b, GeoBoundingBox::new(50.0, 50.2, 29.9, 30.1));
    }

    #[test]
    fn malformed_feature_is_reported_with_index() {
        let fc = FeatureCollection::from_json_str(
            r#"{"features":[
                {"geometry":{"type":"LineString","coordinates":[[30.0,50.0],[30.1,50.05]]}},
                {"geometry":{"type":"LineString","coordinates":[[30.0]]}}
            ]}"#,
            "rivers",
        )
        .unwrap();
        match compute_bounds([("rivers.geojson", &fc)]) {
            Err(GenError::MalformedInput { file, feature, .. }) => {
                assert_eq!(file, "rivers.geojson");
                assert_eq!(feature, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
