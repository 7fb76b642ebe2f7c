use geoworld_geom::Vec3;
use geoworld_io::{BridgeCorridor, FeatureCollection, compute_bounds};
use proptest::prelude::*;
use serde_json::json;

fn lines_strategy() -> impl Strategy<Value = Vec<Vec<(f64, f64)>>> {
    let pos = (29.0f64..31.0, 49.0f64..51.0);
    prop::collection::vec(prop::collection::vec(pos, 2..6), 1..8)
}

proptest! {
    #[test]
    fn bounds_cover_every_position(lines in lines_strategy()) {
        let features: Vec<_> = lines
            .iter()
            .map(|l| {
                let coords: Vec<_> = l.iter().map(|(lon, lat)| json!([lon, lat])).collect();
                json!({ "type": "Feature", "geometry": { "type": "LineString", "coordinates": coords } })
            })
            .collect();
        let fc: FeatureCollection = serde_json::from_value(json!({ "features": features })).unwrap();
        let b = compute_bounds([("lines", &fc)]).unwrap();
        for (lon, lat) in lines.iter().flatten() {
            prop_assert!(b.contains(*lat, *lon));
        }
        let lons = lines.iter().flatten().map(|p| p.0);
        prop_assert_eq!(b.min_lon, lons.clone().fold(f64::INFINITY, f64::min));
        prop_assert_eq!(b.max_lon, lons.fold(f64::NEG_INFINITY, f64::max));
    }

    #[test]
    fn corridor_spans_the_long_side(
        x in -500.0f32..500.0,
        z in -500.0f32..500.0,
        w in 0.5f32..80.0,
        d in 0.5f32..80.0,
    ) {
        let rect = [
            Vec3::new(x, 1.0, z),
            Vec3::new(x + w, 2.0, z),
            Vec3::new(x + w, 3.0, z + d),
            Vec3::new(x, 4.0, z + d),
        ];
        let c = BridgeCorridor::from_footprint(&rect).unwrap();
        prop_assert!((c.length() - w.max(d)).abs() < 1e-3);
        prop_assert_eq!(c.entry.y, 0.0);
        prop_assert_eq!(c.exit.y, 0.0);
        let mid = (c.entry + c.exit) * 0.5;
        prop_assert!((mid.x - (x + w * 0.5)).abs() < 1e-3);
        prop_assert!((mid.z - (z + d * 0.5)).abs() < 1e-3);
    }
}
