use geoworld_geom::{Vec2, Vec3};
use geoworld_world::{ChunkKey, CoordinateMapper, GeoBoundingBox};
use proptest::prelude::*;

fn arb_bounds() -> impl Strategy<Value = GeoBoundingBox> {
    (-80.0f64..80.0, 0.001f64..5.0, -170.0f64..170.0, 0.001f64..5.0)
        .prop_map(|(lat, dlat, lon, dlon)| GeoBoundingBox::new(lat, lat + dlat, lon, lon + dlon))
}

fn arb_size() -> impl Strategy<Value = Vec2> {
    (1.0f32..8192.0, 1.0f32..8192.0).prop_map(|(x, y)| Vec2::new(x, y))
}

proptest! {
    // Any point inside the box lands inside [0, size] on both axes
    #[test]
    fn inside_box_maps_into_world(b in arb_bounds(), size in arb_size(), fu in 0.0f64..=1.0, fv in 0.0f64..=1.0) {
        let m = CoordinateMapper::new(b, Vec2::ZERO, size).unwrap();
        let lat = b.min_lat + fv * (b.max_lat - b.min_lat);
        let lon = b.min_lon + fu * (b.max_lon - b.min_lon);
        let p = m.geo_to_world(lat.min(b.max_lat), lon.min(b.max_lon));
        let eps = 1e-3 * size.x.max(size.y);
        prop_assert!(p.x >= -eps && p.x <= size.x + eps);
        prop_assert!(p.z >= -eps && p.z <= size.y + eps);
        prop_assert_eq!(p.y, 0.0);
    }

    // Box corners map to exactly 0 and exactly size
    #[test]
    fn corners_map_exactly(b in arb_bounds(), size in arb_size()) {
        let m = CoordinateMapper::new(b, Vec2::ZERO, size).unwrap();
        prop_assert_eq!(m.geo_to_world(b.min_lat, b.min_lon), Vec3::new(0.0, 0.0, 0.0));
        prop_assert_eq!(m.geo_to_world(b.max_lat, b.max_lon), Vec3::new(size.x, 0.0, size.y));
    }

    // chunk keys are pure and never decrease as position increases
    #[test]
    fn chunk_key_pure_and_monotonic(
        x in -50_000.0f32..50_000.0,
        z in -50_000.0f32..50_000.0,
        dx in 0.0f32..5_000.0,
        dz in 0.0f32..5_000.0,
        size in 1.0f32..500.0,
    ) {
        let o = Vec2::ZERO;
        let a = ChunkKey::containing(Vec3::new(x, 3.0, z), o, size);
        prop_assert_eq!(a, ChunkKey::containing(Vec3::new(x, 3.0, z), o, size));
        let b = ChunkKey::containing(Vec3::new(x + dx, 0.0, z + dz), o, size);
        prop_assert!(b.cx >= a.cx);
        prop_assert!(b.cz >= a.cz);
    }
}

#[test]
fn negative_positions_floor_toward_minus_infinity() {
    let k = ChunkKey::containing(Vec3::new(-0.5, 0.0, 99.9), Vec2::ZERO, 100.0);
    assert_eq!(k, ChunkKey::new(-1, 0));
    let k = ChunkKey::containing(Vec3::new(100.0, 0.0, -100.0), Vec2::ZERO, 100.0);
    assert_eq!(k, ChunkKey::new(1, -1));
}

#[test]
fn chunk_distances() {
    let a = ChunkKey::new(0, 0);
    let b = ChunkKey::new(3, -4);
    assert_eq!(a.distance_sq(b), 25);
    assert_eq!(a.chebyshev(b), 4);
    assert_eq!(a.offset(3, -4), b);
}
