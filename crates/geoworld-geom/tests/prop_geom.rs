use geoworld_geom::{Aabb, Vec2, Vec3, distance_point_to_segment};
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = f32> {
    -10_000.0f32..10_000.0
}

fn arb_vec2() -> impl Strategy<Value = Vec2> {
    (coord(), coord()).prop_map(|(x, y)| Vec2::new(x, y))
}

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (coord(), coord(), coord()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    // Segment distance never exceeds the distance to either endpoint
    #[test]
    fn segment_distance_bounded_by_endpoints(p in arb_vec2(), a in arb_vec2(), b in arb_vec2()) {
        let d = distance_point_to_segment(p, a, b);
        prop_assert!(d >= 0.0);
        prop_assert!(d <= p.distance(a) + 1e-2);
        prop_assert!(d <= p.distance(b) + 1e-2);
    }

    // Segment distance is symmetric in the endpoints
    #[test]
    fn segment_distance_symmetric(p in arb_vec2(), a in arb_vec2(), b in arb_vec2()) {
        let d1 = distance_point_to_segment(p, a, b);
        let d2 = distance_point_to_segment(p, b, a);
        prop_assert!((d1 - d2).abs() <= 1e-2 + 1e-4 * d1.abs());
    }

    // Every input point lies inside the box built from the points
    #[test]
    fn aabb_contains_its_points(pts in proptest::collection::vec(arb_vec3(), 1..32)) {
        let b = Aabb::from_points(&pts).unwrap();
        for p in pts {
            prop_assert!(p.x >= b.min.x && p.x <= b.max.x);
            prop_assert!(p.y >= b.min.y && p.y <= b.max.y);
            prop_assert!(p.z >= b.min.z && p.z <= b.max.z);
        }
    }

    // Lerp stays on the segment in the ground plane
    #[test]
    fn lerp_within_endpoint_distance(a in arb_vec3(), b in arb_vec3(), t in 0.0f32..=1.0) {
        let p = a.lerp(b, t);
        let total = a.distance(b);
        prop_assert!(a.distance(p) <= total * 1.0001 + 1e-2);
        prop_assert!(b.distance(p) <= total * 1.0001 + 1e-2);
    }
}
