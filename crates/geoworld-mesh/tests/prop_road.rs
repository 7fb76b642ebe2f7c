use geoworld_geom::Vec3;
use geoworld_mesh::{RoadNetworkBuilder, extrude_ribbon};
use proptest::prelude::*;

fn bumpy(x: f32, z: f32) -> f32 {
    (x * 0.37).sin() * 6.0 + (z * 0.11).cos() * 9.0 + if (x as i32) % 7 == 0 { 4.0 } else { 0.0 }
}

fn polyline() -> impl Strategy<Value = Vec<Vec3>> {
    prop::collection::vec((-200.0f32..200.0, -200.0f32..200.0), 0..6)
        .prop_map(|v| v.into_iter().map(|(x, z)| Vec3::new(x, 0.0, z)).collect())
}

proptest! {
    // no centerline point ends below terrain + offset, whatever the iteration count
    #[test]
    fn centerline_never_below_floor(
        roads in prop::collection::vec(polyline(), 0..4),
        iterations in 0u32..24,
        offset in 0.0f32..0.5,
        step in 0.5f32..8.0,
    ) {
        let b = RoadNetworkBuilder {
            resample_step: step,
            height_offset: offset,
            smooth_iterations: iterations,
            half_width: 2.5,
        };
        let line = b.centerline_with(&roads, bumpy);
        for p in &line {
            prop_assert!(p.y >= bumpy(p.x, p.z) + offset);
        }
    }

    // the ribbon has one quad per centerline segment
    #[test]
    fn ribbon_quads_match_segments(roads in prop::collection::vec(polyline(), 1..4)) {
        let b = RoadNetworkBuilder::default();
        let line = b.centerline_with(&roads, |_, _| 0.0);
        match extrude_ribbon(&line, b.half_width) {
            Some(mesh) => {
                prop_assert_eq!(mesh.quad_count(), line.len() - 1);
                prop_assert_eq!(mesh.idx.len(), (line.len() - 1) * 6);
                prop_assert!(mesh.idx.iter().all(|i| (*i as usize) < mesh.vertex_count()));
            }
            None => prop_assert!(line.len() < 2),
        }
    }
}
