use geoworld_geom::{Vec2, Vec3};
use geoworld_runtime::{ExclusionRegistry, PlacementParams, PlacementSolver};
use geoworld_terrain::SurfaceQuery;
use proptest::prelude::*;

struct Slope;
impl SurfaceQuery for Slope {
    fn surface_below(&self, pos: Vec3) -> Option<f32> {
        Some(pos.x * 0.01)
    }
}

fn zones_strategy() -> impl Strategy<Value = Vec<(f32, f32, f32)>> {
    prop::collection::vec((0.0f32..500.0, 0.0f32..500.0, 1.0f32..120.0), 0..5)
}

proptest! {
    #[test]
    fn placed_points_are_never_inside_a_zone(
        zones in zones_strategy(),
        cx in 0.0f32..500.0,
        cz in 0.0f32..500.0,
        attempts in 0u32..30,
        step in 0.5f32..10.0,
        angle in 1.0f32..180.0,
        relocate in any::<bool>(),
    ) {
        let mut reg = ExclusionRegistry::new();
        for (x, z, r) in &zones {
            reg.register(Vec2::new(*x, *z), *r, "stadium");
        }
        let params = PlacementParams {
            relocate,
            max_attempts: attempts,
            step_distance: step,
            angle_step_deg: angle,
            retry_radius_scale: 0.95,
        };
        let candidate = Vec3::new(cx, 0.0, cz);
        match PlacementSolver::new(&reg, params).place(candidate, &Slope) {
            Some(p) if p == candidate => prop_assert!(!reg.is_inside(p, 1.0)),
            Some(p) => {
                prop_assert!(relocate);
                prop_assert!(!reg.is_inside(p, 0.95));
                prop_assert!((p.y - (p.x * 0.01 + 0.02)).abs() < 1e-4);
                prop_assert!(p.distance_xz(candidate) <= step * attempts as f32 + 1e-3);
            }
            None => prop_assert!(reg.is_inside(candidate, 1.0)),
        }
    }

    #[test]
    fn empty_registry_accepts_everything(cx in -1e4f32..1e4, cz in -1e4f32..1e4) {
        let reg = ExclusionRegistry::new();
        let p = Vec3::new(cx, 3.0, cz);
        prop_assert_eq!(PlacementSolver::new(&reg, PlacementParams::default()).place(p, &Slope), Some(p));
    }
}
