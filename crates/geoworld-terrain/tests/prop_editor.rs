use geoworld_geom::Vec3;
use geoworld_terrain::{
    HeightRaster, Heightfield, TerrainBackend, TerrainLayout, TerrainSurface, WeightRaster,
    paint_raster, raise_raster, snap_to_surface, snap_to_terrain,
};
use proptest::prelude::*;

const RES: usize = 33;
const LAYERS: usize = 4;

fn layout() -> TerrainLayout {
    TerrainLayout {
        origin: Vec3::new(-100.0, 0.0, -100.0),
        size: Vec3::new(200.0, 60.0, 200.0),
        height_res: RES,
        weight_width: RES,
        weight_depth: RES,
        layers: LAYERS,
    }
}

fn world_point() -> impl Strategy<Value = Vec3> {
    (-150.0f32..150.0, -150.0f32..150.0).prop_map(|(x, z)| Vec3::new(x, 0.0, z))
}

fn height_raster() -> impl Strategy<Value = HeightRaster> {
    prop::collection::vec(0.0f32..=1.0, RES * RES)
        .prop_map(|v| HeightRaster::from_vec(RES, v).unwrap())
}

/// Random weights normalized per pixel.
fn weight_raster() -> impl Strategy<Value = WeightRaster> {
    prop::collection::vec(0.0f32..1.0, RES * RES * LAYERS).prop_map(|mut v| {
        for px in v.chunks_exact_mut(LAYERS) {
            let s: f32 = px.iter().sum();
            if s > 0.0 {
                px.iter_mut().for_each(|w| *w /= s);
            } else {
                px[0] = 1.0;
            }
        }
        WeightRaster::from_vec(RES, RES, LAYERS, v).unwrap()
    })
}

#[derive(Debug, Clone)]
struct PaintCall {
    a: Vec3,
    b: Vec3,
    radius: f32,
    strength: f32,
    layer: usize,
}

fn paint_call() -> impl Strategy<Value = PaintCall> {
    (world_point(), world_point(), 0.5f32..40.0, -1.0f32..2.0, 0usize..LAYERS).prop_map(
        |(a, b, radius, strength, layer)| PaintCall {
            a,
            b,
            radius,
            strength,
            layer,
        },
    )
}

proptest! {
    // raising never lowers any pixel
    #[test]
    fn raise_is_monotonic(
        before in height_raster(),
        a in world_point(),
        b in world_point(),
        radius in -5.0f32..60.0,
        raise in -10.0f32..20.0,
        falloff in -0.5f32..1.5,
    ) {
        let mut after = before.clone();
        raise_raster(&mut after, &layout(), a, b, radius, raise, falloff);
        for (old, new) in before.as_slice().iter().zip(after.as_slice()) {
            prop_assert!(new >= old);
        }
    }

    // applying the same corridor twice never undoes the first pass
    #[test]
    fn raise_twice_keeps_first_pass(
        a in world_point(),
        b in world_point(),
        radius in 1.0f32..40.0,
        raise in 0.0f32..10.0,
    ) {
        let mut once = HeightRaster::new(RES);
        raise_raster(&mut once, &layout(), a, b, radius, raise, 0.6);
        let mut twice = once.clone();
        raise_raster(&mut twice, &layout(), a, b, radius, raise, 0.6);
        for (o, t) in once.as_slice().iter().zip(twice.as_slice()) {
            prop_assert!(t >= o);
        }
    }

    // every pixel sums to 1 after any sequence of paint calls
    #[test]
    fn paint_sequence_preserves_unit_sum(
        mut w in weight_raster(),
        calls in prop::collection::vec(paint_call(), 1..6),
    ) {
        for c in &calls {
            paint_raster(&mut w, &layout(), c.a, c.b, c.radius, c.strength, c.layer);
        }
        for z in 0..RES {
            for x in 0..RES {
                let s = w.sum_at(x, z);
                prop_assert!((s - 1.0).abs() < 1e-4, "pixel ({x},{z}) sums to {s}");
                prop_assert!(w.pixel(x, z).iter().all(|v| *v >= 0.0));
            }
        }
    }

    // snapping always lands inside the footprint and on the surface
    #[test]
    fn snap_stays_on_terrain(p in world_point(), off in 0.0f32..1.0) {
        let hf = Heightfield::from_fn(layout(), |u, v| 0.5 * (u + v));
        let s = snap_to_terrain(&hf, p, off);
        let l = hf.layout().unwrap();
        prop_assert!(s.x >= l.origin.x && s.x <= l.origin.x + l.size.x);
        prop_assert!(s.z >= l.origin.z && s.z <= l.origin.z + l.size.z);
        prop_assert!((s.y - (hf.sample_height(s.x, s.z) + off)).abs() < 1e-4);
        let q = snap_to_surface(&TerrainSurface(&hf), s, 0.0);
        prop_assert!((q.y - hf.sample_height(s.x, s.z)).abs() < 1e-4);
    }
}
