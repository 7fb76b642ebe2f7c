use geoworld_geom::Vec3;
use geoworld_terrain::TerrainBackend;
use geoworld_world::config::Rivers;

use crate::ribbon::{RibbonMesh, extrude_ribbon};

/// Seat every point just above the terrain and extrude a narrow ribbon.
/// The polyline is updated in place so stored river data follows edited terrain.
pub fn build_river_mesh<T: TerrainBackend + ?Sized>(
    points: &mut [Vec3],
    terrain: &T,
    cfg: &Rivers,
) -> Option<RibbonMesh> {
    if points.len() < 2 {
        return None;
    }
    for p in points.iter_mut() {
        p.y = terrain.sample_height(p.x, p.z) + cfg.height_offset;
    }
    extrude_ribbon(points, cfg.half_width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoworld_terrain::{Heightfield, TerrainLayout};

    #[test]
    fn river_sits_on_terrain() {
        let layout = TerrainLayout {
            origin: Vec3::new(0.0, 5.0, 0.0),
            size: Vec3::new(100.0, 20.0, 100.0),
            height_res: 17,
            weight_width: 8,
            weight_depth: 8,
            layers: 2,
        };
        let hf = Heightfield::flat(layout);
        let mut pts = vec![Vec3::new(10.0, 0.0, 10.0), Vec3::new(20.0, 0.0, 10.0)];
        let mesh = build_river_mesh(&mut pts, &hf, &Rivers::default()).unwrap();
        assert_eq!(mesh.quad_count(), 1);
        assert!((pts[0].y - 5.02).abs() < 1e-5);
        assert!((mesh.vertex(0).y - 5.02).abs() < 1e-5);
        let mut one = vec![Vec3::ZERO];
        assert!(build_river_mesh(&mut one, &hf, &Rivers::default()).is_none());
    }
}
