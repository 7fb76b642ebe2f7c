use geoworld_geom::Vec3;
use geoworld_terrain::TerrainBackend;
use geoworld_world::config::Roads;

use crate::polyline::resample_polyline;
use crate::ribbon::{RibbonMesh, extrude_ribbon};

/// The stitched road network: one centerline, one mesh.
#[derive(Clone, Debug, Default)]
pub struct RoadNetwork {
    pub centerline: Vec<Vec3>,
    pub mesh: RibbonMesh,
}

#[derive(Clone, Debug)]
pub struct RoadNetworkBuilder {
    pub resample_step: f32,
    pub height_offset: f32,
    pub smooth_iterations: u32,
    pub half_width: f32,
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::from_config(&Roads::default())
    }
}

impl RoadNetworkBuilder {
    pub fn from_config(cfg: &Roads) -> Self {
        Self {
            resample_step: cfg.resample_step,
            height_offset: cfg.height_offset,
            smooth_iterations: cfg.smooth_iterations,
            half_width: cfg.half_width,
        }
    }

    /// Concatenate polylines with at least two points, in input order.
    pub fn flatten(roads: &[Vec<Vec3>]) -> Vec<Vec3> {
        let total = roads.iter().filter(|r| r.len() > 1).map(Vec::len).sum();
        let mut all = Vec::with_capacity(total);
        for r in roads.iter().filter(|r| r.len() > 1) {
            all.extend_from_slice(r);
        }
        all
    }

    /// Resampled, terrain-seated and height-smoothed centerline.
    /// `ground(x, z)` is the terrain height in world units.
    pub fn centerline_with(&self, roads: &[Vec<Vec3>], ground: impl Fn(f32, f32) -> f32) -> Vec<Vec3> {
        let all = Self::flatten(roads);
        let mut pts = resample_polyline(&all, self.resample_step);
        for p in pts.iter_mut() {
            p.y = ground(p.x, p.z) + self.height_offset;
        }
        smooth_heights(&mut pts, self.smooth_iterations);
        enforce_floor(&mut pts, &ground, self.height_offset);
        pts
    }

    pub fn centerline<T: TerrainBackend + ?Sized>(&self, roads: &[Vec<Vec3>], terrain: &T) -> Vec<Vec3> {
        self.centerline_with(roads, |x, z| terrain.sample_height(x, z))
    }

    /// `None` when fewer than two points survive flattening.
    pub fn build<T: TerrainBackend + ?Sized>(&self, roads: &[Vec<Vec3>], terrain: &T) -> Option<RoadNetwork> {
        let centerline = self.centerline(roads, terrain);
        let mesh = extrude_ribbon(&centerline, self.half_width)?;
        log::info!(
            target: "roads",
            "road network: {} polylines -> {} points, {} tris",
            roads.len(),
            centerline.len(),
            mesh.triangle_count()
        );
        Some(RoadNetwork { centerline, mesh })
    }
}

/// In-place `(prev + 2*curr + next) / 4` on y of interior points. Endpoints and x/z are untouched.
pub fn smooth_heights(pts: &mut [Vec3], iterations: u32) {
    if pts.len() < 3 {
        return;
    }
    for _ in 0..iterations {
        for i in 1..pts.len() - 1 {
            pts[i].y = (pts[i - 1].y + 2.0 * pts[i].y + pts[i + 1].y) / 4.0;
        }
    }
}

/// Lift any point below `ground + offset` back up to it.
pub fn enforce_floor(pts: &mut [Vec3], ground: impl Fn(f32, f32) -> f32, offset: f32) {
    for p in pts.iter_mut() {
        let floor = ground(p.x, p.z) + offset;
        if p.y < floor {
            p.y = floor;
        }
    }
}
