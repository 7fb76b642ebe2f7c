use geoworld_geom::Vec3;
use geoworld_mesh::RibbonMesh;
use geoworld_terrain::{SurfaceQuery, snap_to_surface};
use geoworld_world::config::Parking;

use crate::exclusion::ExclusionRegistry;
use crate::host::ParkingSlot;

/// Parking slots beside the road mesh.
#[derive(Clone, Debug)]
pub struct ParkingPlanner {
    pub offset: f32,
    pub min_spacing: f32,
    pub max_total: usize,
    pub quad_stride: usize,
}

impl ParkingPlanner {
    pub fn from_config(cfg: &Parking) -> Self {
        Self {
            offset: cfg.offset,
            min_spacing: cfg.min_spacing,
            max_total: cfg.max_total,
            quad_stride: cfg.quad_stride.max(1),
        }
    }

    /// Every `quad_stride`-th quad proposes a slot `offset` units off to its side;
    /// slots too close to an accepted one or inside a zone are skipped.
    pub fn plan<S: SurfaceQuery + ?Sized>(
        &self,
        mesh: &RibbonMesh,
        surface: &S,
        zones: &ExclusionRegistry,
    ) -> Vec<ParkingSlot> {
        let mut slots: Vec<ParkingSlot> = Vec::new();
        for q in (0..mesh.quad_count()).step_by(self.quad_stride) {
            if slots.len() >= self.max_total {
                break;
            }
            let dir = mesh.quad_direction(q);
            if dir.length() == 0.0 {
                continue;
            }
            let side = Vec3::UP.cross(dir);
            let pos = snap_to_surface(surface, mesh.quad_center(q) + side * self.offset, 0.0);
            if slots
                .iter()
                .any(|s| s.position.distance(pos) < self.min_spacing)
            {
                continue;
            }
            if zones.is_inside(pos, 1.0) {
                continue;
            }
            slots.push(ParkingSlot {
                position: pos,
                road_direction: dir,
                yaw_deg: dir.x.atan2(dir.z).to_degrees() + 90.0,
            });
        }
        log::info!(target: "parking", "{} parking slots planned", slots.len());
        slots
    }
}

impl Default for ParkingPlanner {
    fn default() -> Self {
        Self::from_config(&Parking::default())
    }
}
