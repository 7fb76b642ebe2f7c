use geoworld_chunk::ChunkHandle;
use geoworld_geom::Vec3;
use geoworld_mesh::{RibbonMesh, RoadNetwork};
use geoworld_terrain::{SurfaceQuery, TerrainBackend, TerrainSurface};
use geoworld_world::ChunkKey;

use crate::style::{BuildingVisual, StyleChoice};

#[derive(Clone, Debug, PartialEq)]
pub struct BuildingSpawn {
    pub chunk: ChunkKey,
    /// Position of the record within its chunk.
    pub index: usize,
    pub style: String,
    pub visual: BuildingVisual,
    /// Base of the building.
    pub position: Vec3,
    pub scale: Vec3,
    pub footprint: f32,
    pub height: f32,
}

impl BuildingSpawn {
    pub fn new(
        chunk: ChunkKey,
        index: usize,
        choice: StyleChoice,
        position: Vec3,
        footprint: f32,
        height: f32,
    ) -> Self {
        Self {
            chunk,
            index,
            style: choice.style,
            visual: choice.visual,
            position,
            scale: choice.scale,
            footprint,
            height,
        }
    }

    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.visual == BuildingVisual::Placeholder
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParkingSlot {
    pub position: Vec3,
    /// Unit direction of the road at the slot.
    pub road_direction: Vec3,
    /// Rotation about +y, degrees; slots sit crosswise to the road.
    pub yaw_deg: f32,
}

/// The scene the generator materializes into.
///
/// Every `create_chunk` is matched by exactly one `destroy_chunk` of the returned
/// handle before the same chunk is created again.
pub trait SceneHost {
    fn create_chunk(&mut self, key: ChunkKey) -> ChunkHandle;
    fn destroy_chunk(&mut self, handle: ChunkHandle);
    fn spawn_river(&mut self, chunk: ChunkHandle, mesh: &RibbonMesh);
    fn spawn_building(&mut self, chunk: ChunkHandle, building: &BuildingSpawn);

    /// The one road mesh; also used as its collision surface.
    fn build_road_network(&mut self, network: &RoadNetwork);
    fn destroy_road_network(&mut self);

    fn spawn_parking(&mut self, slot: &ParkingSlot);
    fn clear_parking(&mut self);

    fn spawn_landmark(&mut self, name: &str, position: Vec3);
    fn clear_landmarks(&mut self);

    /// Nearest walkable surface below `pos` from the host's own colliders.
    fn surface_below(&self, _pos: Vec3) -> Option<f32> {
        None
    }

    /// Whether a spawned building occupies `pos`.
    fn is_building_at(&self, _pos: Vec3) -> bool {
        false
    }
}

/// Host surface first, terrain when the host reports nothing.
pub struct HostSurface<'a, H: ?Sized, T: ?Sized> {
    pub host: &'a H,
    pub terrain: &'a T,
}

impl<'a, H: ?Sized, T: ?Sized> HostSurface<'a, H, T> {
    pub fn new(host: &'a H, terrain: &'a T) -> Self {
        Self { host, terrain }
    }
}

impl<H: SceneHost + ?Sized, T: TerrainBackend + ?Sized> SurfaceQuery for HostSurface<'_, H, T> {
    fn surface_below(&self, pos: Vec3) -> Option<f32> {
        self.host
            .surface_below(pos)
            .or_else(|| TerrainSurface(self.terrain).surface_below(pos))
    }
}
