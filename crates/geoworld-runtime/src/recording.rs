use geoworld_chunk::ChunkHandle;
use geoworld_geom::Vec3;
use geoworld_mesh::{RibbonMesh, RoadNetwork};
use geoworld_world::ChunkKey;
use hashbrown::HashMap;

use crate::host::{BuildingSpawn, ParkingSlot, SceneHost};

/// Everything a live chunk container holds.
#[derive(Clone, Debug, Default)]
pub struct ChunkContents {
    pub key: ChunkKey,
    pub rivers: usize,
    pub buildings: Vec<BuildingSpawn>,
}

/// In-memory scene that keeps what was materialized and counts every call.
#[derive(Debug, Default)]
pub struct RecordingSceneHost {
    next_handle: u64,
    live: HashMap<ChunkHandle, ChunkContents>,
    pub creates: HashMap<ChunkKey, u32>,
    pub destroys: HashMap<ChunkKey, u32>,
    /// Calls on handles that were not live.
    pub stray_calls: u32,
    pub road: Option<RoadNetwork>,
    pub road_builds: u32,
    pub parking: Vec<ParkingSlot>,
    pub landmarks: Vec<(String, Vec3)>,
}

impl RecordingSceneHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_chunks(&self) -> usize {
        self.live.len()
    }

    pub fn live_keys(&self) -> Vec<ChunkKey> {
        let mut keys: Vec<ChunkKey> = self.live.values().map(|c| c.key).collect();
        keys.sort();
        keys
    }

    pub fn contents(&self, key: ChunkKey) -> Option<&ChunkContents> {
        self.live.values().find(|c| c.key == key)
    }

    pub fn live_buildings(&self) -> usize {
        self.live.values().map(|c| c.buildings.len()).sum()
    }

    pub fn live_rivers(&self) -> usize {
        self.live.values().map(|c| c.rivers).sum()
    }
}

impl SceneHost for RecordingSceneHost {
    fn create_chunk(&mut self, key: ChunkKey) -> ChunkHandle {
        self.next_handle += 1;
        let handle = ChunkHandle(self.next_handle);
        self.live.insert(
            handle,
            ChunkContents {
                key,
                ..ChunkContents::default()
            },
        );
        *self.creates.entry(key).or_insert(0) += 1;
        handle
    }

    fn destroy_chunk(&mut self, handle: ChunkHandle) {
        match self.live.remove(&handle) {
            Some(c) => *self.destroys.entry(c.key).or_insert(0) += 1,
            None => self.stray_calls += 1,
        }
    }

    fn spawn_river(&mut self, chunk: ChunkHandle, _mesh: &RibbonMesh) {
        match self.live.get_mut(&chunk) {
            Some(c) => c.rivers += 1,
            None => self.stray_calls += 1,
        }
    }

    fn spawn_building(&mut self, chunk: ChunkHandle, building: &BuildingSpawn) {
        match self.live.get_mut(&chunk) {
            Some(c) => c.buildings.push(building.clone()),
            None => self.stray_calls += 1,
        }
    }

    fn build_road_network(&mut self, network: &RoadNetwork) {
        self.road = Some(network.clone());
        self.road_builds += 1;
    }

    fn destroy_road_network(&mut self) {
        self.road = None;
    }

    fn spawn_parking(&mut self, slot: &ParkingSlot) {
        self.parking.push(*slot);
    }

    fn clear_parking(&mut self) {
        self.parking.clear();
    }

    fn spawn_landmark(&mut self, name: &str, position: Vec3) {
        self.landmarks.push((name.to_string(), position));
    }

    fn clear_landmarks(&mut self) {
        self.landmarks.clear();
    }

    /// Live buildings count as squares of their footprint.
    fn is_building_at(&self, pos: Vec3) -> bool {
        self.live.values().flat_map(|c| &c.buildings).any(|b| {
            let half = b.footprint * 0.5;
            (pos.x - b.position.x).abs() <= half && (pos.z - b.position.z).abs() <= half
        })
    }
}
