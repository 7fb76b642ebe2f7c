//! Chunk records and the spatial hash grid that owns them.
#![forbid(unsafe_code)]

use geoworld_geom::{Vec2, Vec3};
use geoworld_world::ChunkKey;
use hashbrown::{HashMap, HashSet};

pub const MIN_FOOTPRINT: f32 = 4.0;
pub const MAX_FOOTPRINT: f32 = 14.0;

/// Opaque id of content materialized by the scene host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkHandle(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub struct BuildingRecord {
    polygon: Vec<Vec3>,
    centroid: Vec3,
    footprint: f32,
    height: f32,
}

impl BuildingRecord {
    /// `None` for fewer than three vertices. Footprint is the mean planar
    /// vertex distance from the centroid, clamped to [4, 14].
    pub fn from_polygon(polygon: Vec<Vec3>, height: f32) -> Option<Self> {
        if polygon.len() < 3 {
            return None;
        }
        let n = polygon.len() as f32;
        let mut c = Vec3::ZERO;
        for p in &polygon {
            c += *p;
        }
        let centroid = (c / n).with_y(0.0);
        let avg = polygon.iter().map(|p| p.distance_xz(centroid)).sum::<f32>() / n;
        Some(Self {
            polygon,
            centroid,
            footprint: avg.clamp(MIN_FOOTPRINT, MAX_FOOTPRINT),
            height,
        })
    }

    #[inline]
    pub fn polygon(&self) -> &[Vec3] {
        &self.polygon
    }

    /// Vertex average on the ground plane (y = 0).
    #[inline]
    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    #[inline]
    pub fn footprint(&self) -> f32 {
        self.footprint
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// First vertex; decides which chunk owns the building.
    #[inline]
    pub fn anchor(&self) -> Vec3 {
        self.polygon[0]
    }
}

#[derive(Clone, Debug, Default)]
pub struct ChunkRecord {
    pub river_segments: Vec<Vec<Vec3>>,
    pub buildings: Vec<BuildingRecord>,
    pub materialized: Option<ChunkHandle>,
}

impl ChunkRecord {
    #[inline]
    pub fn is_materialized(&self) -> bool {
        self.materialized.is_some()
    }

    /// Appends unless the chunk already holds `cap` buildings.
    pub fn push_building(&mut self, b: BuildingRecord, cap: usize) -> bool {
        if self.buildings.len() >= cap {
            return false;
        }
        self.buildings.push(b);
        true
    }
}

/// Hash grid of chunk records. Only chunks that received data exist.
#[derive(Debug)]
pub struct SpatialChunkIndex {
    chunk_size: f32,
    origin: Vec2,
    chunks: HashMap<ChunkKey, ChunkRecord>,
}

impl SpatialChunkIndex {
    pub fn new(chunk_size: f32, origin: Vec2) -> Self {
        Self {
            chunk_size,
            origin,
            chunks: HashMap::new(),
        }
    }

    #[inline]
    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn chunk_of(&self, pos: Vec3) -> ChunkKey {
        ChunkKey::containing(pos, self.origin, self.chunk_size)
    }

    pub fn get_or_create(&mut self, key: ChunkKey) -> &mut ChunkRecord {
        self.chunks.entry(key).or_default()
    }

    #[inline]
    pub fn get(&self, key: ChunkKey) -> Option<&ChunkRecord> {
        self.chunks.get(&key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: ChunkKey) -> Option<&mut ChunkRecord> {
        self.chunks.get_mut(&key)
    }

    #[inline]
    pub fn contains(&self, key: ChunkKey) -> bool {
        self.chunks.contains_key(&key)
    }

    /// Present keys within Chebyshev distance `radius` of `center`, inclusive.
    pub fn neighborhood(&self, center: ChunkKey, radius: i32) -> HashSet<ChunkKey> {
        let mut out = HashSet::new();
        if radius < 0 {
            return out;
        }
        let side = (2 * i64::from(radius) + 1).pow(2);
        if side as usize > self.chunks.len() {
            // sparse index: filter stored keys instead of walking the square
            out.extend(
                self.chunks
                    .keys()
                    .copied()
                    .filter(|k| k.chebyshev(center) <= radius),
            );
            return out;
        }
        for dz in -radius..=radius {
            for dx in -radius..=radius {
                let k = center.offset(dx, dz);
                if self.chunks.contains_key(&k) {
                    out.insert(k);
                }
            }
        }
        out
    }

    /// Files a polyline under the chunk of its first point.
    pub fn insert_river(&mut self, polyline: Vec<Vec3>) -> Option<ChunkKey> {
        let first = *polyline.first()?;
        let key = self.chunk_of(first);
        self.get_or_create(key).river_segments.push(polyline);
        Some(key)
    }

    /// Files a building under the chunk of its first vertex, honouring the per-chunk cap.
    pub fn insert_building(&mut self, b: BuildingRecord, per_chunk_cap: usize) -> bool {
        let key = self.chunk_of(b.anchor());
        self.get_or_create(key).push_building(b, per_chunk_cap)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = ChunkKey> + '_ {
        self.chunks.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChunkKey, &ChunkRecord)> + '_ {
        self.chunks.iter().map(|(k, v)| (*k, v))
    }

    pub fn total_buildings(&self) -> usize {
        self.chunks.values().map(|c| c.buildings.len()).sum()
    }

    pub fn total_rivers(&self) -> usize {
        self.chunks.values().map(|c| c.river_segments.len()).sum()
    }

    /// Keys currently holding a materialized handle.
    pub fn materialized_keys(&self) -> Vec<ChunkKey> {
        self.chunks
            .iter()
            .filter(|(_, c)| c.is_materialized())
            .map(|(k, _)| *k)
            .collect()
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }
}
