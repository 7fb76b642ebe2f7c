//! Chunk streaming around a moving reference point.
//!
//! Chunks inside the Chebyshev load square are materialized; a chunk leaves once
//! it is outside the square and its Euclidean chunk distance exceeds
//! `load_radius + 1`. Rivers are built when a chunk loads, buildings trickle in
//! through a [`BudgetQueue`] a few per tick.

use geoworld_chunk::SpatialChunkIndex;
use geoworld_geom::Vec3;
use geoworld_mesh::build_river_mesh;
use geoworld_terrain::{SurfaceQuery, TerrainBackend, snap_to_surface};
use geoworld_world::config::Rivers;
use geoworld_world::{ChunkKey, GenConfig};
use hashbrown::HashMap;

use crate::exclusion::ExclusionRegistry;
use crate::host::{BuildingSpawn, HostSurface, SceneHost};
use crate::placement::{PlacementParams, PlacementSolver};
use crate::queue::BudgetQueue;
use crate::style::StyleTable;

/// Building bases sit this far below the surface.
pub const BUILDING_SINK: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// Container and rivers exist; buildings still queued.
    Loading,
    Loaded,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub scans: u64,
    pub created: u64,
    pub destroyed: u64,
    pub rivers: u64,
    pub buildings: u64,
    pub placeholders: u64,
    pub omitted: u64,
    pub dropped_tasks: u64,
}

#[derive(Clone, Debug)]
pub struct StreamSettings {
    pub load_radius: i32,
    pub interval_secs: f32,
    pub buildings_per_tick: usize,
    /// Seeds per-building style picks.
    pub seed: u64,
    pub rivers: Rivers,
    pub placement: PlacementParams,
}

impl StreamSettings {
    pub fn from_config(cfg: &GenConfig) -> Self {
        Self {
            load_radius: cfg.chunks.load_radius,
            interval_secs: cfg.chunks.stream_interval_secs,
            buildings_per_tick: cfg.chunks.buildings_per_tick.max(1),
            seed: cfg.ingest.seed,
            rivers: cfg.rivers.clone(),
            placement: PlacementParams::from_config(&cfg.placement),
        }
    }
}

/// Everything a streaming tick reads or writes outside the streamer itself.
pub struct StreamContext<'a, T: ?Sized, H: ?Sized> {
    pub index: &'a mut SpatialChunkIndex,
    pub terrain: &'a T,
    pub host: &'a mut H,
    pub zones: &'a ExclusionRegistry,
}

pub struct ChunkStreamer {
    settings: StreamSettings,
    styles: StyleTable,
    states: HashMap<ChunkKey, ChunkState>,
    queue: BudgetQueue<usize>,
    since_scan: Option<f32>,
    center: Option<ChunkKey>,
    stats: StreamStats,
}

impl ChunkStreamer {
    pub fn new(settings: StreamSettings, styles: StyleTable) -> Self {
        Self {
            settings,
            styles,
            states: HashMap::new(),
            queue: BudgetQueue::new(),
            since_scan: None,
            center: None,
            stats: StreamStats::default(),
        }
    }

    #[inline]
    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }

    #[inline]
    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    #[inline]
    pub fn state(&self, key: ChunkKey) -> Option<ChunkState> {
        self.states.get(&key).copied()
    }

    /// Reference chunk of the last scan.
    #[inline]
    pub fn center(&self) -> Option<ChunkKey> {
        self.center
    }

    pub fn active_keys(&self) -> Vec<ChunkKey> {
        let mut keys: Vec<ChunkKey> = self.states.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn active_count(&self) -> usize {
        self.states.len()
    }

    pub fn loaded_count(&self) -> usize {
        self.states
            .values()
            .filter(|s| **s == ChunkState::Loaded)
            .count()
    }

    #[inline]
    pub fn pending_tasks(&self) -> usize {
        self.queue.len()
    }

    /// Advance by `dt` seconds: rescan when due (the first call always scans),
    /// then spawn up to `buildings_per_tick` queued buildings.
    pub fn tick<T, H>(&mut self, dt: f32, reference: Vec3, ctx: &mut StreamContext<'_, T, H>)
    where
        T: TerrainBackend + ?Sized,
        H: SceneHost + ?Sized,
    {
        let due = match self.since_scan {
            None => true,
            Some(t) => t + dt >= self.settings.interval_secs,
        };
        if due {
            self.since_scan = Some(0.0);
            self.scan(reference, ctx);
        } else {
            self.since_scan = self.since_scan.map(|t| t + dt);
        }
        self.drain(ctx);
    }

    /// Recompute the window around `reference` immediately.
    pub fn scan<T, H>(&mut self, reference: Vec3, ctx: &mut StreamContext<'_, T, H>)
    where
        T: TerrainBackend + ?Sized,
        H: SceneHost + ?Sized,
    {
        self.stats.scans += 1;
        let center = ctx.index.chunk_of(reference);
        self.center = Some(center);
        let r = self.settings.load_radius;
        let desired = ctx.index.neighborhood(center, r);
        let limit = (i64::from(r) + 1) * (i64::from(r) + 1);

        let mut leaving: Vec<ChunkKey> = self
            .states
            .keys()
            .filter(|k| !desired.contains(*k) && center.distance_sq(**k) > limit)
            .copied()
            .collect();
        leaving.sort();
        for key in &leaving {
            self.unload(*key, ctx);
        }

        let mut entering: Vec<ChunkKey> = desired
            .into_iter()
            .filter(|k| !self.states.contains_key(k))
            .collect();
        entering.sort_by_key(|k| (center.distance_sq(*k), *k));
        for key in &entering {
            self.load(*key, ctx);
        }
        if !leaving.is_empty() || !entering.is_empty() {
            log::debug!(
                target: "stream",
                "center ({}, {}): +{} -{} chunks, {} active, {} buildings queued",
                center.cx,
                center.cz,
                entering.len(),
                leaving.len(),
                self.states.len(),
                self.queue.len()
            );
        }
    }

    /// Unload everything, e.g. before regenerating. Chunk data is kept.
    pub fn unload_all<T, H>(&mut self, ctx: &mut StreamContext<'_, T, H>)
    where
        T: TerrainBackend + ?Sized,
        H: SceneHost + ?Sized,
    {
        for key in self.active_keys() {
            self.unload(key, ctx);
        }
        self.queue.clear();
        self.since_scan = None;
        self.center = None;
    }

    fn load<T, H>(&mut self, key: ChunkKey, ctx: &mut StreamContext<'_, T, H>)
    where
        T: TerrainBackend + ?Sized,
        H: SceneHost + ?Sized,
    {
        let Some(rec) = ctx.index.get_mut(key) else {
            return;
        };
        if rec.is_materialized() {
            log::warn!(target: "stream", "chunk ({}, {}) already materialized", key.cx, key.cz);
            return;
        }
        let handle = ctx.host.create_chunk(key);
        rec.materialized = Some(handle);
        self.stats.created += 1;
        for seg in rec.river_segments.iter_mut() {
            if let Some(mesh) = build_river_mesh(seg, ctx.terrain, &self.settings.rivers) {
                ctx.host.spawn_river(handle, &mesh);
                self.stats.rivers += 1;
            }
        }
        let n = rec.buildings.len();
        for i in 0..n {
            self.queue.push(key, i);
        }
        let state = if n == 0 {
            ChunkState::Loaded
        } else {
            ChunkState::Loading
        };
        self.states.insert(key, state);
    }

    fn unload<T, H>(&mut self, key: ChunkKey, ctx: &mut StreamContext<'_, T, H>)
    where
        T: TerrainBackend + ?Sized,
        H: SceneHost + ?Sized,
    {
        self.states.remove(&key);
        self.stats.dropped_tasks += self.queue.drop_chunk(key) as u64;
        if let Some(handle) = ctx.index.get_mut(key).and_then(|r| r.materialized.take()) {
            ctx.host.destroy_chunk(handle);
            self.stats.destroyed += 1;
        }
    }

    fn drain<T, H>(&mut self, ctx: &mut StreamContext<'_, T, H>)
    where
        T: TerrainBackend + ?Sized,
        H: SceneHost + ?Sized,
    {
        let tasks = self.queue.drain(self.settings.buildings_per_tick);
        if tasks.is_empty() {
            return;
        }
        for t in &tasks {
            self.spawn_building(t.chunk, t.payload, ctx);
        }
        for t in &tasks {
            if self.queue.pending_for(t.chunk) == 0 {
                if let Some(s) = self.states.get_mut(&t.chunk) {
                    *s = ChunkState::Loaded;
                }
            }
        }
    }

    fn spawn_building<T, H>(&mut self, key: ChunkKey, i: usize, ctx: &mut StreamContext<'_, T, H>)
    where
        T: TerrainBackend + ?Sized,
        H: SceneHost + ?Sized,
    {
        let Some(rec) = ctx.index.get(key) else {
            return;
        };
        let (Some(handle), Some(b)) = (rec.materialized, rec.buildings.get(i)) else {
            return;
        };
        let spawn = {
            let surface = HostSurface::new(&*ctx.host, ctx.terrain);
            let poly = b.polygon();
            let avg_y = poly
                .iter()
                .map(|p| surface.surface_below(*p).unwrap_or(p.y))
                .sum::<f32>()
                / poly.len() as f32;
            let candidate = b.centroid().with_y(avg_y);
            let solver = PlacementSolver::new(ctx.zones, self.settings.placement);
            let Some(placed) = solver.place(candidate, &surface) else {
                log::debug!(
                    target: "stream",
                    "building {} of chunk ({}, {}) has no free spot; omitted",
                    i,
                    key.cx,
                    key.cz
                );
                self.stats.omitted += 1;
                return;
            };
            let base = snap_to_surface(&surface, placed, -BUILDING_SINK);
            let choice = self
                .styles
                .choose(self.settings.seed, key, i, b.height(), b.footprint());
            BuildingSpawn::new(key, i, choice, base, b.footprint(), b.height())
        };
        if spawn.is_placeholder() {
            self.stats.placeholders += 1;
        }
        ctx.host.spawn_building(handle, &spawn);
        self.stats.buildings += 1;
    }
}
