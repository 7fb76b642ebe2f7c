//! Tick-driven generation pipeline.
//!
//! Phases run strictly in order: bounds, ingest, wait for terrain, terrain
//! edits, road mesh, parking, completion, landmarks, then streaming for the
//! rest of the run. Each `tick` advances at most one phase step so the host
//! frame never stalls on a whole dataset.

use geoworld_chunk::SpatialChunkIndex;
use geoworld_geom::{Vec2, Vec3};
use geoworld_io::{
    BridgeCorridor, FeatureIngestor, IngestSettings, IngestSources, IngestStats, StepOutcome,
    park_centers,
};
use geoworld_mesh::{RoadNetwork, RoadNetworkBuilder};
use geoworld_runtime::{
    ChunkStreamer, ExclusionRegistry, HostSurface, ParkingPlanner, PlacementParams,
    PlacementSolver, SceneHost, StreamContext, StreamSettings, StyleTable,
};
use geoworld_terrain::{HeightBands, TerrainBackend, TerrainRasterEditor, snap_to_surface};
use geoworld_world::{CoordinateMapper, GenConfig, GenError};
use serde::Serialize;

use crate::completion::CompletionSignal;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GenPhase {
    Idle,
    Bounds,
    Ingest,
    WaitTerrain,
    TerrainEdits,
    Roads,
    Parking,
    Complete,
    Landmarks,
    Streaming,
    Failed,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GenStatus {
    Idle,
    Running {
        phase: GenPhase,
        /// Features ingested so far and the total, once ingestion started.
        progress: Option<(usize, usize)>,
    },
    Streaming,
    Failed(String),
}

/// Snapshot handed to completion subscribers.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GenerationSummary {
    pub chunks: usize,
    pub buildings: usize,
    pub rivers: usize,
    pub roads: usize,
    pub road_points: usize,
    pub bridges: usize,
    pub parking_slots: usize,
    pub exclusion_zones: usize,
}

enum InputSource {
    Files,
    Preloaded(IngestSources),
}

pub struct WorldGenerator {
    config: GenConfig,
    inputs: InputSource,
    phase: GenPhase,
    run: u64,
    regenerate: bool,
    failure: Option<String>,
    mapper: Option<CoordinateMapper>,
    ingestor: Option<FeatureIngestor>,
    progress: Option<(usize, usize)>,
    index: SpatialChunkIndex,
    roads: Vec<Vec<Vec3>>,
    bridges: Vec<BridgeCorridor>,
    ingest_stats: IngestStats,
    road: Option<RoadNetwork>,
    parking_slots: usize,
    landmarks_placed: usize,
    zones: ExclusionRegistry,
    streamer: ChunkStreamer,
    completion: CompletionSignal<GenerationSummary>,
    terrain_wait: f32,
}

impl WorldGenerator {
    /// Inputs are read from the paths in `config.inputs` at the start of every run.
    pub fn new(config: GenConfig) -> Self {
        Self::build(config, InputSource::Files)
    }

    /// Inputs already decoded; each run ingests a copy.
    pub fn with_sources(config: GenConfig, sources: IngestSources) -> Self {
        Self::build(config, InputSource::Preloaded(sources))
    }

    fn build(config: GenConfig, inputs: InputSource) -> Self {
        let streamer = Self::make_streamer(&config);
        Self {
            index: SpatialChunkIndex::new(config.chunks.size, Vec2::ZERO),
            config,
            inputs,
            phase: GenPhase::Idle,
            run: 0,
            regenerate: false,
            failure: None,
            mapper: None,
            ingestor: None,
            progress: None,
            roads: Vec::new(),
            bridges: Vec::new(),
            ingest_stats: IngestStats::default(),
            road: None,
            parking_slots: 0,
            landmarks_placed: 0,
            zones: ExclusionRegistry::new(),
            streamer,
            completion: CompletionSignal::new(),
            terrain_wait: 0.0,
        }
    }

    fn make_streamer(config: &GenConfig) -> ChunkStreamer {
        ChunkStreamer::new(
            StreamSettings::from_config(config),
            StyleTable::from_config(&config.building_rules),
        )
    }

    pub fn config(&self) -> &GenConfig {
        &self.config
    }

    /// Swap the configuration; takes effect on the next regeneration.
    pub fn set_config(&mut self, config: GenConfig) {
        self.config = config;
    }

    #[inline]
    pub fn phase(&self) -> GenPhase {
        self.phase
    }

    /// Runs started so far, counting regenerations.
    #[inline]
    pub fn run(&self) -> u64 {
        self.run
    }

    pub fn status(&self) -> GenStatus {
        match self.phase {
            GenPhase::Idle => GenStatus::Idle,
            GenPhase::Streaming => GenStatus::Streaming,
            GenPhase::Failed => GenStatus::Failed(self.failure.clone().unwrap_or_default()),
            phase => GenStatus::Running {
                phase,
                progress: self.progress,
            },
        }
    }

    /// Begin a run. Calling it again while a run is active does nothing.
    pub fn start_generation(&mut self) -> bool {
        match self.phase {
            GenPhase::Idle | GenPhase::Failed => {
                self.begin_run();
                true
            }
            _ => {
                log::debug!(target: "gen", "start_generation ignored; run {} is active", self.run);
                false
            }
        }
    }

    /// Tear down and start over at the next tick boundary.
    pub fn request_regeneration(&mut self) {
        self.regenerate = true;
    }

    pub fn geo_to_world(&self, lat: f64, lon: f64) -> Option<Vec3> {
        self.mapper.map(|m| m.geo_to_world(lat, lon))
    }

    /// Zone contributed by an external spawner. Lives until the next regeneration.
    pub fn register_exclusion_zone(&mut self, center: Vec2, radius: f32) -> bool {
        self.zones.register(center, radius, "external")
    }

    pub fn on_generation_complete(&mut self, f: impl FnOnce(&GenerationSummary) + 'static) {
        self.completion.subscribe(f);
    }

    pub fn summary(&self) -> Option<&GenerationSummary> {
        self.completion.value()
    }

    pub fn index(&self) -> &SpatialChunkIndex {
        &self.index
    }

    pub fn zones(&self) -> &ExclusionRegistry {
        &self.zones
    }

    pub fn road_network(&self) -> Option<&RoadNetwork> {
        self.road.as_ref()
    }

    pub fn bridges(&self) -> &[BridgeCorridor] {
        &self.bridges
    }

    pub fn ingest_stats(&self) -> IngestStats {
        self.ingest_stats
    }

    pub fn streamer(&self) -> &ChunkStreamer {
        &self.streamer
    }

    pub fn landmarks_placed(&self) -> usize {
        self.landmarks_placed
    }

    fn begin_run(&mut self) {
        self.run += 1;
        self.phase = GenPhase::Bounds;
        self.failure = None;
        self.terrain_wait = 0.0;
        log::info!(target: "gen", "generation run {} started", self.run);
    }

    /// Advance the pipeline by one step. `reference` drives streaming once it
    /// has started. A fatal error is returned once, the world is left empty and
    /// [`status`](Self::status) keeps reporting it.
    pub fn tick<T, H>(&mut self, dt: f32, reference: Vec3, terrain: &mut T, host: &mut H) -> Result<GenPhase, GenError>
    where
        T: TerrainBackend + ?Sized,
        H: SceneHost + ?Sized,
    {
        if self.regenerate {
            self.regenerate = false;
            log::info!(target: "gen", "regeneration requested");
            self.teardown(&*terrain, host);
            self.begin_run();
        }
        match self.step(dt, reference, terrain, host) {
            Ok(()) => Ok(self.phase),
            Err(e) => {
                log::error!(target: "gen", "generation failed: {}", e);
                self.teardown(&*terrain, host);
                self.failure = Some(e.to_string());
                self.phase = GenPhase::Failed;
                Err(e)
            }
        }
    }

    fn step<T, H>(&mut self, dt: f32, reference: Vec3, terrain: &mut T, host: &mut H) -> Result<(), GenError>
    where
        T: TerrainBackend + ?Sized,
        H: SceneHost + ?Sized,
    {
        match self.phase {
            GenPhase::Idle | GenPhase::Failed => {}
            GenPhase::Bounds => {
                self.prepare_run(&*terrain)?;
                self.phase = GenPhase::Ingest;
            }
            GenPhase::Ingest => {
                let Some(ing) = self.ingestor.as_mut() else {
                    self.phase = GenPhase::WaitTerrain;
                    return Ok(());
                };
                match ing.step(&*terrain)? {
                    StepOutcome::Yielded { processed, total } => {
                        self.progress = Some((processed, total));
                        log::debug!(target: "ingest", "{}/{} features", processed, total);
                    }
                    StepOutcome::Done => {
                        if let Some(ing) = self.ingestor.take() {
                            let out = ing.into_output();
                            self.progress = Some((out.stats.processed, out.stats.processed));
                            self.index = out.index;
                            self.roads = out.roads;
                            self.bridges = out.bridges;
                            self.ingest_stats = out.stats;
                        }
                        self.phase = GenPhase::WaitTerrain;
                    }
                }
            }
            GenPhase::WaitTerrain => {
                if terrain.is_ready() {
                    self.phase = GenPhase::TerrainEdits;
                } else {
                    self.terrain_wait += dt;
                    if self.terrain_wait >= self.config.terrain.ready_timeout_secs {
                        log::warn!(
                            target: "terrain",
                            "terrain not ready after {:.1}s; editing anyway",
                            self.terrain_wait
                        );
                        self.phase = GenPhase::TerrainEdits;
                    }
                }
            }
            GenPhase::TerrainEdits => {
                self.edit_terrain(terrain)?;
                self.phase = GenPhase::Roads;
            }
            GenPhase::Roads => {
                let builder = RoadNetworkBuilder::from_config(&self.config.roads);
                match builder.build(&self.roads, &*terrain) {
                    Some(net) => {
                        host.build_road_network(&net);
                        self.road = Some(net);
                    }
                    None => log::info!(target: "roads", "no road polylines; skipping road mesh"),
                }
                self.phase = GenPhase::Parking;
            }
            GenPhase::Parking => {
                self.plan_parking(&*terrain, host);
                self.phase = GenPhase::Complete;
            }
            GenPhase::Complete => {
                let summary = self.make_summary();
                log::info!(
                    target: "gen",
                    "generation complete: {} chunks, {} buildings, {} road points, {} parking slots",
                    summary.chunks,
                    summary.buildings,
                    summary.road_points,
                    summary.parking_slots
                );
                self.completion.fire(summary);
                self.phase = GenPhase::Landmarks;
            }
            GenPhase::Landmarks => {
                self.place_landmarks(&*terrain, host);
                self.phase = GenPhase::Streaming;
            }
            GenPhase::Streaming => {
                let mut ctx = StreamContext {
                    index: &mut self.index,
                    terrain: &*terrain,
                    host,
                    zones: &self.zones,
                };
                self.streamer.tick(dt, reference, &mut ctx);
            }
        }
        Ok(())
    }

    fn prepare_run<T: TerrainBackend + ?Sized>(&mut self, terrain: &T) -> Result<(), GenError> {
        self.config.validate()?;
        let layout = terrain
            .layout()
            .filter(|l| l.is_valid())
            .ok_or(GenError::MissingTerrain)?;
        let sources = match &self.inputs {
            InputSource::Files => IngestSources::load(&self.config.inputs)?,
            InputSource::Preloaded(s) => s.clone(),
        };
        let bounds = sources.bounds()?;
        let mapper = CoordinateMapper::new(bounds, layout.origin_xz(), layout.size_xz())?;
        log::info!(
            target: "gen",
            "bounds lat [{:.6}, {:.6}] lon [{:.6}, {:.6}] over {} features",
            bounds.min_lat,
            bounds.max_lat,
            bounds.min_lon,
            bounds.max_lon,
            sources.total_features()
        );

        for z in &self.config.exclusion_zones {
            let center = mapper.geo_to_world(z.lat, z.lon).xz();
            let radius = z.radius.unwrap_or(self.config.placement.stadium_exclusion_radius);
            self.zones.register(center, radius, z.category.clone());
        }
        if let Some(landuse) = &sources.landuse {
            let p = &self.config.placement;
            for center in park_centers(landuse, &mapper, p.park_min_area)? {
                self.zones.register(center, p.park_exclusion_radius, "park");
            }
        }

        self.streamer = Self::make_streamer(&self.config);
        let index = SpatialChunkIndex::new(self.config.chunks.size, layout.origin_xz());
        self.ingestor = Some(FeatureIngestor::new(
            sources,
            mapper,
            IngestSettings::from_config(&self.config),
            index,
        ));
        self.mapper = Some(mapper);
        Ok(())
    }

    fn edit_terrain<T: TerrainBackend + ?Sized>(&mut self, terrain: &mut T) -> Result<(), GenError> {
        let mut editor = TerrainRasterEditor::new(terrain)?;
        if self.config.terrain.paint_height_bands {
            editor.paint_height_bands(&HeightBands::from_config(&self.config.terrain));
        }
        let b = &self.config.bridges;
        for c in &self.bridges {
            editor.paint_along_segment(c.entry, c.exit, b.paint_radius, b.paint_strength, b.splat_index);
            editor.raise_along_segment(c.entry, c.exit, b.raise_radius, b.raise_height, b.raise_falloff);
        }
        log::info!(target: "terrain", "{} bridge corridors applied", self.bridges.len());
        Ok(())
    }

    fn plan_parking<T, H>(&mut self, terrain: &T, host: &mut H)
    where
        T: TerrainBackend + ?Sized,
        H: SceneHost + ?Sized,
    {
        if !self.config.parking.enable {
            return;
        }
        let Some(net) = &self.road else {
            return;
        };
        let slots = {
            let surface = HostSurface::new(&*host, terrain);
            ParkingPlanner::from_config(&self.config.parking).plan(&net.mesh, &surface, &self.zones)
        };
        for s in &slots {
            host.spawn_parking(s);
        }
        self.parking_slots = slots.len();
    }

    fn place_landmarks<T, H>(&mut self, terrain: &T, host: &mut H)
    where
        T: TerrainBackend + ?Sized,
        H: SceneHost + ?Sized,
    {
        let Some(mapper) = self.mapper else {
            return;
        };
        let params = PlacementParams::landmark(&self.config.placement);
        let placed: Vec<(String, Option<Vec3>)> = {
            let surface = HostSurface::new(&*host, terrain);
            let solver = PlacementSolver::new(&self.zones, params);
            self.config
                .landmarks
                .iter()
                .map(|l| {
                    let candidate = snap_to_surface(&surface, mapper.geo_to_world(l.lat, l.lon), 0.0);
                    let pos = solver.place_avoiding(candidate, &surface, |p| host.is_building_at(p));
                    (l.name.clone(), pos)
                })
                .collect()
        };
        self.landmarks_placed = 0;
        for (name, pos) in placed {
            match pos {
                Some(p) => {
                    host.spawn_landmark(&name, p);
                    self.landmarks_placed += 1;
                    log::info!(target: "gen", "landmark '{}' at ({:.1}, {:.1}, {:.1})", name, p.x, p.y, p.z);
                }
                None => log::warn!(target: "gen", "no free spot for landmark '{}'; omitted", name),
            }
        }
    }

    fn make_summary(&self) -> GenerationSummary {
        GenerationSummary {
            chunks: self.index.len(),
            buildings: self.index.total_buildings(),
            rivers: self.index.total_rivers(),
            roads: self.roads.len(),
            road_points: self.road.as_ref().map_or(0, |r| r.centerline.len()),
            bridges: self.bridges.len(),
            parking_slots: self.parking_slots,
            exclusion_zones: self.zones.len(),
        }
    }

    /// Remove everything this run put into the scene and forget the run's data.
    fn teardown<T, H>(&mut self, terrain: &T, host: &mut H)
    where
        T: TerrainBackend + ?Sized,
        H: SceneHost + ?Sized,
    {
        {
            let mut ctx = StreamContext {
                index: &mut self.index,
                terrain,
                host: &mut *host,
                zones: &self.zones,
            };
            self.streamer.unload_all(&mut ctx);
        }
        if self.road.take().is_some() {
            host.destroy_road_network();
        }
        if self.parking_slots > 0 {
            host.clear_parking();
            self.parking_slots = 0;
        }
        if self.landmarks_placed > 0 {
            host.clear_landmarks();
            self.landmarks_placed = 0;
        }
        self.zones.clear();
        self.index.clear();
        self.ingestor = None;
        self.mapper = None;
        self.progress = None;
        self.roads.clear();
        self.bridges.clear();
        self.ingest_stats = IngestStats::default();
        self.completion.reset();
    }
}
