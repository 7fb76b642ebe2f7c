//! Resumable decoding of the input collections into chunked world geometry.

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use geoworld_chunk::{BuildingRecord, SpatialChunkIndex};
use geoworld_geom::Vec3;
use geoworld_mesh::subdivide_polyline;
use geoworld_terrain::{TerrainBackend, snap_to_terrain};
use geoworld_world::config::Inputs;
use geoworld_world::{CoordinateMapper, GenConfig, GenError, GeoBoundingBox};

use crate::bounds::compute_bounds;
use crate::bridges::BridgeCorridor;
use crate::geojson::{FeatureCollection, GeoPos, Shape};

pub const MIN_BUILDING_HEIGHT: f32 = 15.0;
pub const MAX_BUILDING_HEIGHT: f32 = 60.0;
/// Height above terrain for points snapped during ingestion.
pub const SNAP_OFFSET: f32 = 0.02;

/// A decoded input file and the name used in diagnostics.
#[derive(Clone, Debug)]
pub struct Source {
    pub name: String,
    pub collection: FeatureCollection,
}

impl Source {
    pub fn new(name: impl Into<String>, collection: FeatureCollection) -> Self {
        Self {
            name: name.into(),
            collection,
        }
    }

    fn load(category: &'static str, path: Option<&Path>) -> Result<Self, GenError> {
        let path = path.ok_or(GenError::MissingInput {
            category,
            path: None,
        })?;
        if !path.is_file() {
            return Err(GenError::MissingInput {
                category,
                path: Some(path.to_path_buf()),
            });
        }
        let collection = FeatureCollection::load(path)?;
        log::info!(
            target: "ingest",
            "loaded {} {} features from {}",
            collection.len(),
            category,
            path.display()
        );
        Ok(Self::new(path.display().to_string(), collection))
    }
}

#[derive(Clone, Debug)]
pub struct IngestSources {
    pub rivers: Source,
    pub buildings: Source,
    pub roads: Source,
    pub bridges: Option<Source>,
    /// Land-use polygons; green areas become park exclusion zones.
    pub landuse: Option<Source>,
}

impl IngestSources {
    /// Rivers, buildings and roads are required; bridges and land use are optional.
    pub fn load(inputs: &Inputs) -> Result<Self, GenError> {
        let rivers = Source::load("rivers", inputs.rivers.as_deref())?;
        let buildings = Source::load("buildings", inputs.buildings.as_deref())?;
        let roads = Source::load("roads", inputs.roads.as_deref())?;
        let bridges = match inputs.bridges.as_deref() {
            Some(p) => Some(Source::load("bridges", Some(p))?),
            None => {
                log::warn!(target: "ingest", "no bridges file configured; terrain corridors skipped");
                None
            }
        };
        let landuse = inputs
            .landuse
            .as_deref()
            .map(|p| Source::load("landuse", Some(p)))
            .transpose()?;
        Ok(Self {
            rivers,
            buildings,
            roads,
            bridges,
            landuse,
        })
    }

    /// Box over rivers, buildings and roads. Bridges and land use do not widen the map.
    pub fn bounds(&self) -> Result<GeoBoundingBox, GenError> {
        compute_bounds(
            [&self.rivers, &self.buildings, &self.roads]
                .map(|s| (s.name.as_str(), &s.collection)),
        )
    }

    pub fn total_features(&self) -> usize {
        self.rivers.collection.len()
            + self.buildings.collection.len()
            + self.roads.collection.len()
            + self.bridges.as_ref().map_or(0, |b| b.collection.len())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestPhase {
    Rivers,
    Buildings,
    Roads,
    Bridges,
    Done,
}

impl IngestPhase {
    fn next(self) -> Self {
        match self {
            IngestPhase::Rivers => IngestPhase::Buildings,
            IngestPhase::Buildings => IngestPhase::Roads,
            IngestPhase::Roads => IngestPhase::Bridges,
            IngestPhase::Bridges | IngestPhase::Done => IngestPhase::Done,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub processed: usize,
    pub rivers: usize,
    pub buildings: usize,
    pub buildings_skipped: usize,
    pub buildings_over_chunk_cap: usize,
    pub roads: usize,
    pub bridges: usize,
    pub ignored: usize,
}

#[derive(Clone, Copy, Debug)]
pub struct IngestSettings {
    pub batch_size: usize,
    pub spawn_probability: f32,
    pub max_total_buildings: usize,
    pub max_total_roads: usize,
    pub max_buildings_per_chunk: usize,
    pub subdivide_step: f32,
    pub seed: u64,
}

impl IngestSettings {
    pub fn from_config(cfg: &GenConfig) -> Self {
        Self {
            batch_size: cfg.ingest.batch_size.max(1),
            spawn_probability: cfg.ingest.building_spawn_probability,
            max_total_buildings: cfg.ingest.max_total_buildings,
            max_total_roads: cfg.ingest.max_total_roads,
            max_buildings_per_chunk: cfg.chunks.max_buildings_per_chunk,
            subdivide_step: cfg.ingest.subdivide_step,
            seed: cfg.ingest.seed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Batch quantum used up; call `step` again next tick.
    Yielded { processed: usize, total: usize },
    Done,
}

#[derive(Debug)]
pub struct IngestOutput {
    pub index: SpatialChunkIndex,
    pub roads: Vec<Vec<Vec3>>,
    pub bridges: Vec<BridgeCorridor>,
    pub stats: IngestStats,
}

/// Walks rivers, then buildings, then roads, then bridges, `batch_size`
/// features per `step`. A feature is applied entirely within one step.
pub struct FeatureIngestor {
    sources: IngestSources,
    mapper: CoordinateMapper,
    settings: IngestSettings,
    rng: StdRng,
    phase: IngestPhase,
    cursor: usize,
    index: SpatialChunkIndex,
    roads: Vec<Vec<Vec3>>,
    bridges: Vec<BridgeCorridor>,
    stats: IngestStats,
}

impl FeatureIngestor {
    pub fn new(
        sources: IngestSources,
        mapper: CoordinateMapper,
        settings: IngestSettings,
        index: SpatialChunkIndex,
    ) -> Self {
        let rng = if settings.seed == 0 {
            StdRng::from_entropy()
        } else {
            StdRng::seed_from_u64(settings.seed)
        };
        Self {
            sources,
            mapper,
            settings,
            rng,
            phase: IngestPhase::Rivers,
            cursor: 0,
            index,
            roads: Vec::new(),
            bridges: Vec::new(),
            stats: IngestStats::default(),
        }
    }

    #[inline]
    pub fn phase(&self) -> IngestPhase {
        self.phase
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.phase == IngestPhase::Done
    }

    #[inline]
    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    /// Chunk data ingested so far.
    #[inline]
    pub fn index(&self) -> &SpatialChunkIndex {
        &self.index
    }

    #[inline]
    pub fn roads(&self) -> &[Vec<Vec3>] {
        &self.roads
    }

    fn current(&self) -> Option<&Source> {
        match self.phase {
            IngestPhase::Rivers => Some(&self.sources.rivers),
            IngestPhase::Buildings => Some(&self.sources.buildings),
            IngestPhase::Roads => Some(&self.sources.roads),
            IngestPhase::Bridges => self.sources.bridges.as_ref(),
            IngestPhase::Done => None,
        }
    }

    fn advance_phase(&mut self) {
        log::debug!(target: "ingest", "{:?} finished at feature {}", self.phase, self.cursor);
        self.phase = self.phase.next();
        self.cursor = 0;
    }

    fn category_capped(&self) -> bool {
        match self.phase {
            IngestPhase::Buildings => self.stats.buildings >= self.settings.max_total_buildings,
            IngestPhase::Roads => self.stats.roads >= self.settings.max_total_roads,
            _ => false,
        }
    }

    /// Process up to one batch of features.
    pub fn step<T: TerrainBackend + ?Sized>(&mut self, terrain: &T) -> Result<StepOutcome, GenError> {
        let mut budget = self.settings.batch_size;
        while budget > 0 {
            if self.phase == IngestPhase::Done {
                break;
            }
            let Some(len) = self.current().map(|s| s.collection.len()) else {
                self.advance_phase();
                continue;
            };
            if self.cursor >= len {
                self.advance_phase();
                continue;
            }
            if self.category_capped() {
                log::info!(target: "ingest", "{:?}: global cap reached, skipping the rest", self.phase);
                self.advance_phase();
                continue;
            }
            self.ingest_one(terrain)?;
            self.cursor += 1;
            self.stats.processed += 1;
            budget -= 1;
        }
        if self.is_done() {
            let s = &self.stats;
            log::info!(
                target: "ingest",
                "ingestion done: {} rivers, {} buildings ({} skipped), {} roads, {} bridges, {} chunks",
                s.rivers,
                s.buildings,
                s.buildings_skipped,
                s.roads,
                s.bridges,
                self.index.len()
            );
            Ok(StepOutcome::Done)
        } else {
            Ok(StepOutcome::Yielded {
                processed: self.stats.processed,
                total: self.sources.total_features(),
            })
        }
    }

    /// Steps until done; for callers that do not need to yield.
    pub fn run_to_end<T: TerrainBackend + ?Sized>(&mut self, terrain: &T) -> Result<(), GenError> {
        while self.step(terrain)? != StepOutcome::Done {}
        Ok(())
    }

    pub fn into_output(self) -> IngestOutput {
        IngestOutput {
            index: self.index,
            roads: self.roads,
            bridges: self.bridges,
            stats: self.stats,
        }
    }

    fn ingest_one<T: TerrainBackend + ?Sized>(&mut self, terrain: &T) -> Result<(), GenError> {
        let accept: &[&str] = match self.phase {
            IngestPhase::Rivers | IngestPhase::Roads => &["LineString"],
            IngestPhase::Buildings => &["Polygon"],
            IngestPhase::Bridges => &["Polygon", "MultiPolygon"],
            IngestPhase::Done => return Ok(()),
        };
        let shape = {
            let Some(src) = self.current() else {
                return Ok(());
            };
            src.collection.features[self.cursor]
                .shape(accept)
                .map_err(|reason| GenError::MalformedInput {
                    file: src.name.clone(),
                    feature: self.cursor,
                    reason,
                })?
        };
        let Some(shape) = shape else {
            self.stats.ignored += 1;
            return Ok(());
        };
        match (self.phase, shape) {
            (IngestPhase::Rivers, Shape::Line(pts)) => {
                let world = self.to_world_snapped(&pts, terrain);
                if self.index.insert_river(world).is_some() {
                    self.stats.rivers += 1;
                }
            }
            (IngestPhase::Buildings, shape) => self.ingest_building(&shape, terrain),
            (IngestPhase::Roads, Shape::Line(pts)) => {
                let world = self.to_world_snapped(&pts, terrain);
                self.roads
                    .push(subdivide_polyline(&world, self.settings.subdivide_step));
                self.stats.roads += 1;
            }
            (IngestPhase::Bridges, shape) => {
                let ring = shape.first_ring().map(|r| self.to_world(r)).unwrap_or_default();
                match BridgeCorridor::from_footprint(&ring) {
                    Some(c) => {
                        self.bridges.push(c);
                        self.stats.bridges += 1;
                    }
                    None => self.stats.ignored += 1,
                }
            }
            _ => self.stats.ignored += 1,
        }
        Ok(())
    }

    fn ingest_building<T: TerrainBackend + ?Sized>(&mut self, shape: &Shape, terrain: &T) {
        if !accepts(self.rng.gen_range(0.0f32..1.0), self.settings.spawn_probability) {
            self.stats.buildings_skipped += 1;
            return;
        }
        let Some(ring) = shape.first_ring() else {
            self.stats.ignored += 1;
            return;
        };
        let open = open_ring(ring);
        let world = self.to_world_snapped(open, terrain);
        let height = self.rng.gen_range(MIN_BUILDING_HEIGHT..=MAX_BUILDING_HEIGHT);
        let Some(b) = BuildingRecord::from_polygon(world, height) else {
            self.stats.ignored += 1;
            return;
        };
        if self
            .index
            .insert_building(b, self.settings.max_buildings_per_chunk)
        {
            self.stats.buildings += 1;
        } else {
            self.stats.buildings_over_chunk_cap += 1;
        }
    }

    fn to_world(&self, pts: &[GeoPos]) -> Vec<Vec3> {
        pts.iter()
            .map(|p| self.mapper.geo_to_world(p.lat, p.lon))
            .collect()
    }

    fn to_world_snapped<T: TerrainBackend + ?Sized>(&self, pts: &[GeoPos], terrain: &T) -> Vec<Vec3> {
        pts.iter()
            .map(|p| snap_to_terrain(terrain, self.mapper.geo_to_world(p.lat, p.lon), SNAP_OFFSET))
            .collect()
    }
}

/// A roll in `[0, 1)` keeps a building when it falls below `probability`,
/// so 0 keeps none and 1 keeps all.
#[inline]
fn accepts(roll: f32, probability: f32) -> bool {
    roll < probability
}

/// Drop the closing vertex of a closed ring.
pub(crate) fn open_ring(ring: &[GeoPos]) -> &[GeoPos] {
    match ring {
        [first, .., last] if ring.len() > 3 && first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}
