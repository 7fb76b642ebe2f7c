//! Generation parameters, loaded from TOML.
//!
//! Every section and field has a default so a partial (or empty) file is valid.

use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::GenError;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GenConfig {
    #[serde(default)]
    pub inputs: Inputs,
    #[serde(default)]
    pub chunks: Chunks,
    #[serde(default)]
    pub ingest: Ingest,
    #[serde(default)]
    pub bridges: Bridges,
    #[serde(default)]
    pub roads: Roads,
    #[serde(default)]
    pub rivers: Rivers,
    #[serde(default)]
    pub placement: Placement,
    #[serde(default)]
    pub terrain: Terrain,
    #[serde(default)]
    pub parking: Parking,
    #[serde(default)]
    pub exclusion_zones: Vec<ExclusionZoneDef>,
    #[serde(default)]
    pub landmarks: Vec<LandmarkDef>,
    /// Empty means the built-in style table.
    #[serde(default)]
    pub building_rules: Vec<BuildingRuleDef>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Inputs {
    #[serde(default)]
    pub rivers: Option<PathBuf>,
    #[serde(default)]
    pub buildings: Option<PathBuf>,
    #[serde(default)]
    pub roads: Option<PathBuf>,
    /// Optional; without it no terrain corridors are carved.
    #[serde(default)]
    pub bridges: Option<PathBuf>,
    /// Optional land-use polygons; green areas become park exclusion zones.
    #[serde(default)]
    pub landuse: Option<PathBuf>,
}

impl Inputs {
    /// Resolve relative paths against `base` (the config file's directory).
    pub fn resolve_relative_to(&mut self, base: &Path) {
        for p in [
            &mut self.rivers,
            &mut self.buildings,
            &mut self.roads,
            &mut self.bridges,
            &mut self.landuse,
        ]
        .into_iter()
        .flatten()
        {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Chunks {
    #[serde(default = "default_chunk_size")]
    pub size: f32,
    #[serde(default = "default_load_radius")]
    pub load_radius: i32,
    #[serde(default = "default_max_buildings_per_chunk")]
    pub max_buildings_per_chunk: usize,
    #[serde(default = "default_stream_interval")]
    pub stream_interval_secs: f32,
    #[serde(default = "default_buildings_per_tick")]
    pub buildings_per_tick: usize,
}
fn default_chunk_size() -> f32 {
    100.0
}
fn default_load_radius() -> i32 {
    3
}
fn default_max_buildings_per_chunk() -> usize {
    60
}
fn default_stream_interval() -> f32 {
    1.0
}
fn default_buildings_per_tick() -> usize {
    3
}
impl Default for Chunks {
    fn default() -> Self {
        Self {
            size: default_chunk_size(),
            load_radius: default_load_radius(),
            max_buildings_per_chunk: default_max_buildings_per_chunk(),
            stream_interval_secs: default_stream_interval(),
            buildings_per_tick: default_buildings_per_tick(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Ingest {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_spawn_probability")]
    pub building_spawn_probability: f32,
    #[serde(default = "default_max_total")]
    pub max_total_buildings: usize,
    #[serde(default = "default_max_total")]
    pub max_total_roads: usize,
    #[serde(default = "default_subdivide_step")]
    pub subdivide_step: f32,
    /// Endpoint merge distance. Roads are concatenated in input order and never
    /// merged by proximity, so this is parsed but not consulted.
    #[serde(default = "default_merge_threshold")]
    pub merge_threshold: f32,
    /// 0 seeds from entropy.
    #[serde(default)]
    pub seed: u64,
}
fn default_batch_size() -> usize {
    1000
}
fn default_spawn_probability() -> f32 {
    0.3
}
fn default_max_total() -> usize {
    2000
}
fn default_subdivide_step() -> f32 {
    3.0
}
fn default_merge_threshold() -> f32 {
    8.0
}
impl Default for Ingest {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            building_spawn_probability: default_spawn_probability(),
            max_total_buildings: default_max_total(),
            max_total_roads: default_max_total(),
            subdivide_step: default_subdivide_step(),
            merge_threshold: default_merge_threshold(),
            seed: 0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Bridges {
    #[serde(default = "default_splat_index")]
    pub splat_index: usize,
    #[serde(default = "default_paint_radius")]
    pub paint_radius: f32,
    #[serde(default = "default_paint_strength")]
    pub paint_strength: f32,
    #[serde(default = "default_raise_height")]
    pub raise_height: f32,
    #[serde(default = "default_raise_radius")]
    pub raise_radius: f32,
    /// 1 = linear falloff, 0 = sharpest.
    #[serde(default = "default_raise_falloff")]
    pub raise_falloff: f32,
}
fn default_splat_index() -> usize {
    1
}
fn default_paint_radius() -> f32 {
    6.0
}
fn default_paint_strength() -> f32 {
    0.9
}
fn default_raise_height() -> f32 {
    2.5
}
fn default_raise_radius() -> f32 {
    10.0
}
fn default_raise_falloff() -> f32 {
    0.6
}
impl Default for Bridges {
    fn default() -> Self {
        Self {
            splat_index: default_splat_index(),
            paint_radius: default_paint_radius(),
            paint_strength: default_paint_strength(),
            raise_height: default_raise_height(),
            raise_radius: default_raise_radius(),
            raise_falloff: default_raise_falloff(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Roads {
    #[serde(default = "default_resample_step")]
    pub resample_step: f32,
    #[serde(default = "default_road_offset")]
    pub height_offset: f32,
    #[serde(default = "default_smooth_iterations")]
    pub smooth_iterations: u32,
    #[serde(default = "default_road_half_width")]
    pub half_width: f32,
}
fn default_resample_step() -> f32 {
    2.0
}
fn default_road_offset() -> f32 {
    0.05
}
fn default_smooth_iterations() -> u32 {
    8
}
fn default_road_half_width() -> f32 {
    2.5
}
impl Default for Roads {
    fn default() -> Self {
        Self {
            resample_step: default_resample_step(),
            height_offset: default_road_offset(),
            smooth_iterations: default_smooth_iterations(),
            half_width: default_road_half_width(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Rivers {
    #[serde(default = "default_river_half_width")]
    pub half_width: f32,
    #[serde(default = "default_river_offset")]
    pub height_offset: f32,
}
fn default_river_half_width() -> f32 {
    1.2
}
fn default_river_offset() -> f32 {
    0.02
}
impl Default for Rivers {
    fn default() -> Self {
        Self {
            half_width: default_river_half_width(),
            height_offset: default_river_offset(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Placement {
    /// Radius used for configured zones that do not give their own.
    #[serde(default = "default_stadium_radius")]
    pub stadium_exclusion_radius: f32,
    #[serde(default = "default_true")]
    pub attempt_nudge_if_inside: bool,
    #[serde(default = "default_nudge_attempts")]
    pub nudge_max_attempts: u32,
    #[serde(default = "default_nudge_step")]
    pub nudge_step_distance: f32,
    #[serde(default = "default_nudge_angle")]
    pub nudge_angle_step_deg: f32,
    #[serde(default = "default_retry_scale")]
    pub retry_radius_scale: f32,
    /// Radius of the zone registered at each park centroid.
    #[serde(default = "default_stadium_radius")]
    pub park_exclusion_radius: f32,
    /// Green polygons smaller than this (m^2) are not parks.
    #[serde(default = "default_park_min_area")]
    pub park_min_area: f32,
    #[serde(default)]
    pub landmark: LandmarkPlacement,
}
fn default_true() -> bool {
    true
}
fn default_stadium_radius() -> f32 {
    80.0
}
fn default_nudge_attempts() -> u32 {
    12
}
fn default_nudge_step() -> f32 {
    3.0
}
fn default_nudge_angle() -> f32 {
    37.0
}
fn default_retry_scale() -> f32 {
    0.95
}
fn default_park_min_area() -> f32 {
    200.0
}
impl Default for Placement {
    fn default() -> Self {
        Self {
            stadium_exclusion_radius: default_stadium_radius(),
            attempt_nudge_if_inside: true,
            nudge_max_attempts: default_nudge_attempts(),
            nudge_step_distance: default_nudge_step(),
            nudge_angle_step_deg: default_nudge_angle(),
            retry_radius_scale: default_retry_scale(),
            park_exclusion_radius: default_stadium_radius(),
            park_min_area: default_park_min_area(),
            landmark: LandmarkPlacement::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct LandmarkPlacement {
    #[serde(default = "default_landmark_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_landmark_step")]
    pub step_distance: f32,
    #[serde(default = "default_landmark_angle")]
    pub angle_step_deg: f32,
}
fn default_landmark_attempts() -> u32 {
    20
}
fn default_landmark_step() -> f32 {
    2.0
}
fn default_landmark_angle() -> f32 {
    25.0
}
impl Default for LandmarkPlacement {
    fn default() -> Self {
        Self {
            max_attempts: default_landmark_attempts(),
            step_distance: default_landmark_step(),
            angle_step_deg: default_landmark_angle(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Terrain {
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_secs: f32,
    #[serde(default = "default_true")]
    pub paint_height_bands: bool,
    #[serde(default = "default_band_min")]
    pub band_min_height: f32,
    #[serde(default = "default_band_max")]
    pub band_max_height: f32,
    /// Ascending normalized-height thresholds, one per layer.
    #[serde(default = "default_band_thresholds")]
    pub band_thresholds: Vec<f32>,
}
fn default_ready_timeout() -> f32 {
    5.0
}
fn default_band_min() -> f32 {
    7.6
}
fn default_band_max() -> f32 {
    78.3
}
fn default_band_thresholds() -> Vec<f32> {
    vec![0.30, 0.45, 0.60, 0.80, 1.00]
}
impl Default for Terrain {
    fn default() -> Self {
        Self {
            ready_timeout_secs: default_ready_timeout(),
            paint_height_bands: true,
            band_min_height: default_band_min(),
            band_max_height: default_band_max(),
            band_thresholds: default_band_thresholds(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Parking {
    #[serde(default = "default_true")]
    pub enable: bool,
    #[serde(default = "default_parking_offset")]
    pub offset: f32,
    #[serde(default = "default_parking_spacing")]
    pub min_spacing: f32,
    #[serde(default = "default_parking_max")]
    pub max_total: usize,
    /// Consider every n-th road quad.
    #[serde(default = "default_parking_stride")]
    pub quad_stride: usize,
}
fn default_parking_offset() -> f32 {
    8.0
}
fn default_parking_spacing() -> f32 {
    15.0
}
fn default_parking_max() -> usize {
    300
}
fn default_parking_stride() -> usize {
    3
}
impl Default for Parking {
    fn default() -> Self {
        Self {
            enable: true,
            offset: default_parking_offset(),
            min_spacing: default_parking_spacing(),
            max_total: default_parking_max(),
            quad_stride: default_parking_stride(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ExclusionZoneDef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_zone_category")]
    pub category: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub radius: Option<f32>,
}
fn default_zone_category() -> String {
    "stadium".into()
}

#[derive(Clone, Debug, Deserialize)]
pub struct LandmarkDef {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// One row of the building style table: matches when every given bound is exceeded.
#[derive(Clone, Debug, Deserialize)]
pub struct BuildingRuleDef {
    pub style: String,
    #[serde(default)]
    pub min_height: Option<f32>,
    #[serde(default)]
    pub min_footprint: Option<f32>,
    #[serde(default)]
    pub prefabs: Vec<String>,
}

impl GenConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: GenConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), GenError> {
        let bad = |msg: &str| Err(GenError::Config(msg.to_string()));
        if !(self.chunks.size > 0.0) {
            return bad("chunks.size must be > 0");
        }
        if self.chunks.load_radius < 0 {
            return bad("chunks.load_radius must be >= 0");
        }
        if self.chunks.buildings_per_tick == 0 {
            return bad("chunks.buildings_per_tick must be >= 1");
        }
        if self.ingest.batch_size == 0 {
            return bad("ingest.batch_size must be >= 1");
        }
        if !(0.0..=1.0).contains(&self.ingest.building_spawn_probability) {
            return bad("ingest.building_spawn_probability must be within [0, 1]");
        }
        if !(self.roads.resample_step > 0.0) {
            return bad("roads.resample_step must be > 0");
        }
        if !(0.0..=1.0).contains(&self.bridges.raise_falloff) {
            return bad("bridges.raise_falloff must be within [0, 1]");
        }
        if self.parking.quad_stride == 0 {
            return bad("parking.quad_stride must be >= 1");
        }
        if self
            .terrain
            .band_thresholds
            .windows(2)
            .any(|w| w[1] < w[0])
        {
            return bad("terrain.band_thresholds must be ascending");
        }
        Ok(())
    }
}

/// Load and validate a config file. Relative input paths resolve against the file's directory.
pub fn load_config_from_path(path: &Path) -> Result<GenConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let mut cfg = GenConfig::from_toml_str(&s)?;
    if let Some(dir) = path.parent() {
        cfg.inputs.resolve_relative_to(dir);
    }
    Ok(cfg)
}
