//! GeoJSON input: decoding, bounds, bridge corridors, parks and batched ingestion.
#![forbid(unsafe_code)]

pub mod bounds;
pub mod bridges;
pub mod geojson;
pub mod ingest;
pub mod landuse;

pub use bounds::{accumulate_bounds, compute_bounds};
pub use bridges::BridgeCorridor;
pub use geojson::{Feature, FeatureCollection, GeoPos, Geometry, Shape};
pub use ingest::{
    FeatureIngestor, IngestOutput, IngestPhase, IngestSettings, IngestSources, IngestStats, Source,
    StepOutcome,
};
pub use landuse::{GREEN_LANDUSE, is_green, park_centers, polygon_area};
