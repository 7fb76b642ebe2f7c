//! World framing: generation config, geographic bounds, geo→world mapping and chunk keys.
#![forbid(unsafe_code)]

pub mod bounds;
pub mod chunk_key;
pub mod config;
pub mod error;
pub mod mapper;

pub use bounds::GeoBoundingBox;
pub use chunk_key::ChunkKey;
pub use config::{GenConfig, load_config_from_path};
pub use error::GenError;
pub use mapper::CoordinateMapper;
