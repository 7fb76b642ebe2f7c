//! Geo-referenced world generation driven one tick at a time.
#![forbid(unsafe_code)]

pub mod completion;
pub mod generator;
pub mod logging;
pub mod synthetic;
pub mod watch;

pub use completion::CompletionSignal;
pub use generator::{GenPhase, GenStatus, GenerationSummary, WorldGenerator};
pub use logging::init_logging;
pub use watch::watch_config;
