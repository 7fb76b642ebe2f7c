//! Runtime side of generation: chunk streaming, placement and the scene host seam.
#![forbid(unsafe_code)]

pub mod exclusion;
pub mod host;
pub mod parking;
pub mod placement;
pub mod queue;
pub mod recording;
pub mod streamer;
pub mod style;

pub use exclusion::{ExclusionRegistry, ExclusionZone};
pub use host::{BuildingSpawn, HostSurface, ParkingSlot, SceneHost};
pub use parking::ParkingPlanner;
pub use placement::{PlacementParams, PlacementSolver};
pub use queue::{BudgetQueue, Task};
pub use recording::{ChunkContents, RecordingSceneHost};
pub use streamer::{ChunkState, ChunkStreamer, StreamContext, StreamSettings, StreamStats};
pub use style::{BuildingVisual, StyleChoice, StyleRule, StyleTable};
