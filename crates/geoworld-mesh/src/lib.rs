//! Road and river ribbon meshes built on top of the terrain.
#![forbid(unsafe_code)]

pub mod polyline;
pub mod ribbon;
pub mod river;
pub mod road;

pub use polyline::{resample_polyline, subdivide_polyline};
pub use ribbon::{RibbonMesh, extrude_ribbon};
pub use river::build_river_mesh;
pub use road::{RoadNetwork, RoadNetworkBuilder, enforce_floor, smooth_heights};
