//! Terrain backend seam, in-memory heightfield and raster corridor editing.
#![forbid(unsafe_code)]

pub mod backend;
pub mod editor;
pub mod heightfield;
pub mod raster;

pub use backend::{
    SurfaceQuery, TerrainBackend, TerrainLayout, TerrainSurface, snap_to_surface, snap_to_terrain,
};
pub use editor::{HeightBands, PixelWindow, TerrainRasterEditor, paint_raster, raise_raster};
pub use heightfield::Heightfield;
pub use raster::{HeightRaster, WeightRaster};
