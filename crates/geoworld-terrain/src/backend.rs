use geoworld_geom::{Vec2, Vec3};

use crate::raster::{HeightRaster, WeightRaster};

/// Placement and resolution of the terrain rasters in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainLayout {
    /// World position of raster pixel (0, 0); `y` is the base elevation.
    pub origin: Vec3,
    /// Extent along x and z; `y` is the height range a normalized 1.0 maps to.
    pub size: Vec3,
    pub height_res: usize,
    pub weight_width: usize,
    pub weight_depth: usize,
    pub layers: usize,
}

impl TerrainLayout {
    pub fn is_valid(&self) -> bool {
        self.size.x > 0.0
            && self.size.y > 0.0
            && self.size.z > 0.0
            && self.height_res >= 2
            && self.weight_width >= 2
            && self.weight_depth >= 2
            && self.layers >= 1
    }

    #[inline]
    pub fn origin_xz(&self) -> Vec2 {
        self.origin.xz()
    }

    #[inline]
    pub fn size_xz(&self) -> Vec2 {
        self.size.xz()
    }

    /// Pixel containing `pos` on a `res_x` by `res_z` grid spanning the terrain.
    #[inline]
    pub fn world_to_pixel(&self, pos: Vec3, res_x: usize, res_z: usize) -> (usize, usize) {
        let nx = ((pos.x - self.origin.x) / self.size.x).clamp(0.0, 1.0);
        let nz = ((pos.z - self.origin.z) / self.size.z).clamp(0.0, 1.0);
        let ix = (nx * (res_x - 1) as f32).floor() as usize;
        let iz = (nz * (res_z - 1) as f32).floor() as usize;
        (ix, iz)
    }

    #[inline]
    pub fn pixel_to_world(&self, ix: usize, iz: usize, res_x: usize, res_z: usize) -> Vec2 {
        let nx = ix as f32 / (res_x - 1) as f32;
        let nz = iz as f32 / (res_z - 1) as f32;
        Vec2::new(
            self.origin.x + nx * self.size.x,
            self.origin.z + nz * self.size.z,
        )
    }

    /// Margin in pixels for a world-space radius along one axis of
    /// `axis_size` metres sampled at `res` pixels, with 1.5x slack.
    #[inline]
    pub fn pixel_radius(radius: f32, axis_size: f32, res: usize) -> usize {
        if axis_size <= 0.0 {
            return 0;
        }
        let step = res.saturating_sub(1).max(1) as f32;
        ((radius / axis_size) * step * 1.5).ceil().max(0.0) as usize
    }

    /// Per-axis pixel margins `(x, z)` for a raster of `res_x` by `res_z`.
    #[inline]
    pub fn pixel_margins(&self, radius: f32, res_x: usize, res_z: usize) -> (usize, usize) {
        (
            Self::pixel_radius(radius, self.size.x, res_x),
            Self::pixel_radius(radius, self.size.z, res_z),
        )
    }

    /// Clamp x/z into the terrain footprint.
    #[inline]
    pub fn clamp_xz(&self, pos: Vec3) -> Vec3 {
        Vec3::new(
            pos.x.clamp(self.origin.x, self.origin.x + self.size.x),
            pos.y,
            pos.z.clamp(self.origin.z, self.origin.z + self.size.z),
        )
    }
}

/// The height-rasterized terrain the generator edits and samples.
///
/// Reads return full snapshots and writes replace them; callers batch their
/// edits between one read and one write.
pub trait TerrainBackend {
    /// `None` when there is no terrain to work on.
    fn layout(&self) -> Option<TerrainLayout>;

    /// Whether the rasters are initialized; generation waits on this for a bounded time.
    fn is_ready(&self) -> bool {
        self.layout().is_some_and(|l| l.is_valid())
    }

    /// World-space height at `(x, z)`, base elevation included.
    fn sample_height(&self, x: f32, z: f32) -> f32;

    fn read_heights(&self) -> HeightRaster;
    fn write_heights(&mut self, raster: &HeightRaster);
    fn read_weights(&self) -> WeightRaster;
    fn write_weights(&mut self, raster: &WeightRaster);
}

/// Nearest walkable surface below a point (terrain, roads), excluding water and buildings.
pub trait SurfaceQuery {
    fn surface_below(&self, pos: Vec3) -> Option<f32>;
}

/// Surface query answered by the terrain alone.
pub struct TerrainSurface<'a, T: ?Sized>(pub &'a T);

impl<T: TerrainBackend + ?Sized> SurfaceQuery for TerrainSurface<'_, T> {
    fn surface_below(&self, pos: Vec3) -> Option<f32> {
        let layout = self.0.layout()?;
        let p = layout.clamp_xz(pos);
        Some(self.0.sample_height(p.x, p.z))
    }
}

/// Clamp into the terrain footprint and sit `y_offset` above it.
/// Without a terrain the point is returned unchanged.
pub fn snap_to_terrain<T: TerrainBackend + ?Sized>(terrain: &T, pos: Vec3, y_offset: f32) -> Vec3 {
    match terrain.layout() {
        Some(layout) => {
            let p = layout.clamp_xz(pos);
            p.with_y(terrain.sample_height(p.x, p.z) + y_offset)
        }
        None => pos,
    }
}

/// Drop onto whatever surface `query` reports; unchanged when nothing is hit.
pub fn snap_to_surface<S: SurfaceQuery + ?Sized>(query: &S, pos: Vec3, y_offset: f32) -> Vec3 {
    match query.surface_below(pos) {
        Some(y) => pos.with_y(y + y_offset),
        None => pos,
    }
}
