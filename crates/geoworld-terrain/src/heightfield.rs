use std::cell::Cell;

use crate::backend::{TerrainBackend, TerrainLayout};
use crate::raster::{HeightRaster, WeightRaster};

/// In-memory terrain. Counts bulk reads and writes so callers can check batching.
#[derive(Debug)]
pub struct Heightfield {
    layout: TerrainLayout,
    heights: HeightRaster,
    weights: WeightRaster,
    ready: bool,
    height_reads: Cell<usize>,
    weight_reads: Cell<usize>,
    height_writes: usize,
    weight_writes: usize,
}

impl Heightfield {
    /// Flat terrain at normalized height 0, all weight on layer 0.
    pub fn flat(layout: TerrainLayout) -> Self {
        Self::from_fn(layout, |_, _| 0.0)
    }

    /// Heights from `f(u, v)` with `u, v` in [0, 1]; results are clamped to [0, 1].
    pub fn from_fn(layout: TerrainLayout, f: impl Fn(f32, f32) -> f32) -> Self {
        let res = layout.height_res;
        let mut heights = HeightRaster::new(res);
        let denom = res.saturating_sub(1).max(1) as f32;
        for z in 0..res {
            for x in 0..res {
                let v = f(x as f32 / denom, z as f32 / denom);
                heights.set(x, z, v.clamp(0.0, 1.0));
            }
        }
        Self {
            layout,
            heights,
            weights: WeightRaster::new(layout.weight_width, layout.weight_depth, layout.layers),
            ready: true,
            height_reads: Cell::new(0),
            weight_reads: Cell::new(0),
            height_writes: 0,
            weight_writes: 0,
        }
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    #[inline]
    pub fn heights(&self) -> &HeightRaster {
        &self.heights
    }

    #[inline]
    pub fn weights(&self) -> &WeightRaster {
        &self.weights
    }

    pub fn height_reads(&self) -> usize {
        self.height_reads.get()
    }

    pub fn weight_reads(&self) -> usize {
        self.weight_reads.get()
    }

    pub fn height_writes(&self) -> usize {
        self.height_writes
    }

    pub fn weight_writes(&self) -> usize {
        self.weight_writes
    }
}

impl TerrainBackend for Heightfield {
    fn layout(&self) -> Option<TerrainLayout> {
        self.layout.is_valid().then_some(self.layout)
    }

    fn is_ready(&self) -> bool {
        self.ready && self.layout.is_valid()
    }

    fn sample_height(&self, x: f32, z: f32) -> f32 {
        let l = &self.layout;
        let max = (self.heights.res().saturating_sub(1)) as f32;
        let fx = ((x - l.origin.x) / l.size.x).clamp(0.0, 1.0) * max;
        let fz = ((z - l.origin.z) / l.size.z).clamp(0.0, 1.0) * max;
        self.heights.sample(fx, fz) * l.size.y + l.origin.y
    }

    fn read_heights(&self) -> HeightRaster {
        self.height_reads.set(self.height_reads.get() + 1);
        self.heights.clone()
    }

    fn write_heights(&mut self, raster: &HeightRaster) {
        if raster.res() != self.heights.res() {
            log::warn!(
                target: "terrain",
                "ignoring height write with res {} (expected {})",
                raster.res(),
                self.heights.res()
            );
            return;
        }
        self.height_writes += 1;
        self.heights = raster.clone();
    }

    fn read_weights(&self) -> WeightRaster {
        self.weight_reads.set(self.weight_reads.get() + 1);
        self.weights.clone()
    }

    fn write_weights(&mut self, raster: &WeightRaster) {
        let w = &self.weights;
        if (raster.width(), raster.depth(), raster.layers()) != (w.width(), w.depth(), w.layers()) {
            log::warn!(target: "terrain", "ignoring weight write with mismatched shape");
            return;
        }
        self.weight_writes += 1;
        self.weights = raster.clone();
    }
}
