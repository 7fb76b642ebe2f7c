//! Stand-in terrain for running the pipeline without an engine.

use fastnoise_lite::{FastNoiseLite, NoiseType};
use geoworld_geom::Vec3;
use geoworld_terrain::{Heightfield, TerrainLayout};

/// Square layout of `size` meters, `max_height` meters tall, four paint layers.
pub fn layout(size: f32, max_height: f32) -> TerrainLayout {
    TerrainLayout {
        origin: Vec3::ZERO,
        size: Vec3::new(size, max_height, size),
        height_res: 257,
        weight_width: 256,
        weight_depth: 256,
        layers: 4,
    }
}

/// Fold a 64-bit seed into the noise generator's 32 bits. Both halves count.
#[inline]
pub fn noise_seed(seed: u64) -> i32 {
    (seed ^ (seed >> 32)) as u32 as i32
}

/// Rolling hills from 2D OpenSimplex noise, normalized heights in [0.15, 0.7].
pub fn noise_terrain(layout: TerrainLayout, seed: u64) -> Heightfield {
    let mut noise = FastNoiseLite::with_seed(noise_seed(seed));
    noise.set_noise_type(Some(NoiseType::OpenSimplex2));
    noise.set_frequency(Some(0.02));
    let (min_h, max_h) = (0.15, 0.7);
    // one noise unit per height pixel
    let cells = layout.height_res.saturating_sub(1).max(1) as f32;
    Heightfield::from_fn(layout, |u, v| {
        let h = noise.get_noise_2d(u * cells, v * cells);
        (h + 1.0) * 0.5 * (max_h - min_h) + min_h
    })
}

pub fn flat_terrain(layout: TerrainLayout) -> Heightfield {
    Heightfield::flat(layout)
}
