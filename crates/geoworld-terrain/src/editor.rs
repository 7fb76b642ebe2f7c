//! Corridor edits on the terrain rasters.
//!
//! Every public operation takes one snapshot from the backend, mutates it in
//! memory and flushes it back once.

use geoworld_geom::{Vec3, distance_point_to_segment};
use geoworld_world::GenError;
use geoworld_world::config::Terrain as TerrainConfig;

use crate::backend::{TerrainBackend, TerrainLayout};
use crate::raster::{HeightRaster, WeightRaster};

/// Power applied to the paint falloff curve.
pub const PAINT_EXPONENT: f32 = 1.2;
/// Raise exponent at `falloff = 0`; `falloff = 1` is linear.
pub const SHARPEST_RAISE_EXPONENT: f32 = 2.2;

/// Inclusive pixel rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelWindow {
    pub min_x: usize,
    pub max_x: usize,
    pub min_z: usize,
    pub max_z: usize,
}

impl PixelWindow {
    /// Pixels covering segment `a..b` plus a `radius` margin on a `res_x` by `res_z` grid.
    pub fn around_segment(
        layout: &TerrainLayout,
        a: Vec3,
        b: Vec3,
        radius: f32,
        res_x: usize,
        res_z: usize,
    ) -> Self {
        let (ax, az) = layout.world_to_pixel(a, res_x, res_z);
        let (bx, bz) = layout.world_to_pixel(b, res_x, res_z);
        let (pad_x, pad_z) = layout.pixel_margins(radius, res_x, res_z);
        Self {
            min_x: ax.min(bx).saturating_sub(pad_x),
            max_x: (ax.max(bx).saturating_add(pad_x)).min(res_x - 1),
            min_z: az.min(bz).saturating_sub(pad_z),
            max_z: (az.max(bz).saturating_add(pad_z)).min(res_z - 1),
        }
    }

    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.min_z..=self.max_z).flat_map(move |z| (self.min_x..=self.max_x).map(move |x| (x, z)))
    }
}

#[inline]
fn falloff_t(d: f32, radius: f32) -> Option<f32> {
    (d <= radius).then(|| (1.0 - d / radius).clamp(0.0, 1.0))
}

/// Raise heights along `a..b` in `raster`; returns touched pixels. Never lowers a pixel.
pub fn raise_raster(
    raster: &mut HeightRaster,
    layout: &TerrainLayout,
    a: Vec3,
    b: Vec3,
    radius: f32,
    max_raise: f32,
    falloff: f32,
) -> usize {
    if !(radius > 0.0) || raster.res() < 2 {
        return 0;
    }
    let res = raster.res();
    let exponent = 1.0 + (SHARPEST_RAISE_EXPONENT - 1.0) * (1.0 - falloff.clamp(0.0, 1.0));
    let raise_norm = max_raise / layout.size.y;
    let (a2, b2) = (a.xz(), b.xz());
    let win = PixelWindow::around_segment(layout, a, b, radius, res, res);
    let mut touched = 0;
    for (x, z) in win.pixels() {
        let p = layout.pixel_to_world(x, z, res, res);
        let Some(t) = falloff_t(distance_point_to_segment(p, a2, b2), radius) else {
            continue;
        };
        let old = raster.get(x, z);
        let raised = (old + raise_norm * t.powf(exponent)).min(1.0);
        raster.set(x, z, old.max(raised));
        touched += 1;
    }
    touched
}

/// Blend `layer` in along `a..b`, rescaling the other layers so each touched pixel sums to 1.
/// Returns touched pixels; an out-of-range layer touches nothing.
pub fn paint_raster(
    raster: &mut WeightRaster,
    layout: &TerrainLayout,
    a: Vec3,
    b: Vec3,
    radius: f32,
    strength: f32,
    layer: usize,
) -> usize {
    if layer >= raster.layers() || !(radius > 0.0) || raster.width() < 2 || raster.depth() < 2 {
        return 0;
    }
    let (w, d) = (raster.width(), raster.depth());
    let (a2, b2) = (a.xz(), b.xz());
    let win = PixelWindow::around_segment(layout, a, b, radius, w, d);
    let mut touched = 0;
    for (x, z) in win.pixels() {
        let p = layout.pixel_to_world(x, z, w, d);
        let Some(t) = falloff_t(distance_point_to_segment(p, a2, b2), radius) else {
            continue;
        };
        let add = t.powf(PAINT_EXPONENT) * strength;
        let px = raster.pixel_mut(x, z);
        let desired = (px[layer] + add).clamp(0.0, 1.0);
        let others: f32 = px
            .iter()
            .enumerate()
            .filter(|(l, _)| *l != layer)
            .map(|(_, v)| *v)
            .sum();
        if others > 0.0 {
            let scale = (1.0 - desired) / others;
            for (l, v) in px.iter_mut().enumerate() {
                if l == layer {
                    *v = desired;
                } else {
                    *v *= scale;
                }
            }
        } else {
            for (l, v) in px.iter_mut().enumerate() {
                *v = if l == layer { 1.0 } else { 0.0 };
            }
        }
        touched += 1;
    }
    touched
}

/// Height-banded material assignment: each band claims terrain below its threshold.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightBands {
    pub min_height: f32,
    pub max_height: f32,
    /// Ascending normalized thresholds; band `i` paints layer `i`.
    pub thresholds: Vec<f32>,
}

impl HeightBands {
    pub fn from_config(cfg: &TerrainConfig) -> Self {
        Self {
            min_height: cfg.band_min_height,
            max_height: cfg.band_max_height,
            thresholds: cfg.band_thresholds.clone(),
        }
    }

    /// Layer for a terrain-local height. Heights at or above every threshold take the last band.
    pub fn layer_for(&self, height: f32) -> usize {
        let span = self.max_height - self.min_height;
        let n = if span.abs() > f32::EPSILON {
            ((height - self.min_height) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.thresholds
            .iter()
            .position(|t| n < *t)
            .unwrap_or(self.thresholds.len().saturating_sub(1))
    }
}

/// Exclusive editor over a terrain backend for the duration of the edit phase.
pub struct TerrainRasterEditor<'a, T: TerrainBackend + ?Sized> {
    backend: &'a mut T,
    layout: TerrainLayout,
}

impl<'a, T: TerrainBackend + ?Sized> TerrainRasterEditor<'a, T> {
    pub fn new(backend: &'a mut T) -> Result<Self, GenError> {
        let layout = backend
            .layout()
            .filter(|l| l.is_valid())
            .ok_or(GenError::MissingTerrain)?;
        Ok(Self { backend, layout })
    }

    #[inline]
    pub fn layout(&self) -> &TerrainLayout {
        &self.layout
    }

    /// World-space height under `p`, for seating corridor endpoints.
    pub fn sample_height(&self, p: Vec3) -> f32 {
        self.backend.sample_height(p.x, p.z)
    }

    pub fn raise_along_segment(
        &mut self,
        a: Vec3,
        b: Vec3,
        radius: f32,
        max_raise: f32,
        falloff: f32,
    ) -> usize {
        let mut heights = self.backend.read_heights();
        let n = raise_raster(&mut heights, &self.layout, a, b, radius, max_raise, falloff);
        self.backend.write_heights(&heights);
        log::debug!(target: "terrain", "raised {} px along ({:.1},{:.1})->({:.1},{:.1})", n, a.x, a.z, b.x, b.z);
        n
    }

    pub fn paint_along_segment(
        &mut self,
        a: Vec3,
        b: Vec3,
        radius: f32,
        strength: f32,
        layer: usize,
    ) -> usize {
        if layer >= self.layout.layers {
            log::warn!(
                target: "terrain",
                "paint layer {} out of range (layers={}); skipping",
                layer,
                self.layout.layers
            );
            return 0;
        }
        let mut weights = self.backend.read_weights();
        let n = paint_raster(&mut weights, &self.layout, a, b, radius, strength, layer);
        self.backend.write_weights(&weights);
        log::debug!(target: "terrain", "painted layer {} on {} px", layer, n);
        n
    }

    /// Overwrite every weight pixel with the one-hot layer of its height band.
    pub fn paint_height_bands(&mut self, bands: &HeightBands) -> usize {
        let l = self.layout;
        let (w, d) = (l.weight_width, l.weight_depth);
        let mut weights = WeightRaster::new(w, d, l.layers);
        for z in 0..d {
            for x in 0..w {
                let p = l.pixel_to_world(x, z, w, d);
                let local = self.backend.sample_height(p.x, p.y) - l.origin.y;
                let layer = bands.layer_for(local).min(l.layers - 1);
                weights.set_one_hot(x, z, layer);
            }
        }
        self.backend.write_weights(&weights);
        log::info!(target: "terrain", "painted height bands over {}x{} px", w, d);
        w * d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightfield::Heightfield;

    fn layout() -> TerrainLayout {
        TerrainLayout {
            origin: Vec3::ZERO,
            size: Vec3::new(100.0, 50.0, 100.0),
            height_res: 101,
            weight_width: 101,
            weight_depth: 101,
            layers: 4,
        }
    }

    #[test]
    fn raise_flushes_once_and_peaks_on_the_line() {
        let mut hf = Heightfield::flat(layout());
        let mut ed = TerrainRasterEditor::new(&mut hf).unwrap();
        let n = ed.raise_along_segment(
            Vec3::new(20.0, 0.0, 50.0),
            Vec3::new(80.0, 0.0, 50.0),
            10.0,
            5.0,
            1.0,
        );
        assert!(n > 0);
        assert_eq!(hf.height_reads(), 1);
        assert_eq!(hf.height_writes(), 1);
        // on the line: full raise, 5 / 50
        assert!((hf.heights().get(50, 50) - 0.1).abs() < 1e-6);
        // linear falloff, 5 m out of 10
        assert!((hf.heights().get(50, 55) - 0.05).abs() < 1e-6);
        // beyond the radius
        assert_eq!(hf.heights().get(50, 62), 0.0);
    }

    #[test]
    fn paint_out_of_range_layer_is_skipped() {
        let mut hf = Heightfield::flat(layout());
        let mut ed = TerrainRasterEditor::new(&mut hf).unwrap();
        let n = ed.paint_along_segment(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 5.0, 1.0, 9);
        assert_eq!(n, 0);
        assert_eq!(hf.weight_reads(), 0);
        assert_eq!(hf.weight_writes(), 0);
    }

    #[test]
    fn paint_on_line_saturates_target() {
        let mut hf = Heightfield::flat(layout());
        let mut ed = TerrainRasterEditor::new(&mut hf).unwrap();
        ed.paint_along_segment(
            Vec3::new(10.0, 0.0, 10.0),
            Vec3::new(30.0, 0.0, 10.0),
            6.0,
            1.0,
            1,
        );
        assert_eq!(hf.weight_writes(), 1);
        let px = hf.weights().pixel(20, 10);
        assert_eq!(px[1], 1.0);
        assert_eq!(px[0], 0.0);
        // untouched pixel keeps its weights
        assert_eq!(hf.weights().pixel(90, 90)[0], 1.0);
    }

    #[test]
    fn margin_follows_each_axis_on_a_stretched_layout() {
        // 10 m per pixel along x, 1 m per pixel along z
        let stretched = TerrainLayout {
            origin: Vec3::ZERO,
            size: Vec3::new(1000.0, 50.0, 100.0),
            height_res: 101,
            weight_width: 101,
            weight_depth: 101,
            layers: 2,
        };
        let (a, b) = (Vec3::new(200.0, 0.0, 50.0), Vec3::new(800.0, 0.0, 50.0));

        let mut weights = WeightRaster::new(101, 101, 2);
        assert!(paint_raster(&mut weights, &stretched, a, b, 10.0, 1.0, 1) > 0);
        assert!(weights.pixel(50, 55)[1] > 0.0);
        assert!((weights.sum_at(50, 55) - 1.0).abs() < 1e-5);
        assert_eq!(weights.pixel(50, 61)[1], 0.0);

        let mut heights = HeightRaster::new(101);
        assert!(raise_raster(&mut heights, &stretched, a, b, 10.0, 5.0, 1.0) > 0);
        assert!(heights.get(50, 55) > 0.0);
        assert_eq!(heights.get(50, 61), 0.0);
    }

    #[test]
    fn missing_terrain_is_fatal() {
        let mut bad = layout();
        bad.layers = 0;
        let mut hf = Heightfield::flat(bad);
        let err = TerrainRasterEditor::new(&mut hf).err().unwrap();
        assert!(matches!(err, GenError::MissingTerrain));
    }

    #[test]
    fn bands_pick_first_threshold_above() {
        let bands = HeightBands {
            min_height: 0.0,
            max_height: 100.0,
            thresholds: vec![0.3, 0.45, 0.6, 0.8, 1.0],
        };
        assert_eq!(bands.layer_for(-10.0), 0);
        assert_eq!(bands.layer_for(29.0), 0);
        assert_eq!(bands.layer_for(30.0), 1);
        assert_eq!(bands.layer_for(79.9), 3);
        assert_eq!(bands.layer_for(100.0), 4);
        assert_eq!(bands.layer_for(1000.0), 4);
    }

    #[test]
    fn height_bands_follow_terrain() {
        let mut hf = Heightfield::from_fn(layout(), |u, _| u);
        let bands = HeightBands {
            min_height: 0.0,
            max_height: 50.0,
            thresholds: vec![0.5, 1.0],
        };
        let mut ed = TerrainRasterEditor::new(&mut hf).unwrap();
        ed.paint_height_bands(&bands);
        assert_eq!(hf.weight_writes(), 1);
        assert_eq!(hf.weights().pixel(10, 0)[0], 1.0);
        assert_eq!(hf.weights().pixel(90, 0)[1], 1.0);
        assert_eq!(hf.weights().sum_at(90, 0), 1.0);
    }
}
