use geoworld_geom::{Vec2, Vec3};

use crate::bounds::GeoBoundingBox;
use crate::error::GenError;

/// Linear geographic → world transform over a fixed bounding box.
///
/// No projection: longitude maps to world x and latitude to world z, each
/// normalized against the box and scaled to the world footprint.
#[derive(Clone, Copy, Debug)]
pub struct CoordinateMapper {
    bounds: GeoBoundingBox,
    origin: Vec2,
    size: Vec2,
}

impl CoordinateMapper {
    pub fn new(bounds: GeoBoundingBox, origin: Vec2, size: Vec2) -> Result<Self, GenError> {
        if bounds.is_degenerate() {
            return Err(GenError::DegenerateBounds {
                min_lat: bounds.min_lat,
                max_lat: bounds.max_lat,
                min_lon: bounds.min_lon,
                max_lon: bounds.max_lon,
            });
        }
        Ok(Self {
            bounds,
            origin,
            size,
        })
    }

    #[inline]
    pub fn bounds(&self) -> &GeoBoundingBox {
        &self.bounds
    }

    #[inline]
    pub fn world_size(&self) -> Vec2 {
        self.size
    }

    /// Height is left at 0; ground placement is a separate snapping step.
    pub fn geo_to_world(&self, lat: f64, lon: f64) -> Vec3 {
        let b = &self.bounds;
        let u = (lon - b.min_lon) / (b.max_lon - b.min_lon);
        let v = (lat - b.min_lat) / (b.max_lat - b.min_lat);
        let x = (u * f64::from(self.size.x)) as f32 + self.origin.x;
        let z = (v * f64::from(self.size.y)) as f32 + self.origin.y;
        Vec3::new(x, 0.0, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_box_is_rejected() {
        let b = GeoBoundingBox::new(50.0, 50.0, 30.0, 30.1);
        let err = CoordinateMapper::new(b, Vec2::ZERO, Vec2::new(2048.0, 2048.0)).unwrap_err();
        assert!(err.is_fatal_config());
        assert!(matches!(err, GenError::DegenerateBounds { .. }));
    }

    #[test]
    fn origin_offsets_output() {
        let b = GeoBoundingBox::new(0.0, 1.0, 0.0, 1.0);
        let m = CoordinateMapper::new(b, Vec2::new(-100.0, 50.0), Vec2::new(200.0, 400.0)).unwrap();
        let p = m.geo_to_world(0.5, 0.25);
        assert_eq!(p, Vec3::new(-50.0, 0.0, 250.0));
    }
}
