use geoworld_geom::{Aabb, Vec3};

/// Straight corridor across a bridge footprint, on the ground plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BridgeCorridor {
    pub entry: Vec3,
    pub exit: Vec3,
}

impl BridgeCorridor {
    /// Midpoints of the two short edges of the footprint's bounding rectangle,
    /// so the corridor runs along the longer axis. Ties run along x.
    pub fn from_footprint(points: &[Vec3]) -> Option<Self> {
        let b = Aabb::from_points(points)?;
        let size = b.size();
        let c = b.center();
        let (entry, exit) = if size.x >= size.z {
            (Vec3::new(b.min.x, 0.0, c.z), Vec3::new(b.max.x, 0.0, c.z))
        } else {
            (Vec3::new(c.x, 0.0, b.min.z), Vec3::new(c.x, 0.0, b.max.z))
        };
        Some(Self { entry, exit })
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.entry.distance_xz(self.exit)
    }
}
