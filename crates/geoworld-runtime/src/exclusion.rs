use geoworld_geom::{Vec2, Vec3};

/// Circular no-build area on the ground plane.
#[derive(Clone, Debug, PartialEq)]
pub struct ExclusionZone {
    pub center: Vec2,
    pub radius: f32,
    pub category: String,
}

impl ExclusionZone {
    /// Planar test against the radius scaled by `scale`; the rim counts as inside.
    #[inline]
    pub fn contains(&self, pos: Vec3, scale: f32) -> bool {
        self.center.distance(pos.xz()) <= self.radius * scale
    }
}

/// Zones registered for one generation run.
#[derive(Clone, Debug, Default)]
pub struct ExclusionRegistry {
    zones: Vec<ExclusionZone>,
}

impl ExclusionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false (and keeps nothing) for a negative or non-finite radius.
    pub fn register(&mut self, center: Vec2, radius: f32, category: impl Into<String>) -> bool {
        if !(radius >= 0.0 && radius.is_finite()) {
            log::warn!(target: "placement", "ignoring exclusion zone at {:?} with radius {}", center, radius);
            return false;
        }
        let category = category.into();
        log::debug!(target: "placement", "exclusion zone '{}' at ({:.1}, {:.1}) r={:.1}", category, center.x, center.y, radius);
        self.zones.push(ExclusionZone {
            center,
            radius,
            category,
        });
        true
    }

    #[inline]
    pub fn is_inside(&self, pos: Vec3, scale: f32) -> bool {
        self.zone_at(pos, scale).is_some()
    }

    pub fn zone_at(&self, pos: Vec3, scale: f32) -> Option<&ExclusionZone> {
        self.zones.iter().find(|z| z.contains(pos, scale))
    }

    pub fn zones(&self) -> &[ExclusionZone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn clear(&mut self) {
        self.zones.clear();
    }
}
