//! Spiral relocation of candidates that land in an exclusion zone.

use geoworld_geom::Vec3;
use geoworld_terrain::{SurfaceQuery, snap_to_surface};
use geoworld_world::config::Placement;

use crate::exclusion::ExclusionRegistry;

/// Height above the surface for relocated candidates.
pub const RELOCATE_SNAP_OFFSET: f32 = 0.02;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementParams {
    /// When false a blocked candidate is dropped without trying to move it.
    pub relocate: bool,
    pub max_attempts: u32,
    pub step_distance: f32,
    pub angle_step_deg: f32,
    /// Zone radius multiplier used when re-checking relocated candidates.
    pub retry_radius_scale: f32,
}

impl PlacementParams {
    /// Building placement.
    pub fn from_config(cfg: &Placement) -> Self {
        Self {
            relocate: cfg.attempt_nudge_if_inside,
            max_attempts: cfg.nudge_max_attempts,
            step_distance: cfg.nudge_step_distance,
            angle_step_deg: cfg.nudge_angle_step_deg,
            retry_radius_scale: cfg.retry_radius_scale,
        }
    }

    /// Landmark placement: always relocates, with its own spiral.
    pub fn landmark(cfg: &Placement) -> Self {
        Self {
            relocate: true,
            max_attempts: cfg.landmark.max_attempts,
            step_distance: cfg.landmark.step_distance,
            angle_step_deg: cfg.landmark.angle_step_deg,
            retry_radius_scale: cfg.retry_radius_scale,
        }
    }

    /// Planar offset of relocation attempt `i` (1-based).
    pub fn attempt_offset(&self, i: u32) -> Vec3 {
        let angle = (i as f32 * self.angle_step_deg).rem_euclid(360.0).to_radians();
        let dist = self.step_distance * i as f32;
        Vec3::new(angle.cos() * dist, 0.0, angle.sin() * dist)
    }
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self::from_config(&Placement::default())
    }
}

pub struct PlacementSolver<'a> {
    zones: &'a ExclusionRegistry,
    params: PlacementParams,
}

impl<'a> PlacementSolver<'a> {
    pub fn new(zones: &'a ExclusionRegistry, params: PlacementParams) -> Self {
        Self { zones, params }
    }

    #[inline]
    pub fn params(&self) -> &PlacementParams {
        &self.params
    }

    /// A free position at or near `candidate`, or `None` when every attempt is blocked.
    pub fn place<S: SurfaceQuery + ?Sized>(&self, candidate: Vec3, surface: &S) -> Option<Vec3> {
        self.place_avoiding(candidate, surface, |_| false)
    }

    /// Like [`place`](Self::place), also rejecting positions where `blocked` holds.
    pub fn place_avoiding<S, F>(&self, candidate: Vec3, surface: &S, blocked: F) -> Option<Vec3>
    where
        S: SurfaceQuery + ?Sized,
        F: Fn(Vec3) -> bool,
    {
        if !self.zones.is_inside(candidate, 1.0) && !blocked(candidate) {
            return Some(candidate);
        }
        if !self.params.relocate {
            return None;
        }
        let scale = self.params.retry_radius_scale;
        for i in 1..=self.params.max_attempts {
            let p = snap_to_surface(
                surface,
                candidate + self.params.attempt_offset(i),
                RELOCATE_SNAP_OFFSET,
            );
            if !self.zones.is_inside(p, scale) && !blocked(p) {
                log::trace!(target: "placement", "relocated after {} attempt(s)", i);
                return Some(p);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoworld_geom::Vec2;

    struct Flat(f32);
    impl SurfaceQuery for Flat {
        fn surface_below(&self, _pos: Vec3) -> Option<f32> {
            Some(self.0)
        }
    }

    fn stadium() -> ExclusionRegistry {
        let mut r = ExclusionRegistry::new();
        r.register(Vec2::new(500.0, 500.0), 80.0, "stadium");
        r
    }

    #[test]
    fn clear_candidates_are_untouched() {
        let zones = stadium();
        let s = PlacementSolver::new(&zones, PlacementParams::default());
        let p = Vec3::new(100.0, 3.0, 100.0);
        assert_eq!(s.place(p, &Flat(0.0)), Some(p));
    }

    #[test]
    fn deep_inside_exhausts_attempts() {
        // 12 attempts of 3 m cannot leave an 80 m zone from its centre
        let zones = stadium();
        let s = PlacementSolver::new(&zones, PlacementParams::default());
        assert_eq!(s.place(Vec3::new(500.0, 0.0, 500.0), &Flat(0.0)), None);
    }

    #[test]
    fn near_rim_relocates_outside_the_shrunk_radius() {
        let zones = stadium();
        let s = PlacementSolver::new(&zones, PlacementParams::default());
        let c = Vec3::new(578.0, 0.0, 500.0);
        let p = s.place(c, &Flat(4.0)).unwrap();
        assert!(Vec2::new(500.0, 500.0).distance(p.xz()) > 80.0 * 0.95);
        assert!((p.y - 4.02).abs() < 1e-5);
        assert_ne!(p, c);
    }

    #[test]
    fn zero_attempts_or_no_relocation_drops_blocked() {
        let zones = stadium();
        let mut params = PlacementParams {
            max_attempts: 0,
            ..PlacementParams::default()
        };
        let inside = Vec3::new(578.0, 0.0, 500.0);
        let outside = Vec3::new(0.0, 0.0, 0.0);
        assert_eq!(PlacementSolver::new(&zones, params).place(inside, &Flat(0.0)), None);
        assert_eq!(PlacementSolver::new(&zones, params).place(outside, &Flat(0.0)), Some(outside));
        params.max_attempts = 12;
        params.relocate = false;
        assert_eq!(PlacementSolver::new(&zones, params).place(inside, &Flat(0.0)), None);
    }

    #[test]
    fn extra_predicate_is_avoided() {
        let zones = ExclusionRegistry::new();
        let params = PlacementParams::landmark(&Placement::default());
        let s = PlacementSolver::new(&zones, params);
        let c = Vec3::new(10.0, 0.0, 10.0);
        let p = s
            .place_avoiding(c, &Flat(0.0), |q| q.distance_xz(c) < 5.0)
            .unwrap();
        assert!(p.distance_xz(c) >= 5.0);
        // third landmark step: 6 m at 75 degrees
        assert!((p.distance_xz(c) - 6.0).abs() < 1e-4);
    }

    #[test]
    fn spiral_angles_wrap() {
        let params = PlacementParams::default();
        let o = params.attempt_offset(10);
        // 370 degrees == 10 degrees, 30 m out
        let expect = Vec3::new(10f32.to_radians().cos() * 30.0, 0.0, 10f32.to_radians().sin() * 30.0);
        assert!(o.distance(expect) < 1e-3);
    }
}
