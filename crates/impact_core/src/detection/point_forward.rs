//! Point-forward raycast detector
//!
//! Casts from the last-tick position to the current position, extended by a
//! trailing and a leading slack, so fast movers cannot tunnel through thin
//! colliders between ticks. Auxiliary rays reuse the same span with their own
//! offset and, optionally, their own direction.

use super::{DetectorCore, HitCollisionInfo, QueryContext};
use crate::error::ImpactError;
use crate::foundation::math::{direction_or, Motion, Vec3};
use crate::physics::Segment;

/// Extra ray cast alongside the main one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuxRay {
    /// Offset from the main ray's start
    pub offset: Vec3,
    /// Direction override; `None` follows the travel direction
    pub direction: Option<Vec3>,
}

/// Raycast-forward detection strategy
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointForwardDetector {
    /// Distance added ahead of the current position
    pub lead: f32,
    /// Distance added behind the previous position
    pub trail: f32,
    /// Auxiliary rays
    pub aux_rays: Vec<AuxRay>,
}

impl PointForwardDetector {
    /// Main ray only, no slack
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the leading slack
    pub fn with_lead(mut self, lead: f32) -> Self {
        self.lead = lead;
        self
    }

    /// Set the trailing slack
    pub fn with_trail(mut self, trail: f32) -> Self {
        self.trail = trail;
        self
    }

    /// Add an auxiliary ray
    pub fn with_aux_ray(mut self, offset: Vec3, direction: Option<Vec3>) -> Self {
        self.aux_rays.push(AuxRay { offset, direction });
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ImpactError> {
        let slack_ok = |v: f32| v.is_finite() && v >= 0.0;
        if !slack_ok(self.lead) || !slack_ok(self.trail) {
            return Err(ImpactError::InvalidGeometry(format!(
                "point-forward slack must be non-negative (lead {}, trail {})",
                self.lead, self.trail
            )));
        }
        Ok(())
    }

    /// Segments cast for the given motion, main ray first
    pub fn segments(&self, motion: &Motion) -> Vec<Segment> {
        let direction = motion.travel_direction();
        let start = motion.previous - direction * self.trail;
        let end = motion.current + direction * self.lead;
        let span = (end - start).norm();

        let mut segments = Vec::with_capacity(1 + self.aux_rays.len());
        segments.push(Segment::new(start, end));
        for aux in &self.aux_rays {
            let origin = start + aux.offset;
            let segment = match aux.direction {
                Some(dir) => Segment::new(origin, origin + direction_or(dir, direction) * span),
                None => Segment::new(origin, end + aux.offset),
            };
            segments.push(segment);
        }
        segments
    }

    /// Closest fresh hit across every ray
    pub fn perform_hit_check(
        &mut self,
        core: &DetectorCore,
        ctx: &QueryContext<'_>,
    ) -> Option<HitCollisionInfo> {
        let direction = core.motion.travel_direction();
        self.segments(&core.motion)
            .iter()
            .flat_map(|segment| ctx.spatial.raycast(segment, core.mask))
            .filter(|hit| core.is_fresh(hit.target))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .map(|hit| HitCollisionInfo::from_spatial(&hit, Some(direction)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Roster;
    use crate::config::ImpactConfig;
    use crate::detection::Piercing;
    use crate::physics::HitLayers;
    use crate::spatial::SphereWorld;
    use approx::assert_relative_eq;

    fn moving_core(from: Vec3, to: Vec3) -> DetectorCore {
        let mut core = DetectorCore::new(Piercing::finite(1, 100.0), 0.0, 0.0);
        core.motion.teleport(from);
        core.motion.move_to(to);
        core
    }

    #[test]
    fn test_hits_collider_crossed_between_ticks() {
        let mut world = SphereWorld::new();
        let target = world.add(Vec3::new(0.0, 0.0, 5.0), 0.5, HitLayers::ENEMY);
        let roster = Roster::new();
        let config = ImpactConfig::default();
        let ctx = QueryContext { spatial: &world, actors: &roster, config: &config };

        let core = moving_core(Vec3::zeros(), Vec3::new(0.0, 0.0, 10.0));
        let hit = PointForwardDetector::new().perform_hit_check(&core, &ctx).unwrap();
        assert_eq!(hit.target, target);
        assert_relative_eq!(hit.point.unwrap(), Vec3::new(0.0, 0.0, 4.5), epsilon = 1e-5);
        assert_relative_eq!(hit.direction.unwrap(), Vec3::z());
    }

    #[test]
    fn test_lead_slack_extends_reach() {
        let mut world = SphereWorld::new();
        world.add(Vec3::new(0.0, 0.0, 6.0), 1.0, HitLayers::ENEMY);
        let roster = Roster::new();
        let config = ImpactConfig::default();
        let ctx = QueryContext { spatial: &world, actors: &roster, config: &config };

        let core = moving_core(Vec3::zeros(), Vec3::new(0.0, 0.0, 4.0));
        assert!(PointForwardDetector::new().perform_hit_check(&core, &ctx).is_none());
        assert!(PointForwardDetector::new()
            .with_lead(2.0)
            .perform_hit_check(&core, &ctx)
            .is_some());
    }

    #[test]
    fn test_aux_ray_catches_offset_target() {
        let mut world = SphereWorld::new();
        let side = world.add(Vec3::new(3.0, 0.0, 5.0), 0.5, HitLayers::ENEMY);
        let roster = Roster::new();
        let config = ImpactConfig::default();
        let ctx = QueryContext { spatial: &world, actors: &roster, config: &config };

        let core = moving_core(Vec3::zeros(), Vec3::new(0.0, 0.0, 10.0));
        let mut detector = PointForwardDetector::new().with_aux_ray(Vec3::new(3.0, 0.0, 0.0), None);
        assert_eq!(detector.perform_hit_check(&core, &ctx).unwrap().target, side);
    }

    #[test]
    fn test_skips_history_and_own_collider() {
        let mut world = SphereWorld::new();
        let own = world.add(Vec3::new(0.0, 0.0, 1.0), 0.5, HitLayers::PLAYER);
        let first = world.add(Vec3::new(0.0, 0.0, 4.0), 0.5, HitLayers::ENEMY);
        let second = world.add(Vec3::new(0.0, 0.0, 7.0), 0.5, HitLayers::ENEMY);
        let roster = Roster::new();
        let config = ImpactConfig::default();
        let ctx = QueryContext { spatial: &world, actors: &roster, config: &config };

        let mut core = moving_core(Vec3::zeros(), Vec3::new(0.0, 0.0, 10.0));
        core.mask = HitLayers::all();
        core.ignore = Some(own);
        core.history.record(first);

        let hit = PointForwardDetector::new().perform_hit_check(&core, &ctx).unwrap();
        assert_eq!(hit.target, second);
    }

    #[test]
    fn test_negative_slack_rejected() {
        assert!(PointForwardDetector::new().with_lead(-1.0).validate().is_err());
    }
}
