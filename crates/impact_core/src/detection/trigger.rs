//! Collider-tracked (trigger) detector
//!
//! The host reports overlap begin/end through the scheduler. Every overlapping
//! candidate carries its own re-hit countdown: single-hit mode drops a candidate
//! once it has been reported, interval mode re-arms the countdown.

use super::{DetectorCore, HitCollisionInfo, QueryContext};
use crate::error::ImpactError;
use crate::foundation::collections::TargetId;
use crate::foundation::math::{try_direction, Vec3};
use crate::foundation::time::Countdown;
use std::collections::BTreeMap;

/// Re-hit behavior of an overlapping candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerMode {
    /// Report a candidate once per overlap
    SingleHit,
    /// Report a candidate again every given number of seconds while it overlaps
    Interval(f32),
}

/// Overlap-tracking detection strategy
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerDetector {
    /// Re-hit behavior
    pub mode: TriggerMode,
    /// Minimum relative speed for a hit to count (0 disables the gate)
    pub min_relative_speed: f32,
    candidates: BTreeMap<TargetId, Countdown>,
}

impl TriggerDetector {
    /// Create a trigger with no candidates
    pub fn new(mode: TriggerMode) -> Self {
        Self {
            mode,
            min_relative_speed: 0.0,
            candidates: BTreeMap::new(),
        }
    }

    /// Gate hits below a relative speed
    pub fn with_min_relative_speed(mut self, speed: f32) -> Self {
        self.min_relative_speed = speed;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ImpactError> {
        if let TriggerMode::Interval(period) = self.mode {
            if !period.is_finite() || period <= 0.0 {
                return Err(ImpactError::InvalidGeometry(format!(
                    "trigger re-hit interval must be positive, got {}",
                    period
                )));
            }
        }
        if !self.min_relative_speed.is_finite() || self.min_relative_speed < 0.0 {
            return Err(ImpactError::InvalidGeometry(format!(
                "minimum relative speed must be non-negative, got {}",
                self.min_relative_speed
            )));
        }
        Ok(())
    }

    /// Start tracking an overlapping collider
    pub fn enter(&mut self, target: TargetId) {
        self.candidates.entry(target).or_insert_with(|| Countdown::ready(0.0));
    }

    /// Stop tracking a collider
    pub fn exit(&mut self, target: TargetId) {
        self.candidates.remove(&target);
    }

    /// Whether a collider is being tracked
    pub fn is_tracking(&self, target: TargetId) -> bool {
        self.candidates.contains_key(&target)
    }

    /// Number of tracked candidates
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Forget every candidate
    pub fn clear(&mut self) {
        self.candidates.clear();
    }

    /// Run down the per-candidate re-hit countdowns
    pub fn advance(&mut self, delta_time: f32) {
        for cooldown in self.candidates.values_mut() {
            cooldown.run_down(delta_time);
        }
    }

    /// Every candidate whose countdown has elapsed and that passes the speed gate
    pub fn perform_hit_checks(
        &mut self,
        core: &DetectorCore,
        ctx: &QueryContext<'_>,
    ) -> Vec<HitCollisionInfo> {
        let origin = core.motion.current;
        let own_velocity = core.motion.velocity;
        let min_speed = self.min_relative_speed;

        let mut hits = Vec::new();
        for (&target, cooldown) in &self.candidates {
            if !cooldown.is_elapsed() || !core.is_fresh(target) {
                continue;
            }
            if min_speed > 0.0 {
                let other = ctx.spatial.velocity(target).unwrap_or_else(Vec3::zeros);
                if (own_velocity - other).norm() < min_speed {
                    continue;
                }
            }

            let position = ctx.spatial.position(target);
            hits.push(HitCollisionInfo {
                point: position,
                direction: position.and_then(|p| try_direction(p - origin)),
                ..HitCollisionInfo::new(target)
            });
        }

        for hit in &hits {
            match self.mode {
                TriggerMode::SingleHit => {
                    self.candidates.remove(&hit.target);
                }
                TriggerMode::Interval(period) => {
                    self.candidates.insert(hit.target, Countdown::new(period));
                }
            }
        }
        hits
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

    fn setup() -> (SphereWorld, TargetId, DetectorCore) {
        let mut world = SphereWorld::new();
        let target = world.add(Vec3::new(0.0, 0.0, 1.0), 1.0, HitLayers::ENEMY);
        let core = DetectorCore::new(Piercing::infinite(), 0.0, 0.0);
        (world, target, core)
    }

    #[test]
    fn test_single_hit_mode_reports_once() {
        let (world, target, core) = setup();
        let roster = Roster::new();
        let config = ImpactConfig::default();
        let ctx = QueryContext { spatial: &world, actors: &roster, config: &config };

        let mut trigger = TriggerDetector::new(TriggerMode::SingleHit);
        trigger.enter(target);
        assert_eq!(trigger.perform_hit_checks(&core, &ctx).len(), 1);
        assert!(!trigger.is_tracking(target));
        assert!(trigger.perform_hit_checks(&core, &ctx).is_empty());
    }

    #[test]
    fn test_interval_mode_rearms() {
        let (world, target, core) = setup();
        let roster = Roster::new();
        let config = ImpactConfig::default();
        let ctx = QueryContext { spatial: &world, actors: &roster, config: &config };

        let mut trigger = TriggerDetector::new(TriggerMode::Interval(0.5));
        trigger.enter(target);
        assert_eq!(trigger.perform_hit_checks(&core, &ctx).len(), 1);

        trigger.advance(0.25);
        assert!(trigger.perform_hit_checks(&core, &ctx).is_empty());

        trigger.advance(0.25);
        assert_eq!(trigger.perform_hit_checks(&core, &ctx).len(), 1);

        trigger.exit(target);
        trigger.advance(1.0);
        assert!(trigger.perform_hit_checks(&core, &ctx).is_empty());
    }

    #[test]
    fn test_relative_speed_gate() {
        let (mut world, target, mut core) = setup();
        let roster = Roster::new();
        let config = ImpactConfig::default();

        let mut trigger = TriggerDetector::new(TriggerMode::SingleHit).with_min_relative_speed(5.0);
        trigger.enter(target);

        core.motion.velocity = Vec3::new(0.0, 0.0, 2.0);
        world.set_velocity(target, Vec3::new(0.0, 0.0, -1.0));
        {
            let ctx = QueryContext { spatial: &world, actors: &roster, config: &config };
            assert!(trigger.perform_hit_checks(&core, &ctx).is_empty());
            assert!(trigger.is_tracking(target));
        }

        world.set_velocity(target, Vec3::new(0.0, 0.0, -4.0));
        let ctx = QueryContext { spatial: &world, actors: &roster, config: &config };
        assert_eq!(trigger.perform_hit_checks(&core, &ctx).len(), 1);
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(TriggerDetector::new(TriggerMode::Interval(0.0)).validate().is_err());
    }
}
