//! One-shot area aggregator
//!
//! Never registered with the scheduler: another detector's hit fires it through
//! `Scheduler::trigger_area`. Returns every eligible target in the bounded
//! overlap at once. Neutral geometry and stale colliders are dropped here, at
//! query time, so they never reach resolution.

use super::{DetectorCore, HitCollisionInfo, QueryContext};
use crate::error::ImpactError;
use crate::foundation::math::try_direction;

/// Bounded volume query strategy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaDetector {
    /// Radius of the burst
    pub radius: f32,
}

impl AreaDetector {
    /// Burst of the given radius
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    pub(crate) fn validate(&self) -> Result<(), ImpactError> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ImpactError::InvalidGeometry(format!(
                "area radius must be positive, got {}",
                self.radius
            )));
        }
        Ok(())
    }

    /// Every owned target overlapping the burst at the current position
    pub fn perform_hit_checks(
        &mut self,
        core: &DetectorCore,
        ctx: &QueryContext<'_>,
    ) -> Vec<HitCollisionInfo> {
        let center = core.motion.current;
        ctx.spatial
            .overlap_sphere(center, self.radius, core.mask, ctx.config.area.max_results)
            .iter()
            .filter(|hit| core.is_fresh(hit.target))
            .filter(|hit| ctx.actors.is_valid(hit.target) && ctx.actors.owner_of(hit.target).is_some())
            .map(|hit| HitCollisionInfo::from_spatial(hit, try_direction(hit.point - center)))
            .collect()
    }
}
