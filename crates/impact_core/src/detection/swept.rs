//! Swept-volume detector
//!
//! Sweeps a sphere from the last-tick position to the current position and
//! reports the first fresh contact along the travel vector.

use super::{DetectorCore, HitCollisionInfo, QueryContext};
use crate::error::ImpactError;
use crate::physics::Segment;

/// Sphere-cast detection strategy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweptDetector {
    /// Radius of the swept sphere
    pub radius: f32,
}

impl SweptDetector {
    /// Sweep a sphere of `radius`
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    pub(crate) fn validate(&self) -> Result<(), ImpactError> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ImpactError::InvalidGeometry(format!(
                "swept radius must be positive, got {}",
                self.radius
            )));
        }
        Ok(())
    }

    /// First fresh contact along the travel vector
    pub fn perform_hit_check(
        &mut self,
        core: &DetectorCore,
        ctx: &QueryContext<'_>,
    ) -> Option<HitCollisionInfo> {
        let segment = Segment::new(core.motion.previous, core.motion.current);
        let direction = core.motion.travel_direction();
        ctx.spatial
            .sweep_sphere(&segment, self.radius, core.mask)
            .into_iter()
            .find(|hit| core.is_fresh(hit.target))
            .map(|hit| HitCollisionInfo::from_spatial(&hit, Some(direction)))
    }
}
