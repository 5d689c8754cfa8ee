//! Single-target proximity detector (homing payloads)

use super::{DetectorCore, HitCollisionInfo, QueryContext};
use crate::error::ImpactError;
use crate::foundation::collections::TargetId;
use crate::foundation::math::try_direction;
use log::debug;

/// Proximity check against one explicitly bound target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingleTargetDetector {
    /// Bound target
    pub target: Option<TargetId>,
    /// Distance at which the target counts as hit
    pub radius: f32,
}

impl SingleTargetDetector {
    /// Unbound detector with the given proximity radius
    pub fn new(radius: f32) -> Self {
        Self { target: None, radius }
    }

    /// Bind a target
    pub fn with_target(mut self, target: TargetId) -> Self {
        self.target = Some(target);
        self
    }

    /// Rebind to another target
    pub fn bind(&mut self, target: TargetId) {
        self.target = Some(target);
    }

    /// Drop the bound target
    pub fn unbind(&mut self) {
        self.target = None;
    }

    pub(crate) fn validate(&self) -> Result<(), ImpactError> {
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(ImpactError::InvalidGeometry(format!(
                "proximity radius must be non-negative, got {}",
                self.radius
            )));
        }
        Ok(())
    }

    /// Hit when the bound target is within range
    pub fn perform_hit_check(
        &mut self,
        core: &DetectorCore,
        ctx: &QueryContext<'_>,
    ) -> Option<HitCollisionInfo> {
        let target = self.target?;
        if !core.is_fresh(target) {
            return None;
        }

        let Some(position) = ctx.spatial.position(target) else {
            debug!("Bound target {:?} of detector {:?} has no position", target, core.id());
            return None;
        };

        let offset = position - core.motion.current;
        (offset.norm() <= self.radius).then(|| HitCollisionInfo {
            point: Some(position),
            direction: try_direction(offset),
            ..HitCollisionInfo::new(target)
        })
    }
}
