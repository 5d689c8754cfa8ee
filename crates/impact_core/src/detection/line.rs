//! Line / polyline detector
//!
//! Casts each segment of a polyline in order and collects every collision along
//! the path, nearest first within a segment. The path is clipped at the first
//! ownerless collider: nothing behind neutral geometry is reported. The scheduler
//! resolves the returned hits one by one and stops as soon as the detector
//! retires.

use super::{DetectorCore, HitCollisionInfo, QueryContext};
use crate::error::ImpactError;
use crate::foundation::math::Vec3;
use crate::physics::Segment;
use std::collections::HashSet;

/// Polyline sweep strategy
#[derive(Debug, Clone, PartialEq)]
pub struct LineDetector {
    /// Polyline vertices relative to the detector position
    pub points: Vec<Vec3>,
}

impl LineDetector {
    /// Polyline through the given offsets
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    /// Straight line from the detector position along `direction` for `length`
    pub fn straight(direction: Vec3, length: f32) -> Self {
        Self::new(vec![Vec3::zeros(), direction.normalize() * length])
    }

    pub(crate) fn validate(&self) -> Result<(), ImpactError> {
        if self.points.len() < 2 {
            return Err(ImpactError::InvalidGeometry(format!(
                "a line needs at least two points, got {}",
                self.points.len()
            )));
        }
        if self.points.iter().any(|p| !p.iter().all(|c| c.is_finite())) {
            return Err(ImpactError::InvalidGeometry("line points must be finite".to_string()));
        }
        Ok(())
    }

    /// World-space segments for a detector at `origin`
    pub fn segments(&self, origin: Vec3) -> Vec<Segment> {
        self.points
            .windows(2)
            .map(|pair| Segment::new(origin + pair[0], origin + pair[1]))
            .collect()
    }

    /// Every fresh hit along the path, clipped at the first ownerless collider
    pub fn perform_hit_checks(
        &mut self,
        core: &DetectorCore,
        ctx: &QueryContext<'_>,
    ) -> Vec<HitCollisionInfo> {
        let mut seen = HashSet::new();
        let mut hits = Vec::new();

        for segment in self.segments(core.motion.current) {
            let direction = segment.direction();
            for hit in ctx.spatial.raycast(&segment, core.mask) {
                if !core.is_fresh(hit.target) || !seen.insert(hit.target) {
                    continue;
                }
                hits.push(HitCollisionInfo::from_spatial(&hit, Some(direction)));

                let blocks = ctx.actors.is_valid(hit.target) && ctx.actors.owner_of(hit.target).is_none();
                if blocks {
                    return hits;
                }
            }
        }
        hits
    }
}
