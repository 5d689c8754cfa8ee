//! Abstract spatial query interface consumed by detectors
//!
//! Detectors issue segment casts, bounded sphere overlaps and sphere sweeps.
//! Implementations report every hit in increasing distance order; "no hit" is an
//! empty result, never an error.

use crate::foundation::collections::TargetId;
use crate::foundation::math::Vec3;
use crate::physics::{HitLayers, Segment};

/// One intersection reported by the backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialHit {
    /// Collider that was hit
    pub target: TargetId,
    /// World-space contact point
    pub point: Vec3,
    /// Contact normal (pointing away from the collider)
    pub normal: Vec3,
    /// Distance along the query (overlap queries: distance from the query center
    /// to the collider surface, 0 when inside)
    pub distance: f32,
    /// Layer of the collider
    pub layer: HitLayers,
}

/// Intersection queries used by detectors
pub trait SpatialBackend {
    /// All colliders crossed by the segment, nearest first
    fn raycast(&self, segment: &Segment, mask: HitLayers) -> Vec<SpatialHit>;

    /// Colliders overlapping a sphere, nearest first, at most `max_results`
    fn overlap_sphere(
        &self,
        center: Vec3,
        radius: f32,
        mask: HitLayers,
        max_results: usize,
    ) -> Vec<SpatialHit>;

    /// Colliders touched by a sphere of `radius` swept along the segment, nearest first
    fn sweep_sphere(&self, segment: &Segment, radius: f32, mask: HitLayers) -> Vec<SpatialHit>;

    /// Current position of a collider
    fn position(&self, target: TargetId) -> Option<Vec3>;

    /// Current velocity of a collider
    fn velocity(&self, target: TargetId) -> Option<Vec3>;
}
