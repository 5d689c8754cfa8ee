//! Brute-force reference backend over bounding-sphere colliders

use super::{SpatialBackend, SpatialHit};
use crate::foundation::collections::{SlotMap, TargetId};
use crate::foundation::math::{direction_or, Vec3};
use crate::physics::{BoundingSphere, HitLayers, Segment};

/// Collider stored by [`SphereWorld`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereCollider {
    /// World-space bounds
    pub sphere: BoundingSphere,
    /// Layer the collider lives on
    pub layer: HitLayers,
    /// Velocity reported to relative-speed gates
    pub velocity: Vec3,
}

/// Linear-scan spatial backend
///
/// Good enough for tests, demos and small arenas. Queries cost O(n).
#[derive(Debug, Default)]
pub struct SphereWorld {
    colliders: SlotMap<TargetId, SphereCollider>,
}

impl SphereWorld {
    /// Create an empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stationary collider
    pub fn add(&mut self, center: Vec3, radius: f32, layer: HitLayers) -> TargetId {
        self.colliders.insert(SphereCollider {
            sphere: BoundingSphere::new(center, radius),
            layer,
            velocity: Vec3::zeros(),
        })
    }

    /// Remove a collider
    pub fn remove(&mut self, target: TargetId) -> Option<SphereCollider> {
        self.colliders.remove(target)
    }

    /// Move a collider
    pub fn set_position(&mut self, target: TargetId, center: Vec3) {
        if let Some(collider) = self.colliders.get_mut(target) {
            collider.sphere.center = center;
        }
    }

    /// Set the velocity reported for a collider
    pub fn set_velocity(&mut self, target: TargetId, velocity: Vec3) {
        if let Some(collider) = self.colliders.get_mut(target) {
            collider.velocity = velocity;
        }
    }

    /// Look up a collider
    pub fn collider(&self, target: TargetId) -> Option<&SphereCollider> {
        self.colliders.get(target)
    }

    /// Number of colliders
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// Whether the world holds no colliders
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    fn sorted(mut hits: Vec<SpatialHit>) -> Vec<SpatialHit> {
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

impl SpatialBackend for SphereWorld {
    fn raycast(&self, segment: &Segment, mask: HitLayers) -> Vec<SpatialHit> {
        let hits = self
            .colliders
            .iter()
            .filter(|(_, c)| mask.accepts(c.layer))
            .filter_map(|(target, c)| {
                c.sphere.intersect_segment(segment).map(|(distance, point, normal)| SpatialHit {
                    target,
                    point,
                    normal,
                    distance,
                    layer: c.layer,
                })
            })
            .collect();
        Self::sorted(hits)
    }

    fn overlap_sphere(
        &self,
        center: Vec3,
        radius: f32,
        mask: HitLayers,
        max_results: usize,
    ) -> Vec<SpatialHit> {
        let query = BoundingSphere::new(center, radius);
        let hits = self
            .colliders
            .iter()
            .filter(|(_, c)| mask.accepts(c.layer) && c.sphere.intersects(&query))
            .map(|(target, c)| {
                let offset = center - c.sphere.center;
                let normal = direction_or(offset, Vec3::y());
                let gap = offset.norm() - c.sphere.radius;
                let point = if gap <= 0.0 {
                    center
                } else {
                    c.sphere.center + normal * c.sphere.radius
                };
                SpatialHit {
                    target,
                    point,
                    normal,
                    distance: gap.max(0.0),
                    layer: c.layer,
                }
            })
            .collect();

        let mut hits = Self::sorted(hits);
        hits.truncate(max_results);
        hits
    }

    fn sweep_sphere(&self, segment: &Segment, radius: f32, mask: HitLayers) -> Vec<SpatialHit> {
        let hits = self
            .colliders
            .iter()
            .filter(|(_, c)| mask.accepts(c.layer))
            .filter_map(|(target, c)| {
                c.sphere.sweep_sphere(segment, radius).map(|(distance, point, normal)| SpatialHit {
                    target,
                    point,
                    normal,
                    distance,
                    layer: c.layer,
                })
            })
            .collect();
        Self::sorted(hits)
    }

    fn position(&self, target: TargetId) -> Option<Vec3> {
        self.colliders.get(target).map(|c| c.sphere.center)
    }

    fn velocity(&self, target: TargetId) -> Option<Vec3> {
        self.colliders.get(target).map(|c| c.velocity)
    }
}
