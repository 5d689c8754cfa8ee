//! Primitive collision shapes and intersection algorithms
//!
//! Provides rays, finite segments and bounding spheres with the intersection
//! tests the detectors need: segment casts, swept spheres and overlaps.

use crate::foundation::math::{direction_or, Vec3, DIRECTION_EPSILON};

/// A ray for ray casting
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// A finite line segment between two world-space points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start point
    pub start: Vec3,
    /// End point
    pub end: Vec3,
}

impl Segment {
    /// Creates a segment from `start` to `end`
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    /// Length of the segment
    pub fn length(&self) -> f32 {
        (self.end - self.start).norm()
    }

    /// Whether the segment is too short to have a direction
    pub fn is_degenerate(&self) -> bool {
        self.length() <= DIRECTION_EPSILON
    }

    /// Unit direction from start to end (+Z for degenerate segments)
    pub fn direction(&self) -> Vec3 {
        direction_or(self.end - self.start, Vec3::z())
    }

    /// Ray starting at `start` along the segment
    pub fn ray(&self) -> Ray {
        Ray::new(self.start, self.direction())
    }
}

/// A bounding sphere for collision detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Check if a point lies inside or on the sphere
    pub fn contains(&self, point: Vec3) -> bool {
        (point - self.center).magnitude_squared() <= self.radius * self.radius
    }

    /// Test ray intersection with this sphere
    /// Returns (distance, hit_point, normal) if hit, None otherwise
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, Vec3, Vec3)> {
        // Solve: |origin + t*direction - center|^2 = radius^2
        let oc = ray.origin - self.center;
        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * oc.dot(&ray.direction);
        let c = oc.dot(&oc) - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_discriminant = discriminant.sqrt();
        let t1 = (-b - sqrt_discriminant) / (2.0 * a);
        let t2 = (-b + sqrt_discriminant) / (2.0 * a);

        let t = if t1 >= 0.0 {
            t1
        } else if t2 >= 0.0 {
            t2
        } else {
            return None; // Ray pointing away from sphere
        };

        let hit_point = ray.point_at(t);
        let normal = direction_or(hit_point - self.center, -ray.direction);

        Some((t, hit_point, normal))
    }

    /// Test a finite segment against this sphere
    ///
    /// A segment starting inside the sphere hits at distance 0.
    /// Returns (distance, hit_point, normal) if hit, None otherwise
    pub fn intersect_segment(&self, segment: &Segment) -> Option<(f32, Vec3, Vec3)> {
        if self.contains(segment.start) {
            let normal = direction_or(segment.start - self.center, -segment.direction());
            return Some((0.0, segment.start, normal));
        }
        if segment.is_degenerate() {
            return None;
        }

        let length = segment.length();
        self.intersect_ray(&segment.ray())
            .filter(|(t, _, _)| *t <= length)
    }

    /// Sweep a sphere of radius `radius` along `segment` against this sphere
    ///
    /// Returns the travel distance at first contact, the contact point on this
    /// sphere's surface and the contact normal.
    pub fn sweep_sphere(&self, segment: &Segment, radius: f32) -> Option<(f32, Vec3, Vec3)> {
        let inflated = BoundingSphere::new(self.center, self.radius + radius.max(0.0));
        inflated
            .intersect_segment(segment)
            .map(|(t, _, normal)| (t, self.center + normal * self.radius, normal))
    }
}
