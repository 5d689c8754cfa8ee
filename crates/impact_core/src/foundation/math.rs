//! Math utilities and types
//!
//! Provides the vector types used by detectors and the spatial backend.

pub use nalgebra::Vector3;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Lengths below this are treated as zero when normalizing travel vectors
pub const DIRECTION_EPSILON: f32 = 1.0e-6;

/// Normalize a vector, returning `None` for (near) zero-length input
pub fn try_direction(vector: Vec3) -> Option<Vec3> {
    vector.try_normalize(DIRECTION_EPSILON)
}

/// Normalize a vector, falling back to `fallback` for (near) zero-length input
pub fn direction_or(vector: Vec3, fallback: Vec3) -> Vec3 {
    try_direction(vector).unwrap_or(fallback)
}

/// Motion state shared by every detector
///
/// `previous` is the position recorded at the end of the last processed tick,
/// `current` is where the host placed the detector for this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    /// Position this tick
    pub current: Vec3,
    /// Position at the end of the previous processed tick
    pub previous: Vec3,
    /// Velocity reported by the host (used by relative-velocity gates)
    pub velocity: Vec3,
    /// Facing used when the detector has not moved
    pub forward: Vec3,
}

impl Default for Motion {
    fn default() -> Self {
        Self::at(Vec3::zeros())
    }
}

impl Motion {
    /// Create a motion state resting at `position`, facing +Z
    pub fn at(position: Vec3) -> Self {
        Self {
            current: position,
            previous: position,
            velocity: Vec3::zeros(),
            forward: Vec3::z(),
        }
    }

    /// Displacement since the previous tick
    pub fn travel(&self) -> Vec3 {
        self.current - self.previous
    }

    /// Direction of travel, or the facing when stationary
    pub fn travel_direction(&self) -> Vec3 {
        direction_or(self.travel(), self.forward)
    }

    /// Move to a new position for this tick
    pub fn move_to(&mut self, position: Vec3) {
        self.current = position;
    }

    /// Commit the current position as the previous-tick position
    pub fn settle(&mut self) {
        self.previous = self.current;
    }

    /// Teleport without sweeping (previous and current both set)
    pub fn teleport(&mut self, position: Vec3) {
        self.current = position;
        self.previous = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_travel_direction_falls_back_to_forward() {
        let mut motion = Motion::at(Vec3::new(1.0, 2.0, 3.0));
        motion.forward = Vec3::x();
        assert_relative_eq!(motion.travel_direction(), Vec3::x());

        motion.move_to(Vec3::new(1.0, 2.0, 8.0));
        assert_relative_eq!(motion.travel_direction(), Vec3::z());
        assert_relative_eq!(motion.travel().norm(), 5.0);

        motion.settle();
        assert_relative_eq!(motion.travel().norm(), 0.0);
    }
}
