//! Collision primitives
//!
//! - [`primitives`] - Basic geometric primitives (rays, segments, spheres)

pub mod primitives;

pub use primitives::{BoundingSphere, Ray, Segment};
