//! Geometry used by detectors and the reference spatial backend
//!
//! The hit-detection core does not simulate physics; it only needs the primitives
//! to describe queries (segments, spheres) and the layer masks that filter them.

pub mod collision;
pub mod collision_layers;

pub use collision::{BoundingSphere, Ray, Segment};
pub use collision_layers::HitLayers;
