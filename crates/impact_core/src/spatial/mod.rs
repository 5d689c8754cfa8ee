//! Spatial query backend
//!
//! The hit-detection core consumes intersection results only. Any acceleration
//! structure can sit behind [`SpatialBackend`]; [`SphereWorld`] is a brute-force
//! reference implementation over bounding spheres.

pub mod spatial_query;
pub mod sphere_world;

pub use spatial_query::{SpatialBackend, SpatialHit};
pub use sphere_world::{SphereCollider, SphereWorld};
