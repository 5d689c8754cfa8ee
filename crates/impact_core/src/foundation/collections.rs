//! Stable id types
//!
//! Every object the hit-detection core refers to is addressed through a slotmap key,
//! so a stale id can be detected instead of aliasing a recycled slot.

pub use slotmap::{SlotMap, SecondaryMap, Key};

slotmap::new_key_type! {
    /// Stable id of a detector stored in the scheduler
    pub struct DetectorId;

    /// Id of a collider known to the spatial backend (a potential hit target)
    pub struct TargetId;

    /// Id of an owning entity (actor) in the ownership provider
    pub struct ActorId;

    /// Handle of a host object (projectile body, spawned effect) managed by a pool
    pub struct ObjectHandle;
}

/// Identifier of a spawnable prefab known to the object pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct PrefabId(pub u32);
