//! Object pool and teardown collaborator
//!
//! Detectors are usually backed by a host object (a projectile body, a hitbox
//! attached to an animation). When a detector retires, its host is returned to its
//! pool, deactivated, or destroyed after a delay, in that fallback order.
//! Spawn-on-hit effects are acquired from the same service.

mod object_pool;

pub use object_pool::{ObjectPool, ObjectState, PoolStats};

use crate::foundation::collections::{DetectorId, ObjectHandle, PrefabId};
use serde::{Deserialize, Serialize};

/// Callback invoked when a pooled object is handed back
pub type ReturnHook = Box<dyn FnMut(ObjectHandle)>;

/// Pool and lifetime service for host objects
pub trait PoolService {
    /// Take a pooled instance of `prefab`; `None` when the pool is exhausted or absent
    fn acquire(&mut self, prefab: PrefabId, on_return: Option<ReturnHook>) -> Option<ObjectHandle>;

    /// Return an instance to its pool; `false` when it does not belong to one
    fn release(&mut self, handle: ObjectHandle) -> bool;

    /// Create an instance outside any pool
    fn instantiate(&mut self, prefab: PrefabId) -> ObjectHandle;

    /// Deactivate an instance in place; `false` when it cannot be deactivated
    fn deactivate(&mut self, handle: ObjectHandle) -> bool;

    /// Destroy an instance after `delay` seconds
    fn destroy_after(&mut self, handle: ObjectHandle, delay: f32);
}

/// Preferred teardown of a retired detector's host object
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum TeardownPolicy {
    /// Return to the pool, else deactivate, else destroy immediately
    #[default]
    ReturnToPool,
    /// Deactivate, else destroy immediately
    Deactivate,
    /// Destroy after the given delay in seconds
    DestroyAfter(f32),
}

/// Teardown actually performed for a retired detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Teardown {
    /// Host went back to its pool
    Pooled,
    /// Host was deactivated in place
    Deactivated,
    /// Host (if any) was scheduled for destruction and the detector is dropped
    Destroyed {
        /// Delay passed to the pool service
        delay: f32,
    },
    /// Manual-destroy detector; the caller owns teardown
    Deferred,
}

/// Record of one retired detector, drained by the host each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Retirement {
    /// Retired detector
    pub detector: DetectorId,
    /// Host object backing the detector
    pub host: Option<ObjectHandle>,
    /// What happened to the host
    pub teardown: Teardown,
}
