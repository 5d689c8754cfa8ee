//! Per-prefab object pools
//!
//! Each prefab gets its own bounded free list, preallocated at creation.
//! Instances created outside a pool (exhaustion fallback) can only be deactivated
//! or destroyed.

use super::{PoolService, ReturnHook};
use crate::foundation::collections::{ObjectHandle, PrefabId, SlotMap};
use log::{debug, warn};
use std::collections::HashMap;

/// Lifecycle state of a managed object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    /// Sitting in its pool's free list
    Pooled,
    /// Handed out and live
    Active,
    /// Deactivated in place
    Inactive,
    /// Waiting for a scheduled destroy
    Destroying,
}

struct ManagedObject {
    prefab: PrefabId,
    state: ObjectState,
    pooled: bool,
    on_return: Option<ReturnHook>,
}

/// Statistics for the object pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Successful acquisitions
    pub acquired: u64,
    /// Objects returned to a pool
    pub released: u64,
    /// Objects created outside a pool
    pub instantiated: u64,
    /// Objects removed after their destroy delay
    pub destroyed: u64,
}

/// Reference [`PoolService`] implementation
#[derive(Default)]
pub struct ObjectPool {
    objects: SlotMap<ObjectHandle, ManagedObject>,
    free: HashMap<PrefabId, Vec<ObjectHandle>>,
    deactivated: Vec<ObjectHandle>,
    scheduled: Vec<(ObjectHandle, f32)>,
    stats: PoolStats,
}

impl ObjectPool {
    /// Create a pool service with no prefab pools
    pub fn new() -> Self {
        Self::default()
    }

    /// Preallocate `capacity` pooled instances of `prefab`
    pub fn create_pool(&mut self, prefab: PrefabId, capacity: usize) {
        for _ in 0..capacity {
            let handle = self.objects.insert(ManagedObject {
                prefab,
                state: ObjectState::Pooled,
                pooled: true,
                on_return: None,
            });
            self.free.entry(prefab).or_default().push(handle);
        }
        debug!("Created pool for {:?} with {} instances", prefab, capacity);
    }

    /// Free instances left for a prefab
    pub fn available(&self, prefab: PrefabId) -> usize {
        self.free.get(&prefab).map_or(0, Vec::len)
    }

    /// State of an object, `None` once destroyed
    pub fn state(&self, handle: ObjectHandle) -> Option<ObjectState> {
        self.objects.get(handle).map(|o| o.state)
    }

    /// Prefab of an object
    pub fn prefab(&self, handle: ObjectHandle) -> Option<PrefabId> {
        self.objects.get(handle).map(|o| o.prefab)
    }

    /// Number of active objects
    pub fn active_count(&self) -> usize {
        self.objects.values().filter(|o| o.state == ObjectState::Active).count()
    }

    /// Objects deactivated since the last drain
    pub fn drain_deactivated(&mut self) -> Vec<ObjectHandle> {
        std::mem::take(&mut self.deactivated)
    }

    /// Advance scheduled destroys; returns the objects removed this call
    pub fn update(&mut self, delta_time: f32) -> Vec<ObjectHandle> {
        let mut removed = Vec::new();
        self.scheduled.retain_mut(|(handle, remaining)| {
            *remaining -= delta_time;
            if *remaining <= 0.0 {
                removed.push(*handle);
                false
            } else {
                true
            }
        });

        for handle in &removed {
            self.objects.remove(*handle);
        }
        self.stats.destroyed += removed.len() as u64;
        removed
    }

    /// Get current statistics
    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

impl PoolService for ObjectPool {
    fn acquire(&mut self, prefab: PrefabId, on_return: Option<ReturnHook>) -> Option<ObjectHandle> {
        let handle = self.free.get_mut(&prefab)?.pop()?;
        let object = self.objects.get_mut(handle)?;
        object.state = ObjectState::Active;
        object.on_return = on_return;
        self.stats.acquired += 1;
        Some(handle)
    }

    fn release(&mut self, handle: ObjectHandle) -> bool {
        let Some(object) = self.objects.get_mut(handle) else {
            warn!("Release of unknown object {:?}", handle);
            return false;
        };
        if !object.pooled || matches!(object.state, ObjectState::Pooled | ObjectState::Destroying) {
            return false;
        }

        object.state = ObjectState::Pooled;
        if let Some(mut hook) = object.on_return.take() {
            hook(handle);
        }
        self.free.entry(object.prefab).or_default().push(handle);
        self.stats.released += 1;
        true
    }

    fn instantiate(&mut self, prefab: PrefabId) -> ObjectHandle {
        self.stats.instantiated += 1;
        self.objects.insert(ManagedObject {
            prefab,
            state: ObjectState::Active,
            pooled: false,
            on_return: None,
        })
    }

    fn deactivate(&mut self, handle: ObjectHandle) -> bool {
        match self.objects.get_mut(handle) {
            Some(object) if object.state == ObjectState::Active => {
                object.state = ObjectState::Inactive;
                self.deactivated.push(handle);
                true
            }
            _ => false,
        }
    }

    fn destroy_after(&mut self, handle: ObjectHandle, delay: f32) {
        let Some(object) = self.objects.get_mut(handle) else {
            warn!("Destroy of unknown object {:?}", handle);
            return;
        };
        if object.state == ObjectState::Destroying {
            return;
        }
        if object.state == ObjectState::Pooled {
            if let Some(free) = self.free.get_mut(&object.prefab) {
                free.retain(|h| *h != handle);
            }
        }
        object.state = ObjectState::Destroying;
        self.scheduled.push((handle, delay.max(0.0)));
    }
}

impl std::fmt::Debug for ObjectPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("objects", &self.objects.len())
            .field("scheduled", &self.scheduled.len())
            .field("stats", &self.stats)
            .finish()
    }
}
