//! On-hit side effects
//!
//! Observers run after a hit has been consumed by the damage pipeline and before
//! the terminal check. Their output is collected as [`SideEffect`] records for the
//! host to apply.

use crate::damage::Resolution;
use crate::foundation::collections::{DetectorId, ObjectHandle, PrefabId, TargetId};
use crate::foundation::math::Vec3;

/// When an area burst fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaWhen {
    /// On every consumed hit
    OnHit,
    /// Only on the terminal evaluation hit
    OnFinalHit,
}

/// What a consumed hit looked like, handed to notification callbacks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitReport {
    /// Detector that produced the hit
    pub detector: DetectorId,
    /// Target that was hit
    pub target: TargetId,
    /// Contact point
    pub point: Vec3,
    /// Travel or contact direction, if known
    pub direction: Option<Vec3>,
    /// Pipeline outcome
    pub resolution: Resolution,
    /// Whether the hit was flagged final for this tick
    pub final_hit: bool,
}

/// Callback type for [`HitObserver::Notify`]
pub type HitCallback = Box<dyn FnMut(&HitReport)>;

/// Side-effect hook attached to a detector
pub enum HitObserver {
    /// Spawn a prefab at the contact point
    SpawnOnHit {
        /// Prefab to spawn
        prefab: PrefabId,
        /// Only spawn on final hits
        final_only: bool,
    },
    /// Ask the host to break the physical body that was hit
    BreakPhysical {
        /// Impulse magnitude along the hit direction
        impulse: f32,
    },
    /// Fire an on-demand area detector at the contact point
    TriggerArea {
        /// Area detector to fire
        area: DetectorId,
        /// Which hits fire it
        when: AreaWhen,
    },
    /// Generic notification
    Notify(HitCallback),
}

impl std::fmt::Debug for HitObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HitObserver::SpawnOnHit { prefab, final_only } => f
                .debug_struct("SpawnOnHit")
                .field("prefab", prefab)
                .field("final_only", final_only)
                .finish(),
            HitObserver::BreakPhysical { impulse } => {
                f.debug_struct("BreakPhysical").field("impulse", impulse).finish()
            }
            HitObserver::TriggerArea { area, when } => f
                .debug_struct("TriggerArea")
                .field("area", area)
                .field("when", when)
                .finish(),
            HitObserver::Notify(_) => f.write_str("Notify(..)"),
        }
    }
}

/// Effect emitted by an observer for the host to apply
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SideEffect {
    /// A prefab instance was spawned
    Spawned {
        /// Detector whose hit spawned it
        detector: DetectorId,
        /// Spawned prefab
        prefab: PrefabId,
        /// New instance
        handle: ObjectHandle,
        /// Spawn position
        at: Vec3,
        /// Whether it came from a pool (false: instantiated after exhaustion)
        pooled: bool,
    },
    /// The host should break the body that was hit
    BreakRequested {
        /// Detector whose hit requested it
        detector: DetectorId,
        /// Collider to break
        target: TargetId,
        /// Impulse to apply
        impulse: Vec3,
    },
    /// An area burst was queued
    AreaTriggered {
        /// Detector whose hit fired the area
        instigator: DetectorId,
        /// Area detector
        area: DetectorId,
        /// Burst center
        at: Vec3,
    },
}
