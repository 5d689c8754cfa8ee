//! Hit detectors
//!
//! A closed set of detection strategies behind one interface. Shared lifecycle and
//! piercing state lives in [`DetectorCore`]; the per-variant geometry lives in
//! [`DetectorKind`]. Single-hit variants implement `perform_hit_check`, multi-hit
//! variants `perform_hit_checks`; [`Detector::detect`] wraps both into a
//! [`Detection`] the scheduler dispatches.

mod area;
mod builder;
mod detector_core;
mod history;
mod line;
mod observer;
mod piercing;
mod point_forward;
mod single_target;
mod swept;
mod trigger;

pub use area::AreaDetector;
pub use builder::DetectorBuilder;
pub use detector_core::{DetectorCore, TerminalCallback, TerminalReport};
pub use history::HitHistory;
pub use line::LineDetector;
pub use observer::{AreaWhen, HitCallback, HitObserver, HitReport, SideEffect};
pub use piercing::{PierceState, Piercing};
pub use point_forward::{AuxRay, PointForwardDetector};
pub use single_target::SingleTargetDetector;
pub use swept::SweptDetector;
pub use trigger::{TriggerDetector, TriggerMode};

use crate::actor::ActorProvider;
use crate::config::ImpactConfig;
use crate::foundation::collections::{ActorId, DetectorId, TargetId};
use crate::foundation::math::Vec3;
use crate::physics::HitLayers;
use crate::spatial::{SpatialBackend, SpatialHit};

/// One candidate hit produced by a detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitCollisionInfo {
    /// Collider that was hit
    pub target: TargetId,
    /// Contact point, if known
    pub point: Option<Vec3>,
    /// Travel or contact direction, if known
    pub direction: Option<Vec3>,
    /// Layer of the collider
    pub layer: HitLayers,
    /// Actor to resolve as the dealer instead of the detector owner
    pub override_dealer: Option<ActorId>,
}

impl HitCollisionInfo {
    /// Hit on a target with no geometric detail
    pub fn new(target: TargetId) -> Self {
        Self {
            target,
            point: None,
            direction: None,
            layer: HitLayers::empty(),
            override_dealer: None,
        }
    }

    /// Build from a backend result
    pub fn from_spatial(hit: &SpatialHit, direction: Option<Vec3>) -> Self {
        Self {
            target: hit.target,
            point: Some(hit.point),
            direction,
            layer: hit.layer,
            override_dealer: None,
        }
    }

    /// Builder-style dealer override
    pub fn with_override_dealer(mut self, dealer: ActorId) -> Self {
        self.override_dealer = Some(dealer);
        self
    }
}

/// Collaborators a detector may read while querying
#[derive(Clone, Copy)]
pub struct QueryContext<'a> {
    /// Spatial backend
    pub spatial: &'a dyn SpatialBackend,
    /// Ownership provider
    pub actors: &'a dyn ActorProvider,
    /// Active configuration
    pub config: &'a ImpactConfig,
}

/// Result of one detection pass
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    /// Nothing found
    Miss,
    /// Single-hit result, always final
    Single(HitCollisionInfo),
    /// Multi-hit result; the last element is this tick's final hit
    Batch(Vec<HitCollisionInfo>),
    /// Path-ordered hits resolved one by one, each final-eligible, until retirement
    Path(Vec<HitCollisionInfo>),
}

impl Detection {
    fn from_hits(hits: Vec<HitCollisionInfo>) -> Self {
        if hits.is_empty() {
            Detection::Miss
        } else {
            Detection::Batch(hits)
        }
    }

    /// Number of candidate hits
    pub fn len(&self) -> usize {
        match self {
            Detection::Miss => 0,
            Detection::Single(_) => 1,
            Detection::Batch(hits) | Detection::Path(hits) => hits.len(),
        }
    }

    /// Whether nothing was found
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Detection strategy
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorKind {
    /// Polyline sweep, self-resolving
    Line(LineDetector),
    /// Raycast from last-tick to current position with slack and auxiliary rays
    PointForward(PointForwardDetector),
    /// Sphere swept along the travel vector
    Swept(SweptDetector),
    /// Persistent overlap tracking
    Trigger(TriggerDetector),
    /// Proximity to one bound target
    SingleTarget(SingleTargetDetector),
    /// One-shot bounded volume query, invoked on demand
    Area(AreaDetector),
}

impl DetectorKind {
    /// Short variant name for logs and snapshots
    pub fn name(&self) -> &'static str {
        match self {
            DetectorKind::Line(_) => "line",
            DetectorKind::PointForward(_) => "point_forward",
            DetectorKind::Swept(_) => "swept",
            DetectorKind::Trigger(_) => "trigger",
            DetectorKind::SingleTarget(_) => "single_target",
            DetectorKind::Area(_) => "area",
        }
    }

    /// Whether the variant runs only on demand and is never registered
    pub fn is_on_demand(&self) -> bool {
        matches!(self, DetectorKind::Area(_))
    }
}

/// A detector: shared core plus one detection strategy
#[derive(Debug)]
pub struct Detector {
    /// Lifecycle and piercing state
    pub core: DetectorCore,
    /// Detection strategy
    pub kind: DetectorKind,
}

impl Detector {
    /// Start building a detector of the given kind
    pub fn builder(kind: DetectorKind) -> DetectorBuilder {
        DetectorBuilder::new(kind)
    }

    /// Id assigned by the scheduler
    pub fn id(&self) -> DetectorId {
        self.core.id
    }

    /// Gate detection by the configured interval
    pub fn should_perform_hit_check(&mut self, delta_time: f32) -> bool {
        self.core.should_perform_hit_check(delta_time)
    }

    /// Consume one pierce; `false` (no-op) for unlimited piercing
    pub fn decrement_piercing(&mut self) -> bool {
        self.core.piercing.decrement()
    }

    /// Advance per-detector countdowns; returns `true` when the history was cleared
    pub fn advance_timers(&mut self, delta_time: f32) -> bool {
        if let DetectorKind::Trigger(trigger) = &mut self.kind {
            trigger.advance(delta_time);
        }
        self.core.history.tick(delta_time)
    }

    /// Run this detector's strategy
    pub fn detect(&mut self, ctx: &QueryContext<'_>) -> Detection {
        let core = &self.core;
        match &mut self.kind {
            DetectorKind::PointForward(point) => {
                point.perform_hit_check(core, ctx).map_or(Detection::Miss, Detection::Single)
            }
            DetectorKind::Swept(swept) => {
                swept.perform_hit_check(core, ctx).map_or(Detection::Miss, Detection::Single)
            }
            DetectorKind::SingleTarget(single) => {
                single.perform_hit_check(core, ctx).map_or(Detection::Miss, Detection::Single)
            }
            DetectorKind::Trigger(trigger) => Detection::from_hits(trigger.perform_hit_checks(core, ctx)),
            DetectorKind::Area(area) => Detection::from_hits(area.perform_hit_checks(core, ctx)),
            DetectorKind::Line(line) => {
                let hits = line.perform_hit_checks(core, ctx);
                if hits.is_empty() {
                    Detection::Miss
                } else {
                    Detection::Path(hits)
                }
            }
        }
    }
}
