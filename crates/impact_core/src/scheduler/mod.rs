//! Detector scheduler
//!
//! Owns every detector, its registration lifecycle and its timers. Registration
//! changes are staged through a [`SchedulerHandle`] and committed once at the
//! start of [`Scheduler::tick`]:
//!
//! 1. flush pending adds (new detectors skip hit processing this tick)
//! 2. flush pending removes, dropping detectors marked for destruction
//! 3. for each active, enabled, automatic detector: advance timers, run detection
//!    when the check interval allows it, and dispatch the results
//! 4. refresh the optional debug snapshot
//!
//! The scheduler is constructed explicitly and owned by the simulation loop.

mod dispatch;
mod snapshot;
mod staging;

pub use snapshot::{DebugSnapshot, DetectorSnapshot};
pub use staging::{Membership, SchedulerHandle};

use crate::actor::ActorProvider;
use crate::config::ImpactConfig;
use crate::detection::{Detector, DetectorKind, QueryContext, SideEffect};
use crate::error::ImpactError;
use crate::events::CombatEventBus;
use crate::foundation::collections::{ActorId, DetectorId, SlotMap, TargetId};
use crate::foundation::math::Vec3;
use crate::pool::{PoolService, Retirement};
use crate::spatial::SpatialBackend;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::{HashSet, VecDeque};

/// External collaborators borrowed for one tick
pub struct Services<'a> {
    /// Spatial queries
    pub spatial: &'a dyn SpatialBackend,
    /// Ownership, stats and health
    pub actors: &'a mut dyn ActorProvider,
    /// Object pool and teardown
    pub pool: &'a mut dyn PoolService,
}

#[derive(Debug, Clone, Copy)]
struct AreaBurst {
    area: DetectorId,
    at: Vec3,
    instigator: Option<ActorId>,
}

/// Registry and tick driver for detectors
pub struct Scheduler {
    detectors: SlotMap<DetectorId, Detector>,
    handle: SchedulerHandle,
    events: CombatEventBus,
    rng: Box<dyn RngCore>,
    config: ImpactConfig,
    retired: Vec<Retirement>,
    side_effects: Vec<SideEffect>,
    area_bursts: VecDeque<AreaBurst>,
    snapshot: Option<DebugSnapshot>,
    tick_count: u64,
}

impl Scheduler {
    /// Create a scheduler seeded from the configuration
    pub fn new(config: ImpactConfig) -> Result<Self, ImpactError> {
        config.validate()?;
        info!("Hit-detection scheduler created (seed {:#x})", config.seed);
        Ok(Self {
            detectors: SlotMap::with_key(),
            handle: SchedulerHandle::default(),
            events: CombatEventBus::new(),
            rng: Box::new(StdRng::seed_from_u64(config.seed)),
            config,
            retired: Vec::new(),
            side_effects: Vec::new(),
            area_bursts: VecDeque::new(),
            snapshot: None,
            tick_count: 0,
        })
    }

    /// Replace the random number generator (tests force rolls this way)
    pub fn with_rng<R: RngCore + 'static>(mut self, rng: R) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &ImpactConfig {
        &self.config
    }

    /// Cloneable handle for callbacks and detectors
    pub fn handle(&self) -> SchedulerHandle {
        self.handle.clone()
    }

    /// Combat event bus
    pub fn events_mut(&mut self) -> &mut CombatEventBus {
        &mut self.events
    }

    /// Store a detector without registering it
    pub fn insert(&mut self, detector: Detector) -> DetectorId {
        let on_demand = detector.kind.is_on_demand();
        let id = self.detectors.insert(detector);
        self.detectors[id].core.id = id;
        self.handle.staging().store(id, on_demand);
        debug!("Stored {} detector {:?}", self.detectors[id].kind.name(), id);
        id
    }

    /// Store and register a detector
    pub fn spawn(&mut self, detector: Detector) -> Result<DetectorId, ImpactError> {
        let id = self.insert(detector);
        self.register(id)?;
        Ok(id)
    }

    /// Queue a stored detector for the active set
    pub fn register(&mut self, id: DetectorId) -> Result<(), ImpactError> {
        self.handle.register(id)
    }

    /// Queue a detector for removal from the active set
    pub fn unregister(&mut self, id: DetectorId) -> bool {
        self.handle.unregister(id)
    }

    /// Begin destruction; the detector is dropped at the next flush
    pub fn destroy(&mut self, id: DetectorId) -> Result<(), ImpactError> {
        self.handle.destroy(id)?;
        if let Some(detector) = self.detectors.get_mut(id) {
            detector.core.begin_destroyed = true;
        }
        Ok(())
    }

    /// Reset a retired (pooled or deactivated) detector for another lifetime
    ///
    /// The detector still has to be registered again.
    pub fn rearm(&mut self, id: DetectorId, position: Vec3) -> Result<(), ImpactError> {
        let detector = self.detectors.get_mut(id).ok_or(ImpactError::UnknownDetector(id))?;
        if detector.core.begin_destroyed {
            return Err(ImpactError::UnknownDetector(id));
        }
        detector.core.rearm();
        detector.core.motion.teleport(position);
        if let DetectorKind::Trigger(trigger) = &mut detector.kind {
            trigger.clear();
        }
        Ok(())
    }

    /// Look up a detector
    pub fn detector(&self, id: DetectorId) -> Option<&Detector> {
        self.detectors.get(id)
    }

    /// Look up a detector mutably
    pub fn detector_mut(&mut self, id: DetectorId) -> Option<&mut Detector> {
        self.detectors.get_mut(id)
    }

    /// Registration state of a detector
    pub fn membership(&self, id: DetectorId) -> Option<Membership> {
        self.handle.membership(id)
    }

    /// Whether the detector is in the active set
    pub fn is_active(&self, id: DetectorId) -> bool {
        self.handle.is_active(id)
    }

    /// Number of stored detectors
    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    /// Whether no detectors are stored
    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Ticks processed so far
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Move a detector for this tick (swept from its previous-tick position)
    pub fn set_position(&mut self, id: DetectorId, position: Vec3) {
        match self.detectors.get_mut(id) {
            Some(detector) => detector.core.motion.move_to(position),
            None => warn!("set_position on unknown detector {:?}", id),
        }
    }

    /// Move a detector without sweeping the gap
    pub fn teleport(&mut self, id: DetectorId, position: Vec3) {
        match self.detectors.get_mut(id) {
            Some(detector) => detector.core.motion.teleport(position),
            None => warn!("teleport on unknown detector {:?}", id),
        }
    }

    /// Report the host velocity of a detector
    pub fn set_velocity(&mut self, id: DetectorId, velocity: Vec3) {
        match self.detectors.get_mut(id) {
            Some(detector) => detector.core.motion.velocity = velocity,
            None => warn!("set_velocity on unknown detector {:?}", id),
        }
    }

    /// Enable or disable a detector without unregistering it
    pub fn set_enabled(&mut self, id: DetectorId, enabled: bool) {
        if let Some(detector) = self.detectors.get_mut(id) {
            detector.core.enabled = enabled;
        }
    }

    /// Overlap began between a collider-tracked detector and a collider
    pub fn on_trigger_enter(&mut self, id: DetectorId, target: TargetId) {
        match self.detectors.get_mut(id).map(|d| &mut d.kind) {
            Some(DetectorKind::Trigger(trigger)) => trigger.enter(target),
            Some(_) => warn!("Detector {:?} does not track overlaps", id),
            None => warn!("Overlap reported for unknown detector {:?}", id),
        }
    }

    /// Overlap ended between a collider-tracked detector and a collider
    pub fn on_trigger_exit(&mut self, id: DetectorId, target: TargetId) {
        if let Some(DetectorKind::Trigger(trigger)) = self.detectors.get_mut(id).map(|d| &mut d.kind) {
            trigger.exit(target);
        }
    }

    /// Run detection for a manual-trigger detector right now
    ///
    /// Returns the number of candidate hits found, zero while the detector is
    /// disabled or retired.
    pub fn trigger(&mut self, id: DetectorId, services: &mut Services<'_>) -> Result<usize, ImpactError> {
        let detector = self.detectors.get_mut(id).ok_or(ImpactError::UnknownDetector(id))?;
        if detector.kind.is_on_demand() {
            return Err(ImpactError::NotRegistrable(id));
        }
        if detector.core.retired || detector.core.begin_destroyed || !detector.core.enabled {
            return Ok(0);
        }

        let ctx = QueryContext {
            spatial: services.spatial,
            actors: &*services.actors,
            config: &self.config,
        };
        let detection = detector.detect(&ctx);
        let found = detection.len();

        self.dispatch(id, detection, services, false);
        self.process_area_bursts(services);
        Ok(found)
    }

    /// Fire an on-demand area detector at `at`
    pub fn trigger_area(&mut self, id: DetectorId, at: Vec3, services: &mut Services<'_>) -> Result<(), ImpactError> {
        match self.detectors.get(id).map(|d| d.kind.is_on_demand()) {
            Some(true) => {}
            Some(false) => return Err(ImpactError::InvalidGeometry(format!("detector {:?} is not an area", id))),
            None => return Err(ImpactError::UnknownDetector(id)),
        }
        self.area_bursts.push_back(AreaBurst { area: id, at, instigator: None });
        self.process_area_bursts(services);
        Ok(())
    }

    /// Advance one fixed tick
    pub fn tick(&mut self, delta_time: f32, services: &mut Services<'_>) {
        self.tick_count += 1;

        let just_added: HashSet<DetectorId> = self.handle.staging().flush_add().into_iter().collect();
        let destroyed = self.handle.staging().flush_remove();
        for id in destroyed {
            self.drop_detector(id, services);
        }

        let order = self.handle.inspect().order();
        for id in order {
            if just_added.contains(&id) || !self.handle.is_active(id) {
                continue;
            }
            self.tick_detector(id, delta_time, services);
        }

        if self.config.debug_snapshot {
            self.snapshot = Some(self.build_snapshot());
        }
    }

    /// Snapshot taken after the last tick, when enabled
    pub fn debug_snapshot(&self) -> Option<&DebugSnapshot> {
        self.snapshot.as_ref()
    }

    /// Retirements since the last drain
    pub fn drain_retired(&mut self) -> Vec<Retirement> {
        std::mem::take(&mut self.retired)
    }

    /// Side effects since the last drain
    pub fn drain_side_effects(&mut self) -> Vec<SideEffect> {
        std::mem::take(&mut self.side_effects)
    }

    fn tick_detector(&mut self, id: DetectorId, delta_time: f32, services: &mut Services<'_>) {
        let Some(detector) = self.detectors.get_mut(id) else {
            warn!("Active detector {:?} is missing; unregistering", id);
            self.handle.unregister(id);
            return;
        };
        if detector.core.retired || !detector.core.enabled || detector.core.manual_trigger {
            return;
        }

        if detector.advance_timers(delta_time) && self.config.debug_logging {
            debug!("Detector {:?}: hit history expired", id);
        }

        if detector.should_perform_hit_check(delta_time) {
            let ctx = QueryContext {
                spatial: services.spatial,
                actors: &*services.actors,
                config: &self.config,
            };
            let detection = detector.detect(&ctx);
            self.dispatch(id, detection, services, false);
            self.process_area_bursts(services);
        }

        if let Some(detector) = self.detectors.get_mut(id) {
            detector.core.motion.settle();
        }
    }

    fn drop_detector(&mut self, id: DetectorId, services: &mut Services<'_>) {
        let Some(detector) = self.detectors.remove(id) else {
            return;
        };
        if let Some(host) = detector.core.host {
            services.pool.destroy_after(host, 0.0);
        }
        debug!("Dropped detector {:?}", id);
    }

    fn build_snapshot(&self) -> DebugSnapshot {
        let staging = self.handle.inspect();
        DebugSnapshot {
            tick: self.tick_count,
            active: staging.order(),
            pending_add: staging.pending_add(),
            pending_remove: staging.pending_remove(),
            detectors: self
                .detectors
                .iter()
                .map(|(id, detector)| DetectorSnapshot {
                    id,
                    variant: detector.kind.name(),
                    membership: staging.membership(id),
                    enabled: detector.core.enabled,
                    remaining_pierces: detector.core.piercing.remaining(),
                    total_pierces: detector.core.piercing.total_pierces(),
                    history_len: detector.core.history.len(),
                    retired: detector.core.retired,
                })
                .collect(),
        }
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("detectors", &self.detectors.len())
            .field("tick_count", &self.tick_count)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
