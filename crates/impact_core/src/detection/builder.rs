//! Detector construction
//!
//! Capabilities (owner, damage dealer, host object) are resolved once here and
//! stored on the detector, never probed again per tick.

use super::{
    AreaDetector, Detector, DetectorCore, DetectorKind, HitObserver, LineDetector, Piercing,
    PointForwardDetector, SingleTargetDetector, SweptDetector, TerminalCallback, TerminalReport,
    TriggerDetector, TriggerMode,
};
use crate::config::DetectorDefaults;
use crate::damage::DamageDealer;
use crate::error::ImpactError;
use crate::foundation::collections::{ActorId, ObjectHandle, TargetId};
use crate::foundation::math::{try_direction, Vec3};
use crate::physics::HitLayers;
use crate::pool::TeardownPolicy;

/// Builder for [`Detector`]
pub struct DetectorBuilder {
    kind: DetectorKind,
    max_piercing: Option<Option<u32>>,
    pierce_chance: f32,
    check_interval: Option<f32>,
    history_interval: Option<f32>,
    owner: Option<ActorId>,
    dealer: Option<DamageDealer>,
    mask: HitLayers,
    position: Vec3,
    forward: Vec3,
    enabled: bool,
    manual_trigger: bool,
    manual_destroy: bool,
    ignore: Option<TargetId>,
    host: Option<ObjectHandle>,
    teardown: TeardownPolicy,
    observers: Vec<HitObserver>,
    on_terminal: Option<TerminalCallback>,
}

impl DetectorBuilder {
    /// Start from a detection strategy
    pub fn new(kind: DetectorKind) -> Self {
        Self {
            kind,
            max_piercing: None,
            pierce_chance: 100.0,
            check_interval: None,
            history_interval: None,
            owner: None,
            dealer: None,
            mask: HitLayers::default(),
            position: Vec3::zeros(),
            forward: Vec3::z(),
            enabled: true,
            manual_trigger: false,
            manual_destroy: false,
            ignore: None,
            host: None,
            teardown: TeardownPolicy::default(),
            observers: Vec::new(),
            on_terminal: None,
        }
    }

    /// Polyline detector through the given offsets
    pub fn line(points: Vec<Vec3>) -> Self {
        Self::new(DetectorKind::Line(LineDetector::new(points)))
    }

    /// Point-forward raycast detector
    pub fn point_forward(detector: PointForwardDetector) -> Self {
        Self::new(DetectorKind::PointForward(detector))
    }

    /// Swept-sphere detector
    pub fn swept(radius: f32) -> Self {
        Self::new(DetectorKind::Swept(SweptDetector::new(radius)))
    }

    /// Overlap-tracking detector
    pub fn trigger(mode: TriggerMode) -> Self {
        Self::new(DetectorKind::Trigger(TriggerDetector::new(mode)))
    }

    /// Proximity detector bound to one target
    pub fn single_target(radius: f32, target: TargetId) -> Self {
        Self::new(DetectorKind::SingleTarget(SingleTargetDetector::new(radius).with_target(target)))
    }

    /// On-demand area burst
    pub fn area(radius: f32) -> Self {
        Self::new(DetectorKind::Area(AreaDetector::new(radius)))
    }

    /// Finite number of pierces before the terminal hit
    pub fn max_piercing(mut self, max: u32) -> Self {
        self.max_piercing = Some(Some(max));
        self
    }

    /// Pierce without limit
    pub fn infinite_piercing(mut self) -> Self {
        self.max_piercing = Some(None);
        self
    }

    /// Pierce chance in percent (0 disables the roll, 100 always pierces)
    pub fn pierce_chance(mut self, chance: f32) -> Self {
        self.pierce_chance = chance;
        self
    }

    /// Seconds between hit checks (<= 0: every eligible tick)
    pub fn check_interval(mut self, interval: f32) -> Self {
        self.check_interval = Some(interval);
        self
    }

    /// Seconds before the hit history is cleared (<= 0: never)
    pub fn hit_history_interval(mut self, interval: f32) -> Self {
        self.history_interval = Some(interval);
        self
    }

    /// Owning actor
    pub fn owner(mut self, owner: ActorId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Damage capability
    pub fn dealer(mut self, dealer: DamageDealer) -> Self {
        self.dealer = Some(dealer);
        self
    }

    /// Layers to query
    pub fn mask(mut self, mask: HitLayers) -> Self {
        self.mask = mask;
        self
    }

    /// Initial position
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Facing used while stationary
    pub fn facing(mut self, forward: Vec3) -> Self {
        self.forward = forward;
        self
    }

    /// Start disabled
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Detection only runs through `Scheduler::trigger`
    pub fn manual_trigger(mut self) -> Self {
        self.manual_trigger = true;
        self
    }

    /// Defer teardown to the caller
    pub fn manual_destroy(mut self) -> Self {
        self.manual_destroy = true;
        self
    }

    /// Collider never reported as a hit
    pub fn ignore(mut self, target: TargetId) -> Self {
        self.ignore = Some(target);
        self
    }

    /// Host object torn down on retirement
    pub fn host(mut self, host: ObjectHandle) -> Self {
        self.host = Some(host);
        self
    }

    /// Preferred teardown of the host
    pub fn teardown(mut self, policy: TeardownPolicy) -> Self {
        self.teardown = policy;
        self
    }

    /// Attach an on-hit observer
    pub fn observer(mut self, observer: HitObserver) -> Self {
        self.observers.push(observer);
        self
    }

    /// Callback fired once when the detector retires
    pub fn on_terminal<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&TerminalReport) + 'static,
    {
        self.on_terminal = Some(Box::new(callback));
        self
    }

    /// Validate and build
    pub fn build(self, defaults: &DetectorDefaults) -> Result<Detector, ImpactError> {
        match &self.kind {
            DetectorKind::Line(line) => line.validate()?,
            DetectorKind::PointForward(point) => point.validate()?,
            DetectorKind::Swept(swept) => swept.validate()?,
            DetectorKind::Trigger(trigger) => trigger.validate()?,
            DetectorKind::SingleTarget(single) => single.validate()?,
            DetectorKind::Area(area) => area.validate()?,
        }

        let max = if self.kind.is_on_demand() {
            if let Some(Some(max)) = self.max_piercing {
                return Err(ImpactError::InvalidPiercing(format!(
                    "area detectors pierce without limit, got a maximum of {}",
                    max
                )));
            }
            if self.pierce_chance < 100.0 {
                return Err(ImpactError::InvalidPiercing(format!(
                    "area detectors always pierce, got a chance of {}",
                    self.pierce_chance
                )));
            }
            None
        } else {
            self.max_piercing.unwrap_or(Some(0))
        };
        let piercing = Piercing::new(max, self.pierce_chance)?;

        let check_interval = self.check_interval.unwrap_or(defaults.check_interval);
        let history_interval = self.history_interval.unwrap_or(defaults.hit_history_interval);
        if !check_interval.is_finite() || !history_interval.is_finite() {
            return Err(ImpactError::InvalidGeometry("intervals must be finite".to_string()));
        }

        let mut core = DetectorCore::new(piercing, check_interval, history_interval);
        core.enabled = self.enabled;
        core.manual_trigger = self.manual_trigger;
        core.manual_destroy = self.manual_destroy;
        core.owner = self.owner;
        core.dealer = self.dealer;
        core.mask = self.mask;
        core.motion.teleport(self.position);
        core.motion.forward = try_direction(self.forward).unwrap_or_else(Vec3::z);
        core.ignore = self.ignore;
        core.host = self.host;
        core.teardown = self.teardown;
        core.observers = self.observers;
        core.on_terminal = self.on_terminal;

        Ok(Detector { core, kind: self.kind })
    }
}
