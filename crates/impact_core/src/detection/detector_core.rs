//! Lifecycle and piercing state shared by every detector variant

use super::{HitHistory, HitObserver, Piercing};
use crate::damage::DamageDealer;
use crate::foundation::collections::{ActorId, DetectorId, ObjectHandle, TargetId};
use crate::foundation::math::{Motion, Vec3};
use crate::foundation::time::Countdown;
use crate::physics::HitLayers;
use crate::pool::TeardownPolicy;

/// Passed to the terminal callback when a detector retires
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminalReport {
    /// Retiring detector
    pub detector: DetectorId,
    /// Target of the terminal hit
    pub target: TargetId,
    /// Contact point of the terminal hit
    pub point: Vec3,
    /// Pierces consumed over the detector's life
    pub total_pierces: u32,
}

/// Terminal callback; runs at most once per detector lifetime
pub type TerminalCallback = Box<dyn FnMut(&TerminalReport)>;

/// State common to all variants
pub struct DetectorCore {
    pub(crate) id: DetectorId,
    /// Disabled detectors stay registered but are skipped
    pub enabled: bool,
    /// Detection only runs through `Scheduler::trigger`
    pub manual_trigger: bool,
    /// The caller, not the scheduler, tears the host down
    pub manual_destroy: bool,
    pub(crate) begin_destroyed: bool,
    /// Pierce counters
    pub piercing: Piercing,
    pub(crate) check: Countdown,
    /// Targets already processed
    pub history: HitHistory,
    /// Owning actor (dealer identity for ownership vetoes and stats)
    pub owner: Option<ActorId>,
    /// Damage capability resolved at construction
    pub dealer: Option<DamageDealer>,
    pub(crate) final_hit: bool,
    /// Layers this detector queries
    pub mask: HitLayers,
    /// Current and previous-tick position
    pub motion: Motion,
    /// Collider never reported as a hit (the host's own body)
    pub ignore: Option<TargetId>,
    /// Host object torn down on retirement
    pub host: Option<ObjectHandle>,
    /// Preferred teardown of the host
    pub teardown: TeardownPolicy,
    /// On-hit side effects
    pub observers: Vec<HitObserver>,
    pub(crate) on_terminal: Option<TerminalCallback>,
    pub(crate) terminal_fired: bool,
    pub(crate) retired: bool,
    pub(crate) warned_missing_dealer: bool,
}

impl DetectorCore {
    pub(crate) fn new(piercing: Piercing, check_interval: f32, history_interval: f32) -> Self {
        Self {
            id: DetectorId::default(),
            enabled: true,
            manual_trigger: false,
            manual_destroy: false,
            begin_destroyed: false,
            piercing,
            check: Countdown::ready(check_interval),
            history: HitHistory::new(history_interval),
            owner: None,
            dealer: None,
            final_hit: false,
            mask: HitLayers::default(),
            motion: Motion::default(),
            ignore: None,
            host: None,
            teardown: TeardownPolicy::default(),
            observers: Vec::new(),
            on_terminal: None,
            terminal_fired: false,
            retired: false,
            warned_missing_dealer: false,
        }
    }

    /// Id assigned by the scheduler (null until inserted)
    pub fn id(&self) -> DetectorId {
        self.id
    }

    /// Whether the detector has been retired
    pub fn is_retired(&self) -> bool {
        self.retired
    }

    /// Whether destruction has begun (registration is refused)
    pub fn is_begin_destroyed(&self) -> bool {
        self.begin_destroyed
    }

    /// Whether the hit being resolved is this tick's final hit
    pub fn is_final_hit(&self) -> bool {
        self.final_hit
    }

    /// Seconds between hit checks
    pub fn check_interval(&self) -> f32 {
        self.check.period()
    }

    /// Change the hit-check interval (<= 0: every eligible tick)
    pub fn set_check_interval(&mut self, interval: f32) {
        self.check = Countdown::ready(interval);
    }

    /// Install the terminal callback
    pub fn set_on_terminal(&mut self, callback: TerminalCallback) {
        self.on_terminal = Some(callback);
    }

    /// Whether the throttle allows a hit check this tick
    pub fn should_perform_hit_check(&mut self, delta_time: f32) -> bool {
        self.check.tick(delta_time)
    }

    /// Whether hit-history deduplication applies (finite piercing only)
    pub fn dedupes(&self) -> bool {
        self.piercing.is_finite()
    }

    /// Whether a query result may be reported as a hit
    pub fn is_fresh(&self, target: TargetId) -> bool {
        self.ignore != Some(target) && !(self.dedupes() && self.history.contains(target))
    }

    /// Fire the terminal callback unless it already fired this lifetime
    pub(crate) fn fire_terminal(&mut self, report: &TerminalReport) -> bool {
        if self.terminal_fired {
            return false;
        }
        self.terminal_fired = true;
        if let Some(callback) = self.on_terminal.as_mut() {
            callback(report);
        }
        true
    }

    /// Reset piercing, history and timers for another lifetime
    pub(crate) fn rearm(&mut self) {
        self.piercing.reset();
        self.history.clear();
        self.check = Countdown::ready(self.check.period());
        self.final_hit = false;
        self.terminal_fired = false;
        self.retired = false;
        if let Some(dealer) = self.dealer.as_mut() {
            dealer.clear_pending_crit();
        }
    }
}

impl std::fmt::Debug for DetectorCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorCore")
            .field("id", &self.id)
            .field("enabled", &self.enabled)
            .field("manual_trigger", &self.manual_trigger)
            .field("manual_destroy", &self.manual_destroy)
            .field("begin_destroyed", &self.begin_destroyed)
            .field("piercing", &self.piercing)
            .field("owner", &self.owner)
            .field("retired", &self.retired)
            .finish_non_exhaustive()
    }
}
