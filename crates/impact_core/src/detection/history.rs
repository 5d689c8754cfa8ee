//! Per-detector hit history
//!
//! Rolling set of targets already processed by a detector. The whole set is
//! cleared when the expiry countdown rolls over; a non-positive interval never
//! expires.

use crate::foundation::collections::TargetId;
use crate::foundation::time::Countdown;
use std::collections::HashSet;

/// Targets already processed by one detector
#[derive(Debug, Clone, Default)]
pub struct HitHistory {
    targets: HashSet<TargetId>,
    expiry: Countdown,
}

impl HitHistory {
    /// Create a history cleared every `interval` seconds (<= 0: never)
    pub fn new(interval: f32) -> Self {
        Self {
            targets: HashSet::new(),
            expiry: Countdown::new(interval),
        }
    }

    /// Whether the target was already processed in this window
    pub fn contains(&self, target: TargetId) -> bool {
        self.targets.contains(&target)
    }

    /// Record a processed target
    pub fn record(&mut self, target: TargetId) {
        self.targets.insert(target);
    }

    /// Advance the expiry timer; returns `true` when the history was cleared
    pub fn tick(&mut self, delta_time: f32) -> bool {
        if self.expiry.is_every_tick() {
            return false;
        }
        let rolled = self.expiry.tick(delta_time);
        if rolled {
            self.targets.clear();
        }
        rolled
    }

    /// Forget every target and restart the window
    pub fn clear(&mut self) {
        self.targets.clear();
        self.expiry.rearm();
    }

    /// Expiry interval in seconds
    pub fn interval(&self) -> f32 {
        self.expiry.period()
    }

    /// Number of recorded targets
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
