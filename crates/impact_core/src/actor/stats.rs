//! Named stat snapshot
//!
//! Stat aggregation (modifiers, buffs, gear) happens outside the core; the
//! pipeline only reads the final values listed here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stats read by the damage pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    /// Chance to block an incoming hit, percent
    BlockChance,
    /// Crit chance contributed by the dealer, percent
    CritChance,
    /// Crit multiplier contributed by the dealer (additive)
    CritMultiplier,
    /// Damage increase per prior pierce, percent
    DamagePerPierce,
}

/// Read-only snapshot of named stat values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatSheet {
    values: HashMap<Stat, f32>,
}

impl StatSheet {
    /// Create an empty sheet
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, stat: Stat, value: f32) -> Self {
        self.set(stat, value);
        self
    }

    /// Set a stat value
    pub fn set(&mut self, stat: Stat, value: f32) {
        self.values.insert(stat, value);
    }

    /// Read a stat value, 0.0 when absent
    pub fn get(&self, stat: Stat) -> f32 {
        self.values.get(&stat).copied().unwrap_or(0.0)
    }

    /// Whether the stat is present and positive
    pub fn has_positive(&self, stat: Stat) -> bool {
        self.get(stat) > 0.0
    }
}
