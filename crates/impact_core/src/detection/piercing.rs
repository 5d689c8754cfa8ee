//! Piercing state machine
//!
//! A detector starts `Active` and may only become `Exhausted` at a terminal-hit
//! evaluation. `remaining` counts pierces left; `None` as the maximum means the
//! detector pierces without limit.

use crate::error::ImpactError;
use rand::{Rng, RngCore};

/// Piercing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PierceState {
    /// Can still be evaluated for hits
    Active,
    /// Terminal; the detector is retired
    Exhausted,
}

/// Remaining-pierce counter plus probabilistic pierce gate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Piercing {
    max: Option<u32>,
    remaining: u32,
    chance: f32,
    total_pierces: u32,
    state: PierceState,
}

impl Piercing {
    /// Create validated piercing settings
    ///
    /// `chance` is a percentage in `[0, 100]`; 0 disables the pierce roll.
    pub fn new(max: Option<u32>, chance: f32) -> Result<Self, ImpactError> {
        if !chance.is_finite() || !(0.0..=100.0).contains(&chance) {
            return Err(ImpactError::InvalidPiercing(format!(
                "pierce chance {} is outside 0..=100",
                chance
            )));
        }

        Ok(Self {
            max,
            remaining: max.unwrap_or(0),
            chance,
            total_pierces: 0,
            state: PierceState::Active,
        })
    }

    /// No pierces: the first final hit retires the detector
    pub fn none() -> Self {
        Self::finite(0, 100.0)
    }

    /// `max` guaranteed pierces
    pub fn finite(max: u32, chance: f32) -> Self {
        Self {
            max: Some(max),
            remaining: max,
            chance: chance.clamp(0.0, 100.0),
            total_pierces: 0,
            state: PierceState::Active,
        }
    }

    /// Unlimited pierces
    pub fn infinite() -> Self {
        Self {
            max: None,
            remaining: 0,
            chance: 100.0,
            total_pierces: 0,
            state: PierceState::Active,
        }
    }

    /// Maximum pierces, `None` when unlimited
    pub fn max(&self) -> Option<u32> {
        self.max
    }

    /// Pierces left, `None` when unlimited
    pub fn remaining(&self) -> Option<u32> {
        self.max.map(|_| self.remaining)
    }

    /// Pierce chance in percent
    pub fn chance(&self) -> f32 {
        self.chance
    }

    /// Pierces consumed so far
    pub fn total_pierces(&self) -> u32 {
        self.total_pierces
    }

    /// Whether the maximum is finite
    pub fn is_finite(&self) -> bool {
        self.max.is_some()
    }

    /// Current state
    pub fn state(&self) -> PierceState {
        self.state
    }

    /// Consume one pierce
    ///
    /// Returns `true` when a pierce was available and consumed. Always `false`
    /// (and a no-op) for unlimited piercing.
    pub fn decrement(&mut self) -> bool {
        if self.max.is_none() || self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.total_pierces += 1;
        true
    }

    /// Roll the pierce gate; a chance of 0 never passes, 100 always does
    pub fn roll(&self, rng: &mut dyn RngCore) -> bool {
        if self.chance >= 100.0 {
            true
        } else if self.chance <= 0.0 {
            false
        } else {
            rng.gen_range(0.0_f32..100.0) < self.chance
        }
    }

    /// Enter the terminal state
    pub fn exhaust(&mut self) {
        self.state = PierceState::Exhausted;
    }

    /// Restore the initial counters (rearming a pooled detector)
    pub fn reset(&mut self) {
        self.remaining = self.max.unwrap_or(0);
        self.total_pierces = 0;
        self.state = PierceState::Active;
    }
}

impl Default for Piercing {
    fn default() -> Self {
        Self::none()
    }
}
