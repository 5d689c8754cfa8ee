//! Time management utilities
//!
//! All time-based behavior in the simulation core is expressed as countdowns
//! decremented by the frame delta-time, never by wall-clock callbacks.

/// Repeating countdown timer
///
/// A non-positive period means "fires on every tick".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countdown {
    period: f32,
    remaining: f32,
}

impl Countdown {
    /// Create a countdown that first fires after one full period
    pub fn new(period: f32) -> Self {
        Self {
            period,
            remaining: period,
        }
    }

    /// Create a countdown that fires on the first tick
    pub fn ready(period: f32) -> Self {
        Self {
            period,
            remaining: 0.0,
        }
    }

    /// Period in seconds
    pub fn period(&self) -> f32 {
        self.period
    }

    /// Remaining time until the next rollover
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Whether the countdown runs every tick
    pub fn is_every_tick(&self) -> bool {
        self.period <= 0.0
    }

    /// Advance by `delta_time`; returns `true` when the countdown rolled over
    ///
    /// A countdown that is already ready fires without consuming time. Overshoot
    /// carries into the next period so long frames do not drift.
    pub fn tick(&mut self, delta_time: f32) -> bool {
        if self.is_every_tick() {
            return true;
        }

        if self.remaining <= 0.0 {
            self.remaining = self.period;
            return true;
        }

        self.remaining -= delta_time;
        if self.remaining <= 0.0 {
            self.remaining = (self.remaining + self.period).max(0.0);
            true
        } else {
            false
        }
    }

    /// Advance without re-arming; returns `true` once the countdown has run out
    pub fn run_down(&mut self, delta_time: f32) -> bool {
        self.remaining = (self.remaining - delta_time).max(0.0);
        self.remaining <= 0.0
    }

    /// Whether a non-repeating countdown has run out
    pub fn is_elapsed(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Restart a full period
    pub fn rearm(&mut self) {
        self.remaining = self.period;
    }

    /// Change the period and restart
    pub fn set_period(&mut self, period: f32) {
        self.period = period;
        self.remaining = period;
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(0.0)
    }
}
