//! # Hit Detection Configuration
//!
//! Tunables shared by the scheduler and the damage pipeline. Per-detector settings
//! (piercing, intervals, geometry) live on the detectors themselves; this file holds
//! the global knobs and the defaults new detectors start from.

use super::{Config, ConfigError};
use serde::{Deserialize, Serialize};

/// Global critical-hit contribution
///
/// Added to the dealer's own crit chance and multiplier stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CritConfig {
    /// Crit chance in percent (0-100)
    pub chance: f32,
    /// Additive crit multiplier contribution
    pub multiplier: f32,
}

impl Default for CritConfig {
    fn default() -> Self {
        Self {
            chance: 0.0,
            multiplier: 1.5,
        }
    }
}

/// Area aggregator settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaConfig {
    /// Size of the bounded result buffer for volume overlap queries
    pub max_results: usize,
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self { max_results: 32 }
    }
}

/// Defaults applied by detector builders when a value is not set explicitly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorDefaults {
    /// Seconds between hit checks (0 = every eligible tick)
    pub check_interval: f32,
    /// Seconds before a detector's hit history is cleared (0 = never)
    pub hit_history_interval: f32,
}

impl Default for DetectorDefaults {
    fn default() -> Self {
        Self {
            check_interval: 0.0,
            hit_history_interval: 0.0,
        }
    }
}

/// # Impact Configuration
///
/// Top-level configuration of the hit-detection core.
///
/// ```toml
/// seed = 7
/// debug_logging = true
///
/// [crit]
/// chance = 5.0
/// multiplier = 1.5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    /// Seed for the scheduler's random number generator
    pub seed: u64,
    /// Emit per-hit debug traces (rolls, vetoes, pierce transitions)
    pub debug_logging: bool,
    /// Maintain a debug snapshot of the registry after every tick
    pub debug_snapshot: bool,
    /// Global crit contribution
    pub crit: CritConfig,
    /// Area aggregator settings
    pub area: AreaConfig,
    /// Builder defaults
    pub defaults: DetectorDefaults,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            seed: 0x1A2B_3C4D,
            debug_logging: false,
            debug_snapshot: false,
            crit: CritConfig::default(),
            area: AreaConfig::default(),
            defaults: DetectorDefaults::default(),
        }
    }
}

impl Config for ImpactConfig {}

impl ImpactConfig {
    /// Enable debug traces
    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    /// Enable the per-tick debug snapshot
    pub fn with_debug_snapshot(mut self, enabled: bool) -> Self {
        self.debug_snapshot = enabled;
        self
    }

    /// Set the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the global crit contribution
    pub fn with_crit(mut self, chance: f32, multiplier: f32) -> Self {
        self.crit = CritConfig { chance, multiplier };
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.crit.chance) {
            return Err(ConfigError::Invalid(format!(
                "crit.chance must be within 0..=100, got {}",
                self.crit.chance
            )));
        }
        if self.crit.multiplier <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "crit.multiplier must be positive, got {}",
                self.crit.multiplier
            )));
        }
        if self.area.max_results == 0 {
            return Err(ConfigError::Invalid("area.max_results must be at least 1".to_string()));
        }
        if self.defaults.check_interval.is_nan() || self.defaults.hit_history_interval.is_nan() {
            return Err(ConfigError::Invalid("detector defaults must be numbers".to_string()));
        }
        Ok(())
    }
}
