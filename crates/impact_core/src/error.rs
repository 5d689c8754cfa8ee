//! Crate error type
//!
//! Only construction-time misuse and explicit API calls surface as errors.
//! Faults during a tick are logged and contained to the hit or detector that
//! produced them.

use crate::config::ConfigError;
use crate::foundation::collections::DetectorId;
use thiserror::Error;

/// Errors produced by the hit-detection core
#[derive(Error, Debug)]
pub enum ImpactError {
    /// Configuration could not be loaded or is out of range
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Detector geometry cannot be used for detection
    #[error("Invalid detector geometry: {0}")]
    InvalidGeometry(String),

    /// Piercing settings are out of range
    #[error("Invalid piercing settings: {0}")]
    InvalidPiercing(String),

    /// A detector id does not refer to a stored detector
    #[error("Unknown detector {0:?}")]
    UnknownDetector(DetectorId),

    /// The detector is invoked on demand and cannot join the automatic tick
    #[error("Detector {0:?} cannot be registered for automatic ticking")]
    NotRegistrable(DetectorId),
}
