//! Debug snapshot of the registry

use super::Membership;
use crate::foundation::collections::DetectorId;

/// One detector as seen by the snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorSnapshot {
    /// Detector id
    pub id: DetectorId,
    /// Variant name
    pub variant: &'static str,
    /// Registration state, `None` when stored but unregistered
    pub membership: Option<Membership>,
    /// Enabled flag
    pub enabled: bool,
    /// Pierces left, `None` when unlimited
    pub remaining_pierces: Option<u32>,
    /// Pierces consumed
    pub total_pierces: u32,
    /// Targets in the hit history
    pub history_len: usize,
    /// Whether the detector has retired
    pub retired: bool,
}

/// Registry state after a tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugSnapshot {
    /// Tick counter when the snapshot was taken
    pub tick: u64,
    /// Active iteration order
    pub active: Vec<DetectorId>,
    /// Staged additions
    pub pending_add: Vec<DetectorId>,
    /// Staged removals
    pub pending_remove: Vec<DetectorId>,
    /// Every stored detector
    pub detectors: Vec<DetectorSnapshot>,
}

impl DebugSnapshot {
    /// Look up one detector
    pub fn detector(&self, id: DetectorId) -> Option<&DetectorSnapshot> {
        self.detectors.iter().find(|d| d.id == id)
    }
}
