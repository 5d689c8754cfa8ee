//! Registration staging
//!
//! Every registration change lands here and is committed at one fixed point at
//! the start of `Scheduler::tick`. A detector is in at most one of pending-add,
//! active or pending-remove at any instant. The committed iteration order only
//! changes during the flush, so callbacks that register or unregister detectors
//! mid-tick never disturb the loop that is running.

use crate::error::ImpactError;
use crate::foundation::collections::DetectorId;
use log::warn;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Registration state of a stored detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Joins the active set at the next flush
    PendingAdd,
    /// Ticked automatically
    Active,
    /// Leaves at the next flush; `destroy` drops the detector entirely
    PendingRemove {
        /// Whether the detector is dropped at the flush
        destroy: bool,
    },
}

#[derive(Debug, Default)]
pub(crate) struct Staging {
    stored: HashSet<DetectorId>,
    on_demand: HashSet<DetectorId>,
    begin_destroyed: HashSet<DetectorId>,
    membership: HashMap<DetectorId, Membership>,
    pending_add: Vec<DetectorId>,
    pending_remove: Vec<DetectorId>,
    order: Vec<DetectorId>,
}

impl Staging {
    pub(crate) fn store(&mut self, id: DetectorId, on_demand: bool) {
        self.stored.insert(id);
        if on_demand {
            self.on_demand.insert(id);
        }
    }

    pub(crate) fn register(&mut self, id: DetectorId) -> Result<(), ImpactError> {
        if !self.stored.contains(&id) {
            return Err(ImpactError::UnknownDetector(id));
        }
        if self.on_demand.contains(&id) {
            return Err(ImpactError::NotRegistrable(id));
        }
        if self.begin_destroyed.contains(&id) {
            warn!("Detector {:?} is being destroyed; registration ignored", id);
            return Ok(());
        }

        match self.membership.get(&id).copied() {
            Some(Membership::PendingAdd | Membership::Active) => {}
            Some(Membership::PendingRemove { .. }) => {
                self.pending_remove.retain(|pending| *pending != id);
                self.membership.insert(id, Membership::Active);
            }
            None => {
                self.membership.insert(id, Membership::PendingAdd);
                self.pending_add.push(id);
            }
        }
        Ok(())
    }

    pub(crate) fn unregister(&mut self, id: DetectorId) -> bool {
        match self.membership.get(&id).copied() {
            Some(Membership::PendingAdd) => {
                self.membership.remove(&id);
                self.pending_add.retain(|pending| *pending != id);
                true
            }
            Some(Membership::Active) => {
                self.membership.insert(id, Membership::PendingRemove { destroy: false });
                self.pending_remove.push(id);
                true
            }
            Some(Membership::PendingRemove { .. }) | None => false,
        }
    }

    pub(crate) fn destroy(&mut self, id: DetectorId) -> Result<(), ImpactError> {
        if !self.stored.contains(&id) {
            return Err(ImpactError::UnknownDetector(id));
        }
        self.begin_destroyed.insert(id);
        self.pending_add.retain(|pending| *pending != id);
        if !self.pending_remove.contains(&id) {
            self.pending_remove.push(id);
        }
        self.membership.insert(id, Membership::PendingRemove { destroy: true });
        Ok(())
    }

    /// Commit pending adds; returns the detectors that joined
    pub(crate) fn flush_add(&mut self) -> Vec<DetectorId> {
        let added: Vec<DetectorId> = std::mem::take(&mut self.pending_add)
            .into_iter()
            .filter(|id| self.membership.get(id) == Some(&Membership::PendingAdd))
            .collect();
        for id in &added {
            self.membership.insert(*id, Membership::Active);
            self.order.push(*id);
        }
        added
    }

    /// Commit pending removals; returns the detectors to drop entirely
    pub(crate) fn flush_remove(&mut self) -> Vec<DetectorId> {
        let mut destroyed = Vec::new();
        for id in std::mem::take(&mut self.pending_remove) {
            let Some(Membership::PendingRemove { destroy }) = self.membership.get(&id).copied() else {
                continue;
            };
            self.membership.remove(&id);
            self.order.retain(|active| *active != id);
            if destroy {
                self.stored.remove(&id);
                self.on_demand.remove(&id);
                self.begin_destroyed.remove(&id);
                destroyed.push(id);
            }
        }
        destroyed
    }

    pub(crate) fn order(&self) -> Vec<DetectorId> {
        self.order.clone()
    }

    pub(crate) fn membership(&self, id: DetectorId) -> Option<Membership> {
        self.membership.get(&id).copied()
    }

    pub(crate) fn is_active(&self, id: DetectorId) -> bool {
        self.membership(id) == Some(Membership::Active)
    }

    pub(crate) fn pending_add(&self) -> Vec<DetectorId> {
        self.pending_add.clone()
    }

    pub(crate) fn pending_remove(&self) -> Vec<DetectorId> {
        self.pending_remove.clone()
    }
}

/// Cloneable handle onto the scheduler's registration queues
///
/// Detectors and callbacks hold one of these instead of a global registry. Every
/// call only stages a change; nothing moves until the next flush.
#[derive(Debug, Clone, Default)]
pub struct SchedulerHandle {
    staging: Rc<RefCell<Staging>>,
}

impl SchedulerHandle {
    pub(crate) fn staging(&self) -> std::cell::RefMut<'_, Staging> {
        self.staging.borrow_mut()
    }

    pub(crate) fn inspect(&self) -> std::cell::Ref<'_, Staging> {
        self.staging.borrow()
    }

    /// Queue a detector for the active set (idempotent)
    pub fn register(&self, id: DetectorId) -> Result<(), ImpactError> {
        self.staging().register(id)
    }

    /// Queue a detector for removal (idempotent); returns whether anything changed
    pub fn unregister(&self, id: DetectorId) -> bool {
        self.staging().unregister(id)
    }

    /// Queue a detector for destruction at the next flush
    pub fn destroy(&self, id: DetectorId) -> Result<(), ImpactError> {
        self.staging().destroy(id)
    }

    /// Registration state of a detector
    pub fn membership(&self, id: DetectorId) -> Option<Membership> {
        self.inspect().membership(id)
    }

    /// Whether the detector is in the active set
    pub fn is_active(&self, id: DetectorId) -> bool {
        self.inspect().is_active(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::SlotMap;

    fn staged(count: usize) -> (Staging, Vec<DetectorId>) {
        let mut keys: SlotMap<DetectorId, ()> = SlotMap::with_key();
        let ids: Vec<DetectorId> = (0..count).map(|_| keys.insert(())).collect();
        let mut staging = Staging::default();
        for id in &ids {
            staging.store(*id, false);
        }
        (staging, ids)
    }

    #[test]
    fn test_double_register_yields_one_entry() {
        let (mut staging, ids) = staged(1);
        staging.register(ids[0]).unwrap();
        staging.register(ids[0]).unwrap();
        assert_eq!(staging.flush_add(), vec![ids[0]]);
        assert_eq!(staging.order(), vec![ids[0]]);

        staging.register(ids[0]).unwrap();
        assert!(staging.flush_add().is_empty());
        assert_eq!(staging.order().len(), 1);
    }

    #[test]
    fn test_register_then_unregister_before_flush_cancels() {
        let (mut staging, ids) = staged(1);
        staging.register(ids[0]).unwrap();
        assert!(staging.unregister(ids[0]));
        assert!(staging.flush_add().is_empty());
        assert_eq!(staging.membership(ids[0]), None);
    }

    #[test]
    fn test_unregister_then_register_keeps_active() {
        let (mut staging, ids) = staged(1);
        staging.register(ids[0]).unwrap();
        staging.flush_add();

        staging.unregister(ids[0]);
        assert_eq!(staging.membership(ids[0]), Some(Membership::PendingRemove { destroy: false }));
        staging.register(ids[0]).unwrap();
        assert!(staging.is_active(ids[0]));
        assert!(staging.flush_remove().is_empty());
        assert_eq!(staging.order(), vec![ids[0]]);
    }

    #[test]
    fn test_destroy_blocks_registration() {
        let (mut staging, ids) = staged(2);
        staging.register(ids[0]).unwrap();
        staging.flush_add();

        staging.destroy(ids[0]).unwrap();
        staging.register(ids[0]).unwrap();
        assert_eq!(staging.membership(ids[0]), Some(Membership::PendingRemove { destroy: true }));
        assert_eq!(staging.flush_remove(), vec![ids[0]]);
        assert!(staging.order().is_empty());
        assert!(matches!(staging.register(ids[0]), Err(ImpactError::UnknownDetector(_))));
    }

    #[test]
    fn test_on_demand_refused() {
        let mut keys: SlotMap<DetectorId, ()> = SlotMap::with_key();
        let area = keys.insert(());
        let mut staging = Staging::default();
        staging.store(area, true);
        assert!(matches!(staging.register(area), Err(ImpactError::NotRegistrable(_))));
    }
}
