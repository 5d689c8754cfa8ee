//! In-crate ownership provider
//!
//! Stores actors (owning entities) with faction, optional parent for composite
//! entities, optional possession override, health and stats, plus the mapping
//! from colliders to their owners.

use super::{ActorProvider, Faction, RootOwner, Stat, StatSheet};
use crate::damage::DamageApplication;
use crate::foundation::collections::{ActorId, SecondaryMap, SlotMap, TargetId};
use log::warn;

/// Longest parent chain followed before giving up (guards against cycles)
const MAX_OWNER_DEPTH: usize = 16;

/// Health pool of a damageable actor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    /// Current health
    pub current: f32,
    /// Maximum health
    pub max: f32,
}

impl Health {
    /// Full health pool
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Subtract damage, returning the amount actually removed
    pub fn apply(&mut self, amount: f32) -> f32 {
        let dealt = amount.max(0.0).min(self.current);
        self.current -= dealt;
        dealt
    }

    /// Whether the pool is empty
    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }
}

/// An owning entity
#[derive(Debug, Clone)]
pub struct Actor {
    /// Own faction (ignored for parts, which resolve through their root)
    pub faction: Faction,
    /// Parent for composite multi-part entities
    pub parent: Option<ActorId>,
    /// Possession-style override of the effective faction
    pub manipulated_by: Option<ActorId>,
    /// Health capability, `None` for actors that cannot take damage
    pub health: Option<Health>,
    /// Stat snapshot
    pub stats: StatSheet,
    /// Number of damage applications received
    pub hits_taken: u32,
    /// Total damage received
    pub damage_taken: f32,
}

impl Actor {
    fn new(faction: Faction) -> Self {
        Self {
            faction,
            parent: None,
            manipulated_by: None,
            health: None,
            stats: StatSheet::new(),
            hits_taken: 0,
            damage_taken: 0.0,
        }
    }
}

/// Actor registry implementing [`ActorProvider`]
#[derive(Debug, Default)]
pub struct Roster {
    actors: SlotMap<ActorId, Actor>,
    colliders: SecondaryMap<TargetId, Option<ActorId>>,
}

impl Roster {
    /// Create an empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root actor
    pub fn spawn(&mut self, faction: Faction) -> ActorId {
        self.actors.insert(Actor::new(faction))
    }

    /// Add a root actor with a health pool
    pub fn spawn_with_health(&mut self, faction: Faction, max_health: f32) -> ActorId {
        let id = self.spawn(faction);
        self.actors[id].health = Some(Health::new(max_health));
        id
    }

    /// Add a part of a composite entity; it resolves to its parent's root
    pub fn spawn_part(&mut self, parent: ActorId) -> Option<ActorId> {
        let faction = self.actors.get(parent)?.faction;
        let mut part = Actor::new(faction);
        part.parent = Some(parent);
        Some(self.actors.insert(part))
    }

    /// Remove an actor and invalidate every collider it owned
    pub fn despawn(&mut self, actor: ActorId) -> Option<Actor> {
        let removed = self.actors.remove(actor)?;
        let owned: Vec<TargetId> = self
            .colliders
            .iter()
            .filter(|(_, owner)| **owner == Some(actor))
            .map(|(target, _)| target)
            .collect();
        for target in owned {
            self.colliders.remove(target);
        }
        Some(removed)
    }

    /// Look up an actor
    pub fn actor(&self, actor: ActorId) -> Option<&Actor> {
        self.actors.get(actor)
    }

    /// Look up an actor mutably
    pub fn actor_mut(&mut self, actor: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(actor)
    }

    /// Current health of an actor
    pub fn health(&self, actor: ActorId) -> Option<Health> {
        self.actors.get(actor).and_then(|a| a.health)
    }

    /// Give an actor a fresh health pool
    pub fn set_health(&mut self, actor: ActorId, max: f32) {
        if let Some(a) = self.actors.get_mut(actor) {
            a.health = Some(Health::new(max));
        }
    }

    /// Replace an actor's stats
    pub fn set_stats(&mut self, actor: ActorId, stats: StatSheet) {
        if let Some(a) = self.actors.get_mut(actor) {
            a.stats = stats;
        }
    }

    /// Set one stat on an actor
    pub fn set_stat(&mut self, actor: ActorId, stat: Stat, value: f32) {
        if let Some(a) = self.actors.get_mut(actor) {
            a.stats.set(stat, value);
        }
    }

    /// Set or clear the possession override on an actor
    pub fn set_manipulated_by(&mut self, actor: ActorId, manipulator: Option<ActorId>) {
        if let Some(a) = self.actors.get_mut(actor) {
            a.manipulated_by = manipulator;
        }
    }

    /// Declare a collider, owned by `owner` or neutral geometry when `None`
    pub fn attach_collider(&mut self, target: TargetId, owner: Option<ActorId>) {
        self.colliders.insert(target, owner);
    }

    /// Forget a collider; later references to it are stale
    pub fn detach_collider(&mut self, target: TargetId) {
        self.colliders.remove(target);
    }

    /// Number of live actors
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Whether the roster has no actors
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    fn root_of(&self, actor: ActorId) -> Option<ActorId> {
        let mut current = actor;
        for _ in 0..MAX_OWNER_DEPTH {
            let entry = self.actors.get(current)?;
            match entry.parent {
                Some(parent) if self.actors.contains_key(parent) => current = parent,
                Some(_) => {
                    warn!("Actor {:?} has a dangling parent; treating it as root", current);
                    return Some(current);
                }
                None => return Some(current),
            }
        }
        warn!("Ownership chain of {:?} exceeds {} links; possible cycle", actor, MAX_OWNER_DEPTH);
        None
    }
}

impl ActorProvider for Roster {
    fn is_valid(&self, target: TargetId) -> bool {
        match self.colliders.get(target) {
            Some(Some(owner)) => self.actors.contains_key(*owner),
            Some(None) => true,
            None => false,
        }
    }

    fn owner_of(&self, target: TargetId) -> Option<ActorId> {
        self.colliders.get(target).copied().flatten()
    }

    fn root_owner(&self, actor: ActorId) -> Option<RootOwner> {
        let root = self.root_of(actor)?;
        let mut faction = self.actors[root].faction;

        // The manipulator's own override is not followed, so chains cannot loop
        if let Some(manipulator) = self.actors[root].manipulated_by {
            match self.root_of(manipulator) {
                Some(manipulator_root) => faction = self.actors[manipulator_root].faction,
                None => warn!("Manipulator {:?} of {:?} is gone; keeping own faction", manipulator, root),
            }
        }

        Some(RootOwner { actor: root, faction })
    }

    fn stat(&self, actor: ActorId, stat: Stat) -> f32 {
        self.actors.get(actor).map_or(0.0, |a| a.stats.get(stat))
    }

    fn apply_damage(&mut self, actor: ActorId, damage: &DamageApplication) -> bool {
        let Some(entry) = self.actors.get_mut(actor) else {
            return false;
        };
        let Some(health) = entry.health.as_mut() else {
            return false;
        };

        let dealt = health.apply(damage.amount);
        entry.hits_taken += 1;
        entry.damage_taken += dealt;
        true
    }
}
