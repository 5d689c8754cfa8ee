//! Ownership, stat and health capabilities
//!
//! Damageable entities expose a root owner (faction + entity) so that composite
//! multi-part entities share one identity. The core only reads these capabilities
//! through [`ActorProvider`]; [`Roster`] is the in-crate implementation.

mod roster;
mod stats;

pub use roster::{Actor, Health, Roster};
pub use stats::{Stat, StatSheet};

use crate::damage::DamageApplication;
use crate::foundation::collections::{ActorId, TargetId};
use serde::{Deserialize, Serialize};

/// Faction identifier; equal factions never damage each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Faction(pub u16);

impl Faction {
    /// Conventional player faction
    pub const PLAYER: Faction = Faction(0);
    /// Conventional enemy faction
    pub const ENEMY: Faction = Faction(1);
    /// Conventional neutral faction
    pub const NEUTRAL: Faction = Faction(2);
}

/// Canonical identity of a (possibly composite) damageable entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RootOwner {
    /// Root entity of the ownership chain
    pub actor: ActorId,
    /// Effective faction (after any manipulated-by override)
    pub faction: Faction,
}

/// Ownership, stat and health provider consumed by the damage pipeline
///
/// All queries are made fresh per resolution; the core never caches answers
/// across ticks and never mutates stats.
pub trait ActorProvider {
    /// Whether the collider still exists (false = stale reference)
    fn is_valid(&self, target: TargetId) -> bool;

    /// Direct owner of a collider, `None` for neutral geometry
    fn owner_of(&self, target: TargetId) -> Option<ActorId>;

    /// Resolve the root owner of an actor
    fn root_owner(&self, actor: ActorId) -> Option<RootOwner>;

    /// Read a named stat (0.0 when the actor does not carry it)
    fn stat(&self, actor: ActorId, stat: Stat) -> f32;

    /// Apply damage through the actor's health capability
    ///
    /// Returns `false` when the actor cannot receive damage.
    fn apply_damage(&mut self, actor: ActorId, damage: &DamageApplication) -> bool;
}
