//! Damage capability and damage records

use crate::foundation::collections::ActorId;
use crate::foundation::math::Vec3;
use serde::{Deserialize, Serialize};

/// Damage category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    /// Bullets, blades, impacts
    Kinetic,
    /// Beams and lasers
    Energy,
    /// Blast damage
    Explosive,
    /// Burning
    Fire,
}

/// Damage capability carried by a detector
///
/// `pending_crit` is the temporary crit-scaled multiplier. It is set by the crit
/// roll and consumed by the very next application, so it can never leak into a
/// later resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageDealer {
    base_damage: f32,
    damage_type: DamageType,
    #[serde(skip)]
    pending_crit: Option<f32>,
}

impl DamageDealer {
    /// Create a dealer
    pub fn new(base_damage: f32, damage_type: DamageType) -> Self {
        Self {
            base_damage,
            damage_type,
            pending_crit: None,
        }
    }

    /// Unscaled damage per hit
    pub fn base_damage(&self) -> f32 {
        self.base_damage
    }

    /// Change the unscaled damage
    pub fn set_base_damage(&mut self, damage: f32) {
        self.base_damage = damage;
    }

    /// Damage category
    pub fn damage_type(&self) -> DamageType {
        self.damage_type
    }

    /// Arm a crit multiplier for the next application
    pub fn set_pending_crit(&mut self, multiplier: f32) {
        self.pending_crit = Some(multiplier);
    }

    /// Consume the armed crit multiplier, resetting to "no crit"
    pub fn take_pending_crit(&mut self) -> Option<f32> {
        self.pending_crit.take()
    }

    /// Whether a crit multiplier is armed
    pub fn has_pending_crit(&self) -> bool {
        self.pending_crit.is_some()
    }

    /// Drop any armed crit multiplier
    pub fn clear_pending_crit(&mut self) {
        self.pending_crit = None;
    }
}

/// Damage about to be (or just) applied to a receiver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageApplication {
    /// Root owner of the dealer, if any
    pub source: Option<ActorId>,
    /// Final amount
    pub amount: f32,
    /// Damage category
    pub damage_type: DamageType,
    /// Whether the crit roll succeeded
    pub critical: bool,
    /// Contact point
    pub point: Option<Vec3>,
}

impl DamageApplication {
    /// Plain, non-critical application
    pub fn new(source: Option<ActorId>, amount: f32, damage_type: DamageType) -> Self {
        Self {
            source,
            amount,
            damage_type,
            critical: false,
            point: None,
        }
    }
}
