//! Hit layer system for filtering detection queries
//!
//! Colliders live on one or more layers; every detector carries a mask of the
//! layers it is allowed to hit.

use bitflags::bitflags;

bitflags! {
    /// Collision layer definitions using bitflags for efficient filtering
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HitLayers: u32 {
        /// Player character layer
        const PLAYER = 1 << 0;
        /// Enemy character layer
        const ENEMY = 1 << 1;
        /// Projectiles (bullets, missiles, etc.)
        const PROJECTILE = 1 << 2;
        /// Static environment geometry
        const ENVIRONMENT = 1 << 3;
        /// Trigger volumes (no physical response)
        const TRIGGER = 1 << 4;
        /// Debris and destructible props
        const DEBRIS = 1 << 5;
        /// Shields and other blocking volumes
        const SHIELD = 1 << 6;
        /// Neutral characters
        const NEUTRAL = 1 << 7;
    }
}

impl HitLayers {
    /// Default mask for damage-dealing detectors
    pub const DAMAGEABLE: HitLayers = HitLayers::PLAYER
        .union(HitLayers::ENEMY)
        .union(HitLayers::ENVIRONMENT)
        .union(HitLayers::DEBRIS)
        .union(HitLayers::SHIELD)
        .union(HitLayers::NEUTRAL);

    /// Check if two colliders should interact based on their layers and masks
    ///
    /// A's layer must be in B's mask AND B's layer must be in A's mask.
    pub fn should_collide(layer_a: HitLayers, mask_a: HitLayers, layer_b: HitLayers, mask_b: HitLayers) -> bool {
        layer_a.intersects(mask_b) && layer_b.intersects(mask_a)
    }

    /// Whether a query with this mask accepts a collider on `layer`
    pub fn accepts(self, layer: HitLayers) -> bool {
        self.intersects(layer)
    }
}

impl Default for HitLayers {
    fn default() -> Self {
        HitLayers::DAMAGEABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_collide_mutual() {
        assert!(HitLayers::should_collide(
            HitLayers::PLAYER, HitLayers::ENEMY,
            HitLayers::ENEMY, HitLayers::PLAYER,
        ));
    }

    #[test]
    fn test_should_not_collide_one_way() {
        assert!(!HitLayers::should_collide(
            HitLayers::PLAYER, HitLayers::ENEMY,
            HitLayers::ENEMY, HitLayers::PROJECTILE,
        ));
    }

    #[test]
    fn test_default_mask_skips_triggers_and_projectiles() {
        let mask = HitLayers::default();
        assert!(mask.accepts(HitLayers::ENEMY));
        assert!(mask.accepts(HitLayers::ENVIRONMENT));
        assert!(!mask.accepts(HitLayers::TRIGGER));
        assert!(!mask.accepts(HitLayers::PROJECTILE));
    }
}
