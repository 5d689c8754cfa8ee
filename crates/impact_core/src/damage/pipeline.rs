//! Damage arbitration
//!
//! Ordered steps per candidate hit:
//! 1. stale target: consumed, no damage
//! 2. hit-history dedup (finite piercing only): vetoed
//! 3. ownership: ownerless target consumed without damage, unresolved dealer or
//!    same root faction vetoed
//! 4. block roll on the receiver: consumed, block notification
//! 5. damage scaled by prior pierces, floored at 1
//! 6. crit roll, `DamageDealt` (vetoable), application, `DamageTaken`
//!
//! Side effects and the terminal check run afterwards in the scheduler.

use crate::actor::{ActorProvider, RootOwner, Stat};
use crate::config::ImpactConfig;
use crate::damage::DamageApplication;
use crate::detection::{DetectorCore, HitCollisionInfo};
use crate::events::{CombatEvent, CombatEventBus};
use log::{debug, warn};
use rand::{Rng, RngCore};

macro_rules! trace_hit {
    ($env:expr, $($arg:tt)+) => {
        if $env.config.debug_logging {
            debug!($($arg)+);
        }
    };
}

/// Why a hit was rejected without being consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VetoReason {
    /// The detector carries no damage capability
    MissingDealer,
    /// The target is already in the hit history
    AlreadyHit,
    /// Dealer and receiver share a root faction
    SameFaction,
    /// The detector has an owner whose root no longer resolves
    UnresolvedDealer,
}

/// Outcome of resolving one candidate hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Target vanished between query and resolution
    Stale,
    /// Rejected; no bookkeeping happens
    Vetoed(VetoReason),
    /// Target has no owner (neutral geometry)
    Neutral,
    /// Receiver blocked the hit
    Blocked,
    /// A `DamageDealt` subscriber cancelled the application
    Cancelled,
    /// Receiver has no health capability
    Unreceived,
    /// Damage was applied
    Applied(DamageApplication),
}

impl Resolution {
    /// Whether the hit counts for history, side effects and piercing
    pub fn is_consumed(&self) -> bool {
        !matches!(self, Resolution::Vetoed(_))
    }

    /// Whether the target had no owner
    pub fn is_ownerless(&self) -> bool {
        matches!(self, Resolution::Neutral)
    }

    /// Applied damage amount
    pub fn applied_amount(&self) -> Option<f32> {
        match self {
            Resolution::Applied(damage) => Some(damage.amount),
            _ => None,
        }
    }
}

/// Collaborators used while resolving
pub struct ResolveEnv<'a> {
    /// Ownership, stats and health
    pub actors: &'a mut dyn ActorProvider,
    /// Notification bus
    pub events: &'a mut CombatEventBus,
    /// Source of block and crit rolls
    pub rng: &'a mut dyn RngCore,
    /// Global crit contribution and debug gating
    pub config: &'a ImpactConfig,
}

impl ResolveEnv<'_> {
    fn roll(&mut self) -> f32 {
        self.rng.gen_range(0.0_f32..100.0)
    }
}

/// Run steps 1-6 for one candidate hit
pub fn resolve_hit(
    core: &mut DetectorCore,
    info: &HitCollisionInfo,
    env: &mut ResolveEnv<'_>,
) -> Resolution {
    let detector = core.id();
    let target = info.target;

    if core.dealer.is_none() {
        if !core.warned_missing_dealer {
            warn!("Detector {:?} has no damage dealer; its hits do nothing", detector);
            core.warned_missing_dealer = true;
        }
        return Resolution::Vetoed(VetoReason::MissingDealer);
    }

    // 1. stale target
    if !env.actors.is_valid(target) {
        trace_hit!(env, "Detector {:?}: target {:?} went stale", detector, target);
        return Resolution::Stale;
    }

    // 2. history dedup
    if core.dedupes() && core.history.contains(target) {
        trace_hit!(env, "Detector {:?}: target {:?} already hit", detector, target);
        return Resolution::Vetoed(VetoReason::AlreadyHit);
    }

    // 3. ownership
    let dealer_actor = info.override_dealer.or(core.owner);
    let dealer_root = dealer_actor.and_then(|actor| {
        let root = env.actors.root_owner(actor);
        if root.is_none() {
            warn!("Dealer {:?} of detector {:?} has no root owner", actor, detector);
        }
        root
    });

    let Some(owner) = env.actors.owner_of(target) else {
        trace_hit!(env, "Detector {:?}: target {:?} is ownerless", detector, target);
        return Resolution::Neutral;
    };
    let Some(receiver) = env.actors.root_owner(owner) else {
        warn!("Owner {:?} of target {:?} has no root owner; treating as neutral", owner, target);
        return Resolution::Neutral;
    };

    if dealer_actor.is_some() && dealer_root.is_none() {
        return Resolution::Vetoed(VetoReason::UnresolvedDealer);
    }
    if dealer_root.is_some_and(|dealer| dealer.faction == receiver.faction) {
        trace_hit!(
            env,
            "Detector {:?}: {:?} and {:?} share faction {:?}",
            detector,
            dealer_root,
            receiver.actor,
            receiver.faction
        );
        return Resolution::Vetoed(VetoReason::SameFaction);
    }

    // 4. block roll
    let block_chance = env.actors.stat(receiver.actor, Stat::BlockChance);
    if block_chance > 0.0 {
        let roll = env.roll();
        if roll < block_chance {
            trace_hit!(env, "Detector {:?}: {:?} blocked (roll {:.2} < {:.2})", detector, receiver.actor, roll, block_chance);
            env.events.publish(&CombatEvent::BlockHappened {
                detector,
                dealer: dealer_root.map(|d| d.actor),
                receiver: receiver.actor,
                point: info.point,
            });
            return Resolution::Blocked;
        }
    }

    // 5. pierce scaling
    let amount = scaled_damage(core, dealer_root, env);

    // 6. crit and apply
    let crit_chance = env.config.crit.chance + dealer_stat(env, dealer_root, Stat::CritChance);
    let critical_roll = crit_chance > 0.0 && env.roll() < crit_chance;
    let crit_multiplier = env.config.crit.multiplier + dealer_stat(env, dealer_root, Stat::CritMultiplier);

    let Some(dealer) = core.dealer.as_mut() else {
        return Resolution::Vetoed(VetoReason::MissingDealer);
    };
    if critical_roll {
        dealer.set_pending_crit(crit_multiplier);
    }
    let crit = dealer.take_pending_crit();

    let damage = DamageApplication {
        source: dealer_root.map(|d| d.actor),
        amount: amount * crit.unwrap_or(1.0),
        damage_type: dealer.damage_type(),
        critical: crit.is_some(),
        point: info.point,
    };

    let vetoed = env.events.publish(&CombatEvent::DamageDealt {
        detector,
        receiver: receiver.actor,
        damage,
    });
    if vetoed {
        trace_hit!(env, "Detector {:?}: damage to {:?} cancelled by a subscriber", detector, receiver.actor);
        return Resolution::Cancelled;
    }

    if !env.actors.apply_damage(receiver.actor, &damage) {
        warn!("Receiver {:?} has no health capability", receiver.actor);
        return Resolution::Unreceived;
    }

    trace_hit!(
        env,
        "Detector {:?}: {:.2} {:?} damage to {:?}{}",
        detector,
        damage.amount,
        damage.damage_type,
        receiver.actor,
        if damage.critical { " (crit)" } else { "" }
    );
    env.events.publish(&CombatEvent::DamageTaken {
        detector,
        receiver: receiver.actor,
        damage,
    });
    Resolution::Applied(damage)
}

fn dealer_stat(env: &ResolveEnv<'_>, dealer: Option<RootOwner>, stat: Stat) -> f32 {
    dealer.map_or(0.0, |d| env.actors.stat(d.actor, stat))
}

fn scaled_damage(core: &DetectorCore, dealer_root: Option<RootOwner>, env: &ResolveEnv<'_>) -> f32 {
    let base = core.dealer.as_ref().map_or(0.0, |d| d.base_damage());
    let per_pierce = dealer_stat(env, dealer_root, Stat::DamagePerPierce);
    let pierces = core.piercing.total_pierces();

    if per_pierce > 0.0 && pierces > 0 {
        (base * (1.0 + per_pierce * 0.01 * pierces as f32)).max(1.0)
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Faction, Roster};
    use crate::damage::{DamageDealer, DamageType};
    use crate::detection::Piercing;
    use crate::events::EventType;
    use crate::foundation::collections::{ActorId, SlotMap, TargetId};
    use approx::assert_relative_eq;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Fixture {
        roster: Roster,
        events: CombatEventBus,
        config: ImpactConfig,
        colliders: SlotMap<TargetId, ()>,
        player: ActorId,
        enemy: ActorId,
        enemy_body: TargetId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut roster = Roster::new();
            let player = roster.spawn_with_health(Faction::PLAYER, 100.0);
            let enemy = roster.spawn_with_health(Faction::ENEMY, 100.0);
            let mut colliders = SlotMap::with_key();
            let enemy_body = colliders.insert(());
            roster.attach_collider(enemy_body, Some(enemy));
            Self {
                roster,
                events: CombatEventBus::new(),
                config: ImpactConfig::default(),
                colliders,
                player,
                enemy,
                enemy_body,
            }
        }

        fn collider(&mut self, owner: Option<ActorId>) -> TargetId {
            let id = self.colliders.insert(());
            self.roster.attach_collider(id, owner);
            id
        }

        fn core(&self, piercing: Piercing) -> DetectorCore {
            let mut core = DetectorCore::new(piercing, 0.0, 0.0);
            core.owner = Some(self.player);
            core.dealer = Some(DamageDealer::new(10.0, DamageType::Kinetic));
            core
        }

        fn resolve(&mut self, core: &mut DetectorCore, target: TargetId, rng: &mut dyn RngCore) -> Resolution {
            let mut env = ResolveEnv {
                actors: &mut self.roster,
                events: &mut self.events,
                rng,
                config: &self.config,
            };
            resolve_hit(core, &HitCollisionInfo::new(target), &mut env)
        }

        fn enemy_health(&self) -> f32 {
            self.roster.health(self.enemy).unwrap().current
        }
    }

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_applies_base_damage() {
        let mut fx = Fixture::new();
        let taken = Rc::new(RefCell::new(Vec::new()));
        let log = taken.clone();
        fx.events.subscribe(EventType::DamageTaken, move |event: &CombatEvent| {
            log.borrow_mut().push(event.receiver());
            false
        });

        let mut core = fx.core(Piercing::none());
        let body = fx.enemy_body;
        let resolution = fx.resolve(&mut core, body, &mut seeded());

        assert_eq!(resolution.applied_amount(), Some(10.0));
        assert_eq!(fx.enemy_health(), 90.0);
        assert_eq!(*taken.borrow(), vec![fx.enemy]);
    }

    #[test]
    fn test_same_faction_never_damaged() {
        let mut fx = Fixture::new();
        let ally = fx.roster.spawn_with_health(Faction::PLAYER, 50.0);
        let ally_body = fx.collider(Some(ally));

        let mut core = fx.core(Piercing::none());
        let resolution = fx.resolve(&mut core, ally_body, &mut seeded());

        assert_eq!(resolution, Resolution::Vetoed(VetoReason::SameFaction));
        assert!(!resolution.is_consumed());
        assert_eq!(fx.roster.health(ally).unwrap().current, 50.0);
    }

    #[test]
    fn test_possessed_enemy_is_an_ally() {
        let mut fx = Fixture::new();
        let player = fx.player;
        let enemy = fx.enemy;
        fx.roster.set_manipulated_by(enemy, Some(player));

        let mut core = fx.core(Piercing::none());
        let body = fx.enemy_body;
        assert_eq!(
            fx.resolve(&mut core, body, &mut seeded()),
            Resolution::Vetoed(VetoReason::SameFaction)
        );
        assert_eq!(fx.enemy_health(), 100.0);
    }

    #[test]
    fn test_ownerless_and_stale_are_consumed() {
        let mut fx = Fixture::new();
        let wall = fx.collider(None);
        let ghost = fx.collider(None);
        fx.roster.detach_collider(ghost);

        let mut core = fx.core(Piercing::none());
        let neutral = fx.resolve(&mut core, wall, &mut seeded());
        assert!(neutral.is_ownerless() && neutral.is_consumed());

        let stale = fx.resolve(&mut core, ghost, &mut seeded());
        assert_eq!(stale, Resolution::Stale);
        assert!(stale.is_consumed());
    }

    #[test]
    fn test_history_dedup_only_for_finite_piercing() {
        let mut fx = Fixture::new();
        let body = fx.enemy_body;

        let mut finite = fx.core(Piercing::finite(3, 100.0));
        finite.history.record(body);
        assert_eq!(
            fx.resolve(&mut finite, body, &mut seeded()),
            Resolution::Vetoed(VetoReason::AlreadyHit)
        );

        let mut infinite = fx.core(Piercing::infinite());
        infinite.history.record(body);
        assert!(fx.resolve(&mut infinite, body, &mut seeded()).applied_amount().is_some());
    }

    #[test]
    fn test_forced_block_roll() {
        let mut fx = Fixture::new();
        let enemy = fx.enemy;
        fx.roster.set_stat(enemy, Stat::BlockChance, 50.0);
        let blocks = Rc::new(RefCell::new(0));
        let counter = blocks.clone();
        fx.events.subscribe(EventType::BlockHappened, move |_: &CombatEvent| {
            *counter.borrow_mut() += 1;
            false
        });

        let mut core = fx.core(Piercing::none());
        let body = fx.enemy_body;
        let resolution = fx.resolve(&mut core, body, &mut StepRng::new(0, 0));

        assert_eq!(resolution, Resolution::Blocked);
        assert!(resolution.is_consumed());
        assert_eq!(*blocks.borrow(), 1);
        assert_eq!(fx.enemy_health(), 100.0);
    }

    #[test]
    fn test_damage_scales_with_prior_pierces() {
        let mut fx = Fixture::new();
        let player = fx.player;
        fx.roster.set_stat(player, Stat::DamagePerPierce, 50.0);

        let mut piercing = Piercing::finite(3, 100.0);
        piercing.decrement();
        piercing.decrement();
        let mut core = fx.core(piercing);
        let body = fx.enemy_body;

        let amount = fx.resolve(&mut core, body, &mut seeded()).applied_amount().unwrap();
        assert_relative_eq!(amount, 20.0);

        core.dealer = Some(DamageDealer::new(0.25, DamageType::Kinetic));
        let floored = fx.resolve(&mut core, body, &mut seeded()).applied_amount().unwrap();
        assert_relative_eq!(floored, 1.0);
    }

    #[test]
    fn test_crit_combines_global_and_dealer_and_resets() {
        let mut fx = Fixture::new();
        fx.config = ImpactConfig::default().with_crit(100.0, 1.5);
        let player = fx.player;
        fx.roster.set_stat(player, Stat::CritMultiplier, 0.5);

        let mut core = fx.core(Piercing::none());
        let body = fx.enemy_body;
        let resolution = fx.resolve(&mut core, body, &mut seeded());

        match resolution {
            Resolution::Applied(damage) => {
                assert!(damage.critical);
                assert_relative_eq!(damage.amount, 20.0);
            }
            other => panic!("expected applied damage, got {:?}", other),
        }
        assert!(!core.dealer.as_ref().unwrap().has_pending_crit());

        fx.config = ImpactConfig::default();
        let plain = fx.resolve(&mut core, body, &mut seeded());
        assert_eq!(plain.applied_amount(), Some(10.0));
    }

    #[test]
    fn test_damage_dealt_veto_cancels_application() {
        let mut fx = Fixture::new();
        fx.events.subscribe(EventType::DamageDealt, |_: &CombatEvent| true);

        let mut core = fx.core(Piercing::none());
        let body = fx.enemy_body;
        let resolution = fx.resolve(&mut core, body, &mut seeded());

        assert_eq!(resolution, Resolution::Cancelled);
        assert!(resolution.is_consumed());
        assert_eq!(fx.enemy_health(), 100.0);
    }

    #[test]
    fn test_despawned_owner_cannot_hit_its_former_allies() {
        let mut fx = Fixture::new();
        let ally = fx.roster.spawn_with_health(Faction::PLAYER, 50.0);
        let ally_body = fx.collider(Some(ally));
        let wall = fx.collider(None);
        let player = fx.player;
        fx.roster.despawn(player);

        let mut core = fx.core(Piercing::none());
        let resolution = fx.resolve(&mut core, ally_body, &mut seeded());
        assert_eq!(resolution, Resolution::Vetoed(VetoReason::UnresolvedDealer));
        assert_eq!(fx.roster.health(ally).unwrap().current, 50.0);

        let body = fx.enemy_body;
        assert_eq!(
            fx.resolve(&mut core, body, &mut seeded()),
            Resolution::Vetoed(VetoReason::UnresolvedDealer)
        );
        assert_eq!(fx.enemy_health(), 100.0);
        assert!(fx.resolve(&mut core, wall, &mut seeded()).is_ownerless());
    }

    #[test]
    fn test_missing_dealer_degrades_to_noop() {
        let mut fx = Fixture::new();
        let mut core = fx.core(Piercing::none());
        core.dealer = None;
        let body = fx.enemy_body;

        let resolution = fx.resolve(&mut core, body, &mut seeded());
        assert_eq!(resolution, Resolution::Vetoed(VetoReason::MissingDealer));
        assert!(core.warned_missing_dealer);
        assert_eq!(fx.enemy_health(), 100.0);
    }
}
