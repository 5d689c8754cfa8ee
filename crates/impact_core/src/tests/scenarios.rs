//! End-to-end scenarios: piercing budgets, areas, blocks, teardown paths

use super::Arena;
use crate::actor::{Faction, Stat};
use crate::damage::{DamageDealer, DamageType};
use crate::detection::{
    AreaWhen, DetectorBuilder, HitObserver, HitReport, PointForwardDetector, SideEffect, TriggerMode,
};
use crate::events::{CombatEvent, EventType};
use crate::foundation::collections::{PrefabId, TargetId};
use crate::foundation::math::Vec3;
use crate::pool::{ObjectState, PoolService, Teardown, TeardownPolicy};
use rand::rngs::mock::StepRng;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn lane(z: f32) -> Vec3 {
    Vec3::new(0.0, 0.0, z)
}

fn counter() -> (Rc<Cell<u32>>, Rc<Cell<u32>>) {
    let count = Rc::new(Cell::new(0));
    (count.clone(), count)
}

#[test]
fn test_finite_piercing_retires_after_p_plus_one_hits() {
    let mut arena = Arena::new();
    let enemies: Vec<_> = [5.0, 10.0, 15.0, 20.0].iter().map(|z| arena.enemy(lane(*z)).0).collect();
    let (fired, count) = counter();

    let bolt = arena
        .bolt()
        .max_piercing(2)
        .on_terminal(move |_| count.set(count.get() + 1));
    let id = arena.spawn(bolt);
    arena.fly(id, 25);

    let health: Vec<f32> = enemies.iter().map(|e| arena.health(*e)).collect();
    assert_eq!(health, vec![90.0, 90.0, 90.0, 100.0]);
    assert_eq!(fired.get(), 1);

    let retired = arena.scheduler.drain_retired();
    assert_eq!(retired.len(), 1);
    assert_eq!(retired[0].teardown, Teardown::Destroyed { delay: 0.0 });
    assert!(arena.scheduler.detector(id).is_none());
}

#[test]
fn test_single_pierce_hits_a_then_retires_on_b() {
    let mut arena = Arena::new();
    let (a, _) = arena.enemy(lane(5.0));
    let (b, _) = arena.enemy(lane(10.0));

    let id = arena.spawn(arena.bolt().max_piercing(1).pierce_chance(100.0));
    arena.fly(id, 5);

    assert_eq!(arena.health(a), 90.0);
    assert_eq!(arena.health(b), 100.0);
    assert!(arena.scheduler.is_active(id));
    let piercing = arena.scheduler.detector(id).unwrap().core.piercing;
    assert_eq!(piercing.remaining(), Some(0));
    assert_eq!(piercing.total_pierces(), 1);

    arena.fly(id, 5);
    assert_eq!(arena.health(b), 90.0);
    assert!(!arena.scheduler.is_active(id));
    assert_eq!(arena.scheduler.drain_retired().len(), 1);

    arena.tick();
    assert!(arena.scheduler.detector(id).is_none());
}

#[test]
fn test_area_damages_owned_targets_only() {
    let mut arena = Arena::new();
    let center = lane(20.0);
    let inside: Vec<_> = [Vec3::x(), -Vec3::x(), Vec3::y()]
        .iter()
        .map(|offset| arena.enemy(center + offset).0)
        .collect();
    let rock = arena.wall(center - Vec3::y());
    let (outside, _) = arena.enemy(lane(30.0));

    let seen: Rc<RefCell<Vec<TargetId>>> = Rc::default();
    let log = seen.clone();
    let (dealt, count) = counter();
    arena.scheduler.events_mut().subscribe(EventType::DamageDealt, move |_: &CombatEvent| {
        count.set(count.get() + 1);
        false
    });

    let area = DetectorBuilder::area(3.0)
        .owner(arena.player)
        .dealer(DamageDealer::new(25.0, DamageType::Explosive))
        .observer(HitObserver::Notify(Box::new(move |report: &HitReport| {
            log.borrow_mut().push(report.target);
        })))
        .build(&arena.scheduler.config().defaults)
        .unwrap();
    let id = arena.scheduler.insert(area);
    arena.trigger_area(id, center);

    for enemy in &inside {
        assert_eq!(arena.health(*enemy), 75.0);
    }
    assert_eq!(arena.health(outside), 100.0);
    assert_eq!(dealt.get(), 3);
    assert_eq!(seen.borrow().len(), 3);
    assert!(!seen.borrow().contains(&rock));
    assert!(arena.scheduler.drain_retired().is_empty());
}

#[test]
fn test_forced_block_still_consumes_the_hit() {
    let mut arena = Arena::new().with_rng(StepRng::new(0, 0));
    let (enemy, _) = arena.enemy(lane(5.0));
    arena.roster.set_stat(enemy, Stat::BlockChance, 50.0);

    let (blocks, count) = counter();
    arena.scheduler.events_mut().subscribe(EventType::BlockHappened, move |_: &CombatEvent| {
        count.set(count.get() + 1);
        false
    });

    let id = arena.spawn(arena.bolt());
    arena.fly(id, 6);

    assert_eq!(arena.health(enemy), 100.0);
    assert_eq!(blocks.get(), 1);
    let retired = arena.scheduler.drain_retired();
    assert_eq!(retired.len(), 1);
    assert_eq!(retired[0].detector, id);
}

#[test]
fn test_grenade_final_hit_fires_area_with_owner_identity() {
    let mut arena = Arena::new();
    let (target, _) = arena.enemy(lane(5.0));
    let (neighbor, _) = arena.enemy(Vec3::new(2.0, 0.0, 5.0));
    let (ally, _) = arena.actor(Faction::PLAYER, Vec3::new(-2.0, 0.0, 5.0));

    let blast = DetectorBuilder::area(4.0)
        .dealer(DamageDealer::new(20.0, DamageType::Explosive))
        .build(&arena.scheduler.config().defaults)
        .unwrap();
    let blast = arena.scheduler.insert(blast);

    let grenade = DetectorBuilder::swept(0.25)
        .owner(arena.player)
        .dealer(DamageDealer::new(10.0, DamageType::Kinetic))
        .observer(HitObserver::TriggerArea {
            area: blast,
            when: AreaWhen::OnFinalHit,
        });
    let id = arena.spawn(grenade);
    arena.fly(id, 6);

    assert_eq!(arena.health(target), 70.0);
    assert_eq!(arena.health(neighbor), 80.0);
    assert_eq!(arena.health(ally), 100.0);

    let effects = arena.scheduler.drain_side_effects();
    assert!(effects
        .iter()
        .any(|e| matches!(e, SideEffect::AreaTriggered { area, .. } if *area == blast)));
}

#[test]
fn test_line_resolves_along_path_and_stops_at_wall() {
    let mut arena = Arena::new();
    let (first, _) = arena.enemy(lane(5.0));
    let (second, _) = arena.enemy(lane(10.0));
    arena.wall(lane(15.0));
    let (shielded, _) = arena.enemy(lane(20.0));
    let (fired, count) = counter();

    let laser = DetectorBuilder::line(vec![Vec3::zeros(), lane(30.0)])
        .owner(arena.player)
        .dealer(DamageDealer::new(15.0, DamageType::Energy))
        .infinite_piercing()
        .on_terminal(move |_| count.set(count.get() + 1));
    arena.spawn(laser);
    arena.tick();
    arena.tick();
    arena.tick();

    assert_eq!(arena.health(first), 85.0);
    assert_eq!(arena.health(second), 85.0);
    assert_eq!(arena.health(shielded), 100.0);
    assert_eq!(fired.get(), 1);
}

#[test]
fn test_trigger_interval_rehits_while_overlapping() {
    let mut arena = Arena::new();
    let (enemy, body) = arena.enemy(Vec3::zeros());

    let aura = DetectorBuilder::trigger(TriggerMode::Interval(0.5))
        .owner(arena.player)
        .dealer(DamageDealer::new(10.0, DamageType::Fire))
        .infinite_piercing();
    let id = arena.spawn(aura);
    arena.scheduler.on_trigger_enter(id, body);

    for _ in 0..4 {
        arena.tick();
    }
    assert_eq!(arena.health(enemy), 80.0);

    arena.scheduler.on_trigger_exit(id, body);
    for _ in 0..4 {
        arena.tick();
    }
    assert_eq!(arena.health(enemy), 80.0);
}

#[test]
fn test_manual_trigger_runs_only_on_request() {
    let mut arena = Arena::new();
    let (enemy, body) = arena.enemy(lane(1.0));

    let swing = DetectorBuilder::single_target(2.0, body)
        .owner(arena.player)
        .dealer(DamageDealer::new(10.0, DamageType::Kinetic))
        .infinite_piercing()
        .manual_trigger();
    let id = arena.spawn(swing);
    for _ in 0..3 {
        arena.tick();
    }
    assert_eq!(arena.health(enemy), 100.0);

    let mut services = crate::scheduler::Services {
        spatial: &arena.world,
        actors: &mut arena.roster,
        pool: &mut arena.pool,
    };
    assert_eq!(arena.scheduler.trigger(id, &mut services).unwrap(), 1);
    assert_eq!(arena.health(enemy), 90.0);
}

#[test]
fn test_disabled_manual_trigger_finds_nothing() {
    let mut arena = Arena::new();
    let (enemy, body) = arena.enemy(lane(1.0));

    let swing = DetectorBuilder::single_target(2.0, body)
        .owner(arena.player)
        .dealer(DamageDealer::new(10.0, DamageType::Kinetic))
        .infinite_piercing()
        .manual_trigger();
    let id = arena.spawn(swing);
    arena.scheduler.set_enabled(id, false);

    let mut services = crate::scheduler::Services {
        spatial: &arena.world,
        actors: &mut arena.roster,
        pool: &mut arena.pool,
    };
    assert_eq!(arena.scheduler.trigger(id, &mut services).unwrap(), 0);
    arena.scheduler.set_enabled(id, true);
    assert_eq!(arena.scheduler.trigger(id, &mut services).unwrap(), 1);
    assert_eq!(arena.health(enemy), 90.0);
}

#[test]
fn test_bolt_of_despawned_shooter_spares_its_allies() {
    let mut arena = Arena::new();
    let (ally, _) = arena.actor(Faction::PLAYER, lane(2.0));
    let (enemy, _) = arena.enemy(lane(4.0));

    let id = arena.spawn(arena.bolt().max_piercing(5));
    arena.roster.despawn(arena.player);
    arena.fly(id, 6);

    assert_eq!(arena.health(ally), 100.0);
    assert_eq!(arena.health(enemy), 100.0);
    assert!(arena.scheduler.is_active(id));
}

#[test]
fn test_pooled_host_returns_and_detector_rearms() {
    const BOLT: PrefabId = PrefabId(7);
    let mut arena = Arena::new();
    let (enemy, _) = arena.enemy(lane(3.0));
    arena.pool.create_pool(BOLT, 1);
    let host = arena.pool.acquire(BOLT, None).unwrap();
    let (fired, count) = counter();

    let bolt = arena
        .bolt()
        .host(host)
        .on_terminal(move |_| count.set(count.get() + 1));
    let id = arena.spawn(bolt);
    arena.fly(id, 4);

    let retired = arena.scheduler.drain_retired();
    assert_eq!(retired[0].teardown, Teardown::Pooled);
    assert_eq!(arena.pool.state(host), Some(ObjectState::Pooled));
    assert_eq!(arena.health(enemy), 90.0);

    arena.tick();
    assert!(arena.scheduler.detector(id).is_some());
    assert_eq!(arena.scheduler.membership(id), None);

    arena.scheduler.rearm(id, Vec3::zeros()).unwrap();
    arena.scheduler.register(id).unwrap();
    arena.fly(id, 4);
    assert_eq!(arena.health(enemy), 80.0);
    assert_eq!(fired.get(), 2);
}

#[test]
fn test_manual_destroy_defers_teardown() {
    let mut arena = Arena::new();
    arena.enemy(lane(3.0));
    let host = arena.pool.instantiate(PrefabId(2));

    let id = arena.spawn(arena.bolt().host(host).manual_destroy());
    arena.fly(id, 4);

    let retired = arena.scheduler.drain_retired();
    assert_eq!(retired[0].teardown, Teardown::Deferred);
    assert_eq!(arena.pool.state(host), Some(ObjectState::Active));
    assert!(arena.scheduler.detector(id).is_some());

    arena.scheduler.destroy(id).unwrap();
    assert!(arena.scheduler.register(id).is_ok());
    arena.tick();
    assert!(arena.scheduler.detector(id).is_none());
    assert_eq!(arena.pool.state(host), Some(ObjectState::Destroying));
}

#[test]
fn test_destroy_after_delay_teardown() {
    let mut arena = Arena::new();
    arena.enemy(lane(3.0));
    let host = arena.pool.instantiate(PrefabId(3));

    let id = arena.spawn(arena.bolt().host(host).teardown(TeardownPolicy::DestroyAfter(0.5)));
    arena.fly(id, 4);

    let retired = arena.scheduler.drain_retired();
    assert_eq!(retired[0].teardown, Teardown::Destroyed { delay: 0.5 });
    assert_eq!(arena.pool.state(host), Some(ObjectState::Destroying));
    assert_eq!(arena.pool.update(0.5), vec![host]);
}

#[test]
fn test_spawn_on_hit_falls_back_when_pool_exhausted() {
    const SPARK: PrefabId = PrefabId(11);
    let mut arena = Arena::new();
    arena.enemy(lane(3.0));
    arena.enemy(lane(6.0));
    arena.pool.create_pool(SPARK, 1);

    let bolt = arena.bolt().max_piercing(5).observer(HitObserver::SpawnOnHit {
        prefab: SPARK,
        final_only: false,
    });
    let id = arena.spawn(bolt);
    arena.fly(id, 8);

    let pooled: Vec<bool> = arena
        .scheduler
        .drain_side_effects()
        .iter()
        .filter_map(|e| match e {
            SideEffect::Spawned { pooled, .. } => Some(*pooled),
            _ => None,
        })
        .collect();
    assert_eq!(pooled, vec![true, false]);
}

#[test]
fn test_wall_hit_breaks_and_retires() {
    let mut arena = Arena::new();
    let wall = arena.wall(lane(3.0));

    let bolt = arena
        .bolt()
        .infinite_piercing()
        .observer(HitObserver::BreakPhysical { impulse: 5.0 });
    let id = arena.spawn(bolt);
    arena.fly(id, 4);

    let effects = arena.scheduler.drain_side_effects();
    assert_eq!(
        effects,
        vec![SideEffect::BreakRequested {
            detector: id,
            target: wall,
            impulse: Vec3::new(0.0, 0.0, 5.0),
        }]
    );
    assert_eq!(arena.scheduler.drain_retired().len(), 1);
}

#[test]
fn test_point_forward_lead_catches_target_before_arrival() {
    let mut arena = Arena::new();
    let (enemy, _) = arena.enemy(lane(4.0));

    let probe = DetectorBuilder::point_forward(PointForwardDetector::new().with_lead(2.0))
        .owner(arena.player)
        .dealer(DamageDealer::new(10.0, DamageType::Kinetic));
    let id = arena.spawn(probe);
    arena.fly(id, 2);
    assert_eq!(arena.health(enemy), 90.0);
}
