//! Scenario and property tests driving the full scheduler
//!
//! Every test builds a small arena: a sphere world, a roster, an object pool and a
//! scheduler, then ticks it at a fixed delta-time.

mod scenarios;

use crate::actor::{Faction, Roster};
use crate::config::ImpactConfig;
use crate::damage::{DamageDealer, DamageType};
use crate::detection::{DetectorBuilder, PointForwardDetector};
use crate::foundation::collections::{ActorId, DetectorId, TargetId};
use crate::foundation::math::Vec3;
use crate::physics::HitLayers;
use crate::pool::ObjectPool;
use crate::scheduler::{Scheduler, Services};
use crate::spatial::SphereWorld;
use rand::RngCore;

const DT: f32 = 0.25;

pub(crate) struct Arena {
    pub world: SphereWorld,
    pub roster: Roster,
    pub pool: ObjectPool,
    pub scheduler: Scheduler,
    pub player: ActorId,
}

impl Arena {
    pub fn new() -> Self {
        Self::with_config(ImpactConfig::default())
    }

    pub fn with_config(config: ImpactConfig) -> Self {
        let mut roster = Roster::new();
        let player = roster.spawn_with_health(Faction::PLAYER, 100.0);
        Self {
            world: SphereWorld::new(),
            roster,
            pool: ObjectPool::new(),
            scheduler: Scheduler::new(config).unwrap(),
            player,
        }
    }

    pub fn with_rng<R: RngCore + 'static>(mut self, rng: R) -> Self {
        self.scheduler = self.scheduler.with_rng(rng);
        self
    }

    /// Enemy with 100 health and one collider
    pub fn enemy(&mut self, at: Vec3) -> (ActorId, TargetId) {
        self.actor(Faction::ENEMY, at)
    }

    pub fn actor(&mut self, faction: Faction, at: Vec3) -> (ActorId, TargetId) {
        let actor = self.roster.spawn_with_health(faction, 100.0);
        let body = self.world.add(at, 0.5, HitLayers::ENEMY);
        self.roster.attach_collider(body, Some(actor));
        (actor, body)
    }

    /// Ownerless environment collider
    pub fn wall(&mut self, at: Vec3) -> TargetId {
        let wall = self.world.add(at, 0.5, HitLayers::ENVIRONMENT);
        self.roster.attach_collider(wall, None);
        wall
    }

    /// Player-owned point-forward bolt dealing 10 damage
    pub fn bolt(&self) -> DetectorBuilder {
        DetectorBuilder::point_forward(PointForwardDetector::new())
            .owner(self.player)
            .dealer(DamageDealer::new(10.0, DamageType::Kinetic))
    }

    pub fn spawn(&mut self, builder: DetectorBuilder) -> DetectorId {
        let detector = builder.build(&self.scheduler.config().defaults).unwrap();
        self.scheduler.spawn(detector).unwrap()
    }

    pub fn tick(&mut self) {
        let mut services = Services {
            spatial: &self.world,
            actors: &mut self.roster,
            pool: &mut self.pool,
        };
        self.scheduler.tick(DT, &mut services);
    }

    /// Move a detector along +Z one unit per tick until it is gone or `ticks` run out
    pub fn fly(&mut self, id: DetectorId, ticks: usize) {
        for _ in 0..ticks {
            if let Some(detector) = self.scheduler.detector(id) {
                let next = detector.core.motion.current + Vec3::z();
                self.scheduler.set_position(id, next);
            }
            self.tick();
        }
    }

    pub fn trigger_area(&mut self, id: DetectorId, at: Vec3) {
        let mut services = Services {
            spatial: &self.world,
            actors: &mut self.roster,
            pool: &mut self.pool,
        };
        self.scheduler.trigger_area(id, at, &mut services).unwrap();
    }

    pub fn health(&self, actor: ActorId) -> f32 {
        self.roster.health(actor).unwrap().current
    }
}
