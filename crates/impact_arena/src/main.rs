//! Headless combat arena
//!
//! Drives the hit detection engine through a short scripted skirmish: a turret
//! fires piercing bolts down a lane of grunts, a grenade bursts at the far end and
//! a laser sweeps the lane until it reaches the back wall.
//!
//! Usage: `impact_arena [config.toml|config.ron]`

use impact_core::prelude::*;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::rc::Rc;

const TICK: f32 = 1.0 / 30.0;
const TICKS: u32 = 240;
const BOLT_SPEED: f32 = 24.0;
const BOLT_PREFAB: PrefabId = PrefabId(1);
const SPARK_PREFAB: PrefabId = PrefabId(2);

struct Shot {
    detector: DetectorId,
    velocity: Vec3,
}

struct Skirmish {
    world: SphereWorld,
    roster: Roster,
    pool: ObjectPool,
    scheduler: Scheduler,
    turret: ActorId,
    grunts: Vec<ActorId>,
    shots: Vec<Shot>,
    damage_log: Rc<RefCell<Vec<(ActorId, f32, bool)>>>,
}

impl Skirmish {
    fn new(config: ImpactConfig) -> Result<Self, ImpactError> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut world = SphereWorld::new();
        let mut roster = Roster::new();
        let mut pool = ObjectPool::new();
        pool.create_pool(BOLT_PREFAB, 4);
        pool.create_pool(SPARK_PREFAB, 8);

        let turret = roster.spawn_with_health(Faction::PLAYER, 200.0);
        roster.set_stat(turret, Stat::CritChance, 10.0);
        roster.set_stat(turret, Stat::DamagePerPierce, 25.0);

        let mut grunts = Vec::new();
        for row in 0..6 {
            let grunt = roster.spawn_with_health(Faction::ENEMY, 60.0);
            roster.set_stat(grunt, Stat::BlockChance, 15.0);
            let jitter = rng.gen_range(-0.3_f32..0.3);
            let body = world.add(Vec3::new(jitter, 0.0, 6.0 + row as f32 * 4.0), 0.8, HitLayers::ENEMY);
            roster.attach_collider(body, Some(grunt));
            grunts.push(grunt);
        }
        let wall = world.add(Vec3::new(0.0, 0.0, 32.0), 2.0, HitLayers::ENVIRONMENT);
        roster.attach_collider(wall, None);

        let mut scheduler = Scheduler::new(config)?;
        let damage_log: Rc<RefCell<Vec<(ActorId, f32, bool)>>> = Rc::default();
        let sink = damage_log.clone();
        scheduler.events_mut().subscribe(EventType::DamageTaken, move |event: &CombatEvent| {
            if let CombatEvent::DamageTaken { receiver, damage, .. } = event {
                sink.borrow_mut().push((*receiver, damage.amount, damage.critical));
            }
            false
        });
        scheduler.events_mut().subscribe(EventType::BlockHappened, |event: &CombatEvent| {
            info!("Blocked: {:?}", event.receiver());
            false
        });

        Ok(Self {
            world,
            roster,
            pool,
            scheduler,
            turret,
            grunts,
            shots: Vec::new(),
            damage_log,
        })
    }

    fn fire_bolt(&mut self) -> Result<(), ImpactError> {
        let host = self.pool.acquire(BOLT_PREFAB, None);
        if host.is_none() {
            warn!("Bolt pool exhausted; firing without a host");
        }

        let mut bolt = DetectorBuilder::point_forward(PointForwardDetector::new().with_trail(0.2))
            .owner(self.turret)
            .dealer(DamageDealer::new(12.0, DamageType::Kinetic))
            .max_piercing(2)
            .pierce_chance(80.0)
            .observer(HitObserver::SpawnOnHit {
                prefab: SPARK_PREFAB,
                final_only: true,
            })
            .on_terminal(|report| info!("Bolt {:?} spent after {} pierces", report.detector, report.total_pierces));
        if let Some(host) = host {
            bolt = bolt.host(host);
        }

        let detector = self.scheduler.spawn(bolt.build(&self.scheduler.config().defaults)?)?;
        self.shots.push(Shot {
            detector,
            velocity: Vec3::z() * BOLT_SPEED,
        });
        Ok(())
    }

    fn throw_grenade(&mut self) -> Result<(), ImpactError> {
        let defaults = self.scheduler.config().defaults;
        let blast = DetectorBuilder::area(3.5)
            .dealer(DamageDealer::new(30.0, DamageType::Explosive))
            .build(&defaults)?;
        let blast = self.scheduler.insert(blast);

        let grenade = DetectorBuilder::swept(0.3)
            .owner(self.turret)
            .dealer(DamageDealer::new(5.0, DamageType::Kinetic))
            .observer(HitObserver::TriggerArea {
                area: blast,
                when: AreaWhen::OnFinalHit,
            })
            .teardown(TeardownPolicy::DestroyAfter(0.5))
            .build(&defaults)?;
        let detector = self.scheduler.spawn(grenade)?;
        self.shots.push(Shot {
            detector,
            velocity: Vec3::new(0.0, 0.0, BOLT_SPEED * 0.5),
        });
        Ok(())
    }

    fn sweep_laser(&mut self) -> Result<(), ImpactError> {
        let laser = DetectorBuilder::line(vec![Vec3::zeros(), Vec3::new(0.0, 0.0, 40.0)])
            .owner(self.turret)
            .dealer(DamageDealer::new(8.0, DamageType::Energy))
            .infinite_piercing()
            .on_terminal(|report| info!("Laser stopped at {:?}", report.target))
            .build(&self.scheduler.config().defaults)?;
        self.scheduler.spawn(laser)?;
        Ok(())
    }

    fn step(&mut self) {
        let Self {
            world,
            roster,
            pool,
            scheduler,
            shots,
            ..
        } = self;

        shots.retain(|shot| {
            let Some(detector) = scheduler.detector(shot.detector) else {
                return false;
            };
            if detector.core.is_retired() {
                return false;
            }
            let next = detector.core.motion.current + shot.velocity * TICK;
            scheduler.set_position(shot.detector, next);
            scheduler.set_velocity(shot.detector, shot.velocity);
            true
        });

        let mut services = Services {
            spatial: &*world,
            actors: &mut *roster,
            pool: &mut *pool,
        };
        scheduler.tick(TICK, &mut services);

        for retirement in scheduler.drain_retired() {
            info!("Retired {:?}: {:?}", retirement.detector, retirement.teardown);
        }
        for effect in scheduler.drain_side_effects() {
            match effect {
                SideEffect::Spawned { prefab, handle, pooled, .. } => {
                    info!("Spawned {:?} ({:?}, pooled: {})", prefab, handle, pooled);
                    if pooled && !pool.release(handle) {
                        warn!("Spark {:?} could not be returned", handle);
                    }
                }
                SideEffect::AreaTriggered { area, at, .. } => info!("Area {:?} burst at {:?}", area, at),
                SideEffect::BreakRequested { target, .. } => info!("Break requested for {:?}", target),
            }
        }
        pool.update(TICK);
    }

    fn report(&self) {
        let log = self.damage_log.borrow();
        let crits = log.iter().filter(|(_, _, critical)| *critical).count();
        info!("{} damage applications ({} critical)", log.len(), crits);

        for grunt in &self.grunts {
            if let Some(health) = self.roster.health(*grunt) {
                let status = if health.is_depleted() { "down" } else { "standing" };
                info!("Grunt {:?}: {:.1}/{:.1} ({})", grunt, health.current, health.max, status);
            }
        }
        info!("Pool stats: {:?}", self.pool.stats());
    }
}

fn load_config() -> Result<ImpactConfig, ImpactError> {
    match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            let config = ImpactConfig::load_from_file(&path)?;
            config.validate()?;
            Ok(config)
        }
        None => Ok(ImpactConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    impact_core::foundation::logging::init_with_default("info");

    info!("Starting impact arena");
    let config = load_config()?;
    let mut skirmish = Skirmish::new(config)?;

    for tick in 0..TICKS {
        match tick {
            t if t % 20 == 0 && t < 120 => skirmish.fire_bolt()?,
            130 => skirmish.throw_grenade()?,
            200 => skirmish.sweep_laser()?,
            _ => {}
        }
        skirmish.step();
    }

    skirmish.report();
    info!("Arena finished after {} ticks", skirmish.scheduler.tick_count());
    Ok(())
}
