//! # Impact Core
//!
//! Hit detection and damage resolution for real-time action simulations.
//!
//! ## Features
//!
//! - **Detectors**: line/polyline, point-forward raycast, swept sphere, overlap
//!   tracking, single-target proximity and on-demand area bursts
//! - **Scheduler**: double-buffered registration, per-detector check throttling and
//!   hit-history expiry, all driven by the frame delta-time
//! - **Damage pipeline**: ownership vetoes, block and crit rolls, pierce-scaled damage
//! - **Piercing**: finite or unlimited pierce budgets with a probabilistic gate
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use impact_core::prelude::*;
//!
//! fn main() -> Result<(), ImpactError> {
//!     let mut world = SphereWorld::new();
//!     let mut roster = Roster::new();
//!     let mut pool = ObjectPool::new();
//!
//!     let player = roster.spawn(Faction::PLAYER);
//!     let grunt = roster.spawn_with_health(Faction::ENEMY, 30.0);
//!     let body = world.add(Vec3::new(0.0, 0.0, 5.0), 1.0, HitLayers::ENEMY);
//!     roster.attach_collider(body, Some(grunt));
//!
//!     let mut scheduler = Scheduler::new(ImpactConfig::default())?;
//!     let bolt = DetectorBuilder::point_forward(PointForwardDetector::new())
//!         .owner(player)
//!         .dealer(DamageDealer::new(10.0, DamageType::Energy))
//!         .build(&scheduler.config().defaults)?;
//!     let id = scheduler.spawn(bolt)?;
//!
//!     for step in 1..=10 {
//!         scheduler.set_position(id, Vec3::new(0.0, 0.0, step as f32));
//!         let mut services = Services {
//!             spatial: &world,
//!             actors: &mut roster,
//!             pool: &mut pool,
//!         };
//!         scheduler.tick(1.0 / 60.0, &mut services);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod physics;
pub mod spatial;
pub mod actor;
pub mod events;
pub mod pool;
pub mod detection;
pub mod damage;
pub mod scheduler;

mod error;

pub use error::ImpactError;

#[cfg(test)]
mod tests;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        actor::{ActorProvider, Faction, Roster, RootOwner, Stat, StatSheet},
        config::{Config, ImpactConfig},
        damage::{DamageApplication, DamageDealer, DamageType, Resolution},
        detection::{
            AreaWhen, Detector, DetectorBuilder, DetectorKind, HitObserver, LineDetector,
            PointForwardDetector, SideEffect, TriggerMode,
        },
        events::{CombatEvent, CombatEventBus, EventType},
        foundation::{
            collections::{ActorId, DetectorId, ObjectHandle, PrefabId, TargetId},
            math::Vec3,
        },
        physics::HitLayers,
        pool::{ObjectPool, PoolService, Retirement, Teardown, TeardownPolicy},
        scheduler::{Scheduler, SchedulerHandle, Services},
        spatial::{SpatialBackend, SphereWorld},
        ImpactError,
    };
}
