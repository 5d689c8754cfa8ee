//! Damage resolution
//!
//! [`DamageDealer`] is the damage capability a detector carries; the
//! [`pipeline`] arbitrates each candidate hit through stale-target, history,
//! ownership, block, pierce-scaling and crit steps before applying it.

mod dealer;
pub mod pipeline;

pub use dealer::{DamageApplication, DamageDealer, DamageType};
pub use pipeline::{resolve_hit, Resolution, ResolveEnv, VetoReason};
