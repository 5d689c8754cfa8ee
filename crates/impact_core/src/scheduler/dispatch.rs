//! Result dispatch, side effects, terminal check and teardown

use super::{AreaBurst, Scheduler, Services};
use crate::damage::{resolve_hit, ResolveEnv};
use crate::detection::{
    AreaWhen, Detection, HitCollisionInfo, HitObserver, HitReport, QueryContext, SideEffect,
    TerminalReport,
};
use crate::foundation::collections::{DetectorId, ObjectHandle};
use crate::foundation::math::Vec3;
use crate::pool::{PoolService, Retirement, Teardown, TeardownPolicy};
use log::{debug, warn};

impl Scheduler {
    /// Route detection results through the pipeline
    ///
    /// Batches flag their last element as the final hit; path results are final
    /// one by one and stop as soon as the detector retires.
    pub(super) fn dispatch(
        &mut self,
        id: DetectorId,
        detection: Detection,
        services: &mut Services<'_>,
        in_burst: bool,
    ) {
        match detection {
            Detection::Miss => {}
            Detection::Single(info) => {
                self.resolve_one(id, &info, true, services, in_burst);
            }
            Detection::Batch(hits) => {
                let last = hits.len().saturating_sub(1);
                let mut last_consumed = None;
                for (index, info) in hits.iter().enumerate() {
                    if self.is_halted(id) {
                        break;
                    }
                    let final_hit = index == last;
                    if let Some(report) = self.resolve_one(id, info, final_hit, services, in_burst) {
                        last_consumed = Some((report, final_hit));
                    }
                }

                // The flagged hit was vetoed: the last consumed one carries the terminal check
                if let Some((report, false)) = last_consumed {
                    if !self.is_halted(id) {
                        self.conclude(id, &report, services);
                    }
                }
            }
            Detection::Path(hits) => {
                for info in &hits {
                    if self.is_halted(id) {
                        break;
                    }
                    self.resolve_one(id, info, true, services, in_burst);
                }
            }
        }
    }

    fn is_halted(&self, id: DetectorId) -> bool {
        self.detectors
            .get(id)
            .map_or(true, |d| d.core.retired || d.core.begin_destroyed)
    }

    fn resolve_one(
        &mut self,
        id: DetectorId,
        info: &HitCollisionInfo,
        final_hit: bool,
        services: &mut Services<'_>,
        in_burst: bool,
    ) -> Option<HitReport> {
        let detector = self.detectors.get_mut(id)?;
        let core = &mut detector.core;
        core.final_hit = final_hit;

        let mut env = ResolveEnv {
            actors: &mut *services.actors,
            events: &mut self.events,
            rng: self.rng.as_mut(),
            config: &self.config,
        };
        let resolution = resolve_hit(core, info, &mut env);
        if !resolution.is_consumed() {
            return None;
        }

        let report = HitReport {
            detector: id,
            target: info.target,
            point: info.point.unwrap_or(core.motion.current),
            direction: info.direction,
            resolution,
            final_hit,
        };

        // Side effects
        let instigator = info.override_dealer.or(core.owner);
        for observer in &mut core.observers {
            match observer {
                HitObserver::SpawnOnHit { prefab, final_only } => {
                    if *final_only && !final_hit {
                        continue;
                    }
                    let (handle, pooled) = match services.pool.acquire(*prefab, None) {
                        Some(handle) => (handle, true),
                        None => {
                            warn!("Pool for {:?} exhausted; instantiating directly", prefab);
                            (services.pool.instantiate(*prefab), false)
                        }
                    };
                    self.side_effects.push(SideEffect::Spawned {
                        detector: id,
                        prefab: *prefab,
                        handle,
                        at: report.point,
                        pooled,
                    });
                }
                HitObserver::BreakPhysical { impulse } => {
                    self.side_effects.push(SideEffect::BreakRequested {
                        detector: id,
                        target: info.target,
                        impulse: info.direction.unwrap_or_else(Vec3::zeros) * *impulse,
                    });
                }
                HitObserver::TriggerArea { area, when } => {
                    if in_burst {
                        debug!("Detector {:?}: area bursts do not trigger further areas", id);
                        continue;
                    }
                    if *when == AreaWhen::OnFinalHit && !final_hit {
                        continue;
                    }
                    self.area_bursts.push_back(AreaBurst {
                        area: *area,
                        at: report.point,
                        instigator,
                    });
                    self.side_effects.push(SideEffect::AreaTriggered {
                        instigator: id,
                        area: *area,
                        at: report.point,
                    });
                }
                HitObserver::Notify(callback) => callback(&report),
            }
        }

        if !final_hit {
            core.history.record(info.target);
            return Some(report);
        }
        self.conclude(id, &report, services);
        Some(report)
    }

    /// Terminal check for this tick's final consumed hit
    fn conclude(&mut self, id: DetectorId, report: &HitReport, services: &mut Services<'_>) {
        let Some(detector) = self.detectors.get_mut(id) else {
            return;
        };
        let core = &mut detector.core;
        core.final_hit = true;

        let terminal = report.resolution.is_ownerless()
            || !core.piercing.roll(self.rng.as_mut())
            || (core.piercing.is_finite() && !core.piercing.decrement());

        if terminal {
            if self.config.debug_logging {
                debug!("Detector {:?}: terminal hit on {:?}", id, report.target);
            }
            self.retire(id, report, services);
            return;
        }
        if self.config.debug_logging {
            debug!(
                "Detector {:?}: pierced {:?} ({:?} left)",
                id,
                report.target,
                core.piercing.remaining()
            );
        }
        core.history.record(report.target);
    }

    fn retire(&mut self, id: DetectorId, report: &HitReport, services: &mut Services<'_>) {
        let Some(detector) = self.detectors.get_mut(id) else {
            return;
        };
        let core = &mut detector.core;
        core.piercing.exhaust();
        core.retired = true;

        let terminal = TerminalReport {
            detector: id,
            target: report.target,
            point: report.point,
            total_pierces: core.piercing.total_pierces(),
        };
        core.fire_terminal(&terminal);
        self.handle.unregister(id);

        let host = core.host;
        let teardown = if core.manual_destroy {
            Teardown::Deferred
        } else {
            teardown_host(core.teardown, host, &mut *services.pool)
        };

        if let Teardown::Destroyed { .. } = teardown {
            core.host = None;
            core.begin_destroyed = true;
            if let Err(err) = self.handle.destroy(id) {
                warn!("Could not stage destruction of {:?}: {}", id, err);
            }
        }

        debug!("Detector {:?} retired ({:?})", id, teardown);
        self.retired.push(Retirement {
            detector: id,
            host,
            teardown,
        });
    }

    pub(super) fn process_area_bursts(&mut self, services: &mut Services<'_>) {
        while let Some(burst) = self.area_bursts.pop_front() {
            let Some(detector) = self.detectors.get_mut(burst.area) else {
                warn!("Area burst for unknown detector {:?}", burst.area);
                continue;
            };
            if !detector.kind.is_on_demand() {
                warn!("Detector {:?} is not an area; burst ignored", burst.area);
                continue;
            }
            if !detector.core.enabled || detector.core.retired || detector.core.begin_destroyed {
                continue;
            }

            detector.core.motion.teleport(burst.at);
            detector.core.history.clear();
            let ctx = QueryContext {
                spatial: services.spatial,
                actors: &*services.actors,
                config: &self.config,
            };
            let mut detection = detector.detect(&ctx);

            if detector.core.owner.is_none() {
                if let (Some(instigator), Detection::Batch(hits)) = (burst.instigator, &mut detection) {
                    for hit in hits.iter_mut() {
                        hit.override_dealer.get_or_insert(instigator);
                    }
                }
            }

            self.dispatch(burst.area, detection, services, true);
        }
    }
}

/// Pool-return, then deactivate, then delayed destroy
fn teardown_host(policy: TeardownPolicy, host: Option<ObjectHandle>, pool: &mut dyn PoolService) -> Teardown {
    let delay = match policy {
        TeardownPolicy::DestroyAfter(delay) => delay.max(0.0),
        _ => 0.0,
    };
    let Some(host) = host else {
        return Teardown::Destroyed { delay };
    };

    if policy == TeardownPolicy::ReturnToPool {
        if pool.release(host) {
            return Teardown::Pooled;
        }
        debug!("Host {:?} is not pooled; falling back to deactivation", host);
    }
    if matches!(policy, TeardownPolicy::ReturnToPool | TeardownPolicy::Deactivate) {
        if pool.deactivate(host) {
            return Teardown::Deactivated;
        }
        debug!("Host {:?} cannot be deactivated; destroying", host);
    }

    pool.destroy_after(host, delay);
    Teardown::Destroyed { delay }
}
