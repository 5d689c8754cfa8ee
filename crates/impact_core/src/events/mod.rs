//! Combat notification bus
//!
//! Key principles:
//! - Typed payloads (no positional arguments)
//! - Registration per event type (only interested handlers are notified)
//! - Handlers run in registration order
//! - `DamageDealt` handlers may veto the pending application; the first veto stops
//!   forwarding. Other event types are fire-and-forget and reach every handler.

use crate::damage::DamageApplication;
use crate::foundation::collections::{ActorId, DetectorId};
use crate::foundation::math::Vec3;
use std::collections::HashMap;

/// Event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Damage is about to be applied (vetoable)
    DamageDealt,
    /// A receiver blocked a hit
    BlockHappened,
    /// Damage was applied to a receiver
    DamageTaken,
}

/// Combat notification
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    /// Damage is about to be applied
    DamageDealt {
        /// Detector that produced the hit
        detector: DetectorId,
        /// Root owner receiving the damage
        receiver: ActorId,
        /// Final damage record
        damage: DamageApplication,
    },
    /// The receiver blocked the hit
    BlockHappened {
        /// Detector that produced the hit
        detector: DetectorId,
        /// Root owner of the dealer, if any
        dealer: Option<ActorId>,
        /// Root owner that blocked
        receiver: ActorId,
        /// Contact point, if the backend reported one
        point: Option<Vec3>,
    },
    /// Damage was applied
    DamageTaken {
        /// Detector that produced the hit
        detector: DetectorId,
        /// Root owner that took the damage
        receiver: ActorId,
        /// Applied damage record
        damage: DamageApplication,
    },
}

impl CombatEvent {
    /// Type of this event
    pub fn event_type(&self) -> EventType {
        match self {
            CombatEvent::DamageDealt { .. } => EventType::DamageDealt,
            CombatEvent::BlockHappened { .. } => EventType::BlockHappened,
            CombatEvent::DamageTaken { .. } => EventType::DamageTaken,
        }
    }

    /// Receiver of the event
    pub fn receiver(&self) -> ActorId {
        match self {
            CombatEvent::DamageDealt { receiver, .. }
            | CombatEvent::BlockHappened { receiver, .. }
            | CombatEvent::DamageTaken { receiver, .. } => *receiver,
        }
    }
}

/// Combat event handler
///
/// For `DamageDealt`, returning true vetoes the application and stops forwarding.
/// The return value is ignored for other event types.
pub trait CombatEventHandler {
    /// Handle an event
    fn on_event(&mut self, event: &CombatEvent) -> bool;
}

impl<F> CombatEventHandler for F
where
    F: FnMut(&CombatEvent) -> bool,
{
    fn on_event(&mut self, event: &CombatEvent) -> bool {
        self(event)
    }
}

/// Ordered, per-type subscriber lists
#[derive(Default)]
pub struct CombatEventBus {
    handlers: HashMap<EventType, Vec<Box<dyn CombatEventHandler>>>,
    published: u64,
}

impl CombatEventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a specific event type
    pub fn register_handler(&mut self, event_type: EventType, handler: Box<dyn CombatEventHandler>) {
        self.handlers.entry(event_type).or_default().push(handler);
    }

    /// Register a closure for a specific event type
    pub fn subscribe<F>(&mut self, event_type: EventType, handler: F)
    where
        F: FnMut(&CombatEvent) -> bool + 'static,
    {
        self.register_handler(event_type, Box::new(handler));
    }

    /// Deliver an event immediately; returns `true` when a `DamageDealt` handler vetoed it
    pub fn publish(&mut self, event: &CombatEvent) -> bool {
        self.published += 1;
        let event_type = event.event_type();
        let Some(handlers) = self.handlers.get_mut(&event_type) else {
            return false;
        };

        if event_type == EventType::DamageDealt {
            handlers.iter_mut().any(|handler| handler.on_event(event))
        } else {
            for handler in handlers.iter_mut() {
                handler.on_event(event);
            }
            false
        }
    }

    /// Number of handlers registered for an event type
    pub fn handler_count(&self, event_type: EventType) -> usize {
        self.handlers.get(&event_type).map_or(0, Vec::len)
    }

    /// Total events published since creation
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Remove every handler
    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

impl std::fmt::Debug for CombatEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatEventBus")
            .field("handlers", &self.handlers.values().map(Vec::len).sum::<usize>())
            .field("published", &self.published)
            .finish()
    }
}
