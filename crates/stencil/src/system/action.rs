//! Action system: the single consumer and router for input occurrences.
//!
//! Binders turn device signals into action codes; this system decides who
//! hears about them. Its table maps `(device, action)` pairs to a
//! [`Route`], populated at setup time alongside the binder tables. A pair
//! with no entry is dropped silently — unbound input is normal, not an
//! error. Events whose source is not a binder (timers, collisions) pass
//! through untouched; subscribe entities to those directly on the bus.

use std::collections::HashMap;

use crate::entity::EntityId;
use crate::event::{Action, ActionEvent, EventSource};
use crate::input::InputDevice;
use crate::system::{Ctx, Roster, System};

/// Who receives a routed input occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Every entity registered with the action system.
    Broadcast,
    /// Only the listed entities.
    To(Vec<EntityId>),
}

pub struct ActionSystem {
    roster: Roster,
    routes: HashMap<(InputDevice, Action), Route>,
}

impl ActionSystem {
    pub const ID: &'static str = "Action";

    pub fn new() -> Self {
        Self {
            roster: Roster::default(),
            routes: HashMap::new(),
        }
    }

    /// Route occurrences of `action` from `device` per `route`. Replaces
    /// any previous route for the pair.
    pub fn bind(&mut self, device: InputDevice, action: Action, route: Route) {
        self.routes.insert((device, action), route);
    }

    /// Remove the route for a pair. Returns `true` if one existed.
    pub fn unbind(&mut self, device: InputDevice, action: Action) -> bool {
        self.routes.remove(&(device, action)).is_some()
    }

    pub fn route(&self, device: InputDevice, action: Action) -> Option<&Route> {
        self.routes.get(&(device, action))
    }
}

impl Default for ActionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ActionSystem {
    fn id(&self) -> &str {
        Self::ID
    }

    fn register(&mut self, entity: EntityId) {
        self.roster.register(entity);
    }

    fn deregister(&mut self, entity: EntityId) {
        self.roster.deregister(entity);
    }

    fn registered(&self) -> &[EntityId] {
        self.roster.as_slice()
    }

    fn update(&mut self, _ctx: &mut Ctx<'_>, _dt: f32) {
        // Routing happens in handle_event; there is no per-frame work.
    }

    fn handle_event(&mut self, ctx: &mut Ctx<'_>, event: &ActionEvent) {
        let EventSource::Input(data) = &event.source else {
            return;
        };
        let Some(route) = self.routes.get(&(data.device, event.action)) else {
            // Unmatched input is dropped, by contract.
            return;
        };
        match route {
            Route::Broadcast => {
                for id in self.roster.snapshot() {
                    if let Some(instance) = ctx.entities.get_mut(id) {
                        instance.handle_event(event);
                    }
                }
            }
            Route::To(ids) => {
                for &id in ids {
                    if let Some(instance) = ctx.entities.get_mut(id) {
                        instance.handle_event(event);
                    }
                }
            }
        }
    }
}
