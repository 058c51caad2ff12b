//! # World — The Top-Level Facade
//!
//! [`World`] owns every service the framework provides and wires them into
//! one frame loop: prototypes, the live entity store, the system pipeline,
//! the event bus, the timer service, and one binder per input device.
//! Applications construct a `World`, describe their content (prototypes,
//! systems, bindings, timers, subscriptions), then call [`World::frame`]
//! once per tick.
//!
//! ## Frame order
//!
//! Each frame runs the same fixed sequence:
//!
//! 1. poll the three binders against the device snapshot and publish every
//!    resulting input event
//! 2. update every pipeline system, in registration order
//! 3. run collision detection and publish the resulting events
//! 4. advance timers by `dt` and publish firings
//!
//! Input therefore influences the same frame's updates, while collision and
//! timer events land in subscriber inboxes where the *next* frame's logic
//! (or the application, between frames) picks them up.

use crate::entity::{EntityId, EntityStore, Instance};
use crate::error::{Error, Result};
use crate::event::{Action, ActionEvent, EventBus, Target};
use crate::input::{DeviceSnapshot, JoystickBinder, KeyBinder, MouseBinder};
use crate::prototype::{Prototype, PrototypeRegistry};
use crate::system::{CollisionSystem, Ctx, Pipeline, System, SystemId};
use crate::timer::TimerService;

/// Owns all framework state and drives the frame loop.
#[derive(Default)]
pub struct World {
    entities: EntityStore,
    prototypes: PrototypeRegistry,
    pipeline: Pipeline,
    bus: EventBus,
    timers: TimerService,
    keyboard: KeyBinder,
    mouse: MouseBinder,
    joystick: JoystickBinder,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Component access ─────────────────────────────────────────────────

    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityStore {
        &mut self.entities
    }

    pub fn prototypes(&self) -> &PrototypeRegistry {
        &self.prototypes
    }

    pub fn prototypes_mut(&mut self) -> &mut PrototypeRegistry {
        &mut self.prototypes
    }

    pub fn timers(&self) -> &TimerService {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut TimerService {
        &mut self.timers
    }

    pub fn keyboard(&mut self) -> &mut KeyBinder {
        &mut self.keyboard
    }

    pub fn mouse(&mut self) -> &mut MouseBinder {
        &mut self.mouse
    }

    pub fn joystick(&mut self) -> &mut JoystickBinder {
        &mut self.joystick
    }

    /// Look up a pipeline system by id for configuration or inspection.
    pub fn system_mut(&mut self, id: &str) -> Option<&mut dyn System> {
        self.pipeline.system_mut(id)
    }

    // ── Setup ────────────────────────────────────────────────────────────

    /// Register a prototype. Fails on a duplicate name.
    pub fn register_prototype(&mut self, prototype: Prototype) -> Result<()> {
        self.prototypes.register(prototype)
    }

    /// Load a JSON prototype sheet. All-or-nothing: a malformed sheet or a
    /// name clash registers no prototypes at all.
    pub fn load_prototype_sheet(&mut self, json: &str) -> Result<usize> {
        self.prototypes.load_sheet(json)
    }

    /// Append a system to the pipeline. Update order is registration order.
    pub fn add_system(&mut self, system: Box<dyn System>) -> Result<()> {
        self.pipeline.add_system(system)
    }

    /// Install the collision system. It updates after every regular system
    /// and additionally runs detection each frame.
    pub fn set_collision_system(&mut self, system: Box<dyn CollisionSystem>) -> Result<()> {
        self.pipeline.set_collision(system)
    }

    // ── Entities ─────────────────────────────────────────────────────────

    /// Create a live entity from the named prototype: deep-copy its default
    /// properties, assign a fresh id, and register it with every system the
    /// prototype lists.
    ///
    /// Validation happens before any mutation, so a missing prototype or an
    /// unknown system name in its list leaves the world untouched.
    pub fn spawn(&mut self, prototype: &str) -> Result<EntityId> {
        let proto = self.prototypes.lookup(prototype)?;
        for system in proto.systems() {
            if !self.pipeline.contains(system) {
                return Err(Error::not_found("system", system.as_str()));
            }
        }

        let props = proto.defaults().clone();
        let systems: Vec<SystemId> = proto.systems().to_vec();
        let name = proto.name().to_string();

        let id = self.entities.allocate();
        self.entities.insert(Instance::new(id, name, props));
        for system in &systems {
            // Validated above; registration cannot fail here.
            self.pipeline.register_entity(system, id)?;
        }
        log::debug!("spawned {id} from prototype \"{prototype}\"");
        Ok(id)
    }

    /// Remove an entity: drop it from the store, from every system roster,
    /// and from every bus subscription. Returns `false` for an id that is
    /// not (or no longer) alive. The id itself is never reused.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        if self.entities.remove(id).is_none() {
            return false;
        }
        self.pipeline.deregister_everywhere(id);
        self.bus.remove_target(&Target::Entity(id));
        log::debug!("despawned {id}");
        true
    }

    // ── Events ───────────────────────────────────────────────────────────

    /// Subscribe a target to an action code. Duplicate pairs are a no-op.
    pub fn subscribe(&mut self, action: Action, target: Target) {
        self.bus.subscribe(action, target);
    }

    /// Remove a subscription. Returns `true` if it existed.
    pub fn unsubscribe(&mut self, action: Action, target: &Target) -> bool {
        self.bus.unsubscribe(action, target)
    }

    /// Deliver an event to every subscriber of its action, synchronously and
    /// in subscription order. Entity targets receive it in their inbox;
    /// system targets through `handle_event`. Targets that no longer exist
    /// are skipped. Zero subscribers is a silent no-op.
    ///
    /// Delivery iterates a snapshot of the subscription list, so handlers
    /// that (un)subscribe affect the next publish, not this one.
    pub fn publish(&mut self, event: &ActionEvent) {
        for target in self.bus.targets(event.action) {
            match target {
                Target::Entity(id) => {
                    if let Some(instance) = self.entities.get_mut(id) {
                        instance.handle_event(event);
                    }
                }
                Target::System(id) => {
                    if let Some(system) = self.pipeline.system_mut(&id) {
                        let mut ctx = Ctx {
                            entities: &mut self.entities,
                            prototypes: &self.prototypes,
                        };
                        system.handle_event(&mut ctx, event);
                    }
                }
            }
        }
    }

    // ── Frame loop ───────────────────────────────────────────────────────

    /// Advance the world by `dt` seconds, reading input from `devices`.
    pub fn frame(&mut self, dt: f32, devices: &DeviceSnapshot) {
        let inputs: Vec<ActionEvent> = self
            .keyboard
            .poll(&devices.keyboard)
            .chain(self.mouse.poll(&devices.mouse))
            .chain(self.joystick.poll(&devices.joystick))
            .map(ActionEvent::input)
            .collect();
        for event in &inputs {
            self.publish(event);
        }

        let mut ctx = Ctx {
            entities: &mut self.entities,
            prototypes: &self.prototypes,
        };
        self.pipeline.update_all(&mut ctx, dt);

        let collisions = self.pipeline.detect(&self.entities);
        for event in &collisions {
            self.publish(event);
        }

        let fired = self.timers.tick(dt);
        for event in &fired {
            self.publish(event);
        }
    }

    /// [`frame`](Self::frame) with no device input. Convenient for headless
    /// simulations and tests.
    pub fn step(&mut self, dt: f32) {
        self.frame(dt, &DeviceSnapshot::default());
    }
}
