//! Render system: turns entity properties into draw commands.
//!
//! This module issues no drawing calls itself. It reads `position` (plus
//! the optional `rotation`, `visible`, and `frame` properties), resolves
//! the frame's [`Region`] through the entity's prototype, and submits a
//! [`DrawCommand`] per visible entity to whatever [`RenderTarget`] the
//! application installed. Wiring those commands to a GPU, a terminal, or a
//! test buffer is the backend's business.

use std::cell::RefCell;
use std::rc::Rc;

use crate::entity::EntityId;
use crate::math::{Region, Vec2};
use crate::property::keys;
use crate::system::{Ctx, Roster, System};

/// One entity's worth of drawing, in roster order.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub entity: EntityId,
    /// Entity center, world coordinates.
    pub position: Vec2,
    /// Radians; 0 when the entity has no `rotation` property.
    pub rotation: f32,
    /// Sprite-sheet region for the current frame, if the prototype has one.
    pub region: Option<Region>,
}

/// The narrow interface to the external rendering backend.
pub trait RenderTarget {
    fn submit(&mut self, command: DrawCommand);
}

/// A [`RenderTarget`] that records commands into a shared buffer.
///
/// Clone the handle before installing it so the application (or a test) can
/// read back what the system submitted. The shared cell is fine here: the
/// whole frame loop is single-threaded by design.
#[derive(Clone, Default)]
pub struct RecordingTarget {
    commands: Rc<RefCell<Vec<DrawCommand>>>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return everything submitted since the last call.
    pub fn take(&self) -> Vec<DrawCommand> {
        std::mem::take(&mut *self.commands.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.commands.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.borrow().is_empty()
    }
}

impl RenderTarget for RecordingTarget {
    fn submit(&mut self, command: DrawCommand) {
        self.commands.borrow_mut().push(command);
    }
}

pub struct RenderSystem<T: RenderTarget> {
    roster: Roster,
    target: T,
}

impl<T: RenderTarget> RenderSystem<T> {
    pub const ID: &'static str = "Render";

    pub fn new(target: T) -> Self {
        Self {
            roster: Roster::default(),
            target,
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }
}

impl<T: RenderTarget> System for RenderSystem<T> {
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

    fn update(&mut self, ctx: &mut Ctx<'_>, _dt: f32) {
        for id in self.roster.snapshot() {
            let Some(instance) = ctx.entities.get(id) else {
                continue;
            };
            let props = instance.props();
            if !props.get_or(keys::VISIBLE, true) {
                continue;
            }
            let position = match props.get::<Vec2>(keys::POSITION) {
                Ok(&p) => p,
                Err(_) => {
                    log::debug!("render: {id} has no position, skipping");
                    continue;
                }
            };
            let region = ctx.prototypes.get(instance.prototype()).and_then(|proto| {
                let frame = props.get_or(keys::FRAME, 0u32);
                proto.frames().get(frame as usize).copied()
            });
            self.target.submit(DrawCommand {
                entity: id,
                position,
                rotation: props.get_or(keys::ROTATION, 0.0f32),
                region,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityStore, Instance};
    use crate::property::PropertyBag;
    use crate::prototype::{Prototype, PrototypeRegistry};

    fn spawn_at(store: &mut EntityStore, prototype: &str, position: Vec2) -> EntityId {
        let mut props = PropertyBag::new();
        props.set(keys::POSITION, position);
        let id = store.allocate();
        store.insert(Instance::new(id, prototype.into(), props));
        id
    }

    #[test]
    fn submits_one_command_per_visible_entity_in_roster_order() {
        let mut store = EntityStore::new();
        let prototypes = PrototypeRegistry::new();
        let a = spawn_at(&mut store, "Thing", Vec2::new(1.0, 1.0));
        let b = spawn_at(&mut store, "Thing", Vec2::new(2.0, 2.0));

        let recorder = RecordingTarget::new();
        let mut system = RenderSystem::new(recorder.clone());
        system.register(b);
        system.register(a);

        let mut ctx = Ctx {
            entities: &mut store,
            prototypes: &prototypes,
        };
        system.update(&mut ctx, 0.016);

        let commands = recorder.take();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].entity, b);
        assert_eq!(commands[1].entity, a);
        assert_eq!(commands[1].position, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn invisible_entities_are_skipped() {
        let mut store = EntityStore::new();
        let prototypes = PrototypeRegistry::new();
        let id = spawn_at(&mut store, "Thing", Vec2::ZERO);
        store
            .get_mut(id)
            .unwrap()
            .props_mut()
            .set(keys::VISIBLE, false);

        let recorder = RecordingTarget::new();
        let mut system = RenderSystem::new(recorder.clone());
        system.register(id);

        let mut ctx = Ctx {
            entities: &mut store,
            prototypes: &prototypes,
        };
        system.update(&mut ctx, 0.016);
        assert!(recorder.is_empty());
    }

    #[test]
    fn frame_property_selects_the_region() {
        let mut store = EntityStore::new();
        let mut prototypes = PrototypeRegistry::new();
        prototypes
            .register(
                Prototype::new("Sprite")
                    .with_frames(Region::new(0.0, 0.0, 32.0, 16.0).grid(2, 1)),
            )
            .unwrap();

        let id = spawn_at(&mut store, "Sprite", Vec2::ZERO);
        store.get_mut(id).unwrap().props_mut().set(keys::FRAME, 1u32);

        let recorder = RecordingTarget::new();
        let mut system = RenderSystem::new(recorder.clone());
        system.register(id);

        let mut ctx = Ctx {
            entities: &mut store,
            prototypes: &prototypes,
        };
        system.update(&mut ctx, 0.016);

        let commands = recorder.take();
        assert_eq!(commands[0].region, Some(Region::new(16.0, 0.0, 16.0, 16.0)));
    }

    #[test]
    fn unknown_prototype_still_draws_without_region() {
        let mut store = EntityStore::new();
        let prototypes = PrototypeRegistry::new();
        let id = spawn_at(&mut store, "Nobody", Vec2::new(5.0, 5.0));

        let recorder = RecordingTarget::new();
        let mut system = RenderSystem::new(recorder.clone());
        system.register(id);

        let mut ctx = Ctx {
            entities: &mut store,
            prototypes: &prototypes,
        };
        system.update(&mut ctx, 0.016);

        let commands = recorder.take();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].region, None);
    }
}
