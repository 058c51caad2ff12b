//! Transform system: integrates motion properties over the frame delta.
//!
//! Reads `velocity` and writes `position` (`position += velocity * dt`).
//! When present, `acceleration` feeds into `velocity` first, and `spin`
//! feeds into `rotation` the same way. Entities lacking the position or
//! velocity properties are skipped — templates decide which entities move,
//! not the system.

use crate::entity::EntityId;
use crate::math::Vec2;
use crate::property::keys;
use crate::system::{Ctx, Roster, System};

pub struct TransformSystem {
    roster: Roster,
}

impl TransformSystem {
    /// The id prototypes use to opt into this system.
    pub const ID: &'static str = "Transform";

    pub fn new() -> Self {
        Self {
            roster: Roster::default(),
        }
    }
}

impl Default for TransformSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for TransformSystem {
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

    fn update(&mut self, ctx: &mut Ctx<'_>, dt: f32) {
        for id in self.roster.snapshot() {
            let Some(instance) = ctx.entities.get_mut(id) else {
                continue;
            };
            let props = instance.props_mut();

            if let Ok(accel) = props.get::<Vec2>(keys::ACCELERATION).copied() {
                if let Ok(velocity) = props.get_mut::<Vec2>(keys::VELOCITY) {
                    *velocity += accel * dt;
                }
            }

            let velocity = match props.get::<Vec2>(keys::VELOCITY) {
                Ok(v) => *v,
                Err(_) => {
                    log::debug!("transform: {id} has no velocity, skipping");
                    continue;
                }
            };
            match props.get_mut::<Vec2>(keys::POSITION) {
                Ok(position) => *position += velocity * dt,
                Err(_) => {
                    log::debug!("transform: {id} has no position, skipping");
                    continue;
                }
            }

            let spin = props.get_or(keys::SPIN, 0.0f32);
            if spin != 0.0 {
                if let Ok(rotation) = props.get_mut::<f32>(keys::ROTATION) {
                    *rotation += spin * dt;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityStore, Instance};
    use crate::property::PropertyBag;
    use crate::prototype::PrototypeRegistry;

    fn spawn_with(store: &mut EntityStore, props: PropertyBag) -> EntityId {
        let id = store.allocate();
        store.insert(Instance::new(id, "Test".into(), props));
        id
    }

    #[test]
    fn integrates_position_from_velocity() {
        let mut store = EntityStore::new();
        let prototypes = PrototypeRegistry::new();
        let mut props = PropertyBag::new();
        props.set(keys::POSITION, Vec2::ZERO);
        props.set(keys::VELOCITY, Vec2::new(2.0, 0.0));
        let id = spawn_with(&mut store, props);

        let mut system = TransformSystem::new();
        system.register(id);
        let mut ctx = Ctx {
            entities: &mut store,
            prototypes: &prototypes,
        };
        system.update(&mut ctx, 1.0);
        system.update(&mut ctx, 0.5);

        let position = *store.get(id).unwrap().props().get::<Vec2>(keys::POSITION).unwrap();
        assert_eq!(position, Vec2::new(3.0, 0.0));
    }

    #[test]
    fn acceleration_feeds_velocity_before_integration() {
        let mut store = EntityStore::new();
        let prototypes = PrototypeRegistry::new();
        let mut props = PropertyBag::new();
        props.set(keys::POSITION, Vec2::ZERO);
        props.set(keys::VELOCITY, Vec2::ZERO);
        props.set(keys::ACCELERATION, Vec2::new(0.0, 10.0));
        let id = spawn_with(&mut store, props);

        let mut system = TransformSystem::new();
        system.register(id);
        let mut ctx = Ctx {
            entities: &mut store,
            prototypes: &prototypes,
        };
        system.update(&mut ctx, 1.0);

        let instance = store.get(id).unwrap();
        assert_eq!(
            *instance.props().get::<Vec2>(keys::VELOCITY).unwrap(),
            Vec2::new(0.0, 10.0)
        );
        assert_eq!(
            *instance.props().get::<Vec2>(keys::POSITION).unwrap(),
            Vec2::new(0.0, 10.0)
        );
    }

    #[test]
    fn entities_without_motion_properties_are_skipped() {
        let mut store = EntityStore::new();
        let prototypes = PrototypeRegistry::new();
        let id = spawn_with(&mut store, PropertyBag::new());

        let mut system = TransformSystem::new();
        system.register(id);
        let mut ctx = Ctx {
            entities: &mut store,
            prototypes: &prototypes,
        };
        // Must not error or add properties behind the entity's back.
        system.update(&mut ctx, 1.0);
        assert!(store.get(id).unwrap().props().is_empty());
    }

    #[test]
    fn despawned_ids_resolve_to_nothing() {
        let mut store = EntityStore::new();
        let prototypes = PrototypeRegistry::new();
        let id = spawn_with(&mut store, PropertyBag::new());
        store.remove(id);

        let mut system = TransformSystem::new();
        system.register(id);
        let mut ctx = Ctx {
            entities: &mut store,
            prototypes: &prototypes,
        };
        system.update(&mut ctx, 1.0); // silently skips the dead id
    }
}
