//! Animation system: steps `frame` through a prototype's region list.
//!
//! Playback state lives in entity properties (`frame`, `frame_time`,
//! `frame_elapsed`, `looping`); the frame regions themselves live on the
//! prototype, shared by every instance spawned from it. Each update
//! accumulates the frame delta and advances the index one step per elapsed
//! `frame_time`, wrapping when `looping` is set and clamping on the last
//! frame otherwise.

use crate::entity::EntityId;
use crate::property::keys;
use crate::system::{Ctx, Roster, System};

pub struct AnimationSystem {
    roster: Roster,
}

impl AnimationSystem {
    pub const ID: &'static str = "Animation";

    pub fn new() -> Self {
        Self {
            roster: Roster::default(),
        }
    }
}

impl Default for AnimationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for AnimationSystem {
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
            let frame_count = match ctx.prototypes.get(instance.prototype()) {
                Some(proto) if !proto.frames().is_empty() => proto.frames().len() as u32,
                _ => continue,
            };

            let props = instance.props_mut();
            let frame_time = match props.get::<f32>(keys::FRAME_TIME) {
                Ok(&t) if t > 0.0 => t,
                _ => {
                    log::debug!("animation: {id} has no usable frame_time, skipping");
                    continue;
                }
            };

            // Seed playback state lazily so prototypes only declare what
            // they care about.
            if !props.has(keys::FRAME) {
                props.set(keys::FRAME, 0u32);
            }
            if !props.has(keys::FRAME_ELAPSED) {
                props.set(keys::FRAME_ELAPSED, 0.0f32);
            }

            let mut elapsed = props.get_or(keys::FRAME_ELAPSED, 0.0f32) + dt;
            let mut steps = 0u32;
            while elapsed >= frame_time {
                elapsed -= frame_time;
                steps += 1;
            }
            props.set(keys::FRAME_ELAPSED, elapsed);
            if steps == 0 {
                continue;
            }

            let looping = props.get_or(keys::LOOPING, false);
            let frame = props.get_or(keys::FRAME, 0u32);
            let advanced = frame.saturating_add(steps);
            let next = if looping {
                advanced % frame_count
            } else {
                advanced.min(frame_count - 1)
            };
            props.set(keys::FRAME, next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityStore, Instance};
    use crate::math::Region;
    use crate::property::PropertyBag;
    use crate::prototype::{Prototype, PrototypeRegistry};

    fn setup(frames: u32, looping: bool) -> (EntityStore, PrototypeRegistry, EntityId) {
        let mut prototypes = PrototypeRegistry::new();
        prototypes
            .register(
                Prototype::new("Sprite")
                    .with_frames(Region::new(0.0, 0.0, frames as f32 * 16.0, 16.0).grid(frames, 1)),
            )
            .unwrap();

        let mut props = PropertyBag::new();
        props.set(keys::FRAME_TIME, 0.1f32);
        props.set(keys::LOOPING, looping);

        let mut store = EntityStore::new();
        let id = store.allocate();
        store.insert(Instance::new(id, "Sprite".into(), props));
        (store, prototypes, id)
    }

    fn frame_of(store: &EntityStore, id: EntityId) -> u32 {
        store.get(id).unwrap().props().get_or(keys::FRAME, 0u32)
    }

    #[test]
    fn advances_one_step_per_frame_time() {
        let (mut store, prototypes, id) = setup(4, true);
        let mut system = AnimationSystem::new();
        system.register(id);
        let mut ctx = Ctx {
            entities: &mut store,
            prototypes: &prototypes,
        };

        system.update(&mut ctx, 0.05); // not enough yet
        assert_eq!(frame_of(&store, id), 0);

        let mut ctx = Ctx {
            entities: &mut store,
            prototypes: &prototypes,
        };
        system.update(&mut ctx, 0.05); // accumulates to one step
        assert_eq!(frame_of(&store, id), 1);
    }

    #[test]
    fn large_delta_steps_multiple_frames() {
        let (mut store, prototypes, id) = setup(4, true);
        let mut system = AnimationSystem::new();
        system.register(id);
        let mut ctx = Ctx {
            entities: &mut store,
            prototypes: &prototypes,
        };
        system.update(&mut ctx, 0.35); // 3 steps, 0.05 carried over
        assert_eq!(frame_of(&store, id), 3);
        let carried = store.get(id).unwrap().props().get_or(keys::FRAME_ELAPSED, 0.0f32);
        assert!((carried - 0.05).abs() < 1e-5);
    }

    #[test]
    fn looping_wraps_to_frame_zero() {
        let (mut store, prototypes, id) = setup(4, true);
        let mut system = AnimationSystem::new();
        system.register(id);
        let mut ctx = Ctx {
            entities: &mut store,
            prototypes: &prototypes,
        };
        system.update(&mut ctx, 0.4); // 4 steps over a 4-frame clip
        assert_eq!(frame_of(&store, id), 0);
    }

    #[test]
    fn non_looping_clamps_on_last_frame() {
        let (mut store, prototypes, id) = setup(4, false);
        let mut system = AnimationSystem::new();
        system.register(id);
        let mut ctx = Ctx {
            entities: &mut store,
            prototypes: &prototypes,
        };
        system.update(&mut ctx, 10.0);
        assert_eq!(frame_of(&store, id), 3);
    }

    #[test]
    fn prototype_without_frames_is_skipped() {
        let mut prototypes = PrototypeRegistry::new();
        prototypes.register(Prototype::new("Plain")).unwrap();

        let mut props = PropertyBag::new();
        props.set(keys::FRAME_TIME, 0.1f32);
        let mut store = EntityStore::new();
        let id = store.allocate();
        store.insert(Instance::new(id, "Plain".into(), props));

        let mut system = AnimationSystem::new();
        system.register(id);
        let mut ctx = Ctx {
            entities: &mut store,
            prototypes: &prototypes,
        };
        system.update(&mut ctx, 1.0);
        // No frame state was seeded.
        assert!(!store.get(id).unwrap().props().has(keys::FRAME));
    }
}
