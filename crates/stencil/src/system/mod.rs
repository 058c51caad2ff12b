//! # Systems — Per-Frame Processors Over Registered Entities
//!
//! A system is a processor that runs once per frame over the entities
//! registered with it. Registration lists hold [`EntityId`]s, never
//! references: each update resolves ids through the [`EntityStore`] and
//! silently skips ids that stopped resolving, so a despawn can never leave
//! a system pointing at freed memory.
//!
//! ## Module Overview
//!
//! - [`transform`] — integrates position/velocity properties
//! - [`animation`] — advances frame indices through prototype regions
//! - [`action`] — routes input-driven action occurrences to entities
//! - [`render`] — turns properties into draw commands for a backend
//! - [`collision`] — AABB detection with minimum-translation vectors
//!
//! The [`Pipeline`] holds the systems in a fixed, externally configured
//! order and runs them once per frame. Within an update a system iterates a
//! snapshot of its roster — mutating the live list mid-iteration is the
//! classic source of silent corruption, and the snapshot removes the
//! opportunity.

pub mod action;
pub mod animation;
pub mod collision;
pub mod render;
pub mod transform;

pub use action::{ActionSystem, Route};
pub use animation::AnimationSystem;
pub use collision::{AabbCollisionSystem, CollisionData, CollisionSystem};
pub use render::{DrawCommand, RecordingTarget, RenderSystem, RenderTarget};
pub use transform::TransformSystem;

use crate::entity::{EntityId, EntityStore};
use crate::error::{Error, Result};
use crate::event::ActionEvent;
use crate::prototype::PrototypeRegistry;

/// Systems are identified by name, matching the strings in a prototype's
/// system list.
pub type SystemId = String;

/// The per-frame view a system operates on: the live entities plus
/// read-only access to the prototypes they were spawned from.
pub struct Ctx<'a> {
    pub entities: &'a mut EntityStore,
    pub prototypes: &'a PrototypeRegistry,
}

/// A per-frame processor with its own entity registration list.
pub trait System {
    /// Stable identifier, matched against prototype system lists.
    fn id(&self) -> &str;

    /// Add an entity to this system's registration list. Idempotent.
    fn register(&mut self, entity: EntityId);

    /// Remove an entity from the registration list. Unknown ids are a no-op.
    fn deregister(&mut self, entity: EntityId);

    /// The registration list, in insertion order.
    fn registered(&self) -> &[EntityId];

    /// Run one frame of this system's logic over its registered entities.
    fn update(&mut self, ctx: &mut Ctx<'_>, dt: f32);

    /// Dispatch hook for action occurrences routed to this system. The
    /// default ignores everything.
    fn handle_event(&mut self, ctx: &mut Ctx<'_>, event: &ActionEvent) {
        let _ = (ctx, event);
    }
}

/// Insertion-ordered registration list shared by the concrete systems.
#[derive(Default)]
pub struct Roster {
    entities: Vec<EntityId>,
}

impl Roster {
    pub fn register(&mut self, entity: EntityId) {
        if !self.entities.contains(&entity) {
            self.entities.push(entity);
        }
    }

    pub fn deregister(&mut self, entity: EntityId) {
        self.entities.retain(|&e| e != entity);
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains(&entity)
    }

    pub fn as_slice(&self) -> &[EntityId] {
        &self.entities
    }

    /// Copy of the list for iteration that survives mid-frame mutation.
    pub fn snapshot(&self) -> Vec<EntityId> {
        self.entities.clone()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// The fixed-order system pipeline.
///
/// Systems run in the order they were added, once per frame. The collision
/// system sits in a dedicated slot because the frame loop invokes its
/// [`CollisionSystem::detect`] contract after the regular updates.
#[derive(Default)]
pub struct Pipeline {
    systems: Vec<Box<dyn System>>,
    collision: Option<Box<dyn CollisionSystem>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a system to the pipeline.
    ///
    /// Fails with [`Error::DuplicateId`] if a system with the same id is
    /// already present.
    pub fn add_system(&mut self, system: Box<dyn System>) -> Result<()> {
        if self.contains(system.id()) {
            return Err(Error::duplicate("system", system.id()));
        }
        log::debug!("pipeline: added system \"{}\"", system.id());
        self.systems.push(system);
        Ok(())
    }

    /// Install the collision system. Same duplicate rule as
    /// [`add_system`](Self::add_system); replaces any previous collision
    /// system.
    pub fn set_collision(&mut self, system: Box<dyn CollisionSystem>) -> Result<()> {
        if self.systems.iter().any(|s| s.id() == system.id()) {
            return Err(Error::duplicate("system", system.id()));
        }
        log::debug!("pipeline: collision system is \"{}\"", system.id());
        self.collision = Some(system);
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.systems.iter().any(|s| s.id() == id)
            || self.collision.as_ref().is_some_and(|c| c.id() == id)
    }

    /// Mutable access to a system by id, collision slot included.
    pub fn system_mut(&mut self, id: &str) -> Option<&mut dyn System> {
        if let Some(system) = self.systems.iter_mut().find(|s| s.id() == id) {
            return Some(system.as_mut());
        }
        match &mut self.collision {
            // Trait upcasting: &mut dyn CollisionSystem -> &mut dyn System.
            Some(c) if c.id() == id => Some(c.as_mut() as &mut dyn System),
            _ => None,
        }
    }

    /// Register an entity with the named system.
    ///
    /// Fails with [`Error::NotFound`] if no such system is in the pipeline.
    pub fn register_entity(&mut self, system: &str, entity: EntityId) -> Result<()> {
        match self.system_mut(system) {
            Some(s) => {
                s.register(entity);
                Ok(())
            }
            None => Err(Error::not_found("system", system)),
        }
    }

    /// Drop `entity` from every registration list. Mandatory on despawn.
    pub fn deregister_everywhere(&mut self, entity: EntityId) {
        for system in &mut self.systems {
            system.deregister(entity);
        }
        if let Some(c) = &mut self.collision {
            c.deregister(entity);
        }
    }

    /// Run every system once, in pipeline order.
    pub fn update_all(&mut self, ctx: &mut Ctx<'_>, dt: f32) {
        for system in &mut self.systems {
            system.update(ctx, dt);
        }
        if let Some(c) = &mut self.collision {
            c.update(ctx, dt);
        }
    }

    /// Run collision detection, returning this frame's collision events.
    /// Empty when no collision system is installed.
    pub fn detect(&mut self, entities: &EntityStore) -> Vec<ActionEvent> {
        match &mut self.collision {
            Some(c) => {
                let action = c.action();
                c.detect(entities)
                    .into_iter()
                    .map(|data| ActionEvent::collision(action, data))
                    .collect()
            }
            None => Vec::new(),
        }
    }

    /// System ids in pipeline order, collision last.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.systems.iter().map(|s| s.id()).collect();
        if let Some(c) = &self.collision {
            ids.push(c.id());
        }
        ids
    }

    pub fn len(&self) -> usize {
        self.systems.len() + usize::from(self.collision.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityId;

    struct CountingSystem {
        roster: Roster,
        updates: u32,
    }

    impl CountingSystem {
        fn new() -> Self {
            Self {
                roster: Roster::default(),
                updates: 0,
            }
        }
    }

    impl System for CountingSystem {
        fn id(&self) -> &str {
            "Counting"
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
            self.updates += 1;
        }
    }

    #[test]
    fn roster_keeps_insertion_order_and_dedupes() {
        let mut roster = Roster::default();
        roster.register(EntityId(3));
        roster.register(EntityId(1));
        roster.register(EntityId(3));
        assert_eq!(roster.as_slice(), [EntityId(3), EntityId(1)]);

        roster.deregister(EntityId(3));
        assert_eq!(roster.as_slice(), [EntityId(1)]);
        roster.deregister(EntityId(99)); // unknown: no-op
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn duplicate_system_id_rejected() {
        let mut pipeline = Pipeline::new();
        pipeline.add_system(Box::new(CountingSystem::new())).unwrap();
        assert!(matches!(
            pipeline.add_system(Box::new(CountingSystem::new())),
            Err(Error::DuplicateId { .. })
        ));
        assert_eq!(pipeline.len(), 1);
    }

    #[test]
    fn register_entity_with_unknown_system_fails() {
        let mut pipeline = Pipeline::new();
        assert!(matches!(
            pipeline.register_entity("Ghost", EntityId(0)),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn deregister_everywhere_clears_all_rosters() {
        let mut pipeline = Pipeline::new();
        pipeline.add_system(Box::new(CountingSystem::new())).unwrap();
        pipeline.register_entity("Counting", EntityId(0)).unwrap();
        pipeline.register_entity("Counting", EntityId(1)).unwrap();

        pipeline.deregister_everywhere(EntityId(0));
        assert_eq!(
            pipeline.system_mut("Counting").unwrap().registered(),
            [EntityId(1)]
        );
    }
}
