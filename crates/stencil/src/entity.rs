//! # Entity — Identity and Live Instances
//!
//! An [`EntityId`] is just a number; the data lives in the [`Instance`] it
//! names. Systems never hold references to instances — they hold ids and
//! resolve them through the [`EntityStore`] each frame, so a despawned
//! entity simply stops resolving instead of dangling.
//!
//! ## Design: session-unique ids
//!
//! Ids are minted by a monotonic counter and **never reused** within a
//! session. A generational index scheme would also detect stale handles, but
//! with ids this small there is no reason to recycle slots: a u32 allows
//! four billion spawns, and never-reused ids make stale-handle bugs
//! impossible by construction rather than by bookkeeping.

use std::collections::HashMap;
use std::fmt;

use crate::event::ActionEvent;
use crate::property::PropertyBag;
use crate::prototype::PrototypeId;

/// A lightweight handle to a live entity.
///
/// Unique among all entities spawned in this session, alive or not.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) u32);

impl EntityId {
    /// The raw id, for diagnostics and logs.
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mints session-unique entity ids. No free list — ids are never recycled.
#[derive(Default)]
pub(crate) struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

/// A live entity spawned from a prototype.
///
/// Owns its [`PropertyBag`] (deep-copied from the prototype's defaults at
/// spawn) and remembers the prototype it came from by name. Events targeted
/// at this entity specifically land in its inbox via [`Instance::handle_event`]
/// and are read out with [`Instance::take_events`].
pub struct Instance {
    id: EntityId,
    prototype: PrototypeId,
    props: PropertyBag,
    inbox: Vec<ActionEvent>,
}

impl Instance {
    pub(crate) fn new(id: EntityId, prototype: PrototypeId, props: PropertyBag) -> Self {
        Self {
            id,
            prototype,
            props,
            inbox: Vec::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Name of the prototype this instance was spawned from.
    pub fn prototype(&self) -> &str {
        &self.prototype
    }

    pub fn props(&self) -> &PropertyBag {
        &self.props
    }

    pub fn props_mut(&mut self) -> &mut PropertyBag {
        &mut self.props
    }

    /// Dispatch hook: queue an event addressed to this entity. Game code
    /// consumes the queue with [`take_events`](Self::take_events).
    pub fn handle_event(&mut self, event: &ActionEvent) {
        self.inbox.push(event.clone());
    }

    /// Drain and return every event delivered since the last call.
    pub fn take_events(&mut self) -> Vec<ActionEvent> {
        std::mem::take(&mut self.inbox)
    }

    /// Peek at queued events without draining them.
    pub fn pending_events(&self) -> &[ActionEvent] {
        &self.inbox
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("prototype", &self.prototype)
            .field("props", &self.props)
            .field("pending_events", &self.inbox.len())
            .finish()
    }
}

/// Owns every live [`Instance`], keyed by id.
///
/// Spawning and despawning go through the `World`, which is the only caller
/// of the crate-private mutation methods here.
#[derive(Default)]
pub struct EntityStore {
    instances: HashMap<EntityId, Instance>,
    allocator: IdAllocator,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn allocate(&mut self) -> EntityId {
        self.allocator.allocate()
    }

    pub(crate) fn insert(&mut self, instance: Instance) {
        self.instances.insert(instance.id(), instance);
    }

    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Instance> {
        self.instances.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Instance> {
        self.instances.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.instances.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Ids of all live entities, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.instances.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Action, EventSource};
    use crate::input::{AxisFlags, InputData, InputDevice, InputKind};

    fn dummy_event(action: u32) -> ActionEvent {
        ActionEvent {
            action: Action(action),
            source: EventSource::Input(InputData {
                event: 0,
                kind: InputKind::Pressed,
                action: Action(action),
                axis: AxisFlags::NONE,
                device: InputDevice::Keyboard,
            }),
        }
    }

    #[test]
    fn ids_are_sequential_and_never_reused() {
        let mut store = EntityStore::new();
        let a = store.allocate();
        let b = store.allocate();
        assert_ne!(a, b);
        assert_eq!(a.raw(), 0);
        assert_eq!(b.raw(), 1);

        store.insert(Instance::new(a, "Goblin".into(), PropertyBag::new()));
        store.remove(a);

        // A later allocation must not hand the freed id back out.
        let c = store.allocate();
        assert_eq!(c.raw(), 2);
    }

    #[test]
    fn inbox_queues_and_drains() {
        let mut instance = Instance::new(EntityId(0), "Goblin".into(), PropertyBag::new());
        instance.handle_event(&dummy_event(1));
        instance.handle_event(&dummy_event(2));
        assert_eq!(instance.pending_events().len(), 2);

        let events = instance.take_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, Action(1));
        assert_eq!(events[1].action, Action(2));
        assert!(instance.pending_events().is_empty());
    }

    #[test]
    fn store_lookup_after_remove() {
        let mut store = EntityStore::new();
        let id = store.allocate();
        store.insert(Instance::new(id, "Goblin".into(), PropertyBag::new()));
        assert!(store.contains(id));

        store.remove(id);
        assert!(!store.contains(id));
        assert!(store.get(id).is_none());
    }
}
