//! # Actions and Event Dispatch
//!
//! Everything asynchronous in the framework — a key press, a timer expiry, a
//! collision — is normalized into one vocabulary: an [`Action`] code plus a
//! payload describing where it came from. Systems and entities consume
//! [`ActionEvent`]s uniformly without caring whether the trigger was a key
//! or a clock.
//!
//! ## Dispatch
//!
//! The [`EventBus`] maps actions to subscriber [`Target`]s — handles, not
//! callbacks. Subscribers are ids resolved at delivery time by the `World`,
//! which keeps the bus free of borrow entanglements and makes a despawned
//! subscriber a silent no-op instead of a dangling pointer. Delivery is
//! synchronous and runs over a snapshot of the subscription list, so
//! unsubscribing mid-publish never affects the delivery already in flight.

use std::collections::HashMap;
use std::fmt;

use crate::entity::EntityId;
use crate::input::InputData;
use crate::system::{CollisionData, SystemId};

/// A normalized semantic event code (e.g. "jump" = 1), decoupled from the
/// physical trigger that produced it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Action(pub u32);

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action({})", self.0)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where an [`ActionEvent`] came from.
#[derive(Debug, Clone, PartialEq)]
pub enum EventSource {
    /// A binder translated a device signal.
    Input(InputData),
    /// A scheduled timer expired.
    Timer { name: String },
    /// The collision system found an overlapping pair.
    Collision(CollisionData),
}

/// One occurrence of an action, with its origin attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEvent {
    pub action: Action,
    pub source: EventSource,
}

impl ActionEvent {
    pub fn input(data: InputData) -> Self {
        Self {
            action: data.action,
            source: EventSource::Input(data),
        }
    }

    pub fn timer(name: impl Into<String>, action: Action) -> Self {
        Self {
            action,
            source: EventSource::Timer { name: name.into() },
        }
    }

    pub fn collision(action: Action, data: CollisionData) -> Self {
        Self {
            action,
            source: EventSource::Collision(data),
        }
    }
}

/// A dispatch destination: either a system (delivered to its
/// `handle_event`) or a single entity (delivered to its inbox).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    System(SystemId),
    Entity(EntityId),
}

/// Maps actions to their subscribers, in subscription order.
///
/// The bus only stores routing tables; actual delivery happens in
/// `World::publish`, which resolves each [`Target`] against the live
/// pipeline and entity store.
#[derive(Default)]
pub struct EventBus {
    subscribers: HashMap<Action, Vec<Target>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `target` to `action`. Subscribing the same pair twice is a
    /// no-op — a target is delivered at most once per publish.
    pub fn subscribe(&mut self, action: Action, target: Target) {
        let list = self.subscribers.entry(action).or_default();
        if !list.contains(&target) {
            list.push(target);
        }
    }

    /// Remove `target` from `action`'s subscribers. Returns `true` if it was
    /// subscribed.
    pub fn unsubscribe(&mut self, action: Action, target: &Target) -> bool {
        match self.subscribers.get_mut(&action) {
            Some(list) => {
                let before = list.len();
                list.retain(|t| t != target);
                before != list.len()
            }
            None => false,
        }
    }

    /// Snapshot of `action`'s subscribers in subscription order. Publishing
    /// iterates this copy, so table mutations during delivery don't affect
    /// the in-flight publish.
    pub fn targets(&self, action: Action) -> Vec<Target> {
        self.subscribers.get(&action).cloned().unwrap_or_default()
    }

    pub fn subscriber_count(&self, action: Action) -> usize {
        self.subscribers.get(&action).map_or(0, Vec::len)
    }

    /// Drop every subscription `target` holds, across all actions. Used when
    /// an entity despawns.
    pub fn remove_target(&mut self, target: &Target) {
        for list in self.subscribers.values_mut() {
            list.retain(|t| t != target);
        }
    }
}
