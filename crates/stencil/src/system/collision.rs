//! Collision system: AABB pairs and minimum-translation vectors.
//!
//! [`CollisionSystem`] is the polymorphic contract — anything that can
//! produce [`CollisionData`] records each frame. The shipped
//! [`AabbCollisionSystem`] checks every registered pair (all-pairs broad
//! phase; fine for the entity counts this framework targets) and computes
//! the minimum-translation vector along the axis of least penetration.
//!
//! ## Role convention
//!
//! Detection is unordered, but each record fixes roles: the pair member
//! registered *earlier* with the system is `moving`, the later one is
//! `other`, and the MTV points from `other` toward `moving` — adding it to
//! `moving`'s position separates the pair. Resolution code relies on that
//! sign, so the convention is part of the contract.

use crate::entity::{EntityId, EntityStore};
use crate::event::Action;
use crate::math::Vec2;
use crate::property::keys;
use crate::system::{Ctx, Roster, System};

/// One pairwise collision result. Ephemeral — produced by detection and
/// consumed by dispatch within the same frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionData {
    /// The earlier-registered member of the pair; the MTV applies to it.
    pub moving: EntityId,
    pub other: EntityId,
    /// Smallest displacement separating the pair, along the axis of least
    /// penetration.
    pub mtv: Vec2,
}

/// The polymorphic collision contract: a [`System`] that additionally
/// produces collision records once per frame.
pub trait CollisionSystem: System {
    /// Find every colliding pair among the registered entities.
    fn detect(&mut self, entities: &EntityStore) -> Vec<CollisionData>;

    /// The action code detection results are dispatched under.
    fn action(&self) -> Action;
}

/// Axis-aligned bounding-box collision over `position` + `size` properties.
pub struct AabbCollisionSystem {
    roster: Roster,
    action: Action,
}

impl AabbCollisionSystem {
    pub const ID: &'static str = "Collision";

    /// `action` is the code collision events carry into dispatch.
    pub fn new(action: Action) -> Self {
        Self {
            roster: Roster::default(),
            action,
        }
    }
}

impl System for AabbCollisionSystem {
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
        // Detection runs in its own frame slot, after the regular updates.
    }
}

impl CollisionSystem for AabbCollisionSystem {
    fn detect(&mut self, entities: &EntityStore) -> Vec<CollisionData> {
        // Gather boxes in roster order; entities without the collision
        // properties simply don't collide.
        let mut boxes: Vec<(EntityId, Vec2, Vec2)> = Vec::with_capacity(self.roster.len());
        for &id in self.roster.as_slice() {
            let Some(instance) = entities.get(id) else {
                continue;
            };
            let props = instance.props();
            let (Ok(&center), Ok(&size)) = (
                props.get::<Vec2>(keys::POSITION),
                props.get::<Vec2>(keys::SIZE),
            ) else {
                continue;
            };
            boxes.push((id, center, size * 0.5));
        }

        let mut hits = Vec::new();
        for i in 0..boxes.len() {
            for j in (i + 1)..boxes.len() {
                let (moving, a_center, a_half) = boxes[i];
                let (other, b_center, b_half) = boxes[j];
                let delta = a_center - b_center;
                let overlap_x = a_half.x + b_half.x - delta.x.abs();
                let overlap_y = a_half.y + b_half.y - delta.y.abs();
                if overlap_x <= 0.0 || overlap_y <= 0.0 {
                    continue;
                }
                // Separate along the shallower axis, pushing `moving` away
                // from `other`. A dead-centered overlap gets a positive
                // nudge, arbitrarily but deterministically.
                let mtv = if overlap_x < overlap_y {
                    let sign = if delta.x != 0.0 { delta.x.signum() } else { 1.0 };
                    Vec2::new(overlap_x * sign, 0.0)
                } else {
                    let sign = if delta.y != 0.0 { delta.y.signum() } else { 1.0 };
                    Vec2::new(0.0, overlap_y * sign)
                };
                log::debug!("collision: {moving} vs {other}, mtv {mtv:?}");
                hits.push(CollisionData { moving, other, mtv });
            }
        }
        hits
    }

    fn action(&self) -> Action {
        self.action
    }
}
