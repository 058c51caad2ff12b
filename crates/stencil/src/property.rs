//! # PropertyBag — Typed Per-Entity Key/Value Storage
//!
//! Every entity owns a [`PropertyBag`]: a map from string keys to values of
//! arbitrary (`'static`) type. Systems share per-entity state through it
//! without knowing about each other — the transform system writes
//! `position`, the render system reads it, and neither links against the
//! other.
//!
//! ## Design: type-erased slots with a clone hook
//!
//! Values are stored as `Box<dyn Any + Send + Sync>`. A plain `Box<dyn Any>`
//! cannot be cloned, but spawning an entity from a prototype requires a deep
//! copy of the template's defaults. Each slot therefore carries a monomorphic
//! clone function captured at `set` time, the same function-pointer trick a
//! serde component registry uses — the generic context is the only place the
//! concrete type is known, so that's where the hook is minted.
//!
//! Access is fallible rather than panicking: a missing key is
//! [`Error::KeyNotFound`], a present key of the wrong type is
//! [`Error::TypeMismatch`]. Callers avoid both by pre-seeding defaults on the
//! prototype.

use std::any::Any;
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Well-known property keys used by the built-in systems.
///
/// Nothing enforces these — any string is a valid key — but the shipped
/// systems read and write exactly these names.
pub mod keys {
    /// `Vec2` — entity center, world coordinates.
    pub const POSITION: &str = "position";
    /// `Vec2` — units per second.
    pub const VELOCITY: &str = "velocity";
    /// `Vec2` — units per second squared, optional.
    pub const ACCELERATION: &str = "acceleration";
    /// `f32` — radians, optional.
    pub const ROTATION: &str = "rotation";
    /// `f32` — radians per second, optional.
    pub const SPIN: &str = "spin";
    /// `u32` — current animation frame index. Managed by the animation
    /// system; seeded to 0 when absent.
    pub const FRAME: &str = "frame";
    /// `f32` — seconds per animation frame.
    pub const FRAME_TIME: &str = "frame_time";
    /// `f32` — time accumulated toward the next frame step. Internal to the
    /// animation system.
    pub const FRAME_ELAPSED: &str = "frame_elapsed";
    /// `bool` — wrap to frame 0 after the last frame instead of clamping.
    pub const LOOPING: &str = "looping";
    /// `bool` — draw this entity. Absent means visible.
    pub const VISIBLE: &str = "visible";
    /// `Vec2` — full collision extents (width, height).
    pub const SIZE: &str = "size";
}

type ErasedValue = Box<dyn Any + Send + Sync>;
type CloneFn = fn(&(dyn Any + Send + Sync)) -> ErasedValue;

struct Slot {
    value: ErasedValue,
    clone_value: CloneFn,
    type_name: &'static str,
}

impl Clone for Slot {
    fn clone(&self) -> Self {
        Slot {
            value: (self.clone_value)(self.value.as_ref()),
            clone_value: self.clone_value,
            type_name: self.type_name,
        }
    }
}

fn clone_erased<T: Clone + Send + Sync + 'static>(value: &(dyn Any + Send + Sync)) -> ErasedValue {
    let concrete = value
        .downcast_ref::<T>()
        .expect("slot clone fn paired with a different type");
    Box::new(concrete.clone())
}

/// A typed key/value store with one unique entry per key.
///
/// Cloning a bag deep-copies every value, which is exactly what spawning
/// does with a prototype's defaults.
#[derive(Clone, Default)]
pub struct PropertyBag {
    slots: HashMap<String, Slot>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous entry (including
    /// one of a different type).
    pub fn set<T: Clone + Send + Sync + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.slots.insert(
            key.into(),
            Slot {
                value: Box::new(value),
                clone_value: clone_erased::<T>,
                type_name: std::any::type_name::<T>(),
            },
        );
    }

    /// Read the value under `key` as a `T`.
    pub fn get<T: 'static>(&self, key: &str) -> Result<&T> {
        let slot = self.slots.get(key).ok_or_else(|| Error::KeyNotFound {
            key: key.to_string(),
        })?;
        slot.value
            .downcast_ref::<T>()
            .ok_or_else(|| Error::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Mutable access to the value under `key` as a `T`.
    pub fn get_mut<T: 'static>(&mut self, key: &str) -> Result<&mut T> {
        let slot = self.slots.get_mut(key).ok_or_else(|| Error::KeyNotFound {
            key: key.to_string(),
        })?;
        slot.value
            .downcast_mut::<T>()
            .ok_or_else(|| Error::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Read a `Copy` value, falling back to `default` when the key is absent
    /// or holds another type. The systems use this for optional properties.
    pub fn get_or<T: Copy + 'static>(&self, key: &str, default: T) -> T {
        self.get::<T>(key).copied().unwrap_or(default)
    }

    pub fn has(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Remove the entry under `key`. Returns `true` if it existed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.slots.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate over all keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// The stored type's name for `key`, for diagnostics.
    pub fn type_name(&self, key: &str) -> Option<&'static str> {
        self.slots.get(key).map(|s| s.type_name)
    }
}

impl std::fmt::Debug for PropertyBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (key, slot) in &self.slots {
            map.entry(key, &slot.type_name);
        }
        map.finish()
    }
}
