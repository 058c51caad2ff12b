//! # Prototype Registry — Named Entity Templates
//!
//! A [`Prototype`] is a template: default properties, the systems an
//! instance participates in, and an optional list of frame regions for
//! animation. The [`PrototypeRegistry`] owns all prototypes by name;
//! spawning (done by the `World`) deep-copies a prototype's defaults into a
//! fresh instance, so instances never depend on the prototype object after
//! creation.
//!
//! ## Prototype sheets
//!
//! Registries can be populated from JSON sheets, so entity templates live in
//! data files rather than code:
//!
//! ```json
//! [
//!   {
//!     "name": "Goblin",
//!     "properties": { "health": 10, "position": [0.0, 0.0] },
//!     "systems": ["Transform", "Render"],
//!     "frames": [{ "x": 0.0, "y": 0.0, "w": 16.0, "h": 16.0 }]
//!   }
//! ]
//! ```
//!
//! Sheet values map onto property types by shape: booleans → `bool`,
//! integers → `i64`, floats → `f32`, two-element arrays → `Vec2`,
//! strings → `String`.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::math::{Region, Vec2};
use crate::property::PropertyBag;
use crate::system::SystemId;

/// Prototypes are identified by name.
pub type PrototypeId = String;

/// A named entity template.
pub struct Prototype {
    name: PrototypeId,
    defaults: PropertyBag,
    systems: Vec<SystemId>,
    frames: Vec<Region>,
}

impl Prototype {
    pub fn new(name: impl Into<PrototypeId>) -> Self {
        Self {
            name: name.into(),
            defaults: PropertyBag::new(),
            systems: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Seed a default property (builder style).
    pub fn with_value<T: Clone + Send + Sync + 'static>(
        mut self,
        key: impl Into<String>,
        value: T,
    ) -> Self {
        self.defaults.set(key, value);
        self
    }

    /// Add a system every instance of this prototype registers with.
    pub fn with_system(mut self, system: impl Into<SystemId>) -> Self {
        self.systems.push(system.into());
        self
    }

    /// Attach the frame-region list used by the animation and render systems.
    pub fn with_frames(mut self, frames: Vec<Region>) -> Self {
        self.frames = frames;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn defaults(&self) -> &PropertyBag {
        &self.defaults
    }

    pub fn defaults_mut(&mut self) -> &mut PropertyBag {
        &mut self.defaults
    }

    pub fn systems(&self) -> &[SystemId] {
        &self.systems
    }

    pub fn frames(&self) -> &[Region] {
        &self.frames
    }
}

/// Owns every registered [`Prototype`], keyed by name.
#[derive(Default)]
pub struct PrototypeRegistry {
    prototypes: HashMap<PrototypeId, Prototype>,
}

impl PrototypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prototype under its own name.
    ///
    /// Fails with [`Error::DuplicateId`] if the name is taken; the existing
    /// entry is left untouched.
    pub fn register(&mut self, prototype: Prototype) -> Result<()> {
        if self.prototypes.contains_key(prototype.name()) {
            return Err(Error::duplicate("prototype", prototype.name()));
        }
        log::debug!("registered prototype \"{}\"", prototype.name());
        self.prototypes
            .insert(prototype.name().to_string(), prototype);
        Ok(())
    }

    /// Look up a prototype by name, failing with [`Error::NotFound`].
    pub fn lookup(&self, name: &str) -> Result<&Prototype> {
        self.prototypes
            .get(name)
            .ok_or_else(|| Error::not_found("prototype", name))
    }

    /// Infallible lookup for callers that treat absence as "skip".
    pub fn get(&self, name: &str) -> Option<&Prototype> {
        self.prototypes.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Prototype> {
        self.prototypes.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.prototypes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    /// Names of all registered prototypes, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.prototypes.keys().map(String::as_str)
    }

    /// Register every prototype in a JSON sheet. Returns how many were added.
    ///
    /// The whole sheet is validated before anything is registered: a parse
    /// error or duplicate name (within the sheet or against the registry)
    /// leaves the registry exactly as it was.
    pub fn load_sheet(&mut self, json: &str) -> Result<usize> {
        let defs: Vec<PrototypeDef> = serde_json::from_str(json)?;

        for (i, def) in defs.iter().enumerate() {
            if self.contains(&def.name) || defs[..i].iter().any(|d| d.name == def.name) {
                return Err(Error::duplicate("prototype", def.name.clone()));
            }
        }

        let count = defs.len();
        for def in defs {
            let name = def.name.clone();
            self.prototypes.insert(name.clone(), def.into_prototype());
            log::debug!("registered prototype \"{name}\" from sheet");
        }
        Ok(count)
    }
}

// ── Sheet definitions ────────────────────────────────────────────────────

/// A property value as written in a sheet. Mapped by JSON shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    Vec2([f32; 2]),
    Str(String),
}

#[derive(Debug, Deserialize)]
struct PrototypeDef {
    name: String,
    #[serde(default)]
    properties: HashMap<String, PropertyValue>,
    #[serde(default)]
    systems: Vec<String>,
    #[serde(default)]
    frames: Vec<Region>,
}

impl PrototypeDef {
    fn into_prototype(self) -> Prototype {
        let mut prototype = Prototype::new(self.name);
        for (key, value) in self.properties {
            match value {
                PropertyValue::Bool(v) => prototype.defaults.set(key, v),
                PropertyValue::Int(v) => prototype.defaults.set(key, v),
                PropertyValue::Float(v) => prototype.defaults.set(key, v),
                PropertyValue::Vec2([x, y]) => prototype.defaults.set(key, Vec2::new(x, y)),
                PropertyValue::Str(v) => prototype.defaults.set(key, v),
            }
        }
        prototype.systems = self.systems;
        prototype.frames = self.frames;
        prototype
    }
}
