//! # Stencil — Prototype-Based Entity Framework
//!
//! A game entity framework organized around *prototypes*: reusable
//! templates that stamp out live entity instances with independent
//! property copies. Systems process registered entities once per frame,
//! input binders normalize device state into action events, and a timer
//! service and event bus round out the runtime.
//!
//! Start with `use stencil::prelude::*` and build a [`World`](world::World).

pub mod entity;
pub mod error;
pub mod event;
pub mod input;
pub mod math;
pub mod prelude;
pub mod property;
pub mod prototype;
pub mod system;
pub mod timer;
pub mod world;
