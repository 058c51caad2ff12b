//! Convenience re-exports — `use stencil::prelude::*` for the common items.

pub use crate::entity::{EntityId, EntityStore, Instance};
pub use crate::error::{Error, Result};
pub use crate::event::{Action, ActionEvent, EventBus, EventSource, Target};
pub use crate::input::{
    AxisFlags, DeviceSnapshot, InputData, InputDevice, InputKind, JoystickBinder,
    JoystickState, Key, KeyBinder, KeyboardState, MouseBinder, MouseButton, MouseState,
};
pub use crate::math::{Region, Vec2};
pub use crate::property::{PropertyBag, keys};
pub use crate::prototype::{Prototype, PrototypeId, PrototypeRegistry};
pub use crate::system::{
    AabbCollisionSystem, ActionSystem, AnimationSystem, CollisionData, CollisionSystem,
    Ctx, DrawCommand, Pipeline, RecordingTarget, RenderSystem, RenderTarget, Route,
    System, SystemId, TransformSystem,
};
pub use crate::timer::TimerService;
pub use crate::world::World;
