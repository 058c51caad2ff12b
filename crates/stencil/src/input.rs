//! # Input Binders — Device State In, Normalized Actions Out
//!
//! A binder owns a mapping table from physical controls to [`Action`] codes
//! and translates raw device snapshots into [`InputData`] records. Controls
//! with no mapping produce nothing — silence, not an error.
//!
//! Each `poll` makes one finite pass over the current device snapshot and
//! advances the binder's notion of "previous state", so the edge-triggered
//! kinds fire exactly once per transition:
//!
//! - [`InputKind::Pressed`] — the frame a held control first appears
//! - [`InputKind::Realtime`] — every subsequent poll while it stays held
//! - [`InputKind::Released`] — the frame it disappears
//! - [`InputKind::Motion`] — cursor or stick moved since the last poll;
//!   the only kind that carries non-empty [`AxisFlags`]
//!
//! Windowing is out of scope here, so binders read plain snapshot structs
//! ([`KeyboardState`], [`MouseState`], [`JoystickState`]) that the embedding
//! application fills from whatever backend it uses.

use std::collections::HashSet;
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use crate::event::Action;
use crate::math::Vec2;

// ── Vocabulary types ─────────────────────────────────────────────────────

/// How an input occurrence relates to the control's state over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Control is held; produced every poll while it stays down.
    Realtime,
    /// Control went down this poll. Exactly once per transition.
    Pressed,
    /// Control went up this poll. Exactly once per transition.
    Released,
    /// Pointer or stick moved; axis flags describe the direction of change.
    Motion,
}

/// The device class an occurrence originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputDevice {
    Keyboard,
    Mouse,
    Joystick,
    Other,
}

/// Direction-of-change flags for [`InputKind::Motion`] events.
///
/// Empty for every other kind. Combine with `|`:
/// `AxisFlags::HORIZONTAL | AxisFlags::POSITIVE` reads as "moved right".
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AxisFlags(u8);

impl AxisFlags {
    pub const NONE: AxisFlags = AxisFlags(0);
    pub const HORIZONTAL: AxisFlags = AxisFlags(0x01);
    pub const VERTICAL: AxisFlags = AxisFlags(0x02);
    pub const POSITIVE: AxisFlags = AxisFlags(0x04);
    pub const NEGATIVE: AxisFlags = AxisFlags(0x08);

    pub fn contains(self, other: AxisFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Flags describing a 2D delta: which axes changed and in which
    /// direction(s). A zero delta yields `NONE`. When both axes move in
    /// opposite directions the sign flags union — consumers needing exact
    /// per-axis signs should read the device snapshot instead.
    pub fn from_delta(delta: Vec2) -> AxisFlags {
        let mut flags = AxisFlags::NONE;
        if delta.x != 0.0 {
            flags |= AxisFlags::HORIZONTAL;
            flags |= if delta.x > 0.0 {
                AxisFlags::POSITIVE
            } else {
                AxisFlags::NEGATIVE
            };
        }
        if delta.y != 0.0 {
            flags |= AxisFlags::VERTICAL;
            flags |= if delta.y > 0.0 {
                AxisFlags::POSITIVE
            } else {
                AxisFlags::NEGATIVE
            };
        }
        flags
    }
}

impl BitOr for AxisFlags {
    type Output = AxisFlags;
    fn bitor(self, rhs: AxisFlags) -> AxisFlags {
        AxisFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for AxisFlags {
    fn bitor_assign(&mut self, rhs: AxisFlags) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for AxisFlags {
    type Output = AxisFlags;
    fn bitand(self, rhs: AxisFlags) -> AxisFlags {
        AxisFlags(self.0 & rhs.0)
    }
}

impl fmt::Debug for AxisFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "AxisFlags(NONE)");
        }
        let mut names = Vec::new();
        for (flag, name) in [
            (AxisFlags::HORIZONTAL, "HORIZONTAL"),
            (AxisFlags::VERTICAL, "VERTICAL"),
            (AxisFlags::POSITIVE, "POSITIVE"),
            (AxisFlags::NEGATIVE, "NEGATIVE"),
        ] {
            if self.contains(flag) {
                names.push(name);
            }
        }
        write!(f, "AxisFlags({})", names.join("|"))
    }
}

/// One normalized input occurrence. Ephemeral — produced by a binder's poll
/// and consumed by dispatch in the same frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputData {
    /// Per-binder monotone occurrence counter, for ordering and logs.
    pub event: u32,
    pub kind: InputKind,
    pub action: Action,
    /// Non-empty exactly when `kind` is [`InputKind::Motion`].
    pub axis: AxisFlags,
    pub device: InputDevice,
}

// ── Physical controls ────────────────────────────────────────────────────

/// Keyboard keys the key binder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    Enter,
    Escape,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Shift,
    Ctrl,
    W,
    A,
    S,
    D,
    Q,
    E,
    /// A digit key, 0–9.
    Digit(u8),
    /// Backend-specific scancode for keys not covered above.
    Other(u32),
}

/// Mouse buttons the mouse binder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u8),
}

// ── Device snapshots ─────────────────────────────────────────────────────

/// Which keys are currently held.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<Key>,
}

impl KeyboardState {
    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }
}

/// Mouse buttons held plus the cursor position in window coordinates.
#[derive(Debug, Clone, Default)]
pub struct MouseState {
    held: HashSet<MouseButton>,
    pub position: Vec2,
}

impl MouseState {
    pub fn press(&mut self, button: MouseButton) {
        self.held.insert(button);
    }

    pub fn release(&mut self, button: MouseButton) {
        self.held.remove(&button);
    }

    pub fn is_held(&self, button: MouseButton) -> bool {
        self.held.contains(&button)
    }
}

/// Joystick buttons held (by index) plus the primary stick position, each
/// axis in `-1.0..=1.0`.
#[derive(Debug, Clone, Default)]
pub struct JoystickState {
    held: HashSet<u8>,
    pub stick: Vec2,
}

impl JoystickState {
    pub fn press(&mut self, button: u8) {
        self.held.insert(button);
    }

    pub fn release(&mut self, button: u8) {
        self.held.remove(&button);
    }

    pub fn is_held(&self, button: u8) -> bool {
        self.held.contains(&button)
    }
}

/// All device snapshots for one frame. The application fills this from its
/// windowing backend and hands it to `World::frame`.
#[derive(Debug, Clone, Default)]
pub struct DeviceSnapshot {
    pub keyboard: KeyboardState,
    pub mouse: MouseState,
    pub joystick: JoystickState,
}

// ── Binders ──────────────────────────────────────────────────────────────

/// One table entry: physical control → action code.
struct Binding<C> {
    control: C,
    action: Action,
}

/// Shared 3-state logic for button-like controls. Emits into `out` in
/// binding insertion order and updates `previous` to the currently-held set.
fn poll_buttons<C: Copy + Eq + std::hash::Hash>(
    bindings: &[Binding<C>],
    is_held: impl Fn(C) -> bool,
    previous: &mut HashSet<C>,
    device: InputDevice,
    next_event: &mut u32,
    out: &mut Vec<InputData>,
) {
    for binding in bindings {
        let held = is_held(binding.control);
        let was_held = previous.contains(&binding.control);
        let kind = match (held, was_held) {
            (true, false) => InputKind::Pressed,
            (true, true) => InputKind::Realtime,
            (false, true) => InputKind::Released,
            (false, false) => continue,
        };
        *next_event += 1;
        out.push(InputData {
            event: *next_event,
            kind,
            action: binding.action,
            axis: AxisFlags::NONE,
            device,
        });
    }
    previous.clear();
    for binding in bindings {
        if is_held(binding.control) {
            previous.insert(binding.control);
        }
    }
}

/// Translates keyboard snapshots into key-bound action occurrences.
#[derive(Default)]
pub struct KeyBinder {
    bindings: Vec<Binding<Key>>,
    previous: HashSet<Key>,
    next_event: u32,
}

impl KeyBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `key` to `action`. Rebinding a key replaces its entry in place,
    /// keeping the original table order.
    pub fn bind(&mut self, key: Key, action: Action) {
        if let Some(existing) = self.bindings.iter_mut().find(|b| b.control == key) {
            existing.action = action;
        } else {
            self.bindings.push(Binding {
                control: key,
                action,
            });
        }
    }

    /// Remove the mapping for `key`. Returns `true` if one existed.
    pub fn unbind(&mut self, key: Key) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.control != key);
        before != self.bindings.len()
    }

    /// One pass over the snapshot. Consumes the returned sequence promptly —
    /// the binder's previous-state has already advanced.
    pub fn poll(&mut self, state: &KeyboardState) -> impl Iterator<Item = InputData> + use<> {
        let mut out = Vec::new();
        poll_buttons(
            &self.bindings,
            |key| state.is_held(key),
            &mut self.previous,
            InputDevice::Keyboard,
            &mut self.next_event,
            &mut out,
        );
        out.into_iter()
    }
}

/// Translates mouse snapshots into button and motion occurrences.
#[derive(Default)]
pub struct MouseBinder {
    bindings: Vec<Binding<MouseButton>>,
    motion_action: Option<Action>,
    previous: HashSet<MouseButton>,
    last_position: Option<Vec2>,
    next_event: u32,
}

impl MouseBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, button: MouseButton, action: Action) {
        if let Some(existing) = self.bindings.iter_mut().find(|b| b.control == button) {
            existing.action = action;
        } else {
            self.bindings.push(Binding {
                control: button,
                action,
            });
        }
    }

    /// Emit a [`InputKind::Motion`] occurrence with this action whenever the
    /// cursor moved since the last poll.
    pub fn bind_motion(&mut self, action: Action) {
        self.motion_action = Some(action);
    }

    pub fn poll(&mut self, state: &MouseState) -> impl Iterator<Item = InputData> + use<> {
        let mut out = Vec::new();
        poll_buttons(
            &self.bindings,
            |button| state.is_held(button),
            &mut self.previous,
            InputDevice::Mouse,
            &mut self.next_event,
            &mut out,
        );

        if let Some(action) = self.motion_action {
            if let Some(last) = self.last_position {
                let flags = AxisFlags::from_delta(state.position - last);
                if !flags.is_empty() {
                    self.next_event += 1;
                    out.push(InputData {
                        event: self.next_event,
                        kind: InputKind::Motion,
                        action,
                        axis: flags,
                        device: InputDevice::Mouse,
                    });
                }
            }
        }
        self.last_position = Some(state.position);
        out.into_iter()
    }
}

/// Translates joystick snapshots into button and stick-motion occurrences.
pub struct JoystickBinder {
    bindings: Vec<Binding<u8>>,
    motion_action: Option<Action>,
    /// Per-axis change below this magnitude is treated as sensor noise.
    pub deadzone: f32,
    previous: HashSet<u8>,
    last_stick: Vec2,
    next_event: u32,
}

impl Default for JoystickBinder {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
            motion_action: None,
            deadzone: 0.1,
            previous: HashSet::new(),
            last_stick: Vec2::ZERO,
            next_event: 0,
        }
    }
}

impl JoystickBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, button: u8, action: Action) {
        if let Some(existing) = self.bindings.iter_mut().find(|b| b.control == button) {
            existing.action = action;
        } else {
            self.bindings.push(Binding {
                control: button,
                action,
            });
        }
    }

    /// Emit a [`InputKind::Motion`] occurrence with this action whenever the
    /// stick moved past the deadzone since the last poll.
    pub fn bind_motion(&mut self, action: Action) {
        self.motion_action = Some(action);
    }

    pub fn poll(&mut self, state: &JoystickState) -> impl Iterator<Item = InputData> + use<> {
        let mut out = Vec::new();
        poll_buttons(
            &self.bindings,
            |button| state.is_held(button),
            &mut self.previous,
            InputDevice::Joystick,
            &mut self.next_event,
            &mut out,
        );

        if let Some(action) = self.motion_action {
            let mut delta = state.stick - self.last_stick;
            if delta.x.abs() < self.deadzone {
                delta.x = 0.0;
            }
            if delta.y.abs() < self.deadzone {
                delta.y = 0.0;
            }
            let flags = AxisFlags::from_delta(delta);
            if !flags.is_empty() {
                self.next_event += 1;
                out.push(InputData {
                    event: self.next_event,
                    kind: InputKind::Motion,
                    action,
                    axis: flags,
                    device: InputDevice::Joystick,
                });
            }
        }
        self.last_stick = state.stick;
        out.into_iter()
    }
}
