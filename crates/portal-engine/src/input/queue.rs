use crate::api::types::PortalKind;
use crate::core::body::BodyInput;

/// Key codes understood by `ControlState` (browser `keyCode` values).
pub mod keys {
    pub const LEFT: u32 = 37;
    pub const UP: u32 = 38;
    pub const RIGHT: u32 = 39;
    pub const SPACE: u32 = 32;
    pub const A: u32 = 65;
    pub const D: u32 = 68;
    pub const W: u32 = 87;
}

/// Input events the host sends to the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A key was pressed.
    KeyDown { key_code: u32 },
    /// A key was released.
    KeyUp { key_code: u32 },
    /// Fire a portal from the player towards world coordinates (x, y).
    FirePortal { kind: PortalKind, x: f32, y: f32 },
    /// Restart the current level.
    Restart,
}

/// A queue of input events.
/// The host pushes events between frames; the runner drains them each frame.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Held-key state folded into per-tick player input.
///
/// Jump is level-triggered like movement: it is requested on every tick
/// while a jump key is held, and the body only acts on it when grounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlState {
    left: bool,
    right: bool,
    jump: bool,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update from a key event. Returns whether the key is a control key.
    pub fn apply(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::KeyDown { key_code } => self.set_key(key_code, true),
            InputEvent::KeyUp { key_code } => self.set_key(key_code, false),
            _ => false,
        }
    }

    fn set_key(&mut self, key_code: u32, down: bool) -> bool {
        match key_code {
            keys::LEFT | keys::A => self.left = down,
            keys::RIGHT | keys::D => self.right = down,
            keys::UP | keys::W | keys::SPACE => self.jump = down,
            _ => return false,
        }
        true
    }

    /// Input for the next tick.
    pub fn input(&self) -> BodyInput {
        let horizontal = match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        BodyInput::new(horizontal, self.jump)
    }

    /// Release every key.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
