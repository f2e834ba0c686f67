use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// Stable handle of a body owned by the simulation world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

/// Index of a switch in the level, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwitchId(pub usize);

/// Index of a goal in the level, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GoalId(pub usize);

/// The two mutually exclusive portal slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortalKind {
    Blue,
    Orange,
}

impl PortalKind {
    /// Both slots, in the order teleport checks visit them.
    pub const ALL: [PortalKind; 2] = [PortalKind::Blue, PortalKind::Orange];

    /// The complementary slot.
    pub fn other(self) -> PortalKind {
        match self {
            PortalKind::Blue => PortalKind::Orange,
            PortalKind::Orange => PortalKind::Blue,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            PortalKind::Blue => 0,
            PortalKind::Orange => 1,
        }
    }

    /// Numeric tag used on the wire (0 = blue, 1 = orange).
    pub fn wire_tag(self) -> f32 {
        self.index() as f32
    }

    /// Parse a wire tag back into a slot.
    pub fn from_wire(tag: u32) -> Option<PortalKind> {
        match tag {
            0 => Some(PortalKind::Blue),
            1 => Some(PortalKind::Orange),
            _ => None,
        }
    }
}

/// Something that happened during a simulation tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    /// A body went through `from` and came out of `to`.
    Teleported {
        body: BodyId,
        from: PortalKind,
        to: PortalKind,
        position: Vec2,
        velocity: Vec2,
    },
    /// A switch changed state.
    SwitchToggled { switch: SwitchId, active: bool },
    /// A player body reached an active goal. Ends the level.
    GoalReached { goal: GoalId, body: BodyId, elapsed: f32 },
}

/// Event kinds as written into `GameEvent::kind`.
pub mod event_kinds {
    pub const TELEPORTED: f32 = 1.0;
    pub const SWITCH_TOGGLED: f32 = 2.0;
    pub const GOAL_REACHED: f32 = 3.0;
}

impl SimEvent {
    /// Flatten into the fixed-size wire record read by the host.
    pub fn to_wire(&self) -> GameEvent {
        match *self {
            // The exit point is the destination portal's, readable from the snapshot.
            SimEvent::Teleported { body, to, velocity, .. } => GameEvent {
                kind: event_kinds::TELEPORTED,
                a: body.0 as f32,
                b: to.wire_tag(),
                c: velocity.length(),
            },
            SimEvent::SwitchToggled { switch, active } => GameEvent {
                kind: event_kinds::SWITCH_TOGGLED,
                a: switch.0 as f32,
                b: if active { 1.0 } else { 0.0 },
                c: 0.0,
            },
            SimEvent::GoalReached { goal, body, elapsed } => GameEvent {
                kind: event_kinds::GOAL_REACHED,
                a: goal.0 as f32,
                b: body.0 as f32,
                c: elapsed,
            },
        }
    }
}

/// A simulation event as seen by the host through a flat `f32` buffer.
/// `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;
}
