//! Snapshot buffer layout shared with the host renderer.
//!
//! Layout (all values f32):
//! ```text
//! [Header: 12 floats]
//! [Bodies: body_count × 9 floats]
//! [Portals: 2 slots × 7 floats, blue then orange]
//! [Switches: switch_count × 6 floats]
//! [Goals: goal_count × 5 floats]
//! [Events: max_events × 4 floats]
//! ```
//!
//! Counts are written into the header every frame; the host computes
//! section offsets from them.

use crate::api::types::{GameEvent, PortalKind, SimEvent};
use crate::core::geometry::GeometryQuery;
use crate::core::world::{SimPhase, SimulationWorld};

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 12;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_PHASE: usize = 2;
pub const HEADER_ELAPSED: usize = 3;
pub const HEADER_BODY_COUNT: usize = 4;
pub const HEADER_SWITCH_COUNT: usize = 5;
pub const HEADER_GOAL_COUNT: usize = 6;
pub const HEADER_WORLD_WIDTH: usize = 7;
pub const HEADER_WORLD_HEIGHT: usize = 8;
pub const HEADER_STARS: usize = 9;
pub const HEADER_MAX_EVENTS: usize = 10;
pub const HEADER_EVENT_COUNT: usize = 11;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per body: id, kind, x, y, half_w, half_h, vx, vy, on_ground.
pub const BODY_FLOATS: usize = 9;

/// Floats per portal slot: present, x, y, nx, ny, linked, ready.
pub const PORTAL_FLOATS: usize = 7;

/// Portal slots, always written.
pub const PORTAL_SLOTS: usize = 2;

/// Floats per switch: x, y, w, h, active, latching.
pub const SWITCH_FLOATS: usize = 6;

/// Floats per goal: x, y, w, h, open.
pub const GOAL_FLOATS: usize = 5;

/// Floats per event: kind, a, b, c.
pub const EVENT_FLOATS: usize = GameEvent::FLOATS;

/// Default event capacity per frame.
pub const DEFAULT_MAX_EVENTS: usize = 32;

/// Section sizes and offsets for one set of counts.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub body_count: usize,
    pub switch_count: usize,
    pub goal_count: usize,
    pub max_events: usize,

    pub body_data_offset: usize,
    pub portal_data_offset: usize,
    pub switch_data_offset: usize,
    pub goal_data_offset: usize,
    pub event_data_offset: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
}

impl ProtocolLayout {
    pub fn new(body_count: usize, switch_count: usize, goal_count: usize, max_events: usize) -> Self {
        let body_data_offset = HEADER_FLOATS;
        let portal_data_offset = body_data_offset + body_count * BODY_FLOATS;
        let switch_data_offset = portal_data_offset + PORTAL_SLOTS * PORTAL_FLOATS;
        let goal_data_offset = switch_data_offset + switch_count * SWITCH_FLOATS;
        let event_data_offset = goal_data_offset + goal_count * GOAL_FLOATS;
        let buffer_total_floats = event_data_offset + max_events * EVENT_FLOATS;

        Self {
            body_count,
            switch_count,
            goal_count,
            max_events,
            body_data_offset,
            portal_data_offset,
            switch_data_offset,
            goal_data_offset,
            event_data_offset,
            buffer_total_floats,
        }
    }

    /// Layout sized for the current contents of `world`.
    pub fn for_world<G: GeometryQuery>(world: &SimulationWorld<G>, max_events: usize) -> Self {
        Self::new(
            world.bodies().len(),
            world.switches().len(),
            world.goals().len(),
            max_events,
        )
    }
}

fn flag(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Flat f32 snapshot of a world, rewritten every frame.
pub struct SnapshotBuffer {
    layout: ProtocolLayout,
    data: Vec<f32>,
    frame: u32,
    max_events: usize,
}

impl SnapshotBuffer {
    pub fn new(max_events: usize) -> Self {
        let layout = ProtocolLayout::new(0, 0, 0, max_events);
        Self {
            data: vec![0.0; layout.buffer_total_floats],
            layout,
            frame: 0,
            max_events,
        }
    }

    pub fn layout(&self) -> &ProtocolLayout {
        &self.layout
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_ptr(&self) -> *const f32 {
        self.data.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Rewrite the whole buffer from `world` and this frame's `events`.
    /// Events beyond capacity are dropped.
    pub fn write<G: GeometryQuery>(&mut self, world: &SimulationWorld<G>, events: &[SimEvent]) {
        let layout = ProtocolLayout::for_world(world, self.max_events);
        if layout != self.layout {
            self.data.resize(layout.buffer_total_floats, 0.0);
            self.layout = layout;
        }
        self.frame = self.frame.wrapping_add(1);
        let layout = &self.layout;
        let data = &mut self.data;
        data.fill(0.0);

        let (width, height) = world.level().map_or((0.0, 0.0), |l| (l.width, l.height));
        let event_count = events.len().min(layout.max_events);
        data[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        data[HEADER_FRAME_COUNTER] = self.frame as f32;
        data[HEADER_PHASE] = flag(world.phase() == SimPhase::Won);
        data[HEADER_ELAPSED] = world.elapsed();
        data[HEADER_BODY_COUNT] = layout.body_count as f32;
        data[HEADER_SWITCH_COUNT] = layout.switch_count as f32;
        data[HEADER_GOAL_COUNT] = layout.goal_count as f32;
        data[HEADER_WORLD_WIDTH] = width;
        data[HEADER_WORLD_HEIGHT] = height;
        data[HEADER_STARS] = world.stars().map_or(0.0, f32::from);
        data[HEADER_MAX_EVENTS] = layout.max_events as f32;
        data[HEADER_EVENT_COUNT] = event_count as f32;

        for (i, body) in world.bodies().iter().enumerate() {
            let at = layout.body_data_offset + i * BODY_FLOATS;
            data[at..at + BODY_FLOATS].copy_from_slice(&[
                body.id.0 as f32,
                body.kind.wire_tag(),
                body.position.x,
                body.position.y,
                body.half_extents.x,
                body.half_extents.y,
                body.velocity.x,
                body.velocity.y,
                flag(body.on_ground),
            ]);
        }

        for kind in PortalKind::ALL {
            let Some(portal) = world.portal(kind) else {
                continue;
            };
            let at = layout.portal_data_offset + kind.wire_tag() as usize * PORTAL_FLOATS;
            data[at..at + PORTAL_FLOATS].copy_from_slice(&[
                1.0,
                portal.position.x,
                portal.position.y,
                portal.normal.x,
                portal.normal.y,
                flag(portal.linked().is_some()),
                flag(portal.teleport_ready()),
            ]);
        }

        for (i, switch) in world.switches().iter().enumerate() {
            let at = layout.switch_data_offset + i * SWITCH_FLOATS;
            let c = switch.rect.center();
            data[at..at + SWITCH_FLOATS].copy_from_slice(&[
                c.x,
                c.y,
                switch.rect.w,
                switch.rect.h,
                flag(switch.active),
                flag(switch.latching),
            ]);
        }

        for (i, goal) in world.goals().iter().enumerate() {
            let at = layout.goal_data_offset + i * GOAL_FLOATS;
            let c = goal.rect.center();
            data[at..at + GOAL_FLOATS].copy_from_slice(&[
                c.x,
                c.y,
                goal.rect.w,
                goal.rect.h,
                flag(goal.is_active(world.switches())),
            ]);
        }

        let wire: Vec<GameEvent> = events.iter().take(event_count).map(SimEvent::to_wire).collect();
        let floats: &[f32] = bytemuck::cast_slice(&wire);
        let at = layout.event_data_offset;
        data[at..at + floats.len()].copy_from_slice(floats);
    }
}
