use glam::Vec2;
use portal_engine::bridge::protocol::{SnapshotBuffer, DEFAULT_MAX_EVENTS};
use portal_engine::{
    BodyId, BodyInput, ControlState, FixedTimestep, GameEvent, InputEvent, InputQueue, LevelDesc,
    LevelError, PortalKind, SimConfig, SimEvent, SimulationWorld,
};

/// Drives a `SimulationWorld` from host frames.
///
/// The host pushes input events between frames and calls `tick` with the
/// frame delta. The runner turns the delta into fixed steps, then rewrites
/// the snapshot and event buffers the host reads through raw pointers.
pub struct SimRunner {
    world: SimulationWorld,
    timestep: FixedTimestep,
    input: InputQueue,
    controls: ControlState,
    snapshot: SnapshotBuffer,
    frame_events: Vec<SimEvent>,
    /// Flat event records for pointer reads.
    event_buffer: Vec<GameEvent>,
}

impl SimRunner {
    pub fn new(level: LevelDesc, config: SimConfig) -> Result<Self, LevelError> {
        let timestep = FixedTimestep::new(config.fixed_dt, config.max_steps_per_frame);
        let world = SimulationWorld::from_level(level, config)?;
        let mut snapshot = SnapshotBuffer::new(DEFAULT_MAX_EVENTS);
        snapshot.write(&world, &[]);

        Ok(Self {
            world,
            timestep,
            input: InputQueue::new(),
            controls: ControlState::new(),
            snapshot,
            frame_events: Vec::new(),
            event_buffer: Vec::with_capacity(DEFAULT_MAX_EVENTS),
        })
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one host frame: apply queued input, step the world, rebuild buffers.
    pub fn tick(&mut self, dt: f32) {
        self.frame_events.clear();

        for event in self.input.drain() {
            match event {
                InputEvent::KeyDown { .. } | InputEvent::KeyUp { .. } => {
                    self.controls.apply(&event);
                }
                InputEvent::FirePortal { kind, x, y } => self.fire_portal(kind, Vec2::new(x, y)),
                InputEvent::Restart => self.restart(),
            }
        }

        let steps = self.timestep.accumulate(dt);
        let control = self.controls.input();
        for _ in 0..steps {
            let inputs: Vec<(BodyId, BodyInput)> = self
                .world
                .player_id()
                .map(|id| (id, control))
                .into_iter()
                .collect();
            let events = self.world.tick(self.timestep.dt(), &inputs);
            self.frame_events.extend(events);
        }

        self.event_buffer.clear();
        self.event_buffer
            .extend(self.frame_events.iter().map(SimEvent::to_wire));
        self.snapshot.write(&self.world, &self.frame_events);
    }

    fn fire_portal(&mut self, kind: PortalKind, target: Vec2) {
        let Some(player) = self.world.player_id() else {
            return;
        };
        match self.world.aim_portal(kind, player, target) {
            Ok(placed) => log::debug!("{:?} portal at {:?}", placed.kind, placed.position),
            Err(reason) => log::debug!("{:?} portal rejected: {}", kind, reason),
        }
    }

    /// Start the level over, dropping held keys and partial frame time.
    pub fn restart(&mut self) {
        self.world.reset();
        self.controls.clear();
        self.timestep.reset();
        log::info!("level restarted");
    }

    pub fn world(&self) -> &SimulationWorld {
        &self.world
    }

    /// Events produced by the last `tick`.
    pub fn frame_events(&self) -> &[SimEvent] {
        &self.frame_events
    }

    // ---- Pointer accessors for host reads ----

    pub fn snapshot_ptr(&self) -> *const f32 {
        self.snapshot.as_ptr()
    }

    pub fn snapshot_len(&self) -> u32 {
        self.snapshot.len() as u32
    }

    pub fn events_ptr(&self) -> *const f32 {
        self.event_buffer.as_ptr() as *const f32
    }

    /// Number of events (each `GameEvent::FLOATS` floats).
    pub fn events_len(&self) -> u32 {
        self.event_buffer.len() as u32
    }

    pub fn is_won(&self) -> bool {
        self.world.is_won()
    }

    pub fn elapsed(&self) -> f32 {
        self.world.elapsed()
    }

    /// Stars earned, or 0 while the level is still being played.
    pub fn stars(&self) -> u32 {
        self.world.stars().map_or(0, u32::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_engine::input::queue::keys;

    const LEVEL: &str = r#"{
        "name": "corridor",
        "width": 800, "height": 600,
        "walls": [
            { "x": 0, "y": 550, "w": 800, "h": 50 },
            { "x": 0, "y": 0, "w": 50, "h": 600 },
            { "x": 750, "y": 0, "w": 50, "h": 600 }
        ],
        "spawn": [150, 520],
        "goals": [{ "x": 650, "y": 520 }]
    }"#;

    fn runner() -> SimRunner {
        let level = LevelDesc::from_json(LEVEL).unwrap();
        SimRunner::new(level, SimConfig::default()).unwrap()
    }

    #[test]
    fn holding_right_reaches_goal() {
        let mut r = runner();
        r.push_input(InputEvent::KeyDown { key_code: keys::RIGHT });
        for _ in 0..300 {
            r.tick(1.0 / 60.0);
            if r.is_won() {
                break;
            }
        }
        assert!(r.is_won());
        assert_eq!(r.stars(), 3);
        assert!(r.elapsed() > 1.0);
    }

    #[test]
    fn held_jump_fires_on_either_resting_tick() {
        for settle in [120, 121] {
            let mut r = runner();
            for _ in 0..settle {
                r.tick(1.0 / 60.0);
            }
            let player = r.world().player_id().unwrap();
            let rest_y = r.world().body(player).unwrap().position.y;

            r.push_input(InputEvent::KeyDown { key_code: keys::SPACE });
            r.tick(1.0 / 60.0);
            r.tick(1.0 / 60.0);
            r.push_input(InputEvent::KeyUp { key_code: keys::SPACE });

            let mut peak = rest_y;
            for _ in 0..10 {
                r.tick(1.0 / 60.0);
                peak = peak.min(r.world().body(player).unwrap().position.y);
            }
            assert!(peak < rest_y - 20.0, "settle {settle}: no jump, peak {peak} rest {rest_y}");
        }
    }

    #[test]
    fn fire_portal_places_portal() {
        let mut r = runner();
        r.push_input(InputEvent::FirePortal { kind: PortalKind::Blue, x: 700.0, y: 520.0 });
        r.tick(1.0 / 60.0);
        let portal = r.world().portal(PortalKind::Blue).unwrap();
        assert!((portal.position.x - 750.0).abs() < 0.001);
    }

    #[test]
    fn restart_respawns_player() {
        let mut r = runner();
        let first = r.world().player_id().unwrap();
        r.push_input(InputEvent::KeyDown { key_code: keys::RIGHT });
        for _ in 0..10 {
            r.tick(1.0 / 60.0);
        }
        r.push_input(InputEvent::Restart);
        r.tick(0.0);
        let player = r.world().player_id().unwrap();
        assert_ne!(player, first);
        assert_eq!(r.world().body(player).unwrap().position, Vec2::new(150.0, 520.0));
        assert_eq!(r.elapsed(), 0.0);
    }

    #[test]
    fn snapshot_and_events_are_exposed() {
        let mut r = runner();
        assert!(r.snapshot_len() > 0);
        r.tick(1.0 / 60.0);
        assert_eq!(r.events_len() as usize, r.frame_events().len());
        assert!(!r.snapshot_ptr().is_null());
    }
}
