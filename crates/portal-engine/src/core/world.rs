//! The simulation world: owns every piece of state and runs the tick.
//!
//! A tick runs in a fixed order: body integration and collision for all
//! bodies, then portal transfers, then switch updates, then the win check.

use glam::Vec2;
use thiserror::Error;

use crate::api::config::SimConfig;
use crate::api::types::{BodyId, GoalId, PortalKind, SimEvent, SwitchId};
use crate::core::bodies::BodySet;
use crate::core::body::{BodyInput, BodyKind, KinematicBody};
use crate::core::geometry::{GeometryQuery, LevelGeometry, Rect, SurfaceKind};
use crate::core::portal::{Portal, PortalSlots};
use crate::core::raycast::RaycastPlacer;
use crate::core::teleport::{transfer, TransferParams};
use crate::core::triggers::{Goal, Switch};
use crate::level::desc::{LevelDesc, LevelError};
use crate::level::score::star_rating;
use crate::level::spawn::{find_safe_spawn, SpawnArea};

/// Whether the level is still being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimPhase {
    Playing,
    /// A player reached an open goal. Ticks are no-ops from here on.
    Won,
}

/// Why a portal shot did not produce a portal.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PlacementRejected {
    #[error("no surface within {range} units")]
    NoHit { range: f32 },
    #[error("surface at {point} does not accept portals")]
    NonPortalable { point: Vec2 },
    #[error("aim direction has no length")]
    DegenerateDirection,
    #[error("no body with id {0:?}")]
    UnknownBody(BodyId),
}

/// A successful portal placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortalPlaced {
    pub kind: PortalKind,
    pub position: Vec2,
    pub normal: Vec2,
    /// Both slots are now occupied and linked.
    pub linked: bool,
    /// An older portal of the same kind was discarded.
    pub replaced: bool,
}

/// All simulation state for one level.
pub struct SimulationWorld<G: GeometryQuery = LevelGeometry> {
    config: SimConfig,
    geometry: G,
    bodies: BodySet,
    portals: PortalSlots,
    switches: Vec<Switch>,
    goals: Vec<Goal>,
    phase: SimPhase,
    elapsed: f32,
    player: Option<BodyId>,
    level: Option<LevelDesc>,
}

impl<G: GeometryQuery> SimulationWorld<G> {
    /// An empty world over `geometry`.
    pub fn new(geometry: G, config: SimConfig) -> Self {
        Self {
            config,
            geometry,
            bodies: BodySet::new(),
            portals: PortalSlots::new(),
            switches: Vec::new(),
            goals: Vec::new(),
            phase: SimPhase::Playing,
            elapsed: 0.0,
            player: None,
            level: None,
        }
    }

    pub fn with_switch(mut self, switch: Switch) -> Self {
        self.switches.push(switch);
        self
    }

    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goals.push(goal);
        self
    }

    /// Add a body centered at `position`. The first player spawned becomes
    /// the world's player.
    pub fn spawn_body(&mut self, kind: BodyKind, position: Vec2) -> BodyId {
        let id = self.bodies.spawn(kind, position, &self.config);
        if kind == BodyKind::Player && self.player.is_none() {
            self.player = Some(id);
        }
        id
    }

    /// Advance the world by `dt` seconds. `inputs` pairs bodies with their
    /// control input for this tick; bodies not listed get no input.
    pub fn tick(&mut self, dt: f32, inputs: &[(BodyId, BodyInput)]) -> Vec<SimEvent> {
        let mut events = Vec::new();
        if self.phase == SimPhase::Won || !dt.is_finite() || dt <= 0.0 {
            return events;
        }
        self.elapsed += dt;

        self.step_bodies(dt, inputs);
        self.resolve_portals(dt, &mut events);
        self.update_switches(dt, &mut events);
        self.check_goals(&mut events);

        events
    }

    fn step_bodies(&mut self, dt: f32, inputs: &[(BodyId, BodyInput)]) {
        for body in self.bodies.iter_mut() {
            let input = inputs
                .iter()
                .rev()
                .find(|(id, _)| *id == body.id)
                .map(|(_, input)| *input)
                .unwrap_or_default();
            body.step(dt, input, &self.geometry, &self.config);
        }
    }

    fn resolve_portals(&mut self, dt: f32, events: &mut Vec<SimEvent>) {
        self.portals.tick(dt);
        let params = TransferParams::from(&self.config);
        let cooldown = self.config.teleport_cooldown;

        for body in self.bodies.iter_mut() {
            let Some((from, to)) = self.portals.find_transfer(&*body) else {
                continue;
            };
            let Some(exit) = self.portals.get(to) else {
                continue;
            };
            let out = transfer(body.velocity, exit.position, exit.normal, exit.radius, &params);

            body.position = out.position;
            body.velocity = out.velocity;
            body.on_ground = false;
            body.start_teleport_cooldown(cooldown);
            self.portals.enter_cooldown(from, to, cooldown);

            log::debug!(
                "body {:?} teleported {:?} -> {:?}, exit {:?} at {:.1} px/s",
                body.id,
                from,
                to,
                out.position,
                out.velocity.length()
            );
            events.push(SimEvent::Teleported {
                body: body.id,
                from,
                to,
                position: out.position,
                velocity: out.velocity,
            });
        }
    }

    fn update_switches(&mut self, dt: f32, events: &mut Vec<SimEvent>) {
        let aabbs: Vec<(BodyId, Rect)> = self.bodies.iter().map(|b| (b.id, b.aabb())).collect();
        for (i, switch) in self.switches.iter_mut().enumerate() {
            if let Some(active) = switch.update(dt, aabbs.iter().copied()) {
                log::debug!("switch {} {}", i, if active { "on" } else { "off" });
                events.push(SimEvent::SwitchToggled {
                    switch: SwitchId(i),
                    active,
                });
            }
        }
    }

    fn check_goals(&mut self, events: &mut Vec<SimEvent>) {
        for (i, goal) in self.goals.iter().enumerate() {
            let winner = self
                .bodies
                .iter()
                .filter(|b| b.kind == BodyKind::Player)
                .find(|b| goal.check_win(&self.switches, &b.aabb()));
            if let Some(body) = winner {
                log::info!("goal {} reached by {:?} after {:.2}s", i, body.id, self.elapsed);
                events.push(SimEvent::GoalReached {
                    goal: GoalId(i),
                    body: body.id,
                    elapsed: self.elapsed,
                });
                self.phase = SimPhase::Won;
                return;
            }
        }
    }

    /// Shoot a portal from `origin` along `direction`.
    pub fn place_portal(
        &mut self,
        kind: PortalKind,
        origin: Vec2,
        direction: Vec2,
    ) -> Result<PortalPlaced, PlacementRejected> {
        let length = direction.length();
        if !length.is_finite() || length <= f32::EPSILON || !origin.is_finite() {
            return Err(PlacementRejected::DegenerateDirection);
        }
        let range = self.config.portal_range;
        let hit = RaycastPlacer::new(self.config.ray_step)
            .cast(origin, direction / length, range, &self.geometry)
            .ok_or(PlacementRejected::NoHit { range })?;
        if hit.surface == SurfaceKind::NonPortalable {
            return Err(PlacementRejected::NonPortalable { point: hit.point });
        }

        let portal = Portal::new(kind, hit.point, hit.normal, self.config.portal_radius);
        let replaced = self.portals.place(portal);
        log::debug!("placed {:?} portal at {:?} facing {:?}", kind, hit.point, hit.normal);
        Ok(PortalPlaced {
            kind,
            position: hit.point,
            normal: hit.normal,
            linked: self.portals.is_linked(),
            replaced,
        })
    }

    /// Shoot a portal from the center of `shooter` towards `target`.
    pub fn aim_portal(
        &mut self,
        kind: PortalKind,
        shooter: BodyId,
        target: Vec2,
    ) -> Result<PortalPlaced, PlacementRejected> {
        let origin = self
            .bodies
            .get(shooter)
            .map(|b| b.position)
            .ok_or(PlacementRejected::UnknownBody(shooter))?;
        self.place_portal(kind, origin, target - origin)
    }

    /// Remove a portal. Returns whether the slot was occupied.
    pub fn remove_portal(&mut self, kind: PortalKind) -> bool {
        self.portals.remove(kind).is_some()
    }

    /// Apply a push to a body, scaled by its mass. Returns whether the body exists.
    pub fn push_body(&mut self, id: BodyId, force: Vec2) -> bool {
        let Some(body) = self.bodies.get_mut(id) else {
            return false;
        };
        let mass = body.kind.mass(&self.config);
        body.push(force, mass);
        true
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    pub fn bodies(&self) -> &BodySet {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&KinematicBody> {
        self.bodies.get(id)
    }

    /// Handle of the controlled player body, if one was spawned.
    pub fn player_id(&self) -> Option<BodyId> {
        self.player
    }

    pub fn portals(&self) -> &PortalSlots {
        &self.portals
    }

    pub fn portal(&self, kind: PortalKind) -> Option<&Portal> {
        self.portals.get(kind)
    }

    pub fn switches(&self) -> &[Switch] {
        &self.switches
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    pub fn is_won(&self) -> bool {
        self.phase == SimPhase::Won
    }

    /// Simulated seconds since the level started.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// The level this world was built from, if any.
    pub fn level(&self) -> Option<&LevelDesc> {
        self.level.as_ref()
    }

    /// Stars earned, once the level is won.
    pub fn stars(&self) -> Option<u8> {
        if !self.is_won() {
            return None;
        }
        let thresholds = self
            .level
            .as_ref()
            .map(LevelDesc::star_times)
            .unwrap_or(crate::level::score::DEFAULT_STAR_TIMES);
        Some(star_rating(thresholds, self.elapsed))
    }
}

impl SimulationWorld<LevelGeometry> {
    /// Build a world from a level description.
    pub fn from_level(level: LevelDesc, config: SimConfig) -> Result<Self, LevelError> {
        level.validate()?;
        let mut world = Self::new(level.build_geometry(), config);
        world.level = Some(level);
        world.load_level();
        Ok(world)
    }

    /// Destroy every body and portal and start the level over.
    /// A world not built from a level keeps its switches and goals but
    /// releases every switch, and gets no bodies back.
    pub fn reset(&mut self) {
        self.portals.clear();
        self.bodies.clear();
        self.switches.iter_mut().for_each(Switch::reset);
        self.player = None;
        self.phase = SimPhase::Playing;
        self.elapsed = 0.0;
        self.load_level();
    }

    fn load_level(&mut self) {
        let Some(level) = self.level.as_ref() else {
            return;
        };
        self.switches = level.build_switches(&self.config);
        self.goals = level.build_goals(&self.config);

        let box_half = Vec2::splat(BodyKind::Box.size(&self.config) * 0.5);
        let boxes: Vec<Vec2> = level.box_positions().collect();
        let obstacles: Vec<Rect> = boxes.iter().map(|&p| Rect::from_center(p, box_half)).collect();
        let area = SpawnArea {
            geometry: &self.geometry,
            obstacles: &obstacles,
            width: level.width,
            height: level.height,
        };
        let player_half = Vec2::splat(BodyKind::Player.size(&self.config) * 0.5);
        let spawn = find_safe_spawn(level.spawn_point(), player_half, &area);
        log::info!(
            "level '{}' loaded: {} walls, {} boxes, {} switches, {} goals",
            level.name,
            self.geometry.walls().len() + self.geometry.non_portalable_walls().len(),
            boxes.len(),
            self.switches.len(),
            self.goals.len()
        );

        self.spawn_body(BodyKind::Player, spawn);
        for position in boxes {
            self.spawn_body(BodyKind::Box, position);
        }
    }
}
