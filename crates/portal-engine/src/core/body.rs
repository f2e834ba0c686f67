//! Kinematic bodies and the per-axis push-out collision resolver.
//!
//! A body is an axis-aligned square that integrates its own velocity and
//! resolves overlap against level geometry by testing its four corners.
//! Axes are resolved one after the other, X first, so a body sliding into a
//! corner keeps the motion along the free axis.

use glam::Vec2;

use crate::api::config::SimConfig;
use crate::api::types::BodyId;
use crate::core::geometry::{GeometryQuery, Rect};
use crate::core::time::Countdown;

/// The closed set of dynamic body variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Driven by control input; the only kind that can reach a goal.
    Player,
    /// Passive crate: gravity, friction, pushes and portals only.
    Box,
}

impl BodyKind {
    /// Side length of this kind's square.
    pub fn size(self, cfg: &SimConfig) -> f32 {
        match self {
            BodyKind::Player => cfg.player_size,
            BodyKind::Box => cfg.box_size,
        }
    }

    /// Ground friction multiplier applied to horizontal velocity.
    pub fn friction(self, cfg: &SimConfig) -> f32 {
        match self {
            BodyKind::Player => cfg.player_friction,
            BodyKind::Box => cfg.box_friction,
        }
    }

    /// Mass dividing pushes. The player is not weighted.
    pub fn mass(self, cfg: &SimConfig) -> f32 {
        match self {
            BodyKind::Player => 1.0,
            BodyKind::Box => cfg.box_mass,
        }
    }

    /// Wire tag used by the snapshot protocol.
    pub fn wire_tag(self) -> f32 {
        match self {
            BodyKind::Player => 0.0,
            BodyKind::Box => 1.0,
        }
    }
}

/// Per-tick control input for a body.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyInput {
    /// Sign selects direction: negative = left, positive = right, zero = none.
    pub horizontal: f32,
    /// Jump requested this tick. Only honoured while grounded.
    pub jump: bool,
}

impl BodyInput {
    pub fn new(horizontal: f32, jump: bool) -> Self {
        Self { horizontal, jump }
    }
}

/// How one axis of a step resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOutcome {
    /// The candidate coordinate was clear and committed as-is.
    Free,
    /// The candidate was solid; a pulled-back clear coordinate was committed.
    Blocked,
    /// No clear coordinate was found within budget; the axis kept its old value.
    Unresolved,
}

/// Result of one `KinematicBody::step`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub on_ground: bool,
    pub x: AxisOutcome,
    pub y: AxisOutcome,
}

impl BodyState {
    pub fn unresolved(&self) -> bool {
        self.x == AxisOutcome::Unresolved || self.y == AxisOutcome::Unresolved
    }
}

/// Objects that portals may transfer.
pub trait Teleportable {
    /// Whether the object accepts a transfer right now.
    fn is_eligible(&self) -> bool;

    /// Point compared against a portal's center.
    fn center(&self) -> Vec2;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// A dynamic axis-aligned body.
#[derive(Debug, Clone)]
pub struct KinematicBody {
    pub id: BodyId,
    pub kind: BodyKind,
    /// Center in world space.
    pub position: Vec2,
    pub half_extents: Vec2,
    pub velocity: Vec2,
    pub on_ground: bool,
    pub(crate) teleport_cooldown: Countdown,
}

impl KinematicBody {
    /// Create a body of `kind` centered at `position`, sized from the config.
    pub fn new(id: BodyId, kind: BodyKind, position: Vec2, cfg: &SimConfig) -> Self {
        let half = kind.size(cfg) * 0.5;
        Self {
            id,
            kind,
            position,
            half_extents: Vec2::splat(half),
            velocity: Vec2::ZERO,
            on_ground: false,
            teleport_cooldown: Countdown::default(),
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_half_extents(mut self, half_extents: Vec2) -> Self {
        self.half_extents = half_extents;
        self
    }

    /// Axis-aligned bounding box at the current position.
    pub fn aabb(&self) -> Rect {
        Rect::from_center(self.position, self.half_extents)
    }

    /// Seconds left before this body may teleport again.
    pub fn teleport_cooldown(&self) -> f32 {
        self.teleport_cooldown.remaining()
    }

    pub(crate) fn start_teleport_cooldown(&mut self, duration: f32) {
        self.teleport_cooldown.start(duration);
    }

    /// Add an impulse-like force, divided by `mass`.
    pub fn push(&mut self, force: Vec2, mass: f32) {
        if mass > 0.0 {
            self.velocity += force / mass;
        }
    }

    /// Advance one tick: input, gravity, friction, integration and
    /// per-axis collision resolution, then velocity sanitizing.
    pub fn step<G: GeometryQuery + ?Sized>(
        &mut self,
        dt: f32,
        input: BodyInput,
        geometry: &G,
        cfg: &SimConfig,
    ) -> BodyState {
        if self.kind == BodyKind::Player {
            self.apply_input(input, cfg);
        }

        if !self.on_ground {
            self.velocity.y += cfg.gravity * dt;
        }
        if self.velocity.y > cfg.max_fall_speed {
            self.velocity.y = cfg.max_fall_speed;
        }
        if self.on_ground {
            self.velocity.x *= self.kind.friction(cfg);
        }

        let target = self.position + self.velocity * dt;
        let budget = self.push_budget(cfg);
        let x = self.resolve_axis(Axis::X, target.x, geometry, cfg.push_step, budget);
        let y = self.resolve_axis(Axis::Y, target.y, geometry, cfg.push_step, budget);

        self.velocity.x = sanitize(self.velocity.x, cfg.max_velocity);
        self.velocity.y = sanitize(self.velocity.y, cfg.max_velocity);

        self.teleport_cooldown.tick(dt);

        BodyState {
            position: self.position,
            velocity: self.velocity,
            on_ground: self.on_ground,
            x,
            y,
        }
    }

    fn apply_input(&mut self, input: BodyInput, cfg: &SimConfig) {
        if input.horizontal < 0.0 {
            self.velocity.x = -cfg.player_speed;
        } else if input.horizontal > 0.0 {
            self.velocity.x = cfg.player_speed;
        } else if self.on_ground {
            self.velocity.x *= cfg.player_idle_deceleration;
        }

        if input.jump && self.on_ground {
            self.velocity.y = -cfg.jump_force;
            self.on_ground = false;
        }
    }

    /// Maximum push-out steps for one axis, proportional to body size.
    fn push_budget(&self, cfg: &SimConfig) -> u32 {
        let steps = ((self.half_extents.x + self.half_extents.y) * cfg.push_budget_per_unit).ceil();
        (steps as u32).max(1)
    }

    /// Does the AABB centered at `center` have a corner inside solid geometry?
    fn collides_at<G: GeometryQuery + ?Sized>(&self, center: Vec2, geometry: &G) -> bool {
        let h = self.half_extents;
        [
            Vec2::new(-h.x, -h.y),
            Vec2::new(h.x, -h.y),
            Vec2::new(-h.x, h.y),
            Vec2::new(h.x, h.y),
        ]
        .iter()
        .any(|corner| geometry.is_solid(center + *corner))
    }

    fn resolve_axis<G: GeometryQuery + ?Sized>(
        &mut self,
        axis: Axis,
        target: f32,
        geometry: &G,
        step: f32,
        budget: u32,
    ) -> AxisOutcome {
        let current = match axis {
            Axis::X => self.position.x,
            Axis::Y => self.position.y,
        };
        if !target.is_finite() {
            return AxisOutcome::Unresolved;
        }
        let at = |coord: f32| match axis {
            Axis::X => Vec2::new(coord, self.position.y),
            Axis::Y => Vec2::new(self.position.x, coord),
        };

        if !self.collides_at(at(target), geometry) {
            self.set_coord(axis, target);
            if axis == Axis::Y && self.velocity.y >= 0.0 {
                self.on_ground = false;
            }
            return AxisOutcome::Free;
        }

        // Walk back towards the current coordinate, one step at a time.
        let moving_forward = target > current;
        let mut candidate = target;
        let mut steps = 0;
        while steps < budget && self.collides_at(at(candidate), geometry) {
            if moving_forward {
                if candidate <= current {
                    break;
                }
                candidate = (candidate - step).max(current);
            } else {
                if candidate >= current {
                    break;
                }
                candidate = (candidate + step).min(current);
            }
            steps += 1;
        }

        match axis {
            Axis::X => self.velocity.x = 0.0,
            Axis::Y => {
                self.velocity.y = 0.0;
                if moving_forward {
                    self.on_ground = true;
                }
            }
        }

        if self.collides_at(at(candidate), geometry) {
            log::debug!(
                "body {:?}: push-out failed on {:?} after {} steps at {:?}",
                self.id,
                axis,
                steps,
                self.position
            );
            return AxisOutcome::Unresolved;
        }
        self.set_coord(axis, candidate);
        AxisOutcome::Blocked
    }

    fn set_coord(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::X => self.position.x = value,
            Axis::Y => self.position.y = value,
        }
    }
}

impl Teleportable for KinematicBody {
    fn is_eligible(&self) -> bool {
        match self.kind {
            BodyKind::Player | BodyKind::Box => !self.teleport_cooldown.is_running(),
        }
    }

    fn center(&self) -> Vec2 {
        self.position
    }
}

fn sanitize(v: f32, ceiling: f32) -> f32 {
    if !v.is_finite() {
        0.0
    } else {
        v.clamp(-ceiling, ceiling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::LevelGeometry;

    const DT: f32 = 1.0 / 60.0;

    fn floor_level() -> LevelGeometry {
        LevelGeometry::new().with_wall(Rect::new(0.0, 500.0, 1000.0, 50.0))
    }

    fn player_at(x: f32, y: f32, cfg: &SimConfig) -> KinematicBody {
        KinematicBody::new(BodyId(1), BodyKind::Player, Vec2::new(x, y), cfg)
    }

    #[test]
    fn gravity_accelerates_airborne_body() {
        let cfg = SimConfig::default();
        let geo = LevelGeometry::new();
        let mut body = player_at(100.0, 100.0, &cfg);
        body.step(DT, BodyInput::default(), &geo, &cfg);
        assert!((body.velocity.y - cfg.gravity * DT).abs() < 0.001);
        assert!(body.position.y > 100.0);
    }

    #[test]
    fn fall_speed_clamped_before_integration() {
        let cfg = SimConfig::default();
        let geo = LevelGeometry::new();
        let mut body = player_at(100.0, 100.0, &cfg).with_velocity(Vec2::new(0.0, 900.0));
        let state = body.step(DT, BodyInput::default(), &geo, &cfg);
        assert!((state.velocity.y - 700.0).abs() < 0.001);
        assert!((state.position.y - (100.0 + 700.0 * DT)).abs() < 0.001);
    }

    #[test]
    fn falling_body_lands_without_overlap() {
        let cfg = SimConfig::default();
        let geo = floor_level();
        let mut body = player_at(200.0, 300.0, &cfg);
        let mut landed = false;
        for _ in 0..240 {
            let state = body.step(DT, BodyInput::default(), &geo, &cfg);
            assert!(!geo.overlaps_solid(&body.aabb()), "overlap at {:?}", body.position);
            landed |= state.y == AxisOutcome::Blocked && state.on_ground;
        }
        assert!(landed);
        assert!(body.aabb().bottom() <= 500.0);
        assert!(body.aabb().bottom() > 498.0, "rests near the floor: {:?}", body.aabb());
    }

    #[test]
    fn wall_blocks_horizontal_motion() {
        let cfg = SimConfig::default();
        let geo = floor_level().with_wall(Rect::new(300.0, 0.0, 50.0, 600.0));
        let mut body = player_at(250.0, 300.0, &cfg);
        let mut blocked = false;
        for _ in 0..60 {
            let state = body.step(DT, BodyInput::new(1.0, false), &geo, &cfg);
            assert!(!geo.overlaps_solid(&body.aabb()));
            if state.x == AxisOutcome::Blocked {
                blocked = true;
                assert_eq!(state.velocity.x, 0.0);
            }
        }
        assert!(blocked);
        assert!(body.aabb().right() <= 300.0);
    }

    #[test]
    fn ceiling_stops_upward_motion_without_grounding() {
        let cfg = SimConfig::default();
        let geo = LevelGeometry::new().with_wall(Rect::new(0.0, 0.0, 1000.0, 50.0));
        let mut body = player_at(200.0, 70.0, &cfg).with_velocity(Vec2::new(0.0, -600.0));
        let state = body.step(DT, BodyInput::default(), &geo, &cfg);
        assert_eq!(state.y, AxisOutcome::Blocked);
        assert_eq!(state.velocity.y, 0.0);
        assert!(!state.on_ground);
        assert!(body.aabb().top() >= 50.0);
    }

    #[test]
    fn jump_requires_ground() {
        let cfg = SimConfig::default();
        let geo = LevelGeometry::new();
        let mut body = player_at(100.0, 100.0, &cfg);
        body.step(DT, BodyInput::new(0.0, true), &geo, &cfg);
        assert!(body.velocity.y > 0.0, "airborne jump ignored");

        let mut grounded = player_at(100.0, 100.0, &cfg);
        grounded.on_ground = true;
        grounded.step(DT, BodyInput::new(0.0, true), &geo, &cfg);
        assert!(grounded.velocity.y < 0.0);
    }

    #[test]
    fn horizontal_input_sets_speed() {
        let cfg = SimConfig::default();
        let geo = LevelGeometry::new();
        let mut body = player_at(100.0, 100.0, &cfg);
        body.step(DT, BodyInput::new(-1.0, false), &geo, &cfg);
        assert!((body.velocity.x + cfg.player_speed).abs() < 0.001);
    }

    #[test]
    fn friction_only_applies_on_ground() {
        let cfg = SimConfig::default();
        let geo = LevelGeometry::new();
        let mut air = KinematicBody::new(BodyId(2), BodyKind::Box, Vec2::new(100.0, 100.0), &cfg)
            .with_velocity(Vec2::new(100.0, 0.0));
        air.step(DT, BodyInput::default(), &geo, &cfg);
        assert!((air.velocity.x - 100.0).abs() < 0.001);

        let mut ground = air.clone().with_velocity(Vec2::new(100.0, 0.0));
        ground.on_ground = true;
        ground.step(DT, BodyInput::default(), &geo, &cfg);
        assert!((ground.velocity.x - 100.0 * cfg.box_friction).abs() < 0.001);
    }

    #[test]
    fn boxes_ignore_control_input() {
        let cfg = SimConfig::default();
        let geo = LevelGeometry::new();
        let mut crate_body = KinematicBody::new(BodyId(2), BodyKind::Box, Vec2::new(100.0, 100.0), &cfg);
        crate_body.step(DT, BodyInput::new(1.0, true), &geo, &cfg);
        assert_eq!(crate_body.velocity.x, 0.0);
    }

    #[test]
    fn velocity_is_sanitized() {
        let cfg = SimConfig::default();
        let geo = LevelGeometry::new();
        let mut body = player_at(100.0, 100.0, &cfg).with_velocity(Vec2::new(f32::NAN, -5000.0));
        let state = body.step(DT, BodyInput::default(), &geo, &cfg);
        assert_eq!(state.velocity.x, 0.0);
        assert!((state.velocity.y + cfg.max_velocity).abs() < 0.001);
        assert!(state.position.x.is_finite());
    }

    #[test]
    fn embedded_body_stays_put() {
        let cfg = SimConfig::default();
        let geo = LevelGeometry::new().with_wall(Rect::new(0.0, 0.0, 400.0, 400.0));
        let mut body = player_at(200.0, 200.0, &cfg);
        let state = body.step(DT, BodyInput::default(), &geo, &cfg);
        assert_eq!(state.y, AxisOutcome::Unresolved);
        assert!(state.unresolved());
        assert_eq!(body.position, Vec2::new(200.0, 200.0));
    }

    #[test]
    fn push_out_budget_is_bounded() {
        let cfg = SimConfig::default();
        let geo = LevelGeometry::new().with_wall(Rect::new(0.0, 110.0, 1000.0, 500.0));
        // Tiny body: budget of 4 steps, moving 70 units deep into the floor.
        let mut body = KinematicBody::new(BodyId(1), BodyKind::Box, Vec2::new(50.0, 100.0), &cfg)
            .with_half_extents(Vec2::splat(1.0))
            .with_velocity(Vec2::new(0.0, 700.0));
        let state = body.step(0.1, BodyInput::default(), &geo, &cfg);
        assert_eq!(state.y, AxisOutcome::Unresolved);
        assert_eq!(body.position.y, 100.0);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn push_scales_by_mass() {
        let cfg = SimConfig::default();
        let mut crate_body = KinematicBody::new(BodyId(2), BodyKind::Box, Vec2::ZERO, &cfg);
        crate_body.push(Vec2::new(50.0, -20.0), 2.0);
        assert_eq!(crate_body.velocity, Vec2::new(25.0, -10.0));
        crate_body.push(Vec2::new(50.0, 0.0), 0.0);
        assert_eq!(crate_body.velocity, Vec2::new(25.0, -10.0));
    }

    #[test]
    fn teleport_cooldown_gates_eligibility() {
        let cfg = SimConfig::default();
        let geo = LevelGeometry::new();
        let mut body = player_at(100.0, 100.0, &cfg);
        assert!(body.is_eligible());
        body.start_teleport_cooldown(0.05);
        assert!(!body.is_eligible());
        for _ in 0..4 {
            body.step(DT, BodyInput::default(), &geo, &cfg);
        }
        assert!(body.is_eligible());
    }
}
