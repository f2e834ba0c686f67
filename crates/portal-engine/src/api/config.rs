use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a config was refused.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be finite and not negative, got {value}")]
    OutOfRange { field: &'static str, value: f32 },
}

/// Tuning for the whole simulation, provided by the host.
///
/// Every field has a default; a JSON override only needs the fields it
/// changes. Units are world pixels and seconds, Y pointing down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Maximum fixed steps run for one frame delta (default: 10).
    pub max_steps_per_frame: u32,

    /// Downward acceleration applied to airborne bodies.
    pub gravity: f32,
    /// Vertical speed cap applied before integration.
    pub max_fall_speed: f32,
    /// Absolute per-axis velocity ceiling applied after collision resolution.
    pub max_velocity: f32,

    /// Horizontal speed set while a direction key is held.
    pub player_speed: f32,
    /// Upward speed given by a jump.
    pub jump_force: f32,
    /// Ground friction multiplier for the player, applied every grounded tick.
    pub player_friction: f32,
    /// Extra ground deceleration when the player gives no horizontal input.
    pub player_idle_deceleration: f32,
    /// Side length of the player's square.
    pub player_size: f32,

    /// Ground friction multiplier for boxes.
    pub box_friction: f32,
    /// Side length of a box.
    pub box_size: f32,
    /// Mass dividing forces given to `push`.
    pub box_mass: f32,

    /// Length of one push-out step when resolving a collision.
    pub push_step: f32,
    /// Push-out steps allowed per unit of body half-extent (x + y).
    pub push_budget_per_unit: f32,

    /// Radius of a portal's trigger circle.
    pub portal_radius: f32,
    /// Maximum placement ray length.
    pub portal_range: f32,
    /// Distance past the portal rim where a transferred body is placed.
    pub portal_exit_offset: f32,
    /// Cooldown after a transfer, for both portals and the body.
    pub teleport_cooldown: f32,
    /// Exit speed amplification.
    pub momentum_multiplier: f32,
    /// Exit speed floor.
    pub min_exit_speed: f32,
    /// Exit speed ceiling.
    pub max_exit_speed: f32,
    /// Ray march step length.
    pub ray_step: f32,

    /// Width of a switch plate.
    pub switch_width: f32,
    /// Height of a switch plate.
    pub switch_height: f32,
    /// Seconds of zero occupancy before a non-latching switch turns off.
    pub switch_deactivation_delay: f32,
    /// Side length of a goal's trigger square.
    pub goal_size: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_steps_per_frame: 10,
            gravity: 800.0,
            max_fall_speed: 700.0,
            max_velocity: 1000.0,
            player_speed: 300.0,
            jump_force: 400.0,
            player_friction: 0.95,
            player_idle_deceleration: 0.8,
            player_size: 30.0,
            box_friction: 0.7,
            box_size: 40.0,
            box_mass: 1.0,
            push_step: 1.0,
            push_budget_per_unit: 2.0,
            portal_radius: 25.0,
            portal_range: 600.0,
            portal_exit_offset: 10.0,
            teleport_cooldown: 0.1,
            momentum_multiplier: 1.8,
            min_exit_speed: 400.0,
            max_exit_speed: 1000.0,
            ray_step: 2.0,
            switch_width: 50.0,
            switch_height: 25.0,
            switch_deactivation_delay: 1.0,
            goal_size: 60.0,
        }
    }
}

impl SimConfig {
    /// Parse a config from a JSON string. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall or blow up a tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("fixed_dt", self.fixed_dt),
            ("ray_step", self.ray_step),
            ("push_step", self.push_step),
            ("player_size", self.player_size),
            ("box_size", self.box_size),
            ("box_mass", self.box_mass),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        let non_negative = [
            ("portal_range", self.portal_range),
            ("portal_radius", self.portal_radius),
            ("teleport_cooldown", self.teleport_cooldown),
            ("min_exit_speed", self.min_exit_speed),
            ("max_exit_speed", self.max_exit_speed),
            ("switch_deactivation_delay", self.switch_deactivation_delay),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }
        Ok(())
    }
}
