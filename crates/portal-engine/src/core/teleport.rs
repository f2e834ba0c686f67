use glam::Vec2;

use crate::api::config::SimConfig;

/// Constants of the momentum transfer between two portals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferParams {
    /// Gap between the destination rim and the exit point.
    pub exit_offset: f32,
    pub momentum_multiplier: f32,
    pub min_exit_speed: f32,
    pub max_exit_speed: f32,
}

impl From<&SimConfig> for TransferParams {
    fn from(cfg: &SimConfig) -> Self {
        Self {
            exit_offset: cfg.portal_exit_offset,
            momentum_multiplier: cfg.momentum_multiplier,
            min_exit_speed: cfg.min_exit_speed,
            max_exit_speed: cfg.max_exit_speed,
        }
    }
}

/// Where and how fast a body leaves the destination portal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferOutcome {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Map an incoming velocity onto the destination portal.
///
/// The body exits just outside the destination rim, moving along the
/// destination normal with its speed amplified and clamped into the exit
/// window. A body at rest is only relocated.
pub fn transfer(
    velocity: Vec2,
    dest_position: Vec2,
    dest_normal: Vec2,
    radius: f32,
    params: &TransferParams,
) -> TransferOutcome {
    let position = dest_position + dest_normal * (radius + params.exit_offset);

    let speed = velocity.length();
    if speed == 0.0 {
        return TransferOutcome { position, velocity };
    }

    let amplified = dest_normal * speed * params.momentum_multiplier;
    let floor = params.min_exit_speed.min(params.max_exit_speed);
    TransferOutcome {
        position,
        velocity: amplified.clamp_length(floor, params.max_exit_speed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TransferParams {
        TransferParams::from(&SimConfig::default())
    }

    #[test]
    fn amplifies_along_destination_normal() {
        let out = transfer(
            Vec2::new(300.0, 0.0),
            Vec2::new(100.0, 200.0),
            Vec2::new(0.0, -1.0),
            25.0,
            &params(),
        );
        assert!(out.velocity.x.abs() < 0.001);
        assert!((out.velocity.y + 540.0).abs() < 0.01);
        assert!((out.position.x - 100.0).abs() < 0.001);
        assert!((out.position.y - 165.0).abs() < 0.001);
    }

    #[test]
    fn slow_entry_is_raised_to_minimum() {
        let out = transfer(Vec2::new(0.0, 50.0), Vec2::ZERO, Vec2::X, 25.0, &params());
        assert!((out.velocity.length() - 400.0).abs() < 0.01);
        assert!(out.velocity.x > 0.0);
    }

    #[test]
    fn fast_entry_is_capped() {
        let out = transfer(Vec2::new(-700.0, 700.0), Vec2::ZERO, Vec2::Y, 25.0, &params());
        assert!((out.velocity.length() - 1000.0).abs() < 0.01);
        assert!(out.velocity.y > 0.0);
    }

    #[test]
    fn exit_speed_stays_in_window() {
        let p = params();
        for speed in [0.5, 10.0, 222.2, 400.0, 555.5, 999.0, 5000.0] {
            for normal in [Vec2::X, -Vec2::X, Vec2::Y, -Vec2::Y] {
                let v = Vec2::new(speed * 0.6, -speed * 0.8);
                let s = transfer(v, Vec2::ZERO, normal, 25.0, &p).velocity.length();
                assert!(s >= p.min_exit_speed - 0.01 && s <= p.max_exit_speed + 0.01, "{s}");
            }
        }
    }

    #[test]
    fn resting_body_is_only_relocated() {
        let out = transfer(Vec2::ZERO, Vec2::new(10.0, 10.0), Vec2::X, 25.0, &params());
        assert_eq!(out.velocity, Vec2::ZERO);
        assert_eq!(out.position, Vec2::new(45.0, 10.0));
    }
}
