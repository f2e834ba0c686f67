//! JSON level descriptions.
//!
//! Walls are given by top-left corner and size. Everything else (spawn,
//! boxes, switches, goals) is positioned by its center.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::config::SimConfig;
use crate::api::types::SwitchId;
use crate::core::geometry::{LevelGeometry, Rect};
use crate::core::triggers::{Goal, Switch};
use crate::level::score::DEFAULT_STAR_TIMES;

/// Errors raised while loading a level.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("invalid level json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("goal {goal} requires switch {switch}, but the level has {count} switches")]
    UnknownSwitch {
        goal: usize,
        switch: usize,
        count: usize,
    },
    #[error("wall {index} has no area or a non-finite coordinate")]
    DegenerateRect { index: usize },
    #[error("level bounds must be positive, got {width}x{height}")]
    InvalidBounds { width: f32, height: f32 },
}

/// A rectangle as written in level files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectDesc {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl RectDesc {
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    fn is_degenerate(&self) -> bool {
        let finite = [self.x, self.y, self.w, self.h].iter().all(|v| v.is_finite());
        !finite || self.w <= 0.0 || self.h <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwitchDesc {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub latching: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalDesc {
    pub x: f32,
    pub y: f32,
    /// Indices into the level's switch list.
    #[serde(default)]
    pub required_switches: Vec<usize>,
}

/// A complete level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDesc {
    #[serde(default)]
    pub name: String,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub walls: Vec<RectDesc>,
    #[serde(default)]
    pub non_portalable: Vec<RectDesc>,
    /// Center of the player's square, not its feet.
    pub spawn: [f32; 2],
    #[serde(default)]
    pub boxes: Vec<[f32; 2]>,
    #[serde(default)]
    pub switches: Vec<SwitchDesc>,
    #[serde(default)]
    pub goals: Vec<GoalDesc>,
    /// Completion times for 3, 2 and 1 stars.
    #[serde(default)]
    pub star_times: Option<[f32; 3]>,
}

impl LevelDesc {
    /// Parse and validate a level.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let desc: LevelDesc = serde_json::from_str(json)?;
        desc.validate()?;
        Ok(desc)
    }

    /// Check bounds, wall rectangles and goal-to-switch references.
    pub fn validate(&self) -> Result<(), LevelError> {
        let bounds_ok = self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0;
        if !bounds_ok {
            return Err(LevelError::InvalidBounds {
                width: self.width,
                height: self.height,
            });
        }

        let all_walls = self.walls.iter().chain(self.non_portalable.iter());
        if let Some(index) = all_walls.enumerate().find(|(_, r)| r.is_degenerate()).map(|(i, _)| i) {
            return Err(LevelError::DegenerateRect { index });
        }

        let count = self.switches.len();
        for (goal, desc) in self.goals.iter().enumerate() {
            if let Some(&switch) = desc.required_switches.iter().find(|&&s| s >= count) {
                return Err(LevelError::UnknownSwitch { goal, switch, count });
            }
        }
        Ok(())
    }

    pub fn spawn_point(&self) -> Vec2 {
        Vec2::from(self.spawn)
    }

    /// Box centers.
    pub fn box_positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.boxes.iter().map(|&p| Vec2::from(p))
    }

    /// Star thresholds, falling back to the defaults.
    pub fn star_times(&self) -> [f32; 3] {
        self.star_times.unwrap_or(DEFAULT_STAR_TIMES)
    }

    pub fn build_geometry(&self) -> LevelGeometry {
        let mut geometry = LevelGeometry::new();
        for wall in &self.walls {
            geometry.add_wall(wall.to_rect());
        }
        for wall in &self.non_portalable {
            geometry.add_non_portalable(wall.to_rect());
        }
        geometry
    }

    pub fn build_switches(&self, cfg: &SimConfig) -> Vec<Switch> {
        let half = Vec2::new(cfg.switch_width, cfg.switch_height) * 0.5;
        self.switches
            .iter()
            .map(|s| {
                Switch::new(
                    Rect::from_center(Vec2::new(s.x, s.y), half),
                    s.latching,
                    cfg.switch_deactivation_delay,
                )
            })
            .collect()
    }

    pub fn build_goals(&self, cfg: &SimConfig) -> Vec<Goal> {
        let half = Vec2::splat(cfg.goal_size * 0.5);
        self.goals
            .iter()
            .map(|g| {
                Goal::new(
                    Rect::from_center(Vec2::new(g.x, g.y), half),
                    g.required_switches.iter().map(|&i| SwitchId(i)).collect(),
                )
            })
            .collect()
    }
}
