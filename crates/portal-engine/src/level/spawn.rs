//! Relocating a spawn point that would start the player inside something.

use glam::Vec2;

use crate::core::geometry::{LevelGeometry, Rect};

const UP_OFFSETS: [f32; 5] = [60.0, 100.0, 150.0, 200.0, 250.0];
const SIDE_OFFSETS: [f32; 6] = [-80.0, 80.0, -120.0, 120.0, -160.0, 160.0];
const RING_RADII: [f32; 5] = [50.0, 100.0, 150.0, 200.0, 250.0];
const RING_ANGLE_STEP_DEG: f32 = 45.0;
/// Candidates closer than this to the level edge are skipped.
const MARGIN: f32 = 50.0;

/// Level data a spawn candidate is checked against.
pub struct SpawnArea<'a> {
    pub geometry: &'a LevelGeometry,
    /// Other occupied rectangles, such as boxes.
    pub obstacles: &'a [Rect],
    pub width: f32,
    pub height: f32,
}

impl SpawnArea<'_> {
    fn is_clear(&self, center: Vec2, half_extents: Vec2) -> bool {
        let aabb = Rect::from_center(center, half_extents);
        !self.geometry.overlaps_solid(&aabb) && !self.obstacles.iter().any(|r| r.overlaps(&aabb))
    }

    fn in_bounds_x(&self, x: f32) -> bool {
        x >= MARGIN && x <= self.width - MARGIN
    }

    fn in_bounds_y(&self, y: f32) -> bool {
        y >= MARGIN && y <= self.height - MARGIN
    }
}

/// Return `spawn` if a body of `half_extents` fits there. Otherwise search
/// upward, then sideways, then on rings of growing radius. Falls back to
/// `spawn` when nothing fits.
pub fn find_safe_spawn(spawn: Vec2, half_extents: Vec2, area: &SpawnArea<'_>) -> Vec2 {
    if area.is_clear(spawn, half_extents) {
        return spawn;
    }

    let up = UP_OFFSETS
        .iter()
        .map(|dy| Vec2::new(spawn.x, spawn.y - dy))
        .filter(|p| p.y >= MARGIN);
    let side = SIDE_OFFSETS
        .iter()
        .map(|dx| Vec2::new(spawn.x + dx, spawn.y))
        .filter(|p| area.in_bounds_x(p.x));
    let ring = RING_RADII
        .iter()
        .flat_map(|&r| {
            (0..8).map(move |i| {
                let angle = (i as f32 * RING_ANGLE_STEP_DEG).to_radians();
                spawn + Vec2::new(angle.cos(), angle.sin()) * r
            })
        })
        .filter(|p| area.in_bounds_x(p.x) && area.in_bounds_y(p.y));

    match up.chain(side).chain(ring).find(|&p| area.is_clear(p, half_extents)) {
        Some(found) => {
            log::warn!("spawn moved from {:?} to {:?} to avoid overlap", spawn, found);
            found
        }
        None => {
            log::warn!("no safe spawn near {:?}, keeping it", spawn);
            spawn
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF: Vec2 = Vec2::splat(15.0);

    #[test]
    fn clear_spawn_is_kept() {
        let geo = LevelGeometry::new().with_wall(Rect::new(0.0, 550.0, 800.0, 50.0));
        let area = SpawnArea { geometry: &geo, obstacles: &[], width: 800.0, height: 600.0 };
        let spawn = Vec2::new(100.0, 500.0);
        assert_eq!(find_safe_spawn(spawn, HALF, &area), spawn);
    }

    #[test]
    fn moves_up_out_of_platform() {
        let geo = LevelGeometry::new().with_wall(Rect::new(0.0, 480.0, 800.0, 40.0));
        let area = SpawnArea { geometry: &geo, obstacles: &[], width: 800.0, height: 600.0 };
        let found = find_safe_spawn(Vec2::new(200.0, 500.0), HALF, &area);
        assert_eq!(found, Vec2::new(200.0, 440.0));
    }

    #[test]
    fn moves_sideways_under_a_ceiling() {
        // A tall pillar blocks every upward candidate.
        let geo = LevelGeometry::new().with_wall(Rect::new(180.0, 0.0, 40.0, 600.0));
        let area = SpawnArea { geometry: &geo, obstacles: &[], width: 800.0, height: 600.0 };
        let found = find_safe_spawn(Vec2::new(200.0, 300.0), HALF, &area);
        assert_eq!(found, Vec2::new(120.0, 300.0));
    }

    #[test]
    fn avoids_obstacles() {
        let geo = LevelGeometry::new();
        let boxes = [Rect::new(180.0, 280.0, 40.0, 40.0)];
        let area = SpawnArea { geometry: &geo, obstacles: &boxes, width: 800.0, height: 600.0 };
        let found = find_safe_spawn(Vec2::new(200.0, 300.0), HALF, &area);
        assert_eq!(found, Vec2::new(200.0, 240.0));
    }

    #[test]
    fn keeps_requested_spawn_when_boxed_in() {
        let geo = LevelGeometry::new().with_wall(Rect::new(0.0, 0.0, 2000.0, 2000.0));
        let area = SpawnArea { geometry: &geo, obstacles: &[], width: 2000.0, height: 2000.0 };
        let spawn = Vec2::new(500.0, 500.0);
        assert_eq!(find_safe_spawn(spawn, HALF, &area), spawn);
    }
}
