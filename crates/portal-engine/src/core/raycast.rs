use glam::Vec2;

use crate::core::geometry::{GeometryQuery, Rect, SurfaceKind};

/// Cap on samples per cast, whatever the step and range.
pub const MAX_RAY_STEPS: u32 = 4096;

/// Where a placement ray stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec2,
    /// Unit normal of the nearest face of the hit rectangle, pointing out of it.
    pub normal: Vec2,
    pub surface: SurfaceKind,
}

/// Fixed-step ray marcher used to place portals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastPlacer {
    step: f32,
}

impl RaycastPlacer {
    pub fn new(step: f32) -> Self {
        Self { step: step.max(f32::EPSILON) }
    }

    /// March from `origin` along `direction` (unit length) until a solid
    /// rectangle contains the sample point, `max_distance` is covered or
    /// `MAX_RAY_STEPS` samples were taken.
    ///
    /// Every sample asks non-portalable geometry first, so a blocking wall
    /// in front of a portalable one always wins.
    pub fn cast<G: GeometryQuery + ?Sized>(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        geometry: &G,
    ) -> Option<RayHit> {
        let samples = ((max_distance / self.step).ceil() as u32).min(MAX_RAY_STEPS);
        for i in 1..=samples {
            let point = origin + direction * (i as f32 * self.step);
            if let Some((rect, surface)) = geometry.surface_at(point) {
                return Some(RayHit {
                    point,
                    normal: outward_normal(&rect, point),
                    surface,
                });
            }
        }
        None
    }
}

/// Outward normal of the face of `rect` closest to `point`.
/// Ties resolve left, right, top, bottom.
pub fn outward_normal(rect: &Rect, point: Vec2) -> Vec2 {
    let faces = [
        ((point.x - rect.left()).abs(), Vec2::new(-1.0, 0.0)),
        ((point.x - rect.right()).abs(), Vec2::new(1.0, 0.0)),
        ((point.y - rect.top()).abs(), Vec2::new(0.0, -1.0)),
        ((point.y - rect.bottom()).abs(), Vec2::new(0.0, 1.0)),
    ];
    let mut best = faces[0];
    for face in &faces[1..] {
        if face.0 < best.0 {
            best = *face;
        }
    }
    best.1
}
