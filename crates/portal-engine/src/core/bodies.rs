use glam::Vec2;

use crate::api::config::SimConfig;
use crate::api::types::BodyId;
use crate::core::body::{BodyKind, KinematicBody};

/// Body storage using a flat Vec.
/// Handles are never reused within one set, so a stale `BodyId` simply
/// stops resolving once the set is cleared.
#[derive(Debug, Clone)]
pub struct BodySet {
    bodies: Vec<KinematicBody>,
    next_id: u32,
}

impl BodySet {
    pub fn new() -> Self {
        Self {
            bodies: Vec::with_capacity(16),
            next_id: 1,
        }
    }

    /// Create a body of `kind` centered at `position`. Returns its handle.
    pub fn spawn(&mut self, kind: BodyKind, position: Vec2, cfg: &SimConfig) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.bodies.push(KinematicBody::new(id, kind, position, cfg));
        id
    }

    pub fn get(&self, id: BodyId) -> Option<&KinematicBody> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut KinematicBody> {
        self.bodies.iter_mut().find(|b| b.id == id)
    }

    /// Bodies in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &KinematicBody> {
        self.bodies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut KinematicBody> {
        self.bodies.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Destroy every body. Handles keep counting up.
    pub fn clear(&mut self) {
        self.bodies.clear();
    }
}

impl Default for BodySet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_and_get() {
        let cfg = SimConfig::default();
        let mut set = BodySet::new();
        let id = set.spawn(BodyKind::Box, Vec2::new(10.0, 20.0), &cfg);
        let body = set.get(id).unwrap();
        assert_eq!(body.position, Vec2::new(10.0, 20.0));
        assert_eq!(body.half_extents, Vec2::splat(cfg.box_size * 0.5));
    }

    #[test]
    fn iterates_in_spawn_order() {
        let cfg = SimConfig::default();
        let mut set = BodySet::new();
        let a = set.spawn(BodyKind::Player, Vec2::ZERO, &cfg);
        let b = set.spawn(BodyKind::Box, Vec2::ZERO, &cfg);
        let c = set.spawn(BodyKind::Box, Vec2::ZERO, &cfg);
        let ids: Vec<_> = set.iter().map(|body| body.id).collect();
        assert_eq!(ids, vec![a, b, c]);
    }

    #[test]
    fn handles_are_not_reused_after_clear() {
        let cfg = SimConfig::default();
        let mut set = BodySet::new();
        let first = set.spawn(BodyKind::Player, Vec2::ZERO, &cfg);
        set.clear();
        assert!(set.is_empty());
        let second = set.spawn(BodyKind::Player, Vec2::ZERO, &cfg);
        assert_ne!(first, second);
        assert!(set.get(first).is_none());
        assert_eq!(set.len(), 1);
    }
}
