//! Level geometry: solid rectangles and the query interface the core runs against.
//!
//! Rectangles are stored by top-left corner and size, Y pointing down.
//! Point containment is half-open: the left and top edges are inside, the
//! right and bottom edges are not.

use glam::Vec2;

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle centered on `center` with the given half-extents.
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            x: center.x - half_extents.x,
            y: center.y - half_extents.y,
            w: half_extents.x * 2.0,
            h: half_extents.y * 2.0,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }

    /// Strict overlap: rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

/// Classification of a solid surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Accepts portals.
    Normal,
    /// Blocks placement entirely.
    NonPortalable,
}

/// The questions the simulation asks about level geometry.
pub trait GeometryQuery {
    /// Is the point inside any solid rectangle?
    fn is_solid(&self, point: Vec2) -> bool;

    /// The solid rectangle containing `point`, if any, with its surface kind.
    /// Non-portalable geometry wins when both kinds contain the point.
    fn surface_at(&self, point: Vec2) -> Option<(Rect, SurfaceKind)>;
}

/// Static level geometry partitioned into portalable and non-portalable walls.
#[derive(Debug, Clone, Default)]
pub struct LevelGeometry {
    walls: Vec<Rect>,
    non_portalable: Vec<Rect>,
}

impl LevelGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a wall that accepts portals.
    pub fn add_wall(&mut self, rect: Rect) {
        self.walls.push(rect);
    }

    /// Add a wall that blocks portal placement.
    pub fn add_non_portalable(&mut self, rect: Rect) {
        self.non_portalable.push(rect);
    }

    pub fn with_wall(mut self, rect: Rect) -> Self {
        self.add_wall(rect);
        self
    }

    pub fn with_non_portalable(mut self, rect: Rect) -> Self {
        self.add_non_portalable(rect);
        self
    }

    pub fn walls(&self) -> &[Rect] {
        &self.walls
    }

    pub fn non_portalable_walls(&self) -> &[Rect] {
        &self.non_portalable
    }

    /// Every solid rectangle regardless of kind.
    pub fn solids(&self) -> impl Iterator<Item = &Rect> {
        self.walls.iter().chain(self.non_portalable.iter())
    }

    /// Does `rect` overlap any solid rectangle?
    pub fn overlaps_solid(&self, rect: &Rect) -> bool {
        self.solids().any(|wall| wall.overlaps(rect))
    }
}

impl GeometryQuery for LevelGeometry {
    fn is_solid(&self, point: Vec2) -> bool {
        self.solids().any(|wall| wall.contains(point))
    }

    fn surface_at(&self, point: Vec2) -> Option<(Rect, SurfaceKind)> {
        if let Some(wall) = self.non_portalable.iter().find(|w| w.contains(point)) {
            return Some((*wall, SurfaceKind::NonPortalable));
        }
        self.walls
            .iter()
            .find(|w| w.contains(point))
            .map(|wall| (*wall, SurfaceKind::Normal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_is_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Vec2::new(0.0, 0.0)));
        assert!(r.contains(Vec2::new(9.99, 9.99)));
        assert!(!r.contains(Vec2::new(10.0, 5.0)));
        assert!(!r.contains(Vec2::new(5.0, 10.0)));
    }

    #[test]
    fn touching_rects_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let c = Rect::new(9.0, 9.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn from_center_round_trips_center() {
        let r = Rect::from_center(Vec2::new(100.0, 50.0), Vec2::new(15.0, 20.0));
        assert_eq!(r, Rect::new(85.0, 30.0, 30.0, 40.0));
        assert_eq!(r.center(), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn non_portalable_wins_surface_lookup() {
        let geo = LevelGeometry::new()
            .with_wall(Rect::new(0.0, 0.0, 100.0, 100.0))
            .with_non_portalable(Rect::new(40.0, 40.0, 20.0, 20.0));

        let (_, kind) = geo.surface_at(Vec2::new(50.0, 50.0)).unwrap();
        assert_eq!(kind, SurfaceKind::NonPortalable);
        let (rect, kind) = geo.surface_at(Vec2::new(10.0, 10.0)).unwrap();
        assert_eq!(kind, SurfaceKind::Normal);
        assert_eq!(rect.w, 100.0);
        assert!(geo.surface_at(Vec2::new(150.0, 10.0)).is_none());
    }

    #[test]
    fn is_solid_covers_both_kinds() {
        let geo = LevelGeometry::new()
            .with_wall(Rect::new(0.0, 0.0, 10.0, 10.0))
            .with_non_portalable(Rect::new(20.0, 0.0, 10.0, 10.0));
        assert!(geo.is_solid(Vec2::new(5.0, 5.0)));
        assert!(geo.is_solid(Vec2::new(25.0, 5.0)));
        assert!(!geo.is_solid(Vec2::new(15.0, 5.0)));
        assert!(geo.overlaps_solid(&Rect::new(8.0, 8.0, 4.0, 4.0)));
    }
}
