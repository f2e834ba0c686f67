//! Portals and the two-slot registry that links them.
//!
//! Links are stored as the counterpart's slot, not as a pointer, so the
//! registry alone decides what a link resolves to. `PortalSlots` keeps
//! links symmetric: every placement or removal relinks both slots.

use glam::Vec2;

use crate::api::types::PortalKind;
use crate::core::body::Teleportable;
use crate::core::time::Countdown;

/// A placed portal.
#[derive(Debug, Clone, PartialEq)]
pub struct Portal {
    pub kind: PortalKind,
    pub position: Vec2,
    /// Unit normal pointing out of the surface the portal sits on.
    pub normal: Vec2,
    pub radius: f32,
    pub active: bool,
    linked: Option<PortalKind>,
    cooldown: Countdown,
}

impl Portal {
    pub fn new(kind: PortalKind, position: Vec2, normal: Vec2, radius: f32) -> Self {
        Self {
            kind,
            position,
            normal,
            radius,
            active: true,
            linked: None,
            cooldown: Countdown::default(),
        }
    }

    /// Slot of the portal this one is linked to.
    pub fn linked(&self) -> Option<PortalKind> {
        self.linked
    }

    pub fn teleport_ready(&self) -> bool {
        !self.cooldown.is_running()
    }

    /// Seconds left before `teleport_ready` comes back.
    pub fn cooldown_timer(&self) -> f32 {
        self.cooldown.remaining()
    }

    /// Would `candidate` be transferred by this portal right now?
    pub fn check_teleport<T: Teleportable + ?Sized>(&self, candidate: &T) -> bool {
        if !self.active || self.linked.is_none() || !self.teleport_ready() {
            return false;
        }
        if !candidate.is_eligible() {
            return false;
        }
        candidate.center().distance(self.position) < self.radius
    }

    pub fn enter_cooldown(&mut self, duration: f32) {
        self.cooldown.start(duration);
    }

    /// Count the cooldown down by one tick.
    pub fn tick(&mut self, dt: f32) {
        self.cooldown.tick(dt);
    }
}

/// The blue and orange portal slots.
#[derive(Debug, Clone, Default)]
pub struct PortalSlots {
    slots: [Option<Portal>; 2],
}

impl PortalSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: PortalKind) -> Option<&Portal> {
        self.slots[kind.index()].as_ref()
    }

    fn get_mut(&mut self, kind: PortalKind) -> Option<&mut Portal> {
        self.slots[kind.index()].as_mut()
    }

    /// Placed portals, blue first.
    pub fn iter(&self) -> impl Iterator<Item = &Portal> {
        self.slots.iter().flatten()
    }

    /// Put a new portal in its slot, discarding whatever was there, and link
    /// it to the other slot if that is occupied. Returns whether an old
    /// portal was replaced.
    pub fn place(&mut self, portal: Portal) -> bool {
        let kind = portal.kind;
        let replaced = self.slots[kind.index()].replace(portal).is_some();
        self.relink();
        if let Some(other) = self.get(kind.other()) {
            log::debug!("portal {:?} linked to {:?} at {:?}", kind, other.kind, other.position);
        }
        replaced
    }

    /// Empty a slot. The counterpart, if any, becomes unlinked.
    pub fn remove(&mut self, kind: PortalKind) -> Option<Portal> {
        let removed = self.slots[kind.index()].take();
        self.relink();
        removed
    }

    pub fn clear(&mut self) {
        self.slots = [None, None];
    }

    /// Both slots occupied and linked to each other.
    pub fn is_linked(&self) -> bool {
        matches!(
            (self.get(PortalKind::Blue), self.get(PortalKind::Orange)),
            (Some(b), Some(o)) if b.linked == Some(o.kind) && o.linked == Some(b.kind)
        )
    }

    /// Tick every placed portal's cooldown.
    pub fn tick(&mut self, dt: f32) {
        for portal in self.slots.iter_mut().flatten() {
            portal.tick(dt);
        }
    }

    /// Find the first portal that would transfer `candidate`, and the portal
    /// it comes out of. The exit must also be ready.
    pub fn find_transfer<T: Teleportable + ?Sized>(
        &self,
        candidate: &T,
    ) -> Option<(PortalKind, PortalKind)> {
        PortalKind::ALL.iter().find_map(|&kind| {
            let entry = self.get(kind)?;
            if !entry.check_teleport(candidate) {
                return None;
            }
            let exit = self.get(entry.linked?)?;
            exit.teleport_ready().then_some((kind, exit.kind))
        })
    }

    /// Put both ends of a transfer into cooldown.
    pub fn enter_cooldown(&mut self, entry: PortalKind, exit: PortalKind, duration: f32) {
        for kind in [entry, exit] {
            if let Some(portal) = self.get_mut(kind) {
                portal.enter_cooldown(duration);
            }
        }
    }

    fn relink(&mut self) {
        let both = self.slots.iter().all(Option::is_some);
        for kind in PortalKind::ALL {
            if let Some(portal) = self.get_mut(kind) {
                portal.linked = both.then_some(kind.other());
            }
        }
    }
}
