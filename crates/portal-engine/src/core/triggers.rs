//! Pressure switches and the goals they gate.

use std::collections::BTreeSet;

use crate::api::types::{BodyId, SwitchId};
use crate::core::geometry::Rect;

/// A pressure plate activated by any body resting on it.
#[derive(Debug, Clone)]
pub struct Switch {
    pub rect: Rect,
    pub active: bool,
    /// Once active, stays active for the rest of the level.
    pub latching: bool,
    pub deactivation_delay: f32,
    occupants: BTreeSet<BodyId>,
    pending_deactivation: f32,
}

impl Switch {
    pub fn new(rect: Rect, latching: bool, deactivation_delay: f32) -> Self {
        Self {
            rect,
            active: false,
            latching,
            deactivation_delay,
            occupants: BTreeSet::new(),
            pending_deactivation: 0.0,
        }
    }

    /// Bodies overlapping the plate as of the last update.
    pub fn occupants(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.occupants.iter().copied()
    }

    pub fn is_occupied(&self) -> bool {
        !self.occupants.is_empty()
    }

    /// Seconds the plate has been empty while still active.
    pub fn pending_deactivation(&self) -> f32 {
        self.pending_deactivation
    }

    /// Back to the unpressed state, latch included.
    pub fn reset(&mut self) {
        self.active = false;
        self.occupants.clear();
        self.pending_deactivation = 0.0;
    }

    /// Recompute occupancy from `bodies` and advance the deactivation timer.
    /// Returns the new state if the switch toggled this tick.
    pub fn update<I>(&mut self, dt: f32, bodies: I) -> Option<bool>
    where
        I: IntoIterator<Item = (BodyId, Rect)>,
    {
        self.occupants = bodies
            .into_iter()
            .filter(|(_, aabb)| aabb.overlaps(&self.rect))
            .map(|(id, _)| id)
            .collect();

        if self.is_occupied() {
            self.pending_deactivation = 0.0;
            if !self.active {
                self.active = true;
                return Some(true);
            }
            return None;
        }

        if !self.active || self.latching {
            return None;
        }
        self.pending_deactivation += dt;
        if self.pending_deactivation >= self.deactivation_delay {
            self.active = false;
            self.pending_deactivation = 0.0;
            return Some(false);
        }
        None
    }
}

/// The level exit. Opens once every required switch is active.
#[derive(Debug, Clone)]
pub struct Goal {
    pub rect: Rect,
    pub required_switches: Vec<SwitchId>,
}

impl Goal {
    pub fn new(rect: Rect, required_switches: Vec<SwitchId>) -> Self {
        Self { rect, required_switches }
    }

    /// True if no switch is required or all required switches are active.
    /// A reference to a missing switch counts as inactive.
    pub fn is_active(&self, switches: &[Switch]) -> bool {
        self.required_switches
            .iter()
            .all(|id| switches.get(id.0).is_some_and(|s| s.active))
    }

    /// Is the goal open and touched by `aabb`?
    pub fn check_win(&self, switches: &[Switch], aabb: &Rect) -> bool {
        self.is_active(switches) && self.rect.overlaps(aabb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.25;

    fn plate(latching: bool) -> Switch {
        Switch::new(Rect::new(0.0, 0.0, 50.0, 25.0), latching, 1.0)
    }

    fn on_plate() -> Vec<(BodyId, Rect)> {
        vec![(BodyId(1), Rect::new(10.0, -20.0, 30.0, 30.0))]
    }

    fn off_plate() -> Vec<(BodyId, Rect)> {
        vec![(BodyId(1), Rect::new(200.0, -20.0, 30.0, 30.0))]
    }

    #[test]
    fn activates_on_first_occupant() {
        let mut s = plate(false);
        assert_eq!(s.update(DT, on_plate()), Some(true));
        assert!(s.active);
        assert_eq!(s.occupants().collect::<Vec<_>>(), vec![BodyId(1)]);
        assert_eq!(s.update(DT, on_plate()), None);
    }

    #[test]
    fn deactivates_after_delay() {
        let mut s = plate(false);
        s.update(DT, on_plate());
        for _ in 0..3 {
            assert_eq!(s.update(DT, off_plate()), None);
            assert!(s.active);
        }
        assert_eq!(s.update(DT, off_plate()), Some(false));
        assert!(!s.active);
    }

    #[test]
    fn reoccupying_resets_pending_timer() {
        let mut s = plate(false);
        s.update(DT, on_plate());
        s.update(DT, off_plate());
        s.update(DT, off_plate());
        s.update(DT, on_plate());
        assert_eq!(s.pending_deactivation(), 0.0);
        for _ in 0..3 {
            s.update(DT, off_plate());
        }
        assert!(s.active);
    }

    #[test]
    fn latching_switch_never_deactivates() {
        let mut s = plate(true);
        s.update(DT, on_plate());
        for _ in 0..100 {
            assert_eq!(s.update(DT, off_plate()), None);
            assert!(s.active);
        }
    }

    #[test]
    fn reset_releases_a_latched_plate() {
        let mut s = plate(true);
        s.update(DT, on_plate());
        s.reset();
        assert!(!s.active);
        assert!(!s.is_occupied());
        assert_eq!(s.update(DT, on_plate()), Some(true));
    }

    #[test]
    fn goal_gating() {
        let mut switches = vec![plate(false), plate(false)];
        let open = Goal::new(Rect::new(0.0, 0.0, 60.0, 60.0), Vec::new());
        assert!(open.is_active(&switches));

        let gated = Goal::new(Rect::new(0.0, 0.0, 60.0, 60.0), vec![SwitchId(0), SwitchId(1)]);
        switches[0].active = true;
        assert!(!gated.is_active(&switches));
        switches[1].active = true;
        assert!(gated.is_active(&switches));

        let dangling = Goal::new(Rect::new(0.0, 0.0, 60.0, 60.0), vec![SwitchId(9)]);
        assert!(!dangling.is_active(&switches));
    }

    #[test]
    fn win_needs_overlap_and_open_goal() {
        let switches = vec![plate(false)];
        let goal = Goal::new(Rect::new(100.0, 100.0, 60.0, 60.0), vec![SwitchId(0)]);
        let touching = Rect::new(120.0, 120.0, 30.0, 30.0);
        assert!(!goal.check_win(&switches, &touching));

        let open = Goal::new(goal.rect, Vec::new());
        assert!(open.check_win(&switches, &touching));
        assert!(!open.check_win(&switches, &Rect::new(0.0, 0.0, 30.0, 30.0)));
    }
}
