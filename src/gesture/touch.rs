use std::collections::BTreeMap;

use log::debug;

use super::{Direction, GestureAction, Vector2};

/// Largest gap between consecutive finger downs (or lifts) of one gesture.
/// Touch timestamps are in milliseconds.
pub const TOUCH_SYNC_THRESHOLD_MS: u64 = 100;

/// One finger of the current touch session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchContact {
    pub slot: i32,
    pub down_ms: u64,
    pub up_ms: Option<u64>,
    /// Last absolute position; `None` until the first motion sample.
    pub position: Option<Vector2>,
    pub delta: Vector2,
}

impl TouchContact {
    fn new(slot: i32, down_ms: u64) -> Self {
        Self {
            slot,
            down_ms,
            up_ms: None,
            position: None,
            delta: Vector2::ZERO,
        }
    }

    pub fn is_down(&self) -> bool {
        self.up_ms.is_none()
    }

    pub fn has_motion(&self) -> bool {
        self.position.is_some()
    }

    fn record_motion(&mut self, x: f64, y: f64) {
        if let Some(previous) = self.position {
            self.delta.accumulate(x - previous.dx, y - previous.dy);
        }
        self.position = Some(Vector2::new(x, y));
    }
}

/// Contacts touched since the last fully released gesture.
#[derive(Clone, Debug, PartialEq)]
pub struct TouchSession {
    contacts: BTreeMap<i32, TouchContact>,
    down_times: Vec<u64>,
    up_times: Vec<u64>,
    clean: bool,
    fingers: u32,
}

impl Default for TouchSession {
    fn default() -> Self {
        Self {
            contacts: BTreeMap::new(),
            down_times: Vec::new(),
            up_times: Vec::new(),
            clean: true,
            fingers: 0,
        }
    }
}

impl TouchSession {
    pub fn contacts(&self) -> impl Iterator<Item = &TouchContact> {
        self.contacts.values()
    }

    pub fn is_clean(&self) -> bool {
        self.clean
    }

    pub fn fingers(&self) -> u32 {
        self.fingers
    }

    pub fn down_count(&self) -> usize {
        self.down_times.len()
    }

    pub fn up_count(&self) -> usize {
        self.up_times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.down_times.is_empty()
    }

    fn mark_unclean(&mut self, reason: &str) {
        if self.clean {
            debug!("touch: session rejected: {reason}");
        }
        self.clean = false;
    }

    /// Reset in place, keeping allocations for the next gesture.
    fn clear(&mut self) {
        self.contacts.clear();
        self.down_times.clear();
        self.up_times.clear();
        self.clean = true;
        self.fingers = 0;
    }
}

/// Rebuilds a multi-finger swipe from independent touch contacts.
#[derive(Debug, Default)]
pub struct TouchSynchronizer {
    session: TouchSession,
}

impl TouchSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &TouchSession {
        &self.session
    }

    pub fn on_down(&mut self, slot: i32, time_ms: u64) {
        // A slot touching again before the session resolves keeps its down
        // event counted but loses the earlier motion.
        self.session
            .contacts
            .insert(slot, TouchContact::new(slot, time_ms));
        self.session.down_times.push(time_ms);
        self.check_synchrony(Edge::Down);
    }

    pub fn on_motion(&mut self, slot: i32, x: f64, y: f64) {
        match self.session.contacts.get_mut(&slot) {
            Some(contact) if contact.is_down() => contact.record_motion(x, y),
            _ => debug!("touch: motion for untracked slot {slot} ignored"),
        }
    }

    pub fn on_up(&mut self, slot: i32, time_ms: u64) -> Option<GestureAction> {
        match self.session.contacts.get_mut(&slot) {
            Some(contact) if contact.is_down() => contact.up_ms = Some(time_ms),
            _ => {
                // Lifts we never saw land (e.g. started before us) would
                // unbalance the down/up count forever.
                debug!("touch: lift for untracked slot {slot} ignored");
                return None;
            }
        }
        self.session.up_times.push(time_ms);
        self.check_synchrony(Edge::Up);

        if self.session.up_count() == self.session.down_count() {
            let action = self.resolve();
            self.session.clear();
            action
        } else {
            None
        }
    }

    fn check_synchrony(&mut self, edge: Edge) {
        let session = &mut self.session;
        let times = match edge {
            Edge::Down => &session.down_times,
            Edge::Up => &session.up_times,
        };
        if !session.clean || times.len() < 2 {
            return;
        }

        let count = times.len();
        let gap = times[count - 1].saturating_sub(times[count - 2]);
        if gap <= TOUCH_SYNC_THRESHOLD_MS {
            session.fingers = count as u32;
        } else {
            session.mark_unclean(match edge {
                Edge::Down => "finger added too late",
                Edge::Up => "finger lifted too late",
            });
        }
    }

    fn resolve(&mut self) -> Option<GestureAction> {
        let session = &mut self.session;

        let mut direction = None;
        let mut disagree = false;
        let mut moved = 0usize;
        for contact in session.contacts.values().filter(|c| c.has_motion()) {
            let current = contact.delta.direction();
            debug!(
                "touch: slot {} moved dx={:.2} dy={:.2} direction={}",
                contact.slot, contact.delta.dx, contact.delta.dy, current
            );
            disagree |= direction.is_some_and(|previous: Direction| previous != current);
            direction = Some(current);
            moved += 1;
        }

        if disagree {
            session.mark_unclean("fingers disagree on direction");
        }
        if moved != session.down_count() {
            session.mark_unclean("finger without motion");
        }

        debug!(
            "touch: session finished clean={} fingers={} downs={} ups={} moved={}",
            session.clean,
            session.fingers,
            session.down_count(),
            session.up_count(),
            moved
        );

        match direction {
            Some(direction) if session.clean && session.fingers >= 2 => {
                Some(GestureAction::Swipe {
                    direction,
                    fingers: session.fingers,
                })
            }
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Edge {
    Down,
    Up,
}

#[cfg(test)]
mod tests;
