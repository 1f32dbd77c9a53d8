//! Gesture classification and triggering.
//!
//! Everything in here is synchronous and infallible: trackers consume one
//! event at a time and hand back at most one [`GestureAction`]. Noisy or
//! incoherent input drops the gesture outcome instead of failing, and every
//! tracker returns to its default state once its gesture is over.

mod direction;
mod pinch;
mod router;
mod swipe;
mod touch;

pub use direction::{classify, Direction, OBLIQUE_RATIO};
pub use pinch::{PinchGesture, PinchKind, PinchSettings, PinchTracker, DEFAULT_SCALE};
pub use router::{DeviceCapabilities, EventFamily, EventRouter, FamilySelection, InputEvent};
pub use swipe::{SwipeGesture, SwipeSettings, SwipeTracker, SWIPE_X_SCALE, SWIPE_Y_SCALE};
pub use touch::{TouchContact, TouchSession, TouchSynchronizer, TOUCH_SYNC_THRESHOLD_MS};

/// Displacement in device units. Screen convention: positive `dy` points down.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2 {
    pub dx: f64,
    pub dy: f64,
}

impl Vector2 {
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn accumulate(&mut self, dx: f64, dy: f64) {
        self.dx += dx;
        self.dy += dy;
    }

    pub fn direction(self) -> Direction {
        classify(self.dx, self.dy)
    }
}

/// A decided gesture outcome, ready for command resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureAction {
    Swipe { direction: Direction, fingers: u32 },
    Pinch(PinchKind),
}

/// Policy knobs for both native gesture trackers.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TrackerSettings {
    pub swipe: SwipeSettings,
    pub pinch: PinchSettings,
}
