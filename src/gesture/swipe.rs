use log::debug;
use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use super::{GestureAction, Vector2};

/// Per-axis multipliers turning the configured threshold into device units.
/// Touchpads report roughly twice the resolution horizontally.
pub const SWIPE_X_SCALE: f64 = 1_000.0;
pub const SWIPE_Y_SCALE: f64 = 500.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwipeSettings {
    pub threshold: f64,
    pub one_shot: bool,
    pub trigger_on_release: bool,
}

impl Default for SwipeSettings {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            one_shot: true,
            trigger_on_release: true,
        }
    }
}

/// State of the native swipe currently in progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwipeGesture {
    pub fingers: u32,
    pub delta: Vector2,
    pub fired: bool,
    pub step: u32,
}

impl Default for SwipeGesture {
    fn default() -> Self {
        Self {
            fingers: 0,
            delta: Vector2::ZERO,
            fired: false,
            step: 1,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum SwipeHsmEvent {
    Begin { fingers: u32 },
    Update { dx: f64, dy: f64 },
    End,
    Cancel,
}

#[derive(Clone, Copy, Debug, Default)]
struct DispatchContext {
    action: Option<GestureAction>,
}

impl DispatchContext {
    fn emit(&mut self, action: GestureAction) {
        self.action = Some(action);
    }

    fn finish(self) -> Option<GestureAction> {
        self.action
    }
}

/// Accumulates native multi-finger swipe deltas and decides when they fire.
pub struct SwipeTracker {
    machine: statig::blocking::StateMachine<SwipeHsm>,
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(SwipeSettings::default())
    }
}

impl SwipeTracker {
    pub fn new(settings: SwipeSettings) -> Self {
        Self {
            machine: SwipeHsm::new(settings).state_machine(),
        }
    }

    pub fn begin(&mut self, fingers: u32) {
        // Begin never fires.
        let _ = self.dispatch(SwipeHsmEvent::Begin { fingers });
    }

    pub fn update(&mut self, dx: f64, dy: f64) -> Option<GestureAction> {
        self.dispatch(SwipeHsmEvent::Update { dx, dy })
    }

    pub fn end(&mut self) -> Option<GestureAction> {
        self.dispatch(SwipeHsmEvent::End)
    }

    /// Ends the gesture without the release trigger.
    pub fn cancel(&mut self) {
        let _ = self.dispatch(SwipeHsmEvent::Cancel);
    }

    pub fn gesture(&self) -> &SwipeGesture {
        &self.machine.gesture
    }

    pub fn settings(&self) -> &SwipeSettings {
        &self.machine.settings
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.machine.state(), State::Idle { .. })
    }

    fn dispatch(&mut self, event: SwipeHsmEvent) -> Option<GestureAction> {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&event, &mut context);
        context.finish()
    }
}

struct SwipeHsm {
    settings: SwipeSettings,
    gesture: SwipeGesture,
}

impl SwipeHsm {
    fn new(settings: SwipeSettings) -> Self {
        Self {
            settings,
            gesture: SwipeGesture::default(),
        }
    }

    fn begin(&mut self, fingers: u32) {
        self.gesture = SwipeGesture {
            fingers,
            ..SwipeGesture::default()
        };
    }

    fn reset(&mut self) {
        self.gesture = SwipeGesture::default();
    }

    fn axis_thresholds(&self) -> (f64, f64) {
        let scaled = self.settings.threshold * f64::from(self.gesture.step);
        (scaled * SWIPE_X_SCALE, scaled * SWIPE_Y_SCALE)
    }

    /// Returns true when this update crossed the current boundary.
    fn accumulate(&mut self, context: &mut DispatchContext, dx: f64, dy: f64) -> bool {
        self.gesture.delta.accumulate(dx, dy);

        let (threshold_x, threshold_y) = self.axis_thresholds();
        let delta = self.gesture.delta;
        if delta.dx.abs() > threshold_x || delta.dy.abs() > threshold_y {
            self.fire(context);
            self.gesture.fired = true;
            self.gesture.step = self.gesture.step.saturating_add(1);
            true
        } else {
            false
        }
    }

    fn fire(&self, context: &mut DispatchContext) {
        let direction = self.gesture.delta.direction();
        debug!(
            "swipe: fire direction={} fingers={} step={} dx={:.1} dy={:.1}",
            direction,
            self.gesture.fingers,
            self.gesture.step,
            self.gesture.delta.dx,
            self.gesture.delta.dy
        );
        context.emit(GestureAction::Swipe {
            direction,
            fingers: self.gesture.fingers,
        });
    }
}

#[state_machine(initial = "State::idle()")]
impl SwipeHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &SwipeHsmEvent) -> Outcome<State> {
        let _ = context;
        match event {
            SwipeHsmEvent::Begin { fingers } => {
                self.begin(*fingers);
                Transition(State::accumulating())
            }
            // Updates and ends without a begin belong to a gesture we never saw start.
            SwipeHsmEvent::Update { .. } | SwipeHsmEvent::End | SwipeHsmEvent::Cancel => {
                Handled
            }
        }
    }

    #[state]
    fn accumulating(
        &mut self,
        context: &mut DispatchContext,
        event: &SwipeHsmEvent,
    ) -> Outcome<State> {
        match event {
            SwipeHsmEvent::Begin { fingers } => {
                self.begin(*fingers);
                Handled
            }
            SwipeHsmEvent::Update { dx, dy } => {
                if self.accumulate(context, *dx, *dy) {
                    Transition(State::fired())
                } else {
                    Handled
                }
            }
            SwipeHsmEvent::End => {
                if self.settings.trigger_on_release {
                    self.fire(context);
                }
                self.reset();
                Transition(State::idle())
            }
            SwipeHsmEvent::Cancel => {
                debug!("swipe: cancelled before firing");
                self.reset();
                Transition(State::idle())
            }
        }
    }

    #[state]
    fn fired(&mut self, context: &mut DispatchContext, event: &SwipeHsmEvent) -> Outcome<State> {
        match event {
            SwipeHsmEvent::Begin { fingers } => {
                self.begin(*fingers);
                Transition(State::accumulating())
            }
            SwipeHsmEvent::Update { dx, dy } => {
                if !self.settings.one_shot {
                    self.accumulate(context, *dx, *dy);
                }
                Handled
            }
            SwipeHsmEvent::End | SwipeHsmEvent::Cancel => {
                self.reset();
                Transition(State::idle())
            }
        }
    }
}
