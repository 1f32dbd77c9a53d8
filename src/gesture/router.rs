use log::{debug, info};

use super::{GestureAction, PinchTracker, SwipeTracker, TouchSynchronizer, TrackerSettings};

/// Which low-level events drive swipes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventFamily {
    /// Native multi-finger gestures reported by the touchpad driver.
    Gesture,
    /// Independent touch contacts, synchronized into swipes here.
    Touch,
}

/// How the router settles on an [`EventFamily`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FamilySelection {
    /// Pick from device capabilities as devices show up.
    #[default]
    Auto,
    Fixed(EventFamily),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeviceCapabilities {
    pub gesture: bool,
    pub touch: bool,
}

/// One record from the event source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    DeviceAdded(DeviceCapabilities),
    SwipeBegin { fingers: u32 },
    SwipeUpdate { fingers: u32, dx: f64, dy: f64 },
    SwipeEnd { fingers: u32, cancelled: bool },
    PinchBegin { fingers: u32 },
    PinchUpdate { fingers: u32, scale: f64 },
    /// `scale` is `None` when the source does not repeat it on end.
    PinchEnd {
        fingers: u32,
        scale: Option<f64>,
        cancelled: bool,
    },
    TouchDown { slot: i32, time_ms: u64, x: f64, y: f64 },
    TouchMotion { slot: i32, time_ms: u64, x: f64, y: f64 },
    TouchUp { slot: i32, time_ms: u64 },
    /// Anything the trackers do not consume.
    Ignored,
}

/// Feeds events to the tracker responsible for them.
pub struct EventRouter {
    selection: FamilySelection,
    family: Option<EventFamily>,
    swipe: SwipeTracker,
    pinch: PinchTracker,
    touch: TouchSynchronizer,
    last_pinch_scale: f64,
}

impl EventRouter {
    pub fn new(settings: TrackerSettings, selection: FamilySelection) -> Self {
        let family = match selection {
            FamilySelection::Auto => None,
            FamilySelection::Fixed(family) => Some(family),
        };
        Self {
            selection,
            family,
            swipe: SwipeTracker::new(settings.swipe),
            pinch: PinchTracker::new(settings.pinch),
            touch: TouchSynchronizer::new(),
            last_pinch_scale: super::DEFAULT_SCALE,
        }
    }

    pub fn family(&self) -> Option<EventFamily> {
        self.family
    }

    pub fn swipe(&self) -> &SwipeTracker {
        &self.swipe
    }

    pub fn pinch(&self) -> &PinchTracker {
        &self.pinch
    }

    pub fn touch(&self) -> &TouchSynchronizer {
        &self.touch
    }

    pub fn dispatch(&mut self, event: &InputEvent) -> Option<GestureAction> {
        match *event {
            InputEvent::DeviceAdded(capabilities) => {
                self.observe_device(capabilities);
                None
            }
            InputEvent::SwipeBegin { fingers } if self.uses(EventFamily::Gesture) => {
                self.swipe.begin(fingers);
                None
            }
            InputEvent::SwipeUpdate { dx, dy, .. } if self.uses(EventFamily::Gesture) => {
                self.swipe.update(dx, dy)
            }
            InputEvent::SwipeEnd { cancelled, .. } if self.uses(EventFamily::Gesture) => {
                if cancelled {
                    self.swipe.cancel();
                    None
                } else {
                    self.swipe.end()
                }
            }
            InputEvent::PinchBegin { fingers } => {
                self.last_pinch_scale = super::DEFAULT_SCALE;
                self.pinch.begin(fingers);
                None
            }
            InputEvent::PinchUpdate { scale, .. } => {
                self.last_pinch_scale = scale;
                self.pinch.update(scale)
            }
            InputEvent::PinchEnd { scale, cancelled, .. } => {
                let scale = scale.unwrap_or(self.last_pinch_scale);
                self.last_pinch_scale = super::DEFAULT_SCALE;
                if cancelled {
                    self.pinch.cancel();
                    None
                } else {
                    self.pinch.end(scale)
                }
            }
            // Displacement starts at the first motion sample, not at the down position.
            InputEvent::TouchDown { slot, time_ms, .. } if self.uses(EventFamily::Touch) => {
                self.touch.on_down(slot, time_ms);
                None
            }
            InputEvent::TouchMotion { slot, x, y, .. } if self.uses(EventFamily::Touch) => {
                self.touch.on_motion(slot, x, y);
                None
            }
            InputEvent::TouchUp { slot, time_ms } if self.uses(EventFamily::Touch) => {
                self.touch.on_up(slot, time_ms)
            }
            _ => None,
        }
    }

    fn uses(&self, family: EventFamily) -> bool {
        self.family == Some(family)
    }

    // Gesture-capable devices win over touchscreens; a fixed family never changes.
    fn observe_device(&mut self, capabilities: DeviceCapabilities) {
        if self.selection != FamilySelection::Auto || self.family == Some(EventFamily::Gesture) {
            return;
        }
        let detected = if capabilities.gesture {
            Some(EventFamily::Gesture)
        } else if capabilities.touch {
            Some(EventFamily::Touch)
        } else {
            None
        };
        if let Some(family) = detected {
            if self.family != Some(family) {
                info!("router: using {family:?} events");
                self.family = Some(family);
            }
        } else {
            debug!("router: device without gesture or touch capability");
        }
    }
}
