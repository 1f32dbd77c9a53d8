use core::fmt;

use log::debug;

use super::GestureAction;

/// Scale reported when the fingers have not moved relative to each other.
pub const DEFAULT_SCALE: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PinchKind {
    /// Scale grew past the boundary.
    In,
    /// Scale shrank past the boundary.
    Out,
}

impl fmt::Display for PinchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => f.write_str("pinch_in"),
            Self::Out => f.write_str("pinch_out"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchSettings {
    pub threshold: f64,
    pub one_shot: bool,
}

impl Default for PinchSettings {
    fn default() -> Self {
        Self {
            threshold: 0.25,
            one_shot: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchGesture {
    pub fingers: u32,
    pub scale: f64,
    pub fired: bool,
    /// Signed ladder position: positive after growing crossings, negative
    /// after shrinking ones, 0 when cleared.
    pub step: i32,
}

impl Default for PinchGesture {
    fn default() -> Self {
        Self {
            fingers: 0,
            scale: DEFAULT_SCALE,
            fired: false,
            step: 0,
        }
    }
}

#[derive(Debug, Default)]
pub struct PinchTracker {
    settings: PinchSettings,
    gesture: PinchGesture,
}

impl PinchTracker {
    pub fn new(settings: PinchSettings) -> Self {
        Self {
            settings,
            gesture: PinchGesture::default(),
        }
    }

    pub fn gesture(&self) -> &PinchGesture {
        &self.gesture
    }

    pub fn settings(&self) -> &PinchSettings {
        &self.settings
    }

    pub fn begin(&mut self, fingers: u32) {
        self.gesture = PinchGesture {
            fingers,
            ..PinchGesture::default()
        };
    }

    pub fn update(&mut self, scale: f64) -> Option<GestureAction> {
        let kind = if self.settings.one_shot {
            self.one_shot(scale)
        } else {
            self.continuous(scale)
        };
        self.gesture.scale = scale;

        kind.map(|kind| {
            debug!(
                "pinch: fire kind={} scale={:.3} step={} fingers={}",
                kind, scale, self.gesture.step, self.gesture.fingers
            );
            GestureAction::Pinch(kind)
        })
    }

    /// Ends the gesture. The final scale is evaluated like one more update
    /// before the reset.
    pub fn end(&mut self, scale: f64) -> Option<GestureAction> {
        let action = self.update(scale);
        self.gesture = PinchGesture::default();
        action
    }

    /// Drops the gesture without a final evaluation.
    pub fn cancel(&mut self) {
        self.gesture = PinchGesture::default();
    }

    // The shrinking branch tests the tracked scale, not the new one.
    fn one_shot(&mut self, scale: f64) -> Option<PinchKind> {
        if self.gesture.fired {
            return None;
        }

        let threshold = self.settings.threshold;
        let kind = if scale > self.gesture.scale {
            (scale > DEFAULT_SCALE + threshold).then_some(PinchKind::In)
        } else {
            (self.gesture.scale < DEFAULT_SCALE - threshold).then_some(PinchKind::Out)
        };
        if kind.is_some() {
            self.gesture.fired = true;
        }
        kind
    }

    fn continuous(&mut self, scale: f64) -> Option<PinchKind> {
        let threshold = self.settings.threshold;
        if scale > self.gesture.scale {
            let step = self.gesture.step.max(1);
            if scale >= DEFAULT_SCALE + threshold * f64::from(step) {
                self.gesture.step = step + 1;
                return Some(PinchKind::In);
            }
        } else {
            let step = (-self.gesture.step).max(1);
            if scale <= DEFAULT_SCALE - threshold * f64::from(step) {
                self.gesture.step = -(step + 1);
                return Some(PinchKind::Out);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(one_shot: bool) -> PinchTracker {
        PinchTracker::new(PinchSettings {
            threshold: 0.25,
            one_shot,
        })
    }

    fn feed(tracker: &mut PinchTracker, scales: &[f64]) -> Vec<Option<PinchKind>> {
        scales
            .iter()
            .map(|&scale| {
                tracker.update(scale).map(|action| match action {
                    GestureAction::Pinch(kind) => kind,
                    other => panic!("unexpected action {other:?}"),
                })
            })
            .collect()
    }

    #[test]
    fn one_shot_growth_fires_pinch_in_once() {
        let mut pinch = tracker(true);
        pinch.begin(2);

        assert_eq!(feed(&mut pinch, &[1.0, 1.3]), [None, Some(PinchKind::In)]);
        assert!(feed(&mut pinch, &[1.6, 2.0]).iter().all(Option::is_none));
        assert_eq!(pinch.end(2.0), None);
    }

    #[test]
    fn one_shot_waits_for_threshold() {
        let mut pinch = tracker(true);
        pinch.begin(2);

        assert_eq!(
            feed(&mut pinch, &[1.0, 1.1, 1.3]),
            [None, None, Some(PinchKind::In)]
        );
    }

    #[test]
    fn one_shot_shrink_fires_pinch_out_once() {
        let mut pinch = tracker(true);
        pinch.begin(2);

        // The 0.7 sample only becomes the tracked scale after it is processed,
        // so the decision lands on the next evaluation: here the end event.
        assert!(feed(&mut pinch, &[1.0, 0.7]).iter().all(Option::is_none));
        assert_eq!(pinch.end(0.7), Some(GestureAction::Pinch(PinchKind::Out)));
    }

    #[test]
    fn one_shot_shrink_fires_on_following_update() {
        let mut pinch = tracker(true);
        pinch.begin(2);

        assert_eq!(
            feed(&mut pinch, &[0.9, 0.7, 0.65, 0.5]),
            [None, None, Some(PinchKind::Out), None]
        );
        assert_eq!(pinch.end(0.5), None);
    }

    #[test]
    fn one_shot_scale_is_tracked_even_when_fired() {
        let mut pinch = tracker(true);
        pinch.begin(2);
        feed(&mut pinch, &[1.4, 1.2]);

        assert!(pinch.gesture().fired);
        assert_eq!(pinch.gesture().scale, 1.2);
    }

    #[test]
    fn continuous_growth_fires_at_each_boundary() {
        let mut pinch = tracker(false);
        pinch.begin(2);

        assert_eq!(
            feed(&mut pinch, &[1.1, 1.26, 1.4, 1.51, 1.6, 1.75]),
            [
                None,
                Some(PinchKind::In),
                None,
                Some(PinchKind::In),
                None,
                Some(PinchKind::In)
            ]
        );
        assert_eq!(pinch.gesture().step, 4);
    }

    #[test]
    fn continuous_shrink_fires_at_each_boundary() {
        let mut pinch = tracker(false);
        pinch.begin(2);

        assert_eq!(
            feed(&mut pinch, &[0.9, 0.74, 0.6, 0.5]),
            [None, Some(PinchKind::Out), None, Some(PinchKind::Out)]
        );
        assert_eq!(pinch.gesture().step, -3);
    }

    #[test]
    fn continuous_reversal_restarts_on_other_side() {
        let mut pinch = tracker(false);
        pinch.begin(2);

        assert_eq!(
            feed(&mut pinch, &[1.3, 1.0, 0.8, 0.7]),
            [Some(PinchKind::In), None, None, Some(PinchKind::Out)]
        );
        assert_eq!(pinch.gesture().step, -2);
    }

    #[test]
    fn continuous_end_inside_boundaries_does_not_fire() {
        let mut pinch = tracker(false);
        pinch.begin(2);
        feed(&mut pinch, &[1.1]);

        assert_eq!(pinch.end(1.1), None);
    }

    #[test]
    fn continuous_end_evaluates_final_scale() {
        let mut pinch = tracker(false);
        pinch.begin(2);

        assert_eq!(feed(&mut pinch, &[1.1, 1.2]), [None, None]);
        assert_eq!(pinch.end(0.7), Some(GestureAction::Pinch(PinchKind::Out)));
        assert_eq!(pinch.gesture(), &PinchGesture::default());
    }

    #[test]
    fn continuous_end_on_growing_side_uses_next_rung() {
        let mut pinch = tracker(false);
        pinch.begin(2);

        assert_eq!(feed(&mut pinch, &[1.3]), [Some(PinchKind::In)]);
        assert_eq!(pinch.end(1.4), None);

        pinch.begin(2);
        assert_eq!(feed(&mut pinch, &[1.3]), [Some(PinchKind::In)]);
        assert_eq!(pinch.end(1.55), Some(GestureAction::Pinch(PinchKind::In)));
    }

    #[test]
    fn end_restores_default_state() {
        for one_shot in [true, false] {
            let mut pinch = tracker(one_shot);
            pinch.begin(3);
            feed(&mut pinch, &[1.3, 1.6, 0.6]);
            pinch.end(0.6);

            assert_eq!(pinch.gesture(), &PinchGesture::default());
        }
    }

    #[test]
    fn cancel_skips_final_evaluation() {
        let mut pinch = tracker(true);
        pinch.begin(2);
        feed(&mut pinch, &[1.0, 0.7]);

        pinch.cancel();

        assert_eq!(pinch.gesture(), &PinchGesture::default());
        assert_eq!(pinch.end(0.7), None);
    }
}
