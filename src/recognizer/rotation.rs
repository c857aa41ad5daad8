//! Two-finger rotation recognition.
use std::time::Duration;

use super::{CallbackSlot, GestureAlgorithm, GestureDisposal, RecognizerCore, RefereeState};
use crate::event::{GestureEvent, GestureKind, TouchEvent};
use crate::geometry::{Point, normalize_angle};

/// Recognizes the bearing between two fingers turning by at least `angle`
/// degrees from where it was when the second finger landed.
#[derive(Debug, Clone)]
pub struct RotationRecognizer {
    angle: Option<f64>,

    initial_bearing: f64,
    result_angle: f64,
    center: Point,
    started: bool,
    last_time: Duration,
}

impl RotationRecognizer {
    pub const FINGERS: usize = 2;

    pub fn new(angle: Option<f64>) -> Self {
        Self {
            angle,
            initial_bearing: 0.0,
            result_angle: 0.0,
            center: Point::ORIGIN,
            started: false,
            last_time: Duration::ZERO,
        }
    }

    /// Rotation in degrees, `(-180, 180]`.
    pub fn result_angle(&self) -> f64 {
        self.result_angle
    }

    /// Bearing in degrees from the lower finger id to the higher one.
    fn bearing(core: &RecognizerCore) -> Option<f64> {
        let mut points = core.touch_points.values();
        let (first, second) = (points.next()?, points.next()?);
        Some((second.position - first.position).angle_deg())
    }

    fn build_event(&self, core: &RecognizerCore) -> GestureEvent {
        let mut event = core.event(GestureKind::Rotation, self.last_time, self.center);
        event.angle = self.result_angle;
        event
    }

    fn finish(&mut self, core: &mut RecognizerCore, slot: CallbackSlot) {
        if self.started {
            self.started = false;
            let event = self.build_event(core);
            core.fire(slot, &event);
        }
    }
}

impl GestureAlgorithm for RotationRecognizer {
    fn kind(&self) -> GestureKind {
        GestureKind::Rotation
    }

    fn on_down(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal {
        self.last_time = ev.time;
        if core.state == RefereeState::Succeed {
            return GestureDisposal::None;
        }
        if core.fingers != Self::FINGERS || core.touch_points.len() > Self::FINGERS {
            return GestureDisposal::Reject;
        }
        if core.touch_points.len() == Self::FINGERS && core.state == RefereeState::Ready {
            core.arm(ev.source, ev.tool);
            self.initial_bearing = Self::bearing(core).unwrap_or_default();
            self.result_angle = 0.0;
            self.center = core.centroid().unwrap_or_default();
        }
        GestureDisposal::None
    }

    fn on_move(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal {
        if !core.is_armed() {
            return GestureDisposal::None;
        }
        self.last_time = ev.time;
        let Some(bearing) = Self::bearing(core) else {
            return GestureDisposal::None;
        };
        self.result_angle = normalize_angle(bearing - self.initial_bearing);
        self.center = core.centroid().unwrap_or(self.center);
        match core.state {
            RefereeState::Succeed => {
                if self.started {
                    let event = self.build_event(core);
                    core.fire(CallbackSlot::Update, &event);
                }
                GestureDisposal::None
            }
            RefereeState::SucceedBlocked => GestureDisposal::None,
            _ => {
                let threshold = self.angle.unwrap_or(core.thresholds().rotation_angle);
                if self.result_angle.abs() >= threshold {
                    GestureDisposal::Accept
                } else {
                    GestureDisposal::None
                }
            }
        }
    }

    fn on_up(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal {
        self.last_time = ev.time;
        if core.state != RefereeState::Succeed {
            return GestureDisposal::Reject;
        }
        self.finish(core, CallbackSlot::End);
        GestureDisposal::None
    }

    fn on_cancel(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal {
        self.last_time = ev.time;
        if core.state != RefereeState::Succeed {
            return GestureDisposal::Reject;
        }
        self.finish(core, CallbackSlot::Cancel);
        GestureDisposal::None
    }

    fn on_accepted(&mut self, core: &mut RecognizerCore) {
        self.started = true;
        let event = self.build_event(core);
        core.fire(CallbackSlot::Start, &event);
    }

    fn reset(&mut self) {
        *self = Self::new(self.angle);
    }

    fn snapshot(&self, core: &RecognizerCore) -> GestureEvent {
        self.build_event(core)
    }

    fn same_config(&self, other: &Self) -> bool {
        self.angle == other.angle
    }
}
