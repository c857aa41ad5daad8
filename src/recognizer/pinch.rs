//! Pinch (zoom) recognition from finger spread or ctrl+scroll.
use std::time::Duration;

use log::trace;

use super::{CallbackSlot, GestureAlgorithm, GestureDisposal, RecognizerCore, RefereeState};
use crate::event::{AxisEvent, AxisPhase, GestureEvent, GestureKind, TouchEvent};
use crate::geometry::Point;

/// Most fingers a pinch can be configured for.
pub const MAX_PINCH_FINGERS: usize = 5;

/// Recognizes a change of the average finger distance from their centroid
/// exceeding `distance`. Axis input reports the hardware scale directly and
/// requires ctrl to be held.
#[derive(Debug, Clone)]
pub struct PinchRecognizer {
    distance: Option<f64>,

    initial_deviation: f64,
    scale: f64,
    center: Point,
    from_axis: bool,
    started: bool,
    last_time: Duration,
}

impl PinchRecognizer {
    pub fn new(distance: Option<f64>) -> Self {
        Self {
            distance,
            initial_deviation: 0.0,
            scale: 1.0,
            center: Point::ORIGIN,
            from_axis: false,
            started: false,
            last_time: Duration::ZERO,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Average distance of the tracked fingers from their centroid.
    fn deviation(core: &RecognizerCore) -> Option<(Point, f64)> {
        let center = core.centroid()?;
        let n = core.touch_points.len() as f64;
        let sum: f64 = core
            .touch_points
            .values()
            .map(|t| t.position.distance_to(&center))
            .sum();
        Some((center, sum / n))
    }

    fn build_event(&self, core: &RecognizerCore) -> GestureEvent {
        let mut event = core.event(GestureKind::Pinch, self.last_time, self.center);
        event.scale = self.scale;
        event.pinch_center = self.center;
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

impl GestureAlgorithm for PinchRecognizer {
    fn kind(&self) -> GestureKind {
        GestureKind::Pinch
    }

    fn on_down(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal {
        self.last_time = ev.time;
        if core.state == RefereeState::Succeed {
            return GestureDisposal::None;
        }
        if core.fingers > MAX_PINCH_FINGERS || core.touch_points.len() > core.fingers {
            trace!("pinch: unsupported finger count {}", core.touch_points.len());
            return GestureDisposal::Reject;
        }
        if core.touch_points.len() == core.fingers && core.state == RefereeState::Ready {
            core.arm(ev.source, ev.tool);
            self.from_axis = false;
            self.scale = 1.0;
            if let Some((center, deviation)) = Self::deviation(core) {
                self.center = center;
                self.initial_deviation = deviation;
            }
        }
        GestureDisposal::None
    }

    fn on_move(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal {
        if !core.is_armed() || self.from_axis {
            return GestureDisposal::None;
        }
        self.last_time = ev.time;
        let Some((center, deviation)) = Self::deviation(core) else {
            return GestureDisposal::None;
        };
        self.center = center;
        self.scale = if self.initial_deviation > 0.0 {
            deviation / self.initial_deviation
        } else {
            1.0
        };
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
                let distance = self.distance.unwrap_or(core.thresholds().pinch_distance);
                if (deviation - self.initial_deviation).abs() >= distance {
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
        if core.touch_points.len() < core.fingers {
            self.finish(core, CallbackSlot::End);
        }
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

    fn on_axis(&mut self, core: &mut RecognizerCore, ev: &AxisEvent) -> GestureDisposal {
        self.last_time = ev.time;
        match ev.phase {
            AxisPhase::None => GestureDisposal::None,
            AxisPhase::Begin | AxisPhase::Update => {
                if core.state == RefereeState::Ready {
                    if !ev.ctrl || ev.pinch_scale <= 0.0 {
                        return GestureDisposal::None;
                    }
                    core.arm(ev.source, ev.tool);
                    self.from_axis = true;
                }
                if !self.from_axis || ev.pinch_scale <= 0.0 {
                    return GestureDisposal::None;
                }
                self.scale = ev.pinch_scale;
                self.center = ev.position;
                match core.state {
                    RefereeState::Succeed => {
                        if self.started {
                            let event = self.build_event(core);
                            core.fire(CallbackSlot::Update, &event);
                        }
                        GestureDisposal::None
                    }
                    RefereeState::SucceedBlocked => GestureDisposal::None,
                    _ if (self.scale - 1.0).abs() > f64::EPSILON => GestureDisposal::Accept,
                    _ => GestureDisposal::None,
                }
            }
            AxisPhase::End | AxisPhase::Cancel if !self.from_axis => GestureDisposal::None,
            AxisPhase::End => {
                if core.state != RefereeState::Succeed {
                    return GestureDisposal::Reject;
                }
                self.finish(core, CallbackSlot::End);
                GestureDisposal::None
            }
            AxisPhase::Cancel => {
                if core.state != RefereeState::Succeed {
                    return GestureDisposal::Reject;
                }
                self.finish(core, CallbackSlot::Cancel);
                GestureDisposal::None
            }
        }
    }

    fn on_accepted(&mut self, core: &mut RecognizerCore) {
        self.started = true;
        let event = self.build_event(core);
        core.fire(CallbackSlot::Start, &event);
    }

    fn reset(&mut self) {
        *self = Self::new(self.distance);
    }

    fn snapshot(&self, core: &RecognizerCore) -> GestureEvent {
        self.build_event(core)
    }

    fn same_config(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}
