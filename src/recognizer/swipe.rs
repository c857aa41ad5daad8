//! Fast directional fling recognition.
use std::time::Duration;

use log::trace;
use serde::Deserialize;
use strum::{Display, EnumString, IntoStaticStr};

use super::{CallbackSlot, GestureAlgorithm, GestureDisposal, RecognizerCore, RefereeState};
use crate::event::{AxisEvent, AxisPhase, GestureEvent, GestureKind, TouchEvent};
use crate::geometry::{Offset, Point, normalize_angle};
use crate::velocity::VelocityTracker;

/// Directions a swipe may be recognized in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    IntoStaticStr,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    #[default]
    All,
    Horizontal,
    Vertical,
    None,
}

impl SwipeDirection {
    /// Whether a movement angle (degrees) lies within `tolerance` of this
    /// direction.
    pub fn matches(self, angle: f64, tolerance: f64) -> bool {
        let abs = angle.abs();
        match self {
            SwipeDirection::All => true,
            SwipeDirection::None => false,
            SwipeDirection::Horizontal => abs <= tolerance || abs >= 180.0 - tolerance,
            SwipeDirection::Vertical => (abs - 90.0).abs() <= tolerance,
        }
    }
}

/// Recognizes a release whose recent velocity exceeds `speed` in an
/// allowed direction. Axis input uses the accumulated scroll offset over
/// the axis session instead of finger positions.
#[derive(Debug, Clone)]
pub struct SwipeRecognizer {
    direction: SwipeDirection,
    speed: Option<f64>,

    velocity: Option<VelocityTracker>,
    axis_offset: Offset,
    axis_start: Duration,
    from_axis: bool,
    prev_angle: Option<f64>,
    result_angle: f64,
    result_speed: f64,
    result_velocity: Offset,
    last_time: Duration,
    last_position: Point,
}

impl SwipeRecognizer {
    pub fn new(direction: SwipeDirection, speed: Option<f64>) -> Self {
        Self {
            direction,
            speed,
            velocity: None,
            axis_offset: Offset::ZERO,
            axis_start: Duration::ZERO,
            from_axis: false,
            prev_angle: None,
            result_angle: 0.0,
            result_speed: 0.0,
            result_velocity: Offset::ZERO,
            last_time: Duration::ZERO,
            last_position: Point::ORIGIN,
        }
    }

    pub fn direction(&self) -> SwipeDirection {
        self.direction
    }

    /// Angle of the last recognized swipe, kept across sessions.
    pub fn prev_angle(&self) -> Option<f64> {
        self.prev_angle
    }

    fn decide(&mut self, core: &RecognizerCore, velocity: Offset) -> GestureDisposal {
        let th = core.thresholds();
        let threshold = self.speed.unwrap_or(th.swipe_speed);
        self.result_velocity = velocity;
        self.result_speed = velocity.length();
        self.result_angle = velocity.angle_deg();
        let in_direction = self
            .direction
            .matches(self.result_angle, th.swipe_angle_tolerance_deg)
            || self.prev_angle.is_some_and(|prev| {
                self.direction != SwipeDirection::None
                    && normalize_angle(self.result_angle - prev).abs()
                        <= th.swipe_repeat_tolerance_deg
            });
        trace!(
            "swipe: speed {:.1} (min {threshold}), angle {:.1}, in direction: {in_direction}",
            self.result_speed, self.result_angle
        );
        if self.result_speed >= threshold && in_direction {
            GestureDisposal::Accept
        } else {
            GestureDisposal::Reject
        }
    }
}

impl GestureAlgorithm for SwipeRecognizer {
    fn kind(&self) -> GestureKind {
        GestureKind::Swipe
    }

    fn on_down(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal {
        if core.state == RefereeState::Succeed {
            return GestureDisposal::None;
        }
        if core.touch_points.len() > core.fingers {
            return GestureDisposal::Reject;
        }
        if core.touch_points.len() == core.fingers && core.state == RefereeState::Ready {
            core.arm(ev.source, ev.tool);
            self.from_axis = false;
            let mut tracker = VelocityTracker::new(core.thresholds().velocity_window());
            if let Some(center) = core.centroid() {
                tracker.add(ev.time, center);
            }
            self.velocity = Some(tracker);
        }
        GestureDisposal::None
    }

    fn on_move(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal {
        if !core.is_armed() || core.state == RefereeState::Succeed {
            return GestureDisposal::None;
        }
        if let (Some(tracker), Some(center)) = (self.velocity.as_mut(), core.centroid()) {
            tracker.add(ev.time, center);
            self.last_position = center;
            self.last_time = ev.time;
        }
        GestureDisposal::None
    }

    fn on_up(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal {
        if core.state == RefereeState::Succeed || core.state == RefereeState::SucceedBlocked {
            return GestureDisposal::None;
        }
        let Some(tracker) = self.velocity.as_mut() else {
            return GestureDisposal::Reject;
        };
        if core.touch_points.is_empty() {
            tracker.add(ev.time, ev.position);
        }
        let velocity = tracker.velocity();
        self.last_time = ev.time;
        self.last_position = ev.position;
        self.decide(core, velocity)
    }

    fn on_cancel(&mut self, core: &mut RecognizerCore, _ev: &TouchEvent) -> GestureDisposal {
        if core.state == RefereeState::Succeed {
            GestureDisposal::None
        } else {
            GestureDisposal::Reject
        }
    }

    fn on_axis(&mut self, core: &mut RecognizerCore, ev: &AxisEvent) -> GestureDisposal {
        self.last_time = ev.time;
        self.last_position = ev.position;
        match ev.phase {
            AxisPhase::None => GestureDisposal::None,
            AxisPhase::Begin | AxisPhase::Update => {
                if core.state == RefereeState::Ready {
                    core.arm(ev.source, ev.tool);
                    self.from_axis = true;
                    self.axis_offset = Offset::ZERO;
                    self.axis_start = ev.time;
                }
                if self.from_axis {
                    self.axis_offset = self.axis_offset + ev.scroll();
                }
                GestureDisposal::None
            }
            AxisPhase::End => {
                if !self.from_axis || core.state.is_done() {
                    return GestureDisposal::None;
                }
                let dt = ev.time.saturating_sub(self.axis_start).as_secs_f64();
                let velocity = if dt > 0.0 {
                    self.axis_offset.scale(1.0 / dt)
                } else {
                    Offset::ZERO
                };
                self.decide(core, velocity)
            }
            AxisPhase::Cancel => {
                if self.from_axis && !core.state.is_done() {
                    GestureDisposal::Reject
                } else {
                    GestureDisposal::None
                }
            }
        }
    }

    fn on_accepted(&mut self, core: &mut RecognizerCore) {
        self.prev_angle = Some(self.result_angle);
        let event = self.snapshot(core);
        core.fire(CallbackSlot::Action, &event);
    }

    fn reset(&mut self) {
        let prev_angle = self.prev_angle;
        *self = Self::new(self.direction, self.speed);
        self.prev_angle = prev_angle;
    }

    fn snapshot(&self, core: &RecognizerCore) -> GestureEvent {
        let mut event = core.event(GestureKind::Swipe, self.last_time, self.last_position);
        event.speed = self.result_speed;
        event.angle = self.result_angle;
        event.velocity = self.result_velocity;
        event
    }

    fn same_config(&self, other: &Self) -> bool {
        self.direction == other.direction && self.speed == other.speed
    }
}
