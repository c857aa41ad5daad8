//! Drag recognition along a configurable direction.
use std::time::Duration;

use log::trace;
use serde::Deserialize;
use strum::{Display, EnumString, IntoStaticStr};

use super::{CallbackSlot, GestureAlgorithm, GestureDisposal, RecognizerCore, RefereeState};
use crate::event::{AxisEvent, AxisPhase, GestureEvent, GestureKind, TouchEvent};
use crate::geometry::{Offset, Point};
use crate::velocity::VelocityTracker;

/// Directions a pan may be recognized in.
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
pub enum PanDirection {
    #[default]
    All,
    Horizontal,
    Vertical,
    Left,
    Right,
    Up,
    Down,
}

impl PanDirection {
    /// Decide on a total displacement. `Accept` once the movement along the
    /// direction reaches `distance`, `Reject` once movement against or across
    /// it does.
    pub fn judge(self, offset: Offset, distance: f64) -> GestureDisposal {
        let Offset { dx, dy } = offset;
        let (along, against) = match self {
            PanDirection::All => {
                return if offset.length() >= distance {
                    GestureDisposal::Accept
                } else {
                    GestureDisposal::None
                };
            }
            PanDirection::Horizontal => (dx.abs(), dy.abs()),
            PanDirection::Vertical => (dy.abs(), dx.abs()),
            PanDirection::Left => (-dx, dx.max(dy.abs())),
            PanDirection::Right => (dx, (-dx).max(dy.abs())),
            PanDirection::Up => (-dy, dy.max(dx.abs())),
            PanDirection::Down => (dy, (-dy).max(dx.abs())),
        };
        if along >= distance {
            GestureDisposal::Accept
        } else if against >= distance && against > 0.0 {
            GestureDisposal::Reject
        } else {
            GestureDisposal::None
        }
    }
}

/// Recognizes a drag of `fingers` fingers exceeding `distance` along
/// `direction`. Wheel/trackpad scroll deltas drive a separate path with
/// its own threshold.
#[derive(Debug, Clone)]
pub struct PanRecognizer {
    direction: PanDirection,
    distance: Option<f64>,
    axis_distance: Option<f64>,
    new_direction: Option<PanDirection>,
    new_fingers: Option<usize>,

    last_centroid: Option<Point>,
    offset: Offset,
    reported: Offset,
    velocity: Option<VelocityTracker>,
    from_axis: bool,
    started: bool,
    last_time: Duration,
    last_position: Point,
}

impl PanRecognizer {
    pub fn new(direction: PanDirection, distance: Option<f64>, axis_distance: Option<f64>) -> Self {
        Self {
            direction,
            distance,
            axis_distance,
            new_direction: None,
            new_fingers: None,
            last_centroid: None,
            offset: Offset::ZERO,
            reported: Offset::ZERO,
            velocity: None,
            from_axis: false,
            started: false,
            last_time: Duration::ZERO,
            last_position: Point::ORIGIN,
        }
    }

    pub fn direction(&self) -> PanDirection {
        self.direction
    }

    /// Total displacement of the current session.
    pub fn offset(&self) -> Offset {
        self.offset
    }

    /// Change the direction. Applied at once while detecting, otherwise
    /// staged until the next session arms.
    pub fn change_direction(&mut self, state: RefereeState, direction: PanDirection) {
        if state == RefereeState::Detecting {
            self.direction = direction;
        } else {
            self.new_direction = Some(direction);
        }
    }

    /// Change the finger count, same staging rules as [`Self::change_direction`].
    pub fn change_fingers(&mut self, core: &mut RecognizerCore, fingers: usize) {
        if core.state == RefereeState::Detecting {
            core.fingers = fingers.max(1);
        } else {
            self.new_fingers = Some(fingers.max(1));
        }
    }

    fn apply_staged(&mut self, core: &mut RecognizerCore) {
        if let Some(direction) = self.new_direction.take() {
            self.direction = direction;
        }
        if let Some(fingers) = self.new_fingers.take() {
            core.fingers = fingers;
        }
    }

    fn track(&mut self, core: &RecognizerCore, time: Duration) -> Option<Offset> {
        let center = core.centroid()?;
        let delta = self.last_centroid.map_or(Offset::ZERO, |last| center - last);
        self.last_centroid = Some(center);
        self.offset = self.offset + delta;
        self.last_time = time;
        self.last_position = center;
        if let Some(tracker) = self.velocity.as_mut() {
            tracker.add(time, center);
        }
        Some(delta)
    }

    fn build_event(&mut self, core: &RecognizerCore) -> GestureEvent {
        let mut event = core.event(GestureKind::Pan, self.last_time, self.last_position);
        event.offset = self.offset;
        event.delta = self.offset - self.reported;
        self.reported = self.offset;
        if let Some(tracker) = &self.velocity {
            event.velocity = tracker.velocity();
            event.speed = tracker.speed();
        }
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

impl GestureAlgorithm for PanRecognizer {
    fn kind(&self) -> GestureKind {
        GestureKind::Pan
    }

    fn on_down(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal {
        if core.state == RefereeState::Ready {
            self.apply_staged(core);
        }
        self.last_centroid = core.centroid();
        if core.state == RefereeState::Succeed {
            return GestureDisposal::None;
        }
        if core.touch_points.len() > core.fingers {
            return GestureDisposal::Reject;
        }
        if core.touch_points.len() == core.fingers && core.state == RefereeState::Ready {
            core.arm(ev.source, ev.tool);
            self.offset = Offset::ZERO;
            self.reported = Offset::ZERO;
            self.from_axis = false;
            let mut tracker = VelocityTracker::new(core.thresholds().velocity_window());
            if let Some(center) = self.last_centroid {
                tracker.add(ev.time, center);
                self.last_position = center;
            }
            self.velocity = Some(tracker);
            self.last_time = ev.time;
        }
        GestureDisposal::None
    }

    fn on_move(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal {
        if !core.is_armed() {
            return GestureDisposal::None;
        }
        self.track(core, ev.time);
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
                let distance = self.distance.unwrap_or(core.thresholds().pan_distance);
                let verdict = self.direction.judge(self.offset, distance);
                trace!(
                    "pan: offset ({:.1}, {:.1}) vs {distance} -> {verdict}",
                    self.offset.dx, self.offset.dy
                );
                verdict
            }
        }
    }

    fn on_up(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal {
        self.last_time = ev.time;
        self.last_centroid = core.centroid();
        if core.state != RefereeState::Succeed {
            return GestureDisposal::Reject;
        }
        if core.touch_points.len() < core.fingers {
            self.last_position = ev.position;
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
        self.last_position = ev.position;
        match ev.phase {
            AxisPhase::None => GestureDisposal::None,
            AxisPhase::Begin | AxisPhase::Update => {
                if core.state == RefereeState::Ready {
                    self.apply_staged(core);
                    core.arm(ev.source, ev.tool);
                    self.from_axis = true;
                    self.offset = Offset::ZERO;
                    self.reported = Offset::ZERO;
                    self.velocity = None;
                }
                if !self.from_axis {
                    return GestureDisposal::None;
                }
                self.offset = self.offset + ev.scroll();
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
                        let distance = self
                            .axis_distance
                            .unwrap_or(core.thresholds().axis_pan_distance);
                        self.direction.judge(self.offset, distance)
                    }
                }
            }
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
        let mut fresh = Self::new(self.direction, self.distance, self.axis_distance);
        fresh.new_direction = self.new_direction;
        fresh.new_fingers = self.new_fingers;
        *self = fresh;
    }

    fn snapshot(&self, core: &RecognizerCore) -> GestureEvent {
        let mut event = core.event(GestureKind::Pan, self.last_time, self.last_position);
        event.offset = self.offset;
        event.delta = self.offset - self.reported;
        event
    }

    fn same_config(&self, other: &Self) -> bool {
        self.direction == other.direction
            && self.distance == other.distance
            && self.axis_distance == other.axis_distance
    }
}
