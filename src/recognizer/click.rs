//! Tap / multi-tap recognition.
use std::collections::BTreeMap;
use std::time::Duration;

use log::trace;

use super::{CallbackSlot, GestureAlgorithm, GestureDisposal, RecognizerCore, RefereeState};
use crate::event::{FingerInfo, GestureEvent, GestureKind, TouchEvent};
use crate::geometry::Point;

/// Recognizes `count` consecutive taps of `fingers` fingers.
///
/// Every finger must lift within the slop distance of where it went down.
/// Between taps of a multi-tap sequence the next tap must start within the
/// multi-tap timeout; a tap starting farther than the slop from the first
/// one restarts the sequence instead of failing.
#[derive(Debug, Clone)]
pub struct ClickRecognizer {
    count: u32,
    distance: Option<f64>,

    tapped_count: u32,
    fingers_reached: bool,
    down_points: BTreeMap<i32, Point>,
    first_tap_point: Option<Point>,
    last_up: Option<TouchEvent>,
    deadline: Option<Duration>,
    pending_reported: bool,
}

impl ClickRecognizer {
    pub fn new(count: u32, distance: Option<f64>) -> Self {
        Self {
            count: count.max(1),
            distance,
            tapped_count: 0,
            fingers_reached: false,
            down_points: BTreeMap::new(),
            first_tap_point: None,
            last_up: None,
            deadline: None,
            pending_reported: false,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Taps completed in the current sequence.
    pub fn tapped_count(&self) -> u32 {
        self.tapped_count
    }

    fn slop(&self, core: &RecognizerCore) -> f64 {
        self.distance.unwrap_or(core.thresholds().tap_slop)
    }

    fn expired(&self, now: Duration) -> bool {
        self.deadline.is_some_and(|d| now > d)
    }
}

impl GestureAlgorithm for ClickRecognizer {
    fn kind(&self) -> GestureKind {
        GestureKind::Click
    }

    fn on_down(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal {
        if core.state == RefereeState::Succeed {
            return GestureDisposal::None;
        }
        if core.touch_points.len() > core.fingers {
            trace!("click: {} fingers down, {} required", core.touch_points.len(), core.fingers);
            return GestureDisposal::Reject;
        }
        if self.expired(ev.time) {
            return GestureDisposal::Reject;
        }
        self.deadline = None;
        self.down_points.insert(ev.id, ev.position);

        if core.touch_points.len() == core.fingers {
            core.arm(ev.source, ev.tool);
            self.fingers_reached = true;
            let Some(center) = Point::centroid(self.down_points.values()) else {
                return GestureDisposal::None;
            };
            let slop = self.slop(core);
            if self
                .first_tap_point
                .is_some_and(|first| self.tapped_count > 0 && first.distance_to(&center) > slop)
            {
                trace!("click: next tap exceeds slop, restarting sequence");
                self.tapped_count = 0;
            }
            if self.tapped_count == 0 {
                self.first_tap_point = Some(center);
            }
        }
        GestureDisposal::None
    }

    fn on_move(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal {
        if core.state == RefereeState::Succeed {
            return GestureDisposal::None;
        }
        let slop = self.slop(core);
        match self.down_points.get(&ev.id) {
            Some(down) if down.distance_to(&ev.position) > slop => GestureDisposal::Reject,
            _ => GestureDisposal::None,
        }
    }

    fn on_up(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal {
        if core.state == RefereeState::Succeed {
            return GestureDisposal::None;
        }
        if !self.fingers_reached {
            return GestureDisposal::Reject;
        }
        if let Some(down) = self.down_points.get(&ev.id) {
            if down.distance_to(&ev.position) > self.slop(core) {
                return GestureDisposal::Reject;
            }
        }
        if !core.touch_points.is_empty() {
            return GestureDisposal::None;
        }

        self.tapped_count += 1;
        self.fingers_reached = false;
        self.down_points.clear();
        self.last_up = Some(*ev);
        trace!("click: tap {}/{}", self.tapped_count, self.count);

        if self.tapped_count >= self.count {
            return GestureDisposal::Accept;
        }
        self.deadline = Some(ev.time + core.thresholds().multi_tap_timeout());
        if self.pending_reported {
            GestureDisposal::None
        } else {
            self.pending_reported = true;
            GestureDisposal::Pending
        }
    }

    fn on_cancel(&mut self, core: &mut RecognizerCore, _ev: &TouchEvent) -> GestureDisposal {
        if core.state == RefereeState::Succeed {
            GestureDisposal::None
        } else {
            GestureDisposal::Reject
        }
    }

    fn on_tick(&mut self, core: &mut RecognizerCore, now: Duration) -> GestureDisposal {
        if core.state != RefereeState::Succeed && core.touch_points.is_empty() && self.expired(now)
        {
            trace!("click: multi-tap timeout after {} tap(s)", self.tapped_count);
            self.deadline = None;
            return GestureDisposal::Reject;
        }
        GestureDisposal::None
    }

    fn on_accepted(&mut self, core: &mut RecognizerCore) {
        let event = self.snapshot(core);
        core.fire(CallbackSlot::Action, &event);
    }

    fn reset(&mut self) {
        *self = Self::new(self.count, self.distance);
    }

    fn snapshot(&self, core: &RecognizerCore) -> GestureEvent {
        let (time, position) = self
            .last_up
            .map_or((Duration::ZERO, Point::ORIGIN), |e| (e.time, e.position));
        let mut event = core.event(GestureKind::Click, time, position);
        if let Some(up) = self.last_up {
            event.fingers.push(FingerInfo {
                id: up.id,
                global: up.position,
                local: core.local(up.position),
            });
            event.tilt_x = up.tilt_x;
            event.tilt_y = up.tilt_y;
        }
        event.tap_count = self.tapped_count;
        event
    }

    fn same_config(&self, other: &Self) -> bool {
        self.count == other.count && self.distance == other.distance
    }
}
