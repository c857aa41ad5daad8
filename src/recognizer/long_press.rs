//! Press-and-hold recognition with optional repeat.
use std::collections::BTreeMap;
use std::time::Duration;

use log::trace;

use super::{CallbackSlot, GestureAlgorithm, GestureDisposal, RecognizerCore, RefereeState};
use crate::event::{GestureEvent, GestureKind, SourceType, TouchEvent};
use crate::geometry::Point;

/// Recognizes `fingers` fingers held still for `duration`.
///
/// The recognizer reports `Pending` as soon as it arms so that siblings
/// deciding faster cannot win before it had a chance to reject. With
/// `repeat` set the action callback fires again on every repeat interval
/// while the fingers stay down.
#[derive(Debug, Clone)]
pub struct LongPressRecognizer {
    duration: Option<Duration>,
    repeat: bool,
    disable_mouse_left: bool,

    down_points: BTreeMap<i32, Point>,
    deadline: Option<Duration>,
    next_repeat: Option<Duration>,
    last_time: Duration,
    started: bool,
}

impl LongPressRecognizer {
    pub fn new(duration: Option<Duration>, repeat: bool, disable_mouse_left: bool) -> Self {
        Self {
            duration,
            repeat,
            disable_mouse_left,
            down_points: BTreeMap::new(),
            deadline: None,
            next_repeat: None,
            last_time: Duration::ZERO,
            started: false,
        }
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    fn build_event(&self, core: &RecognizerCore, time: Duration, repeat: bool) -> GestureEvent {
        let position = core
            .centroid()
            .or_else(|| Point::centroid(self.down_points.values()))
            .unwrap_or_default();
        let mut event = core.event(GestureKind::LongPress, time, position);
        event.repeat = repeat;
        event
    }
}

impl GestureAlgorithm for LongPressRecognizer {
    fn kind(&self) -> GestureKind {
        GestureKind::LongPress
    }

    fn on_down(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal {
        if ev.source == SourceType::Mouse && self.disable_mouse_left {
            core.touch_points.remove(&ev.id);
            return GestureDisposal::None;
        }
        if core.state == RefereeState::Succeed {
            return GestureDisposal::None;
        }
        if core.touch_points.len() > core.fingers {
            return GestureDisposal::Reject;
        }
        self.down_points.insert(ev.id, ev.position);
        if core.touch_points.len() == core.fingers && core.state == RefereeState::Ready {
            core.arm(ev.source, ev.tool);
            let duration = self
                .duration
                .unwrap_or_else(|| core.thresholds().long_press_duration());
            self.deadline = Some(ev.time + duration);
            self.last_time = ev.time;
            trace!("long press: armed, fires at {:?}", self.deadline);
            return GestureDisposal::Pending;
        }
        GestureDisposal::None
    }

    fn on_move(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal {
        self.last_time = ev.time;
        if core.state == RefereeState::Succeed {
            return GestureDisposal::None;
        }
        let slop = core.thresholds().tap_slop;
        match self.down_points.get(&ev.id) {
            Some(down) if down.distance_to(&ev.position) > slop => GestureDisposal::Reject,
            _ => GestureDisposal::None,
        }
    }

    fn on_up(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal {
        self.last_time = ev.time;
        if core.state != RefereeState::Succeed {
            return GestureDisposal::Reject;
        }
        if self.started {
            self.started = false;
            self.next_repeat = None;
            let mut event = self.build_event(core, ev.time, false);
            event.position = ev.position;
            event.local_position = core.local(ev.position);
            core.fire(CallbackSlot::End, &event);
        }
        GestureDisposal::None
    }

    fn on_cancel(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal {
        if core.state != RefereeState::Succeed {
            return GestureDisposal::Reject;
        }
        if self.started {
            self.started = false;
            self.next_repeat = None;
            let event = self.build_event(core, ev.time, false);
            core.fire(CallbackSlot::Cancel, &event);
        }
        GestureDisposal::None
    }

    fn on_tick(&mut self, core: &mut RecognizerCore, now: Duration) -> GestureDisposal {
        if core.state == RefereeState::Succeed {
            if let Some(next) = self.next_repeat.filter(|next| now >= *next) {
                let interval = core.thresholds().long_press_repeat_interval();
                self.next_repeat = Some(next.max(now) + interval);
                let event = self.build_event(core, now, true);
                core.fire(CallbackSlot::Action, &event);
            }
            return GestureDisposal::None;
        }
        match self.deadline {
            Some(deadline) if now >= deadline && !core.touch_points.is_empty() => {
                self.deadline = None;
                self.last_time = now;
                GestureDisposal::Accept
            }
            _ => GestureDisposal::None,
        }
    }

    fn on_accepted(&mut self, core: &mut RecognizerCore) {
        self.started = !core.touch_points.is_empty();
        let event = self.build_event(core, self.last_time, false);
        core.fire(CallbackSlot::Action, &event);
        if self.repeat && self.started {
            self.next_repeat = Some(self.last_time + core.thresholds().long_press_repeat_interval());
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.duration, self.repeat, self.disable_mouse_left);
    }

    fn snapshot(&self, core: &RecognizerCore) -> GestureEvent {
        self.build_event(core, self.last_time, false)
    }

    fn same_config(&self, other: &Self) -> bool {
        self.duration == other.duration
            && self.repeat == other.repeat
            && self.disable_mouse_left == other.disable_mouse_left
    }
}
