//! Sequence groups: children must recognize one after the other. The
//! fingers still down when a child wins are handed to the next child, and
//! the next child must start within the sequence timeout once every finger
//! lifted.
use std::time::Duration;

use log::debug;

use crate::arena::RecognizerArena;
use crate::event::{TouchEvent, TouchPhase};
use crate::recognizer::{GestureDisposal, RecognizerId, RefereeState};
use crate::referee::GestureReferee;

impl RecognizerArena {
    pub(super) fn sequence_adjudicate(
        &mut self,
        referee: &mut GestureReferee,
        group: RecognizerId,
        child: RecognizerId,
        disposal: GestureDisposal,
    ) {
        match disposal {
            GestureDisposal::Accept => self.sequence_accept(referee, group, child),
            GestureDisposal::Pending => {
                if self.state_is(child, |s| s.is_pending() || s.is_done()) {
                    return;
                }
                self.set_state(child, RefereeState::Pending);
                self.group_request(referee, group, GestureDisposal::Pending);
            }
            GestureDisposal::Reject => {
                self.on_rejected(child);
                self.group_request(referee, group, GestureDisposal::Reject);
            }
            GestureDisposal::None => {}
        }
    }

    fn sequence_accept(
        &mut self,
        referee: &mut GestureReferee,
        group: RecognizerId,
        child: RecognizerId,
    ) {
        let Some(g) = self.group(group) else {
            return;
        };
        let index = g.current_index;
        if g.children.get(index) != Some(&child) || self.state_is(child, RefereeState::is_terminal) {
            return;
        }
        let next = g.children.get(index + 1).copied();
        match self.state(group) {
            Some(RefereeState::Fail) | None => {
                self.on_rejected(child);
                return;
            }
            Some(RefereeState::Succeed) if next.is_none() => {
                self.on_accepted(child);
                return;
            }
            _ => {}
        }
        let Some(next) = next else {
            self.set_state(child, RefereeState::SucceedBlocked);
            self.group_request(referee, group, GestureDisposal::Accept);
            return;
        };

        self.on_accepted(child);
        if let Some(g) = self.group_mut(group) {
            g.current_index = index + 1;
        }
        debug!("sequence {group:?}: step {} recognized", index + 1);
        self.group_request(referee, group, GestureDisposal::Pending);

        let held: Vec<TouchEvent> = self
            .get(group)
            .map(|r| r.core.touch_points.values().copied().collect())
            .unwrap_or_default();
        for point in held {
            let down = point.with_phase(TouchPhase::Down, point.time);
            self.handle_touch(referee, next, &down);
        }
    }

    pub(super) fn sequence_accepted(&mut self, group: RecognizerId) {
        let last = self.group(group).and_then(|g| g.children.last().copied());
        if let Some(last) = last {
            if self.state_is(last, |s| s == RefereeState::SucceedBlocked) {
                self.on_accepted(last);
            }
        }
    }

    /// Arm or clear the inter-step deadline after a touch was processed.
    pub(super) fn sequence_track_deadline(&mut self, group: RecognizerId, ev: &TouchEvent) {
        let Some(rec) = self.get(group) else {
            return;
        };
        let lifted = rec.core.touch_points.is_empty();
        let waiting = !rec.core.state.is_done();
        let timeout = rec.core.thresholds().sequence_timeout();
        let Some(g) = self.group_mut(group) else {
            return;
        };
        match ev.phase {
            TouchPhase::Down => g.deadline = None,
            TouchPhase::Up | TouchPhase::Cancel => {
                if lifted && waiting && g.current_index > 0 {
                    g.deadline = Some(ev.time + timeout);
                }
            }
            TouchPhase::Move => {}
        }
    }

    pub(super) fn sequence_expired(&self, group: RecognizerId, now: Duration) -> bool {
        self.group(group)
            .and_then(|g| g.deadline)
            .is_some_and(|deadline| now >= deadline)
    }
}
