//! Exclusive groups: the first child to win (in declaration order among
//! pending children) shuts out its siblings.
use log::debug;

use crate::arena::RecognizerArena;
use crate::recognizer::{GestureDisposal, RecognizerId, RefereeState};
use crate::referee::GestureReferee;

impl RecognizerArena {
    pub(super) fn exclusive_adjudicate(
        &mut self,
        referee: &mut GestureReferee,
        group: RecognizerId,
        child: RecognizerId,
        disposal: GestureDisposal,
    ) {
        match disposal {
            GestureDisposal::Accept => self.exclusive_accept(referee, group, child),
            GestureDisposal::Pending => self.exclusive_pending(referee, group, child),
            GestureDisposal::Reject => self.exclusive_reject(referee, group, child),
            GestureDisposal::None => {}
        }
    }

    fn exclusive_accept(
        &mut self,
        referee: &mut GestureReferee,
        group: RecognizerId,
        child: RecognizerId,
    ) {
        if self.state_is(child, RefereeState::is_terminal) {
            return;
        }
        let active = self
            .group(group)
            .and_then(|g| g.active)
            .filter(|a| self.contains(*a));
        if self.state_is(group, |s| s == RefereeState::Fail) || active.is_some_and(|a| a != child) {
            self.on_rejected(child);
            return;
        }
        if self.check_need_blocked(group, child) {
            debug!("exclusive {group:?}: {child:?} waits for an earlier sibling");
            self.set_state(child, RefereeState::SucceedBlocked);
            return;
        }
        if let Some(g) = self.group_mut(group) {
            g.active = Some(child);
        }
        for sibling in self.children(group) {
            if sibling != child {
                self.on_rejected(sibling);
            }
        }
        if self.state_is(group, |s| s == RefereeState::Succeed) {
            self.on_accepted(child);
        } else {
            self.set_state(child, RefereeState::SucceedBlocked);
            self.group_request(referee, group, GestureDisposal::Accept);
        }
    }

    fn exclusive_pending(
        &mut self,
        referee: &mut GestureReferee,
        group: RecognizerId,
        child: RecognizerId,
    ) {
        if self.state_is(child, |s| s.is_pending() || s.is_done()) {
            return;
        }
        let state = if self.check_need_blocked(group, child) {
            RefereeState::PendingBlocked
        } else {
            RefereeState::Pending
        };
        self.set_state(child, state);
        self.group_request(referee, group, GestureDisposal::Pending);
    }

    fn exclusive_reject(
        &mut self,
        referee: &mut GestureReferee,
        group: RecognizerId,
        child: RecognizerId,
    ) {
        self.on_rejected(child);
        if let Some(g) = self.group_mut(group) {
            if g.active == Some(child) {
                g.active = None;
            }
        }
        if self.check_all_failed(group) {
            self.group_request(referee, group, GestureDisposal::Reject);
            return;
        }
        while let Some(next) = self.unblock_gesture(group) {
            if self.state_is(next, |s| s == RefereeState::SucceedBlocked) {
                self.exclusive_accept(referee, group, next);
            } else {
                self.set_state(next, RefereeState::Pending);
            }
        }
    }

    pub(super) fn exclusive_accepted(&mut self, group: RecognizerId) {
        if let Some(active) = self.group(group).and_then(|g| g.active) {
            self.on_accepted(active);
        }
    }
}
