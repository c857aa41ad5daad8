//! Parallel groups: every child decides on its own, the group fails only
//! once all of them failed.
use crate::arena::RecognizerArena;
use crate::recognizer::{GestureDisposal, RecognizerId, RefereeState};
use crate::referee::GestureReferee;

impl RecognizerArena {
    pub(super) fn parallel_adjudicate(
        &mut self,
        referee: &mut GestureReferee,
        group: RecognizerId,
        child: RecognizerId,
        disposal: GestureDisposal,
    ) {
        match disposal {
            GestureDisposal::Accept => {
                if self.state_is(child, RefereeState::is_terminal) {
                    return;
                }
                match self.state(group) {
                    Some(RefereeState::Succeed) => self.on_accepted(child),
                    Some(RefereeState::Fail) | None => self.on_rejected(child),
                    Some(_) => {
                        self.set_state(child, RefereeState::SucceedBlocked);
                        self.group_request(referee, group, GestureDisposal::Accept);
                    }
                }
            }
            GestureDisposal::Pending => {
                if self.state_is(child, |s| s.is_pending() || s.is_done()) {
                    return;
                }
                self.set_state(child, RefereeState::Pending);
                self.group_request(referee, group, GestureDisposal::Pending);
            }
            GestureDisposal::Reject => {
                self.on_rejected(child);
                if self.check_all_failed(group) {
                    self.group_request(referee, group, GestureDisposal::Reject);
                }
            }
            GestureDisposal::None => {}
        }
    }

    /// Every child that already recognized is confirmed with the group.
    pub(super) fn parallel_accepted(&mut self, group: RecognizerId) {
        for child in self.children(group) {
            if self.state_is(child, |s| s == RefereeState::SucceedBlocked) {
                self.on_accepted(child);
            }
        }
    }
}
