//! Arena owning every recognizer and routing disposals.
//!
//! Recognizers refer to each other (child → parent group, group → children,
//! exclusive group → active child) through [`RecognizerId`] handles. A
//! handle whose recognizer was removed simply resolves to nothing and is
//! skipped.
use std::time::Duration;

use log::trace;
use slotmap::SlotMap;

use crate::event::{AxisEvent, TouchEvent};
use crate::group::GroupMode;
use crate::recognizer::{
    GestureDisposal, GesturePriority, Recognizer, RecognizerId, RefereeState,
};
use crate::referee::GestureReferee;

#[derive(Debug, Default)]
pub struct RecognizerArena {
    recognizers: SlotMap<RecognizerId, Recognizer>,
}

impl RecognizerArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, recognizer: Recognizer) -> RecognizerId {
        self.recognizers.insert(recognizer)
    }

    /// Remove a recognizer and, for groups, every child it owns.
    pub fn remove(&mut self, id: RecognizerId) -> Option<Recognizer> {
        let removed = self.recognizers.remove(id)?;
        if let Some(parent) = removed.core.parent.and_then(|p| self.recognizers.get_mut(p)) {
            if let Some(group) = parent.group_mut() {
                group.children.retain(|c| *c != id);
            }
        }
        if let Some(group) = removed.group() {
            let owned: Vec<_> = group
                .children
                .iter()
                .chain(group.staged_children.iter().flatten())
                .copied()
                .collect();
            for child in owned {
                if self.parent(child) == Some(id) {
                    if let Some(mut c) = self.remove(child) {
                        c.core.parent = None;
                    }
                }
            }
        }
        Some(removed)
    }

    pub fn get(&self, id: RecognizerId) -> Option<&Recognizer> {
        self.recognizers.get(id)
    }

    pub fn get_mut(&mut self, id: RecognizerId) -> Option<&mut Recognizer> {
        self.recognizers.get_mut(id)
    }

    pub fn contains(&self, id: RecognizerId) -> bool {
        self.recognizers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.recognizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recognizers.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = RecognizerId> + '_ {
        self.recognizers.keys()
    }

    pub fn state(&self, id: RecognizerId) -> Option<RefereeState> {
        self.recognizers.get(id).map(|r| r.core.state)
    }

    pub(crate) fn state_is(&self, id: RecognizerId, f: impl Fn(RefereeState) -> bool) -> bool {
        self.state(id).is_some_and(f)
    }

    pub(crate) fn set_state(&mut self, id: RecognizerId, state: RefereeState) {
        if let Some(r) = self.recognizers.get_mut(id) {
            if r.core.state != state {
                trace!("{:?} {} -> {state}", id, r.core.state);
                r.core.state = state;
            }
        }
    }

    pub fn parent(&self, id: RecognizerId) -> Option<RecognizerId> {
        self.recognizers.get(id).and_then(|r| r.core.parent)
    }

    pub fn priority(&self, id: RecognizerId) -> GesturePriority {
        self.recognizers
            .get(id)
            .map_or(GesturePriority::Low, |r| r.core.priority)
    }

    pub(crate) fn is_group(&self, id: RecognizerId) -> bool {
        self.recognizers.get(id).is_some_and(Recognizer::is_group)
    }

    // -- Event fan-out ----------------------------------------

    pub(crate) fn handle_touch(
        &mut self,
        referee: &mut GestureReferee,
        id: RecognizerId,
        ev: &TouchEvent,
    ) {
        let Some(rec) = self.recognizers.get_mut(id) else {
            return;
        };
        if rec.is_group() {
            self.group_handle_touch(referee, id, ev);
            return;
        }
        let disposal = rec.handle_touch(ev);
        self.batch_adjudicate(referee, id, disposal);
    }

    pub(crate) fn handle_axis(
        &mut self,
        referee: &mut GestureReferee,
        id: RecognizerId,
        ev: &AxisEvent,
    ) {
        let Some(rec) = self.recognizers.get_mut(id) else {
            return;
        };
        if rec.is_group() {
            self.group_handle_axis(referee, id, ev);
            return;
        }
        let disposal = rec.handle_axis(ev);
        self.batch_adjudicate(referee, id, disposal);
    }

    pub(crate) fn handle_tick(
        &mut self,
        referee: &mut GestureReferee,
        id: RecognizerId,
        now: Duration,
    ) {
        let Some(rec) = self.recognizers.get_mut(id) else {
            return;
        };
        if rec.is_group() {
            self.group_handle_tick(referee, id, now);
            return;
        }
        let disposal = rec.handle_tick(now);
        self.batch_adjudicate(referee, id, disposal);
    }

    /// Report a disposal to the parent group, or to the referee for
    /// top-level recognizers.
    pub(crate) fn batch_adjudicate(
        &mut self,
        referee: &mut GestureReferee,
        id: RecognizerId,
        disposal: GestureDisposal,
    ) {
        if disposal == GestureDisposal::None {
            return;
        }
        match self.parent(id).filter(|p| self.contains(*p)) {
            Some(group) => self.group_adjudicate(referee, group, id, disposal),
            None => referee.adjudicate(self, id, disposal),
        }
    }

    // -- Terminal notifications -------------------------------

    /// Confirm a win: fires the recognizer's (or the group's winning
    /// children's) callbacks. No-op once terminal.
    pub fn on_accepted(&mut self, id: RecognizerId) {
        let Some(rec) = self.recognizers.get_mut(id) else {
            return;
        };
        if rec.core.state.is_terminal() {
            return;
        }
        if rec.is_group() {
            self.group_accepted(id);
        } else {
            rec.leaf_accepted();
        }
    }

    /// Force a recognizer out of the competition. Groups cascade to every
    /// child that has not already reached `Succeed` or `Fail`. Idempotent.
    pub fn on_rejected(&mut self, id: RecognizerId) {
        let Some(rec) = self.recognizers.get_mut(id) else {
            return;
        };
        if rec.core.state.is_terminal() {
            return;
        }
        if rec.is_group() {
            self.group_rejected(id);
        } else {
            rec.leaf_rejected();
        }
    }

    // -- Session lifecycle ------------------------------------

    /// A recognizer idle since its last session joins a scope: the outcome
    /// of that session is dropped and staged children are applied, so it
    /// competes from `Ready`.
    pub(crate) fn begin_referee(&mut self, id: RecognizerId) {
        self.finish_referee(id, true);
    }

    /// Session over: back to `Ready`, recursively. Groups apply staged
    /// children when `need_update_child` is set.
    pub fn finish_referee(&mut self, id: RecognizerId, need_update_child: bool) {
        let Some(rec) = self.recognizers.get_mut(id) else {
            return;
        };
        rec.reset_session();
        let children = match rec.group_mut() {
            Some(group) => {
                group.reset_progress();
                if need_update_child {
                    if let Some(staged) = group.staged_children.take() {
                        let old = std::mem::replace(&mut group.children, staged);
                        let new = group.children.clone();
                        self.swap_children(id, &old, &new);
                    }
                }
                self.children(id)
            }
            None => Vec::new(),
        };
        for child in children {
            self.finish_referee(child, need_update_child);
        }
    }

    fn swap_children(&mut self, group: RecognizerId, old: &[RecognizerId], new: &[RecognizerId]) {
        for child in old.iter().filter(|c| !new.contains(c)) {
            if self.parent(*child) == Some(group) {
                self.remove(*child);
            }
        }
        for child in new {
            if let Some(c) = self.recognizers.get_mut(*child) {
                c.core.parent = Some(group);
            }
        }
    }

    /// All fingers of the session lifted: recognizers that never armed can
    /// no longer do so and are rejected, including the idle children of a
    /// group that already won. Sequence groups keep waiting for their next
    /// child on their own timeout.
    pub(crate) fn settle_unarmed(&mut self, referee: &mut GestureReferee, id: RecognizerId) {
        let Some(rec) = self.recognizers.get(id) else {
            return;
        };
        let state = rec.core.state;
        if state == RefereeState::Ready {
            match rec.core.parent.filter(|p| self.contains(*p)) {
                Some(group) => self.group_adjudicate(referee, group, id, GestureDisposal::Reject),
                None => self.on_rejected(id),
            }
            return;
        }
        if state == RefereeState::Fail {
            return;
        }
        let Some(group) = rec.group() else {
            return;
        };
        if group.mode == GroupMode::Sequence {
            return;
        }
        for child in group.children.clone() {
            self.settle_unarmed(referee, child);
        }
    }

    /// `id` and every descendant decided.
    pub fn check_states(&self, id: RecognizerId) -> bool {
        let Some(rec) = self.recognizers.get(id) else {
            return true;
        };
        if rec.core.state == RefereeState::Fail {
            return true;
        }
        rec.core.state.is_done() && self.children(id).into_iter().all(|c| self.check_states(c))
    }

    /// Rebuild reconciliation: `new` takes over the progress of `old` when
    /// both describe the same gesture tree.
    pub fn reconcile(&mut self, new: RecognizerId, old: RecognizerId) -> bool {
        if new == old {
            return true;
        }
        if !self.same_tree(new, old) {
            return false;
        }
        self.take_progress(new, old);
        true
    }

    fn same_tree(&self, new: RecognizerId, old: RecognizerId) -> bool {
        let (Some(n), Some(o)) = (self.recognizers.get(new), self.recognizers.get(old)) else {
            return false;
        };
        if !n.same_config(o) {
            return false;
        }
        let (a, b) = (self.children_of(n), self.children_of(o));
        a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| self.same_tree(*x, *y))
    }

    fn take_progress(&mut self, new: RecognizerId, old: RecognizerId) {
        let Some(progress) = self.recognizers.get(old).map(Recognizer::progress) else {
            return;
        };
        if let Some(n) = self.recognizers.get_mut(new) {
            n.take_progress(progress);
        }
        let pairs: Vec<_> = self
            .children(new)
            .into_iter()
            .zip(self.children(old))
            .collect();
        for (n, o) in pairs {
            self.take_progress(n, o);
        }
    }

    pub(crate) fn children(&self, id: RecognizerId) -> Vec<RecognizerId> {
        self.recognizers
            .get(id)
            .map(|r| self.children_of(r))
            .unwrap_or_default()
    }

    fn children_of(&self, rec: &Recognizer) -> Vec<RecognizerId> {
        rec.group().map(|g| g.children.clone()).unwrap_or_default()
    }
}
