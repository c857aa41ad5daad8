//! Composite recognizers: exclusive, parallel and sequence groups.
//!
//! A group is a recognizer whose children report to it instead of to the
//! referee. The group combines their disposals according to its mode and
//! reports its own disposal upward, so groups nest freely.
use std::time::Duration;

use log::debug;
use serde::Deserialize;
use strum::{Display, EnumString, IntoStaticStr};

use crate::arena::RecognizerArena;
use crate::event::{AxisEvent, GestureKind, TouchEvent, TouchPhase};
use crate::recognizer::{GestureDisposal, RecognizerId, RefereeState};
use crate::referee::GestureReferee;

pub mod exclusive;
pub mod parallel;
pub mod sequence;

/// How a group combines its children.
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
pub enum GroupMode {
    /// At most one child wins.
    #[default]
    Exclusive,
    /// Children win or lose independently.
    Parallel,
    /// Children must win one after the other.
    Sequence,
}

/// Group-specific part of a recognizer.
#[derive(Debug, Clone)]
pub struct RecognizerGroup {
    pub(crate) mode: GroupMode,
    pub(crate) children: Vec<RecognizerId>,
    pub(crate) staged_children: Option<Vec<RecognizerId>>,
    /// Exclusive: the child that won inside the group.
    pub(crate) active: Option<RecognizerId>,
    /// Sequence: index of the child currently deciding.
    pub(crate) current_index: usize,
    /// Sequence: the next child must start before this instant.
    pub(crate) deadline: Option<Duration>,
}

impl RecognizerGroup {
    pub fn new(mode: GroupMode) -> Self {
        Self {
            mode,
            children: Vec::new(),
            staged_children: None,
            active: None,
            current_index: 0,
            deadline: None,
        }
    }

    pub fn mode(&self) -> GroupMode {
        self.mode
    }

    pub fn children(&self) -> &[RecognizerId] {
        &self.children
    }

    /// Winning child of an exclusive group.
    pub fn active_recognizer(&self) -> Option<RecognizerId> {
        self.active
    }

    /// Child of a sequence group currently deciding.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Record a replacement child list, applied when the current session
    /// finishes with `need_update_child`.
    pub fn stage_children(&mut self, children: Vec<RecognizerId>) {
        self.staged_children = Some(children);
    }

    pub fn gesture_kind(&self) -> GestureKind {
        match self.mode {
            GroupMode::Exclusive => GestureKind::ExclusiveGroup,
            GroupMode::Parallel => GestureKind::ParallelGroup,
            GroupMode::Sequence => GestureKind::SequenceGroup,
        }
    }

    pub(crate) fn reset_progress(&mut self) {
        self.active = None;
        self.current_index = 0;
        self.deadline = None;
    }

    pub(crate) fn same_config(&self, other: &RecognizerGroup) -> bool {
        self.mode == other.mode && self.children.len() == other.children.len()
    }

    /// Carry over progress; the active child maps by position.
    pub(crate) fn take_progress_from(&mut self, old: &RecognizerGroup) {
        self.active = old
            .active
            .and_then(|a| old.children.iter().position(|c| *c == a))
            .and_then(|i| self.children.get(i).copied());
        self.current_index = old.current_index;
        self.deadline = old.deadline;
    }
}

impl RecognizerArena {
    fn group(&self, id: RecognizerId) -> Option<&RecognizerGroup> {
        self.get(id).and_then(|r| r.group())
    }

    pub(crate) fn group_mut(&mut self, id: RecognizerId) -> Option<&mut RecognizerGroup> {
        self.get_mut(id).and_then(|r| r.group_mut())
    }

    fn group_mode(&self, id: RecognizerId) -> Option<GroupMode> {
        self.group(id).map(|g| g.mode)
    }

    /// Append children; each child reports to `group` from now on.
    pub fn add_children(&mut self, group: RecognizerId, children: &[RecognizerId]) {
        if !self.is_group(group) {
            return;
        }
        for child in children {
            if *child == group || self.existed(*child, group) {
                continue;
            }
            let Some(rec) = self.get_mut(*child) else {
                continue;
            };
            rec.core.parent = Some(group);
            if let Some(g) = self.group_mut(group) {
                if !g.children.contains(child) {
                    g.children.push(*child);
                }
            }
        }
    }

    /// `id` is `group` itself or one of its descendants.
    pub fn existed(&self, group: RecognizerId, id: RecognizerId) -> bool {
        if group == id {
            return true;
        }
        self.group(group)
            .is_some_and(|g| g.children.iter().any(|c| self.existed(*c, id)))
    }

    /// Every leaf recognizer below `id`, in declaration order.
    pub fn get_group_recognizer(&self, id: RecognizerId) -> Vec<RecognizerId> {
        match self.group(id) {
            Some(g) => g
                .children
                .iter()
                .flat_map(|c| self.get_group_recognizer(*c))
                .collect(),
            None if self.contains(id) => vec![id],
            None => Vec::new(),
        }
    }

    /// Every live child of `group` failed.
    pub fn check_all_failed(&self, group: RecognizerId) -> bool {
        self.group(group).is_some_and(|g| {
            g.children
                .iter()
                .filter(|c| self.contains(**c))
                .all(|c| self.state_is(*c, |s| s == RefereeState::Fail))
        })
    }

    /// First blocked child no longer blocked by an earlier pending
    /// sibling, skipping the exclusive group's own winner.
    pub(crate) fn unblock_gesture(&self, group: RecognizerId) -> Option<RecognizerId> {
        let g = self.group(group)?;
        g.children.iter().copied().find(|c| {
            Some(*c) != g.active
                && self.state_is(*c, RefereeState::is_blocked)
                && !self.check_need_blocked(group, *c)
        })
    }

    /// An earlier sibling of `child` is still pending.
    pub(crate) fn check_need_blocked(&self, group: RecognizerId, child: RecognizerId) -> bool {
        let Some(g) = self.group(group) else {
            return false;
        };
        for c in &g.children {
            if *c == child {
                return false;
            }
            if self.state_is(*c, |s| s == RefereeState::Pending) {
                return true;
            }
        }
        false
    }

    /// Children still able to receive events.
    fn live_children(&self, group: RecognizerId) -> Vec<RecognizerId> {
        self.children(group)
            .into_iter()
            .filter(|c| self.state_is(*c, |s| s != RefereeState::Fail))
            .collect()
    }

    /// Targets of an event according to the group mode.
    fn event_targets(&self, group: RecognizerId) -> Vec<RecognizerId> {
        let Some(g) = self.group(group) else {
            return Vec::new();
        };
        match g.mode {
            GroupMode::Exclusive => match g.active.filter(|a| self.contains(*a)) {
                Some(active) => vec![active],
                None => self.live_children(group),
            },
            GroupMode::Parallel => self.live_children(group),
            GroupMode::Sequence => g
                .children
                .get(g.current_index)
                .copied()
                .filter(|c| self.contains(*c))
                .into_iter()
                .collect(),
        }
    }

    pub(crate) fn group_handle_touch(
        &mut self,
        referee: &mut GestureReferee,
        group: RecognizerId,
        ev: &TouchEvent,
    ) {
        let Some(rec) = self.get_mut(group) else {
            return;
        };
        if rec.core.state == RefereeState::Fail || !rec.core.accepts_source(ev.source) {
            return;
        }
        match ev.phase {
            TouchPhase::Down => {
                rec.core.touch_points.insert(ev.id, *ev);
                rec.core.arm(ev.source, ev.tool);
            }
            TouchPhase::Move => {
                if rec.core.touch_points.contains_key(&ev.id) {
                    rec.core.touch_points.insert(ev.id, *ev);
                }
            }
            TouchPhase::Up | TouchPhase::Cancel => {
                rec.core.touch_points.remove(&ev.id);
            }
        }
        for child in self.event_targets(group) {
            self.handle_touch(referee, child, ev);
        }
        if self.group_mode(group) == Some(GroupMode::Sequence) {
            self.sequence_track_deadline(group, ev);
        }
    }

    pub(crate) fn group_handle_axis(
        &mut self,
        referee: &mut GestureReferee,
        group: RecognizerId,
        ev: &AxisEvent,
    ) {
        let Some(rec) = self.get_mut(group) else {
            return;
        };
        if rec.core.state == RefereeState::Fail || !rec.core.accepts_source(ev.source) {
            return;
        }
        rec.core.arm(ev.source, ev.tool);
        for child in self.event_targets(group) {
            self.handle_axis(referee, child, ev);
        }
    }

    pub(crate) fn group_handle_tick(
        &mut self,
        referee: &mut GestureReferee,
        group: RecognizerId,
        now: Duration,
    ) {
        if self.state_is(group, |s| s == RefereeState::Fail) {
            return;
        }
        if self.group_mode(group) == Some(GroupMode::Sequence) && self.sequence_expired(group, now)
        {
            debug!("sequence {group:?}: next gesture did not start in time");
            self.batch_adjudicate(referee, group, GestureDisposal::Reject);
            return;
        }
        for child in self.event_targets(group) {
            self.handle_tick(referee, child, now);
        }
    }

    /// A child reported `disposal`.
    pub(crate) fn group_adjudicate(
        &mut self,
        referee: &mut GestureReferee,
        group: RecognizerId,
        child: RecognizerId,
        disposal: GestureDisposal,
    ) {
        match self.group_mode(group) {
            Some(GroupMode::Exclusive) => self.exclusive_adjudicate(referee, group, child, disposal),
            Some(GroupMode::Parallel) => self.parallel_adjudicate(referee, group, child, disposal),
            Some(GroupMode::Sequence) => self.sequence_adjudicate(referee, group, child, disposal),
            None => {}
        }
    }

    /// The group won its own arbitration.
    pub(crate) fn group_accepted(&mut self, group: RecognizerId) {
        self.set_state(group, RefereeState::Succeed);
        match self.group_mode(group) {
            Some(GroupMode::Exclusive) => self.exclusive_accepted(group),
            Some(GroupMode::Parallel) => self.parallel_accepted(group),
            Some(GroupMode::Sequence) => self.sequence_accepted(group),
            None => {}
        }
    }

    /// The group lost: every undecided child fails with it.
    pub(crate) fn group_rejected(&mut self, group: RecognizerId) {
        self.set_state(group, RefereeState::Fail);
        for child in self.children(group) {
            self.on_rejected(child);
        }
    }

    /// Ask the parent (or the referee) for `disposal` unless the group has
    /// already asked for it or is decided.
    fn group_request(
        &mut self,
        referee: &mut GestureReferee,
        group: RecognizerId,
        disposal: GestureDisposal,
    ) {
        let Some(state) = self.state(group) else {
            return;
        };
        let already = match disposal {
            GestureDisposal::Pending => {
                state.is_pending() || state.is_done() || state == RefereeState::Succeed
            }
            GestureDisposal::Accept => state.is_done(),
            GestureDisposal::Reject => state == RefereeState::Fail,
            GestureDisposal::None => true,
        };
        if !already {
            self.batch_adjudicate(referee, group, disposal);
        }
    }
}
