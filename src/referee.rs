//! Arbitration between the top-level recognizers competing for a touch.
//!
//! Every finger (or axis session) opens a [`GestureScope`] listing the
//! recognizers hit by its `Down`. Members report their disposals here; the
//! referee decides who wins, blocks members while an earlier one is still
//! pending, and closes the scope once every member is decided.
use std::collections::BTreeMap;

use log::{debug, trace};

use crate::arena::RecognizerArena;
use crate::event::SourceType;
use crate::recognizer::{GestureDisposal, GesturePriority, RecognizerId, RefereeState};

/// Recognizers competing for one touch id.
#[derive(Debug, Clone)]
pub struct GestureScope {
    touch_id: i32,
    members: Vec<RecognizerId>,
    /// Cleanup requested while members were still deciding.
    delay: bool,
}

impl GestureScope {
    pub fn new(touch_id: i32) -> Self {
        Self {
            touch_id,
            members: Vec::new(),
            delay: false,
        }
    }

    pub fn touch_id(&self) -> i32 {
        self.touch_id
    }

    /// Members in arbitration order.
    pub fn members(&self) -> &[RecognizerId] {
        &self.members
    }

    pub fn is_delay(&self) -> bool {
        self.delay
    }

    pub fn contains(&self, id: RecognizerId) -> bool {
        self.members.contains(&id)
    }

    /// Insert keeping `High` before `Low` before `Parallel`, stable within
    /// each class. Returns false for members already present.
    fn add_member(&mut self, arena: &RecognizerArena, id: RecognizerId) -> bool {
        if self.contains(id) {
            return false;
        }
        let priority = rank(arena.priority(id));
        let pos = self
            .members
            .iter()
            .position(|m| rank(arena.priority(*m)) > priority)
            .unwrap_or(self.members.len());
        self.members.insert(pos, id);
        true
    }

    /// Every member and its subtree decided.
    pub fn query_all_done(&self, arena: &RecognizerArena) -> bool {
        self.members.iter().all(|m| arena.check_states(*m))
    }

    /// An earlier, non-parallel member is still pending.
    fn check_need_blocked(&self, arena: &RecognizerArena, id: RecognizerId) -> bool {
        if arena.priority(id) == GesturePriority::Parallel {
            return false;
        }
        for m in &self.members {
            if *m == id {
                return false;
            }
            if arena.priority(*m) != GesturePriority::Parallel
                && arena.state_is(*m, |s| s == RefereeState::Pending)
            {
                return true;
            }
        }
        false
    }
}

fn rank(priority: GesturePriority) -> u8 {
    match priority {
        GesturePriority::High => 0,
        GesturePriority::Low => 1,
        GesturePriority::Parallel => 2,
    }
}

/// Owner of every open gesture scope.
#[derive(Debug, Default)]
pub struct GestureReferee {
    scopes: BTreeMap<i32, GestureScope>,
    last_source: Option<SourceType>,
}

impl GestureReferee {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scope(&self, touch_id: i32) -> Option<&GestureScope> {
        self.scopes.get(&touch_id)
    }

    pub fn scopes(&self) -> impl Iterator<Item = &GestureScope> {
        self.scopes.values()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Touch ids whose scope contains `id`.
    fn scopes_of(&self, id: RecognizerId) -> Vec<i32> {
        self.scopes
            .values()
            .filter(|s| s.contains(id))
            .map(|s| s.touch_id)
            .collect()
    }

    fn in_other_scope(&self, touch_id: i32, id: RecognizerId) -> bool {
        self.scopes
            .values()
            .any(|s| s.touch_id != touch_id && s.contains(id))
    }

    /// Add `id` to the scope of `touch_id`, opening it if needed. A new
    /// `Down` on a scope waiting for cleanup keeps it open.
    pub fn add_gesture_to_scope(
        &mut self,
        arena: &mut RecognizerArena,
        touch_id: i32,
        id: RecognizerId,
    ) {
        if !arena.contains(id) {
            return;
        }
        let priority = arena.priority(id);
        let scope = self
            .scopes
            .entry(touch_id)
            .or_insert_with(|| GestureScope::new(touch_id));
        scope.delay = false;
        if scope.add_member(arena, id) {
            trace!("scope {touch_id}: + {id:?} ({priority})");
            if !self.in_other_scope(touch_id, id) {
                arena.begin_referee(id);
            }
        }
    }

    /// Entry point for disposals of top-level recognizers.
    pub fn adjudicate(
        &mut self,
        arena: &mut RecognizerArena,
        id: RecognizerId,
        disposal: GestureDisposal,
    ) {
        match disposal {
            GestureDisposal::Accept => self.handle_accept(arena, id),
            GestureDisposal::Pending => self.handle_pending(arena, id),
            GestureDisposal::Reject => self.handle_reject(arena, id),
            GestureDisposal::None => {}
        }
    }

    fn need_blocked(&self, arena: &RecognizerArena, id: RecognizerId) -> bool {
        self.scopes
            .values()
            .any(|s| s.contains(id) && s.check_need_blocked(arena, id))
    }

    fn handle_accept(&mut self, arena: &mut RecognizerArena, id: RecognizerId) {
        self.accept(arena, id);
        self.clean_delayed(arena);
    }

    fn accept(&mut self, arena: &mut RecognizerArena, id: RecognizerId) {
        if arena.state_is(id, RefereeState::is_terminal) {
            return;
        }
        if self.need_blocked(arena, id) {
            debug!("{id:?} recognized, blocked by a pending gesture");
            arena.set_state(id, RefereeState::SucceedBlocked);
            return;
        }
        debug!("{id:?} wins");
        arena.on_accepted(id);
        if arena.priority(id) == GesturePriority::Parallel {
            return;
        }
        for touch_id in self.scopes_of(id) {
            let members = self
                .scopes
                .get(&touch_id)
                .map(|s| s.members.clone())
                .unwrap_or_default();
            for m in members {
                if m != id
                    && arena.priority(m) != GesturePriority::Parallel
                    && !arena.state_is(m, RefereeState::is_terminal)
                {
                    arena.on_rejected(m);
                }
            }
        }
    }

    fn handle_pending(&mut self, arena: &mut RecognizerArena, id: RecognizerId) {
        if arena.state_is(id, |s| s.is_pending() || s.is_done()) {
            return;
        }
        let state = if self.need_blocked(arena, id) {
            RefereeState::PendingBlocked
        } else {
            RefereeState::Pending
        };
        arena.set_state(id, state);
    }

    fn handle_reject(&mut self, arena: &mut RecognizerArena, id: RecognizerId) {
        if arena.state_is(id, |s| s == RefereeState::Fail) {
            return;
        }
        arena.on_rejected(id);
        for touch_id in self.scopes_of(id) {
            while let Some(next) = self.unblock_gesture(arena, touch_id) {
                if arena.state_is(next, |s| s == RefereeState::SucceedBlocked) {
                    self.accept(arena, next);
                } else {
                    arena.set_state(next, RefereeState::Pending);
                }
            }
        }
        self.clean_delayed(arena);
    }

    /// First blocked member of the scope that nothing blocks any more.
    fn unblock_gesture(&self, arena: &RecognizerArena, touch_id: i32) -> Option<RecognizerId> {
        self.scopes.get(&touch_id)?.members.iter().copied().find(|m| {
            arena.state_is(*m, RefereeState::is_blocked) && !self.need_blocked(arena, *m)
        })
    }

    pub(crate) fn clean_delayed(&mut self, arena: &mut RecognizerArena) {
        let delayed: Vec<i32> = self
            .scopes
            .values()
            .filter(|s| s.delay)
            .map(|s| s.touch_id)
            .collect();
        for touch_id in delayed {
            self.clean_gesture_scope(arena, touch_id);
        }
    }

    /// The finger of `touch_id` lifted: close its scope once every member
    /// decided, otherwise mark it for cleanup when the last one does.
    /// Members that never armed are rejected first.
    pub fn clean_gesture_scope(&mut self, arena: &mut RecognizerArena, touch_id: i32) {
        let Some(scope) = self.scopes.get(&touch_id) else {
            return;
        };
        let members = scope.members.clone();
        for m in &members {
            if !self.in_other_scope(touch_id, *m) {
                arena.settle_unarmed(self, *m);
            }
        }
        let Some(scope) = self.scopes.get_mut(&touch_id) else {
            return;
        };
        if !scope.query_all_done(arena) {
            trace!("scope {touch_id}: cleanup delayed");
            scope.delay = true;
            return;
        }
        self.close_scope(touch_id);
    }

    /// Members keep their outcome until they join their next session.
    fn close_scope(&mut self, touch_id: i32) {
        if self.scopes.remove(&touch_id).is_some() {
            trace!("scope {touch_id}: closed");
        }
    }

    /// Drop every scope: undecided members lose, everyone is reset.
    pub fn clean_all(&mut self, arena: &mut RecognizerArena) {
        let scopes = std::mem::take(&mut self.scopes);
        let mut seen = Vec::new();
        for m in scopes.into_values().flat_map(|s| s.members) {
            if seen.contains(&m) {
                continue;
            }
            seen.push(m);
            if !arena.state_is(m, RefereeState::is_terminal) {
                arena.on_rejected(m);
            }
            arena.finish_referee(m, true);
        }
        if !seen.is_empty() {
            debug!("reset {} recognizers", seen.len());
        }
    }

    /// Record the source of a new `Down`; true when it differs from the
    /// previous one while scopes are still open.
    pub fn check_source_type_change(&mut self, source: SourceType) -> bool {
        let changed = !self.scopes.is_empty() && self.last_source.is_some_and(|s| s != source);
        self.last_source = Some(source);
        changed
    }

    /// `new` takes the place of `old` in every scope.
    pub(crate) fn replace_member(&mut self, old: RecognizerId, new: RecognizerId) {
        for scope in self.scopes.values_mut() {
            if scope.contains(new) {
                scope.members.retain(|m| *m != old);
            } else if let Some(slot) = scope.members.iter_mut().find(|m| **m == old) {
                *slot = new;
            }
        }
    }

    /// A member of the scope of `touch_id` already won.
    pub fn has_gesture_accepted(&self, arena: &RecognizerArena, touch_id: i32) -> bool {
        self.scopes.get(&touch_id).is_some_and(|s| {
            s.members
                .iter()
                .any(|m| arena.state_is(*m, |st| st == RefereeState::Succeed))
        })
    }
}
