//! Engine driving recognizers and arbitration for one input pipeline.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::arena::RecognizerArena;
use crate::config::GestureSettings;
use crate::event::{AxisEvent, AxisPhase, SourceType, TouchEvent, TouchPhase};
use crate::group::{GroupMode, RecognizerGroup};
use crate::recognizer::{
    GestureMask, GesturePriority, NodeId, PanDirection, Recognizer, RecognizerCore, RecognizerId,
    RecognizerKind, RefereeState,
};
use crate::referee::GestureReferee;

/// Owns the recognizer arena, the referee and the thresholds.
#[derive(Debug)]
pub struct GestureEngine {
    arena: RecognizerArena,
    referee: GestureReferee,
    settings: Arc<GestureSettings>,
    /// Exclusive wrappers synthesized for same-node siblings.
    exclusive_cache: HashMap<Vec<RecognizerId>, RecognizerId>,
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new(GestureSettings::default())
    }
}

impl GestureEngine {
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            arena: RecognizerArena::new(),
            referee: GestureReferee::new(),
            settings: Arc::new(settings),
            exclusive_cache: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &Arc<GestureSettings> {
        &self.settings
    }

    pub fn arena(&self) -> &RecognizerArena {
        &self.arena
    }

    pub fn referee(&self) -> &GestureReferee {
        &self.referee
    }

    /// Fresh core for a recognizer owned by this engine.
    pub fn core(&self, fingers: usize) -> RecognizerCore {
        RecognizerCore::new(fingers, Arc::clone(&self.settings))
    }

    pub fn insert(&mut self, recognizer: Recognizer) -> RecognizerId {
        self.arena.insert(recognizer)
    }

    /// Create a group recognizer owning `children`.
    pub fn insert_group(&mut self, mode: GroupMode, children: &[RecognizerId]) -> RecognizerId {
        let group = Recognizer::new(self.core(1), RecognizerKind::Group(RecognizerGroup::new(mode)));
        let id = self.arena.insert(group);
        self.arena.add_children(id, children);
        id
    }

    pub fn recognizer(&self, id: RecognizerId) -> Option<&Recognizer> {
        self.arena.get(id)
    }

    pub fn recognizer_mut(&mut self, id: RecognizerId) -> Option<&mut Recognizer> {
        self.arena.get_mut(id)
    }

    pub fn state(&self, id: RecognizerId) -> Option<RefereeState> {
        self.arena.state(id)
    }

    /// Drop a recognizer (and the children a group owns). Scopes keep the
    /// stale handle, which resolves to nothing from now on.
    pub fn remove_recognizer(&mut self, id: RecognizerId) -> Option<Recognizer> {
        let removed = self.arena.remove(id);
        self.prune_cache();
        removed
    }

    /// Node teardown: every recognizer attached to `node` goes away.
    pub fn remove_node(&mut self, node: NodeId) -> usize {
        let ids: Vec<_> = self
            .arena
            .ids()
            .filter(|id| self.arena.get(*id).is_some_and(|r| r.node() == Some(node)))
            .collect();
        let mut removed = 0;
        for id in ids {
            if self.arena.remove(id).is_some() {
                removed += 1;
            }
        }
        self.prune_cache();
        debug!("node {}: removed {removed} recognizers", node.0);
        removed
    }

    /// Drop wrappers whose member set is no longer intact. Surviving
    /// members are detached and report to the referee again.
    fn prune_cache(&mut self) {
        let stale: Vec<(Vec<RecognizerId>, RecognizerId)> = self
            .exclusive_cache
            .iter()
            .filter(|(children, group)| {
                !self.arena.contains(**group) || children.iter().any(|c| !self.arena.contains(*c))
            })
            .map(|(children, group)| (children.clone(), *group))
            .collect();
        for (children, group) in stale {
            self.exclusive_cache.remove(&children);
            for child in children {
                if let Some(rec) = self.arena.get_mut(child) {
                    if rec.core.parent == Some(group) {
                        rec.core.parent = None;
                    }
                }
            }
            self.arena.remove(group);
        }
    }

    /// Enter recognizers, innermost node first, into the scope of
    /// `touch_id`.
    pub fn add_gesture_to_scope(&mut self, touch_id: i32, ids: &[RecognizerId]) {
        for id in ids {
            self.referee.add_gesture_to_scope(&mut self.arena, touch_id, *id);
        }
    }

    /// A new session on a different source than the open scopes: reset
    /// everything except the scope of `touch_id` just opened.
    fn reset_on_source_change(&mut self, touch_id: i32, source: SourceType) {
        if !self.referee.check_source_type_change(source) {
            return;
        }
        let others = self.referee.scopes().any(|s| s.touch_id() != touch_id);
        if !others {
            return;
        }
        debug!("input source changed to {source}, resetting open scopes");
        let members = self
            .referee
            .scope(touch_id)
            .map(|s| s.members().to_vec())
            .unwrap_or_default();
        self.referee.clean_all(&mut self.arena);
        self.add_gesture_to_scope(touch_id, &members);
    }

    fn scope_members(&self, touch_id: i32) -> Vec<RecognizerId> {
        self.referee
            .scope(touch_id)
            .map(|s| s.members().to_vec())
            .unwrap_or_default()
    }

    pub fn handle_touch_event(&mut self, ev: &TouchEvent) {
        if ev.phase == TouchPhase::Down {
            self.reset_on_source_change(ev.id, ev.source);
        }
        self.expire_deadlines(ev.time);
        for id in self.scope_members(ev.id) {
            self.arena.handle_touch(&mut self.referee, id, ev);
        }
        if matches!(ev.phase, TouchPhase::Up | TouchPhase::Cancel) {
            self.referee.clean_gesture_scope(&mut self.arena, ev.id);
        }
    }

    pub fn handle_axis_event(&mut self, ev: &AxisEvent) {
        if ev.phase == AxisPhase::Begin {
            self.reset_on_source_change(ev.id, ev.source);
        }
        self.expire_deadlines(ev.time);
        for id in self.scope_members(ev.id) {
            self.arena.handle_axis(&mut self.referee, id, ev);
        }
        if matches!(ev.phase, AxisPhase::End | AxisPhase::Cancel) {
            self.referee.clean_gesture_scope(&mut self.arena, ev.id);
        }
    }

    /// Advance the clock: deadlines (long-press, multi-tap, sequence
    /// timeout) expire here.
    pub fn tick(&mut self, now: Duration) {
        self.expire_deadlines(now);
        self.referee.clean_delayed(&mut self.arena);
    }

    /// Deliver `now` to every scope member. Input samples run this first,
    /// so a deadline that passed without a tick is settled before the
    /// sample itself is seen.
    fn expire_deadlines(&mut self, now: Duration) {
        let mut members: Vec<RecognizerId> = Vec::new();
        for scope in self.referee.scopes() {
            for m in scope.members() {
                if !members.contains(m) {
                    members.push(*m);
                }
            }
        }
        for id in members {
            self.arena.handle_tick(&mut self.referee, id, now);
        }
    }

    pub fn clean_all(&mut self) {
        self.referee.clean_all(&mut self.arena);
    }

    /// `new`, rebuilt from the same description as `old`, takes over its
    /// in-flight progress and scope membership; `old` is dropped. Returns
    /// false when the trees differ, leaving both untouched.
    pub fn reconcile(&mut self, new: RecognizerId, old: RecognizerId) -> bool {
        if new == old {
            return true;
        }
        if !self.arena.reconcile(new, old) {
            return false;
        }
        self.referee.replace_member(old, new);
        self.arena.remove(old);
        self.prune_cache();
        true
    }

    /// Wrap same-node siblings into one exclusive group so they compete as
    /// a unit. The wrapper is reused while the member set is unchanged.
    pub fn combine_into_exclusive_recognizer(
        &mut self,
        targets: &[RecognizerId],
    ) -> Option<RecognizerId> {
        let live: Vec<RecognizerId> = targets
            .iter()
            .copied()
            .filter(|id| self.arena.contains(*id))
            .collect();
        if live.len() < 2 {
            return live.first().copied();
        }
        if let Some(group) = self.exclusive_cache.get(&live) {
            if self.arena.contains(*group) {
                return Some(*group);
            }
        }
        let priority = if live
            .iter()
            .any(|id| self.arena.priority(*id) == GesturePriority::High)
        {
            GesturePriority::High
        } else {
            GesturePriority::Low
        };
        let mask = if live.iter().any(|id| {
            self.arena
                .get(*id)
                .is_some_and(|r| r.mask() == GestureMask::IgnoreInternal)
        }) {
            GestureMask::IgnoreInternal
        } else {
            GestureMask::Normal
        };
        let attachment = self
            .arena
            .get(live[0])
            .and_then(|r| r.node().map(|n| (n, r.core().transforms.clone())));

        let group = self.insert_group(GroupMode::Exclusive, &live);
        if let Some(rec) = self.arena.get_mut(group) {
            rec.set_priority(priority);
            rec.set_mask(mask);
            if let Some((node, transforms)) = attachment {
                rec.attach_node(node, transforms);
            }
        }
        debug!("combined {} recognizers into exclusive {group:?}", live.len());
        self.exclusive_cache.insert(live, group);
        Some(group)
    }

    /// Returns false when `id` is not a pan recognizer.
    pub fn change_pan_direction(&mut self, id: RecognizerId, direction: PanDirection) -> bool {
        let Some(rec) = self.arena.get_mut(id) else {
            return false;
        };
        let state = rec.core.state;
        match &mut rec.kind {
            RecognizerKind::Pan(pan) => {
                pan.change_direction(state, direction);
                true
            }
            _ => false,
        }
    }

    /// Returns false when `id` is not a pan recognizer.
    pub fn change_pan_fingers(&mut self, id: RecognizerId, fingers: usize) -> bool {
        let Some(Recognizer { core, kind }) = self.arena.get_mut(id) else {
            return false;
        };
        match kind {
            RecognizerKind::Pan(pan) => {
                pan.change_fingers(core, fingers);
                true
            }
            _ => false,
        }
    }
}
