//! Recognizer entity and the state machine contract shared by all gesture
//! algorithms.
//!
//! A [`Recognizer`] is a [`RecognizerCore`] (referee state, tracked
//! fingers, callbacks, configuration shared by every variant) plus a
//! [`RecognizerKind`] holding the variant-specific algorithm or group.
//! Leaf algorithms implement [`GestureAlgorithm`]; they never talk to the
//! referee directly, they return a [`GestureDisposal`] which the arena
//! routes to the parent group or the referee.
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::trace;
use serde::Deserialize;
use slotmap::new_key_type;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::config::{GestureSettings, Thresholds};
use crate::event::{
    AxisEvent, FingerInfo, GestureEvent, GestureKind, SourceTool, SourceType, TouchEvent,
    TouchPhase,
};
use crate::geometry::{Matrix, Point, transform};
use crate::group::RecognizerGroup;

pub mod click;
pub mod long_press;
pub mod pan;
pub mod pinch;
pub mod rotation;
pub mod swipe;

pub use click::ClickRecognizer;
pub use long_press::LongPressRecognizer;
pub use pan::{PanDirection, PanRecognizer};
pub use pinch::PinchRecognizer;
pub use rotation::RotationRecognizer;
pub use swipe::{SwipeDirection, SwipeRecognizer};

new_key_type! {
    /// Generation-checked handle to a recognizer in the arena.
    pub struct RecognizerId;
}

/// Opaque handle of the UI node a recognizer is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Arbitration state of a recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum RefereeState {
    Ready,
    Detecting,
    Pending,
    PendingBlocked,
    Succeed,
    SucceedBlocked,
    Fail,
}

impl RefereeState {
    /// `Succeed` or `Fail`: nothing changes until the session is re-armed.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeed | Self::Fail)
    }

    pub fn is_blocked(self) -> bool {
        matches!(self, Self::PendingBlocked | Self::SucceedBlocked)
    }

    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending | Self::PendingBlocked)
    }

    /// Decided for scope cleanup purposes.
    pub fn is_done(self) -> bool {
        matches!(self, Self::Succeed | Self::SucceedBlocked | Self::Fail)
    }
}

/// Verdict a recognizer reports after processing an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum GestureDisposal {
    Accept,
    Reject,
    Pending,
    None,
}

/// Arbitration priority. `High` members are ordered before `Low` ones in a
/// scope; `Parallel` members neither block nor get shut out by siblings.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Display,
    EnumString,
    IntoStaticStr,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GesturePriority {
    #[default]
    Low,
    High,
    Parallel,
}

/// Whether gestures of inner nodes take part in arbitration.
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
pub enum GestureMask {
    #[default]
    Normal,
    IgnoreInternal,
}

/// Answer of an application gesture judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum GestureJudgeResult {
    Continue,
    Reject,
}

/// Static description of a recognizer handed to the gesture judge.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureInfo {
    pub kind: GestureKind,
    pub tag: Option<String>,
    pub fingers: usize,
    pub priority: GesturePriority,
    pub mask: GestureMask,
    pub node: Option<NodeId>,
}

pub type GestureCallback = Box<dyn FnMut(&GestureEvent)>;
pub type GestureJudge = Box<dyn FnMut(&GestureInfo, &GestureEvent) -> GestureJudgeResult>;

/// Which callback slot to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum CallbackSlot {
    Action,
    Start,
    Update,
    End,
    Cancel,
}

/// UI closures invoked once a recognizer wins.
#[derive(Default)]
pub struct GestureCallbacks {
    pub on_action: Option<GestureCallback>,
    pub on_action_start: Option<GestureCallback>,
    pub on_action_update: Option<GestureCallback>,
    pub on_action_end: Option<GestureCallback>,
    pub on_action_cancel: Option<GestureCallback>,
}

impl GestureCallbacks {
    /// Install `cb` in `slot`, replacing what was there.
    pub fn set(&mut self, slot: CallbackSlot, cb: GestureCallback) {
        *self.slot_mut(slot) = Some(cb);
    }

    pub fn is_set(&self, slot: CallbackSlot) -> bool {
        match slot {
            CallbackSlot::Action => self.on_action.is_some(),
            CallbackSlot::Start => self.on_action_start.is_some(),
            CallbackSlot::Update => self.on_action_update.is_some(),
            CallbackSlot::End => self.on_action_end.is_some(),
            CallbackSlot::Cancel => self.on_action_cancel.is_some(),
        }
    }

    fn slot_mut(&mut self, slot: CallbackSlot) -> &mut Option<GestureCallback> {
        match slot {
            CallbackSlot::Action => &mut self.on_action,
            CallbackSlot::Start => &mut self.on_action_start,
            CallbackSlot::Update => &mut self.on_action_update,
            CallbackSlot::End => &mut self.on_action_end,
            CallbackSlot::Cancel => &mut self.on_action_cancel,
        }
    }
}

impl fmt::Debug for GestureCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureCallbacks")
            .field("on_action", &self.on_action.is_some())
            .field("on_action_start", &self.on_action_start.is_some())
            .field("on_action_update", &self.on_action_update.is_some())
            .field("on_action_end", &self.on_action_end.is_some())
            .field("on_action_cancel", &self.on_action_cancel.is_some())
            .finish()
    }
}

/// State and configuration shared by every recognizer variant.
pub struct RecognizerCore {
    pub(crate) state: RefereeState,
    pub(crate) fingers: usize,
    pub(crate) priority: GesturePriority,
    pub(crate) mask: GestureMask,
    pub(crate) tag: Option<String>,
    pub(crate) node: Option<NodeId>,
    /// Local matrices from the attached node up to the root.
    pub(crate) transforms: Vec<Matrix>,
    pub(crate) touch_points: BTreeMap<i32, TouchEvent>,
    pub(crate) allowed_sources: Vec<SourceType>,
    pub(crate) parent: Option<RecognizerId>,
    pub(crate) settings: Arc<GestureSettings>,
    pub(crate) input_source: SourceType,
    pub(crate) input_tool: SourceTool,
    pub(crate) callbacks: GestureCallbacks,
    pub(crate) judge: Option<GestureJudge>,
}

impl fmt::Debug for RecognizerCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognizerCore")
            .field("state", &self.state)
            .field("fingers", &self.fingers)
            .field("priority", &self.priority)
            .field("mask", &self.mask)
            .field("tag", &self.tag)
            .field("node", &self.node)
            .field("touch_points", &self.touch_points.keys().collect::<Vec<_>>())
            .field("parent", &self.parent)
            .field("callbacks", &self.callbacks)
            .field("judge", &self.judge.is_some())
            .finish_non_exhaustive()
    }
}

impl RecognizerCore {
    pub fn new(fingers: usize, settings: Arc<GestureSettings>) -> Self {
        Self {
            state: RefereeState::Ready,
            fingers,
            priority: GesturePriority::default(),
            mask: GestureMask::default(),
            tag: None,
            node: None,
            transforms: Vec::new(),
            touch_points: BTreeMap::new(),
            allowed_sources: Vec::new(),
            parent: None,
            settings,
            input_source: SourceType::Touch,
            input_tool: SourceTool::Unknown,
            callbacks: GestureCallbacks::default(),
            judge: None,
        }
    }

    /// Thresholds for the source of the current session.
    pub fn thresholds(&self) -> &Thresholds {
        self.settings.thresholds(self.input_source)
    }

    pub(crate) fn accepts_source(&self, source: SourceType) -> bool {
        source != SourceType::Keyboard
            && (self.allowed_sources.is_empty() || self.allowed_sources.contains(&source))
    }

    /// Move from `Ready` to `Detecting` for a session driven by `source`.
    pub(crate) fn arm(&mut self, source: SourceType, tool: SourceTool) {
        if self.state == RefereeState::Ready {
            self.state = RefereeState::Detecting;
            self.input_source = source;
            self.input_tool = tool;
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.state != RefereeState::Ready
    }

    pub(crate) fn local(&self, p: Point) -> Point {
        transform(p, &self.transforms)
    }

    /// Centroid of the tracked fingers.
    pub(crate) fn centroid(&self) -> Option<Point> {
        Point::centroid(self.touch_points.values().map(|e| &e.position))
    }

    /// Template event carrying source, position and the tracked fingers.
    pub(crate) fn event(&self, kind: GestureKind, time: Duration, position: Point) -> GestureEvent {
        let mut ev = GestureEvent::new(kind, time, self.input_source);
        ev.tool = self.input_tool;
        ev.position = position;
        ev.local_position = self.local(position);
        ev.fingers = self
            .touch_points
            .values()
            .map(|t| FingerInfo {
                id: t.id,
                global: t.position,
                local: self.local(t.position),
            })
            .collect();
        if let Some(t) = self.touch_points.values().next() {
            ev.tilt_x = t.tilt_x;
            ev.tilt_y = t.tilt_y;
        }
        ev
    }

    pub(crate) fn fire(&mut self, slot: CallbackSlot, event: &GestureEvent) {
        trace!(
            "{} fires {slot} at ({:.1}, {:.1})",
            event.kind, event.position.x, event.position.y
        );
        if let Some(cb) = self.callbacks.slot_mut(slot) {
            cb(event);
        }
    }

    fn same_config(&self, other: &RecognizerCore) -> bool {
        self.fingers == other.fingers && self.priority == other.priority && self.mask == other.mask
    }
}

/// Contract every leaf gesture algorithm implements.
///
/// Touch handlers are called after the core's tracked points have been
/// updated: a `Down` or `Move` sample is already in `core.touch_points`,
/// an `Up` or `Cancel` sample has already been removed.
pub trait GestureAlgorithm {
    fn kind(&self) -> GestureKind;

    fn on_down(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal;

    fn on_move(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal;

    fn on_up(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal;

    fn on_cancel(&mut self, core: &mut RecognizerCore, ev: &TouchEvent) -> GestureDisposal;

    fn on_axis(&mut self, _core: &mut RecognizerCore, _ev: &AxisEvent) -> GestureDisposal {
        GestureDisposal::None
    }

    fn on_tick(&mut self, _core: &mut RecognizerCore, _now: Duration) -> GestureDisposal {
        GestureDisposal::None
    }

    /// Referee confirmed the win: fire start/action callbacks.
    fn on_accepted(&mut self, core: &mut RecognizerCore);

    /// Lost arbitration or failed on its own.
    fn on_rejected(&mut self, _core: &mut RecognizerCore) {}

    /// Drop in-flight progress for a new session.
    fn reset(&mut self);

    /// Event describing the current progress, handed to the gesture judge.
    fn snapshot(&self, core: &RecognizerCore) -> GestureEvent;

    /// Immutable parameters equal.
    fn same_config(&self, other: &Self) -> bool
    where
        Self: Sized;
}

/// Variant part of a recognizer.
#[derive(Debug, Clone)]
pub enum RecognizerKind {
    Click(ClickRecognizer),
    LongPress(LongPressRecognizer),
    Pan(PanRecognizer),
    Pinch(PinchRecognizer),
    Rotation(RotationRecognizer),
    Swipe(SwipeRecognizer),
    Group(RecognizerGroup),
}

/// A gesture recognizer or recognizer group living in the arena.
#[derive(Debug)]
pub struct Recognizer {
    pub(crate) core: RecognizerCore,
    pub(crate) kind: RecognizerKind,
}

impl Recognizer {
    pub fn new(core: RecognizerCore, kind: RecognizerKind) -> Self {
        Self { core, kind }
    }

    pub fn state(&self) -> RefereeState {
        self.core.state
    }

    pub fn core(&self) -> &RecognizerCore {
        &self.core
    }

    pub fn kind(&self) -> &RecognizerKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut RecognizerKind {
        &mut self.kind
    }

    pub fn gesture_kind(&self) -> GestureKind {
        match &self.kind {
            RecognizerKind::Group(g) => g.gesture_kind(),
            kind => algorithm(kind).map_or(GestureKind::Click, |a| a.kind()),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, RecognizerKind::Group(_))
    }

    pub fn group(&self) -> Option<&RecognizerGroup> {
        match &self.kind {
            RecognizerKind::Group(g) => Some(g),
            _ => None,
        }
    }

    pub(crate) fn group_mut(&mut self) -> Option<&mut RecognizerGroup> {
        match &mut self.kind {
            RecognizerKind::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn info(&self) -> GestureInfo {
        GestureInfo {
            kind: self.gesture_kind(),
            tag: self.core.tag.clone(),
            fingers: self.core.fingers,
            priority: self.core.priority,
            mask: self.core.mask,
            node: self.core.node,
        }
    }

    pub fn fingers(&self) -> usize {
        self.core.fingers
    }

    pub fn priority(&self) -> GesturePriority {
        self.core.priority
    }

    pub fn mask(&self) -> GestureMask {
        self.core.mask
    }

    pub fn tag(&self) -> Option<&str> {
        self.core.tag.as_deref()
    }

    pub fn node(&self) -> Option<NodeId> {
        self.core.node
    }

    pub fn parent(&self) -> Option<RecognizerId> {
        self.core.parent
    }

    pub fn touch_ids(&self) -> Vec<i32> {
        self.core.touch_points.keys().copied().collect()
    }

    pub fn set_priority(&mut self, priority: GesturePriority) {
        self.core.priority = priority;
    }

    pub fn set_mask(&mut self, mask: GestureMask) {
        self.core.mask = mask;
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.core.tag = Some(tag.into());
    }

    pub fn set_allowed_sources(&mut self, sources: Vec<SourceType>) {
        self.core.allowed_sources = sources;
    }

    /// Attach to a node whose local matrices from itself up to the root are
    /// `transforms`.
    pub fn attach_node(&mut self, node: NodeId, transforms: Vec<Matrix>) {
        self.core.node = Some(node);
        self.core.transforms = transforms;
    }

    pub fn callbacks_mut(&mut self) -> &mut GestureCallbacks {
        &mut self.core.callbacks
    }

    pub fn set_on_action(&mut self, cb: impl FnMut(&GestureEvent) + 'static) {
        self.core.callbacks.on_action = Some(Box::new(cb));
    }

    pub fn set_on_action_start(&mut self, cb: impl FnMut(&GestureEvent) + 'static) {
        self.core.callbacks.on_action_start = Some(Box::new(cb));
    }

    pub fn set_on_action_update(&mut self, cb: impl FnMut(&GestureEvent) + 'static) {
        self.core.callbacks.on_action_update = Some(Box::new(cb));
    }

    pub fn set_on_action_end(&mut self, cb: impl FnMut(&GestureEvent) + 'static) {
        self.core.callbacks.on_action_end = Some(Box::new(cb));
    }

    pub fn set_on_action_cancel(&mut self, cb: impl FnMut(&GestureEvent) + 'static) {
        self.core.callbacks.on_action_cancel = Some(Box::new(cb));
    }

    pub fn set_gesture_judge(
        &mut self,
        judge: impl FnMut(&GestureInfo, &GestureEvent) -> GestureJudgeResult + 'static,
    ) {
        self.core.judge = Some(Box::new(judge));
    }

    // -- Leaf event handling ----------------------------------

    /// Feed a touch sample to a leaf algorithm. Groups return `None`, the
    /// arena fans events into their children.
    pub(crate) fn handle_touch(&mut self, ev: &TouchEvent) -> GestureDisposal {
        if self.core.state == RefereeState::Fail || !self.core.accepts_source(ev.source) {
            return GestureDisposal::None;
        }
        let Recognizer { core, kind } = self;
        let Some(alg) = algorithm_mut(kind) else {
            return GestureDisposal::None;
        };
        let disposal = match ev.phase {
            TouchPhase::Down => {
                core.touch_points.insert(ev.id, *ev);
                alg.on_down(core, ev)
            }
            TouchPhase::Move => {
                if !core.touch_points.contains_key(&ev.id) {
                    return GestureDisposal::None;
                }
                core.touch_points.insert(ev.id, *ev);
                alg.on_move(core, ev)
            }
            TouchPhase::Up => {
                if core.touch_points.remove(&ev.id).is_none() {
                    return GestureDisposal::None;
                }
                alg.on_up(core, ev)
            }
            TouchPhase::Cancel => {
                if core.touch_points.remove(&ev.id).is_none() {
                    return GestureDisposal::None;
                }
                alg.on_cancel(core, ev)
            }
        };
        self.judge(disposal)
    }

    pub(crate) fn handle_axis(&mut self, ev: &AxisEvent) -> GestureDisposal {
        if self.core.state == RefereeState::Fail || !self.core.accepts_source(ev.source) {
            return GestureDisposal::None;
        }
        let Recognizer { core, kind } = self;
        let Some(alg) = algorithm_mut(kind) else {
            return GestureDisposal::None;
        };
        let disposal = alg.on_axis(core, ev);
        self.judge(disposal)
    }

    pub(crate) fn handle_tick(&mut self, now: Duration) -> GestureDisposal {
        if self.core.state == RefereeState::Fail {
            return GestureDisposal::None;
        }
        let Recognizer { core, kind } = self;
        let Some(alg) = algorithm_mut(kind) else {
            return GestureDisposal::None;
        };
        let disposal = alg.on_tick(core, now);
        self.judge(disposal)
    }

    /// Consult the gesture judge before an `Accept` leaves the recognizer.
    fn judge(&mut self, disposal: GestureDisposal) -> GestureDisposal {
        if disposal != GestureDisposal::Accept || self.core.judge.is_none() {
            return disposal;
        }
        let info = self.info();
        let Some(snapshot) = algorithm(&self.kind).map(|a| a.snapshot(&self.core)) else {
            return disposal;
        };
        let verdict = self
            .core
            .judge
            .as_mut()
            .map_or(GestureJudgeResult::Continue, |judge| judge(&info, &snapshot));
        if verdict == GestureJudgeResult::Reject {
            trace!("{} vetoed by gesture judge", info.kind);
            GestureDisposal::Reject
        } else {
            disposal
        }
    }

    // -- Terminal notifications -------------------------------

    /// Leaf acceptance. No-op once terminal.
    pub(crate) fn leaf_accepted(&mut self) {
        if self.core.state.is_terminal() {
            return;
        }
        self.core.state = RefereeState::Succeed;
        let Recognizer { core, kind } = self;
        if let Some(alg) = algorithm_mut(kind) {
            alg.on_accepted(core);
        }
    }

    /// Leaf rejection. No-op once terminal.
    pub(crate) fn leaf_rejected(&mut self) {
        if self.core.state.is_terminal() {
            return;
        }
        self.core.state = RefereeState::Fail;
        let Recognizer { core, kind } = self;
        if let Some(alg) = algorithm_mut(kind) {
            alg.on_rejected(core);
        }
    }

    /// Back to `Ready` for a new session.
    pub(crate) fn reset_session(&mut self) {
        self.core.state = RefereeState::Ready;
        self.core.touch_points.clear();
        if let Some(alg) = algorithm_mut(&mut self.kind) {
            alg.reset();
        }
    }

    /// Immutable parameters equal. Groups compare their own parameters,
    /// children are compared by the arena.
    pub(crate) fn same_config(&self, other: &Recognizer) -> bool {
        if !self.core.same_config(&other.core) {
            return false;
        }
        match (&self.kind, &other.kind) {
            (RecognizerKind::Click(a), RecognizerKind::Click(b)) => a.same_config(b),
            (RecognizerKind::LongPress(a), RecognizerKind::LongPress(b)) => a.same_config(b),
            (RecognizerKind::Pan(a), RecognizerKind::Pan(b)) => a.same_config(b),
            (RecognizerKind::Pinch(a), RecognizerKind::Pinch(b)) => a.same_config(b),
            (RecognizerKind::Rotation(a), RecognizerKind::Rotation(b)) => a.same_config(b),
            (RecognizerKind::Swipe(a), RecognizerKind::Swipe(b)) => a.same_config(b),
            (RecognizerKind::Group(a), RecognizerKind::Group(b)) => a.same_config(b),
            _ => false,
        }
    }

    /// Copy of the in-flight session state.
    pub(crate) fn progress(&self) -> Progress {
        Progress {
            state: self.core.state,
            touch_points: self.core.touch_points.clone(),
            input_source: self.core.input_source,
            input_tool: self.core.input_tool,
            kind: self.kind.clone(),
        }
    }

    /// Take over the progress of a recognizer with the same configuration.
    /// Callbacks, judge and node attachment stay those of `self`.
    pub(crate) fn take_progress(&mut self, progress: Progress) {
        self.core.state = progress.state;
        self.core.touch_points = progress.touch_points;
        self.core.input_source = progress.input_source;
        self.core.input_tool = progress.input_tool;
        match (&mut self.kind, progress.kind) {
            (RecognizerKind::Click(a), RecognizerKind::Click(b)) => *a = b,
            (RecognizerKind::LongPress(a), RecognizerKind::LongPress(b)) => *a = b,
            (RecognizerKind::Pan(a), RecognizerKind::Pan(b)) => *a = b,
            (RecognizerKind::Pinch(a), RecognizerKind::Pinch(b)) => *a = b,
            (RecognizerKind::Rotation(a), RecognizerKind::Rotation(b)) => *a = b,
            (RecognizerKind::Swipe(a), RecognizerKind::Swipe(b)) => *a = b,
            (RecognizerKind::Group(a), RecognizerKind::Group(b)) => a.take_progress_from(&b),
            _ => {}
        }
    }
}

/// In-flight session state carried across a reconcile.
#[derive(Debug, Clone)]
pub(crate) struct Progress {
    state: RefereeState,
    touch_points: BTreeMap<i32, TouchEvent>,
    input_source: SourceType,
    input_tool: SourceTool,
    kind: RecognizerKind,
}

fn algorithm(kind: &RecognizerKind) -> Option<&dyn GestureAlgorithm> {
    Some(match kind {
        RecognizerKind::Click(a) => a,
        RecognizerKind::LongPress(a) => a,
        RecognizerKind::Pan(a) => a,
        RecognizerKind::Pinch(a) => a,
        RecognizerKind::Rotation(a) => a,
        RecognizerKind::Swipe(a) => a,
        RecognizerKind::Group(_) => return None,
    })
}

fn algorithm_mut(kind: &mut RecognizerKind) -> Option<&mut dyn GestureAlgorithm> {
    Some(match kind {
        RecognizerKind::Click(a) => a,
        RecognizerKind::LongPress(a) => a,
        RecognizerKind::Pan(a) => a,
        RecognizerKind::Pinch(a) => a,
        RecognizerKind::Rotation(a) => a,
        RecognizerKind::Swipe(a) => a,
        RecognizerKind::Group(_) => return None,
    })
}
