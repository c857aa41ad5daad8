//! Turning a hit-test result into scope members and feeding events.
use log::trace;

use crate::engine::GestureEngine;
use crate::event::{AxisEvent, AxisPhase, TouchEvent, TouchPhase};
use crate::recognizer::{GestureMask, GesturePriority, NodeId, RecognizerId};

/// Recognizers declared by one node under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct HitNode {
    pub node: NodeId,
    pub recognizers: Vec<RecognizerId>,
}

/// Scope members for a hit chain ordered innermost node first.
///
/// Two or more non-parallel gestures on the same node compete as one
/// exclusive group. An outer node masked with `IgnoreInternal` drops
/// everything collected from the nodes inside it.
pub fn collect_targets(engine: &mut GestureEngine, hits: &[HitNode]) -> Vec<RecognizerId> {
    let mut targets = Vec::new();
    for hit in hits {
        let live: Vec<RecognizerId> = hit
            .recognizers
            .iter()
            .copied()
            .filter(|id| engine.recognizer(*id).is_some())
            .collect();
        let ignore_internal = live.iter().any(|id| {
            engine
                .recognizer(*id)
                .is_some_and(|r| r.mask() == GestureMask::IgnoreInternal)
        });
        if ignore_internal && !targets.is_empty() {
            trace!("node {}: ignoring {} inner gestures", hit.node.0, targets.len());
            targets.clear();
        }
        let (parallel, competing): (Vec<_>, Vec<_>) = live
            .into_iter()
            .partition(|id| engine.arena().priority(*id) == GesturePriority::Parallel);
        if let Some(id) = engine.combine_into_exclusive_recognizer(&competing) {
            targets.push(id);
        }
        targets.extend(parallel);
    }
    targets
}

/// Deliver a touch sample; a `Down` first enters `hits` into the scope of
/// its finger.
pub fn dispatch_touch(engine: &mut GestureEngine, ev: &TouchEvent, hits: &[HitNode]) {
    if ev.phase == TouchPhase::Down {
        let targets = collect_targets(engine, hits);
        engine.add_gesture_to_scope(ev.id, &targets);
    }
    engine.handle_touch_event(ev);
}

/// Deliver an axis sample; `Begin` first enters `hits` into the scope of
/// the axis session.
pub fn dispatch_axis(engine: &mut GestureEngine, ev: &AxisEvent, hits: &[HitNode]) {
    if ev.phase == AxisPhase::Begin {
        let targets = collect_targets(engine, hits);
        engine.add_gesture_to_scope(ev.id, &targets);
    }
    engine.handle_axis_event(ev);
}
