//! Tests for exclusive, parallel and sequence recognizer groups.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gestref::engine::GestureEngine;
use gestref::event::{GestureEvent, GestureKind, SourceTool, SourceType, TouchEvent, TouchPhase};
use gestref::group::GroupMode;
use gestref::processor::{GestureDesc, GestureProcessor, GestureVariant};
use gestref::recognizer::{
    CallbackSlot, PanDirection, RecognizerId, RecognizerKind, RefereeState, SwipeDirection,
};

// ── Helpers ──────────────────────────────────────────────────

type Fired = Rc<RefCell<Vec<(GestureKind, CallbackSlot)>>>;

fn tap() -> GestureDesc {
    GestureDesc::new(GestureVariant::Tap {
        count: 1,
        fingers: 1,
        distance: None,
    })
}

fn long_press() -> GestureDesc {
    GestureDesc::new(GestureVariant::LongPress {
        fingers: 1,
        duration_ms: None,
        repeat: false,
        disable_mouse_left: false,
    })
}

fn pan() -> GestureDesc {
    GestureDesc::new(GestureVariant::Pan {
        fingers: 1,
        direction: PanDirection::All,
        distance: Some(10.0),
        axis_distance: None,
    })
}

fn swipe() -> GestureDesc {
    GestureDesc::new(GestureVariant::Swipe {
        fingers: 1,
        direction: SwipeDirection::All,
        speed: Some(100.0),
    })
}

/// Build a group of `gestures` and record the callbacks of every leaf.
fn build_group(
    engine: &mut GestureEngine,
    mode: GroupMode,
    gestures: Vec<GestureDesc>,
) -> (RecognizerId, Vec<RecognizerId>, Fired) {
    let desc = GestureDesc::new(GestureVariant::Group { mode, gestures });
    let group = GestureProcessor::build(engine, &desc).unwrap();
    let children = children(engine, group);
    let fired: Fired = Rc::default();
    for leaf in engine.arena().get_group_recognizer(group) {
        let rec = engine.recognizer_mut(leaf).unwrap();
        let kind = rec.gesture_kind();
        for slot in [
            CallbackSlot::Action,
            CallbackSlot::Start,
            CallbackSlot::Update,
            CallbackSlot::End,
            CallbackSlot::Cancel,
        ] {
            let fired = Rc::clone(&fired);
            rec.callbacks_mut()
                .set(slot, Box::new(move |_: &GestureEvent| fired.borrow_mut().push((kind, slot))));
        }
    }
    (group, children, fired)
}

fn children(engine: &GestureEngine, group: RecognizerId) -> Vec<RecognizerId> {
    engine
        .recognizer(group)
        .and_then(|r| r.group())
        .map(|g| g.children().to_vec())
        .unwrap_or_default()
}

fn feed(engine: &mut GestureEngine, id: RecognizerId, ev: TouchEvent) {
    if ev.phase == TouchPhase::Down {
        engine.add_gesture_to_scope(ev.id, &[id]);
    }
    engine.handle_touch_event(&ev);
}

// ── Exclusive ────────────────────────────────────────────────

#[test]
fn test_exclusive_tap_beats_long_press() {
    let mut engine = GestureEngine::default();
    let (group, kids, fired) =
        build_group(&mut engine, GroupMode::Exclusive, vec![tap(), long_press()]);
    let (tap_id, press_id) = (kids[0], kids[1]);

    feed(&mut engine, group, TouchEvent::down(0, 10.0, 10.0, 0));
    assert_eq!(engine.state(press_id), Some(RefereeState::Pending));
    assert_eq!(engine.state(group), Some(RefereeState::Pending));
    feed(&mut engine, group, TouchEvent::up(0, 10.0, 10.0, 100));

    let g = engine.recognizer(group).unwrap().group().unwrap();
    assert_eq!(g.active_recognizer(), Some(tap_id));
    assert_eq!(engine.state(group), Some(RefereeState::Succeed));
    assert_eq!(engine.state(tap_id), Some(RefereeState::Succeed));
    assert_eq!(engine.state(press_id), Some(RefereeState::Fail));
    assert_eq!(*fired.borrow(), vec![(GestureKind::Click, CallbackSlot::Action)]);
    assert!(engine.referee().is_empty());
}

#[test]
fn test_exclusive_long_press_beats_tap() {
    let mut engine = GestureEngine::default();
    let (group, kids, fired) =
        build_group(&mut engine, GroupMode::Exclusive, vec![tap(), long_press()]);

    feed(&mut engine, group, TouchEvent::down(0, 10.0, 10.0, 0));
    engine.tick(Duration::from_millis(500));
    assert_eq!(engine.state(kids[1]), Some(RefereeState::Succeed));
    assert_eq!(engine.state(kids[0]), Some(RefereeState::Fail));
    feed(&mut engine, group, TouchEvent::up(0, 10.0, 10.0, 600));
    assert_eq!(
        *fired.borrow(),
        vec![
            (GestureKind::LongPress, CallbackSlot::Action),
            (GestureKind::LongPress, CallbackSlot::End),
        ]
    );
}

#[test]
fn test_exclusive_long_press_settled_by_late_release() {
    let mut engine = GestureEngine::default();
    let (group, kids, fired) =
        build_group(&mut engine, GroupMode::Exclusive, vec![tap(), long_press()]);

    // Held well past the duration with no tick in between.
    feed(&mut engine, group, TouchEvent::down(0, 10.0, 10.0, 0));
    feed(&mut engine, group, TouchEvent::up(0, 10.0, 10.0, 2000));

    let g = engine.recognizer(group).unwrap().group().unwrap();
    assert_eq!(g.active_recognizer(), Some(kids[1]));
    assert_eq!(engine.state(kids[0]), Some(RefereeState::Fail));
    assert_eq!(
        *fired.borrow(),
        vec![
            (GestureKind::LongPress, CallbackSlot::Action),
            (GestureKind::LongPress, CallbackSlot::End),
        ]
    );
}

#[test]
fn test_exclusive_all_children_fail_fails_group() {
    let mut engine = GestureEngine::default();
    let (group, _kids, fired) =
        build_group(&mut engine, GroupMode::Exclusive, vec![tap(), long_press()]);

    feed(&mut engine, group, TouchEvent::down(0, 0.0, 0.0, 0));
    feed(&mut engine, group, TouchEvent::moved(0, 80.0, 0.0, 50));
    assert_eq!(engine.state(group), Some(RefereeState::Fail));
    assert!(engine.arena().check_all_failed(group));
    feed(&mut engine, group, TouchEvent::up(0, 80.0, 0.0, 60));
    assert!(fired.borrow().is_empty());
}

#[test]
fn test_exclusive_later_child_waits_for_earlier_pending() {
    let mut engine = GestureEngine::default();
    let (group, kids, fired) =
        build_group(&mut engine, GroupMode::Exclusive, vec![long_press(), pan()]);
    let (press_id, pan_id) = (kids[0], kids[1]);

    feed(&mut engine, group, TouchEvent::down(0, 0.0, 0.0, 0));
    feed(&mut engine, group, TouchEvent::moved(0, 12.0, 0.0, 20));
    // The pan recognized while the long press is still pending.
    assert_eq!(engine.state(pan_id), Some(RefereeState::SucceedBlocked));
    assert!(fired.borrow().is_empty());

    feed(&mut engine, group, TouchEvent::moved(0, 30.0, 0.0, 40));
    assert_eq!(engine.state(press_id), Some(RefereeState::Fail));
    assert_eq!(engine.state(pan_id), Some(RefereeState::Succeed));
    assert_eq!(fired.borrow()[0], (GestureKind::Pan, CallbackSlot::Start));
}

// ── Parallel ─────────────────────────────────────────────────

#[test]
fn test_parallel_children_both_win() {
    let mut engine = GestureEngine::default();
    let (group, kids, fired) = build_group(&mut engine, GroupMode::Parallel, vec![pan(), swipe()]);

    feed(&mut engine, group, TouchEvent::down(0, 0.0, 0.0, 0));
    feed(&mut engine, group, TouchEvent::moved(0, 50.0, 0.0, 50));
    assert_eq!(engine.state(group), Some(RefereeState::Succeed));
    assert_eq!(engine.state(kids[0]), Some(RefereeState::Succeed));
    feed(&mut engine, group, TouchEvent::moved(0, 100.0, 0.0, 100));
    feed(&mut engine, group, TouchEvent::up(0, 100.0, 0.0, 100));

    assert_eq!(engine.state(kids[1]), Some(RefereeState::Succeed));
    assert_eq!(
        *fired.borrow(),
        vec![
            (GestureKind::Pan, CallbackSlot::Start),
            (GestureKind::Pan, CallbackSlot::Update),
            (GestureKind::Pan, CallbackSlot::End),
            (GestureKind::Swipe, CallbackSlot::Action),
        ]
    );
}

#[test]
fn test_parallel_one_failure_keeps_group_alive() {
    let mut engine = GestureEngine::default();
    let (group, kids, _fired) = build_group(&mut engine, GroupMode::Parallel, vec![tap(), pan()]);

    feed(&mut engine, group, TouchEvent::down(0, 0.0, 0.0, 0));
    feed(&mut engine, group, TouchEvent::moved(0, 5.0, 30.0, 10));
    assert_eq!(engine.state(kids[0]), Some(RefereeState::Fail));
    assert_eq!(engine.state(kids[1]), Some(RefereeState::Succeed));
    assert_eq!(engine.state(group), Some(RefereeState::Succeed));
}

#[test]
fn test_parallel_rearms_after_idle_child() {
    let mut engine = GestureEngine::default();
    let touch_only_press = GestureDesc::new(GestureVariant::LongPress {
        fingers: 1,
        duration_ms: None,
        repeat: false,
        disable_mouse_left: true,
    });
    let (group, kids, fired) =
        build_group(&mut engine, GroupMode::Parallel, vec![tap(), touch_only_press]);
    let mouse = |ev: TouchEvent| ev.with_source(SourceType::Mouse, SourceTool::Mouse);

    feed(&mut engine, group, mouse(TouchEvent::down(0, 10.0, 10.0, 0)));
    feed(&mut engine, group, mouse(TouchEvent::up(0, 10.0, 10.0, 50)));
    assert_eq!(engine.state(group), Some(RefereeState::Succeed));
    // The press never armed under the mouse and is settled on release.
    assert_eq!(engine.state(kids[1]), Some(RefereeState::Fail));
    assert!(engine.referee().is_empty());

    engine.tick(Duration::from_millis(2000));
    feed(&mut engine, group, mouse(TouchEvent::down(0, 10.0, 10.0, 3000)));
    feed(&mut engine, group, mouse(TouchEvent::up(0, 10.0, 10.0, 3050)));
    assert_eq!(
        *fired.borrow(),
        vec![
            (GestureKind::Click, CallbackSlot::Action),
            (GestureKind::Click, CallbackSlot::Action),
        ]
    );
    assert!(engine.referee().is_empty());
}

// ── Sequence ─────────────────────────────────────────────────

#[test]
fn test_sequence_long_press_then_pan() {
    let mut engine = GestureEngine::default();
    let (group, kids, fired) =
        build_group(&mut engine, GroupMode::Sequence, vec![long_press(), pan()]);

    feed(&mut engine, group, TouchEvent::down(0, 0.0, 0.0, 0));
    engine.tick(Duration::from_millis(500));
    let g = engine.recognizer(group).unwrap().group().unwrap();
    assert_eq!(g.current_index(), 1);
    assert_eq!(engine.state(kids[0]), Some(RefereeState::Succeed));
    // The held finger was handed over to the pan.
    assert_eq!(engine.state(kids[1]), Some(RefereeState::Detecting));
    assert_eq!(engine.state(group), Some(RefereeState::Pending));

    feed(&mut engine, group, TouchEvent::moved(0, 30.0, 0.0, 600));
    assert_eq!(engine.state(group), Some(RefereeState::Succeed));
    feed(&mut engine, group, TouchEvent::up(0, 30.0, 0.0, 700));
    assert_eq!(
        *fired.borrow(),
        vec![
            (GestureKind::LongPress, CallbackSlot::Action),
            (GestureKind::Pan, CallbackSlot::Start),
            (GestureKind::Pan, CallbackSlot::End),
        ]
    );
}

#[test]
fn test_sequence_first_step_fails() {
    let mut engine = GestureEngine::default();
    let (group, kids, fired) =
        build_group(&mut engine, GroupMode::Sequence, vec![long_press(), pan()]);

    feed(&mut engine, group, TouchEvent::down(0, 0.0, 0.0, 0));
    feed(&mut engine, group, TouchEvent::up(0, 0.0, 0.0, 100));
    assert_eq!(engine.state(group), Some(RefereeState::Fail));
    assert_eq!(engine.state(kids[1]), Some(RefereeState::Fail));
    assert!(fired.borrow().is_empty());
}

#[test]
fn test_sequence_next_step_across_touches() {
    let mut engine = GestureEngine::default();
    let (group, _kids, fired) =
        build_group(&mut engine, GroupMode::Sequence, vec![tap(), long_press()]);

    feed(&mut engine, group, TouchEvent::down(0, 0.0, 0.0, 0));
    feed(&mut engine, group, TouchEvent::up(0, 0.0, 0.0, 100));
    assert_eq!(engine.state(group), Some(RefereeState::Pending));
    assert!(engine.referee().scope(0).is_some_and(|s| s.is_delay()));

    feed(&mut engine, group, TouchEvent::down(0, 2.0, 0.0, 200));
    engine.tick(Duration::from_millis(700));
    assert_eq!(engine.state(group), Some(RefereeState::Succeed));
    assert_eq!(
        *fired.borrow(),
        vec![
            (GestureKind::Click, CallbackSlot::Action),
            (GestureKind::LongPress, CallbackSlot::Action),
        ]
    );
}

#[test]
fn test_sequence_timeout_rejects_group() {
    let mut engine = GestureEngine::default();
    let (group, kids, fired) =
        build_group(&mut engine, GroupMode::Sequence, vec![tap(), long_press()]);

    feed(&mut engine, group, TouchEvent::down(0, 0.0, 0.0, 0));
    feed(&mut engine, group, TouchEvent::up(0, 0.0, 0.0, 100));
    engine.tick(Duration::from_millis(399));
    assert_eq!(engine.state(group), Some(RefereeState::Pending));
    engine.tick(Duration::from_millis(400));
    assert_eq!(engine.state(group), Some(RefereeState::Fail));
    assert_eq!(engine.state(kids[1]), Some(RefereeState::Fail));
    assert!(engine.referee().is_empty());
    assert_eq!(*fired.borrow(), vec![(GestureKind::Click, CallbackSlot::Action)]);
}

#[test]
fn test_sequence_timeout_checked_against_next_down() {
    let mut engine = GestureEngine::default();
    let (group, kids, fired) = build_group(&mut engine, GroupMode::Sequence, vec![tap(), tap()]);

    feed(&mut engine, group, TouchEvent::down(0, 0.0, 0.0, 0));
    feed(&mut engine, group, TouchEvent::up(0, 0.0, 0.0, 50));
    assert_eq!(engine.state(group), Some(RefereeState::Pending));

    // No tick between the steps: the late Down itself is past the timeout.
    feed(&mut engine, group, TouchEvent::down(0, 0.0, 0.0, 5000));
    assert_eq!(engine.state(group), Some(RefereeState::Fail));
    feed(&mut engine, group, TouchEvent::up(0, 0.0, 0.0, 5050));
    assert_eq!(engine.state(kids[1]), Some(RefereeState::Fail));
    assert_eq!(*fired.borrow(), vec![(GestureKind::Click, CallbackSlot::Action)]);
    assert!(engine.referee().is_empty());
}

// ── Structure ────────────────────────────────────────────────

#[test]
fn test_group_tree_queries() {
    let mut engine = GestureEngine::default();
    let inner = GestureDesc::new(GestureVariant::Group {
        mode: GroupMode::Parallel,
        gestures: vec![pan(), swipe()],
    });
    let (outer, kids, _fired) =
        build_group(&mut engine, GroupMode::Exclusive, vec![tap(), inner]);

    let leaves = engine.arena().get_group_recognizer(outer);
    assert_eq!(leaves.len(), 3);
    assert!(engine.arena().existed(outer, leaves[2]));
    assert!(!engine.arena().existed(kids[0], leaves[2]));
    assert_eq!(engine.arena().parent(kids[1]), Some(outer));
    assert_eq!(
        engine.recognizer(kids[1]).unwrap().gesture_kind(),
        GestureKind::ParallelGroup
    );
}

#[test]
fn test_staged_children_applied_on_next_session() {
    let mut engine = GestureEngine::default();
    let (group, kids, _fired) = build_group(&mut engine, GroupMode::Exclusive, vec![tap()]);
    let pan_id = GestureProcessor::build(&mut engine, &pan()).unwrap();

    match engine.recognizer_mut(group).unwrap().kind_mut() {
        RecognizerKind::Group(g) => g.stage_children(vec![pan_id]),
        other => panic!("not a group: {other:?}"),
    }
    assert_eq!(children(&engine, group), kids);

    feed(&mut engine, group, TouchEvent::down(0, 0.0, 0.0, 0));
    assert_eq!(children(&engine, group), vec![pan_id]);
    assert!(engine.recognizer(kids[0]).is_none());
    assert_eq!(engine.arena().parent(pan_id), Some(group));

    feed(&mut engine, group, TouchEvent::moved(0, 30.0, 0.0, 10));
    assert_eq!(engine.state(pan_id), Some(RefereeState::Succeed));
}
