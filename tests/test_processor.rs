//! Tests for gesture descriptions, tree materialization, reconciliation
//! and hit-chain target collection.

use gestref::dispatch::{HitNode, collect_targets, dispatch_touch};
use gestref::engine::GestureEngine;
use gestref::event::{SourceType, TouchEvent};
use gestref::group::GroupMode;
use gestref::processor::{GestureDesc, GestureProcessor, GestureVariant};
use gestref::recognizer::{
    GestureMask, GesturePriority, NodeId, PanDirection, RecognizerId, RefereeState,
};

// ── Helpers ──────────────────────────────────────────────────

fn parse(text: &str) -> GestureDesc {
    toml::from_str(text).unwrap()
}

fn pan(fingers: usize) -> GestureDesc {
    GestureDesc::new(GestureVariant::Pan {
        fingers,
        direction: PanDirection::All,
        distance: Some(10.0),
        axis_distance: None,
    })
}

fn tap() -> GestureDesc {
    GestureDesc::new(GestureVariant::Tap {
        count: 1,
        fingers: 1,
        distance: None,
    })
}

fn on_node(engine: &mut GestureEngine, desc: GestureDesc, node: u64) -> RecognizerId {
    GestureProcessor::build_for_node(engine, &desc, NodeId(node), &[]).unwrap()
}

// ── Descriptions ─────────────────────────────────────────────

#[test]
fn test_parse_leaf_with_defaults() {
    let desc = parse(r#"type = "tap""#);
    assert_eq!(desc.priority, GesturePriority::Low);
    assert_eq!(desc.mask, GestureMask::Normal);
    assert!(desc.allowed_sources.is_empty());
    assert_eq!(
        desc.gesture,
        GestureVariant::Tap {
            count: 1,
            fingers: 1,
            distance: None,
        }
    );

    let pinch = parse(r#"type = "pinch""#);
    assert_eq!(
        pinch.gesture,
        GestureVariant::Pinch {
            fingers: 2,
            distance: None,
        }
    );
}

#[test]
fn test_parse_common_fields() {
    let desc = parse(
        r#"
type = "pan"
direction = "horizontal"
distance = 12.5
priority = "high"
mask = "ignore_internal"
tag = "scroller"
allowed_sources = ["touch", "touch_pad"]
"#,
    );
    assert_eq!(desc.priority, GesturePriority::High);
    assert_eq!(desc.mask, GestureMask::IgnoreInternal);
    assert_eq!(desc.tag.as_deref(), Some("scroller"));
    assert_eq!(desc.allowed_sources, vec![SourceType::Touch, SourceType::TouchPad]);
    assert_eq!(
        desc.gesture,
        GestureVariant::Pan {
            fingers: 1,
            direction: PanDirection::Horizontal,
            distance: Some(12.5),
            axis_distance: None,
        }
    );
}

#[test]
fn test_parse_nested_group() {
    let desc = parse(
        r#"
type = "group"
mode = "sequence"

[[gestures]]
type = "long_press"
duration_ms = 400

[[gestures]]
type = "group"

[[gestures.gestures]]
type = "pan"

[[gestures.gestures]]
type = "swipe"
speed = 300.0
"#,
    );
    let GestureVariant::Group { mode, gestures } = &desc.gesture else {
        panic!("not a group: {desc:?}");
    };
    assert_eq!(*mode, GroupMode::Sequence);
    assert_eq!(gestures.len(), 2);
    match &gestures[1].gesture {
        GestureVariant::Group { mode, gestures } => {
            assert_eq!(*mode, GroupMode::Exclusive);
            assert_eq!(gestures.len(), 2);
        }
        other => panic!("not a group: {other:?}"),
    }

    let mut engine = GestureEngine::default();
    let root = GestureProcessor::build(&mut engine, &desc).unwrap();
    assert_eq!(engine.arena().get_group_recognizer(root).len(), 3);
}

#[test]
fn test_parse_unknown_type_fails() {
    assert!(toml::from_str::<GestureDesc>(r#"type = "flick""#).is_err());
}

#[test]
fn test_validate_rejects_impossible_descriptions() {
    let zero_count = GestureDesc::new(GestureVariant::Tap {
        count: 0,
        fingers: 1,
        distance: None,
    });
    let msg = zero_count.validate().unwrap_err().to_string();
    assert!(msg.contains("tap"));
    assert!(msg.contains("count"));

    let msg = pan(0).with_tag("drag").validate().unwrap_err().to_string();
    assert!(msg.contains("drag"));
    assert!(msg.contains("fingers"));

    let empty = GestureDesc::new(GestureVariant::Group {
        mode: GroupMode::Parallel,
        gestures: Vec::new(),
    });
    assert!(empty.validate().is_err());

    let nested_bad = GestureDesc::new(GestureVariant::Group {
        mode: GroupMode::Exclusive,
        gestures: vec![tap(), pan(0)],
    });
    let mut engine = GestureEngine::default();
    assert!(GestureProcessor::build(&mut engine, &nested_bad).is_err());

    let negative = GestureDesc::new(GestureVariant::Rotation {
        fingers: 2,
        angle: Some(-1.0),
    });
    assert!(negative.validate().is_err());
}

#[test]
fn test_build_applies_common_fields() {
    let mut engine = GestureEngine::default();
    let desc = pan(1)
        .with_priority(GesturePriority::High)
        .with_mask(GestureMask::IgnoreInternal)
        .with_tag("drag");
    let id = on_node(&mut engine, desc, 4);
    let info = engine.recognizer(id).unwrap().info();
    assert_eq!(info.priority, GesturePriority::High);
    assert_eq!(info.mask, GestureMask::IgnoreInternal);
    assert_eq!(info.tag.as_deref(), Some("drag"));
    assert_eq!(info.node, Some(NodeId(4)));
    assert_eq!(info.fingers, 1);
}

// ── Reconcile ────────────────────────────────────────────────

#[test]
fn test_reconcile_carries_progress() {
    let mut engine = GestureEngine::default();
    let old = GestureProcessor::build(&mut engine, &pan(1)).unwrap();
    engine.add_gesture_to_scope(0, &[old]);
    engine.handle_touch_event(&TouchEvent::down(0, 0.0, 0.0, 0));
    engine.handle_touch_event(&TouchEvent::moved(0, 6.0, 0.0, 10));

    let new = GestureProcessor::build(&mut engine, &pan(1)).unwrap();
    assert!(engine.reconcile(new, old));
    assert!(engine.recognizer(old).is_none());
    assert_eq!(engine.state(new), Some(RefereeState::Detecting));
    assert_eq!(engine.recognizer(new).unwrap().touch_ids(), vec![0]);
    assert_eq!(engine.referee().scope(0).unwrap().members(), &[new]);

    // Offset keeps accumulating from where the old recognizer left off.
    engine.handle_touch_event(&TouchEvent::moved(0, 11.0, 0.0, 20));
    assert_eq!(engine.state(new), Some(RefereeState::Succeed));
}

#[test]
fn test_reconcile_refuses_different_config() {
    let mut engine = GestureEngine::default();
    let old = GestureProcessor::build(&mut engine, &pan(1)).unwrap();
    let two_fingers = GestureProcessor::build(&mut engine, &pan(2)).unwrap();
    assert!(!engine.reconcile(two_fingers, old));
    assert!(engine.recognizer(old).is_some());

    let high = GestureProcessor::build(&mut engine, &pan(1).with_priority(GesturePriority::High))
        .unwrap();
    assert!(!engine.reconcile(high, old));

    let other_kind = GestureProcessor::build(&mut engine, &tap()).unwrap();
    assert!(!engine.reconcile(other_kind, old));
}

#[test]
fn test_reconcile_group_maps_active_child() {
    let group = || {
        GestureDesc::new(GestureVariant::Group {
            mode: GroupMode::Exclusive,
            gestures: vec![tap(), pan(1)],
        })
    };
    let mut engine = GestureEngine::default();
    let old = GestureProcessor::build(&mut engine, &group()).unwrap();
    engine.add_gesture_to_scope(0, &[old]);
    engine.handle_touch_event(&TouchEvent::down(0, 0.0, 0.0, 0));
    engine.handle_touch_event(&TouchEvent::moved(0, 30.0, 0.0, 10));

    let new = GestureProcessor::build(&mut engine, &group()).unwrap();
    assert!(engine.reconcile(new, old));
    let g = engine.recognizer(new).unwrap().group().unwrap();
    assert_eq!(g.active_recognizer(), Some(g.children()[1]));
    assert_eq!(engine.state(new), Some(RefereeState::Succeed));
}

// ── Target collection ────────────────────────────────────────

#[test]
fn test_collect_innermost_first() {
    let mut engine = GestureEngine::default();
    let inner = on_node(&mut engine, tap(), 1);
    let outer = on_node(&mut engine, pan(1), 2);
    let hits = [
        HitNode {
            node: NodeId(1),
            recognizers: vec![inner],
        },
        HitNode {
            node: NodeId(2),
            recognizers: vec![outer],
        },
    ];
    assert_eq!(collect_targets(&mut engine, &hits), vec![inner, outer]);
}

#[test]
fn test_ignore_internal_drops_inner_targets() {
    let mut engine = GestureEngine::default();
    let inner = on_node(&mut engine, tap(), 1);
    let outer = on_node(&mut engine, pan(1).with_mask(GestureMask::IgnoreInternal), 2);
    let hits = [
        HitNode {
            node: NodeId(1),
            recognizers: vec![inner],
        },
        HitNode {
            node: NodeId(2),
            recognizers: vec![outer],
        },
    ];
    assert_eq!(collect_targets(&mut engine, &hits), vec![outer]);
}

#[test]
fn test_same_node_siblings_combined_and_cached() {
    let mut engine = GestureEngine::default();
    let a = on_node(&mut engine, tap(), 1);
    let b = on_node(&mut engine, pan(1).with_priority(GesturePriority::High), 1);
    let p = on_node(&mut engine, pan(1).with_priority(GesturePriority::Parallel), 1);
    let hits = [HitNode {
        node: NodeId(1),
        recognizers: vec![a, b, p],
    }];

    let first = collect_targets(&mut engine, &hits);
    assert_eq!(first.len(), 2);
    let wrapper = first[0];
    assert_eq!(first[1], p);
    let rec = engine.recognizer(wrapper).unwrap();
    assert_eq!(rec.group().unwrap().children(), &[a, b]);
    assert_eq!(rec.priority(), GesturePriority::High);
    assert_eq!(rec.node(), Some(NodeId(1)));

    assert_eq!(collect_targets(&mut engine, &hits), first);

    // Dropping a member invalidates the cached wrapper.
    engine.remove_recognizer(b);
    let third = collect_targets(&mut engine, &hits);
    assert_eq!(third, vec![a, p]);
}

#[test]
fn test_dispatch_touch_runs_session() {
    let mut engine = GestureEngine::default();
    let a = on_node(&mut engine, tap(), 1);
    let hits = [HitNode {
        node: NodeId(1),
        recognizers: vec![a],
    }];
    dispatch_touch(&mut engine, &TouchEvent::down(0, 1.0, 1.0, 0), &hits);
    // Later samples need no hit chain.
    dispatch_touch(&mut engine, &TouchEvent::up(0, 1.0, 1.0, 40), &[]);
    assert_eq!(engine.state(a), Some(RefereeState::Succeed));
    assert!(engine.referee().is_empty());
}
