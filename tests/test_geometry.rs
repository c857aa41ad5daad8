//! Tests for points, transforms, angle handling and velocity tracking.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gestref::engine::GestureEngine;
use gestref::event::{AxisEvent, AxisPhase, GestureEvent, TouchEvent};
use gestref::geometry::{Matrix, Offset, Point, normalize_angle, transform};
use gestref::processor::{GestureDesc, GestureProcessor, GestureVariant};
use gestref::recognizer::NodeId;
use gestref::velocity::VelocityTracker;

fn close(a: Point, b: Point) -> bool {
    a.distance_to(&b) < 1e-9
}

// ── Points and offsets ───────────────────────────────────────

#[test]
fn test_centroid() {
    let points = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(5.0, 30.0)];
    assert_eq!(Point::centroid(&points), Some(Point::new(5.0, 10.0)));
    assert_eq!(Point::centroid(&[]), None);
}

#[test]
fn test_offset_angle_points_down() {
    assert!((Offset::new(0.0, 5.0).angle_deg() - 90.0).abs() < 1e-9);
    assert!((Offset::new(-3.0, 0.0).angle_deg() - 180.0).abs() < 1e-9);
    assert_eq!(Offset::new(3.0, 4.0).length(), 5.0);
}

#[test]
fn test_normalize_angle() {
    assert_eq!(normalize_angle(190.0), -170.0);
    assert_eq!(normalize_angle(-180.0), 180.0);
    assert_eq!(normalize_angle(540.0), 180.0);
    assert_eq!(normalize_angle(-30.0), -30.0);
}

// ── Transforms ───────────────────────────────────────────────

#[test]
fn test_transform_through_chain() {
    // Node translated inside a parent scaled by two.
    let chain = [Matrix::translate(10.0, 0.0), Matrix::scale(2.0, 2.0)];
    let local = transform(Point::new(40.0, 20.0), &chain);
    assert!(close(local, Point::new(10.0, 10.0)));
}

#[test]
fn test_transform_rotation() {
    let local = transform(Point::new(0.0, 10.0), &[Matrix::rotate_deg(90.0)]);
    assert!(close(local, Point::new(10.0, 0.0)));
}

#[test]
fn test_singular_transform_leaves_point() {
    let p = Point::new(3.0, 4.0);
    assert_eq!(transform(p, &[Matrix::scale(0.0, 1.0)]), p);
    assert_eq!(transform(p, &[]), p);
}

#[test]
fn test_invert_round_trip() {
    let m = Matrix::translate(5.0, -2.0) * Matrix::rotate_deg(30.0) * Matrix::scale(2.0, 3.0);
    let p = Point::new(7.0, 11.0);
    let back = m.invert().unwrap().apply(m.apply(p));
    assert!(close(back, p));
}

#[test]
fn test_gesture_event_carries_local_position() {
    let mut engine = GestureEngine::default();
    let desc = GestureDesc::new(GestureVariant::Tap {
        count: 1,
        fingers: 1,
        distance: None,
    });
    let id = GestureProcessor::build_for_node(
        &mut engine,
        &desc,
        NodeId(1),
        &[Matrix::translate(100.0, 50.0)],
    )
    .unwrap();
    let seen: Rc<RefCell<Option<GestureEvent>>> = Rc::default();
    let s = Rc::clone(&seen);
    engine
        .recognizer_mut(id)
        .unwrap()
        .set_on_action(move |e: &GestureEvent| *s.borrow_mut() = Some(e.clone()));

    engine.add_gesture_to_scope(0, &[id]);
    engine.handle_touch_event(&TouchEvent::down(0, 110.0, 60.0, 0));
    engine.handle_touch_event(&TouchEvent::up(0, 110.0, 60.0, 30));

    let event = seen.borrow().clone().unwrap();
    assert_eq!(event.position, Point::new(110.0, 60.0));
    assert!(close(event.local_position, Point::new(10.0, 10.0)));
    assert_eq!(event.fingers.len(), 1);
    assert!(close(event.fingers[0].local, Point::new(10.0, 10.0)));
}

// ── Velocity ─────────────────────────────────────────────────

#[test]
fn test_velocity_over_window() {
    let mut tracker = VelocityTracker::new(Duration::from_millis(100));
    tracker.add(Duration::ZERO, Point::new(0.0, 0.0));
    assert_eq!(tracker.velocity(), Offset::ZERO);
    tracker.add(Duration::from_millis(50), Point::new(50.0, 0.0));
    tracker.add(Duration::from_millis(100), Point::new(100.0, 0.0));
    assert!((tracker.speed() - 1000.0).abs() < 1e-6);
}

#[test]
fn test_velocity_drops_old_samples() {
    let mut tracker = VelocityTracker::new(Duration::from_millis(100));
    tracker.add(Duration::ZERO, Point::new(0.0, 0.0));
    tracker.add(Duration::from_millis(500), Point::new(0.0, 0.0));
    tracker.add(Duration::from_millis(550), Point::new(0.0, 50.0));
    tracker.add(Duration::from_millis(600), Point::new(0.0, 100.0));
    let v = tracker.velocity();
    assert!(v.dx.abs() < 1e-9);
    assert!((v.dy - 1000.0).abs() < 1e-6);
}

#[test]
fn test_velocity_out_of_order_restarts() {
    let mut tracker = VelocityTracker::new(Duration::from_millis(100));
    tracker.add(Duration::from_millis(200), Point::new(0.0, 0.0));
    tracker.add(Duration::from_millis(100), Point::new(50.0, 0.0));
    assert_eq!(tracker.velocity(), Offset::ZERO);
}

// ── Input samples ────────────────────────────────────────────

#[test]
fn test_axis_scroll_offset() {
    let ev = AxisEvent::new(0, AxisPhase::Update, 0.0, 0.0, Duration::ZERO).with_scroll(-2.0, 5.0);
    assert_eq!(ev.scroll(), Offset::new(-2.0, 5.0));
    assert_eq!(ev.pinch_scale, 0.0);
}
