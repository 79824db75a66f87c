use ambient_field::hue::{normalize_hue, HueController, HueSink};
use std::cell::RefCell;
use std::rc::Rc;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn normalize_reduces_into_wheel() {
    assert_eq!(normalize_hue(0.0), Some(0.0));
    assert_eq!(normalize_hue(360.0), Some(0.0));
    assert_eq!(normalize_hue(720.0), Some(0.0));
    assert!(approx(normalize_hue(-30.0).unwrap_or(-1.0), 330.0));
    assert!(approx(normalize_hue(400.5).unwrap_or(-1.0), 40.5));
    assert_eq!(normalize_hue(f32::NAN), None);
    assert_eq!(normalize_hue(f32::INFINITY), None);
    let tiny = normalize_hue(-1e-7).unwrap_or(-1.0);
    assert!((0.0..360.0).contains(&tiny));
}

#[test]
fn default_chases_from_zero_toward_200() {
    let mut hue = HueController::default();
    assert_eq!(hue.target(), 200.0);
    assert_eq!(hue.hue(), 0.0);
    assert!(approx(hue.step(), 4.0));
    assert!(approx(hue.step(), 4.0 + 196.0 * 0.02));
}

#[test]
fn displayed_hue_converges_on_target() {
    let mut hue = HueController::new(120.0, 0.02);
    for _ in 0..1000 {
        hue.step();
    }
    assert!(approx(hue.hue(), 120.0));
}

#[test]
fn set_target_normalizes_and_ignores_garbage() {
    let mut hue = HueController::default();
    hue.set_target(-30.0);
    assert!(approx(hue.target(), 330.0));
    hue.set_target(f32::NAN);
    assert!(approx(hue.target(), 330.0));
}

#[test]
fn chase_is_linear_across_the_seam() {
    let mut hue = HueController::new(350.0, 0.5);
    for _ in 0..60 {
        hue.step();
    }
    assert!(approx(hue.hue(), 350.0));

    hue.set_target(10.0);
    let next = hue.step();
    // Halfway along the number line, not through 0/360.
    assert!(approx(next, 180.0), "got {next}");
}

#[test]
fn rate_is_clamped() {
    assert_eq!(HueController::new(0.0, 3.0).rate(), 1.0);
    assert_eq!(HueController::new(0.0, -1.0).rate(), 0.0);
}

#[test]
fn listeners_receive_normalized_targets_until_unsubscribed() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut hue = HueController::default();

    let id = {
        let seen = Rc::clone(&seen);
        hue.subscribe(move |h| seen.borrow_mut().push(h))
    };
    hue.set_hue(370.0);
    hue.set_target(90.0);
    assert_eq!(seen.borrow().len(), 2);
    assert!(approx(seen.borrow()[0], 10.0));
    assert!(approx(seen.borrow()[1], 90.0));

    assert!(hue.unsubscribe(id));
    assert!(!hue.unsubscribe(id));
    hue.set_target(45.0);
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn controller_works_through_sink_trait() {
    let mut hue = HueController::default();
    {
        let sink: &mut dyn HueSink = &mut hue;
        sink.set_hue(42.0);
    }
    assert!(approx(hue.target(), 42.0));
}
