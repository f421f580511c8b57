// Host-side tests for pure input mapping.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}
mod input {
    include!("../src/input.rs");
}

use input::*;

#[test]
fn left_drag_rotates() {
    let mut drag = PointerDrag::default();
    drag.begin(1, 0, false, true, 100.0, 100.0);
    assert!(drag.is_active());
    assert_eq!(
        drag.moved(1, 110.0, 95.0),
        Some(Gesture::Rotate { dx: 10.0, dy: -5.0 })
    );
    // deltas are relative to the previous move
    assert_eq!(
        drag.moved(1, 112.0, 95.0),
        Some(Gesture::Rotate { dx: 2.0, dy: 0.0 })
    );
}

#[test]
fn right_drag_pans_only_where_allowed() {
    let mut drag = PointerDrag::default();
    drag.begin(1, constants::PAN_BUTTON, false, true, 0.0, 0.0);
    assert_eq!(drag.moved(1, 4.0, 0.0), Some(Gesture::Pan { dx: 4.0, dy: 0.0 }));

    let mut touch = PointerDrag::default();
    touch.begin(7, constants::PAN_BUTTON, true, false, 0.0, 0.0);
    assert_eq!(
        touch.moved(7, 4.0, 0.0),
        Some(Gesture::Rotate { dx: 4.0, dy: 0.0 })
    );
}

#[test]
fn second_pointer_is_ignored() {
    let mut drag = PointerDrag::default();
    drag.begin(1, 0, false, true, 0.0, 0.0);
    drag.begin(2, 0, false, true, 50.0, 50.0);
    assert_eq!(drag.moved(2, 60.0, 60.0), None);
    drag.end(2);
    assert!(drag.is_active());
    drag.end(1);
    assert!(!drag.is_active());
    assert_eq!(drag.moved(1, 5.0, 5.0), None);
}

#[test]
fn stationary_move_produces_no_gesture() {
    let mut drag = PointerDrag::default();
    drag.begin(1, 0, false, true, 20.0, 20.0);
    assert_eq!(drag.moved(1, 20.0, 20.0), None);
}

#[test]
fn wheel_steps_by_delta_mode() {
    assert_eq!(wheel_steps(100.0, 0), 1.0);
    assert_eq!(wheel_steps(-50.0, 0), -0.5);
    assert_eq!(wheel_steps(3.0, 1), 1.0);
    assert_eq!(wheel_steps(-0.2, 2), -1.0);
}

#[test]
fn wheel_steps_are_clamped_and_finite() {
    assert_eq!(wheel_steps(10_000.0, 0), 3.0);
    assert_eq!(wheel_steps(f64::NAN, 0), 0.0);
    assert_eq!(wheel_steps(0.0, 0), 0.0);
}

#[test]
fn zero_page_delta_does_not_zoom() {
    assert_eq!(wheel_steps(0.0, 2), 0.0);
}
