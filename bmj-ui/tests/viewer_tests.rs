//! Viewer navigation and keyboard binding lifetime

use bmj_ui::keyboard::{Key, KeyboardHub};
use bmj_ui::viewer::{MediaViewerController, ViewerState};

#[test]
fn test_next_n_times_returns_to_start() {
    for n in 1..7 {
        for start in 0..n {
            let mut viewer = MediaViewerController::new(KeyboardHub::new());
            viewer.open(start, n).unwrap();
            for _ in 0..n {
                viewer.next(n);
            }
            assert_eq!(viewer.current(), Some(start), "n={} start={}", n, start);
        }
    }
}

#[test]
fn test_prev_inverts_next() {
    for n in 1..7 {
        for start in 0..n {
            let mut viewer = MediaViewerController::new(KeyboardHub::new());
            viewer.open(start, n).unwrap();
            viewer.next(n);
            viewer.prev(n);
            assert_eq!(viewer.current(), Some(start));
        }
    }
}

#[test]
fn test_wraparound_on_five_photos() {
    let mut viewer = MediaViewerController::new(KeyboardHub::new());
    viewer.open(0, 5).unwrap();

    viewer.prev(5);
    assert_eq!(viewer.state(), ViewerState::Open(4));
    viewer.next(5);
    assert_eq!(viewer.state(), ViewerState::Open(0));
}

#[test]
fn test_keys_drive_navigation() {
    let hub = KeyboardHub::new();
    let mut viewer = MediaViewerController::new(hub.clone());
    viewer.open(1, 3).unwrap();

    hub.dispatch(Key::Right);
    hub.dispatch(Key::Right);
    hub.dispatch(Key::Other('x'));
    assert_eq!(viewer.poll_keys(3), 2);
    assert_eq!(viewer.current(), Some(0));

    hub.dispatch(Key::Left);
    viewer.poll_keys(3);
    assert_eq!(viewer.current(), Some(2));
}

#[test]
fn test_escape_closes_and_detaches() {
    let hub = KeyboardHub::new();
    let mut viewer = MediaViewerController::new(hub.clone());
    viewer.open(0, 2).unwrap();
    assert_eq!(hub.listener_count(), 1);

    hub.dispatch(Key::Escape);
    hub.dispatch(Key::Right);
    viewer.poll_keys(2);

    assert!(!viewer.is_open());
    assert!(!viewer.has_key_binding());
    assert_eq!(hub.listener_count(), 0);
}

#[test]
fn test_binding_released_on_close_and_drop() {
    let hub = KeyboardHub::new();

    let mut viewer = MediaViewerController::new(hub.clone());
    viewer.open(0, 2).unwrap();
    viewer.open(1, 2).unwrap();
    assert_eq!(hub.listener_count(), 1, "reopening must not stack bindings");
    viewer.close();
    assert_eq!(hub.listener_count(), 0);

    viewer.open(0, 2).unwrap();
    drop(viewer);
    assert_eq!(hub.listener_count(), 0);
}

#[test]
fn test_closed_viewer_ignores_navigation() {
    let mut viewer = MediaViewerController::new(KeyboardHub::new());
    viewer.next(4);
    viewer.prev(4);
    assert_eq!(viewer.state(), ViewerState::Closed);
}
