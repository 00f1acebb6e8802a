//! Selection state machine over galleries of varying size

use bmj_common::MediaRef;
use bmj_ui::selection::{CheckState, MediaSelectionController, SelectionState};

fn gallery(n: usize) -> Vec<MediaRef> {
    (0..n).map(|i| MediaRef::new(format!("photos/{}.jpg", i))).collect()
}

#[test]
fn test_select_all_then_toggle_one_is_indeterminate() {
    for n in 2..8 {
        let photos = gallery(n);
        let mut selection = MediaSelectionController::new();
        selection.enter();

        selection.select_all(&photos).unwrap();
        assert_eq!(selection.count(), n);
        assert_eq!(selection.check_state(&photos), CheckState::Checked);

        selection.toggle(&photos[n / 2]).unwrap();
        assert_eq!(selection.count(), n - 1);
        assert_eq!(selection.check_state(&photos), CheckState::Indeterminate);
    }
}

#[test]
fn test_select_all_when_full_clears() {
    let photos = gallery(3);
    let mut selection = MediaSelectionController::new();
    selection.enter();

    selection.select_all(&photos).unwrap();
    selection.select_all(&photos).unwrap();
    assert_eq!(selection.count(), 0);
    assert_eq!(selection.check_state(&photos), CheckState::Unchecked);
    assert!(selection.is_selecting());
}

#[test]
fn test_select_all_from_partial_fills() {
    let photos = gallery(4);
    let mut selection = MediaSelectionController::new();
    selection.enter();
    selection.toggle(&photos[1]).unwrap();

    selection.select_all(&photos).unwrap();
    assert_eq!(selection.check_state(&photos), CheckState::Checked);
}

#[test]
fn test_single_photo_gallery() {
    let photos = gallery(1);
    let mut selection = MediaSelectionController::new();
    selection.enter();

    selection.toggle(&photos[0]).unwrap();
    assert_eq!(selection.check_state(&photos), CheckState::Checked);
}

#[test]
fn test_retain_existing_after_refresh() {
    let photos = gallery(3);
    let mut selection = MediaSelectionController::new();
    selection.enter();
    selection.select_all(&photos).unwrap();

    selection.retain_existing(&photos[..1]);
    assert_eq!(selection.selected(), vec![photos[0].clone()]);
}

#[test]
fn test_browsing_never_reports_selection() {
    let photos = gallery(2);
    let selection = MediaSelectionController::new();
    assert_eq!(selection.state(), &SelectionState::Browsing);
    assert!(!selection.is_selected(&photos[0]));
    assert!(selection.selected().is_empty());
}
