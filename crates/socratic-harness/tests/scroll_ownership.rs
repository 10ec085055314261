#![forbid(unsafe_code)]

//! Ownership arbitration end to end: initial state, user override, return
//! to the live edge, and idempotent re-checks.

use pretty_assertions::assert_eq;
use socratic_core::{NavKey, ScrollOwner};
use socratic_harness::Scenario;
use socratic_runtime::test_id;

fn followed(turns: usize) -> Scenario {
    let mut scenario = Scenario::new();
    scenario.append_turns(turns);
    assert!(scenario.settle(), "auto-follow did not settle");
    assert!(scenario.is_at_bottom(5.0));
    scenario
}

#[test]
fn fresh_load_starts_machine_owned() {
    let scenario = Scenario::new();
    assert_eq!(scenario.owner(), ScrollOwner::MachineOwned);
    assert_eq!(
        scenario
            .attributes()
            .get(test_id::SCROLL_VIEWPORT, "data-scroll-owner"),
        Some("machineOwned")
    );
}

#[test]
fn manual_scroll_up_transitions_to_user_owned() {
    let mut scenario = followed(8);
    scenario.manual_scroll(-600.0);
    assert_eq!(scenario.owner(), ScrollOwner::UserOwned);
    assert_eq!(
        scenario
            .attributes()
            .get(test_id::SCROLL_VIEWPORT, "data-scroll-owner"),
        Some("userOwned")
    );
}

#[test]
fn appends_while_user_owned_do_not_move_scroll_top() {
    let mut scenario = followed(8);
    scenario.manual_scroll(-600.0);
    let reading_at = scenario.scroll_top();

    scenario.append_turns(3);
    assert!(scenario.settle());
    assert_eq!(scenario.scroll_top(), reading_at);
    assert_eq!(scenario.owner(), ScrollOwner::UserOwned);
    assert!(!scenario.is_restoring());
}

#[test]
fn scrolling_back_to_bottom_returns_control() {
    let mut scenario = followed(8);
    scenario.manual_scroll(-600.0);
    assert_eq!(scenario.owner(), ScrollOwner::UserOwned);

    scenario.scroll_to_bottom();
    assert_eq!(scenario.owner(), ScrollOwner::MachineOwned);

    // Following resumes with the next settle.
    scenario.append_turns(2);
    assert!(scenario.settle());
    assert!(scenario.is_at_bottom(5.0));
}

#[test]
fn example_session_round_trip() {
    let mut scenario = followed(8);
    assert_eq!(scenario.owner(), ScrollOwner::MachineOwned);
    scenario.manual_scroll(-600.0);
    assert_eq!(scenario.owner(), ScrollOwner::UserOwned);
    scenario.scroll_to_bottom();
    assert_eq!(scenario.owner(), ScrollOwner::MachineOwned);

    assert_eq!(
        scenario.bridge().event_names(),
        vec!["USER_SCROLLED_UP", "USER_AT_BOTTOM"]
    );
}

#[test]
fn ownership_recheck_is_idempotent() {
    let mut scenario = followed(8);
    assert!(scenario.check_ownership().is_empty());
    assert!(scenario.check_ownership().is_empty());

    scenario.manual_scroll(-600.0);
    assert!(scenario.check_ownership().is_empty());
    assert!(scenario.check_ownership().is_empty());
    assert_eq!(scenario.owner(), ScrollOwner::UserOwned);
}

#[test]
fn upward_scroll_without_gesture_is_ignored() {
    let mut scenario = followed(8);
    let bottom = scenario.scroll_top();
    scenario.scroll_to(bottom - 600.0);
    assert_eq!(scenario.owner(), ScrollOwner::MachineOwned);

    scenario.append_turns(1);
    assert!(scenario.settle());
    assert!(scenario.is_at_bottom(5.0));
}

#[test]
fn gesture_outside_intent_window_does_not_count() {
    let mut scenario = followed(8);
    scenario.gesture(socratic_core::IntentSignal::Wheel { delta_y: -120.0 });
    scenario.run_for(400);
    let bottom = scenario.scroll_top();
    scenario.scroll_to(bottom - 300.0);
    assert_eq!(scenario.owner(), ScrollOwner::MachineOwned);
}

#[test]
fn upward_scroll_inside_grace_window_is_ignored() {
    let mut scenario = Scenario::new();
    scenario.append_turns(8);
    assert!(scenario.run_until(socratic_harness::SETTLE_LIMIT, Scenario::is_restoring));
    assert!(scenario.run_until(socratic_harness::SETTLE_LIMIT, |s| !s.is_restoring()));

    scenario.manual_scroll(-300.0);
    assert_eq!(scenario.owner(), ScrollOwner::MachineOwned);

    scenario.run_for(300);
    scenario.manual_scroll(-300.0);
    assert_eq!(scenario.owner(), ScrollOwner::UserOwned);
}

#[test]
fn keyboard_navigation_hands_over_and_back() {
    let mut scenario = followed(8);
    scenario.press(NavKey::PageUp);
    assert_eq!(scenario.owner(), ScrollOwner::UserOwned);
    scenario.press(NavKey::End);
    assert_eq!(scenario.owner(), ScrollOwner::MachineOwned);
}

#[test]
fn touch_drag_up_hands_over() {
    let mut scenario = followed(8);
    scenario.touch_scroll(-250.0);
    assert_eq!(scenario.owner(), ScrollOwner::UserOwned);
}

#[test]
fn downward_scroll_short_of_bottom_keeps_user_owned() {
    let mut scenario = followed(8);
    scenario.manual_scroll(-600.0);
    scenario.manual_scroll(300.0);
    assert_eq!(scenario.owner(), ScrollOwner::UserOwned);
    scenario.manual_scroll(298.0);
    // Within the 5 px tolerance.
    assert_eq!(scenario.owner(), ScrollOwner::MachineOwned);
}
