#![forbid(unsafe_code)]

//! Full debate flow: generate from a source, replay with pacing, and follow
//! the transcript as it grows.

use std::collections::HashSet;

use socratic_core::{FollowConfig, RestoreEvent, RestoreOutcome, ScrollOwner};
use socratic_harness::{SETTLE_LIMIT, Scenario, fixtures};
use socratic_runtime::{FixtureSource, Lifecycle, SurfaceEvent, test_id};

fn paced(delay_ms: u64) -> Scenario {
    let mut config = FollowConfig::default();
    config.replay.fixed_delay_ms = Some(delay_ms);
    Scenario::with_config(config)
}

fn loaded(delay_ms: u64) -> Scenario {
    let mut scenario = paced(delay_ms);
    let mut source = FixtureSource::from_json(fixtures::dialogue_json(12));
    assert!(scenario.generate(&mut source, "Zero trust in microservices"));
    assert_eq!(scenario.lifecycle(), Lifecycle::Ready);
    scenario
}

#[test]
fn replay_reveals_every_turn_and_follows() {
    let mut scenario = loaded(400);
    scenario.replay();
    assert_eq!(scenario.lifecycle(), Lifecycle::Replaying);
    assert!(scenario.run_until(SETTLE_LIMIT, |s| s.lifecycle() == Lifecycle::Complete));
    assert!(scenario.settle());

    assert_eq!(scenario.app().surface().projection().len(), 12);
    assert_eq!(scenario.owner(), ScrollOwner::MachineOwned);
    assert!(scenario.is_at_bottom(5.0));
    assert_eq!(
        scenario.bridge().event_names(),
        vec!["GENERATE", "REPLAY", "DONE"]
    );
    assert_eq!(
        scenario
            .attributes()
            .get(test_id::SCROLL_VIEWPORT, "data-lifecycle"),
        Some("complete")
    );
}

#[test]
fn reading_history_during_replay_is_respected() {
    let mut scenario = loaded(400);
    scenario.replay();
    assert!(scenario.run_until(SETTLE_LIMIT, |s| s.is_restoring() && s.scroll_top() > 500.0));

    scenario.take_events();
    scenario.manual_scroll(-400.0);
    assert_eq!(scenario.owner(), ScrollOwner::UserOwned);
    let reading_at = scenario.scroll_top();

    scenario.step();
    assert!(!scenario.is_restoring());
    assert!(scenario.take_events().iter().any(|e| matches!(
        e,
        SurfaceEvent::Restore(RestoreEvent::Ended {
            outcome: RestoreOutcome::Aborted | RestoreOutcome::Cancelled
        })
    )));

    assert!(scenario.run_until(SETTLE_LIMIT, |s| s.lifecycle() == Lifecycle::Complete));
    assert!(scenario.settle());
    assert_eq!(scenario.scroll_top(), reading_at);
    assert_eq!(scenario.owner(), ScrollOwner::UserOwned);
}

#[test]
fn replaying_again_uses_fresh_block_ids() {
    let mut scenario = loaded(200);
    scenario.replay();
    assert!(scenario.run_until(SETTLE_LIMIT, |s| s.lifecycle() == Lifecycle::Complete));
    let first: HashSet<_> = scenario
        .app()
        .surface()
        .projection()
        .blocks()
        .iter()
        .map(|b| b.id)
        .collect();

    scenario.replay();
    assert!(scenario.run_until(SETTLE_LIMIT, |s| s.lifecycle() == Lifecycle::Complete));
    assert!(scenario.settle());
    let second: Vec<_> = scenario
        .app()
        .surface()
        .projection()
        .blocks()
        .iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(second.len(), 12);
    assert!(second.iter().all(|id| !first.contains(id)));
    assert_eq!(scenario.viewport().unwrap().block_count(), 12);
    assert!(scenario.is_at_bottom(5.0));
}

#[test]
fn rejected_dialogue_leaves_transcript_untouched() {
    let mut scenario = paced(200);
    scenario.append_turns(2);
    let mut broken = FixtureSource::from_json(r#"{"topic":"t","turns":[{"speaker":"application_engineer","content":"x"}]}"#);
    assert!(!scenario.generate(&mut broken, "prompt"));

    assert_eq!(scenario.lifecycle(), Lifecycle::Idle);
    assert!(scenario.app().session().last_error().is_some());
    assert_eq!(scenario.app().surface().projection().len(), 2);
    assert_eq!(
        scenario
            .attributes()
            .get(test_id::SCROLL_VIEWPORT, "data-lifecycle"),
        Some("idle")
    );
}

#[test]
fn empty_prompt_is_rejected_before_the_source() {
    let mut scenario = paced(200);
    let mut source = FixtureSource::from_json(fixtures::dialogue_json(12));
    assert!(!scenario.generate(&mut source, "   "));
    assert_eq!(scenario.lifecycle(), Lifecycle::Idle);
}

#[test]
fn default_pacing_reveals_turns_slowly() {
    let mut scenario = Scenario::new();
    assert!(scenario.load(fixtures::dialogue(12)));
    scenario.replay();
    scenario.run_for(1000);
    assert_eq!(scenario.app().surface().projection().len(), 1);
    assert_eq!(scenario.lifecycle(), Lifecycle::Replaying);
}
