//! Property-based invariant tests for the follow machinery.
//!
//! These tests verify structural invariants that must hold for **any**
//! sequence of inputs:
//!
//! 1. Ownership transitions always change the owner and strictly alternate.
//! 2. Samples taken while restoring never produce a transition.
//! 3. Settle versions increase by exactly one per signal.
//! 4. Any mutation makes layout not-ready immediately.
//! 5. Gradient intensity stays in [0, 1] and moves at most `max_step` per advance.
//! 6. Every restore `Started` is matched by exactly one `Ended`.
//! 7. Cancelling always leaves the actuator not restoring.

use std::time::Duration;

use proptest::prelude::*;
use socratic_core::{
    AnchorMetrics, AutoScrollActuator, AutoScrollConfig, GradientProjector, IntentSignal,
    LayoutStabilityDetector, OwnershipArbiter, RestoreEvent, ScrollMetrics, ScrollOwner, Viewport,
};

// ── Strategies ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum ScrollOp {
    Sample { top: f64, restoring: bool },
    Gesture { delta_y: f64, restoring: bool },
    RestoreEnded,
    Wait(u64),
}

fn scroll_op() -> impl Strategy<Value = ScrollOp> {
    prop_oneof![
        4 => (0u32..=1800, any::<bool>()).prop_map(|(top, restoring)| ScrollOp::Sample {
            top: f64::from(top),
            restoring,
        }),
        2 => (-400i32..=400, any::<bool>()).prop_map(|(dy, restoring)| ScrollOp::Gesture {
            delta_y: f64::from(dy),
            restoring,
        }),
        1 => Just(ScrollOp::RestoreEnded),
        2 => (1u64..400).prop_map(ScrollOp::Wait),
    ]
}

#[derive(Debug, Clone)]
enum LayoutOp {
    Resize,
    Blocks(u64),
    Wait(u64),
}

fn layout_op() -> impl Strategy<Value = LayoutOp> {
    prop_oneof![
        3 => Just(LayoutOp::Resize),
        1 => (0u64..4).prop_map(LayoutOp::Blocks),
        3 => (1u64..300).prop_map(LayoutOp::Wait),
    ]
}

#[derive(Debug, Clone)]
enum GradientOp {
    Owner(bool),
    Restoring(bool),
    Anchor(f64),
    Advance(u64),
}

fn gradient_op() -> impl Strategy<Value = GradientOp> {
    prop_oneof![
        1 => any::<bool>().prop_map(GradientOp::Owner),
        1 => any::<bool>().prop_map(GradientOp::Restoring),
        2 => (-800i32..2400).prop_map(|v| GradientOp::Anchor(f64::from(v))),
        4 => (0u64..200).prop_map(GradientOp::Advance),
    ]
}

#[derive(Debug, Clone)]
enum ActuatorOp {
    Settle,
    Frame,
    Grow(u32),
    UserTakes,
    MachineTakes,
    Cancel,
}

fn actuator_op() -> impl Strategy<Value = ActuatorOp> {
    prop_oneof![
        2 => Just(ActuatorOp::Settle),
        6 => Just(ActuatorOp::Frame),
        1 => (0u32..800).prop_map(ActuatorOp::Grow),
        1 => Just(ActuatorOp::UserTakes),
        1 => Just(ActuatorOp::MachineTakes),
        1 => Just(ActuatorOp::Cancel),
    ]
}

struct Column {
    top: f64,
    height: f64,
}

impl Viewport for Column {
    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(self.top, 600.0, self.height.max(600.0))
    }

    fn set_scroll_top(&mut self, top: f64) {
        self.top = top.clamp(0.0, self.metrics().max_scroll_top());
    }

    fn anchor_offset(&self) -> Option<f64> {
        Some(self.height)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// 1–2. Ownership transitions
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn ownership_transitions_alternate(ops in prop::collection::vec(scroll_op(), 1..120)) {
        let mut arbiter = OwnershipArbiter::default();
        arbiter.attach(ScrollMetrics::new(1800.0, 600.0, 2400.0));
        let mut now = Duration::ZERO;
        let mut last_event = None;

        for op in ops {
            now += Duration::from_millis(8);
            let transition = match op {
                ScrollOp::Sample { top, restoring } => {
                    let t = arbiter.check(
                        Some(ScrollMetrics::new(top, 600.0, 2400.0)),
                        restoring,
                        now,
                    );
                    prop_assert!(!(restoring && t.is_some()), "transition while restoring");
                    t
                }
                ScrollOp::Gesture { delta_y, restoring } => {
                    arbiter.record_intent(&IntentSignal::Wheel { delta_y }, restoring, now)
                }
                ScrollOp::RestoreEnded => {
                    arbiter.on_restore_ended(now);
                    None
                }
                ScrollOp::Wait(ms) => {
                    now += Duration::from_millis(ms);
                    None
                }
            };
            if let Some(t) = transition {
                prop_assert_ne!(t.from, t.to);
                prop_assert_eq!(arbiter.owner(), t.to);
                prop_assert_ne!(Some(t.event), last_event, "event fired twice in a row");
                last_event = Some(t.event);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// 3–4. Settle versions
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn settle_versions_increase_by_one(ops in prop::collection::vec(layout_op(), 1..150)) {
        let mut detector = LayoutStabilityDetector::default();
        let mut now = Duration::ZERO;
        detector.set_mounted(true, now);
        let mut expected = 0u64;

        for op in ops {
            match op {
                LayoutOp::Resize => {
                    detector.on_content_resized(now);
                    prop_assert!(!detector.is_ready());
                }
                LayoutOp::Blocks(revision) => {
                    let before = detector.next_deadline();
                    detector.observe_blocks(revision, now);
                    if detector.next_deadline() != before {
                        prop_assert!(!detector.is_ready());
                    }
                }
                LayoutOp::Wait(ms) => {
                    now += Duration::from_millis(ms);
                    if let Some(signal) = detector.poll(now) {
                        expected += 1;
                        prop_assert_eq!(signal.version, expected);
                        prop_assert!(detector.is_ready());
                    }
                }
            }
            prop_assert_eq!(detector.version(), expected);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// 5. Gradient bounds
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn gradient_is_bounded_and_step_limited(ops in prop::collection::vec(gradient_op(), 1..200)) {
        let mut gradient = GradientProjector::default();
        let mut now = Duration::ZERO;

        for op in ops {
            let before = gradient.intensity();
            match op {
                GradientOp::Owner(user) => {
                    let owner = if user { ScrollOwner::UserOwned } else { ScrollOwner::MachineOwned };
                    gradient.set_owner(owner, now);
                }
                GradientOp::Restoring(flag) => gradient.set_restoring(flag),
                GradientOp::Anchor(mid) => gradient.observe(AnchorMetrics {
                    mid_y_in_viewport: mid,
                    bottom_in_content: 2400.0,
                    viewport_height: 600.0,
                }),
                GradientOp::Advance(ms) => {
                    now += Duration::from_millis(ms);
                    gradient.advance(now);
                    prop_assert!((gradient.intensity() - before).abs() <= 0.08 + 1e-12);
                }
            }
            if !matches!(op, GradientOp::Advance(_)) {
                prop_assert_eq!(gradient.intensity(), before, "only advance may move intensity");
            }
            prop_assert!((0.0..=1.0).contains(&gradient.intensity()));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// 6–7. Restore pairing
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn restore_events_are_paired(
        deterministic in any::<bool>(),
        ops in prop::collection::vec(actuator_op(), 1..200),
    ) {
        let mut actuator = AutoScrollActuator::new(AutoScrollConfig {
            deterministic,
            ..AutoScrollConfig::default()
        });
        let mut column = Column { top: 0.0, height: 1200.0 };
        let mut owner = ScrollOwner::MachineOwned;
        let mut version = 0;
        let mut now = Duration::ZERO;
        let mut open = 0i32;

        for op in ops {
            now += Duration::from_millis(16);
            let events: Vec<RestoreEvent> = match op {
                ActuatorOp::Settle => {
                    version += 1;
                    actuator.on_settle(version, owner, Some(&mut column), now)
                }
                ActuatorOp::Frame => actuator.on_frame(owner, Some(&mut column), now).into_iter().collect(),
                ActuatorOp::Grow(px) => {
                    column.height += f64::from(px);
                    Vec::new()
                }
                ActuatorOp::UserTakes => {
                    owner = ScrollOwner::UserOwned;
                    Vec::new()
                }
                ActuatorOp::MachineTakes => {
                    owner = ScrollOwner::MachineOwned;
                    Vec::new()
                }
                ActuatorOp::Cancel => {
                    let ended = actuator.cancel(now).into_iter().collect();
                    prop_assert!(!actuator.is_restoring());
                    ended
                }
            };
            for event in events {
                match event {
                    RestoreEvent::Started { .. } => open += 1,
                    RestoreEvent::Ended { .. } => open -= 1,
                }
                prop_assert!((0..=1).contains(&open), "unbalanced restore events");
            }
            prop_assert_eq!(open == 1, actuator.is_restoring());
        }
    }
}
