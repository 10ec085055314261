#![forbid(unsafe_code)]

//! Auto-scroll actuation.
//!
//! # Design
//!
//! The actuator reacts to settle versions. When a new version arrives while
//! the machine owns scrolling, it waits `defer_frames` frame callbacks so the
//! host has applied the final layout, reads fresh geometry, and animates the
//! scroll top to the bottom. The animation advances one step per frame.
//!
//! ```text
//!   Idle ──settle──▶ Deferred(n) ──n frames──▶ Animating ──done──▶ Idle
//!     ▲                  │                        │
//!     └──no overflow─────┘          abort/cancel──┘
//! ```
//!
//! # Invariants
//!
//! 1. At most one animation is in flight; a new trigger cancels the previous
//!    one with [`RestoreOutcome::Cancelled`].
//! 2. Every [`RestoreEvent::Started`] is followed by exactly one
//!    [`RestoreEvent::Ended`].
//! 3. Completion writes exactly the target value.
//! 4. Each frame re-checks that the viewport still exists and that the
//!    machine still owns scrolling; otherwise the animation aborts in place.
//!
//! # Deterministic mode
//!
//! For tests and reduced-motion hosts the actuator jumps straight to the
//! target on the trigger and holds `restoring` until the next frame callback,
//! so the scroll notification caused by the jump is still ignored by the
//! arbiter.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bus::{RestoreEvent, RestoreOutcome};
use crate::easing::{Easing, Tween};
use crate::geometry::Viewport;
use crate::ownership::ScrollOwner;
use crate::telemetry;

/// Actuator tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoScrollConfig {
    /// Animation length. Default: 700 ms.
    pub duration_ms: u64,
    /// Frame callbacks to wait before reading geometry. Default: 2.
    pub defer_frames: u32,
    /// Distances below this are not animated. Default: 1 px.
    pub min_distance_px: f64,
    /// Animation curve. Default: cubic ease-out.
    pub easing: Easing,
    /// Jump instantly instead of animating. Default: false.
    pub deterministic: bool,
}

impl Default for AutoScrollConfig {
    fn default() -> Self {
        Self {
            duration_ms: 700,
            defer_frames: 2,
            min_distance_px: 1.0,
            easing: Easing::EaseOutCubic,
            deterministic: false,
        }
    }
}

impl AutoScrollConfig {
    /// Animation length as a [`Duration`].
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Deferred { frames_left: u32 },
    Animating { tween: Tween },
    Holding,
}

/// Drives the viewport to the bottom after each settle.
#[derive(Debug, Clone)]
pub struct AutoScrollActuator {
    config: AutoScrollConfig,
    phase: Phase,
    last_version: u64,
    started_at: Option<Duration>,
}

impl AutoScrollActuator {
    /// Create an idle actuator.
    #[must_use]
    pub fn new(config: AutoScrollConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            last_version: 0,
            started_at: None,
        }
    }

    /// Whether an animation (or deterministic hold) is in flight.
    #[must_use]
    pub fn is_restoring(&self) -> bool {
        matches!(self.phase, Phase::Animating { .. } | Phase::Holding)
    }

    /// Whether a trigger is waiting for its deferred frames.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Deferred { .. })
    }

    /// Whether nothing is pending or in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Latest settle version seen.
    #[must_use]
    pub fn last_version(&self) -> u64 {
        self.last_version
    }

    /// Target of the in-flight animation.
    #[must_use]
    pub fn target(&self) -> Option<f64> {
        match self.phase {
            Phase::Animating { tween } => Some(tween.to()),
            _ => None,
        }
    }

    /// React to a settle version.
    ///
    /// Versions not newer than the last one seen are ignored. Returns the
    /// restore events produced (a cancellation of the previous animation
    /// and, in deterministic mode, the start of the jump).
    pub fn on_settle<V: Viewport + ?Sized>(
        &mut self,
        version: u64,
        owner: ScrollOwner,
        viewport: Option<&mut V>,
        now: Duration,
    ) -> Vec<RestoreEvent> {
        let mut events = Vec::new();
        if version <= self.last_version {
            return events;
        }
        self.last_version = version;
        if owner != ScrollOwner::MachineOwned {
            tracing::debug!(
                target: "socratic.autoscroll",
                version,
                owner = owner.as_str(),
                "settle ignored: user owns scrolling"
            );
            return events;
        }

        events.extend(self.cancel(now));
        if self.config.deterministic || self.config.defer_frames == 0 {
            events.extend(self.start(viewport, now));
        } else {
            self.phase = Phase::Deferred {
                frames_left: self.config.defer_frames,
            };
        }
        events
    }

    /// Advance by one frame callback.
    pub fn on_frame<V: Viewport + ?Sized>(
        &mut self,
        owner: ScrollOwner,
        viewport: Option<&mut V>,
        now: Duration,
    ) -> Option<RestoreEvent> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => None,
            Phase::Deferred { frames_left } => {
                if viewport.is_none() || owner != ScrollOwner::MachineOwned {
                    return None;
                }
                let frames_left = frames_left.saturating_sub(1);
                if frames_left > 0 {
                    self.phase = Phase::Deferred { frames_left };
                    return None;
                }
                self.start(viewport, now)
            }
            Phase::Holding => Some(self.finish(RestoreOutcome::Completed, now)),
            Phase::Animating { tween } => {
                let Some(viewport) = viewport else {
                    return Some(self.finish(RestoreOutcome::Aborted, now));
                };
                if owner != ScrollOwner::MachineOwned {
                    return Some(self.finish(RestoreOutcome::Aborted, now));
                }
                viewport.set_scroll_top(tween.value_at(now));
                if tween.is_complete(now) {
                    return Some(self.finish(RestoreOutcome::Completed, now));
                }
                self.phase = Phase::Animating { tween };
                None
            }
        }
    }

    /// Cancel anything pending or in flight (teardown, superseding trigger).
    pub fn cancel(&mut self, now: Duration) -> Option<RestoreEvent> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Animating { .. } | Phase::Holding => {
                Some(self.finish(RestoreOutcome::Cancelled, now))
            }
            Phase::Idle | Phase::Deferred { .. } => None,
        }
    }

    fn start<V: Viewport + ?Sized>(
        &mut self,
        viewport: Option<&mut V>,
        now: Duration,
    ) -> Option<RestoreEvent> {
        let viewport = viewport?;
        let metrics = viewport.metrics();
        let target = metrics.max_scroll_top();
        let distance = (target - metrics.scroll_top).abs();
        if !metrics.has_overflow() || distance < self.config.min_distance_px {
            tracing::trace!(
                target: "socratic.autoscroll",
                distance,
                overflow = metrics.has_overflow(),
                "nothing to restore"
            );
            return None;
        }

        if self.config.deterministic {
            viewport.set_scroll_top(target);
            self.phase = Phase::Holding;
        } else {
            self.phase = Phase::Animating {
                tween: Tween::new(
                    metrics.scroll_top,
                    target,
                    now,
                    self.config.duration(),
                    self.config.easing,
                ),
            };
        }
        self.started_at = Some(now);
        telemetry::record_restore_started(metrics.scroll_top, target, self.last_version);
        Some(RestoreEvent::Started { target })
    }

    fn finish(&mut self, outcome: RestoreOutcome, now: Duration) -> RestoreEvent {
        self.phase = Phase::Idle;
        let elapsed = self
            .started_at
            .take()
            .map_or(Duration::ZERO, |at| now.saturating_sub(at));
        telemetry::record_restore_ended(outcome, elapsed);
        RestoreEvent::Ended { outcome }
    }
}

impl Default for AutoScrollActuator {
    fn default() -> Self {
        Self::new(AutoScrollConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ScrollMetrics;

    struct FixedViewport {
        metrics: ScrollMetrics,
        writes: Vec<f64>,
    }

    impl FixedViewport {
        fn new(scroll_top: f64, scroll_height: f64) -> Self {
            Self {
                metrics: ScrollMetrics::new(scroll_top, 600.0, scroll_height),
                writes: Vec::new(),
            }
        }
    }

    impl Viewport for FixedViewport {
        fn metrics(&self) -> ScrollMetrics {
            self.metrics
        }

        fn set_scroll_top(&mut self, top: f64) {
            self.metrics.scroll_top = top.clamp(0.0, self.metrics.max_scroll_top());
            self.writes.push(self.metrics.scroll_top);
        }

        fn anchor_offset(&self) -> Option<f64> {
            Some(self.metrics.scroll_height)
        }
    }

    const MACHINE: ScrollOwner = ScrollOwner::MachineOwned;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    /// Runs frames every 16 ms from `from` until the actuator goes idle.
    fn run_frames(
        actuator: &mut AutoScrollActuator,
        vp: &mut FixedViewport,
        from: u64,
    ) -> Vec<RestoreEvent> {
        let mut events = Vec::new();
        let mut t = from;
        while !actuator.is_idle() && t < from + 5_000 {
            t += 16;
            events.extend(actuator.on_frame(MACHINE, Some(&mut *vp), ms(t)));
        }
        events
    }

    #[test]
    fn animates_to_exact_bottom_after_deferred_frames() {
        let mut actuator = AutoScrollActuator::default();
        let mut vp = FixedViewport::new(0.0, 2400.0);

        assert!(actuator.on_settle(1, MACHINE, Some(&mut vp), ms(0)).is_empty());
        assert!(actuator.is_pending());
        assert_eq!(actuator.on_frame(MACHINE, Some(&mut vp), ms(16)), None);
        assert!(!actuator.is_restoring());
        assert_eq!(
            actuator.on_frame(MACHINE, Some(&mut vp), ms(32)),
            Some(RestoreEvent::Started { target: 1800.0 })
        );
        assert!(actuator.is_restoring());

        let events = run_frames(&mut actuator, &mut vp, 32);
        assert_eq!(
            events,
            vec![RestoreEvent::Ended {
                outcome: RestoreOutcome::Completed
            }]
        );
        assert_eq!(vp.metrics.scroll_top, 1800.0);
        assert!(vp.writes.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn no_overflow_never_raises_restoring() {
        let mut actuator = AutoScrollActuator::default();
        let mut vp = FixedViewport::new(0.0, 500.0);
        actuator.on_settle(1, MACHINE, Some(&mut vp), ms(0));
        let events = run_frames(&mut actuator, &mut vp, 0);
        assert!(events.is_empty());
        assert!(vp.writes.is_empty());
    }

    #[test]
    fn already_at_bottom_is_a_no_op() {
        let mut actuator = AutoScrollActuator::default();
        let mut vp = FixedViewport::new(1799.5, 2400.0);
        actuator.on_settle(1, MACHINE, Some(&mut vp), ms(0));
        assert!(run_frames(&mut actuator, &mut vp, 0).is_empty());
    }

    #[test]
    fn stale_versions_and_user_ownership_are_ignored() {
        let mut actuator = AutoScrollActuator::default();
        let mut vp = FixedViewport::new(0.0, 2400.0);
        actuator.on_settle(3, ScrollOwner::UserOwned, Some(&mut vp), ms(0));
        assert!(actuator.is_idle());
        actuator.on_settle(3, MACHINE, Some(&mut vp), ms(10));
        assert!(actuator.is_idle());
        assert_eq!(actuator.last_version(), 3);
    }

    #[test]
    fn ownership_change_aborts_in_place() {
        let mut actuator = AutoScrollActuator::default();
        let mut vp = FixedViewport::new(0.0, 2400.0);
        actuator.on_settle(1, MACHINE, Some(&mut vp), ms(0));
        actuator.on_frame(MACHINE, Some(&mut vp), ms(16));
        actuator.on_frame(MACHINE, Some(&mut vp), ms(32));
        actuator.on_frame(MACHINE, Some(&mut vp), ms(48));
        let position = vp.metrics.scroll_top;
        assert!(position > 0.0 && position < 1800.0);

        let event = actuator.on_frame(ScrollOwner::UserOwned, Some(&mut vp), ms(64));
        assert_eq!(
            event,
            Some(RestoreEvent::Ended {
                outcome: RestoreOutcome::Aborted
            })
        );
        assert!(!actuator.is_restoring());
        assert_eq!(vp.metrics.scroll_top, position);
    }

    #[test]
    fn missing_viewport_aborts() {
        let mut actuator = AutoScrollActuator::default();
        let mut vp = FixedViewport::new(0.0, 2400.0);
        actuator.on_settle(1, MACHINE, Some(&mut vp), ms(0));
        actuator.on_frame(MACHINE, Some(&mut vp), ms(16));
        actuator.on_frame(MACHINE, Some(&mut vp), ms(32));
        let event = actuator.on_frame::<FixedViewport>(MACHINE, None, ms(48));
        assert_eq!(
            event,
            Some(RestoreEvent::Ended {
                outcome: RestoreOutcome::Aborted
            })
        );
    }

    #[test]
    fn new_trigger_cancels_in_flight_animation() {
        let mut actuator = AutoScrollActuator::default();
        let mut vp = FixedViewport::new(0.0, 2400.0);
        actuator.on_settle(1, MACHINE, Some(&mut vp), ms(0));
        actuator.on_frame(MACHINE, Some(&mut vp), ms(16));
        actuator.on_frame(MACHINE, Some(&mut vp), ms(32));
        assert!(actuator.is_restoring());

        let events = actuator.on_settle(2, MACHINE, Some(&mut vp), ms(40));
        assert_eq!(
            events,
            vec![RestoreEvent::Ended {
                outcome: RestoreOutcome::Cancelled
            }]
        );
        assert!(actuator.is_pending());
    }

    #[test]
    fn cancel_clears_restoring() {
        let mut actuator = AutoScrollActuator::default();
        let mut vp = FixedViewport::new(0.0, 2400.0);
        actuator.on_settle(1, MACHINE, Some(&mut vp), ms(0));
        assert_eq!(actuator.cancel(ms(5)), None);
        assert!(actuator.is_idle());

        actuator.on_settle(2, MACHINE, Some(&mut vp), ms(10));
        actuator.on_frame(MACHINE, Some(&mut vp), ms(26));
        actuator.on_frame(MACHINE, Some(&mut vp), ms(42));
        assert!(actuator.cancel(ms(50)).is_some());
        assert!(!actuator.is_restoring());
    }

    #[test]
    fn deterministic_mode_jumps_and_holds_one_frame() {
        let mut actuator = AutoScrollActuator::new(AutoScrollConfig {
            deterministic: true,
            ..AutoScrollConfig::default()
        });
        let mut vp = FixedViewport::new(0.0, 2400.0);
        let events = actuator.on_settle(1, MACHINE, Some(&mut vp), ms(0));
        assert_eq!(events, vec![RestoreEvent::Started { target: 1800.0 }]);
        assert_eq!(vp.metrics.scroll_top, 1800.0);
        assert!(actuator.is_restoring());

        assert_eq!(
            actuator.on_frame(MACHINE, Some(&mut vp), ms(16)),
            Some(RestoreEvent::Ended {
                outcome: RestoreOutcome::Completed
            })
        );
        assert!(actuator.is_idle());
    }
}
