#![forbid(unsafe_code)]

//! Scroll ownership arbitration.
//!
//! # Design
//!
//! Exactly one party owns the scroll position at a time:
//!
//! ```text
//!                   USER_SCROLLED_UP
//!   MachineOwned ──────────────────────▶ UserOwned
//!        ▲                                   │
//!        └───────────────────────────────────┘
//!                   USER_AT_BOTTOM
//! ```
//!
//! [`OwnershipArbiter::check`] turns a fresh geometry sample into at most one
//! event. The event is applied only when it changes the owner, so repeated
//! samples on the same side of a boundary never re-fire.
//!
//! # Invariants
//!
//! 1. The initial owner is [`ScrollOwner::MachineOwned`].
//! 2. While the actuator is restoring, samples never produce events; the
//!    scroll-top baseline is still refreshed.
//! 3. `USER_SCROLLED_UP` requires an actual decrease of scroll top, a position
//!    away from the bottom, no active grace window and (by default) a recent
//!    physical gesture.
//! 4. Without an attached viewport every operation is a no-op.
//!
//! # Failure Modes
//!
//! - **Content shrink clamps scroll top**: looks like upward movement but has
//!   no gesture attached, so it is rejected while `require_intent` is set.
//! - **Gesture during restoration**: an explicit upward gesture flips to
//!   `UserOwned` immediately; the actuator aborts on its next frame.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geometry::ScrollMetrics;
use crate::intent::{IntentSignal, IntentTracker, ScrollDirection};
use crate::telemetry;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Arbiter tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnershipConfig {
    /// Pixels from the bottom edge still counted as "at bottom". Default: 5.
    pub bottom_tolerance_px: f64,
    /// Minimum scroll-top decrease counted as upward movement. Default: 1.
    pub min_upward_px: f64,
    /// How long a physical gesture stays valid as intent. Default: 200 ms.
    pub intent_window_ms: u64,
    /// Upward detections suppressed after a restoration ends. Default: 250 ms.
    pub grace_ms: u64,
    /// Reject upward movement without a recent gesture. Default: true.
    pub require_intent: bool,
}

impl Default for OwnershipConfig {
    fn default() -> Self {
        Self {
            bottom_tolerance_px: 5.0,
            min_upward_px: 1.0,
            intent_window_ms: 200,
            grace_ms: 250,
            require_intent: true,
        }
    }
}

impl OwnershipConfig {
    /// Intent window as a [`Duration`].
    #[must_use]
    pub fn intent_window(&self) -> Duration {
        Duration::from_millis(self.intent_window_ms)
    }

    /// Grace window as a [`Duration`].
    #[must_use]
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

// ---------------------------------------------------------------------------
// States and events
// ---------------------------------------------------------------------------

/// Who controls the scroll position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScrollOwner {
    /// The auto-follow machinery keeps the newest content in view.
    #[default]
    MachineOwned,
    /// The user scrolled away; nothing moves the viewport on their behalf.
    UserOwned,
}

impl ScrollOwner {
    /// Attribute value (`machineOwned` / `userOwned`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MachineOwned => "machineOwned",
            Self::UserOwned => "userOwned",
        }
    }
}

impl core::fmt::Display for ScrollOwner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input events of the ownership machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnershipEvent {
    UserScrolledUp,
    UserAtBottom,
}

impl OwnershipEvent {
    /// Wire name used in machine logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserScrolledUp => "USER_SCROLLED_UP",
            Self::UserAtBottom => "USER_AT_BOTTOM",
        }
    }

    /// Owner after the event is applied.
    #[must_use]
    pub const fn target(self) -> ScrollOwner {
        match self {
            Self::UserScrolledUp => ScrollOwner::UserOwned,
            Self::UserAtBottom => ScrollOwner::MachineOwned,
        }
    }
}

/// A state change produced by the arbiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipTransition {
    pub event: OwnershipEvent,
    pub from: ScrollOwner,
    pub to: ScrollOwner,
    /// When the transition was applied.
    pub at: Duration,
}

// ---------------------------------------------------------------------------
// Arbiter
// ---------------------------------------------------------------------------

/// Authoritative ownership state machine.
#[derive(Debug, Clone)]
pub struct OwnershipArbiter {
    config: OwnershipConfig,
    owner: ScrollOwner,
    /// Scroll top of the previous sample; `None` while detached.
    baseline: Option<f64>,
    intent: IntentTracker,
    grace_until: Option<Duration>,
}

impl OwnershipArbiter {
    /// Create a detached arbiter in the initial state.
    #[must_use]
    pub fn new(config: OwnershipConfig) -> Self {
        Self {
            config,
            owner: ScrollOwner::MachineOwned,
            baseline: None,
            intent: IntentTracker::new(),
            grace_until: None,
        }
    }

    /// Current owner.
    #[must_use]
    pub fn owner(&self) -> ScrollOwner {
        self.owner
    }

    /// Whether a viewport baseline exists.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.baseline.is_some()
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &OwnershipConfig {
        &self.config
    }

    /// Whether upward detections are currently suppressed.
    #[must_use]
    pub fn in_grace(&self, now: Duration) -> bool {
        self.grace_until.is_some_and(|until| now < until)
    }

    /// Seed the baseline from a freshly mounted viewport. Emits nothing.
    pub fn attach(&mut self, metrics: ScrollMetrics) {
        self.baseline = Some(metrics.scroll_top);
    }

    /// Forget the viewport. Ownership is kept.
    pub fn detach(&mut self) {
        self.baseline = None;
        self.intent.clear();
        self.grace_until = None;
    }

    /// Start the post-restoration grace window.
    pub fn on_restore_ended(&mut self, now: Duration) {
        self.grace_until = Some(now.saturating_add(self.config.grace()));
    }

    /// Record a physical gesture.
    ///
    /// An upward gesture while `restoring` hands ownership to the user
    /// directly; scroll samples are ignored during restoration, so this is
    /// the only way a user can interrupt an in-flight animation.
    pub fn record_intent(
        &mut self,
        signal: &IntentSignal,
        restoring: bool,
        now: Duration,
    ) -> Option<OwnershipTransition> {
        if !self.is_attached() {
            return None;
        }
        self.intent.record(signal, now);
        tracing::trace!(
            target: "socratic.ownership",
            kind = signal.kind(),
            restoring,
            "intent recorded"
        );
        if restoring && signal.direction() == Some(ScrollDirection::Up) {
            return self.apply(OwnershipEvent::UserScrolledUp, now);
        }
        None
    }

    /// Evaluate a scroll sample.
    ///
    /// `metrics` is `None` when the viewport is not mounted. The first sample
    /// after mounting only seeds the baseline.
    pub fn check(
        &mut self,
        metrics: Option<ScrollMetrics>,
        restoring: bool,
        now: Duration,
    ) -> Option<OwnershipTransition> {
        let metrics = metrics?;
        let Some(previous) = self.baseline.replace(metrics.scroll_top) else {
            return None;
        };
        if restoring {
            return None;
        }

        let at_bottom = metrics.is_at_bottom(self.config.bottom_tolerance_px);
        if at_bottom {
            if self.owner == ScrollOwner::UserOwned {
                return self.apply(OwnershipEvent::UserAtBottom, now);
            }
            return None;
        }

        if self.owner != ScrollOwner::MachineOwned {
            return None;
        }
        let moved_up = metrics.scroll_top < previous - self.config.min_upward_px;
        if !moved_up || self.in_grace(now) {
            return None;
        }
        if self.config.require_intent
            && !self.intent.is_recent(now, self.config.intent_window())
        {
            tracing::debug!(
                target: "socratic.ownership",
                scroll_top = metrics.scroll_top,
                previous,
                "upward movement without gesture ignored"
            );
            return None;
        }
        self.apply(OwnershipEvent::UserScrolledUp, now)
    }

    /// Apply an event if it changes the owner.
    pub fn apply(&mut self, event: OwnershipEvent, now: Duration) -> Option<OwnershipTransition> {
        let to = event.target();
        if self.owner == to {
            return None;
        }
        let transition = OwnershipTransition {
            event,
            from: self.owner,
            to,
            at: now,
        };
        self.owner = to;
        telemetry::record_ownership_transition(&transition);
        Some(transition)
    }
}

impl Default for OwnershipArbiter {
    fn default() -> Self {
        Self::new(OwnershipConfig::default())
    }
}
