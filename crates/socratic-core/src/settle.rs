#![forbid(unsafe_code)]

//! Layout stability detection.
//!
//! Content height changes in bursts: a turn is appended, markdown renders a
//! moment later, a diagram renders later still. Auto-follow must wait until
//! the burst is over, otherwise it chases a moving target. The detector
//! debounces every observed mutation and reports a *settle* once the content
//! has been quiet for `settle_ms`.
//!
//! # Invariants
//!
//! 1. Any observed mutation sets `ready = false` and restarts the deadline;
//!    deadlines never stack.
//! 2. Each not-ready → ready transition increments `version` exactly once.
//! 3. With no content mounted the detector is permanently not-ready and
//!    ignores mutations.
//! 4. [`LayoutStabilityDetector::cancel`] clears the pending deadline.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry;

/// Detector tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    /// Quiet period before layout counts as settled. Default: 150 ms.
    pub settle_ms: u64,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self { settle_ms: 150 }
    }
}

impl SettleConfig {
    /// Quiet period as a [`Duration`].
    #[must_use]
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Observable state of the detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SettleState {
    pub ready: bool,
    pub version: u64,
}

/// Emitted when layout becomes ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleSignal {
    /// New settle version (strictly greater than every earlier one).
    pub version: u64,
    /// Deadline that fired.
    pub at: Duration,
}

/// Debounced layout readiness.
#[derive(Debug, Clone)]
pub struct LayoutStabilityDetector {
    config: SettleConfig,
    mounted: bool,
    state: SettleState,
    deadline: Option<Duration>,
    block_revision: Option<u64>,
    /// Mutations observed since the last settle (diagnostics).
    burst_len: u32,
}

impl LayoutStabilityDetector {
    /// Create a detector with no content mounted.
    #[must_use]
    pub fn new(config: SettleConfig) -> Self {
        Self {
            config,
            mounted: false,
            state: SettleState::default(),
            deadline: None,
            block_revision: None,
            burst_len: 0,
        }
    }

    /// Current readiness and version.
    #[must_use]
    pub fn state(&self) -> SettleState {
        self.state
    }

    /// Whether layout is currently settled.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state.ready
    }

    /// Number of completed settle cycles.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.state.version
    }

    /// Pending debounce deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Whether content is mounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Mount or unmount the observed content.
    ///
    /// Mounting starts observation, which yields an initial size
    /// notification; unmounting makes the detector permanently not-ready.
    pub fn set_mounted(&mut self, mounted: bool, now: Duration) {
        if self.mounted == mounted {
            return;
        }
        self.mounted = mounted;
        if mounted {
            self.on_mutation(now);
        } else {
            self.state.ready = false;
            self.deadline = None;
            self.burst_len = 0;
        }
    }

    /// Report the block list revision. A changed revision invalidates
    /// readiness immediately and restarts the quiet period.
    pub fn observe_blocks(&mut self, revision: u64, now: Duration) {
        if self.block_revision == Some(revision) {
            return;
        }
        self.block_revision = Some(revision);
        if self.mounted {
            self.on_mutation(now);
        }
    }

    /// Report an observed content-size mutation.
    pub fn on_content_resized(&mut self, now: Duration) {
        if self.mounted {
            self.on_mutation(now);
        }
    }

    /// Fire the deadline if it has elapsed.
    pub fn poll(&mut self, now: Duration) -> Option<SettleSignal> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        if !self.mounted {
            return None;
        }
        self.state.ready = true;
        self.state.version += 1;
        telemetry::record_settle(self.state.version, self.burst_len);
        self.burst_len = 0;
        Some(SettleSignal {
            version: self.state.version,
            at: deadline,
        })
    }

    /// Cancel the pending deadline (teardown).
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    fn on_mutation(&mut self, now: Duration) {
        self.state.ready = false;
        self.burst_len = self.burst_len.saturating_add(1);
        self.deadline = Some(now.saturating_add(self.config.settle()));
    }
}

impl Default for LayoutStabilityDetector {
    fn default() -> Self {
        Self::new(SettleConfig::default())
    }
}
