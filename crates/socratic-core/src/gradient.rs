#![forbid(unsafe_code)]

//! Background gradient intensity.
//!
//! A cosmetic 0..1 value that tells the user how far they are from the live
//! edge of the conversation. While the machine follows (or is restoring, or
//! has just handed over) the gradient is pinned at full intensity. Once the
//! user owns scrolling it fades with the anchor's distance below the
//! viewport.
//!
//! # Invariants
//!
//! 1. Scroll notifications only change the *target*; intensity moves only in
//!    [`GradientProjector::advance`].
//! 2. One `advance` call changes intensity by at most `max_step`.
//! 3. Intensity is always within `[0, 1]`.
//! 4. Once within [`SNAP_EPSILON`] of the target, intensity lands exactly on
//!    it, so a projector at rest stops asking for frames.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::anchor::AnchorMetrics;
use crate::easing::ease_out_cubic;
use crate::ownership::ScrollOwner;

/// Distance below which `advance` lands exactly on the target.
pub const SNAP_EPSILON: f64 = 1e-3;

/// Gradient tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientConfig {
    /// Intensity while following. Default: 1.0.
    pub max_intensity: f64,
    /// Distance below the viewport at which intensity reaches zero.
    /// Default: 400 px.
    pub max_distance_px: f64,
    /// Full intensity is held this long after a machine→user handover.
    /// Default: 250 ms.
    pub grace_ms: u64,
    /// Exponential smoothing time constant. Default: 120 ms.
    pub smoothing_ms: u64,
    /// Largest change per `advance` call. Default: 0.08.
    pub max_step: f64,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            max_intensity: 1.0,
            max_distance_px: 400.0,
            grace_ms: 250,
            smoothing_ms: 120,
            max_step: 0.08,
        }
    }
}

/// Smoothed intensity projector.
#[derive(Debug, Clone)]
pub struct GradientProjector {
    config: GradientConfig,
    intensity: f64,
    owner: ScrollOwner,
    restoring: bool,
    anchor: Option<AnchorMetrics>,
    grace_until: Option<Duration>,
    last_advance: Option<Duration>,
}

impl GradientProjector {
    /// Create a projector in the following state (full intensity).
    #[must_use]
    pub fn new(config: GradientConfig) -> Self {
        let intensity = config.max_intensity.clamp(0.0, 1.0);
        Self {
            config,
            intensity,
            owner: ScrollOwner::MachineOwned,
            restoring: false,
            anchor: None,
            grace_until: None,
            last_advance: None,
        }
    }

    /// Current smoothed intensity.
    #[must_use]
    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    /// Track an ownership change. A machine→user handover starts the grace
    /// window.
    pub fn set_owner(&mut self, owner: ScrollOwner, now: Duration) {
        if self.owner == ScrollOwner::MachineOwned && owner == ScrollOwner::UserOwned {
            self.grace_until = Some(now.saturating_add(Duration::from_millis(self.config.grace_ms)));
        }
        self.owner = owner;
    }

    /// Track the restoring flag.
    pub fn set_restoring(&mut self, restoring: bool) {
        self.restoring = restoring;
    }

    /// Retarget from a new anchor measurement.
    pub fn observe(&mut self, anchor: AnchorMetrics) {
        self.anchor = Some(anchor);
    }

    /// Anchor distance below the viewport mapped to `[0, 1]`.
    #[must_use]
    pub fn normalized_position(&self) -> Option<f64> {
        let anchor = self.anchor?;
        if self.config.max_distance_px <= 0.0 {
            return Some(1.0);
        }
        Some((anchor.distance_below_viewport() / self.config.max_distance_px).clamp(0.0, 1.0))
    }

    /// Whether the post-handover hold is still running at `now`.
    #[must_use]
    pub fn in_grace(&self, now: Duration) -> bool {
        self.grace_until.is_some_and(|until| now < until)
    }

    /// Intensity sits on its target and no grace window is pending, so
    /// further `advance` calls would not change it.
    #[must_use]
    pub fn is_at_rest(&self, now: Duration) -> bool {
        !self.in_grace(now) && self.intensity == self.target(now)
    }

    /// Intensity the projector is moving toward at `now`.
    #[must_use]
    pub fn target(&self, now: Duration) -> f64 {
        let max = self.config.max_intensity.clamp(0.0, 1.0);
        if self.owner == ScrollOwner::MachineOwned || self.restoring || self.in_grace(now) {
            return max;
        }
        match self.normalized_position() {
            Some(position) => max * (1.0 - ease_out_cubic(position)),
            None => max,
        }
    }

    /// Move intensity toward the target for the time elapsed since the
    /// previous call. Returns the new intensity.
    pub fn advance(&mut self, now: Duration) -> f64 {
        let dt = self
            .last_advance
            .replace(now)
            .map_or(Duration::ZERO, |prev| now.saturating_sub(prev));
        let target = self.target(now);
        let alpha = if self.config.smoothing_ms == 0 {
            1.0
        } else {
            1.0 - (-dt.as_secs_f64() * 1000.0 / self.config.smoothing_ms as f64).exp()
        };
        let max_step = self.config.max_step.max(0.0);
        let gap = target - self.intensity;
        if gap.abs() <= SNAP_EPSILON.min(max_step) {
            self.intensity = target;
        } else {
            let step = (gap * alpha).clamp(-max_step, max_step);
            self.intensity = (self.intensity + step).clamp(0.0, 1.0);
        }
        tracing::trace!(
            target: "socratic.gradient",
            intensity = self.intensity,
            target,
            "gradient advanced"
        );
        self.intensity
    }
}

impl Default for GradientProjector {
    fn default() -> Self {
        Self::new(GradientConfig::default())
    }
}
