#![forbid(unsafe_code)]

//! Easing curves and a time-based tween.
//!
//! Only monotonic curves are offered: auto-follow must never move the scroll
//! position backwards mid-animation, and the gradient falloff must be
//! monotonic in distance.

use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Cubic ease-out: `1 - (1-t)³`, with `t` clamped to `[0, 1]`.
#[inline]
#[must_use]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

/// Linear interpolation between `a` and `b`.
#[inline]
#[must_use]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Monotonic easing curve selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// `t`.
    Linear,
    /// Fast start, slow end: `1 - (1-t)³`.
    #[default]
    EaseOutCubic,
    /// Smooth S-curve.
    EaseInOutCubic,
}

impl Easing {
    /// Apply the curve to a progress value (clamped to `[0, 1]`).
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOutCubic => ease_out_cubic(t),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
        }
    }
}

/// A scalar interpolation from `from` to `to` over `duration`, sampled at
/// absolute timestamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f64,
    to: f64,
    started_at: Duration,
    duration: Duration,
    easing: Easing,
}

impl Tween {
    /// Create a tween starting at `started_at`.
    #[must_use]
    pub fn new(from: f64, to: f64, started_at: Duration, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            started_at,
            duration,
            easing,
        }
    }

    /// Linear progress in `[0, 1]` at `now`. Zero-length tweens are complete
    /// immediately.
    #[must_use]
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Eased value at `now`. Returns exactly `to` once complete.
    #[must_use]
    pub fn value_at(&self, now: Duration) -> f64 {
        let t = self.progress(now);
        if t >= 1.0 {
            return self.to;
        }
        lerp(self.from, self.to, self.easing.apply(t))
    }

    /// Whether the tween has reached its end at `now`.
    #[must_use]
    pub fn is_complete(&self, now: Duration) -> bool {
        self.progress(now) >= 1.0
    }

    /// Start value.
    #[must_use]
    pub fn from(&self) -> f64 {
        self.from
    }

    /// End value.
    #[must_use]
    pub fn to(&self) -> f64 {
        self.to
    }
}
