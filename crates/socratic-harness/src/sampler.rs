#![forbid(unsafe_code)]

//! Per-frame samples and the checks run over them.
//!
//! # JSONL Schema
//!
//! ```json
//! {"t_ms":208,"scroll_top":0.0,"scroll_height":1784.0,"client_height":600.0,"owner":"machineOwned","restoring":false,"layout_ready":true,"settle_version":1,"intensity":1.0}
//! ```

use std::collections::BTreeSet;

use serde::Serialize;
use socratic_core::ScrollOwner;

/// Observable surface state at the end of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameSample {
    pub t_ms: u64,
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
    pub owner: ScrollOwner,
    pub restoring: bool,
    pub layout_ready: bool,
    pub settle_version: u64,
    pub intensity: f64,
}

impl FrameSample {
    /// Distance from the bottom edge of the viewport to the end of content.
    #[must_use]
    pub fn distance_to_bottom(&self) -> f64 {
        (self.scroll_height - self.client_height - self.scroll_top).max(0.0)
    }

    /// One JSONL line.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Largest backward scroll movement between consecutive samples.
#[must_use]
pub fn max_backward_step(samples: &[FrameSample]) -> f64 {
    samples
        .windows(2)
        .map(|w| w[0].scroll_top - w[1].scroll_top)
        .fold(0.0, f64::max)
}

/// Number of consecutive-sample scroll height changes above `threshold_px`.
#[must_use]
pub fn height_changes(samples: &[FrameSample], threshold_px: f64) -> usize {
    samples
        .windows(2)
        .filter(|w| (w[1].scroll_height - w[0].scroll_height).abs() > threshold_px)
        .count()
}

/// Distinct owners observed.
#[must_use]
pub fn owners(samples: &[FrameSample]) -> BTreeSet<&'static str> {
    samples.iter().map(|s| s.owner.as_str()).collect()
}

/// `(min, max)` intensity, or `None` for no samples.
#[must_use]
pub fn intensity_range(samples: &[FrameSample]) -> Option<(f64, f64)> {
    let first = samples.first()?.intensity;
    Some(samples.iter().fold((first, first), |(lo, hi), s| {
        (lo.min(s.intensity), hi.max(s.intensity))
    }))
}

/// Largest frame-to-frame intensity change.
#[must_use]
pub fn max_intensity_step(samples: &[FrameSample]) -> f64 {
    samples
        .windows(2)
        .map(|w| (w[1].intensity - w[0].intensity).abs())
        .fold(0.0, f64::max)
}
