#![forbid(unsafe_code)]

//! Observer-anchor measurement.
//!
//! A zero-height anchor sits after the last block. Its position relative to
//! the viewport says how far the newest content lies below what the user can
//! see. The measurement is read-only telemetry for the gradient; ownership
//! never depends on it.

use crate::geometry::Viewport;

/// One anchor measurement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnchorMetrics {
    /// Anchor offset from the top edge of the viewport. The anchor has zero
    /// height, so its midpoint is its top.
    pub mid_y_in_viewport: f64,
    /// Anchor offset from the top of the content.
    pub bottom_in_content: f64,
    /// Visible height of the viewport.
    pub viewport_height: f64,
}

impl AnchorMetrics {
    /// How far the anchor lies below the visible area (negative when visible).
    #[must_use]
    pub fn distance_below_viewport(&self) -> f64 {
        self.mid_y_in_viewport - self.viewport_height
    }
}

/// Remembers the latest anchor measurement.
#[derive(Debug, Clone, Default)]
pub struct AnchorProbe {
    latest: Option<AnchorMetrics>,
}

impl AnchorProbe {
    /// Create a probe with no measurement.
    #[must_use]
    pub const fn new() -> Self {
        Self { latest: None }
    }

    /// Measure the anchor.
    ///
    /// Returns `None` (keeping the previous measurement) while layout is not
    /// ready, and `None` (clearing it) when the viewport or anchor is missing.
    pub fn measure<V: Viewport + ?Sized>(
        &mut self,
        layout_ready: bool,
        viewport: Option<&V>,
    ) -> Option<AnchorMetrics> {
        if !layout_ready {
            return None;
        }
        let Some(viewport) = viewport else {
            self.latest = None;
            return None;
        };
        let Some(anchor_top) = viewport.anchor_offset() else {
            self.latest = None;
            return None;
        };
        let metrics = viewport.metrics();
        let measured = AnchorMetrics {
            mid_y_in_viewport: anchor_top - metrics.scroll_top,
            bottom_in_content: anchor_top,
            viewport_height: metrics.client_height,
        };
        self.latest = Some(measured);
        Some(measured)
    }

    /// Latest measurement.
    #[must_use]
    pub fn latest(&self) -> Option<AnchorMetrics> {
        self.latest
    }

    /// Drop the stored measurement.
    pub fn clear(&mut self) {
        self.latest = None;
    }
}
