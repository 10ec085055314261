#![forbid(unsafe_code)]

//! Scroll geometry and the host viewport abstraction.
//!
//! # Design
//!
//! The scroll container is owned by the host (a browser element, a native
//! widget, or the headless simulator). Coordination code never caches layout;
//! it reads a fresh [`ScrollMetrics`] from the [`Viewport`] whenever it needs
//! one, and writes back only through [`Viewport::set_scroll_top`].
//!
//! All values are CSS pixels as `f64`.

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// One sample of the scroll container's geometry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    /// Distance scrolled from the top of the content.
    pub scroll_top: f64,
    /// Visible height of the viewport.
    pub client_height: f64,
    /// Total scrollable content height (never less than `client_height`).
    pub scroll_height: f64,
}

impl ScrollMetrics {
    /// Create a sample.
    #[must_use]
    pub const fn new(scroll_top: f64, client_height: f64, scroll_height: f64) -> Self {
        Self {
            scroll_top,
            client_height,
            scroll_height,
        }
    }

    /// Largest legal scroll top: `max(scroll_height - client_height, 0)`.
    #[must_use]
    pub fn max_scroll_top(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }

    /// Whether content is taller than the viewport.
    #[must_use]
    pub fn has_overflow(&self) -> bool {
        self.scroll_height > self.client_height
    }

    /// Remaining distance to the bottom edge, never negative.
    #[must_use]
    pub fn distance_to_bottom(&self) -> f64 {
        (self.max_scroll_top() - self.scroll_top).max(0.0)
    }

    /// `scroll_top + client_height >= scroll_height - tolerance`.
    #[must_use]
    pub fn is_at_bottom(&self, tolerance: f64) -> bool {
        self.scroll_top + self.client_height >= self.scroll_height - tolerance
    }
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Host-side scroll container.
///
/// Implementations must reflect writes immediately in subsequent reads
/// (clamped to the legal range), and should deliver a scroll notification
/// to the coordinator after a write that changed the position, exactly as
/// a browser fires `scroll` after assigning `scrollTop`.
pub trait Viewport {
    /// Fresh geometry sample.
    fn metrics(&self) -> ScrollMetrics;

    /// Request a new scroll top. The host clamps to `[0, max_scroll_top]`.
    fn set_scroll_top(&mut self, top: f64);

    /// Content-space offset of the zero-height anchor placed after the last
    /// block, or `None` when the anchor is not mounted.
    fn anchor_offset(&self) -> Option<f64>;
}

impl<V: Viewport + ?Sized> Viewport for Box<V> {
    fn metrics(&self) -> ScrollMetrics {
        (**self).metrics()
    }

    fn set_scroll_top(&mut self, top: f64) {
        (**self).set_scroll_top(top);
    }

    fn anchor_offset(&self) -> Option<f64> {
        (**self).anchor_offset()
    }
}
