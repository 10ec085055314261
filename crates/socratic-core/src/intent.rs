#![forbid(unsafe_code)]

//! Physical scroll-intent tracking.
//!
//! A scroll position change alone does not say who moved the viewport:
//! content reflow, scroll anchoring and programmatic writes all look like
//! user scrolling. Physical gestures (wheel, touch drag, navigation keys)
//! are the only signals the machine never produces, so the arbiter only
//! accepts an upward movement as user intent when one arrived recently.

use core::time::Duration;

/// Vertical direction of a gesture in content space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    /// Toward earlier content (scroll top decreases).
    Up,
    /// Toward later content (scroll top increases).
    Down,
}

/// Navigation keys that scroll a focused viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    ArrowUp,
    ArrowDown,
    PageUp,
    PageDown,
    Home,
    End,
    Space,
}

impl NavKey {
    /// Direction the key scrolls.
    #[must_use]
    pub const fn direction(self) -> ScrollDirection {
        match self {
            Self::ArrowUp | Self::PageUp | Self::Home => ScrollDirection::Up,
            Self::ArrowDown | Self::PageDown | Self::End | Self::Space => ScrollDirection::Down,
        }
    }
}

/// A physical gesture that may move the viewport.
///
/// `delta_y` follows the scroll-top convention for both wheel and touch:
/// negative values move toward earlier content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntentSignal {
    Wheel { delta_y: f64 },
    Touch { delta_y: f64 },
    Key(NavKey),
}

impl IntentSignal {
    /// Direction of the gesture, `None` for a zero delta.
    #[must_use]
    pub fn direction(&self) -> Option<ScrollDirection> {
        match *self {
            Self::Wheel { delta_y } | Self::Touch { delta_y } => {
                if delta_y < 0.0 {
                    Some(ScrollDirection::Up)
                } else if delta_y > 0.0 {
                    Some(ScrollDirection::Down)
                } else {
                    None
                }
            }
            Self::Key(key) => Some(key.direction()),
        }
    }

    /// Short label for tracing.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Wheel { .. } => "wheel",
            Self::Touch { .. } => "touch",
            Self::Key(_) => "key",
        }
    }
}

/// Remembers the most recent physical gesture.
#[derive(Debug, Clone, Default)]
pub struct IntentTracker {
    last_at: Option<Duration>,
    last_direction: Option<ScrollDirection>,
}

impl IntentTracker {
    /// Create an empty tracker.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_at: None,
            last_direction: None,
        }
    }

    /// Record a gesture observed at `now`.
    pub fn record(&mut self, signal: &IntentSignal, now: Duration) {
        self.last_at = Some(now);
        self.last_direction = signal.direction();
    }

    /// Whether a gesture arrived within `window` before `now`.
    #[must_use]
    pub fn is_recent(&self, now: Duration, window: Duration) -> bool {
        self.last_at
            .is_some_and(|at| now.saturating_sub(at) <= window)
    }

    /// Direction of the most recent gesture.
    #[must_use]
    pub fn last_direction(&self) -> Option<ScrollDirection> {
        self.last_direction
    }

    /// Forget all gestures.
    pub fn clear(&mut self) {
        self.last_at = None;
        self.last_direction = None;
    }
}
