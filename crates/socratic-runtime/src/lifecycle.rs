#![forbid(unsafe_code)]

//! Replay lifecycle.
//!
//! ```text
//!   Idle ──Generate──▶ Ready ──Replay──▶ Replaying ──Done──▶ Complete
//!                        ▲                   │                  │
//!                        │                 Fail                 │
//!                     Generate               ▼                  │
//!                        └────────────── Error     Replaying ◀─Replay
//! ```
//!
//! This region is independent of scroll ownership: no lifecycle event ever
//! touches the owner and vice versa.

use serde::Serialize;

/// Lifecycle states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    #[default]
    Idle,
    Ready,
    Replaying,
    Complete,
    Error,
}

impl Lifecycle {
    /// Attribute value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Ready => "ready",
            Self::Replaying => "replaying",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }

    /// State after `event`, or `None` when the event is not accepted here.
    #[must_use]
    pub const fn next(self, event: LifecycleEvent) -> Option<Self> {
        match (self, event) {
            (Self::Idle | Self::Error, LifecycleEvent::Generate) => Some(Self::Ready),
            (Self::Ready | Self::Complete, LifecycleEvent::Replay) => Some(Self::Replaying),
            (Self::Replaying, LifecycleEvent::Done) => Some(Self::Complete),
            (Self::Replaying, LifecycleEvent::Fail) => Some(Self::Error),
            _ => None,
        }
    }
}

/// Lifecycle inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Generate,
    Replay,
    Done,
    Fail,
}

impl LifecycleEvent {
    /// Wire name used in machine logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generate => "GENERATE",
            Self::Replay => "REPLAY",
            Self::Done => "DONE",
            Self::Fail => "FAIL",
        }
    }
}

/// An accepted lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleChange {
    pub event: LifecycleEvent,
    pub from: Lifecycle,
    pub to: Lifecycle,
}

#[cfg(test)]
mod tests {
    use super::*;
    use LifecycleEvent::*;

    #[test]
    fn happy_path() {
        let mut state = Lifecycle::Idle;
        for (event, expected) in [
            (Generate, Lifecycle::Ready),
            (Replay, Lifecycle::Replaying),
            (Done, Lifecycle::Complete),
            (Replay, Lifecycle::Replaying),
            (Fail, Lifecycle::Error),
            (Generate, Lifecycle::Ready),
        ] {
            state = state.next(event).expect("accepted");
            assert_eq!(state, expected);
        }
    }

    #[test]
    fn unaccepted_events_are_rejected() {
        assert_eq!(Lifecycle::Idle.next(Replay), None);
        assert_eq!(Lifecycle::Ready.next(Generate), None);
        assert_eq!(Lifecycle::Replaying.next(Generate), None);
        assert_eq!(Lifecycle::Replaying.next(Replay), None);
        assert_eq!(Lifecycle::Complete.next(Generate), None);
        assert_eq!(Lifecycle::Complete.next(Done), None);
        assert_eq!(Lifecycle::Error.next(Replay), None);
    }
}
