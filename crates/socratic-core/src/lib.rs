#![forbid(unsafe_code)]

//! Core primitives for Socratic's scroll-ownership and auto-follow
//! coordination.
//!
//! The crate is host-agnostic: geometry comes from a [`Viewport`]
//! implementation, time is an explicit monotonic `Duration`, and nothing
//! blocks or spawns threads. The pieces are composed by the coordinator in
//! `socratic-runtime`.
//!
//! | Module | Role |
//! |--------|------|
//! | [`ownership`] | Who owns scrolling (`machineOwned` / `userOwned`). |
//! | [`settle`] | Debounced "layout settled" signal with a version counter. |
//! | [`autoscroll`] | Animates to the bottom after each settle. |
//! | [`anchor`] | Measures the end-of-content anchor. |
//! | [`gradient`] | Cosmetic distance-to-live-edge intensity. |
//! | [`bus`] | Restore-event channel. |
//! | [`dialogue`] | Turn model and wire-contract validation. |
//! | [`config`] | Policy-as-data configuration. |

pub mod anchor;
pub mod autoscroll;
pub mod bus;
pub mod clock;
pub mod config;
pub mod dialogue;
pub mod easing;
pub mod error;
pub mod geometry;
pub mod gradient;
pub mod intent;
pub mod ownership;
pub mod pacing;
pub mod settle;
pub mod telemetry;

pub use anchor::{AnchorMetrics, AnchorProbe};
pub use autoscroll::{AutoScrollActuator, AutoScrollConfig};
pub use bus::{EventBus, RestoreEvent, RestoreOutcome, Subscription};
pub use clock::{Clock, DeterministicClock, SystemClock};
pub use config::FollowConfig;
pub use dialogue::{Dialogue, DialogueLimits, PromptRequest, Speaker, Turn};
pub use easing::{Easing, Tween, ease_out_cubic};
pub use error::{ConfigError, DiagramViolation, DialogueError, Error, Result};
pub use geometry::{ScrollMetrics, Viewport};
pub use gradient::{GradientConfig, GradientProjector};
pub use intent::{IntentSignal, NavKey, ScrollDirection};
pub use ownership::{
    OwnershipArbiter, OwnershipConfig, OwnershipEvent, OwnershipTransition, ScrollOwner,
};
pub use pacing::ReplayPacingConfig;
pub use settle::{LayoutStabilityDetector, SettleConfig, SettleSignal, SettleState};
