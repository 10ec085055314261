#![forbid(unsafe_code)]

//! Socratic Runtime
//!
//! This crate assembles the primitives from `socratic-core` into a running
//! debate surface.
//!
//! # Key Components
//!
//! - [`Surface`] - Routes host inputs through projection, settle detection,
//!   ownership arbitration, actuation and the gradient
//! - [`DebateSession`] - Replay lifecycle plus the timed [`ReplayDriver`]
//! - [`DebateApp`] - Session and surface together, reporting to an optional
//!   [`BridgeSink`]
//! - [`DialogueSource`] - Fixture and (with the `http` feature) HTTP sources
//!
//! # How it fits in the system
//! A host (browser shim, terminal, or the simulated viewport in
//! `socratic-harness`) implements [`Viewport`](socratic_core::Viewport),
//! feeds inputs to [`DebateApp::dispatch`], calls [`DebateApp::poll`] when
//! [`DebateApp::next_deadline`] passes, and delivers one
//! [`SurfaceInput::Frame`] per animation frame while
//! [`DebateApp::needs_frame`] is true.

pub mod app;
pub mod bridge;
pub mod lifecycle;
pub mod projection;
pub mod replay;
pub mod session;
pub mod source;
pub mod surface;

pub use app::DebateApp;
pub use bridge::{
    BridgeSink, ElementAttributes, LogPhase, MachineLogEvent, RecordingBridge, SharedBridge,
    SurfaceAttributes, test_id,
};
pub use lifecycle::{Lifecycle, LifecycleChange, LifecycleEvent};
pub use projection::{BlockId, DialogueProjection, DomainEvent, LayoutBlock};
pub use replay::ReplayDriver;
pub use session::{DebateSession, REPLAY_INTERRUPTED, SessionEvent};
#[cfg(feature = "http")]
pub use source::HttpSource;
pub use source::{DialogueSource, FixtureSource, generate_dialogue};
pub use surface::{Surface, SurfaceEvent, SurfaceInput};
