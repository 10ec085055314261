#![forbid(unsafe_code)]

//! Socratic public facade crate.
//!
//! Re-exports the types most hosts need from `socratic-core` and
//! `socratic-runtime`, and carries the `socratic` command-line tool
//! (`validate`, `simulate`, `fetch`).

pub mod cli;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod simulate;
pub mod validate;

pub use cli::run_from_env;
pub use error::{CliError, Result};

// --- Core re-exports -------------------------------------------------------

pub use socratic_core::{
    Dialogue, DialogueError, DialogueLimits, FollowConfig, IntentSignal, NavKey, RestoreEvent,
    RestoreOutcome, ScrollMetrics, ScrollOwner, Speaker, Turn, Viewport,
};

// --- Runtime re-exports ----------------------------------------------------

pub use socratic_runtime::{
    BridgeSink, DebateApp, DialogueSource, DomainEvent, FixtureSource, HttpSource, Lifecycle,
    SurfaceAttributes, SurfaceEvent, SurfaceInput, test_id,
};

/// Everything a host loop needs in one import.
pub mod prelude {
    pub use crate::{
        DebateApp, DomainEvent, FollowConfig, IntentSignal, ScrollOwner, SurfaceInput, Viewport,
    };
}
