#![forbid(unsafe_code)]

//! Headless test harness for Socratic.
//!
//! # Key Components
//!
//! - [`SimViewport`] - scroll container whose blocks grow through delayed
//!   render passes, with queued scroll notifications
//! - [`Scenario`] - deterministic clock + [`DebateApp`](socratic_runtime::DebateApp)
//!   + recording bridge, stepped one frame at a time
//! - [`FrameSample`] - per-frame observable state and the checks over it
//! - [`fixtures`] - turn and dialogue fixtures, seeded LCG
//!
//! # Running
//!
//! ```sh
//! cargo test -p socratic-harness
//! SOCRATIC_TEST_SEED=42 cargo test -p socratic-harness --test proptest_scenarios
//! ```

pub mod driver;
pub mod fixtures;
pub mod sampler;
pub mod sim;

pub use driver::{FRAME, SETTLE_LIMIT, Scenario};
pub use sampler::FrameSample;
pub use sim::{BlockProfile, LayoutChanges, RenderModel, SimViewport};
