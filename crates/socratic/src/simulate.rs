//! Headless deterministic run printing one JSONL frame sample per line.
//!
//! Either appends `--turns` fixture turns at t=0 or, with `--dialogue`,
//! replays a dialogue file with a fixed per-turn delay. An optional wheel
//! gesture at `--scroll-at` shows the hand-over to the reader.

use std::path::PathBuf;

use clap::Args;
use socratic_harness::{FrameSample, RenderModel, Scenario, SimViewport};
use socratic_runtime::FixtureSource;

use crate::error::{CliError, Result};
use crate::validate::load_config;

#[derive(Debug, Clone, Args)]
pub struct SimulateArgs {
    /// Fixture turns appended at t=0 (ignored with `--dialogue`).
    #[arg(long, default_value_t = 8)]
    pub turns: usize,

    /// Frames to sample after the content arrives.
    #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u32).range(1..))]
    pub frames: u32,

    /// Viewport client height in px.
    #[arg(long = "viewport-height", default_value_t = 600.0)]
    pub viewport_height: f64,

    /// Jump instead of animating.
    #[arg(long)]
    pub deterministic: bool,

    /// TOML or JSON configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Replay this dialogue file instead of appending fixture turns.
    #[arg(long)]
    pub dialogue: Option<PathBuf>,

    /// Per-turn replay delay in ms when replaying a dialogue.
    #[arg(long = "turn-delay-ms", default_value_t = 400)]
    pub turn_delay_ms: u64,

    /// Scroll up by this many px with a wheel gesture.
    #[arg(long = "scroll-up")]
    pub scroll_up: Option<f64>,

    /// Frame index at which `--scroll-up` fires.
    #[arg(long = "scroll-at", default_value_t = 60)]
    pub scroll_at: u32,
}

impl Default for SimulateArgs {
    fn default() -> Self {
        Self {
            turns: 8,
            frames: 120,
            viewport_height: 600.0,
            deterministic: false,
            config: None,
            dialogue: None,
            turn_delay_ms: 400,
            scroll_up: None,
            scroll_at: 60,
        }
    }
}

/// Run the scenario and collect one sample per frame.
pub fn simulate(args: &SimulateArgs) -> Result<Vec<FrameSample>> {
    if !args.viewport_height.is_finite() || args.viewport_height <= 0.0 {
        return Err(CliError::invalid(format!(
            "viewport height must be > 0, got {}",
            args.viewport_height
        )));
    }
    let mut config = load_config(args.config.as_ref())?;
    if args.deterministic {
        config.autoscroll.deterministic = true;
    }
    if args.dialogue.is_some() {
        config.replay.fixed_delay_ms = Some(args.turn_delay_ms);
    }

    let viewport = SimViewport::new(args.viewport_height, RenderModel::default());
    let mut scenario = Scenario::with_viewport(config, viewport);

    match &args.dialogue {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::MissingPath { path: path.clone() });
            }
            let mut source = FixtureSource::from_file(path)?;
            if !scenario.generate(&mut source, "simulate") {
                let reason = scenario
                    .app()
                    .session()
                    .last_error()
                    .unwrap_or("unknown error")
                    .to_string();
                return Err(CliError::exit(3, format!("dialogue rejected: {reason}")));
            }
            scenario.replay();
        }
        None => scenario.append_turns(args.turns),
    }

    let mut samples = Vec::with_capacity(args.frames as usize);
    for frame in 0..args.frames {
        if frame == args.scroll_at
            && let Some(px) = args.scroll_up
        {
            scenario.manual_scroll(-px.abs());
        }
        scenario.step();
        samples.push(scenario.sample());
    }
    tracing::debug!(
        target: "socratic.cli",
        frames = samples.len(),
        quiescent = scenario.is_quiescent(),
        "simulation finished"
    );
    Ok(samples)
}

pub fn run_simulate(args: SimulateArgs) -> Result<()> {
    for sample in simulate(&args)? {
        println!("{}", serde_json::to_string(&sample)?);
    }
    Ok(())
}
