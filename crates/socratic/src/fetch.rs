use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use socratic_runtime::{HttpSource, generate_dialogue};

use crate::error::{CliError, Result};
use crate::validate::load_config;

#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    /// Service base URL; the request goes to `{endpoint}/api/dialogue`.
    #[arg(long)]
    pub endpoint: String,

    /// Debate prompt.
    #[arg(long)]
    pub prompt: String,

    /// Request timeout in seconds.
    #[arg(long = "timeout", default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_seconds: u64,

    /// Write the validated dialogue here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// TOML or JSON configuration supplying the schema bounds.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run_fetch(args: FetchArgs) -> Result<()> {
    if !args.endpoint.starts_with("http://") && !args.endpoint.starts_with("https://") {
        return Err(CliError::invalid(format!(
            "endpoint must be an http(s) URL, got {}",
            args.endpoint
        )));
    }
    let config = load_config(args.config.as_ref())?;
    let mut source = HttpSource::new(&args.endpoint, Duration::from_secs(args.timeout_seconds))?;
    let dialogue = generate_dialogue(&mut source, &args.prompt, &config.schema)?;

    // Only a dialogue that passed validation reaches disk.
    let body = serde_json::to_string_pretty(&dialogue)?;
    match args.out {
        Some(path) => {
            std::fs::write(&path, body)?;
            tracing::info!(
                target: "socratic.cli",
                path = %path.display(),
                turns = dialogue.turns.len(),
                "dialogue written"
            );
        }
        None => println!("{body}"),
    }
    Ok(())
}
