use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use socratic_core::{Dialogue, FollowConfig};

use crate::error::{CliError, Result};

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Dialogue JSON file (`{"topic": ..., "turns": [...]}`).
    pub file: PathBuf,

    /// TOML or JSON configuration supplying the schema bounds.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// What a valid dialogue contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub command: &'static str,
    pub status: &'static str,
    pub topic: String,
    pub turns: usize,
    pub diagrams: usize,
    pub code_blocks: usize,
}

pub(crate) fn load_config(path: Option<&PathBuf>) -> Result<FollowConfig> {
    match path {
        Some(path) if !path.exists() => Err(CliError::MissingPath { path: path.clone() }),
        Some(path) => Ok(FollowConfig::load(path)?),
        None => Ok(FollowConfig::default()),
    }
}

/// Parse and check the file against the schema rules.
pub fn validate_file(args: &ValidateArgs) -> Result<ValidationSummary> {
    let config = load_config(args.config.as_ref())?;
    if !args.file.exists() {
        return Err(CliError::MissingPath {
            path: args.file.clone(),
        });
    }
    let json = std::fs::read_to_string(&args.file)?;
    let dialogue = Dialogue::from_json_str(&json, &config.schema)?;
    tracing::debug!(
        target: "socratic.cli",
        file = %args.file.display(),
        turns = dialogue.turns.len(),
        "dialogue accepted"
    );
    Ok(ValidationSummary {
        command: "validate",
        status: "ok",
        turns: dialogue.turns.len(),
        diagrams: dialogue.turns.iter().filter(|t| t.has_diagram()).count(),
        code_blocks: dialogue.turns.iter().filter(|t| t.has_code_fence()).count(),
        topic: dialogue.topic,
    })
}

pub fn run_validate(args: ValidateArgs) -> Result<()> {
    let summary = validate_file(&args)?;
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}
