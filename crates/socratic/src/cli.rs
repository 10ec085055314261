use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::fetch::{FetchArgs, run_fetch};
use crate::logging;
use crate::simulate::{SimulateArgs, run_simulate};
use crate::validate::{ValidateArgs, run_validate};

#[derive(Debug, Parser)]
#[command(
    name = "socratic",
    about = "Validate, fetch, and simulate Socratic debate transcripts",
    version
)]
pub struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long = "log-json", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check a dialogue JSON file against the wire schema.
    Validate(ValidateArgs),

    /// Run the scroll surface headlessly and print a JSONL frame trace.
    Simulate(SimulateArgs),

    /// Request a dialogue from a service and write it once validated.
    Fetch(FetchArgs),
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json);
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Validate(args) => run_validate(args),
        Commands::Simulate(args) => run_simulate(args),
        Commands::Fetch(args) => run_fetch(args),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;

    use crate::error::CliError;
    use crate::validate::ValidateArgs;

    use super::{Cli, Commands, run};

    #[test]
    fn parses_simulate_flags() {
        let cli = Cli::try_parse_from([
            "socratic",
            "--log-json",
            "simulate",
            "--turns",
            "3",
            "--deterministic",
            "--scroll-up",
            "250",
        ])
        .unwrap();
        assert!(cli.log_json);
        match cli.command {
            Commands::Simulate(args) => {
                assert_eq!(args.turns, 3);
                assert!(args.deterministic);
                assert_eq!(args.scroll_up, Some(250.0));
                assert_eq!(args.frames, 120);
            }
            other => panic!("expected simulate, got {other:?}"),
        }
    }

    #[test]
    fn fetch_requires_endpoint_and_prompt() {
        assert!(Cli::try_parse_from(["socratic", "fetch", "--prompt", "p"]).is_err());
        assert!(Cli::try_parse_from(["socratic", "fetch", "--endpoint", "http://x"]).is_err());
    }

    #[test]
    fn validate_command_dispatches_missing_path_error() {
        let result = run(Cli {
            log_json: false,
            command: Commands::Validate(ValidateArgs {
                file: PathBuf::from("/tmp/socratic/does-not-exist.json"),
                config: None,
            }),
        });

        match result.expect_err("missing dialogue file should fail") {
            CliError::MissingPath { path } => {
                assert_eq!(path, PathBuf::from("/tmp/socratic/does-not-exist.json"));
            }
            other => panic!("expected MissingPath, got {other}"),
        }
    }
}
