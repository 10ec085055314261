#![forbid(unsafe_code)]

use std::io::IsTerminal;

fn main() {
    if let Err(error) = socratic::run_from_env() {
        if std::io::stderr().is_terminal() {
            eprintln!("{error}");
        } else {
            eprintln!(
                "{}",
                serde_json::json!({
                    "status": "error",
                    "error": error.to_string(),
                    "exit_code": error.exit_code(),
                })
            );
        }
        std::process::exit(error.exit_code());
    }
}
