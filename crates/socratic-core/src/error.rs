#![forbid(unsafe_code)]

//! Socratic error model.
//!
//! # Design Principles
//!
//! 1. **Result at the boundary**: only dialogue intake and configuration
//!    loading can fail. Measurement, arbitration and actuation never return
//!    errors: a missing viewport is an expected transient and is a no-op.
//! 2. **Domain-specific errors**: each subsystem has its own typed error so
//!    callers can match on what matters and let the rest propagate.
//! 3. **User visibility**: every variant knows whether it should be surfaced
//!    to the person driving the UI (see [`Error::is_user_visible`]).

use std::fmt;

// ── Domain-Specific Error Types ─────────────────────────────────────────

/// Why a fenced diagram block was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramViolation {
    /// The fenced block exceeds the allowed length.
    TooLong { len: usize, max: usize },
    /// The block does not use the single allowed flowchart direction.
    MissingDirection { expected: &'static str },
    /// The block contains a denylisted directive.
    Forbidden(&'static str),
}

/// Dialogue intake errors: prompt validation, transport and schema checks.
#[derive(Debug)]
pub enum DialogueError {
    /// The prompt was empty after trimming.
    EmptyPrompt,
    /// The prompt exceeds the allowed length.
    PromptTooLong { len: usize, max: usize },
    /// Response body was not valid JSON for the dialogue shape.
    Json(serde_json::Error),
    /// Topic is empty or too long.
    TopicLength { len: usize, max: usize },
    /// Turn count is outside the configured range.
    TurnCount { count: usize, min: usize, max: usize },
    /// A turn's content is empty or too long.
    ContentLength { index: usize, len: usize, max: usize },
    /// The first turn is not spoken by the fixed opening speaker.
    FirstSpeaker { found: &'static str },
    /// Two consecutive turns share a speaker.
    NotAlternating { index: usize },
    /// A fenced diagram violates the safe subset.
    Diagram {
        index: usize,
        violation: DiagramViolation,
    },
    /// The request could not be delivered or the response not read.
    Transport(String),
    /// The upstream service answered with a non-success status.
    Status { code: u16, body: String },
    /// Reading a local fixture failed.
    Io(std::io::Error),
}

/// Configuration loading and validation errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    Io(std::io::Error),
    /// TOML could not be parsed.
    Toml(toml::de::Error),
    /// JSON could not be parsed.
    Json(serde_json::Error),
    /// Parsed values are out of range.
    Invalid(Vec<String>),
}

// ── Unified Error ───────────────────────────────────────────────────────

/// Top-level error type for socratic APIs.
#[derive(Debug)]
pub enum Error {
    /// Dialogue intake failure.
    Dialogue(DialogueError),
    /// Configuration failure.
    Config(ConfigError),
    /// Raw I/O error (convenience variant for `?` on io::Result).
    Io(std::io::Error),
}

/// Standard result type for socratic APIs.
pub type Result<T> = std::result::Result<T, Error>;

impl DialogueError {
    /// Short machine-readable label for tracing fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyPrompt | Self::PromptTooLong { .. } => "prompt",
            Self::Json(_) => "json",
            Self::TopicLength { .. }
            | Self::TurnCount { .. }
            | Self::ContentLength { .. }
            | Self::FirstSpeaker { .. }
            | Self::NotAlternating { .. }
            | Self::Diagram { .. } => "schema",
            Self::Transport(_) => "transport",
            Self::Status { .. } => "status",
            Self::Io(_) => "io",
        }
    }
}

impl Error {
    /// Error type label for metrics and tracing.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Dialogue(_) => "dialogue",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
        }
    }

    /// Whether the error should be shown to the user as a message.
    ///
    /// Dialogue failures are always surfaced; configuration errors abort
    /// startup instead.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::Dialogue(_))
    }
}

// ── Display ─────────────────────────────────────────────────────────────

impl fmt::Display for DiagramViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong { len, max } => write!(f, "diagram block too long ({len} > {max})"),
            Self::MissingDirection { expected } => {
                write!(f, "diagram block must declare `{expected}`")
            }
            Self::Forbidden(directive) => {
                write!(f, "diagram block uses forbidden directive `{directive}`")
            }
        }
    }
}

impl fmt::Display for DialogueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPrompt => write!(f, "prompt must not be empty"),
            Self::PromptTooLong { len, max } => {
                write!(f, "prompt too long: {len} characters (max {max})")
            }
            Self::Json(err) => write!(f, "malformed dialogue JSON: {err}"),
            Self::TopicLength { len, max } => {
                write!(f, "topic length {len} outside 1..={max}")
            }
            Self::TurnCount { count, min, max } if min == max => {
                write!(f, "expected exactly {min} turns, got {count}")
            }
            Self::TurnCount { count, min, max } => {
                write!(f, "expected {min}..={max} turns, got {count}")
            }
            Self::ContentLength { index, len, max } => {
                write!(f, "turn {index}: content length {len} outside 1..={max}")
            }
            Self::FirstSpeaker { found } => {
                write!(f, "first turn must be security_engineer, got {found}")
            }
            Self::NotAlternating { index } => {
                write!(f, "turn {index}: speakers must alternate")
            }
            Self::Diagram { index, violation } => write!(f, "turn {index}: {violation}"),
            Self::Transport(msg) => write!(f, "dialogue request failed: {msg}"),
            Self::Status { code, body } => write!(f, "dialogue service returned {code}: {body}"),
            Self::Io(err) => write!(f, "fixture I/O: {err}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "config I/O: {err}"),
            Self::Toml(err) => write!(f, "config TOML: {err}"),
            Self::Json(err) => write!(f, "config JSON: {err}"),
            Self::Invalid(problems) => write!(f, "invalid config: {}", problems.join("; ")),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dialogue(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "I/O: {err}"),
        }
    }
}

// ── std::error::Error ───────────────────────────────────────────────────

impl std::error::Error for DiagramViolation {}

impl std::error::Error for DialogueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Diagram { violation, .. } => Some(violation),
            _ => None,
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Toml(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Dialogue(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

// ── From conversions ────────────────────────────────────────────────────

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<DialogueError> for Error {
    fn from(err: DialogueError) -> Self {
        Self::Dialogue(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<serde_json::Error> for DialogueError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialogue_errors_are_user_visible() {
        let err = Error::from(DialogueError::EmptyPrompt);
        assert!(err.is_user_visible());
        assert_eq!(err.error_type(), "dialogue");
    }

    #[test]
    fn config_errors_are_not_user_visible() {
        let err = Error::from(ConfigError::Invalid(vec!["settle.settle_ms must be > 0".into()]));
        assert!(!err.is_user_visible());
        assert_eq!(err.to_string(), "invalid config: settle.settle_ms must be > 0");
    }

    #[test]
    fn turn_count_message_distinguishes_exact_and_range() {
        let exact = DialogueError::TurnCount {
            count: 3,
            min: 12,
            max: 12,
        };
        assert_eq!(exact.to_string(), "expected exactly 12 turns, got 3");

        let range = DialogueError::TurnCount {
            count: 3,
            min: 6,
            max: 10,
        };
        assert_eq!(range.to_string(), "expected 6..=10 turns, got 3");
    }

    #[test]
    fn diagram_violation_is_error_source() {
        use std::error::Error as _;
        let err = DialogueError::Diagram {
            index: 2,
            violation: DiagramViolation::Forbidden("subgraph"),
        };
        assert!(err.source().is_some());
        assert_eq!(err.kind(), "schema");
        assert!(err.to_string().contains("subgraph"));
    }
}
