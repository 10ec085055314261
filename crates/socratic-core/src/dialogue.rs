#![forbid(unsafe_code)]

//! Dialogue data model and wire-contract validation.
//!
//! A dialogue is a topic plus an ordered list of turns spoken alternately by
//! two fixed personas. Content is markdown; fenced `mermaid` blocks are
//! restricted to a small, safe flowchart subset because they are rendered
//! by a third-party diagram engine on the client.
//!
//! Validation is all-or-nothing: [`Dialogue::from_json_str`] either returns a
//! dialogue that satisfies every bound in [`DialogueLimits`] or an error, so
//! a malformed response can never partially update a transcript.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DiagramViolation, DialogueError};

static MERMAID_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```mermaid.*?```").expect("mermaid fence regex"));

/// The only flowchart direction diagrams may declare.
pub const DIAGRAM_DIRECTION: &str = "flowchart LR";

/// Directives that are never allowed inside a diagram block.
pub const DIAGRAM_DENYLIST: [&str; 5] = [
    "click ",
    "classDef",
    "note over",
    "sequenceDiagram",
    "subgraph",
];

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Schema bounds, all measured in characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueLimits {
    /// Default: 300.
    pub max_prompt_chars: usize,
    /// Default: 160.
    pub max_topic_chars: usize,
    /// Default: 850.
    pub max_content_chars: usize,
    /// Length of a whole fenced diagram block, fences included. Default: 350.
    pub max_diagram_chars: usize,
    /// Default: 12.
    pub min_turns: usize,
    /// Default: 12.
    pub max_turns: usize,
}

impl Default for DialogueLimits {
    fn default() -> Self {
        Self {
            max_prompt_chars: 300,
            max_topic_chars: 160,
            max_content_chars: 850,
            max_diagram_chars: 350,
            min_turns: 12,
            max_turns: 12,
        }
    }
}

impl DialogueLimits {
    /// Accept between `min` and `max` turns inclusive.
    #[must_use]
    pub fn with_turn_range(mut self, min: usize, max: usize) -> Self {
        self.min_turns = min;
        self.max_turns = max;
        self
    }

    /// Range problems, empty when the limits are usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.min_turns == 0 {
            errors.push("schema.min_turns must be > 0".into());
        }
        if self.min_turns > self.max_turns {
            errors.push(format!(
                "schema.min_turns ({}) must be <= schema.max_turns ({})",
                self.min_turns, self.max_turns
            ));
        }
        for (name, value) in [
            ("max_prompt_chars", self.max_prompt_chars),
            ("max_topic_chars", self.max_topic_chars),
            ("max_content_chars", self.max_content_chars),
            ("max_diagram_chars", self.max_diagram_chars),
        ] {
            if value == 0 {
                errors.push(format!("schema.{name} must be > 0"));
            }
        }
        errors
    }
}

// ---------------------------------------------------------------------------
// Speakers and turns
// ---------------------------------------------------------------------------

/// The two debate personas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    SecurityEngineer,
    ApplicationEngineer,
}

impl Speaker {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SecurityEngineer => "security_engineer",
            Self::ApplicationEngineer => "application_engineer",
        }
    }

    /// The other persona.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::SecurityEngineer => Self::ApplicationEngineer,
            Self::ApplicationEngineer => Self::SecurityEngineer,
        }
    }
}

/// One utterance. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    /// Markdown body. Older payloads call this field `mdx`.
    #[serde(alias = "mdx")]
    pub content: String,
}

impl Turn {
    /// Create a turn.
    #[must_use]
    pub fn new(speaker: Speaker, content: impl Into<String>) -> Self {
        Self {
            speaker,
            content: content.into(),
        }
    }

    /// Whitespace-separated word count.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    /// Whether the content contains a fenced diagram.
    #[must_use]
    pub fn has_diagram(&self) -> bool {
        self.content.contains("```mermaid")
    }

    /// Whether the content contains a fenced block that is not a diagram.
    #[must_use]
    pub fn has_code_fence(&self) -> bool {
        self.content.contains("```") && !self.has_diagram()
    }

    /// Every fenced diagram block, fences included.
    pub fn diagram_blocks(&self) -> impl Iterator<Item = &str> {
        MERMAID_FENCE.find_iter(&self.content).map(|m| m.as_str())
    }
}

/// Check one fenced diagram block against the safe subset.
pub fn validate_diagram(block: &str, max_chars: usize) -> Result<(), DiagramViolation> {
    let len = block.chars().count();
    if len > max_chars {
        return Err(DiagramViolation::TooLong {
            len,
            max: max_chars,
        });
    }
    if !block.contains(DIAGRAM_DIRECTION) {
        return Err(DiagramViolation::MissingDirection {
            expected: DIAGRAM_DIRECTION,
        });
    }
    if let Some(directive) = DIAGRAM_DENYLIST
        .iter()
        .copied()
        .find(|d| block.contains(d))
    {
        return Err(DiagramViolation::Forbidden(directive));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Dialogue
// ---------------------------------------------------------------------------

/// A complete generated debate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialogue {
    pub topic: String,
    pub turns: Vec<Turn>,
}

impl Dialogue {
    /// Parse and validate a JSON payload.
    pub fn from_json_str(json: &str, limits: &DialogueLimits) -> Result<Self, DialogueError> {
        let dialogue: Self = serde_json::from_str(json)?;
        dialogue.validate(limits)?;
        Ok(dialogue)
    }

    /// Check every schema rule; the first violation wins.
    pub fn validate(&self, limits: &DialogueLimits) -> Result<(), DialogueError> {
        let topic_len = self.topic.chars().count();
        if topic_len == 0 || topic_len > limits.max_topic_chars {
            return Err(DialogueError::TopicLength {
                len: topic_len,
                max: limits.max_topic_chars,
            });
        }

        let count = self.turns.len();
        if count < limits.min_turns || count > limits.max_turns {
            return Err(DialogueError::TurnCount {
                count,
                min: limits.min_turns,
                max: limits.max_turns,
            });
        }

        for (index, turn) in self.turns.iter().enumerate() {
            let len = turn.content.chars().count();
            if len == 0 || len > limits.max_content_chars {
                return Err(DialogueError::ContentLength {
                    index,
                    len,
                    max: limits.max_content_chars,
                });
            }
            for block in turn.diagram_blocks() {
                validate_diagram(block, limits.max_diagram_chars)
                    .map_err(|violation| DialogueError::Diagram { index, violation })?;
            }
        }

        if let Some(first) = self.turns.first()
            && first.speaker != Speaker::SecurityEngineer
        {
            return Err(DialogueError::FirstSpeaker {
                found: first.speaker.as_str(),
            });
        }
        if let Some(index) = self
            .turns
            .windows(2)
            .position(|pair| pair[0].speaker == pair[1].speaker)
        {
            return Err(DialogueError::NotAlternating { index: index + 1 });
        }
        Ok(())
    }
}

/// Body of a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
}

impl PromptRequest {
    /// Validate and wrap a prompt.
    ///
    /// Stricter than a bare length check: a prompt of only whitespace is
    /// [`DialogueError::EmptyPrompt`]. Anything else is kept verbatim and
    /// its length is counted in characters.
    pub fn new(prompt: impl Into<String>, limits: &DialogueLimits) -> Result<Self, DialogueError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(DialogueError::EmptyPrompt);
        }
        let len = prompt.chars().count();
        if len > limits.max_prompt_chars {
            return Err(DialogueError::PromptTooLong {
                len,
                max: limits.max_prompt_chars,
            });
        }
        Ok(Self { prompt })
    }
}
