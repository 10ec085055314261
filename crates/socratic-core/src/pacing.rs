#![forbid(unsafe_code)]

//! Replay pacing.
//!
//! A replayed debate reveals one turn at a time and then pauses long enough
//! to read it. The pause grows with the word count; diagrams and code blocks
//! earn extra time. `speed` scales everything (1.0 = normal, larger = slower).

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dialogue::Turn;

/// Pacing tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayPacingConfig {
    /// Pause before reading starts. Default: 1400 ms.
    pub base_ms: u64,
    /// Reading time per word. Default: 45 ms.
    pub per_word_ms: u64,
    /// Extra time for a turn containing a diagram. Default: 2000 ms.
    pub diagram_bonus_ms: u64,
    /// Extra time for a turn containing other fenced code. Default: 1400 ms.
    pub code_bonus_ms: u64,
    /// Global multiplier. Default: 1.6.
    pub speed: f64,
    /// When set, every turn waits exactly this long instead.
    pub fixed_delay_ms: Option<u64>,
}

impl Default for ReplayPacingConfig {
    fn default() -> Self {
        Self {
            base_ms: 1400,
            per_word_ms: 45,
            diagram_bonus_ms: 2000,
            code_bonus_ms: 1400,
            speed: 1.6,
            fixed_delay_ms: None,
        }
    }
}

impl ReplayPacingConfig {
    /// Pause after revealing `turn`.
    #[must_use]
    pub fn turn_delay(&self, turn: &Turn) -> Duration {
        if let Some(fixed) = self.fixed_delay_ms {
            return Duration::from_millis(fixed);
        }
        let words = turn.word_count() as u64;
        let mut ms = self
            .base_ms
            .saturating_add(words.saturating_mul(self.per_word_ms));
        if turn.has_diagram() {
            ms = ms.saturating_add(self.diagram_bonus_ms);
        }
        if turn.has_code_fence() {
            ms = ms.saturating_add(self.code_bonus_ms);
        }
        let nanos = (ms as f64 * self.speed.max(0.0) * 1_000_000.0).round();
        Duration::from_nanos(nanos as u64)
    }

    /// Range problems, empty when usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.speed.is_finite() || self.speed <= 0.0 {
            errors.push(format!("replay.speed must be finite and > 0, got {}", self.speed));
        }
        errors
    }
}
