#![forbid(unsafe_code)]

//! Deterministic content fixtures.
//!
//! Seeds can be overridden with `SOCRATIC_TEST_SEED` so a failing generated
//! case can be replayed exactly.

use socratic_core::{Dialogue, Speaker, Turn};

/// Speaker of the `i`-th turn of an alternating debate.
#[must_use]
pub fn speaker(i: usize) -> Speaker {
    if i % 2 == 0 {
        Speaker::SecurityEngineer
    } else {
        Speaker::ApplicationEngineer
    }
}

/// A tall turn (about 1000 characters) so that a handful overflow the
/// viewport. Exceeds the wire content limit; inject it with
/// [`DomainEvent::AppendTurn`](socratic_runtime::DomainEvent::AppendTurn).
#[must_use]
pub fn turn(i: usize) -> Turn {
    Turn::new(speaker(i), format!("Turn {i}\n\n{}", "word ".repeat(200)))
}

/// A turn carrying a small flowchart that renders in a late pass.
#[must_use]
pub fn diagram_turn(i: usize) -> Turn {
    Turn::new(
        speaker(i),
        format!(
            "Turn {i}: the request path.\n\n```mermaid\nflowchart LR\n  client-->gateway\n  gateway-->service\n```\n"
        ),
    )
}

/// A wire-valid dialogue of `n` turns, every turn within the content limit.
#[must_use]
pub fn dialogue(n: usize) -> Dialogue {
    Dialogue {
        topic: "Zero trust in microservices".into(),
        turns: (0..n)
            .map(|i| Turn::new(speaker(i), format!("Point {i}. {}", "argue ".repeat(100))))
            .collect(),
    }
}

/// [`dialogue`] serialized the way the generation endpoint answers.
#[must_use]
pub fn dialogue_json(n: usize) -> String {
    serde_json::to_string(&dialogue(n)).unwrap_or_default()
}

/// Seed from `SOCRATIC_TEST_SEED`, or `default_seed`.
#[must_use]
pub fn fixture_seed(default_seed: u64) -> u64 {
    std::env::var("SOCRATIC_TEST_SEED")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_seed)
}

/// Deterministic LCG for repeatable generated content.
#[derive(Debug, Clone)]
pub struct Lcg(u64);

impl Lcg {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        (self.0 >> 32) as u32
    }

    /// Uniform-ish value in `0..max` (0 when `max` is 0).
    pub fn next_range(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        (self.next_u32() as usize) % max
    }

    /// A turn of 20..=150 words; one in four carries a diagram.
    pub fn turn(&mut self, i: usize) -> Turn {
        let words = 20 + self.next_range(131);
        let mut content = format!("Turn {i}. {}", "word ".repeat(words));
        if self.next_range(4) == 0 {
            content.push_str("\n\n```mermaid\nflowchart LR\n  a-->b\n```\n");
        }
        Turn::new(speaker(i), content)
    }
}
