#![forbid(unsafe_code)]

//! Timed replay of a dialogue.
//!
//! The driver precomputes a schedule of [`DomainEvent`]s at absolute
//! offsets and hands them out as the host's clock reaches them. Each turn is
//! revealed, then the driver waits [`ReplayPacingConfig::turn_delay`] before
//! the next one; `ReplayComplete` follows the last pause.

use core::time::Duration;
use std::collections::VecDeque;

use socratic_core::{Dialogue, ReplayPacingConfig};

use crate::projection::DomainEvent;

/// Deadline-driven replay schedule.
#[derive(Debug, Clone)]
pub struct ReplayDriver {
    schedule: VecDeque<(Duration, DomainEvent)>,
    started_at: Duration,
    ends_at: Duration,
}

impl ReplayDriver {
    /// Schedule `dialogue` starting at `now`.
    #[must_use]
    pub fn new(dialogue: &Dialogue, pacing: &ReplayPacingConfig, now: Duration) -> Self {
        let mut schedule = VecDeque::with_capacity(dialogue.turns.len() + 2);
        schedule.push_back((now, DomainEvent::ReplayStart));
        let mut at = now;
        for turn in &dialogue.turns {
            schedule.push_back((at, DomainEvent::AppendTurn(turn.clone())));
            at = at.saturating_add(pacing.turn_delay(turn));
        }
        schedule.push_back((at, DomainEvent::ReplayComplete));
        tracing::debug!(
            target: "socratic.replay",
            turns = dialogue.turns.len(),
            total_ms = at.saturating_sub(now).as_millis() as u64,
            "replay scheduled"
        );
        Self {
            schedule,
            started_at: now,
            ends_at: at,
        }
    }

    /// Events due at `now`, in order.
    pub fn poll(&mut self, now: Duration) -> Vec<DomainEvent> {
        let mut due = Vec::new();
        while self.schedule.front().is_some_and(|(at, _)| *at <= now) {
            if let Some((_, event)) = self.schedule.pop_front() {
                due.push(event);
            }
        }
        due
    }

    /// Next pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.schedule.front().map(|(at, _)| *at)
    }

    /// Whether every event has been handed out.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.schedule.is_empty()
    }

    /// Events not yet handed out.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.schedule.len()
    }

    /// Scheduled length of the whole replay.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.ends_at.saturating_sub(self.started_at)
    }

    /// Drop every pending event.
    pub fn cancel(&mut self) {
        self.schedule.clear();
    }
}
