#![forbid(unsafe_code)]

//! Debate session: the loaded dialogue, the replay lifecycle, and the replay
//! driver.
//!
//! # Failure Modes
//!
//! - A failed generation records `last_error` and leaves the lifecycle, the
//!   loaded dialogue, and any replay in progress untouched.
//! - Replaying without a dialogue moves the lifecycle to `Error` with the
//!   message `"No dialogue available"`.
//! - Tearing the surface down mid-replay moves the lifecycle to `Error` with
//!   [`REPLAY_INTERRUPTED`]; a later generation recovers as from any failure.

use core::time::Duration;

use socratic_core::{Dialogue, DialogueError, ReplayPacingConfig};

use crate::lifecycle::{Lifecycle, LifecycleChange, LifecycleEvent};
use crate::projection::DomainEvent;
use crate::replay::ReplayDriver;

/// Message recorded when a replay is cut short by teardown.
pub const REPLAY_INTERRUPTED: &str = "Replay interrupted";

/// Output of a session step.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A lifecycle event was offered. `change` is `None` when the current
    /// state did not accept it.
    Lifecycle {
        event: LifecycleEvent,
        change: Option<LifecycleChange>,
    },
    /// A transcript event became due.
    Domain(DomainEvent),
}

/// Lifecycle plus replay state for one debate.
#[derive(Debug, Clone)]
pub struct DebateSession {
    lifecycle: Lifecycle,
    dialogue: Option<Dialogue>,
    last_error: Option<String>,
    loading: bool,
    driver: Option<ReplayDriver>,
    pacing: ReplayPacingConfig,
}

impl DebateSession {
    /// Idle session without a dialogue.
    #[must_use]
    pub fn new(pacing: ReplayPacingConfig) -> Self {
        Self {
            lifecycle: Lifecycle::Idle,
            dialogue: None,
            last_error: None,
            loading: false,
            driver: None,
            pacing,
        }
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[must_use]
    pub fn dialogue(&self) -> Option<&Dialogue> {
        self.dialogue.as_ref()
    }

    /// User-visible message of the latest failure.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether a generation request is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether a replay is scheduled.
    #[must_use]
    pub fn is_replaying(&self) -> bool {
        self.driver.is_some()
    }

    /// Mark a generation request as started.
    pub fn begin_generation(&mut self) {
        self.loading = true;
        self.last_error = None;
    }

    /// Complete a generation request.
    pub fn finish_generation(&mut self, result: Result<Dialogue, DialogueError>) -> SessionEvent {
        self.loading = false;
        match result {
            Ok(dialogue) => {
                let change = self.transition(LifecycleEvent::Generate);
                if change.is_some() {
                    tracing::info!(
                        target: "socratic.session",
                        topic = %dialogue.topic,
                        turns = dialogue.turns.len(),
                        "dialogue loaded"
                    );
                    self.dialogue = Some(dialogue);
                    self.last_error = None;
                }
                SessionEvent::Lifecycle {
                    event: LifecycleEvent::Generate,
                    change,
                }
            }
            Err(err) => {
                tracing::warn!(
                    target: "socratic.session",
                    kind = err.kind(),
                    error = %err,
                    "dialogue rejected"
                );
                self.last_error = Some(err.to_string());
                SessionEvent::Lifecycle {
                    event: LifecycleEvent::Generate,
                    change: None,
                }
            }
        }
    }

    /// Start (or restart) the replay. Returns the lifecycle outcome followed
    /// by the events already due at `now`.
    pub fn replay(&mut self, now: Duration) -> Vec<SessionEvent> {
        let change = self.transition(LifecycleEvent::Replay);
        let mut out = vec![SessionEvent::Lifecycle {
            event: LifecycleEvent::Replay,
            change,
        }];
        if change.is_none() {
            return out;
        }
        match &self.dialogue {
            Some(dialogue) => {
                self.driver = Some(ReplayDriver::new(dialogue, &self.pacing, now));
                out.extend(self.poll(now));
            }
            None => out.push(self.fail("No dialogue available")),
        }
        out
    }

    /// Hand out due transcript events; emits `Done` after the last one.
    pub fn poll(&mut self, now: Duration) -> Vec<SessionEvent> {
        let Some(driver) = self.driver.as_mut() else {
            return Vec::new();
        };
        let mut out: Vec<_> = driver.poll(now).into_iter().map(SessionEvent::Domain).collect();
        if driver.is_finished() {
            self.driver = None;
            out.push(SessionEvent::Lifecycle {
                event: LifecycleEvent::Done,
                change: self.transition(LifecycleEvent::Done),
            });
        }
        out
    }

    /// Abort the replay with a user-visible message.
    pub fn fail(&mut self, message: impl Into<String>) -> SessionEvent {
        let change = self.transition(LifecycleEvent::Fail);
        if change.is_some() {
            if let Some(driver) = self.driver.as_mut() {
                driver.cancel();
            }
            self.driver = None;
            self.last_error = Some(message.into());
        }
        SessionEvent::Lifecycle {
            event: LifecycleEvent::Fail,
            change,
        }
    }

    /// Stop a replay that is still scheduled, moving the lifecycle to
    /// `Error` with [`REPLAY_INTERRUPTED`]. Returns `None` when nothing was
    /// replaying.
    pub fn cancel_replay(&mut self) -> Option<SessionEvent> {
        if !self.is_replaying() {
            return None;
        }
        Some(self.fail(REPLAY_INTERRUPTED))
    }

    /// Next replay deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.driver.as_ref().and_then(ReplayDriver::next_deadline)
    }

    fn transition(&mut self, event: LifecycleEvent) -> Option<LifecycleChange> {
        let from = self.lifecycle;
        let Some(to) = from.next(event) else {
            tracing::debug!(
                target: "socratic.session",
                event = event.as_str(),
                state = from.as_str(),
                "lifecycle event ignored"
            );
            return None;
        };
        self.lifecycle = to;
        tracing::info!(
            target: "socratic.session",
            event = event.as_str(),
            from = from.as_str(),
            to = to.as_str(),
            "lifecycle transition"
        );
        Some(LifecycleChange { event, from, to })
    }
}

impl Default for DebateSession {
    fn default() -> Self {
        Self::new(ReplayPacingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socratic_core::{Speaker, Turn};

    fn dialogue(n: usize) -> Dialogue {
        let mut speaker = Speaker::SecurityEngineer;
        let mut turns = Vec::with_capacity(n);
        for i in 0..n {
            turns.push(Turn::new(speaker, format!("point {i}")));
            speaker = speaker.other();
        }
        Dialogue {
            topic: "Zero trust in microservices".into(),
            turns,
        }
    }

    fn session() -> DebateSession {
        DebateSession::new(ReplayPacingConfig {
            fixed_delay_ms: Some(100),
            ..ReplayPacingConfig::default()
        })
    }

    fn accepted(event: &SessionEvent) -> bool {
        matches!(event, SessionEvent::Lifecycle { change: Some(_), .. })
    }

    #[test]
    fn generate_then_replay_to_complete() {
        let mut s = session();
        s.begin_generation();
        assert!(s.is_loading());
        assert!(accepted(&s.finish_generation(Ok(dialogue(3)))));
        assert_eq!(s.lifecycle(), Lifecycle::Ready);
        assert!(!s.is_loading());

        let out = s.replay(Duration::ZERO);
        assert_eq!(s.lifecycle(), Lifecycle::Replaying);
        assert_eq!(out.len(), 3);
        assert_eq!(out[1], SessionEvent::Domain(DomainEvent::ReplayStart));

        let mut appended = 1;
        let mut t = 0;
        while s.is_replaying() {
            t += 50;
            for event in s.poll(Duration::from_millis(t)) {
                if matches!(event, SessionEvent::Domain(DomainEvent::AppendTurn(_))) {
                    appended += 1;
                }
            }
        }
        assert_eq!(appended, 3);
        assert_eq!(s.lifecycle(), Lifecycle::Complete);
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn failed_generation_keeps_state() {
        let mut s = session();
        s.finish_generation(Ok(dialogue(2)));
        s.begin_generation();
        let out = s.finish_generation(Err(DialogueError::Transport("connection refused".into())));
        assert!(!accepted(&out));
        assert_eq!(s.lifecycle(), Lifecycle::Ready);
        assert_eq!(s.dialogue().map(|d| d.turns.len()), Some(2));
        assert!(s.last_error().is_some_and(|e| e.contains("connection refused")));
    }

    #[test]
    fn generate_is_ignored_while_ready() {
        let mut s = session();
        s.finish_generation(Ok(dialogue(2)));
        let out = s.finish_generation(Ok(dialogue(4)));
        assert!(!accepted(&out));
        assert_eq!(s.dialogue().map(|d| d.turns.len()), Some(2));
    }

    #[test]
    fn replay_from_idle_is_ignored() {
        let mut s = session();
        let out = s.replay(Duration::ZERO);
        assert_eq!(out.len(), 1);
        assert!(!accepted(&out[0]));
        assert_eq!(s.lifecycle(), Lifecycle::Idle);
    }

    #[test]
    fn fail_cancels_replay_and_allows_regeneration() {
        let mut s = session();
        s.finish_generation(Ok(dialogue(4)));
        s.replay(Duration::ZERO);
        assert!(accepted(&s.fail("renderer crashed")));
        assert_eq!(s.lifecycle(), Lifecycle::Error);
        assert!(!s.is_replaying());
        assert!(s.poll(Duration::from_secs(10)).is_empty());
        assert_eq!(s.last_error(), Some("renderer crashed"));

        assert!(accepted(&s.finish_generation(Ok(dialogue(2)))));
        assert_eq!(s.lifecycle(), Lifecycle::Ready);
        assert_eq!(s.last_error(), None);
    }

    #[test]
    fn cancel_replay_stops_the_driver() {
        let mut s = session();
        assert_eq!(s.cancel_replay(), None);

        s.finish_generation(Ok(dialogue(4)));
        s.replay(Duration::ZERO);
        let out = s.cancel_replay();
        assert!(out.as_ref().is_some_and(accepted));
        assert_eq!(s.lifecycle(), Lifecycle::Error);
        assert_eq!(s.last_error(), Some(REPLAY_INTERRUPTED));
        assert_eq!(s.next_deadline(), None);
        assert!(s.poll(Duration::from_secs(10)).is_empty());
        assert_eq!(s.cancel_replay(), None);
    }

    #[test]
    fn replay_after_complete_restarts() {
        let mut s = session();
        s.finish_generation(Ok(dialogue(2)));
        s.replay(Duration::ZERO);
        s.poll(Duration::from_secs(5));
        assert_eq!(s.lifecycle(), Lifecycle::Complete);
        let out = s.replay(Duration::from_secs(6));
        assert!(accepted(&out[0]));
        assert_eq!(s.lifecycle(), Lifecycle::Replaying);
    }
}
