#![forbid(unsafe_code)]

//! The assembled debate application.
//!
//! [`DebateApp`] pairs a [`DebateSession`] (lifecycle region) with a
//! [`Surface`] (scroll region). The regions never share events; the app
//! only forwards due transcript events from the session into the surface
//! and reports both regions to the optional [`BridgeSink`].
//!
//! Machine log entries come in pairs: an [`LogPhase::Event`] entry naming
//! the input, then a [`LogPhase::Transition`] entry with the combined state
//! after it. Lifecycle events that the current state rejects are logged as
//! events only.

use core::time::Duration;

use serde_json::json;
use socratic_core::{Dialogue, DialogueError, FollowConfig, Viewport};

use crate::bridge::{LogPhase, MachineLogEvent, SharedBridge, SurfaceAttributes, test_id};
use crate::lifecycle::Lifecycle;
use crate::projection::DomainEvent;
use crate::session::{DebateSession, SessionEvent};
use crate::source::{DialogueSource, generate_dialogue};
use crate::surface::{Surface, SurfaceEvent, SurfaceInput};

/// Session + surface + bridge.
pub struct DebateApp<V: Viewport> {
    session: DebateSession,
    surface: Surface<V>,
    bridge: Option<SharedBridge>,
}

impl<V: Viewport> std::fmt::Debug for DebateApp<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebateApp")
            .field("session", &self.session)
            .field("surface", &self.surface)
            .field("bridge", &self.bridge.is_some())
            .finish()
    }
}

impl<V: Viewport> DebateApp<V> {
    /// Build an app. Pass `None` for `bridge` outside of tests.
    #[must_use]
    pub fn new(config: FollowConfig, bridge: Option<SharedBridge>) -> Self {
        Self {
            session: DebateSession::new(config.replay.clone()),
            surface: Surface::new(config),
            bridge,
        }
    }

    #[must_use]
    pub fn session(&self) -> &DebateSession {
        &self.session
    }

    #[must_use]
    pub fn surface(&self) -> &Surface<V> {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface<V> {
        &mut self.surface
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.session.lifecycle()
    }

    // -----------------------------------------------------------------------
    // Mounting
    // -----------------------------------------------------------------------

    pub fn mount(&mut self, viewport: V, now: Duration) -> Vec<SurfaceEvent> {
        let events = self.surface.mount(viewport, now);
        self.log_surface(&events, now);
        events
    }

    /// Detach the viewport and stop any replay in flight. An interrupted
    /// replay leaves the lifecycle in `Error`.
    pub fn unmount(&mut self, now: Duration) -> (Option<V>, Vec<SurfaceEvent>) {
        if let Some(event) = self.session.cancel_replay() {
            self.route_session(vec![event], now);
        }
        let (viewport, events) = self.surface.unmount(now);
        self.log_surface(&events, now);
        (viewport, events)
    }

    // -----------------------------------------------------------------------
    // Lifecycle region
    // -----------------------------------------------------------------------

    /// Ask `source` for a dialogue. Failures are recorded on the session.
    /// Returns whether a new dialogue was loaded.
    pub fn generate<S: DialogueSource + ?Sized>(
        &mut self,
        source: &mut S,
        prompt: &str,
        now: Duration,
    ) -> bool {
        self.session.begin_generation();
        let limits = self.surface.config().schema.clone();
        let result = generate_dialogue(source, prompt, &limits);
        self.finish_generation(result, now)
    }

    /// Load an already validated dialogue.
    pub fn load(&mut self, dialogue: Dialogue, now: Duration) -> bool {
        self.finish_generation(Ok(dialogue), now)
    }

    fn finish_generation(&mut self, result: Result<Dialogue, DialogueError>, now: Duration) -> bool {
        let event = self.session.finish_generation(result);
        let loaded = matches!(event, SessionEvent::Lifecycle { change: Some(_), .. });
        self.route_session(vec![event], now);
        loaded
    }

    /// Start the replay; events already due are applied immediately.
    pub fn replay(&mut self, now: Duration) -> Vec<SurfaceEvent> {
        let events = self.session.replay(now);
        self.route_session(events, now)
    }

    /// Abort the replay with a message.
    pub fn fail(&mut self, message: &str, now: Duration) {
        let event = self.session.fail(message);
        self.route_session(vec![event], now);
    }

    // -----------------------------------------------------------------------
    // Scroll region
    // -----------------------------------------------------------------------

    /// Inject a transcript event directly (automation entry point).
    pub fn emit(&mut self, event: DomainEvent, now: Duration) -> Vec<SurfaceEvent> {
        self.dispatch(SurfaceInput::Domain(event), now)
    }

    /// Forward a host input to the surface.
    pub fn dispatch(&mut self, input: SurfaceInput, now: Duration) -> Vec<SurfaceEvent> {
        let events = self.surface.dispatch(input, now);
        self.log_surface(&events, now);
        events
    }

    /// Fire due replay and settle timers.
    pub fn poll(&mut self, now: Duration) -> Vec<SurfaceEvent> {
        let session_events = self.session.poll(now);
        let mut events = self.route_session(session_events, now);
        let polled = self.surface.poll(now);
        self.log_surface(&polled, now);
        events.extend(polled);
        events
    }

    /// Re-run the ownership check.
    pub fn check_ownership(&mut self, now: Duration) -> Vec<SurfaceEvent> {
        let events = self.surface.check_ownership(now);
        self.log_surface(&events, now);
        events
    }

    /// Earliest timer across both regions.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.session.next_deadline(), self.surface.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Whether the host should deliver another animation frame.
    #[must_use]
    pub fn needs_frame(&self, now: Duration) -> bool {
        self.surface.needs_frame(now)
    }

    /// Surface quiescent and no replay scheduled.
    #[must_use]
    pub fn is_quiescent(&self, now: Duration) -> bool {
        !self.session.is_replaying() && self.surface.is_quiescent(now)
    }

    /// Surface attributes plus `data-lifecycle`.
    #[must_use]
    pub fn attributes(&self) -> SurfaceAttributes {
        let mut attrs = self.surface.attributes();
        attrs.set(
            test_id::SCROLL_VIEWPORT,
            "data-lifecycle",
            self.session.lifecycle().as_str(),
        );
        attrs
    }

    // -----------------------------------------------------------------------
    // Routing and logging
    // -----------------------------------------------------------------------

    fn route_session(&mut self, events: Vec<SessionEvent>, now: Duration) -> Vec<SurfaceEvent> {
        let mut out = Vec::new();
        for event in events {
            match event {
                SessionEvent::Domain(domain) => out.extend(self.dispatch(SurfaceInput::Domain(domain), now)),
                SessionEvent::Lifecycle { event, change } => {
                    self.log(now, LogPhase::Event, Some(event.as_str()));
                    if change.is_some() {
                        self.log(now, LogPhase::Transition, None);
                    }
                }
            }
        }
        out
    }

    fn log_surface(&self, events: &[SurfaceEvent], now: Duration) {
        for event in events {
            if let SurfaceEvent::Ownership(transition) = event {
                self.log(now, LogPhase::Event, Some(transition.event.as_str()));
                self.log(now, LogPhase::Transition, None);
            }
        }
    }

    fn log(&self, now: Duration, phase: LogPhase, event: Option<&str>) {
        let Some(bridge) = &self.bridge else {
            return;
        };
        bridge.on_machine_event(MachineLogEvent {
            t_ms: now.as_millis() as u64,
            phase,
            event: event.map(str::to_owned),
            value: json!({
                "lifecycle": self.session.lifecycle().as_str(),
                "scroll": self.surface.owner().as_str(),
            }),
            context: json!({
                "error": self.session.last_error(),
                "turns": self.surface.projection().len(),
            }),
        });
    }
}
