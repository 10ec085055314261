#![forbid(unsafe_code)]

//! Deterministic scenario driver.
//!
//! A [`Scenario`] owns a [`DeterministicClock`], a [`DebateApp`] mounted on a
//! [`SimViewport`], and a [`RecordingBridge`]. Time only moves in
//! [`Scenario::step`], one frame at a time, and every step runs the same
//! sequence a browser would:
//!
//! 1. fire due timers (replay schedule, settle debounce);
//! 2. reconcile and render blocks, reporting resizes and measurements;
//! 3. deliver the queued scroll notification;
//! 4. run the animation frame callback.
//!
//! User actions ([`Scenario::manual_scroll`], [`Scenario::scroll_to_bottom`])
//! happen between steps and deliver their scroll notification synchronously.

use core::time::Duration;

use socratic_core::{
    Clock, DeterministicClock, Dialogue, FollowConfig, IntentSignal, NavKey, ScrollOwner,
    Viewport,
};
use socratic_runtime::{
    DebateApp, DialogueSource, DomainEvent, Lifecycle, RecordingBridge, SurfaceAttributes,
    SurfaceEvent, SurfaceInput,
};

use crate::fixtures;
use crate::sampler::FrameSample;
use crate::sim::{BlockProfile, SimViewport};

/// Default frame interval.
pub const FRAME: Duration = Duration::from_millis(16);

/// Upper bound used by [`Scenario::settle`].
pub const SETTLE_LIMIT: Duration = Duration::from_secs(30);

/// A headless, deterministic debate page.
#[derive(Debug)]
pub struct Scenario {
    clock: DeterministicClock,
    app: DebateApp<SimViewport>,
    bridge: RecordingBridge,
    frame: Duration,
    events: Vec<SurfaceEvent>,
}

impl Scenario {
    /// Default configuration on a 600 px viewport.
    #[must_use]
    pub fn new() -> Self {
        Self::with_viewport(FollowConfig::default(), SimViewport::default())
    }

    /// Custom configuration on a 600 px viewport.
    #[must_use]
    pub fn with_config(config: FollowConfig) -> Self {
        Self::with_viewport(config, SimViewport::default())
    }

    /// Custom configuration and viewport.
    #[must_use]
    pub fn with_viewport(config: FollowConfig, viewport: SimViewport) -> Self {
        let clock = DeterministicClock::new();
        let bridge = RecordingBridge::new();
        let mut app = DebateApp::new(config, Some(bridge.shared()));
        let events = app.mount(viewport, clock.now_mono());
        Self {
            clock,
            app,
            bridge,
            frame: FRAME,
            events,
        }
    }

    /// Change the frame interval.
    #[must_use]
    pub fn with_frame(mut self, frame: Duration) -> Self {
        self.frame = frame.max(Duration::from_millis(1));
        self
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now_mono()
    }

    #[must_use]
    pub fn app(&self) -> &DebateApp<SimViewport> {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut DebateApp<SimViewport> {
        &mut self.app
    }

    #[must_use]
    pub fn bridge(&self) -> &RecordingBridge {
        &self.bridge
    }

    /// Mounted viewport.
    #[must_use]
    pub fn viewport(&self) -> Option<&SimViewport> {
        self.app.surface().viewport()
    }

    #[must_use]
    pub fn owner(&self) -> ScrollOwner {
        self.app.surface().owner()
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.app.lifecycle()
    }

    #[must_use]
    pub fn is_restoring(&self) -> bool {
        self.app.surface().is_restoring()
    }

    #[must_use]
    pub fn scroll_top(&self) -> f64 {
        self.viewport().map_or(0.0, |v| v.metrics().scroll_top)
    }

    /// Whether the viewport is within `tolerance` px of the bottom.
    #[must_use]
    pub fn is_at_bottom(&self, tolerance: f64) -> bool {
        self.viewport()
            .is_some_and(|v| v.metrics().is_at_bottom(tolerance))
    }

    #[must_use]
    pub fn attributes(&self) -> SurfaceAttributes {
        self.app.attributes()
    }

    /// Surface events produced since the last call.
    pub fn take_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current observable state.
    #[must_use]
    pub fn sample(&self) -> FrameSample {
        let metrics = self.viewport().map(Viewport::metrics);
        let settle = self.app.surface().settle_state();
        FrameSample {
            t_ms: self.now().as_millis() as u64,
            scroll_top: metrics.map_or(0.0, |m| m.scroll_top),
            scroll_height: metrics.map_or(0.0, |m| m.scroll_height),
            client_height: metrics.map_or(0.0, |m| m.client_height),
            owner: self.owner(),
            restoring: self.is_restoring(),
            layout_ready: settle.ready,
            settle_version: settle.version,
            intensity: self.app.surface().intensity(),
        }
    }

    /// Nothing scheduled, rendering, animating, queued, or in grace.
    #[must_use]
    pub fn is_quiescent(&self) -> bool {
        let viewport_idle = self
            .viewport()
            .is_none_or(|v| !v.has_pending_passes() && !v.has_pending_scroll());
        viewport_idle && self.app.is_quiescent(self.now())
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Advance one frame.
    pub fn step(&mut self) {
        self.clock.advance(self.frame);
        let now = self.now();
        let polled = self.app.poll(now);
        self.events.extend(polled);
        self.flush_layout(now);
        self.flush_scroll(now);
        let framed = self.app.dispatch(SurfaceInput::Frame, now);
        self.events.extend(framed);
    }

    /// Step until at least `ms` have elapsed.
    pub fn run_for(&mut self, ms: u64) {
        let until = self.now().saturating_add(Duration::from_millis(ms));
        while self.now() < until {
            self.step();
        }
    }

    /// Step until `done` holds, for at most `limit`. Returns whether it held.
    pub fn run_until(&mut self, limit: Duration, mut done: impl FnMut(&Self) -> bool) -> bool {
        let until = self.now().saturating_add(limit);
        loop {
            if done(self) {
                return true;
            }
            if self.now() >= until {
                return false;
            }
            self.step();
        }
    }

    /// Step until quiescent (bounded by [`SETTLE_LIMIT`]).
    pub fn settle(&mut self) -> bool {
        let settled = self.run_until(SETTLE_LIMIT, Self::is_quiescent);
        if !settled {
            tracing::warn!(
                target: "socratic.harness",
                t_ms = self.now().as_millis() as u64,
                restoring = self.is_restoring(),
                deadline_ms = self.app.next_deadline().map(|d| d.as_millis() as u64),
                "scenario did not settle"
            );
        }
        settled
    }

    /// Step `frames` times, sampling after each step.
    pub fn sample_frames(&mut self, frames: usize) -> Vec<FrameSample> {
        let mut samples = Vec::with_capacity(frames);
        for _ in 0..frames {
            self.step();
            samples.push(self.sample());
        }
        samples
    }

    // -----------------------------------------------------------------------
    // Content
    // -----------------------------------------------------------------------

    /// Inject a transcript event through the automation entry point.
    pub fn emit(&mut self, event: DomainEvent) {
        let now = self.now();
        let events = self.app.emit(event, now);
        self.events.extend(events);
    }

    /// Append `count` tall fixture turns, continuing the speaker alternation.
    pub fn append_turns(&mut self, count: usize) {
        let start = self.app.surface().projection().len();
        for i in start..start + count {
            self.emit(DomainEvent::AppendTurn(fixtures::turn(i)));
        }
    }

    /// Generate a dialogue from `source`.
    pub fn generate<S: DialogueSource + ?Sized>(&mut self, source: &mut S, prompt: &str) -> bool {
        let now = self.now();
        self.app.generate(source, prompt, now)
    }

    /// Load an already validated dialogue.
    pub fn load(&mut self, dialogue: Dialogue) -> bool {
        let now = self.now();
        self.app.load(dialogue, now)
    }

    /// Start the replay.
    pub fn replay(&mut self) {
        let now = self.now();
        let events = self.app.replay(now);
        self.events.extend(events);
    }

    // -----------------------------------------------------------------------
    // User input
    // -----------------------------------------------------------------------

    /// Wheel gesture of `delta` px followed by the resulting scroll.
    pub fn manual_scroll(&mut self, delta: f64) {
        self.gesture(IntentSignal::Wheel { delta_y: delta });
        self.user_scroll(|v| v.user_scroll_by(delta));
    }

    /// Touch drag of `delta` px followed by the resulting scroll.
    pub fn touch_scroll(&mut self, delta: f64) {
        self.gesture(IntentSignal::Touch { delta_y: delta });
        self.user_scroll(|v| v.user_scroll_by(delta));
    }

    /// Navigation key press; scrolls by a page or to an end.
    pub fn press(&mut self, key: NavKey) {
        self.gesture(IntentSignal::Key(key));
        let page = self.viewport().map_or(0.0, |v| v.metrics().client_height * 0.9);
        self.user_scroll(|v| match key {
            NavKey::ArrowUp => v.user_scroll_by(-40.0),
            NavKey::ArrowDown => v.user_scroll_by(40.0),
            NavKey::PageUp => v.user_scroll_by(-page),
            NavKey::PageDown | NavKey::Space => v.user_scroll_by(page),
            NavKey::Home => v.user_scroll_to(0.0),
            NavKey::End => v.user_scroll_to(f64::MAX),
        });
    }

    /// Gesture without any resulting movement.
    pub fn gesture(&mut self, signal: IntentSignal) {
        let now = self.now();
        let events = self.app.dispatch(SurfaceInput::Intent(signal), now);
        self.events.extend(events);
    }

    /// Jump to the bottom without a gesture (scrollbar drag).
    pub fn scroll_to_bottom(&mut self) {
        self.user_scroll(|v| v.user_scroll_to(f64::MAX));
    }

    /// Jump to `top` without a gesture.
    pub fn scroll_to(&mut self, top: f64) {
        self.user_scroll(|v| v.user_scroll_to(top));
    }

    /// Resize the viewport.
    pub fn resize_viewport(&mut self, client_height: f64) {
        if let Some(viewport) = self.app.surface_mut().viewport_mut() {
            viewport.set_client_height(client_height);
        }
        let now = self.now();
        self.flush_layout(now);
        self.flush_scroll(now);
    }

    /// Re-run the ownership check.
    pub fn check_ownership(&mut self) -> Vec<SurfaceEvent> {
        let now = self.now();
        self.app.check_ownership(now)
    }

    /// Tear the viewport down.
    pub fn unmount(&mut self) -> Option<SimViewport> {
        let now = self.now();
        let (viewport, events) = self.app.unmount(now);
        self.events.extend(events);
        viewport
    }

    /// Mount a viewport.
    pub fn mount(&mut self, viewport: SimViewport) {
        let now = self.now();
        let events = self.app.mount(viewport, now);
        self.events.extend(events);
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    fn user_scroll(&mut self, apply: impl FnOnce(&mut SimViewport)) {
        if let Some(viewport) = self.app.surface_mut().viewport_mut() {
            apply(viewport);
        }
        let now = self.now();
        self.flush_scroll(now);
    }

    fn flush_layout(&mut self, now: Duration) {
        let profiles: Vec<_> = self
            .app
            .surface()
            .projection()
            .blocks()
            .iter()
            .map(|b| (b.id, BlockProfile::of(&b.turn)))
            .collect();
        let Some(viewport) = self.app.surface_mut().viewport_mut() else {
            return;
        };
        viewport.sync_blocks(&profiles, now);
        viewport.advance(now);
        let changes = viewport.take_layout_changes();

        if changes.viewport_resized {
            let events = self.app.dispatch(SurfaceInput::ViewportResized, now);
            self.events.extend(events);
        }
        if changes.content_resized {
            let events = self.app.dispatch(SurfaceInput::ContentResized, now);
            self.events.extend(events);
        }
        for (id, height) in changes.measured {
            let events = self.app.emit(DomainEvent::TurnRendered { id, height }, now);
            self.events.extend(events);
        }
    }

    fn flush_scroll(&mut self, now: Duration) {
        let pending = self
            .app
            .surface_mut()
            .viewport_mut()
            .is_some_and(SimViewport::take_scroll_event);
        if pending {
            let events = self.app.dispatch(SurfaceInput::Scroll, now);
            self.events.extend(events);
        }
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}
