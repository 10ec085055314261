#![forbid(unsafe_code)]

//! The scroll surface coordinator.
//!
//! # Design
//!
//! [`Surface`] owns every component of the follow pipeline and routes host
//! inputs between them:
//!
//! ```text
//!  DomainEvent ─▶ projection ─revision─▶ settle ─version─▶ actuator ─┐
//!                                                                    │ RestoreEvent
//!  Scroll ──fresh metrics──▶ arbiter ◀───────────────────────────────┤
//!     └──────────────────▶ anchor ─▶ gradient ◀──────────────────────┘
//! ```
//!
//! The host calls [`Surface::dispatch`] for inputs, [`Surface::poll`] when
//! [`Surface::next_deadline`] passes, and [`Surface::dispatch`] with
//! [`SurfaceInput::Frame`] once per animation frame while
//! [`Surface::needs_frame`] holds. Each call returns the
//! [`SurfaceEvent`]s it produced, in order.
//!
//! # Invariants
//!
//! 1. Geometry is read from the viewport on every scroll input; nothing is
//!    cached between inputs.
//! 2. Restore events reach the arbiter and the gradient before they are
//!    published on the bus.
//! 3. After [`Surface::unmount`] nothing is pending and `restoring` is false.

use core::time::Duration;

use socratic_core::{
    AnchorProbe, AutoScrollActuator, EventBus, FollowConfig, GradientProjector, IntentSignal,
    LayoutStabilityDetector, OwnershipArbiter, OwnershipTransition, RestoreEvent, ScrollOwner,
    SettleSignal, SettleState, Viewport,
};

use crate::bridge::{ElementAttributes, SurfaceAttributes, test_id};
use crate::projection::{DialogueProjection, DomainEvent};

/// Host inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceInput {
    /// Transcript event.
    Domain(DomainEvent),
    /// The content's rendered size changed.
    ContentResized,
    /// The scroll container fired a scroll notification.
    Scroll,
    /// A physical gesture (wheel, touch, key) targeted the viewport.
    Intent(IntentSignal),
    /// The viewport itself changed size.
    ViewportResized,
    /// Animation frame callback.
    Frame,
}

impl SurfaceInput {
    /// Short label for spans.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Domain(event) => event.name(),
            Self::ContentResized => "content_resized",
            Self::Scroll => "scroll",
            Self::Intent(_) => "intent",
            Self::ViewportResized => "viewport_resized",
            Self::Frame => "frame",
        }
    }
}

/// Outputs produced while handling an input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent {
    Ownership(OwnershipTransition),
    Settled(SettleSignal),
    Restore(RestoreEvent),
}

/// Coordinates projection, settle detection, ownership, actuation and the
/// gradient around one host viewport.
pub struct Surface<V: Viewport> {
    config: FollowConfig,
    viewport: Option<V>,
    projection: DialogueProjection,
    settle: LayoutStabilityDetector,
    arbiter: OwnershipArbiter,
    actuator: AutoScrollActuator,
    anchor: AnchorProbe,
    gradient: GradientProjector,
    restore_bus: EventBus<RestoreEvent>,
}

impl<V: Viewport> std::fmt::Debug for Surface<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("mounted", &self.viewport.is_some())
            .field("owner", &self.arbiter.owner())
            .field("restoring", &self.actuator.is_restoring())
            .field("settle", &self.settle.state())
            .field("blocks", &self.projection.len())
            .field("intensity", &self.gradient.intensity())
            .finish()
    }
}

impl<V: Viewport> Surface<V> {
    /// Create an unmounted surface.
    #[must_use]
    pub fn new(config: FollowConfig) -> Self {
        Self {
            settle: LayoutStabilityDetector::new(config.settle.clone()),
            arbiter: OwnershipArbiter::new(config.ownership.clone()),
            actuator: AutoScrollActuator::new(config.autoscroll.clone()),
            gradient: GradientProjector::new(config.gradient.clone()),
            anchor: AnchorProbe::new(),
            projection: DialogueProjection::new(),
            restore_bus: EventBus::new(),
            viewport: None,
            config,
        }
    }

    // -----------------------------------------------------------------------
    // Mounting
    // -----------------------------------------------------------------------

    /// Attach the host viewport. Any previously mounted viewport is dropped
    /// after an unmount.
    pub fn mount(&mut self, viewport: V, now: Duration) -> Vec<SurfaceEvent> {
        let mut events = Vec::new();
        if self.viewport.is_some() {
            events.extend(self.unmount(now).1);
        }
        self.arbiter.attach(viewport.metrics());
        self.viewport = Some(viewport);
        self.settle.observe_blocks(self.projection.revision(), now);
        self.settle.set_mounted(true, now);
        tracing::debug!(target: "socratic.surface", "viewport mounted");
        events
    }

    /// Detach the viewport, cancelling every pending timer and animation.
    pub fn unmount(&mut self, now: Duration) -> (Option<V>, Vec<SurfaceEvent>) {
        let mut events = Vec::new();
        if let Some(event) = self.actuator.cancel(now) {
            self.route_restore(event, now, &mut events);
        }
        self.settle.set_mounted(false, now);
        self.settle.cancel();
        self.arbiter.detach();
        self.anchor.clear();
        let viewport = self.viewport.take();
        if viewport.is_some() {
            tracing::debug!(target: "socratic.surface", "viewport unmounted");
        }
        (viewport, events)
    }

    // -----------------------------------------------------------------------
    // Inputs
    // -----------------------------------------------------------------------

    /// Handle one host input.
    pub fn dispatch(&mut self, input: SurfaceInput, now: Duration) -> Vec<SurfaceEvent> {
        let _span = tracing::debug_span!("surface.dispatch", input = input.name()).entered();
        let mut events = Vec::new();
        match input {
            SurfaceInput::Domain(event) => {
                if self.projection.apply(&event) {
                    self.settle.observe_blocks(self.projection.revision(), now);
                }
            }
            SurfaceInput::ContentResized => self.settle.on_content_resized(now),
            SurfaceInput::Scroll => {
                let metrics = self.viewport.as_ref().map(Viewport::metrics);
                let restoring = self.actuator.is_restoring();
                if let Some(transition) = self.arbiter.check(metrics, restoring, now) {
                    self.route_transition(transition, now, &mut events);
                }
                self.remeasure_anchor();
            }
            SurfaceInput::Intent(signal) => {
                let restoring = self.actuator.is_restoring();
                if let Some(transition) = self.arbiter.record_intent(&signal, restoring, now) {
                    self.route_transition(transition, now, &mut events);
                }
            }
            SurfaceInput::ViewportResized => self.remeasure_anchor(),
            SurfaceInput::Frame => {
                let owner = self.arbiter.owner();
                if let Some(event) = self.actuator.on_frame(owner, self.viewport.as_mut(), now) {
                    self.route_restore(event, now, &mut events);
                }
                self.gradient.advance(now);
            }
        }
        events
    }

    /// Fire due timers.
    pub fn poll(&mut self, now: Duration) -> Vec<SurfaceEvent> {
        let mut events = Vec::new();
        let Some(signal) = self.settle.poll(now) else {
            return events;
        };
        events.push(SurfaceEvent::Settled(signal));
        self.remeasure_anchor();
        let owner = self.arbiter.owner();
        for event in self
            .actuator
            .on_settle(signal.version, owner, self.viewport.as_mut(), now)
        {
            self.route_restore(event, now, &mut events);
        }
        events
    }

    /// Re-run the ownership check against the current geometry without a
    /// scroll notification. Idempotent.
    pub fn check_ownership(&mut self, now: Duration) -> Vec<SurfaceEvent> {
        let mut events = Vec::new();
        let metrics = self.viewport.as_ref().map(Viewport::metrics);
        if let Some(transition) = self
            .arbiter
            .check(metrics, self.actuator.is_restoring(), now)
        {
            self.route_transition(transition, now, &mut events);
        }
        events
    }

    // -----------------------------------------------------------------------
    // Scheduling
    // -----------------------------------------------------------------------

    /// Earliest pending timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.settle.next_deadline()
    }

    /// Whether the host should keep delivering frame callbacks: an
    /// animation is queued or running, or the gradient has not reached its
    /// target (including a pending handover grace window).
    #[must_use]
    pub fn needs_frame(&self, now: Duration) -> bool {
        !self.actuator.is_idle() || !self.gradient.is_at_rest(now)
    }

    /// Nothing pending, animating, fading, or inside a grace window.
    #[must_use]
    pub fn is_quiescent(&self, now: Duration) -> bool {
        self.next_deadline().is_none() && !self.needs_frame(now) && !self.arbiter.in_grace(now)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Current scroll owner.
    #[must_use]
    pub fn owner(&self) -> ScrollOwner {
        self.arbiter.owner()
    }

    /// Whether the actuator is moving the viewport.
    #[must_use]
    pub fn is_restoring(&self) -> bool {
        self.actuator.is_restoring()
    }

    /// Settle readiness and version.
    #[must_use]
    pub fn settle_state(&self) -> SettleState {
        self.settle.state()
    }

    /// Smoothed gradient intensity.
    #[must_use]
    pub fn intensity(&self) -> f64 {
        self.gradient.intensity()
    }

    /// Gradient projector (diagnostics).
    #[must_use]
    pub fn gradient(&self) -> &GradientProjector {
        &self.gradient
    }

    /// Latest anchor measurement.
    #[must_use]
    pub fn anchor(&self) -> Option<socratic_core::AnchorMetrics> {
        self.anchor.latest()
    }

    /// Transcript blocks.
    #[must_use]
    pub fn projection(&self) -> &DialogueProjection {
        &self.projection
    }

    /// Mounted viewport.
    #[must_use]
    pub fn viewport(&self) -> Option<&V> {
        self.viewport.as_ref()
    }

    /// Mounted viewport, mutably (host-side updates such as layout passes).
    pub fn viewport_mut(&mut self) -> Option<&mut V> {
        self.viewport.as_mut()
    }

    /// Channel carrying every restore event.
    #[must_use]
    pub fn restore_bus(&self) -> &EventBus<RestoreEvent> {
        &self.restore_bus
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &FollowConfig {
        &self.config
    }

    /// Snapshot of the test-visible attributes.
    #[must_use]
    pub fn attributes(&self) -> SurfaceAttributes {
        let settle = self.settle.state();
        let mut elements = Vec::with_capacity(self.projection.len() + 4);
        elements.push(
            ElementAttributes::new(test_id::BACKGROUND_GRADIENT)
                .with("data-intensity", format!("{:.3}", self.gradient.intensity())),
        );
        elements.push(
            ElementAttributes::new(test_id::SCROLL_VIEWPORT)
                .with("data-scroll-owner", self.arbiter.owner())
                .with("data-restoring", self.actuator.is_restoring())
                .with("data-layout-ready", settle.ready)
                .with("data-settle-version", settle.version),
        );
        for block in self.projection.blocks() {
            let mut bubble = ElementAttributes::new(test_id::TURN_BUBBLE)
                .with("data-block-id", block.id)
                .with("data-speaker", block.turn.speaker.as_str());
            if let Some(height) = block.height {
                bubble = bubble.with("data-height", height);
            }
            elements.push(bubble);
        }
        let mut anchor = ElementAttributes::new(test_id::OBSERVER_ANCHOR);
        if let Some(measured) = self.anchor.latest() {
            anchor = anchor.with("data-mid-y", format!("{:.1}", measured.mid_y_in_viewport));
        }
        elements.push(anchor);
        elements.push(ElementAttributes::new(test_id::BOTTOM_SPACER));
        SurfaceAttributes { elements }
    }

    // -----------------------------------------------------------------------
    // Routing
    // -----------------------------------------------------------------------

    fn route_transition(
        &mut self,
        transition: OwnershipTransition,
        now: Duration,
        events: &mut Vec<SurfaceEvent>,
    ) {
        self.gradient.set_owner(transition.to, now);
        events.push(SurfaceEvent::Ownership(transition));
    }

    fn route_restore(&mut self, event: RestoreEvent, now: Duration, events: &mut Vec<SurfaceEvent>) {
        match event {
            RestoreEvent::Started { .. } => self.gradient.set_restoring(true),
            RestoreEvent::Ended { .. } => {
                self.arbiter.on_restore_ended(now);
                self.gradient.set_restoring(false);
            }
        }
        self.restore_bus.publish(&event);
        events.push(SurfaceEvent::Restore(event));
    }

    fn remeasure_anchor(&mut self) {
        if let Some(measured) = self
            .anchor
            .measure(self.settle.is_ready(), self.viewport.as_ref())
        {
            self.gradient.observe(measured);
        }
    }
}
