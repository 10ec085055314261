#![forbid(unsafe_code)]

//! Automation bridge and attribute snapshot.
//!
//! # Design
//!
//! End-to-end tests need two things from a running surface: a log of every
//! state-machine event and transition, and the attributes a DOM-based test
//! would read (`data-scroll-owner`, `data-intensity`, ...). Both are exposed
//! without global state:
//!
//! - a [`BridgeSink`] is injected at construction (production passes none);
//! - [`SurfaceAttributes`] is a synchronous snapshot built on demand.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;

/// Stable test identifiers.
pub mod test_id {
    pub const SCROLL_VIEWPORT: &str = "scroll-viewport";
    pub const TURN_BUBBLE: &str = "turn-bubble";
    pub const OBSERVER_ANCHOR: &str = "observer-anchor";
    pub const BOTTOM_SPACER: &str = "bottom-spacer";
    pub const BACKGROUND_GRADIENT: &str = "background-gradient";
}

// ---------------------------------------------------------------------------
// Machine log
// ---------------------------------------------------------------------------

/// Whether a log entry records an input event or the resulting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogPhase {
    Event,
    Transition,
}

/// One machine log entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineLogEvent {
    /// Host clock in milliseconds.
    pub t_ms: u64,
    pub phase: LogPhase,
    /// Event name for [`LogPhase::Event`] entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// Combined state value, e.g. `{"lifecycle":"ready","scroll":"userOwned"}`.
    pub value: serde_json::Value,
    /// Extended state (error message, transcript length).
    pub context: serde_json::Value,
}

/// Receiver for machine log entries.
pub trait BridgeSink {
    fn on_machine_event(&self, event: MachineLogEvent);
}

/// Shared handle to an injected sink.
pub type SharedBridge = Rc<dyn BridgeSink>;

/// In-memory sink for tests and the simulator.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingBridge {
    events: Rc<RefCell<Vec<MachineLogEvent>>>,
}

impl RecordingBridge {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle suitable for injection.
    #[must_use]
    pub fn shared(&self) -> SharedBridge {
        Rc::new(self.clone())
    }

    /// Copy of every recorded entry.
    #[must_use]
    pub fn machine_events(&self) -> Vec<MachineLogEvent> {
        self.events.borrow().clone()
    }

    /// Names of recorded [`LogPhase::Event`] entries, in order.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| e.event.clone())
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear_machine_events(&self) {
        self.events.borrow_mut().clear();
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl BridgeSink for RecordingBridge {
    fn on_machine_event(&self, event: MachineLogEvent) {
        self.events.borrow_mut().push(event);
    }
}

// ---------------------------------------------------------------------------
// Attribute snapshot
// ---------------------------------------------------------------------------

/// Attributes of one element, keyed by attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementAttributes {
    pub test_id: &'static str,
    pub attrs: BTreeMap<&'static str, String>,
}

impl ElementAttributes {
    /// Element without attributes.
    #[must_use]
    pub fn new(test_id: &'static str) -> Self {
        Self {
            test_id,
            attrs: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with(mut self, name: &'static str, value: impl ToString) -> Self {
        self.attrs.insert(name, value.to_string());
        self
    }

    /// Attribute value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// Snapshot of every test-visible element, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SurfaceAttributes {
    pub elements: Vec<ElementAttributes>,
}

impl SurfaceAttributes {
    /// First element with `test_id`.
    #[must_use]
    pub fn element(&self, test_id: &str) -> Option<&ElementAttributes> {
        self.elements.iter().find(|e| e.test_id == test_id)
    }

    /// Attribute of the first element with `test_id`.
    #[must_use]
    pub fn get(&self, test_id: &str, attr: &str) -> Option<&str> {
        self.element(test_id).and_then(|e| e.get(attr))
    }

    /// Every element with `test_id`.
    pub fn all<'a>(&'a self, test_id: &'a str) -> impl Iterator<Item = &'a ElementAttributes> {
        self.elements.iter().filter(move |e| e.test_id == test_id)
    }

    /// Number of elements with `test_id`.
    #[must_use]
    pub fn count(&self, test_id: &str) -> usize {
        self.all(test_id).count()
    }

    /// Set an attribute on the first element with `test_id`.
    pub fn set(&mut self, test_id: &str, name: &'static str, value: impl ToString) {
        if let Some(element) = self.elements.iter_mut().find(|e| e.test_id == test_id) {
            element.attrs.insert(name, value.to_string());
        }
    }
}
