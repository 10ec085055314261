#![forbid(unsafe_code)]

//! Restore-event channel.
//!
//! # Design
//!
//! The actuator is the single writer of the `restoring` flag. Instead of
//! sharing the flag through a mutable global, every change is published as a
//! tagged [`RestoreEvent`] on an [`EventBus`]. Consumers subscribe with a
//! callback and receive events in publication order.
//!
//! [`EventBus<E>`] keeps callbacks as `Weak` references; dropping the
//! returned [`Subscription`] guard unsubscribes. Dead entries are pruned
//! lazily on the next publish.
//!
//! # Failure Modes
//!
//! - **Re-entrant publish**: publishing from inside a callback is allowed
//!   (no borrow is held while callbacks run); the nested event is delivered
//!   depth-first, before the outer event reaches later subscribers.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

// ---------------------------------------------------------------------------
// Restore events
// ---------------------------------------------------------------------------

/// How a restoration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestoreOutcome {
    /// Scroll top reached the target.
    Completed,
    /// The viewport vanished or ownership changed mid-flight.
    Aborted,
    /// Superseded by a newer trigger, or torn down.
    Cancelled,
}

impl RestoreOutcome {
    /// Label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Aborted => "aborted",
            Self::Cancelled => "cancelled",
        }
    }
}

/// A change of the `restoring` flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RestoreEvent {
    /// `restoring` became true; the viewport is moving toward `target`.
    Started { target: f64 },
    /// `restoring` became false.
    Ended { outcome: RestoreOutcome },
}

impl RestoreEvent {
    /// Value of the `restoring` flag after this event.
    #[must_use]
    pub const fn restoring(&self) -> bool {
        matches!(self, Self::Started { .. })
    }
}

// ---------------------------------------------------------------------------
// Bus
// ---------------------------------------------------------------------------

type CallbackRc<E> = Rc<dyn Fn(&E)>;
type CallbackWeak<E> = Weak<dyn Fn(&E)>;

struct BusInner<E> {
    sequence: u64,
    subscribers: Vec<CallbackWeak<E>>,
}

/// Single-threaded publish/subscribe channel.
///
/// Cloning an `EventBus` creates a new handle to the same channel.
///
/// # Invariants
///
/// 1. `sequence` increments by exactly 1 per published event.
/// 2. Subscribers are called in registration order.
pub struct EventBus<E> {
    inner: Rc<RefCell<BusInner<E>>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("EventBus")
            .field("sequence", &inner.sequence)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<E: 'static> EventBus<E> {
    /// Create a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(BusInner {
                sequence: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Register a callback. Keep the guard alive for as long as events
    /// should be delivered.
    pub fn subscribe(&self, callback: impl Fn(&E) + 'static) -> Subscription {
        let strong: CallbackRc<E> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Deliver `event` to every live subscriber.
    pub fn publish(&self, event: &E) {
        let callbacks: Vec<CallbackRc<E>> = {
            let mut inner = self.inner.borrow_mut();
            inner.sequence += 1;
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner.subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for cb in &callbacks {
            cb(event);
        }
    }

    /// Number of events published so far.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.inner.borrow().sequence
    }

    /// Registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

impl<E: 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for a bus callback.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
