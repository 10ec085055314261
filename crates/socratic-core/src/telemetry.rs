#![forbid(unsafe_code)]

//! Coordination counters and structured events.
//!
//! Counters are process-wide monotonic `AtomicU64`s so dashboards and tests
//! can read them without threading a registry through every component.
//! Events use dotted `socratic.*` targets; ownership transitions are `INFO`,
//! aborted restorations `WARN`, everything else `DEBUG`.

use core::time::Duration;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::bus::RestoreOutcome;
use crate::ownership::OwnershipTransition;

// ---------------------------------------------------------------------------
// Monotonic counters
// ---------------------------------------------------------------------------

static OWNERSHIP_TRANSITIONS_TOTAL: AtomicU64 = AtomicU64::new(0);
static SETTLE_CYCLES_TOTAL: AtomicU64 = AtomicU64::new(0);
static RESTORES_STARTED_TOTAL: AtomicU64 = AtomicU64::new(0);
static RESTORES_COMPLETED_TOTAL: AtomicU64 = AtomicU64::new(0);
static RESTORES_ABORTED_TOTAL: AtomicU64 = AtomicU64::new(0);
static RESTORES_CANCELLED_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Total ownership transitions applied.
#[must_use]
pub fn ownership_transitions_total() -> u64 {
    OWNERSHIP_TRANSITIONS_TOTAL.load(Ordering::Relaxed)
}

/// Total settle cycles completed.
#[must_use]
pub fn settle_cycles_total() -> u64 {
    SETTLE_CYCLES_TOTAL.load(Ordering::Relaxed)
}

/// Total restorations started.
#[must_use]
pub fn restores_started_total() -> u64 {
    RESTORES_STARTED_TOTAL.load(Ordering::Relaxed)
}

/// Total restorations that reached their target.
#[must_use]
pub fn restores_completed_total() -> u64 {
    RESTORES_COMPLETED_TOTAL.load(Ordering::Relaxed)
}

/// Total restorations aborted by ownership change or unmount.
#[must_use]
pub fn restores_aborted_total() -> u64 {
    RESTORES_ABORTED_TOTAL.load(Ordering::Relaxed)
}

/// Total restorations cancelled by a newer trigger or teardown.
#[must_use]
pub fn restores_cancelled_total() -> u64 {
    RESTORES_CANCELLED_TOTAL.load(Ordering::Relaxed)
}

/// Restorations that ended, by any outcome.
#[must_use]
pub fn restores_ended_total() -> u64 {
    restores_completed_total() + restores_aborted_total() + restores_cancelled_total()
}

// ---------------------------------------------------------------------------
// Recording
// ---------------------------------------------------------------------------

pub(crate) fn record_ownership_transition(transition: &OwnershipTransition) {
    OWNERSHIP_TRANSITIONS_TOTAL.fetch_add(1, Ordering::Relaxed);
    tracing::info!(
        target: "socratic.ownership",
        event = transition.event.as_str(),
        from = transition.from.as_str(),
        to = transition.to.as_str(),
        at_ms = transition.at.as_millis() as u64,
        "ownership transition"
    );
}

pub(crate) fn record_settle(version: u64, burst_len: u32) {
    SETTLE_CYCLES_TOTAL.fetch_add(1, Ordering::Relaxed);
    tracing::debug!(
        target: "socratic.settle",
        version,
        burst_len,
        "layout settled"
    );
}

pub(crate) fn record_restore_started(from: f64, target: f64, version: u64) {
    RESTORES_STARTED_TOTAL.fetch_add(1, Ordering::Relaxed);
    tracing::debug!(
        target: "socratic.autoscroll",
        from,
        target,
        version,
        "restore started"
    );
}

pub(crate) fn record_restore_ended(outcome: RestoreOutcome, elapsed: Duration) {
    let elapsed_ms = elapsed.as_millis() as u64;
    match outcome {
        RestoreOutcome::Completed => {
            RESTORES_COMPLETED_TOTAL.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                target: "socratic.autoscroll",
                outcome = outcome.as_str(),
                elapsed_ms,
                "restore ended"
            );
        }
        RestoreOutcome::Aborted => {
            RESTORES_ABORTED_TOTAL.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                target: "socratic.autoscroll",
                outcome = outcome.as_str(),
                elapsed_ms,
                "restore aborted"
            );
        }
        RestoreOutcome::Cancelled => {
            RESTORES_CANCELLED_TOTAL.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                target: "socratic.autoscroll",
                outcome = outcome.as_str(),
                elapsed_ms,
                "restore ended"
            );
        }
    }
}
