#![forbid(unsafe_code)]

//! Domain events → ordered renderable blocks.
//!
//! The projection is the only place blocks are created. Each appended turn
//! receives a fresh [`BlockId`] from a process-wide counter, so identities are
//! never reused, not even across replays.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use socratic_core::Turn;

static NEXT_BLOCK_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique block identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BlockId(u64);

impl BlockId {
    fn next() -> Self {
        Self(NEXT_BLOCK_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for BlockId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A turn placed in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutBlock {
    pub id: BlockId,
    pub turn: Turn,
    /// Latest measured height; `None` until the first measurement.
    pub height: Option<f64>,
}

/// Events that drive the transcript.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    /// Clear the transcript.
    ReplayStart,
    /// Append a block for the turn.
    AppendTurn(Turn),
    /// A block was measured (may repeat as rendering progresses).
    TurnRendered { id: BlockId, height: f64 },
    /// The replay finished.
    ReplayComplete,
}

impl DomainEvent {
    /// Wire name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ReplayStart => "REPLAY_START",
            Self::AppendTurn(_) => "APPEND_TURN",
            Self::TurnRendered { .. } => "TURN_RENDERED",
            Self::ReplayComplete => "REPLAY_COMPLETE",
        }
    }
}

/// Ordered block list with a structural revision counter.
#[derive(Debug, Clone, Default)]
pub struct DialogueProjection {
    blocks: Vec<LayoutBlock>,
    revision: u64,
}

impl DialogueProjection {
    /// Empty projection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an event. Returns `true` when the block list identity or length
    /// changed (and `revision` was bumped).
    pub fn apply(&mut self, event: &DomainEvent) -> bool {
        match event {
            DomainEvent::ReplayStart => {
                if self.blocks.is_empty() {
                    return false;
                }
                self.blocks.clear();
            }
            DomainEvent::AppendTurn(turn) => {
                self.blocks.push(LayoutBlock {
                    id: BlockId::next(),
                    turn: turn.clone(),
                    height: None,
                });
            }
            DomainEvent::TurnRendered { id, height } => {
                if let Some(block) = self.blocks.iter_mut().find(|b| b.id == *id) {
                    block.height = Some(*height);
                }
                return false;
            }
            DomainEvent::ReplayComplete => return false,
        }
        self.revision += 1;
        true
    }

    /// Blocks in transcript order.
    #[must_use]
    pub fn blocks(&self) -> &[LayoutBlock] {
        &self.blocks
    }

    /// Structural revision.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the transcript is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Newest block.
    #[must_use]
    pub fn last(&self) -> Option<&LayoutBlock> {
        self.blocks.last()
    }
}
