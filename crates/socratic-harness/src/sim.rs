#![forbid(unsafe_code)]

//! Simulated scroll container with asynchronous multi-pass rendering.
//!
//! The simulator reproduces the layout behaviour that makes auto-follow hard
//! in a real page:
//!
//! | Pass | When | Height |
//! |------|------|--------|
//! | placeholder | on insertion | one line + padding |
//! | markdown | `markdown_delay_ms` after insertion | wrapped text + padding (+ code block extra) |
//! | diagram | `diagram_delay_ms` after insertion | + `diagram_extra_px` |
//!
//! Scroll notifications are queued, not delivered: a programmatic
//! `scroll_top` change or a clamp caused by shrinking content sets a pending
//! flag that the driver turns into a [`SurfaceInput::Scroll`] on its next
//! step, like a browser dispatching `scroll` after layout.
//!
//! [`SurfaceInput::Scroll`]: socratic_runtime::SurfaceInput::Scroll

use core::time::Duration;

use serde::{Deserialize, Serialize};
use socratic_core::{ScrollMetrics, Turn, Viewport};
use socratic_runtime::BlockId;

/// Layout constants of the simulated renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderModel {
    /// Characters per wrapped line.
    pub chars_per_line: usize,
    /// Line height in px.
    pub line_height_px: f64,
    /// Vertical padding of a bubble in px.
    pub bubble_padding_px: f64,
    /// Gap between bubbles in px.
    pub gap_px: f64,
    /// Delay of the markdown pass in ms.
    pub markdown_delay_ms: u64,
    /// Delay of the diagram pass in ms.
    pub diagram_delay_ms: u64,
    /// Height a rendered diagram adds in px.
    pub diagram_extra_px: f64,
    /// Height a highlighted code block adds in px.
    pub code_extra_px: f64,
}

impl Default for RenderModel {
    fn default() -> Self {
        Self {
            chars_per_line: 80,
            line_height_px: 20.0,
            bubble_padding_px: 24.0,
            gap_px: 16.0,
            markdown_delay_ms: 30,
            diagram_delay_ms: 120,
            diagram_extra_px: 240.0,
            code_extra_px: 40.0,
        }
    }
}

impl RenderModel {
    fn placeholder_height(&self) -> f64 {
        self.line_height_px + self.bubble_padding_px
    }

    fn text_height(&self, profile: &BlockProfile) -> f64 {
        let per_line = self.chars_per_line.max(1);
        let lines = profile.chars.div_ceil(per_line).max(1);
        let extra = if profile.has_code { self.code_extra_px } else { 0.0 };
        lines as f64 * self.line_height_px + self.bubble_padding_px + extra
    }
}

/// What the renderer needs to know about a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockProfile {
    pub chars: usize,
    pub has_diagram: bool,
    pub has_code: bool,
}

impl BlockProfile {
    #[must_use]
    pub fn of(turn: &Turn) -> Self {
        Self {
            chars: turn.content.chars().count(),
            has_diagram: turn.has_diagram(),
            has_code: turn.has_code_fence(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Placeholder,
    Markdown,
    Complete,
}

#[derive(Debug, Clone)]
struct SimBlock {
    id: BlockId,
    profile: BlockProfile,
    inserted_at: Duration,
    stage: Stage,
    height: f64,
}

/// Layout work produced since the last [`SimViewport::take_layout_changes`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutChanges {
    /// Content height changed.
    pub content_resized: bool,
    /// Client height changed.
    pub viewport_resized: bool,
    /// Blocks whose height was (re)measured.
    pub measured: Vec<(BlockId, f64)>,
}

impl LayoutChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.content_resized && !self.viewport_resized && self.measured.is_empty()
    }
}

/// Headless scroll container.
#[derive(Debug, Clone)]
pub struct SimViewport {
    model: RenderModel,
    client_height: f64,
    scroll_top: f64,
    blocks: Vec<SimBlock>,
    pending_scroll: bool,
    changes: LayoutChanges,
}

impl SimViewport {
    /// Empty container of the given client height.
    #[must_use]
    pub fn new(client_height: f64, model: RenderModel) -> Self {
        Self {
            model,
            client_height: client_height.max(0.0),
            scroll_top: 0.0,
            blocks: Vec::new(),
            pending_scroll: false,
            changes: LayoutChanges::default(),
        }
    }

    #[must_use]
    pub fn model(&self) -> &RenderModel {
        &self.model
    }

    /// Sum of block heights and gaps.
    #[must_use]
    pub fn content_height(&self) -> f64 {
        let heights: f64 = self.blocks.iter().map(|b| b.height).sum();
        let gaps = self.blocks.len().saturating_sub(1) as f64 * self.model.gap_px;
        heights + gaps
    }

    /// Number of rendered blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Top and bottom of the `index`-th block in viewport coordinates.
    #[must_use]
    pub fn block_rect(&self, index: usize) -> Option<(f64, f64)> {
        let block = self.blocks.get(index)?;
        let top: f64 = self.blocks[..index]
            .iter()
            .map(|b| b.height + self.model.gap_px)
            .sum();
        let top = top - self.scroll_top;
        Some((top, top + block.height))
    }

    /// Whether any render pass is still scheduled.
    #[must_use]
    pub fn has_pending_passes(&self) -> bool {
        self.blocks.iter().any(|b| b.stage != Stage::Complete)
    }

    /// Whether a scroll notification is queued.
    #[must_use]
    pub fn has_pending_scroll(&self) -> bool {
        self.pending_scroll
    }

    /// Take the queued scroll notification.
    pub fn take_scroll_event(&mut self) -> bool {
        std::mem::take(&mut self.pending_scroll)
    }

    /// Take accumulated layout changes.
    pub fn take_layout_changes(&mut self) -> LayoutChanges {
        std::mem::take(&mut self.changes)
    }

    /// Reconcile the rendered blocks with the projection's block list.
    ///
    /// New ids are inserted with placeholder height; missing ids are removed.
    pub fn sync_blocks(&mut self, blocks: &[(BlockId, BlockProfile)], now: Duration) {
        let before = self.content_height();
        let mut previous = std::mem::take(&mut self.blocks);
        for &(id, profile) in blocks {
            if let Some(pos) = previous.iter().position(|b| b.id == id) {
                self.blocks.push(previous.swap_remove(pos));
                continue;
            }
            let height = self.model.placeholder_height();
            self.blocks.push(SimBlock {
                id,
                profile,
                inserted_at: now,
                stage: Stage::Placeholder,
                height,
            });
            self.changes.measured.push((id, height));
        }
        self.after_layout(before);
    }

    /// Run render passes that are due at `now`.
    pub fn advance(&mut self, now: Duration) {
        let before = self.content_height();
        let markdown = Duration::from_millis(self.model.markdown_delay_ms);
        let diagram = Duration::from_millis(self.model.diagram_delay_ms);
        for i in 0..self.blocks.len() {
            let block = &self.blocks[i];
            let age = now.saturating_sub(block.inserted_at);
            let next = match block.stage {
                Stage::Placeholder if age >= markdown => {
                    let height = self.model.text_height(&block.profile);
                    let stage = if block.profile.has_diagram {
                        Stage::Markdown
                    } else {
                        Stage::Complete
                    };
                    Some((height, stage))
                }
                Stage::Markdown if age >= diagram => {
                    Some((block.height + self.model.diagram_extra_px, Stage::Complete))
                }
                _ => None,
            };
            if let Some((height, stage)) = next {
                let block = &mut self.blocks[i];
                block.stage = stage;
                if (block.height - height).abs() > f64::EPSILON {
                    block.height = height;
                    self.changes.measured.push((block.id, height));
                }
            }
        }
        self.after_layout(before);
    }

    /// Resize the container.
    pub fn set_client_height(&mut self, height: f64) {
        let height = height.max(0.0);
        if (height - self.client_height).abs() <= f64::EPSILON {
            return;
        }
        self.client_height = height;
        self.changes.viewport_resized = true;
        self.clamp_scroll();
    }

    /// User-initiated absolute scroll. Queues a notification when it moves.
    pub fn user_scroll_to(&mut self, top: f64) {
        self.set_scroll_top(top);
    }

    /// User-initiated relative scroll.
    pub fn user_scroll_by(&mut self, delta: f64) {
        self.set_scroll_top(self.scroll_top + delta);
    }

    fn after_layout(&mut self, before: f64) {
        if (self.content_height() - before).abs() > f64::EPSILON {
            self.changes.content_resized = true;
            self.clamp_scroll();
        }
    }

    fn clamp_scroll(&mut self) {
        let clamped = self.scroll_top.clamp(0.0, self.metrics().max_scroll_top());
        if (clamped - self.scroll_top).abs() > f64::EPSILON {
            self.scroll_top = clamped;
            self.pending_scroll = true;
        }
    }
}

impl Default for SimViewport {
    fn default() -> Self {
        Self::new(600.0, RenderModel::default())
    }
}

impl Viewport for SimViewport {
    fn metrics(&self) -> ScrollMetrics {
        let content = self.content_height();
        ScrollMetrics::new(self.scroll_top, self.client_height, content.max(self.client_height))
    }

    fn set_scroll_top(&mut self, top: f64) {
        let clamped = top.clamp(0.0, self.metrics().max_scroll_top());
        if (clamped - self.scroll_top).abs() > f64::EPSILON {
            self.scroll_top = clamped;
            self.pending_scroll = true;
        }
    }

    fn anchor_offset(&self) -> Option<f64> {
        Some(self.content_height())
    }
}
