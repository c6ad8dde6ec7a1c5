use chrono::NaiveDate;
use gantt_virtual::{BufferSpec, DateWindow, day_offset};

/// Cells kept to the left of the anchor date after a re-center.
pub const ANCHOR_LEAD_CELLS: i64 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollPhase {
    Idle,
    /// A window shift happened; `correction_px` must be added to the scroll offset before any
    /// further shift is considered.
    PendingReposition { correction_px: i64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollEdge {
    Left,
    Right,
}

/// A date window shift triggered by reaching a scroll edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowShift {
    pub edge: ScrollEdge,
    pub window: DateWindow,
    pub correction_px: i64,
}

/// Edge-triggered sliding of the date window for bidirectional infinite scrolling.
///
/// At the left edge the window slides `buffer_days` into the past and the scroll offset must grow
/// by `buffer_days × cell_width`; at the right edge it slides into the future and the offset
/// shrinks by the same amount. Either way the dates under the viewport stay under the same
/// pixels. `origin_start` is never touched, so bar coordinates survive the shift.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InfiniteScroll {
    enabled: bool,
    buffer_days: u32,
    edge_epsilon_px: u32,
    phase: ScrollPhase,
}

impl InfiniteScroll {
    pub fn new(enabled: bool, buffer_days: u32, edge_epsilon_px: u32) -> Self {
        Self {
            enabled,
            buffer_days,
            edge_epsilon_px,
            phase: ScrollPhase::Idle,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.phase = ScrollPhase::Idle;
        }
    }

    /// Drops any pending correction, e.g. after the window was replaced wholesale.
    pub fn reset(&mut self) {
        self.phase = ScrollPhase::Idle;
    }

    pub fn buffer_days(&self) -> u32 {
        self.buffer_days
    }

    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    pub fn pending_correction(&self) -> Option<i64> {
        match self.phase {
            ScrollPhase::Idle => None,
            ScrollPhase::PendingReposition { correction_px } => Some(correction_px),
        }
    }

    /// Checks a scroll event against both edges.
    ///
    /// Returns `None` when disabled, when a correction is still pending, or when the offset is
    /// away from both edges.
    pub fn on_scroll(
        &mut self,
        window: &DateWindow,
        scroll_x: u64,
        viewport_width: u32,
        cell_width: u32,
    ) -> Option<WindowShift> {
        if !self.enabled || self.buffer_days == 0 || cell_width == 0 {
            return None;
        }
        if let ScrollPhase::PendingReposition { .. } = self.phase {
            gtrace!(scroll_x, "InfiniteScroll: correction pending, ignoring scroll");
            return None;
        }
        let eps = self.edge_epsilon_px as u64;
        let max_scroll = window
            .width_px(cell_width)
            .saturating_sub(viewport_width as u64);
        let days = self.buffer_days as i64;
        let step = days * cell_width as i64;
        let (edge, days, correction_px) = if scroll_x <= eps {
            (ScrollEdge::Left, -days, step)
        } else if scroll_x.saturating_add(eps) >= max_scroll {
            (ScrollEdge::Right, days, -step)
        } else {
            return None;
        };
        let shifted = window.shift_days(days);
        gdebug!(
            ?edge,
            start_at = %shifted.start_at,
            end_at = %shifted.end_at,
            correction_px,
            "InfiniteScroll: shifting date window"
        );
        self.phase = ScrollPhase::PendingReposition { correction_px };
        Some(WindowShift {
            edge,
            window: shifted,
            correction_px,
        })
    }

    /// Applies the pending correction to `scroll_x` and returns to `Idle`.
    pub fn apply_correction(&mut self, scroll_x: u64) -> u64 {
        let ScrollPhase::PendingReposition { correction_px } = self.phase else {
            return scroll_x;
        };
        self.phase = ScrollPhase::Idle;
        if correction_px >= 0 {
            scroll_x.saturating_add(correction_px as u64)
        } else {
            scroll_x.saturating_sub(correction_px.unsigned_abs())
        }
    }
}

/// A window re-centered around `anchor`, plus the scroll offset that puts the anchor
/// [`ANCHOR_LEAD_CELLS`] cells from the left edge (flush left when fewer cells precede it).
pub fn recenter(anchor: NaiveDate, buffer: BufferSpec, cell_width: u32) -> (DateWindow, u64) {
    let window = DateWindow::around(anchor, buffer);
    (window, anchor_scroll(&window, anchor, cell_width))
}

/// Scroll offset that shows `anchor` [`ANCHOR_LEAD_CELLS`] cells from the left edge of `window`.
pub fn anchor_scroll(window: &DateWindow, anchor: NaiveDate, cell_width: u32) -> u64 {
    let offset = day_offset(anchor, window.start_at).max(0);
    let cells = if offset > ANCHOR_LEAD_CELLS {
        offset - ANCHOR_LEAD_CELLS
    } else {
        offset
    };
    cells as u64 * cell_width as u64
}
