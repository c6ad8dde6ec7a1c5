//! Pointer drag / resize → snapped date proposals.
//!
//! The editor never owns row data: finishing a gesture yields a [`BarChange`] which the host
//! applies to the record behind `row_id`.

use alloc::string::String;

use chrono::NaiveDate;

use crate::date::{date_from_pixel, floor_to_i64};
use crate::layout::Bar;

/// A width remainder below this fraction of a cell snaps down, otherwise up.
pub const SNAP_UP_RATIO: f64 = 0.4;

/// Snapped bar geometry (origin-relative pixels).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnappedSpan {
    pub x_px: f64,
    pub width_px: f64,
}

/// A proposed new extent for the record behind `row_id`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BarChange {
    pub row_id: String,
    pub start_at: NaiveDate,
    pub end_at: NaiveDate,
    pub x_px: f64,
    pub width_px: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarEditor {
    pub cell_width: u32,
    pub snap_up_ratio: f64,
}

impl BarEditor {
    pub fn new(cell_width: u32) -> Self {
        Self {
            cell_width,
            snap_up_ratio: SNAP_UP_RATIO,
        }
    }

    pub fn with_snap_up_ratio(mut self, ratio: f64) -> Self {
        self.snap_up_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Snaps a bar to cell boundaries.
    ///
    /// A left edge with any fractional offset snaps down to its cell and the width is kept.
    /// Only an aligned left edge lets the width remainder snap, down below
    /// `snap_up_ratio × cell_width` and up otherwise.
    pub fn snap(&self, x_px: f64, width_px: f64) -> SnappedSpan {
        let cw = self.cell_width as f64;
        if self.cell_width == 0 {
            return SnappedSpan { x_px, width_px };
        }
        let extra_x = rem_cells(x_px, cw);
        if extra_x != 0.0 {
            return SnappedSpan {
                x_px: x_px - extra_x,
                width_px,
            };
        }
        let extra_w = rem_cells(width_px, cw);
        let width_px = if extra_w == 0.0 {
            width_px
        } else if extra_w < cw * self.snap_up_ratio {
            width_px - extra_w
        } else {
            width_px - extra_w + cw
        };
        SnappedSpan { x_px, width_px }
    }

    /// Snaps `bar` and converts both edges back to dates.
    ///
    /// The end date is the day whose column the right edge closes:
    /// `date_from_pixel(x + width − cell_width)`.
    pub fn on_resize_end(&self, bar: &Bar, origin: NaiveDate) -> BarChange {
        let span = self.snap(bar.x_px, bar.width_px);
        let (start_at, end_at) = self.span_dates(span, origin);
        gdebug!(
            row_id = %bar.owner_row_id,
            %start_at,
            %end_at,
            "BarEditor::on_resize_end"
        );
        BarChange {
            row_id: bar.owner_row_id.clone(),
            start_at,
            end_at,
            x_px: span.x_px,
            width_px: span.width_px,
        }
    }

    fn span_dates(&self, span: SnappedSpan, origin: NaiveDate) -> (NaiveDate, NaiveDate) {
        let cw = self.cell_width as f64;
        let right = span.x_px
            + if span.width_px != 0.0 {
                span.width_px - cw
            } else {
                0.0
            };
        (
            date_from_pixel(span.x_px, origin, self.cell_width),
            date_from_pixel(right, origin, self.cell_width),
        )
    }
}

/// Non-negative remainder of `v` modulo a cell.
fn rem_cells(v: f64, cw: f64) -> f64 {
    v - floor_to_i64(v / cw) as f64 * cw
}

/// `(start, end)` for a resized bar with the default snap ratio.
pub fn on_resize_end(cell_width: u32, bar: &Bar, origin: NaiveDate) -> (NaiveDate, NaiveDate) {
    let change = BarEditor::new(cell_width).on_resize_end(bar, origin);
    (change.start_at, change.end_at)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragMode {
    Move,
    ResizeStart,
    ResizeEnd,
}

/// An in-progress drag on one bar.
///
/// `preview` is the transient bar the host draws in place of the derived one.
#[derive(Clone, Debug)]
pub struct DragSession {
    mode: DragMode,
    original: Bar,
    preview: Bar,
}

impl DragSession {
    /// `None` for bars that take no pointer interaction.
    pub fn begin(bar: &Bar, mode: DragMode) -> Option<Self> {
        if !bar.draggable() {
            gdebug!(bar_id = %bar.id, "DragSession::begin: bar is not draggable");
            return None;
        }
        Some(Self {
            mode,
            original: bar.clone(),
            preview: bar.clone(),
        })
    }

    pub fn mode(&self) -> DragMode {
        self.mode
    }

    pub fn original(&self) -> &Bar {
        &self.original
    }

    pub fn preview(&self) -> &Bar {
        &self.preview
    }

    /// Applies the total pointer delta since the drag began. Resizing never goes below the bar's
    /// minimum width.
    pub fn update(&mut self, delta_x: f64) {
        let o = &self.original;
        let min_w = o.min_width_px;
        let (x, w) = match self.mode {
            DragMode::Move => (o.x_px + delta_x, o.width_px),
            DragMode::ResizeStart => {
                let w = (o.width_px - delta_x).max(min_w);
                (o.right_px() - w, w)
            }
            DragMode::ResizeEnd => (o.x_px, (o.width_px + delta_x).max(min_w)),
        };
        self.preview.x_px = x;
        self.preview.width_px = w;
    }

    pub fn finish(self, editor: &BarEditor, origin: NaiveDate) -> BarChange {
        editor.on_resize_end(&self.preview, origin)
    }
}

/// Pixel column index under `x` (floor), for hit-testing day cells.
pub fn cell_index_at(x_px: f64, cell_width: u32) -> i64 {
    if cell_width == 0 {
        return 0;
    }
    floor_to_i64(x_px / cell_width as f64)
}
