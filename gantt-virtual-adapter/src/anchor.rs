use alloc::string::String;

use chrono::NaiveDate;
use gantt_virtual::{DateWindow, RowSet, RowWindow};

/// The day under the left viewport edge, and how far into its cell the edge sits.
///
/// Re-applied after the date window or the cell width changes so that the same day stays under
/// the same pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateAnchor {
    pub date: NaiveDate,
    /// Fraction of a cell in `[0, 1)`.
    pub offset_in_cell: f64,
}

/// Returns `None` for a degenerate window or a zero cell width.
pub fn capture_date_anchor(
    window: &DateWindow,
    scroll_x: u64,
    cell_width: u32,
) -> Option<DateAnchor> {
    if window.is_degenerate() || cell_width == 0 {
        return None;
    }
    let date = window.date_at_x(scroll_x as f64, cell_width);
    let cell_x = window.x_of(date, cell_width);
    let inside = scroll_x as i64 - cell_x;
    Some(DateAnchor {
        date,
        offset_in_cell: inside as f64 / cell_width as f64,
    })
}

/// Scroll offset that puts `anchor` back under the left viewport edge of `window`.
///
/// Dates before the window clamp to `0`.
pub fn apply_date_anchor(window: &DateWindow, anchor: &DateAnchor, cell_width: u32) -> u64 {
    let x = window.x_of(anchor.date, cell_width) as f64 + anchor.offset_in_cell * cell_width as f64;
    if x <= 0.0 { 0 } else { x as u64 }
}

/// The first visible row (by id) and the distance from its top to the scroll offset.
///
/// Used to keep the viewport on the same row when the row set is replaced (rows inserted
/// above, groups collapsed, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowAnchor {
    pub row_id: String,
    pub offset_in_viewport: u64,
}

/// Returns `None` when no row is visible.
pub fn capture_first_visible_row<T>(rows: &RowSet<T>, w: &RowWindow) -> Option<RowAnchor> {
    let visible = w.visible_range();
    if visible.is_empty() {
        return None;
    }
    let index = visible.start_index;
    let start = w.item_start(index)?;
    let row = rows.row(index)?;
    Some(RowAnchor {
        row_id: row.id.clone(),
        offset_in_viewport: w.scroll_offset().saturating_sub(start),
    })
}

/// Scrolls `w` so the anchored row is back at its captured position.
///
/// `rows` is the *current* row set. Returns `false` when the row no longer exists.
pub fn apply_row_anchor<T>(w: &mut RowWindow, rows: &RowSet<T>, anchor: &RowAnchor) -> bool {
    let Some(index) = rows.index_of(&anchor.row_id) else {
        gdebug!(row_id = %anchor.row_id, "apply_row_anchor: row is gone");
        return false;
    };
    let Some(start) = w.item_start(index) else {
        return false;
    };
    w.set_scroll_offset_clamped(start.saturating_add(anchor.offset_in_viewport));
    true
}
