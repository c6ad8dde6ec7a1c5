//! A headless, virtualized date-scheduling layout engine for Gantt charts.
//!
//! For the stateful, event-driven pieces (infinite scroll, scroll mirroring, deferred
//! recomputation, a frame controller), see the `gantt-virtual-adapter` crate.
//!
//! The engine maps a date range onto a scrollable pixel grid and produces plain data for a host
//! to draw:
//! - a multi-level time header (year → month → day or year → week → day)
//! - windowed rows and columns over a prefix-sum index
//! - positioned task and group bars, plus dependency edges
//! - snapped date proposals for drag/resize gestures
//! - per-day decorations (rest days, milestones, alert tags)
//!
//! It is UI-agnostic. The host is expected to provide:
//! - viewport size and scroll offsets
//! - records and accessor functions for their dates, ids and dependencies
//! - pixel drawing
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod date;
mod editor;
mod error;
mod fenwick;
mod header;
mod key;
mod layout;
mod options;
mod overlay;
mod rows;
mod types;
mod window;
mod window_options;

#[cfg(test)]
mod tests;

pub use date::{
    BufferSpec, DateWindow, add_days, date_from_pixel, day_offset, pixel_x, week_start,
};
pub use editor::{
    BarChange, BarEditor, DragMode, DragSession, SNAP_UP_RATIO, SnappedSpan, cell_index_at,
    on_resize_end,
};
pub use error::{GanttError, Result};
pub use header::{
    CustomHeader, DefaultLabels, HeaderBuilderFn, HeaderLabels, HeaderLevel, HeaderMode,
    HeaderNode, PeriodEndFn, WeekNumber, build_header, build_header_with, day_id, header_leaves,
    header_levels, is_period_end, total_header_height, week_number,
};
pub use key::{IdMap, IdSet};
pub use layout::{
    Bar, BarIndex, Edge, LayoutParams, ScheduleLayout, bar_span, create_bar, layout_bars,
    layout_edges,
};
pub use options::{GanttOptions, RangeSource, ValidatedOptions};
pub use overlay::{
    AlertOverlay, DEFAULT_MILESTONE_COLOR, DayDecoration, DayDecorator, Milestone, Milestones,
    RestDayFn, is_weekend,
};
pub use rows::{
    Accessors, AggregateFn, DateFn, DependencyFn, Expanded, GroupAggregate, GroupRowView,
    GroupSpec, GroupTag, IdFn, Row, RowKind, RowSet,
};
pub use types::{Align, IndexRange, ScrollDirection, VirtualSlice};
pub use window::{ColumnWindow, RowWindow, Window};
pub use window_options::{SizeFn, WindowOptions};
