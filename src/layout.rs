//! Bars and dependency edges for the materialized rows.
//!
//! Bars are derived state: every pass recomputes them from the rows, the row slices and the date
//! window. Horizontal coordinates are measured from `DateWindow::origin_start`, vertical ones
//! come straight from the row window.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use chrono::NaiveDate;

use crate::date::{add_days, date_from_pixel, day_offset, pixel_x};
use crate::error::{GanttError, Result};
use crate::key::IdMap;
use crate::rows::{Accessors, GroupSpec, Row, RowKind, RowSet, reserves_group_gap};
use crate::{DateWindow, VirtualSlice};

/// Numeric inputs of a layout pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutParams {
    pub cell_width: u32,
    pub min_bar_range_days: u32,
    pub group_gap: u32,
    pub has_first_group_gap: bool,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            cell_width: 50,
            min_bar_range_days: 1,
            group_gap: 10,
            has_first_group_gap: false,
        }
    }
}

/// A positioned task or group rectangle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bar {
    pub id: String,
    pub owner_row_id: String,
    pub row_index: usize,
    pub start_at: Option<NaiveDate>,
    pub end_at: Option<NaiveDate>,
    pub x_px: f64,
    pub y_px: f64,
    pub width_px: f64,
    pub height_px: f64,
    pub min_width_px: f64,
    /// Start or end is missing.
    pub hidden: bool,
    /// Both are missing.
    pub empty_range: bool,
    pub is_group_aggregate: bool,
    pub fixed_x: bool,
    /// Transient bar drawn while the user drags out a new range.
    pub creating: bool,
}

impl Bar {
    /// Hidden and fixed bars take no pointer interaction.
    pub fn draggable(&self) -> bool {
        !self.hidden && !self.fixed_x
    }

    pub fn right_px(&self) -> f64 {
        self.x_px + self.width_px
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    /// `"{from}:{to}"`.
    pub id: String,
    pub from_row_id: String,
    pub to_row_id: String,
}

impl Edge {
    pub fn new(from_row_id: impl Into<String>, to_row_id: impl Into<String>) -> Self {
        let from_row_id = from_row_id.into();
        let to_row_id = to_row_id.into();
        Self {
            id: format!("{from_row_id}:{to_row_id}"),
            from_row_id,
            to_row_id,
        }
    }
}

/// Horizontal extent `(x, width)` of a bar, both in pixels from `origin`.
///
/// Width in days is `end − start + 1`, never below `min_bar_range_days`. With only one date
/// present the bar spans `min_bar_range_days + 1` days ending at (or starting from) it; with
/// none it is a single cell at the origin.
pub fn bar_span(
    start_at: Option<NaiveDate>,
    end_at: Option<NaiveDate>,
    origin: NaiveDate,
    params: &LayoutParams,
) -> (i64, i64) {
    let min_days = params.min_bar_range_days as i64;
    let cw = params.cell_width as i64;
    let days = match (start_at, end_at) {
        (Some(s), Some(e)) => day_offset(e, s) + 1,
        (None, None) => 1,
        _ => min_days + 1,
    }
    .max(min_days);
    let effective_start = match (start_at, end_at) {
        (Some(s), _) => Some(s),
        (None, Some(e)) => Some(add_days(e, -min_days)),
        (None, None) => None,
    };
    let x = effective_start.map_or(0, |s| pixel_x(s, origin, params.cell_width));
    (x, days.saturating_mul(cw))
}

/// Bars for the materialized rows, in slice order.
///
/// Group rows produce a bar only when their [`GroupSpec`] carries an aggregate builder. A spec in
/// `groups` takes precedence over the one the row set was grouped by.
pub fn layout_bars<T>(
    rows: &RowSet<T>,
    slices: &[VirtualSlice],
    window: &DateWindow,
    accessors: &Accessors<T>,
    groups: &[GroupSpec<T>],
    params: &LayoutParams,
) -> Vec<Bar> {
    let mut bars = Vec::with_capacity(slices.len());
    for slice in slices {
        let Some(row) = rows.row(slice.index) else {
            continue;
        };
        let (start_at, end_at, fixed_x) = match &row.kind {
            RowKind::Leaf { .. } => {
                let Some(record) = rows.record_of(row) else {
                    continue;
                };
                (accessors.start_of(record), accessors.end_of(record), false)
            }
            RowKind::Group { tag, .. } => {
                let spec = groups
                    .iter()
                    .find(|g| g.group_key == tag.group_key)
                    .or_else(|| rows.group_spec_of(row));
                let Some(spec) = spec else {
                    gwarn!(row_id = %row.id, "layout_bars: no group spec for group row");
                    continue;
                };
                let Some(aggregate) = spec.aggregate.as_ref() else {
                    continue;
                };
                let Some(view) = rows.group_view(row) else {
                    continue;
                };
                let agg = aggregate(&view);
                (agg.start, agg.end, spec.fixed_x)
            }
        };
        bars.push(position_bar(row, slice, start_at, end_at, fixed_x, window, params));
    }
    gtrace!(bars = bars.len(), "layout_bars");
    bars
}

fn position_bar(
    row: &Row,
    slice: &VirtualSlice,
    start_at: Option<NaiveDate>,
    end_at: Option<NaiveDate>,
    fixed_x: bool,
    window: &DateWindow,
    params: &LayoutParams,
) -> Bar {
    let (x, width) = bar_span(start_at, end_at, window.origin_start, params);
    let gap = if reserves_group_gap(row, slice.index, params.has_first_group_gap) {
        params.group_gap.min(slice.size)
    } else {
        0
    };
    Bar {
        id: row.id.clone(),
        owner_row_id: row.id.clone(),
        row_index: slice.index,
        start_at,
        end_at,
        x_px: x as f64,
        y_px: (slice.start + gap as u64) as f64,
        width_px: width as f64,
        height_px: (slice.size - gap) as f64,
        min_width_px: params.min_bar_range_days as f64 * params.cell_width as f64,
        hidden: start_at.is_none() || end_at.is_none(),
        empty_range: start_at.is_none() && end_at.is_none(),
        is_group_aggregate: row.is_group(),
        fixed_x,
        creating: false,
    }
}

/// Dependency edges into the materialized leaf rows.
///
/// A dependency id that does not resolve against `rows` is dropped.
pub fn layout_edges<T>(
    rows: &RowSet<T>,
    slices: &[VirtualSlice],
    accessors: &Accessors<T>,
) -> Vec<Edge> {
    let mut edges = Vec::new();
    for slice in slices {
        let Some(row) = rows.row(slice.index) else {
            continue;
        };
        let Some(record) = rows.record_of(row) else {
            continue;
        };
        for from in accessors.dependencies_of(record) {
            if rows.index_of(&from).is_none() {
                gwarn!(from = %from, to = %row.id, "layout_edges: dependency row not found");
                continue;
            }
            edges.push(Edge::new(from, row.id.clone()));
        }
    }
    gtrace!(edges = edges.len(), "layout_edges");
    edges
}

/// Bar id → position in a [`ScheduleLayout`]'s bar list.
#[derive(Clone, Debug, Default)]
pub struct BarIndex {
    positions: IdMap<usize>,
}

impl BarIndex {
    pub fn build(bars: &[Bar]) -> Self {
        let mut positions = IdMap::new();
        for (i, bar) in bars.iter().enumerate() {
            positions.insert(bar.id.clone(), i);
        }
        Self { positions }
    }

    pub fn get(&self, bar_id: &str) -> Option<usize> {
        self.positions.get(bar_id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// The result of a layout pass: bars, edges and the id index over the bars.
///
/// A transient bar (drag preview or creation) can be laid over the derived one with
/// [`ScheduleLayout::set_override`]; it wins until [`ScheduleLayout::clear_override`].
#[derive(Clone, Debug, Default)]
pub struct ScheduleLayout {
    bars: Vec<Bar>,
    edges: Vec<Edge>,
    index: BarIndex,
    overridden: Option<(Option<usize>, Bar)>,
}

impl ScheduleLayout {
    pub fn new(bars: Vec<Bar>, edges: Vec<Edge>) -> Self {
        let index = BarIndex::build(&bars);
        Self {
            bars,
            edges,
            index,
            overridden: None,
        }
    }

    /// Runs a full pass: bars and edges for `slices`.
    pub fn compute<T>(
        rows: &RowSet<T>,
        slices: &[VirtualSlice],
        window: &DateWindow,
        accessors: &Accessors<T>,
        groups: &[GroupSpec<T>],
        params: &LayoutParams,
    ) -> Self {
        Self::new(
            layout_bars(rows, slices, window, accessors, groups, params),
            layout_edges(rows, slices, accessors),
        )
    }

    /// Bars with any transient override applied.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn index(&self) -> &BarIndex {
        &self.index
    }

    pub fn bar(&self, bar_id: &str) -> Option<&Bar> {
        self.index.get(bar_id).and_then(|i| self.bars.get(i))
    }

    pub fn try_bar(&self, bar_id: &str) -> Result<&Bar> {
        self.bar(bar_id).ok_or_else(|| GanttError::BarNotFound {
            bar_id: bar_id.into(),
        })
    }

    /// Lays `bar` over the derived bar with the same id (or appends it when none exists).
    pub fn set_override(&mut self, bar: Bar) {
        self.clear_override();
        match self.index.get(&bar.id) {
            Some(i) => {
                let derived = core::mem::replace(&mut self.bars[i], bar.clone());
                self.overridden = Some((Some(i), derived));
            }
            None => {
                self.index.positions.insert(bar.id.clone(), self.bars.len());
                self.overridden = Some((None, bar.clone()));
                self.bars.push(bar);
            }
        }
    }

    pub fn override_bar(&self) -> Option<&Bar> {
        let (slot, bar) = self.overridden.as_ref()?;
        match slot {
            Some(i) => self.bars.get(*i),
            None => Some(bar),
        }
    }

    /// Restores the derived bar hidden by [`ScheduleLayout::set_override`].
    pub fn clear_override(&mut self) {
        let Some((slot, bar)) = self.overridden.take() else {
            return;
        };
        match slot {
            Some(i) => {
                if let Some(cur) = self.bars.get_mut(i) {
                    *cur = bar;
                }
            }
            None => {
                if let Some(i) = self.index.positions.remove(&bar.id) {
                    if i < self.bars.len() {
                        self.bars.remove(i);
                    }
                }
            }
        }
    }
}

/// A transient bar for a range the user is dragging out on `row_id`.
///
/// The drag started on `date`'s column and is `width_px` wide. The end is clamped to the start
/// when the width is narrower than one cell.
pub fn create_bar<T>(
    rows: &RowSet<T>,
    row_id: &str,
    width_px: f64,
    date: NaiveDate,
    slice: &VirtualSlice,
    window: &DateWindow,
    params: &LayoutParams,
) -> Result<Bar> {
    let Some(row_index) = rows.index_of(row_id) else {
        gwarn!(row_id, "create_bar: row not found");
        return Err(GanttError::RowNotFound {
            row_id: row_id.into(),
        });
    };
    let origin = window.origin_start;
    let cw = params.cell_width as f64;
    let left = pixel_x(date, origin, params.cell_width) as f64;
    let right = left + if width_px > 0.0 { width_px - cw } else { 0.0 };
    let start_at = date_from_pixel(left, origin, params.cell_width);
    let end_at = date_from_pixel(right, origin, params.cell_width).max(start_at);
    Ok(Bar {
        id: row_id.into(),
        owner_row_id: row_id.into(),
        row_index,
        start_at: Some(start_at),
        end_at: Some(end_at),
        x_px: left,
        y_px: slice.start as f64,
        width_px,
        height_px: slice.size as f64,
        min_width_px: params.min_bar_range_days as f64 * cw,
        hidden: false,
        empty_range: false,
        is_group_aggregate: false,
        fixed_x: false,
        creating: true,
    })
}
