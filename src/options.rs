use chrono::NaiveDate;

use crate::editor::SNAP_UP_RATIO;
use crate::error::{GanttError, Result};
use crate::header::HeaderMode;
use crate::layout::LayoutParams;
use crate::{BufferSpec, DateWindow};

/// Chart configuration. Every field has a default; validate with [`GanttOptions::validate`]
/// before building anything from it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GanttOptions {
    /// Explicit range. Mutually exclusive with `anchor`/`buffer_months`.
    pub start_at: Option<NaiveDate>,
    pub end_at: Option<NaiveDate>,
    /// Anchor date for the "anchor + buffer" range form.
    pub anchor: Option<NaiveDate>,
    /// Months around the anchor; `[3, 2]` when only the anchor is given.
    pub buffer_months: Option<BufferSpec>,

    pub cell_width: u32,
    pub row_height: u32,
    /// Rows materialized beyond each side of the viewport.
    pub overscan: usize,
    /// Day columns materialized beyond each side of the viewport.
    pub column_overscan: usize,
    /// Days added on the side being approached by an infinite-scroll shift.
    pub buffer_days: u32,
    pub min_bar_range_days: u32,
    pub mode: HeaderMode,
    pub week_starts_monday: bool,
    pub group_gap: u32,
    pub has_first_group_gap: bool,
    /// Padding below the last row.
    pub last_group_gap: u32,

    pub infinite: bool,
    /// Distance from a scroll edge that still counts as "at the edge".
    pub edge_epsilon_px: u32,
    pub snap_up_ratio: f64,
    /// Minimum spacing between two deferred bar/edge recomputations.
    pub recompute_throttle_ms: u64,
    /// Upper bound on how long a deferred recomputation waits for an idle tick.
    pub idle_timeout_ms: u64,

    pub show_year_row: bool,
    pub header_heights: alloc::vec::Vec<u32>,
    pub alert_height: Option<u32>,
}

impl Default for GanttOptions {
    fn default() -> Self {
        Self {
            start_at: None,
            end_at: None,
            anchor: None,
            buffer_months: None,
            cell_width: 50,
            row_height: 34,
            overscan: 10,
            column_overscan: 10,
            buffer_days: 10,
            min_bar_range_days: 1,
            mode: HeaderMode::MonthDay,
            week_starts_monday: true,
            group_gap: 10,
            has_first_group_gap: false,
            last_group_gap: 0,
            infinite: false,
            edge_epsilon_px: 0,
            snap_up_ratio: SNAP_UP_RATIO,
            recompute_throttle_ms: 300,
            idle_timeout_ms: 100,
            show_year_row: true,
            header_heights: alloc::vec::Vec::new(),
            alert_height: None,
        }
    }
}

impl GanttOptions {
    pub fn explicit(start_at: NaiveDate, end_at: NaiveDate) -> Self {
        Self::default().with_range(start_at, end_at)
    }

    pub fn anchored(anchor: NaiveDate, buffer: impl Into<BufferSpec>) -> Self {
        Self::default().with_anchor(anchor, buffer)
    }

    pub fn with_range(mut self, start_at: NaiveDate, end_at: NaiveDate) -> Self {
        self.start_at = Some(start_at);
        self.end_at = Some(end_at);
        self
    }

    pub fn with_anchor(mut self, anchor: NaiveDate, buffer: impl Into<BufferSpec>) -> Self {
        self.anchor = Some(anchor);
        self.buffer_months = Some(buffer.into());
        self
    }

    pub fn with_cell_width(mut self, cell_width: u32) -> Self {
        self.cell_width = cell_width;
        self
    }

    pub fn with_row_height(mut self, row_height: u32) -> Self {
        self.row_height = row_height;
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_column_overscan(mut self, overscan: usize) -> Self {
        self.column_overscan = overscan;
        self
    }

    pub fn with_buffer_days(mut self, buffer_days: u32) -> Self {
        self.buffer_days = buffer_days;
        self
    }

    pub fn with_min_bar_range_days(mut self, days: u32) -> Self {
        self.min_bar_range_days = days;
        self
    }

    pub fn with_mode(mut self, mode: HeaderMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_week_starts_monday(mut self, monday: bool) -> Self {
        self.week_starts_monday = monday;
        self
    }

    pub fn with_group_gap(mut self, group_gap: u32, has_first_group_gap: bool) -> Self {
        self.group_gap = group_gap;
        self.has_first_group_gap = has_first_group_gap;
        self
    }

    pub fn with_last_group_gap(mut self, gap: u32) -> Self {
        self.last_group_gap = gap;
        self
    }

    pub fn with_infinite(mut self, infinite: bool) -> Self {
        self.infinite = infinite;
        self
    }

    pub fn with_edge_epsilon_px(mut self, epsilon: u32) -> Self {
        self.edge_epsilon_px = epsilon;
        self
    }

    pub fn with_snap_up_ratio(mut self, ratio: f64) -> Self {
        self.snap_up_ratio = ratio;
        self
    }

    pub fn with_recompute_timing(mut self, throttle_ms: u64, idle_timeout_ms: u64) -> Self {
        self.recompute_throttle_ms = throttle_ms;
        self.idle_timeout_ms = idle_timeout_ms;
        self
    }

    pub fn with_header_heights(
        mut self,
        heights: alloc::vec::Vec<u32>,
        alert_height: Option<u32>,
    ) -> Self {
        self.header_heights = heights;
        self.alert_height = alert_height;
        self
    }

    pub fn with_show_year_row(mut self, show: bool) -> Self {
        self.show_year_row = show;
        self
    }

    pub fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            cell_width: self.cell_width,
            min_bar_range_days: self.min_bar_range_days,
            group_gap: self.group_gap,
            has_first_group_gap: self.has_first_group_gap,
        }
    }

    /// Resolves the range form and rejects invalid combinations.
    pub fn validate(self) -> Result<ValidatedOptions> {
        if self.cell_width == 0 {
            gwarn!("GanttOptions::validate: zero cell width");
            return Err(GanttError::InvalidCellWidth {
                width: self.cell_width,
            });
        }
        let anchored = self.anchor.is_some() || self.buffer_months.is_some();
        let explicit = self.start_at.is_some() || self.end_at.is_some();
        let range = match (self.start_at, self.end_at, self.anchor) {
            _ if anchored && explicit => {
                gwarn!("GanttOptions::validate: explicit range and anchor both set");
                return Err(GanttError::ConflictingRange);
            }
            (Some(start_at), Some(end_at), None) => RangeSource::Explicit { start_at, end_at },
            (None, None, Some(anchor)) => RangeSource::Anchored {
                anchor,
                buffer: self.buffer_months.unwrap_or_default(),
            },
            _ => {
                gwarn!("GanttOptions::validate: incomplete range");
                return Err(GanttError::IncompleteRange);
            }
        };
        Ok(ValidatedOptions {
            options: self,
            range,
        })
    }
}

/// Where the initial date window comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RangeSource {
    Explicit {
        start_at: NaiveDate,
        end_at: NaiveDate,
    },
    Anchored {
        anchor: NaiveDate,
        buffer: BufferSpec,
    },
}

impl RangeSource {
    pub fn window(&self) -> DateWindow {
        match *self {
            Self::Explicit { start_at, end_at } => DateWindow::explicit(start_at, end_at),
            Self::Anchored { anchor, buffer } => DateWindow::around(anchor, buffer),
        }
    }

    pub fn anchor(&self) -> Option<NaiveDate> {
        match *self {
            Self::Explicit { .. } => None,
            Self::Anchored { anchor, .. } => Some(anchor),
        }
    }
}

/// Options that passed validation, with the range form resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedOptions {
    options: GanttOptions,
    range: RangeSource,
}

impl ValidatedOptions {
    pub fn options(&self) -> &GanttOptions {
        &self.options
    }

    pub fn range(&self) -> RangeSource {
        self.range
    }

    pub fn into_options(self) -> GanttOptions {
        self.options
    }
}

impl core::ops::Deref for ValidatedOptions {
    type Target = GanttOptions;

    fn deref(&self) -> &GanttOptions {
        &self.options
    }
}
