//! Date ↔ pixel arithmetic and the materialized date window.
//!
//! All functions here are pure. Dates are calendar days (`NaiveDate`); time-of-day is never
//! represented.

use chrono::{Datelike, Months, NaiveDate, TimeDelta, Weekday};

use crate::IndexRange;

/// Calendar-day difference `date − origin` (negative when `date` precedes `origin`).
pub fn day_offset(date: NaiveDate, origin: NaiveDate) -> i64 {
    date.signed_duration_since(origin).num_days()
}

/// Left edge of `date`'s cell, measured from `origin`'s cell.
pub fn pixel_x(date: NaiveDate, origin: NaiveDate, cell_width: u32) -> i64 {
    day_offset(date, origin).saturating_mul(cell_width as i64)
}

/// Date at horizontal offset `x` from `origin`.
///
/// Uses the ceiling of `x / cell_width`: a partial cell belongs to the following day boundary.
/// A zero cell width maps every offset to `origin`.
pub fn date_from_pixel(x: f64, origin: NaiveDate, cell_width: u32) -> NaiveDate {
    if cell_width == 0 {
        return origin;
    }
    add_days(origin, ceil_to_i64(x / cell_width as f64))
}

/// `date + days`, saturating at the representable calendar range.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let fallback = if days < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    };
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(fallback)
}

/// First day of the week containing `date`.
pub fn week_start(date: NaiveDate, week_starts_monday: bool) -> NaiveDate {
    let back = if week_starts_monday {
        date.weekday().num_days_from_monday()
    } else {
        date.weekday().num_days_from_sunday()
    };
    add_days(date, -(back as i64))
}

pub(crate) fn first_weekday(week_starts_monday: bool) -> Weekday {
    if week_starts_monday {
        Weekday::Mon
    } else {
        Weekday::Sun
    }
}

pub(crate) fn ceil_to_i64(v: f64) -> i64 {
    if v.is_nan() {
        return 0;
    }
    let t = v as i64;
    if (t as f64) < v { t.saturating_add(1) } else { t }
}

pub(crate) fn floor_to_i64(v: f64) -> i64 {
    if v.is_nan() {
        return 0;
    }
    let t = v as i64;
    if (t as f64) > v { t.saturating_sub(1) } else { t }
}

/// Months of lookbehind/lookahead materialized around an anchor date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferSpec {
    pub pre_months: u32,
    pub post_months: u32,
}

impl BufferSpec {
    pub const fn new(pre_months: u32, post_months: u32) -> Self {
        Self {
            pre_months,
            post_months,
        }
    }

    /// The one-value form: the same buffer on both sides.
    pub const fn symmetric(months: u32) -> Self {
        Self::new(months, months)
    }
}

impl Default for BufferSpec {
    fn default() -> Self {
        Self::new(3, 2)
    }
}

impl From<[u32; 1]> for BufferSpec {
    fn from([months]: [u32; 1]) -> Self {
        Self::symmetric(months)
    }
}

impl From<[u32; 2]> for BufferSpec {
    fn from([pre, post]: [u32; 2]) -> Self {
        // A zero post buffer falls back to the pre buffer.
        Self::new(pre, if post == 0 { pre } else { post })
    }
}

/// The materialized date range plus the pixel-origin anchor.
///
/// Windows are values: shifting or re-centering produces a new window. `origin_start` only
/// changes when the window is re-centered around a new anchor, so bar coordinates (measured from
/// the origin) survive pure scroll shifts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateWindow {
    pub start_at: NaiveDate,
    pub end_at: NaiveDate,
    pub origin_start: NaiveDate,
}

impl DateWindow {
    /// An explicit range; the origin is the start.
    pub fn explicit(start_at: NaiveDate, end_at: NaiveDate) -> Self {
        Self {
            start_at,
            end_at,
            origin_start: start_at,
        }
    }

    /// `[anchor − pre months, anchor + post months]`, origin at the start.
    pub fn around(anchor: NaiveDate, buffer: BufferSpec) -> Self {
        let start_at = anchor
            .checked_sub_months(Months::new(buffer.pre_months))
            .unwrap_or(NaiveDate::MIN);
        let end_at = anchor
            .checked_add_months(Months::new(buffer.post_months))
            .unwrap_or(NaiveDate::MAX);
        Self::explicit(start_at, end_at)
    }

    /// Both ends moved by `days`; the origin is kept.
    pub fn shift_days(&self, days: i64) -> Self {
        Self {
            start_at: add_days(self.start_at, days),
            end_at: add_days(self.end_at, days),
            origin_start: self.origin_start,
        }
    }

    /// `end_at < start_at`. Such a window renders nothing.
    pub fn is_degenerate(&self) -> bool {
        self.end_at < self.start_at
    }

    /// Number of day cells (inclusive range), zero for a degenerate window.
    pub fn day_count(&self) -> u64 {
        if self.is_degenerate() {
            0
        } else {
            day_offset(self.end_at, self.start_at) as u64 + 1
        }
    }

    pub fn width_px(&self, cell_width: u32) -> u64 {
        self.day_count().saturating_mul(cell_width as u64)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_at && date <= self.end_at
    }

    /// Horizontal translation from origin-relative (bar) coordinates to start-relative
    /// (header/scroll) coordinates.
    pub fn origin_offset_px(&self, cell_width: u32) -> i64 {
        pixel_x(self.origin_start, self.start_at, cell_width)
    }

    /// Left edge of `date`'s column in scroll coordinates (relative to `start_at`).
    pub fn x_of(&self, date: NaiveDate, cell_width: u32) -> i64 {
        pixel_x(date, self.start_at, cell_width)
    }

    /// The day whose column contains scroll coordinate `x`.
    pub fn date_at_x(&self, x: f64, cell_width: u32) -> NaiveDate {
        if cell_width == 0 {
            return self.start_at;
        }
        add_days(self.start_at, floor_to_i64(x / cell_width as f64))
    }

    /// The days of the window in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end_at;
        let count = self.day_count();
        self.start_at
            .iter_days()
            .take(count as usize)
            .take_while(move |d| *d <= end)
    }

    /// Day columns to materialize for a horizontal viewport, widened by `overscan` cells.
    pub fn visible_days(
        &self,
        scroll_x: u64,
        viewport_width: u32,
        cell_width: u32,
        overscan: usize,
    ) -> IndexRange {
        let count = self.day_count() as usize;
        if count == 0 || viewport_width == 0 || cell_width == 0 {
            return IndexRange::EMPTY;
        }
        let cw = cell_width as u64;
        let first = (scroll_x / cw) as usize;
        let last_exclusive = scroll_x
            .saturating_add(viewport_width as u64)
            .div_ceil(cw) as usize;
        IndexRange {
            start_index: first.saturating_sub(overscan).min(count),
            end_index: last_exclusive.saturating_add(overscan).min(count),
        }
    }
}
