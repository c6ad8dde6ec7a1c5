//! Multi-level time header: year → month → day or year → week → day.
//!
//! The builder walks every day of `[start_at, end_at]` once and opens a new parent node whenever
//! a calendar boundary is crossed, so the first and last segments at every level are clipped to
//! the requested range and the leaves tile it exactly.

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use chrono::{Datelike, NaiveDate};

use crate::date::{add_days, day_offset, first_weekday, week_start};

/// Builds a header for `(start_at, end_at, cell_width, week_starts_monday)`.
pub type HeaderBuilderFn =
    Arc<dyn Fn(NaiveDate, NaiveDate, u32, bool) -> Vec<HeaderNode> + Send + Sync>;

/// Decides whether a day closes a header period (`(date, week_starts_monday)`).
pub type PeriodEndFn = Arc<dyn Fn(NaiveDate, bool) -> bool + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeaderLevel {
    Year,
    Month,
    Week,
    Day,
}

/// A header cell. Leaves are single days with `size_px == cell_width`; a parent's size is the
/// sum of its children's sizes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeaderNode {
    pub id: String,
    pub label: String,
    pub level: HeaderLevel,
    /// First day covered by this cell.
    pub date: NaiveDate,
    /// Left edge relative to the window start.
    pub offset_px: u64,
    pub size_px: u64,
    pub children: Vec<HeaderNode>,
}

impl HeaderNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Leaves under this node, in order.
    pub fn leaves(&self) -> Vec<&HeaderNode> {
        let mut out = Vec::new();
        collect_leaves(core::slice::from_ref(self), &mut out);
        out
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(HeaderNode::leaf_count).sum()
        }
    }

    fn parent(
        level: HeaderLevel,
        id: String,
        label: String,
        date: NaiveDate,
        offset_px: u64,
    ) -> Self {
        Self {
            id,
            label,
            level,
            date,
            offset_px,
            size_px: 0,
            children: Vec::new(),
        }
    }
}

/// Leaves of a header forest, in order.
pub fn header_leaves(roots: &[HeaderNode]) -> Vec<&HeaderNode> {
    let mut out = Vec::new();
    collect_leaves(roots, &mut out);
    out
}

fn collect_leaves<'a>(nodes: &'a [HeaderNode], out: &mut Vec<&'a HeaderNode>) {
    for node in nodes {
        if node.is_leaf() {
            out.push(node);
        } else {
            collect_leaves(&node.children, out);
        }
    }
}

/// Rows of header cells, top-down. The year row is dropped unless `show_year_row`.
pub fn header_levels(roots: &[HeaderNode], show_year_row: bool) -> Vec<Vec<&HeaderNode>> {
    let mut levels: Vec<Vec<&HeaderNode>> = Vec::new();
    let mut current: Vec<&HeaderNode> = roots.iter().collect();
    while !current.is_empty() {
        let next = current
            .iter()
            .copied()
            .flat_map(|n| n.children.iter())
            .collect();
        levels.push(current);
        current = next;
    }
    if !show_year_row && levels.len() > 1 {
        levels.remove(0);
    }
    levels
}

/// Total header height: per-level heights (a missing or zero height falls back to the first
/// height, then to `row_height`) plus the alert strip.
pub fn total_header_height(
    level_count: usize,
    level_heights: &[u32],
    row_height: u32,
    alert_height: Option<u32>,
) -> u32 {
    let first = level_heights.first().copied().filter(|h| *h > 0);
    let mut total = 0u32;
    for i in 0..level_count {
        let h = level_heights
            .get(i)
            .copied()
            .filter(|h| *h > 0)
            .or(first)
            .unwrap_or(row_height);
        total = total.saturating_add(h);
    }
    total.saturating_add(alert_height.unwrap_or(0))
}

/// Host-supplied header builder for the `Custom` mode.
#[derive(Clone)]
pub struct CustomHeader {
    pub build: HeaderBuilderFn,
    pub period_end: Option<PeriodEndFn>,
}

impl CustomHeader {
    pub fn new(
        build: impl Fn(NaiveDate, NaiveDate, u32, bool) -> Vec<HeaderNode> + Send + Sync + 'static,
    ) -> Self {
        Self {
            build: Arc::new(build),
            period_end: None,
        }
    }

    pub fn with_period_end(
        mut self,
        period_end: impl Fn(NaiveDate, bool) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.period_end = Some(Arc::new(period_end));
        self
    }
}

/// How the time axis is partitioned. Resolved once per configuration.
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeaderMode {
    #[default]
    MonthDay,
    WeekDay,
    #[cfg_attr(feature = "serde", serde(skip))]
    Custom(CustomHeader),
}

impl HeaderMode {
    pub fn custom(
        build: impl Fn(NaiveDate, NaiveDate, u32, bool) -> Vec<HeaderNode> + Send + Sync + 'static,
    ) -> Self {
        Self::Custom(CustomHeader::new(build))
    }
}

impl PartialEq for HeaderMode {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MonthDay, Self::MonthDay) | (Self::WeekDay, Self::WeekDay) => true,
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(&a.build, &b.build),
            _ => false,
        }
    }
}

impl core::fmt::Debug for HeaderMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MonthDay => f.write_str("MonthDay"),
            Self::WeekDay => f.write_str("WeekDay"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Week-year and week number of a day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WeekNumber {
    pub year: i32,
    pub week: u32,
}

/// ISO week for Monday-start weeks; for Sunday-start weeks, week 1 is the week containing
/// January 1st of the year in which the week ends.
pub fn week_number(date: NaiveDate, week_starts_monday: bool) -> WeekNumber {
    if week_starts_monday {
        let iso = date.iso_week();
        return WeekNumber {
            year: iso.year(),
            week: iso.week(),
        };
    }
    let first = week_start(date, false);
    let year = add_days(first, 6).year();
    let Some(jan1) = NaiveDate::from_yo_opt(year, 1) else {
        return WeekNumber { year, week: 1 };
    };
    let week = day_offset(first, week_start(jan1, false)) / 7 + 1;
    WeekNumber {
        year,
        week: week as u32,
    }
}

/// Whether `date` is the last day of its header period (month or week).
pub fn is_period_end(mode: &HeaderMode, date: NaiveDate, week_starts_monday: bool) -> bool {
    let next = add_days(date, 1);
    match mode {
        HeaderMode::MonthDay => next.day() == 1,
        HeaderMode::WeekDay => next.weekday() == first_weekday(week_starts_monday),
        HeaderMode::Custom(custom) => custom
            .period_end
            .as_ref()
            .is_some_and(|f| f(date, week_starts_monday)),
    }
}

/// Label text for header cells.
pub trait HeaderLabels {
    fn year(&self, year: i32) -> String {
        format!("{year}")
    }

    fn month(&self, first_day: NaiveDate) -> String {
        format!("{:04}-{:02}", first_day.year(), first_day.month())
    }

    fn week(&self, _first_day: NaiveDate, week: WeekNumber) -> String {
        format!("W{:02}", week.week)
    }

    fn day(&self, date: NaiveDate) -> String {
        format!("{}", date.day())
    }
}

/// The built-in numeric labels.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultLabels;

impl HeaderLabels for DefaultLabels {}

pub fn day_id(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Builds the header with [`DefaultLabels`].
///
/// A degenerate range (`end_at < start_at`) yields an empty header.
pub fn build_header(
    mode: &HeaderMode,
    start_at: NaiveDate,
    end_at: NaiveDate,
    cell_width: u32,
    week_starts_monday: bool,
) -> Vec<HeaderNode> {
    build_header_with(
        &DefaultLabels,
        mode,
        start_at,
        end_at,
        cell_width,
        week_starts_monday,
    )
}

pub fn build_header_with(
    labels: &dyn HeaderLabels,
    mode: &HeaderMode,
    start_at: NaiveDate,
    end_at: NaiveDate,
    cell_width: u32,
    week_starts_monday: bool,
) -> Vec<HeaderNode> {
    if end_at < start_at {
        gdebug!("build_header: degenerate range, empty header");
        return Vec::new();
    }
    match mode {
        HeaderMode::MonthDay => calendar_header(
            labels,
            HeaderLevel::Month,
            start_at,
            end_at,
            cell_width,
            week_starts_monday,
        ),
        HeaderMode::WeekDay => calendar_header(
            labels,
            HeaderLevel::Week,
            start_at,
            end_at,
            cell_width,
            week_starts_monday,
        ),
        HeaderMode::Custom(custom) => {
            (custom.build)(start_at, end_at, cell_width, week_starts_monday)
        }
    }
}

fn calendar_header(
    labels: &dyn HeaderLabels,
    period: HeaderLevel,
    start_at: NaiveDate,
    end_at: NaiveDate,
    cell_width: u32,
    week_starts_monday: bool,
) -> Vec<HeaderNode> {
    let week_first = first_weekday(week_starts_monday);
    let cw = cell_width as u64;
    let mut years: Vec<HeaderNode> = Vec::new();
    let mut offset = 0u64;

    let days = day_offset(end_at, start_at) as usize + 1;
    for day in start_at.iter_days().take(days) {
        let opens_period = day == start_at
            || match period {
                HeaderLevel::Week => day.weekday() == week_first,
                _ => day.day() == 1,
            };

        if opens_period {
            // A period belongs to the year its first (clipped) day falls in.
            if years.last().is_none_or(|y| y.date.year() != day.year()) {
                years.push(HeaderNode::parent(
                    HeaderLevel::Year,
                    format!("{:04}", day.year()),
                    labels.year(day.year()),
                    day,
                    offset,
                ));
            }
            let node = match period {
                HeaderLevel::Week => {
                    let wn = week_number(day, week_starts_monday);
                    HeaderNode::parent(
                        HeaderLevel::Week,
                        format!("{:04}-W{:02}", wn.year, wn.week),
                        labels.week(day, wn),
                        day,
                        offset,
                    )
                }
                _ => HeaderNode::parent(
                    HeaderLevel::Month,
                    format!("{:04}-{:02}", day.year(), day.month()),
                    labels.month(day),
                    day,
                    offset,
                ),
            };
            if let Some(year) = years.last_mut() {
                year.children.push(node);
            }
        }

        let leaf = HeaderNode {
            id: day_id(day),
            label: labels.day(day),
            level: HeaderLevel::Day,
            date: day,
            offset_px: offset,
            size_px: cw,
            children: Vec::new(),
        };
        if let Some(year) = years.last_mut() {
            year.size_px += cw;
            if let Some(parent) = year.children.last_mut() {
                parent.size_px += cw;
                parent.children.push(leaf);
            }
        }
        offset += cw;
    }
    years
}
