//! Per-day decorations: rest days, period ends, milestones and host alert tags.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::header::{HeaderMode, is_period_end};
use crate::{DateWindow, IndexRange};

pub const DEFAULT_MILESTONE_COLOR: &str = "blue";

pub type RestDayFn = Arc<dyn Fn(NaiveDate) -> bool + Send + Sync>;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Milestone {
    pub date: NaiveDate,
    pub color: Option<String>,
    pub label: Option<String>,
}

impl Milestone {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            color: None,
            label: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn color_or_default(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_MILESTONE_COLOR)
    }
}

/// Host milestones, matched to days by calendar equality.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Milestones {
    items: Vec<Milestone>,
}

impl Milestones {
    pub fn new(mut items: Vec<Milestone>) -> Self {
        items.sort_by_key(|m| m.date);
        Self { items }
    }

    pub fn items(&self) -> &[Milestone] {
        &self.items
    }

    /// First milestone on `date`.
    pub fn milestone_for(&self, date: NaiveDate) -> Option<&Milestone> {
        let i = self.items.partition_point(|m| m.date < date);
        self.items.get(i).filter(|m| m.date == date)
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

type AlertBuildFn<T, A> = Arc<dyn Fn(&DateWindow, &[T]) -> A + Send + Sync>;
type AlertClassifyFn<A, Tag> = Arc<dyn Fn(NaiveDate, &A) -> Option<Tag> + Send + Sync>;

/// Host alert classification, memoized per `(start_at, end_at, rows_revision)`.
///
/// `build` turns the window and the records into a per-window map `A`; `classify` reads one
/// day's tag out of it. The map is rebuilt only when the window bounds move or the caller bumps
/// the rows revision.
pub struct AlertOverlay<T, A, Tag> {
    build: AlertBuildFn<T, A>,
    classify: AlertClassifyFn<A, Tag>,
    memo: Option<(NaiveDate, NaiveDate, u64, A)>,
}

impl<T, A, Tag> AlertOverlay<T, A, Tag> {
    pub fn new(
        build: impl Fn(&DateWindow, &[T]) -> A + Send + Sync + 'static,
        classify: impl Fn(NaiveDate, &A) -> Option<Tag> + Send + Sync + 'static,
    ) -> Self {
        Self {
            build: Arc::new(build),
            classify: Arc::new(classify),
            memo: None,
        }
    }

    /// The per-window map, rebuilt only on a key change.
    pub fn refresh(&mut self, window: &DateWindow, records: &[T], rows_revision: u64) -> &A {
        let key = (window.start_at, window.end_at, rows_revision);
        let stale = self
            .memo
            .as_ref()
            .is_none_or(|(s, e, r, _)| (*s, *e, *r) != key);
        if stale {
            gtrace!(rows_revision, "AlertOverlay: rebuilding alert map");
            self.memo = None;
        }
        let memo = self
            .memo
            .get_or_insert_with(|| (key.0, key.1, key.2, (self.build)(window, records)));
        &memo.3
    }

    pub fn cached(&self) -> Option<&A> {
        self.memo.as_ref().map(|(_, _, _, map)| map)
    }

    /// Tag for `date` from the cached map (`None` before the first refresh).
    pub fn tag_for(&self, date: NaiveDate) -> Option<Tag> {
        let map = self.cached()?;
        (self.classify)(date, map)
    }

    pub fn invalidate(&mut self) {
        self.memo = None;
    }
}

impl<T, A, Tag> core::fmt::Debug for AlertOverlay<T, A, Tag> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AlertOverlay")
            .field("cached", &self.memo.is_some())
            .finish_non_exhaustive()
    }
}

/// Decoration of one visible day column.
#[derive(Clone, Debug, PartialEq)]
pub struct DayDecoration<Tag> {
    pub date: NaiveDate,
    /// Left edge in scroll coordinates (relative to `start_at`).
    pub x_px: i64,
    pub width_px: u32,
    pub is_rest: bool,
    pub is_period_end: bool,
    pub milestone: Option<Milestone>,
    pub alert: Option<Tag>,
    /// The alert tag equals the host's current alert type.
    pub emphasized: bool,
}

/// Decorates visible day columns.
#[derive(Clone, Default)]
pub struct DayDecorator {
    pub mode: HeaderMode,
    pub week_starts_monday: bool,
    /// Host holiday predicate; weekends when absent.
    pub rest_day: Option<RestDayFn>,
    pub milestones: Milestones,
}

impl DayDecorator {
    pub fn new(mode: HeaderMode, week_starts_monday: bool) -> Self {
        Self {
            mode,
            week_starts_monday,
            rest_day: None,
            milestones: Milestones::default(),
        }
    }

    pub fn with_rest_day(mut self, f: impl Fn(NaiveDate) -> bool + Send + Sync + 'static) -> Self {
        self.rest_day = Some(Arc::new(f));
        self
    }

    pub fn with_milestones(mut self, milestones: Milestones) -> Self {
        self.milestones = milestones;
        self
    }

    pub fn is_rest(&self, date: NaiveDate) -> bool {
        match &self.rest_day {
            Some(f) => f(date),
            None => is_weekend(date),
        }
    }

    /// Decorations for day columns `range` of `window`.
    pub fn decorate<Tag: PartialEq>(
        &self,
        window: &DateWindow,
        range: IndexRange,
        cell_width: u32,
        alert: impl Fn(NaiveDate) -> Option<Tag>,
        current_alert: Option<&Tag>,
    ) -> Vec<DayDecoration<Tag>> {
        let count = range.len().min(window.day_count() as usize);
        window
            .days()
            .skip(range.start_index)
            .take(count)
            .map(|date| {
                let alert = alert(date);
                let emphasized = matches!((&alert, current_alert), (Some(a), Some(c)) if a == c);
                DayDecoration {
                    date,
                    x_px: window.x_of(date, cell_width),
                    width_px: cell_width,
                    is_rest: self.is_rest(date),
                    is_period_end: is_period_end(&self.mode, date, self.week_starts_monday),
                    milestone: self.milestones.milestone_for(date).cloned(),
                    alert,
                    emphasized,
                }
            })
            .collect()
    }
}

impl core::fmt::Debug for DayDecorator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DayDecorator")
            .field("mode", &self.mode)
            .field("week_starts_monday", &self.week_starts_monday)
            .field("rest_day", &self.rest_day.is_some())
            .field("milestones", &self.milestones)
            .finish()
    }
}
