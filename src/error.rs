use alloc::string::String;

use thiserror::Error;

/// Errors reported by the engine.
///
/// None of these are fatal for the engine as a whole: a failed operation leaves the previously
/// computed layout in place and the caller decides whether to retry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GanttError {
    /// A row id (from an edge, a drag or a bar creation) does not resolve against the current
    /// row set.
    #[error("row `{row_id}` not found in the current row set")]
    RowNotFound { row_id: String },

    /// A bar id does not resolve against the current layout pass.
    #[error("bar `{bar_id}` not found in the current layout")]
    BarNotFound { bar_id: String },

    /// Both an explicit `start_at`/`end_at` range and an anchor + buffer were configured.
    #[error("explicit start/end range and anchor + buffer months are mutually exclusive")]
    ConflictingRange,

    /// Neither range form is complete (e.g. `start_at` without `end_at`).
    #[error("date range is incomplete: provide start_at and end_at, or an anchor date")]
    IncompleteRange,

    /// Cell width must be strictly positive.
    #[error("cell width must be greater than zero (got {width})")]
    InvalidCellWidth { width: u32 },
}

pub type Result<T, E = GanttError> = core::result::Result<T, E>;
