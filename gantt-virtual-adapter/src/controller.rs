use alloc::vec::Vec;

use chrono::NaiveDate;
use gantt_virtual::{
    Accessors, Align, Bar, BarChange, BarEditor, DateWindow, DayDecoration, DayDecorator,
    DragMode, DragSession, Edge, GanttError, GanttOptions, GroupSpec, HeaderNode, IndexRange,
    Milestones, RangeSource, Result, RowSet, RowWindow, ScheduleLayout, WindowOptions,
    build_header, create_bar, header_levels, total_header_height,
};

use crate::{
    DateAnchor, DeferredSlot, Easing, InfiniteScroll, ScrollState, Tween, WindowShift,
    apply_date_anchor, apply_row_anchor, capture_date_anchor, capture_first_visible_row,
    recenter,
};

/// What invalidated the current layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutReason {
    Rows,
    Groups,
    Scroll,
    Viewport,
    DateWindow,
    CellWidth,
}

/// A pending bar/edge recomputation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutRequest {
    pub reason: LayoutReason,
    pub requested_ms: u64,
}

/// Result of a scroll event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollOutcome {
    /// Offsets the host must apply to its scroll container. Differs from the reported offsets
    /// after a window shift.
    pub scroll: ScrollState,
    pub shift: Option<WindowShift>,
}

/// Result of [`Controller::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    /// New offsets while a tween is running.
    pub scroll: Option<ScrollState>,
    /// Bars and edges were recomputed.
    pub relaid_out: bool,
}

#[derive(Clone, Debug)]
enum Edit {
    Drag(DragSession),
    Create { date: NaiveDate, bar: Bar },
}

/// A framework-neutral Gantt chart controller.
///
/// It holds no UI objects. Hosts drive it by calling:
/// - `on_viewport` / `on_scroll` when UI events occur
/// - `tick(now_ms, idle)` each frame or timer tick (tweens, deferred layout)
///
/// Header rebuilds and infinite-scroll shifts happen synchronously inside the triggering call.
/// Bar/edge recomputation after scrolling is deferred through a throttled single-slot queue; until
/// it runs the previous layout stays in place.
pub struct Controller<T> {
    options: GanttOptions,
    range: RangeSource,
    accessors: Accessors<T>,
    groups: Vec<GroupSpec<T>>,
    rows: RowSet<T>,
    rows_revision: u64,
    row_window: RowWindow,
    date_window: DateWindow,
    header: Vec<HeaderNode>,
    scroll_x: u64,
    viewport_width: u32,
    infinite: InfiniteScroll,
    deferred: DeferredSlot<LayoutRequest>,
    layout: ScheduleLayout,
    edit: Option<Edit>,
    tween: Option<Tween>,
    editor: BarEditor,
    decorator: DayDecorator,
}

impl<T> Controller<T> {
    /// Validates `options`, materializes the date window and runs the first layout.
    ///
    /// With an anchored range the initial horizontal offset shows the anchor a few cells from
    /// the left edge.
    pub fn new(options: GanttOptions, accessors: Accessors<T>, rows: RowSet<T>) -> Result<Self> {
        let validated = options.validate()?;
        let range = validated.range();
        let options = validated.into_options();
        let (date_window, scroll_x) = match range {
            RangeSource::Anchored { anchor, buffer } => {
                recenter(anchor, buffer, options.cell_width)
            }
            RangeSource::Explicit { .. } => (range.window(), 0),
        };
        gdebug!(
            start_at = %date_window.start_at,
            end_at = %date_window.end_at,
            rows = rows.len(),
            "Controller::new"
        );
        let row_window = RowWindow::new(row_window_options(&rows, &options));
        let mut c = Self {
            infinite: InfiniteScroll::new(
                options.infinite,
                options.buffer_days,
                options.edge_epsilon_px,
            ),
            deferred: DeferredSlot::new(options.recompute_throttle_ms, options.idle_timeout_ms),
            editor: BarEditor::new(options.cell_width).with_snap_up_ratio(options.snap_up_ratio),
            decorator: DayDecorator::new(options.mode.clone(), options.week_starts_monday),
            options,
            range,
            accessors,
            groups: Vec::new(),
            rows,
            rows_revision: 0,
            row_window,
            date_window,
            header: Vec::new(),
            scroll_x,
            viewport_width: 0,
            layout: ScheduleLayout::default(),
            edit: None,
            tween: None,
        };
        c.rebuild_header();
        c.relayout(LayoutReason::Rows);
        Ok(c)
    }

    /// Specs that take precedence, by `group_key`, over the ones the row set was grouped by.
    pub fn with_groups(mut self, groups: Vec<GroupSpec<T>>) -> Self {
        self.groups = groups;
        self.relayout(LayoutReason::Groups);
        self
    }

    pub fn options(&self) -> &GanttOptions {
        &self.options
    }

    pub fn range(&self) -> RangeSource {
        self.range
    }

    pub fn date_window(&self) -> &DateWindow {
        &self.date_window
    }

    pub fn header(&self) -> &[HeaderNode] {
        &self.header
    }

    pub fn header_levels(&self) -> Vec<Vec<&HeaderNode>> {
        header_levels(&self.header, self.options.show_year_row)
    }

    pub fn header_height(&self) -> u32 {
        total_header_height(
            self.header_levels().len(),
            &self.options.header_heights,
            self.options.row_height,
            self.options.alert_height,
        )
    }

    pub fn rows(&self) -> &RowSet<T> {
        &self.rows
    }

    /// Bumped on every [`Controller::set_rows`]; a memo key for host overlays.
    pub fn rows_revision(&self) -> u64 {
        self.rows_revision
    }

    pub fn row_window(&self) -> &RowWindow {
        &self.row_window
    }

    /// The last computed layout, with any drag/create preview applied.
    pub fn layout(&self) -> &ScheduleLayout {
        &self.layout
    }

    pub fn bars(&self) -> &[Bar] {
        self.layout.bars()
    }

    pub fn edges(&self) -> &[Edge] {
        self.layout.edges()
    }

    pub fn infinite(&self) -> &InfiniteScroll {
        &self.infinite
    }

    pub fn is_layout_pending(&self) -> bool {
        self.deferred.is_pending()
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    pub fn cancel_animation(&mut self) {
        self.tween = None;
    }

    pub fn scroll_state(&self) -> ScrollState {
        ScrollState::new(self.scroll_x, self.row_window.scroll_offset())
    }

    pub fn content_width(&self) -> u64 {
        self.date_window.width_px(self.options.cell_width)
    }

    pub fn max_scroll_x(&self) -> u64 {
        self.content_width()
            .saturating_sub(self.viewport_width as u64)
    }

    /// Translation the host adds to bar x coordinates to line them up with the header.
    pub fn origin_offset_px(&self) -> i64 {
        self.date_window.origin_offset_px(self.options.cell_width)
    }

    /// Day columns to materialize for the current horizontal viewport.
    pub fn visible_days(&self) -> IndexRange {
        self.date_window.visible_days(
            self.scroll_x,
            self.viewport_width,
            self.options.cell_width,
            self.options.column_overscan,
        )
    }

    pub fn on_viewport(&mut self, width: u32, height: u32, now_ms: u64) {
        self.viewport_width = width;
        self.row_window.set_viewport_size(height);
        self.request_layout(LayoutReason::Viewport, now_ms);
    }

    /// Call this when the UI reports a scroll offset change.
    ///
    /// Cancels any active tween. In infinite mode, reaching a horizontal edge shifts the date
    /// window and corrects the horizontal offset in the same call; the host must apply
    /// `outcome.scroll` before painting.
    pub fn on_scroll(&mut self, x: u64, y: u64, now_ms: u64) -> ScrollOutcome {
        self.cancel_animation();
        self.row_window.set_scroll_offset(y);
        self.scroll_x = x;

        let shift = self.infinite.on_scroll(
            &self.date_window,
            x,
            self.viewport_width,
            self.options.cell_width,
        );
        if let Some(s) = shift {
            self.date_window = s.window;
            self.rebuild_header();
            self.scroll_x = self.infinite.apply_correction(x);
        }
        gtrace!(x = self.scroll_x, y, shifted = shift.is_some(), "Controller::on_scroll");
        self.request_layout(LayoutReason::Scroll, now_ms);
        ScrollOutcome {
            scroll: self.scroll_state(),
            shift,
        }
    }

    /// Advances tweens and runs the deferred layout when it is due.
    ///
    /// `idle` tells whether the host has spare time this tick.
    pub fn tick(&mut self, now_ms: u64, idle: bool) -> Frame {
        let mut frame = Frame::default();
        if let Some(tween) = self.tween {
            let s = tween.sample(now_ms);
            self.scroll_x = s.x.min(self.max_scroll_x());
            self.row_window.set_scroll_offset_clamped(s.y);
            if tween.is_done(now_ms) {
                self.tween = None;
            }
            frame.scroll = Some(self.scroll_state());
            self.request_layout(LayoutReason::Scroll, now_ms);
        }
        if let Some(req) = self.deferred.poll(now_ms, idle) {
            self.relayout(req.reason);
            frame.relaid_out = true;
        }
        frame
    }

    /// Runs any pending layout now.
    pub fn flush_layout(&mut self, now_ms: u64) -> bool {
        match self.deferred.flush(now_ms) {
            Some(req) => {
                self.relayout(req.reason);
                true
            }
            None => false,
        }
    }

    /// Replaces the row set, keeping the first visible row in place.
    pub fn set_rows(&mut self, rows: RowSet<T>, now_ms: u64) {
        let anchor = capture_first_visible_row(&self.rows, &self.row_window);
        self.rows = rows;
        self.rows_revision += 1;
        self.row_window
            .set_options(row_window_options(&self.rows, &self.options));
        if let Some(anchor) = anchor {
            apply_row_anchor(&mut self.row_window, &self.rows, &anchor);
        }
        let edited_row_gone = match &self.edit {
            Some(Edit::Drag(s)) => self.rows.index_of(&s.original().owner_row_id).is_none(),
            Some(Edit::Create { bar, .. }) => self.rows.index_of(&bar.owner_row_id).is_none(),
            None => false,
        };
        if edited_row_gone {
            self.cancel_edit();
        }
        self.request_layout(LayoutReason::Rows, now_ms);
    }

    pub fn set_groups(&mut self, groups: Vec<GroupSpec<T>>, now_ms: u64) {
        self.groups = groups;
        self.request_layout(LayoutReason::Groups, now_ms);
    }

    pub fn set_milestones(&mut self, milestones: Milestones) {
        self.decorator.milestones = milestones;
    }

    pub fn set_rest_day(&mut self, rest_day: impl Fn(NaiveDate) -> bool + Send + Sync + 'static) {
        self.decorator = core::mem::take(&mut self.decorator).with_rest_day(rest_day);
    }

    /// Re-centers the window around `anchor` and returns the new horizontal offset.
    pub fn set_anchor_date(&mut self, anchor: NaiveDate) -> u64 {
        let buffer = match self.range {
            RangeSource::Anchored { buffer, .. } => buffer,
            RangeSource::Explicit { .. } => self.options.buffer_months.unwrap_or_default(),
        };
        let (window, scroll_x) = recenter(anchor, buffer, self.options.cell_width);
        gdebug!(%anchor, "Controller::set_anchor_date");
        self.range = RangeSource::Anchored { anchor, buffer };
        self.options.start_at = None;
        self.options.end_at = None;
        self.options.anchor = Some(anchor);
        self.options.buffer_months = Some(buffer);
        self.replace_window(window, scroll_x);
        self.scroll_x
    }

    /// Switches to an explicit range. The horizontal offset is clamped to the new content.
    pub fn set_range(&mut self, start_at: NaiveDate, end_at: NaiveDate) {
        self.range = RangeSource::Explicit { start_at, end_at };
        self.options.start_at = Some(start_at);
        self.options.end_at = Some(end_at);
        self.options.anchor = None;
        self.options.buffer_months = None;
        let scroll_x = self.scroll_x;
        self.replace_window(DateWindow::explicit(start_at, end_at), scroll_x);
    }

    fn replace_window(&mut self, window: DateWindow, scroll_x: u64) {
        self.tween = None;
        self.infinite.reset();
        self.date_window = window;
        self.rebuild_header();
        self.scroll_x = scroll_x.min(self.max_scroll_x());
        self.relayout(LayoutReason::DateWindow);
    }

    /// Changes the cell width, keeping the day under the left viewport edge in place.
    pub fn set_cell_width(&mut self, cell_width: u32) -> Result<u64> {
        if cell_width == 0 {
            return Err(GanttError::InvalidCellWidth { width: cell_width });
        }
        let anchor: Option<DateAnchor> =
            capture_date_anchor(&self.date_window, self.scroll_x, self.options.cell_width);
        self.options.cell_width = cell_width;
        self.editor.cell_width = cell_width;
        self.tween = None;
        self.rebuild_header();
        let x = anchor.map_or(0, |a| apply_date_anchor(&self.date_window, &a, cell_width));
        self.scroll_x = x.min(self.max_scroll_x());
        self.relayout(LayoutReason::CellWidth);
        Ok(self.scroll_x)
    }

    /// Scrolls horizontally so `date` is aligned in the viewport, re-centering the window first
    /// when the date lies outside it.
    ///
    /// With `animation` the move is tweened and driven by [`Controller::tick`]. Returns the target
    /// offset.
    pub fn scroll_to_date(
        &mut self,
        date: NaiveDate,
        align: Align,
        now_ms: u64,
        animation: Option<(u64, Easing)>,
    ) -> u64 {
        if !self.date_window.contains(date) {
            return self.set_anchor_date(date);
        }
        let cw = self.options.cell_width as u64;
        let view = self.viewport_width as u64;
        let cell = self.date_window.x_of(date, self.options.cell_width).max(0) as u64;
        let target = match align {
            Align::Start => cell,
            Align::End => (cell + cw).saturating_sub(view),
            Align::Center => (cell + cw / 2).saturating_sub(view / 2),
            Align::Auto => {
                let cur = self.scroll_x;
                if cell >= cur && cell + cw <= cur + view {
                    cur
                } else if cell < cur {
                    cell
                } else {
                    (cell + cw).saturating_sub(view)
                }
            }
        }
        .min(self.max_scroll_x());

        let y = self.row_window.scroll_offset();
        match animation {
            Some((duration_ms, easing)) => {
                self.tween = Some(Tween::new(
                    self.scroll_state(),
                    ScrollState::new(target, y),
                    now_ms,
                    duration_ms,
                    easing,
                ));
            }
            None => {
                self.tween = None;
                self.scroll_x = target;
                self.request_layout(LayoutReason::Scroll, now_ms);
            }
        }
        target
    }

    /// Restores a saved scroll position (clamped).
    pub fn restore_scroll(&mut self, state: ScrollState, now_ms: u64) {
        self.tween = None;
        self.scroll_x = state.x.min(self.max_scroll_x());
        self.row_window.set_scroll_offset_clamped(state.y);
        self.request_layout(LayoutReason::Scroll, now_ms);
    }

    /// Starts dragging a bar. Returns `Ok(false)` for bars that take no pointer interaction.
    pub fn begin_drag(&mut self, bar_id: &str, mode: DragMode) -> Result<bool> {
        self.cancel_edit();
        let bar = self.layout.try_bar(bar_id)?;
        let Some(session) = DragSession::begin(bar, mode) else {
            return Ok(false);
        };
        self.layout.set_override(session.preview().clone());
        self.edit = Some(Edit::Drag(session));
        Ok(true)
    }

    /// Moves the active drag to a total pointer delta.
    pub fn drag_to(&mut self, delta_x: f64) {
        let Some(Edit::Drag(session)) = &mut self.edit else {
            return;
        };
        session.update(delta_x);
        let preview = session.preview().clone();
        self.layout.set_override(preview);
    }

    /// Starts drawing a new bar on `row_id` at `date`.
    pub fn begin_create(&mut self, row_id: &str, date: NaiveDate) -> Result<&Bar> {
        self.cancel_edit();
        let bar = self.creating_bar(row_id, date, 0.0)?;
        self.layout.set_override(bar.clone());
        self.edit = Some(Edit::Create { date, bar });
        self.layout.try_bar(row_id)
    }

    /// Resizes the bar being drawn.
    pub fn drag_create_to(&mut self, width_px: f64) -> Result<()> {
        let Some(Edit::Create { date, bar }) = &self.edit else {
            return Ok(());
        };
        let (date, row_id) = (*date, bar.owner_row_id.clone());
        let bar = self.creating_bar(&row_id, date, width_px)?;
        self.layout.set_override(bar.clone());
        self.edit = Some(Edit::Create { date, bar });
        Ok(())
    }

    fn creating_bar(&self, row_id: &str, date: NaiveDate, width_px: f64) -> Result<Bar> {
        let slice = self
            .rows
            .index_of(row_id)
            .and_then(|i| self.row_window.slice(i))
            .ok_or_else(|| GanttError::RowNotFound {
                row_id: row_id.into(),
            })?;
        create_bar(
            &self.rows,
            row_id,
            width_px,
            date,
            &slice,
            &self.date_window,
            &self.options.layout_params(),
        )
    }

    /// Ends the active drag or creation.
    ///
    /// The snapped proposal is handed to `on_change` together with the record behind the bar;
    /// group rows have no record and only return the proposal. The preview is dropped either
    /// way: the host applies the change to its data and calls [`Controller::set_rows`].
    pub fn finish_edit(
        &mut self,
        on_change: impl FnOnce(&T, &BarChange),
    ) -> Result<Option<BarChange>> {
        let Some(edit) = self.edit.take() else {
            return Ok(None);
        };
        self.layout.clear_override();
        let origin = self.date_window.origin_start;
        let change = match edit {
            Edit::Drag(session) => session.finish(&self.editor, origin),
            Edit::Create { bar, .. } => self.editor.on_resize_end(&bar, origin),
        };
        let Some(row) = self.rows.get(&change.row_id) else {
            gwarn!(row_id = %change.row_id, "finish_edit: row not found");
            return Err(GanttError::RowNotFound {
                row_id: change.row_id,
            });
        };
        if let Some(record) = self.rows.record_of(row) {
            on_change(record, &change);
        }
        Ok(Some(change))
    }

    pub fn cancel_edit(&mut self) {
        if self.edit.take().is_some() {
            self.layout.clear_override();
        }
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    /// Decorations for the visible day columns.
    pub fn day_decorations<Tag: PartialEq>(
        &self,
        alert: impl Fn(NaiveDate) -> Option<Tag>,
        current_alert: Option<&Tag>,
    ) -> Vec<DayDecoration<Tag>> {
        self.decorator.decorate(
            &self.date_window,
            self.visible_days(),
            self.options.cell_width,
            alert,
            current_alert,
        )
    }

    fn rebuild_header(&mut self) {
        self.header = build_header(
            &self.options.mode,
            self.date_window.start_at,
            self.date_window.end_at,
            self.options.cell_width,
            self.options.week_starts_monday,
        );
    }

    fn request_layout(&mut self, reason: LayoutReason, now_ms: u64) {
        self.deferred.submit(
            LayoutRequest {
                reason,
                requested_ms: now_ms,
            },
            now_ms,
        );
    }

    fn relayout(&mut self, _reason: LayoutReason) {
        self.deferred.cancel();
        let slices = self.row_window.slices();
        self.layout = ScheduleLayout::compute(
            &self.rows,
            &slices,
            &self.date_window,
            &self.accessors,
            &self.groups,
            &self.options.layout_params(),
        );
        gtrace!(
            reason = ?_reason,
            bars = self.layout.bars().len(),
            edges = self.layout.edges().len(),
            "Controller::relayout"
        );
        match &self.edit {
            Some(Edit::Drag(s)) => self.layout.set_override(s.preview().clone()),
            Some(Edit::Create { bar, .. }) => self.layout.set_override(bar.clone()),
            None => {}
        }
    }
}

fn row_window_options<T>(rows: &RowSet<T>, options: &GanttOptions) -> WindowOptions {
    WindowOptions::from_sizes(rows.row_sizes(
        options.row_height,
        options.group_gap,
        options.has_first_group_gap,
    ))
    .with_overscan(options.overscan)
    .with_padding(0, options.last_group_gap)
}

impl<T> core::fmt::Debug for Controller<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("date_window", &self.date_window)
            .field("scroll", &self.scroll_state())
            .field("rows", &self.rows.len())
            .field("bars", &self.layout.bars().len())
            .field("infinite", &self.infinite)
            .field("layout_pending", &self.deferred.is_pending())
            .finish_non_exhaustive()
    }
}
