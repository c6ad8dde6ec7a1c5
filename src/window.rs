use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cmp;

use crate::fenwick::PrefixSums;
use crate::{Align, IndexRange, ScrollDirection, VirtualSlice, WindowOptions};

/// A one-dimensional virtualizer over items of non-uniform size.
///
/// Used vertically for rows ([`RowWindow`]) and horizontally for plain table columns
/// ([`ColumnWindow`]). It holds no UI objects: the host reports viewport extent and scroll
/// offset, and reads back the slices to materialize.
///
/// Cumulative offsets live in a prefix-sum index, so a scroll tick is `O(log n)` to locate the
/// first visible item plus `O(k)` for the `k` materialized slices.
#[derive(Clone, Debug)]
pub struct Window {
    options: WindowOptions,
    viewport_size: u32,
    scroll_offset: u64,
    scroll_direction: Option<ScrollDirection>,
    sizes: Vec<u32>,
    sums: PrefixSums,
}

/// Vertical window over chart rows.
pub type RowWindow = Window;

/// Horizontal window over the non-date table columns.
pub type ColumnWindow = Window;

impl Window {
    pub fn new(options: WindowOptions) -> Self {
        gdebug!(
            count = options.count,
            overscan = options.overscan,
            "Window::new"
        );
        let mut w = Self {
            options,
            viewport_size: 0,
            scroll_offset: 0,
            scroll_direction: None,
            sizes: Vec::new(),
            sums: PrefixSums::default(),
        };
        w.refresh_sizes();
        w
    }

    pub fn options(&self) -> &WindowOptions {
        &self.options
    }

    /// Replaces the options. Sizes are re-read only when the count or size function changed.
    pub fn set_options(&mut self, options: WindowOptions) {
        let same_sizes = Arc::ptr_eq(&self.options.size_of, &options.size_of);
        let prev_count = self.options.count;
        self.options = options;
        gtrace!(
            count = self.options.count,
            overscan = self.options.overscan,
            "Window::set_options"
        );
        if !same_sizes {
            self.refresh_sizes();
        } else if self.options.count != prev_count {
            self.resize_count(prev_count);
        }
    }

    pub fn count(&self) -> usize {
        self.options.count
    }

    /// Grows or shrinks the item count, keeping existing sizes and only reading the size
    /// function for appended items.
    pub fn set_count(&mut self, count: usize) {
        if self.options.count == count {
            return;
        }
        let prev = self.options.count;
        self.options.count = count;
        self.resize_count(prev);
    }

    fn resize_count(&mut self, prev: usize) {
        let count = self.options.count;
        if count < prev {
            self.sizes.truncate(count);
            self.sums.truncate(count);
            return;
        }
        self.sizes.reserve(count - prev);
        for i in prev..count {
            let size = (self.options.size_of)(i);
            self.sizes.push(size);
            self.sums.push(size);
        }
    }

    pub fn set_size_of(&mut self, size_of: impl Fn(usize) -> u32 + Send + Sync + 'static) {
        self.options.size_of = Arc::new(size_of);
        self.refresh_sizes();
    }

    /// Re-reads every size from the size function and rebuilds the offset index.
    ///
    /// Call this when the underlying rows change shape (e.g. a group collapses).
    pub fn refresh_sizes(&mut self) {
        gdebug!(count = self.options.count, "Window::refresh_sizes");
        self.sizes.clear();
        self.sizes.reserve_exact(self.options.count);
        for i in 0..self.options.count {
            self.sizes.push((self.options.size_of)(i));
        }
        self.sums = PrefixSums::from_sizes(&self.sizes);
    }

    /// Updates a single size in `O(log n)`.
    ///
    /// When the item starts before the current scroll offset, the scroll offset moves by the
    /// same delta so the content under the viewport does not shift. Returns the applied scroll
    /// adjustment.
    pub fn resize_item(&mut self, index: usize, size: u32) -> i64 {
        let Some(&cur) = self.sizes.get(index) else {
            return 0;
        };
        if cur == size {
            return 0;
        }
        let starts_before = self.start_of(index) < self.scroll_offset;
        let delta = size as i64 - cur as i64;
        self.sizes[index] = size;
        self.sums.add(index, delta);
        if !starts_before {
            return 0;
        }
        self.scroll_offset = if delta > 0 {
            self.scroll_offset.saturating_add(delta as u64)
        } else {
            self.scroll_offset.saturating_sub(delta.unsigned_abs())
        };
        delta
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        self.options.overscan = overscan;
    }

    pub fn set_padding(&mut self, padding_start: u32, padding_end: u32) {
        self.options.padding_start = padding_start;
        self.options.padding_end = padding_end;
    }

    pub fn viewport_size(&self) -> u32 {
        self.viewport_size
    }

    pub fn set_viewport_size(&mut self, size: u32) {
        self.viewport_size = size;
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll_direction
    }

    pub fn set_scroll_offset(&mut self, offset: u64) {
        if self.scroll_offset == offset {
            return;
        }
        self.scroll_direction = Some(if offset > self.scroll_offset {
            ScrollDirection::Forward
        } else {
            ScrollDirection::Backward
        });
        self.scroll_offset = offset;
    }

    pub fn set_scroll_offset_clamped(&mut self, offset: u64) {
        self.set_scroll_offset(self.clamp_scroll_offset(offset));
    }

    pub fn set_viewport_and_scroll(&mut self, viewport_size: u32, scroll_offset: u64) {
        self.set_viewport_size(viewport_size);
        self.set_scroll_offset(scroll_offset);
    }

    pub fn set_viewport_and_scroll_clamped(&mut self, viewport_size: u32, scroll_offset: u64) {
        self.set_viewport_size(viewport_size);
        self.set_scroll_offset_clamped(scroll_offset);
    }

    /// Size of the scrollable content: padding plus every item.
    pub fn total_size(&self) -> u64 {
        self.options.padding_start as u64 + self.sums.total() + self.options.padding_end as u64
    }

    pub fn max_scroll_offset(&self) -> u64 {
        self.total_size()
            .saturating_sub(self.viewport_size as u64)
    }

    pub fn clamp_scroll_offset(&self, offset: u64) -> u64 {
        offset.min(self.max_scroll_offset())
    }

    /// Items intersecting the viewport, without overscan.
    pub fn visible_range(&self) -> IndexRange {
        self.visible_range_for(self.scroll_offset, self.viewport_size)
    }

    /// Items to materialize: the visible range widened by `overscan` on each side.
    pub fn virtual_range(&self) -> IndexRange {
        self.virtual_range_for(self.scroll_offset, self.viewport_size)
    }

    pub fn virtual_range_for(&self, scroll_offset: u64, viewport_size: u32) -> IndexRange {
        let visible = self.visible_range_for(scroll_offset, viewport_size);
        if visible.is_empty() {
            return visible;
        }
        let overscan = self.options.overscan;
        IndexRange {
            start_index: visible.start_index.saturating_sub(overscan),
            end_index: cmp::min(
                self.options.count,
                visible.end_index.saturating_add(overscan),
            ),
        }
    }

    pub fn visible_range_for(&self, scroll_offset: u64, viewport_size: u32) -> IndexRange {
        let count = self.options.count;
        if count == 0 || viewport_size == 0 {
            return IndexRange::EMPTY;
        }

        let view = viewport_size as u64;
        let total = self.total_size();
        let scroll_offset = scroll_offset.min(total.saturating_sub(view));
        let pad = self.options.padding_start as u64;
        let items_end = pad.saturating_add(self.sums.total());
        if scroll_offset >= items_end {
            return IndexRange {
                start_index: count,
                end_index: count,
            };
        }

        let last_px = scroll_offset.saturating_add(view).saturating_sub(1);
        let start = self.index_at(scroll_offset);
        let end = self.index_at(cmp::max(last_px, scroll_offset)) + 1;
        IndexRange {
            start_index: start.min(count),
            end_index: end.min(count),
        }
    }

    /// Calls `f` for every materialized slice, in index order, without allocating.
    pub fn for_each_slice(&self, f: impl FnMut(VirtualSlice)) {
        self.for_each_slice_for(self.scroll_offset, self.viewport_size, f);
    }

    pub fn for_each_slice_for(
        &self,
        scroll_offset: u64,
        viewport_size: u32,
        mut f: impl FnMut(VirtualSlice),
    ) {
        let range = self.virtual_range_for(scroll_offset, viewport_size);
        if range.is_empty() {
            return;
        }
        let mut start = self.start_of(range.start_index);
        for index in range.start_index..range.end_index {
            let size = self.sizes[index];
            f(VirtualSlice { index, start, size });
            start = start.saturating_add(size as u64);
        }
    }

    /// Collects the materialized slices into `out` (cleared first).
    pub fn collect_slices(&self, out: &mut Vec<VirtualSlice>) {
        out.clear();
        self.for_each_slice(|s| out.push(s));
    }

    pub fn slices(&self) -> Vec<VirtualSlice> {
        let mut out = Vec::with_capacity(self.virtual_range().len());
        self.for_each_slice(|s| out.push(s));
        out
    }

    pub fn slice(&self, index: usize) -> Option<VirtualSlice> {
        let size = *self.sizes.get(index)?;
        Some(VirtualSlice {
            index,
            start: self.start_of(index),
            size,
        })
    }

    pub fn item_start(&self, index: usize) -> Option<u64> {
        (index < self.options.count).then(|| self.start_of(index))
    }

    pub fn item_size(&self, index: usize) -> Option<u32> {
        self.sizes.get(index).copied()
    }

    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        (self.options.count > 0).then(|| self.index_at(offset))
    }

    /// Offset that brings `index` into view with the given alignment (clamped).
    pub fn scroll_to_index_offset(&self, index: usize, align: Align) -> u64 {
        let count = self.options.count;
        if count == 0 {
            return 0;
        }
        let Some(item) = self.slice(index.min(count - 1)) else {
            return 0;
        };
        let view = self.viewport_size as u64;
        let target = match align {
            Align::Start => item.start,
            Align::End => item.end().saturating_sub(view),
            Align::Center => item
                .start
                .saturating_add(item.size as u64 / 2)
                .saturating_sub(view / 2),
            Align::Auto => {
                let cur = self.scroll_offset;
                if item.start >= cur && item.end() <= cur.saturating_add(view) {
                    cur
                } else if item.start < cur {
                    item.start
                } else {
                    item.end().saturating_sub(view)
                }
            }
        };
        self.clamp_scroll_offset(target)
    }

    fn start_of(&self, index: usize) -> u64 {
        self.options.padding_start as u64 + self.sums.prefix(index)
    }

    fn index_at(&self, offset: u64) -> usize {
        let pad = self.options.padding_start as u64;
        let count = self.options.count;
        if offset < pad || count == 0 {
            return 0;
        }
        self.sums
            .items_before(offset - pad)
            .min(count.saturating_sub(1))
    }
}
