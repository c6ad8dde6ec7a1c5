use alloc::sync::Arc;

/// Size of the item at an index, in pixels along the scroll axis.
pub type SizeFn = Arc<dyn Fn(usize) -> u32 + Send + Sync>;

/// Configuration for [`crate::Window`].
///
/// Cheap to clone: the size function is shared through an `Arc`.
pub struct WindowOptions {
    pub count: usize,
    /// Per-index size. Rows that open a group may return a larger value to reserve the gap.
    pub size_of: SizeFn,
    /// Items materialized beyond each side of the viewport.
    pub overscan: usize,
    /// Space before the first item.
    pub padding_start: u32,
    /// Space after the last item (e.g. a trailing group gap).
    pub padding_end: u32,
}

impl Clone for WindowOptions {
    fn clone(&self) -> Self {
        Self {
            count: self.count,
            size_of: Arc::clone(&self.size_of),
            overscan: self.overscan,
            padding_start: self.padding_start,
            padding_end: self.padding_end,
        }
    }
}

impl WindowOptions {
    pub fn new(count: usize, size_of: impl Fn(usize) -> u32 + Send + Sync + 'static) -> Self {
        Self {
            count,
            size_of: Arc::new(size_of),
            overscan: 5,
            padding_start: 0,
            padding_end: 0,
        }
    }

    /// Options for a fixed list of sizes (e.g. table column widths).
    pub fn from_sizes(sizes: impl Into<Arc<[u32]>>) -> Self {
        let sizes: Arc<[u32]> = sizes.into();
        let count = sizes.len();
        Self::new(count, move |i| sizes.get(i).copied().unwrap_or(0))
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_padding(mut self, padding_start: u32, padding_end: u32) -> Self {
        self.padding_start = padding_start;
        self.padding_end = padding_end;
        self
    }

    pub fn with_size_of(mut self, size_of: impl Fn(usize) -> u32 + Send + Sync + 'static) -> Self {
        self.size_of = Arc::new(size_of);
        self
    }
}

impl core::fmt::Debug for WindowOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WindowOptions")
            .field("count", &self.count)
            .field("overscan", &self.overscan)
            .field("padding_start", &self.padding_start)
            .field("padding_end", &self.padding_end)
            .finish_non_exhaustive()
    }
}
