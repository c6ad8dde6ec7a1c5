use alloc::vec::Vec;
use core::cmp;

/// Cumulative pixel offsets over per-item sizes.
///
/// A binary indexed tree: `O(log n)` point updates and prefix queries, and `O(log n)` offset to
/// index search. Appending and truncating keep the existing nodes, so growing a row set does not
/// rebuild the whole index.
#[derive(Clone, Debug, Default)]
pub(crate) struct PrefixSums {
    nodes: Vec<u64>, // 1-indexed, nodes[0] unused
    total: u64,
    top_bit: usize,
}

impl PrefixSums {
    pub(crate) fn from_sizes(sizes: &[u32]) -> Self {
        let n = sizes.len();
        let mut nodes = alloc::vec![0u64; n + 1];
        let mut total = 0u64;
        for i in 1..=n {
            let v = sizes[i - 1] as u64;
            total = total.saturating_add(v);
            nodes[i] = nodes[i].saturating_add(v);
            let parent = i + low_bit(i);
            if parent <= n {
                nodes[parent] = nodes[parent].saturating_add(nodes[i]);
            }
        }
        Self {
            nodes,
            total,
            top_bit: top_bit_for(n),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub(crate) fn total(&self) -> u64 {
        self.total
    }

    /// Appends one size. The new node covers `low_bit(n)` trailing values, the earlier of which
    /// are recovered from existing prefix sums.
    pub(crate) fn push(&mut self, size: u32) {
        let n = self.len() + 1;
        let covered_from = n - low_bit(n);
        let tail = self
            .prefix(n - 1)
            .saturating_sub(self.prefix(covered_from));
        self.nodes.push(tail.saturating_add(size as u64));
        self.total = self.total.saturating_add(size as u64);
        self.top_bit = top_bit_for(n);
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        if len >= self.len() {
            return;
        }
        self.total = self.prefix(len);
        self.nodes.truncate(len + 1);
        self.top_bit = top_bit_for(len);
    }

    /// Adds `delta` to the size at `index`.
    pub(crate) fn add(&mut self, index: usize, delta: i64) {
        let n = self.len();
        if index >= n || delta == 0 {
            return;
        }
        self.total = apply_delta(self.total, delta);
        let mut i = index + 1;
        while i <= n {
            self.nodes[i] = apply_delta(self.nodes[i], delta);
            i += low_bit(i);
        }
    }

    /// Sum of the first `count` sizes.
    pub(crate) fn prefix(&self, count: usize) -> u64 {
        let mut i = cmp::min(count, self.len());
        let mut sum = 0u64;
        while i > 0 {
            sum = sum.saturating_add(self.nodes[i]);
            i &= i - 1;
        }
        sum
    }

    /// Number of leading items whose cumulative size is `<= offset`.
    ///
    /// For an offset inside item `k` this returns `k`; callers clamp to `len - 1` for offsets
    /// at or past the end.
    pub(crate) fn items_before(&self, mut offset: u64) -> usize {
        let n = self.len();
        let mut idx = 0usize;
        let mut bit = self.top_bit;
        while bit != 0 {
            let next = idx + bit;
            if next <= n && self.nodes[next] <= offset {
                offset -= self.nodes[next];
                idx = next;
            }
            bit >>= 1;
        }
        idx
    }
}

fn apply_delta(value: u64, delta: i64) -> u64 {
    if delta >= 0 {
        value.saturating_add(delta as u64)
    } else {
        value.saturating_sub(delta.unsigned_abs())
    }
}

fn low_bit(i: usize) -> usize {
    i & i.wrapping_neg()
}

fn top_bit_for(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        1usize << (usize::BITS - 1 - n.leading_zeros())
    }
}
