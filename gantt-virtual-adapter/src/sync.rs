use alloc::vec::Vec;

/// Host-chosen id of a scrollable region (header, body, scrollbar proxy, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Region {
    id: RegionId,
    content: u64,
    viewport: u32,
    offset: u64,
    /// Offset we last pushed to this region and have not seen echoed back yet.
    echo: Option<u64>,
}

impl Region {
    fn max_scroll(&self) -> u64 {
        self.content.saturating_sub(self.viewport as u64)
    }
}

/// An offset the host must apply to a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MirrorUpdate {
    pub region: RegionId,
    pub offset: u64,
}

/// Mirrors the scroll offset of one region onto every other attached region.
///
/// With `proportional` the source's scroll fraction is mapped onto each target's own scrollable
/// range; otherwise the raw offset is copied (clamped). Offsets pushed to a region are remembered
/// so that the scroll event the host fires when applying them is swallowed instead of being
/// mirrored back.
#[derive(Clone, Debug)]
pub struct ScrollSync {
    regions: Vec<Region>,
    proportional: bool,
}

impl Default for ScrollSync {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ScrollSync {
    pub fn new(proportional: bool) -> Self {
        Self {
            regions: Vec::new(),
            proportional,
        }
    }

    /// Adds a region, or updates its extents when already attached.
    pub fn attach(&mut self, id: RegionId, content: u64, viewport: u32) {
        if let Some(r) = self.regions.iter_mut().find(|r| r.id == id) {
            r.content = content;
            r.viewport = viewport;
            return;
        }
        gdebug!(region = id.0, content, viewport, "ScrollSync::attach");
        self.regions.push(Region {
            id,
            content,
            viewport,
            offset: 0,
            echo: None,
        });
    }

    pub fn detach(&mut self, id: RegionId) {
        self.regions.retain(|r| r.id != id);
    }

    /// Drops every region.
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn offset(&self, id: RegionId) -> Option<u64> {
        self.regions.iter().find(|r| r.id == id).map(|r| r.offset)
    }

    /// Handles a scroll event reported for `source`.
    ///
    /// Returns the offsets the host must apply to the other regions. An event that merely
    /// echoes an offset pushed by an earlier call returns nothing.
    pub fn on_scroll(&mut self, source: RegionId, offset: u64) -> Vec<MirrorUpdate> {
        let Some(src) = self.regions.iter_mut().find(|r| r.id == source) else {
            gwarn!(region = source.0, "ScrollSync: scroll from unknown region");
            return Vec::new();
        };
        src.offset = offset;
        if src.echo.take() == Some(offset) {
            return Vec::new();
        }
        let src_max = src.max_scroll();
        let fraction = if src_max == 0 {
            0.0
        } else {
            (offset.min(src_max) as f64) / src_max as f64
        };

        let proportional = self.proportional;
        let mut updates = Vec::new();
        for r in self.regions.iter_mut().filter(|r| r.id != source) {
            let target = if proportional {
                (fraction * r.max_scroll() as f64 + 0.5) as u64
            } else {
                offset.min(r.max_scroll())
            };
            if target == r.offset {
                continue;
            }
            r.offset = target;
            r.echo = Some(target);
            updates.push(MirrorUpdate {
                region: r.id,
                offset: target,
            });
        }
        gtrace!(
            region = source.0,
            offset,
            mirrored = updates.len(),
            "ScrollSync::on_scroll"
        );
        updates
    }
}
