//! Adapter utilities for the `gantt-virtual` crate.
//!
//! `gantt-virtual` is UI-agnostic and stateless where it can be. This crate provides the
//! stateful, framework-neutral pieces a Gantt host usually needs on top of it:
//!
//! - Bidirectional infinite horizontal scrolling (edge-triggered date window shifts)
//! - Scroll mirroring between regions (header, body, scrollbar proxies)
//! - Throttled, coalesced recomputation of bars and edges after scrolling
//! - Date and row anchoring across window, cell width and row set changes
//! - Tween-based smooth scrolling
//! - A [`Controller`] wiring all of the above to one set of host events
//!
//! Time is always passed in by the host as milliseconds; nothing here reads a clock.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod anchor;
mod controller;
mod deferred;
mod infinite;
mod sync;
mod tween;


pub use anchor::{
    DateAnchor, RowAnchor, apply_date_anchor, apply_row_anchor, capture_date_anchor,
    capture_first_visible_row,
};
pub use controller::{Controller, Frame, LayoutReason, LayoutRequest, ScrollOutcome};
pub use deferred::{DeferredSlot, Throttle};
pub use infinite::{
    ANCHOR_LEAD_CELLS, InfiniteScroll, ScrollEdge, ScrollPhase, WindowShift, anchor_scroll,
    recenter,
};
pub use sync::{MirrorUpdate, RegionId, ScrollSync};
pub use tween::{Easing, ScrollState, Tween};
