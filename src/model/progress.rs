use crate::model::StationId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-order record of which stations released the order and which line items were
/// checked off at which station.
///
/// The current station of an order is never stored; it is derived from `bumped` by
/// [`is_visible`](crate::pipeline::is_visible).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineProgress {
    bumped: BTreeSet<StationId>,
    item_done: BTreeSet<(StationId, usize)>,
}

impl PipelineProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add-if-absent. Returns `false` when the station had already bumped the order.
    pub fn mark_bumped(&mut self, station: StationId) -> bool {
        self.bumped.insert(station)
    }

    pub fn is_bumped(&self, station: StationId) -> bool {
        self.bumped.contains(&station)
    }

    pub fn bumped(&self) -> impl Iterator<Item = StationId> + '_ {
        self.bumped.iter().copied()
    }

    /// Flips the done flag of one line item at one station and returns the new flag.
    pub fn toggle_item(&mut self, station: StationId, index: usize) -> bool {
        if self.item_done.remove(&(station, index)) {
            false
        } else {
            self.item_done.insert((station, index));
            true
        }
    }

    pub fn is_item_done(&self, station: StationId, index: usize) -> bool {
        self.item_done.contains(&(station, index))
    }
}
