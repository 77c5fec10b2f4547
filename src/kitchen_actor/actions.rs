//! Custom actions for the Kitchen actor.
//!
//! Every station and pipeline mutation of a venue is one of these actions, so the
//! actor's sequential loop is the single point where they are ordered. They are handled
//! by [`ActorEntity::handle_action`](crate::framework::ActorEntity::handle_action) on
//! [`Kitchen`](super::Kitchen).

use crate::model::{Order, OrderId, Station, StationDraft, StationId};
use crate::pipeline::{BumpOutcome, Reconciliation, Ticket};
use crate::sync::KitchenSnapshot;
use crate::urgency::UrgencyConfig;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum KitchenAction {
    CreateStation(StationDraft),
    RenameStation { station: StationId, name: String },
    RecolorStation { station: StationId, color: String },
    RepositionStation { station: StationId, position: i64 },
    DeleteStation(StationId),
    /// Replace the active set with what the order feed currently lists.
    SyncOrders(Vec<Order>),
    Bump { order: OrderId, station: StationId },
    ToggleItem {
        order: OrderId,
        station: StationId,
        index: usize,
    },

    // Read-only: answered from the actor without copying the whole kitchen.
    Snapshot,
    ListStations,
    IsVisible { order: OrderId, station: StationId },
    AllItemsDone { order: OrderId, station: StationId },
    Tickets {
        station: StationId,
        now: DateTime<Utc>,
        thresholds: UrgencyConfig,
    },
}

/// Results from KitchenActions - variants match 1:1 with KitchenAction
#[derive(Debug, Clone, PartialEq)]
pub enum KitchenActionResult {
    CreateStation(Station),
    RenameStation(Station),
    RecolorStation(Station),
    RepositionStation(Station),
    DeleteStation(StationRemoval),
    SyncOrders(SyncSummary),
    Bump(BumpOutcome),
    /// The item's new done flag.
    ToggleItem(bool),
    Snapshot(KitchenSnapshot),
    ListStations(Vec<Station>),
    IsVisible(bool),
    AllItemsDone(bool),
    Tickets(Vec<Ticket>),
}

/// A deleted station and the orders it released on the way out.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRemoval {
    pub station: Station,
    pub released: Vec<OrderId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncSummary {
    pub reconciliation: Reconciliation,
    /// Size of the active set after reconciling.
    pub active: usize,
}
