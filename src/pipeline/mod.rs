//! # Pipeline State Engine
//!
//! The [`Board`] holds every active order of one venue together with its
//! [`PipelineProgress`]. It answers visibility questions, applies bumps and item toggles,
//! reconciles against the order feed, and absorbs structural changes of the registry.
//!
//! The board is plain data. Serialization of concurrent requests is the job of the
//! [`Kitchen`](crate::kitchen_actor::Kitchen) actor that owns it, and publishing the
//! resulting deltas is the job of the [`SyncHub`](crate::sync::SyncHub).

pub mod ticket;
pub mod visibility;

pub use ticket::{Ticket, TicketItem};
pub use visibility::{all_items_done, is_visible};

use crate::kitchen_actor::KitchenError;
use crate::model::{Order, OrderId, OrderStatus, PipelineProgress, Station, StationId};
use crate::registry::{Frontier, Topology};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// An order in the active set with its pipeline progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveOrder {
    pub order: Order,
    pub progress: PipelineProgress,
}

impl ActiveOrder {
    pub fn new(order: Order) -> Self {
        Self {
            order,
            progress: PipelineProgress::new(),
        }
    }

    /// Moves the status one step forward. `None` when it was already clamped.
    fn advance_status(&mut self) -> Option<StatusAdvance> {
        let from = self.order.status;
        let to = from.advanced();
        if to == from {
            return None;
        }
        self.order.status = to;
        Some(StatusAdvance { from, to })
    }
}

/// A status change the feed must be told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusAdvance {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// What a bump did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BumpOutcome {
    /// `false` when the station had already bumped the order; nothing else happened.
    pub changed: bool,
    /// The bump exhausted the pipeline (expo, or the last prep station).
    pub exhausted: bool,
    pub advance: Option<StatusAdvance>,
}

/// Result of reconciling the board with the feed's active set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub activated: Vec<OrderId>,
    pub refreshed: Vec<OrderId>,
    pub removed: Vec<OrderId>,
    /// Orders the feed lists at an earlier status than the board holds.
    pub lagging: Vec<FeedLag>,
}

impl Reconciliation {
    /// Whether the active set or any order's content changed. Lagging statuses do not
    /// count; they change nothing on the board.
    pub fn is_empty(&self) -> bool {
        self.activated.is_empty() && self.refreshed.is_empty() && self.removed.is_empty()
    }
}

/// The push that would bring the feed's status up to the board's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLag {
    pub order_id: OrderId,
    pub advance: StatusAdvance,
}

/// An order whose progress was changed by a registry mutation rather than by an
/// operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplicitBump {
    pub order_id: OrderId,
    pub advance: Option<StatusAdvance>,
}

#[derive(Debug, Clone, Default)]
pub struct Board {
    orders: BTreeMap<OrderId, ActiveOrder>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &OrderId) -> Option<&ActiveOrder> {
        self.orders.get(id)
    }

    pub fn orders(&self) -> impl Iterator<Item = &ActiveOrder> {
        self.orders.values()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Orders currently shown at `station`.
    pub fn visible_at<'a>(
        &'a self,
        station: &'a Station,
        topology: &'a Topology,
    ) -> impl Iterator<Item = &'a ActiveOrder> + 'a {
        self.orders
            .values()
            .filter(move |active| is_visible(&active.progress, station, topology))
    }

    /// Records that `station` released the order.
    ///
    /// The set insertion is the add-if-absent step: a second bump of the same pair finds
    /// the station present and returns an unchanged outcome without evaluating
    /// exhaustion again.
    pub fn bump(
        &mut self,
        order_id: &OrderId,
        station_id: StationId,
        topology: &Topology,
    ) -> Result<BumpOutcome, KitchenError> {
        let station = topology
            .station(station_id)
            .ok_or(KitchenError::StationNotFound(station_id))?;
        let active = self
            .orders
            .get_mut(order_id)
            .ok_or_else(|| KitchenError::OrderNotActive(order_id.clone()))?;

        if !active.progress.mark_bumped(station_id) {
            debug!(order = %order_id, station = %station_id, "Duplicate bump ignored");
            return Ok(BumpOutcome::default());
        }

        let exhausted = topology.exhausts(station);
        let advance = if exhausted {
            active.advance_status()
        } else {
            None
        };
        info!(order = %order_id, station = %station_id, exhausted, "Bumped");
        Ok(BumpOutcome {
            changed: true,
            exhausted,
            advance,
        })
    }

    /// Flips the done flag of one line item at one station; returns the new flag.
    pub fn toggle_item(
        &mut self,
        order_id: &OrderId,
        station_id: StationId,
        index: usize,
        topology: &Topology,
    ) -> Result<bool, KitchenError> {
        if topology.station(station_id).is_none() {
            return Err(KitchenError::StationNotFound(station_id));
        }
        let active = self
            .orders
            .get_mut(order_id)
            .ok_or_else(|| KitchenError::OrderNotActive(order_id.clone()))?;
        let len = active.order.items.len();
        if index >= len {
            return Err(KitchenError::ItemOutOfRange {
                order_id: order_id.clone(),
                index,
                len,
            });
        }
        Ok(active.progress.toggle_item(station_id, index))
    }

    /// Aligns the board with the feed's active set.
    ///
    /// New orders start with empty progress, missing orders are torn down, and listed
    /// orders take the feed's content. The kept status is the later of the feed's and
    /// the board's, so a status push still in flight is not undone by a stale read.
    pub fn reconcile(&mut self, orders: Vec<Order>) -> Reconciliation {
        let incoming: BTreeMap<OrderId, Order> = orders
            .into_iter()
            .filter(|order| order.status.is_active())
            .map(|order| (order.id.clone(), order))
            .collect();

        let mut outcome = Reconciliation::default();
        self.orders.retain(|id, _| {
            let keep = incoming.contains_key(id);
            if !keep {
                outcome.removed.push(id.clone());
            }
            keep
        });

        for (id, mut order) in incoming {
            match self.orders.get_mut(&id) {
                Some(active) => {
                    let listed = order.status;
                    order.status = active.order.status.furthest(listed);
                    if order.status != listed {
                        outcome.lagging.push(FeedLag {
                            order_id: id.clone(),
                            advance: StatusAdvance {
                                from: listed,
                                to: order.status,
                            },
                        });
                    }
                    if active.order != order {
                        active.order = order;
                        outcome.refreshed.push(id);
                    }
                }
                None => {
                    self.orders.insert(id.clone(), ActiveOrder::new(order));
                    outcome.activated.push(id);
                }
            }
        }
        outcome
    }

    /// Applies the deletion of `station` to every active order that has not bumped it.
    ///
    /// `before` is the topology the station was still part of. Orders that were shown
    /// at the station are released exactly as if it had bumped them, exhaustion
    /// included.
    pub fn retire_station(&mut self, station: &Station, before: &Topology) -> Vec<ImplicitBump> {
        let exhausts = before.exhausts(station);
        let mut released = Vec::new();
        for (id, active) in self.orders.iter_mut() {
            if active.progress.is_bumped(station.id) {
                continue;
            }
            let resident = is_visible(&active.progress, station, before);
            active.progress.mark_bumped(station.id);
            let advance = if resident && exhausts {
                active.advance_status()
            } else {
                None
            };
            released.push(ImplicitBump {
                order_id: id.clone(),
                advance,
            });
        }
        info!(station = %station.id, released = released.len(), "Station retired");
        released
    }

    /// Applies the arrival (or move) of `station` so no order is pulled backwards.
    ///
    /// A prep station is implicitly bumped for orders that cleared the chain under
    /// `before`, and for started orders whose frontier under `before` sits after its slot
    /// in `after`. Orders no prep station has bumped yet simply meet it in turn. An expo
    /// station is implicitly bumped for orders that already passed an expo station.
    pub fn admit_station(
        &mut self,
        station: &Station,
        before: &Topology,
        after: &Topology,
    ) -> Vec<ImplicitBump> {
        let mut admitted = Vec::new();
        for (id, active) in self.orders.iter_mut() {
            let progress = &mut active.progress;
            if progress.is_bumped(station.id) {
                continue;
            }
            let passed = if station.is_expo {
                before
                    .expo_stations()
                    .iter()
                    .any(|expo| progress.is_bumped(*expo))
            } else {
                match before.frontier(progress) {
                    Frontier::Cleared => true,
                    frontier => {
                        let started = before
                            .prep_chain()
                            .iter()
                            .any(|id| *id != station.id && progress.is_bumped(*id));
                        started && after.precedes(station.id, frontier)
                    }
                }
            };
            if passed {
                progress.mark_bumped(station.id);
                admitted.push(ImplicitBump {
                    order_id: id.clone(),
                    advance: None,
                });
            }
        }
        if !admitted.is_empty() {
            debug!(station = %station.id, orders = admitted.len(), "Station implicitly bumped");
        }
        admitted
    }

    /// Replaces or inserts one order as received from a sync delta.
    pub fn upsert(&mut self, active: ActiveOrder) {
        self.orders.insert(active.order.id.clone(), active);
    }

    /// Applies a progress delta. Unknown orders are ignored.
    pub fn apply_progress(&mut self, id: &OrderId, status: OrderStatus, progress: PipelineProgress) {
        if let Some(active) = self.orders.get_mut(id) {
            active.order.status = status;
            active.progress = progress;
        }
    }

    pub fn remove(&mut self, id: &OrderId) -> Option<ActiveOrder> {
        self.orders.remove(id)
    }
}
