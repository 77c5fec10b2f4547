//! In-process order feed used by the demo binary and the tests.

use super::{FeedError, OrderFeed};
use crate::model::{Order, OrderId, OrderStatus, VenueId};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Orders kept in memory, grouped by venue.
#[derive(Debug, Default)]
pub struct InMemoryOrderFeed {
    venues: Mutex<HashMap<VenueId, BTreeMap<OrderId, Order>>>,
    failures: AtomicU32,
}

impl InMemoryOrderFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn venues(&self) -> MutexGuard<'_, HashMap<VenueId, BTreeMap<OrderId, Order>>> {
        self.venues.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds or replaces an order.
    pub fn place(&self, venue: &VenueId, order: Order) {
        self.venues()
            .entry(venue.clone())
            .or_default()
            .insert(order.id.clone(), order);
    }

    /// Hands the order to the customer.
    pub fn pickup(&self, order_id: &OrderId) -> bool {
        self.finish(order_id, OrderStatus::Completed)
    }

    pub fn cancel(&self, order_id: &OrderId) -> bool {
        self.finish(order_id, OrderStatus::Cancelled)
    }

    pub fn status(&self, order_id: &OrderId) -> Option<OrderStatus> {
        self.venues()
            .values()
            .find_map(|orders| orders.get(order_id))
            .map(|order| order.status)
    }

    /// Makes the next `count` calls fail with a transient error.
    pub fn fail_next(&self, count: u32) {
        self.failures.store(count, Ordering::SeqCst);
    }

    fn finish(&self, order_id: &OrderId, status: OrderStatus) -> bool {
        let mut venues = self.venues();
        match venues.values_mut().find_map(|orders| orders.get_mut(order_id)) {
            Some(order) => {
                order.status = status;
                true
            }
            None => false,
        }
    }

    fn injected_failure(&self) -> Result<(), FeedError> {
        let consumed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1));
        match consumed {
            Ok(_) => Err(FeedError::Transient("injected failure".into())),
            Err(_) => Ok(()),
        }
    }
}

#[async_trait]
impl OrderFeed for InMemoryOrderFeed {
    async fn active_orders(&self, venue: &VenueId) -> Result<Vec<Order>, FeedError> {
        self.injected_failure()?;
        Ok(self
            .venues()
            .get(venue)
            .map(|orders| {
                orders
                    .values()
                    .filter(|order| order.status.is_active())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Moves `from -> to` only when the order is at `from`. An order that is already at
    /// or past `to` is a conflict; one still behind `from` is reported as transient so
    /// an earlier push that is still in flight can land first.
    async fn advance_status(
        &self,
        order_id: &OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), FeedError> {
        self.injected_failure()?;
        let mut venues = self.venues();
        let order = venues
            .values_mut()
            .find_map(|orders| orders.get_mut(order_id))
            .ok_or_else(|| FeedError::Conflict(format!("unknown order {order_id}")))?;

        if order.status == from {
            order.status = to;
            Ok(())
        } else if order.status.furthest(to) == order.status {
            Err(FeedError::Conflict(format!(
                "order {order_id} is already {}",
                order.status
            )))
        } else {
            Err(FeedError::Transient(format!(
                "order {order_id} is still {}, expected {from}",
                order.status
            )))
        }
    }
}
