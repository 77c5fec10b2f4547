//! # Order Feed
//!
//! The kitchen does not own orders. It reads the active set from an [`OrderFeed`] and
//! pushes status changes back to it when a bump exhausts the pipeline.

pub mod memory;
pub mod poller;
pub mod retry;

pub use memory::InMemoryOrderFeed;
pub use poller::{FeedPoller, PollError};
pub use retry::{advance_with_retry, spawn_status_push, RetryConfig};

use crate::model::{Order, OrderId, OrderStatus, VenueId};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FeedError {
    /// The order is already at or past the requested status, or gone. Benign.
    #[error("Status conflict: {0}")]
    Conflict(String),

    /// The feed could not serve the request right now; worth retrying.
    #[error("Feed unavailable: {0}")]
    Transient(String),
}

/// Source of truth for order content and status.
#[async_trait]
pub trait OrderFeed: Send + Sync {
    /// Orders of the venue that are currently in a kitchen status.
    async fn active_orders(&self, venue: &VenueId) -> Result<Vec<Order>, FeedError>;

    /// Compare-and-set of an order's status from `from` to `to`.
    async fn advance_status(
        &self,
        order_id: &OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), FeedError>;
}
