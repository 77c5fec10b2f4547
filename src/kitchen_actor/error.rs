//! Error types for the Kitchen actor.

use crate::model::{OrderId, StationId, VenueId};
use thiserror::Error;

/// Errors that can occur during kitchen operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum KitchenError {
    /// Deleting this station would leave the venue without any.
    #[error("Cannot delete the last remaining station")]
    LastStation,

    /// The station is not registered for the venue.
    #[error("Station not found: {0}")]
    StationNotFound(StationId),

    /// The order is not (or no longer) in the venue's active set.
    #[error("Order not active: {0}")]
    OrderNotActive(OrderId),

    /// A toggle referenced a line item the order does not have.
    #[error("Item {index} out of range for order {order_id} ({len} items)")]
    ItemOutOfRange {
        order_id: OrderId,
        index: usize,
        len: usize,
    },

    /// The request payload is invalid.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No kitchen is open for the venue.
    #[error("Venue not found: {0}")]
    VenueNotFound(VenueId),

    /// A kitchen is already open for the venue.
    #[error("Venue already open: {0}")]
    VenueExists(VenueId),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunication(String),
}

impl KitchenError {
    /// The precondition-violation family: bad requests that were rejected without
    /// touching shared state.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            KitchenError::LastStation
                | KitchenError::StationNotFound(_)
                | KitchenError::OrderNotActive(_)
                | KitchenError::ItemOutOfRange { .. }
                | KitchenError::Validation(_)
        )
    }
}

impl From<String> for KitchenError {
    fn from(msg: String) -> Self {
        KitchenError::ActorCommunication(msg)
    }
}
