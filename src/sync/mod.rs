//! # Synchronization
//!
//! Fans committed kitchen changes out to every display of a venue.
//!
//! The [`Kitchen`](crate::kitchen_actor::Kitchen) actor is the only writer: displays send
//! intents through the [`KitchenClient`](crate::clients::KitchenClient), the actor
//! commits them one at a time and publishes each resulting [`Delta`] on the venue's
//! broadcast channel. A [`Subscription`] starts from a [`KitchenSnapshot`] and then
//! follows the deltas; a [`DisplayMirror`] applies both to a local replica.

pub mod mirror;
pub mod subscription;

pub use mirror::DisplayMirror;
pub use subscription::Subscription;

use crate::model::{OrderId, OrderStatus, PipelineProgress, Station, VenueId};
use crate::pipeline::ActiveOrder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::debug;

/// One committed change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Delta {
    /// The station list after a structural or metadata change.
    Stations { stations: Vec<Station> },
    /// An order's progress and status after a bump or toggle.
    Progress {
        order_id: OrderId,
        status: OrderStatus,
        progress: PipelineProgress,
    },
    /// An order entered the active set or its content changed.
    OrderUpserted { entry: ActiveOrder },
    /// An order left the active set.
    OrderRemoved { order_id: OrderId },
    VenueRenamed { name: String },
    /// The venue's kitchen was closed; no further deltas follow.
    VenueClosed,
}

/// A delta stamped with the venue revision it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub venue: VenueId,
    pub revision: u64,
    pub delta: Delta,
}

/// Full state of a venue at one revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitchenSnapshot {
    pub venue: VenueId,
    pub name: String,
    pub revision: u64,
    pub stations: Vec<Station>,
    pub orders: Vec<ActiveOrder>,
}

/// What a subscriber receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum SyncMessage {
    Snapshot(KitchenSnapshot),
    Delta(Envelope),
}

/// Per-venue broadcast channels.
#[derive(Debug, Clone)]
pub struct SyncHub {
    capacity: usize,
    channels: Arc<Mutex<HashMap<VenueId, broadcast::Sender<Envelope>>>>,
}

impl SyncHub {
    /// Create a hub whose per-venue channels buffer `capacity` envelopes.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<VenueId, broadcast::Sender<Envelope>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to a venue's deltas, creating its channel on first use.
    pub fn subscribe(&self, venue: &VenueId) -> broadcast::Receiver<Envelope> {
        self.channels()
            .entry(venue.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Broadcast an envelope. Returns how many subscribers received it.
    pub fn publish(&self, envelope: Envelope) -> usize {
        let sender = self.channels().get(&envelope.venue).cloned();
        let Some(sender) = sender else {
            return 0;
        };
        let revision = envelope.revision;
        // No receivers is not an error; nobody is watching right now.
        let delivered = sender.send(envelope).unwrap_or(0);
        debug!(revision, delivered, "Delta published");
        delivered
    }

    /// Drops the venue's channel if nobody is subscribed to it any more.
    pub fn release(&self, venue: &VenueId) {
        let mut channels = self.channels();
        if channels
            .get(venue)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            channels.remove(venue);
        }
    }

    pub fn has_channel(&self, venue: &VenueId) -> bool {
        self.channels().contains_key(venue)
    }

    /// Drops the venue's channel. Subscribers drain what is buffered, then see the end
    /// of the stream.
    pub fn close(&self, venue: &VenueId) {
        self.channels().remove(venue);
    }
}
