use super::{Envelope, KitchenSnapshot, SyncMessage};
use crate::clients::KitchenClient;
use crate::kitchen_actor::KitchenError;
use crate::model::VenueId;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

/// A display's view of one venue: a snapshot first, then the deltas committed after it.
///
/// The broadcast receiver is opened before the snapshot is requested, so no delta can
/// fall between the two; deltas the snapshot already contains are skipped by revision.
/// When the subscriber falls behind the channel, it is handed a fresh snapshot instead
/// of the deltas it missed.
pub struct Subscription {
    venue: VenueId,
    client: KitchenClient,
    receiver: broadcast::Receiver<Envelope>,
    revision: u64,
    pending: Option<KitchenSnapshot>,
}

impl Subscription {
    pub async fn open(client: KitchenClient, venue: VenueId) -> Result<Self, KitchenError> {
        let receiver = client.hub().subscribe(&venue);
        let snapshot = match client.snapshot(&venue).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                drop(receiver);
                client.hub().release(&venue);
                return Err(e);
            }
        };
        debug!(%venue, revision = snapshot.revision, "Subscribed");
        Ok(Self {
            venue,
            client,
            receiver,
            revision: snapshot.revision,
            pending: Some(snapshot),
        })
    }

    pub fn venue(&self) -> &VenueId {
        &self.venue
    }

    /// Revision of the last message handed out.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Next message, or `None` once the venue is closed or cannot be resynced.
    pub async fn next(&mut self) -> Option<SyncMessage> {
        if let Some(snapshot) = self.pending.take() {
            return Some(SyncMessage::Snapshot(snapshot));
        }
        loop {
            match self.receiver.recv().await {
                Ok(envelope) if envelope.revision <= self.revision => continue,
                Ok(envelope) => {
                    self.revision = envelope.revision;
                    return Some(SyncMessage::Delta(envelope));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(venue = %self.venue, skipped, "Subscriber lagged, resyncing");
                    return match self.resync().await {
                        Ok(snapshot) => Some(SyncMessage::Snapshot(snapshot)),
                        Err(e) => {
                            warn!(venue = %self.venue, "Resync failed: {}", e);
                            None
                        }
                    };
                }
                Err(RecvError::Closed) => {
                    debug!(venue = %self.venue, "Sync channel closed");
                    return None;
                }
            }
        }
    }

    /// Fetches a fresh snapshot and continues from its revision.
    pub async fn resync(&mut self) -> Result<KitchenSnapshot, KitchenError> {
        let snapshot = self.client.snapshot(&self.venue).await?;
        self.revision = snapshot.revision;
        Ok(snapshot)
    }
}
