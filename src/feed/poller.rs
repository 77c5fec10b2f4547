//! Keeps one venue's board in step with the order feed.

use super::{FeedError, OrderFeed};
use crate::clients::KitchenClient;
use crate::kitchen_actor::{KitchenError, SyncSummary};
use crate::model::VenueId;
use crate::urgency::{AlertSink, NewOrderDetector};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Kitchen(#[from] KitchenError),
}

/// Polls the feed for a venue, reconciles the board and raises new-order alerts.
pub struct FeedPoller {
    venue: VenueId,
    client: KitchenClient,
    feed: Arc<dyn OrderFeed>,
    alerts: Arc<dyn AlertSink>,
    interval: Duration,
    detector: NewOrderDetector,
}

impl FeedPoller {
    pub fn new(
        venue: VenueId,
        client: KitchenClient,
        feed: Arc<dyn OrderFeed>,
        alerts: Arc<dyn AlertSink>,
        interval: Duration,
    ) -> Self {
        Self {
            venue,
            client,
            feed,
            alerts,
            interval,
            detector: NewOrderDetector::new(),
        }
    }

    /// One poll: fetch the active set, hand it to the kitchen, report alerts.
    pub async fn poll_once(&mut self) -> Result<SyncSummary, PollError> {
        let orders = self.feed.active_orders(&self.venue).await?;
        let summary = self.client.sync_orders(&self.venue, orders).await?;
        if let Some(event) = self.detector.observe(summary.active) {
            self.alerts.dispatch(&self.venue, event);
        }
        Ok(summary)
    }

    /// Polls until `shutdown` fires or the venue disappears.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        info!(venue = %self.venue, "Feed poller started");
        loop {
            match self.poll_once().await {
                Ok(_) => {}
                Err(PollError::Kitchen(KitchenError::VenueNotFound(_))) => {
                    info!(venue = %self.venue, "Venue closed, stopping poller");
                    break;
                }
                Err(PollError::Kitchen(KitchenError::ActorCommunication(e))) => {
                    warn!(venue = %self.venue, "Kitchen unreachable, stopping poller: {}", e);
                    break;
                }
                Err(e) => warn!(venue = %self.venue, "Poll failed: {}", e),
            }
            tokio::select! {
                _ = shutdown.recv() => {
                    info!(venue = %self.venue, "Feed poller received shutdown signal");
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        info!(venue = %self.venue, "Feed poller stopped");
    }
}
