use crate::clients::KitchenClient;
use crate::config::KitchenConfig;
use crate::feed::{FeedPoller, OrderFeed};
use crate::kitchen_actor::{KitchenContext, KitchenCreate, KitchenError};
use crate::model::{StationDraft, VenueId};
use crate::sync::SyncHub;
use crate::urgency::AlertSink;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The runtime orchestrator for the kitchen display pipeline.
///
/// `KitchenSystem` is responsible for:
/// - **Lifecycle Management**: Starting and stopping the Kitchen actor and the feed pollers
/// - **Dependency Wiring**: Handing the actor its sync hub, order feed and retry policy
///
/// # Example
///
/// ```ignore
/// let mut system = KitchenSystem::new(config, feed, Arc::new(LogAlertSink));
/// let venue = system.open_venue("main".into(), "Main Street", drafts).await?;
/// system.watch_venue(venue.clone());
///
/// let mut subscription = system.client().subscribe(venue).await?;
/// // ... render messages, send bumps through system.client() ...
///
/// drop(subscription);
/// system.shutdown().await?;
/// ```
pub struct KitchenSystem {
    /// Client for interacting with the Kitchen actor
    pub kitchen_client: KitchenClient,

    config: KitchenConfig,
    feed: Arc<dyn OrderFeed>,
    alerts: Arc<dyn AlertSink>,
    shutdown_tx: broadcast::Sender<()>,

    /// Feed poller tasks, stopped before the actor
    pollers: Vec<JoinHandle<()>>,

    /// Task handle of the running actor (used for graceful shutdown)
    handle: JoinHandle<()>,
}

impl KitchenSystem {
    /// Creates the Kitchen actor and spawns it with its context injected.
    pub fn new(config: KitchenConfig, feed: Arc<dyn OrderFeed>, alerts: Arc<dyn AlertSink>) -> Self {
        let hub = SyncHub::new(config.sync.channel_capacity);

        // 1. Create the actor (no dependencies yet)
        let (kitchen_actor, kitchen_client) =
            crate::kitchen_actor::new(config.actor.mailbox_size, hub.clone());

        // 2. Start it with the hub, the feed and the retry policy injected
        let handle = tokio::spawn(kitchen_actor.run(KitchenContext {
            hub,
            feed: Arc::clone(&feed),
            retry: config.retry.clone(),
        }));

        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            kitchen_client,
            config,
            feed,
            alerts,
            shutdown_tx,
            pollers: Vec::new(),
            handle,
        }
    }

    /// A new handle to the Kitchen actor. Every clone keeps the actor alive until dropped.
    pub fn client(&self) -> KitchenClient {
        self.kitchen_client.clone()
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    /// Opens a venue with its initial stations (a single prep station when empty).
    pub async fn open_venue(
        &self,
        venue: VenueId,
        name: &str,
        stations: Vec<StationDraft>,
    ) -> Result<VenueId, KitchenError> {
        self.kitchen_client
            .open_venue(
                venue,
                KitchenCreate {
                    name: name.to_string(),
                    stations,
                },
            )
            .await
    }

    /// Starts polling the order feed for `venue`.
    pub fn watch_venue(&mut self, venue: VenueId) {
        let poller = FeedPoller::new(
            venue,
            self.kitchen_client.clone(),
            Arc::clone(&self.feed),
            Arc::clone(&self.alerts),
            self.config.feed.poll_interval(),
        );
        let shutdown_rx = self.shutdown_tx.subscribe();
        self.pollers.push(tokio::spawn(poller.run(shutdown_rx)));
    }

    /// Gracefully shuts down the system.
    ///
    /// Pollers are stopped first, since each holds a client clone. Dropping the last
    /// client then closes the actor's channel and its loop exits. Subscriptions still
    /// held elsewhere keep the actor running until they are dropped.
    pub async fn shutdown(self) -> Result<(), KitchenError> {
        info!("Shutting down system...");

        let _ = self.shutdown_tx.send(());
        for poller in self.pollers {
            if let Err(e) = poller.await {
                error!("Poller task failed: {:?}", e);
            }
        }

        drop(self.kitchen_client);

        if let Err(e) = self.handle.await {
            error!("Actor task failed: {:?}", e);
            return Err(KitchenError::ActorCommunication(format!(
                "Actor task failed: {e}"
            )));
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
