//! # Kitchen Client
//!
//! Provides a high-level API for interacting with the `Kitchen` actor.
//! It wraps a `ResourceClient<Kitchen>` and exposes one method per display intent.
//! Entity errors come back as typed [`KitchenError`]s.

use crate::clients::actor_client::ActorClient;
use crate::framework::{FrameworkError, ResourceClient};
use crate::kitchen_actor::{
    Kitchen, KitchenAction, KitchenActionResult, KitchenCreate, KitchenError, KitchenUpdate,
    StationRemoval, SyncSummary,
};
use crate::model::{Order, OrderId, Station, StationDraft, StationId, VenueId};
use crate::pipeline::{BumpOutcome, Ticket};
use crate::sync::{KitchenSnapshot, Subscription, SyncHub};
use crate::urgency::UrgencyConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

/// Client for interacting with the Kitchen actor.
#[derive(Clone)]
pub struct KitchenClient {
    inner: ResourceClient<Kitchen>,
    hub: SyncHub,
}

impl KitchenClient {
    pub fn new(inner: ResourceClient<Kitchen>, hub: SyncHub) -> Self {
        Self { inner, hub }
    }

    /// The hub the actor publishes to.
    pub fn hub(&self) -> &SyncHub {
        &self.hub
    }
}

#[async_trait]
impl ActorClient<Kitchen> for KitchenClient {
    type Error = KitchenError;

    fn inner(&self) -> &ResourceClient<Kitchen> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.downcast_entity::<KitchenError>() {
            Ok(typed) => typed,
            Err(other) => KitchenError::ActorCommunication(other.to_string()),
        }
    }
}

/// Maps framework errors for requests addressed to `venue`.
fn venue_error(venue: &VenueId) -> impl FnOnce(FrameworkError) -> KitchenError + '_ {
    move |e| match e {
        FrameworkError::NotFound(_) => KitchenError::VenueNotFound(venue.clone()),
        FrameworkError::AlreadyExists(_) => KitchenError::VenueExists(venue.clone()),
        other => KitchenClient::map_error(other),
    }
}

fn unexpected(result: KitchenActionResult) -> KitchenError {
    KitchenError::ActorCommunication(format!("unexpected action result: {result:?}"))
}

impl KitchenClient {
    /// Opens a kitchen for `venue` with its initial stations.
    #[instrument(skip(self))]
    pub async fn open_venue(
        &self,
        venue: VenueId,
        params: KitchenCreate,
    ) -> Result<VenueId, KitchenError> {
        debug!("Sending request");
        self.inner
            .create(venue.clone(), params)
            .await
            .map_err(venue_error(&venue))
    }

    /// Closes the venue; subscribers receive `VenueClosed` and their stream ends.
    #[instrument(skip(self))]
    pub async fn close_venue(&self, venue: VenueId) -> Result<(), KitchenError> {
        debug!("Sending request");
        self.inner
            .delete(venue.clone())
            .await
            .map_err(venue_error(&venue))
    }

    #[instrument(skip(self))]
    pub async fn rename_venue(&self, venue: VenueId, name: String) -> Result<(), KitchenError> {
        debug!("Sending request");
        self.inner
            .update(venue.clone(), KitchenUpdate { name: Some(name) })
            .await
            .map(|_| ())
            .map_err(venue_error(&venue))
    }

    /// Full copy of the venue's kitchen. Prefer the narrower queries below.
    pub async fn kitchen(&self, venue: &VenueId) -> Result<Kitchen, KitchenError> {
        self.get(venue.clone())
            .await?
            .ok_or_else(|| KitchenError::VenueNotFound(venue.clone()))
    }

    pub async fn snapshot(&self, venue: &VenueId) -> Result<KitchenSnapshot, KitchenError> {
        match self.perform(venue, KitchenAction::Snapshot).await? {
            KitchenActionResult::Snapshot(snapshot) => Ok(snapshot),
            other => Err(unexpected(other)),
        }
    }

    /// Prep stations by `(position, id)`, then expo stations.
    pub async fn list_stations(&self, venue: &VenueId) -> Result<Vec<Station>, KitchenError> {
        match self.perform(venue, KitchenAction::ListStations).await? {
            KitchenActionResult::ListStations(stations) => Ok(stations),
            other => Err(unexpected(other)),
        }
    }

    pub async fn is_visible(
        &self,
        venue: &VenueId,
        order: &OrderId,
        station: StationId,
    ) -> Result<bool, KitchenError> {
        let action = KitchenAction::IsVisible {
            order: order.clone(),
            station,
        };
        match self.perform(venue, action).await? {
            KitchenActionResult::IsVisible(visible) => Ok(visible),
            other => Err(unexpected(other)),
        }
    }

    pub async fn all_items_done(
        &self,
        venue: &VenueId,
        order: &OrderId,
        station: StationId,
    ) -> Result<bool, KitchenError> {
        let action = KitchenAction::AllItemsDone {
            order: order.clone(),
            station,
        };
        match self.perform(venue, action).await? {
            KitchenActionResult::AllItemsDone(done) => Ok(done),
            other => Err(unexpected(other)),
        }
    }

    /// Tickets to render at `station`, oldest first.
    pub async fn tickets(
        &self,
        venue: &VenueId,
        station: StationId,
        now: DateTime<Utc>,
        thresholds: &UrgencyConfig,
    ) -> Result<Vec<Ticket>, KitchenError> {
        let action = KitchenAction::Tickets {
            station,
            now,
            thresholds: thresholds.clone(),
        };
        match self.perform(venue, action).await? {
            KitchenActionResult::Tickets(tickets) => Ok(tickets),
            other => Err(unexpected(other)),
        }
    }

    /// Snapshot first, then every delta committed after it.
    pub async fn subscribe(&self, venue: VenueId) -> Result<Subscription, KitchenError> {
        Subscription::open(self.clone(), venue).await
    }

    async fn perform(
        &self,
        venue: &VenueId,
        action: KitchenAction,
    ) -> Result<KitchenActionResult, KitchenError> {
        debug!("Sending request");
        self.inner
            .perform_action(venue.clone(), action)
            .await
            .map_err(venue_error(venue))
    }

    #[instrument(skip(self))]
    pub async fn create_station(
        &self,
        venue: &VenueId,
        draft: StationDraft,
    ) -> Result<Station, KitchenError> {
        match self.perform(venue, KitchenAction::CreateStation(draft)).await? {
            KitchenActionResult::CreateStation(station) => Ok(station),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn rename_station(
        &self,
        venue: &VenueId,
        station: StationId,
        name: String,
    ) -> Result<Station, KitchenError> {
        match self
            .perform(venue, KitchenAction::RenameStation { station, name })
            .await?
        {
            KitchenActionResult::RenameStation(station) => Ok(station),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn recolor_station(
        &self,
        venue: &VenueId,
        station: StationId,
        color: String,
    ) -> Result<Station, KitchenError> {
        match self
            .perform(venue, KitchenAction::RecolorStation { station, color })
            .await?
        {
            KitchenActionResult::RecolorStation(station) => Ok(station),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn reposition_station(
        &self,
        venue: &VenueId,
        station: StationId,
        position: i64,
    ) -> Result<Station, KitchenError> {
        match self
            .perform(venue, KitchenAction::RepositionStation { station, position })
            .await?
        {
            KitchenActionResult::RepositionStation(station) => Ok(station),
            other => Err(unexpected(other)),
        }
    }

    /// Deletes a station. Fails with `LastStation` for the venue's only station.
    #[instrument(skip(self))]
    pub async fn delete_station(
        &self,
        venue: &VenueId,
        station: StationId,
    ) -> Result<StationRemoval, KitchenError> {
        match self
            .perform(venue, KitchenAction::DeleteStation(station))
            .await?
        {
            KitchenActionResult::DeleteStation(removal) => Ok(removal),
            other => Err(unexpected(other)),
        }
    }

    /// Hands the feed's current active set to the kitchen.
    #[instrument(skip(self, orders), fields(count = orders.len()))]
    pub async fn sync_orders(
        &self,
        venue: &VenueId,
        orders: Vec<Order>,
    ) -> Result<SyncSummary, KitchenError> {
        match self.perform(venue, KitchenAction::SyncOrders(orders)).await? {
            KitchenActionResult::SyncOrders(summary) => Ok(summary),
            other => Err(unexpected(other)),
        }
    }

    /// Marks the order as released by `station`. Repeating the call is harmless.
    #[instrument(skip(self))]
    pub async fn bump(
        &self,
        venue: &VenueId,
        order: OrderId,
        station: StationId,
    ) -> Result<BumpOutcome, KitchenError> {
        match self
            .perform(venue, KitchenAction::Bump { order, station })
            .await?
        {
            KitchenActionResult::Bump(outcome) => Ok(outcome),
            other => Err(unexpected(other)),
        }
    }

    /// Flips one item's done flag at `station` and returns the new flag.
    #[instrument(skip(self))]
    pub async fn toggle_item(
        &self,
        venue: &VenueId,
        order: OrderId,
        station: StationId,
        index: usize,
    ) -> Result<bool, KitchenError> {
        match self
            .perform(
                venue,
                KitchenAction::ToggleItem {
                    order,
                    station,
                    index,
                },
            )
            .await?
        {
            KitchenActionResult::ToggleItem(done) => Ok(done),
            other => Err(unexpected(other)),
        }
    }
}
