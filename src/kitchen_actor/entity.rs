//! The [`Kitchen`] aggregate and its [`ActorEntity`] implementation.
//!
//! One `Kitchen` holds everything a venue's displays share: the station registry, the
//! board of active orders, and the revision counter that stamps every published delta.
//! Keeping them in one entity means a structural change and the implicit bumps it
//! causes are committed and published as one step of the actor loop.

use super::actions::{KitchenAction, KitchenActionResult, StationRemoval, SyncSummary};
use super::KitchenError;
use crate::feed::{spawn_status_push, OrderFeed, RetryConfig};
use crate::framework::ActorEntity;
use crate::model::{Order, OrderId, Station, StationDraft, StationId, VenueId};
use crate::pipeline::{
    all_items_done, is_visible, Board, FeedLag, ImplicitBump, StatusAdvance, Ticket,
};
use crate::registry::StationRegistry;
use crate::sync::{Delta, Envelope, KitchenSnapshot, SyncHub};
use crate::urgency::UrgencyConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Kitchen {
    pub venue: VenueId,
    pub name: String,
    registry: StationRegistry,
    board: Board,
    revision: u64,
    /// Feed lags seen on the last sync, re-pushed if the next sync still shows them.
    lagging: HashMap<OrderId, StatusAdvance>,
}

/// Payload for opening a venue's kitchen.
#[derive(Debug, Clone)]
pub struct KitchenCreate {
    pub name: String,
    /// Initial stations in creation order. Empty seeds a single prep station.
    pub stations: Vec<StationDraft>,
}

/// Payload for updating a kitchen.
#[derive(Debug, Clone, Default)]
pub struct KitchenUpdate {
    pub name: Option<String>,
}

/// Dependencies injected into the Kitchen actor when its loop starts.
#[derive(Clone)]
pub struct KitchenContext {
    pub hub: SyncHub,
    pub feed: Arc<dyn OrderFeed>,
    pub retry: RetryConfig,
}

impl Kitchen {
    pub fn registry(&self) -> &StationRegistry {
        &self.registry
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> KitchenSnapshot {
        KitchenSnapshot {
            venue: self.venue.clone(),
            name: self.name.clone(),
            revision: self.revision,
            stations: self.registry.list().to_vec(),
            orders: self.board.orders().cloned().collect(),
        }
    }

    pub fn is_visible(&self, order_id: &OrderId, station_id: StationId) -> Result<bool, KitchenError> {
        let station = self.registry.get(station_id)?;
        let active = self
            .board
            .get(order_id)
            .ok_or_else(|| KitchenError::OrderNotActive(order_id.clone()))?;
        Ok(is_visible(&active.progress, station, self.registry.topology()))
    }

    pub fn all_items_done(
        &self,
        order_id: &OrderId,
        station_id: StationId,
    ) -> Result<bool, KitchenError> {
        self.registry.get(station_id)?;
        let active = self
            .board
            .get(order_id)
            .ok_or_else(|| KitchenError::OrderNotActive(order_id.clone()))?;
        Ok(all_items_done(
            &active.progress,
            station_id,
            active.order.items.len(),
        ))
    }

    pub fn tickets_for(
        &self,
        station_id: StationId,
        now: DateTime<Utc>,
        thresholds: &UrgencyConfig,
    ) -> Result<Vec<Ticket>, KitchenError> {
        let station = self.registry.get(station_id)?;
        Ok(self
            .board
            .tickets_for(station, self.registry.topology(), now, thresholds))
    }

    fn publish(&mut self, ctx: &KitchenContext, delta: Delta) {
        self.revision += 1;
        ctx.hub.publish(Envelope {
            venue: self.venue.clone(),
            revision: self.revision,
            delta,
        });
    }

    fn publish_stations(&mut self, ctx: &KitchenContext) {
        let stations = self.registry.list().to_vec();
        self.publish(ctx, Delta::Stations { stations });
    }

    fn publish_progress(&mut self, ctx: &KitchenContext, order_id: &OrderId) {
        let Some(active) = self.board.get(order_id) else {
            return;
        };
        let delta = Delta::Progress {
            order_id: order_id.clone(),
            status: active.order.status,
            progress: active.progress.clone(),
        };
        self.publish(ctx, delta);
    }

    fn push_status(&self, ctx: &KitchenContext, order_id: &OrderId, advance: StatusAdvance) {
        info!(venue = %self.venue, order = %order_id, from = %advance.from, to = %advance.to, "Exhausted");
        spawn_status_push(
            Arc::clone(&ctx.feed),
            ctx.retry.clone(),
            order_id.clone(),
            advance,
        );
    }

    /// Publishes the new station list, then the progress of every order a structural
    /// change touched.
    fn publish_structure(&mut self, ctx: &KitchenContext, touched: &[ImplicitBump]) {
        self.publish_stations(ctx);
        for bump in touched {
            self.publish_progress(ctx, &bump.order_id);
            if let Some(advance) = bump.advance {
                self.push_status(ctx, &bump.order_id, advance);
            }
        }
    }

    /// Re-pushes statuses the feed has missed on two consecutive syncs.
    ///
    /// A single sync showing the feed behind is expected while a push is in flight. The
    /// second one means the push was lost, so a new one goes out from the feed's status
    /// straight to the board's.
    fn catch_up_feed(&mut self, ctx: &KitchenContext, lags: &[FeedLag]) {
        let previous = std::mem::take(&mut self.lagging);
        for lag in lags {
            if previous.get(&lag.order_id) == Some(&lag.advance) {
                info!(
                    venue = %self.venue,
                    order = %lag.order_id,
                    from = %lag.advance.from,
                    to = %lag.advance.to,
                    "Feed still behind, re-pushing status"
                );
                spawn_status_push(
                    Arc::clone(&ctx.feed),
                    ctx.retry.clone(),
                    lag.order_id.clone(),
                    lag.advance,
                );
            } else {
                self.lagging.insert(lag.order_id.clone(), lag.advance);
            }
        }
    }

    fn create_station(
        &mut self,
        draft: StationDraft,
        ctx: &KitchenContext,
    ) -> Result<Station, KitchenError> {
        let before = self.registry.topology().clone();
        let station = self.registry.create(draft)?;
        let admitted = self
            .board
            .admit_station(&station, &before, self.registry.topology());
        self.publish_structure(ctx, &admitted);
        Ok(station)
    }

    fn reposition_station(
        &mut self,
        id: StationId,
        position: i64,
        ctx: &KitchenContext,
    ) -> Result<Station, KitchenError> {
        let before = self.registry.topology().clone();
        let station = self.registry.reposition(id, position)?;
        let admitted = self
            .board
            .admit_station(&station, &before, self.registry.topology());
        self.publish_structure(ctx, &admitted);
        Ok(station)
    }

    fn delete_station(
        &mut self,
        id: StationId,
        ctx: &KitchenContext,
    ) -> Result<StationRemoval, KitchenError> {
        let before = self.registry.topology().clone();
        let station = self.registry.delete(id)?;
        let released = self.board.retire_station(&station, &before);
        self.publish_structure(ctx, &released);
        Ok(StationRemoval {
            station,
            released: released.into_iter().map(|bump| bump.order_id).collect(),
        })
    }

    fn sync_orders(&mut self, orders: Vec<Order>, ctx: &KitchenContext) -> SyncSummary {
        let reconciliation = self.board.reconcile(orders);
        for order_id in &reconciliation.removed {
            self.publish(
                ctx,
                Delta::OrderRemoved {
                    order_id: order_id.clone(),
                },
            );
        }
        for order_id in reconciliation
            .activated
            .iter()
            .chain(reconciliation.refreshed.iter())
        {
            if let Some(entry) = self.board.get(order_id).cloned() {
                self.publish(ctx, Delta::OrderUpserted { entry });
            }
        }
        self.catch_up_feed(ctx, &reconciliation.lagging);
        if !reconciliation.is_empty() {
            info!(
                venue = %self.venue,
                activated = reconciliation.activated.len(),
                removed = reconciliation.removed.len(),
                "Orders synced"
            );
        }
        SyncSummary {
            reconciliation,
            active: self.board.len(),
        }
    }
}

fn validate_venue_name(name: &str) -> Result<(), KitchenError> {
    if name.trim().is_empty() {
        return Err(KitchenError::Validation("venue name must not be empty".into()));
    }
    Ok(())
}

#[async_trait]
impl ActorEntity for Kitchen {
    type Id = VenueId;
    type Create = KitchenCreate;
    type Update = KitchenUpdate;
    type Action = KitchenAction;
    type ActionResult = KitchenActionResult;
    type Context = KitchenContext;
    type Error = KitchenError;

    fn from_create_params(id: VenueId, params: KitchenCreate) -> Result<Self, KitchenError> {
        validate_venue_name(&params.name)?;
        Ok(Self {
            venue: id,
            name: params.name,
            registry: StationRegistry::with_stations(params.stations)?,
            board: Board::new(),
            revision: 0,
            lagging: HashMap::new(),
        })
    }

    async fn on_update(
        &mut self,
        update: KitchenUpdate,
        ctx: &KitchenContext,
    ) -> Result<(), KitchenError> {
        if let Some(name) = update.name {
            validate_venue_name(&name)?;
            self.name = name.clone();
            self.publish(ctx, Delta::VenueRenamed { name });
        }
        Ok(())
    }

    async fn on_delete(&self, ctx: &KitchenContext) -> Result<(), KitchenError> {
        ctx.hub.publish(Envelope {
            venue: self.venue.clone(),
            revision: self.revision + 1,
            delta: Delta::VenueClosed,
        });
        ctx.hub.close(&self.venue);
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: KitchenAction,
        ctx: &KitchenContext,
    ) -> Result<KitchenActionResult, KitchenError> {
        match action {
            KitchenAction::CreateStation(draft) => self
                .create_station(draft, ctx)
                .map(KitchenActionResult::CreateStation),
            KitchenAction::RenameStation { station, name } => {
                let station = self.registry.rename(station, name)?;
                self.publish_stations(ctx);
                Ok(KitchenActionResult::RenameStation(station))
            }
            KitchenAction::RecolorStation { station, color } => {
                let station = self.registry.recolor(station, color)?;
                self.publish_stations(ctx);
                Ok(KitchenActionResult::RecolorStation(station))
            }
            KitchenAction::RepositionStation { station, position } => self
                .reposition_station(station, position, ctx)
                .map(KitchenActionResult::RepositionStation),
            KitchenAction::DeleteStation(station) => self
                .delete_station(station, ctx)
                .map(KitchenActionResult::DeleteStation),
            KitchenAction::SyncOrders(orders) => {
                Ok(KitchenActionResult::SyncOrders(self.sync_orders(orders, ctx)))
            }
            KitchenAction::Bump { order, station } => {
                let outcome = self
                    .board
                    .bump(&order, station, self.registry.topology())?;
                if outcome.changed {
                    self.publish_progress(ctx, &order);
                }
                if let Some(advance) = outcome.advance {
                    self.push_status(ctx, &order, advance);
                }
                Ok(KitchenActionResult::Bump(outcome))
            }
            KitchenAction::ToggleItem {
                order,
                station,
                index,
            } => {
                let done = self
                    .board
                    .toggle_item(&order, station, index, self.registry.topology())?;
                self.publish_progress(ctx, &order);
                Ok(KitchenActionResult::ToggleItem(done))
            }
            KitchenAction::Snapshot => Ok(KitchenActionResult::Snapshot(self.snapshot())),
            KitchenAction::ListStations => Ok(KitchenActionResult::ListStations(
                self.registry.list().to_vec(),
            )),
            KitchenAction::IsVisible { order, station } => self
                .is_visible(&order, station)
                .map(KitchenActionResult::IsVisible),
            KitchenAction::AllItemsDone { order, station } => self
                .all_items_done(&order, station)
                .map(KitchenActionResult::AllItemsDone),
            KitchenAction::Tickets {
                station,
                now,
                thresholds,
            } => self
                .tickets_for(station, now, &thresholds)
                .map(KitchenActionResult::Tickets),
        }
    }
}
