//! # Kitchen Display Demo
//!
//! Walks one order through a Grill, Fryer and Expo line:
//! 1.  Setting up the [`KitchenSystem`] with an in-memory order feed.
//! 2.  Opening a venue and watching its feed.
//! 3.  Bumping the order station by station while a display follows along.
//!
//! Set `KITCHEN_CONFIG` to a TOML file to override the defaults.

use chrono::Utc;
use kitchen_display::config::{load_config, KitchenConfig};
use kitchen_display::feed::InMemoryOrderFeed;
use kitchen_display::lifecycle::{setup_tracing, KitchenSystem};
use kitchen_display::model::{Order, OrderId, OrderItem, StationDraft, VenueId};
use kitchen_display::sync::{DisplayMirror, SyncMessage};
use kitchen_display::urgency::LogAlertSink;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = match std::env::var("KITCHEN_CONFIG") {
        Ok(path) => load_config(Path::new(&path))?,
        Err(_) => KitchenConfig {
            feed: kitchen_display::config::FeedConfig {
                poll_interval_ms: 100,
            },
            ..KitchenConfig::default()
        },
    };
    let thresholds = config.urgency.clone();

    let feed = Arc::new(InMemoryOrderFeed::new());
    let mut system = KitchenSystem::new(config, feed.clone(), Arc::new(LogAlertSink));
    let client = system.client();

    let venue = VenueId::from("main-street");
    system
        .open_venue(
            venue.clone(),
            "Main Street",
            vec![
                StationDraft::prep("Grill", "#f97316").with_categories(["mains"]),
                StationDraft::prep("Fryer", "#eab308").with_categories(["sides"]),
                StationDraft::expo("Expo", "#22c55e"),
            ],
        )
        .await?;
    let stations = client.list_stations(&venue).await?;

    let mut subscription = client.subscribe(venue.clone()).await?;
    let mut mirror = match subscription.next().await {
        Some(SyncMessage::Snapshot(snapshot)) => DisplayMirror::new(snapshot),
        _ => return Err("subscription did not start with a snapshot".into()),
    };

    feed.place(
        &venue,
        Order::new(
            "A-101",
            "Dana",
            vec![
                OrderItem::new("Cheeseburger", 1, 11.5),
                OrderItem::new("Fries", 2, 3.0),
            ],
            Utc::now(),
        ),
    );
    system.watch_venue(venue.clone());

    let order_id = OrderId::from("A-101");
    while mirror.board().get(&order_id).is_none() {
        match tokio::time::timeout(Duration::from_secs(5), subscription.next()).await {
            Ok(Some(message)) => mirror.apply(message),
            _ => return Err("order never reached the kitchen".into()),
        }
    }

    for station in &stations {
        let span = tracing::info_span!("station", name = %station.name);
        async {
            for ticket in mirror.tickets(station.id, Utc::now(), &thresholds) {
                info!(order = %ticket.order.id, urgency = ?ticket.urgency, items = ticket.items.len(), "Ticket");
            }
            for index in 0..2 {
                client
                    .toggle_item(&venue, order_id.clone(), station.id, index)
                    .await?;
            }
            let outcome = client.bump(&venue, order_id.clone(), station.id).await?;
            info!(exhausted = outcome.exhausted, advance = ?outcome.advance, "Bumped");
            Ok::<_, Box<dyn Error>>(())
        }
        .instrument(span)
        .await?;

        while let Ok(Some(message)) =
            tokio::time::timeout(Duration::from_millis(200), subscription.next()).await
        {
            mirror.apply(message);
        }
    }

    tokio::time::sleep(Duration::from_millis(200)).await;
    info!(status = ?feed.status(&order_id), "Feed status after expo");

    if !feed.pickup(&order_id) {
        warn!(order = %order_id, "Order vanished before pickup");
    }
    tokio::time::sleep(Duration::from_millis(300)).await;

    drop(subscription);
    drop(client);
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
