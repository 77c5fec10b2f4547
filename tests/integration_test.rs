use chrono::Utc;
use kitchen_display::clients::KitchenClient;
use kitchen_display::config::KitchenConfig;
use kitchen_display::feed::{FeedPoller, InMemoryOrderFeed, OrderFeed};
use kitchen_display::kitchen_actor::KitchenError;
use kitchen_display::lifecycle::KitchenSystem;
use kitchen_display::model::{
    Order, OrderId, OrderItem, OrderStatus, Station, StationDraft, StationId, VenueId,
};
use kitchen_display::sync::{Delta, DisplayMirror, SyncMessage};
use kitchen_display::urgency::{AlertEvent, AlertSink, LogAlertSink};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn fast_config() -> KitchenConfig {
    let mut config = KitchenConfig::default();
    config.feed.poll_interval_ms = 20;
    config.retry.initial_delay_ms = 5;
    config.retry.max_delay_ms = 20;
    config
}

fn two_item_order(id: &str) -> Order {
    Order::new(
        id,
        "Dana",
        vec![
            OrderItem::new("Cheeseburger", 1, 11.5),
            OrderItem::new("Fries", 1, 3.0),
        ],
        Utc::now(),
    )
}

fn start(feed: &Arc<InMemoryOrderFeed>) -> KitchenSystem {
    KitchenSystem::new(fast_config(), feed.clone(), Arc::new(LogAlertSink))
}

async fn open_grill_fryer_expo(system: &KitchenSystem, venue: &VenueId) -> Vec<Station> {
    system
        .open_venue(
            venue.clone(),
            "Main Street",
            vec![
                StationDraft::prep("Grill", "#f97316"),
                StationDraft::prep("Fryer", "#eab308"),
                StationDraft::expo("Expo", "#22c55e"),
            ],
        )
        .await
        .expect("Failed to open venue");
    system
        .client()
        .list_stations(venue)
        .await
        .expect("Failed to list stations")
}

async fn sync_from_feed(client: &KitchenClient, feed: &InMemoryOrderFeed, venue: &VenueId) {
    let orders = feed.active_orders(venue).await.expect("Feed failed");
    client
        .sync_orders(venue, orders)
        .await
        .expect("Failed to sync orders");
}

async fn visible_at(
    client: &KitchenClient,
    venue: &VenueId,
    order: &OrderId,
    stations: &[Station],
) -> Vec<String> {
    let mut names = Vec::new();
    for station in stations {
        if client.is_visible(venue, order, station.id).await.unwrap() {
            names.push(station.name.clone());
        }
    }
    names
}

async fn wait_for_status(feed: &InMemoryOrderFeed, order: &OrderId, status: OrderStatus) {
    for _ in 0..100 {
        if feed.status(order) == Some(status) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("order {order} never reached {status}, feed has {:?}", feed.status(order));
}

/// Full end-to-end test of the Grill, Fryer, Expo walkthrough with all real components.
#[tokio::test]
async fn test_grill_fryer_expo_walkthrough() {
    let feed = Arc::new(InMemoryOrderFeed::new());
    let system = start(&feed);
    let client = system.client();
    let venue = VenueId::from("main");
    let stations = open_grill_fryer_expo(&system, &venue).await;
    let (grill, fryer, expo) = (stations[0].id, stations[1].id, stations[2].id);

    feed.place(&venue, two_item_order("O"));
    sync_from_feed(&client, &feed, &venue).await;
    let o = OrderId::from("O");

    assert_eq!(visible_at(&client, &venue, &o, &stations).await, vec!["Grill"]);

    let outcome = client.bump(&venue, o.clone(), grill).await.unwrap();
    assert!(outcome.changed);
    assert!(!outcome.exhausted);
    assert_eq!(visible_at(&client, &venue, &o, &stations).await, vec!["Fryer"]);

    let outcome = client.bump(&venue, o.clone(), fryer).await.unwrap();
    assert!(outcome.exhausted);
    assert_eq!(visible_at(&client, &venue, &o, &stations).await, vec!["Expo"]);
    wait_for_status(&feed, &o, OrderStatus::Confirmed).await;

    let outcome = client.bump(&venue, o.clone(), expo).await.unwrap();
    assert!(outcome.exhausted);
    assert!(visible_at(&client, &venue, &o, &stations).await.is_empty());
    wait_for_status(&feed, &o, OrderStatus::Preparing).await;

    // Re-bumping changes nothing
    let again = client.bump(&venue, o.clone(), expo).await.unwrap();
    assert!(!again.changed);
    assert_eq!(again.advance, None);

    drop(client);
    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test]
async fn test_out_of_order_bump_does_not_skip_to_expo() {
    let feed = Arc::new(InMemoryOrderFeed::new());
    let system = start(&feed);
    let client = system.client();
    let venue = VenueId::from("main");
    let stations = open_grill_fryer_expo(&system, &venue).await;
    let o = OrderId::from("O");
    feed.place(&venue, two_item_order("O"));
    sync_from_feed(&client, &feed, &venue).await;

    client.bump(&venue, o.clone(), stations[1].id).await.unwrap();
    assert_eq!(visible_at(&client, &venue, &o, &stations).await, vec!["Grill"]);

    client.bump(&venue, o.clone(), stations[0].id).await.unwrap();
    assert_eq!(visible_at(&client, &venue, &o, &stations).await, vec!["Expo"]);

    drop(client);
    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test]
async fn test_concurrent_bumps_apply_once() {
    let feed = Arc::new(InMemoryOrderFeed::new());
    let system = start(&feed);
    let client = system.client();
    let venue = VenueId::from("main");
    let stations = open_grill_fryer_expo(&system, &venue).await;
    let fryer = stations[1].id;
    feed.place(&venue, two_item_order("O"));
    sync_from_feed(&client, &feed, &venue).await;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            let venue = venue.clone();
            tokio::spawn(async move { client.bump(&venue, OrderId::from("O"), fryer).await })
        })
        .collect();

    let mut changed = 0;
    let mut advanced = 0;
    for task in tasks {
        let outcome = task.await.unwrap().unwrap();
        changed += usize::from(outcome.changed);
        advanced += usize::from(outcome.advance.is_some());
    }
    assert_eq!(changed, 1);
    assert_eq!(advanced, 1);

    let kitchen = client.kitchen(&venue).await.unwrap();
    let order = kitchen.board().get(&OrderId::from("O")).unwrap();
    assert_eq!(order.order.status, OrderStatus::Confirmed);

    drop(kitchen);
    drop(client);
    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test]
async fn test_deleting_last_prep_station_without_expo_still_advances_orders() {
    let feed = Arc::new(InMemoryOrderFeed::new());
    let system = start(&feed);
    let client = system.client();
    let venue = VenueId::from("food-truck");
    system
        .open_venue(
            venue.clone(),
            "Food Truck",
            vec![
                StationDraft::prep("Grill", "#f00"),
                StationDraft::prep("Fryer", "#ff0"),
            ],
        )
        .await
        .unwrap();
    let stations = client.list_stations(&venue).await.unwrap();
    let (grill, fryer) = (stations[0].id, stations[1].id);

    feed.place(&venue, two_item_order("at-fryer"));
    feed.place(&venue, two_item_order("at-grill"));
    sync_from_feed(&client, &feed, &venue).await;
    client
        .bump(&venue, OrderId::from("at-fryer"), grill)
        .await
        .unwrap();

    let removal = client.delete_station(&venue, fryer).await.unwrap();
    assert_eq!(removal.station.id, fryer);
    assert_eq!(removal.released.len(), 2);

    wait_for_status(&feed, &OrderId::from("at-fryer"), OrderStatus::Confirmed).await;

    // The order still at the grill now exhausts there, since the grill is the last prep station
    let outcome = client
        .bump(&venue, OrderId::from("at-grill"), grill)
        .await
        .unwrap();
    assert!(outcome.exhausted);
    wait_for_status(&feed, &OrderId::from("at-grill"), OrderStatus::Confirmed).await;

    assert_eq!(
        client.delete_station(&venue, grill).await,
        Err(KitchenError::LastStation)
    );

    drop(client);
    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test]
async fn test_new_prep_station_does_not_block_orders_already_at_expo() {
    let feed = Arc::new(InMemoryOrderFeed::new());
    let system = start(&feed);
    let client = system.client();
    let venue = VenueId::from("main");
    let stations = open_grill_fryer_expo(&system, &venue).await;
    let o = OrderId::from("O");
    feed.place(&venue, two_item_order("O"));
    sync_from_feed(&client, &feed, &venue).await;
    client.bump(&venue, o.clone(), stations[0].id).await.unwrap();
    client.bump(&venue, o.clone(), stations[1].id).await.unwrap();

    let drinks = client
        .create_station(&venue, StationDraft::prep("Drinks", "#0ea5e9"))
        .await
        .unwrap();
    let stations = client.list_stations(&venue).await.unwrap();
    let names: Vec<_> = stations.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Grill", "Fryer", "Drinks", "Expo"]);
    assert!(!client.is_visible(&venue, &o, drinks.id).await.unwrap());
    assert_eq!(visible_at(&client, &venue, &o, &stations).await, vec!["Expo"]);

    drop(client);
    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test]
async fn test_two_displays_converge() {
    let feed = Arc::new(InMemoryOrderFeed::new());
    let system = start(&feed);
    let client = system.client();
    let venue = VenueId::from("main");
    let stations = open_grill_fryer_expo(&system, &venue).await;

    let mut grill_display = client.subscribe(venue.clone()).await.unwrap();
    let mut expo_display = client.subscribe(venue.clone()).await.unwrap();

    feed.place(&venue, two_item_order("O"));
    sync_from_feed(&client, &feed, &venue).await;
    client
        .toggle_item(&venue, OrderId::from("O"), stations[0].id, 1)
        .await
        .unwrap();
    client
        .bump(&venue, OrderId::from("O"), stations[0].id)
        .await
        .unwrap();
    client
        .rename_station(&venue, stations[1].id, "Deep Fryer".into())
        .await
        .unwrap();
    let revision = client.snapshot(&venue).await.unwrap().revision;

    let mut mirrors = Vec::new();
    for display in [&mut grill_display, &mut expo_display] {
        let mut mirror = match display.next().await {
            Some(SyncMessage::Snapshot(snapshot)) => DisplayMirror::new(snapshot),
            other => panic!("expected a snapshot, got {other:?}"),
        };
        while mirror.revision() < revision {
            mirror.apply(display.next().await.expect("stream ended early"));
        }
        mirrors.push(mirror);
    }

    let o = OrderId::from("O");
    for mirror in &mirrors {
        assert_eq!(mirror.revision(), revision);
        assert!(!mirror.is_visible(&o, stations[0].id));
        assert!(mirror.is_visible(&o, stations[1].id));
        assert_eq!(mirror.stations()[1].name, "Deep Fryer");
        let entry = mirror.board().get(&o).unwrap();
        assert!(entry.progress.is_item_done(stations[0].id, 1));
    }

    drop(grill_display);
    drop(expo_display);
    drop(client);
    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test]
async fn test_lagging_display_gets_a_fresh_snapshot() {
    let feed = Arc::new(InMemoryOrderFeed::new());
    let mut config = fast_config();
    config.sync.channel_capacity = 2;
    let system = KitchenSystem::new(config, feed.clone(), Arc::new(LogAlertSink));
    let client = system.client();
    let venue = VenueId::from("main");
    system.open_venue(venue.clone(), "Main", Vec::new()).await.unwrap();
    let station = client.list_stations(&venue).await.unwrap()[0].id;

    let mut display = client.subscribe(venue.clone()).await.unwrap();
    assert!(matches!(display.next().await, Some(SyncMessage::Snapshot(_))));

    for i in 0..6 {
        feed.place(&venue, two_item_order(&format!("O-{i}")));
        sync_from_feed(&client, &feed, &venue).await;
    }
    client
        .toggle_item(&venue, OrderId::from("O-0"), station, 0)
        .await
        .unwrap();
    let latest = client.snapshot(&venue).await.unwrap();

    match display.next().await {
        Some(SyncMessage::Snapshot(snapshot)) => {
            assert_eq!(snapshot.revision, latest.revision);
            assert_eq!(snapshot.orders.len(), 6);
        }
        other => panic!("expected a resync snapshot, got {other:?}"),
    }
    assert_eq!(display.revision(), latest.revision);

    drop(display);
    drop(client);
    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test]
async fn test_closing_a_venue_ends_subscriptions() {
    let feed = Arc::new(InMemoryOrderFeed::new());
    let system = start(&feed);
    let client = system.client();
    let venue = VenueId::from("main");
    open_grill_fryer_expo(&system, &venue).await;
    let mut display = client.subscribe(venue.clone()).await.unwrap();
    assert!(matches!(display.next().await, Some(SyncMessage::Snapshot(_))));

    client.close_venue(venue.clone()).await.unwrap();

    match display.next().await {
        Some(SyncMessage::Delta(envelope)) => assert_eq!(envelope.delta, Delta::VenueClosed),
        other => panic!("expected VenueClosed, got {other:?}"),
    }
    assert!(display.next().await.is_none());
    assert_eq!(
        client.snapshot(&venue).await,
        Err(KitchenError::VenueNotFound(venue.clone()))
    );
    assert_eq!(
        client.bump(&venue, OrderId::from("O"), StationId(1)).await,
        Err(KitchenError::VenueNotFound(venue.clone()))
    );

    drop(display);
    drop(client);
    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test]
async fn test_duplicate_venue_is_rejected() {
    let feed = Arc::new(InMemoryOrderFeed::new());
    let system = start(&feed);
    let venue = VenueId::from("main");
    system.open_venue(venue.clone(), "Main", Vec::new()).await.unwrap();
    assert_eq!(
        system.open_venue(venue.clone(), "Main again", Vec::new()).await,
        Err(KitchenError::VenueExists(venue))
    );
    system.shutdown().await.expect("Shutdown failed");
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<AlertEvent>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<AlertEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AlertSink for RecordingSink {
    fn on_new_order(&self, _venue: &VenueId, active: usize) {
        self.events.lock().unwrap().push(AlertEvent::NewOrder { active });
    }

    fn on_none_remaining(&self, _venue: &VenueId) {
        self.events.lock().unwrap().push(AlertEvent::NoneRemaining);
    }
}

#[tokio::test]
async fn test_poller_reconciles_and_alerts() {
    let feed = Arc::new(InMemoryOrderFeed::new());
    let system = start(&feed);
    let client = system.client();
    let venue = VenueId::from("main");
    open_grill_fryer_expo(&system, &venue).await;
    let sink = Arc::new(RecordingSink::default());
    let mut poller = FeedPoller::new(
        venue.clone(),
        client.clone(),
        feed.clone(),
        sink.clone(),
        Duration::from_millis(10),
    );

    feed.place(&venue, two_item_order("A"));
    poller.poll_once().await.unwrap();
    assert!(sink.events().is_empty());

    feed.place(&venue, two_item_order("B"));
    let summary = poller.poll_once().await.unwrap();
    assert_eq!(summary.reconciliation.activated, vec![OrderId::from("B")]);
    poller.poll_once().await.unwrap();
    assert_eq!(sink.events(), vec![AlertEvent::NewOrder { active: 2 }]);

    feed.pickup(&OrderId::from("A"));
    feed.cancel(&OrderId::from("B"));
    let summary = poller.poll_once().await.unwrap();
    assert_eq!(summary.active, 0);
    assert_eq!(
        sink.events(),
        vec![AlertEvent::NewOrder { active: 2 }, AlertEvent::NoneRemaining]
    );
    let err = client
        .bump(&venue, OrderId::from("A"), StationId(1))
        .await
        .unwrap_err();
    assert_eq!(err, KitchenError::OrderNotActive(OrderId::from("A")));

    drop(poller);
    drop(client);
    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test]
async fn test_watched_venue_picks_up_orders_and_shuts_down() {
    let feed = Arc::new(InMemoryOrderFeed::new());
    let mut system = start(&feed);
    let client = system.client();
    let venue = VenueId::from("main");
    open_grill_fryer_expo(&system, &venue).await;
    system.watch_venue(venue.clone());

    feed.place(&venue, two_item_order("A"));
    let mut seen = false;
    for _ in 0..100 {
        if client.kitchen(&venue).await.unwrap().board().get(&OrderId::from("A")).is_some() {
            seen = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(seen, "poller never synced the order");

    drop(client);
    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test]
async fn test_subscribing_to_an_unknown_venue_leaves_no_channel_behind() {
    let feed = Arc::new(InMemoryOrderFeed::new());
    let system = start(&feed);
    let client = system.client();
    let ghost = VenueId::from("ghost");

    let result = client.subscribe(ghost.clone()).await;
    assert!(matches!(result, Err(KitchenError::VenueNotFound(v)) if v == ghost));
    assert!(!client.hub().has_channel(&ghost));

    drop(client);
    system.shutdown().await.expect("Shutdown failed");
}

#[tokio::test]
async fn test_repositioning_a_station_keeps_orders_in_flight_moving_forward() {
    let feed = Arc::new(InMemoryOrderFeed::new());
    let system = start(&feed);
    let client = system.client();
    let venue = VenueId::from("main");
    let stations = open_grill_fryer_expo(&system, &venue).await;
    let (grill, fryer) = (stations[0].id, stations[1].id);
    let drinks = client
        .create_station(&venue, StationDraft::prep("Drinks", "#0ea5e9"))
        .await
        .unwrap();

    feed.place(&venue, two_item_order("at-fryer"));
    feed.place(&venue, two_item_order("new"));
    sync_from_feed(&client, &feed, &venue).await;
    let at_fryer = OrderId::from("at-fryer");
    client.bump(&venue, at_fryer.clone(), grill).await.unwrap();

    let mut display = client.subscribe(venue.clone()).await.unwrap();
    let mut mirror = match display.next().await {
        Some(SyncMessage::Snapshot(snapshot)) => DisplayMirror::new(snapshot),
        other => panic!("expected a snapshot, got {other:?}"),
    };

    client
        .reposition_station(&venue, drinks.id, -1)
        .await
        .unwrap();
    let stations = client.list_stations(&venue).await.unwrap();
    let names: Vec<_> = stations.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Drinks", "Grill", "Fryer", "Expo"]);

    assert_eq!(
        visible_at(&client, &venue, &at_fryer, &stations).await,
        vec!["Fryer"]
    );
    assert_eq!(
        visible_at(&client, &venue, &OrderId::from("new"), &stations).await,
        vec!["Drinks"]
    );

    let revision = client.snapshot(&venue).await.unwrap().revision;
    while mirror.revision() < revision {
        mirror.apply(display.next().await.expect("stream ended early"));
    }
    assert!(mirror.is_visible(&at_fryer, fryer));
    assert!(!mirror.is_visible(&at_fryer, drinks.id));

    drop(display);
    drop(client);
    system.shutdown().await.expect("Shutdown failed");
}
