//! What a station display renders: the orders visible at one station, oldest first.

use super::{all_items_done, ActiveOrder, Board};
use crate::model::{Order, OrderItem, Station, StationId};
use crate::registry::Topology;
use crate::urgency::{Urgency, UrgencyConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketItem {
    pub index: usize,
    pub item: OrderItem,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub order: Order,
    pub station: StationId,
    pub items: Vec<TicketItem>,
    pub all_items_done: bool,
    pub urgency: Urgency,
    /// Bumping this ticket exhausts the pipeline ("Ready" rather than "Next").
    pub exhausts: bool,
}

impl Ticket {
    fn build(
        active: &ActiveOrder,
        station: &Station,
        exhausts: bool,
        now: DateTime<Utc>,
        thresholds: &UrgencyConfig,
    ) -> Self {
        let items = active
            .order
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| TicketItem {
                index,
                item: item.clone(),
                done: active.progress.is_item_done(station.id, index),
            })
            .collect();
        Self {
            order: active.order.clone(),
            station: station.id,
            items,
            all_items_done: all_items_done(
                &active.progress,
                station.id,
                active.order.items.len(),
            ),
            urgency: thresholds.classify(active.order.created_at, now),
            exhausts,
        }
    }
}

impl Board {
    /// Tickets visible at `station`, ordered by creation time then order id.
    pub fn tickets_for(
        &self,
        station: &Station,
        topology: &Topology,
        now: DateTime<Utc>,
        thresholds: &UrgencyConfig,
    ) -> Vec<Ticket> {
        let exhausts = topology.exhausts(station);
        let mut tickets: Vec<Ticket> = self
            .visible_at(station, topology)
            .map(|active| Ticket::build(active, station, exhausts, now, thresholds))
            .collect();
        tickets.sort_by(|a, b| {
            a.order
                .created_at
                .cmp(&b.order.created_at)
                .then_with(|| a.order.id.cmp(&b.order.id))
        });
        tickets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OrderId, StationDraft};
    use crate::registry::StationRegistry;
    use chrono::Duration;

    #[test]
    fn tickets_are_oldest_first_with_item_flags() {
        let registry = StationRegistry::with_stations(vec![
            StationDraft::prep("Grill", "#f00"),
            StationDraft::expo("Expo", "#0f0"),
        ])
        .unwrap();
        let grill = registry.list()[0].clone();
        let now = Utc::now();
        let mut board = Board::new();
        board.reconcile(vec![
            Order::new("late", "Ari", vec![OrderItem::new("Soup", 1, 4.0)], now),
            Order::new(
                "early",
                "Bo",
                vec![OrderItem::new("Steak", 1, 20.0)],
                now - Duration::minutes(15),
            ),
        ]);
        board
            .toggle_item(&OrderId::from("early"), grill.id, 0, registry.topology())
            .unwrap();

        let tickets = board.tickets_for(&grill, registry.topology(), now, &UrgencyConfig::default());
        let ids: Vec<_> = tickets.iter().map(|t| t.order.id.0.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
        assert_eq!(tickets[0].urgency, Urgency::Warning);
        assert!(tickets[0].all_items_done);
        assert!(tickets[0].items[0].done);
        assert!(!tickets[1].all_items_done);
        assert!(tickets[0].exhausts);
    }
}
