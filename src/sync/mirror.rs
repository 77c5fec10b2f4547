//! Display-side replica of a venue, kept current from sync messages.

use super::{Delta, Envelope, KitchenSnapshot, SyncMessage};
use crate::model::{OrderId, Station, StationId, VenueId};
use crate::pipeline::{is_visible, Board, Ticket};
use crate::registry::Topology;
use crate::urgency::UrgencyConfig;
use chrono::{DateTime, Utc};

/// Local copy of the stations and active orders of one venue.
///
/// Visibility and tickets are computed with the same functions the kitchen uses, so a
/// mirror at revision `r` shows exactly what the kitchen showed at `r`.
#[derive(Debug, Clone)]
pub struct DisplayMirror {
    venue: VenueId,
    name: String,
    revision: u64,
    topology: Topology,
    board: Board,
    closed: bool,
}

impl DisplayMirror {
    pub fn new(snapshot: KitchenSnapshot) -> Self {
        let mut mirror = Self {
            venue: snapshot.venue.clone(),
            name: String::new(),
            revision: 0,
            topology: Topology::default(),
            board: Board::new(),
            closed: false,
        };
        mirror.load(snapshot);
        mirror
    }

    pub fn venue(&self) -> &VenueId {
        &self.venue
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn stations(&self) -> &[Station] {
        self.topology.stations()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn apply(&mut self, message: SyncMessage) {
        match message {
            SyncMessage::Snapshot(snapshot) => self.load(snapshot),
            SyncMessage::Delta(envelope) => self.apply_delta(envelope),
        }
    }

    fn load(&mut self, snapshot: KitchenSnapshot) {
        self.name = snapshot.name;
        self.revision = snapshot.revision;
        self.topology = Topology::build(&snapshot.stations, snapshot.revision);
        self.board = Board::new();
        for entry in snapshot.orders {
            self.board.upsert(entry);
        }
        self.closed = false;
    }

    fn apply_delta(&mut self, envelope: Envelope) {
        if envelope.venue != self.venue || envelope.revision <= self.revision {
            return;
        }
        self.revision = envelope.revision;
        match envelope.delta {
            Delta::Stations { stations } => {
                self.topology = Topology::build(&stations, envelope.revision);
            }
            Delta::Progress {
                order_id,
                status,
                progress,
            } => self.board.apply_progress(&order_id, status, progress),
            Delta::OrderUpserted { entry } => self.board.upsert(entry),
            Delta::OrderRemoved { order_id } => {
                self.board.remove(&order_id);
            }
            Delta::VenueRenamed { name } => self.name = name,
            Delta::VenueClosed => self.closed = true,
        }
    }

    pub fn is_visible(&self, order_id: &OrderId, station_id: StationId) -> bool {
        match (self.board.get(order_id), self.topology.station(station_id)) {
            (Some(active), Some(station)) => is_visible(&active.progress, station, &self.topology),
            _ => false,
        }
    }

    /// Tickets for one station; empty for a station this mirror does not know.
    pub fn tickets(
        &self,
        station_id: StationId,
        now: DateTime<Utc>,
        thresholds: &UrgencyConfig,
    ) -> Vec<Ticket> {
        match self.topology.station(station_id) {
            Some(station) => self
                .board
                .tickets_for(station, &self.topology, now, thresholds),
            None => Vec::new(),
        }
    }
}
