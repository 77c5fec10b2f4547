//! Precomputed station ordering for one registry version.

use crate::model::{PipelineProgress, Station, StationId};
use std::collections::HashMap;

/// Where an order sits in the prep chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frontier {
    /// Earliest prep station that has not bumped the order.
    Prep(StationId),
    /// Every registered prep station has bumped the order.
    Cleared,
}

/// The prep chain and expo set of a registry, computed once per registry version.
///
/// Visibility and exhaustion checks read this instead of rescanning the station list,
/// and the registry rebuilds it after every mutation.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    version: u64,
    stations: Vec<Station>,
    index: HashMap<StationId, usize>,
    prep_chain: Vec<StationId>,
    chain_rank: HashMap<StationId, usize>,
    expo: Vec<StationId>,
}

impl Topology {
    pub fn build(stations: &[Station], version: u64) -> Self {
        let mut sorted = stations.to_vec();
        sorted.sort_by_key(Station::sort_key);

        let index = sorted
            .iter()
            .enumerate()
            .map(|(i, station)| (station.id, i))
            .collect();
        let prep_chain: Vec<StationId> = sorted
            .iter()
            .filter(|station| !station.is_expo)
            .map(|station| station.id)
            .collect();
        let chain_rank = prep_chain
            .iter()
            .enumerate()
            .map(|(rank, id)| (*id, rank))
            .collect();
        let expo = sorted
            .iter()
            .filter(|station| station.is_expo)
            .map(|station| station.id)
            .collect();

        Self {
            version,
            stations: sorted,
            index,
            prep_chain,
            chain_rank,
            expo,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// All stations: prep chain first, then expo stations, each by `(position, id)`.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.index.get(&id).map(|&i| &self.stations[i])
    }

    pub fn prep_chain(&self) -> &[StationId] {
        &self.prep_chain
    }

    pub fn expo_stations(&self) -> &[StationId] {
        &self.expo
    }

    /// Prep stations ahead of `id` in the chain. Empty for expo or unknown stations.
    pub fn earlier_prep(&self, id: StationId) -> &[StationId] {
        match self.chain_rank.get(&id) {
            Some(&rank) => &self.prep_chain[..rank],
            None => &[],
        }
    }

    pub fn is_last_prep(&self, id: StationId) -> bool {
        self.prep_chain.last() == Some(&id)
    }

    /// Whether bumping `station` exhausts the pipeline for an order.
    pub fn exhausts(&self, station: &Station) -> bool {
        station.is_expo || self.is_last_prep(station.id)
    }

    pub fn frontier(&self, progress: &PipelineProgress) -> Frontier {
        self.prep_chain
            .iter()
            .find(|id| !progress.is_bumped(**id))
            .map_or(Frontier::Cleared, |id| Frontier::Prep(*id))
    }

    /// Whether `station`, placed in this topology, sits at or before `frontier` as
    /// computed against an earlier topology. Orders past the slot must not be pulled
    /// back to it.
    pub fn precedes(&self, station: StationId, frontier: Frontier) -> bool {
        let Some(candidate) = self.station(station) else {
            return false;
        };
        match frontier {
            Frontier::Cleared => true,
            Frontier::Prep(current) if current == station => false,
            Frontier::Prep(current) => match self.station(current) {
                Some(current) => candidate.sort_key() < current.sort_key(),
                None => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: u32, position: i64, is_expo: bool) -> Station {
        Station {
            id: StationId(id),
            name: format!("s{id}"),
            color: "#000".into(),
            categories: Vec::new(),
            position,
            is_expo,
        }
    }

    #[test]
    fn chain_orders_by_position_then_id() {
        let topology = Topology::build(
            &[
                station(5, 1, false),
                station(9, 0, true),
                station(3, 1, false),
                station(7, 0, false),
            ],
            1,
        );
        assert_eq!(
            topology.prep_chain(),
            &[StationId(7), StationId(3), StationId(5)]
        );
        assert_eq!(topology.expo_stations(), &[StationId(9)]);
        assert_eq!(topology.stations().last().map(|s| s.id), Some(StationId(9)));
        assert!(topology.is_last_prep(StationId(5)));
        assert_eq!(topology.earlier_prep(StationId(3)), &[StationId(7)]);
        assert!(topology.earlier_prep(StationId(9)).is_empty());
    }

    #[test]
    fn frontier_is_earliest_unbumped_prep() {
        let topology = Topology::build(&[station(1, 0, false), station(2, 1, false)], 1);
        let mut progress = PipelineProgress::new();
        assert_eq!(topology.frontier(&progress), Frontier::Prep(StationId(1)));
        progress.mark_bumped(StationId(2));
        assert_eq!(topology.frontier(&progress), Frontier::Prep(StationId(1)));
        progress.mark_bumped(StationId(1));
        assert_eq!(topology.frontier(&progress), Frontier::Cleared);
    }

    #[test]
    fn precedes_compares_against_the_frontier_slot() {
        let topology = Topology::build(
            &[station(1, 0, false), station(2, 5, false), station(3, 2, false)],
            2,
        );
        assert!(topology.precedes(StationId(3), Frontier::Prep(StationId(2))));
        assert!(!topology.precedes(StationId(2), Frontier::Prep(StationId(3))));
        assert!(!topology.precedes(StationId(2), Frontier::Prep(StationId(2))));
        assert!(topology.precedes(StationId(2), Frontier::Cleared));
    }
}
