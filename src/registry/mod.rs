//! # Station Registry
//!
//! The ordered list of stations for one venue. Prep stations form a chain ordered by
//! `(position, id)`; expo stations sit after the whole chain.
//!
//! The registry only knows about stations. Consequences for orders in flight (implicit
//! bumps when a station disappears or is inserted behind an order) are applied by the
//! [`Board`](crate::pipeline::Board), which receives the topology before and after each
//! structural change.

pub mod topology;

pub use topology::{Frontier, Topology};

use crate::kitchen_actor::KitchenError;
use crate::model::{Station, StationDraft, StationId};

const DEFAULT_STATION: &str = "Kitchen";
const DEFAULT_COLOR: &str = "#64748b";

#[derive(Debug, Clone)]
pub struct StationRegistry {
    next_id: u32,
    topology: Topology,
}

impl StationRegistry {
    /// Builds a registry from initial drafts, in order. An empty list seeds a single
    /// prep station so the venue starts with one.
    pub fn with_stations(drafts: Vec<StationDraft>) -> Result<Self, KitchenError> {
        let mut registry = Self {
            next_id: 1,
            topology: Topology::default(),
        };
        if drafts.is_empty() {
            registry.create(StationDraft::prep(DEFAULT_STATION, DEFAULT_COLOR))?;
        }
        for draft in drafts {
            registry.create(draft)?;
        }
        Ok(registry)
    }

    /// Stations ordered for display: the prep chain, then expo stations.
    pub fn list(&self) -> &[Station] {
        self.topology.stations()
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn get(&self, id: StationId) -> Result<&Station, KitchenError> {
        self.topology
            .station(id)
            .ok_or(KitchenError::StationNotFound(id))
    }

    /// Adds a station. Prep stations go after the current chain, expo stations after
    /// every station.
    pub fn create(&mut self, draft: StationDraft) -> Result<Station, KitchenError> {
        validate_name(&draft.name)?;
        let mut stations = self.list().to_vec();
        let position = if draft.is_expo {
            stations.iter().map(|s| s.position).max()
        } else {
            stations
                .iter()
                .filter(|s| !s.is_expo)
                .map(|s| s.position)
                .max()
        }
        .map_or(Some(0), |max| max.checked_add(1))
        .ok_or_else(|| {
            KitchenError::Validation("no position left after the last station".into())
        })?;

        let next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| KitchenError::Validation("station ids exhausted".into()))?;
        let station = Station {
            id: StationId(self.next_id),
            name: draft.name,
            color: draft.color,
            categories: draft.categories,
            position,
            is_expo: draft.is_expo,
        };
        self.next_id = next_id;

        stations.push(station.clone());
        self.rebuild(stations);
        Ok(station)
    }

    pub fn rename(&mut self, id: StationId, name: String) -> Result<Station, KitchenError> {
        validate_name(&name)?;
        self.edit(id, |station| station.name = name)
    }

    pub fn recolor(&mut self, id: StationId, color: String) -> Result<Station, KitchenError> {
        self.edit(id, |station| station.color = color)
    }

    /// Moves a station to an explicit position. Other stations keep theirs; equal
    /// positions are ordered by id.
    pub fn reposition(&mut self, id: StationId, position: i64) -> Result<Station, KitchenError> {
        self.edit(id, |station| station.position = position)
    }

    /// Removes a station, refusing to remove the last one.
    pub fn delete(&mut self, id: StationId) -> Result<Station, KitchenError> {
        let removed = self.get(id)?.clone();
        if self.list().len() == 1 {
            return Err(KitchenError::LastStation);
        }
        let stations = self
            .list()
            .iter()
            .filter(|station| station.id != id)
            .cloned()
            .collect();
        self.rebuild(stations);
        Ok(removed)
    }

    fn edit(
        &mut self,
        id: StationId,
        apply: impl FnOnce(&mut Station),
    ) -> Result<Station, KitchenError> {
        let mut stations = self.list().to_vec();
        let station = stations
            .iter_mut()
            .find(|station| station.id == id)
            .ok_or(KitchenError::StationNotFound(id))?;
        apply(station);
        let edited = station.clone();
        self.rebuild(stations);
        Ok(edited)
    }

    fn rebuild(&mut self, stations: Vec<Station>) {
        self.topology = Topology::build(&stations, self.topology.version() + 1);
    }
}

fn validate_name(name: &str) -> Result<(), KitchenError> {
    if name.trim().is_empty() {
        return Err(KitchenError::Validation("station name must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grill_fryer_expo() -> StationRegistry {
        StationRegistry::with_stations(vec![
            StationDraft::prep("Grill", "#f97316"),
            StationDraft::prep("Fryer", "#eab308"),
            StationDraft::expo("Expo", "#22c55e"),
        ])
        .unwrap()
    }

    #[test]
    fn empty_registry_is_seeded_with_one_station() {
        let registry = StationRegistry::with_stations(Vec::new()).unwrap();
        assert_eq!(registry.list().len(), 1);
        assert!(!registry.list()[0].is_expo);
    }

    #[test]
    fn create_assigns_positions_after_the_chain() {
        let mut registry = grill_fryer_expo();
        let positions: Vec<_> = registry.list().iter().map(|s| (s.name.as_str(), s.position)).collect();
        assert_eq!(positions, vec![("Grill", 0), ("Fryer", 1), ("Expo", 2)]);

        let drinks = registry.create(StationDraft::prep("Drinks", "#0ea5e9")).unwrap();
        assert_eq!(drinks.position, 2);
        let names: Vec<_> = registry.list().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Grill", "Fryer", "Drinks", "Expo"]);
        assert!(registry.topology().is_last_prep(drinks.id));

        let pass = registry.create(StationDraft::expo("Pass", "#a855f7")).unwrap();
        assert_eq!(pass.position, 3);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut registry = grill_fryer_expo();
        let fryer = registry.list()[1].id;
        registry.delete(fryer).unwrap();
        let next = registry.create(StationDraft::prep("Wok", "#ef4444")).unwrap();
        assert_ne!(next.id, fryer);
    }

    #[test]
    fn last_station_cannot_be_deleted() {
        let mut registry = StationRegistry::with_stations(vec![StationDraft::expo("Expo", "#fff")]).unwrap();
        let only = registry.list()[0].id;
        assert_eq!(registry.delete(only), Err(KitchenError::LastStation));
        assert_eq!(registry.list().len(), 1);
    }

    #[test]
    fn metadata_edits_do_not_move_stations() {
        let mut registry = grill_fryer_expo();
        let grill = registry.list()[0].id;
        let before = registry.topology().prep_chain().to_vec();
        registry.rename(grill, "Broiler".into()).unwrap();
        registry.recolor(grill, "#111".into()).unwrap();
        assert_eq!(registry.topology().prep_chain(), before.as_slice());
        assert_eq!(registry.get(grill).unwrap().name, "Broiler");
        assert!(matches!(
            registry.rename(grill, "  ".into()),
            Err(KitchenError::Validation(_))
        ));
    }

    #[test]
    fn reposition_reorders_the_chain_and_bumps_version() {
        let mut registry = grill_fryer_expo();
        let grill = registry.list()[0].id;
        let fryer = registry.list()[1].id;
        let version = registry.topology().version();
        registry.reposition(grill, 5).unwrap();
        assert_eq!(registry.topology().prep_chain(), &[fryer, grill]);
        assert!(registry.topology().version() > version);
        assert_eq!(
            registry.reposition(StationId(99), 0),
            Err(KitchenError::StationNotFound(StationId(99)))
        );
    }

    #[test]
    fn create_after_a_station_at_the_top_position_is_rejected() {
        let mut registry = grill_fryer_expo();
        let grill = registry.list()[0].id;
        registry.reposition(grill, i64::MAX).unwrap();
        let version = registry.topology().version();

        assert!(matches!(
            registry.create(StationDraft::prep("Drinks", "#0ea5e9")),
            Err(KitchenError::Validation(_))
        ));
        assert!(matches!(
            registry.create(StationDraft::expo("Pass", "#a855f7")),
            Err(KitchenError::Validation(_))
        ));
        assert_eq!(registry.list().len(), 3);
        assert_eq!(registry.topology().version(), version);
        assert!(registry.topology().is_last_prep(grill));
    }
}
