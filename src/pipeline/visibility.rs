//! Pure visibility rules. The current station of an order is never stored; it is
//! recomputed here from the `bumped` set and the registry topology.

use crate::model::{PipelineProgress, Station, StationId};
use crate::registry::Topology;

/// Whether `station` should show an order with this progress.
///
/// A station that already bumped the order never shows it. A prep station shows it
/// once every earlier prep station has bumped it; an expo station once every prep
/// station has (immediately, when the venue has no prep stations).
pub fn is_visible(progress: &PipelineProgress, station: &Station, topology: &Topology) -> bool {
    if progress.is_bumped(station.id) {
        return false;
    }
    let upstream = if station.is_expo {
        topology.prep_chain()
    } else {
        topology.earlier_prep(station.id)
    };
    upstream.iter().all(|id| progress.is_bumped(*id))
}

/// Whether every line item of the order is checked off at `station`. Display aid only;
/// it never gates a bump.
pub fn all_items_done(progress: &PipelineProgress, station: StationId, item_count: usize) -> bool {
    (0..item_count).all(|index| progress.is_item_done(station, index))
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

    fn grill_fryer_expo() -> (Topology, Station, Station, Station) {
        let grill = station(1, 0, false);
        let fryer = station(2, 1, false);
        let expo = station(3, 2, true);
        let topology = Topology::build(&[grill.clone(), fryer.clone(), expo.clone()], 1);
        (topology, grill, fryer, expo)
    }

    #[test]
    fn new_order_is_visible_only_at_the_first_prep_station() {
        let (topology, grill, fryer, expo) = grill_fryer_expo();
        let progress = PipelineProgress::new();
        assert!(is_visible(&progress, &grill, &topology));
        assert!(!is_visible(&progress, &fryer, &topology));
        assert!(!is_visible(&progress, &expo, &topology));
    }

    #[test]
    fn order_moves_along_the_chain_as_stations_bump() {
        let (topology, grill, fryer, expo) = grill_fryer_expo();
        let mut progress = PipelineProgress::new();
        progress.mark_bumped(grill.id);
        assert!(!is_visible(&progress, &grill, &topology));
        assert!(is_visible(&progress, &fryer, &topology));
        assert!(!is_visible(&progress, &expo, &topology));

        progress.mark_bumped(fryer.id);
        assert!(is_visible(&progress, &expo, &topology));

        progress.mark_bumped(expo.id);
        let shown: Vec<_> = topology
            .stations()
            .iter()
            .filter(|s| is_visible(&progress, s, &topology))
            .collect();
        assert!(shown.is_empty());
    }

    #[test]
    fn out_of_order_bump_hides_only_the_bumping_station() {
        let (topology, grill, fryer, _) = grill_fryer_expo();
        let mut progress = PipelineProgress::new();
        progress.mark_bumped(fryer.id);
        assert!(is_visible(&progress, &grill, &topology));
        assert!(!is_visible(&progress, &fryer, &topology));
    }

    #[test]
    fn expo_only_venue_shows_every_unbumped_order() {
        let expo = station(1, 0, true);
        let topology = Topology::build(std::slice::from_ref(&expo), 1);
        let mut progress = PipelineProgress::new();
        assert!(is_visible(&progress, &expo, &topology));
        progress.mark_bumped(expo.id);
        assert!(!is_visible(&progress, &expo, &topology));
    }

    #[test]
    fn all_items_done_is_per_station() {
        let mut progress = PipelineProgress::new();
        progress.toggle_item(StationId(1), 0);
        assert!(!all_items_done(&progress, StationId(1), 2));
        progress.toggle_item(StationId(1), 1);
        assert!(all_items_done(&progress, StationId(1), 2));
        assert!(!all_items_done(&progress, StationId(2), 2));
    }
}
