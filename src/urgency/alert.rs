//! New-order detection. The engine only emits events; playing a chime is up to the
//! [`AlertSink`] a display installs.

use crate::model::VenueId;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertEvent {
    /// The active count grew; `active` is the new count.
    NewOrder { active: usize },
    /// The last active order left the kitchen.
    NoneRemaining,
}

/// Tracks the last seen active count and reports changes that deserve an alert.
///
/// The first observation only sets the baseline, so opening a display on a busy kitchen
/// does not chime. A repeated count emits nothing.
#[derive(Debug, Default)]
pub struct NewOrderDetector {
    last_seen: Option<usize>,
}

impl NewOrderDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, active: usize) -> Option<AlertEvent> {
        let previous = self.last_seen.replace(active)?;
        if active > previous {
            Some(AlertEvent::NewOrder { active })
        } else if active == 0 && previous > 0 {
            Some(AlertEvent::NoneRemaining)
        } else {
            None
        }
    }
}

/// Receiver of alert events for a venue.
pub trait AlertSink: Send + Sync {
    fn on_new_order(&self, venue: &VenueId, active: usize);

    fn on_none_remaining(&self, venue: &VenueId);

    fn dispatch(&self, venue: &VenueId, event: AlertEvent) {
        match event {
            AlertEvent::NewOrder { active } => self.on_new_order(venue, active),
            AlertEvent::NoneRemaining => self.on_none_remaining(venue),
        }
    }
}

/// Writes alerts to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn on_new_order(&self, venue: &VenueId, active: usize) {
        info!(%venue, active, "New order");
    }

    fn on_none_remaining(&self, venue: &VenueId) {
        info!(%venue, "No orders remaining");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_is_the_baseline() {
        let mut detector = NewOrderDetector::new();
        assert_eq!(detector.observe(3), None);
    }

    #[test]
    fn growth_alerts_once() {
        let mut detector = NewOrderDetector::new();
        detector.observe(1);
        assert_eq!(detector.observe(2), Some(AlertEvent::NewOrder { active: 2 }));
        assert_eq!(detector.observe(2), None);
        assert_eq!(detector.observe(1), None);
        assert_eq!(detector.observe(2), Some(AlertEvent::NewOrder { active: 2 }));
    }

    #[test]
    fn draining_to_zero_is_reported_once() {
        let mut detector = NewOrderDetector::new();
        detector.observe(2);
        assert_eq!(detector.observe(0), Some(AlertEvent::NoneRemaining));
        assert_eq!(detector.observe(0), None);
        assert_eq!(detector.observe(1), Some(AlertEvent::NewOrder { active: 1 }));
    }
}
