//! # Urgency & Alerts
//!
//! Age-based urgency of an order and new-order detection over the active count.

pub mod alert;

pub use alert::{AlertEvent, AlertSink, LogAlertSink, NewOrderDetector};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Normal,
    Warning,
    Urgent,
}

/// Age thresholds, in seconds since the order was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyConfig {
    /// Age at which an order turns `Warning` (inclusive).
    pub warning_after_secs: u64,
    /// Age past which an order turns `Urgent` (exclusive).
    pub urgent_after_secs: u64,
}

impl Default for UrgencyConfig {
    fn default() -> Self {
        Self {
            warning_after_secs: 600,
            urgent_after_secs: 1200,
        }
    }
}

impl UrgencyConfig {
    pub fn classify(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> Urgency {
        let age = now.signed_duration_since(created_at);
        if age > secs(self.urgent_after_secs) {
            Urgency::Urgent
        } else if age >= secs(self.warning_after_secs) {
            Urgency::Warning
        } else {
            Urgency::Normal
        }
    }
}

fn secs(value: u64) -> Duration {
    let max = i64::MAX / 1000;
    Duration::seconds(i64::try_from(value).map_or(max, |value| value.min(max)))
}

/// Urgency with the default thresholds (10 and 20 minutes).
pub fn urgency(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Urgency {
    UrgencyConfig::default().classify(created_at, now)
}
