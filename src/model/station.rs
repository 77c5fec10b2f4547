//! A preparation station (Grill, Fryer, Drinks) or the terminal quality check (Expo).
//!
//! Stations are owned by the [`StationRegistry`](crate::registry::StationRegistry) of a
//! venue; see [`Topology`](crate::registry::Topology) for how they are ordered.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Stations. Allocated by the registry and never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct StationId(pub u32);

impl From<u32> for StationId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for StationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "station_{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    /// UI accent only.
    pub color: String,
    /// Menu categories the station claims. Advisory: every station sees every item.
    #[serde(default)]
    pub categories: Vec<String>,
    pub position: i64,
    pub is_expo: bool,
}

impl Station {
    /// Sort key used everywhere stations are ordered: prep before expo, then
    /// `(position, id)`.
    pub fn sort_key(&self) -> (bool, i64, StationId) {
        (self.is_expo, self.position, self.id)
    }
}

/// Payload for creating a new station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationDraft {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub is_expo: bool,
}

impl StationDraft {
    /// A prep station draft.
    pub fn prep(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            categories: Vec::new(),
            is_expo: false,
        }
    }

    /// An expo station draft.
    pub fn expo(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            is_expo: true,
            ..Self::prep(name, color)
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }
}
