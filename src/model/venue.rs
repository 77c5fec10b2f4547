use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifier of a venue (one restaurant location). Every station list and progress map
/// is scoped by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VenueId(pub String);

impl From<&str> for VenueId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for VenueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
