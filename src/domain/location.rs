//! Service location records.

use serde::{Deserialize, Serialize};

use crate::id::{generate_id, now_ms};

/// A city/state area a client serves.
///
/// At most one location per client is the headquarters. Locations with
/// generated content are deactivated instead of deleted so existing content
/// items keep a valid reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceLocation {
    /// Record ID: "loc-{timestamp}-{hex}"
    pub id: String,

    /// Owning client
    pub client_id: String,

    pub city: String,

    pub state: String,

    /// Optional neighborhood for finer-grained targeting
    pub neighborhood: Option<String>,

    pub is_active: bool,

    /// At most one per client
    pub is_headquarters: bool,

    /// Unix timestamp in milliseconds
    pub created_at: i64,
}

impl ServiceLocation {
    /// Create a new active, non-headquarters location.
    pub fn new(client_id: &str, city: &str, state: &str) -> Self {
        Self {
            id: generate_id("loc"),
            client_id: client_id.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            neighborhood: None,
            is_active: true,
            is_headquarters: false,
            created_at: now_ms(),
        }
    }

    /// Set the neighborhood.
    pub fn with_neighborhood(mut self, neighborhood: &str) -> Self {
        self.neighborhood = Some(neighborhood.to_string());
        self
    }

    /// Mark as the client's headquarters.
    pub fn as_headquarters(mut self) -> Self {
        self.is_headquarters = true;
        self
    }

    /// The name substituted for `{location}` in question templates:
    /// "Neighborhood, City" when a neighborhood is set, else "City, State".
    pub fn display_name(&self) -> String {
        match &self.neighborhood {
            Some(neighborhood) => format!("{}, {}", neighborhood, self.city),
            None => format!("{}, {}", self.city, self.state),
        }
    }
}
