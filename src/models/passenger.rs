use serde::{Deserialize, Serialize};

/// A traveler on one reservation.
///
/// Passenger identifiers are unique across the union of a flight's seated and
/// overbooked lists. Passengers sharing a `reservation_id` travel as one party
/// and are seated or bumped together, never split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    pub id: i64,
    pub name: String,
    pub has_connections: bool,
    pub age: u32,
    #[serde(default)]
    pub flight_category: FlightCategory,
    /// Grouping key: exact string equality defines the travel party.
    pub reservation_id: String,
    pub has_checked_baggage: bool,
}

/// A passenger's status tier, ordered by priority weight.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum FlightCategory {
    Black,
    Platinum,
    Gold,
    #[default]
    Normal,
}

impl FlightCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Black => "Black",
            Self::Platinum => "Platinum",
            Self::Gold => "Gold",
            Self::Normal => "Normal",
        }
    }
}

/// Input for patching one passenger. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePassengerInput {
    pub name: Option<String>,
    pub has_connections: Option<bool>,
    pub age: Option<u32>,
    pub flight_category: Option<FlightCategory>,
    pub reservation_id: Option<String>,
    pub has_checked_baggage: Option<bool>,
}

impl UpdatePassengerInput {
    /// Apply the supplied fields to a passenger, leaving the rest untouched.
    /// The passenger's identifier is never changed by a patch.
    pub fn apply(&self, passenger: &mut Passenger) {
        if let Some(name) = &self.name {
            passenger.name = name.clone();
        }
        if let Some(has_connections) = self.has_connections {
            passenger.has_connections = has_connections;
        }
        if let Some(age) = self.age {
            passenger.age = age;
        }
        if let Some(flight_category) = self.flight_category {
            passenger.flight_category = flight_category;
        }
        if let Some(reservation_id) = &self.reservation_id {
            passenger.reservation_id = reservation_id.clone();
        }
        if let Some(has_checked_baggage) = self.has_checked_baggage {
            passenger.has_checked_baggage = has_checked_baggage;
        }
    }
}

/// Equality filters for listing a flight's seated passengers.
///
/// Supplied fields are combined as a conjunction of exact-match predicates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerFilter {
    pub name: Option<String>,
    pub has_connections: Option<bool>,
    pub age: Option<u32>,
    pub flight_category: Option<FlightCategory>,
    pub reservation_id: Option<String>,
    pub has_checked_baggage: Option<bool>,
}

impl PassengerFilter {
    pub fn matches(&self, passenger: &Passenger) -> bool {
        if let Some(name) = &self.name {
            if passenger.name != *name {
                return false;
            }
        }
        if let Some(has_connections) = self.has_connections {
            if passenger.has_connections != has_connections {
                return false;
            }
        }
        if let Some(age) = self.age {
            if passenger.age != age {
                return false;
            }
        }
        if let Some(flight_category) = self.flight_category {
            if passenger.flight_category != flight_category {
                return false;
            }
        }
        if let Some(reservation_id) = &self.reservation_id {
            if passenger.reservation_id != *reservation_id {
                return false;
            }
        }
        if let Some(has_checked_baggage) = self.has_checked_baggage {
            if passenger.has_checked_baggage != has_checked_baggage {
                return false;
            }
        }
        true
    }
}
