use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::passenger::Passenger;

/// A flight and its full passenger manifest.
///
/// The manifest is held as two disjoint lists: `passengers` (seated, bounded
/// by `capacity` at allocation time) and `overbooked_passengers` (the bumped
/// remainder). Both lists are produced by the allocation engine whenever the
/// manifest is created or replaced wholesale; incremental adds append to the
/// seated list without re-running allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: Uuid,
    /// Free-form carrier code, e.g. `AR1500`. Not required to be unique.
    pub flight_code: String,
    pub capacity: u32,
    pub passengers: Vec<Passenger>,
    pub overbooked_passengers: Vec<Passenger>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flight listing entry: attributes only, no passenger lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSummary {
    pub id: Uuid,
    pub flight_code: String,
    pub capacity: u32,
}

/// Input for creating a new flight.
///
/// The candidate passenger list is partitioned into seated/overbooked by the
/// allocation engine before anything is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlightInput {
    pub flight_code: String,
    pub capacity: u32,
    #[serde(default)]
    pub passengers: Vec<Passenger>,
}

/// Input for a full flight update.
///
/// `passengers` is deliberately distinct from an empty list: when the field is
/// absent the stored manifest is left untouched, when present (even empty) the
/// whole manifest is replaced and re-allocated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFlightInput {
    pub flight_code: String,
    pub capacity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passengers: Option<Vec<Passenger>>,
}

/// Query parameters for listing flights.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFlightsQuery {
    /// Exact-match filter on the flight code.
    pub flight_code: Option<String>,
    /// Page size, 1–100. Defaults to 50.
    pub limit: Option<u32>,
    /// Rows to skip. Defaults to 0.
    pub offset: Option<u32>,
}
