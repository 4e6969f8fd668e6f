//! Logical operations on flights and their manifests.
//!
//! Each function composes the allocation core with the repository: allocation
//! and the uniqueness guard run to completion in memory first, and storage is
//! only touched afterwards. Outcomes are explicit [`ServiceError`] values;
//! the transport layer decides how to present them.

use std::collections::HashSet;

use thiserror::Error;
use uuid::Uuid;

use crate::allocation::{self, DuplicatePassengerError};
use crate::db::Database;
use crate::models::*;

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("flight not found")]
    FlightNotFound,
    /// The flight exists but no passenger matched the given identifier.
    #[error("passenger not found")]
    PassengerNotFound,
    #[error(transparent)]
    DuplicatePassenger(#[from] DuplicatePassengerError),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub fn list_flights(
    db: &Database,
    query: &ListFlightsQuery,
) -> Result<Vec<FlightSummary>, ServiceError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);
    Ok(db.list_flights(query.flight_code.as_deref(), limit, offset)?)
}

pub fn get_flight(db: &Database, id: Uuid) -> Result<Flight, ServiceError> {
    db.get_flight(id)?.ok_or(ServiceError::FlightNotFound)
}

/// Create a flight from a candidate passenger list.
///
/// The candidates are partitioned by the allocation engine, both resulting
/// subsets pass the uniqueness guard against empty existing state, and only
/// then is the flight written, in a single insert.
pub fn create_flight(db: &Database, input: CreateFlightInput) -> Result<Flight, ServiceError> {
    let allocation = allocation::allocate(input.passengers, input.capacity as usize);
    let no_existing = HashSet::new();
    allocation::check_unique(&no_existing, &allocation.seated)?;
    allocation::check_unique(&no_existing, &allocation.overbooked)?;

    Ok(db.insert_flight(
        &input.flight_code,
        input.capacity,
        allocation.seated,
        allocation.overbooked,
    )?)
}

/// Replace a flight's attributes, re-allocating the manifest when the update
/// carries a passenger list and leaving it untouched when it does not.
pub fn update_flight(
    db: &Database,
    id: Uuid,
    input: UpdateFlightInput,
) -> Result<Flight, ServiceError> {
    let manifests = match input.passengers {
        Some(candidates) => {
            let allocation = allocation::allocate(candidates, input.capacity as usize);
            let no_existing = HashSet::new();
            allocation::check_unique(&no_existing, &allocation.seated)?;
            allocation::check_unique(&no_existing, &allocation.overbooked)?;
            Some((allocation.seated, allocation.overbooked))
        }
        None => None,
    };

    db.update_flight(id, &input.flight_code, input.capacity, manifests)?
        .ok_or(ServiceError::FlightNotFound)
}

pub fn delete_flight(db: &Database, id: Uuid) -> Result<(), ServiceError> {
    if db.delete_flight(id)? {
        Ok(())
    } else {
        Err(ServiceError::FlightNotFound)
    }
}

/// Append passengers to the seated list, without re-running allocation.
///
/// Uniqueness is checked against the flight's current seated identifiers;
/// a rejected batch leaves storage untouched. Capacity is not re-checked
/// here: repeated adds may push the seated count past `capacity`.
pub fn add_passengers(
    db: &Database,
    id: Uuid,
    passengers: Vec<Passenger>,
) -> Result<Vec<Passenger>, ServiceError> {
    let flight = db.get_flight(id)?.ok_or(ServiceError::FlightNotFound)?;
    let existing: HashSet<i64> = flight.passengers.iter().map(|p| p.id).collect();
    allocation::check_unique(&existing, &passengers)?;

    if !db.append_passengers(id, &passengers)? {
        return Err(ServiceError::FlightNotFound);
    }
    Ok(passengers)
}

pub fn remove_passengers(
    db: &Database,
    id: Uuid,
    passenger_ids: &[i64],
) -> Result<(), ServiceError> {
    match db.remove_passengers(id, passenger_ids)? {
        None => Err(ServiceError::FlightNotFound),
        Some(0) => Err(ServiceError::PassengerNotFound),
        Some(_) => Ok(()),
    }
}

pub fn update_passenger(
    db: &Database,
    id: Uuid,
    passenger_id: i64,
    input: UpdatePassengerInput,
) -> Result<Passenger, ServiceError> {
    db.get_flight(id)?.ok_or(ServiceError::FlightNotFound)?;
    db.patch_passenger(id, passenger_id, &input)?
        .ok_or(ServiceError::PassengerNotFound)
}

pub fn get_passenger(db: &Database, id: Uuid, passenger_id: i64) -> Result<Passenger, ServiceError> {
    db.find_passenger(id, passenger_id)?
        .ok_or(ServiceError::PassengerNotFound)
}

pub fn list_passengers(
    db: &Database,
    id: Uuid,
    filter: &PassengerFilter,
) -> Result<Vec<Passenger>, ServiceError> {
    db.list_passengers(id, filter)?
        .ok_or(ServiceError::FlightNotFound)
}

pub fn overbooked_passengers(db: &Database, id: Uuid) -> Result<Vec<Passenger>, ServiceError> {
    Ok(get_flight(db, id)?.overbooked_passengers)
}
