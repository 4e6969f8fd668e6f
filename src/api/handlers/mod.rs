use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::db::Database;
use crate::models::*;
use crate::service::{self, ServiceError};

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
/// The full error is logged server-side for debugging, but clients only
/// see a generic message to avoid leaking internal details.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

/// Map a service outcome for a flight-scoped operation to a response.
fn flight_error(id: Uuid, e: ServiceError) -> (StatusCode, String) {
    match e {
        ServiceError::FlightNotFound => (StatusCode::NOT_FOUND, format!("Flight {id} not found")),
        ServiceError::PassengerNotFound => (
            StatusCode::NOT_FOUND,
            format!("No matching passenger in flight {id}"),
        ),
        ServiceError::DuplicatePassenger(e) => (StatusCode::CONFLICT, e.to_string()),
        ServiceError::Storage(e) => internal_error(e),
    }
}

/// Map a service outcome for a passenger-scoped operation to a response.
fn passenger_error(flight_id: Uuid, passenger_id: i64, e: ServiceError) -> (StatusCode, String) {
    match e {
        ServiceError::FlightNotFound => (
            StatusCode::NOT_FOUND,
            format!("Flight {flight_id} not found"),
        ),
        ServiceError::PassengerNotFound => (
            StatusCode::NOT_FOUND,
            format!("Passenger {passenger_id} not found in flight {flight_id}"),
        ),
        ServiceError::DuplicatePassenger(e) => (StatusCode::CONFLICT, e.to_string()),
        ServiceError::Storage(e) => internal_error(e),
    }
}

fn check_capacity(capacity: u32) -> Result<(), (StatusCode, String)> {
    if capacity < 1 {
        return Err((
            StatusCode::BAD_REQUEST,
            "Capacity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Flights
// ============================================================

pub async fn list_flights(
    State(db): State<Database>,
    Query(query): Query<ListFlightsQuery>,
) -> Result<Json<Vec<FlightSummary>>, (StatusCode, String)> {
    service::list_flights(&db, &query)
        .map(Json)
        .map_err(internal_error)
}

pub async fn get_flight(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Flight>, (StatusCode, String)> {
    service::get_flight(&db, id)
        .map(Json)
        .map_err(|e| flight_error(id, e))
}

pub async fn create_flight(
    State(db): State<Database>,
    Json(input): Json<CreateFlightInput>,
) -> Result<(StatusCode, Json<Flight>), (StatusCode, String)> {
    check_capacity(input.capacity)?;
    service::create_flight(&db, input)
        .map(|f| (StatusCode::CREATED, Json(f)))
        .map_err(|e| match e {
            ServiceError::DuplicatePassenger(e) => (StatusCode::CONFLICT, e.to_string()),
            other => internal_error(other),
        })
}

pub async fn update_flight(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateFlightInput>,
) -> Result<Json<Flight>, (StatusCode, String)> {
    check_capacity(input.capacity)?;
    service::update_flight(&db, id, input)
        .map(Json)
        .map_err(|e| flight_error(id, e))
}

pub async fn delete_flight(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    service::delete_flight(&db, id)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| flight_error(id, e))
}

// ============================================================
// Passengers
// ============================================================

pub async fn add_passengers(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(passengers): Json<Vec<Passenger>>,
) -> Result<(StatusCode, Json<Vec<Passenger>>), (StatusCode, String)> {
    service::add_passengers(&db, id, passengers)
        .map(|p| (StatusCode::CREATED, Json(p)))
        .map_err(|e| flight_error(id, e))
}

pub async fn list_passengers(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Query(filter): Query<PassengerFilter>,
) -> Result<Json<Vec<Passenger>>, (StatusCode, String)> {
    service::list_passengers(&db, id, &filter)
        .map(Json)
        .map_err(|e| flight_error(id, e))
}

pub async fn get_passenger(
    State(db): State<Database>,
    Path((id, passenger_id)): Path<(Uuid, i64)>,
) -> Result<Json<Passenger>, (StatusCode, String)> {
    service::get_passenger(&db, id, passenger_id)
        .map(Json)
        .map_err(|e| passenger_error(id, passenger_id, e))
}

pub async fn update_passenger(
    State(db): State<Database>,
    Path((id, passenger_id)): Path<(Uuid, i64)>,
    Json(input): Json<UpdatePassengerInput>,
) -> Result<Json<Passenger>, (StatusCode, String)> {
    service::update_passenger(&db, id, passenger_id, input)
        .map(Json)
        .map_err(|e| passenger_error(id, passenger_id, e))
}

pub async fn remove_passenger(
    State(db): State<Database>,
    Path((id, passenger_id)): Path<(Uuid, i64)>,
) -> Result<StatusCode, (StatusCode, String)> {
    service::remove_passengers(&db, id, &[passenger_id])
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| passenger_error(id, passenger_id, e))
}

pub async fn overbooked_passengers(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Passenger>>, (StatusCode, String)> {
    service::overbooked_passengers(&db, id)
        .map(Json)
        .map_err(|e| flight_error(id, e))
}
