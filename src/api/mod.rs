mod handlers;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;

pub fn create_router(db: Database) -> Router {
    let api = Router::new()
        // Flights
        .route("/flights", get(handlers::list_flights))
        .route("/flights", post(handlers::create_flight))
        .route("/flights/{id}", get(handlers::get_flight))
        .route("/flights/{id}", put(handlers::update_flight))
        .route("/flights/{id}", delete(handlers::delete_flight))
        // Passengers (seated manifest)
        .route("/flights/{id}/passengers", get(handlers::list_passengers))
        .route("/flights/{id}/passengers", post(handlers::add_passengers))
        .route(
            "/flights/{id}/passengers/{passenger_id}",
            get(handlers::get_passenger),
        )
        .route(
            "/flights/{id}/passengers/{passenger_id}",
            put(handlers::update_passenger),
        )
        .route(
            "/flights/{id}/passengers/{passenger_id}",
            delete(handlers::remove_passenger),
        )
        // Overbooked manifest (read-only)
        .route(
            "/flights/{id}/overbooked",
            get(handlers::overbooked_passengers),
        )
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db)
}
