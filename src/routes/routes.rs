//! Defines routes for trips and bookings.
//!
//! ## Structure
//! - **Public trip endpoints**
//!   - `GET /trips`         — list active trips with free seats
//!   - `GET /trips/search`  — filter by cities and departure date
//!   - `GET /trips/{id}`    — trip detail with bookings
//!
//! - **Authenticated endpoints** (caller id from `X-User-Id`)
//!   - `POST /trips`                    — publish a trip
//!   - `GET  /bookings`                 — caller's booking history
//!   - `POST /bookings`                 — book seats on a trip
//!   - `PUT  /bookings/{id}/cancel`     — cancel a booking
//!
//! `/trips/search` is registered before `/trips/{id}` so the literal
//! segment wins over the id capture.

use crate::{
    handlers::{
        booking_handlers::{cancel_booking, create_booking, list_bookings},
        health_handlers::{healthz, readyz},
        trip_handlers::{create_trip, get_trip, list_trips, search_trips},
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, put},
};

/// Build and return the router for all trip and booking routes.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Trip routes
        .route("/trips", get(list_trips).post(create_trip))
        .route("/trips/search", get(search_trips))
        .route("/trips/{id}", get(get_trip))
        // Booking routes
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/{id}/cancel", put(cancel_booking))
}
