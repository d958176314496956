//! HTTP handlers for trip CRUD and search. Read endpoints are public;
//! publishing a trip requires an authenticated caller, who becomes the
//! driver.

use crate::{
    auth::CallerId,
    errors::AppError,
    models::{booking::Booking, trip::Trip},
    services::trip_service::{NewTrip, TripSearch},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Request body for `POST /trips`.
#[derive(Debug, Deserialize)]
pub struct CreateTripRequest {
    pub departure_city: String,
    pub arrival_city: String,
    pub departure_time: DateTime<Utc>,
    pub total_seats: i64,
    pub price_per_seat: f64,
    pub description: Option<String>,
}

/// Query params accepted by `GET /trips/search`.
#[derive(Debug, Deserialize)]
pub struct TripSearchQuery {
    pub departure_city: Option<String>,
    pub arrival_city: Option<String>,
    pub departure_date: Option<NaiveDate>,
}

#[derive(Serialize)]
struct TripDetail {
    #[serde(flatten)]
    trip: Trip,
    bookings: Vec<Booking>,
}

/// GET `/trips` — active trips with free seats.
pub async fn list_trips(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let trips = state.trips.list_trips().await?;

    Ok(Json(json!({
        "success": true,
        "data": trips,
    })))
}

/// GET `/trips/search` — filter by city substrings and departure day.
pub async fn search_trips(
    State(state): State<AppState>,
    Query(q): Query<TripSearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let trips = state
        .trips
        .search_trips(TripSearch {
            departure_city: q.departure_city,
            arrival_city: q.arrival_city,
            departure_date: q.departure_date,
        })
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": trips,
    })))
}

/// GET `/trips/{id}` — trip detail including its bookings.
pub async fn get_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (trip, bookings) = state.trips.get_trip(trip_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": TripDetail { trip, bookings },
    })))
}

/// POST `/trips` — publish a trip; the caller is the driver.
pub async fn create_trip(
    State(state): State<AppState>,
    CallerId(driver_id): CallerId,
    Json(req): Json<CreateTripRequest>,
) -> Result<impl IntoResponse, AppError> {
    let trip = state
        .trips
        .create_trip(
            driver_id,
            NewTrip {
                departure_city: req.departure_city,
                arrival_city: req.arrival_city,
                departure_time: req.departure_time,
                total_seats: req.total_seats,
                price_per_seat: req.price_per_seat,
                description: req.description,
            },
        )
        .await?;

    let body = Json(json!({
        "success": true,
        "message": "Trip created",
        "data": trip,
    }));
    Ok((StatusCode::CREATED, body))
}
