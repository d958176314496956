//! HTTP handlers for the booking ledger.
//!
//! Every booking/cancellation attempt emits a structured audit event with
//! the operation, caller, trip, seat count, resulting status code and
//! duration, whether the attempt succeeded or not.

use crate::{auth::CallerId, errors::AppError, state::AppState};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::time::Instant;
use uuid::Uuid;

/// Request body for `POST /bookings`.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub trip_id: Uuid,
    pub seats_booked: i64,
}

/// GET `/bookings` — the caller's booking history, newest first.
pub async fn list_bookings(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.bookings.list_bookings(user_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": bookings,
    })))
}

/// POST `/bookings` — book seats on a trip.
pub async fn create_booking(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Response, AppError> {
    let started = Instant::now();

    match state
        .bookings
        .book_trip(user_id, req.trip_id, req.seats_booked)
        .await
    {
        Ok(outcome) => {
            audit(
                "book_trip",
                user_id,
                Some(req.trip_id),
                Some(req.seats_booked),
                StatusCode::CREATED,
                started,
            );

            let body = Json(json!({
                "success": true,
                "message": "Booking confirmed",
                "data": outcome.booking,
                "remaining_seats": outcome.remaining_seats,
            }));
            Ok((StatusCode::CREATED, body).into_response())
        }
        Err(err) => {
            let app_err = AppError::from(err);
            audit(
                "book_trip",
                user_id,
                Some(req.trip_id),
                Some(req.seats_booked),
                app_err.status,
                started,
            );
            Err(app_err)
        }
    }
}

/// PUT `/bookings/{id}/cancel` — cancel a booking and return its seats.
pub async fn cancel_booking(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Path(booking_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let started = Instant::now();

    match state.bookings.cancel_booking(user_id, booking_id).await {
        Ok(seats_returned) => {
            audit(
                "cancel_booking",
                user_id,
                None,
                Some(seats_returned),
                StatusCode::OK,
                started,
            );

            let body = Json(json!({
                "success": true,
                "message": "Booking cancelled",
                "seats_returned": seats_returned,
            }));
            Ok(body.into_response())
        }
        Err(err) => {
            let app_err = AppError::for_cancellation(err);
            audit("cancel_booking", user_id, None, None, app_err.status, started);
            Err(app_err)
        }
    }
}

/// Structured audit event consumed by the log sink.
fn audit(
    operation: &'static str,
    user_id: Uuid,
    trip_id: Option<Uuid>,
    seats_booked: Option<i64>,
    status: StatusCode,
    started: Instant,
) {
    tracing::info!(
        target: "booking_audit",
        operation,
        user_id = %user_id,
        trip_id = ?trip_id,
        seats_booked = ?seats_booked,
        status_code = status.as_u16(),
        duration_ms = started.elapsed().as_millis() as u64,
        "booking operation"
    );
}
