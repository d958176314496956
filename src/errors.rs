use crate::services::{booking_service::BookingError, trip_service::TripError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for request failures that keeps the message local.
///
/// Business-rule rejections carry the message verbatim; infrastructure and
/// race faults are collapsed into a generic retryable failure with a machine
/// `error_code` so callers can distinguish "retry" from "don't bother".
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub error_code: Option<&'static str>,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            error_code: None,
        }
    }

    /// Shortcut for a 500 Internal Server Error with a machine code.
    pub fn internal(msg: impl Into<String>, code: &'static str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
            error_code: Some(code),
        }
    }

    /// Shortcut for 404 Not Found.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 400 Bad Request.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Map a booking-service error for the cancellation path, where the
    /// generic retryable failures carry `CANCELLATION_FAILED` instead of
    /// `BOOKING_FAILED`.
    pub fn for_cancellation(err: BookingError) -> Self {
        match err {
            BookingError::Storage(_) | BookingError::RaceDetected => AppError::internal(
                "Cancellation failed. Please try again.",
                "CANCELLATION_FAILED",
            ),
            other => other.into(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "message": self.message,
            "status": self.status.as_u16(),
            "error_code": self.error_code,
        }));

        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string(), "INTERNAL_ERROR")
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        use BookingError::*;
        match &err {
            TripNotFound => AppError::not_found(err.to_string()),
            BookingNotFound => AppError::not_found(err.to_string()),
            SelfBooking
            | TripFull
            | InsufficientSeats { .. }
            | DuplicateBooking
            | TripDeparted
            | InvalidSeatCount(_)
            | AlreadyCancelled
            | CancellationWindowClosed => AppError::bad_request(err.to_string()),
            Unauthorized => AppError::new(StatusCode::FORBIDDEN, err.to_string()),
            RaceDetected | Storage(_) => {
                AppError::internal("Booking failed. Please try again.", "BOOKING_FAILED")
            }
        }
    }
}

impl From<TripError> for AppError {
    fn from(err: TripError) -> Self {
        match &err {
            TripError::NotFound(_) => AppError::not_found(err.to_string()),
            TripError::InvalidTrip { .. } => AppError::bad_request(err.to_string()),
            TripError::Storage(_) => {
                AppError::internal("Request failed. Please try again.", "INTERNAL_ERROR")
            }
        }
    }
}
