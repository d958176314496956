//! Represents a published trip — the seat-inventory unit of the system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle state of a trip. Only `active` trips accept bookings.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Active,
    Completed,
    Cancelled,
}

/// A trip published by a driver.
///
/// `available_seats` is the single authoritative seat counter. It is mutated
/// only by the booking service, inside a transaction holding the per-trip
/// guard, and always satisfies `0 <= available_seats <= total_seats`.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Trip {
    /// Unique identifier (UUID, stored as BLOB).
    pub id: Uuid,

    /// The driver who published the trip. Drivers may not book their own trip.
    pub driver_id: Uuid,

    /// Departure city, free-form.
    pub departure_city: String,

    /// Arrival city, free-form.
    pub arrival_city: String,

    /// Scheduled departure instant. Booking and cancellation validity are
    /// time-gated relative to it.
    pub departure_time: DateTime<Utc>,

    /// Fixed capacity set at creation, never changed afterwards.
    pub total_seats: i64,

    /// Seats still open for booking.
    pub available_seats: i64,

    /// Price for a single seat.
    pub price_per_seat: f64,

    /// Optional free-form description shown to riders.
    pub description: Option<String>,

    /// Lifecycle status.
    pub status: TripStatus,

    /// When the trip was published.
    pub created_at: DateTime<Utc>,
}
