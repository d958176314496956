//! Represents a booking — a ledger entry recording a rider's claim on seats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Booking lifecycle. `Cancelled` is terminal; there is no un-cancel.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

/// A seat reservation held by a rider on a trip.
///
/// Bookings are never deleted — cancellation flips `status` to `Cancelled`
/// so the ledger keeps a full audit trail. A partial unique index on
/// `(user_id, trip_id)` over non-cancelled rows enforces at most one active
/// booking per rider per trip at the storage layer.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Booking {
    /// Unique identifier (UUID, stored as BLOB).
    pub id: Uuid,

    /// The rider who booked.
    pub user_id: Uuid,

    /// The trip the seats belong to.
    pub trip_id: Uuid,

    /// Number of seats claimed, immutable after creation.
    pub seats_booked: i64,

    /// `price_per_seat * seats_booked`, frozen at creation time so later
    /// price changes never affect existing bookings.
    pub total_price: f64,

    /// Lifecycle status.
    pub status: BookingStatus,

    /// When the booking was created.
    pub created_at: DateTime<Utc>,

    /// Last status transition.
    pub updated_at: DateTime<Utc>,
}
