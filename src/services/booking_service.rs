//! src/services/booking_service.rs
//!
//! BookingService — the reservation coordinator. All mutations of
//! `trips.available_seats` and `bookings.status` go through this service,
//! inside a transaction executed while holding the per-trip guard. Nothing
//! else in the crate writes either column.
//!
//! Two independent mechanisms protect the seat counter:
//!   1. a per-trip async mutex serializing the read-validate-write sequence,
//!   2. a conditional `UPDATE ... WHERE available_seats >= n` whose
//!      `rows_affected` is checked on every decrement.
//! The second must stay even though the first already excludes races: a
//! lock-scope bug then shows up as a logged `RaceDetected` fault instead of
//! silently overselling seats. The partial unique index on
//! `(user_id, trip_id)` is the storage-level backstop for the
//! one-active-booking rule.

use crate::models::{
    booking::{Booking, BookingStatus},
    trip::{Trip, TripStatus},
};
use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex},
};
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{error, warn};
use uuid::Uuid;

/// Bookings cannot be cancelled once the trip departs within this window.
const CANCELLATION_CUTOFF_HOURS: i64 = 2;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("trip not found or inactive")]
    TripNotFound,
    #[error("you cannot book your own trip")]
    SelfBooking,
    #[error("this trip is full, no seats available")]
    TripFull,
    #[error("not enough seats available, only {remaining} left")]
    InsufficientSeats { remaining: i64 },
    #[error("you already have an active booking for this trip")]
    DuplicateBooking,
    #[error("this trip has already departed or is about to leave")]
    TripDeparted,
    #[error("seats_booked must be at least 1 (got {0})")]
    InvalidSeatCount(i64),
    #[error("booking not found or already cancelled")]
    BookingNotFound,
    #[error("not authorized")]
    Unauthorized,
    #[error("booking already cancelled")]
    AlreadyCancelled,
    #[error("cannot cancel: the trip departs in less than 2 hours")]
    CancellationWindowClosed,
    #[error("seat decrement affected no rows, race condition detected")]
    RaceDetected,
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

pub type BookingResult<T> = Result<T, BookingError>;

/// Successful booking: the ledger entry plus the seat count observed right
/// after the decrement, inside the same transaction.
#[derive(Debug, Serialize)]
pub struct BookingOutcome {
    pub booking: Booking,
    pub remaining_seats: i64,
}

/// Registry of per-trip async mutexes.
///
/// Guards are created lazily on first use and shared by every clone of the
/// service, so two units of work for the same trip always contend on the
/// same mutex while units of work for different trips never block each
/// other. Entries are never evicted; the map is bounded by the number of
/// distinct trips ever booked against.
#[derive(Clone, Default)]
pub struct TripLocks {
    inner: Arc<StdMutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>,
}

impl TripLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up (or create) the guard for one trip.
    fn guard_for(&self, trip_id: Uuid) -> Arc<AsyncMutex<()>> {
        let mut map = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        map.entry(trip_id).or_default().clone()
    }
}

/// BookingService provides the three ledger operations:
/// - Book seats on a trip (atomic ledger insert + inventory decrement)
/// - Cancel a booking (atomic status flip + inventory increment)
/// - List a rider's bookings (read-only)
#[derive(Clone)]
pub struct BookingService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,

    locks: TripLocks,
}

impl BookingService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self {
            db,
            locks: TripLocks::new(),
        }
    }

    /// Book `seats_requested` seats on a trip for `user_id`.
    ///
    /// The whole read-validate-write sequence runs inside one transaction
    /// while holding the trip's guard, so no two bookings for the same trip
    /// can interleave between reading `available_seats` and decrementing it.
    /// Business-rule rejections roll back without side effects; any storage
    /// error aborts the transaction and surfaces as `Storage`.
    pub async fn book_trip(
        &self,
        user_id: Uuid,
        trip_id: Uuid,
        seats_requested: i64,
    ) -> BookingResult<BookingOutcome> {
        // Malformed input is rejected before any lock or transaction opens.
        if seats_requested < 1 {
            return Err(BookingError::InvalidSeatCount(seats_requested));
        }

        let guard = self.locks.guard_for(trip_id);
        let _held = guard.lock().await;

        let mut tx = self.db.begin().await?;

        // Reload the trip fresh under the guard; a snapshot taken before
        // acquisition could be stale.
        let trip = sqlx::query_as::<_, Trip>(
            "SELECT id, driver_id, departure_city, arrival_city, departure_time,
                    total_seats, available_seats, price_per_seat, description,
                    status, created_at
             FROM trips WHERE id = ? AND status = ?",
        )
        .bind(trip_id)
        .bind(TripStatus::Active)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BookingError::TripNotFound)?;

        if trip.driver_id == user_id {
            return Err(BookingError::SelfBooking);
        }

        if trip.available_seats == 0 {
            return Err(BookingError::TripFull);
        }

        if trip.available_seats < seats_requested {
            return Err(BookingError::InsufficientSeats {
                remaining: trip.available_seats,
            });
        }

        let existing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings
             WHERE user_id = ? AND trip_id = ? AND status != 'cancelled'",
        )
        .bind(user_id)
        .bind(trip_id)
        .fetch_one(&mut *tx)
        .await?;

        if existing > 0 {
            return Err(BookingError::DuplicateBooking);
        }

        if trip.departure_time <= Utc::now() {
            return Err(BookingError::TripDeparted);
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id,
            trip_id,
            seats_booked: seats_requested,
            total_price: trip.price_per_seat * seats_requested as f64,
            status: BookingStatus::Confirmed,
            created_at: now,
            updated_at: now,
        };

        let insert = sqlx::query(
            "INSERT INTO bookings
                 (id, user_id, trip_id, seats_booked, total_price, status,
                  created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(booking.id)
        .bind(booking.user_id)
        .bind(booking.trip_id)
        .bind(booking.seats_booked)
        .bind(booking.total_price)
        .bind(booking.status)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *tx)
        .await;

        match insert {
            Ok(_) => {}
            // Last line of defense: the partial unique index caught a
            // duplicate the COUNT above missed.
            Err(err) if is_unique_violation(&err) => {
                warn!(
                    user_id = %user_id,
                    trip_id = %trip_id,
                    "unique constraint caught a duplicate booking past validation"
                );
                return Err(BookingError::DuplicateBooking);
            }
            Err(err) => return Err(BookingError::Storage(err)),
        }

        // Conditional decrement. With the guard held this can only fail if
        // the locking is broken; treat that as fatal, never retry.
        let affected = sqlx::query(
            "UPDATE trips SET available_seats = available_seats - ?
             WHERE id = ? AND available_seats >= ?",
        )
        .bind(seats_requested)
        .bind(trip_id)
        .bind(seats_requested)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if affected == 0 {
            error!(
                user_id = %user_id,
                trip_id = %trip_id,
                seats_requested,
                "conditional seat decrement affected no rows; \
                 aborting transaction"
            );
            return Err(BookingError::RaceDetected);
        }

        let remaining_seats: i64 =
            sqlx::query_scalar("SELECT available_seats FROM trips WHERE id = ?")
                .bind(trip_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        Ok(BookingOutcome {
            booking,
            remaining_seats,
        })
    }

    /// Cancel a booking on behalf of `user_id`, returning the seats to the
    /// trip's inventory.
    ///
    /// Ownership and terminal-state checks run on a pre-read; the booking is
    /// then re-read under the trip guard filtered on `status != 'cancelled'`
    /// to handle a concurrent cancellation racing between the two reads.
    /// The increment is unconditional: `seats_booked` was validly
    /// decremented earlier, so returning it can never overflow capacity.
    pub async fn cancel_booking(&self, user_id: Uuid, booking_id: Uuid) -> BookingResult<i64> {
        let booking = sqlx::query_as::<_, Booking>(
            "SELECT id, user_id, trip_id, seats_booked, total_price, status,
                    created_at, updated_at
             FROM bookings WHERE id = ?",
        )
        .bind(booking_id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(BookingError::BookingNotFound)?;

        if booking.user_id != user_id {
            return Err(BookingError::Unauthorized);
        }

        if booking.status == BookingStatus::Cancelled {
            return Err(BookingError::AlreadyCancelled);
        }

        let guard = self.locks.guard_for(booking.trip_id);
        let _held = guard.lock().await;

        let mut tx = self.db.begin().await?;

        let locked = sqlx::query_as::<_, Booking>(
            "SELECT id, user_id, trip_id, seats_booked, total_price, status,
                    created_at, updated_at
             FROM bookings WHERE id = ? AND status != 'cancelled'",
        )
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BookingError::BookingNotFound)?;

        let trip = sqlx::query_as::<_, Trip>(
            "SELECT id, driver_id, departure_city, arrival_city, departure_time,
                    total_seats, available_seats, price_per_seat, description,
                    status, created_at
             FROM trips WHERE id = ?",
        )
        .bind(locked.trip_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BookingError::TripNotFound)?;

        if trip.departure_time <= Utc::now() + Duration::hours(CANCELLATION_CUTOFF_HOURS) {
            return Err(BookingError::CancellationWindowClosed);
        }

        sqlx::query("UPDATE bookings SET status = 'cancelled', updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(locked.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE trips SET available_seats = available_seats + ? WHERE id = ?")
            .bind(locked.seats_booked)
            .bind(locked.trip_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(locked.seats_booked)
    }

    /// All bookings ever made by one rider, newest first. Cancelled rows are
    /// included: the ledger is an audit trail.
    pub async fn list_bookings(&self, user_id: Uuid) -> BookingResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT id, user_id, trip_id, seats_booked, total_price, status,
                    created_at, updated_at
             FROM bookings WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&*self.db)
        .await?;

        Ok(bookings)
    }
}

/// Return true if SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}
