//! src/services/trip_service.rs
//!
//! TripService — read/write access to published trips. Everything here is
//! plain CRUD; `available_seats` is only ever written at creation time
//! (seeded to `total_seats`). All later seat mutations belong to the
//! booking service.

use crate::models::{
    booking::Booking,
    trip::{Trip, TripStatus},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

const MAX_SEATS_PER_TRIP: i64 = 8;

#[derive(Debug, Error)]
pub enum TripError {
    #[error("trip `{0}` not found")]
    NotFound(Uuid),
    #[error("invalid trip: {reason}")]
    InvalidTrip { reason: String },
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

pub type TripResult<T> = Result<T, TripError>;

/// Fields a driver supplies when publishing a trip.
#[derive(Debug, Clone)]
pub struct NewTrip {
    pub departure_city: String,
    pub arrival_city: String,
    pub departure_time: DateTime<Utc>,
    pub total_seats: i64,
    pub price_per_seat: f64,
    pub description: Option<String>,
}

/// Optional search filters; all are combined with AND.
#[derive(Debug, Clone, Default)]
pub struct TripSearch {
    pub departure_city: Option<String>,
    pub arrival_city: Option<String>,
    pub departure_date: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct TripService {
    db: Arc<SqlitePool>,
}

impl TripService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    fn validate(new_trip: &NewTrip) -> TripResult<()> {
        let invalid = |reason: &str| TripError::InvalidTrip {
            reason: reason.to_string(),
        };

        if new_trip.departure_city.trim().is_empty() {
            return Err(invalid("departure_city must not be empty"));
        }
        if new_trip.arrival_city.trim().is_empty() {
            return Err(invalid("arrival_city must not be empty"));
        }
        if new_trip.total_seats < 1 || new_trip.total_seats > MAX_SEATS_PER_TRIP {
            return Err(invalid("total_seats must be between 1 and 8"));
        }
        if new_trip.price_per_seat < 0.0 || !new_trip.price_per_seat.is_finite() {
            return Err(invalid("price_per_seat must be a non-negative number"));
        }
        if new_trip.departure_time <= Utc::now() {
            return Err(invalid("departure_time must be in the future"));
        }
        Ok(())
    }

    /// Publish a trip. The full capacity starts out available.
    pub async fn create_trip(&self, driver_id: Uuid, new_trip: NewTrip) -> TripResult<Trip> {
        Self::validate(&new_trip)?;

        let trip = Trip {
            id: Uuid::new_v4(),
            driver_id,
            departure_city: new_trip.departure_city,
            arrival_city: new_trip.arrival_city,
            departure_time: new_trip.departure_time,
            total_seats: new_trip.total_seats,
            available_seats: new_trip.total_seats,
            price_per_seat: new_trip.price_per_seat,
            description: new_trip.description,
            status: TripStatus::Active,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO trips
                 (id, driver_id, departure_city, arrival_city, departure_time,
                  total_seats, available_seats, price_per_seat, description,
                  status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(trip.id)
        .bind(trip.driver_id)
        .bind(&trip.departure_city)
        .bind(&trip.arrival_city)
        .bind(trip.departure_time)
        .bind(trip.total_seats)
        .bind(trip.available_seats)
        .bind(trip.price_per_seat)
        .bind(&trip.description)
        .bind(trip.status)
        .bind(trip.created_at)
        .execute(&*self.db)
        .await?;

        Ok(trip)
    }

    /// Fetch a single trip together with its bookings.
    pub async fn get_trip(&self, trip_id: Uuid) -> TripResult<(Trip, Vec<Booking>)> {
        let trip = sqlx::query_as::<_, Trip>(
            "SELECT id, driver_id, departure_city, arrival_city, departure_time,
                    total_seats, available_seats, price_per_seat, description,
                    status, created_at
             FROM trips WHERE id = ?",
        )
        .bind(trip_id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(TripError::NotFound(trip_id))?;

        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT id, user_id, trip_id, seats_booked, total_price, status,
                    created_at, updated_at
             FROM bookings WHERE trip_id = ? ORDER BY created_at ASC",
        )
        .bind(trip_id)
        .fetch_all(&*self.db)
        .await?;

        Ok((trip, bookings))
    }

    /// Active trips that still have free seats, soonest departure first.
    pub async fn list_trips(&self) -> TripResult<Vec<Trip>> {
        let trips = sqlx::query_as::<_, Trip>(
            "SELECT id, driver_id, departure_city, arrival_city, departure_time,
                    total_seats, available_seats, price_per_seat, description,
                    status, created_at
             FROM trips
             WHERE status = ? AND available_seats > 0
             ORDER BY departure_time ASC",
        )
        .bind(TripStatus::Active)
        .fetch_all(&*self.db)
        .await?;

        Ok(trips)
    }

    /// Search active, bookable trips by city substrings and departure day.
    ///
    /// Timestamps are stored as RFC 3339 text with a fixed UTC offset, so a
    /// half-open `[midnight, midnight + 1 day)` range compares correctly as
    /// text.
    pub async fn search_trips(&self, search: TripSearch) -> TripResult<Vec<Trip>> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, driver_id, departure_city, arrival_city, departure_time, \
             total_seats, available_seats, price_per_seat, description, \
             status, created_at \
             FROM trips WHERE status = ",
        );
        builder.push_bind(TripStatus::Active);
        builder.push(" AND available_seats > 0");

        if let Some(city) = &search.departure_city {
            builder.push(" AND departure_city LIKE ");
            builder.push_bind(format!("%{}%", city));
        }

        if let Some(city) = &search.arrival_city {
            builder.push(" AND arrival_city LIKE ");
            builder.push_bind(format!("%{}%", city));
        }

        if let Some(date) = search.departure_date {
            let day_start = date
                .and_hms_opt(0, 0, 0)
                .map(|naive| naive.and_utc())
                .ok_or_else(|| TripError::InvalidTrip {
                    reason: "invalid departure_date".to_string(),
                })?;
            let day_end = day_start + Duration::days(1);

            builder.push(" AND departure_time >= ");
            builder.push_bind(day_start);
            builder.push(" AND departure_time < ");
            builder.push_bind(day_end);
        }

        builder.push(" ORDER BY departure_time ASC");

        let trips: Vec<Trip> = builder.build_query_as().fetch_all(&*self.db).await?;

        Ok(trips)
    }
}
