//! Shared fixtures for the integration tests: an in-memory database with the
//! production schema, plus raw-SQL helpers to seed trips in states the
//! public API would refuse to create (departed, inactive, ...).

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use ride_booking::{db, state::AppState};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use uuid::Uuid;

/// Fresh application state over a private in-memory SQLite database.
///
/// A single connection keeps every query in the pool on the same in-memory
/// database (each new `sqlite::memory:` connection would otherwise get its
/// own).
pub async fn test_state() -> AppState {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite");
    let pool = Arc::new(pool);

    db::run_migrations(&pool).await.expect("run migrations");

    AppState::new(pool)
}

/// Seed a trip row directly, bypassing `TripService` validation.
pub async fn insert_trip(
    state: &AppState,
    driver_id: Uuid,
    total_seats: i64,
    available_seats: i64,
    price_per_seat: f64,
    departure_time: DateTime<Utc>,
    status: &str,
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO trips
             (id, driver_id, departure_city, arrival_city, departure_time,
              total_seats, available_seats, price_per_seat, description,
              status, created_at)
         VALUES (?, ?, 'Paris', 'Lyon', ?, ?, ?, ?, NULL, ?, ?)",
    )
    .bind(id)
    .bind(driver_id)
    .bind(departure_time)
    .bind(total_seats)
    .bind(available_seats)
    .bind(price_per_seat)
    .bind(status)
    .bind(Utc::now())
    .execute(&*state.db)
    .await
    .expect("insert trip");

    id
}

/// Current value of the authoritative seat counter.
pub async fn available_seats(state: &AppState, trip_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT available_seats FROM trips WHERE id = ?")
        .bind(trip_id)
        .fetch_one(&*state.db)
        .await
        .expect("read available_seats")
}

/// Sum of seats held by confirmed bookings on one trip.
pub async fn confirmed_seats(state: &AppState, trip_id: Uuid) -> i64 {
    sqlx::query_scalar(
        "SELECT COALESCE(SUM(seats_booked), 0) FROM bookings
         WHERE trip_id = ? AND status = 'confirmed'",
    )
    .bind(trip_id)
    .fetch_one(&*state.db)
    .await
    .expect("sum confirmed seats")
}

/// Assert the ledger invariant: available = total - sum(confirmed seats).
pub async fn assert_ledger_consistent(state: &AppState, trip_id: Uuid, total_seats: i64) {
    let available = available_seats(state, trip_id).await;
    let booked = confirmed_seats(state, trip_id).await;
    assert!(
        (0..=total_seats).contains(&available),
        "available_seats {} out of range 0..={}",
        available,
        total_seats
    );
    assert_eq!(
        available,
        total_seats - booked,
        "available_seats diverged from the booking ledger"
    );
}
