//! Shared application state handed to every handler.

use crate::services::{booking_service::BookingService, trip_service::TripService};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqlitePool>,
    pub trips: TripService,
    pub bookings: BookingService,
}

impl AppState {
    /// Build both services on top of one shared pool. The booking service
    /// owns the per-trip lock registry, so state must be cloned, never
    /// rebuilt, to keep every request on the same guards.
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self {
            trips: TripService::new(db.clone()),
            bookings: BookingService::new(db.clone()),
            db,
        }
    }
}
