//! Core data models for the ride-share booking service.
//!
//! Trips are the inventory unit (a driver's published ride with a fixed seat
//! capacity); bookings are the ledger entries recording who consumed which
//! seats. Both map to SQLite tables via `sqlx::FromRow` and serialize
//! naturally as JSON via `serde`.

pub mod booking;
pub mod trip;
