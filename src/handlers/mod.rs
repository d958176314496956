pub mod booking_handlers;
pub mod health_handlers;
pub mod trip_handlers;
