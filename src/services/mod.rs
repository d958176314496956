pub mod booking_service;
pub mod trip_service;
