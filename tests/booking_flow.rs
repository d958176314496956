//! Business-rule coverage for the booking and cancellation protocols,
//! driven at the service level against an in-memory database.

mod common;

use chrono::{Duration, Utc};
use common::{assert_ledger_consistent, available_seats, insert_trip, test_state};
use ride_booking::{
    models::booking::BookingStatus,
    services::booking_service::BookingError,
};
use uuid::Uuid;

#[tokio::test]
async fn booking_decrements_seats_and_freezes_price() {
    let state = test_state().await;
    let driver = Uuid::new_v4();
    let rider = Uuid::new_v4();
    let departure = Utc::now() + Duration::hours(5);
    let trip = insert_trip(&state, driver, 4, 4, 12.5, departure, "active").await;

    let outcome = state
        .bookings
        .book_trip(rider, trip, 2)
        .await
        .expect("booking should succeed");

    assert_eq!(outcome.booking.seats_booked, 2);
    assert_eq!(outcome.booking.status, BookingStatus::Confirmed);
    assert_eq!(outcome.booking.total_price, 25.0);
    assert_eq!(outcome.remaining_seats, 2);
    assert_eq!(available_seats(&state, trip).await, 2);
    assert_ledger_consistent(&state, trip, 4).await;
}

#[tokio::test]
async fn driver_cannot_book_own_trip() {
    let state = test_state().await;
    let driver = Uuid::new_v4();
    let trip = insert_trip(&state, driver, 3, 3, 10.0, Utc::now() + Duration::hours(5), "active")
        .await;

    let err = state.bookings.book_trip(driver, trip, 1).await.unwrap_err();
    assert!(matches!(err, BookingError::SelfBooking));
    assert_eq!(available_seats(&state, trip).await, 3);
}

#[tokio::test]
async fn full_trip_is_rejected() {
    let state = test_state().await;
    let trip = insert_trip(
        &state,
        Uuid::new_v4(),
        3,
        0,
        10.0,
        Utc::now() + Duration::hours(5),
        "active",
    )
    .await;

    let err = state
        .bookings
        .book_trip(Uuid::new_v4(), trip, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::TripFull));
}

#[tokio::test]
async fn insufficient_seats_reports_remaining() {
    let state = test_state().await;
    let trip = insert_trip(
        &state,
        Uuid::new_v4(),
        5,
        2,
        10.0,
        Utc::now() + Duration::hours(5),
        "active",
    )
    .await;

    let err = state
        .bookings
        .book_trip(Uuid::new_v4(), trip, 3)
        .await
        .unwrap_err();
    match err {
        BookingError::InsufficientSeats { remaining } => assert_eq!(remaining, 2),
        other => panic!("expected InsufficientSeats, got {other:?}"),
    }
    assert_eq!(available_seats(&state, trip).await, 2);
}

#[tokio::test]
async fn duplicate_booking_is_rejected_idempotently() {
    let state = test_state().await;
    let rider = Uuid::new_v4();
    let trip = insert_trip(
        &state,
        Uuid::new_v4(),
        5,
        5,
        10.0,
        Utc::now() + Duration::hours(5),
        "active",
    )
    .await;

    state.bookings.book_trip(rider, trip, 1).await.expect("first booking");

    // Re-submitting the same request keeps hitting the same rule without
    // touching the inventory.
    for _ in 0..2 {
        let err = state.bookings.book_trip(rider, trip, 1).await.unwrap_err();
        assert!(matches!(err, BookingError::DuplicateBooking));
        assert_eq!(available_seats(&state, trip).await, 4);
    }
}

#[tokio::test]
async fn departed_trip_is_rejected() {
    let state = test_state().await;
    let trip = insert_trip(
        &state,
        Uuid::new_v4(),
        3,
        3,
        10.0,
        Utc::now() - Duration::hours(1),
        "active",
    )
    .await;

    let err = state
        .bookings
        .book_trip(Uuid::new_v4(), trip, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::TripDeparted));
    assert_eq!(available_seats(&state, trip).await, 3);
}

#[tokio::test]
async fn unknown_and_inactive_trips_look_the_same() {
    let state = test_state().await;

    let err = state
        .bookings
        .book_trip(Uuid::new_v4(), Uuid::new_v4(), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::TripNotFound));

    let cancelled_trip = insert_trip(
        &state,
        Uuid::new_v4(),
        3,
        3,
        10.0,
        Utc::now() + Duration::hours(5),
        "cancelled",
    )
    .await;
    let err = state
        .bookings
        .book_trip(Uuid::new_v4(), cancelled_trip, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::TripNotFound));
}

#[tokio::test]
async fn non_positive_seat_count_is_rejected_before_any_write() {
    let state = test_state().await;
    let trip = insert_trip(
        &state,
        Uuid::new_v4(),
        3,
        3,
        10.0,
        Utc::now() + Duration::hours(5),
        "active",
    )
    .await;

    for bad in [0, -2] {
        let err = state
            .bookings
            .book_trip(Uuid::new_v4(), trip, bad)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidSeatCount(n) if n == bad));
    }
    assert_eq!(available_seats(&state, trip).await, 3);
}

#[tokio::test]
async fn cancel_restores_seats_then_rejects_a_second_cancel() {
    let state = test_state().await;
    let rider = Uuid::new_v4();
    let trip = insert_trip(
        &state,
        Uuid::new_v4(),
        3,
        3,
        10.0,
        Utc::now() + Duration::hours(3),
        "active",
    )
    .await;

    let outcome = state.bookings.book_trip(rider, trip, 2).await.expect("booking");
    assert_eq!(available_seats(&state, trip).await, 1);

    let returned = state
        .bookings
        .cancel_booking(rider, outcome.booking.id)
        .await
        .expect("cancellation should succeed 3h before departure");
    assert_eq!(returned, 2);
    assert_eq!(available_seats(&state, trip).await, 3);
    assert_ledger_consistent(&state, trip, 3).await;

    let err = state
        .bookings
        .cancel_booking(rider, outcome.booking.id)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::AlreadyCancelled));
    assert_eq!(available_seats(&state, trip).await, 3);
}

#[tokio::test]
async fn cancel_then_rebook_consumes_the_freed_seats() {
    let state = test_state().await;
    let rider = Uuid::new_v4();
    let trip = insert_trip(
        &state,
        Uuid::new_v4(),
        3,
        3,
        10.0,
        Utc::now() + Duration::hours(6),
        "active",
    )
    .await;

    let first = state.bookings.book_trip(rider, trip, 3).await.expect("first booking");
    state
        .bookings
        .cancel_booking(rider, first.booking.id)
        .await
        .expect("cancellation");

    // The partial unique index only covers non-cancelled rows, so the same
    // rider can book again.
    let second = state.bookings.book_trip(rider, trip, 3).await.expect("rebooking");
    assert_eq!(second.remaining_seats, 0);
    assert_ledger_consistent(&state, trip, 3).await;
}

#[tokio::test]
async fn cancellation_window_closes_two_hours_before_departure() {
    let state = test_state().await;
    let rider = Uuid::new_v4();
    let trip = insert_trip(
        &state,
        Uuid::new_v4(),
        3,
        3,
        10.0,
        Utc::now() + Duration::minutes(90),
        "active",
    )
    .await;

    let outcome = state.bookings.book_trip(rider, trip, 1).await.expect("booking");

    let err = state
        .bookings
        .cancel_booking(rider, outcome.booking.id)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::CancellationWindowClosed));

    // The booking stays confirmed and the seat stays consumed.
    assert_eq!(available_seats(&state, trip).await, 2);
    assert_ledger_consistent(&state, trip, 3).await;
}

#[tokio::test]
async fn only_the_owner_may_cancel() {
    let state = test_state().await;
    let rider = Uuid::new_v4();
    let trip = insert_trip(
        &state,
        Uuid::new_v4(),
        3,
        3,
        10.0,
        Utc::now() + Duration::hours(5),
        "active",
    )
    .await;

    let outcome = state.bookings.book_trip(rider, trip, 1).await.expect("booking");

    let err = state
        .bookings
        .cancel_booking(Uuid::new_v4(), outcome.booking.id)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Unauthorized));
    assert_eq!(available_seats(&state, trip).await, 2);
}

#[tokio::test]
async fn cancelling_an_unknown_booking_is_not_found() {
    let state = test_state().await;

    let err = state
        .bookings
        .cancel_booking(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::BookingNotFound));
}

#[tokio::test]
async fn booking_history_is_newest_first_and_keeps_cancelled_rows() {
    let state = test_state().await;
    let rider = Uuid::new_v4();
    let trip_a = insert_trip(
        &state,
        Uuid::new_v4(),
        3,
        3,
        10.0,
        Utc::now() + Duration::hours(5),
        "active",
    )
    .await;
    let trip_b = insert_trip(
        &state,
        Uuid::new_v4(),
        3,
        3,
        15.0,
        Utc::now() + Duration::hours(7),
        "active",
    )
    .await;

    let first = state.bookings.book_trip(rider, trip_a, 1).await.expect("booking a");
    state.bookings.book_trip(rider, trip_b, 1).await.expect("booking b");
    state
        .bookings
        .cancel_booking(rider, first.booking.id)
        .await
        .expect("cancellation");

    let history = state.bookings.list_bookings(rider).await.expect("history");
    assert_eq!(history.len(), 2);
    assert!(history.iter().any(|b| b.status == BookingStatus::Cancelled));
    assert!(
        history
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at)
    );
}
