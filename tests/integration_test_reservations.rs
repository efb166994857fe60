mod common;

use chrono::{Duration, Utc, Weekday};
use common::{date, time, TestApp};
use venue_booking_backend::domain::models::item::{BookableItem, ItemKind, NewItemParams, PricingMode};
use venue_booking_backend::domain::models::location::Room;
use venue_booking_backend::domain::models::reservation::{
    STATUS_CANCELLED, STATUS_COMPLETED, STATUS_CONFIRMED, STATUS_NO_SHOW,
};
use venue_booking_backend::domain::models::schedule::{AvailabilityRule, Recurrence};
use venue_booking_backend::domain::services::booking_service::CommitRequest;
use venue_booking_backend::error::AppError;

// 2026-09-04 is a Friday.
const FRIDAY: &str = "2026-09-04";

fn commit_request(item_id: &str, room_id: &str, start: &str) -> CommitRequest {
    CommitRequest {
        item_id: item_id.to_string(),
        room_id: room_id.to_string(),
        date: date(FRIDAY),
        time: time(start),
        duration_min: None,
        participants: 4,
        customer_name: "Jamie Doe".to_string(),
        customer_email: "jamie@example.com".to_string(),
        code: None,
    }
}

#[tokio::test]
async fn test_commit_happy_path() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;
    let room = app.create_room(&loc.id, "Room A").await;
    let item = app.create_package(&loc.id).await;
    app.create_weekly_rule(&item.id, Weekday::Fri, "10:00", "18:00", 60, 1).await;

    let reservation = app.service.commit(commit_request(&item.id, &room.id, "12:00")).await.unwrap();

    assert_eq!(reservation.status, STATUS_CONFIRMED);
    assert_eq!(reservation.start_time, time("12:00"));
    assert_eq!(reservation.end_time, time("13:00"));
    assert_eq!(reservation.duration_min, 60);
    assert_eq!(reservation.total_cents, 10_000);
    assert_eq!(reservation.confirmation_code.len(), 10);

    let found = app.reservations.find_by_id(&reservation.id).await.unwrap().unwrap();
    assert_eq!(found.id, reservation.id);
}

#[tokio::test]
async fn test_committed_slot_disappears_from_availability() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;
    let room = app.create_room(&loc.id, "Room A").await;
    let item = app.create_package(&loc.id).await;
    app.create_weekly_rule(&item.id, Weekday::Fri, "10:00", "18:00", 60, 1).await;

    app.service.commit(commit_request(&item.id, &room.id, "12:00")).await.unwrap();

    let slots = app.service.available_slots(&item.id, date(FRIDAY), None).await.unwrap();
    assert!(!slots.contains(&time("12:00")));
    assert_eq!(slots.len(), 7);
}

#[tokio::test]
async fn test_double_commit_of_same_slot_conflicts() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;
    let room = app.create_room(&loc.id, "Room A").await;
    let item = app.create_package(&loc.id).await;
    app.create_weekly_rule(&item.id, Weekday::Fri, "10:00", "18:00", 60, 1).await;

    app.service.commit(commit_request(&item.id, &room.id, "12:00")).await.unwrap();

    let err = app.service.commit(commit_request(&item.id, &room.id, "12:00")).await.unwrap_err();
    assert!(matches!(err, AppError::SlotConflict(_)));
}

#[tokio::test]
async fn test_overlapping_commit_conflicts() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;
    let room = app.create_room(&loc.id, "Room A").await;
    let item = app.create_package(&loc.id).await;
    // 30-minute grid, 60-minute bookings: adjacent starts overlap.
    app.create_weekly_rule(&item.id, Weekday::Fri, "10:00", "18:00", 30, 1).await;

    app.service.commit(commit_request(&item.id, &room.id, "12:00")).await.unwrap();

    let err = app.service.commit(commit_request(&item.id, &room.id, "12:30")).await.unwrap_err();
    assert!(matches!(err, AppError::SlotConflict(_)));

    // Back-to-back is not an overlap.
    app.service.commit(commit_request(&item.id, &room.id, "13:00")).await.unwrap();
}

#[tokio::test]
async fn test_second_room_absorbs_same_time() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;
    let room_a = app.create_room(&loc.id, "Room A").await;
    let room_b = app.create_room(&loc.id, "Room B").await;
    let item = app.create_package(&loc.id).await;
    app.create_weekly_rule(&item.id, Weekday::Fri, "10:00", "18:00", 60, 1).await;

    app.service.commit(commit_request(&item.id, &room_a.id, "12:00")).await.unwrap();
    app.service.commit(commit_request(&item.id, &room_b.id, "12:00")).await.unwrap();

    // Both rooms taken: the slot is gone for everyone.
    let slots = app.service.available_slots(&item.id, date(FRIDAY), None).await.unwrap();
    assert!(!slots.contains(&time("12:00")));
}

#[tokio::test]
async fn test_cancel_frees_slot_for_recommit() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;
    let room = app.create_room(&loc.id, "Room A").await;
    let item = app.create_package(&loc.id).await;
    app.create_weekly_rule(&item.id, Weekday::Fri, "10:00", "18:00", 60, 1).await;

    let first = app.service.commit(commit_request(&item.id, &room.id, "12:00")).await.unwrap();
    let cancelled = app.service.cancel(&first.id).await.unwrap();
    assert_eq!(cancelled.status, STATUS_CANCELLED);

    let slots = app.service.available_slots(&item.id, date(FRIDAY), None).await.unwrap();
    assert!(slots.contains(&time("12:00")));

    let second = app.service.commit(commit_request(&item.id, &room.id, "12:00")).await.unwrap();
    assert_ne!(second.id, first.id);
}

#[tokio::test]
async fn test_lifecycle_transitions() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;
    let room = app.create_room(&loc.id, "Room A").await;
    let item = app.create_package(&loc.id).await;
    app.create_weekly_rule(&item.id, Weekday::Fri, "10:00", "18:00", 60, 1).await;

    let first = app.service.commit(commit_request(&item.id, &room.id, "12:00")).await.unwrap();
    let completed = app.service.complete(&first.id).await.unwrap();
    assert_eq!(completed.status, STATUS_COMPLETED);

    let second = app.service.commit(commit_request(&item.id, &room.id, "14:00")).await.unwrap();
    let no_show = app.service.no_show(&second.id).await.unwrap();
    assert_eq!(no_show.status, STATUS_NO_SHOW);

    let err = app.service.cancel("missing").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_commit_off_grid_time_conflicts() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;
    let room = app.create_room(&loc.id, "Room A").await;
    let item = app.create_package(&loc.id).await;
    app.create_weekly_rule(&item.id, Weekday::Fri, "10:00", "18:00", 60, 1).await;

    // 12:15 is not a generated start-time.
    let err = app.service.commit(commit_request(&item.id, &room.id, "12:15")).await.unwrap_err();
    assert!(matches!(err, AppError::SlotConflict(_)));
}

#[tokio::test]
async fn test_commit_rejects_room_from_other_location() {
    let app = TestApp::new().await;
    let loc_a = app.create_location("UTC").await;
    let loc_b = app.create_location("UTC").await;
    app.create_room(&loc_a.id, "Room A").await;
    let foreign_room = app.create_room(&loc_b.id, "Room B").await;
    let item = app.create_package(&loc_a.id).await;
    app.create_weekly_rule(&item.id, Weekday::Fri, "10:00", "18:00", 60, 1).await;

    let err = app.service.commit(commit_request(&item.id, &foreign_room.id, "12:00")).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_commit_rejects_party_over_room_capacity() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;
    let room = app
        .catalog
        .create_room(&Room::new(loc.id.clone(), "Snug".to_string(), 3))
        .await
        .unwrap();
    let item = app.create_package(&loc.id).await;
    app.create_weekly_rule(&item.id, Weekday::Fri, "10:00", "18:00", 60, 1).await;

    let err = app.service.commit(commit_request(&item.id, &room.id, "12:00")).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_min_notice_filters_near_term_slots() {
    let app = TestApp::new().await;
    let loc = app.create_location("UTC").await;
    app.create_room(&loc.id, "Room A").await;

    let mut item = BookableItem::new(NewItemParams {
        location_id: loc.id.clone(),
        name: "Guided Tour".to_string(),
        kind: ItemKind::Attraction,
        pricing_mode: PricingMode::Flat,
        base_price_cents: 5_000,
        duration_min: 60,
    });
    // Two weeks of notice required.
    item.min_booking_notice_hours = Some(14 * 24);
    let item = app.catalog.create_item(&item).await.unwrap();

    let rule = AvailabilityRule::new(
        item.id.clone(),
        Recurrence::Daily,
        time("10:00"),
        time("12:00"),
        60,
        1,
    )
    .unwrap();
    app.catalog.create_rule(&rule).await.unwrap();

    let today = Utc::now().date_naive();

    // Tomorrow is inside the notice window, a month out is comfortably past it.
    let near = app.service.available_slots(&item.id, today + Duration::days(1), None).await.unwrap();
    assert!(near.is_empty());

    let far = app.service.available_slots(&item.id, today + Duration::days(30), None).await.unwrap();
    assert_eq!(far.len(), 2);
}
