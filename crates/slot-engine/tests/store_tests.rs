//! Tests for the in-memory collaborator.

use chrono::{DateTime, Utc};
use slot_engine::store::{BlockedSlot, Booking, BookingStatus, Dataset};
use slot_engine::{
    AvailabilityRule, AvailabilityRuleStore, InMemoryStore, OccupiedIntervalSource, SlotError,
};

fn utc(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn rule(day: u8, start: &str, end: &str) -> AvailabilityRule {
    AvailabilityRule::new(day, start.parse().unwrap(), end.parse().unwrap()).unwrap()
}

const DATASET: &str = r#"{
  "workers": {
    "w1": {
      "availability": [
        {"dayOfWeek": 1, "startTime": "09:00", "endTime": "12:00", "isRecurring": true},
        {"dayOfWeek": 1, "startTime": "14:00", "endTime": "17:00", "isRecurring": true},
        {"dayOfWeek": 3, "startTime": "09:00", "endTime": "12:00", "isRecurring": true}
      ],
      "bookings": [
        {"startTime": "2026-03-16T10:00:00Z", "endTime": "2026-03-16T11:00:00Z", "status": "confirmed"},
        {"startTime": "2026-03-16T15:00:00Z", "endTime": "2026-03-16T16:00:00Z", "status": "cancelled"}
      ],
      "blocked": [
        {"startTime": "2026-03-16T16:00:00Z", "endTime": "2026-03-16T17:00:00Z", "reason": "dentist"}
      ]
    }
  }
}"#;

#[tokio::test]
async fn rules_filtered_by_weekday_in_insertion_order() {
    let store = InMemoryStore::from_json_str(DATASET).unwrap();

    let monday = store.fetch_availability_rules("w1", 1).await.unwrap();
    assert_eq!(monday, vec![rule(1, "09:00", "12:00"), rule(1, "14:00", "17:00")]);

    let friday = store.fetch_availability_rules("w1", 5).await.unwrap();
    assert!(friday.is_empty());

    assert_eq!(store.fetch_all_rules("w1").await.unwrap().len(), 3);
}

#[tokio::test]
async fn occupied_excludes_cancelled_bookings() {
    let store = InMemoryStore::from_json_str(DATASET).unwrap();

    let occupied = store
        .fetch_occupied_intervals("w1", utc("2026-03-16T00:00:00Z"), utc("2026-03-17T00:00:00Z"))
        .await
        .unwrap();

    let starts: Vec<DateTime<Utc>> = occupied.iter().map(|o| o.start).collect();
    assert_eq!(
        starts,
        vec![utc("2026-03-16T10:00:00Z"), utc("2026-03-16T16:00:00Z")]
    );
}

#[tokio::test]
async fn occupied_range_is_half_open() {
    let store = InMemoryStore::from_json_str(DATASET).unwrap();

    // Range ends exactly when the 10:00 booking starts.
    let occupied = store
        .fetch_occupied_intervals("w1", utc("2026-03-16T00:00:00Z"), utc("2026-03-16T10:00:00Z"))
        .await
        .unwrap();
    assert!(occupied.is_empty());

    // Range starting mid-booking still sees it.
    let occupied = store
        .fetch_occupied_intervals("w1", utc("2026-03-16T10:30:00Z"), utc("2026-03-16T12:00:00Z"))
        .await
        .unwrap();
    assert_eq!(occupied.len(), 1);
}

#[tokio::test]
async fn empty_range_is_a_collaborator_error() {
    let store = InMemoryStore::new();
    let t = utc("2026-03-16T10:00:00Z");
    assert!(store.fetch_occupied_intervals("w1", t, t).await.is_err());
}

#[tokio::test]
async fn malformed_intervals_are_dropped() {
    let store = InMemoryStore::new();
    store.add_block(
        "w1",
        BlockedSlot {
            start_time: utc("2026-03-16T11:00:00Z"),
            end_time: utc("2026-03-16T10:00:00Z"),
            reason: None,
        },
    );

    let occupied = store
        .fetch_occupied_intervals("w1", utc("2026-03-16T00:00:00Z"), utc("2026-03-17T00:00:00Z"))
        .await
        .unwrap();
    assert!(occupied.is_empty());
}

#[tokio::test]
async fn mutations_are_visible_to_later_fetches() {
    let store = InMemoryStore::new();
    store.set_availability("w2", vec![rule(2, "08:00", "09:00")]);
    store.add_booking(
        "w2",
        Booking {
            start_time: utc("2026-03-17T08:00:00Z"),
            end_time: utc("2026-03-17T08:30:00Z"),
            status: BookingStatus::default(),
        },
    );

    assert_eq!(store.fetch_availability_rules("w2", 2).await.unwrap().len(), 1);
    let occupied = store
        .fetch_occupied_intervals("w2", utc("2026-03-17T00:00:00Z"), utc("2026-03-18T00:00:00Z"))
        .await
        .unwrap();
    assert_eq!(occupied.len(), 1);
}

#[test]
fn dataset_round_trips_through_snapshot() {
    let store = InMemoryStore::from_json_str(DATASET).unwrap();
    let snapshot: Dataset = store.to_dataset();

    assert_eq!(snapshot.workers["w1"].blocked[0].reason.as_deref(), Some("dentist"));
    assert_eq!(snapshot.workers["w1"].bookings[1].status, BookingStatus::Cancelled);
}

#[test]
fn unparsable_rule_time_rejects_dataset() {
    let json = r#"{"workers":{"w1":{"availability":[{"dayOfWeek":1,"startTime":"9 o'clock","endTime":"12:00"}]}}}"#;
    assert!(matches!(
        InMemoryStore::from_json_str(json),
        Err(SlotError::InvalidInput(_))
    ));
}
