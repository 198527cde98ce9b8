//! Tests for rule projection and candidate generation.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use slot_engine::generator::{candidates_for_rule, DEFAULT_SLOT_STEP_MINUTES};
use slot_engine::{generate_candidates, AvailabilityRule, TimeOfDay, TimeRange, TimeSlot};

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, hour, min, 0).unwrap()
}

fn window(start_hour: u32, end_hour: u32) -> TimeRange {
    TimeRange::new(at(start_hour, 0), at(end_hour, 0))
}

fn starts(slots: impl IntoIterator<Item = TimeSlot>) -> Vec<String> {
    slots
        .into_iter()
        .map(|s| s.start.format("%H:%M").to_string())
        .collect()
}

fn tod(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

#[test]
fn hour_slots_on_half_hour_grid() {
    let slots: Vec<TimeSlot> = generate_candidates(window(9, 12), 60, 30).collect();

    assert_eq!(starts(slots.clone()), ["09:00", "09:30", "10:00", "10:30", "11:00"]);
    assert!(slots.iter().all(|s| s.end - s.start == chrono::Duration::minutes(60)));
    assert!(slots.iter().all(|s| s.is_available));
}

#[test]
fn slot_ending_exactly_at_window_end_is_included() {
    let slots: Vec<TimeSlot> = generate_candidates(window(9, 12), 60, 30).collect();
    assert_eq!(slots.last().unwrap().end, at(12, 0));
}

#[test]
fn long_request_still_uses_half_hour_grid() {
    let slots: Vec<TimeSlot> = generate_candidates(window(9, 12), 90, 30).collect();
    assert_eq!(starts(slots), ["09:00", "09:30", "10:00", "10:30"]);
}

#[test]
fn short_request_does_not_pack_tighter_than_step() {
    let slots: Vec<TimeSlot> = generate_candidates(window(9, 10), 15, 30).collect();
    assert_eq!(starts(slots), ["09:00", "09:30"]);
}

#[test]
fn duration_equal_to_window_yields_single_slot() {
    let slots: Vec<TimeSlot> = generate_candidates(window(9, 12), 180, 30).collect();
    assert_eq!(slots, vec![TimeSlot::available(at(9, 0), at(12, 0))]);
}

#[test]
fn duration_longer_than_window_yields_nothing() {
    assert_eq!(generate_candidates(window(9, 12), 240, 30).count(), 0);
}

#[test]
fn degenerate_window_yields_nothing() {
    assert_eq!(generate_candidates(window(9, 9), 30, 30).count(), 0);
    assert_eq!(generate_candidates(window(12, 9), 30, 30).count(), 0);
}

#[test]
fn non_positive_inputs_yield_nothing() {
    assert_eq!(generate_candidates(window(9, 12), 0, 30).count(), 0);
    assert_eq!(generate_candidates(window(9, 12), -60, 30).count(), 0);
    assert_eq!(generate_candidates(window(9, 12), 60, 0).count(), 0);
}

#[test]
fn absurd_duration_does_not_panic() {
    assert_eq!(generate_candidates(window(9, 12), i64::MAX, 30).count(), 0);
}

#[test]
fn custom_step_changes_grid() {
    let slots: Vec<TimeSlot> = generate_candidates(window(9, 10), 30, 15).collect();
    assert_eq!(starts(slots), ["09:00", "09:15", "09:30"]);
}

#[test]
fn sequence_is_restartable_by_clone() {
    let candidates = generate_candidates(window(9, 12), 60, 30);
    let first: Vec<TimeSlot> = candidates.clone().collect();
    let second: Vec<TimeSlot> = candidates.collect();
    assert_eq!(first, second);
}

#[test]
fn exhausted_iterator_stays_exhausted() {
    let mut candidates = generate_candidates(window(9, 10), 60, 30);
    assert!(candidates.next().is_some());
    assert!(candidates.next().is_none());
    assert!(candidates.next().is_none());
}

#[test]
fn rule_projects_onto_utc_date() {
    let rule = AvailabilityRule::new(1, tod("09:00"), tod("12:00")).unwrap();
    let date = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();

    assert_eq!(rule.project(date, &Tz::UTC), Some(window(9, 12)));
    assert_eq!(
        candidates_for_rule(&rule, date, &Tz::UTC, 60, DEFAULT_SLOT_STEP_MINUTES).count(),
        5
    );
}

#[test]
fn rule_projects_in_reference_time_zone() {
    // 09:00-12:00 in Tokyo (UTC+9) is 00:00-03:00 UTC.
    let rule = AvailabilityRule::new(1, tod("09:00"), tod("12:00")).unwrap();
    let date = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
    let projected = rule.project(date, &chrono_tz::Asia::Tokyo).unwrap();

    assert_eq!(projected, window(0, 3));
}

#[test]
fn end_of_day_rule_runs_to_next_midnight() {
    let rule = AvailabilityRule::new(1, tod("22:00"), tod("24:00")).unwrap();
    let date = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
    let projected = rule.project(date, &Tz::UTC).unwrap();

    assert_eq!(projected.start, at(22, 0));
    assert_eq!(projected.end, Utc.with_ymd_and_hms(2026, 3, 17, 0, 0, 0).unwrap());
}

#[test]
fn window_across_spring_forward_counts_real_minutes() {
    // 2026-03-08 in New York: clocks jump 02:00 EST -> 03:00 EDT.
    // 01:00 EST = 06:00Z, 04:00 EDT = 08:00Z, so the window is two real hours.
    let rule = AvailabilityRule::new(0, tod("01:00"), tod("04:00")).unwrap();
    let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
    let tz = chrono_tz::America::New_York;

    let slots: Vec<TimeSlot> = candidates_for_rule(&rule, date, &tz, 60, 30).collect();
    let starts: Vec<DateTime<Utc>> = slots.iter().map(|s| s.start).collect();

    assert_eq!(
        starts,
        vec![
            Utc.with_ymd_and_hms(2026, 3, 8, 6, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 8, 6, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 8, 7, 0, 0).unwrap(),
        ]
    );
}

#[test]
fn start_inside_dst_gap_shifts_forward() {
    // 02:30 does not exist on 2026-03-08 in New York; read with EST it is 07:30Z.
    let rule = AvailabilityRule::new(0, tod("02:30"), tod("05:00")).unwrap();
    let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
    let projected = rule.project(date, &chrono_tz::America::New_York).unwrap();

    assert_eq!(projected.start, Utc.with_ymd_and_hms(2026, 3, 8, 7, 30, 0).unwrap());
    assert_eq!(projected.end, Utc.with_ymd_and_hms(2026, 3, 8, 9, 0, 0).unwrap());
}

#[test]
fn ambiguous_fall_back_time_takes_earlier_instant() {
    // 2026-11-01 in New York: 01:30 happens twice; the EDT reading is 05:30Z.
    let rule = AvailabilityRule::new(0, tod("01:30"), tod("03:00")).unwrap();
    let date = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();
    let projected = rule.project(date, &chrono_tz::America::New_York).unwrap();

    assert_eq!(projected.start, Utc.with_ymd_and_hms(2026, 11, 1, 5, 30, 0).unwrap());
    // 03:00 EST = 08:00Z
    assert_eq!(projected.end, Utc.with_ymd_and_hms(2026, 11, 1, 8, 0, 0).unwrap());
}

#[test]
fn rule_constructor_validates() {
    assert!(AvailabilityRule::new(7, tod("09:00"), tod("10:00")).is_err());
    assert!(AvailabilityRule::new(1, tod("10:00"), tod("10:00")).is_err());
    assert!(AvailabilityRule::new(1, tod("11:00"), tod("10:00")).is_err());
    assert_eq!(
        AvailabilityRule::new(6, tod("10:00"), tod("11:00")).unwrap().weekday(),
        Some(chrono::Weekday::Sat)
    );
}

#[test]
fn rule_deserializes_from_service_json() {
    let rule: AvailabilityRule = serde_json::from_str(
        r#"{"dayOfWeek":1,"startTime":"09:00","endTime":"17:00","isRecurring":true}"#,
    )
    .unwrap();
    assert_eq!(rule, AvailabilityRule::new(1, tod("09:00"), tod("17:00")).unwrap());

    let bad = serde_json::from_str::<AvailabilityRule>(
        r#"{"dayOfWeek":1,"startTime":"nine","endTime":"17:00"}"#,
    );
    assert!(bad.is_err());
}

#[test]
fn rule_rejects_signed_times() {
    for json in [
        r#"{"dayOfWeek":1,"startTime":"+9:00","endTime":"12:00"}"#,
        r#"{"dayOfWeek":1,"startTime":"09:00","endTime":"12:+5"}"#,
    ] {
        assert!(serde_json::from_str::<AvailabilityRule>(json).is_err(), "{json}");
    }
}
