//! Recurring weekly availability rules and their projection onto a calendar date.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc,
    Weekday,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::interval::TimeRange;
use crate::time_of_day::TimeOfDay;

/// A recurring weekly window during which a worker accepts bookings.
///
/// `day_of_week` counts from Sunday (`0`) to Saturday (`6`). Windows are same-day:
/// overnight wraparound is not supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRule {
    pub day_of_week: u8,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    #[serde(default = "default_recurring")]
    pub is_recurring: bool,
}

fn default_recurring() -> bool {
    true
}

impl AvailabilityRule {
    /// Build a validated recurring rule.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidRule` if `day_of_week > 6` or `start_time >= end_time`.
    pub fn new(day_of_week: u8, start_time: TimeOfDay, end_time: TimeOfDay) -> Result<Self> {
        let rule = Self {
            day_of_week,
            start_time,
            end_time,
            is_recurring: true,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Check the rule's structural invariants.
    ///
    /// Deserialized rules are not validated automatically; the engine skips a
    /// degenerate rule instead of failing the whole query.
    pub fn validate(&self) -> Result<()> {
        if self.day_of_week > 6 {
            return Err(SlotError::InvalidRule(format!(
                "day of week {} is outside 0-6",
                self.day_of_week
            )));
        }
        if self.start_time >= self.end_time {
            return Err(SlotError::InvalidRule(format!(
                "start {} is not before end {}",
                self.start_time, self.end_time
            )));
        }
        Ok(())
    }

    /// The chrono weekday for this rule, if `day_of_week` is in range.
    pub fn weekday(&self) -> Option<Weekday> {
        match self.day_of_week {
            0 => Some(Weekday::Sun),
            1 => Some(Weekday::Mon),
            2 => Some(Weekday::Tue),
            3 => Some(Weekday::Wed),
            4 => Some(Weekday::Thu),
            5 => Some(Weekday::Fri),
            6 => Some(Weekday::Sat),
            _ => None,
        }
    }

    pub fn applies_to(&self, date: NaiveDate) -> bool {
        self.day_of_week == day_of_week(date)
    }

    /// Project the rule's window onto `date` in the reference time zone.
    ///
    /// Returns `None` when the projected window is empty (degenerate rule, or a DST
    /// transition that collapses it).
    pub fn project(&self, date: NaiveDate, tz: &Tz) -> Option<TimeRange> {
        let start = local_instant(date, self.start_time, tz)?;
        let end = local_instant(date, self.end_time, tz)?;
        (start < end).then(|| TimeRange::new(start, end))
    }
}

/// Weekday of `date`, counting from Sunday = 0.
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// The instant at which `time` occurs on `date` in `tz`.
///
/// `24:00` maps to the following local midnight.
pub(crate) fn local_instant(date: NaiveDate, time: TimeOfDay, tz: &Tz) -> Option<DateTime<Utc>> {
    let naive = match time.to_naive_time() {
        Some(t) => date.and_time(t),
        None => date.succ_opt()?.and_hms_opt(0, 0, 0)?,
    };
    Some(resolve_local(tz, naive))
}

/// Local midnight at the start of `date` and at the start of the following day.
pub(crate) fn day_bounds(date: NaiveDate, tz: &Tz) -> Option<TimeRange> {
    let start = local_instant(date, TimeOfDay::MIDNIGHT, tz)?;
    let end = local_instant(date, TimeOfDay::END_OF_DAY, tz)?;
    Some(TimeRange::new(start, end))
}

/// Resolve a local wall-clock time to UTC.
///
/// Ambiguous times (fall back) take the earlier instant. Times inside a spring-forward
/// gap are read with the offset in effect before the transition, which lands them
/// after the gap by its length.
fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            let offset_secs = tz
                .offset_from_local_datetime(&(naive - Duration::days(1)))
                .earliest()
                .map(|offset| offset.fix().local_minus_utc())
                .unwrap_or(0);
            Utc.from_utc_datetime(&(naive - Duration::seconds(i64::from(offset_secs))))
        }
    }
}
