//! Candidate slot generation inside a single availability window.
//!
//! Candidates sit on a fixed grid anchored at the window start (30 minutes by
//! default), regardless of the requested duration. A 90-minute request therefore
//! still surfaces options at :00 and :30 instead of packing slots end to end.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::interval::{TimeRange, TimeSlot};
use crate::rule::AvailabilityRule;

/// Grid step between consecutive candidate starts.
pub const DEFAULT_SLOT_STEP_MINUTES: i64 = 30;

/// Lazy, finite sequence of candidate slots for one window.
///
/// Cloning yields an independent iterator from the same position, so the sequence
/// can be restarted by cloning before consuming.
#[derive(Debug, Clone)]
pub struct SlotCandidates {
    current: DateTime<Utc>,
    window_end: DateTime<Utc>,
    duration: Duration,
    step: Duration,
    done: bool,
}

impl SlotCandidates {
    fn empty() -> Self {
        Self {
            current: DateTime::<Utc>::MIN_UTC,
            window_end: DateTime::<Utc>::MIN_UTC,
            duration: Duration::zero(),
            step: Duration::zero(),
            done: true,
        }
    }
}

impl Iterator for SlotCandidates {
    type Item = TimeSlot;

    fn next(&mut self) -> Option<TimeSlot> {
        if self.done {
            return None;
        }

        // A slot ending exactly at the window end is still valid.
        let end = match self.current.checked_add_signed(self.duration) {
            Some(end) if end <= self.window_end => end,
            _ => {
                self.done = true;
                return None;
            }
        };

        let slot = TimeSlot::available(self.current, end);
        match self.current.checked_add_signed(self.step) {
            Some(next) => self.current = next,
            None => self.done = true,
        }
        Some(slot)
    }
}

/// Enumerate `[t, t + duration)` for `t = window.start, window.start + step, ...`
/// while the slot still fits inside the window.
///
/// Yields nothing when the window is empty, or when `duration_minutes` or
/// `step_minutes` is not positive.
pub fn generate_candidates(window: TimeRange, duration_minutes: i64, step_minutes: i64) -> SlotCandidates {
    if window.start >= window.end || duration_minutes <= 0 || step_minutes <= 0 {
        return SlotCandidates::empty();
    }

    match (
        Duration::try_minutes(duration_minutes),
        Duration::try_minutes(step_minutes),
    ) {
        (Some(duration), Some(step)) => SlotCandidates {
            current: window.start,
            window_end: window.end,
            duration,
            step,
            done: false,
        },
        _ => SlotCandidates::empty(),
    }
}

/// Project `rule` onto `date` and enumerate its candidates.
pub fn candidates_for_rule(
    rule: &AvailabilityRule,
    date: NaiveDate,
    tz: &Tz,
    duration_minutes: i64,
    step_minutes: i64,
) -> SlotCandidates {
    match rule.project(date, tz) {
        Some(window) => generate_candidates(window, duration_minutes, step_minutes),
        None => SlotCandidates::empty(),
    }
}
