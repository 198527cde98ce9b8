//! Half-open time ranges.
//!
//! Every range in this crate is `[start, end)`: start inclusive, end exclusive.
//! Two ranges that merely touch (`a.end == b.start`) do NOT overlap, which is what
//! allows back-to-back bookings with zero gap.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Anything with a start and end instant.
pub trait Interval {
    fn start(&self) -> DateTime<Utc>;
    fn end(&self) -> DateTime<Utc>;

    /// Whole minutes between start and end.
    fn duration_minutes(&self) -> i64 {
        (self.end() - self.start()).num_minutes()
    }

    /// A range with `start >= end` covers no time at all.
    fn is_empty(&self) -> bool {
        self.start() >= self.end()
    }
}

/// True iff `[a.start, a.end)` and `[b.start, b.end)` intersect.
pub fn overlaps<A, B>(a: &A, b: &B) -> bool
where
    A: Interval + ?Sized,
    B: Interval + ?Sized,
{
    a.start() < b.end() && b.start() < a.end()
}

/// True iff `inner` lies entirely within `outer` (boundaries inclusive).
pub fn contains<A, B>(outer: &A, inner: &B) -> bool
where
    A: Interval + ?Sized,
    B: Interval + ?Sized,
{
    outer.start() <= inner.start() && inner.end() <= outer.end()
}

/// A plain time range, used for projected rule windows and query ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

impl Interval for TimeRange {
    fn start(&self) -> DateTime<Utc> {
        self.start
    }

    fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// A concrete range already taken by a non-cancelled booking or an explicit block.
///
/// The engine does not care which of the two it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OccupiedInterval {
    #[serde(rename = "startTime")]
    pub start: DateTime<Utc>,
    #[serde(rename = "endTime")]
    pub end: DateTime<Utc>,
}

impl OccupiedInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

impl Interval for OccupiedInterval {
    fn start(&self) -> DateTime<Utc> {
        self.start
    }

    fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// A candidate or resulting bookable slot.
///
/// Slots returned by the engine always have `is_available == true`; the flag exists
/// because callers reuse the type for proposed-but-unavailable slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(rename = "startTime")]
    pub start: DateTime<Utc>,
    #[serde(rename = "endTime")]
    pub end: DateTime<Utc>,
    #[serde(rename = "isAvailable")]
    pub is_available: bool,
}

impl TimeSlot {
    /// A slot marked available.
    pub fn available(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            is_available: true,
        }
    }
}

impl Interval for TimeSlot {
    fn start(&self) -> DateTime<Utc> {
        self.start
    }

    fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// Merge strictly overlapping ranges into a sorted, non-overlapping list.
///
/// Empty ranges are dropped. Ranges that only touch stay separate.
pub fn merge_ranges(ranges: &[TimeRange]) -> Vec<TimeRange> {
    let mut sorted: Vec<TimeRange> = ranges.iter().filter(|r| !r.is_empty()).copied().collect();
    sorted.sort_by_key(|r| (r.start, r.end));

    let mut merged: Vec<TimeRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        if let Some(last) = merged.last_mut() {
            if range.start < last.end {
                last.end = last.end.max(range.end);
                continue;
            }
        }
        merged.push(range);
    }

    merged
}
