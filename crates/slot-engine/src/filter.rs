//! Drop candidate slots that collide with occupied intervals.
//!
//! Each candidate is checked on its own with a linear scan of the day's occupied
//! intervals. Adjacent ranges (one ends exactly when the other starts) are NOT
//! conflicts.

use serde::Serialize;

use crate::interval::{overlaps, Interval, OccupiedInterval, TimeSlot};

/// An occupied interval that blocks a candidate, with the size of the collision.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    #[serde(flatten)]
    pub occupied: OccupiedInterval,
    pub overlap_minutes: i64,
}

/// A candidate the filter dropped, with everything that blocked it.
///
/// `slot.is_available` is always false.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcludedSlot {
    #[serde(flatten)]
    pub slot: TimeSlot,
    pub conflicts: Vec<Conflict>,
}

/// True iff `candidate` overlaps none of `occupied`.
pub fn is_free<C>(candidate: &C, occupied: &[OccupiedInterval]) -> bool
where
    C: Interval + ?Sized,
{
    !occupied.iter().any(|o| overlaps(candidate, o))
}

/// Keep only the candidates that are free against `occupied`.
pub fn filter_available<'a, I>(
    candidates: I,
    occupied: &'a [OccupiedInterval],
) -> impl Iterator<Item = TimeSlot> + 'a
where
    I: IntoIterator<Item = TimeSlot>,
    I::IntoIter: 'a,
{
    candidates
        .into_iter()
        .filter(move |slot| is_free(slot, occupied))
}

/// Every occupied interval that overlaps `candidate`.
///
/// The overlap duration is `min(a.end, b.end) - max(a.start, b.start)`.
pub fn find_conflicts<C>(candidate: &C, occupied: &[OccupiedInterval]) -> Vec<Conflict>
where
    C: Interval + ?Sized,
{
    occupied
        .iter()
        .filter(|o| overlaps(candidate, *o))
        .map(|o| {
            let overlap_start = candidate.start().max(o.start);
            let overlap_end = candidate.end().min(o.end);
            Conflict {
                occupied: *o,
                overlap_minutes: (overlap_end - overlap_start).num_minutes(),
            }
        })
        .collect()
}

/// The complement of [`filter_available`]: candidates that collide with `occupied`,
/// each with its conflicts.
pub fn excluded_slots<'a, I>(
    candidates: I,
    occupied: &'a [OccupiedInterval],
) -> impl Iterator<Item = ExcludedSlot> + 'a
where
    I: IntoIterator<Item = TimeSlot>,
    I::IntoIter: 'a,
{
    candidates.into_iter().filter_map(move |slot| {
        let conflicts = find_conflicts(&slot, occupied);
        if conflicts.is_empty() {
            return None;
        }
        Some(ExcludedSlot {
            slot: TimeSlot {
                is_available: false,
                ..slot
            },
            conflicts,
        })
    })
}
