//! Availability query facade.
//!
//! [`AvailabilityService`] fetches a worker's rules for the date's weekday and the
//! intervals already taken that day, runs the generator over each matching rule,
//! and drops candidates that collide with anything occupied.
//!
//! Both fetches are issued concurrently. If either fails, the whole query fails:
//! slots computed from rules alone would overstate availability. Cancellation is
//! dropping the returned future, which drops both in-flight fetches with it.

use chrono::NaiveDate;
use tracing::{debug, instrument, warn};

use crate::config::EngineConfig;
use crate::error::{Result, SlotError};
use crate::filter::{excluded_slots, filter_available, ExcludedSlot};
use crate::generator::{candidates_for_rule, generate_candidates};
use crate::interval::{merge_ranges, OccupiedInterval, TimeRange, TimeSlot};
use crate::rule::{day_bounds, day_of_week, AvailabilityRule};
use crate::store::{AvailabilityRuleStore, OccupiedIntervalSource};

/// Public entry point for slot queries.
///
/// Holds no per-query state; a single instance can serve any number of concurrent
/// queries.
#[derive(Debug)]
pub struct AvailabilityService<R, O> {
    rules: R,
    occupied: O,
    config: EngineConfig,
}

impl<R, O> AvailabilityService<R, O>
where
    R: AvailabilityRuleStore,
    O: OccupiedIntervalSource,
{
    /// Wire up a service without probing the collaborators.
    pub fn new(rules: R, occupied: O, config: EngineConfig) -> Self {
        Self {
            rules,
            occupied,
            config,
        }
    }

    /// Wire up a service after checking the config and both collaborators.
    ///
    /// # Errors
    /// Returns `SlotError::Config` for an invalid configuration and
    /// `SlotError::Initialization` if either collaborator fails its health check.
    pub async fn connect(rules: R, occupied: O, config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let (rules_ready, occupied_ready) = tokio::join!(
            AvailabilityRuleStore::health_check(&rules),
            OccupiedIntervalSource::health_check(&occupied),
        );
        rules_ready.map_err(|e| SlotError::Initialization(e.to_string()))?;
        occupied_ready.map_err(|e| SlotError::Initialization(e.to_string()))?;

        Ok(Self::new(rules, occupied, config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Bookable slots of `duration_minutes` for `worker_id` on `date`.
    ///
    /// `date` is a calendar day in the configured time zone. Slots come back per rule
    /// in the order the rule store returned the rules, ascending within each rule.
    /// A non-positive duration yields an empty result; use [`validate_duration`] to
    /// reject it up front.
    ///
    /// # Errors
    /// Returns `SlotError::Collaborator` if either fetch fails.
    #[instrument(level = "debug", skip(self))]
    pub async fn compute_available_slots(
        &self,
        worker_id: &str,
        date: NaiveDate,
        duration_minutes: i64,
    ) -> Result<Vec<TimeSlot>> {
        let Some((rules, occupied)) = self.fetch_day(worker_id, date).await? else {
            return Ok(Vec::new());
        };

        let slots = compute_slots(&rules, &occupied, date, duration_minutes, &self.config);
        debug!(
            rules = rules.len(),
            occupied = occupied.len(),
            slots = slots.len(),
            "computed available slots"
        );
        Ok(slots)
    }

    /// The candidates [`compute_available_slots`](Self::compute_available_slots)
    /// would drop for the same query, each with the occupied intervals that block it.
    ///
    /// # Errors
    /// Returns `SlotError::Collaborator` if either fetch fails.
    #[instrument(level = "debug", skip(self))]
    pub async fn explain_excluded(
        &self,
        worker_id: &str,
        date: NaiveDate,
        duration_minutes: i64,
    ) -> Result<Vec<ExcludedSlot>> {
        let Some((rules, occupied)) = self.fetch_day(worker_id, date).await? else {
            return Ok(Vec::new());
        };

        let excluded = excluded_candidates(&rules, &occupied, date, duration_minutes, &self.config);
        debug!(excluded = excluded.len(), "explained excluded candidates");
        Ok(excluded)
    }

    /// Rules for `date`'s weekday and everything occupied during the local day,
    /// fetched concurrently. `None` if the date has no representable local day.
    async fn fetch_day(
        &self,
        worker_id: &str,
        date: NaiveDate,
    ) -> Result<Option<(Vec<AvailabilityRule>, Vec<OccupiedInterval>)>> {
        let weekday = day_of_week(date);
        let Some(day) = day_bounds(date, &self.config.timezone) else {
            return Ok(None);
        };

        let fetched = tokio::try_join!(
            self.rules.fetch_availability_rules(worker_id, weekday),
            self.occupied
                .fetch_occupied_intervals(worker_id, day.start, day.end),
        );
        match fetched {
            Ok(pair) => Ok(Some(pair)),
            Err(e) => {
                warn!(error = %e, "collaborator fetch failed");
                Err(e.into())
            }
        }
    }

    /// [`compute_available_slots`](Self::compute_available_slots) with the configured
    /// default duration.
    pub async fn compute_available_slots_default(
        &self,
        worker_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>> {
        self.compute_available_slots(worker_id, date, self.config.default_duration_minutes)
            .await
    }

    /// All of a worker's recurring rules, any weekday.
    pub async fn worker_rules(&self, worker_id: &str) -> Result<Vec<AvailabilityRule>> {
        Ok(self.rules.fetch_all_rules(worker_id).await?)
    }
}

/// Reject a non-positive duration.
///
/// The engine itself treats such a duration as "no slots"; this is for the caller's
/// validation layer.
pub fn validate_duration(duration_minutes: i64) -> Result<i64> {
    if duration_minutes <= 0 {
        return Err(SlotError::InvalidInput(format!(
            "duration must be a positive number of minutes, got {}",
            duration_minutes
        )));
    }
    Ok(duration_minutes)
}

/// The synchronous core: generate and filter slots from already-fetched data.
///
/// Rules whose weekday differs from `date`'s, or whose window is empty, contribute
/// nothing.
pub fn compute_slots(
    rules: &[AvailabilityRule],
    occupied: &[OccupiedInterval],
    date: NaiveDate,
    duration_minutes: i64,
    config: &EngineConfig,
) -> Vec<TimeSlot> {
    filter_available(candidates(rules, date, duration_minutes, config), occupied).collect()
}

/// The other half of [`compute_slots`]: candidates that collide with `occupied`,
/// in the same order `compute_slots` would have produced them.
pub fn excluded_candidates(
    rules: &[AvailabilityRule],
    occupied: &[OccupiedInterval],
    date: NaiveDate,
    duration_minutes: i64,
    config: &EngineConfig,
) -> Vec<ExcludedSlot> {
    excluded_slots(candidates(rules, date, duration_minutes, config), occupied).collect()
}

/// Every grid candidate for `date`, before occupancy is considered.
fn candidates(
    rules: &[AvailabilityRule],
    date: NaiveDate,
    duration_minutes: i64,
    config: &EngineConfig,
) -> Vec<TimeSlot> {
    if duration_minutes <= 0 {
        return Vec::new();
    }

    let tz = &config.timezone;
    let step = config.slot_step_minutes;
    let matching = rules.iter().filter(|rule| {
        if !rule.applies_to(date) {
            return false;
        }
        if rule.start_time >= rule.end_time {
            warn!(
                start = %rule.start_time,
                end = %rule.end_time,
                "skipping degenerate availability rule"
            );
            return false;
        }
        true
    });

    if config.merge_overlapping_rules {
        let windows: Vec<TimeRange> = matching.filter_map(|rule| rule.project(date, tz)).collect();
        let mut slots: Vec<TimeSlot> = merge_ranges(&windows)
            .into_iter()
            .flat_map(|window| generate_candidates(window, duration_minutes, step))
            .collect();
        slots.sort_by_key(|s| (s.start, s.end));
        slots.dedup();
        return slots;
    }

    matching
        .flat_map(|rule| candidates_for_rule(rule, date, tz, duration_minutes, step))
        .collect()
}
