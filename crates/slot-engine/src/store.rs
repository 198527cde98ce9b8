//! External collaborator ports and an in-memory implementation.
//!
//! The engine reads two things it does not own: a worker's recurring availability
//! rules, and the intervals already taken on a given day. Both are behind async
//! traits so a database, an RPC client, or [`InMemoryStore`] can back them.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CollaboratorError, Result, SlotError};
use crate::interval::{overlaps, Interval, OccupiedInterval, TimeRange};
use crate::rule::AvailabilityRule;

const OCCUPIED_SOURCE: &str = "occupied interval source";

/// Source of a worker's recurring weekly rules.
#[async_trait]
pub trait AvailabilityRuleStore: Send + Sync {
    /// Rules for `worker_id` whose `day_of_week` equals `day_of_week` (Sunday = 0).
    async fn fetch_availability_rules(
        &self,
        worker_id: &str,
        day_of_week: u8,
    ) -> std::result::Result<Vec<AvailabilityRule>, CollaboratorError>;

    /// Every rule for `worker_id`, any weekday.
    async fn fetch_all_rules(
        &self,
        worker_id: &str,
    ) -> std::result::Result<Vec<AvailabilityRule>, CollaboratorError>;

    /// Readiness check used when constructing a service.
    async fn health_check(&self) -> std::result::Result<(), CollaboratorError> {
        Ok(())
    }
}

/// Source of booked and blocked intervals.
#[async_trait]
pub trait OccupiedIntervalSource: Send + Sync {
    /// Non-cancelled bookings and explicit blocks for `worker_id` that intersect
    /// `[range_start, range_end)`.
    async fn fetch_occupied_intervals(
        &self,
        worker_id: &str,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> std::result::Result<Vec<OccupiedInterval>, CollaboratorError>;

    async fn health_check(&self) -> std::result::Result<(), CollaboratorError> {
        Ok(())
    }
}

#[async_trait]
impl<T: AvailabilityRuleStore + ?Sized> AvailabilityRuleStore for Arc<T> {
    async fn fetch_availability_rules(
        &self,
        worker_id: &str,
        day_of_week: u8,
    ) -> std::result::Result<Vec<AvailabilityRule>, CollaboratorError> {
        (**self).fetch_availability_rules(worker_id, day_of_week).await
    }

    async fn fetch_all_rules(
        &self,
        worker_id: &str,
    ) -> std::result::Result<Vec<AvailabilityRule>, CollaboratorError> {
        (**self).fetch_all_rules(worker_id).await
    }

    async fn health_check(&self) -> std::result::Result<(), CollaboratorError> {
        AvailabilityRuleStore::health_check(&**self).await
    }
}

#[async_trait]
impl<T: OccupiedIntervalSource + ?Sized> OccupiedIntervalSource for Arc<T> {
    async fn fetch_occupied_intervals(
        &self,
        worker_id: &str,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> std::result::Result<Vec<OccupiedInterval>, CollaboratorError> {
        (**self)
            .fetch_occupied_intervals(worker_id, range_start, range_end)
            .await
    }

    async fn health_check(&self) -> std::result::Result<(), CollaboratorError> {
        OccupiedIntervalSource::health_check(&**self).await
    }
}

// ---------------------------------------------------------------------------
// Collaborator-side records
// ---------------------------------------------------------------------------

/// Lifecycle state of a booking, as recorded by the booking service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Every status except `Cancelled` keeps its time range taken.
    pub fn occupies(self) -> bool {
        self != BookingStatus::Cancelled
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub status: BookingStatus,
}

/// An explicit block a worker placed on their calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedSlot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Everything the in-memory store knows about one worker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRecord {
    #[serde(default)]
    pub availability: Vec<AvailabilityRule>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
    #[serde(default)]
    pub blocked: Vec<BlockedSlot>,
}

/// JSON dataset shape: `{"workers": {"<id>": WorkerRecord}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub workers: BTreeMap<String, WorkerRecord>,
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Thread-safe in-memory backing for both collaborator ports.
///
/// Rules are returned in insertion order. Unknown workers have no rules and no
/// occupied intervals.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    workers: RwLock<BTreeMap<String, WorkerRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        Self {
            workers: RwLock::new(dataset.workers),
        }
    }

    /// Load a [`Dataset`] from JSON.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidInput` if the JSON is malformed or a rule carries an
    /// unparsable time of day.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(json)
            .map_err(|e| SlotError::InvalidInput(format!("dataset: {}", e)))?;
        Ok(Self::from_dataset(dataset))
    }

    /// Replace a worker's recurring rules.
    pub fn set_availability(&self, worker_id: &str, rules: Vec<AvailabilityRule>) {
        self.with_worker(worker_id, |w| w.availability = rules);
    }

    pub fn add_booking(&self, worker_id: &str, booking: Booking) {
        self.with_worker(worker_id, |w| w.bookings.push(booking));
    }

    pub fn add_block(&self, worker_id: &str, block: BlockedSlot) {
        self.with_worker(worker_id, |w| w.blocked.push(block));
    }

    /// Snapshot of the current data.
    pub fn to_dataset(&self) -> Dataset {
        let workers = self.workers.read().unwrap_or_else(PoisonError::into_inner);
        Dataset {
            workers: workers.clone(),
        }
    }

    fn with_worker(&self, worker_id: &str, f: impl FnOnce(&mut WorkerRecord)) {
        let mut workers = self.workers.write().unwrap_or_else(PoisonError::into_inner);
        f(workers.entry(worker_id.to_string()).or_default());
    }

    fn read_worker<T>(&self, worker_id: &str, f: impl FnOnce(&WorkerRecord) -> T) -> Option<T> {
        let workers = self.workers.read().unwrap_or_else(PoisonError::into_inner);
        workers.get(worker_id).map(f)
    }
}

#[async_trait]
impl AvailabilityRuleStore for InMemoryStore {
    async fn fetch_availability_rules(
        &self,
        worker_id: &str,
        day_of_week: u8,
    ) -> std::result::Result<Vec<AvailabilityRule>, CollaboratorError> {
        Ok(self
            .read_worker(worker_id, |w| {
                w.availability
                    .iter()
                    .filter(|r| r.day_of_week == day_of_week)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_all_rules(
        &self,
        worker_id: &str,
    ) -> std::result::Result<Vec<AvailabilityRule>, CollaboratorError> {
        Ok(self
            .read_worker(worker_id, |w| w.availability.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl OccupiedIntervalSource for InMemoryStore {
    async fn fetch_occupied_intervals(
        &self,
        worker_id: &str,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> std::result::Result<Vec<OccupiedInterval>, CollaboratorError> {
        if range_start >= range_end {
            return Err(CollaboratorError::new(
                OCCUPIED_SOURCE,
                format!("empty range {} .. {}", range_start, range_end),
            ));
        }
        let range = TimeRange::new(range_start, range_end);

        Ok(self
            .read_worker(worker_id, |w| {
                let booked = w
                    .bookings
                    .iter()
                    .filter(|b| b.status.occupies())
                    .map(|b| OccupiedInterval::new(b.start_time, b.end_time));
                let blocked = w
                    .blocked
                    .iter()
                    .map(|b| OccupiedInterval::new(b.start_time, b.end_time));

                booked
                    .chain(blocked)
                    .filter(|o| !o.is_empty() && overlaps(o, &range))
                    .collect()
            })
            .unwrap_or_default())
    }
}
