//! # slot-engine
//!
//! Bookable time-slot computation for a worker on a calendar date.
//!
//! Slots are derived from the worker's recurring weekly availability rules, minus
//! anything already occupied by a non-cancelled booking or an explicit block. The
//! engine itself is pure: it never persists, never authorizes, and never decides
//! booking state transitions. Rule and occupancy data arrive through two async
//! collaborator ports.
//!
//! ## Modules
//!
//! - [`interval`] — Half-open time ranges, overlap and containment
//! - [`time_of_day`] — Validated wall-clock `HH:MM` values
//! - [`rule`] — Recurring weekly availability rules and their projection onto a date
//! - [`generator`] — Fixed-step candidate slots inside a rule window
//! - [`filter`] — Discard candidates that overlap occupied intervals, or explain why
//! - [`store`] — Collaborator ports and an in-memory implementation
//! - [`facade`] — [`AvailabilityService`], the public query entry point
//! - [`config`] — Engine configuration (time zone, slot grid, defaults)
//! - [`error`] — Error types

pub mod config;
pub mod error;
pub mod facade;
pub mod filter;
pub mod generator;
pub mod interval;
pub mod rule;
pub mod store;
pub mod time_of_day;

pub use config::EngineConfig;
pub use error::{CollaboratorError, SlotError};
pub use facade::{compute_slots, excluded_candidates, validate_duration, AvailabilityService};
pub use filter::{excluded_slots, filter_available, find_conflicts, is_free, Conflict, ExcludedSlot};
pub use generator::{generate_candidates, SlotCandidates};
pub use interval::{contains, overlaps, Interval, OccupiedInterval, TimeRange, TimeSlot};
pub use rule::{day_of_week, AvailabilityRule};
pub use store::{AvailabilityRuleStore, InMemoryStore, OccupiedIntervalSource};
pub use time_of_day::TimeOfDay;
