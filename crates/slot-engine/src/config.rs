//! Engine configuration.
//!
//! All tunables are passed in at construction; nothing is read from the process
//! environment at query time. Configuration can be built in code or loaded from TOML:
//!
//! ```
//! use slot_engine::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     timezone = "America/New_York"
//!     slot_step_minutes = 15
//! "#).unwrap();
//!
//! assert_eq!(config.timezone, chrono_tz::America::New_York);
//! assert_eq!(config.slot_step_minutes, 15);
//! assert_eq!(config.default_duration_minutes, 60);
//! ```

use std::path::Path;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::generator::DEFAULT_SLOT_STEP_MINUTES;

/// Duration used when a caller does not ask for one.
pub const DEFAULT_DURATION_MINUTES: i64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// IANA zone in which query dates and rule times of day are interpreted.
    #[serde(with = "tz_name")]
    pub timezone: Tz,

    /// Grid step between candidate slot starts.
    ///
    /// The booking service's grid is 30 minutes regardless of duration; any other
    /// value produces a different set of candidates than that reference grid.
    pub slot_step_minutes: i64,

    /// Duration applied by [`AvailabilityService::compute_available_slots_default`].
    ///
    /// [`AvailabilityService::compute_available_slots_default`]: crate::AvailabilityService::compute_available_slots_default
    pub default_duration_minutes: i64,

    /// Merge overlapping rule windows before generation and sort the result.
    ///
    /// Off by default: rules are processed independently and concatenated in the
    /// order the rule store returns them, which can yield duplicate slots when a
    /// worker's rules overlap.
    pub merge_overlapping_rules: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            slot_step_minutes: DEFAULT_SLOT_STEP_MINUTES,
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
            merge_overlapping_rules: false,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration in the named IANA zone.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidTimezone` if `name` is not a known zone.
    pub fn with_timezone(name: &str) -> Result<Self> {
        Ok(Self {
            timezone: parse_tz(name)?,
            ..Self::default()
        })
    }

    /// Loads and validates configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SlotError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| SlotError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.slot_step_minutes <= 0 {
            return Err(SlotError::Config(format!(
                "slot_step_minutes must be positive, got {}",
                self.slot_step_minutes
            )));
        }
        if self.default_duration_minutes <= 0 {
            return Err(SlotError::Config(format!(
                "default_duration_minutes must be positive, got {}",
                self.default_duration_minutes
            )));
        }
        Ok(())
    }
}

fn parse_tz(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| SlotError::InvalidTimezone(name.to_string()))
}

mod tz_name {
    use chrono_tz::Tz;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(tz: &Tz, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(tz.name())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Tz, D::Error> {
        let name = String::deserialize(deserializer)?;
        super::parse_tz(&name).map_err(de::Error::custom)
    }
}
