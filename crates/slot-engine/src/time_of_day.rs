//! Wall-clock time of day, as stored on availability rules.
//!
//! Rules arrive from the booking service as `"HH:MM"` strings. They are parsed and
//! range-checked once, at the deserialization boundary, so the generator never sees
//! a malformed value.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, SlotError};

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Minutes since local midnight, `00:00` through `24:00` inclusive.
///
/// `24:00` is only meaningful as the end of a rule window that runs to midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    minutes: u16,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { minutes: 0 };
    pub const END_OF_DAY: TimeOfDay = TimeOfDay {
        minutes: MINUTES_PER_DAY,
    };

    /// Build from hour and minute.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidTimeOfDay` unless `hour <= 23 && minute <= 59`, or the
    /// value is exactly `24:00`.
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        let valid = (hour <= 23 && minute <= 59) || (hour == 24 && minute == 0);
        if !valid {
            return Err(SlotError::InvalidTimeOfDay(format!(
                "{:02}:{:02} is out of range",
                hour, minute
            )));
        }
        Ok(Self {
            minutes: (hour * 60 + minute) as u16,
        })
    }

    pub fn hour(self) -> u32 {
        u32::from(self.minutes / 60)
    }

    pub fn minute(self) -> u32 {
        u32::from(self.minutes % 60)
    }

    pub fn minutes_since_midnight(self) -> u32 {
        u32::from(self.minutes)
    }

    pub fn is_end_of_day(self) -> bool {
        self.minutes == MINUTES_PER_DAY
    }

    /// The equivalent `NaiveTime`, or `None` for `24:00`.
    pub fn to_naive_time(self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0)
    }
}

impl FromStr for TimeOfDay {
    type Err = SlotError;

    /// Accepts `H:MM`, `HH:MM`, and `HH:MM:00`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SlotError::InvalidTimeOfDay(format!("'{}' is not HH:MM", s));

        let mut parts = s.trim().split(':');
        let hour = parts.next().ok_or_else(invalid)?;
        let minute = parts.next().ok_or_else(invalid)?;
        if let Some(seconds) = parts.next() {
            if seconds != "00" {
                return Err(invalid());
            }
        }
        if parts.next().is_some() || hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        // `u32::from_str` would also take a leading `+`.
        if !hour.bytes().chain(minute.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;
        TimeOfDay::new(hour, minute)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
