//! Per-tournament settings: player limit, court count and the time-slot grid.

use crate::models::tournament::TournamentError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Fewest players a tournament can be configured for.
pub const MIN_PLAYERS: usize = 4;
pub const DEFAULT_PLAYER_LIMIT: usize = 5;
pub const DEFAULT_NUMBER_OF_COURTS: u8 = 2;
pub const MAX_COURTS: u8 = 10;

const MINUTES_PER_HOUR: u32 = 60;

/// A scheduling bucket, stored as minutes since midnight and shown as `HH:MM`.
///
/// User-entered slots are limited to 00:00..=23:59; slots synthesized by the
/// scheduler past the nominal end may run beyond midnight ("24:00", "25:00").
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot {
    minutes: u32,
}

impl TimeSlot {
    pub const fn from_hm(hour: u32, minute: u32) -> Self {
        Self {
            minutes: hour * MINUTES_PER_HOUR + minute,
        }
    }

    pub const fn from_minutes(minutes: u32) -> Self {
        Self { minutes }
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    /// Slot `minutes` later than this one.
    pub fn later_by(&self, minutes: u32) -> Self {
        Self {
            minutes: self.minutes.saturating_add(minutes),
        }
    }

    fn parse(raw: &str, allow_overnight: bool) -> Result<Self, TournamentError> {
        let invalid = || TournamentError::InvalidTimeSlot(raw.to_string());
        let (hour, minute) = raw.trim().split_once(':').ok_or_else(invalid)?;
        let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !digits(hour) || !digits(minute) || minute.len() != 2 {
            return Err(invalid());
        }
        if !allow_overnight && hour.len() > 2 {
            return Err(invalid());
        }
        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;
        if minute >= MINUTES_PER_HOUR || (!allow_overnight && hour > 23) {
            return Err(invalid());
        }
        hour.checked_mul(MINUTES_PER_HOUR)
            .and_then(|m| m.checked_add(minute))
            .map(Self::from_minutes)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}",
            self.minutes / MINUTES_PER_HOUR,
            self.minutes % MINUTES_PER_HOUR
        )
    }
}

/// Strict parse for user input: `H:MM` or `HH:MM`, hour 0..=23.
impl FromStr for TimeSlot {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, false)
    }
}

/// Lenient parse for stored documents: any hour the scheduler can emit.
impl TryFrom<String> for TimeSlot {
    type Error = TournamentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value, true)
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}

/// 08:00 through 21:00 in 30-minute steps.
pub fn default_time_slots() -> Vec<TimeSlot> {
    (16..=42).map(|half_hour| TimeSlot::from_minutes(half_hour * 30)).collect()
}

/// Settings that shape registration and scheduling.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSettings {
    pub player_limit: usize,
    pub number_of_courts: u8,
    #[serde(default = "default_time_slots")]
    pub time_slots: Vec<TimeSlot>,
}

impl Default for TournamentSettings {
    fn default() -> Self {
        Self {
            player_limit: DEFAULT_PLAYER_LIMIT,
            number_of_courts: DEFAULT_NUMBER_OF_COURTS,
            time_slots: default_time_slots(),
        }
    }
}

impl TournamentSettings {
    /// Check a new player limit against the roster size.
    pub fn validate_player_limit(limit: usize, registered: usize) -> Result<(), TournamentError> {
        if limit < MIN_PLAYERS {
            return Err(TournamentError::PlayerLimitTooLow { minimum: MIN_PLAYERS });
        }
        if limit < registered {
            return Err(TournamentError::PlayerLimitBelowRegistered { registered });
        }
        Ok(())
    }

    pub fn validate_number_of_courts(courts: u8) -> Result<(), TournamentError> {
        if !(1..=MAX_COURTS).contains(&courts) {
            return Err(TournamentError::InvalidCourtCount(courts));
        }
        Ok(())
    }

    /// Parse, deduplicate-check and sort a list of user-entered slots.
    pub fn parse_time_slots<S: AsRef<str>>(raw: &[S]) -> Result<Vec<TimeSlot>, TournamentError> {
        if raw.is_empty() {
            return Err(TournamentError::EmptyTimeSlots);
        }
        let mut seen = HashSet::with_capacity(raw.len());
        let mut slots = Vec::with_capacity(raw.len());
        for entry in raw {
            let slot: TimeSlot = entry.as_ref().parse()?;
            if !seen.insert(slot) {
                return Err(TournamentError::DuplicateTimeSlot(slot.to_string()));
            }
            slots.push(slot);
        }
        slots.sort();
        Ok(slots)
    }
}
