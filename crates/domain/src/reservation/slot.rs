//! Reservation time slots.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error from constructing a time slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("horário de início deve ser anterior ao horário de fim")]
pub struct InvalidSlot;

/// A half-open `[start, end)` interval within a single day.
///
/// Two slots on the same date conflict when their intervals intersect;
/// touching boundaries (one ends exactly when the other starts) do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeSlot {
    /// Creates a slot, rejecting empty or inverted intervals.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, InvalidSlot> {
        if start >= end {
            return Err(InvalidSlot);
        }
        Ok(Self { start, end })
    }

    /// Start of the interval (inclusive).
    pub fn start(&self) -> NaiveTime {
        self.start
    }

    /// End of the interval (exclusive).
    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Length of the slot.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Half-open interval intersection.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && self.end > other.start
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}
