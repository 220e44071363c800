//! Discretized time used for flow lookups.
//!
//! Historical flow is recorded per `(day, hourly slot)`.  A [`TimePoint`] is
//! always an explicit input (configuration or request), never derived from
//! the wall clock inside the planner.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Number of hourly slots in a day.
pub const SLOTS_PER_DAY: u8 = 24;

/// A day number plus an hourly slot in `0..24`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TimePoint {
    pub day: u32,
    pub slot: u8,
}

impl TimePoint {
    /// Validate `slot` and construct.
    pub fn new(day: u32, slot: u8) -> CoreResult<Self> {
        if slot >= SLOTS_PER_DAY {
            return Err(CoreError::InvalidTimeSlot(slot));
        }
        Ok(Self { day, slot })
    }

    pub fn is_valid(self) -> bool {
        self.slot < SLOTS_PER_DAY
    }
}

impl Default for TimePoint {
    /// Day 1, 08:00: the morning peak the historical data was sampled for.
    fn default() -> Self {
        Self { day: 1, slot: 8 }
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {} {:02}:00", self.day, self.slot)
    }
}
