//! Ledger clock: day counter plus a calendar date.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar date the first game day maps to.
pub const EPOCH: (i32, u32, u32) = (2025, 1, 1);

/// Monotonic game clock. Day 1 is the first day; the date advances in
/// lockstep so records can carry human-readable timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    pub day: u32,
    pub date: NaiveDate,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    #[must_use]
    pub fn new() -> Self {
        // The epoch constant is a valid calendar date.
        let date = NaiveDate::from_ymd_opt(EPOCH.0, EPOCH.1, EPOCH.2)
            .unwrap_or(NaiveDate::MIN);
        Self { day: 1, date }
    }

    /// Advances exactly one day and returns the new day number.
    pub fn advance_day(&mut self) -> u32 {
        self.day = self.day.saturating_add(1);
        self.date += Duration::days(1);
        self.day
    }

    /// ISO-8601 date string for record timestamps.
    #[must_use]
    pub fn timestamp(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_day_one() {
        let clock = Clock::new();
        assert_eq!(clock.day, 1);
        assert_eq!(clock.timestamp(), "2025-01-01");
    }

    #[test]
    fn advances_date_with_day() {
        let mut clock = Clock::new();
        for _ in 0..31 {
            clock.advance_day();
        }
        assert_eq!(clock.day, 32);
        assert_eq!(clock.timestamp(), "2025-02-01");
    }
}
