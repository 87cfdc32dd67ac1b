//! Daily schedule entries.
//!
//! A [`CronEntry`] is a recurring time-of-day trigger for one pump. It
//! fires on the evaluator tick that observes an exact hour/minute match,
//! at most once per calendar day. Entries are validated on construction;
//! the evaluator is the only mutator afterwards.

use crate::clock::WallTime;
use crate::error::{FurrowError, Result};
use crate::hardware::{Pump, PumpState};
use chrono::NaiveDate;
use serde::Serialize;
use std::time::Duration;

/// Record of an entry's most recent firing.
///
/// The date blocks a second firing the same day; hour and minute are
/// diagnostics for the schedule display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FiredAt {
    /// Calendar date of the firing.
    pub date: NaiveDate,
    /// Hour the firing was observed.
    pub hour: u8,
    /// Minute the firing was observed.
    pub minute: u8,
}

/// A recurring daily pump trigger.
#[derive(Debug, Clone)]
pub struct CronEntry {
    pump: Pump,
    desired_state: PumpState,
    duration: Duration,
    hour: u8,
    minute: u8,
    last_fired: Option<FiredAt>,
}

impl CronEntry {
    /// Create a validated entry that has never fired.
    ///
    /// # Errors
    ///
    /// Returns an error when the duration is zero or the time of day is
    /// out of range.
    pub fn new(
        pump: Pump,
        desired_state: PumpState,
        duration: Duration,
        hour: u8,
        minute: u8,
    ) -> Result<Self> {
        if duration.is_zero() {
            return Err(FurrowError::Schedule("duration must be positive".to_owned()));
        }
        if hour > 23 {
            return Err(FurrowError::Schedule(format!(
                "hour {hour} out of range (0-23)"
            )));
        }
        if minute > 59 {
            return Err(FurrowError::Schedule(format!(
                "minute {minute} out of range (0-59)"
            )));
        }

        Ok(Self {
            pump,
            desired_state,
            duration,
            hour,
            minute,
            last_fired: None,
        })
    }

    /// Pump this entry triggers.
    pub fn pump(&self) -> Pump {
        self.pump
    }

    /// Pump state recorded on the entry.
    ///
    /// Carried for the schedule display; firing always turns the entry's
    /// own pump on.
    pub fn desired_state(&self) -> PumpState {
        self.desired_state
    }

    /// How long the pump runs when the entry fires.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Scheduled hour of day (0-23).
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Scheduled minute of hour (0-59).
    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Most recent firing, if any.
    pub fn last_fired(&self) -> Option<FiredAt> {
        self.last_fired
    }

    /// Returns `true` when the entry matches `now` exactly and has not
    /// already fired on `now`'s date.
    ///
    /// There is no match window: a tick that lands on any other minute
    /// does not fire the entry, even if the scheduled minute was skipped.
    pub fn is_due(&self, now: WallTime) -> bool {
        if self.hour != now.hour || self.minute != now.minute {
            return false;
        }
        match self.last_fired {
            Some(fired) => fired.date != now.date,
            None => true,
        }
    }

    /// Record that the entry fired at `now`, blocking further firings on
    /// the same date.
    pub fn mark_fired(&mut self, now: WallTime) {
        self.last_fired = Some(FiredAt {
            date: now.date,
            hour: now.hour,
            minute: now.minute,
        });
    }
}

impl std::fmt::Display for CronEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "pump {} for {}s daily at {:02}:{:02}",
            self.pump,
            self.duration.as_secs(),
            self.hour,
            self.minute
        )
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn at(hour: u8, minute: u8) -> WallTime {
        WallTime {
            hour,
            minute,
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        }
    }

    fn entry(hour: u8, minute: u8) -> CronEntry {
        CronEntry::new(Pump::A, PumpState::On, Duration::from_secs(60), hour, minute)
            .expect("valid entry")
    }

    #[test]
    fn new_entry_has_never_fired() {
        let entry = entry(7, 30);
        assert_eq!(entry.pump(), Pump::A);
        assert_eq!(entry.duration(), Duration::from_secs(60));
        assert!(entry.last_fired().is_none());
    }

    #[test]
    fn new_rejects_zero_duration() {
        let result = CronEntry::new(Pump::A, PumpState::On, Duration::ZERO, 7, 30);
        assert!(result.is_err());
    }

    #[test]
    fn new_rejects_out_of_range_hour() {
        let result = CronEntry::new(Pump::A, PumpState::On, Duration::from_secs(60), 24, 0);
        assert!(result.is_err());
    }

    #[test]
    fn new_rejects_out_of_range_minute() {
        let result = CronEntry::new(Pump::A, PumpState::On, Duration::from_secs(60), 0, 60);
        assert!(result.is_err());
    }

    #[test]
    fn is_due_requires_exact_minute() {
        let entry = entry(7, 30);
        assert!(entry.is_due(at(7, 30)));
        assert!(!entry.is_due(at(7, 29)));
        assert!(!entry.is_due(at(7, 31)));
        assert!(!entry.is_due(at(8, 30)));
    }

    #[test]
    fn is_due_false_after_firing_same_day() {
        let mut entry = entry(7, 30);
        entry.mark_fired(at(7, 30));
        assert!(!entry.is_due(at(7, 30)));
    }

    #[test]
    fn is_due_again_next_day() {
        let mut entry = entry(7, 30);
        entry.mark_fired(at(7, 30));

        let next_day = WallTime {
            hour: 7,
            minute: 30,
            date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
        };
        assert!(entry.is_due(next_day));
    }

    #[test]
    fn mark_fired_records_observed_time() {
        let mut entry = entry(7, 30);
        entry.mark_fired(at(7, 30));

        let fired = entry.last_fired().expect("fired");
        assert_eq!(fired.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(fired.hour, 7);
        assert_eq!(fired.minute, 30);
    }

    #[test]
    fn display_describes_the_trigger() {
        let entry = entry(7, 5);
        assert_eq!(entry.to_string(), "pump A for 60s daily at 07:05");
    }
}
