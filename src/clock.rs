//! Wall-clock readings for schedule evaluation.
//!
//! The engine never does timezone math itself; a [`WallClock`]
//! implementation hands it an already-localized reading.

use chrono::{Local, NaiveDate, Timelike};

/// A localized wall-clock reading: time of day plus calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallTime {
    /// Hour of day (0-23).
    pub hour: u8,
    /// Minute of hour (0-59).
    pub minute: u8,
    /// Calendar date. Schedule entries fire at most once per date.
    pub date: NaiveDate,
}

impl std::fmt::Display for WallTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:02}:{:02}", self.date, self.hour, self.minute)
    }
}

/// Source of localized wall-clock readings for the evaluator.
pub trait WallClock: Send + 'static {
    /// Current wall-clock time.
    fn now(&self) -> WallTime;
}

/// Reads the host's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> WallTime {
        let now = Local::now();
        WallTime {
            hour: now.hour() as u8,
            minute: now.minute() as u8,
            date: now.date_naive(),
        }
    }
}
