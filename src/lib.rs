//! Furrow: two-pump irrigation scheduling and actuation engine.
//!
//! This crate drives a pair of irrigation pumps from a fixed-capacity
//! daily schedule:
//! Schedule updates → Evaluator → Run requests → Runner → Pump driver
//!
//! # Architecture
//!
//! The engine is built from two independent tasks connected by bounded
//! async channels:
//! - **Evaluator**: Holds the schedule table, applies at most one update
//!   per tick, and fires entries whose hour and minute match the wall
//!   clock, at most once per calendar day
//! - **Runner**: Services run requests one at a time, setting both pump
//!   outputs, holding for the requested duration, then forcing both off
//!
//! Sends to a full channel drop the message rather than block, so a
//! busy runner can never stall the evaluator.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod hardware;
pub mod schedule;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use clock::{SystemClock, WallClock, WallTime};
pub use config::FurrowConfig;
pub use engine::{Engine, EngineHandle, RunRequest};
pub use error::{FurrowError, Result};
pub use hardware::{LogDriver, Pump, PumpDriver, PumpState};
pub use schedule::{CronEntry, SCHEDULE_SLOTS, ScheduleSnapshot, ScheduleStore};
