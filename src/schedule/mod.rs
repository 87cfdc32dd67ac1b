//! Daily schedule entries and the fixed-capacity table that holds them.

pub mod entry;
pub mod store;

pub use entry::{CronEntry, FiredAt};
pub use store::{EntrySnapshot, SCHEDULE_SLOTS, ScheduleSnapshot, ScheduleStore};
