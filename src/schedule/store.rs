//! Fixed-capacity schedule table.
//!
//! The table holds [`SCHEDULE_SLOTS`] entries in a circular arena: an
//! insert always succeeds by overwriting the slot under the write
//! cursor, oldest first, whether or not that entry was still useful.
//! The table is owned exclusively by the evaluator task and is never
//! shared; snapshot reads are answered by the evaluator itself.

use crate::clock::WallTime;
use crate::hardware::{Pump, PumpState};
use crate::schedule::entry::{CronEntry, FiredAt};
use serde::Serialize;

/// Number of schedule slots. Fixed at process start; inserting into a
/// full table evicts the oldest entry.
pub const SCHEDULE_SLOTS: usize = 5;

/// Fixed-capacity table of daily schedule entries.
#[derive(Debug, Default)]
pub struct ScheduleStore {
    slots: [Option<CronEntry>; SCHEDULE_SLOTS],
    /// Slot the next insert overwrites.
    next_slot: usize,
}

impl ScheduleStore {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, overwriting the slot under the write cursor.
    ///
    /// Never fails: a full table loses its oldest entry to make room.
    pub fn insert(&mut self, entry: CronEntry) {
        self.slots[self.next_slot] = Some(entry);
        self.next_slot = (self.next_slot + 1) % SCHEDULE_SLOTS;
    }

    /// Entries due at `now`, in slot-index order.
    ///
    /// Every matching, not-yet-fired-today entry is yielded; slots that
    /// share the same minute all fire independently.
    pub fn due_entries_mut(&mut self, now: WallTime) -> impl Iterator<Item = &mut CronEntry> {
        self.slots
            .iter_mut()
            .flatten()
            .filter(move |entry| entry.is_due(now))
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Returns `true` when no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-only copy of all slots, unset slots included.
    pub fn snapshot(&self) -> ScheduleSnapshot {
        ScheduleSnapshot {
            slots: std::array::from_fn(|i| self.slots[i].as_ref().map(EntrySnapshot::from)),
            next_slot: self.next_slot,
        }
    }
}

/// Read-only copy of the schedule table for display.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleSnapshot {
    /// All slots in table order, unset slots included.
    pub slots: [Option<EntrySnapshot>; SCHEDULE_SLOTS],
    /// Slot the next insert will overwrite.
    pub next_slot: usize,
}

/// Display view of one occupied slot.
#[derive(Debug, Clone, Serialize)]
pub struct EntrySnapshot {
    /// Pump the entry triggers.
    pub pump: Pump,
    /// Pump state recorded on the entry.
    pub desired_state: PumpState,
    /// Run duration in seconds.
    pub duration_secs: u64,
    /// Scheduled hour of day.
    pub hour: u8,
    /// Scheduled minute of hour.
    pub minute: u8,
    /// Most recent firing, if any.
    pub last_fired: Option<FiredAt>,
}

impl From<&CronEntry> for EntrySnapshot {
    fn from(entry: &CronEntry) -> Self {
        Self {
            pump: entry.pump(),
            desired_state: entry.desired_state(),
            duration_secs: entry.duration().as_secs(),
            hour: entry.hour(),
            minute: entry.minute(),
            last_fired: entry.last_fired(),
        }
    }
}
