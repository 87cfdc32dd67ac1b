//! Mock clock and pump driver for unit testing without real hardware.
//!
//! Enabled with the `test-support` feature:
//!
//! ```toml
//! [dev-dependencies]
//! furrow = { path = "...", features = ["test-support"] }
//! ```

use std::sync::{Arc, Mutex};

use crate::clock::{WallClock, WallTime};
use crate::hardware::{Pump, PumpDriver, PumpState};

// ─── ManualClock ──────────────────────────────────────────────────────────────

/// A clock that reports whatever time the test last set.
///
/// Clones share the same underlying time, so a test can hold one copy
/// and hand another to the engine.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<WallTime>>,
}

impl ManualClock {
    /// Create a clock frozen at `now`.
    pub fn new(now: WallTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: WallTime) {
        *self.now.lock().unwrap() = now;
    }
}

impl WallClock for ManualClock {
    fn now(&self) -> WallTime {
        *self.now.lock().unwrap()
    }
}

// ─── RecordingDriver ──────────────────────────────────────────────────────────

/// A pump output transition observed by [`RecordingDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub pump: Pump,
    pub state: PumpState,
    /// Tokio clock reading at the moment of the write, so paused-time
    /// tests can assert on hold durations.
    pub at: tokio::time::Instant,
}

/// Records every pump state write during a test run.
#[derive(Debug, Clone, Default)]
pub struct RecordingDriver {
    records: Arc<Mutex<Vec<Transition>>>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// All transitions recorded so far, in write order.
    pub fn transitions(&self) -> Vec<Transition> {
        self.records.lock().unwrap().clone()
    }

    pub fn transition_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl PumpDriver for RecordingDriver {
    fn set(&mut self, pump: Pump, state: PumpState) {
        self.records.lock().unwrap().push(Transition {
            pump,
            state,
            at: tokio::time::Instant::now(),
        });
    }
}
