//! Messages exchanged between the engine tasks.

use crate::hardware::{Pump, PumpState};
use crate::schedule::ScheduleSnapshot;
use std::time::Duration;
use tokio::sync::oneshot;

/// One atomic actuation cycle.
///
/// The runner sets both outputs, holds, then forces both off. Requests
/// are consumed exactly once and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRequest {
    /// Commanded state for pump A.
    pub pump_a: PumpState,
    /// Commanded state for pump B.
    pub pump_b: PumpState,
    /// How long to hold the commanded states before forcing both off.
    pub hold: Duration,
}

impl RunRequest {
    /// Cycle that runs one pump with the other held off.
    pub fn solo(pump: Pump, hold: Duration) -> Self {
        let (pump_a, pump_b) = match pump {
            Pump::A => (PumpState::On, PumpState::Off),
            Pump::B => (PumpState::Off, PumpState::On),
        };
        Self { pump_a, pump_b, hold }
    }
}

/// Schedule snapshot request, answered by the evaluator between ticks.
pub(crate) struct SnapshotQuery {
    pub(crate) respond_to: oneshot::Sender<ScheduleSnapshot>,
}
