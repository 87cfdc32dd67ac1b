//! Pump identities, output states, and the driver seam.

use serde::{Deserialize, Serialize};
use tracing::info;

/// The two pumps the engine controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pump {
    /// Pump on output channel A.
    A,
    /// Pump on output channel B.
    B,
}

impl std::fmt::Display for Pump {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

/// Commanded state of a pump output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PumpState {
    /// Output driven at full duty.
    On,
    /// Output idle.
    Off,
}

impl std::fmt::Display for PumpState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => write!(f, "on"),
            Self::Off => write!(f, "off"),
        }
    }
}

/// Drives the two pump outputs.
///
/// Writes are immediate duty-cycle commands; implementations must not
/// block the actuation loop.
pub trait PumpDriver: Send + 'static {
    /// Command one pump output to the given state.
    fn set(&mut self, pump: Pump, state: PumpState);
}

/// Driver that only logs transitions.
///
/// Used by the daemon on hosts without pump hardware attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDriver;

impl PumpDriver for LogDriver {
    fn set(&mut self, pump: Pump, state: PumpState) {
        info!(pump = %pump, state = %state, "pump output");
    }
}
