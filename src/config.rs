//! Configuration types for the irrigation engine.

use crate::error::{FurrowError, Result};
use crate::hardware::{Pump, PumpState};
use crate::schedule::CronEntry;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration for the furrow daemon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FurrowConfig {
    /// Schedule evaluation timing.
    pub scheduler: SchedulerConfig,
    /// Actuation runner timing.
    pub runner: RunnerConfig,
    /// Engine queue capacities.
    pub channels: ChannelConfig,
    /// Schedule entries applied at startup.
    pub seeds: Vec<ScheduleSeed>,
}

/// Schedule evaluation timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between schedule evaluation passes.
    pub tick_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 10,
        }
    }
}

/// Actuation runner timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Seconds the runner idles between queue receive attempts.
    pub poll_interval_secs: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 2,
        }
    }
}

/// Engine queue capacities.
///
/// Sends to a full queue drop the message rather than block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Run-request queue capacity.
    pub run_requests: usize,
    /// Schedule-update queue capacity.
    pub schedule_updates: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            run_requests: 8,
            schedule_updates: 8,
        }
    }
}

/// A schedule entry as written in the config file.
///
/// Seeds pass through [`CronEntry::new`] when applied, so malformed
/// records are rejected instead of reaching the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSeed {
    /// Pump the entry triggers.
    pub pump: Pump,
    /// Pump state recorded on the entry.
    pub state: PumpState,
    /// Run duration in seconds.
    pub duration_secs: u64,
    /// Hour of day (0-23).
    pub hour: u8,
    /// Minute of hour (0-59).
    pub minute: u8,
}

impl ScheduleSeed {
    /// Build the validated schedule entry.
    ///
    /// # Errors
    ///
    /// Returns an error when the duration is zero or the time of day is
    /// out of range.
    pub fn to_entry(&self) -> Result<CronEntry> {
        CronEntry::new(
            self.pump,
            self.state,
            Duration::from_secs(self.duration_secs),
            self.hour,
            self.minute,
        )
    }
}

impl FurrowConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| FurrowError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| FurrowError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/furrow/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("furrow").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("furrow")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/furrow-config/config.toml")
        }
    }
}
