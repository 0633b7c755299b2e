//! Kiosk configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for an unattended kiosk station.
///
/// ```json
/// {
///   "category": "photo-booth",
///   "restartDelayMs": 5000,
///   "pollIntervalMs": 2000,
///   "errorStepId": "oops"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskConfig {
  /// Category key used to look up the active definition.
  pub category: String,
  /// Pause after a run completes or fails before the next run starts.
  #[serde(default = "default_restart_delay_ms")]
  pub restart_delay_ms: u64,
  /// Retry interval while no definition could ever be loaded.
  #[serde(default = "default_poll_interval_ms")]
  pub poll_interval_ms: u64,
  /// Node rendered when a run ends in error, if the definition has it.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error_step_id: Option<String>,
  /// Stop after this many runs. Unset means run until cancelled.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_runs: Option<u64>,
}

impl KioskConfig {
  pub fn new(category: impl Into<String>) -> Self {
    Self {
      category: category.into(),
      restart_delay_ms: default_restart_delay_ms(),
      poll_interval_ms: default_poll_interval_ms(),
      error_step_id: None,
      max_runs: None,
    }
  }

  pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(json)
  }

  pub fn restart_delay(&self) -> Duration {
    Duration::from_millis(self.restart_delay_ms)
  }

  pub fn poll_interval(&self) -> Duration {
    Duration::from_millis(self.poll_interval_ms)
  }
}

fn default_restart_delay_ms() -> u64 {
  5_000
}

fn default_poll_interval_ms() -> u64 {
  2_000
}
