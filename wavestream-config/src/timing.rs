//! Pacing of the streaming loop and the reset handshake.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Real-time scheduler pacing.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct TimingConfig {
    /// Loop iterations per second; one frame per node per iteration.
    #[validate(range(exclusive_min = 0.0, max = 100_000.0))]
    #[serde(default = "default_sample_rate")]
    pub sample_rate_hz: f64,

    /// Seconds between periodic status lines.
    #[validate(range(min = 1, max = 3600))]
    #[serde(default = "default_status_interval")]
    pub status_interval_secs: u64,
}

fn default_sample_rate() -> f64 {
    3600.0
}

fn default_status_interval() -> u64 {
    10
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: default_sample_rate(),
            status_interval_secs: default_status_interval(),
        }
    }
}

impl TimingConfig {
    /// Target time between two loop iterations.
    pub fn sample_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.sample_rate_hz)
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs)
    }
}

/// Reset handshake delays and the mode nodes are switched into.
///
/// Nodes drop commands that arrive back to back, so `command_delay_ms`
/// must stay above what the firmware needs to drain its socket.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct ResetConfig {
    /// Pause after every single control command.
    #[validate(range(max = 10_000))]
    #[serde(default = "default_command_delay")]
    pub command_delay_ms: u64,

    /// Pause between the `RESET_CYCLE` round and the mode round.
    #[validate(range(max = 60_000))]
    #[serde(default = "default_reset_settle")]
    pub reset_settle_ms: u64,

    /// Pause before streaming resumes.
    #[validate(range(max = 60_000))]
    #[serde(default = "default_final_settle")]
    pub final_settle_ms: u64,

    /// Mode literal sent with `SET_MODE`.
    #[validate(custom(function = validation::validate_node_mode))]
    #[serde(default = "default_mode")]
    pub mode: String,
}

fn default_command_delay() -> u64 {
    100
}

fn default_reset_settle() -> u64 {
    1000
}

fn default_final_settle() -> u64 {
    500
}

fn default_mode() -> String {
    "MODE_UDP".into()
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            command_delay_ms: default_command_delay(),
            reset_settle_ms: default_reset_settle(),
            final_settle_ms: default_final_settle(),
            mode: default_mode(),
        }
    }
}

impl ResetConfig {
    /// Same mode, no delays. Used where wall-clock pauses only slow things down.
    pub fn immediate() -> Self {
        Self {
            command_delay_ms: 0,
            reset_settle_ms: 0,
            final_settle_ms: 0,
            ..Self::default()
        }
    }

    pub fn command_delay(&self) -> Duration {
        Duration::from_millis(self.command_delay_ms)
    }

    pub fn reset_settle(&self) -> Duration {
        Duration::from_millis(self.reset_settle_ms)
    }

    pub fn final_settle(&self) -> Duration {
        Duration::from_millis(self.final_settle_ms)
    }
}
