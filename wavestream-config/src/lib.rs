//! # wavestream configuration
//!
//! Layered configuration for the waveform streamer: node addresses, scenario
//! files, channel ports, loop pacing and reset handshake delays.
//!
//! ## Features
//! - **Single source of truth**: one `StreamerConfig` shared by every crate
//! - **Validation**: structural and cross-field checks before anything opens a socket
//! - **Environment awareness**: per-environment override files and `WAVESTREAM_*` variables

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;
mod network;
mod nodes;
mod scenarios;
mod telemetry;
mod timing;
mod validation;

pub use error::ConfigError;
pub use network::NetworkConfig;
pub use nodes::NodeConfig;
pub use scenarios::{ScenarioConfig, ScenarioSource};
pub use telemetry::TelemetryConfig;
pub use timing::{ResetConfig, TimingConfig};

/// Base configuration file, relative to the working directory.
pub const BASE_CONFIG_FILE: &str = "config/wavestream.yaml";

/// Prefix of environment variable overrides, e.g. `WAVESTREAM_NETWORK__DATA_PORT`.
pub const ENV_PREFIX: &str = "WAVESTREAM_";

/// Top-level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct StreamerConfig {
    /// Channel ports and bind address.
    #[validate(nested)]
    #[serde(default)]
    pub network: NetworkConfig,

    /// Registered measurement nodes.
    #[validate(length(min = 1, max = 9))]
    #[validate(nested)]
    #[validate(custom(function = validation::validate_node_ids))]
    #[serde(default = "nodes::default_nodes")]
    pub nodes: Vec<NodeConfig>,

    /// Scenario files loaded at startup.
    #[validate(nested)]
    #[serde(default)]
    pub scenarios: ScenarioConfig,

    /// Loop pacing.
    #[validate(nested)]
    #[serde(default)]
    pub timing: TimingConfig,

    /// Reset handshake.
    #[validate(nested)]
    #[serde(default)]
    pub reset: ResetConfig,

    /// Logging and metrics.
    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            nodes: nodes::default_nodes(),
            scenarios: ScenarioConfig::default(),
            timing: TimingConfig::default(),
            reset: ResetConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl StreamerConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/wavestream.yaml`, if present
    /// 3. `config/<WAVESTREAM_ENV>.yaml`, if present (`WAVESTREAM_ENV` defaults to `lab`)
    /// 4. `WAVESTREAM_*` environment variables, nested keys split on `__`
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(StreamerConfig::default()));

        if Path::new(BASE_CONFIG_FILE).exists() {
            figment = figment.merge(Yaml::file(BASE_CONFIG_FILE));
        }

        let env = std::env::var("WAVESTREAM_ENV").unwrap_or_else(|_| "lab".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::finish(figment)
    }

    /// Load configuration from a specific file layered over the defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        let figment =
            Figment::from(Serialized::defaults(StreamerConfig::default())).merge(Yaml::file(path));
        Self::finish(figment)
    }

    /// Explicit path when given, the default hierarchy otherwise.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    fn finish(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn full_config_validation() {
        let config = StreamerConfig::default();
        config.validate().expect("Default config should validate");
    }

    #[test]
    fn defaults_without_files() {
        Jail::expect_with(|_jail| {
            let config = StreamerConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.network.command_port, 6000);
            assert_eq!(config.network.data_port, 6001);
            assert_eq!(config.nodes.len(), 3);
            assert_eq!(config.scenarios.sources.len(), 5);
            assert_eq!(config.scenarios.default, "base");
            Ok(())
        });
    }

    #[test]
    fn environment_override() {
        Jail::expect_with(|jail| {
            jail.set_env("WAVESTREAM_NETWORK__DATA_PORT", "7001");
            jail.set_env("WAVESTREAM_TIMING__SAMPLE_RATE_HZ", "1200");
            let config = StreamerConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.network.data_port, 7001);
            assert_eq!(config.timing.sample_rate_hz, 1200.0);
            Ok(())
        });
    }

    #[test]
    fn environment_file_overrides_base_file() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                "config/wavestream.yaml",
                r#"
nodes:
  - id: 1
    address: 10.0.0.11
  - id: 2
    address: 10.0.0.12
reset:
  command_delay_ms: 50
"#,
            )?;
            jail.create_file("config/bench.yaml", "reset:\n  command_delay_ms: 20\n")?;
            jail.set_env("WAVESTREAM_ENV", "bench");

            let config = StreamerConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.nodes.len(), 2);
            assert_eq!(config.nodes[1].address.to_string(), "10.0.0.12");
            assert_eq!(config.reset.command_delay_ms, 20);
            assert_eq!(config.reset.final_settle_ms, 500);
            Ok(())
        });
    }

    #[test]
    fn duplicate_node_ids_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "streamer.yaml",
                r#"
nodes:
  - id: 2
    address: 10.0.0.2
  - id: 2
    address: 10.0.0.3
"#,
            )?;
            let result = StreamerConfig::load_from_path("streamer.yaml");
            assert!(matches!(result, Err(ConfigError::Validation(_))));
            Ok(())
        });
    }

    #[test]
    fn unknown_default_scenario_rejected() {
        let mut config = StreamerConfig::default();
        config.scenarios.default = "missing".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn shared_port_rejected() {
        let mut config = StreamerConfig::default();
        config.network.data_port = config.network.command_port;
        assert!(config.validate().is_err());
    }

    #[test]
    fn node_id_out_of_digit_range_rejected() {
        let mut config = StreamerConfig::default();
        config.nodes[0].id = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_reported() {
        let result = StreamerConfig::load_from_path("does/not/exist.yaml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
