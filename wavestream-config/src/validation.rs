// wavestream-config/src/validation.rs
//! Custom validation functions for configuration.
//!
//! Shared validation logic used across the configuration sections.

use std::collections::HashSet;

use validator::ValidationError;

use crate::network::NetworkConfig;
use crate::nodes::NodeConfig;
use crate::scenarios::{ScenarioConfig, ScenarioSource};

/// Node ids are typed as single keystrokes, so they must be unique.
pub fn validate_node_ids(nodes: &[NodeConfig]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    if nodes.iter().all(|node| seen.insert(node.id)) {
        Ok(())
    } else {
        Err(ValidationError::new("duplicate_node_id"))
    }
}

/// Validate that a scenario name is a short lowercase identifier.
pub fn validate_scenario_name(name: &str) -> Result<(), ValidationError> {
    let re =
        regex::Regex::new("^[a-z0-9_]+$").map_err(|_| ValidationError::new("invalid_regex"))?;
    if re.is_match(name) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_scenario_name"))
    }
}

/// Validate that no scenario name is listed twice.
pub fn validate_unique_sources(sources: &[ScenarioSource]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    if sources.iter().all(|source| seen.insert(source.name.as_str())) {
        Ok(())
    } else {
        Err(ValidationError::new("duplicate_scenario_name"))
    }
}

/// The default scenario must be one of the configured sources.
pub fn validate_default_scenario(config: &ScenarioConfig) -> Result<(), ValidationError> {
    if config.sources.iter().any(|s| s.name == config.default) {
        Ok(())
    } else {
        Err(ValidationError::new("unknown_default_scenario"))
    }
}

/// The control and data channels must not share a port.
pub fn validate_distinct_ports(config: &NetworkConfig) -> Result<(), ValidationError> {
    if config.command_port != config.data_port {
        Ok(())
    } else {
        Err(ValidationError::new("ports_must_differ"))
    }
}

/// Validate the node mode literal sent during the reset handshake.
pub fn validate_node_mode(mode: &str) -> Result<(), ValidationError> {
    let re = regex::Regex::new("^MODE_(ADC|SD|UDP)$")
        .map_err(|_| ValidationError::new("invalid_regex"))?;
    if re.is_match(mode) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_node_mode"))
    }
}

/// Validate log level.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid = ["trace", "debug", "info", "warn", "error"]
        .contains(&level.to_lowercase().as_str());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_names() {
        assert!(validate_scenario_name("base").is_ok());
        assert!(validate_scenario_name("t1").is_ok());
        assert!(validate_scenario_name("Base").is_err());
        assert!(validate_scenario_name("").is_err());
        assert!(validate_scenario_name("over current").is_err());
    }

    #[test]
    fn node_modes() {
        assert!(validate_node_mode("MODE_UDP").is_ok());
        assert!(validate_node_mode("MODE_SD").is_ok());
        assert!(validate_node_mode("MODE_TCP").is_err());
        assert!(validate_node_mode("mode_udp").is_err());
    }

    #[test]
    fn log_levels() {
        assert!(validate_log_level("INFO").is_ok());
        assert!(validate_log_level("verbose").is_err());
    }
}
