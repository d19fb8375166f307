//! Transport configuration.
//!
//! Ports of the two datagram channels and the local address the sockets bind to.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Datagram channel configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[validate(schema(function = validation::validate_distinct_ports))]
pub struct NetworkConfig {
    /// Destination port for control commands on every node.
    #[validate(range(min = 1))]
    #[serde(default = "default_command_port")]
    pub command_port: u16,

    /// Destination port for waveform frames on every node.
    #[validate(range(min = 1))]
    #[serde(default = "default_data_port")]
    pub data_port: u16,

    /// Local address both sockets bind to (ephemeral ports).
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,
}

fn default_command_port() -> u16 {
    6000
}

fn default_data_port() -> u16 {
    6001
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            command_port: default_command_port(),
            data_port: default_data_port(),
            bind_address: default_bind_address(),
        }
    }
}
