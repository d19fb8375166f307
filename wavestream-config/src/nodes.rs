//! Measurement node definitions.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// One addressed measurement node.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct NodeConfig {
    /// Node id, selected with the matching digit key.
    #[validate(range(min = 1, max = 9))]
    pub id: u8,

    /// Address of the node on the local network.
    pub address: IpAddr,
}

/// Three nodes on a private subnet; real deployments override the addresses.
pub fn default_nodes() -> Vec<NodeConfig> {
    (1..=3)
        .map(|id| NodeConfig {
            id,
            address: IpAddr::V4(Ipv4Addr::new(192, 168, 1, 100 + id)),
        })
        .collect()
}
