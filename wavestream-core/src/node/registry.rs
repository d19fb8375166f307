//! Static node registry.

use std::collections::BTreeSet;
use std::net::{IpAddr, SocketAddr};

use wavestream_config::StreamerConfig;

use super::NodeId;
use crate::error::RegistryError;

/// A registered node and the two addresses it listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeEntry {
    id: NodeId,
    address: IpAddr,
    command_addr: SocketAddr,
    data_addr: SocketAddr,
}

impl NodeEntry {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    /// Destination of control commands.
    pub fn command_addr(&self) -> SocketAddr {
        self.command_addr
    }

    /// Destination of waveform frames.
    pub fn data_addr(&self) -> SocketAddr {
        self.data_addr
    }
}

/// Fixed set of nodes, ordered by id. Never changes after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRegistry {
    nodes: Vec<NodeEntry>,
}

impl NodeRegistry {
    pub fn new(
        nodes: impl IntoIterator<Item = (NodeId, IpAddr)>,
        command_port: u16,
        data_port: u16,
    ) -> Result<Self, RegistryError> {
        let mut seen = BTreeSet::new();
        let mut entries = Vec::new();
        for (id, address) in nodes {
            if !(1..=9).contains(&id) {
                return Err(RegistryError::InvalidId(id));
            }
            if !seen.insert(id) {
                return Err(RegistryError::DuplicateId(id));
            }
            entries.push(NodeEntry {
                id,
                address,
                command_addr: SocketAddr::new(address, command_port),
                data_addr: SocketAddr::new(address, data_port),
            });
        }
        if entries.is_empty() {
            return Err(RegistryError::Empty);
        }
        entries.sort_by_key(|entry| entry.id);
        Ok(Self { nodes: entries })
    }

    pub fn from_config(config: &StreamerConfig) -> Result<Self, RegistryError> {
        Self::new(
            config.nodes.iter().map(|node| (node.id, node.address)),
            config.network.command_port,
            config.network.data_port,
        )
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeEntry> {
        self.nodes.iter().find(|entry| entry.id == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Node ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|entry| entry.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeEntry> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn entries_sorted_with_both_addresses() {
        let registry = NodeRegistry::new([(3, ip(3)), (1, ip(1))], 6000, 6001).unwrap();
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![1, 3]);
        let node = registry.get(3).unwrap();
        assert_eq!(node.command_addr(), "10.0.0.3:6000".parse().unwrap());
        assert_eq!(node.data_addr(), "10.0.0.3:6001".parse().unwrap());
        assert!(!registry.contains(2));
    }

    #[test]
    fn rejects_bad_node_sets() {
        assert_eq!(
            NodeRegistry::new([], 6000, 6001),
            Err(RegistryError::Empty)
        );
        assert_eq!(
            NodeRegistry::new([(1, ip(1)), (1, ip(2))], 6000, 6001),
            Err(RegistryError::DuplicateId(1))
        );
        assert_eq!(
            NodeRegistry::new([(0, ip(1))], 6000, 6001),
            Err(RegistryError::InvalidId(0))
        );
    }

    #[test]
    fn built_from_default_config() {
        let config = StreamerConfig::default();
        let registry = NodeRegistry::from_config(&config).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(1).unwrap().data_addr().port(), 6001);
    }
}
