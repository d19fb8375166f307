//! Point-in-time snapshots of every node for the operator.

use std::fmt;

use crate::command::Selection;
use crate::node::{NodeId, NodeState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStatus {
    pub id: NodeId,
    pub scenario: String,
    pub index: usize,
    pub cycle_count: u64,
}

/// Selection plus every node's scenario and progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub selection: Selection,
    pub nodes: Vec<NodeStatus>,
}

impl StatusReport {
    pub fn capture(selection: Selection, nodes: &[NodeState]) -> Self {
        Self {
            selection,
            nodes: nodes
                .iter()
                .map(|node| NodeStatus {
                    id: node.id(),
                    scenario: node.scenario_name().to_string(),
                    index: node.index(),
                    cycle_count: node.cycle_count(),
                })
                .collect(),
        }
    }

    /// One-line summary, e.g. `N1:base@3 | N2:oc@0`.
    pub fn summary_line(&self) -> String {
        self.nodes
            .iter()
            .map(|node| format!("N{}:{}@{}", node.id, node.scenario, node.cycle_count))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "===== STATUS =====")?;
        writeln!(f, "Selected: {}", self.selection)?;
        for node in &self.nodes {
            writeln!(
                f,
                "  Node {}: {:6} cycle {}",
                node.id, node.scenario, node.cycle_count
            )?;
        }
        write!(f, "==================")
    }
}
