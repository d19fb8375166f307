//! ## wavestream-core::node
//! Node registry and per-node playback state.

mod playback;
mod registry;

pub use playback::{Advance, Cursor, NodeState};
pub use registry::{NodeEntry, NodeRegistry};

/// Node identifier; one decimal digit so a single key selects it.
pub type NodeId = u8;
