//! # wavestream-core
//!
//! Domain state of the waveform streamer, free of sockets and terminals.
//!
//! ### Key Submodules:
//! - `scenario`: recorded sample sequences and the read-only store holding them
//! - `node`: the static node registry and each node's playback cursor
//! - `command`: operator selection and the keystroke interpreter
//! - `status`: snapshots of every node for status lines and reports
//!
//! Everything here is single-threaded and owned by the scheduler; shared
//! scenario data is immutable and reference counted.

pub mod command;
pub mod error;
pub mod node;
pub mod scenario;
pub mod status;

pub mod prelude {
    pub use crate::command::*;
    pub use crate::error::*;
    pub use crate::node::*;
    pub use crate::scenario::*;
    pub use crate::status::*;
}

pub use error::{RegistryError, ScenarioError};
