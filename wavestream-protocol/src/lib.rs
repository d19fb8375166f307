//! # wavestream protocol
//!
//! Text wire formats spoken with the measurement nodes. Every message is a
//! single UTF-8 datagram with `|`-separated fields.
//!
//! - [`control`]: `<VERB>|<ARG>|<node_id>` commands on the control channel
//! - [`wave`]: `WAVE|<voltage>|<current>` frames on the data channel

pub mod control;
pub mod error;
pub mod wave;

pub use control::{ControlCommand, NodeMode, SendState};
pub use error::FrameParseError;
pub use wave::WaveFrame;

/// Field separator shared by both formats.
pub const FIELD_SEPARATOR: char = '|';
