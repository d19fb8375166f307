//! ## wavestream-protocol::control
//! Control channel commands.
//!
//! Every command addresses exactly one node; the node id is always the last
//! field. Commands are fire-and-forget, nodes never acknowledge them.

use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::FrameParseError;
use crate::FIELD_SEPARATOR;

/// Input source a node samples from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeMode {
    /// On-board ADC pins.
    Adc,
    /// Replay from the node's SD card.
    Sd,
    /// Samples streamed over the data channel.
    Udp,
}

impl NodeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeMode::Adc => "MODE_ADC",
            NodeMode::Sd => "MODE_SD",
            NodeMode::Udp => "MODE_UDP",
        }
    }
}

impl fmt::Display for NodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeMode {
    type Err = FrameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MODE_ADC" => Ok(NodeMode::Adc),
            "MODE_SD" => Ok(NodeMode::Sd),
            "MODE_UDP" => Ok(NodeMode::Udp),
            other => Err(FrameParseError::InvalidArgument {
                verb: ControlCommand::SET_MODE,
                arg: other.to_string(),
            }),
        }
    }
}

/// Whether a node forwards its measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SendState {
    On,
    Off,
}

impl SendState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendState::On => "ON",
            SendState::Off => "OFF",
        }
    }
}

impl fmt::Display for SendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command for a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlCommand {
    /// Restart the node's cycle counter. The argument is always `0`.
    ResetCycle { node: u8 },
    /// Select the node's input source.
    SetMode { mode: NodeMode, node: u8 },
    /// Turn the node's outbound reporting on or off.
    SetSend { state: SendState, node: u8 },
}

impl ControlCommand {
    pub const RESET_CYCLE: &'static str = "RESET_CYCLE";
    pub const SET_MODE: &'static str = "SET_MODE";
    pub const SET_SEND: &'static str = "SET_SEND";

    /// Node the command is addressed to.
    pub fn node(&self) -> u8 {
        match *self {
            ControlCommand::ResetCycle { node }
            | ControlCommand::SetMode { node, .. }
            | ControlCommand::SetSend { node, .. } => node,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            ControlCommand::ResetCycle { .. } => Self::RESET_CYCLE,
            ControlCommand::SetMode { .. } => Self::SET_MODE,
            ControlCommand::SetSend { .. } => Self::SET_SEND,
        }
    }

    /// Encodes the command into a datagram payload.
    pub fn encode(&self) -> Bytes {
        let text = self.to_string();
        let mut buf = BytesMut::with_capacity(text.len());
        buf.put_slice(text.as_bytes());
        buf.freeze()
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = FIELD_SEPARATOR;
        match self {
            ControlCommand::ResetCycle { node } => write!(f, "{}{sep}0{sep}{node}", self.verb()),
            ControlCommand::SetMode { mode, node } => {
                write!(f, "{}{sep}{mode}{sep}{node}", self.verb())
            }
            ControlCommand::SetSend { state, node } => {
                write!(f, "{}{sep}{state}{sep}{node}", self.verb())
            }
        }
    }
}

impl FromStr for ControlCommand {
    type Err = FrameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim_end().split(FIELD_SEPARATOR).collect();
        let &[verb, arg, node] = fields.as_slice() else {
            return Err(FrameParseError::FieldCount {
                expected: 3,
                found: fields.len(),
            });
        };
        let node: u8 = node
            .parse()
            .map_err(|_| FrameParseError::InvalidNodeId(node.to_string()))?;

        match verb {
            Self::RESET_CYCLE if arg == "0" => Ok(ControlCommand::ResetCycle { node }),
            Self::RESET_CYCLE => Err(FrameParseError::InvalidArgument {
                verb: Self::RESET_CYCLE,
                arg: arg.to_string(),
            }),
            Self::SET_MODE => Ok(ControlCommand::SetMode {
                mode: arg.parse()?,
                node,
            }),
            Self::SET_SEND => {
                let state = match arg {
                    "ON" => SendState::On,
                    "OFF" => SendState::Off,
                    other => {
                        return Err(FrameParseError::InvalidArgument {
                            verb: Self::SET_SEND,
                            arg: other.to_string(),
                        })
                    }
                };
                Ok(ControlCommand::SetSend { state, node })
            }
            other => Err(FrameParseError::UnknownVerb(other.to_string())),
        }
    }
}
