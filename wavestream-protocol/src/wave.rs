//! ## wavestream-protocol::wave
//! Data channel frames. One frame carries one voltage/current sample pair,
//! each rendered with a single decimal.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use bytes::BytesMut;

use crate::error::FrameParseError;
use crate::FIELD_SEPARATOR;

/// A single waveform sample on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveFrame {
    pub voltage: f64,
    pub current: f64,
}

impl WaveFrame {
    pub const TAG: &'static str = "WAVE";

    pub fn new(voltage: f64, current: f64) -> Self {
        Self { voltage, current }
    }

    /// Writes the frame into `buf`, replacing its contents.
    ///
    /// The scheduler reuses one buffer for every frame it sends.
    pub fn encode_into(&self, buf: &mut BytesMut) {
        buf.clear();
        // Writing into BytesMut cannot fail.
        let _ = write!(buf, "{self}");
    }
}

impl fmt::Display for WaveFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = FIELD_SEPARATOR;
        write!(
            f,
            "{}{sep}{:.1}{sep}{:.1}",
            Self::TAG,
            self.voltage,
            self.current
        )
    }
}

impl FromStr for WaveFrame {
    type Err = FrameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim_end().split(FIELD_SEPARATOR).collect();
        let &[tag, voltage, current] = fields.as_slice() else {
            return Err(FrameParseError::FieldCount {
                expected: 3,
                found: fields.len(),
            });
        };
        if tag != Self::TAG {
            return Err(FrameParseError::UnknownVerb(tag.to_string()));
        }
        let parse = |field: &str| {
            field
                .parse::<f64>()
                .map_err(|_| FrameParseError::InvalidSample(field.to_string()))
        };
        Ok(WaveFrame {
            voltage: parse(voltage)?,
            current: parse(current)?,
        })
    }
}
