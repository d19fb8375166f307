//! ## wavestream-telemetry::console
//! Operator output that must reach the terminal whatever the log filter is:
//! status reports and the periodic status line. Lines end in `\r\n` so they
//! stay aligned in raw mode.

use std::fmt;
use std::io::{self, Write};

use tracing::warn;

use crate::writer::CrlfWriter;

pub struct OperatorConsole {
    out: CrlfWriter<Box<dyn Write + Send>>,
}

impl OperatorConsole {
    /// Writes to the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn new<W: Write + Send + 'static>(out: W) -> Self {
        Self {
            out: CrlfWriter::new(Box::new(out)),
        }
    }

    /// Prints `text` followed by a line break and flushes.
    pub fn print(&mut self, text: &str) {
        let written = writeln!(self.out, "{text}").and_then(|()| self.out.flush());
        if let Err(err) = written {
            warn!(error = %err, "Could not write to the operator terminal");
        }
    }
}

impl Default for OperatorConsole {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for OperatorConsole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorConsole").finish_non_exhaustive()
    }
}
