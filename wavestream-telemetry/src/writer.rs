//! ## wavestream-telemetry::writer
//! Raw terminal mode turns off output post-processing, so a bare `\n` moves
//! down a line without returning to column 0. Log lines go through
//! [`CrlfWriter`], which emits `\r\n` instead.

use std::io::{self, Write};

use tracing_subscriber::fmt::MakeWriter;

/// `MakeWriter` for stderr with `\r\n` line endings.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawTerminalWriter;

impl<'a> MakeWriter<'a> for RawTerminalWriter {
    type Writer = CrlfWriter<io::StderrLock<'static>>;

    fn make_writer(&'a self) -> Self::Writer {
        CrlfWriter::new(io::stderr().lock())
    }
}

/// Rewrites lone `\n` as `\r\n`.
#[derive(Debug)]
pub struct CrlfWriter<W> {
    inner: W,
    last: Option<u8>,
}

impl<W: Write> CrlfWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, last: None }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CrlfWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut start = 0;
        for (i, &byte) in buf.iter().enumerate() {
            if byte == b'\n' {
                let previous = if i == 0 { self.last } else { Some(buf[i - 1]) };
                if previous != Some(b'\r') {
                    self.inner.write_all(&buf[start..i])?;
                    self.inner.write_all(b"\r")?;
                    start = i;
                }
            }
        }
        self.inner.write_all(&buf[start..])?;
        if let Some(&byte) = buf.last() {
            self.last = Some(byte);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
