//! # wavestream-engine
//!
//! Drives the measurement nodes: datagram transport, the reset handshake,
//! operator key input and the fixed-period streaming loop.
//!
//! The loop itself is synchronous and single-threaded. [`runtime`] runs it on
//! a blocking thread and turns process signals into a shutdown flag.

pub mod error;
pub mod input;
pub mod reset;
pub mod runtime;
pub mod scheduler;
pub mod transport;

pub use error::StreamError;
pub use input::{Headless, KeySource, RawModeGuard, ScriptedKeys, TerminalKeys};
pub use reset::{ResetCoordinator, ResetReport};
pub use runtime::{run_reset_mode, run_stream_mode, spawn_signal_listener, StreamOptions};
pub use scheduler::{ExitReason, RunSummary, StreamSettings, Streamer};
pub use transport::{DatagramChannel, MemoryChannel, SentDatagram, Transport};
