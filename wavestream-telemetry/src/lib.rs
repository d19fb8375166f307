//! # wavestream telemetry
//!
//! Logging and metrics for the streamer.
//!
//! ### Components:
//! - `console`: operator output that bypasses the log filter
//! - `logging`: fmt subscriber setup and structured operator events
//! - `metrics`: prometheus counters for frames, failures and loop overruns
//! - `writer`: stderr writer that keeps lines aligned in raw terminal mode

pub mod console;
pub mod logging;
pub mod metrics;
pub mod writer;

pub use console::OperatorConsole;
pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
