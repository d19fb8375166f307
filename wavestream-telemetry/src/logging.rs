//! ## wavestream-telemetry::logging
//! Structured logging with tracing and OpenTelemetry key/value metadata.

use opentelemetry::KeyValue;
use tracing::info_span;
use tracing_subscriber::{fmt, EnvFilter};

use crate::writer::RawTerminalWriter;

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. `RUST_LOG` wins over `default_level`.
    /// Fails when a global subscriber is already set.
    pub fn init(default_level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(default_level)),
            )
            .with_writer(RawTerminalWriter)
            .with_target(false)
            .try_init()
    }

    /// Logs an operator-visible event with its metadata.
    pub fn log_event(event_type: &str, metadata: &[KeyValue]) {
        let span = info_span!(
            "operator_event",
            event_type = event_type,
            otel.kind = "INTERNAL"
        );
        let _entered = span.enter();

        tracing::info!(metadata = %render_metadata(metadata), "{event_type}");
    }
}

fn render_metadata(metadata: &[KeyValue]) -> String {
    metadata
        .iter()
        .map(|kv| format!("{}={}", kv.key.as_str(), kv.value))
        .collect::<Vec<_>>()
        .join(" ")
}
