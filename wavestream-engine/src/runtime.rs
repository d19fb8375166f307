/*!
# Runtime

Entry points shared by every frontend. The streaming loop and the reset
handshake block on `std::thread::sleep`, so both run on tokio's blocking pool
while the async side only listens for process signals.
*/

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use wavestream_config::StreamerConfig;
use wavestream_core::command::controls_help;
use wavestream_core::node::NodeRegistry;
use wavestream_core::scenario::ScenarioStore;
use wavestream_telemetry::metrics::MetricsRecorder;

use crate::error::StreamError;
use crate::input::{Headless, TerminalKeys};
use crate::reset::{ResetCoordinator, ResetReport};
use crate::scheduler::{RunSummary, Streamer};
use crate::transport::{DatagramChannel, MemoryChannel, Transport};

/// Datagrams a dry run keeps per channel.
const DRY_RUN_RETAINED: usize = 1024;

/// How `run_stream_mode` behaves around the loop.
#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// Run the reset handshake before streaming.
    pub reset: bool,
    /// Stream without reading keys. Only a signal stops the run.
    pub headless: bool,
    /// Record datagrams in memory instead of sending them.
    pub dry_run: bool,
    /// Overrides `scenarios.directory`.
    pub scenario_dir: Option<PathBuf>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            reset: true,
            headless: false,
            dry_run: false,
            scenario_dir: None,
        }
    }
}

/// Loads scenarios, resets the nodes and streams until quit or interrupt.
#[instrument(level = "info", name = "run_stream_mode", skip_all, fields(dry_run = options.dry_run))]
pub async fn run_stream_mode(
    mut config: StreamerConfig,
    options: StreamOptions,
) -> Result<RunSummary, StreamError> {
    if let Some(dir) = &options.scenario_dir {
        config.scenarios.directory = dir.clone();
    }
    let store = ScenarioStore::load(&config.scenarios)?;
    let metrics = MetricsRecorder::new()?;
    let shutdown = Arc::new(AtomicBool::new(false));

    let dump_metrics = config.telemetry.dump_metrics_on_exit;
    let result = if options.dry_run {
        info!("Dry run, datagrams stay in memory");
        let transport = Transport::new(
            MemoryChannel::bounded(DRY_RUN_RETAINED),
            MemoryChannel::bounded(DRY_RUN_RETAINED),
        );
        stream_blocking(config, store, transport, metrics.clone(), shutdown, options).await
    } else {
        let transport = Transport::bind(&config.network)?;
        stream_blocking(config, store, transport, metrics.clone(), shutdown, options).await
    };

    if dump_metrics {
        println!("{}", metrics.gather_metrics()?);
    }
    result
}

async fn stream_blocking<C>(
    config: StreamerConfig,
    store: ScenarioStore,
    transport: Transport<C>,
    metrics: MetricsRecorder,
    shutdown: Arc<AtomicBool>,
    options: StreamOptions,
) -> Result<RunSummary, StreamError>
where
    C: DatagramChannel + Send + 'static,
{
    // Spawned only once the transport exists, and aborted before any return.
    let listener = spawn_signal_listener(Arc::clone(&shutdown));
    let streamed = tokio::task::spawn_blocking(move || {
        let mut streamer = Streamer::from_config(&config, store, transport, metrics, shutdown)?;
        if options.reset {
            streamer.reset_nodes();
        } else {
            debug!("Reset handshake skipped");
        }

        println!("{}", controls_help(streamer.registry(), streamer.store()));

        if options.headless {
            streamer.run(Headless)
        } else if !std::io::stdin().is_terminal() {
            warn!("Standard input is not a terminal, streaming without key control");
            streamer.run(Headless)
        } else {
            let keys = TerminalKeys::acquire().map_err(StreamError::Input)?;
            streamer.run(keys)
        }
    })
    .await;
    listener.abort();
    streamed?
}

/// Runs only the reset handshake against the configured nodes.
#[instrument(level = "info", name = "run_reset_mode", skip_all)]
pub async fn run_reset_mode(config: StreamerConfig) -> Result<ResetReport, StreamError> {
    let registry = NodeRegistry::from_config(&config)?;
    let coordinator = ResetCoordinator::new(&config.reset)?;
    let transport = Transport::bind(&config.network)?;
    let metrics = MetricsRecorder::new()?;

    let report = tokio::task::spawn_blocking(move || {
        let report = coordinator.run(&transport, &registry, &metrics);
        transport.close();
        report
    })
    .await?;
    Ok(report)
}

/// Sets `shutdown` on SIGINT or SIGTERM. The handle can be aborted once the
/// loop has finished.
pub fn spawn_signal_listener(shutdown: Arc<AtomicBool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Interrupt signal received");
        shutdown.store(true, Ordering::Relaxed);
    })
}

async fn wait_for_signal() {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {}
        _ = terminate => {}
    }
}
