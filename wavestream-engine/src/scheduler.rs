//! ## wavestream-engine::scheduler
//! **Fixed-period streaming loop**
//!
//! One iteration:
//! 1. check the shutdown flag
//! 2. poll at most one key and act on it
//! 3. send every node its current sample and advance its cursor
//! 4. emit the periodic status line when due
//! 5. sleep for whatever is left of the period
//!
//! Input is always handled before transmission, so a switch takes effect on
//! the frame sent in the same iteration.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use opentelemetry::KeyValue;
use tracing::{debug, info, instrument, warn};
use wavestream_config::{ResetConfig, StreamerConfig};
use wavestream_core::command::{
    rewind_all, scenario_label, Action, CommandInterpreter, KeyInput, Selection,
};
use wavestream_core::node::{NodeId, NodeRegistry, NodeState};
use wavestream_core::scenario::ScenarioStore;
use wavestream_core::status::StatusReport;
use wavestream_protocol::WaveFrame;
use wavestream_telemetry::console::OperatorConsole;
use wavestream_telemetry::logging::EventLogger;
use wavestream_telemetry::metrics::MetricsRecorder;

use crate::error::StreamError;
use crate::input::KeySource;
use crate::reset::{ResetCoordinator, ResetReport};
use crate::transport::{DatagramChannel, Transport};

/// Loop pacing and startup parameters.
#[derive(Debug, Clone)]
pub struct StreamSettings {
    pub period: Duration,
    pub status_interval: Duration,
    pub reset: ResetConfig,
    pub default_scenario: String,
}

impl StreamSettings {
    pub fn from_config(config: &StreamerConfig) -> Self {
        Self {
            period: config.timing.sample_period(),
            status_interval: config.timing.status_interval(),
            reset: config.reset.clone(),
            default_scenario: config.scenarios.default.clone(),
        }
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self::from_config(&StreamerConfig::default())
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// `q` pressed.
    Quit,
    /// Ctrl+C key or an external signal.
    Interrupted,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::Quit => f.write_str("quit"),
            ExitReason::Interrupted => f.write_str("interrupted"),
        }
    }
}

/// What a finished run reports.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub reason: ExitReason,
    pub iterations: u64,
    pub elapsed: Duration,
    pub frames_sent: u64,
    pub send_failures: u64,
    pub overruns: u64,
    pub final_status: StatusReport,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Stopped ({}) after {} iterations in {:.1}s: {} frames sent, {} send failures, {} overruns",
            self.reason,
            self.iterations,
            self.elapsed.as_secs_f64(),
            self.frames_sent,
            self.send_failures,
            self.overruns
        )
    }
}

/// Owns every piece of mutable streaming state.
pub struct Streamer<C: DatagramChannel> {
    registry: NodeRegistry,
    store: ScenarioStore,
    nodes: Vec<NodeState>,
    interpreter: CommandInterpreter,
    transport: Transport<C>,
    reset: ResetCoordinator,
    metrics: MetricsRecorder,
    shutdown: Arc<AtomicBool>,
    settings: StreamSettings,
    frame: BytesMut,
    started: Instant,
    last_status: Instant,
    iterations: u64,
    frames_sent: u64,
    send_failures: u64,
    overruns: u64,
    unreachable: BTreeSet<NodeId>,
    console: OperatorConsole,
}

impl<C: DatagramChannel> Streamer<C> {
    /// Every node starts on the default scenario at `(0, 0)`.
    pub fn new(
        registry: NodeRegistry,
        store: ScenarioStore,
        transport: Transport<C>,
        settings: StreamSettings,
        metrics: MetricsRecorder,
        shutdown: Arc<AtomicBool>,
    ) -> Result<Self, StreamError> {
        let initial = store.initial(&settings.default_scenario)?;
        let nodes = registry
            .ids()
            .map(|id| NodeState::new(id, Arc::clone(&initial)))
            .collect();
        let reset = ResetCoordinator::new(&settings.reset)?;
        let now = Instant::now();

        Ok(Self {
            registry,
            store,
            nodes,
            interpreter: CommandInterpreter::new(),
            transport,
            reset,
            metrics,
            shutdown,
            settings,
            frame: BytesMut::with_capacity(32),
            started: now,
            last_status: now,
            iterations: 0,
            frames_sent: 0,
            send_failures: 0,
            overruns: 0,
            unreachable: BTreeSet::new(),
            console: OperatorConsole::stdout(),
        })
    }

    pub fn from_config(
        config: &StreamerConfig,
        store: ScenarioStore,
        transport: Transport<C>,
        metrics: MetricsRecorder,
        shutdown: Arc<AtomicBool>,
    ) -> Result<Self, StreamError> {
        Self::new(
            NodeRegistry::from_config(config)?,
            store,
            transport,
            StreamSettings::from_config(config),
            metrics,
            shutdown,
        )
    }

    /// Sends status output somewhere other than stdout.
    pub fn with_console(mut self, console: OperatorConsole) -> Self {
        self.console = console;
        self
    }

    pub fn nodes(&self) -> &[NodeState] {
        &self.nodes
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn store(&self) -> &ScenarioStore {
        &self.store
    }

    pub fn selection(&self) -> Selection {
        self.interpreter.selection()
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn transport(&self) -> &Transport<C> {
        &self.transport
    }

    pub fn status(&self) -> StatusReport {
        StatusReport::capture(self.selection(), &self.nodes)
    }

    /// Runs the reset handshake, rewinds every node and restarts the clock.
    pub fn reset_nodes(&mut self) -> ResetReport {
        let report = self
            .reset
            .run(&self.transport, &self.registry, &self.metrics);
        rewind_all(&mut self.nodes);
        self.restart_clock();
        report
    }

    fn restart_clock(&mut self) {
        let now = Instant::now();
        self.started = now;
        self.last_status = now;
    }

    /// One loop iteration without the trailing sleep.
    pub fn tick<K: KeySource + ?Sized>(
        &mut self,
        keys: &mut K,
    ) -> Result<Option<ExitReason>, StreamError> {
        if self.shutdown.load(Ordering::Relaxed) {
            info!("Shutdown requested");
            return Ok(Some(ExitReason::Interrupted));
        }

        if let Some(key) = keys.poll_key().map_err(StreamError::Input)? {
            if let Some(reason) = self.handle_key(key) {
                return Ok(Some(reason));
            }
        }

        self.stream_once();
        self.iterations += 1;

        if self.last_status.elapsed() >= self.settings.status_interval {
            let line = self.status().summary_line();
            self.console.print(&line);
            debug!(status = %line, "Periodic status");
            self.last_status = Instant::now();
        }
        Ok(None)
    }

    fn handle_key(&mut self, key: KeyInput) -> Option<ExitReason> {
        let action =
            self.interpreter
                .dispatch(key, &mut self.nodes, &self.registry, &self.store);

        match action {
            Action::None => {}
            Action::Select(Selection::All) => {
                info!("Selected ALL nodes");
                EventLogger::log_event("selection", &[KeyValue::new("selection", "ALL")]);
            }
            Action::Select(Selection::Node(id)) => {
                let scenario = self
                    .nodes
                    .iter()
                    .find(|node| node.id() == id)
                    .map(|node| node.scenario_name().to_string())
                    .unwrap_or_default();
                info!("Selected Node {id} (currently {scenario})");
                EventLogger::log_event(
                    "selection",
                    &[
                        KeyValue::new("selection", format!("Node {id}")),
                        KeyValue::new("scenario", scenario),
                    ],
                );
            }
            Action::Switch {
                selection,
                scenario,
            } => {
                let label = scenario_label(scenario.name());
                info!("{selection} -> {label}");
                EventLogger::log_event(
                    "scenario_switch",
                    &[
                        KeyValue::new("selection", selection.to_string()),
                        KeyValue::new("scenario", scenario.name().to_string()),
                    ],
                );
            }
            Action::Reset => {
                let report = self.reset_nodes();
                EventLogger::log_event(
                    "operator_reset",
                    &[
                        KeyValue::new("sent", report.sent as i64),
                        KeyValue::new("failed", report.failed as i64),
                    ],
                );
            }
            Action::Report => {
                let report = self.status();
                self.console.print(&report.to_string());
                debug!(status = %report.summary_line(), "Status report");
            }
            Action::Quit => {
                EventLogger::log_event("quit", &[KeyValue::new("reason", "operator")]);
                return Some(ExitReason::Quit);
            }
            Action::Interrupt => {
                EventLogger::log_event("quit", &[KeyValue::new("reason", "interrupt")]);
                return Some(ExitReason::Interrupted);
            }
        }
        None
    }

    /// Sends one frame to every node and advances its cursor. A node whose
    /// send fails still advances; the others are unaffected.
    fn stream_once(&mut self) {
        let cycle_length = self.store.cycle_length();
        for (node, entry) in self.nodes.iter_mut().zip(self.registry.iter()) {
            let sample = node.current_sample();
            WaveFrame::new(sample.voltage, sample.current).encode_into(&mut self.frame);

            match self.transport.send_frame(entry, &self.frame) {
                Ok(()) => {
                    self.frames_sent += 1;
                    self.metrics.inc_frames_sent();
                    if self.unreachable.remove(&entry.id()) {
                        info!(node = entry.id(), "Node reachable again");
                    }
                }
                Err(err) => {
                    self.send_failures += 1;
                    self.metrics.inc_send_failures();
                    if self.unreachable.insert(entry.id()) {
                        warn!(node = entry.id(), addr = %entry.data_addr(), error = %err, "Frame not sent");
                    }
                }
            }

            node.advance(cycle_length);
        }
    }

    /// Runs until quit, interrupt or shutdown. Consumes the streamer so both
    /// channels and the key source are released on every exit path.
    #[instrument(level = "info", name = "stream", skip_all)]
    pub fn run<K: KeySource>(mut self, mut keys: K) -> Result<RunSummary, StreamError> {
        info!(
            period_us = self.settings.period.as_micros() as u64,
            scenarios = self.store.len(),
            "Streaming started"
        );
        self.restart_clock();
        let outcome = self.pace(&mut keys);
        drop(keys);

        let summary = outcome.map(|reason| self.summary(reason));
        self.finish();
        summary
    }

    fn pace<K: KeySource>(&mut self, keys: &mut K) -> Result<ExitReason, StreamError> {
        let period = self.settings.period;
        loop {
            let iteration_start = Instant::now();
            if let Some(reason) = self.tick(keys)? {
                return Ok(reason);
            }

            let work = iteration_start.elapsed();
            self.metrics.observe_iteration_us(work.as_secs_f64() * 1e6);
            match period.checked_sub(work) {
                Some(remaining) if !remaining.is_zero() => thread::sleep(remaining),
                Some(_) => {}
                None => {
                    self.overruns += 1;
                    self.metrics.inc_overruns();
                }
            }
        }
    }

    fn summary(&self, reason: ExitReason) -> RunSummary {
        RunSummary {
            reason,
            iterations: self.iterations,
            elapsed: self.started.elapsed(),
            frames_sent: self.frames_sent,
            send_failures: self.send_failures,
            overruns: self.overruns,
            final_status: self.status(),
        }
    }

    fn finish(self) {
        match self.metrics.gather_metrics() {
            Ok(text) => debug!("Final metrics:\n{text}"),
            Err(err) => warn!(error = %err, "Could not gather metrics"),
        }
        self.transport.close();
        info!("Channels closed");
    }
}
