//! ## wavestream-engine::reset
//! **Node reset handshake**
//!
//! Three rounds over the control channel, paced so the node firmware can keep
//! up:
//!
//! 1. `RESET_CYCLE|0|<id>` to every node, `command_delay` after each
//! 2. `reset_settle` pause
//! 3. `SET_MODE|<mode>|<id>` then `SET_SEND|ON|<id>` per node, `command_delay` after each
//! 4. `final_settle` pause
//!
//! A command that fails to send is logged and counted; the handshake always
//! runs to the end.

use std::thread;
use std::time::Duration;

use opentelemetry::KeyValue;
use tracing::{info, instrument, warn};
use wavestream_config::ResetConfig;
use wavestream_core::node::{NodeEntry, NodeRegistry};
use wavestream_protocol::{ControlCommand, NodeMode, SendState};
use wavestream_telemetry::logging::EventLogger;
use wavestream_telemetry::metrics::MetricsRecorder;

use crate::error::StreamError;
use crate::transport::{DatagramChannel, Transport};

/// Outcome of one handshake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetReport {
    pub sent: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct ResetCoordinator {
    mode: NodeMode,
    command_delay: Duration,
    reset_settle: Duration,
    final_settle: Duration,
}

impl ResetCoordinator {
    pub fn new(config: &ResetConfig) -> Result<Self, StreamError> {
        Ok(Self {
            mode: config.mode.parse()?,
            command_delay: config.command_delay(),
            reset_settle: config.reset_settle(),
            final_settle: config.final_settle(),
        })
    }

    pub fn mode(&self) -> NodeMode {
        self.mode
    }

    /// Commands of the handshake in send order.
    pub fn commands(&self, registry: &NodeRegistry) -> Vec<ControlCommand> {
        let resets = registry
            .ids()
            .map(|node| ControlCommand::ResetCycle { node });
        let modes = registry.ids().flat_map(|node| {
            [
                ControlCommand::SetMode {
                    mode: self.mode,
                    node,
                },
                ControlCommand::SetSend {
                    state: SendState::On,
                    node,
                },
            ]
        });
        resets.chain(modes).collect()
    }

    /// Runs the full handshake. Blocks for the configured delays.
    #[instrument(level = "info", name = "reset_nodes", skip_all, fields(nodes = registry.len()))]
    pub fn run<C: DatagramChannel>(
        &self,
        transport: &Transport<C>,
        registry: &NodeRegistry,
        metrics: &MetricsRecorder,
    ) -> ResetReport {
        info!("Resetting nodes");
        let mut report = ResetReport::default();

        for node in registry.iter() {
            let command = ControlCommand::ResetCycle { node: node.id() };
            self.send(transport, node, &command, metrics, &mut report);
        }
        pause(self.reset_settle);

        for node in registry.iter() {
            let id = node.id();
            let mode = ControlCommand::SetMode {
                mode: self.mode,
                node: id,
            };
            self.send(transport, node, &mode, metrics, &mut report);
            let send_on = ControlCommand::SetSend {
                state: SendState::On,
                node: id,
            };
            self.send(transport, node, &send_on, metrics, &mut report);
        }
        pause(self.final_settle);

        EventLogger::log_event(
            "nodes_reset",
            &[
                KeyValue::new("mode", self.mode.as_str()),
                KeyValue::new("sent", report.sent as i64),
                KeyValue::new("failed", report.failed as i64),
            ],
        );
        if report.failed > 0 {
            warn!(failed = report.failed, "Reset finished with unsent commands");
        } else {
            info!(sent = report.sent, "Reset complete");
        }
        report
    }

    fn send<C: DatagramChannel>(
        &self,
        transport: &Transport<C>,
        node: &NodeEntry,
        command: &ControlCommand,
        metrics: &MetricsRecorder,
        report: &mut ResetReport,
    ) {
        match transport.send_command(node, command) {
            Ok(()) => {
                report.sent += 1;
                metrics.inc_control_commands();
            }
            Err(err) => {
                report.failed += 1;
                metrics.inc_send_failures();
                warn!(node = node.id(), %command, error = %err, "Control command not sent");
            }
        }
        pause(self.command_delay);
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}
