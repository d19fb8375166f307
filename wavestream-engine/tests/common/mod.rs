#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use wavestream_config::{NodeConfig, ResetConfig, ScenarioSource, StreamerConfig};
use wavestream_core::command::KeyInput;
use wavestream_core::scenario::ScenarioStore;
use wavestream_engine::{
    KeySource, MemoryChannel, ScriptedKeys, StreamSettings, Streamer, Transport,
};
use wavestream_telemetry::metrics::MetricsRecorder;

/// Writes `samples` rows with a header; voltage counts up from `offset`.
pub fn write_scenario(dir: &Path, name: &str, samples: usize, offset: f64) {
    let mut csv = String::from("voltage,current\n");
    for i in 0..samples {
        writeln!(csv, "{},{}", offset + i as f64, i as f64 / 10.0).unwrap();
    }
    fs::write(dir.join(format!("{name}.csv")), csv).unwrap();
}

/// Three nodes on 10.0.0.1..=3, `base` of 120 samples and `oc` of 60.
pub fn lab_config(dir: &TempDir) -> StreamerConfig {
    write_scenario(dir.path(), "base", 120, 0.0);
    write_scenario(dir.path(), "oc", 60, 1000.0);

    let mut config = StreamerConfig::default();
    config.nodes = (1..=3)
        .map(|id| NodeConfig {
            id,
            address: IpAddr::V4(Ipv4Addr::new(10, 0, 0, id)),
        })
        .collect();
    config.scenarios.directory = dir.path().to_path_buf();
    config.scenarios.sources = vec![
        ScenarioSource::new("base", "base.csv"),
        ScenarioSource::new("oc", "oc.csv"),
    ];
    config.reset = ResetConfig::immediate();
    config
}

pub fn data_addr(id: u8) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, id)), 6001)
}

pub fn command_addr(id: u8) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, id)), 6000)
}

pub struct Harness {
    pub streamer: Streamer<MemoryChannel>,
    pub control: MemoryChannel,
    pub data: MemoryChannel,
    pub shutdown: Arc<AtomicBool>,
}

pub fn harness(config: &StreamerConfig) -> Harness {
    let store = ScenarioStore::load(&config.scenarios).unwrap();
    let control = MemoryChannel::new();
    let data = MemoryChannel::new();
    let shutdown = Arc::new(AtomicBool::new(false));
    let mut settings = StreamSettings::from_config(config);
    settings.period = Duration::from_micros(50);

    let streamer = Streamer::new(
        wavestream_core::node::NodeRegistry::from_config(config).unwrap(),
        store,
        Transport::new(control.clone(), data.clone()),
        settings,
        MetricsRecorder::new().unwrap(),
        Arc::clone(&shutdown),
    )
    .unwrap();

    Harness {
        streamer,
        control,
        data,
        shutdown,
    }
}

/// Scripted keys that raise `released` when dropped, like a terminal guard
/// leaving raw mode. With `fail_when_exhausted` the poll after the script
/// errors instead of idling.
pub struct TrackedKeys {
    script: ScriptedKeys,
    fail_when_exhausted: bool,
    released: Arc<AtomicBool>,
}

impl TrackedKeys {
    pub fn new(script: ScriptedKeys) -> (Self, Arc<AtomicBool>) {
        let released = Arc::new(AtomicBool::new(false));
        let keys = Self {
            script,
            fail_when_exhausted: false,
            released: Arc::clone(&released),
        };
        (keys, released)
    }

    pub fn failing(script: ScriptedKeys) -> (Self, Arc<AtomicBool>) {
        let (mut keys, released) = Self::new(script);
        keys.fail_when_exhausted = true;
        (keys, released)
    }
}

impl KeySource for TrackedKeys {
    fn poll_key(&mut self) -> io::Result<Option<KeyInput>> {
        if self.fail_when_exhausted && self.script.remaining() == 0 {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal went away"));
        }
        self.script.poll_key()
    }
}

impl Drop for TrackedKeys {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}
