//! ## wavestream-telemetry::metrics
//! Prometheus counters for the streaming loop.

use prometheus::{Counter, Histogram, HistogramOpts, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: prometheus::Registry,
    pub frames_sent: prometheus::Counter,
    pub send_failures: prometheus::Counter,
    pub control_commands: prometheus::Counter,
    pub overruns: prometheus::Counter,
    pub iteration_time: prometheus::Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let frames_sent = Counter::new("wavestream_frames_sent_total", "Waveform frames sent")?;
        let send_failures = Counter::new(
            "wavestream_send_failures_total",
            "Datagrams that could not be sent",
        )?;
        let control_commands = Counter::new(
            "wavestream_control_commands_total",
            "Control commands sent to nodes",
        )?;
        let overruns = Counter::new(
            "wavestream_overruns_total",
            "Loop iterations whose work exceeded the sample period",
        )?;
        let iteration_time = Histogram::with_opts(
            HistogramOpts::new(
                "wavestream_iteration_time_us",
                "Work time of one loop iteration",
            )
            .buckets(vec![10.0, 50.0, 100.0, 250.0, 500.0, 1_000.0]),
        )?;

        registry.register(Box::new(frames_sent.clone()))?;
        registry.register(Box::new(send_failures.clone()))?;
        registry.register(Box::new(control_commands.clone()))?;
        registry.register(Box::new(overruns.clone()))?;
        registry.register(Box::new(iteration_time.clone()))?;

        Ok(Self {
            registry,
            frames_sent,
            send_failures,
            control_commands,
            overruns,
            iteration_time,
        })
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn inc_frames_sent(&self) {
        self.frames_sent.inc();
    }

    pub fn inc_send_failures(&self) {
        self.send_failures.inc();
    }

    pub fn inc_control_commands(&self) {
        self.control_commands.inc();
    }

    pub fn inc_overruns(&self) {
        self.overruns.inc();
    }

    pub fn observe_iteration_us(&self, micros: f64) {
        self.iteration_time.observe(micros);
    }
}
