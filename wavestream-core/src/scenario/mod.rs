//! ## wavestream-core::scenario
//! **Recorded waveform scenarios**
//!
//! A scenario is one full recording of voltage/current sample pairs for a
//! baseline or fault condition. Scenarios are loaded once at startup and
//! never change afterwards; nodes hold `Arc` handles to the one they play.

mod loader;
mod store;

pub use loader::{read_samples, ParsedSamples};
pub use store::ScenarioStore;

use std::path::Path;

use crate::error::ScenarioError;

/// One voltage/current sample pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub voltage: f64,
    pub current: f64,
}

impl Sample {
    pub fn new(voltage: f64, current: f64) -> Self {
        Self { voltage, current }
    }
}

/// A named, non-empty, immutable sample sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    name: String,
    samples: Vec<Sample>,
}

impl Scenario {
    /// Creates a scenario. A recording without samples cannot be played.
    pub fn new(name: impl Into<String>, samples: Vec<Sample>) -> Result<Self, ScenarioError> {
        let name = name.into();
        if samples.is_empty() {
            return Err(ScenarioError::Empty(name));
        }
        Ok(Self { name, samples })
    }

    /// Loads a scenario from a CSV file of `voltage,current` rows.
    pub fn from_csv_path(name: &str, path: &Path) -> Result<Self, ScenarioError> {
        if !path.exists() {
            return Err(ScenarioError::NotFound(path.to_path_buf()));
        }
        let file = std::fs::File::open(path)?;
        let parsed = read_samples(file)?;
        if parsed.skipped > 0 {
            tracing::debug!(
                scenario = name,
                skipped = parsed.skipped,
                "Dropped malformed rows"
            );
        }
        Self::new(name, parsed.samples)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample(&self, index: usize) -> Option<Sample> {
        self.samples.get(index).copied()
    }

    /// Whole electrical cycles contained in the recording.
    pub fn cycles(&self, cycle_length: usize) -> usize {
        if cycle_length == 0 {
            0
        } else {
            self.samples.len() / cycle_length
        }
    }
}
