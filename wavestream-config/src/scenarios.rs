//! Scenario source configuration.
//!
//! Lists the CSV recordings to load at startup and where to find them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Scenario store configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
#[validate(schema(function = validation::validate_default_scenario))]
pub struct ScenarioConfig {
    /// Directory the scenario files are resolved against.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Scenario every node starts on.
    #[serde(default = "default_scenario")]
    pub default: String,

    /// Samples in one electrical period. Reporting only.
    #[validate(range(min = 1, max = 100_000))]
    #[serde(default = "default_samples_per_cycle")]
    pub samples_per_cycle: usize,

    /// Named CSV sources, in load order.
    #[validate(nested)]
    #[validate(custom(function = validation::validate_unique_sources))]
    #[serde(default = "default_sources")]
    pub sources: Vec<ScenarioSource>,
}

/// A named scenario file.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct ScenarioSource {
    #[validate(custom(function = validation::validate_scenario_name))]
    pub name: String,
    pub file: PathBuf,
}

impl ScenarioSource {
    pub fn new(name: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("../csv_output")
}

fn default_scenario() -> String {
    "base".into()
}

fn default_samples_per_cycle() -> usize {
    60
}

fn default_sources() -> Vec<ScenarioSource> {
    ["base", "t1", "t2", "t3", "oc"]
        .into_iter()
        .map(|name| ScenarioSource::new(name, format!("{name}.csv")))
        .collect()
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            default: default_scenario(),
            samples_per_cycle: default_samples_per_cycle(),
            sources: default_sources(),
        }
    }
}

impl ScenarioConfig {
    /// Full path of a source, resolved against `directory`.
    pub fn path_of(&self, source: &ScenarioSource) -> PathBuf {
        self.directory.join(&source.file)
    }
}
