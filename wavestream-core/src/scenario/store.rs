//! Read-only scenario store.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use wavestream_config::ScenarioConfig;

use super::Scenario;
use crate::error::ScenarioError;

/// Every scenario that loaded successfully, keyed by name.
///
/// A store is never empty: construction fails with
/// [`ScenarioError::NoScenarios`] when nothing could be loaded.
#[derive(Debug, Clone)]
pub struct ScenarioStore {
    scenarios: BTreeMap<String, Arc<Scenario>>,
    cycle_length: usize,
}

impl ScenarioStore {
    /// Loads every configured source. Sources that are missing, unreadable or
    /// empty are skipped with a warning.
    pub fn load(config: &ScenarioConfig) -> Result<Self, ScenarioError> {
        let mut scenarios = Vec::with_capacity(config.sources.len());

        for source in &config.sources {
            let path = config.path_of(source);
            match Scenario::from_csv_path(&source.name, &path) {
                Ok(scenario) => {
                    info!(
                        scenario = %source.name,
                        samples = scenario.len(),
                        cycles = scenario.cycles(config.samples_per_cycle),
                        "Loaded scenario"
                    );
                    scenarios.push(scenario);
                }
                Err(e) => warn!(scenario = %source.name, "Skipping scenario: {e}"),
            }
        }

        Self::from_scenarios(scenarios, config.samples_per_cycle)
            .map_err(|_| ScenarioError::NoScenarios(config.directory.clone()))
    }

    /// Builds a store from scenarios already in memory.
    pub fn from_scenarios(
        scenarios: impl IntoIterator<Item = Scenario>,
        cycle_length: usize,
    ) -> Result<Self, ScenarioError> {
        let scenarios: BTreeMap<_, _> = scenarios
            .into_iter()
            .map(|s| (s.name().to_string(), Arc::new(s)))
            .collect();
        if scenarios.is_empty() {
            return Err(ScenarioError::NoScenarios(PathBuf::new()));
        }
        Ok(Self {
            scenarios,
            cycle_length: cycle_length.max(1),
        })
    }

    pub fn get(&self, name: &str) -> Option<Arc<Scenario>> {
        self.scenarios.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scenarios.contains_key(name)
    }

    /// Scenario names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Scenario>> {
        self.scenarios.values()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Samples per electrical cycle. Only used for progress reporting.
    pub fn cycle_length(&self) -> usize {
        self.cycle_length
    }

    /// The scenario nodes start on: `preferred` when loaded, otherwise the
    /// first scenario by name.
    pub fn initial(&self, preferred: &str) -> Result<Arc<Scenario>, ScenarioError> {
        if let Some(scenario) = self.get(preferred) {
            return Ok(scenario);
        }
        let fallback = self
            .scenarios
            .values()
            .next()
            .cloned()
            .ok_or_else(|| ScenarioError::NoScenarios(PathBuf::new()))?;
        warn!(
            preferred,
            fallback = fallback.name(),
            "Default scenario not loaded, starting on fallback"
        );
        Ok(fallback)
    }
}
