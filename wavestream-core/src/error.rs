use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Scenario file not found: {0}")]
    NotFound(PathBuf),

    #[error("Scenario '{0}' has no valid samples")]
    Empty(String),

    #[error("No scenarios could be loaded from {0}")]
    NoScenarios(PathBuf),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("At least one node must be registered")]
    Empty,

    #[error("Node id {0} is registered twice")]
    DuplicateId(u8),

    #[error("Node id {0} is outside 1..=9")]
    InvalidId(u8),
}
