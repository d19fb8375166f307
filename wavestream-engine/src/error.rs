use thiserror::Error;
use tokio::task::JoinError;
use wavestream_config::ConfigError;
use wavestream_core::{RegistryError, ScenarioError};
use wavestream_protocol::FrameParseError;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    #[error("Node registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] FrameParseError),

    #[error("Terminal input error: {0}")]
    Input(#[source] std::io::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Streaming task failed: {0}")]
    Task(String),
}

impl From<JoinError> for StreamError {
    fn from(err: JoinError) -> Self {
        StreamError::Task(err.to_string())
    }
}
