use thiserror::Error;

/// Errors that can occur while decoding a datagram.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum FrameParseError {
    #[error("Expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("Unknown verb '{0}'")]
    UnknownVerb(String),
    #[error("Invalid argument '{arg}' for {verb}")]
    InvalidArgument { verb: &'static str, arg: String },
    #[error("Invalid node id '{0}'")]
    InvalidNodeId(String),
    #[error("Invalid sample value '{0}'")]
    InvalidSample(String),
}
