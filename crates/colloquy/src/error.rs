use thiserror::Error;

use colloquy_client::ClientError;
use colloquy_common::{ApiError, ConfigError};

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Turn cancelled")]
    Cancelled,

    #[error("Stream ended without a response")]
    NoResponse,

    #[error("Maximum turns exceeded: {max}")]
    MaxTurnsExceeded { max: usize },

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    /// The error reported by the server, from a stream `error` event or an error body.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(error) | Self::Client(ClientError::Api { error, .. }) => Some(error),
            _ => None,
        }
    }
}
