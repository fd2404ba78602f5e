//! Errors returned by the client.

use hydralink::{HydraError, ParseError};

use crate::config::ConfigError;

/// Everything that can go wrong between building a command and reading its
/// response.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Command construction or validation failed.
    #[error(transparent)]
    Hydra(#[from] HydraError),

    /// The HTTP request or response failed.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A document fetch returned a non-2xx status code.
    #[error("server returned status {0}")]
    BadStatus(u16),

    /// A command target or configured URL is not a usable URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The operation documents a method that is not a valid HTTP method.
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<ParseError> for ClientError {
    fn from(e: ParseError) -> Self {
        ClientError::Hydra(HydraError::Parse(e))
    }
}
