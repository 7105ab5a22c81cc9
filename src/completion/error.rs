use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::error::error_chain;

/// Failure modes of a single completion call
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The request could not be sent or the response could not be read
    #[error("Transport error: {0}")]
    Transport(String),

    /// No response within the configured bound
    #[error("No response within {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// The provider answered with a non-success status
    #[error("Provider returned status {status}")]
    Status { status: u16, body: Value },

    /// A success status whose body is not JSON
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// A decoded body without `choices[0].message.content`
    #[error("Provider returned no content")]
    NoContent { result: Value },
}

impl GatewayError {
    /// Build a transport error from a `reqwest` error, keeping its source chain
    pub fn transport(err: &reqwest::Error) -> Self {
        GatewayError::Transport(error_chain(err))
    }
}
