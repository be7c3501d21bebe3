//! Gateway error taxonomy.
//!
//! No variant is fatal to the process: transport and payload errors skip
//! the affected poll cycle, store errors are logged and the walk
//! continues. The worst outcome is a cycle that produces no usable data.

use thiserror::Error;

/// Result type for gateway operations.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Errors raised while polling and projecting telemetry.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Fetch failed or the device answered with a non-success HTTP
    /// status; the category is skipped for this cycle.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The device answered with a failure envelope; carries the
    /// vendor-supplied reason string.
    #[error("Device API error: {0}")]
    Api(String),

    /// Response did not parse as JSON or lacks the expected envelope.
    #[error("Malformed payload: {0}")]
    Payload(String),

    /// State store failure.
    #[error("Store error: {0}")]
    Store(#[from] solgate_core::Error),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::Payload(e.to_string())
        } else {
            GatewayError::Transport(e.to_string())
        }
    }
}
