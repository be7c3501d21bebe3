//! Error types shared across the gateway crates.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the core model and state store implementations.
#[derive(Debug, Error)]
pub enum Error {
    /// Key not found in the state store.
    #[error("State not found: {0}")]
    NotFound(String),

    /// Write targeted a key the store has not created yet.
    #[error("State not registered: {0}")]
    NotRegistered(String),

    /// Storage/database error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
