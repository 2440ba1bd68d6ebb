use std::io;
use thiserror::Error;

/// Custom error type for the sensor bridge
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to open sensor provider: {0}")]
    ProviderOpen(String),

    #[error("Sensor refresh failed: {0}")]
    Refresh(String),

    #[error("Hardware session is not open")]
    SessionNotOpen,

    #[error("Output error: {0}")]
    Output(String),
}

/// Result type alias for the sensor bridge
pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        BridgeError::Config(msg.into())
    }

    /// Create a provider open error
    pub fn provider_open<S: Into<String>>(msg: S) -> Self {
        BridgeError::ProviderOpen(msg.into())
    }

    /// Create a refresh error
    pub fn refresh<S: Into<String>>(msg: S) -> Self {
        BridgeError::Refresh(msg.into())
    }

    pub fn output<S: Into<String>>(msg: S) -> Self {
        BridgeError::Output(msg.into())
    }
}
