// Sensor Bridge Library - Public API

// Re-export error types
pub mod error;
pub use error::{BridgeError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod logging;
pub mod platform;

// Re-export commonly used types
pub use core::config::BridgeConfig;
pub use logging::init_logging;
