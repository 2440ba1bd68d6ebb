// Core sensor logic: configuration and the monitoring loop

pub mod config;
pub mod sensor_monitor;

// Re-export commonly used items
pub use config::BridgeConfig;
pub use sensor_monitor::{HardwareSession, SensorMonitor};
