// Platform-specific code: privilege detection and concrete sensor providers

pub mod elevation;
pub mod fixture;
pub mod nvidia_nvml;
pub mod sysinfo_sensors;

// Re-exports for clean imports
pub use elevation::is_elevated;
pub use fixture::FixtureProvider;
pub use sysinfo_sensors::SysinfoProvider;
