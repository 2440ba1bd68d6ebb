//! Ownership of the provider handle.
//!
//! A provider can wedge itself (stale driver handles, a sensor chip that stops
//! answering). The only recovery is to drop the handle and open a new one, so
//! the session owns exactly one handle at a time and `reopen` always discards
//! the old one, even when closing it fails.

use serde::Serialize;

use super::tree::{HardwareType, SensorNode};
use crate::error::{BridgeError, Result};

/// Hardware groups a provider should enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareCategories {
    pub cpu: bool,
    pub motherboard: bool,
    pub controller: bool,
    pub storage: bool,
    pub gpu: bool,
    pub memory: bool,
    pub network: bool,
}

impl Default for HardwareCategories {
    fn default() -> Self {
        Self {
            cpu: true,
            motherboard: true,
            controller: true,
            storage: true,
            gpu: true,
            memory: false,
            network: false,
        }
    }
}

impl HardwareCategories {
    /// Whether nodes of this type should be enumerated. Uncategorised
    /// hardware is always kept.
    pub fn includes(&self, hardware_type: HardwareType) -> bool {
        match hardware_type {
            HardwareType::Cpu => self.cpu,
            HardwareType::Motherboard | HardwareType::SuperIo => self.motherboard,
            HardwareType::EmbeddedController => self.controller,
            HardwareType::Storage => self.storage,
            HardwareType::GpuNvidia | HardwareType::GpuAmd | HardwareType::GpuIntel => self.gpu,
            HardwareType::Memory => self.memory,
            HardwareType::Network => self.network,
            HardwareType::Other => true,
        }
    }
}

/// A live, opened view of the hardware.
pub trait SensorHandle: Send {
    /// Refresh every node's readings in place.
    fn update(&mut self) -> Result<()>;

    /// The current tree. Only valid until the next `update`.
    fn hardware(&self) -> &[SensorNode];

    /// Release the underlying resources.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Factory for sensor handles.
///
/// Implementations live in the platform layer.
pub trait SensorProvider: Send {
    fn name(&self) -> &str;

    fn open(&mut self, categories: &HardwareCategories) -> Result<Box<dyn SensorHandle>>;
}

pub struct HardwareSession {
    provider: Box<dyn SensorProvider>,
    categories: HardwareCategories,
    handle: Option<Box<dyn SensorHandle>>,
}

impl HardwareSession {
    pub fn new(provider: Box<dyn SensorProvider>) -> Self {
        Self::with_categories(provider, HardwareCategories::default())
    }

    pub fn with_categories(provider: Box<dyn SensorProvider>, categories: HardwareCategories) -> Self {
        Self {
            provider,
            categories,
            handle: None,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Open a fresh handle, discarding any existing one first.
    pub fn open(&mut self) -> Result<()> {
        self.close();
        let handle = self
            .provider
            .open(&self.categories)
            .map_err(|e| match e {
                BridgeError::ProviderOpen(_) => e,
                other => BridgeError::provider_open(other.to_string()),
            })?;
        self.handle = Some(handle);
        log::debug!("opened sensor provider '{}'", self.provider.name());
        Ok(())
    }

    /// Release the handle. Close failures are logged and otherwise ignored.
    pub fn close(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            if let Err(e) = handle.close() {
                log::warn!("closing sensor provider '{}' failed: {}", self.provider.name(), e);
            }
        }
    }

    pub fn reopen(&mut self) -> Result<()> {
        self.close();
        self.open()
    }

    /// Update all readings and borrow the refreshed tree.
    pub fn refresh(&mut self) -> Result<&[SensorNode]> {
        let handle = self.handle.as_mut().ok_or(BridgeError::SessionNotOpen)?;
        handle.update()?;
        Ok(handle.hardware())
    }

    /// The tree as of the last refresh, if a handle is open.
    pub fn hardware(&self) -> Option<&[SensorNode]> {
        self.handle.as_ref().map(|h| h.hardware())
    }
}

impl Drop for HardwareSession {
    fn drop(&mut self) {
        self.close();
    }
}
