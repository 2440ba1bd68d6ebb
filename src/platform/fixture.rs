//! Replay provider: the sensor tree comes from a JSON file on disk.
//!
//! The file is re-read on every refresh, so editing it while the bridge runs
//! changes the next tick. Useful for reproducing a user's sensor layout.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::sensor_monitor::{HardwareCategories, SensorHandle, SensorNode, SensorProvider};
use crate::error::{BridgeError, Result};

/// Parse a fixture and drop roots of disabled categories.
pub fn load_fixture(path: &Path, categories: &HardwareCategories) -> Result<Vec<SensorNode>> {
    let data = fs::read_to_string(path)?;
    let mut roots: Vec<SensorNode> = serde_json::from_str(&data)?;
    roots.retain(|root| categories.includes(root.hardware_type));
    Ok(roots)
}

#[derive(Debug, Clone)]
pub struct FixtureProvider {
    path: PathBuf,
}

impl FixtureProvider {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl SensorProvider for FixtureProvider {
    fn name(&self) -> &str {
        "fixture"
    }

    fn open(&mut self, categories: &HardwareCategories) -> Result<Box<dyn SensorHandle>> {
        let tree = load_fixture(&self.path, categories).map_err(|e| {
            BridgeError::provider_open(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(Box::new(FixtureHandle {
            path: self.path.clone(),
            categories: *categories,
            tree,
        }))
    }
}

pub struct FixtureHandle {
    path: PathBuf,
    categories: HardwareCategories,
    tree: Vec<SensorNode>,
}

impl SensorHandle for FixtureHandle {
    fn update(&mut self) -> Result<()> {
        self.tree = load_fixture(&self.path, &self.categories)
            .map_err(|e| BridgeError::refresh(format!("{}: {}", self.path.display(), e)))?;
        Ok(())
    }

    fn hardware(&self) -> &[SensorNode] {
        &self.tree
    }
}
