use std::fmt;

use crate::core::sensor_monitor::metrics::StorageTemp;
use crate::core::sensor_monitor::rules::TEMPERATURE_C;
use crate::core::sensor_monitor::tree::{readings_under, HardwareType, SensorKind, SensorNode};

/// Canonical location of a drive temperature sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageLocation {
    Composite,
    Controller,
    Flash,
    Drive,
}

impl StorageLocation {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageLocation::Composite => "Composite",
            StorageLocation::Controller => "Controller",
            StorageLocation::Flash => "Flash",
            StorageLocation::Drive => "Drive",
        }
    }

    /// Classify a raw sensor name; `None` when it is not a known location.
    ///
    /// Order matters: "Drive Temperature" is the composite reading on SATA
    /// drives, so it is checked before the generic "drive" match.
    pub fn classify(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        if lower == "temperature"
            || lower.contains("composite")
            || lower.contains("drive temperature")
        {
            Some(StorageLocation::Composite)
        } else if lower == "temperature 1" || lower.contains("controller") {
            Some(StorageLocation::Controller)
        } else if lower == "temperature 2"
            || lower.contains("nand")
            || lower.contains("memory")
            || lower.contains("flash")
        {
            Some(StorageLocation::Flash)
        } else if lower.contains("drive") {
            Some(StorageLocation::Drive)
        } else {
            None
        }
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Friendly location label for a storage temperature sensor name.
pub fn map_storage_sensor_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "Temperature".to_string();
    }
    match StorageLocation::classify(trimmed) {
        Some(location) => location.to_string(),
        None => trimmed.to_string(),
    }
}

/// One entry per plausible storage temperature, labelled `"<device> <location>"`.
///
/// Entries are never merged: two drives of the same model both appear.
pub fn storage_temperatures(roots: &[SensorNode]) -> Vec<StorageTemp> {
    readings_under(roots, |t| t == HardwareType::Storage)
        .filter(|(_, reading)| reading.kind == SensorKind::Temperature)
        .filter_map(|(visit, reading)| {
            let temp_c = reading.value.and_then(|v| TEMPERATURE_C.accept(v))?;
            let location = map_storage_sensor_name(&reading.name);
            let device = visit.root.name.trim();
            let name = if device.is_empty() {
                location
            } else {
                format!("{device} {location}")
            };
            Some(StorageTemp { name, temp_c })
        })
        .collect()
}
