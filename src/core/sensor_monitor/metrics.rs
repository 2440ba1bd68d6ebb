use serde::{Deserialize, Serialize};

/// Fan entry: RPM from a tachometer and/or duty percent from a control.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FanReading {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpm: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pct: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageTemp {
    pub name: String,
    pub temp_c: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageReading {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub volts: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuReading {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_c: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_mhz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_rpm: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_w: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage_v: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vram_used_mb: Option<f64>,
}

impl GpuReading {
    /// True when at least one metric resolved.
    pub fn has_data(&self) -> bool {
        self.temp_c.is_some()
            || self.load_pct.is_some()
            || self.core_mhz.is_some()
            || self.fan_rpm.is_some()
            || self.power_w.is_some()
            || self.voltage_v.is_some()
            || self.vram_used_mb.is_some()
    }
}

/// CPU package power, average core clock and throttle state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuPackageMetrics {
    pub pkg_power_w: Option<f64>,
    pub avg_freq_mhz: Option<f64>,
    /// `Some(false)` once a throttle-capable sensor was seen without firing.
    pub throttle_active: Option<bool>,
    pub throttle_reasons: Vec<String>,
}

/// Dense 1-based per-core arrays; `None` marks an index never observed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerCoreMetrics {
    pub loads_pct: Vec<Option<f64>>,
    pub clocks_mhz: Vec<Option<f64>>,
    pub temps_c: Vec<Option<f64>>,
}

impl PerCoreMetrics {
    pub fn core_count(&self) -> usize {
        self.loads_pct.len()
    }
}

/// Sensor-present vs. sensor-has-value flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorFlags {
    pub has_temp: bool,
    pub has_temp_value: bool,
    pub has_fan: bool,
    pub has_fan_value: bool,
}

/// Everything the extractors produced for one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedMetrics {
    pub cpu_temp_c: Option<f64>,
    pub mobo_temp_c: Option<f64>,
    pub fans: Vec<FanReading>,
    pub fans_raw: Vec<FanReading>,
    pub mobo_voltages: Vec<VoltageReading>,
    pub storage_temps: Vec<StorageTemp>,
    pub gpus: Vec<GpuReading>,
    pub cpu_package: CpuPackageMetrics,
    pub per_core: PerCoreMetrics,
    pub flags: SensorFlags,
}

impl ExtractedMetrics {
    /// Whether any metric family produced a value this tick.
    pub fn has_any_value(&self) -> bool {
        self.cpu_temp_c.is_some()
            || self.mobo_temp_c.is_some()
            || self.flags.has_temp_value
            || self.flags.has_fan_value
            || !self.fans.is_empty()
            || !self.mobo_voltages.is_empty()
            || !self.storage_temps.is_empty()
            || !self.gpus.is_empty()
            || self.cpu_package.pkg_power_w.is_some()
            || self.cpu_package.avg_freq_mhz.is_some()
            || self.per_core.core_count() > 0
    }
}
