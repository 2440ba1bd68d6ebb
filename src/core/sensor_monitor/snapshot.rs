//! Per-tick output record and where it goes.

use std::io::{self, Write};

use serde::Serialize;

use super::metrics::{ExtractedMetrics, FanReading, GpuReading, StorageTemp, VoltageReading};
use super::supervisor::HealthCounters;
use crate::error::{BridgeError, Result};

/// Flat, camelCase record written once per tick.
///
/// Absent scalars and empty lists are left out of the JSON. Per-core arrays
/// keep explicit `null`s for cores that reported nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_temp_c: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobo_temp_c: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fans: Vec<FanReading>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fans_extra: Vec<FanReading>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mobo_voltages: Vec<VoltageReading>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub storage_temps: Vec<StorageTemp>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gpus: Vec<GpuReading>,
    pub is_admin: bool,
    pub has_temp: bool,
    pub has_temp_value: bool,
    pub has_fan: bool,
    pub has_fan_value: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_pkg_power_w: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_avg_freq_mhz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_throttle_active: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cpu_throttle_reasons: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cpu_core_loads_pct: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cpu_core_clocks_mhz: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cpu_core_temps_c: Vec<Option<f64>>,
    #[serde(flatten)]
    pub counters: HealthCounters,
}

impl MetricSnapshot {
    pub fn build(metrics: ExtractedMetrics, counters: HealthCounters, is_admin: bool) -> Self {
        let ExtractedMetrics {
            cpu_temp_c,
            mobo_temp_c,
            fans,
            fans_raw,
            mobo_voltages,
            storage_temps,
            gpus,
            cpu_package,
            per_core,
            flags,
        } = metrics;

        Self {
            cpu_temp_c,
            mobo_temp_c,
            fans,
            fans_extra: fans_raw,
            mobo_voltages,
            storage_temps,
            gpus,
            is_admin,
            has_temp: flags.has_temp,
            has_temp_value: flags.has_temp_value,
            has_fan: flags.has_fan,
            has_fan_value: flags.has_fan_value,
            cpu_pkg_power_w: cpu_package.pkg_power_w,
            cpu_avg_freq_mhz: cpu_package.avg_freq_mhz,
            cpu_throttle_active: cpu_package.throttle_active,
            cpu_throttle_reasons: cpu_package.throttle_reasons,
            cpu_core_loads_pct: per_core.loads_pct,
            cpu_core_clocks_mhz: per_core.clocks_mhz,
            cpu_core_temps_c: per_core.temps_c,
            counters,
        }
    }
}

/// Destination for snapshots.
pub trait SnapshotSink: Send {
    fn write_snapshot(&mut self, snapshot: &MetricSnapshot) -> Result<()>;
}

/// One compact JSON object per line, flushed after every record.
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> SnapshotSink for JsonLinesSink<W> {
    fn write_snapshot(&mut self, snapshot: &MetricSnapshot) -> Result<()> {
        let line = serde_json::to_string(snapshot)?;
        writeln!(self.writer, "{line}")
            .and_then(|_| self.writer.flush())
            .map_err(|e| BridgeError::output(e.to_string()))
    }
}

/// Builds snapshots and hands them to the sink.
pub struct SnapshotEmitter {
    sink: Box<dyn SnapshotSink>,
    is_admin: bool,
}

impl SnapshotEmitter {
    pub fn new(sink: Box<dyn SnapshotSink>, is_admin: bool) -> Self {
        Self { sink, is_admin }
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Write one record. Failures are returned for logging only; the caller
    /// must not treat them as provider faults.
    pub fn emit(&mut self, metrics: ExtractedMetrics, counters: HealthCounters) -> Result<MetricSnapshot> {
        let snapshot = MetricSnapshot::build(metrics, counters, self.is_admin);
        self.sink.write_snapshot(&snapshot)?;
        Ok(snapshot)
    }
}
