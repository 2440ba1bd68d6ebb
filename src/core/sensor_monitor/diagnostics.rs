//! Human-readable diagnostics written to the log, never to the snapshot stream.

use std::fmt::Write as _;

use super::metrics::{ExtractedMetrics, SensorFlags};
use super::tree::{walk, SensorNode};

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

/// Indented listing of every node and reading.
///
/// ```text
/// - HW Cpu | Intel Core i7
///   * Temperature | CPU Package = 61.0
///   - Sub Other | CCD1
///     * Temperature | Tdie = 58.3
/// ```
pub fn dump_sensor_tree(roots: &[SensorNode]) -> String {
    let mut out = String::from("sensors:\n");
    for visit in walk(roots) {
        let indent = "  ".repeat(visit.depth);
        let label = if visit.depth == 0 { "HW" } else { "Sub" };
        let _ = writeln!(
            out,
            "{indent}- {label} {:?} | {}",
            visit.node.hardware_type, visit.node.name
        );
        for reading in &visit.node.sensors {
            let _ = writeln!(
                out,
                "{indent}  * {:?} | {} = {}",
                reading.kind,
                reading.name,
                fmt_opt(reading.value)
            );
        }
    }
    out
}

/// Periodic one-line health summary.
pub fn summary_line(tick: u64, metrics: &ExtractedMetrics, idle_sec: u64) -> String {
    let SensorFlags {
        has_temp,
        has_temp_value,
        has_fan,
        has_fan_value,
    } = metrics.flags;
    format!(
        "[summary] tick={} cpuTemp={} moboTemp={} fansCount={} hasTemp={}/{} hasFan={}/{} idleSec={}",
        tick,
        fmt_opt(metrics.cpu_temp_c),
        fmt_opt(metrics.mobo_temp_c),
        metrics.fans.len(),
        has_temp,
        has_temp_value,
        has_fan,
        has_fan_value,
        idle_sec
    )
}

/// Remembers the last reported value of the data-presence flags and produces
/// a line whenever one flips. The first observation always reports.
#[derive(Debug, Default)]
pub struct StateChangeTracker {
    temp_value: Option<bool>,
    fan_value: Option<bool>,
}

fn transition(slot: &mut Option<bool>, current: bool, label: &str) -> Option<String> {
    if *slot == Some(current) {
        return None;
    }
    let previous = slot.map_or_else(|| "none".to_string(), |b| b.to_string());
    *slot = Some(current);
    Some(format!("[state] {label} {previous}->{current}"))
}

impl StateChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, flags: &SensorFlags) -> Vec<String> {
        [
            transition(&mut self.temp_value, flags.has_temp_value, "hasTempValue"),
            transition(&mut self.fan_value, flags.has_fan_value, "hasFanValue"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
