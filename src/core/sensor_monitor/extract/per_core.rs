use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::sensor_monitor::metrics::PerCoreMetrics;
use crate::core::sensor_monitor::rules::{CPU_CLOCK_MHZ, MAX_CORE_INDEX, PERCENT, TEMPERATURE_C};
use crate::core::sensor_monitor::tree::{readings_under, HardwareType, SensorKind, SensorNode};

static HASH_INDEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#\s*(\d+)").expect("hash index pattern is valid"));

static CORE_INDEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:cpu\s*)?(?:p-?core|e-?core|core)\s*#?\s*(\d+)")
        .expect("core index pattern is valid")
});

fn capture_index(pattern: &Regex, name: &str) -> Option<usize> {
    pattern
        .captures(name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .filter(|idx| (1..=MAX_CORE_INDEX).contains(idx))
}

/// 1-based core index from a sensor name.
///
/// An explicit `#N` wins; otherwise `Core N`, `CPU Core N`, `P-Core N` and
/// `E-Core N` are recognised.
pub fn parse_core_index(name: &str) -> Option<usize> {
    capture_index(&HASH_INDEX, name).or_else(|| capture_index(&CORE_INDEX, name))
}

fn keep_max(map: &mut BTreeMap<usize, f64>, index: usize, value: f64) {
    map.entry(index)
        .and_modify(|current| *current = current.max(value))
        .or_insert(value);
}

fn dense(map: &BTreeMap<usize, f64>, len: usize) -> Vec<Option<f64>> {
    (1..=len).map(|i| map.get(&i).copied()).collect()
}

/// Per-core load, clock and temperature arrays for the CPU sub-tree.
///
/// All three arrays share the length of the highest index seen across any of
/// them; an index missing for one metric is `None` there regardless of the
/// others.
pub fn per_core(roots: &[SensorNode]) -> PerCoreMetrics {
    let mut loads = BTreeMap::new();
    let mut clocks = BTreeMap::new();
    let mut temps = BTreeMap::new();

    for (_, reading) in readings_under(roots, |t| t == HardwareType::Cpu) {
        let Some(value) = reading.value else {
            continue;
        };
        let Some(index) = parse_core_index(&reading.name) else {
            continue;
        };
        match reading.kind {
            SensorKind::Load if PERCENT.contains(value) => keep_max(&mut loads, index, value),
            SensorKind::Clock if CPU_CLOCK_MHZ.contains(value) => {
                keep_max(&mut clocks, index, value)
            }
            SensorKind::Temperature if TEMPERATURE_C.contains(value) => {
                keep_max(&mut temps, index, value)
            }
            _ => {}
        }
    }

    let max_index = [&loads, &clocks, &temps]
        .iter()
        .filter_map(|m| m.keys().next_back().copied())
        .max()
        .unwrap_or(0);

    PerCoreMetrics {
        loads_pct: dense(&loads, max_index),
        clocks_mhz: dense(&clocks, max_index),
        temps_c: dense(&temps, max_index),
    }
}
