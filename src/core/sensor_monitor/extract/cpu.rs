use super::{max_of, ExtractOptions};
use crate::core::sensor_monitor::metrics::CpuPackageMetrics;
use crate::core::sensor_monitor::rules::{
    CPU_CLOCK_MHZ, CPU_CORE_CLOCK, CPU_PACKAGE_POWER, POWER_LIMIT, POWER_W, TEMPERATURE_C,
    THROTTLE_FACTOR, THROTTLE_FACTOR_THRESHOLD, THROTTLE_LOAD,
};
use crate::core::sensor_monitor::tree::{readings, readings_under, HardwareType, SensorKind, SensorNode};

fn is_cpu(hardware_type: HardwareType) -> bool {
    hardware_type == HardwareType::Cpu
}

/// Hottest plausible temperature anywhere under a CPU node.
///
/// Package and hot-spot sensors usually read highest, so the maximum biases
/// toward the worst case.
pub fn cpu_temperature(roots: &[SensorNode]) -> Option<f64> {
    max_of(
        readings_under(roots, is_cpu)
            .filter(|(_, s)| s.kind == SensorKind::Temperature)
            .filter_map(|(_, s)| s.value)
            .filter_map(|v| TEMPERATURE_C.accept(v)),
    )
}

#[derive(Debug, Default)]
struct ThrottleScan {
    capable_seen: bool,
    triggered: bool,
    reasons: Vec<String>,
}

impl ThrottleScan {
    /// Record a throttle flag. Only `capable` flags make an idle reading
    /// count as "not throttling"; the others just contribute reasons.
    fn observe(&mut self, name: &str, firing: bool, capable: bool) {
        self.capable_seen |= capable;
        if firing {
            self.triggered = true;
            if !self.reasons.iter().any(|r| r == name) {
                self.reasons.push(name.to_string());
            }
        }
    }

    fn resolve(&self, default_false: bool) -> Option<bool> {
        if self.triggered {
            Some(true)
        } else if self.capable_seen || default_false {
            Some(false)
        } else {
            None
        }
    }
}

/// Package power, average core clock and throttle state.
///
/// Power and clock readings only count under CPU nodes. Throttle flags are
/// scanned everywhere: Load and Factor flags may hang off any hardware, while
/// power-limit flags are only trusted under a CPU.
pub fn cpu_package(roots: &[SensorNode], options: &ExtractOptions) -> CpuPackageMetrics {
    let mut package_power: Option<f64> = None;
    let mut other_power: Option<f64> = None;
    let mut core_clocks: Vec<f64> = Vec::new();
    let mut throttle = ThrottleScan::default();

    for (visit, reading) in readings(roots) {
        let Some(value) = reading.value else {
            continue;
        };
        let name = reading.name.as_str();
        let under_cpu = is_cpu(visit.root.hardware_type);

        match reading.kind {
            SensorKind::Power if under_cpu => {
                if let Some(watts) = POWER_W.accept(value) {
                    if CPU_PACKAGE_POWER.matches(name) {
                        package_power = Some(watts);
                    } else {
                        other_power = Some(other_power.map_or(watts, |w| w.max(watts)));
                    }
                }
                if POWER_LIMIT.matches(name) {
                    throttle.observe(name, value > 0.0, true);
                }
            }
            SensorKind::Clock if under_cpu => {
                if CPU_CORE_CLOCK.matches(name) && CPU_CLOCK_MHZ.contains(value) {
                    core_clocks.push(value);
                }
            }
            SensorKind::Load if THROTTLE_LOAD.matches(name) => {
                throttle.observe(name, value > 0.0, false);
            }
            SensorKind::Factor if THROTTLE_FACTOR.matches(name) => {
                throttle.observe(name, value > THROTTLE_FACTOR_THRESHOLD, true);
            }
            _ => {}
        }
    }

    let avg_freq_mhz = if core_clocks.is_empty() {
        None
    } else {
        Some(core_clocks.iter().sum::<f64>() / core_clocks.len() as f64)
    };

    CpuPackageMetrics {
        pkg_power_w: package_power.or(other_power),
        avg_freq_mhz,
        throttle_active: throttle.resolve(options.throttle_default_false),
        throttle_reasons: throttle.reasons,
    }
}
