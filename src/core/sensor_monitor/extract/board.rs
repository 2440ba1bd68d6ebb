use super::{mean_of, non_empty};
use crate::core::sensor_monitor::metrics::VoltageReading;
use crate::core::sensor_monitor::rules::{
    BOARD_VOLTAGE_V, MOTHERBOARD_AMBIENT, MOTHERBOARD_MEAN_MAX_C, TEMPERATURE_C,
};
use crate::core::sensor_monitor::tree::{readings_under, HardwareType, SensorKind, SensorNode};

/// Averaged motherboard temperature.
///
/// Ambient-looking sensors (system, PCH, chassis...) are averaged when any
/// exist; otherwise every plausible board temperature is. VRM, DIMM and
/// socket sensors would otherwise drag the mean upward.
pub fn motherboard_temperature(roots: &[SensorNode]) -> Option<f64> {
    let mut preferred = Vec::new();
    let mut all = Vec::new();

    for (_, reading) in readings_under(roots, HardwareType::is_board) {
        if reading.kind != SensorKind::Temperature {
            continue;
        }
        let Some(value) = reading.value.and_then(|v| TEMPERATURE_C.accept(v)) else {
            continue;
        };
        if MOTHERBOARD_AMBIENT.matches(&reading.name) {
            preferred.push(value);
        }
        all.push(value);
    }

    let mean = if preferred.is_empty() {
        mean_of(&all)
    } else {
        mean_of(&preferred)
    }?;

    (TEMPERATURE_C.contains(mean) && mean <= MOTHERBOARD_MEAN_MAX_C).then_some(mean)
}

/// Board voltage rails, one entry per name holding the highest reading.
pub fn board_voltages(roots: &[SensorNode]) -> Vec<VoltageReading> {
    let mut out: Vec<VoltageReading> = Vec::new();

    for (_, reading) in readings_under(roots, HardwareType::is_board) {
        if reading.kind != SensorKind::Voltage {
            continue;
        }
        let Some(volts) = reading.value.and_then(|v| BOARD_VOLTAGE_V.accept(v)) else {
            continue;
        };
        let name = non_empty(&reading.name);
        match out.iter_mut().find(|v| v.name == name) {
            Some(existing) => existing.volts = existing.volts.max(volts),
            None => out.push(VoltageReading { name, volts }),
        }
    }

    out
}
