use super::{non_empty, round_u32};
use crate::core::sensor_monitor::metrics::FanReading;
use crate::core::sensor_monitor::rules::{FAN_CONTROL, FAN_RPM, PERCENT};
use crate::core::sensor_monitor::tree::{readings, NodeVisit, SensorKind, SensorNode, SensorReading};

/// Whether a Control reading is a fan duty.
///
/// Named duties always count. Unnamed controls on boards and embedded
/// controllers count too when they read like a percentage, since laptop ECs
/// expose fan duty as a bare `Control #N`.
pub fn is_fan_like_control(visit: &NodeVisit<'_>, reading: &SensorReading) -> bool {
    if reading.kind != SensorKind::Control {
        return false;
    }
    if FAN_CONTROL.matches(&reading.name) {
        return true;
    }
    let on_board = visit.node.hardware_type.is_board() || visit.root.hardware_type.is_board();
    on_board && reading.value.is_some_and(|v| PERCENT.contains(v))
}

/// Candidate classification for a single reading.
fn fan_candidate(visit: &NodeVisit<'_>, reading: &SensorReading) -> Option<FanReading> {
    let (rpm, pct) = match reading.kind {
        SensorKind::Fan => (reading.value.and_then(|v| FAN_RPM.accept(v)), None),
        SensorKind::Control if is_fan_like_control(visit, reading) => {
            (None, reading.value.and_then(|v| PERCENT.accept(v)))
        }
        _ => return None,
    };
    if rpm.is_none() && pct.is_none() {
        return None;
    }
    Some(FanReading {
        name: non_empty(&reading.name),
        rpm: rpm.map(round_u32),
        pct: pct.map(round_u32),
    })
}

/// Every fan speed and fan-like duty, one entry per reading.
pub fn fans_raw(roots: &[SensorNode]) -> Vec<FanReading> {
    readings(roots)
        .filter_map(|(visit, reading)| fan_candidate(&visit, reading))
        .collect()
}

/// Fans merged by name: RPM and duty keep their maxima independently.
pub fn fans(roots: &[SensorNode]) -> Vec<FanReading> {
    let mut merged: Vec<FanReading> = Vec::new();

    for fan in fans_raw(roots) {
        match merged.iter_mut().find(|f| f.name == fan.name) {
            Some(existing) => {
                existing.rpm = existing.rpm.max(fan.rpm);
                existing.pct = existing.pct.max(fan.pct);
            }
            None => merged.push(fan),
        }
    }

    merged
}
