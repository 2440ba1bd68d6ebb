use super::{max_of, non_empty, round_u32, Fold, Preferred};
use crate::core::sensor_monitor::metrics::GpuReading;
use crate::core::sensor_monitor::rules::{
    FAN_RPM, GPU_CLOCK, GPU_CLOCK_MHZ, GPU_LOAD, GPU_NON_CORE_CLOCK, GPU_POWER, GPU_VOLTAGE,
    GPU_VOLTAGE_V, GPU_VRAM_MEASURE, GPU_VRAM_SUBJECT, MIB, PERCENT, POWER_W, TEMPERATURE_C,
    VRAM_BYTES_THRESHOLD, VRAM_USED_MB,
};
use crate::core::sensor_monitor::tree::{readings, SensorKind, SensorNode};

/// Providers disagree on units for memory used; large values are bytes.
fn vram_megabytes(value: f64) -> Option<f64> {
    let mb = if value > VRAM_BYTES_THRESHOLD {
        value / MIB
    } else {
        value
    };
    VRAM_USED_MB.accept(mb)
}

fn gpu_reading(root: &SensorNode) -> GpuReading {
    let mut temps = Vec::new();
    let mut load = Preferred::new(Fold::Max, Fold::First);
    let mut clock = Preferred::new(Fold::Max, Fold::Max);
    let mut fan_rpm: Option<f64> = None;
    let mut power = Preferred::new(Fold::Max, Fold::Max);
    let mut voltage = Preferred::new(Fold::Max, Fold::Max);
    let mut vram: Option<f64> = None;

    for (_, reading) in readings(std::slice::from_ref(root)) {
        let Some(value) = reading.value else {
            continue;
        };
        let name = reading.name.as_str();

        match reading.kind {
            SensorKind::Temperature => {
                if let Some(t) = TEMPERATURE_C.accept(value) {
                    temps.push(t);
                }
            }
            SensorKind::Load => {
                if let Some(pct) = PERCENT.accept(value) {
                    load.offer(pct, GPU_LOAD.matches(name));
                }
            }
            SensorKind::Clock => {
                if let Some(mhz) = GPU_CLOCK_MHZ.accept(value) {
                    if GPU_CLOCK.matches(name) {
                        clock.offer(mhz, true);
                    } else if !GPU_NON_CORE_CLOCK.matches(name) {
                        clock.offer(mhz, false);
                    }
                }
            }
            SensorKind::Fan => {
                if let Some(rpm) = FAN_RPM.accept(value) {
                    fan_rpm = max_of(fan_rpm.into_iter().chain([rpm]));
                }
            }
            SensorKind::Power => {
                if let Some(watts) = POWER_W.accept(value) {
                    power.offer(watts, GPU_POWER.matches(name));
                }
            }
            SensorKind::Voltage => {
                if let Some(volts) = GPU_VOLTAGE_V.accept(value) {
                    voltage.offer(volts, GPU_VOLTAGE.matches(name));
                }
            }
            SensorKind::SmallData | SensorKind::Data => {
                if GPU_VRAM_SUBJECT.matches(name) && GPU_VRAM_MEASURE.matches(name) {
                    if let Some(mb) = vram_megabytes(value) {
                        vram = max_of(vram.into_iter().chain([mb]));
                    }
                }
            }
            _ => {}
        }
    }

    GpuReading {
        name: non_empty(&root.name),
        temp_c: max_of(temps),
        load_pct: load.resolve(),
        core_mhz: clock.resolve(),
        fan_rpm: fan_rpm.map(round_u32),
        power_w: power.resolve(),
        voltage_v: voltage.resolve(),
        vram_used_mb: vram,
    }
}

/// One record per GPU root that resolved at least one metric.
pub fn gpus(roots: &[SensorNode]) -> Vec<GpuReading> {
    roots
        .iter()
        .filter(|root| root.hardware_type.is_gpu())
        .map(gpu_reading)
        .filter(GpuReading::has_data)
        .collect()
}
