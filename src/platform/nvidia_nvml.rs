use crate::core::sensor_monitor::SensorNode;

#[cfg(feature = "nvml")]
use crate::core::sensor_monitor::{HardwareType, SensorKind};
#[cfg(feature = "nvml")]
use nvml_wrapper::enum_wrappers::device::{Clock, TemperatureSensor};
#[cfg(feature = "nvml")]
use nvml_wrapper::Nvml;
#[cfg(feature = "nvml")]
use once_cell::sync::Lazy;

/// NVML must be initialized once per process; a failed init means no
/// NVIDIA driver and is remembered as `None`.
#[cfg(feature = "nvml")]
static NVML: Lazy<Option<Nvml>> = Lazy::new(|| match Nvml::init() {
    Ok(nvml) => Some(nvml),
    Err(e) => {
        log::debug!("NVML unavailable: {}", e);
        None
    }
});

/// Whether NVIDIA GPUs can be queried in this build and on this machine.
#[cfg(feature = "nvml")]
pub fn nvml_available() -> bool {
    NVML.is_some()
}

#[cfg(not(feature = "nvml"))]
pub fn nvml_available() -> bool {
    false
}

/// One `GpuNvidia` node per device, named the way the extractors expect:
/// "GPU Core" for temperature, load and clock, "GPU Package" for board
/// power, "GPU Memory Used" in bytes and "GPU Fan" as a duty percentage.
///
/// Every field is queried independently; an unsupported query just leaves
/// the reading without a value.
#[cfg(feature = "nvml")]
pub fn nvidia_gpu_nodes() -> Vec<SensorNode> {
    let Some(nvml) = NVML.as_ref() else {
        return Vec::new();
    };
    let count = match nvml.device_count() {
        Ok(count) => count,
        Err(e) => {
            log::warn!("NVML device count failed: {}", e);
            return Vec::new();
        }
    };

    (0..count)
        .filter_map(|index| match nvml.device_by_index(index) {
            Ok(device) => Some((index, device)),
            Err(e) => {
                log::warn!("NVML device {} unavailable: {}", index, e);
                None
            }
        })
        .map(|(index, device)| {
            let name = device
                .name()
                .unwrap_or_else(|_| format!("NVIDIA GPU #{}", index));
            let temperature = device.temperature(TemperatureSensor::Gpu).ok().map(f64::from);
            let load = device.utilization_rates().ok().map(|u| f64::from(u.gpu));
            let clock = device.clock_info(Clock::Graphics).ok().map(f64::from);
            // milliwatts -> watts
            let power = device.power_usage().ok().map(|mw| f64::from(mw) / 1000.0);
            let memory_used = device.memory_info().ok().map(|m| m.used as f64);
            let fan = device.fan_speed(0).ok().map(f64::from);

            SensorNode::new(HardwareType::GpuNvidia, name)
                .with_sensor(SensorKind::Temperature, "GPU Core", temperature)
                .with_sensor(SensorKind::Load, "GPU Core", load)
                .with_sensor(SensorKind::Clock, "GPU Core", clock)
                .with_sensor(SensorKind::Power, "GPU Package", power)
                .with_sensor(SensorKind::SmallData, "GPU Memory Used", memory_used)
                .with_sensor(SensorKind::Control, "GPU Fan", fan)
        })
        .collect()
}

#[cfg(not(feature = "nvml"))]
pub fn nvidia_gpu_nodes() -> Vec<SensorNode> {
    Vec::new()
}
