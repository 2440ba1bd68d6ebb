use super::fans::is_fan_like_control;
use crate::core::sensor_monitor::metrics::SensorFlags;
use crate::core::sensor_monitor::tree::{readings, SensorKind, SensorNode};

/// Presence of temperature and fan sensors, and whether any of them has data.
pub fn sensor_flags(roots: &[SensorNode]) -> SensorFlags {
    let mut flags = SensorFlags::default();

    for (visit, reading) in readings(roots) {
        let has_value = reading.value.is_some();
        match reading.kind {
            SensorKind::Temperature => {
                flags.has_temp = true;
                flags.has_temp_value |= has_value;
            }
            SensorKind::Fan => {
                flags.has_fan = true;
                flags.has_fan_value |= has_value;
            }
            SensorKind::Control if is_fan_like_control(&visit, reading) => {
                flags.has_fan = true;
                flags.has_fan_value |= has_value;
            }
            _ => {}
        }
    }

    flags
}
